//! DOM identifier formatting for footnotes and annotations.
//!
//! Every id the converter writes into the output goes through this module, so
//! a footnote body and the links pointing at it always agree. Body and
//! reference ids for the same key differ in prefix length, so they never
//! collide. Across keys, `footnote-ref-1` could only clash with a body id for
//! the key `ref-1`, and [`FootnoteKey`] only produces digits and dashes.
//!
//! ```text
//! footnote_id("3")            → "footnote-3"
//! footnote_reference_id("3")  → "footnote-ref-3"
//! annotation_id(12, 1)        → "12-1"
//! ```

use std::fmt;

const FOOTNOTE_PREFIX: &str = "footnote-";
const FOOTNOTE_REFERENCE_PREFIX: &str = "footnote-ref-";

/// Id of a footnote body (the `<li>` in the footnote section).
pub fn footnote_id(id: &str) -> String {
    format!("{FOOTNOTE_PREFIX}{id}")
}

/// Id of a footnote reference (the `<a>` in the running text).
pub fn footnote_reference_id(id: &str) -> String {
    format!("{FOOTNOTE_REFERENCE_PREFIX}{id}")
}

/// Id of the `sequence_no`-th annotation inside entry `entry_id`.
pub fn annotation_id(entry_id: u32, sequence_no: usize) -> String {
    format!("{entry_id}-{sequence_no}")
}

/// Identifies one footnote within a rendered page.
///
/// `scope` is the post's entry number when the post has one. Scoped keys
/// format as [`annotation_id`]s (`12-1`), unscoped keys as the bare sequence
/// number (`1`). Sequence numbers start at 1 and follow first-reference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FootnoteKey {
    pub scope: Option<u32>,
    pub sequence: usize,
}

impl FootnoteKey {
    pub fn new(scope: Option<u32>, sequence: usize) -> Self {
        Self { scope, sequence }
    }

    pub fn body_id(&self) -> String {
        footnote_id(&self.to_string())
    }

    pub fn reference_id(&self) -> String {
        footnote_reference_id(&self.to_string())
    }

    /// Id of the `occurrence`-th reference (1-based) to this footnote.
    ///
    /// The first reference keeps the plain reference id; later ones get a
    /// numeric suffix so every anchor in the page stays unique.
    pub fn nth_reference_id(&self, occurrence: usize) -> String {
        if occurrence <= 1 {
            self.reference_id()
        } else {
            footnote_reference_id(&format!("{self}-{occurrence}"))
        }
    }
}

impl fmt::Display for FootnoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(entry) => f.write_str(&annotation_id(entry, self.sequence)),
            None => write!(f, "{}", self.sequence),
        }
    }
}

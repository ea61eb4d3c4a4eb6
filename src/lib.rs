//! # mdpress
//!
//! A small markdown renderer for a blog. Posts are markdown files; the
//! filesystem is the data source and the output is plain HTML.
//!
//! # Architecture: Parse, Convert, Serialize
//!
//! Every post goes through the same three steps, each producing a tree the
//! next one consumes:
//!
//! ```text
//! 1. Parse      markdown  →  Node tree    (pulldown-cmark events → document tree)
//! 2. Convert    Node tree →  HNode tree   (built-in handlers + site hooks)
//! 3. Serialize  HNode     →  HTML         (maud Render, escaped)
//! ```
//!
//! Keeping the trees separate means conversion rules can be tested on
//! hand-built input, and the presentation tree can be inspected before it is
//! turned into text (`mdpress ast <FILE>` prints it as JSON).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`mdast`] | Document tree and the pulldown-cmark adapter that builds it |
//! | [`hast`] | Presentation tree and its HTML serialization |
//! | [`convert`] | Document → presentation conversion with pluggable [`convert::Hooks`] |
//! | [`handlers`] | Classification and rewrite helpers used by the site hooks |
//! | [`pipeline`] | The site's configured parse/convert/serialize pipeline |
//! | [`ids`] | Footnote identifier formatting |
//! | [`naming`] | `NNN-slug` filename convention parser |
//! | [`post`] | Front matter and single-post loading |
//! | [`site`] | Content scanning, parallel rendering, page templates, build |
//! | [`config`] | Hierarchical `config.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting for `check` and `build` |
//!
//! # Design Decisions
//!
//! ## Hooks Fall Through
//!
//! A [`convert::Hooks`] implementation sees every node first and returns
//! `None` for anything it does not want to change. The site overrides exactly
//! two node kinds (empty paragraphs and strong emphasis); tables, footnotes,
//! headings and the rest use the built-in handlers untouched.
//!
//! ## Scoped Footnote Ids
//!
//! Footnote ids carry the post's entry number, so they stay unique even if
//! several post bodies end up combined on one page: the first footnote of
//! post 12 is `#footnote-12-1`, its reference `#footnote-ref-12-1`.
//! Numbering follows first-reference order. See [`ids`].
//!
//! ## Config Cascading (Root → Subdirectory)
//!
//! ```text
//! content/config.toml          ← root (overrides stock defaults)
//! content/notes/config.toml    ← subdirectory (overrides root)
//! ```
//!
//! The merge logic lives in [`config::merge_toml`].
//!
//! ## NNN-Prefix Ordering
//!
//! Posts use a numeric prefix (`001-`, `020-`) parsed by
//! [`naming::parse_post_name`]. The index lists numbered posts newest first,
//! then unnumbered ones by slug.

pub mod config;
pub mod convert;
pub mod handlers;
pub mod hast;
pub mod ids;
pub mod mdast;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod post;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Site-specific node handlers.
//!
//! Two small pieces plug into the converter through
//! [`crate::pipeline::SiteHooks`]:
//!
//! - [`is_empty_paragraph`] decides whether a paragraph carries no content,
//!   so it can be dropped instead of rendering as a stray `<p></p>`.
//!   Those come from blank lines around stripped directives and similar
//!   source quirks.
//! - [`rewrite_strong_as_emphasis`] renders `**strong**` source markup as `<em>`.
//!   On this site bold text in a post is visual emphasis, not "strong
//!   importance", and the markup should say so.

use crate::convert::RenderAll;
use crate::hast::HNode;
use crate::mdast::{Node, NodeKind};

/// True when every child is a text leaf holding only whitespace.
///
/// A paragraph with no children at all counts as empty. Any non-text child
/// (an image, inline code, a link, a line break) makes it non-empty.
pub fn is_empty_paragraph(node: &Node) -> bool {
    node.children
        .iter()
        .all(|child| matches!(&child.kind, NodeKind::Text(value) if value.trim().is_empty()))
}

/// Render a strong node as exactly one `<em>` element.
///
/// Children are converted through `ctx`, so nested markup (including nested
/// strong nodes) gets the same treatment as everywhere else.
pub fn rewrite_strong_as_emphasis(ctx: &dyn RenderAll, node: &Node) -> Vec<HNode> {
    vec![HNode::element("em", ctx.render_all(node))]
}

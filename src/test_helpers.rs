//! Shared test utilities for the mdpress test suite.
//!
//! Builders for hand-made document trees, lookups into presentation trees,
//! and a throwaway content directory for site-level tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let doc = root(vec![paragraph(vec![text("hi "), strong(vec![text("there")])])]);
//! let tree = Pipeline::default().transform(&doc, None);
//!
//! let ems = find_all(&tree, "em");
//! assert_eq!(element_text(ems[0]), "there");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::hast::{Element, HNode};
use crate::mdast::{Node, NodeKind};

// =========================================================================
// Document tree builders
// =========================================================================

pub fn node(kind: NodeKind, children: Vec<Node>) -> Node {
    Node::with_children(kind, children)
}

pub fn root(children: Vec<Node>) -> Node {
    node(NodeKind::Root, children)
}

pub fn text(value: &str) -> Node {
    Node::text(value)
}

pub fn paragraph(children: Vec<Node>) -> Node {
    node(NodeKind::Paragraph, children)
}

pub fn strong(children: Vec<Node>) -> Node {
    node(NodeKind::Strong, children)
}

pub fn emphasis(children: Vec<Node>) -> Node {
    node(NodeKind::Emphasis, children)
}

pub fn image(url: &str, alt: &str) -> Node {
    let alt = if alt.is_empty() { vec![] } else { vec![text(alt)] };
    node(
        NodeKind::Image {
            url: url.to_string(),
            title: String::new(),
        },
        alt,
    )
}

pub fn footnote_ref(label: &str) -> Node {
    node(NodeKind::FootnoteReference(label.to_string()), vec![])
}

pub fn footnote_def(label: &str, children: Vec<Node>) -> Node {
    node(NodeKind::FootnoteDefinition(label.to_string()), children)
}

// =========================================================================
// Presentation tree lookups
// =========================================================================

/// All elements with `tag`, in document order.
pub fn find_all<'a>(tree: &'a HNode, tag: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect(tree, tag, &mut found);
    found
}

fn collect<'a>(node: &'a HNode, tag: &str, found: &mut Vec<&'a Element>) {
    if let Some(el) = node.as_element() {
        if el.tag_name == tag {
            found.push(el);
        }
    }
    for child in node.children() {
        collect(child, tag, found);
    }
}

pub fn element_text(el: &Element) -> String {
    el.children.iter().map(HNode::text_content).collect()
}

/// Top-level children of a root, ignoring the `"\n"` separators.
pub fn top_level(tree: &HNode) -> Vec<&HNode> {
    tree.children().iter().filter(|n| !n.is_whitespace()).collect()
}

// =========================================================================
// Content directory fixtures
// =========================================================================

/// A temp content directory holding the given `(relative path, contents)`
/// files.
pub fn content_dir(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        write_file(tmp.path(), rel, contents);
    }
    tmp
}

pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

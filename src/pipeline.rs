//! The site's markdown pipeline.
//!
//! Parses a post, converts it with the site's hooks, and serializes the
//! result:
//!
//! ```text
//! markdown ──parse──▶ Node tree ──to_hast + SiteHooks──▶ HNode tree ──Render──▶ HTML
//! ```
//!
//! [`SiteHooks`] overrides exactly two node kinds and leaves everything else
//! to the converter's built-in handlers:
//!
//! | Node kind | Override |
//! |-----------|----------|
//! | Paragraph | dropped when [`is_empty_paragraph`] holds |
//! | Strong    | rendered as `<em>` by [`rewrite_strong_as_emphasis`] |
//!
//! A pipeline holds only immutable options, so one instance can render any
//! number of posts from any number of threads.

use crate::config::SiteConfig;
use crate::convert::{ConvertOptions, Hooks, State, to_hast};
use crate::hast::HNode;
use crate::handlers::{is_empty_paragraph, rewrite_strong_as_emphasis};
use crate::mdast::{self, Document, Node, NodeKind, ParseOptions};
use tracing::debug;

/// The site's overrides on top of the built-in conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteHooks {
    pub elide_empty_paragraphs: bool,
    pub strong_as_emphasis: bool,
}

impl Default for SiteHooks {
    fn default() -> Self {
        Self {
            elide_empty_paragraphs: true,
            strong_as_emphasis: true,
        }
    }
}

impl Hooks for SiteHooks {
    fn handle(&self, state: &State<'_>, node: &Node) -> Option<Vec<HNode>> {
        match node.kind {
            NodeKind::Paragraph if self.elide_empty_paragraphs && is_empty_paragraph(node) => {
                debug!(children = node.children.len(), "eliding empty paragraph");
                Some(Vec::new())
            }
            NodeKind::Strong if self.strong_as_emphasis => {
                Some(rewrite_strong_as_emphasis(state, node))
            }
            _ => None,
        }
    }
}

/// A rendered post body.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub tree: HNode,
    pub html: String,
    /// Text of the first top-level `# heading`, if any.
    pub title: Option<String>,
    /// Raw `+++` front matter, unparsed.
    pub front_matter: Option<String>,
    /// Number of footnotes emitted in the footnote section.
    pub footnotes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    parse: ParseOptions,
    convert: ConvertOptions,
    hooks: SiteHooks,
}

impl Pipeline {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            parse: config.parse_options(),
            convert: config.convert_options(),
            hooks: SiteHooks {
                elide_empty_paragraphs: config.markdown.elide_empty_paragraphs,
                strong_as_emphasis: config.markdown.strong_as_emphasis,
            },
        }
    }

    pub fn hooks(&self) -> &SiteHooks {
        &self.hooks
    }

    pub fn parse(&self, markdown: &str) -> Document {
        mdast::parse(markdown, &self.parse)
    }

    /// Convert a document tree; `scope` is the post's entry number.
    pub fn transform(&self, root: &Node, scope: Option<u32>) -> HNode {
        let options = ConvertOptions {
            footnote_scope: scope,
            ..self.convert.clone()
        };
        to_hast(root, &self.hooks, &options)
    }

    /// Parse, convert and serialize markdown source.
    pub fn render(&self, markdown: &str, scope: Option<u32>) -> Rendered {
        let doc = self.parse(markdown);
        let title = first_heading(&doc.root);
        let tree = self.transform(&doc.root, scope);
        let footnotes = count_footnotes(&tree);
        let html = tree.to_html();
        debug!(?scope, bytes = html.len(), footnotes, "rendered document");
        Rendered {
            tree,
            html,
            title,
            front_matter: doc.front_matter,
            footnotes,
        }
    }
}

fn first_heading(root: &Node) -> Option<String> {
    root.children
        .iter()
        .find(|n| n.kind == NodeKind::Heading(1))
        .map(|n| n.text_content().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn count_footnotes(tree: &HNode) -> usize {
    tree.children()
        .iter()
        .filter_map(HNode::as_element)
        .filter(|el| el.tag_name == "section" && el.get_attr("class") == Some("footnotes"))
        .flat_map(|section| section.children.iter())
        .filter(|n| n.tag_name() == Some("ol"))
        .map(|ol| ol.children().iter().filter(|n| n.tag_name() == Some("li")).count())
        .sum()
}

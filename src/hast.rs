//! Presentation tree and HTML serialization.
//!
//! The converter in [`crate::convert`] produces [`HNode`] trees; page
//! templates embed them directly through maud's [`Render`] trait:
//!
//! ```rust,ignore
//! let body = pipeline.transform(&doc.root, Some(12));
//! html! { article { (body) } }
//! ```
//!
//! Text and attribute values go through [`maud::Escaper`], so the tree can
//! never smuggle markup into the page except through an explicit
//! [`HNode::Raw`] (raw HTML from the source, when the site allows it).

use maud::{Escaper, Render};
use serde::Serialize;
use std::fmt::Write as _;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HNode {
    Root { children: Vec<HNode> },
    Element(Element),
    Text { value: String },
    Raw { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HNode>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<HNode>) -> Self {
        self.children = children;
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag_name.as_str())
    }
}

impl From<Element> for HNode {
    fn from(el: Element) -> Self {
        HNode::Element(el)
    }
}

impl HNode {
    pub fn root(children: Vec<HNode>) -> Self {
        HNode::Root { children }
    }

    /// Shorthand for an attribute-less element.
    pub fn element(tag_name: impl Into<String>, children: Vec<HNode>) -> Self {
        HNode::Element(Element::new(tag_name).with_children(children))
    }

    pub fn text(value: impl Into<String>) -> Self {
        HNode::Text {
            value: value.into(),
        }
    }

    pub fn raw(value: impl Into<String>) -> Self {
        HNode::Raw {
            value: value.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag_name.as_str())
    }

    pub fn children(&self) -> &[HNode] {
        match self {
            HNode::Root { children } => children,
            HNode::Element(el) => &el.children,
            HNode::Text { .. } | HNode::Raw { .. } => &[],
        }
    }

    /// Whether this node is a `"\n"`-style text node between blocks.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, HNode::Text { value } if value.trim().is_empty())
    }

    /// Concatenated text of this node and its descendants (raw HTML excluded).
    pub fn text_content(&self) -> String {
        match self {
            HNode::Text { value } => value.clone(),
            HNode::Raw { .. } => String::new(),
            _ => self.children().iter().map(HNode::text_content).collect(),
        }
    }

    pub fn to_html(&self) -> String {
        self.render().into_string()
    }
}

fn escape_into(buffer: &mut String, value: &str) {
    // Writing into a String cannot fail.
    let _ = Escaper::new(buffer).write_str(value);
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(&self.tag_name);
        for (name, value) in &self.properties {
            buffer.push(' ');
            buffer.push_str(name);
            buffer.push_str("=\"");
            escape_into(buffer, value);
            buffer.push('"');
        }
        buffer.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.render_to(buffer);
        }
        buffer.push_str("</");
        buffer.push_str(&self.tag_name);
        buffer.push('>');
    }
}

impl Render for HNode {
    fn render_to(&self, buffer: &mut String) {
        match self {
            HNode::Root { children } => {
                for child in children {
                    child.render_to(buffer);
                }
            }
            HNode::Element(el) => el.render_to(buffer),
            HNode::Text { value } => escape_into(buffer, value),
            HNode::Raw { value } => buffer.push_str(value),
        }
    }
}

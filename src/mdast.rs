//! Markdown document tree.
//!
//! [`parse`] turns markdown source into a [`Node`] tree by folding the flat
//! event stream from [pulldown-cmark](https://docs.rs/pulldown-cmark) into
//! nested containers. The tree is the input of the converter in
//! [`crate::convert`]; nothing downstream mutates it.
//!
//! ## Shape
//!
//! Every node is a [`NodeKind`] tag plus an ordered list of children. Leaf
//! kinds (`Text`, `InlineCode`, `Code`, `Html`, `Break`, `ThematicBreak`,
//! `FootnoteReference`) carry their value in the tag and never have children.
//!
//! ```text
//! "Hello **big**\nworld"
//!
//! Root
//! └── Paragraph
//!     ├── Text "Hello "
//!     ├── Strong
//!     │   └── Text "big"
//!     └── Text "\nworld"
//! ```
//!
//! ## Normalisation
//!
//! - Adjacent text events are merged into one `Text` node.
//! - Soft breaks become `"\n"` inside the surrounding text.
//! - Code blocks and HTML blocks collapse into a single leaf.
//! - A `+++`-delimited block at the top of the file is returned separately as
//!   [`Document::front_matter`] and never enters the tree.

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    /// Value for the HTML `align` attribute, if any.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}

impl From<Alignment> for Align {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::None => Align::None,
            Alignment::Left => Align::Left,
            Alignment::Center => Align::Center,
            Alignment::Right => Align::Right,
        }
    }
}

/// Node-type tag. The set is closed: the converter matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Paragraph,
    /// Heading level, 1 through 6.
    Heading(u8),
    ThematicBreak,
    Blockquote,
    List {
        ordered: bool,
        start: Option<u64>,
    },
    /// `checked` is `Some` for task-list items.
    ListItem {
        checked: Option<bool>,
    },
    Code {
        lang: Option<String>,
        value: String,
    },
    Html(String),
    Table(Vec<Align>),
    TableHead,
    TableRow,
    TableCell,
    /// Footnote body, keyed by its source label (`[^label]: ...`).
    FootnoteDefinition(String),
    Text(String),
    Emphasis,
    Strong,
    Delete,
    InlineCode(String),
    Break,
    Link {
        url: String,
        title: String,
    },
    /// Alt text lives in the children.
    Image {
        url: String,
        title: String,
    },
    FootnoteReference(String),
    /// Syntax without a dedicated kind; rendered as its children.
    Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(value.into()))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Concatenated text of all descendant text-like leaves.
    ///
    /// Used for heading slugs, image alt text and page titles.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(v) | NodeKind::InlineCode(v) => out.push_str(v),
            NodeKind::Code { value, .. } => out.push_str(value),
            NodeKind::Break => out.push('\n'),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Which pulldown-cmark extensions to enable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub footnotes: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            footnotes: true,
            tables: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
        }
    }
}

impl ParseOptions {
    fn to_pulldown(&self) -> Options {
        let mut opts = Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS;
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_TASKLISTS, self.tasklists);
        opts.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        opts
    }
}

/// A parsed markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    /// Raw text between the `+++` fences, if the file starts with one.
    pub front_matter: Option<String>,
}

/// Parse markdown source into a document tree.
pub fn parse(markdown: &str, options: &ParseOptions) -> Document {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options.to_pulldown()) {
        builder.push_event(event);
    }
    builder.finish()
}

struct TreeBuilder {
    /// Open containers; the root is always at the bottom.
    stack: Vec<Node>,
    front_matter: Option<String>,
    in_metadata: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Node::new(NodeKind::Root)],
            front_matter: None,
            in_metadata: false,
        }
    }

    fn push_event(&mut self, event: Event<'_>) {
        if self.in_metadata {
            match event {
                Event::Text(text) => {
                    self.front_matter
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
                Event::End(TagEnd::MetadataBlock(_)) => self.in_metadata = false,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(Tag::MetadataBlock(_)) => self.in_metadata = true,
            Event::Start(tag) => self.stack.push(Node::new(kind_for_tag(tag))),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_leaf(NodeKind::Break),
            Event::Code(code) => self.push_leaf(NodeKind::InlineCode(code.into_string())),
            Event::InlineMath(math) => self.push_leaf(NodeKind::InlineCode(math.into_string())),
            Event::DisplayMath(math) => self.push_leaf(NodeKind::Code {
                lang: Some("math".to_string()),
                value: math.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_leaf(NodeKind::Html(html.into_string()))
            }
            Event::FootnoteReference(label) => {
                self.push_leaf(NodeKind::FootnoteReference(label.into_string()))
            }
            Event::Rule => self.push_leaf(NodeKind::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn top(&mut self) -> &mut Node {
        // The root is never popped before finish().
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str) {
        let top = self.top();
        if let Some(Node {
            kind: NodeKind::Text(prev),
            ..
        }) = top.children.last_mut()
        {
            prev.push_str(text);
            return;
        }
        top.children.push(Node::text(text));
    }

    fn push_leaf(&mut self, kind: NodeKind) {
        self.top().children.push(Node::new(kind));
    }

    fn mark_task(&mut self, checked: bool) {
        if let Some(item) = self
            .stack
            .iter_mut()
            .rev()
            .find(|n| matches!(n.kind, NodeKind::ListItem { .. }))
        {
            item.kind = NodeKind::ListItem {
                checked: Some(checked),
            };
        }
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(mut node) = self.stack.pop() else {
            return;
        };
        match &mut node.kind {
            NodeKind::Code { value, .. } => {
                *value = node.children.drain(..).map(|c| c.text_content()).collect();
            }
            NodeKind::Html(value) => {
                for child in node.children.drain(..) {
                    match child.kind {
                        NodeKind::Html(v) | NodeKind::Text(v) => value.push_str(&v),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        self.top().children.push(node);
    }

    fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            self.close();
        }
        let root = self
            .stack
            .pop()
            .unwrap_or_else(|| Node::new(NodeKind::Root));
        Document {
            root,
            front_matter: self.front_matter,
        }
    }
}

fn kind_for_tag(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading(heading_depth(level)),
        Tag::BlockQuote(_) => NodeKind::Blockquote,
        Tag::CodeBlock(kind) => NodeKind::Code {
            lang: match kind {
                CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.to_string()),
                CodeBlockKind::Indented => None,
            },
            value: String::new(),
        },
        Tag::HtmlBlock => NodeKind::Html(String::new()),
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
            start,
        },
        Tag::Item => NodeKind::ListItem { checked: None },
        Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition(label.into_string()),
        Tag::Table(aligns) => NodeKind::Table(aligns.into_iter().map(Align::from).collect()),
        Tag::TableHead => NodeKind::TableHead,
        Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Delete,
        Tag::Link {
            dest_url, title, ..
        } => NodeKind::Link {
            url: dest_url.into_string(),
            title: title.into_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            url: dest_url.into_string(),
            title: title.into_string(),
        },
        _ => NodeKind::Fragment,
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(md: &str) -> Node {
        parse(md, &ParseOptions::default()).root
    }

    #[test]
    fn paragraph_with_strong() {
        let root = parse_default("Hello **big** world");
        assert_eq!(
            root,
            Node::with_children(
                NodeKind::Root,
                vec![Node::with_children(
                    NodeKind::Paragraph,
                    vec![
                        Node::text("Hello "),
                        Node::with_children(NodeKind::Strong, vec![Node::text("big")]),
                        Node::text(" world"),
                    ],
                )],
            )
        );
    }

    #[test]
    fn soft_break_merges_into_text() {
        let root = parse_default("one\ntwo");
        let para = &root.children[0];
        assert_eq!(para.children, vec![Node::text("one\ntwo")]);
    }

    #[test]
    fn hard_break_is_a_node() {
        let root = parse_default("one  \ntwo");
        let kinds: Vec<_> = root.children[0].children.iter().map(|n| &n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &NodeKind::Text("one".into()),
                &NodeKind::Break,
                &NodeKind::Text("two".into()),
            ]
        );
    }

    #[test]
    fn heading_depth_is_kept() {
        let root = parse_default("### Third");
        assert_eq!(root.children[0].kind, NodeKind::Heading(3));
        assert_eq!(root.children[0].text_content(), "Third");
    }

    #[test]
    fn fenced_code_collapses_to_leaf() {
        let root = parse_default("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(
            root.children[0].kind,
            NodeKind::Code {
                lang: Some("rust".into()),
                value: "fn main() {}\n".into(),
            }
        );
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn footnotes_are_parsed() {
        let root = parse_default("Text[^a].\n\n[^a]: The note.\n");
        let para = &root.children[0];
        assert!(
            para.children
                .iter()
                .any(|n| n.kind == NodeKind::FootnoteReference("a".into()))
        );
        let def = root
            .children
            .iter()
            .find(|n| matches!(n.kind, NodeKind::FootnoteDefinition(_)))
            .expect("definition");
        assert_eq!(def.kind, NodeKind::FootnoteDefinition("a".into()));
        assert_eq!(def.text_content(), "The note.");
    }

    #[test]
    fn task_list_marks_item() {
        let root = parse_default("- [x] done\n- [ ] todo\n- plain\n");
        let list = &root.children[0];
        let checked: Vec<_> = list
            .children
            .iter()
            .map(|item| match item.kind {
                NodeKind::ListItem { checked } => checked,
                _ => panic!("expected list item"),
            })
            .collect();
        assert_eq!(checked, vec![Some(true), Some(false), None]);
    }

    #[test]
    fn ordered_list_start() {
        let root = parse_default("3. three\n4. four\n");
        assert_eq!(
            root.children[0].kind,
            NodeKind::List {
                ordered: true,
                start: Some(3),
            }
        );
    }

    #[test]
    fn image_alt_in_children() {
        let root = parse_default("![a cat](cat.png \"Cat\")");
        let img = &root.children[0].children[0];
        assert_eq!(
            img.kind,
            NodeKind::Image {
                url: "cat.png".into(),
                title: "Cat".into(),
            }
        );
        assert_eq!(img.text_content(), "a cat");
    }

    #[test]
    fn front_matter_is_split_off() {
        let doc = parse(
            "+++\ntitle = \"Hi\"\n+++\n\nBody\n",
            &ParseOptions::default(),
        );
        assert_eq!(doc.front_matter.as_deref().map(str::trim), Some("title = \"Hi\""));
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.children[0].text_content(), "Body");
    }

    #[test]
    fn html_block_collapses() {
        let root = parse_default("<div>\nhi\n</div>\n");
        assert!(matches!(&root.children[0].kind, NodeKind::Html(v) if v.contains("<div>")));
    }

    #[test]
    fn table_alignments() {
        let root = parse_default("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        assert_eq!(
            root.children[0].kind,
            NodeKind::Table(vec![Align::Left, Align::Right])
        );
        assert_eq!(root.children[0].children[0].kind, NodeKind::TableHead);
    }

    #[test]
    fn empty_input_gives_empty_root() {
        assert_eq!(parse_default(""), Node::new(NodeKind::Root));
    }
}

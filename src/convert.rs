//! Markdown tree to presentation tree conversion.
//!
//! [`to_hast`] walks a [`Node`] tree and produces an [`HNode`] tree. Every node
//! is first offered to a [`Hooks`] implementation; when the hook declines
//! (returns `None`) the built-in handler for that [`NodeKind`] runs. Handlers
//! never recurse on their own: children always go back through
//! [`State::all`], so hooks also apply at every depth.
//!
//! ```text
//! State::one(node)
//!   ├── hooks.handle(state, node)  → Some(nodes)  (override, may be empty)
//!   └── default handler            → nodes        (falls back here on None)
//!         └── State::all(node)     → one() per child
//! ```
//!
//! ## Footnotes
//!
//! Definitions are pulled out of the flow up front. References are numbered
//! in first-reference order, and every referenced definition is emitted once
//! in a trailing `<section class="footnotes">`, with back-links to each
//! reference. Ids come from [`crate::ids`] via [`FootnoteKey`], scoped by
//! [`ConvertOptions::footnote_scope`] so that several posts rendered into one
//! page do not share anchors.
//!
//! A reference to a label with no definition renders as its literal source
//! text (`[^label]`). Definitions nobody references are dropped.
//!
//! ## Whitespace
//!
//! Block-level siblings are separated by `"\n"` text nodes so the serialized
//! HTML has one block per line.

use crate::hast::{Element, HNode};
use crate::ids::FootnoteKey;
use crate::mdast::{Align, Node, NodeKind};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

/// The "convert these children" capability handed to node handlers.
///
/// [`State`] is the real implementation; tests can substitute a stub.
pub trait RenderAll {
    fn render_all(&self, node: &Node) -> Vec<HNode>;
}

/// Per-node-type overrides consulted before the built-in handlers.
pub trait Hooks {
    /// Convert `node`, or return `None` to use the built-in conversion.
    ///
    /// `Some(vec![])` removes the node from the output.
    fn handle(&self, state: &State<'_>, node: &Node) -> Option<Vec<HNode>>;
}

/// Hooks that never override anything.
pub struct NoHooks;

impl Hooks for NoHooks {
    fn handle(&self, _state: &State<'_>, _node: &Node) -> Option<Vec<HNode>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Entry number used to scope footnote ids, if any.
    pub footnote_scope: Option<u32>,
    /// Pass raw HTML from the source through; dropped otherwise.
    pub allow_html: bool,
    /// Give headings slug ids.
    pub heading_ids: bool,
    /// Text of the footnote section heading.
    pub footnote_label: String,
    /// `aria-label` of footnote back-links.
    pub footnote_back_label: String,
    /// Visible content of footnote back-links.
    pub footnote_back_content: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            footnote_scope: None,
            allow_html: true,
            heading_ids: true,
            footnote_label: "Footnotes".to_string(),
            footnote_back_label: "Back to reference".to_string(),
            footnote_back_content: "↩".to_string(),
        }
    }
}

const FOOTNOTE_LABEL_ID: &str = "footnote-label";

/// Convert a document tree into a presentation tree.
///
/// The result is always an [`HNode::Root`].
pub fn to_hast(root: &Node, hooks: &dyn Hooks, options: &ConvertOptions) -> HNode {
    let state = State::new(root, hooks, options);
    let mut children = state.one(root);
    if let Some(section) = state.footnote_section() {
        if !children.is_empty() {
            children.push(HNode::text("\n"));
        }
        children.push(section);
    }
    HNode::root(children)
}

#[derive(Default)]
struct FootnoteTracker {
    /// Normalized labels in first-reference order.
    order: Vec<String>,
    /// Number of references seen per label.
    counts: HashMap<String, usize>,
}

impl FootnoteTracker {
    /// Record a reference; returns its (sequence, occurrence), both 1-based.
    fn reference(&mut self, label: &str) -> (usize, usize) {
        let count = self.counts.entry(label.to_string()).or_insert(0);
        *count += 1;
        let occurrence = *count;
        let sequence = match self.order.iter().position(|l| l == label) {
            Some(pos) => pos + 1,
            None => {
                self.order.push(label.to_string());
                self.order.len()
            }
        };
        (sequence, occurrence)
    }
}

/// Conversion state for one document.
///
/// Created by [`to_hast`] and dropped when it returns; handlers only ever see
/// a shared borrow.
pub struct State<'a> {
    hooks: &'a dyn Hooks,
    options: &'a ConvertOptions,
    definitions: HashMap<String, &'a Node>,
    footnotes: RefCell<FootnoteTracker>,
    slugs: RefCell<HashMap<String, usize>>,
}

impl<'a> State<'a> {
    fn new(root: &'a Node, hooks: &'a dyn Hooks, options: &'a ConvertOptions) -> Self {
        let mut definitions = HashMap::new();
        root.walk(&mut |node| {
            if let NodeKind::FootnoteDefinition(label) = &node.kind {
                definitions.entry(normalize_label(label)).or_insert(node);
            }
        });
        Self {
            hooks,
            options,
            definitions,
            footnotes: RefCell::default(),
            slugs: RefCell::default(),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    /// Convert a single node: hook first, built-in handler otherwise.
    pub fn one(&self, node: &Node) -> Vec<HNode> {
        if let Some(nodes) = self.hooks.handle(self, node) {
            return nodes;
        }
        self.builtin(node)
    }

    /// Convert all children of `parent`, in order.
    pub fn all(&self, parent: &Node) -> Vec<HNode> {
        parent.children.iter().flat_map(|c| self.one(c)).collect()
    }

    /// The built-in conversion for `node`, bypassing hooks for this node
    /// (but not for its children).
    pub fn builtin(&self, node: &Node) -> Vec<HNode> {
        match &node.kind {
            NodeKind::Root => wrap(self.all(node), false),
            NodeKind::Paragraph => vec![HNode::element("p", self.all(node))],
            NodeKind::Heading(depth) => vec![self.heading(*depth, node)],
            NodeKind::ThematicBreak => vec![HNode::element("hr", Vec::new())],
            NodeKind::Blockquote => vec![HNode::element("blockquote", wrap(self.all(node), true))],
            NodeKind::List { ordered, start } => vec![self.list(*ordered, *start, node)],
            NodeKind::ListItem { checked } => vec![self.list_item(*checked, node)],
            NodeKind::Code { lang, value } => vec![code_block(lang.as_deref(), value)],
            NodeKind::Html(value) => self.html(value),
            NodeKind::Table(aligns) => vec![self.table(aligns, node)],
            NodeKind::TableHead => vec![self.table_row(node, &[], "th")],
            NodeKind::TableRow => vec![self.table_row(node, &[], "td")],
            NodeKind::TableCell => vec![HNode::element("td", self.all(node))],
            NodeKind::FootnoteDefinition(_) => Vec::new(),
            NodeKind::Text(value) => vec![HNode::text(value.clone())],
            NodeKind::Emphasis => vec![HNode::element("em", self.all(node))],
            NodeKind::Strong => vec![HNode::element("strong", self.all(node))],
            NodeKind::Delete => vec![HNode::element("del", self.all(node))],
            NodeKind::InlineCode(value) => {
                vec![HNode::element("code", vec![HNode::text(value.clone())])]
            }
            NodeKind::Break => vec![HNode::element("br", Vec::new()), HNode::text("\n")],
            NodeKind::Link { url, title } => {
                let mut a = Element::new("a").attr("href", url.clone());
                if !title.is_empty() {
                    a = a.attr("title", title.clone());
                }
                vec![a.with_children(self.all(node)).into()]
            }
            NodeKind::Image { url, title } => {
                let mut img = Element::new("img")
                    .attr("src", url.clone())
                    .attr("alt", node.text_content());
                if !title.is_empty() {
                    img = img.attr("title", title.clone());
                }
                vec![img.into()]
            }
            NodeKind::FootnoteReference(label) => self.footnote_reference(label),
            NodeKind::Fragment => self.all(node),
        }
    }

    fn heading(&self, depth: u8, node: &Node) -> HNode {
        let mut el = Element::new(format!("h{depth}"));
        if self.options.heading_ids {
            el = el.attr("id", self.slug(&node.text_content()));
        }
        el.with_children(self.all(node)).into()
    }

    /// Unique slug for a heading, github style: `intro`, `intro-1`, ...
    fn slug(&self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        // Keep heading anchors out of the footnote id namespace.
        if base.starts_with("footnote-") {
            base = format!("h-{base}");
        }
        let mut slugs = self.slugs.borrow_mut();
        let mut candidate = base.clone();
        while let Some(n) = slugs.get_mut(&candidate) {
            *n += 1;
            candidate = format!("{base}-{n}");
        }
        slugs.insert(candidate.clone(), 0);
        candidate
    }

    fn list(&self, ordered: bool, start: Option<u64>, node: &Node) -> HNode {
        let mut el = Element::new(if ordered { "ol" } else { "ul" });
        if let Some(start) = start.filter(|&s| ordered && s != 1) {
            el = el.attr("start", start.to_string());
        }
        let has_tasks = node
            .children
            .iter()
            .any(|item| matches!(item.kind, NodeKind::ListItem { checked: Some(_) }));
        if has_tasks {
            el = el.attr("class", "contains-task-list");
        }
        el.with_children(wrap(self.all(node), true)).into()
    }

    fn list_item(&self, checked: Option<bool>, node: &Node) -> HNode {
        let mut children = self.all(node);
        let mut el = Element::new("li");

        if let Some(checked) = checked {
            el = el.attr("class", "task-list-item");
            let mut input = Element::new("input")
                .attr("type", "checkbox")
                .attr("disabled", "");
            if checked {
                input = input.attr("checked", "");
            }
            let marker = vec![input.into(), HNode::text(" ")];
            match children.first_mut() {
                Some(HNode::Element(p)) if p.tag_name == "p" => {
                    p.children.splice(0..0, marker);
                }
                _ => {
                    children.splice(0..0, marker);
                }
            }
        }

        if node.children.iter().any(is_block) {
            children = wrap(children, true);
        }
        el.with_children(children).into()
    }

    fn html(&self, value: &str) -> Vec<HNode> {
        if self.options.allow_html {
            vec![HNode::raw(value)]
        } else {
            debug!(len = value.len(), "dropping raw html");
            Vec::new()
        }
    }

    fn table(&self, aligns: &[Align], node: &Node) -> HNode {
        let mut head = Vec::new();
        let mut body = Vec::new();
        for row in &node.children {
            match row.kind {
                NodeKind::TableHead => head.push(self.table_row(row, aligns, "th")),
                _ => body.push(self.table_row(row, aligns, "td")),
            }
        }
        let mut sections = Vec::new();
        if !head.is_empty() {
            sections.push(HNode::element("thead", wrap(head, true)));
        }
        if !body.is_empty() {
            sections.push(HNode::element("tbody", wrap(body, true)));
        }
        HNode::element("table", wrap(sections, true))
    }

    fn table_row(&self, row: &Node, aligns: &[Align], cell_tag: &str) -> HNode {
        let cells = row
            .children
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let mut el = Element::new(cell_tag);
                if let Some(align) = aligns.get(i).and_then(|a| a.as_attr()) {
                    el = el.attr("align", align);
                }
                el.with_children(self.all(cell)).into()
            })
            .collect();
        HNode::element("tr", wrap(cells, true))
    }

    fn footnote_reference(&self, label: &str) -> Vec<HNode> {
        let label_key = normalize_label(label);
        if !self.definitions.contains_key(&label_key) {
            return vec![HNode::text(format!("[^{label}]"))];
        }
        let (sequence, occurrence) = self.footnotes.borrow_mut().reference(&label_key);
        let key = FootnoteKey::new(self.options.footnote_scope, sequence);
        let link = Element::new("a")
            .attr("href", format!("#{}", key.body_id()))
            .attr("id", key.nth_reference_id(occurrence))
            .attr("data-footnote-ref", "")
            .attr("aria-describedby", FOOTNOTE_LABEL_ID)
            .with_children(vec![HNode::text(sequence.to_string())]);
        vec![HNode::element("sup", vec![link.into()])]
    }

    /// The trailing footnote section, if anything was referenced.
    fn footnote_section(&self) -> Option<HNode> {
        // Footnote bodies may reference further footnotes, which appends to
        // the order while we iterate; index instead of holding a borrow.
        let mut contents = Vec::new();
        loop {
            let next = self.footnotes.borrow().order.get(contents.len()).cloned();
            let Some(label) = next else { break };
            let Some(def) = self.definitions.get(&label) else {
                break;
            };
            contents.push((label, self.all(def)));
        }
        if contents.is_empty() {
            return None;
        }
        let unreferenced = self.definitions.len() - contents.len();
        if unreferenced > 0 {
            debug!(unreferenced, "dropping unreferenced footnote definitions");
        }

        let counts = self.footnotes.borrow().counts.clone();
        let items = contents
            .into_iter()
            .enumerate()
            .map(|(i, (label, content))| {
                let key = FootnoteKey::new(self.options.footnote_scope, i + 1);
                let references = counts.get(&label).copied().unwrap_or(1);
                self.footnote_item(key, references, content)
            })
            .collect();

        let heading = Element::new("h2")
            .attr("id", FOOTNOTE_LABEL_ID)
            .attr("class", "sr-only")
            .with_children(vec![HNode::text(self.options.footnote_label.clone())]);
        let list = HNode::element("ol", wrap(items, true));
        let section = Element::new("section")
            .attr("class", "footnotes")
            .attr("data-footnotes", "")
            .with_children(wrap(vec![heading.into(), list], true));
        Some(section.into())
    }

    fn footnote_item(&self, key: FootnoteKey, references: usize, mut content: Vec<HNode>) -> HNode {
        let mut backrefs = Vec::new();
        for occurrence in 1..=references {
            if occurrence > 1 {
                backrefs.push(HNode::text(" "));
            }
            let mut label = format!("{} {}", self.options.footnote_back_label, key.sequence);
            let mut link_content = vec![HNode::text(self.options.footnote_back_content.clone())];
            if occurrence > 1 {
                label.push_str(&format!("-{occurrence}"));
                link_content.push(HNode::element("sup", vec![HNode::text(occurrence.to_string())]));
            }
            let link = Element::new("a")
                .attr("href", format!("#{}", key.nth_reference_id(occurrence)))
                .attr("data-footnote-backref", "")
                .attr("aria-label", label)
                .attr("class", "footnote-backref")
                .with_children(link_content);
            backrefs.push(link.into());
        }

        match content.last_mut() {
            Some(HNode::Element(p)) if p.tag_name == "p" => {
                p.children.push(HNode::text(" "));
                p.children.extend(backrefs);
            }
            _ => content.extend(backrefs),
        }

        Element::new("li")
            .attr("id", key.body_id())
            .with_children(wrap(content, true))
            .into()
    }
}

impl RenderAll for State<'_> {
    fn render_all(&self, node: &Node) -> Vec<HNode> {
        self.all(node)
    }
}

/// Join nodes with `"\n"` text nodes; `loose` also pads both ends.
pub fn wrap(nodes: Vec<HNode>, loose: bool) -> Vec<HNode> {
    if nodes.is_empty() {
        return nodes;
    }
    let mut out = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        out.push(HNode::text("\n"));
    }
    for (i, node) in nodes.into_iter().enumerate() {
        if i > 0 {
            out.push(HNode::text("\n"));
        }
        out.push(node);
    }
    if loose {
        out.push(HNode::text("\n"));
    }
    out
}

fn is_block(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::ThematicBreak
            | NodeKind::Blockquote
            | NodeKind::List { .. }
            | NodeKind::Code { .. }
            | NodeKind::Table(_)
    )
}

fn code_block(lang: Option<&str>, value: &str) -> HNode {
    let mut code = Element::new("code");
    if let Some(lang) = lang {
        code = code.attr("class", format!("language-{lang}"));
    }
    let code = code.with_children(vec![HNode::text(value)]);
    HNode::element("pre", vec![code.into()])
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Lowercase, spaces to dashes, everything but letters, digits, `-` and `_`
/// dropped.
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_lowercase().collect::<String>())
            } else if c.is_whitespace() {
                Some("-".to_string())
            } else {
                None
            }
        })
        .collect()
}

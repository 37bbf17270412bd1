//! Document node taxonomy.
//!
//! A [`Node`] is one element of an already-parsed document tree. Nodes are
//! immutable once built: the public API only offers constructors, `with_*`
//! builder methods and read accessors. The [`markdown`](crate::markdown)
//! adapter produces them from `pulldown-cmark` events, but hosts may build
//! trees by hand as well.

use std::collections::BTreeMap;
use std::fmt;

use pulldown_cmark::BlockQuoteKind;
use serde::Serialize;

/// Discriminant of a document node.
///
/// The renderer registry is keyed by this type. [`NodeKind::Custom`] lets
/// hosts introduce their own kinds (embeds, highlighted code, etc.) without
/// touching the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    List,
    ListItem,
    CodeBlock,
    ThematicBreak,
    Table,
    TableHead,
    TableRow,
    TableCell,
    DefinitionList,
    DefinitionTitle,
    DefinitionDetails,
    Text,
    Code,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    SoftBreak,
    HardBreak,
    TaskListMarker,
    Html,
    /// Host-defined kind, identified by name.
    Custom(String),
}

impl NodeKind {
    /// Every built-in kind, in declaration order.
    pub const BUILTIN: [Self; 28] = [
        Self::Document,
        Self::Paragraph,
        Self::Heading,
        Self::BlockQuote,
        Self::List,
        Self::ListItem,
        Self::CodeBlock,
        Self::ThematicBreak,
        Self::Table,
        Self::TableHead,
        Self::TableRow,
        Self::TableCell,
        Self::DefinitionList,
        Self::DefinitionTitle,
        Self::DefinitionDetails,
        Self::Text,
        Self::Code,
        Self::Emphasis,
        Self::Strong,
        Self::Strikethrough,
        Self::Superscript,
        Self::Subscript,
        Self::Link,
        Self::Image,
        Self::SoftBreak,
        Self::HardBreak,
        Self::TaskListMarker,
        Self::Html,
    ];

    /// Create a custom kind.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Short name used in node paths and error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::BlockQuote => "blockquote",
            Self::List => "list",
            Self::ListItem => "item",
            Self::CodeBlock => "code_block",
            Self::ThematicBreak => "thematic_break",
            Self::Table => "table",
            Self::TableHead => "table_head",
            Self::TableRow => "table_row",
            Self::TableCell => "table_cell",
            Self::DefinitionList => "definition_list",
            Self::DefinitionTitle => "definition_title",
            Self::DefinitionDetails => "definition_details",
            Self::Text => "text",
            Self::Code => "code",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Strikethrough => "strikethrough",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Link => "link",
            Self::Image => "image",
            Self::SoftBreak => "soft_break",
            Self::HardBreak => "hard_break",
            Self::TaskListMarker => "task_list_marker",
            Self::Html => "html",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Whether this is a host-defined kind.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// GitHub-style alert flavour of a blockquote (`> [!NOTE]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Lowercase identifier, used for CSS classes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Horizontal alignment of a table column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl From<pulldown_cmark::Alignment> for ColumnAlignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Kind-specific node attributes.
///
/// Which fields are meaningful depends on the node kind; renderers decide
/// what a missing attribute means for their kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttrs {
    /// Literal content (text runs, inline code, code blocks, raw HTML, image alt text).
    pub text: Option<String>,
    /// Heading level (1-6).
    pub level: Option<u8>,
    /// Link or image destination.
    pub destination: Option<String>,
    /// Link or image title.
    pub title: Option<String>,
    /// Code block language.
    pub language: Option<String>,
    /// Start number of an ordered list. `None` for bullet lists.
    pub start: Option<u64>,
    /// Task list marker state.
    pub checked: Option<bool>,
    /// Alert flavour of a blockquote.
    pub alert: Option<AlertKind>,
    /// Alignment of a table cell.
    pub align: Option<ColumnAlignment>,
    /// Free-form attributes: fence info `key=value` pairs and custom kind data.
    pub extra: BTreeMap<String, String>,
}

/// A typed node of a parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    attrs: NodeAttrs,
    children: Vec<Node>,
}

/// Children are released with an explicit worklist so arbitrarily deep
/// parser output does not exhaust the stack when dropped.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Node {
    /// Create a node of the given kind with no attributes and no children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: NodeAttrs::default(),
            children: Vec::new(),
        }
    }

    /// Document root holding the given blocks.
    #[must_use]
    pub fn document(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Document).with_children(children)
    }

    /// Paragraph holding the given inlines.
    #[must_use]
    pub fn paragraph(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Paragraph).with_children(children)
    }

    /// Heading of the given level.
    #[must_use]
    pub fn heading(level: u8, children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Heading)
            .with_level(level)
            .with_children(children)
    }

    /// Text run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text).with_text(text)
    }

    /// Emphasis holding the given inlines.
    #[must_use]
    pub fn emphasis(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Emphasis).with_children(children)
    }

    /// Strong emphasis holding the given inlines.
    #[must_use]
    pub fn strong(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Strong).with_children(children)
    }

    /// Link to `destination` holding the given inlines.
    #[must_use]
    pub fn link(destination: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Link)
            .with_destination(destination)
            .with_children(children)
    }

    /// Bullet list (`start == None`) or ordered list.
    #[must_use]
    pub fn list(start: Option<u64>, items: impl IntoIterator<Item = Node>) -> Self {
        let mut node = Self::new(NodeKind::List).with_children(items);
        node.attrs.start = start;
        node
    }

    /// List item holding the given blocks.
    #[must_use]
    pub fn list_item(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::ListItem).with_children(children)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.attrs.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.attrs.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.attrs.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.attrs.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.attrs.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.attrs.checked = Some(checked);
        self
    }

    #[must_use]
    pub fn with_alert(mut self, alert: AlertKind) -> Self {
        self.attrs.alert = Some(alert);
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: ColumnAlignment) -> Self {
        self.attrs.align = Some(align);
        self
    }

    /// Add a free-form attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Literal content, if any.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.attrs.text.as_deref()
    }

    /// Concatenated literal content of this node and all descendants.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node.kind {
                NodeKind::SoftBreak | NodeKind::HardBreak => out.push(' '),
                _ => {
                    if let Some(text) = &node.attrs.text {
                        out.push_str(text);
                    }
                }
            }
            pending.extend(node.children.iter().rev());
        }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut NodeAttrs {
        &mut self.attrs
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub(crate) fn last_child_mut(&mut self) -> Option<&mut Node> {
        self.children.last_mut()
    }

    pub(crate) fn take_children(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.children)
    }
}

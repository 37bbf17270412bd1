//! Rich-text element model.
//!
//! The output of a render is a tree of [`Element`]s rooted at a
//! [`Container`]. Containers own their children exclusively; leaves carry
//! terminal content. Elements are only populated through
//! [`RenderContext`](crate::RenderContext).

use serde::Serialize;

use crate::node::{AlertKind, ColumnAlignment};

/// Style applied by a styled inline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineStyle {
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
}

/// What a container represents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerKind {
    Document,
    Paragraph,
    /// `id` is the explicit anchor from the source, if any.
    Heading { level: u8, id: Option<String> },
    Quote { alert: Option<AlertKind> },
    List { start: Option<u64> },
    ListItem,
    CodeBlock { language: Option<String> },
    Table,
    TableHead,
    TableRow,
    TableCell { header: bool, align: ColumnAlignment },
    DefinitionList,
    DefinitionTitle,
    DefinitionDetails,
    /// Styled inline run (emphasis, strong, ...).
    Span { style: InlineStyle },
    Hyperlink {
        destination: String,
        title: Option<String>,
    },
    /// Container produced by a host renderer.
    Custom { name: String },
}

impl ContainerKind {
    /// Short name used in diagnostics (stack snapshots).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::Quote { .. } => "quote",
            Self::List { .. } => "list",
            Self::ListItem => "list_item",
            Self::CodeBlock { .. } => "code_block",
            Self::Table => "table",
            Self::TableHead => "table_head",
            Self::TableRow => "table_row",
            Self::TableCell { .. } => "table_cell",
            Self::DefinitionList => "definition_list",
            Self::DefinitionTitle => "definition_title",
            Self::DefinitionDetails => "definition_details",
            Self::Span { .. } => "span",
            Self::Hyperlink { .. } => "hyperlink",
            Self::Custom { name } => name.as_str(),
        }
    }
}

/// Terminal content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Leaf {
    Text { text: String },
    Code { code: String },
    LineBreak,
    SoftBreak,
    Rule,
    Image {
        source: String,
        alt: String,
        title: Option<String>,
    },
    Checkbox { checked: bool },
    RawHtml { html: String },
}

impl Leaf {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Output element: either a container or a leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Element {
    Container(Container),
    Leaf(Leaf),
}

impl Element {
    #[must_use]
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Container(_) => None,
            Self::Leaf(leaf) => Some(leaf),
        }
    }
}

/// Element that holds child elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Container {
    pub kind: ContainerKind,
    pub children: Vec<Element>,
}

impl Container {
    #[must_use]
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Number of nested container levels, counting `self`.
    ///
    /// Leaves do not add a level: a paragraph holding only text has depth 1.
    #[must_use]
    pub fn container_depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(Element::as_container)
            .map(Container::container_depth)
            .max()
            .unwrap_or(0)
    }

    /// Child containers, in order.
    pub fn child_containers(&self) -> impl Iterator<Item = &Container> + '_ {
        self.children.iter().filter_map(Element::as_container)
    }

    /// Concatenated text of all descendant leaves.
    ///
    /// Breaks become a single space; images contribute their alt text.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Element::Container(container) => container.collect_text(out),
                Element::Leaf(Leaf::Text { text }) => out.push_str(text),
                Element::Leaf(Leaf::Code { code }) => out.push_str(code),
                Element::Leaf(Leaf::Image { alt, .. }) => out.push_str(alt),
                Element::Leaf(Leaf::LineBreak | Leaf::SoftBreak) => out.push(' '),
                Element::Leaf(Leaf::Rule | Leaf::Checkbox { .. } | Leaf::RawHtml { .. }) => {}
            }
        }
    }

    /// Depth-first iterator over this container and all descendant containers.
    pub fn walk(&self) -> impl Iterator<Item = &Container> + '_ {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let next = pending.pop()?;
            pending.extend(next.child_containers().collect::<Vec<_>>().into_iter().rev());
            Some(next)
        })
    }
}

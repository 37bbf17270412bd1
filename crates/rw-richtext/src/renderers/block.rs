//! Block-level renderers.

use crate::context::RenderContext;
use crate::element::{Container, ContainerKind, Leaf};
use crate::error::RenderError;
use crate::node::{Node, NodeKind};
use crate::registry::ObjectRenderer;

use super::expect_kind;

/// Renders a container kind that carries no attributes.
///
/// Used for document, paragraph, list item, table and definition list
/// parts. No invalid-input cases.
pub struct ContainerRenderer {
    kind: NodeKind,
    container: ContainerKind,
}

impl ContainerRenderer {
    #[must_use]
    pub fn new(kind: NodeKind, container: ContainerKind) -> Self {
        Self { kind, container }
    }
}

impl ObjectRenderer for ContainerRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &self.kind)?;
        ctx.within(Container::new(self.container.clone()), |ctx| {
            ctx.render_children(node)
        })
    }

    fn name(&self) -> &'static str {
        "ContainerRenderer"
    }
}

/// Renders headings.
///
/// Policy: a missing level or a level outside 1..=6 fails the render.
pub struct HeadingRenderer;

impl ObjectRenderer for HeadingRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Heading)?;
        let level = match node.attrs().level {
            Some(level @ 1..=6) => level,
            Some(level) => {
                return Err(ctx.invalid_input(node, &format!("heading level {level} out of range")));
            }
            None => return Err(ctx.invalid_input(node, "missing heading level")),
        };
        let heading = ContainerKind::Heading {
            level,
            id: node.attrs().extra.get("id").cloned(),
        };
        ctx.within(Container::new(heading), |ctx| ctx.render_children(node))
    }
}

/// Renders blockquotes, including GitHub-style alerts. No invalid-input cases.
pub struct BlockQuoteRenderer;

impl ObjectRenderer for BlockQuoteRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::BlockQuote)?;
        let quote = Container::new(ContainerKind::Quote {
            alert: node.attrs().alert,
        });
        ctx.within(quote, |ctx| ctx.render_children(node))
    }
}

/// Renders bullet and ordered lists. No invalid-input cases.
pub struct ListRenderer;

impl ObjectRenderer for ListRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::List)?;
        let list = Container::new(ContainerKind::List {
            start: node.attrs().start,
        });
        ctx.within(list, |ctx| ctx.render_children(node))
    }
}

/// Renders fenced and indented code blocks as a container holding one text leaf.
///
/// Policy: missing content renders an empty block.
pub struct CodeBlockRenderer;

impl ObjectRenderer for CodeBlockRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::CodeBlock)?;
        let block = Container::new(ContainerKind::CodeBlock {
            language: node.attrs().language.clone(),
        });
        ctx.within(block, |ctx| match node.text_content() {
            Some(code) if !code.is_empty() => ctx.write_leaf(Leaf::text(code)),
            _ => Ok(()),
        })
    }
}

/// Renders a thematic break as a rule leaf. No invalid-input cases.
pub struct ThematicBreakRenderer;

impl ObjectRenderer for ThematicBreakRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::ThematicBreak)?;
        ctx.write_leaf(Leaf::Rule)
    }
}

/// Renders table cells.
///
/// A cell is a header cell when the enclosing container is the table head.
/// Missing alignment means no alignment. No invalid-input cases.
pub struct TableCellRenderer;

impl ObjectRenderer for TableCellRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::TableCell)?;
        let header = matches!(ctx.current(), Some(ContainerKind::TableHead));
        let cell = Container::new(ContainerKind::TableCell {
            header,
            align: node.attrs().align.unwrap_or_default(),
        });
        ctx.within(cell, |ctx| ctx.render_children(node))
    }
}

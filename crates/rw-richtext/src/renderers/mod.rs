//! Built-in renderers, one per [`NodeKind`].
//!
//! Each renderer validates that it was handed the kind it is registered for,
//! builds its element, and either opens a container for the node's children
//! or writes a leaf. Invalid-input policies are documented per renderer.

mod block;
mod inline;

pub use block::{
    BlockQuoteRenderer, CodeBlockRenderer, ContainerRenderer, HeadingRenderer, ListRenderer,
    TableCellRenderer, ThematicBreakRenderer,
};
pub use inline::{
    BreakRenderer, HtmlRenderer, ImageRenderer, InlineCodeRenderer, LinkRenderer,
    StyledRunRenderer, TaskListMarkerRenderer, TextRenderer,
};

use crate::context::RenderContext;
use crate::element::{ContainerKind, InlineStyle};
use crate::error::RenderError;
use crate::node::{Node, NodeKind};
use crate::registry::RendererRegistry;

/// Register the built-in renderer for every non-custom kind.
pub(crate) fn register_defaults(registry: &mut RendererRegistry) {
    let simple = [
        (NodeKind::Document, ContainerKind::Document),
        (NodeKind::Paragraph, ContainerKind::Paragraph),
        (NodeKind::ListItem, ContainerKind::ListItem),
        (NodeKind::Table, ContainerKind::Table),
        (NodeKind::TableHead, ContainerKind::TableHead),
        (NodeKind::TableRow, ContainerKind::TableRow),
        (NodeKind::DefinitionList, ContainerKind::DefinitionList),
        (NodeKind::DefinitionTitle, ContainerKind::DefinitionTitle),
        (NodeKind::DefinitionDetails, ContainerKind::DefinitionDetails),
    ];
    for (kind, container) in simple {
        registry.register(kind.clone(), ContainerRenderer::new(kind, container));
    }

    registry.register(NodeKind::Heading, HeadingRenderer);
    registry.register(NodeKind::BlockQuote, BlockQuoteRenderer);
    registry.register(NodeKind::List, ListRenderer);
    registry.register(NodeKind::CodeBlock, CodeBlockRenderer);
    registry.register(NodeKind::ThematicBreak, ThematicBreakRenderer);
    registry.register(NodeKind::TableCell, TableCellRenderer);

    let styles = [
        (NodeKind::Emphasis, InlineStyle::Emphasis),
        (NodeKind::Strong, InlineStyle::Strong),
        (NodeKind::Strikethrough, InlineStyle::Strikethrough),
        (NodeKind::Superscript, InlineStyle::Superscript),
        (NodeKind::Subscript, InlineStyle::Subscript),
    ];
    for (kind, style) in styles {
        registry.register(kind.clone(), StyledRunRenderer::new(kind, style));
    }

    registry.register(NodeKind::Text, TextRenderer);
    registry.register(NodeKind::Code, InlineCodeRenderer);
    registry.register(NodeKind::Link, LinkRenderer);
    registry.register(NodeKind::Image, ImageRenderer);
    registry.register(NodeKind::SoftBreak, BreakRenderer::soft());
    registry.register(NodeKind::HardBreak, BreakRenderer::hard());
    registry.register(NodeKind::TaskListMarker, TaskListMarkerRenderer);
    registry.register(NodeKind::Html, HtmlRenderer);
}

/// Fail with [`RenderError::InvalidInput`] unless `node` is of kind `expected`.
fn expect_kind(
    ctx: &RenderContext<'_>,
    node: &Node,
    expected: &NodeKind,
) -> Result<(), RenderError> {
    if node.kind() == expected {
        Ok(())
    } else {
        Err(ctx.invalid_input(node, &format!("renderer for `{expected}` cannot render it")))
    }
}

/// Literal text of `node`, failing if it has none.
fn required_text<'n>(ctx: &RenderContext<'_>, node: &'n Node) -> Result<&'n str, RenderError> {
    node.text_content()
        .ok_or_else(|| ctx.invalid_input(node, "missing text content"))
}

//! Inline renderers.

use crate::context::RenderContext;
use crate::element::{Container, ContainerKind, InlineStyle, Leaf};
use crate::error::RenderError;
use crate::node::{Node, NodeKind};
use crate::registry::ObjectRenderer;

use super::{expect_kind, required_text};

/// Renders a text run as a text leaf.
///
/// Policy: missing text fails the render.
pub struct TextRenderer;

impl ObjectRenderer for TextRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Text)?;
        let text = required_text(ctx, node)?;
        ctx.write_leaf(Leaf::text(text))
    }
}

/// Renders inline code.
///
/// Policy: missing text fails the render.
pub struct InlineCodeRenderer;

impl ObjectRenderer for InlineCodeRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Code)?;
        let code = required_text(ctx, node)?.to_owned();
        ctx.write_leaf(Leaf::Code { code })
    }
}

/// Renders raw HTML passed through from the source.
///
/// Policy: missing text fails the render.
pub struct HtmlRenderer;

impl ObjectRenderer for HtmlRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Html)?;
        let html = required_text(ctx, node)?.to_owned();
        ctx.write_leaf(Leaf::RawHtml { html })
    }
}

/// Renders emphasis, strong, strikethrough, superscript and subscript as a
/// styled span. No invalid-input cases.
pub struct StyledRunRenderer {
    kind: NodeKind,
    style: InlineStyle,
}

impl StyledRunRenderer {
    #[must_use]
    pub fn new(kind: NodeKind, style: InlineStyle) -> Self {
        Self { kind, style }
    }
}

impl ObjectRenderer for StyledRunRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &self.kind)?;
        let span = Container::new(ContainerKind::Span { style: self.style });
        ctx.within(span, |ctx| ctx.render_children(node))
    }

    fn name(&self) -> &'static str {
        "StyledRunRenderer"
    }
}

/// Renders links as hyperlink containers.
///
/// Policy: a link without destination degrades: its children are written
/// directly into the enclosing container and a warning is recorded. Fails
/// in strict mode.
pub struct LinkRenderer;

impl ObjectRenderer for LinkRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Link)?;
        let Some(destination) = node.attrs().destination.clone() else {
            ctx.degrade(node, "missing destination, rendering link text only")?;
            return ctx.render_children(node);
        };
        let link = Container::new(ContainerKind::Hyperlink {
            destination,
            title: node.attrs().title.clone().filter(|t| !t.is_empty()),
        });
        ctx.within(link, |ctx| ctx.render_children(node))
    }
}

/// Renders images as image leaves. Alt text comes from the node's text.
///
/// Policy: an image without destination degrades to its alt text as a
/// plain text leaf (nothing if there is no alt text) and records a warning.
/// Fails in strict mode.
pub struct ImageRenderer;

impl ObjectRenderer for ImageRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::Image)?;
        let alt = node.text_content().unwrap_or_default().to_owned();
        let Some(source) = node.attrs().destination.clone() else {
            ctx.degrade(node, "missing destination, rendering alt text only")?;
            if alt.is_empty() {
                return Ok(());
            }
            return ctx.write_leaf(Leaf::Text { text: alt });
        };
        ctx.write_leaf(Leaf::Image {
            source,
            alt,
            title: node.attrs().title.clone().filter(|t| !t.is_empty()),
        })
    }
}

/// Renders soft and hard line breaks. No invalid-input cases.
pub struct BreakRenderer {
    hard: bool,
}

impl BreakRenderer {
    #[must_use]
    pub fn soft() -> Self {
        Self { hard: false }
    }

    #[must_use]
    pub fn hard() -> Self {
        Self { hard: true }
    }
}

impl ObjectRenderer for BreakRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        if self.hard {
            expect_kind(ctx, node, &NodeKind::HardBreak)?;
            ctx.write_leaf(Leaf::LineBreak)
        } else {
            expect_kind(ctx, node, &NodeKind::SoftBreak)?;
            ctx.write_leaf(Leaf::SoftBreak)
        }
    }
}

/// Renders task list markers as checkboxes.
///
/// Policy: a marker without state degrades to unchecked and records a
/// warning. Fails in strict mode.
pub struct TaskListMarkerRenderer;

impl ObjectRenderer for TaskListMarkerRenderer {
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        expect_kind(ctx, node, &NodeKind::TaskListMarker)?;
        let checked = match node.attrs().checked {
            Some(checked) => checked,
            None => {
                ctx.degrade(node, "missing checked state, rendering unchecked")?;
                false
            }
        };
        ctx.write_leaf(Leaf::Checkbox { checked })
    }
}

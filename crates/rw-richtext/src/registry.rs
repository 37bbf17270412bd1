//! Node kind to renderer table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::node::{Node, NodeKind};

/// Converts one node kind into output elements.
///
/// Container renderers push an element, render the node's children through
/// [`RenderContext::render_children`] and pop it again; the scoped
/// [`RenderContext::within`] does all three. Leaf renderers call
/// [`RenderContext::write_leaf`].
///
/// Renderers must not keep references to the context or to output elements
/// beyond the call. They are shared across concurrent renders, hence
/// `Send + Sync`.
///
/// Any `Fn(&mut RenderContext, &Node) -> Result<(), RenderError>` closure is
/// a renderer as well.
pub trait ObjectRenderer: Send + Sync {
    /// Render `node` into the context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidInput`] if the node does not match this
    /// renderer or lacks a required attribute, and propagates errors from
    /// rendering children.
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError>;

    /// Name for diagnostics. Defaults to the implementing type's name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> ObjectRenderer for F
where
    F: Fn(&mut RenderContext<'_>, &Node) -> Result<(), RenderError> + Send + Sync,
{
    fn write(&self, ctx: &mut RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        self(ctx, node)
    }
}

/// Registry mapping [`NodeKind`] to the [`ObjectRenderer`] responsible for it.
///
/// At most one renderer owns a kind. Registering a second renderer for a kind
/// replaces the first (last registration wins) and hands the old one back.
/// The registry holds no per-render state and is read-only during
/// traversal, so one instance can be shared across threads behind an `Arc`.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<NodeKind, Arc<dyn ObjectRenderer>>,
}

impl RendererRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in renderer for every non-custom kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::renderers::register_defaults(&mut registry);
        registry
    }

    /// Register `renderer` for `kind`.
    ///
    /// Returns the renderer previously registered for `kind`, if any.
    pub fn register<R>(&mut self, kind: NodeKind, renderer: R) -> Option<Arc<dyn ObjectRenderer>>
    where
        R: ObjectRenderer + 'static,
    {
        self.register_shared(kind, Arc::new(renderer))
    }

    /// Register an already shared renderer for `kind`.
    ///
    /// Useful when one renderer instance serves several kinds.
    pub fn register_shared(
        &mut self,
        kind: NodeKind,
        renderer: Arc<dyn ObjectRenderer>,
    ) -> Option<Arc<dyn ObjectRenderer>> {
        let name = renderer.name();
        let previous = self.renderers.insert(kind.clone(), renderer);
        if let Some(previous) = &previous {
            tracing::debug!(
                kind = %kind,
                previous = previous.name(),
                renderer = name,
                "Renderer override"
            );
        }
        previous
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<R>(mut self, kind: NodeKind, renderer: R) -> Self
    where
        R: ObjectRenderer + 'static,
    {
        self.register(kind, renderer);
        self
    }

    /// Remove the renderer for `kind`, returning it.
    pub fn unregister(&mut self, kind: &NodeKind) -> Option<Arc<dyn ObjectRenderer>> {
        self.renderers.remove(kind)
    }

    /// Look up the renderer for `kind`.
    #[must_use]
    pub fn resolve(&self, kind: &NodeKind) -> Option<&dyn ObjectRenderer> {
        self.renderers.get(kind).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, kind: &NodeKind) -> bool {
        self.renderers.contains_key(kind)
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&NodeKind> {
        let mut kinds: Vec<_> = self.renderers.keys().collect();
        kinds.sort();
        kinds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in self.kinds() {
            if let Some(renderer) = self.renderers.get(kind) {
                map.entry(&kind.name(), &renderer.name());
            }
        }
        map.finish()
    }
}

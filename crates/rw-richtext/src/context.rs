//! Per-traversal render state: the container stack and dispatcher.
//!
//! A [`RenderContext`] is created for one render request, walks exactly one
//! document and is then discarded. The top of its container stack is the
//! container that subsequently written leaves and pushed containers attach
//! to.
//!
//! Containers are owned by the stack while open. [`pop`](RenderContext::pop)
//! moves the finished container into its parent (the new top), or makes it
//! the output root when the stack becomes empty, so every element has
//! exactly one owner at all times.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::element::{Container, ContainerKind, Element, Leaf};
use crate::error::{NodePath, PathSegment, RenderError, RenderWarning};
use crate::node::Node;
use crate::registry::RendererRegistry;

/// Default limit for [`RenderOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for a single render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Turn every recoverable invalid-input case into a [`RenderError::InvalidInput`].
    pub strict: bool,
    /// Maximum node nesting depth, root included.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Cooperative cancellation flag, checked between sibling renders.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a [`RenderContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Created, nothing rendered yet.
    Idle,
    /// Inside [`RenderContext::render`].
    Descending,
    /// Render finished and the root was handed out.
    Completed,
    /// Render failed; the partial tree was discarded.
    Aborted,
}

/// Result of a successful render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutput {
    /// Root container of the output tree.
    pub root: Container,
    /// Recoverable problems, in document order.
    pub warnings: Vec<RenderWarning>,
}

/// Container stack and dispatcher for one document traversal.
pub struct RenderContext<'r> {
    registry: &'r RendererRegistry,
    options: RenderOptions,
    cancellation: Option<CancellationFlag>,
    stack: Vec<Container>,
    root: Option<Container>,
    path: Vec<PathSegment>,
    warnings: Vec<RenderWarning>,
    state: ContextState,
}

impl<'r> RenderContext<'r> {
    /// Create a context that resolves renderers from `registry`.
    #[must_use]
    pub fn new(registry: &'r RendererRegistry) -> Self {
        Self {
            registry,
            options: RenderOptions::default(),
            cancellation: None,
            stack: Vec::new(),
            root: None,
            path: Vec::new(),
            warnings: Vec::new(),
            state: ContextState::Idle,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Check `flag` between sibling renders and stop with
    /// [`RenderError::Cancelled`] once it is raised.
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Render a document rooted at `node`.
    ///
    /// The root renderer must produce exactly one top-level container. On
    /// failure the partial tree is discarded and the context is left
    /// [`Aborted`](ContextState::Aborted).
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`] raised during traversal, or
    /// [`RenderError::InvariantViolation`] if the context was already used,
    /// the stack is unbalanced afterwards, or no root was produced.
    pub fn render(&mut self, node: &Node) -> Result<RenderOutput, RenderError> {
        if self.state != ContextState::Idle {
            return Err(self.violation(format!(
                "render context is single-use (state: {:?})",
                self.state
            )));
        }
        self.state = ContextState::Descending;
        tracing::debug!(kind = %node.kind(), nodes = node.node_count(), "Rendering document");

        self.path.push(PathSegment {
            kind: node.kind().clone(),
            index: 0,
        });
        let result = self.dispatch(node).and_then(|()| self.finish());
        self.path.clear();

        match result {
            Ok(output) => {
                self.state = ContextState::Completed;
                tracing::debug!(warnings = output.warnings.len(), "Render completed");
                Ok(output)
            }
            Err(err) => {
                self.stack.clear();
                self.root = None;
                self.state = ContextState::Aborted;
                tracing::debug!(error = %err, "Render aborted");
                Err(err)
            }
        }
    }

    fn finish(&mut self) -> Result<RenderOutput, RenderError> {
        if !self.stack.is_empty() {
            return Err(self.violation(format!(
                "{} container(s) left open after render",
                self.stack.len()
            )));
        }
        let Some(root) = self.root.take() else {
            return Err(self.violation("root renderer produced no container".to_owned()));
        };
        Ok(RenderOutput {
            root,
            warnings: std::mem::take(&mut self.warnings),
        })
    }

    /// Resolve the renderer for `node` and invoke it.
    ///
    /// The caller has already pushed `node`'s path segment. There is no
    /// fallback renderer: an unregistered kind is an error.
    fn dispatch(&mut self, node: &Node) -> Result<(), RenderError> {
        if self.path.len() > self.options.max_depth {
            return Err(RenderError::DepthLimitExceeded {
                limit: self.options.max_depth,
                path: self.node_path(),
            });
        }
        let registry = self.registry;
        let Some(renderer) = registry.resolve(node.kind()) else {
            tracing::debug!(kind = %node.kind(), path = %self.node_path(), "Unregistered node kind");
            return Err(RenderError::UnregisteredKind {
                kind: node.kind().clone(),
                path: self.node_path(),
            });
        };
        tracing::trace!(kind = %node.kind(), depth = self.stack.len(), "Dispatch");
        renderer.write(self, node)
    }

    /// Render the children of `node` in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`render_child`](Self::render_child).
    pub fn render_children(&mut self, node: &Node) -> Result<(), RenderError> {
        for (index, child) in node.children().iter().enumerate() {
            self.render_child(index, child)?;
        }
        Ok(())
    }

    /// Render one child of the node currently being rendered.
    ///
    /// `index` is the child's position among its siblings and is used for
    /// the node path in errors and warnings. The cancellation flag is
    /// consulted first and the depth limit is enforced for `child`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Cancelled`], [`RenderError::DepthLimitExceeded`],
    /// [`RenderError::UnregisteredKind`], or whatever the child's renderer
    /// returns.
    pub fn render_child(&mut self, index: usize, child: &Node) -> Result<(), RenderError> {
        self.path.push(PathSegment {
            kind: child.kind().clone(),
            index,
        });
        let result = self.check_cancelled().and_then(|()| self.dispatch(child));
        self.path.pop();
        result
    }

    fn check_cancelled(&self) -> Result<(), RenderError> {
        match &self.cancellation {
            Some(flag) if flag.is_cancelled() => Err(RenderError::Cancelled {
                path: self.node_path(),
            }),
            _ => Ok(()),
        }
    }

    /// Open `container`: it becomes the attachment target until the matching
    /// [`pop`](Self::pop).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvariantViolation`] when pushing a second
    /// top-level container after the root was already produced.
    pub fn push(&mut self, container: Container) -> Result<(), RenderError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(self.violation(format!(
                "cannot push top-level `{}`: root already produced",
                container.kind.name()
            )));
        }
        self.stack.push(container);
        Ok(())
    }

    /// Close the top container and attach it to its parent, or make it the
    /// root if it was the outermost one.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvariantViolation`] if the stack is empty.
    pub fn pop(&mut self) -> Result<(), RenderError> {
        let Some(container) = self.stack.pop() else {
            return Err(self.violation("pop with empty container stack".to_owned()));
        };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(Element::Container(container)),
            None => self.root = Some(container),
        }
        Ok(())
    }

    /// Attach `leaf` to the top container.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvariantViolation`] if no container is open.
    pub fn write_leaf(&mut self, leaf: Leaf) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            Some(top) => {
                top.children.push(Element::Leaf(leaf));
                Ok(())
            }
            None => Err(self.violation("leaf written with no open container".to_owned())),
        }
    }

    /// Push `container`, run `body`, then pop.
    ///
    /// The stack is restored on every exit path. If `body` fails, everything
    /// it opened is discarded along with `container` and the error is passed
    /// on. If `body` succeeds but leaves the stack unbalanced, that is
    /// reported as an invariant violation.
    ///
    /// # Errors
    ///
    /// Returns the error from `body`, or [`RenderError::InvariantViolation`].
    pub fn within<F>(&mut self, container: Container, body: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut Self) -> Result<(), RenderError>,
    {
        let depth = self.stack.len();
        self.push(container)?;
        let result = body(self);

        let unbalanced = self.stack.len() != depth + 1;
        let violation = (result.is_ok() && unbalanced).then(|| {
            self.violation(format!(
                "unbalanced push/pop: expected depth {}, found {}",
                depth + 1,
                self.stack.len()
            ))
        });
        match (result, violation) {
            (Ok(()), None) => self.pop(),
            (Ok(()), Some(err)) | (Err(err), _) => {
                self.stack.truncate(depth);
                Err(err)
            }
        }
    }

    /// Record a recoverable problem with the node currently being rendered.
    pub fn warn(&mut self, message: impl Into<String>) {
        let warning = RenderWarning {
            path: self.node_path(),
            message: message.into(),
        };
        tracing::warn!(path = %warning.path, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Apply a renderer's "degrade and continue" policy.
    ///
    /// Records a warning and returns `Ok` normally; in strict mode returns
    /// the corresponding [`RenderError::InvalidInput`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidInput`] in strict mode.
    pub fn degrade(&mut self, node: &Node, message: &str) -> Result<(), RenderError> {
        if self.options.strict {
            return Err(self.invalid_input(node, message));
        }
        self.warn(format!("{}: {message}", node.kind()));
        Ok(())
    }

    /// Build an [`RenderError::InvalidInput`] for `node` at the current path.
    #[must_use]
    pub fn invalid_input(&self, node: &Node, message: &str) -> RenderError {
        RenderError::InvalidInput {
            kind: node.kind().clone(),
            path: self.node_path(),
            message: message.to_owned(),
        }
    }

    fn violation(&self, message: String) -> RenderError {
        tracing::error!(%message, depth = self.stack.len(), "Render invariant violated");
        RenderError::InvariantViolation {
            message,
            stack: self.stack_names(),
        }
    }

    /// Names of the open containers, bottom first.
    #[must_use]
    pub fn stack_names(&self) -> Vec<String> {
        self.stack.iter().map(|c| c.kind.name().to_owned()).collect()
    }

    /// Kind of the current attachment target.
    #[must_use]
    pub fn current(&self) -> Option<&ContainerKind> {
        self.stack.last().map(|c| &c.kind)
    }

    /// Number of open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn state(&self) -> ContextState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Path of the node currently being rendered.
    #[must_use]
    pub fn node_path(&self) -> NodePath {
        NodePath(self.path.clone())
    }

    #[must_use]
    pub fn registry(&self) -> &'r RendererRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::NodeKind;

    fn paragraph() -> Container {
        Container::new(ContainerKind::Paragraph)
    }

    #[test]
    fn test_push_pop_builds_tree() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);

        ctx.push(Container::new(ContainerKind::Document)).unwrap();
        ctx.push(paragraph()).unwrap();
        ctx.write_leaf(Leaf::text("hi")).unwrap();
        assert_eq!(ctx.depth(), 2);
        ctx.pop().unwrap();
        ctx.pop().unwrap();
        assert_eq!(ctx.depth(), 0);

        let root = ctx.root.take().unwrap();
        assert_eq!(root.kind, ContainerKind::Document);
        assert_eq!(root.plain_text(), "hi");
    }

    #[test]
    fn test_pop_empty_stack_is_violation() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        let err = ctx.pop().unwrap_err();
        assert!(matches!(err, RenderError::InvariantViolation { .. }));
    }

    #[test]
    fn test_write_leaf_without_container_is_violation() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        let err = ctx.write_leaf(Leaf::Rule).unwrap_err();
        assert!(matches!(err, RenderError::InvariantViolation { .. }));
    }

    #[test]
    fn test_second_root_is_violation() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        ctx.push(paragraph()).unwrap();
        ctx.pop().unwrap();
        let err = ctx.push(paragraph()).unwrap_err();
        assert!(matches!(err, RenderError::InvariantViolation { .. }));
    }

    #[test]
    fn test_violation_reports_stack() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        ctx.push(Container::new(ContainerKind::Document)).unwrap();
        ctx.push(paragraph()).unwrap();
        ctx.pop().unwrap();
        ctx.pop().unwrap();
        match ctx.pop().unwrap_err() {
            RenderError::InvariantViolation { stack, .. } => assert!(stack.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_within_restores_stack_on_error() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        ctx.push(Container::new(ContainerKind::Document)).unwrap();

        let result = ctx.within(paragraph(), |ctx| {
            ctx.push(paragraph())?;
            ctx.push(paragraph())?;
            Err(RenderError::Cancelled {
                path: NodePath::default(),
            })
        });

        assert!(matches!(result, Err(RenderError::Cancelled { .. })));
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_within_detects_unbalanced_body() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        ctx.push(Container::new(ContainerKind::Document)).unwrap();

        let err = ctx
            .within(paragraph(), |ctx| ctx.push(paragraph()))
            .unwrap_err();
        match err {
            RenderError::InvariantViolation { stack, .. } => {
                assert_eq!(stack, ["document", "paragraph", "paragraph"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_within_detects_extra_pop() {
        let registry = RendererRegistry::new();
        let mut ctx = RenderContext::new(&registry);
        ctx.push(Container::new(ContainerKind::Document)).unwrap();
        ctx.push(Container::new(ContainerKind::ListItem)).unwrap();

        let err = ctx.within(paragraph(), |ctx| {
            ctx.pop()?;
            ctx.pop()
        });
        assert!(matches!(err, Err(RenderError::InvariantViolation { .. })));
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_render_is_single_use() {
        let registry = RendererRegistry::with_defaults();
        let doc = Node::document([Node::paragraph([Node::text("x")])]);
        let mut ctx = RenderContext::new(&registry);

        ctx.render(&doc).unwrap();
        assert_eq!(ctx.state(), ContextState::Completed);

        let err = ctx.render(&doc).unwrap_err();
        assert!(matches!(err, RenderError::InvariantViolation { .. }));
    }

    #[test]
    fn test_render_leaf_root_is_violation() {
        let registry = RendererRegistry::with_defaults();
        let mut ctx = RenderContext::new(&registry);
        let err = ctx.render(&Node::text("loose")).unwrap_err();
        assert!(matches!(err, RenderError::InvariantViolation { .. }));
        assert_eq!(ctx.state(), ContextState::Aborted);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_unbalanced_root_renderer_is_caught() {
        let registry = RendererRegistry::new().with(
            NodeKind::Document,
            |ctx: &mut RenderContext<'_>, _node: &Node| {
                ctx.push(Container::new(ContainerKind::Document))
            },
        );
        let mut ctx = RenderContext::new(&registry);
        let err = ctx.render(&Node::document([])).unwrap_err();
        match err {
            RenderError::InvariantViolation { message, stack } => {
                assert!(message.contains("left open"));
                assert_eq!(stack, ["document"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_unregistered_kind_reports_path() {
        let registry = RendererRegistry::with_defaults();
        let doc = Node::document([
            Node::paragraph([Node::text("ok")]),
            Node::paragraph([Node::text("a"), Node::new(NodeKind::custom("embed"))]),
        ]);
        let mut ctx = RenderContext::new(&registry);
        match ctx.render(&doc).unwrap_err() {
            RenderError::UnregisteredKind { kind, path } => {
                assert_eq!(kind, NodeKind::custom("embed"));
                assert_eq!(path.to_string(), "document/paragraph[1]/embed[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.state(), ContextState::Aborted);
    }

    #[test]
    fn test_depth_limit() {
        let registry = RendererRegistry::with_defaults();
        let mut node = Node::text("deep");
        for _ in 0..10 {
            node = Node::emphasis([node]);
        }
        let doc = Node::document([Node::paragraph([node])]);

        let mut ctx = RenderContext::new(&registry).with_options(RenderOptions {
            max_depth: 5,
            ..RenderOptions::default()
        });
        let err = ctx.render(&doc).unwrap_err();
        assert!(matches!(
            err,
            RenderError::DepthLimitExceeded { limit: 5, .. }
        ));
    }

    #[test]
    fn test_cancellation_between_siblings() {
        let flag = CancellationFlag::new();
        let trip = flag.clone();
        let registry = RendererRegistry::with_defaults().with(
            NodeKind::custom("trip"),
            move |_ctx: &mut RenderContext<'_>, _node: &Node| {
                trip.cancel();
                Ok(())
            },
        );
        let doc = Node::document([
            Node::new(NodeKind::custom("trip")),
            Node::paragraph([Node::text("never")]),
        ]);

        let mut ctx = RenderContext::new(&registry).with_cancellation(flag);
        match ctx.render(&doc).unwrap_err() {
            RenderError::Cancelled { path } => {
                assert_eq!(path.to_string(), "document/paragraph[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_degrade_warns_or_fails() {
        let registry = RendererRegistry::new();
        let node = Node::new(NodeKind::Link);

        let mut lenient = RenderContext::new(&registry);
        lenient.degrade(&node, "missing destination").unwrap();
        assert_eq!(lenient.warnings.len(), 1);
        assert_eq!(lenient.warnings[0].message, "link: missing destination");

        let mut strict = RenderContext::new(&registry).with_options(RenderOptions {
            strict: true,
            ..RenderOptions::default()
        });
        let err = strict.degrade(&node, "missing destination").unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput { .. }));
    }
}

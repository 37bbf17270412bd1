//! Traversal properties exercised through the public API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rw_richtext::{
    Container, ContainerKind, ContextState, Element, InlineStyle, Leaf, MarkdownRenderer, Node,
    NodeKind, RenderContext, RenderError, RenderOptions, RendererRegistry,
};

/// Small deterministic generator (xorshift64) so failures reproduce.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Registry with a `box` kind that checks the stack against the node path
/// and a `fail` kind that always rejects its node.
fn checking_registry() -> RendererRegistry {
    RendererRegistry::with_defaults()
        .with(
            NodeKind::custom("box"),
            |ctx: &mut RenderContext<'_>, node: &Node| {
                if ctx.depth() + 1 != ctx.node_path().len() {
                    return Err(ctx.invalid_input(node, "stack out of step with path"));
                }
                let container = Container::new(ContainerKind::Custom {
                    name: "box".to_owned(),
                });
                ctx.within(container, |ctx| ctx.render_children(node))
            },
        )
        .with(
            NodeKind::custom("fail"),
            |ctx: &mut RenderContext<'_>, node: &Node| Err(ctx.invalid_input(node, "induced failure")),
        )
}

/// Random tree of `box` nodes under a document, with text leaves and
/// `fail` nodes at `fail_rate` percent.
fn random_tree(rng: &mut Rng, depth: usize, fail_rate: u64) -> Node {
    let children = (0..=rng.below(3)).map(|_| {
        let roll = rng.below(100);
        if roll < fail_rate {
            Node::new(NodeKind::custom("fail"))
        } else if depth > 0 && roll < 60 {
            random_tree(rng, depth - 1, fail_rate)
        } else {
            Node::text("x")
        }
    });
    Node::new(NodeKind::custom("box")).with_children(children.collect::<Vec<_>>())
}

fn contains_kind(node: &Node, kind: &NodeKind) -> bool {
    node.kind() == kind || node.children().iter().any(|c| contains_kind(c, kind))
}

#[test]
fn test_balanced_stack_after_success() {
    let renderer = MarkdownRenderer::new();
    let doc = renderer.parse("# T\n\n> - a\n>   1. *b* `c`\n\n| x |\n|---|\n| y |");
    let mut ctx = RenderContext::new(renderer.registry());
    ctx.render(&doc).unwrap();
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.state(), ContextState::Completed);
}

#[test]
fn test_unregistered_kind_produces_no_root() {
    let registry = RendererRegistry::with_defaults();
    let doc = Node::document([Node::paragraph([
        Node::text("before"),
        Node::new(NodeKind::custom("widget")),
    ])]);

    let mut ctx = RenderContext::new(&registry);
    let err = ctx.render(&doc).unwrap_err();
    match &err {
        RenderError::UnregisteredKind { kind, path } => {
            assert_eq!(kind, &NodeKind::custom("widget"));
            assert_eq!(path.to_string(), "document/paragraph[0]/widget[1]");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.state(), ContextState::Aborted);
}

#[test]
fn test_sibling_order_preserved() {
    let registry = RendererRegistry::with_defaults();
    let doc = Node::paragraph([Node::text("A"), Node::emphasis([Node::text("B")])]);
    let output = RenderContext::new(&registry).render(&doc).unwrap();

    assert_eq!(output.root.kind, ContainerKind::Paragraph);
    assert_eq!(
        output.root.children,
        vec![
            Element::Leaf(Leaf::text("A")),
            Element::Container(Container {
                kind: ContainerKind::Span {
                    style: InlineStyle::Emphasis,
                },
                children: vec![Element::Leaf(Leaf::text("B"))],
            }),
        ]
    );
}

#[test]
fn test_nested_list_depth() {
    let registry = RendererRegistry::with_defaults();
    let doc = Node::document([Node::list(
        None,
        [Node::list_item([Node::paragraph([Node::text("X")])])],
    )]);
    let output = RenderContext::new(&registry).render(&doc).unwrap();
    assert_eq!(output.root.container_depth(), 4);

    let innermost = output.root.walk().last().unwrap();
    assert_eq!(innermost.kind, ContainerKind::Paragraph);
    assert_eq!(innermost.children, vec![Element::Leaf(Leaf::text("X"))]);
}

#[test]
fn test_idempotent_across_contexts() {
    let renderer = MarkdownRenderer::new();
    let doc = renderer.parse(
        "# Title\n\nSome *styled* **text** with [a link](x.md).\n\n- [ ] task\n\n```rust\nfn f() {}\n```",
    );
    let first = RenderContext::new(renderer.registry()).render(&doc).unwrap();
    let second = RenderContext::new(renderer.registry()).render(&doc).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_override_is_last_registration_wins() {
    let mut registry = RendererRegistry::with_defaults();
    let previous = registry.register(
        NodeKind::Text,
        |ctx: &mut RenderContext<'_>, _: &Node| ctx.write_leaf(Leaf::text("first")),
    );
    assert!(previous.is_some());
    let previous = registry.register(
        NodeKind::Text,
        |ctx: &mut RenderContext<'_>, _: &Node| ctx.write_leaf(Leaf::text("second")),
    );
    assert!(previous.is_some());

    let renderer = MarkdownRenderer::new().with_registry(Arc::new(registry));
    for _ in 0..3 {
        let result = renderer.render_markdown("anything").unwrap();
        assert_eq!(result.root.plain_text(), "second");
    }
}

#[test]
fn test_random_deep_trees_with_induced_failures() {
    let registry = checking_registry();
    let fail_kind = NodeKind::custom("fail");
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    let (mut failed, mut succeeded) = (0, 0);

    for round in 0..200 {
        let fail_rate = if round % 2 == 0 { 0 } else { 5 };
        let tree = Node::document([random_tree(&mut rng, 12, fail_rate)]);
        let expect_failure = contains_kind(&tree, &fail_kind);

        let mut ctx = RenderContext::new(&registry);
        let result = ctx.render(&tree);
        assert_eq!(ctx.depth(), 0, "round {round}: stack not unwound");

        match result {
            Ok(output) => {
                assert!(!expect_failure, "round {round}: failure not reported");
                assert_eq!(ctx.state(), ContextState::Completed);
                assert_eq!(output.root.kind, ContainerKind::Document);
                succeeded += 1;
            }
            Err(err) => {
                assert!(expect_failure, "round {round}: unexpected error {err}");
                assert!(
                    matches!(&err, RenderError::InvalidInput { kind, .. } if *kind == fail_kind),
                    "round {round}: {err}"
                );
                assert_eq!(ctx.state(), ContextState::Aborted);
                failed += 1;
            }
        }
    }
    assert!(failed > 0 && succeeded > 0);
}

#[test]
fn test_depth_limit_on_deep_nesting() {
    let registry = checking_registry();
    let mut node = Node::text("bottom");
    for _ in 0..150 {
        node = Node::new(NodeKind::custom("box")).with_child(node);
    }
    let doc = Node::document([node]);

    let mut ctx = RenderContext::new(&registry).with_options(RenderOptions {
        max_depth: 64,
        ..RenderOptions::default()
    });
    let err = ctx.render(&doc).unwrap_err();
    assert!(matches!(err, RenderError::DepthLimitExceeded { limit: 64, .. }));
    assert_eq!(ctx.depth(), 0);

    let mut ctx = RenderContext::new(&registry).with_options(RenderOptions {
        max_depth: 1000,
        ..RenderOptions::default()
    });
    let output = ctx.render(&doc).unwrap();
    assert_eq!(output.root.container_depth(), 151);
}

#[test]
fn test_unbalanced_renderer_reported() {
    let registry = RendererRegistry::with_defaults().with(
        NodeKind::custom("leaky"),
        |ctx: &mut RenderContext<'_>, _: &Node| ctx.push(Container::new(ContainerKind::Paragraph)),
    );
    let doc = Node::document([Node::new(NodeKind::custom("leaky"))]);

    let mut ctx = RenderContext::new(&registry);
    let err = ctx.render(&doc).unwrap_err();
    match err {
        RenderError::InvariantViolation { stack, .. } => {
            assert_eq!(stack, ["document", "paragraph"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_deeply_nested_markdown_fails_cleanly() {
    let markdown = ">".repeat(50_000) + " x";
    let renderer = MarkdownRenderer::new();

    let doc = renderer.parse(&markdown);
    assert!(doc.node_count() > 50_000);
    drop(doc);

    let err = renderer.render_markdown(&markdown).unwrap_err();
    assert!(matches!(err, RenderError::DepthLimitExceeded { limit: 128, .. }));
}

/// Registry with a `wrap` kind whose renderer walks its own children
/// through [`RenderContext::render_child`].
fn wrapping_registry() -> RendererRegistry {
    RendererRegistry::with_defaults().with(
        NodeKind::custom("wrap"),
        |ctx: &mut RenderContext<'_>, node: &Node| {
            let container = Container::new(ContainerKind::Custom {
                name: "wrap".to_owned(),
            });
            ctx.within(container, |ctx| {
                for (index, child) in node.children().iter().enumerate() {
                    ctx.render_child(index, child)?;
                }
                Ok(())
            })
        },
    )
}

#[test]
fn test_custom_renderer_children_report_path() {
    let registry = wrapping_registry();
    let doc = Node::document([Node::new(NodeKind::custom("wrap"))
        .with_child(Node::new(NodeKind::custom("nope")))]);

    let mut ctx = RenderContext::new(&registry);
    assert!(ctx.registry().contains(&NodeKind::custom("wrap")));
    assert!(!ctx.registry().contains(&NodeKind::custom("nope")));
    let err = ctx.render(&doc).unwrap_err();
    match &err {
        RenderError::UnregisteredKind { kind, path } => {
            assert_eq!(kind, &NodeKind::custom("nope"));
            assert_eq!(path.to_string(), "document/wrap[0]/nope[0]");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_custom_renderer_children_respect_depth_limit() {
    let registry = wrapping_registry();
    let mut node = Node::text("bottom");
    for _ in 0..50 {
        node = Node::new(NodeKind::custom("wrap")).with_child(node);
    }
    let doc = Node::document([node]);

    let mut ctx = RenderContext::new(&registry).with_options(RenderOptions {
        max_depth: 5,
        ..RenderOptions::default()
    });
    let err = ctx.render(&doc).unwrap_err();
    assert!(matches!(err, RenderError::DepthLimitExceeded { limit: 5, .. }));
    assert_eq!(ctx.state(), ContextState::Aborted);

    let output = RenderContext::new(&registry).render(&doc).unwrap();
    assert_eq!(output.root.container_depth(), 51);
    assert_eq!(output.root.plain_text(), "bottom");
}

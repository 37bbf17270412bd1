//! Registry-driven markdown to rich-text rendering.
//!
//! A document is a tree of [`Node`]s. Rendering walks it depth-first: a
//! [`RenderContext`] resolves each node's [`ObjectRenderer`] from a shared
//! [`RendererRegistry`], and the renderer either opens a container (push,
//! render children, pop) or writes a leaf into the current container. The
//! result is an [`Element`] tree rooted at a single [`Container`], or one
//! [`RenderError`] describing why the traversal was aborted.
//!
//! # Architecture
//!
//! - [`markdown`]: builds node trees from pulldown-cmark events
//! - [`RendererRegistry`]: kind → renderer table, last registration wins
//! - [`RenderContext`]: per-document container stack and dispatcher
//! - [`renderers`]: built-in renderers for every standard node kind
//! - [`Outline`] and [`to_html`]: title, table of contents and HTML output
//! - [`MarkdownRenderer`]: facade tying the above together
//!
//! Host applications extend rendering by registering renderers for
//! [`NodeKind::Custom`] kinds or by overriding built-in ones.
//!
//! # Example
//!
//! ```
//! use rw_richtext::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new().with_title_extraction();
//! let result = renderer
//!     .render_markdown("# Hello\n\n## Usage\n\n**Bold** text")
//!     .unwrap();
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert_eq!(result.toc[0].id, "usage");
//! assert!(renderer.to_html(&result).contains("<strong>Bold</strong>"));
//! ```

mod config;
mod context;
mod element;
mod error;
mod html;
pub mod markdown;
mod node;
mod outline;
mod registry;
mod renderer;
pub mod renderers;

pub use config::{ConfigError, RenderConfig, RenderSection};
pub use context::{
    CancellationFlag, ContextState, DEFAULT_MAX_DEPTH, RenderContext, RenderOptions, RenderOutput,
};
pub use element::{Container, ContainerKind, Element, InlineStyle, Leaf};
pub use error::{NodePath, PathSegment, RenderError, RenderWarning};
pub use html::{Html, escape_html, resolve_link, to_html};
pub use node::{AlertKind, ColumnAlignment, Node, NodeAttrs, NodeKind};
pub use outline::{HeadingIds, Outline, TocEntry, slugify};
pub use registry::{ObjectRenderer, RendererRegistry};
pub use renderer::{MarkdownRenderer, RenderResult};

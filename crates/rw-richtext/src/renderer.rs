//! Markdown rendering facade.
//!
//! [`MarkdownRenderer`] ties the pieces together: it parses markdown with
//! pulldown-cmark, walks the node tree with a fresh [`RenderContext`] per
//! document, and collects the title and table of contents from the result.

use std::sync::Arc;

use pulldown_cmark::Options;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::RenderConfig;
use crate::context::{CancellationFlag, RenderContext, RenderOptions};
use crate::element::Container;
use crate::error::{RenderError, RenderWarning};
use crate::html::to_html;
use crate::markdown::{gfm_options, parse};
use crate::node::Node;
use crate::outline::{Outline, TocEntry};
use crate::registry::RendererRegistry;

/// Result of rendering one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    /// Root of the rendered element tree.
    pub root: Container,
    /// Title extracted from first H1 heading (if `extract_title` was enabled).
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Recoverable problems found while rendering.
    pub warnings: Vec<RenderWarning>,
}

/// Markdown to rich-text renderer.
///
/// Holds only shared configuration; every render gets its own context, so one
/// renderer can serve many documents, sequentially or in parallel.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    registry: Arc<RendererRegistry>,
    options: RenderOptions,
    gfm: bool,
    heading_attributes: bool,
    extract_title: bool,
    base_path: Option<String>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the built-in renderers and GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RendererRegistry::with_defaults()),
            options: RenderOptions::default(),
            gfm: true,
            heading_attributes: false,
            extract_title: false,
            base_path: None,
        }
    }

    /// Create a renderer from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        let section = &config.render;
        let mut renderer = Self::new()
            .with_gfm(section.gfm)
            .with_options(section.render_options());
        renderer.extract_title = section.extract_title;
        renderer.base_path.clone_from(&section.base_path);
        renderer
    }

    /// Use a custom registry, e.g. one with host renderers registered.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<RendererRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alerts (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Accept `{#id .class}` attribute blocks after headings. Explicit ids
    /// replace the generated slug in the TOC and HTML output.
    #[must_use]
    pub fn with_heading_attributes(mut self) -> Self {
        self.heading_attributes = true;
        self
    }

    /// Use the first H1 heading as the title and leave it out of the TOC.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Set base path for resolving relative links in HTML output.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RendererRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = if self.gfm {
            gfm_options()
        } else {
            Options::empty()
        };
        if self.heading_attributes {
            options |= Options::ENABLE_HEADING_ATTRIBUTES;
        }
        options
    }

    /// Parse markdown into a node tree using the configured parser options.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Node {
        parse(markdown, self.parser_options())
    }

    /// Parse and render markdown text.
    pub fn render_markdown(&self, markdown: &str) -> Result<RenderResult, RenderError> {
        self.render_document(&self.parse(markdown))
    }

    /// Render an already built node tree.
    pub fn render_document(&self, document: &Node) -> Result<RenderResult, RenderError> {
        self.render_with(RenderContext::new(&self.registry), document)
    }

    /// Render a node tree, stopping with [`RenderError::Cancelled`] once
    /// `flag` is raised.
    pub fn render_cancellable(
        &self,
        document: &Node,
        flag: CancellationFlag,
    ) -> Result<RenderResult, RenderError> {
        let ctx = RenderContext::new(&self.registry).with_cancellation(flag);
        self.render_with(ctx, document)
    }

    /// Render many markdown documents in parallel.
    ///
    /// Each document gets its own context; the registry is shared. Results
    /// are returned in input order, and a failure in one document does not
    /// affect the others.
    pub fn render_many<S>(&self, documents: &[S]) -> Vec<Result<RenderResult, RenderError>>
    where
        S: AsRef<str> + Sync,
    {
        tracing::debug!(count = documents.len(), "Rendering documents in parallel");
        documents
            .par_iter()
            .map(|markdown| self.render_markdown(markdown.as_ref()))
            .collect()
    }

    /// Serialize a render result to HTML, resolving links against the
    /// configured base path.
    #[must_use]
    pub fn to_html(&self, result: &RenderResult) -> String {
        to_html(&result.root, self.base_path.as_deref())
    }

    fn render_with(
        &self,
        ctx: RenderContext<'_>,
        document: &Node,
    ) -> Result<RenderResult, RenderError> {
        let mut ctx = ctx.with_options(self.options.clone());
        let output = ctx.render(document)?;
        let outline = Outline::from_root(&output.root, self.extract_title);
        Ok(RenderResult {
            root: output.root,
            title: outline.title,
            toc: outline.toc,
            warnings: output.warnings,
        })
    }
}

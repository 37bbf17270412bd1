//! HTML serialization of rendered element trees.
//!
//! Produces semantic HTML5:
//! - `<pre><code>` for code blocks
//! - `<blockquote>` for quotes, `<div class="alert ...">` for alerts
//! - `<thead>`/`<tbody>` for tables
//! - heading `id` attributes matching [`Outline`](crate::Outline)
//! - relative `.md` link resolution when a base path is given

use std::fmt::{self, Write};

use crate::element::{Container, ContainerKind, Element, InlineStyle, Leaf};
use crate::node::ColumnAlignment;
use crate::outline::HeadingIds;

/// Serialize a rendered tree to an HTML string.
#[must_use]
pub fn to_html(root: &Container, base_path: Option<&str>) -> String {
    Html::new(root).with_base_path(base_path).to_string()
}

/// Displayable HTML view of a rendered tree.
#[derive(Clone, Copy, Debug)]
pub struct Html<'a> {
    root: &'a Container,
    base_path: Option<&'a str>,
}

impl<'a> Html<'a> {
    #[must_use]
    pub fn new(root: &'a Container) -> Self {
        Self {
            root,
            base_path: None,
        }
    }

    /// Resolve relative `.md` links against this directory.
    #[must_use]
    pub fn with_base_path(mut self, base_path: Option<&'a str>) -> Self {
        self.base_path = base_path;
        self
    }
}

impl fmt::Display for Html<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = HtmlWriter {
            ids: HeadingIds::new(),
            base_path: self.base_path,
        };
        writer.container(self.root, f)
    }
}

struct HtmlWriter<'a> {
    ids: HeadingIds,
    base_path: Option<&'a str>,
}

impl HtmlWriter<'_> {
    fn children<W: Write>(&mut self, container: &Container, out: &mut W) -> fmt::Result {
        for child in &container.children {
            match child {
                Element::Container(child) => self.container(child, out)?,
                Element::Leaf(leaf) => leaf_html(leaf, out)?,
            }
        }
        Ok(())
    }

    fn wrapped<W: Write>(
        &mut self,
        tag: &str,
        container: &Container,
        out: &mut W,
    ) -> fmt::Result {
        write!(out, "<{tag}>")?;
        self.children(container, out)?;
        write!(out, "</{tag}>")
    }

    fn container<W: Write>(&mut self, container: &Container, out: &mut W) -> fmt::Result {
        match &container.kind {
            ContainerKind::Document => self.children(container, out),
            ContainerKind::Paragraph => self.wrapped("p", container, out),
            ContainerKind::Heading { level, id } => {
                let text = container.plain_text();
                let id = self.ids.heading_id(id.as_deref(), text.trim());
                write!(out, r#"<h{level} id="{}">"#, escape_html(&id))?;
                self.children(container, out)?;
                write!(out, "</h{level}>")
            }
            ContainerKind::Quote { alert: None } => {
                self.wrapped("blockquote", container, out)
            }
            ContainerKind::Quote { alert: Some(kind) } => {
                write!(
                    out,
                    r#"<div class="alert alert-{}"><div class="alert-title">{}</div><div class="alert-content">"#,
                    kind.as_str(),
                    kind.title()
                )?;
                self.children(container, out)?;
                out.write_str("</div></div>")
            }
            ContainerKind::List { start: None } => self.wrapped("ul", container, out),
            ContainerKind::List { start: Some(1) } => self.wrapped("ol", container, out),
            ContainerKind::List { start: Some(n) } => {
                write!(out, r#"<ol start="{n}">"#)?;
                self.children(container, out)?;
                out.write_str("</ol>")
            }
            ContainerKind::ListItem => self.wrapped("li", container, out),
            ContainerKind::CodeBlock { language } => {
                match language {
                    Some(lang) => write!(
                        out,
                        r#"<pre><code class="language-{}">"#,
                        escape_html(lang)
                    )?,
                    None => out.write_str("<pre><code>")?,
                }
                self.children(container, out)?;
                out.write_str("</code></pre>")
            }
            ContainerKind::Table => self.table(container, out),
            ContainerKind::TableHead => {
                out.write_str("<thead><tr>")?;
                self.children(container, out)?;
                out.write_str("</tr></thead>")
            }
            ContainerKind::TableRow => self.wrapped("tr", container, out),
            ContainerKind::TableCell { header, align } => {
                let tag = if *header { "th" } else { "td" };
                let style = match align {
                    ColumnAlignment::None => "",
                    ColumnAlignment::Left => r#" style="text-align:left""#,
                    ColumnAlignment::Center => r#" style="text-align:center""#,
                    ColumnAlignment::Right => r#" style="text-align:right""#,
                };
                write!(out, "<{tag}{style}>")?;
                self.children(container, out)?;
                write!(out, "</{tag}>")
            }
            ContainerKind::DefinitionList => self.wrapped("dl", container, out),
            ContainerKind::DefinitionTitle => self.wrapped("dt", container, out),
            ContainerKind::DefinitionDetails => self.wrapped("dd", container, out),
            ContainerKind::Span { style } => {
                let tag = match style {
                    InlineStyle::Emphasis => "em",
                    InlineStyle::Strong => "strong",
                    InlineStyle::Strikethrough => "del",
                    InlineStyle::Superscript => "sup",
                    InlineStyle::Subscript => "sub",
                };
                self.wrapped(tag, container, out)
            }
            ContainerKind::Hyperlink { destination, title } => {
                let href = match self.base_path {
                    Some(base) => resolve_link(destination, base),
                    None => destination.clone(),
                };
                write!(out, r#"<a href="{}""#, escape_html(&href))?;
                if let Some(title) = title {
                    write!(out, r#" title="{}""#, escape_html(title))?;
                }
                out.write_char('>')?;
                self.children(container, out)?;
                out.write_str("</a>")
            }
            ContainerKind::Custom { name } => {
                write!(out, r#"<div data-kind="{}">"#, escape_html(name))?;
                self.children(container, out)?;
                out.write_str("</div>")
            }
        }
    }

    fn table<W: Write>(&mut self, table: &Container, out: &mut W) -> fmt::Result {
        out.write_str("<table>")?;
        let mut in_body = false;
        for child in &table.children {
            if let Element::Container(row) = child
                && row.kind == ContainerKind::TableRow
                && !in_body
            {
                out.write_str("<tbody>")?;
                in_body = true;
            }
            match child {
                Element::Container(child) => self.container(child, out)?,
                Element::Leaf(leaf) => leaf_html(leaf, out)?,
            }
        }
        if in_body {
            out.write_str("</tbody>")?;
        }
        out.write_str("</table>")
    }
}

fn leaf_html<W: Write>(leaf: &Leaf, out: &mut W) -> fmt::Result {
    match leaf {
        Leaf::Text { text } => out.write_str(&escape_html(text)),
        Leaf::Code { code } => write!(out, "<code>{}</code>", escape_html(code)),
        Leaf::LineBreak => out.write_str("<br>"),
        Leaf::SoftBreak => out.write_char('\n'),
        Leaf::Rule => out.write_str("<hr>"),
        Leaf::Image { source, alt, title } => {
            write!(out, r#"<img src="{}""#, escape_html(source))?;
            if let Some(title) = title {
                write!(out, r#" title="{}""#, escape_html(title))?;
            }
            write!(out, r#" alt="{}">"#, escape_html(alt))
        }
        Leaf::Checkbox { checked: true } => {
            out.write_str(r#"<input type="checkbox" checked disabled> "#)
        }
        Leaf::Checkbox { checked: false } => out.write_str(r#"<input type="checkbox" disabled> "#),
        Leaf::RawHtml { html } => out.write_str(html),
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Resolve a link destination against the directory of the current document.
///
/// Relative `.md` links become clean absolute paths:
/// - `./sibling.md` → `/base/path/sibling`
/// - `../parent.md` → `/base/parent`
/// - `adr-101/index.md` → `/base/path/adr-101`
///
/// External links, fragments and non-markdown targets are returned unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
#[must_use]
pub fn resolve_link(url: &str, base_path: &str) -> String {
    const EXTERNAL: [&str; 5] = ["http://", "https://", "//", "mailto:", "tel:"];
    if url.starts_with('#') || EXTERNAL.iter().any(|prefix| url.starts_with(prefix)) {
        return url.to_owned();
    }

    let (path, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };
    if !path.ends_with(".md") {
        return url.to_owned();
    }

    let resolved = match path.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None => resolve_relative_path(path, base_path),
    };
    let clean = resolved.strip_suffix(".md").unwrap_or(&resolved);
    let clean = clean.strip_suffix("/index").unwrap_or(clean);

    format!("/{clean}{fragment}")
}

/// Join a relative path onto a base directory, applying `.` and `..`.
///
/// `..` never climbs above the base root.
fn resolve_relative_path(relative: &str, base: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }
    segments.join("/")
}

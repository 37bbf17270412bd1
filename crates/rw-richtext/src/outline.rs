//! Title extraction, heading ids and table of contents.

use std::collections::HashMap;

use serde::Serialize;

use crate::element::{Container, ContainerKind};

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Generator of unique heading ids within one document.
///
/// The first heading with a given slug gets the bare slug; repeats get
/// `-1`, `-2`, ... appended.
#[derive(Debug, Default)]
pub struct HeadingIds {
    counts: HashMap<String, usize>,
}

impl HeadingIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for a heading: `explicit` verbatim when present, otherwise the
    /// next unique slug of `text`. Explicit ids are reserved so later
    /// generated slugs do not collide with them.
    pub fn heading_id(&mut self, explicit: Option<&str>, text: &str) -> String {
        match explicit {
            Some(id) => {
                *self.counts.entry(id.to_owned()).or_default() += 1;
                id.to_owned()
            }
            None => self.next_id(text),
        }
    }

    /// Next unique id for a heading with the given text.
    pub fn next_id(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Title and table of contents of a rendered document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    /// Text of the first level-1 heading, when title extraction is enabled.
    pub title: Option<String>,
    /// Every heading except the extracted title, in document order.
    pub toc: Vec<TocEntry>,
}

impl Outline {
    /// Collect headings from a rendered tree.
    ///
    /// Ids are assigned to every heading, the title included, so they match
    /// the ids written by [`to_html`](crate::to_html).
    #[must_use]
    pub fn from_root(root: &Container, extract_title: bool) -> Self {
        let mut ids = HeadingIds::new();
        let mut outline = Self::default();

        for container in root.walk() {
            let ContainerKind::Heading { level, id } = &container.kind else {
                continue;
            };
            let level = *level;
            let text = container.plain_text();
            let title = text.trim();
            let id = ids.heading_id(id.as_deref(), title);

            if extract_title && level == 1 && outline.title.is_none() {
                outline.title = Some(title.to_owned());
                continue;
            }
            outline.toc.push(TocEntry {
                level,
                title: title.to_owned(),
                id,
            });
        }
        outline
    }
}

/// Convert text to URL-safe slug.
///
/// Lowercases ASCII alphanumerics, collapses runs of whitespace, dashes and
/// underscores into a single dash, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

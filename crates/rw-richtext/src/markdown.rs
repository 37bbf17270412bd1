//! Builds a [`Node`] tree from `pulldown-cmark` events.
//!
//! Parsing itself is done by pulldown-cmark; this module only turns its
//! flat start/end event stream into the typed tree the renderers walk.

use std::collections::BTreeMap;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::node::{AlertKind, ColumnAlignment, Node, NodeKind};

/// Parser options for GitHub Flavored Markdown: tables, strikethrough, task
/// lists and blockquote alerts.
///
/// Heading attributes (`## Setup {#setup}`) are not part of GFM. Add
/// [`Options::ENABLE_HEADING_ATTRIBUTES`] to keep explicit ids; they are
/// stored as the `id` entry of [`NodeAttrs::extra`](crate::NodeAttrs::extra).
#[must_use]
pub fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Parse `markdown` into a document node.
#[must_use]
pub fn parse(markdown: &str, options: Options) -> Node {
    from_events(Parser::new_ext(markdown, options))
}

/// Build a document node from a pulldown-cmark event stream.
///
/// Unbalanced streams are tolerated: frames still open at the end are
/// closed in order.
pub fn from_events<'a, I>(events: I) -> Node
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut builder = DocumentBuilder::new();
    for event in events {
        builder.process_event(event);
    }
    builder.finish()
}

/// Split a fence info string into language and `key=value` attributes.
///
/// Quotes around values are stripped. Parts without `=` are ignored.
#[must_use]
pub fn parse_fence_info(info: &str) -> (String, BTreeMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or_default().to_owned();

    let attrs = parts
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| {
            let value = value.trim_matches('"').trim_matches('\'');
            (key.to_owned(), value.to_owned())
        })
        .collect();

    (language, attrs)
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

enum Frame {
    /// A node being built.
    Node(Node),
    /// Tag whose children belong to the parent (HTML blocks, footnote definitions).
    Transparent,
    /// Tag whose content is dropped (metadata blocks).
    Skipped,
}

/// Column alignments and position within the current table.
#[derive(Default)]
struct TableState {
    alignments: Vec<ColumnAlignment>,
    cell_index: usize,
}

impl TableState {
    fn start(&mut self, alignments: Vec<ColumnAlignment>) {
        self.alignments = alignments;
        self.cell_index = 0;
    }

    fn start_row(&mut self) {
        self.cell_index = 0;
    }

    fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    fn current_alignment(&self) -> ColumnAlignment {
        self.alignments
            .get(self.cell_index)
            .copied()
            .unwrap_or_default()
    }
}

struct DocumentBuilder {
    root: Node,
    frames: Vec<Frame>,
    table: TableState,
    skipped: usize,
}

impl DocumentBuilder {
    fn new() -> Self {
        Self {
            root: Node::new(NodeKind::Document),
            frames: Vec::new(),
            table: TableState::default(),
            skipped: 0,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if self.skipped > 0 {
            match event {
                Event::Start(_) => self.open(Frame::Skipped),
                Event::End(_) => self.close(),
                _ => {}
            }
            return;
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.append(Node::new(NodeKind::Code).with_text(code.into_string()));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.append(Node::new(NodeKind::Html).with_text(html.into_string()));
            }
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.append(Node::new(NodeKind::HardBreak)),
            Event::Rule => self.append(Node::new(NodeKind::ThematicBreak)),
            Event::TaskListMarker(checked) => {
                self.append(Node::new(NodeKind::TaskListMarker).with_checked(checked));
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                tracing::debug!("Skipping unsupported markdown event");
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Paragraph => Node::new(NodeKind::Paragraph),
            Tag::Heading { level, id, .. } => {
                let heading = Node::new(NodeKind::Heading).with_level(heading_level_to_num(level));
                match id {
                    Some(id) => heading.with_attr("id", id.into_string()),
                    None => heading,
                }
            }
            Tag::BlockQuote(kind) => {
                let quote = Node::new(NodeKind::BlockQuote);
                match kind {
                    Some(kind) => quote.with_alert(AlertKind::from(kind)),
                    None => quote,
                }
            }
            Tag::CodeBlock(kind) => {
                let mut block = Node::new(NodeKind::CodeBlock).with_text(String::new());
                if let CodeBlockKind::Fenced(info) = kind {
                    let (language, attrs) = parse_fence_info(&info);
                    if !language.is_empty() {
                        block = block.with_language(language);
                    }
                    block.attrs_mut().extra = attrs;
                }
                block
            }
            Tag::List(start) => Node::list(start, []),
            Tag::Item => Node::new(NodeKind::ListItem),
            Tag::Table(alignments) => {
                self.table
                    .start(alignments.into_iter().map(ColumnAlignment::from).collect());
                Node::new(NodeKind::Table)
            }
            Tag::TableHead => {
                self.table.start_row();
                Node::new(NodeKind::TableHead)
            }
            Tag::TableRow => {
                self.table.start_row();
                Node::new(NodeKind::TableRow)
            }
            Tag::TableCell => {
                Node::new(NodeKind::TableCell).with_align(self.table.current_alignment())
            }
            Tag::Emphasis => Node::new(NodeKind::Emphasis),
            Tag::Strong => Node::new(NodeKind::Strong),
            Tag::Strikethrough => Node::new(NodeKind::Strikethrough),
            Tag::Superscript => Node::new(NodeKind::Superscript),
            Tag::Subscript => Node::new(NodeKind::Subscript),
            Tag::Link {
                dest_url, title, ..
            } => with_title(
                Node::new(NodeKind::Link).with_destination(dest_url.into_string()),
                &title,
            ),
            Tag::Image {
                dest_url, title, ..
            } => with_title(
                Node::new(NodeKind::Image).with_destination(dest_url.into_string()),
                &title,
            ),
            Tag::DefinitionList => Node::new(NodeKind::DefinitionList),
            Tag::DefinitionListTitle => Node::new(NodeKind::DefinitionTitle),
            Tag::DefinitionListDefinition => Node::new(NodeKind::DefinitionDetails),
            Tag::HtmlBlock | Tag::FootnoteDefinition(_) => {
                self.open(Frame::Transparent);
                return;
            }
            Tag::MetadataBlock(_) => {
                self.open(Frame::Skipped);
                return;
            }
        };
        self.open(Frame::Node(node));
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if tag == TagEnd::TableCell {
            self.table.next_cell();
        }
        self.close();
    }

    fn open(&mut self, frame: Frame) {
        if matches!(frame, Frame::Skipped) {
            self.skipped += 1;
        }
        self.frames.push(frame);
    }

    fn close(&mut self) {
        match self.frames.pop() {
            Some(Frame::Node(node)) => self.append(finalize(node)),
            Some(Frame::Skipped) => self.skipped -= 1,
            Some(Frame::Transparent) | None => {}
        }
    }

    /// Innermost node under construction.
    fn current(&mut self) -> &mut Node {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| match frame {
                Frame::Node(node) => Some(node),
                Frame::Transparent | Frame::Skipped => None,
            })
            .unwrap_or(&mut self.root)
    }

    fn append(&mut self, node: Node) {
        self.current().push_child(node);
    }

    fn text(&mut self, text: &str) {
        let current = self.current();
        if current.kind() == &NodeKind::CodeBlock {
            current.attrs_mut().text.get_or_insert_default().push_str(text);
            return;
        }
        // Adjacent text events are merged into one run.
        if let Some(last) = current.last_child_mut()
            && last.kind() == &NodeKind::Text
        {
            last.attrs_mut().text.get_or_insert_default().push_str(text);
            return;
        }
        current.push_child(Node::text(text));
    }

    fn soft_break(&mut self) {
        let current = self.current();
        if current.kind() == &NodeKind::CodeBlock {
            current.attrs_mut().text.get_or_insert_default().push('\n');
        } else {
            current.push_child(Node::new(NodeKind::SoftBreak));
        }
    }

    fn finish(mut self) -> Node {
        while !self.frames.is_empty() {
            self.close();
        }
        self.root
    }
}

fn with_title(node: Node, title: &str) -> Node {
    if title.is_empty() {
        node
    } else {
        node.with_title(title)
    }
}

/// Post-process a closed node. Images keep their alt text as plain text.
fn finalize(mut node: Node) -> Node {
    if node.kind() == &NodeKind::Image {
        let alt = node.plain_text();
        node.take_children();
        node.attrs_mut().text = Some(alt);
    }
    node
}

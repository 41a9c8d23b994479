//! The ordered, linked sequence of parsed input files.
//!
//! Nodes live in a single arena and link to their neighbours by index. The first node
//! appended is the head of the document.

use scraper::{Html, Selector};
use std::fmt;

/// Index of a node in a [`DocumentSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Markup dialect an input is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Html,
    Markdown,
}

impl Markup {
    /// Markdown for `.md` files, HTML for everything else (including URLs and stdin).
    pub fn for_name(name: &str) -> Markup {
        let ext = std::path::Path::new(name.split(['?', '#']).next().unwrap_or(name))
            .extension()
            .and_then(|e| e.to_str());
        match ext {
            Some("md") => Markup::Markdown,
            _ => Markup::Html,
        }
    }
}

/// Parsed content of one input file.
pub struct ContentTree {
    html: Html,
}

impl ContentTree {
    pub fn from_html(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// Render Markdown to HTML, then parse it.
    pub fn from_markdown(source: &str) -> Self {
        let options = pulldown_cmark::Options::ENABLE_TABLES
            | pulldown_cmark::Options::ENABLE_FOOTNOTES
            | pulldown_cmark::Options::ENABLE_STRIKETHROUGH
            | pulldown_cmark::Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = pulldown_cmark::Parser::new_ext(source, options);
        let mut rendered = String::with_capacity(source.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut rendered, parser);
        Self::from_html(&rendered)
    }

    pub fn parse(markup: Markup, source: &str) -> Self {
        match markup {
            Markup::Html => Self::from_html(source),
            Markup::Markdown => Self::from_markdown(source),
        }
    }

    /// Text of the `<title>` element, or of the first `<h1>` when there is no title.
    pub fn title(&self) -> Option<String> {
        ["title", "h1"].iter().find_map(|sel| {
            let selector = Selector::parse(sel).ok()?;
            let text: String = self.html.select(&selector).next()?.text().collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        })
    }
}

impl fmt::Debug for ContentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTree")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

/// One input file in the document sequence.
#[derive(Debug)]
pub struct DocumentNode {
    /// Name or URL as given; `None` for standard input.
    pub url: Option<String>,
    /// Base name used when rendering links to this file; empty for standard input.
    pub filename: String,
    /// Directory relative sub-resources are resolved against.
    pub base: String,
    pub content: ContentTree,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl DocumentNode {
    pub fn new(url: Option<String>, filename: String, base: String, content: ContentTree) -> Self {
        Self {
            url,
            filename,
            base,
            content,
            prev: None,
            next: None,
        }
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

/// Insertion-ordered, doubly linked sequence of document nodes.
#[derive(Debug, Default)]
pub struct DocumentSequence {
    nodes: Vec<DocumentNode>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl DocumentSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn get(&self, id: NodeId) -> Option<&DocumentNode> {
        self.nodes.get(id.0)
    }

    /// Link `node` after the current tail and return its id.
    pub fn push_back(&mut self, mut node: DocumentNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.prev = self.tail;
        node.next = None;
        if let Some(tail) = self.tail {
            self.nodes[tail.0].next = Some(id);
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.nodes.push(node);
        id
    }

    /// Walk the sequence from the head following the forward links.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            seq: self,
            cursor: self.head,
        }
    }

    /// Check that forward and back links agree, the walk visits every node once and
    /// head/tail are the ends.
    pub fn links_consistent(&self) -> bool {
        let mut expected_prev = None;
        let mut visited = 0;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(node) = self.get(id) else {
                return false;
            };
            if node.prev != expected_prev || visited >= self.nodes.len() {
                return false;
            }
            visited += 1;
            expected_prev = Some(id);
            cursor = node.next;
        }
        visited == self.nodes.len() && expected_prev == self.tail
    }
}

pub struct Iter<'a> {
    seq: &'a DocumentSequence,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DocumentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.seq.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}

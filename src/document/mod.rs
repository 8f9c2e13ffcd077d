//! # Structured Documents
//!
//! A parsed HTML response plus selections over it. The parsed tree is shared
//! read-only between every selection taken from it; a selection is only a
//! list of node ids, so narrowing one never disturbs another.

mod pretty;

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Reasons a body or selector could not be used.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse `body` as HTML. Bytes that are not UTF-8 are decoded lossily,
    /// so legacy-encoded pages stay queryable.
    pub fn parse(body: &[u8]) -> Result<Self, DocumentError> {
        let source = String::from_utf8_lossy(body);
        debug!(bytes = body.len(), "parsing response body as HTML");
        Ok(Self {
            html: Html::parse_document(&source),
        })
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.html.tree.nodes().count())
            .finish()
    }
}

/// An ordered set of nodes within one [`Document`].
#[derive(Clone)]
pub struct Selection {
    doc: Rc<Document>,
    nodes: Vec<NodeId>,
}

impl Selection {
    /// Select the document node itself.
    pub fn root(doc: Rc<Document>) -> Self {
        let root = doc.html.tree.root().id();
        Self {
            doc,
            nodes: vec![root],
        }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.doc
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Descendants of the selected nodes that match `selector`, in document
    /// order and without duplicates. The selected nodes themselves are never
    /// part of the result.
    pub fn find(&self, selector: &str) -> Result<Selection, DocumentError> {
        let compiled = Selector::parse(selector).map_err(|err| DocumentError::Selector {
            selector: selector.to_string(),
            reason: err.to_string(),
        })?;

        let html = &self.doc.html;
        let mut matched = HashSet::new();
        for id in &self.nodes {
            let Some(node) = html.tree.get(*id) else {
                continue;
            };
            match ElementRef::wrap(node) {
                Some(element) => matched.extend(element.select(&compiled).map(|el| el.id())),
                None => matched.extend(html.select(&compiled).map(|el| el.id())),
            }
        }

        let nodes: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .map(|node| node.id())
            .filter(|id| matched.contains(id))
            .collect();
        trace!(
            selector,
            scope = self.nodes.len(),
            matches = nodes.len(),
            "evaluated selector"
        );

        Ok(Selection {
            doc: Rc::clone(&self.doc),
            nodes,
        })
    }

    /// Concatenated text of every selected node and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in self.node_refs() {
            for child in node.descendants() {
                if let Some(text) = child.value().as_text() {
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// Attribute value from the first selected element, if it has one.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.elements()
            .next()
            .and_then(|element| element.value().attr(name).map(str::to_string))
    }

    /// Selected element nodes. The document node of a root selection is
    /// skipped.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.node_refs().filter_map(ElementRef::wrap)
    }

    /// Serialized markup of the selection, one node after another.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        for node in self.node_refs() {
            match ElementRef::wrap(node) {
                Some(element) => out.push_str(&element.html()),
                None => out.push_str(&self.doc.html.html()),
            }
        }
        out
    }

    /// Indented markup of the selection for failure reports.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for node in self.node_refs() {
            pretty::write_node(&mut out, node, 0);
        }
        out
    }

    fn node_refs(&self) -> impl Iterator<Item = ego_tree::NodeRef<'_, scraper::Node>> + '_ {
        self.nodes
            .iter()
            .filter_map(|id| self.doc.html.tree.get(*id))
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("len", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(markup: &str) -> Selection {
        Selection::root(Rc::new(Document::parse(markup.as_bytes()).unwrap()))
    }

    #[test]
    fn root_selection_holds_the_document_node() {
        let root = select(r#"<p class="bar">foo</p>"#);
        assert_eq!(root.len(), 1);
        assert_eq!(root.text(), "foo");
        assert!(root.outer_html().contains("<html>"));
        assert_eq!(root.attr("class"), None);
    }

    #[test]
    fn find_returns_matches_in_document_order() {
        let root = select("<div><p>one</p><span><p>two</p></span></div><p>three</p>");
        let paragraphs = root.find("p").unwrap();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs.text(), "onetwothree");
    }

    #[test]
    fn find_is_scoped_to_the_selection() {
        let root = select(r#"<div id="a"><p>in</p></div><p>out</p>"#);
        let scoped = root.find("#a").unwrap().find("p").unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped.text(), "in");
    }

    #[test]
    fn find_excludes_the_scope_itself_and_dedupes() {
        let root = select("<div><div><p>x</p></div></div>");
        let divs = root.find("div").unwrap();
        assert_eq!(divs.len(), 2);

        // Both divs contain the same paragraph; it is reported once.
        let paragraphs = divs.find("p").unwrap();
        assert_eq!(paragraphs.len(), 1);

        // The outer div is not its own descendant.
        assert_eq!(divs.find("div").unwrap().len(), 1);
    }

    #[test]
    fn empty_match_is_an_empty_selection() {
        let root = select("<p>foo</p>");
        assert!(root.find("table").unwrap().is_empty());
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let err = select("<p></p>").find("p[").unwrap_err();
        assert!(matches!(err, DocumentError::Selector { .. }));
        assert!(err.to_string().contains("p["));
    }

    #[test]
    fn attr_reads_first_element() {
        let root = select(r#"<a href="/one">1</a><a href="/two">2</a><a>3</a>"#);
        let links = root.find("a").unwrap();
        assert_eq!(links.attr("href").as_deref(), Some("/one"));
        assert_eq!(links.attr("title"), None);
    }

    #[test]
    fn latin1_body_still_parses() {
        let doc = Document::parse(b"<p>caf\xe9</p>").unwrap();
        let paragraphs = Selection::root(Rc::new(doc)).find("p").unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs.text(), "caf\u{fffd}");
    }

    #[test]
    fn element_outer_html_is_serialized() {
        let root = select(r#"<ul><li class="x">a</li><li>b</li></ul>"#);
        let items = root.find("li").unwrap();
        assert_eq!(items.outer_html(), r#"<li class="x">a</li><li>b</li>"#);
    }
}

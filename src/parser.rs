//! The template parser boundary, plus the post-parse normalization the
//! core relies on.
//!
//! Tokenizing markup text is an external concern; whatever parser is
//! plugged in, `normalize` establishes the tree invariants the resolver
//! and the render engine assume: `remove`-marker subtrees are gone, and
//! EMPTY elements have no children.

use crate::document::Document;
use crate::element::{Element, Node};
use crate::error::ParseError;
use crate::markers::{self, MarkerTag};

pub trait TemplateParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Document, ParseError>;
}

/// Establish tree invariants on freshly parsed input. Idempotent.
pub fn normalize(doc: &mut Document) {
    match &mut doc.root {
        Some(root) if markers::is_marker(root, MarkerTag::Remove) => {
            doc.root = None;
        }
        Some(root) => normalize_element(root),
        None => (),
    }
}

fn normalize_element(elem: &mut Element) {
    if elem.kind == crate::element::ElementKind::Empty {
        elem.children.clear();
        return;
    }
    elem.children.retain(|c| match c {
        Node::Element(e) => !markers::is_marker(e, MarkerTag::Remove),
        Node::Text(_) => true,
    });
    for child in &mut elem.children {
        if let Node::Element(e) = child {
            normalize_element(e);
        }
    }
}

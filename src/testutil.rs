//! Shared fixtures for the test modules: element tree builders, canned
//! components, and pluggable parser/markup-source stand-ins.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kstring::KString;

use crate::component::{Component, Rendered};
use crate::document::Document;
use crate::element::{Element, Node, QName};
use crate::error::{MarkupError, ParseError};
use crate::markers::{marker_attr_name, marker_name, MarkerAttr, MarkerTag};
use crate::parser::TemplateParser;
use crate::registry::ClassId;
use crate::render::{MarkupSource, RenderCx};

pub fn t0(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn el(tag: &str) -> Element {
    Element::new(QName::local(tag))
}

pub fn mel(tag: MarkerTag) -> Element {
    Element::new(marker_name(tag))
}

pub fn with_id(mut e: Element, id: &str) -> Element {
    e.set_attr(marker_attr_name(MarkerAttr::Id), KString::from_ref(id));
    e
}

pub fn with_marker_attr(mut e: Element, attr: MarkerAttr, v: &str) -> Element {
    e.set_attr(marker_attr_name(attr), KString::from_ref(v));
    e
}

pub fn with_child(mut e: Element, c: Element) -> Element {
    e.push_element(c);
    e
}

pub fn with_text(mut e: Element, s: &str) -> Element {
    e.push_text(s);
    e
}

/// Child local names in order; text nodes show up as `#content`.
pub fn child_names(e: &Element) -> Vec<String> {
    e.children
        .iter()
        .map(|n| match n {
            Node::Element(c) => c.name.local_name().to_string(),
            Node::Text(t) => format!("#{}", t.as_str()),
        })
        .collect()
}

/// Component with a canned render result.
pub struct Canned {
    pub id: KString,
    pub visible: bool,
    pub body_only: bool,
    pub out: Rendered,
}

impl Canned {
    pub fn new(id: &str, out: Rendered) -> Canned {
        Canned {
            id: KString::from_ref(id),
            visible: true,
            body_only: false,
            out,
        }
    }
}

impl Component for Canned {
    fn id(&self) -> &str {
        &self.id
    }
    fn visible(&self) -> bool {
        self.visible
    }
    fn body_only(&self) -> bool {
        self.body_only
    }
    fn render(&self, _elem: Element, _cx: &RenderCx<'_>) -> Result<Rendered, MarkupError> {
        Ok(self.out.clone())
    }
}

/// Markup source for renders that never reach associated markup.
pub struct NullSource;

impl MarkupSource for NullSource {
    fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError> {
        Err(MarkupError::ClassNotFound(class))
    }
}

/// Markup source serving prebuilt documents.
#[derive(Default)]
pub struct MapSource {
    pub docs: HashMap<ClassId, Document>,
}

impl MarkupSource for MapSource {
    fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError> {
        self.docs
            .get(&class)
            .map(Document::deep_clone)
            .ok_or(MarkupError::ClassNotFound(class))
    }
}

/// Parser mapping whole source strings to prebuilt documents, so tests
/// control the parsed tree without a real tokenizer.
#[derive(Default)]
pub struct MapParser {
    pub docs: HashMap<String, Document>,
}

impl TemplateParser for MapParser {
    fn parse(&self, source: &str) -> Result<Document, ParseError> {
        self.docs.get(source).cloned().ok_or_else(|| ParseError {
            line: 1,
            col: 1,
            msg: format!("unknown fixture source {source:?}"),
        })
    }
}

//! The fixed marker vocabulary: namespace-qualified tags and attributes
//! that the engine treats as structural rather than literal output.
//!
//! Dispatch is a closed enum resolved once per element; anything in the
//! marker namespace that is not in the vocabulary is a hard error at
//! the caller.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::element::{Element, QName};

/// Namespace URI hosting the structural markers. Must match the dialect
/// in use bit-exactly.
pub const MARKER_NS: &str = "urn:amarkup:markup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTag {
    /// Subclass content region in markup inheritance.
    Extend,
    /// `child`: the superclass's insertion point for extend content.
    InsertPoint,
    Head,
    Container,
    Enclosure,
    Message,
    /// Pruned at parse time; never reaches resolution or rendering.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAttr {
    /// Component id reference.
    Id,
    /// Child-component reference on an enclosure.
    Child,
    /// Localization key on a message.
    Key,
}

lazy_static! {
    static ref MARKER_TAGS: HashMap<&'static str, MarkerTag> = {
        let mut m = HashMap::new();
        m.insert("extend", MarkerTag::Extend);
        m.insert("child", MarkerTag::InsertPoint);
        m.insert("head", MarkerTag::Head);
        m.insert("container", MarkerTag::Container);
        m.insert("enclosure", MarkerTag::Enclosure);
        m.insert("message", MarkerTag::Message);
        m.insert("remove", MarkerTag::Remove);
        m
    };
    static ref MARKER_ATTRS: HashMap<&'static str, MarkerAttr> = {
        let mut m = HashMap::new();
        m.insert("id", MarkerAttr::Id);
        m.insert("child", MarkerAttr::Child);
        m.insert("key", MarkerAttr::Key);
        m
    };
}

impl MarkerTag {
    pub fn from_local(local: &str) -> Option<MarkerTag> {
        MARKER_TAGS.get(local).copied()
    }

    pub fn local(self) -> &'static str {
        match self {
            MarkerTag::Extend => "extend",
            MarkerTag::InsertPoint => "child",
            MarkerTag::Head => "head",
            MarkerTag::Container => "container",
            MarkerTag::Enclosure => "enclosure",
            MarkerTag::Message => "message",
            MarkerTag::Remove => "remove",
        }
    }
}

impl MarkerAttr {
    pub fn from_local(local: &str) -> Option<MarkerAttr> {
        MARKER_ATTRS.get(local).copied()
    }

    pub fn local(self) -> &'static str {
        match self {
            MarkerAttr::Id => "id",
            MarkerAttr::Child => "child",
            MarkerAttr::Key => "key",
        }
    }
}

pub fn is_marker_name(name: &QName) -> bool {
    name.ns() == Some(MARKER_NS)
}

/// `Some(tag)` if `elem` is a known marker element; `None` if it is not
/// in the marker namespace at all. An unknown name *within* the
/// namespace is reported by the caller (the distinction matters there).
pub fn tag_of(elem: &Element) -> Option<MarkerTag> {
    if is_marker_name(&elem.name) {
        MarkerTag::from_local(elem.name.local_name())
    } else {
        None
    }
}

pub fn is_marker(elem: &Element, tag: MarkerTag) -> bool {
    tag_of(elem) == Some(tag)
}

/// Qualified name of a marker tag; handy for building templates.
pub fn marker_name(tag: MarkerTag) -> QName {
    QName::namespaced(MARKER_NS, tag.local())
}

/// Qualified name of a marker attribute.
pub fn marker_attr_name(attr: MarkerAttr) -> QName {
    QName::namespaced(MARKER_NS, attr.local())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_vocabulary() {
        assert_eq!(MarkerTag::from_local("extend"), Some(MarkerTag::Extend));
        assert_eq!(MarkerTag::from_local("child"), Some(MarkerTag::InsertPoint));
        assert_eq!(MarkerTag::from_local("panel"), None);
        assert_eq!(MarkerAttr::from_local("key"), Some(MarkerAttr::Key));
        assert_eq!(MarkerAttr::from_local("keys"), None);
        for t in [
            MarkerTag::Extend,
            MarkerTag::InsertPoint,
            MarkerTag::Head,
            MarkerTag::Container,
            MarkerTag::Enclosure,
            MarkerTag::Message,
            MarkerTag::Remove,
        ] {
            assert_eq!(MarkerTag::from_local(t.local()), Some(t));
        }
    }

    #[test]
    fn t_tag_of() {
        let e = Element::new(marker_name(MarkerTag::Enclosure));
        assert_eq!(tag_of(&e), Some(MarkerTag::Enclosure));
        assert!(is_marker(&e, MarkerTag::Enclosure));
        let plain = Element::new(QName::local("enclosure"));
        assert_eq!(tag_of(&plain), None);
        // marker-namespace URI comparison is case-insensitive
        let upper = Element::new(QName::namespaced("URN:AMARKUP:MARKUP", "head"));
        assert_eq!(tag_of(&upper), Some(MarkerTag::Head));
    }
}

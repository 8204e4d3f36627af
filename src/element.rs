//! The element tree: tagged, namespaced nodes with ordered attributes
//! and mixed-content children.
//!
//! Elements are value-like: the tree is fully owned, so `Clone` is a
//! deep copy and copies never alias mutable state. Text fragments are
//! immutable (`KString`).

use kstring::KString;

/// Namespace-qualified name. The namespace URI is lowercase-normalized
/// at construction, which makes comparisons case-insensitive in the URI
/// part as required; local names compare verbatim. A name without a
/// namespace acts as an opaque key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    ns: Option<KString>,
    local: KString,
}

impl QName {
    pub fn local(name: &str) -> QName {
        QName {
            ns: None,
            local: KString::from_ref(name),
        }
    }

    pub fn namespaced(ns: &str, name: &str) -> QName {
        QName {
            ns: Some(KString::from_string(ns.to_ascii_lowercase())),
            local: KString::from_ref(name),
        }
    }

    pub fn ns(&self) -> Option<&str> {
        self.ns.as_ref().map(|s| s.as_str())
    }

    pub fn local_name(&self) -> &str {
        self.local.as_str()
    }
}

/// OPEN elements have a body (separate start/end tags); EMPTY elements
/// are self-closing and never carry children once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Open,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(KString),
    Element(Element),
}

impl Node {
    pub fn text(s: &str) -> Node {
        Node::Text(KString::from_ref(s))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }
}

/// Invalid trees (an `Empty` element with children) can be built via the
/// public fields; `crate::parser::normalize` re-establishes the
/// invariants for parsed input, and the engine never produces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub kind: ElementKind,
    /// Ordered; keyed by `QName` (URI part case-insensitive via
    /// normalization).
    pub attrs: Vec<(QName, KString)>,
    /// Namespace declarations scoped to this element: prefix to URI,
    /// empty prefix meaning the default namespace. Ancestor scoping is
    /// the parser's concern.
    pub namespaces: Vec<(KString, KString)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: QName) -> Element {
        Element {
            name,
            kind: ElementKind::Open,
            attrs: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn new_empty(name: QName) -> Element {
        Element {
            kind: ElementKind::Empty,
            ..Element::new(name)
        }
    }

    pub fn attr(&self, key: &QName) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value in place if the key exists, otherwise append.
    pub fn set_attr(&mut self, key: QName, val: KString) {
        if let Some((_, v)) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            *v = val;
        } else {
            self.attrs.push((key, val));
        }
    }

    pub fn remove_attr(&mut self, key: &QName) -> Option<KString> {
        let i = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(i).1)
    }

    pub fn declare_ns(&mut self, prefix: &str, uri: &str) {
        self.namespaces
            .push((KString::from_ref(prefix), KString::from_ref(uri)));
    }

    pub fn ns_decl(&self, prefix: &str) -> Option<&str> {
        // Later declarations shadow earlier ones for the same prefix.
        self.namespaces
            .iter()
            .rev()
            .find(|(p, _)| p.as_str() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn push_text(&mut self, s: &str) {
        self.children.push(Node::text(s));
    }

    pub fn push_element(&mut self, e: Element) {
        self.children.push(Node::Element(e));
    }

    /// Copies attributes, namespace declarations and all descendants.
    /// Identical to `clone`; kept as a named operation because callers
    /// rely on the copy not aliasing the original.
    pub fn deep_clone(&self) -> Element {
        self.clone()
    }

    /// First element in this subtree (self included, depth-first) for
    /// which `pred` holds.
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(|c| c.as_element())
            .find_map(|e| e.find(pred))
    }

    /// Count of elements in this subtree (self included) for which
    /// `pred` holds.
    pub fn count(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        let here = usize::from(pred(self));
        here + self
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .map(|e| e.count(pred))
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_qname_ns_case() {
        let a = QName::namespaced("URN:Example:NS", "div");
        let b = QName::namespaced("urn:example:ns", "div");
        let c = QName::namespaced("urn:example:ns", "DIV");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn t_attr_ops() {
        let mut e = Element::new(QName::local("div"));
        e.set_attr(QName::local("class"), KString::from_static("x"));
        e.set_attr(QName::local("id"), KString::from_static("a"));
        e.set_attr(QName::local("class"), KString::from_static("y"));
        assert_eq!(e.attr(&QName::local("class")), Some("y"));
        // order preserved across replacement
        assert_eq!(e.attrs[0].0, QName::local("class"));
        assert_eq!(e.remove_attr(&QName::local("id")).as_deref(), Some("a"));
        assert_eq!(e.attr(&QName::local("id")), None);
    }

    #[test]
    fn t_ns_decl_shadowing() {
        let mut e = Element::new(QName::local("div"));
        e.declare_ns("", "urn:one");
        e.declare_ns("m", "urn:two");
        e.declare_ns("", "urn:three");
        assert_eq!(e.ns_decl(""), Some("urn:three"));
        assert_eq!(e.ns_decl("m"), Some("urn:two"));
        assert_eq!(e.ns_decl("x"), None);
    }

    #[test]
    fn t_deep_clone_no_aliasing() {
        let mut inner = Element::new(QName::local("span"));
        inner.push_text("hello");
        let mut e = Element::new(QName::local("div"));
        e.push_element(inner);
        let mut copy = e.deep_clone();
        copy.children[0]
            .as_element_mut()
            .unwrap()
            .push_text("more");
        assert_eq!(e.children[0].as_element().unwrap().children.len(), 1);
        assert_eq!(copy.children[0].as_element().unwrap().children.len(), 2);
    }

    #[test]
    fn t_find() {
        let mut e = Element::new(QName::local("div"));
        let mut p = Element::new(QName::local("p"));
        p.push_element(Element::new(QName::local("em")));
        e.push_element(p);
        assert!(e
            .find(&|x| x.name.local_name() == "em")
            .is_some());
        assert!(e.find(&|x| x.name.local_name() == "table").is_none());
        assert_eq!(e.count(&|x| x.name.ns().is_none()), 3);
    }
}

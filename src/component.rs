//! The live component tree the render engine drives.
//!
//! Ownership flows strictly downward: a container exclusively owns its
//! children and no parent back-pointer is materialized (the engine only
//! ever walks top-down). Components are constructed and attached before
//! any render call and torn down by ordinary ownership release.

use kstring::KString;

use crate::element::{Element, Node};
use crate::error::MarkupError;
use crate::registry::ClassId;
use crate::render::{render_container, RenderCx};

/// The three-way result of a render hook.
#[derive(Debug, Clone)]
pub enum Rendered {
    /// The template element is deleted.
    Removed,
    /// The template element is replaced in place.
    Node(Node),
    /// The template element expands into a sequence of siblings
    /// (possibly empty).
    Expanded(Vec<Node>),
}

/// A side-behavior attached to a container; gets to observe and mutate
/// the container's template element before the walk, in attachment
/// order.
pub trait Behavior {
    fn on_render(&self, elem: &mut Element);
}

pub trait Component {
    /// Unique among siblings.
    fn id(&self) -> &str;

    fn visible(&self) -> bool {
        true
    }

    /// A body-only component's own wrapping element is discarded; only
    /// its children are spliced in.
    fn body_only(&self) -> bool {
        false
    }

    /// The render hook. `elem` is the (marker-attribute-stripped)
    /// template element this component was matched to.
    fn render(&self, elem: Element, cx: &RenderCx<'_>) -> Result<Rendered, MarkupError>;

    fn as_container(&self) -> Option<&dyn Container> {
        None
    }
}

pub trait Container: Component {
    /// Direct child by id.
    fn child(&self, id: &str) -> Option<&dyn Component>;

    /// `Some` means this container owns a markup template and renders
    /// against its own resolved document; `None` means it reuses the
    /// template element handed down by its parent.
    fn markup_class(&self) -> Option<ClassId> {
        None
    }

    /// Localization lookup for message markers in this container's
    /// scope.
    fn message(&self, key: &str) -> Option<KString> {
        let _ = key;
        None
    }

    fn behaviors(&self) -> &[Box<dyn Behavior>] {
        &[]
    }
}

// ------------------------------------------------------------------
/// Ordered child collection, uniquely keyed by id.
#[derive(Default)]
pub struct Children {
    items: Vec<Box<dyn Component>>,
}

impl Children {
    pub fn new() -> Children {
        Children::default()
    }

    pub fn add(&mut self, child: Box<dyn Component>) -> Result<(), MarkupError> {
        if self.get(child.id()).is_some() {
            return Err(MarkupError::DuplicateComponentId {
                id: KString::from_ref(child.id()),
            });
        }
        self.items.push(child);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Component> {
        self.items.iter().find(|c| c.id() == id).map(|c| &**c)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.items.iter().map(|c| &**c)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ------------------------------------------------------------------
/// Leaf component that replaces its element's body with a text
/// fragment.
pub struct Label {
    id: KString,
    text: KString,
    visible: bool,
}

impl Label {
    pub fn new(id: &str, text: &str) -> Label {
        Label {
            id: KString::from_ref(id),
            text: KString::from_ref(text),
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Label {
        self.visible = false;
        self
    }
}

impl Component for Label {
    fn id(&self) -> &str {
        &self.id
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn render(&self, mut elem: Element, _cx: &RenderCx<'_>) -> Result<Rendered, MarkupError> {
        elem.children = vec![Node::Text(self.text.clone())];
        Ok(Rendered::Node(Node::Element(elem)))
    }
}

// ------------------------------------------------------------------
/// General-purpose container: owned children, optional markup
/// template, optional localization table and behaviors.
pub struct BasicContainer {
    id: KString,
    visible: bool,
    body_only: bool,
    markup_class: Option<ClassId>,
    children: Children,
    behaviors: Vec<Box<dyn Behavior>>,
    messages: Vec<(KString, KString)>,
}

impl BasicContainer {
    pub fn new(id: &str) -> BasicContainer {
        BasicContainer {
            id: KString::from_ref(id),
            visible: true,
            body_only: false,
            markup_class: None,
            children: Children::new(),
            behaviors: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_markup(mut self, class: ClassId) -> BasicContainer {
        self.markup_class = Some(class);
        self
    }

    pub fn hidden(mut self) -> BasicContainer {
        self.visible = false;
        self
    }

    pub fn body_only(mut self) -> BasicContainer {
        self.body_only = true;
        self
    }

    pub fn add(&mut self, child: impl Component + 'static) -> Result<(), MarkupError> {
        self.children.add(Box::new(child))
    }

    pub fn add_behavior(&mut self, behavior: impl Behavior + 'static) {
        self.behaviors.push(Box::new(behavior));
    }

    pub fn add_message(&mut self, key: &str, value: &str) {
        self.messages
            .push((KString::from_ref(key), KString::from_ref(value)));
    }
}

impl Component for BasicContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn body_only(&self) -> bool {
        self.body_only
    }

    fn render(&self, elem: Element, cx: &RenderCx<'_>) -> Result<Rendered, MarkupError> {
        render_container(self, elem, cx)
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for BasicContainer {
    fn child(&self, id: &str) -> Option<&dyn Component> {
        self.children.get(id)
    }

    fn markup_class(&self) -> Option<ClassId> {
        self.markup_class
    }

    fn message(&self, key: &str) -> Option<KString> {
        self.messages
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.clone())
    }

    fn behaviors(&self) -> &[Box<dyn Behavior>] {
        &self.behaviors
    }
}

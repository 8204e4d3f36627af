//! The render engine: walks a resolved template tree against a live
//! component tree, firing render hooks and splicing the results back in
//! place.
//!
//! Conceptually the engine processes frames of (parent, index, child),
//! left to right. Replacing a child can change the arity of a subtree
//! (one node becomes zero, one, or many), which shifts the indices of
//! all not-yet-visited siblings. Here the frame set of one parent is an
//! in-place cursor over its owned child vector: a removal leaves the
//! cursor where it is, an N-way splice advances it by N, a plain
//! replacement by one. That is exactly the index correction the frame
//! model calls for.

use kstring::KString;

use crate::component::{Component, Container, Rendered};
use crate::document::Document;
use crate::element::{Element, Node};
use crate::error::MarkupError;
use crate::markers::{self, MarkerAttr, MarkerTag};
use crate::registry::ClassId;

/// Where resolved documents for markup-owning containers come from
/// during a render. Implemented by `TemplateResolver`.
pub trait MarkupSource {
    fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError>;
}

/// Per-render context handed through the walk.
pub struct RenderCx<'a> {
    markup: &'a dyn MarkupSource,
}

impl<'a> RenderCx<'a> {
    pub fn new(markup: &'a dyn MarkupSource) -> RenderCx<'a> {
        RenderCx { markup }
    }

    pub fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError> {
        self.markup.resolved_document(class)
    }
}

/// Render `elem` (typically a resolved template root) against
/// `container`. The root sits in a synthetic no-parent frame: a removed
/// result is an empty value and a sequence is returned as such; either
/// way no splicing into a parent happens here.
pub fn render(
    container: &dyn Container,
    elem: Element,
    cx: &RenderCx<'_>,
) -> Result<Rendered, MarkupError> {
    render_node(container, elem, cx)
}

/// The engine-supplied render hook for containers: behaviors first (in
/// attachment order), then either the container's own resolved markup
/// (markup-owning containers; the wrapper element keeps its attributes
/// and its children become the rendered markup root) or the template
/// element handed down by the parent.
pub fn render_container(
    container: &dyn Container,
    mut elem: Element,
    cx: &RenderCx<'_>,
) -> Result<Rendered, MarkupError> {
    for b in container.behaviors() {
        b.on_render(&mut elem);
    }
    match container.markup_class() {
        Some(class) => {
            let mut doc = cx.resolved_document(class)?;
            match doc.root.take() {
                Some(root) => {
                    elem.children = match render_node(container, root, cx)? {
                        Rendered::Removed => Vec::new(),
                        Rendered::Node(n) => vec![n],
                        Rendered::Expanded(nodes) => nodes,
                    };
                }
                // empty associated markup renders an empty body
                None => elem.children.clear(),
            }
            Ok(Rendered::Node(Node::Element(elem)))
        }
        None => {
            render_children(container, &mut elem, cx)?;
            Ok(Rendered::Node(Node::Element(elem)))
        }
    }
}

fn render_node(
    scope: &dyn Container,
    mut elem: Element,
    cx: &RenderCx<'_>,
) -> Result<Rendered, MarkupError> {
    let mut force_body_only = false;
    if markers::is_marker_name(&elem.name) {
        match markers::tag_of(&elem) {
            Some(MarkerTag::Container) => {
                // the referenced component becomes body-only; the
                // element is still matched by id below
                force_body_only = true;
            }
            Some(MarkerTag::Enclosure) => return render_enclosure(scope, elem, cx),
            Some(MarkerTag::Message) => return render_message(scope, elem, cx),
            _ => {
                // extend, child, head and remove must all have been
                // consumed before rendering; unknown names are errors
                // outright
                return Err(MarkupError::UnknownMarkerElement {
                    tag: KString::from_ref(elem.name.local_name()),
                });
            }
        }
    }
    let id = match take_marker_attrs(&mut elem)? {
        Some(id) => id,
        None => {
            if force_body_only {
                return Err(MarkupError::MissingMarkerAttribute {
                    tag: MarkerTag::Container.local(),
                    name: MarkerAttr::Id.local(),
                });
            }
            // ordinary element: no replacement, children become frames
            render_children(scope, &mut elem, cx)?;
            return Ok(Rendered::Node(Node::Element(elem)));
        }
    };
    let comp = resolve_path(scope, &id).ok_or_else(|| MarkupError::ComponentNotFound {
        id: id.clone(),
    })?;
    if !comp.visible() {
        return Ok(Rendered::Removed);
    }
    let body_only = force_body_only || comp.body_only();
    let mut result = comp.render(elem, cx)?;
    if body_only {
        result = strip_wrapper(result, &id)?;
    }
    // The hook's output re-enters the walk so nested markers in it are
    // still resolved; safe against looping since the marker attributes
    // were removed before the hook ran.
    Ok(match result {
        Rendered::Removed => Rendered::Removed,
        Rendered::Node(Node::Element(mut e)) => {
            render_children(scope, &mut e, cx)?;
            Rendered::Node(Node::Element(e))
        }
        Rendered::Node(text) => Rendered::Node(text),
        Rendered::Expanded(nodes) => Rendered::Expanded(render_sequence(scope, nodes, cx)?),
    })
}

/// The frame walk over one parent; see the module comment for how the
/// cursor arithmetic realizes sibling index correction.
fn render_children(
    scope: &dyn Container,
    parent: &mut Element,
    cx: &RenderCx<'_>,
) -> Result<(), MarkupError> {
    let mut i = 0;
    while i < parent.children.len() {
        let child = match parent.children.remove(i) {
            Node::Element(e) => e,
            text => {
                parent.children.insert(i, text);
                i += 1;
                continue;
            }
        };
        match render_node(scope, child, cx)? {
            Rendered::Removed => (),
            Rendered::Node(n) => {
                parent.children.insert(i, n);
                i += 1;
            }
            Rendered::Expanded(nodes) => {
                let n = nodes.len();
                parent.children.splice(i..i, nodes);
                i += n;
            }
        }
    }
    Ok(())
}

/// Each element of an inserted sequence becomes its own frame.
fn render_sequence(
    scope: &dyn Container,
    nodes: Vec<Node>,
    cx: &RenderCx<'_>,
) -> Result<Vec<Node>, MarkupError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(t) => out.push(Node::Text(t)),
            Node::Element(e) => match render_node(scope, e, cx)? {
                Rendered::Removed => (),
                Rendered::Node(n) => out.push(n),
                Rendered::Expanded(v) => out.extend(v),
            },
        }
    }
    Ok(out)
}

fn render_enclosure(
    scope: &dyn Container,
    mut elem: Element,
    cx: &RenderCx<'_>,
) -> Result<Rendered, MarkupError> {
    let child_ref = take_only_marker_attr(&mut elem, MarkerAttr::Child, MarkerTag::Enclosure)?;
    let comp = resolve_path(scope, &child_ref).ok_or_else(|| MarkupError::ComponentNotFound {
        id: child_ref.clone(),
    })?;
    if comp.visible() {
        // the enclosure dissolves into its children
        let children = std::mem::take(&mut elem.children);
        Ok(Rendered::Expanded(render_sequence(scope, children, cx)?))
    } else {
        // the element survives with its original attributes, body
        // dropped
        elem.children.clear();
        Ok(Rendered::Node(Node::Element(elem)))
    }
}

fn render_message(
    scope: &dyn Container,
    mut elem: Element,
    cx: &RenderCx<'_>,
) -> Result<Rendered, MarkupError> {
    let key = take_only_marker_attr(&mut elem, MarkerAttr::Key, MarkerTag::Message)?;
    // a synthetic component bound to the key, wired in as if it had
    // always been a child of the active container
    let msg = MessageComponent { key, scope };
    msg.render(elem, cx)
}

struct MessageComponent<'a> {
    key: KString,
    scope: &'a dyn Container,
}

impl Component for MessageComponent<'_> {
    fn id(&self) -> &str {
        &self.key
    }

    fn render(&self, _elem: Element, _cx: &RenderCx<'_>) -> Result<Rendered, MarkupError> {
        match self.scope.message(&self.key) {
            Some(text) => Ok(Rendered::Node(Node::Text(text))),
            None => Err(MarkupError::TranslationNotFound {
                key: self.key.clone(),
            }),
        }
    }
}

/// Resolve a `:`-separated id path through nested containers, starting
/// at `scope`'s direct children.
fn resolve_path<'a>(scope: &'a dyn Container, path: &str) -> Option<&'a dyn Component> {
    let mut container: &'a dyn Container = scope;
    let mut found: Option<&'a dyn Component> = None;
    let mut segments = path.split(':').peekable();
    while let Some(seg) = segments.next() {
        let c = container.child(seg)?;
        if segments.peek().is_some() {
            container = c.as_container()?;
        }
        found = Some(c);
    }
    found
}

/// Remove all marker attributes from `elem`, returning the component id
/// if present. Any other marker-namespace attribute is a hard error.
fn take_marker_attrs(elem: &mut Element) -> Result<Option<KString>, MarkupError> {
    let mut id = None;
    let attrs = std::mem::take(&mut elem.attrs);
    let mut keep = Vec::with_capacity(attrs.len());
    for (k, v) in attrs {
        if markers::is_marker_name(&k) {
            match MarkerAttr::from_local(k.local_name()) {
                Some(MarkerAttr::Id) => id = Some(v),
                _ => {
                    return Err(MarkupError::UnknownMarkerAttribute {
                        name: KString::from_ref(k.local_name()),
                    })
                }
            }
        } else {
            keep.push((k, v));
        }
    }
    elem.attrs = keep;
    Ok(id)
}

/// Remove exactly the wanted marker attribute; erroring when it is
/// absent or when any other marker attribute is present.
fn take_only_marker_attr(
    elem: &mut Element,
    want: MarkerAttr,
    tag: MarkerTag,
) -> Result<KString, MarkupError> {
    let mut val = None;
    let attrs = std::mem::take(&mut elem.attrs);
    let mut keep = Vec::with_capacity(attrs.len());
    for (k, v) in attrs {
        if markers::is_marker_name(&k) {
            if MarkerAttr::from_local(k.local_name()) == Some(want) && val.is_none() {
                val = Some(v);
            } else {
                return Err(MarkupError::UnknownMarkerAttribute {
                    name: KString::from_ref(k.local_name()),
                });
            }
        } else {
            keep.push((k, v));
        }
    }
    elem.attrs = keep;
    val.ok_or(MarkupError::MissingMarkerAttribute {
        tag: tag.local(),
        name: want.local(),
    })
}

fn strip_wrapper(result: Rendered, id: &KString) -> Result<Rendered, MarkupError> {
    match result {
        Rendered::Node(Node::Element(e)) => Ok(Rendered::Expanded(e.children)),
        Rendered::Node(Node::Text(_)) => Err(MarkupError::BodyOnlyNotElement { id: id.clone() }),
        other => Ok(other),
    }
}

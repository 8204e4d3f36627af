//! Markup inheritance resolution: turning a class's raw per-class
//! template plus its markup provider chain into one fully merged
//! document.
//!
//! Each resolution level consumes one `extend` marker: the extend
//! content of the derived template is captured, head content anywhere
//! in the derived document is set aside, and the captured content is
//! spliced into the superclass template at its insert point. The loop
//! repeats until a level without an extend marker terminates the chain;
//! at that point the accumulated head content (most derived first) is
//! merged into the final document's head target.

use std::sync::Arc;

use kstring::KString;

use crate::cache::{CacheKey, TemplateCache};
use crate::document::Document;
use crate::element::{Element, Node};
use crate::error::MarkupError;
use crate::markers::{self, MarkerTag};
use crate::parser::{self, TemplateParser};
use crate::registry::{ClassId, ClassRegistry};
use crate::render::MarkupSource;
use crate::resource::ResourceLoader;

pub struct TemplateResolver<'a> {
    registry: &'a ClassRegistry,
    loader: &'a dyn ResourceLoader,
    parser: &'a dyn TemplateParser,
    cache: &'a TemplateCache,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(
        registry: &'a ClassRegistry,
        loader: &'a dyn ResourceLoader,
        parser: &'a dyn TemplateParser,
        cache: &'a TemplateCache,
    ) -> TemplateResolver<'a> {
        TemplateResolver {
            registry,
            loader,
            parser,
            cache,
        }
    }

    /// The raw (unresolved, normalized) template of one class, through
    /// the shared cache. The resource's current mtime validates the
    /// cached entry; an entry for a template that fails to reload is
    /// dropped before the error propagates.
    pub fn raw_document(&self, class: ClassId) -> Result<Arc<Document>, MarkupError> {
        let info = self.registry.get(class)?;
        let path = match &info.markup_path {
            Some(p) => p.clone(),
            None => {
                return Err(MarkupError::NoMarkup {
                    id: info.name.clone(),
                })
            }
        };
        let name = info.name.clone();
        let dialect = info.dialect;
        let res = self
            .loader
            .load(name.as_str(), path.as_str())
            .map_err(|e| MarkupError::MarkupNotFound {
                class: name.clone(),
                source: e,
            })?;
        let key = CacheKey { class, path };
        self.cache.get_or_load(&key, res.mtime(), || {
            let text = res
                .read_to_string()
                .map_err(|e| MarkupError::MarkupNotFound {
                    class: name.clone(),
                    source: e,
                })?;
            let mut doc = self.parser.parse(&text).map_err(|e| MarkupError::Parse {
                class: name.clone(),
                source: e,
            })?;
            doc.dialect = dialect;
            parser::normalize(&mut doc);
            Ok(doc)
        })
    }

    /// Fully resolve `class`'s markup. Always returns a fresh deep
    /// copy; callers may mutate the result freely (the render engine
    /// does) without affecting the cache.
    pub fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError> {
        let mut level = class;
        let mut current = (*self.raw_document(level)?).deep_clone();
        let mut heads: Vec<Node> = Vec::new();
        let mut merged = false;
        loop {
            let mut work_root = match current.root.take() {
                // the empty document ends the chain
                None => break,
                Some(r) => r,
            };
            let name = self.registry.name(level)?.clone();
            match work_root.count(&|e| markers::is_marker(e, MarkerTag::Extend)) {
                0 => {
                    current.root = Some(work_root);
                    break;
                }
                1 => (),
                _ => return Err(MarkupError::DuplicateExtend { class: name }),
            }
            merged = true;
            // Heads both inside and outside the extend content
            // contribute; everything outside the extend marker is
            // otherwise discarded.
            extract_heads(&mut work_root, &mut heads);
            let captured = if markers::is_marker(&work_root, MarkerTag::Extend) {
                work_root.children
            } else {
                take_extend_children(&mut work_root).unwrap_or_default()
            };
            let sup = self
                .registry
                .markup_superclass(level)?
                .ok_or(MarkupError::SuperclassNotFound { class: name })?;
            let mut sup_doc = (*self.raw_document(sup)?).deep_clone();
            let sup_name = self.registry.name(sup)?;
            splice_captured(&mut sup_doc, captured, sup_name)?;
            current = sup_doc;
            level = sup;
        }
        // Without a merge the document round-trips untouched, head
        // markers included.
        if merged {
            let final_name = self.registry.name(level)?.clone();
            merge_heads(&mut current, std::mem::take(&mut heads), &final_name)?;
        }
        Ok(current)
    }
}

impl MarkupSource for TemplateResolver<'_> {
    fn resolved_document(&self, class: ClassId) -> Result<Document, MarkupError> {
        TemplateResolver::resolved_document(self, class)
    }
}

/// Move the content of every head marker, document order, into `out`.
/// The marker elements themselves are dropped.
fn extract_heads(elem: &mut Element, out: &mut Vec<Node>) {
    let mut i = 0;
    while i < elem.children.len() {
        let is_head =
            matches!(&elem.children[i], Node::Element(e) if markers::is_marker(e, MarkerTag::Head));
        if is_head {
            if let Node::Element(m) = elem.children.remove(i) {
                out.extend(m.children);
            }
        } else {
            if let Node::Element(e) = &mut elem.children[i] {
                extract_heads(e, out);
            }
            i += 1;
        }
    }
}

/// Detach the first extend marker found depth-first and return its
/// children.
fn take_extend_children(elem: &mut Element) -> Option<Vec<Node>> {
    let mut i = 0;
    while i < elem.children.len() {
        let is_extend = matches!(
            &elem.children[i],
            Node::Element(e) if markers::is_marker(e, MarkerTag::Extend)
        );
        if is_extend {
            if let Node::Element(m) = elem.children.remove(i) {
                return Some(m.children);
            }
        }
        if let Node::Element(e) = &mut elem.children[i] {
            if let Some(c) = take_extend_children(e) {
                return Some(c);
            }
        }
        i += 1;
    }
    None
}

/// Replace the superclass document's insert point with the captured
/// nodes. Exactly the first insert point found depth-first is used.
fn splice_captured(
    doc: &mut Document,
    captured: Vec<Node>,
    class: &KString,
) -> Result<(), MarkupError> {
    let root = match &mut doc.root {
        Some(r) => r,
        None => {
            return Err(MarkupError::InsertPointNotFound {
                class: class.clone(),
            })
        }
    };
    if markers::is_marker(root, MarkerTag::InsertPoint) {
        return Err(MarkupError::InsertPointIsRoot {
            class: class.clone(),
        });
    }
    let mut captured = Some(captured);
    if !splice_into(root, &mut captured) {
        return Err(MarkupError::InsertPointNotFound {
            class: class.clone(),
        });
    }
    Ok(())
}

fn splice_into(elem: &mut Element, captured: &mut Option<Vec<Node>>) -> bool {
    let mut i = 0;
    while i < elem.children.len() {
        let is_ip = matches!(
            &elem.children[i],
            Node::Element(e) if markers::is_marker(e, MarkerTag::InsertPoint)
        );
        if is_ip {
            let nodes = captured.take().unwrap_or_default();
            elem.children.splice(i..=i, nodes);
            return true;
        }
        if let Node::Element(e) = &mut elem.children[i] {
            if splice_into(e, captured) {
                return true;
            }
        }
        i += 1;
    }
    false
}

/// Insert the accumulated head content at the front of the final
/// document's head target: the first head marker if one exists,
/// otherwise a plain `head` element directly under the root. After the
/// merge all head markers dissolve into their parents.
fn merge_heads(
    doc: &mut Document,
    heads: Vec<Node>,
    class: &KString,
) -> Result<(), MarkupError> {
    let root = match &mut doc.root {
        Some(r) => r,
        None if heads.is_empty() => return Ok(()),
        None => {
            return Err(MarkupError::HeadTargetNotFound {
                class: class.clone(),
            })
        }
    };
    if !heads.is_empty() {
        let mut heads = Some(heads);
        if !insert_into_first_head_marker(root, &mut heads) {
            let target = root.children.iter_mut().find_map(|n| match n {
                Node::Element(e)
                    if e.name.ns().is_none() && e.name.local_name() == "head" =>
                {
                    Some(e)
                }
                _ => None,
            });
            match target {
                Some(head) => {
                    let h = heads.take().unwrap_or_default();
                    head.children.splice(0..0, h);
                }
                None => {
                    return Err(MarkupError::HeadTargetNotFound {
                        class: class.clone(),
                    })
                }
            }
        }
    }
    dissolve_head_markers(root);
    Ok(())
}

fn insert_into_first_head_marker(elem: &mut Element, heads: &mut Option<Vec<Node>>) -> bool {
    if markers::is_marker(elem, MarkerTag::Head) {
        let h = heads.take().unwrap_or_default();
        elem.children.splice(0..0, h);
        return true;
    }
    for child in &mut elem.children {
        if let Node::Element(e) = child {
            if insert_into_first_head_marker(e, heads) {
                return true;
            }
        }
    }
    false
}

/// Replace every head marker element by its children, recursively.
fn dissolve_head_markers(elem: &mut Element) {
    let mut i = 0;
    while i < elem.children.len() {
        let is_head =
            matches!(&elem.children[i], Node::Element(e) if markers::is_marker(e, MarkerTag::Head));
        if is_head {
            if let Node::Element(mut m) = elem.children.remove(i) {
                dissolve_head_markers(&mut m);
                let n = m.children.len();
                elem.children.splice(i..i, m.children);
                i += n;
            }
        } else {
            if let Node::Element(e) = &mut elem.children[i] {
                dissolve_head_markers(e);
            }
            i += 1;
        }
    }
}

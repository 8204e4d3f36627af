//! The closed error taxonomy. Every error aborts the current resolution
//! or render entirely and is returned to the immediate caller; the
//! engine never retries and never returns a half-spliced tree.

use kstring::KString;
use thiserror::Error;

use crate::registry::ClassId;

/// Parser diagnostics carry a position; the parser itself is an
/// external collaborator.
#[derive(Debug, Clone, Error)]
#[error("{msg} at line {line} column {col}")]
pub struct ParseError {
    pub line: u32,
    pub col: u32,
    pub msg: String,
}

#[derive(Debug, Error)]
pub enum MarkupError {
    // -- resolution --
    #[error("ambiguous markup inheritance: class {class:?} has multiple \
             markup-providing superclasses")]
    AmbiguousSuperclass { class: KString },
    #[error("class {class:?} extends its markup but has no markup-providing \
             superclass")]
    SuperclassNotFound { class: KString },
    #[error("more than one extend marker in markup of class {class:?}")]
    DuplicateExtend { class: KString },
    #[error("insert point not found in markup of class {class:?}")]
    InsertPointNotFound { class: KString },
    #[error("insert point is the document root in markup of class {class:?}")]
    InsertPointIsRoot { class: KString },
    #[error("accumulated head content but no head target in markup of class \
             {class:?}")]
    HeadTargetNotFound { class: KString },
    #[error("markup for class {class:?} not found or unreadable")]
    MarkupNotFound {
        class: KString,
        #[source]
        source: anyhow::Error,
    },
    #[error("malformed markup for class {class:?}")]
    Parse {
        class: KString,
        #[source]
        source: ParseError,
    },
    #[error("unknown class id {0:?}")]
    ClassNotFound(ClassId),
    #[error("container {id:?} does not own a markup template")]
    NoMarkup { id: KString },

    // -- rendering --
    #[error("component not found: {id:?}")]
    ComponentNotFound { id: KString },
    #[error("unknown element in marker namespace: {tag:?}")]
    UnknownMarkerElement { tag: KString },
    #[error("unknown attribute in marker namespace: {name:?}")]
    UnknownMarkerAttribute { name: KString },
    #[error("marker element {tag:?} is missing required attribute {name:?}")]
    MissingMarkerAttribute {
        tag: &'static str,
        name: &'static str,
    },
    #[error("no translation for key {key:?}")]
    TranslationNotFound { key: KString },
    #[error("body-only component {id:?} rendered to a non-element result")]
    BodyOnlyNotElement { id: KString },
    #[error("page render did not produce a single root element")]
    RootNotElement,

    // -- component tree --
    #[error("duplicate component id {id:?} among siblings")]
    DuplicateComponentId { id: KString },
}

//! Server-side markup templating with a component tree.
//!
//! Templates are plain markup documents carrying a small marker
//! vocabulary (namespace [`markers::MARKER_NS`]). Container types
//! declare their templates and superclasses in a [`ClassRegistry`];
//! the [`TemplateResolver`] merges a class's template with its
//! superclass chain (extend markers, insert points, head accumulation)
//! through a shared mtime-validated [`TemplateCache`]. The render
//! engine then walks the resolved tree against a live [`Container`]
//! tree, replacing marked elements by whatever the matched components
//! render, with sibling indices corrected as subtrees shrink or expand.
//!
//! [`render_page`] ties the pieces together for a whole page.

pub mod util;

pub mod cache;
pub mod component;
pub mod document;
pub mod element;
pub mod error;
pub mod inherit;
pub mod markers;
pub mod page;
pub mod parser;
pub mod registry;
pub mod render;
pub mod resource;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{CacheKey, TemplateCache};
pub use component::{BasicContainer, Behavior, Children, Component, Container, Label, Rendered};
pub use document::{Dialect, Document};
pub use element::{Element, ElementKind, Node, QName};
pub use error::{MarkupError, ParseError};
pub use inherit::TemplateResolver;
pub use markers::{MarkerAttr, MarkerTag, MARKER_NS};
pub use page::render_page;
pub use parser::{normalize, TemplateParser};
pub use registry::{ClassId, ClassInfo, ClassRegistry};
pub use render::{render, render_container, MarkupSource, RenderCx};
pub use resource::{FsLoader, MemLoader, Resource, ResourceLoader};

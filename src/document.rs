//! A parsed markup document: header metadata plus at most one root
//! element.

use kstring::KString;
use strum_macros::{Display, EnumString};

use crate::element::Element;

/// The markup dialect a template was written in; drives which
/// inheritance and rendering rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Dialect {
    Html,
    Xhtml,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Html
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Free-form declaration parameters (version, encoding, standalone,
    /// ...), in source order.
    pub declaration: Vec<(KString, KString)>,
    pub dialect: Dialect,
    pub doctype: Option<KString>,
    /// `None` means the empty document.
    pub root: Option<Element>,
}

impl Document {
    pub fn new(dialect: Dialect) -> Document {
        Document {
            declaration: Vec::new(),
            dialect,
            doctype: None,
            root: None,
        }
    }

    pub fn with_root(dialect: Dialect, root: Element) -> Document {
        Document {
            root: Some(root),
            ..Document::new(dialect)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Deep copy; see `Element::deep_clone`.
    pub fn deep_clone(&self) -> Document {
        self.clone()
    }
}

//! The statically declared markup provider chain.
//!
//! Each container type registers itself once: its name, dialect, the
//! per-class markup path (if it owns a template) and its superclasses.
//! Inheritance resolution walks this declared chain instead of doing
//! any runtime class introspection.

use itertools::Itertools;
use kstring::KString;

use crate::document::Dialect;
use crate::error::MarkupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

#[derive(Debug)]
pub struct ClassInfo {
    pub name: KString,
    pub dialect: Dialect,
    /// `Some` means the class owns a markup template (`has_markup`).
    pub markup_path: Option<KString>,
    pub supers: Vec<ClassId>,
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> ClassRegistry {
        ClassRegistry::default()
    }

    /// Superclasses must be registered before their subclasses; the
    /// returned id is how the class is referred to from then on.
    pub fn register(
        &mut self,
        name: &str,
        dialect: Dialect,
        markup_path: Option<&str>,
        supers: &[ClassId],
    ) -> ClassId {
        self.classes.push(ClassInfo {
            name: KString::from_ref(name),
            dialect,
            markup_path: markup_path.map(KString::from_ref),
            supers: supers.to_vec(),
        });
        ClassId(self.classes.len() as u32 - 1)
    }

    pub fn get(&self, id: ClassId) -> Result<&ClassInfo, MarkupError> {
        self.classes
            .get(id.0 as usize)
            .ok_or(MarkupError::ClassNotFound(id))
    }

    pub fn name(&self, id: ClassId) -> Result<&KString, MarkupError> {
        Ok(&self.get(id)?.name)
    }

    /// The nearest markup-providing superclass, if any. More than one
    /// distinct qualifying superclass (through different branches of
    /// the chain) is ambiguous markup inheritance.
    pub fn markup_superclass(&self, id: ClassId) -> Result<Option<ClassId>, MarkupError> {
        let info = self.get(id)?;
        let mut found: Vec<ClassId> = Vec::new();
        for &s in &info.supers {
            self.collect_markup_providers(s, &mut found)?;
        }
        found
            .into_iter()
            .at_most_one()
            .map_err(|_| MarkupError::AmbiguousSuperclass {
                class: info.name.clone(),
            })
    }

    fn collect_markup_providers(
        &self,
        id: ClassId,
        out: &mut Vec<ClassId>,
    ) -> Result<(), MarkupError> {
        let info = self.get(id)?;
        if info.markup_path.is_some() {
            if !out.contains(&id) {
                out.push(id);
            }
            return Ok(());
        }
        for &s in &info.supers {
            self.collect_markup_providers(s, out)?;
        }
        Ok(())
    }
}

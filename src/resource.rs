//! Loading raw template resources. The loader is consumed through a
//! trait; the filesystem implementation serves per-class templates from
//! a base directory, and `MemLoader` holds them in memory (useful for
//! embedded templates and for tests).
//!
//! The modification time reported by a resource is the cache
//! invalidation key.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};
use kstring::KString;

pub trait Resource {
    fn path(&self) -> &str;
    fn mtime(&self) -> SystemTime;
    fn open(&self) -> Result<Box<dyn Read>>;

    fn read_to_string(&self) -> Result<String> {
        let mut s = String::new();
        self.open()?
            .read_to_string(&mut s)
            .with_context(|| anyhow!("reading resource {:?}", self.path()))?;
        Ok(s)
    }
}

pub trait ResourceLoader: Send + Sync {
    /// `scope` is the owning class or module name; `rel_path` the
    /// per-class markup path.
    fn load(&self, scope: &str, rel_path: &str) -> Result<Box<dyn Resource>>;
}

// ------------------------------------------------------------------
/// Serve template files from the local file system, one subdirectory
/// per scope.
#[derive(Debug)]
pub struct FsLoader {
    base: PathBuf,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> FsLoader {
        FsLoader { base: base.into() }
    }
}

struct FsResource {
    path: KString,
    full: PathBuf,
    mtime: SystemTime,
}

impl Resource for FsResource {
    fn path(&self) -> &str {
        &self.path
    }
    fn mtime(&self) -> SystemTime {
        self.mtime
    }
    fn open(&self) -> Result<Box<dyn Read>> {
        let fh = File::open(&self.full)
            .with_context(|| anyhow!("can't open file for reading: {:?}", self.full))?;
        Ok(Box::new(fh))
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, scope: &str, rel_path: &str) -> Result<Box<dyn Resource>> {
        let full = self.base.join(scope).join(rel_path);
        let metadata = full
            .metadata()
            .with_context(|| anyhow!("no markup resource at {:?}", full))?;
        if !metadata.is_file() {
            return Err(anyhow!("markup resource is not a file: {:?}", full));
        }
        let mtime = metadata
            .modified()
            .with_context(|| anyhow!("no mtime for {:?}", full))?;
        Ok(Box::new(FsResource {
            path: KString::from_string(full.to_string_lossy().into_owned()),
            full,
            mtime,
        }))
    }
}

// ------------------------------------------------------------------
/// In-memory loader keyed by (scope, path). Entries can be replaced at
/// any time; replacing one with a newer mtime is how staleness is
/// simulated in tests.
#[derive(Debug, Default)]
pub struct MemLoader {
    entries: Mutex<HashMap<(KString, KString), (SystemTime, String)>>,
}

impl MemLoader {
    pub fn new() -> MemLoader {
        MemLoader::default()
    }

    pub fn insert(&self, scope: &str, rel_path: &str, mtime: SystemTime, text: &str) {
        self.entries.lock().expect("never poisoned").insert(
            (KString::from_ref(scope), KString::from_ref(rel_path)),
            (mtime, text.to_string()),
        );
    }

    pub fn remove(&self, scope: &str, rel_path: &str) {
        self.entries
            .lock()
            .expect("never poisoned")
            .remove(&(KString::from_ref(scope), KString::from_ref(rel_path)));
    }
}

struct MemResource {
    path: KString,
    mtime: SystemTime,
    text: String,
}

impl Resource for MemResource {
    fn path(&self) -> &str {
        &self.path
    }
    fn mtime(&self) -> SystemTime {
        self.mtime
    }
    fn open(&self) -> Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.text.clone().into_bytes())))
    }
}

impl ResourceLoader for MemLoader {
    fn load(&self, scope: &str, rel_path: &str) -> Result<Box<dyn Resource>> {
        let guard = self.entries.lock().expect("never poisoned");
        let (mtime, text) = guard
            .get(&(KString::from_ref(scope), KString::from_ref(rel_path)))
            .ok_or_else(|| anyhow!("no markup resource {:?} in scope {:?}", rel_path, scope))?;
        Ok(Box::new(MemResource {
            path: KString::from_string(format!("{scope}/{rel_path}")),
            mtime: *mtime,
            text: text.clone(),
        }))
    }
}

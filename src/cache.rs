//! The shared template cache: a capacity-bounded, mtime-validated
//! key to Document store.
//!
//! The cache is the only long-lived shared mutable state in the core.
//! Lookups from concurrent render passes take the read lock; reloads
//! take the write lock. Values are handed out as `Arc<Document>`
//! snapshots; callers deep-copy before mutating (the resolver does).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use kstring::KString;

use crate::document::Document;
use crate::error::MarkupError;
use crate::registry::ClassId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub class: ClassId,
    pub path: KString,
}

struct Entry {
    mtime: SystemTime,
    doc: Arc<Document>,
    last_use: AtomicU64,
}

pub struct TemplateCache {
    capacity: usize,
    tick: AtomicU64,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl TemplateCache {
    /// `capacity` of zero disables caching (every lookup reloads).
    pub fn new(capacity: usize) -> TemplateCache {
        TemplateCache {
            capacity,
            tick: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("never poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn touch(&self, entry: &Entry) {
        let t = self.tick.fetch_add(1, Ordering::Relaxed) + 1;
        entry.last_use.store(t, Ordering::Relaxed);
    }

    /// Fresh hit, reload on miss or stale `mtime`. A failed reload
    /// evicts the entry before propagating the error; no stale or
    /// partial entry is ever retained. Two racing reloaders may both
    /// run `load`; the later insert wins, which is harmless for
    /// idempotent loads.
    pub fn get_or_load(
        &self,
        key: &CacheKey,
        mtime: SystemTime,
        load: impl FnOnce() -> Result<Document, MarkupError>,
    ) -> Result<Arc<Document>, MarkupError> {
        {
            let map = self.entries.read().expect("never poisoned");
            if let Some(entry) = map.get(key) {
                if entry.mtime == mtime {
                    self.touch(entry);
                    return Ok(entry.doc.clone());
                }
            }
        }
        match load() {
            Ok(doc) => {
                let doc = Arc::new(doc);
                let mut map = self.entries.write().expect("never poisoned");
                map.remove(key);
                if self.capacity == 0 {
                    return Ok(doc);
                }
                while map.len() >= self.capacity {
                    evict_one(&mut map);
                }
                let entry = Entry {
                    mtime,
                    doc: doc.clone(),
                    last_use: AtomicU64::new(0),
                };
                self.touch(&entry);
                map.insert(key.clone(), entry);
                Ok(doc)
            }
            Err(e) => {
                crate::warn!("template {:?} failed to load, dropping any cached copy", key.path);
                self.evict(key);
                Err(e)
            }
        }
    }

    pub fn evict(&self, key: &CacheKey) {
        let mut map = self.entries.write().expect("never poisoned");
        let _ = map.remove(key);
    }
}

/// The single place the capacity policy lives: least recently used.
/// Swap this out for a different policy if needed.
fn evict_one(map: &mut HashMap<CacheKey, Entry>) {
    let victim = map
        .iter()
        .min_by_key(|(_, e)| e.last_use.load(Ordering::Relaxed))
        .map(|(k, _)| k.clone());
    if let Some(k) = victim {
        let _ = map.remove(&k);
    }
}

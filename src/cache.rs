use crate::error::Result;
use crate::loader::WorkbookLoader;
use crate::table::Workbook;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Read-through cache of loaded workbooks, keyed by path
///
/// A workbook is read from disk on the first request for its path and shared as an
/// immutable `Arc<Workbook>` afterwards. Entries live until [`WorkbookCache::invalidate`]
/// or [`WorkbookCache::clear`] is called.
#[derive(Debug, Default)]
pub struct WorkbookCache {
    loader: WorkbookLoader,
    entries: RwLock<HashMap<PathBuf, Arc<Workbook>>>,
}

impl WorkbookCache {
    pub fn new(loader: WorkbookLoader) -> Self {
        WorkbookCache {
            loader,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &WorkbookLoader {
        &self.loader
    }

    /// Returns the cached workbook for `path`, loading it on a miss
    pub fn get(&self, path: &Path) -> Result<Arc<Workbook>> {
        if let Some(workbook) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            debug!("Workbook cache hit: {}", path.display());
            return Ok(Arc::clone(workbook));
        }

        debug!("Workbook cache miss: {}", path.display());
        let loaded = Arc::new(self.loader.load(path)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have loaded the same path meanwhile; keep the first.
        let workbook = entries.entry(path.to_path_buf()).or_insert(loaded);
        Ok(Arc::clone(workbook))
    }

    /// Drops the entry for `path`; returns whether one existed
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

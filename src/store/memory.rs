/// In-process page store

use super::PageStore;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Stores pages in a `Mutex<HashMap>`; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    pages: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageStore for MemoryStore {
    fn put(&self, id: &str, html: &str) -> Result<()> {
        let mut g = self
            .pages
            .lock()
            .map_err(|e| Error::StorageError(format!("page map poisoned: {}", e)))?;
        g.insert(id.to_string(), html.to_string());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<String> {
        let g = self
            .pages
            .lock()
            .map_err(|e| Error::StorageError(format!("page map poisoned: {}", e)))?;
        g.get(id).cloned().ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

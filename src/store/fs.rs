/// Filesystem page store: one `<id>.html` file per page

use super::{is_valid_id, PageStore};
use crate::{Error, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            Error::StorageError(format!("cannot create page directory {}: {}", root.display(), e))
        })?;
        log::debug!("page store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.html", id))
    }
}

impl PageStore for FsStore {
    fn put(&self, id: &str, html: &str) -> Result<()> {
        if !is_valid_id(id) {
            return Err(Error::InvalidInput(format!("unusable page id '{}'", id)));
        }
        // Write next to the target and rename so readers never see a partial page.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| Error::StorageError(format!("cannot create temp file: {}", e)))?;
        tmp.write_all(html.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| Error::StorageError(format!("cannot write page {}: {}", id, e)))?;
        tmp.persist(self.path_for(id))
            .map_err(|e| Error::StorageError(format!("cannot persist page {}: {}", id, e.error)))?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<String> {
        if !is_valid_id(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        match std::fs::read_to_string(self.path_for(id)) {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(id.to_string())),
            Err(e) => Err(Error::StorageError(format!("cannot read page {}: {}", id, e))),
        }
    }
}

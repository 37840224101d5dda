//! Page persistence: where compiled documents live between `generate` and `view`.
//!
//! The HTTP layer only talks to the [`PageStore`] trait; the in-memory store
//! backs tests and throwaway servers, the filesystem store keeps one HTML file
//! per page.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::Result;

/// Durable sink for compiled pages, keyed by page id.
pub trait PageStore: Send + Sync {
    /// Store `html` under `id`, replacing any previous page with that id.
    fn put(&self, id: &str, html: &str) -> Result<()>;

    /// Fetch a stored page. Unknown ids yield `Error::NotFound`.
    fn get(&self, id: &str) -> Result<String>;

    fn contains(&self, id: &str) -> Result<bool> {
        match self.get(id) {
            Ok(_) => Ok(true),
            Err(crate::Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Ids usable as file names: ASCII alphanumerics, `-` and `_`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 128 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_charset_excludes_path_separators() {
        assert!(is_valid_id("3f2a9c1e-0b7d-4c1a-9a57-2f1d0c9b8e77"));
        assert!(is_valid_id("page_1"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("a.html"));
    }
}

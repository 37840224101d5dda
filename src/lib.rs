//! Gridpage
//!
//! Compiles a grid of labelled cells into an HTML page whose elements are
//! absolutely positioned for one fixed screen resolution, and (with the
//! default `server` feature) stores and serves those pages over HTTP.
//!
//! # Features
//!
//! - **Compiler**: pure, deterministic grid-to-HTML compilation
//! - **Persistence**: in-memory and filesystem page stores behind one trait
//! - **Server** (default): `tiny_http` front end with `/generate` and `/view/{id}`
//!
//! # Example
//!
//! ```
//! use gridpage::{compile, CompileOptions, LayoutRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = LayoutRequest::from_json(r#"{
//!     "layout": [["header.0", "header.0"], ["p.0", "p.1"]],
//!     "content": { "header.0": "Welcome" },
//!     "resolution": { "width": 1920, "height": 1080 }
//! }"#)?;
//!
//! let doc = compile(&request, &CompileOptions::default())?;
//! assert_eq!(doc.placements.len(), 3);
//! assert!(doc.html.contains("header, p { display: block; }"));
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod compiler;
pub use compiler::{compile, CompileOptions, HtmlDocument, LayoutRequest, MergePolicy};

pub mod ids;
pub mod store;

// HTTP front end (tiny_http worker pool)
#[cfg(feature = "server")]
pub mod server;

/// Target canvas size in pixels.
///
/// Missing fields deserialize as 0, which the compiler rejects the same way as
/// a missing resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Where the server keeps generated pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Pages live only as long as the process
    Memory,
    /// One HTML file per page under this directory
    Filesystem(PathBuf),
}

impl StorageBackend {
    /// Open the configured store.
    pub fn open(&self) -> Result<Arc<dyn store::PageStore>> {
        let store: Arc<dyn store::PageStore> = match self {
            StorageBackend::Memory => Arc::new(store::MemoryStore::new()),
            StorageBackend::Filesystem(dir) => Arc::new(store::FsStore::open(dir.clone())?),
        };
        Ok(store)
    }
}

/// Configuration for the HTTP server
///
/// # Examples
///
/// ```
/// let cfg = gridpage::ServerConfig::default();
/// assert_eq!(cfg.addr, "127.0.0.1:3000");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: String,
    /// Worker threads; `None` means one per CPU
    pub workers: Option<usize>,
    /// Largest accepted `/generate` body
    pub max_body_bytes: usize,
    pub storage: StorageBackend,
    /// Options applied to every compiled page
    pub compile: CompileOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            workers: None,
            max_body_bytes: 1024 * 1024,
            storage: StorageBackend::Filesystem(PathBuf::from("pages")),
            compile: CompileOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(Error::ConfigError("listen address is empty".into()));
        }
        if self.workers == Some(0) {
            return Err(Error::ConfigError("at least one worker is required".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(Error::ConfigError("max_body_bytes must be positive".into()));
        }
        Ok(())
    }
}

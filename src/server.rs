//! HTTP front end: `POST /generate` compiles and stores a page, `GET /view/{id}`
//! serves it back.
//!
//! Request handling lives in [`App::handle`], which knows nothing about
//! sockets; [`HttpServer`] feeds it from a `tiny_http` listener using a fixed
//! pool of worker threads.

use crate::compiler::{self, CompileOptions, LayoutRequest};
use crate::ids::IdGenerator;
use crate::store::PageStore;
use crate::{Error, Result, ServerConfig};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// A response produced by [`App::handle`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub etag: Option<String>,
}

impl Reply {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
            etag: None,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    fn html(body: String) -> Self {
        let etag = hex::encode(Sha256::digest(body.as_bytes()));
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
            etag: Some(format!("\"{}\"", etag)),
        }
    }
}

/// Routes requests to the compiler and the page store.
pub struct App {
    store: Arc<dyn PageStore>,
    ids: Arc<dyn IdGenerator>,
    options: CompileOptions,
    max_body_bytes: usize,
}

enum Route<'a> {
    Generate,
    View(&'a str),
    Unknown,
}

fn route(path: &str) -> Route<'_> {
    let mut segments = path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("generate"), None, None) => Route::Generate,
        (Some("view"), Some(id), None) if !id.is_empty() => Route::View(id),
        _ => Route::Unknown,
    }
}

impl App {
    pub fn new(config: &ServerConfig, store: Arc<dyn PageStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            options: config.compile.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Handle one request. `url` is the raw request target, query included.
    pub fn handle(&self, method: &str, url: &str, body: &[u8]) -> Reply {
        let path = match request_path(url) {
            Ok(p) => p,
            Err(e) => return Reply::error(400, e.to_string()),
        };

        match (route(&path), method) {
            (Route::Generate, "POST") => self.generate(body),
            (Route::View(id), "GET") => self.view(id),
            (Route::Generate, _) | (Route::View(_), _) => Reply::error(405, "Method not allowed"),
            (Route::Unknown, _) => Reply::error(404, "Not found"),
        }
    }

    fn generate(&self, body: &[u8]) -> Reply {
        if body.len() > self.max_body_bytes {
            return Reply::error(413, format!("Payload exceeds {} bytes", self.max_body_bytes));
        }
        let text = match std::str::from_utf8(body) {
            Ok(t) => t,
            Err(_) => return Reply::error(400, "Payload is not valid UTF-8"),
        };

        let doc = match LayoutRequest::from_json(text).and_then(|req| compiler::compile(&req, &self.options)) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("rejected layout: {}", e);
                return Reply::error(e.status_code(), bare_message(&e));
            }
        };

        let id = self.ids.next_id();
        match self.store.put(&id, &doc.html) {
            Ok(()) => {
                log::info!("stored page {} ({} elements)", id, doc.placements.len());
                Reply::json(200, json!({ "success": true, "id": id }))
            }
            Err(e) => {
                log::error!("failed to store page {}: {}", id, e);
                Reply::error(500, e.to_string())
            }
        }
    }

    fn view(&self, id: &str) -> Reply {
        match self.store.get(id) {
            Ok(html) => Reply::html(html),
            Err(Error::NotFound(_)) => Reply::error(404, "Page not found"),
            Err(e) => {
                log::error!("failed to read page {}: {}", id, e);
                Reply::error(500, e.to_string())
            }
        }
    }
}

/// Client-facing message for input errors: the precondition without the variant prefix.
fn bare_message(e: &Error) -> String {
    match e {
        Error::InvalidInput(m) | Error::MalformedLayout(m) => m.clone(),
        other => other.to_string(),
    }
}

fn request_path(raw: &str) -> Result<String> {
    let base = url::Url::parse("http://localhost/").map_err(|e| Error::ServerError(e.to_string()))?;
    let parsed = base
        .join(raw)
        .map_err(|e| Error::InvalidInput(format!("bad request target '{}': {}", raw, e)))?;
    Ok(parsed.path().to_string())
}

/// `tiny_http` listener plus the worker pool that drives an [`App`].
pub struct HttpServer {
    inner: Arc<tiny_http::Server>,
    app: Arc<App>,
    workers: usize,
}

/// A server running on background threads.
pub struct ServerHandle {
    inner: Arc<tiny_http::Server>,
    stopping: Arc<AtomicBool>,
    threads: Vec<thread::JoinHandle<()>>,
    addr: Option<SocketAddr>,
}

impl HttpServer {
    /// Bind the listener described by `config`.
    pub fn bind(config: &ServerConfig, app: App) -> Result<Self> {
        let inner = tiny_http::Server::http(config.addr.as_str())
            .map_err(|e| Error::ServerError(format!("cannot bind {}: {}", config.addr, e)))?;
        let workers = config.workers.unwrap_or_else(num_cpus::get).max(1);
        Ok(Self {
            inner: Arc::new(inner),
            app: Arc::new(app),
            workers,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.server_addr().to_ip()
    }

    /// Start the workers and return immediately.
    pub fn spawn(self) -> ServerHandle {
        let addr = self.local_addr();
        let stopping = Arc::new(AtomicBool::new(false));
        let threads = (0..self.workers)
            .map(|n| {
                let server = self.inner.clone();
                let app = self.app.clone();
                let stopping = stopping.clone();
                thread::Builder::new()
                    .name(format!("gridpage-worker-{}", n))
                    .spawn(move || worker_loop(&server, &app, &stopping))
            })
            .filter_map(|r| match r {
                Ok(h) => Some(h),
                Err(e) => {
                    log::error!("failed to spawn worker: {}", e);
                    None
                }
            })
            .collect();

        ServerHandle { inner: self.inner, stopping, threads, addr }
    }

    /// Serve until the process is killed.
    pub fn run(self) -> Result<()> {
        match self.local_addr() {
            Some(addr) => log::info!("listening on http://{} with {} workers", addr, self.workers),
            None => log::info!("listening with {} workers", self.workers),
        }
        let handle = self.spawn();
        if handle.threads.is_empty() {
            return Err(Error::ServerError("no worker threads could be started".into()));
        }
        join_workers(handle.threads)
    }
}

/// Wait for every worker; a panicked worker is logged and turns into an error.
fn join_workers(threads: Vec<thread::JoinHandle<()>>) -> Result<()> {
    let mut panicked = 0;
    for t in threads {
        let name = t.thread().name().unwrap_or("worker").to_string();
        if t.join().is_err() {
            log::error!("{} panicked", name);
            panicked += 1;
        }
    }
    if panicked > 0 {
        return Err(Error::ServerError(format!("{} worker thread(s) panicked", panicked)));
    }
    Ok(())
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Stop accepting requests and wait for the workers to exit.
    pub fn shutdown(self) {
        self.stopping.store(true, Ordering::SeqCst);
        for _ in &self.threads {
            self.inner.unblock();
        }
        if let Err(e) = join_workers(self.threads) {
            log::error!("shutdown: {}", e);
        }
    }
}

fn worker_loop(server: &tiny_http::Server, app: &App, stopping: &AtomicBool) {
    loop {
        let request = match server.recv() {
            Ok(r) => r,
            Err(e) => {
                if stopping.load(Ordering::SeqCst) {
                    break;
                }
                log::warn!("accept failed: {}", e);
                continue;
            }
        };
        if stopping.load(Ordering::SeqCst) {
            break;
        }
        serve_one(request, app);
    }
}

fn serve_one(mut request: tiny_http::Request, app: &App) {
    let method = request.method().to_string();
    let url = request.url().to_string();

    // Read one byte past the limit so oversized bodies are detectable.
    let mut body = Vec::new();
    let limit = app.max_body_bytes as u64 + 1;
    let reply = match request.as_reader().take(limit).read_to_end(&mut body) {
        Ok(_) => app.handle(&method, &url, &body),
        Err(e) => Reply::error(400, format!("cannot read request body: {}", e)),
    };
    log::debug!("{} {} -> {}", method, url, reply.status);

    let mut response = tiny_http::Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(h) = tiny_http::Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(h);
    }
    if let Some(tag) = reply.etag {
        if let Ok(h) = tiny_http::Header::from_bytes(&b"ETag"[..], tag.as_bytes()) {
            response = response.with_header(h);
        }
    }
    if let Err(e) = request.respond(response) {
        log::warn!("failed to send response for {}: {}", url, e);
    }
}

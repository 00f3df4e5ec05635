//! HTTP surface for the canvas service.
//!
//! Routes:
//! - `POST /` with a JSON array of draw requests stores a new drawing and
//!   answers `{"id", "canvas"}`
//! - `GET /{id}` answers the stored record as JSON
//! - `GET /{id}/text` answers the drawing as plain text
//!
//! Errors are answered as `{"message": ...}`: `400` for bad input, `404` for
//! unknown drawings or routes, `500` for everything else.

use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error, info, warn};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response};

use crate::request::DrawRequests;
use crate::{CanvasService, Error, Result, ServerConfig};

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// A routed response before it is written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Reply { status, content_type: JSON, body },
            Err(e) => {
                error!("failed to encode response: {}", e);
                Reply::message(500, "failed to process the request")
            }
        }
    }

    fn text(body: String) -> Self {
        Reply { status: 200, content_type: TEXT, body }
    }

    fn message(status: u16, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { message })
            .unwrap_or_else(|_| r#"{"message":"failed to process the request"}"#.to_string());
        Reply { status, content_type: JSON, body }
    }

    fn from_error(err: &Error) -> Self {
        match err {
            Error::NotFound(_) => Reply::message(404, &err.to_string()),
            e if e.is_client_error() => Reply::message(400, &e.to_string()),
            e => {
                error!("request failed: {}", e);
                Reply::message(500, "failed to process the request")
            }
        }
    }
}

/// Route one request. Socket-free so it can be tested directly.
pub fn route(service: &CanvasService, method: &Method, url: &str, body: &str) -> Reply {
    let path = url.split(['?', '#']).next().unwrap_or("/");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match (method, segments.as_slice()) {
        (Method::Post, []) => DrawRequests::from_json(body)
            .and_then(|requests| service.save(&requests))
            .map(|response| Reply::json(200, &response)),
        (Method::Get, [id]) => service.get_by_id(id).map(|drawing| Reply::json(200, &drawing)),
        (Method::Get, [id, "text"]) => service.get_by_id(id).map(|drawing| Reply::text(drawing.drawing)),
        (_, [] | [_] | [_, "text"]) => {
            return Reply::message(405, "method not allowed");
        }
        _ => return Reply::message(404, "not found"),
    };

    result.unwrap_or_else(|e| Reply::from_error(&e))
}

/// A bound HTTP server that has not started serving yet.
pub struct Server {
    http: Arc<tiny_http::Server>,
    service: CanvasService,
    workers: usize,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("addr", &self.local_addr())
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Bind the listening socket described by `config`.
    pub fn bind(config: &ServerConfig, service: CanvasService) -> Result<Self> {
        config.validate()?;
        let addr = config.bind_addr();
        let http = tiny_http::Server::http(&addr)
            .map_err(|e| Error::ServerError(format!("cannot bind {}: {}", addr, e)))?;
        Ok(Self {
            http: Arc::new(http),
            service,
            workers: config.workers,
        })
    }

    /// Actual listening address (useful with port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http.server_addr().to_ip()
    }

    /// Start the worker threads and return a handle for shutting them down.
    pub fn spawn(self) -> Result<ServerHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let addr = self.local_addr();
        info!("listening on {:?} with {} workers", addr, self.workers);

        let mut threads = Vec::with_capacity(self.workers);
        for n in 0..self.workers {
            let http = Arc::clone(&self.http);
            let service = self.service.clone();
            let stop = Arc::clone(&stop);
            let handle = std::thread::Builder::new()
                .name(format!("sketchgrid-http-{n}"))
                .spawn(move || serve(&http, &service, &stop))?;
            threads.push(handle);
        }

        Ok(ServerHandle {
            http: self.http,
            stop,
            threads,
            addr,
        })
    }

    /// Serve until the process exits.
    pub fn run(self) -> Result<()> {
        self.spawn()?.join()
    }
}

/// Running server; dropping it leaves the workers running.
pub struct ServerHandle {
    http: Arc<tiny_http::Server>,
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    addr: Option<SocketAddr>,
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("addr", &self.addr)
            .field("workers", &self.threads.len())
            .finish_non_exhaustive()
    }
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Stop accepting requests and wait for the workers to finish.
    pub fn shutdown(self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        for _ in &self.threads {
            self.http.unblock();
        }
        self.join()
    }

    fn join(self) -> Result<()> {
        for handle in self.threads {
            handle
                .join()
                .map_err(|_| Error::ServerError("worker thread panicked".to_string()))?;
        }
        Ok(())
    }
}

fn serve(http: &tiny_http::Server, service: &CanvasService, stop: &AtomicBool) {
    loop {
        let request = http.recv();
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match request {
            Ok(request) => handle(service, request),
            Err(e) => warn!("failed to receive request: {}", e),
        }
    }
}

fn handle(service: &CanvasService, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    let reply = match request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_string(&mut body)
    {
        Ok(n) if n as u64 > MAX_BODY_BYTES => Reply::message(413, "request body too large"),
        Ok(_) => route(service, &method, &url, &body),
        Err(e) => {
            debug!("unreadable body for {} {}: {}", method, url, e);
            Reply::message(400, "request body must be UTF-8 text")
        }
    };
    debug!("{} {} -> {}", method, url, reply.status);

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        warn!("failed to write response for {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryRepository, ServiceOptions};

    fn service() -> CanvasService {
        CanvasService::new(Arc::new(MemoryRepository::new()), ServiceOptions::default())
    }

    #[test]
    fn post_then_get() {
        let svc = service();
        let reply = route(&svc, &Method::Post, "/", r#"[{"width":1,"height":1,"fill":"*"}]"#);
        assert_eq!(reply.status, 200);
        let created: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(created["canvas"], "*");

        let id = created["id"].as_str().unwrap();
        let reply = route(&svc, &Method::Get, &format!("/{id}"), "");
        assert_eq!(reply.status, 200);
        let stored: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(stored["drawing"], "*");
        assert!(stored["created_at"].is_string());

        let reply = route(&svc, &Method::Get, &format!("/{id}/text?x=1"), "");
        assert_eq!(reply, Reply::text("*".to_string()));
    }

    #[test]
    fn empty_batch_is_bad_request() {
        let reply = route(&service(), &Method::Post, "/", "[]");
        assert_eq!(reply.status, 400);
        assert!(reply.body.contains("at least one request is required"));
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let reply = route(&service(), &Method::Post, "/", "{");
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let reply = route(&service(), &Method::Get, "/nope", "");
        assert_eq!(reply.status, 404);
        assert!(reply.body.contains("message"));
    }

    #[test]
    fn wrong_method_and_unknown_route() {
        let svc = service();
        assert_eq!(route(&svc, &Method::Get, "/", "").status, 405);
        assert_eq!(route(&svc, &Method::Delete, "/abc", "").status, 405);
        assert_eq!(route(&svc, &Method::Get, "/a/b/c", "").status, 404);
    }
}

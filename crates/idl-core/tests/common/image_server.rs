//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths. Each route chooses its status, body, whether
//! `Content-Length` is declared and an optional redirect target. Every
//! response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// If false, the body is sent without `Content-Length` (read until close).
    pub declare_length: bool,
    pub location: Option<String>,
    /// If true, HEAD succeeds but GET answers 500.
    pub fail_get: bool,
    /// Status answered to HEAD instead of `status`.
    pub head_status: Option<u16>,
}

impl Route {
    pub fn image(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            declare_length: true,
            location: None,
            fail_get: false,
            head_status: None,
        }
    }

    pub fn undeclared(body: Vec<u8>) -> Self {
        Self {
            declare_length: false,
            ..Self::image(body)
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::image(Vec::new())
        }
    }

    pub fn broken_get(body: Vec<u8>) -> Self {
        Self {
            fail_get: true,
            ..Self::image(body)
        }
    }

    /// HEAD answers `head_status`; GET serves the image.
    pub fn get_only(body: Vec<u8>, head_status: u16) -> Self {
        Self {
            head_status: Some(head_status),
            ..Self::image(body)
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 301,
            location: Some(to.to_string()),
            ..Self::image(Vec::new())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { head_allowed: true }
    }
}

pub struct ImageServer {
    base: String,
    requests: Arc<AtomicUsize>,
}

impl ImageServer {
    /// `http://127.0.0.1:<port>` followed by `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests received so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub fn start(routes: Vec<(&str, Route)>) -> ImageServer {
    start_with_options(routes, ServerOptions::default())
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start_with_options(routes: Vec<(&str, Route)>, opts: ServerOptions) -> ImageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            counter.fetch_add(1, Ordering::SeqCst);
            thread::spawn(move || handle(stream, &routes, opts));
        }
    });
    ImageServer {
        base: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Port with nothing listening on it (bound then released).
pub fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}

const METHOD_NOT_ALLOWED: &[u8] =
    b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, opts: ServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (method, path) = parse_request_line(&request);
    let is_head = method.eq_ignore_ascii_case("HEAD");

    if (is_head && !opts.head_allowed) || (!is_head && !method.eq_ignore_ascii_case("GET")) {
        let _ = stream.write_all(METHOD_NOT_ALLOWED);
        return;
    }

    let not_found = Route::status(404);
    let broken = Route::status(500);
    let mut route = routes.get(path).unwrap_or(&not_found);
    if route.fail_get && !is_head {
        route = &broken;
    }

    let status = match route.head_status {
        Some(status) if is_head => status,
        _ => route.status,
    };
    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason(status));
    if route.declare_length {
        head.push_str(&format!("Content-Length: {}\r\n", route.body.len()));
    }
    if let Some(location) = &route.location {
        head.push_str(&format!("Location: {}\r\n", location));
    }
    head.push_str("Content-Type: application/octet-stream\r\nConnection: close\r\n\r\n");
    let _ = stream.write_all(head.as_bytes());
    if !is_head {
        let _ = stream.write_all(&route.body);
    }
    let _ = stream.flush();
}

/// Reads until the end of the request headers.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            break;
        }
    }
    if data.is_empty() {
        return None;
    }
    String::from_utf8(data).ok()
}

/// Returns (method, path) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed map of request paths to bodies and answers anything else
//! with 404. Every GET path is recorded so tests can assert what was fetched.
//! Selected paths can announce a `Content-Length` larger than the body they
//! send, to simulate a transfer cut short.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub struct ObjectServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ObjectServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectServerOptions {
    /// Path -> extra bytes announced in `Content-Length` but never sent.
    pub overstated: HashMap<String, usize>,
}

/// Starts a server in a background thread serving `routes` (path without
/// leading slash -> body). The server runs until the process exits.
pub fn start(routes: Vec<(String, Vec<u8>)>) -> ObjectServer {
    start_with_options(routes, ObjectServerOptions::default())
}

/// Like `start` but with some responses cut short.
pub fn start_with_options(
    routes: Vec<(String, Vec<u8>)>,
    opts: ObjectServerOptions,
) -> ObjectServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(routes.into_iter().collect());
    let opts = Arc::new(opts);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let opts = Arc::clone(&opts);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &opts, &log));
        }
    });
    ObjectServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Vec<u8>>,
    opts: &ObjectServerOptions,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut request_line = request.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("");
    let path = request_line.next().unwrap_or("/").trim_start_matches('/');

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    log.lock().unwrap().push(path.to_string());

    match routes.get(path) {
        Some(body) => {
            let extra = opts.overstated.get(path).copied().unwrap_or(0);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len() + extra
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
}

//! Test support: a canned HTTP responder on a real socket, plus helpers
//! for building unsigned JWTs and wired-up clients.

use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::storage::{MemoryStorage, Storage};

/// One request the stub saw: method, path, raw body.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A TCP listener that answers each incoming request with the next canned
/// `(status, body)` pair, then stops accepting.
pub(crate) struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub(crate) async fn spawn(responses: Vec<(u16, String)>) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                serve_one(&mut socket, status, &body, &recorded).await;
            }
        });

        Self { base_url: format!("http://{addr}"), requests }
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_one(socket: &mut TcpStream, status: u16, body: &str, recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 1024];

    // Read until the end of the headers.
    let header_end = loop {
        let Ok(n) = socket.read(&mut tmp).await else { return };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let Ok(n) = socket.read(&mut tmp).await else { return };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
    recorded.lock().unwrap().push(RecordedRequest {
        method: request_line.next().unwrap_or("").to_string(),
        path: request_line.next().unwrap_or("").to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    });

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Build an unsigned JWT with the given subject and expiry. The signature
/// segment is junk — the client never verifies it.
pub(crate) fn make_jwt(sub: &str, exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": sub, "exp": exp }).to_string());
    format!("{header}.{payload}.x")
}

/// A client over in-memory storage pointed at `base_url`.
pub(crate) fn test_client(base_url: &str) -> Client {
    test_client_with(base_url, Arc::new(MemoryStorage::new()))
}

pub(crate) fn test_client_with(base_url: &str, storage: Arc<dyn Storage>) -> Client {
    Client::new(ClientConfig::new(base_url), storage).unwrap()
}

//! Integration tests for the replay pass over real HTTP
//!
//! A small blocking HTTP stub records every request it receives and answers
//! with a per-path status code, so passes run through `HttpTransport` exactly
//! as they do in production.

use gaslight_core::{
    capture, run_replay_pass, Database, DeliveryError, EndpointConfig, PassOutcome, RelayConfig,
};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    statuses: Arc<Mutex<HashMap<String, u16>>>,
}

impl StubServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind stub server");
        let addr = listener.local_addr().expect("stub server has no address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(HashMap::new()));

        let thread_requests = Arc::clone(&requests);
        let thread_statuses = Arc::clone(&statuses);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &thread_requests, &thread_statuses);
            }
        });

        Self {
            addr,
            requests,
            statuses,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn set_status(&self, path: &str, status: u16) {
        self.statuses
            .lock()
            .unwrap()
            .insert(path.to_string(), status);
    }

    fn clear_statuses(&self) {
        self.statuses.lock().unwrap().clear();
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn handle(
    stream: TcpStream,
    requests: &Mutex<Vec<RecordedRequest>>,
    statuses: &Mutex<HashMap<String, u16>>,
) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut content_type = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "content-type" => content_type = Some(value.to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let status = statuses.lock().unwrap().get(&path).copied().unwrap_or(200);
    requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        content_type,
        body,
    });

    let mut stream = reader.into_inner();
    let response = format!(
        "HTTP/1.1 {} Stub\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        status
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn open_queue() -> (TempDir, Database) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::open(&dir.path().join("gaslight.db")).expect("failed to open database");
    db.migrate().expect("failed to migrate");
    (dir, db)
}

fn endpoints(server: &StubServer) -> EndpointConfig {
    EndpointConfig::empty()
        .with("gql", server.base_url())
        .with("otel", format!("{}/", server.base_url()))
}

#[test]
fn pass_halts_on_server_error_and_keeps_tail() {
    let server = StubServer::start();
    let (_dir, db) = open_queue();

    capture(&db, "gql:/a", b"{\"n\":1}".as_slice()).unwrap();
    let second = capture(&db, "otel:/b", b"{\"n\":2}".as_slice()).unwrap();
    let third = capture(&db, "gql:/c", b"{\"n\":3}".as_slice()).unwrap();
    server.set_status("/b", 500);

    let report = run_replay_pass(&db, &endpoints(&server), &RelayConfig::default()).unwrap();

    assert_eq!(report.processed, 1);
    match &report.outcome {
        PassOutcome::Halted { entry_id, reason } => {
            assert_eq!(*entry_id, second);
            assert!(matches!(reason, DeliveryError::Status(500)));
        }
        PassOutcome::Succeeded => panic!("pass should halt on HTTP 500"),
    }

    assert_eq!(server.paths(), vec!["/a", "/b"]);

    let left: Vec<_> = db.entries().unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(left, vec![second, third]);
}

#[test]
fn requests_carry_payload_and_json_content_type() {
    let server = StubServer::start();
    let (_dir, db) = open_queue();

    let raw = b"{\"query\":\"mutation pushPayload\", \"variables\": {}}".to_vec();
    capture(&db, "gql", raw.clone()).unwrap();
    capture(
        &db,
        "otel:/v1/traces",
        serde_json::json!({"resourceSpans": [{"scopeSpans": []}]}),
    )
    .unwrap();

    let report = run_replay_pass(&db, &endpoints(&server), &RelayConfig::default()).unwrap();

    assert_eq!(report.processed, 2);
    assert!(report.outcome.is_success());
    assert_eq!(db.count().unwrap(), 0);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/");
    assert_eq!(requests[0].body, raw);
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );

    assert_eq!(requests[1].path, "/v1/traces");
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body, serde_json::json!({"resourceSpans": [{"scopeSpans": []}]}));
}

#[test]
fn next_pass_retries_failed_entry_first() {
    let server = StubServer::start();
    let (_dir, db) = open_queue();

    capture(&db, "gql:/1", b"1".as_slice()).unwrap();
    capture(&db, "gql:/2", b"2".as_slice()).unwrap();
    capture(&db, "gql:/3", b"3".as_slice()).unwrap();
    server.set_status("/2", 503);

    let first = run_replay_pass(&db, &endpoints(&server), &RelayConfig::default()).unwrap();
    assert_eq!(first.processed, 1);
    assert!(!first.outcome.is_success());

    server.clear_statuses();
    let second = run_replay_pass(&db, &endpoints(&server), &RelayConfig::default()).unwrap();

    assert_eq!(second.processed, 2);
    assert!(second.outcome.is_success());
    assert_eq!(server.paths(), vec!["/1", "/2", "/2", "/3"]);
    assert_eq!(db.count().unwrap(), 0);
}

#[test]
fn connection_refused_halts_pass() {
    // Grab a free port, then close it so nothing is listening
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let (_dir, db) = open_queue();
    let id = capture(&db, "gql", b"{}".as_slice()).unwrap();

    let endpoints = EndpointConfig::empty().with("gql", format!("http://{}", addr));
    let report = run_replay_pass(&db, &endpoints, &RelayConfig::default()).unwrap();

    assert_eq!(report.processed, 0);
    match &report.outcome {
        PassOutcome::Halted { entry_id, reason } => {
            assert_eq!(*entry_id, id);
            assert!(matches!(reason, DeliveryError::Transport(_)));
        }
        PassOutcome::Succeeded => panic!("pass should halt when nothing is listening"),
    }
    assert_eq!(db.count().unwrap(), 1);
}

#[test]
fn configured_timeout_bounds_a_hung_delivery() {
    // Accepts connections into the backlog but never answers
    let silent = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = silent.local_addr().unwrap();
    let (_dir, db) = open_queue();
    capture(&db, "gql", b"{}".as_slice()).unwrap();

    let endpoints = EndpointConfig::empty().with("gql", format!("http://{}", addr));
    let relay = RelayConfig {
        timeout_secs: Some(1),
    };
    let report = run_replay_pass(&db, &endpoints, &relay).unwrap();

    assert_eq!(report.processed, 0);
    assert!(matches!(
        report.outcome,
        PassOutcome::Halted {
            reason: DeliveryError::Transport(_),
            ..
        }
    ));
    assert_eq!(db.count().unwrap(), 1);
    drop(silent);
}

#[test]
fn empty_queue_makes_no_requests() {
    let server = StubServer::start();
    let (_dir, db) = open_queue();

    let report = run_replay_pass(&db, &endpoints(&server), &RelayConfig::default()).unwrap();

    assert_eq!(report.processed, 0);
    assert!(report.outcome.is_success());
    assert!(server.requests().is_empty());
}

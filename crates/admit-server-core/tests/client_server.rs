//! End-to-end client/server exchanges over a real TCP socket (tag mode)

use admit_persistence::{ApplicationStore, Database, DatabaseConfig, NumberingStrategy};
use admit_protocol::{canonical_bytes, compute_tag, FrameCodec, SubmissionOutcome};
use admit_server_core::{AppState, AuthMode, ConnectionDispatcher};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

const SECRET: &[u8] = b"test-shared-secret";

struct TestServer {
    addr: SocketAddr,
    store: ApplicationStore,
    _dir: tempfile::TempDir,
}

async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("test.db").to_string_lossy().into_owned(),
        ..DatabaseConfig::default()
    };
    let db = Database::new(config).await.unwrap();
    db.migrate().await.unwrap();

    let pool = db.pool().clone();
    let store = ApplicationStore::new(pool.clone(), "DBS", NumberingStrategy::Sequence);

    let state = AppState {
        auth: AuthMode::Tag {
            secret: SECRET.to_vec(),
        },
        store,
        max_message_size: 64 * 1024,
        read_timeout: Duration::from_secs(5),
    };

    let dispatcher = ConnectionDispatcher::new(state, None, 100);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { dispatcher.serve(listener).await });

    TestServer {
        addr,
        store: ApplicationStore::new(pool, "DBS", NumberingStrategy::Sequence),
        _dir: dir,
    }
}

fn applicant() -> Value {
    json!({
        "name": "Jane Doe",
        "address": "1 Main St",
        "qualifications": "BSc CS",
        "course": "MSc Data Analytics",
        "start_year": 2025,
        "start_month": 9
    })
}

fn envelope(applicant: &Value, client_id: &str) -> Vec<u8> {
    let tag = compute_tag(SECRET, &canonical_bytes(applicant).unwrap());
    serde_json::to_vec(&json!({
        "applicant": applicant,
        "client_id": client_id,
        "hmac": tag
    }))
    .unwrap()
}

async fn submit(addr: SocketAddr, payload: Vec<u8>) -> SubmissionOutcome {
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut framed = Framed::new(stream, FrameCodec::new());
    framed.send(Bytes::from(payload)).await.unwrap();
    let response = framed.next().await.expect("response").unwrap();
    serde_json::from_slice(&response).unwrap()
}

#[tokio::test]
async fn valid_submission_is_stored_and_numbered() {
    let server = start_server().await;

    let outcome = submit(server.addr, envelope(&applicant(), "cli-1")).await;
    let SubmissionOutcome::Ok { application_number } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(application_number, "DBS-2025-09-000001");

    let stored = server
        .store
        .find_by_number(&application_number)
        .await
        .unwrap()
        .expect("row stored");
    assert_eq!(stored.name, "Jane Doe");
    assert_eq!(stored.address.as_deref(), Some("1 Main St"));
    assert_eq!(stored.qualifications, "BSc CS");
    assert_eq!(stored.course, "MSc Data Analytics");
    assert_eq!(stored.start_year, 2025);
    assert_eq!(stored.start_month, 9);
    assert_eq!(stored.client_id.as_deref(), Some("cli-1"));
}

#[tokio::test]
async fn bogus_tag_is_rejected_and_nothing_stored() {
    let server = start_server().await;

    let payload = serde_json::to_vec(&json!({
        "applicant": applicant(),
        "client_id": "cli-1",
        "hmac": "deadbeef"
    }))
    .unwrap();

    let outcome = submit(server.addr, payload).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::error("HMAC verification failed")
    );
    assert_eq!(server.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn payload_tampered_after_tagging_is_rejected() {
    let server = start_server().await;

    // Tag one applicant, send another under the same tag
    let tag = compute_tag(SECRET, &canonical_bytes(&applicant()).unwrap());
    let mut tampered = applicant();
    tampered["name"] = json!("Mallory");
    let payload = serde_json::to_vec(&json!({
        "applicant": tampered,
        "client_id": "cli-1",
        "hmac": tag
    }))
    .unwrap();

    let outcome = submit(server.addr, payload).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::error("HMAC verification failed")
    );
    assert_eq!(server.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn validation_failure_reports_the_reason() {
    let server = start_server().await;

    let mut a = applicant();
    a["start_month"] = json!(13);
    let outcome = submit(server.addr, envelope(&a, "cli-1")).await;
    assert_eq!(outcome, SubmissionOutcome::error("Invalid start year/month"));

    let mut a = applicant();
    a["name"] = json!("");
    let outcome = submit(server.addr, envelope(&a, "cli-1")).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::error("Missing required field: name")
    );

    assert_eq!(server.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn undecodable_payload_gets_an_error_response() {
    let server = start_server().await;

    let outcome = submit(server.addr, b"this is not json".to_vec()).await;
    assert_eq!(outcome, SubmissionOutcome::error("Invalid request"));

    // An empty message is a legal frame but not a valid request
    let outcome = submit(server.addr, Vec::new()).await;
    assert_eq!(outcome, SubmissionOutcome::error("Invalid request"));
}

#[tokio::test]
async fn half_closed_connection_does_not_take_down_the_listener() {
    let server = start_server().await;

    // Open a connection, write a partial prefix, and hang up
    {
        use tokio::io::AsyncWriteExt;
        let mut stream = TcpStream::connect(server.addr).await.unwrap();
        stream.write_all(&[0x00, 0x00]).await.unwrap();
    }

    // The server must still serve the next client
    let outcome = submit(server.addr, envelope(&applicant(), "cli-2")).await;
    assert!(matches!(outcome, SubmissionOutcome::Ok { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_submissions_get_distinct_numbers() {
    let server = start_server().await;
    let addr = server.addr;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50u32 {
        tasks.spawn(async move {
            let payload = envelope(&applicant(), &format!("cli-{i}"));
            submit(addr, payload).await
        });
    }

    let mut numbers = std::collections::HashSet::new();
    while let Some(outcome) = tasks.join_next().await {
        let SubmissionOutcome::Ok { application_number } = outcome.unwrap() else {
            panic!("submission failed");
        };
        assert!(numbers.insert(application_number), "duplicate number issued");
    }

    assert_eq!(numbers.len(), 50);
    assert_eq!(server.store.count().await.unwrap(), 50);
}

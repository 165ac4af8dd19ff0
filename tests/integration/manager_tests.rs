//! Connection manager integration tests

mod common;

use common::{MockEditor, Reply, Request, PONG};
use editor_bridge::connection::ConnectionPhase;
use editor_bridge::{BridgeError, ConnectionManager, Params};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// First acquire connects and verifies with a ping
#[tokio::test]
async fn test_acquire_creates_verified_connection() {
    let editor = MockEditor::echo().await;
    let manager = ConnectionManager::new(editor.config());

    let lease = manager.acquire().await.unwrap();
    assert!(lease.is_connected());
    drop(lease);

    assert!(manager.has_connection().await);
    assert_eq!(editor.accepted(), 1);
    assert_eq!(editor.requests(), vec![Request::Ping]);
}

/// A healthy connection is pinged and reused
#[tokio::test]
async fn test_acquire_reuses_healthy_connection() {
    let editor = MockEditor::echo().await;
    let manager = ConnectionManager::new(editor.config());

    let first = manager.acquire().await.unwrap().info().unwrap();
    let second = manager.acquire().await.unwrap().info().unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(editor.accepted(), 1);
    assert_eq!(editor.requests(), vec![Request::Ping, Request::Ping]);
}

/// A connection that fails its liveness check is replaced
#[tokio::test]
async fn test_acquire_replaces_stale_connection() {
    let drop_next_ping = Arc::new(AtomicBool::new(false));
    let editor = {
        let drop_next_ping = drop_next_ping.clone();
        MockEditor::start(move |request| match request {
            Request::Ping if drop_next_ping.swap(false, Ordering::SeqCst) => Reply::Close,
            Request::Ping => Reply::Send(PONG.to_vec()),
            Request::Command { .. } => Reply::Send(br#"{"status":"success"}"#.to_vec()),
        })
        .await
    };
    let manager = ConnectionManager::new(editor.config());

    let first = manager.acquire().await.unwrap().info().unwrap();
    drop_next_ping.store(true, Ordering::SeqCst);
    let second = manager.acquire().await.unwrap().info().unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.phase, ConnectionPhase::Connected);
    assert_eq!(editor.accepted(), 2);
}

/// A protocol failure invalidates the connection; the next request repairs it
#[tokio::test]
async fn test_exchange_failure_is_repaired_on_next_request() {
    let editor = MockEditor::start(|request| match request {
        Request::Ping => Reply::Send(PONG.to_vec()),
        Request::Command { command_type, .. } if command_type == "restart" => Reply::Close,
        Request::Command { params, .. } => Reply::Send(
            serde_json::to_vec(&json!({"status": "success", "result": params})).unwrap(),
        ),
    })
    .await;
    let manager = ConnectionManager::new(editor.config());

    let err = manager.exchange("restart", Params::new()).await.unwrap_err();
    assert!(matches!(err, BridgeError::Communication(_)));
    let status = manager.status().await.unwrap();
    assert_eq!(status.phase, ConnectionPhase::Disconnected);

    let result = manager
        .exchange("manage_scene", Params::new().set("action", "save"))
        .await
        .unwrap();
    assert_eq!(result, json!({"action": "save"}));
    assert_eq!(editor.accepted(), 2);
}

/// Remote errors do not cost the connection
#[tokio::test]
async fn test_remote_error_keeps_connection_for_reuse() {
    let editor = MockEditor::start(|request| match request {
        Request::Ping => Reply::Send(PONG.to_vec()),
        Request::Command { .. } => {
            Reply::Send(br#"{"status":"error","error":"bad path"}"#.to_vec())
        }
    })
    .await;
    let manager = ConnectionManager::new(editor.config());

    for _ in 0..2 {
        let err = manager
            .exchange("manage_asset", Params::new().set("path", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref m) if m == "bad path"));
    }
    assert_eq!(editor.accepted(), 1);
}

/// Unreachable editor: unavailable, slot empty, next acquire tries again
#[tokio::test]
async fn test_unreachable_editor() {
    let editor = MockEditor::echo().await;
    let config = editor.config();
    editor.stop();
    drop(editor);
    tokio::task::yield_now().await;

    let manager = ConnectionManager::new(config);
    for _ in 0..2 {
        let err = manager.acquire().await.err().unwrap();
        assert!(matches!(err, BridgeError::ConnectionUnavailable { .. }), "got {err:?}");
        assert!(!manager.has_connection().await);
    }
}

/// A fresh connection that fails verification is discarded
#[tokio::test]
async fn test_unverified_connection_is_discarded() {
    let editor = MockEditor::start(|_| {
        Reply::Send(br#"{"status":"error","error":"compiling"}"#.to_vec())
    })
    .await;
    let manager = ConnectionManager::new(editor.config());

    let err = manager.acquire().await.err().unwrap();
    match err {
        BridgeError::ConnectionUnavailable { reason, .. } => {
            assert!(reason.contains("could not verify new connection"));
            assert!(reason.contains("compiling"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!manager.has_connection().await);

    assert!(manager.acquire().await.is_err());
    assert_eq!(editor.accepted(), 2);
}

/// Concurrent callers are serialized onto the single connection
#[tokio::test]
async fn test_concurrent_exchanges_are_serialized() {
    let editor = MockEditor::echo().await;
    let manager = ConnectionManager::new(editor.config());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            tokio::spawn(async move {
                let result = manager
                    .exchange("manage_gameobject", Params::new().set("index", i))
                    .await
                    .unwrap();
                assert_eq!(result, json!({ "index": i }));
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(editor.accepted(), 1);
    let requests = editor.requests();
    assert_eq!(requests.len(), 16);
    for pair in requests.chunks(2) {
        assert_eq!(pair[0], Request::Ping);
        assert!(matches!(pair[1], Request::Command { .. }));
    }
}

#[tokio::test]
async fn test_release_forces_new_connection() {
    let editor = MockEditor::echo().await;
    let manager = ConnectionManager::new(editor.config());

    assert!(manager.startup().await);
    manager.release().await;
    manager.release().await;
    assert!(!manager.has_connection().await);

    manager.acquire().await.unwrap().release().await;
    assert!(!manager.has_connection().await);

    manager.exchange("read_console", Params::new()).await.unwrap();
    assert_eq!(editor.accepted(), 3);
}

#[tokio::test]
async fn test_connection_report_and_status() {
    let editor = MockEditor::echo().await;
    let manager = ConnectionManager::new(editor.config());

    let report = manager.test_connection().await;
    assert!(report.success);
    assert_eq!(report.data, Some(json!({"message": "pong"})));

    let status = manager.status().await.unwrap();
    assert_eq!(status.phase, ConnectionPhase::Connected);
    // Verification ping plus the test ping
    assert_eq!(status.exchanges, 2);
    assert_eq!(status.endpoint, format!("127.0.0.1:{}", editor.addr.port()));

    manager.shutdown().await;
    assert!(manager.status().await.is_none());
}

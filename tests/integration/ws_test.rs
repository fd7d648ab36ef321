//! Integration tests for live delivery over WebSocket.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use uuid::Uuid;

use helpers::{TestApp, create_body};

const BASE: &str = "/api/v1/notifications";

async fn rejected_status(url: &str) -> StatusCode {
    match connect_async(url).await {
        Ok(_) => panic!("upgrade to {url} should have been refused"),
        Err(WsError::Http(response)) => {
            StatusCode::from_u16(response.status().as_u16()).expect("valid status")
        }
        Err(e) => panic!("unexpected handshake error: {e}"),
    }
}

#[tokio::test]
async fn test_upgrade_requires_valid_user_id() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let status = rejected_status(&format!("ws://{addr}/ws")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let status = rejected_status(&format!("ws://{addr}/ws?user_id=not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.hub.client_count().await, 0);
}

#[tokio::test]
async fn test_plain_get_is_not_upgraded() {
    let app = TestApp::new().await;
    let response = app
        .request("GET", &format!("/ws?user_id={}", Uuid::new_v4()), None)
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_event_reaches_matching_session_only() {
    let app = TestApp::new().await;
    let addr = app.serve().await;
    let user = Uuid::new_v4();
    let sender = Uuid::new_v4();

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws?user_id={user}&app_type=MANPOWER"))
        .await
        .expect("handshake failed");
    app.wait_for_clients(1).await;

    // Wrong application, then wrong user; neither may reach the socket.
    app.request("POST", BASE, Some(create_body("RECRUITMENT", &[user], sender)))
        .await;
    app.request(
        "POST",
        BASE,
        Some(create_body("MANPOWER", &[Uuid::new_v4()], sender)),
    )
    .await;
    app.request("POST", BASE, Some(create_body("MANPOWER", &[user], sender)))
        .await;

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("no event within 5s")
        .expect("socket closed")
        .expect("socket error");
    let text = match frame {
        Message::Text(text) => text.to_string(),
        other => panic!("expected a text frame, got {other:?}"),
    };
    let event: Value = serde_json::from_str(&text).expect("event is not JSON");

    assert_eq!(event["user_id"], Value::String(user.to_string()));
    assert_eq!(event["application"], "MANPOWER");
    assert_eq!(event["unread_count"], 1);
    assert_eq!(event["user_name"], "Unknown");

    socket.close(None).await.expect("close failed");
    app.wait_for_clients(0).await;
}

#[tokio::test]
async fn test_session_without_app_type_skips_named_applications() {
    let app = TestApp::new().await;
    let addr = app.serve().await;
    let user = Uuid::new_v4();

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws?user_id={user}"))
        .await
        .expect("handshake failed");
    app.wait_for_clients(1).await;

    app.request("POST", BASE, Some(create_body("RECRUITMENT", &[user], user)))
        .await;
    app.request("POST", BASE, Some(create_body("ONBOARDING", &[user], user)))
        .await;

    let frame = tokio::time::timeout(Duration::from_millis(500), socket.next()).await;
    assert!(frame.is_err(), "unexpected frame: {frame:?}");
    assert_eq!(app.hub.client_count().await, 1);
}

#[tokio::test]
async fn test_server_hangs_up_when_peer_ignores_close() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    let handshake = format!(
        "GET /ws?user_id={} HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n",
        Uuid::new_v4()
    );
    stream
        .write_all(handshake.as_bytes())
        .await
        .expect("handshake write failed");

    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        stream.read_exact(&mut byte).await.expect("handshake read failed");
        head.push(byte[0]);
    }
    assert!(String::from_utf8_lossy(&head).starts_with("HTTP/1.1 101"));
    app.wait_for_clients(1).await;

    // Closing every client queue makes the server send its close frame.
    // This peer never answers it, so the server has to drop the socket.
    app.stop_hub();
    let hung_up = tokio::time::timeout(Duration::from_secs(3), async {
        let mut buf = [0u8; 64];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    })
    .await;
    assert!(hung_up.is_ok(), "server kept the connection open");
}

#[tokio::test]
async fn test_dropped_connection_is_unregistered() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let (socket, _) = connect_async(format!("ws://{addr}/ws?user_id={}", Uuid::new_v4()))
        .await
        .expect("handshake failed");
    app.wait_for_clients(1).await;

    drop(socket);
    app.wait_for_clients(0).await;
}

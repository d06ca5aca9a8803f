//! Shared helpers for the in-process integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hanashi_server::{
    domain::{UserId, UserProfile},
    infrastructure::{
        auth::JwtVerifier,
        repository::{InMemoryChatRepository, InMemoryMessageRepository, InMemoryUserRepository},
    },
    ui::{AppState, Server, Stores},
};
use hanashi_shared::time::SystemClock;
use serde_json::Value;
use tokio::{net::TcpStream, task::JoinHandle, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const SECRET: &[u8] = b"integration-test-secret";
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Helper struct to manage an in-process server bound to an ephemeral port
pub struct TestServer {
    addr: SocketAddr,
    verifier: Arc<JwtVerifier>,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let users = InMemoryUserRepository::with_profiles([
            UserProfile::new(UserId::new("alice").unwrap(), "Alice", "alice.png"),
            UserProfile::new(UserId::new("bob").unwrap(), "Bob", "bob.png"),
            UserProfile::new(UserId::new("carol").unwrap(), "Carol", "carol.png"),
        ]);
        let stores = Stores {
            chats: Arc::new(InMemoryChatRepository::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
            users: Arc::new(users),
        };
        let verifier = Arc::new(JwtVerifier::new(SECRET));
        let state = AppState::build(stores, verifier.clone(), Arc::new(SystemClock));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(Server::new(Arc::new(state)).serve(listener));

        TestServer {
            addr,
            verifier,
            handle,
        }
    }

    /// Issue a valid bearer token for `user`
    pub fn token(&self, user: &str) -> String {
        self.verifier
            .issue(&UserId::new(user).unwrap(), 3600)
            .unwrap()
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws?token={}", self.addr, token),
            None => format!("ws://{}/ws", self.addr),
        }
    }

    /// Connect a WebSocket client authenticated as `user`
    pub async fn connect(&self, user: &str) -> WsClient {
        let token = self.token(user);
        let mut client = WsClient::connect(&self.ws_url(Some(&token))).await;
        // 接続直後のオンラインユーザー一覧に自分が含まれるまで待つ
        loop {
            let data = client.recv_event("getOnlineUsers").await;
            if data
                .as_array()
                .is_some_and(|users| users.iter().any(|u| u == user))
            {
                break;
            }
        }
        client
    }

    /// Connect an anonymous WebSocket client
    pub async fn connect_anonymous(&self) -> WsClient {
        let mut client = WsClient::connect(&self.ws_url(None)).await;
        client.recv_event("getOnlineUsers").await;
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Helper struct wrapping a tokio-tungstenite client
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Self {
        let (stream, _) = connect_async(url)
            .await
            .expect("Failed to connect WebSocket");
        WsClient { stream }
    }

    pub async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Receive the next text frame as JSON
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Stream closed")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
        }
    }

    /// Receive frames until one named `event` arrives and return its `data`
    pub async fn recv_event(&mut self, event: &str) -> Value {
        loop {
            let frame = self.recv().await;
            if frame["event"] == event {
                return frame["data"].clone();
            }
        }
    }

    /// Receive frames until the ack with `id` arrives
    pub async fn recv_ack(&mut self, id: u64) -> Value {
        loop {
            let data = self.recv_event("ack").await;
            if data["id"] == id {
                return data;
            }
        }
    }

    /// Assert that no frame named `event` arrives within `window`
    pub async fn assert_no_event(&mut self, event: &str, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return;
            }
            match timeout(remaining, self.stream.next()).await {
                Err(_) => return,
                Ok(None) => return,
                Ok(Some(Ok(Message::Text(text)))) => {
                    let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                    assert_ne!(frame["event"], event, "unexpected frame: {frame}");
                }
                Ok(Some(_)) => {}
            }
        }
    }

    /// Join a room and wait for the acknowledgement
    pub async fn join(&mut self, room: &str, ack: u64) {
        self.send(serde_json::json!({"event": "join_room", "data": room, "ack": ack}))
            .await;
        let data = self.recv_ack(ack).await;
        assert_eq!(data["ok"], true);
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

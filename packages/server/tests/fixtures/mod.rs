//! Test fixtures: an in-process relay server and a minimal WebSocket client.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use pairlink_server::ServerConfig;
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub const TEST_SERVER_ID: &str = "test-relay";
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Relay server bound to an ephemeral port, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            server_id: TEST_SERVER_ID.to_string(),
            ..ServerConfig::default()
        })
        .await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = pairlink_server::serve(listener, config, shutdown).await {
                panic!("Test server failed: {e}");
            }
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn health(&self) -> Value {
        reqwest::get(format!("{}/health", self.base_url()))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON")
    }

    /// Poll `/health` until `activeSessions` equals `expected`.
    pub async fn wait_for_active_sessions(&self, expected: u64) -> Value {
        self.wait_for_health("activeSessions", expected).await
    }

    /// Poll `/health` until `connections` equals `expected`.
    pub async fn wait_for_connections(&self, expected: u64) -> Value {
        self.wait_for_health("connections", expected).await
    }

    async fn wait_for_health(&self, field: &str, expected: u64) -> Value {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let health = self.health().await;
            if health[field] == expected {
                return health;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "{field} never reached {expected}: {health}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// WebSocket client speaking the relay's event envelope.
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_ack_id: u64,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _response) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        Self {
            stream,
            next_ack_id: 1,
        }
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn emit(&mut self, event: &str, data: Value) {
        let frame = json!({ "event": event, "data": data });
        self.send_raw(&frame.to_string()).await;
    }

    /// Join a session and wait until the server has processed it.
    pub async fn join(&mut self, session_id: &str) {
        self.emit("join-session", json!(session_id)).await;
        self.sync().await;
    }

    /// Send a ping and return its pong.
    ///
    /// Events are handled in order per connection, so every event queued for
    /// this client before the ping arrives first. Use [`Self::sync`] to assert
    /// nothing did.
    pub async fn ping(&mut self) -> Value {
        let ack_id = self.next_ack_id;
        self.next_ack_id += 1;
        let frame = json!({ "event": "ping", "ackId": ack_id });
        self.send_raw(&frame.to_string()).await;

        let reply = self.recv().await;
        assert_eq!(reply["event"], "pong", "expected pong, got {reply}");
        assert_eq!(reply["ackId"], ack_id);
        reply
    }

    /// Round-trip a ping, asserting no other event was pending.
    pub async fn sync(&mut self) {
        self.ping().await;
    }

    /// Next text frame as JSON.
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for a message")
                .expect("Stream ended")
                .expect("WebSocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
            }
        }
    }

    /// Next frame, which must be `event`.
    pub async fn expect_event(&mut self, event: &str) -> Value {
        let msg = self.recv().await;
        assert_eq!(msg["event"], event, "unexpected message: {msg}");
        msg
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

//! End-to-end relay tests over the real Socket.IO layer.
//!
//! Clients speak raw Engine.IO v4 long-polling: a GET handshake, POSTed
//! packets, and GET polls for whatever the server queued. Packet `40` joins
//! the default namespace, `41` leaves it, and `42[...]` carries an event.

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tower::ServiceExt;
use vidimeet_server::{ServerConfig, SignalServer};

const PACKET_SEPARATOR: char = '\u{1e}';

struct PollingClient {
    app: Router,
    engine_sid: String,
    /// Socket.IO id, which is also the relay's connection id
    socket_id: String,
}

impl PollingClient {
    /// Opens an Engine.IO session and joins the `/` namespace.
    async fn connect(app: Router) -> Self {
        let body = request(&app, Method::GET, "/socket.io/?EIO=4&transport=polling", None).await;
        assert!(body.starts_with('0'), "unexpected handshake: {body}");
        let open: Value = serde_json::from_str(&body[1..]).unwrap();
        let engine_sid = open["sid"].as_str().unwrap().to_string();

        let mut client = Self {
            app,
            engine_sid,
            socket_id: String::new(),
        };
        client.post("40").await;

        let ack = client
            .poll_until(|packet| packet.starts_with("40"))
            .await
            .expect("namespace connect ack");
        let ack: Value = serde_json::from_str(&ack[2..]).unwrap();
        client.socket_id = ack["sid"].as_str().unwrap().to_string();
        client
    }

    fn uri(&self) -> String {
        format!("/socket.io/?EIO=4&transport=polling&sid={}", self.engine_sid)
    }

    async fn post(&self, packet: &str) -> String {
        request(&self.app, Method::POST, &self.uri(), Some(packet.to_string())).await
    }

    async fn emit(&self, event: &str, payload: Option<Value>) {
        let frame = match payload {
            Some(payload) => json!([event, payload]),
            None => json!([event]),
        };
        self.post(&format!("42{frame}")).await;
    }

    /// Polls until a packet matches `pred`, skipping pings and others.
    async fn poll_until(&self, pred: impl Fn(&str) -> bool) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let remaining = deadline - Instant::now();
            let body = timeout(remaining, request(&self.app, Method::GET, &self.uri(), None))
                .await
                .ok()?;
            for packet in body.split(PACKET_SEPARATOR) {
                if pred(packet) {
                    return Some(packet.to_string());
                }
            }
        }
        None
    }

    /// Waits for the named event and returns its payload.
    async fn expect_event(&self, event: &str) -> Value {
        let prefix = format!("42[\"{event}\"");
        let packet = self
            .poll_until(|packet| packet.starts_with(&prefix))
            .await
            .unwrap_or_else(|| panic!("{} never received {event}", self.socket_id));
        let frame: Value = serde_json::from_str(&packet[2..]).unwrap();
        frame.get(1).cloned().unwrap_or(Value::Null)
    }
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<String>) -> String {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "text/plain;charset=UTF-8")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Waits until the relay has registered `n` connections.
async fn wait_for_connections(server: &SignalServer, n: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.matchmaker().stats().total_connections != n {
        assert!(Instant::now() < deadline, "expected {n} registered connections");
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pairing_and_signaling_over_socketio() {
    let server = SignalServer::new(ServerConfig::default());
    let alice = PollingClient::connect(server.router()).await;
    let bob = PollingClient::connect(server.router()).await;
    wait_for_connections(&server, 2).await;

    alice.emit("join-pool", None).await;
    bob.emit("join-pool", None).await;

    let alice_match = alice.expect_event("matched").await;
    let bob_match = bob.expect_event("matched").await;
    assert_eq!(alice_match["roomId"], bob_match["roomId"]);
    assert_eq!(alice_match["partnerId"], bob.socket_id.as_str());
    assert_eq!(bob_match["partnerId"], alice.socket_id.as_str());
    let room = alice_match["roomId"].clone();

    alice
        .emit("offer", Some(json!({"roomId": room, "offer": {"type": "offer", "sdp": "v=0"}})))
        .await;
    let offer = bob.expect_event("offer").await;
    assert_eq!(offer["offer"], json!({"type": "offer", "sdp": "v=0"}));
    assert_eq!(offer["partnerId"], alice.socket_id.as_str());

    bob.emit("answer", Some(json!({"roomId": room, "answer": {"type": "answer"}})))
        .await;
    let answer = alice.expect_event("answer").await;
    assert_eq!(answer, json!({"roomId": room, "answer": {"type": "answer"}}));

    bob.emit("message", Some(json!({"roomId": room, "message": "hello"})))
        .await;
    let message = alice.expect_event("message").await;
    assert_eq!(message, json!({"message": "hello"}));

    let stats = server.matchmaker().stats();
    assert_eq!(stats.active_sessions, 1);
    assert_eq!(stats.paired_connections, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_leaving_namespace_notifies_partner() {
    let server = SignalServer::new(ServerConfig::default());
    let alice = PollingClient::connect(server.router()).await;
    let bob = PollingClient::connect(server.router()).await;
    wait_for_connections(&server, 2).await;

    alice.emit("join-pool", None).await;
    bob.emit("join-pool", None).await;
    alice.expect_event("matched").await;
    bob.expect_event("matched").await;

    alice.post("41").await;
    bob.expect_event("user-disconnected").await;

    wait_for_connections(&server, 1).await;
    assert_eq!(server.matchmaker().stats().active_sessions, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_event_changes_nothing() {
    let server = SignalServer::new(ServerConfig::default());
    let alice = PollingClient::connect(server.router()).await;
    wait_for_connections(&server, 1).await;

    alice.emit("offer", Some(json!({"offer": {"sdp": "no room"}}))).await;
    alice.emit("leave-room", Some(json!({"roomId": 42}))).await;
    alice.emit("join-pool", None).await;

    let deadline = Instant::now() + Duration::from_secs(5);
    while server.matchmaker().stats().waiting != 1 {
        assert!(Instant::now() < deadline, "join-pool after bad events should still queue");
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.matchmaker().stats().active_sessions, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connections_beyond_capacity_are_refused() {
    let server = SignalServer::new(ServerConfig::default().with_max_connections(1));
    let alice = PollingClient::connect(server.router()).await;
    wait_for_connections(&server, 1).await;
    alice.emit("join-pool", None).await;

    // The second client is rejected during its namespace connect, so the
    // handshake helper cannot be used to completion.
    let body = request(
        &server.router(),
        Method::GET,
        "/socket.io/?EIO=4&transport=polling",
        None,
    )
    .await;
    let open: Value = serde_json::from_str(&body[1..]).unwrap();
    let uri = format!(
        "/socket.io/?EIO=4&transport=polling&sid={}",
        open["sid"].as_str().unwrap()
    );
    request(&server.router(), Method::POST, &uri, Some("40".to_string())).await;
    request(
        &server.router(),
        Method::POST,
        &uri,
        Some("42[\"join-pool\"]".to_string()),
    )
    .await;
    sleep(Duration::from_millis(100)).await;

    let stats = server.matchmaker().stats();
    assert_eq!(stats.total_connections, 1);
    assert_eq!(stats.waiting, 1);
    assert_eq!(stats.active_sessions, 0);
}

//! Shared fixtures for integration tests.
//!
//! A link under test listens on a [`MemoryWindow`] (synthetic inbound
//! traffic goes through [`MemoryWindow::dispatch`]) and posts into a
//! [`Recorder`], which captures every outbound message.

#![allow(dead_code)]

use std::result::Result as StdResult;
use std::time::Duration;

use frame_link::{
    FrameLink, FrameLinkOptions, InboundMessage, MemoryWindow, PING_KEY, Target, TransportError,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;

// ============================================================================
// Constants
// ============================================================================

/// Origin of the remote side in every fixture.
pub const REMOTE_ORIGIN: &str = "https://example.com";

/// Origin of the local context.
pub const LOCAL_ORIGIN: &str = "https://host.example";

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Recorder
// ============================================================================

/// Target that captures outbound messages instead of delivering them.
#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::UnboundedSender<Value>,
}

impl Target for Recorder {
    fn post_message(&self, message: Value, _target_origin: &str) -> StdResult<(), TransportError> {
        let _ = self.tx.send(message);
        Ok(())
    }
}

/// Receiving half of a [`Recorder`].
pub struct Outbox {
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Outbox {
    /// Waits for the next outbound message.
    pub async fn next(&mut self) -> Value {
        self.rx.recv().await.expect("recorder dropped")
    }

    /// Returns the next outbound message if one was already posted.
    pub fn try_next(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }

    /// Drains and counts everything posted so far.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

/// Creates a connected recorder/outbox pair.
pub fn recorder() -> (Recorder, Outbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Recorder { tx }, Outbox { rx })
}

/// Target whose every post fails.
#[derive(Clone, Copy)]
pub struct Broken;

impl Target for Broken {
    fn post_message(&self, _: Value, _: &str) -> StdResult<(), TransportError> {
        Err(TransportError::Closed)
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Builds a response to `request`.
pub fn response_to(request: &Value, payload: Value) -> Value {
    json!({
        "type": "response",
        "id": request["id"],
        "key": request["key"],
        "payload": payload,
    })
}

/// Builds an error response to `request`.
pub fn error_response_to(request: &Value, error: &str) -> Value {
    json!({
        "type": "response",
        "id": request["id"],
        "key": request["key"],
        "payload": null,
        "error": error,
    })
}

/// Builds a request.
pub fn request(id: &str, key: &str, payload: Value) -> Value {
    json!({
        "type": "request",
        "id": id,
        "key": key,
        "payload": payload,
    })
}

// ============================================================================
// Harness
// ============================================================================

/// A link under test with its inbound window and outbound recorder.
pub struct Harness {
    pub link: FrameLink,
    pub window: MemoryWindow,
    pub recorder: Recorder,
    pub outbox: Outbox,
}

impl Harness {
    /// Creates a disconnected link expecting `REMOTE_ORIGIN` with `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_options(FrameLinkOptions::new(REMOTE_ORIGIN).with_timeout(timeout))
    }

    /// Creates a disconnected link with custom options.
    pub fn with_options(options: FrameLinkOptions) -> Self {
        init_tracing();
        let window = MemoryWindow::new(LOCAL_ORIGIN);
        let link = FrameLink::new(window.clone(), options).expect("valid options");
        let (recorder, outbox) = recorder();

        Self {
            link,
            window,
            recorder,
            outbox,
        }
    }

    /// Delivers `data` as if posted by the remote side.
    pub fn deliver(&self, data: Value) {
        self.deliver_from(REMOTE_ORIGIN, data);
    }

    /// Delivers `data` credited with `origin`.
    pub fn deliver_from(&self, origin: &str, data: Value) {
        self.window.dispatch(InboundMessage::new(origin, data));
    }

    /// Runs the handshake against the recorder, answering the first ping.
    pub async fn connect(&mut self) {
        let link = self.link.clone();
        let target = self.recorder.clone();
        let connecting = tokio::spawn(async move { link.connect(target).await });

        let ping = self.outbox.next().await;
        assert_eq!(ping["key"], PING_KEY);
        self.deliver(response_to(&ping, Value::Null));

        connecting
            .await
            .expect("connect task panicked")
            .expect("handshake failed");
        assert!(self.link.is_connected());
    }

    /// Creates a link and connects it.
    pub async fn connected(timeout: Duration) -> Self {
        let mut harness = Self::new(timeout);
        harness.connect().await;
        harness
    }
}

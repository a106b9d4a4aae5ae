//! Two links talking to each other over in-process windows.

mod common;

use std::time::Duration;

use frame_link::{Error, FrameLink, FrameLinkOptions, HandlerError, MemoryWindow, Message};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use common::init_tracing;

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Session {
    user_id: String,
}

enum UserLogin {}

impl Message for UserLogin {
    const KEY: &'static str = "user:login";
    type Payload = Login;
    type Response = Session;
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Size {
    width: u32,
    height: u32,
}

enum Resize {}

impl Message for Resize {
    const KEY: &'static str = "frame:resize";
    type Payload = Size;
    type Response = ();
}

// ============================================================================
// Fixture
// ============================================================================

const HOST_ORIGIN: &str = "https://host.example";
const FRAME_ORIGIN: &str = "https://frame.example";

struct Pair {
    host_window: MemoryWindow,
    frame_window: MemoryWindow,
    host: FrameLink,
    frame: FrameLink,
}

impl Pair {
    fn new() -> Self {
        init_tracing();
        let host_window = MemoryWindow::new(HOST_ORIGIN);
        let frame_window = MemoryWindow::new(FRAME_ORIGIN);

        let host = FrameLink::new(host_window.clone(), FrameLinkOptions::new(FRAME_ORIGIN))
            .expect("valid options");
        let frame = FrameLink::new(frame_window.clone(), FrameLinkOptions::new(HOST_ORIGIN))
            .expect("valid options");

        Self {
            host_window,
            frame_window,
            host,
            frame,
        }
    }

    async fn connect(&self) {
        let (host, frame) = tokio::join!(
            self.host.connect(self.frame_window.target_from(&self.host_window)),
            self.frame.connect(self.host_window.target_from(&self.frame_window)),
        );
        host.expect("host handshake");
        frame.expect("frame handshake");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_symmetric_handshake() {
    let pair = Pair::new();

    pair.connect().await;

    assert!(pair.host.is_connected());
    assert!(pair.frame.is_connected());
    assert_eq!(pair.host.pending_count(), 0);
    assert_eq!(pair.frame.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_frame_loads_late() {
    let pair = Pair::new();

    let host = pair.host.clone();
    let target = pair.frame_window.target_from(&pair.host_window);
    let host_connect = tokio::spawn(async move { host.connect(target).await });

    // Early pings reach a window with no listener and are lost.
    sleep(Duration::from_millis(750)).await;
    assert!(!pair.host.is_connected());

    pair.frame
        .connect(pair.host_window.target_from(&pair.frame_window))
        .await
        .unwrap();
    host_connect.await.unwrap().unwrap();

    assert!(pair.host.is_connected());
    assert!(pair.frame.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_typed_requests_both_ways() -> anyhow::Result<()> {
    let pair = Pair::new();

    pair.frame.on::<UserLogin, _, _, _>(|login: Login| async move {
        if login.token.is_empty() {
            return Err(HandlerError::from("Invalid token"));
        }
        Ok(Session {
            user_id: format!("user-{}", login.token),
        })
    });
    pair.host.on::<Resize, _, _, _>(|size: Size| async move {
        if size.width == 0 {
            Err("Zero width")
        } else {
            Ok(())
        }
    });

    pair.connect().await;

    let session = pair
        .host
        .send::<UserLogin>(Login {
            token: "abc123".into(),
        })
        .await?;
    assert_eq!(
        session,
        Session {
            user_id: "user-abc123".into()
        }
    );

    let err = pair
        .host
        .send::<UserLogin>(Login { token: String::new() })
        .await
        .unwrap_err();
    assert!(err.is_remote());
    assert_eq!(err.to_string(), "Invalid token");

    pair.frame
        .send::<Resize>(Size {
            width: 640,
            height: 480,
        })
        .await?;

    let err = pair
        .frame
        .send::<Resize>(Size {
            width: 0,
            height: 480,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Zero width");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_unhandled_key_across_links() {
    let pair = Pair::new();
    pair.connect().await;

    let err = pair
        .host
        .send::<UserLogin>(Login {
            token: "abc123".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No handler registered for key: user:login");
}

#[tokio::test(start_paused = true)]
async fn test_closed_frame_fails_send() {
    let pair = Pair::new();
    pair.connect().await;

    pair.frame_window.close();

    let err = pair
        .host
        .send::<Resize>(Size {
            width: 1,
            height: 1,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.to_string(), "Target window is closed");
    assert_eq!(pair.host.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_destroyed_peer_times_out() {
    let pair = Pair::new();
    pair.frame.on::<Resize, _, _, _>(|_: Size| async move { Ok::<_, HandlerError>(()) });
    pair.connect().await;

    pair.frame.destroy();
    assert_eq!(pair.frame_window.listener_count(), 0);

    let err = pair
        .host
        .send::<Resize>(Size {
            width: 1,
            height: 1,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RequestTimeout { .. }));
    assert_eq!(err.to_string(), "Request timed out: frame:resize");
}

#[tokio::test(start_paused = true)]
async fn test_links_sharing_a_window_are_isolated() {
    init_tracing();
    let host_window = MemoryWindow::new(HOST_ORIGIN);
    let frame_window = MemoryWindow::new(FRAME_ORIGIN);

    let host = FrameLink::new(host_window.clone(), FrameLinkOptions::new(FRAME_ORIGIN)).unwrap();
    let frame = FrameLink::new(frame_window.clone(), FrameLinkOptions::new(HOST_ORIGIN)).unwrap();
    let bystander =
        FrameLink::new(host_window.clone(), FrameLinkOptions::new(FRAME_ORIGIN)).unwrap();

    bystander.on::<Resize, _, _, _>(|_: Size| async move { Err::<(), _>("wrong link") });

    let (a, b) = tokio::join!(
        host.connect(frame_window.target_from(&host_window)),
        frame.connect(host_window.target_from(&frame_window)),
    );
    a.unwrap();
    b.unwrap();

    // The bystander never connected, so its handler is unreachable even
    // though it shares the host window.
    host.on::<Resize, _, _, _>(|_: Size| async move { Ok::<_, HandlerError>(()) });
    frame
        .send::<Resize>(Size {
            width: 1,
            height: 1,
        })
        .await
        .unwrap();

    assert!(!bystander.is_connected());
    assert_eq!(bystander.pending_count(), 0);
}

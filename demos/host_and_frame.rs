//! Host page and embedded frame demonstration.
//!
//! Demonstrates:
//! - Symmetric handshake between two links
//! - Typed requests in both directions
//! - Remote handler errors
//! - Teardown
//!
//! Usage:
//!   cargo run --example host_and_frame
//!   cargo run --example host_and_frame -- --debug

// ============================================================================
// Imports
// ============================================================================

use frame_link::{FrameLink, FrameLinkOptions, HandlerError, MemoryWindow, Message, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const HOST_ORIGIN: &str = "https://host.example";
const FRAME_ORIGIN: &str = "https://frame.example";

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    token: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user_id: String,
}

/// Host asks the frame to log a user in.
enum UserLogin {}

impl Message for UserLogin {
    const KEY: &'static str = "user:login";
    type Payload = Login;
    type Response = Session;
}

#[derive(Debug, Serialize, Deserialize)]
struct Size {
    width: u32,
    height: u32,
}

/// Frame asks the host to resize it.
enum Resize {}

impl Message for Resize {
    const KEY: &'static str = "frame:resize";
    type Payload = Size;
    type Response = Size;
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "frame_link=trace"
    } else {
        "frame_link=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    println!("=== Host and Frame ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating windows and links...");

    let host_window = MemoryWindow::new(HOST_ORIGIN);
    let frame_window = MemoryWindow::new(FRAME_ORIGIN);

    let host = FrameLink::new(host_window.clone(), FrameLinkOptions::new(FRAME_ORIGIN))?;
    let frame = FrameLink::new(frame_window.clone(), FrameLinkOptions::new(HOST_ORIGIN))?;

    frame.on::<UserLogin, _, _, _>(|login: Login| async move {
        if login.token.is_empty() {
            return Err(HandlerError::from("Invalid token"));
        }
        Ok(Session {
            user_id: format!("user-{}", login.token),
        })
    });

    host.on::<Resize, _, _, _>(|size: Size| async move {
        Ok::<_, HandlerError>(Size {
            width: size.width.min(1280),
            height: size.height.min(720),
        })
    });
    println!("        ✓ Handlers registered\n");

    // ========================================================================
    // Handshake
    // ========================================================================

    println!("[1] Connecting both sides");
    let (host_connect, frame_connect) = tokio::join!(
        host.connect(frame_window.target_from(&host_window)),
        frame.connect(host_window.target_from(&frame_window)),
    );
    host_connect?;
    frame_connect?;
    println!(
        "    ✓ Connected (host={}, frame={})\n",
        host.is_connected(),
        frame.is_connected()
    );

    // ========================================================================
    // Host -> Frame
    // ========================================================================

    println!("[2] Host sends {}", UserLogin::KEY);
    let session = host
        .send::<UserLogin>(Login {
            token: "abc123".into(),
        })
        .await?;
    println!("    Result: {session:?}");
    println!("    ✓ Passed\n");

    // ========================================================================
    // Frame -> Host
    // ========================================================================

    println!("[3] Frame sends {}", Resize::KEY);
    let size = frame
        .send::<Resize>(Size {
            width: 1920,
            height: 1080,
        })
        .await?;
    println!("    Result: {size:?}");
    println!("    ✓ Passed\n");

    // ========================================================================
    // Remote Error
    // ========================================================================

    println!("[4] Host sends {} with an empty token", UserLogin::KEY);
    match host.send::<UserLogin>(Login { token: String::new() }).await {
        Ok(session) => println!("    Unexpected success: {session:?}"),
        Err(e) => println!("    ✓ Rejected: {e} (remote={})\n", e.is_remote()),
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    println!("[5] Destroying both links");
    host.destroy();
    frame.destroy();

    match host.send::<UserLogin>(Login { token: "x".into() }).await {
        Ok(_) => println!("    Unexpected success"),
        Err(e) => println!("    ✓ Send after destroy: {e}\n"),
    }

    println!("=== Done ===");
    Ok(())
}

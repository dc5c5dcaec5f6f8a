//! Roundtable terminal chat client.
//!
//! Connects to the chat server with a username, prints every frame it
//! receives and sends each line typed on stdin as a chat message.
//! Reconnects after a fixed delay whenever the connection drops.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roundtable-client -- --username alice
//! cargo run --bin roundtable-client -- -n bob --url ws://127.0.0.1:3000/ws/chat
//! ```

use std::time::Duration;

use clap::Parser;
use roundtable_client::{ReconnectPolicy, run_client};
use roundtable_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roundtable-client")]
#[command(about = "Terminal client for the Roundtable live chat", long_about = None)]
struct Args {
    /// Display name shown to other participants
    #[arg(short = 'n', long, env = "ROUNDTABLE_USERNAME", default_value = "Anonymous")]
    username: String,

    /// WebSocket chat endpoint
    #[arg(
        short = 'u',
        long,
        env = "ROUNDTABLE_URL",
        default_value = "ws://127.0.0.1:8080/ws/chat"
    )]
    url: String,

    /// Seconds to wait before reconnecting
    #[arg(long, default_value_t = 3)]
    reconnect_delay_secs: u64,

    /// Give up after this many consecutive reconnects (retry forever when omitted)
    #[arg(long)]
    max_reconnect_attempts: Option<u32>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let policy = ReconnectPolicy {
        delay: Duration::from_secs(args.reconnect_delay_secs),
        max_attempts: args.max_reconnect_attempts,
    };

    if let Err(e) = run_client(&args.url, &args.username, policy).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

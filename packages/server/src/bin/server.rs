//! Roundtable live chat server.
//!
//! Accepts WebSocket chat connections, broadcasts chat messages and join/leave
//! notices, and replays recent history to newcomers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roundtable-server
//! cargo run --bin roundtable-server -- --host 0.0.0.0 --port 3000 --history-capacity 200
//! ```

use clap::Parser;
use roundtable_server::{
    config::{ChatConfig, DEFAULT_REPLAY_LIMIT},
    domain::history::DEFAULT_HISTORY_CAPACITY,
    ui::Server,
};
use roundtable_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roundtable-server")]
#[command(about = "WebSocket live chat server with history replay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROUNDTABLE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROUNDTABLE_PORT", default_value_t = 8080)]
    port: u16,

    /// Number of chat messages kept in memory
    #[arg(long, env = "ROUNDTABLE_HISTORY_CAPACITY", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Number of messages replayed to a client when it joins
    #[arg(long, env = "ROUNDTABLE_REPLAY_LIMIT", default_value_t = DEFAULT_REPLAY_LIMIT)]
    replay_limit: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ChatConfig {
        history_capacity: args.history_capacity,
        replay_limit: args.replay_limit,
    };

    let server = Server::from_config(config);
    if let Err(e) = server.run(&args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

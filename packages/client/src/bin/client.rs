//! CLI collaboration client.
//!
//! Joins a room, keeps a local mirror of its code, language, participants and
//! cursors, and sends local edits. Lines typed at the prompt are appended to the
//! shared code; `/help` lists the commands.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kyodo-client -- --room lesson-1 --user-id alice
//! cargo run --bin kyodo-client -- -r lesson-1 --user-id bob --name Bob --debounce-ms 500
//! ```

use std::time::Duration;

use clap::Parser;
use kyodo_client::{ClientConfig, debounce::DEFAULT_DEBOUNCE, run_client};
use kyodo_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kyodo-client")]
#[command(about = "CLI client for a shared collaboration room", long_about = None)]
struct Args {
    /// Room to join
    #[arg(short = 'r', long = "room")]
    room_id: String,

    /// Participant ID (the same ID may be used from several terminals)
    #[arg(long)]
    user_id: String,

    /// Display name (defaults to the participant ID)
    #[arg(long)]
    name: Option<String>,

    /// Avatar image URL
    #[arg(long)]
    image: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Quiet period in milliseconds before a code edit is sent
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    debounce_ms: u64,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            name: args.name.unwrap_or_else(|| args.user_id.clone()),
            url: args.url,
            room_id: args.room_id,
            user_id: args.user_id,
            image: args.image,
            debounce: Duration::from_millis(args.debounce_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_CRATE_NAME")], "info");

    let args = Args::parse();

    if let Err(e) = run_client(args.into()).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

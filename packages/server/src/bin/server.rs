//! Real-time collaboration room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kyodo-server
//! cargo run --bin kyodo-server -- --host 0.0.0.0 --port 3000 --room-retention immediate
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};
use kyodo_server::{
    domain::{RoomRetention, entity::DEFAULT_ROOM_CAPACITY},
    ui::{Server, ServerConfig},
};
use kyodo_shared::logger::setup_logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RetentionPolicy {
    /// Keep empty rooms until the process exits
    Retain,
    /// Drop a room as soon as its last connection leaves
    Immediate,
    /// Drop rooms that stay empty longer than --room-ttl-secs
    Ttl,
}

#[derive(Parser, Debug)]
#[command(name = "kyodo-server")]
#[command(about = "Real-time collaboration room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// What to do with rooms that have no connections left
    #[arg(long, value_enum, default_value_t = RetentionPolicy::Ttl)]
    room_retention: RetentionPolicy,

    /// Idle time before an empty room is dropped (with --room-retention ttl)
    #[arg(long, default_value_t = 300)]
    room_ttl_secs: u64,

    /// Maximum number of connections in a single room
    #[arg(long, default_value_t = DEFAULT_ROOM_CAPACITY)]
    max_connections_per_room: usize,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let room_retention = match self.room_retention {
            RetentionPolicy::Retain => RoomRetention::Retain,
            RetentionPolicy::Immediate => RoomRetention::Immediate,
            RetentionPolicy::Ttl => RoomRetention::Ttl(Duration::from_secs(self.room_ttl_secs)),
        };
        ServerConfig {
            room_retention,
            max_connections_per_room: self.max_connections_per_room,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_CRATE_NAME")], "debug");

    let args = Args::parse();

    let server = Server::in_memory(args.server_config());
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

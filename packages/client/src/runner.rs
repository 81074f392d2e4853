//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{NextStep, ReconnectPolicy},
    mirror::RoomMirror,
    session::run_client_session,
    ui::prompt,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Connection settings for one client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint (e.g. `ws://127.0.0.1:8080/ws`)
    pub url: String,
    pub room_id: String,
    pub user_id: String,
    /// Display name
    pub name: String,
    pub image: Option<String>,
    /// Quiet period before a local code edit is sent
    pub debounce: Duration,
}

/// Run the collaboration client with reconnection logic
///
/// The local mirror survives reconnects and is restored from the room state
/// sent by the server after each join.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mirror = Arc::new(Mutex::new(RoomMirror::new()));
    let mut input_rx = spawn_line_reader(prompt(&config.user_id, &config.room_id));
    let mut policy = ReconnectPolicy::new(
        MAX_RECONNECT_ATTEMPTS,
        Duration::from_secs(RECONNECT_INTERVAL_SECS),
    );

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            config.url,
            config.user_id,
            policy.current_attempt(),
            policy.max_attempts()
        );

        let error = match run_client_session(&config, mirror.clone(), &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(e) => e,
        };

        let was_connected = {
            let mut mirror = mirror.lock().await;
            let was_connected = mirror.is_connected;
            mirror.mark_disconnected();
            was_connected
        };
        tracing::warn!("Session ended: {}", error);

        match policy.on_session_error(&error, was_connected) {
            NextStep::Retry { attempt, after } => {
                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    after.as_secs(),
                    attempt,
                    policy.max_attempts()
                );
                tokio::time::sleep(after).await;
            }
            NextStep::GiveUp => {
                tracing::error!("Giving up on room '{}'", config.room_id);
                return Err(Box::new(error));
            }
        }
    }

    Ok(())
}

/// Spawn a blocking thread for rustyline (synchronous readline)
///
/// The thread outlives individual sessions; the channel closes on Ctrl+C or Ctrl+D.
fn spawn_line_reader(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim_end();
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

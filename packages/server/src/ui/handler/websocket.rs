//! WebSocket connection handlers.
//!
//! 1 接続につき 2 つのタスクを起動します。
//!
//! - 受信タスク: フレームを `Command` に変換し、ユースケースを実行
//! - 送信タスク（pusher loop）: MessagePusher がチャンネルに積んだフレームを WebSocket に書き込む
//!
//! ルームを変更するユースケースは `AppState::dispatch_lock` を取ってから実行します。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{Notify, mpsc};

use crate::{
    domain::{Command, ConnectionId, Notification, RejectionReason},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
};

/// 拒否理由とメッセージ
type Rejection = (RejectionReason, String);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the MessagePusher
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    let connection_id = match state.connect_participant_usecase.execute(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };
    tracing::info!("Connection '{}' opened", connection_id);

    // Spawn a task to push queued messages to this connection
    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive messages from this connection
    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let stop_receiving = Arc::new(Notify::new());
    let recv_stop = stop_receiving.clone();
    let mut recv_task = tokio::spawn(async move {
        loop {
            // 停止要求はメッセージの合間でだけ受け付け、処理中のユースケースは最後まで実行する
            let msg = tokio::select! {
                msg = receiver.next() => msg,
                _ = recv_stop.notified() => break,
            };
            let Some(msg) = msg else {
                break;
            };
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&recv_state, &recv_connection_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // 受信側が終わったら送信側を止める。送信側が先に終わった場合、受信側は中断せずに停止を待つ
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            stop_receiving.notify_one();
            if let Err(e) = (&mut recv_task).await {
                tracing::warn!("Receive task for '{}' failed: {}", connection_id, e);
            }
        }
    };

    // Disconnect always resolves through the leave path
    let _guard = state.dispatch_lock.lock().await;
    match state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        Ok(Some(room_id)) => {
            tracing::info!("Connection '{}' closed (left '{}')", connection_id, room_id);
        }
        Ok(None) => tracing::info!("Connection '{}' closed", connection_id),
        Err(e) => tracing::warn!("Connection '{}' closed uncleanly: {}", connection_id, e),
    }
}

/// テキストフレーム 1 つを処理する
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let command = serde_json::from_str::<ClientMessage>(text)
        .map_err(|e| e.to_string())
        .and_then(|message| Command::try_from(message).map_err(|e| e.to_string()));

    let command = match command {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Malformed message from '{}': {}", connection_id, e);
            reject(state, connection_id, (RejectionReason::MalformedMessage, e)).await;
            return;
        }
    };

    tracing::debug!("Dispatching {} from '{}'", command.kind(), connection_id);
    if let Err(rejection) = dispatch(state, connection_id, command).await {
        tracing::warn!(
            "Rejected message from '{}': {} ({})",
            connection_id,
            rejection.1,
            rejection.0.as_str()
        );
        reject(state, connection_id, rejection).await;
    }
}

/// Command に対応するユースケースを実行する
async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    command: Command,
) -> Result<(), Rejection> {
    match command {
        Command::JoinRoom {
            room_id,
            participant,
            cursor,
        } => {
            // 外部の ID プロバイダ呼び出しはロックの外で行う
            let participant = state
                .join_room_usecase
                .resolve_participant(participant)
                .await
                .map_err(|e| (e.reason(), e.to_string()))?;

            let _guard = state.dispatch_lock.lock().await;
            state
                .join_room_usecase
                .execute(connection_id.clone(), room_id, participant, cursor)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
        Command::LeaveRoom { room_id } => {
            let _guard = state.dispatch_lock.lock().await;
            state
                .leave_room_usecase
                .execute(connection_id, &room_id)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
        Command::ChangeCode { room_id, code } => {
            let _guard = state.dispatch_lock.lock().await;
            state
                .apply_code_change_usecase
                .execute(connection_id, &room_id, code)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
        Command::ChangeLanguage { room_id, language } => {
            let _guard = state.dispatch_lock.lock().await;
            state
                .apply_language_change_usecase
                .execute(connection_id, &room_id, language)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
        Command::MoveCursor {
            room_id,
            cursor,
            participant,
        } => {
            let _guard = state.dispatch_lock.lock().await;
            state
                .apply_cursor_change_usecase
                .execute(connection_id, &room_id, cursor, participant)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
        Command::RequestSimulation {
            room_id,
            code,
            language,
        } => {
            let _guard = state.dispatch_lock.lock().await;
            state
                .request_simulation_usecase
                .execute(connection_id, &room_id, code, language)
                .await
                .map_err(|e| (e.reason(), e.to_string()))
        }
    }
}

/// 送信元だけに `error` を返す
async fn reject(state: &AppState, connection_id: &ConnectionId, (reason, message): Rejection) {
    let notification = Notification::Rejected { reason, message };
    if let Err(e) = state
        .message_pusher
        .push_to(connection_id, &notification)
        .await
    {
        tracing::warn!("Failed to send error to '{}': {}", connection_id, e);
    }
}

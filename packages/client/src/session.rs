//! WebSocket client session management.
//!
//! 1 本の接続でルームに参加し、切断されるか利用者が終了するまでミラーを同期します。

use std::{fmt::Display, sync::Arc};

use futures_util::{Sink, SinkExt, StreamExt};
use kyodo_server::{
    domain::RejectionReason,
    infrastructure::dto::websocket::{
        ClientMessage, CodeChangeMessage, CursorChangeMessage, CursorDto, JoinRoomMessage,
        LanguageChangeMessage, LeaveRoomMessage, ParticipantDto, ServerMessage,
        SimulationRequestMessage,
    },
};
use kyodo_shared::time::get_timestamp_millis;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    command::{HELP, InputCommand, parse_input},
    debounce::CodeDebouncer,
    error::ClientError,
    formatter::MessageFormatter,
    mirror::RoomMirror,
    runner::ClientConfig,
    ui::{prompt, redisplay_prompt},
};

/// Run one WebSocket client session
///
/// # Returns
///
/// `Ok(())` when the user left or quit, `Err` when the connection was lost or refused
pub async fn run_client_session(
    config: &ClientConfig,
    mirror: Arc<Mutex<RoomMirror>>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(config.url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to {}", config.url);

    let (mut write, mut read) = ws_stream.split();

    // 参加要求: 再接続時もサーバーの room-state で状態を取り直す
    let own_cursor = mirror.lock().await.local_cursor;
    send_message(
        &mut write,
        &ClientMessage::JoinRoom(JoinRoomMessage {
            room_id: config.room_id.clone(),
            participant: ParticipantDto {
                cursor: own_cursor,
                ..own_participant(config)
            },
        }),
    )
    .await?;

    println!(
        "\nJoined room '{}' as '{}'. Lines are appended to the code; type /help for commands.\n",
        config.room_id, config.user_id
    );

    let prompt = prompt(&config.user_id, &config.room_id);

    // Spawn a task to handle incoming messages
    let mirror_for_read = mirror.clone();
    let prompt_for_read = prompt.clone();
    let room_id = config.room_id.clone();
    let mut read_task: JoinHandle<Result<(), ClientError>> = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(server_message) => {
                        if let ServerMessage::Error(err) = &server_message
                            && err.reason == RejectionReason::RoomFull.as_str()
                        {
                            return Err(ClientError::RoomFull(room_id));
                        }

                        let mut mirror = mirror_for_read.lock().await;
                        if !mirror.apply(&server_message) {
                            continue;
                        }
                        if let Some(formatted) = MessageFormatter::format_server_message(
                            &server_message,
                            mirror.connection_id.as_deref(),
                        ) {
                            print!("{}", formatted);
                            redisplay_prompt(&prompt_for_read);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Undecodable message: {}", e);
                        print!("{}", MessageFormatter::format_raw_message(&text));
                        redisplay_prompt(&prompt_for_read);
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError(
                        "Server closed the connection".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                _ => {}
            }
        }

        Err(ClientError::ConnectionError("Connection lost".to_string()))
    });

    let (debouncer, mut debounced_rx) = CodeDebouncer::new(config.debounce);

    let result = loop {
        tokio::select! {
            read_result = &mut read_task => {
                break match read_result {
                    Ok(result) => result,
                    Err(e) => Err(ClientError::ConnectionError(e.to_string())),
                };
            }
            line = input_rx.recv() => {
                // 入力スレッドが終了した (Ctrl+C / Ctrl+D)
                let Some(line) = line else {
                    break Ok(());
                };
                match handle_input(&line, config, &mirror, &debouncer, &mut write).await {
                    Ok(true) => {}
                    Ok(false) => break Ok(()),
                    Err(ClientError::InvalidCommand(message)) => {
                        println!("{}", message);
                    }
                    Err(e) => break Err(e),
                }
                redisplay_prompt(&prompt);
            }
            Some(code) = debounced_rx.recv() => {
                let message = ClientMessage::CodeChange(CodeChangeMessage {
                    room_id: config.room_id.clone(),
                    code,
                });
                if let Err(e) = send_message(&mut write, &message).await {
                    break Err(e);
                }
                let confirmation =
                    MessageFormatter::format_sent_confirmation("code-change", get_timestamp_millis());
                tracing::debug!("{}", confirmation.trim_end());
            }
        }
    };

    read_task.abort();
    result
}

/// 1 行の入力を処理する
///
/// # Returns
///
/// セッションを続ける場合は `true`
async fn handle_input<S>(
    line: &str,
    config: &ClientConfig,
    mirror: &Mutex<RoomMirror>,
    debouncer: &CodeDebouncer,
    write: &mut S,
) -> Result<bool, ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let room_id = config.room_id.clone();
    let message = match parse_input(line)? {
        InputCommand::Append(text) => {
            let mut mirror = mirror.lock().await;
            mirror.append_local_line(&text);
            debouncer.push(mirror.code.clone());
            return Ok(true);
        }
        InputCommand::SetCode(code) => {
            let mut mirror = mirror.lock().await;
            mirror.set_local_code(code);
            debouncer.push(mirror.code.clone());
            return Ok(true);
        }
        InputCommand::Language(language) => {
            mirror.lock().await.set_local_language(language);
            ClientMessage::LanguageChange(LanguageChangeMessage {
                room_id,
                language: language.as_str().to_string(),
            })
        }
        InputCommand::Cursor { line, column } => {
            let cursor = CursorDto { line, column };
            mirror.lock().await.set_local_cursor(cursor);
            ClientMessage::CursorChange(CursorChangeMessage {
                room_id,
                cursor,
                participant: Some(own_participant(config)),
            })
        }
        InputCommand::Run => {
            let mirror = mirror.lock().await;
            ClientMessage::SimulationRequest(SimulationRequestMessage {
                room_id,
                code: mirror.code.clone(),
                language: mirror.language.as_str().to_string(),
            })
        }
        InputCommand::Who => {
            let mirror = mirror.lock().await;
            print!(
                "{}",
                MessageFormatter::format_roster(
                    &mirror.participants,
                    &mirror.cursors,
                    mirror.connection_id.as_deref(),
                )
            );
            return Ok(true);
        }
        InputCommand::Show => {
            let mirror = mirror.lock().await;
            print!(
                "{}",
                MessageFormatter::format_code(&mirror.code, mirror.language.as_str())
            );
            return Ok(true);
        }
        InputCommand::Help => {
            println!("{}", HELP);
            return Ok(true);
        }
        InputCommand::Leave => {
            send_message(
                write,
                &ClientMessage::LeaveRoom(LeaveRoomMessage { room_id }),
            )
            .await?;
            if let Err(e) = write.close().await {
                tracing::debug!("Failed to close the connection: {}", e);
            }
            return Ok(false);
        }
        InputCommand::Quit => return Ok(false),
    };

    send_message(write, &message).await?;
    Ok(true)
}

fn own_participant(config: &ClientConfig) -> ParticipantDto {
    ParticipantDto {
        id: config.user_id.clone(),
        name: config.name.clone(),
        image: config.image.clone(),
        cursor: None,
    }
}

async fn send_message<S>(write: &mut S, message: &ClientMessage) -> Result<(), ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let json = serde_json::to_string(message)
        .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize message: {}", e)))?;

    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send message: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}

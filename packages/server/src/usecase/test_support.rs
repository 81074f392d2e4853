//! UseCase テスト用のヘルパー

use std::{collections::HashMap, sync::Arc, time::Duration};

use kyodo_shared::time::FixedClock;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        ConnectionId, Cursor, MessagePusher, Participant, ParticipantId, RoomId, RoomRepository,
        RoomRetention,
    },
    infrastructure::{
        identity::TrustedIdentityProvider, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
};

use super::{JoinRoomUseCase, LeaveRoomUseCase};

pub const NOW: i64 = 1_672_531_200_000;

pub fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn participant(id: &str, name: &str) -> Participant {
    Participant::new(
        ParticipantId::new(id.to_string()).unwrap(),
        name.to_string(),
        None,
    )
}

/// 実装（InMemory / WebSocket）を組み合わせたテスト環境
pub struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<FixedClock>,
    pub retention: RoomRetention,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(RoomRetention::Retain, 50)
    }

    pub fn with(retention: RoomRetention, room_capacity: usize) -> Self {
        Self {
            repository: Arc::new(InMemoryRoomRepository::with_room_capacity(room_capacity)),
            message_pusher: Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
                HashMap::new(),
            )))),
            clock: Arc::new(FixedClock::new(NOW)),
            retention,
        }
    }

    /// 接続を登録し、その接続の受信チャンネルを返す
    pub async fn connect(&self, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.repository.register_connection(conn(id)).await.unwrap();
        self.message_pusher.register_client(conn(id), tx).await;
        rx
    }

    pub fn leave_room(&self) -> Arc<LeaveRoomUseCase> {
        Arc::new(LeaveRoomUseCase::new(
            self.repository.clone(),
            self.message_pusher.clone(),
            self.clock.clone(),
            self.retention,
        ))
    }

    pub fn join_room(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.repository.clone(),
            self.message_pusher.clone(),
            Arc::new(TrustedIdentityProvider),
            self.leave_room(),
            self.clock.clone(),
        )
    }

    /// 接続をルームに参加させる
    pub async fn join(&self, connection: &str, room: &str, participant_id: &str) {
        self.join_with_cursor(connection, room, participant_id, None)
            .await;
    }

    pub async fn join_with_cursor(
        &self,
        connection: &str,
        room: &str,
        participant_id: &str,
        cursor: Option<Cursor>,
    ) {
        self.join_room()
            .execute(
                conn(connection),
                room_id(room),
                participant(participant_id, participant_id),
                cursor,
            )
            .await
            .unwrap();
    }
}

/// 受信チャンネルに溜まったメッセージを JSON として全て取り出す
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut messages = Vec::new();
    while let Ok(text) = rx.try_recv() {
        messages.push(serde_json::from_str(&text).unwrap());
    }
    messages
}

/// メッセージの type 一覧
pub fn types(messages: &[Value]) -> Vec<&str> {
    messages
        .iter()
        .map(|m| m["type"].as_str().unwrap_or_default())
        .collect()
}

pub fn ttl(secs: u64) -> RoomRetention {
    RoomRetention::Ttl(Duration::from_secs(secs))
}

//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 制約
//!
//! ルームレジストリはプロセスローカルです。複数プロセスで動かす場合は
//! ルーム単位で 1 プロセスにシャーディングするか、共有バックエンドの実装が必要です。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionState, RepositoryError, Room, RoomId, RoomRepository, Timestamp,
    entity::DEFAULT_ROOM_CAPACITY,
};

#[derive(Default)]
struct Registry {
    rooms: HashMap<RoomId, Room>,
    connections: HashMap<ConnectionId, ConnectionState>,
}

/// インメモリ Room Repository 実装
///
/// ルームと接続テーブルを 1 つのロックで保持し、ドメイン層の RoomRepository trait を実装します（依存性の逆転）。
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
    /// 新規作成するルームの最大接続数
    room_capacity: usize,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_room_capacity(DEFAULT_ROOM_CAPACITY)
    }

    /// 新規作成するルームの最大接続数を指定して作成
    pub fn with_room_capacity(room_capacity: usize) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            room_capacity,
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_or_create_room(&self, room_id: &RoomId, now: Timestamp) -> Room {
        let mut registry = self.registry.lock().await;
        registry
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                tracing::info!("Room '{}' created", room_id);
                Room::with_capacity(room_id.clone(), now, self.room_capacity)
            })
            .clone()
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let registry = self.registry.lock().await;
        registry.rooms.get(room_id).cloned()
    }

    async fn save_room(&self, room: Room) {
        let mut registry = self.registry.lock().await;
        registry.rooms.insert(room.id.clone(), room);
    }

    async fn remove_room(&self, room_id: &RoomId) -> Option<Room> {
        let mut registry = self.registry.lock().await;
        registry.rooms.remove(room_id)
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<Room> = registry.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    async fn register_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;
        if registry.connections.contains_key(&connection_id) {
            return Err(RepositoryError::DuplicateConnection(
                connection_id.into_string(),
            ));
        }
        registry
            .connections
            .insert(connection_id, ConnectionState::Disconnected);
        Ok(())
    }

    async fn connection_state(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<ConnectionState, RepositoryError> {
        let registry = self.registry.lock().await;
        registry
            .connections
            .get(connection_id)
            .cloned()
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.as_str().to_string()))
    }

    async fn set_connection_state(
        &self,
        connection_id: &ConnectionId,
        state: ConnectionState,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;
        match registry.connections.get_mut(connection_id) {
            Some(current) => {
                *current = state;
                Ok(())
            }
            None => Err(RepositoryError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            )),
        }
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        let mut registry = self.registry.lock().await;
        registry.connections.remove(connection_id)
    }

    async fn count_connections(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.connections.len()
    }
}

//! UseCase: 言語選択の同期

use std::sync::Arc;

use crate::domain::{ConnectionId, Language, MessagePusher, Notification, RoomId, RoomRepository};

use super::error::SyncError;

/// 言語選択同期のユースケース
pub struct ApplyLanguageChangeUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ApplyLanguageChangeUseCase {
    /// 新しい ApplyLanguageChangeUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 言語選択を上書きし、他の接続に `language-updated` を送る（last-writer-wins）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        language: Language,
    ) -> Result<(), SyncError> {
        let Some(mut room) = self.repository.get_room(room_id).await else {
            tracing::debug!("language-change for unknown room '{}' ignored", room_id);
            return Ok(());
        };
        if !room.is_member(connection_id) {
            return Err(SyncError::NotInRoom(room_id.as_str().to_string()));
        }

        room.apply_language(language);
        let targets = room.connection_ids_except(connection_id);
        self.repository.save_room(room).await;

        if targets.is_empty() {
            return Ok(());
        }
        let notification = Notification::LanguageUpdated {
            language,
            connection_id: connection_id.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &notification).await {
            tracing::warn!("Failed to broadcast language-updated: {}", e);
        }

        Ok(())
    }
}

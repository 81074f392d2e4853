//! UseCase: カーソル位置の同期
//!
//! 接続ごとに最新のカーソル位置だけを保持します。
//! メッセージに参加者情報が含まれる場合は、参加時の ID と一致することを確認し、
//! 通知には参加時に登録された参加者情報を使います。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Cursor, MessagePusher, Notification, Participant, RoomId, RoomRepository,
};

use super::error::SyncError;

/// カーソル同期のユースケース
pub struct ApplyCursorChangeUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ApplyCursorChangeUseCase {
    /// 新しい ApplyCursorChangeUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// カーソル位置を更新し、他の接続に `cursor-updated` を送る
    ///
    /// # Arguments
    ///
    /// * `claimed` - メッセージに含まれていた参加者情報（省略可）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        cursor: Cursor,
        claimed: Option<Participant>,
    ) -> Result<(), SyncError> {
        let Some(mut room) = self.repository.get_room(room_id).await else {
            tracing::debug!("cursor-change for unknown room '{}' ignored", room_id);
            return Ok(());
        };
        let not_in_room = || SyncError::NotInRoom(room_id.as_str().to_string());

        let joined = room
            .presence_of(connection_id)
            .map(|presence| presence.participant.id.clone())
            .ok_or_else(not_in_room)?;
        if let Some(claimed) = claimed
            && claimed.id != joined
        {
            return Err(SyncError::IdentityMismatch {
                joined: joined.into_string(),
                claimed: claimed.id.into_string(),
            });
        }

        let participant = room
            .apply_cursor(connection_id, cursor)
            .map_err(|_| not_in_room())?;
        let targets = room.connection_ids_except(connection_id);
        self.repository.save_room(room).await;

        if targets.is_empty() {
            return Ok(());
        }
        let notification = Notification::CursorUpdated {
            connection_id: connection_id.clone(),
            cursor,
            participant,
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &notification).await {
            tracing::warn!("Failed to broadcast cursor-updated: {}", e);
        }

        Ok(())
    }
}

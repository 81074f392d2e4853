//! UseCase: コード変更の同期
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ApplyCodeChangeUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 変更は送信元以外の全接続に届き、送信元には返らない（エコーしない）
//! - あるルームへの変更が他のルームに影響しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：3 接続のルームでの変更
//! - エッジケース：存在しないルーム（何もしない）
//! - 異常系：参加していないルームへの変更

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, RoomId, RoomRepository, SourceCode,
};

use super::error::SyncError;

/// コード変更同期のユースケース
pub struct ApplyCodeChangeUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ApplyCodeChangeUseCase {
    /// 新しい ApplyCodeChangeUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// コードを上書きし、他の接続に `code-updated` を送る（last-writer-wins）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 適用成功（ルームが存在しない場合も含む）
    /// * `Err(SyncError::NotInRoom)` - そのルームに参加していない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        code: SourceCode,
    ) -> Result<(), SyncError> {
        let Some(mut room) = self.repository.get_room(room_id).await else {
            tracing::debug!("code-change for unknown room '{}' ignored", room_id);
            return Ok(());
        };
        if !room.is_member(connection_id) {
            return Err(SyncError::NotInRoom(room_id.as_str().to_string()));
        }

        room.apply_code(code.clone());
        let targets = room.connection_ids_except(connection_id);
        self.repository.save_room(room).await;

        if targets.is_empty() {
            return Ok(());
        }
        let notification = Notification::CodeUpdated {
            code,
            connection_id: connection_id.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &notification).await {
            tracing::warn!("Failed to broadcast code-updated: {}", e);
        }

        Ok(())
    }
}

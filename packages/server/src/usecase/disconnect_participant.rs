//! UseCase: 切断処理
//!
//! 切断は常に退出パスを通り、その後で接続テーブルと MessagePusher から登録解除します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 突然の切断でも、残った接続には user-left と participants-updated がちょうど 1 回ずつ届く
//! - 切断した接続が登録解除される
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中の切断
//! - エッジケース：ルームに参加する前の切断
//! - エッジケース：参加処理の途中（JOINING）で止まった接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRepository};

use super::{error::LeaveRoomError, leave_room::LeaveRoomUseCase};

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    leave_room: Arc<LeaveRoomUseCase>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        leave_room: Arc<LeaveRoomUseCase>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            leave_room,
        }
    }

    /// 切断を実行
    ///
    /// 退出に失敗しても登録解除は行います。
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RoomId))` - 退出したルーム
    /// * `Ok(None)` - どのルームにも参加していなかった
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<RoomId>, LeaveRoomError> {
        let left = self.leave_room.leave_current(connection_id).await;

        self.repository.unregister_connection(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;

        left
    }
}

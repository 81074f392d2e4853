//! UseCase: ルーム退出処理
//!
//! 明示的な `leave-room`、別ルームへの参加、切断のいずれもこの退出パスを通ります。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() / leave_current() メソッド
//! - 名簿・カーソルからの削除と、残った接続への通知
//!
//! ### なぜこのテストが必要か
//! - 同じ参加者の接続が残っている間は名簿に残す必要がある
//! - 保持ポリシー `immediate` では空になったルームを破棄する
//!
//! ### どのような状況を想定しているか
//! - 正常系：唯一の接続が退出 → 参加者が名簿から消える
//! - 正常系：2 本のうち 1 本が退出 → 参加者は名簿に残る
//! - 異常系：参加していないルームからの退出

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, RoomId, RoomRepository, RoomRetention, Timestamp,
};

use super::error::LeaveRoomError;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 空になったルームの保持ポリシー
    retention: RoomRetention,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        retention: RoomRetention,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            retention,
        }
    }

    /// 明示的な退出（`leave-room`）
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 退出する接続
    /// * `room_id` - 退出するルーム（参加中のルームと一致する必要がある）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 退出成功
    /// * `Err(LeaveRoomError::NotInRoom)` - そのルームに参加していない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), LeaveRoomError> {
        let state = self.repository.connection_state(connection_id).await?;
        if state.joined_room() != Some(room_id) {
            return Err(LeaveRoomError::NotInRoom(room_id.as_str().to_string()));
        }

        self.leave_current(connection_id).await?;
        Ok(())
    }

    /// 接続が参加中のルームから退出する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RoomId))` - 退出したルーム
    /// * `Ok(None)` - どのルームにも参加していなかった
    pub async fn leave_current(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<RoomId>, LeaveRoomError> {
        let state = self.repository.connection_state(connection_id).await?;
        // 参加処理の途中で中断された接続（JOINING）もここで片付ける
        let Some(room_id) = state.room().cloned() else {
            return Ok(None);
        };

        // JOINING / JOINED → LEAVING
        let leaving = state.begin_leave()?;
        self.repository
            .set_connection_state(connection_id, leaving.clone())
            .await?;

        let now = Timestamp::new(self.clock.now_millis());
        if let Some(mut room) = self.repository.get_room(&room_id).await
            && let Some(departure) = room.release(connection_id, now)
        {
            let remaining = room.connection_ids();
            let participants = room.participants.clone();

            if room.is_empty() && self.retention.is_expired(now, now) {
                self.repository.remove_room(&room_id).await;
                tracing::info!("Room '{}' removed (last connection left)", room_id);
            } else {
                self.repository.save_room(room).await;
            }

            tracing::info!(
                "Connection '{}' ({}) left room '{}'",
                connection_id,
                departure.participant.id,
                room_id
            );

            if !remaining.is_empty() {
                let left = Notification::UserLeft {
                    participant: departure.participant,
                    connection_id: connection_id.clone(),
                };
                if let Err(e) = self
                    .message_pusher
                    .broadcast(remaining.clone(), &left)
                    .await
                {
                    tracing::warn!("Failed to broadcast user-left: {}", e);
                }

                let updated = Notification::ParticipantsUpdated { participants };
                if let Err(e) = self.message_pusher.broadcast(remaining, &updated).await {
                    tracing::warn!("Failed to broadcast participants-updated: {}", e);
                }
            }
        }

        // LEAVING → DISCONNECTED
        self.repository
            .set_connection_state(connection_id, leaving.complete_leave()?)
            .await?;

        Ok(Some(room_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ConnectionState,
        usecase::test_support::{Harness, conn, drain, room_id, types},
    };

    #[tokio::test]
    async fn test_last_connection_removes_participant() {
        // テスト項目: 唯一の接続が退出すると参加者は名簿から消え、残りに user-left → participants-updated が届く
        // given (前提条件):
        let harness = Harness::new();
        let _rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        harness.join("a", "r1", "alice").await;
        harness.join("b", "r1", "bob").await;
        drain(&mut rx_b);

        // when (操作):
        harness
            .leave_room()
            .execute(&conn("a"), &room_id("r1"))
            .await
            .unwrap();

        // then (期待する結果):
        let room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.participants.len(), 1);
        assert_eq!(room.participants[0].id.as_str(), "bob");
        assert!(!room.is_member(&conn("a")));

        let messages = drain(&mut rx_b);
        assert_eq!(types(&messages), vec!["user-left", "participants-updated"]);
        assert_eq!(messages[0]["connectionId"], "a");
        assert_eq!(messages[0]["participant"]["id"], "alice");
        assert_eq!(
            harness.repository.connection_state(&conn("a")).await,
            Ok(ConnectionState::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_participant_stays_while_other_connection_remains() {
        // テスト項目: 同じ参加者の接続が 2 本あるとき、1 本の退出では名簿に残る
        // given (前提条件):
        let harness = Harness::new();
        let _rx_a1 = harness.connect("a1").await;
        let mut rx_a2 = harness.connect("a2").await;
        harness.join("a1", "r1", "alice").await;
        harness.join("a2", "r1", "alice").await;
        drain(&mut rx_a2);

        // when (操作):
        harness.leave_room().leave_current(&conn("a1")).await.unwrap();

        // then (期待する結果):
        let room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.participants.len(), 1);
        assert_eq!(room.connection_count_of(&room.participants[0].id), 1);
        assert!(!room.cursors.contains_key(&conn("a1")));

        let messages = drain(&mut rx_a2);
        assert_eq!(types(&messages), vec!["user-left", "participants-updated"]);
        assert_eq!(messages[1]["participants"][0]["id"], "alice");
    }

    #[tokio::test]
    async fn test_leave_other_room_is_rejected() {
        // テスト項目: 参加していないルームからの退出は NotInRoom になる
        // given (前提条件):
        let harness = Harness::new();
        let _rx = harness.connect("a").await;
        harness.join("a", "r1", "alice").await;

        // when (操作):
        let result = harness
            .leave_room()
            .execute(&conn("a"), &room_id("r2"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(LeaveRoomError::NotInRoom("r2".to_string())));
        let room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        assert!(room.is_member(&conn("a")));
    }

    #[tokio::test]
    async fn test_leave_without_room_is_noop() {
        // テスト項目: どのルームにも参加していない接続の退出は何もしない
        // given (前提条件):
        let harness = Harness::new();
        let _rx = harness.connect("a").await;

        // when (操作):
        let result = harness.leave_room().leave_current(&conn("a")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_immediate_retention_drops_empty_room() {
        // テスト項目: 保持ポリシー immediate では最後の接続が抜けたルームが破棄される
        // given (前提条件):
        let harness = Harness::with(RoomRetention::Immediate, 50);
        let _rx = harness.connect("a").await;
        harness.join("a", "r1", "alice").await;

        // when (操作):
        harness.leave_room().leave_current(&conn("a")).await.unwrap();

        // then (期待する結果):
        assert!(harness.repository.get_room(&room_id("r1")).await.is_none());
    }

    #[tokio::test]
    async fn test_retain_keeps_empty_room_state() {
        // テスト項目: 保持ポリシー retain では空のルームのコードが保持される
        // given (前提条件):
        let harness = Harness::new();
        let _rx = harness.connect("a").await;
        harness.join("a", "r1", "alice").await;
        let mut room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        room.apply_code(crate::domain::SourceCode::new("x=1".to_string()).unwrap());
        harness.repository.save_room(room).await;

        // when (操作):
        harness.leave_room().leave_current(&conn("a")).await.unwrap();

        // then (期待する結果):
        let room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        assert!(room.is_empty());
        assert_eq!(room.code.as_str(), "x=1");
        assert!(room.emptied_at.is_some());
    }
}

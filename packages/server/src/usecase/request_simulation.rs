//! UseCase: シミュレーション開始の中継
//!
//! 実行はしません。要求元を含むルーム全体に `simulation-started` を届けるだけで、状態も持ちません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Language, MessagePusher, Notification, RoomId, RoomRepository, SourceCode,
};

use super::error::SyncError;

/// シミュレーション開始中継のユースケース
pub struct RequestSimulationUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RequestSimulationUseCase {
    /// 新しい RequestSimulationUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        code: SourceCode,
        language: Language,
    ) -> Result<(), SyncError> {
        let Some(room) = self.repository.get_room(room_id).await else {
            tracing::debug!("simulation-request for unknown room '{}' ignored", room_id);
            return Ok(());
        };
        if !room.is_member(connection_id) {
            return Err(SyncError::NotInRoom(room_id.as_str().to_string()));
        }

        tracing::info!(
            "Simulation requested by '{}' in room '{}' ({})",
            connection_id,
            room_id,
            language
        );
        let notification = Notification::SimulationStarted {
            connection_id: connection_id.clone(),
            code,
            language,
        };
        if let Err(e) = self
            .message_pusher
            .broadcast(room.connection_ids(), &notification)
            .await
        {
            tracing::warn!("Failed to broadcast simulation-started: {}", e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MockMessagePusher,
        usecase::test_support::{Harness, conn, drain, room_id, types},
    };

    #[tokio::test]
    async fn test_simulation_started_reaches_requester() {
        // テスト項目: simulation-started は要求元を含む全接続に届き、ルームの状態は変わらない
        // given (前提条件):
        let harness = Harness::new();
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        harness.join("a", "r1", "alice").await;
        harness.join("b", "r1", "bob").await;
        drain(&mut rx_a);
        drain(&mut rx_b);
        let usecase = RequestSimulationUseCase::new(
            harness.repository.clone(),
            harness.message_pusher.clone(),
        );

        // when (操作):
        usecase
            .execute(
                &conn("a"),
                &room_id("r1"),
                SourceCode::new("led.on()".to_string()).unwrap(),
                Language::Arduino,
            )
            .await
            .unwrap();

        // then (期待する結果):
        for rx in [&mut rx_a, &mut rx_b] {
            let messages = drain(rx);
            assert_eq!(types(&messages), vec!["simulation-started"]);
            assert_eq!(messages[0]["connectionId"], "a");
            assert_eq!(messages[0]["code"], "led.on()");
            assert_eq!(messages[0]["language"], "arduino");
        }
        let room = harness.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.code.as_str(), "");
        assert_eq!(room.language, Language::JavaScript);
    }

    #[tokio::test]
    async fn test_simulation_for_unknown_room_sends_nothing() {
        // テスト項目: 存在しないルームへの要求では何も送信されない
        // given (前提条件):
        let harness = Harness::new();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = RequestSimulationUseCase::new(harness.repository.clone(), Arc::new(pusher));

        // when (操作):
        let result = usecase
            .execute(
                &conn("a"),
                &room_id("ghost"),
                SourceCode::default(),
                Language::JavaScript,
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
    }
}

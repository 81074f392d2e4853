//! UseCase: 接続確立処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 接続 ID の払い出しと、接続テーブル・MessagePusher への登録
//!
//! ### なぜこのテストが必要か
//! - クライアントは `connected` メッセージで自分の接続 ID を知り、エコーの破棄に使う
//! - 接続直後はどのルームにも参加していない（DISCONNECTED）ことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 正常系：複数接続にそれぞれ異なる ID が払い出される

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionIdFactory, MessagePusher, Notification, PusherChannel,
    RoomRepository,
};

use super::error::ConnectError;

/// 接続確立のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を確立する
    ///
    /// # Arguments
    ///
    /// * `sender` - この接続へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 払い出した接続 ID
    /// * `Err(ConnectError)` - 接続テーブルへの登録に失敗
    pub async fn execute(&self, sender: PusherChannel) -> Result<ConnectionId, ConnectError> {
        // 1. 接続 ID を払い出し、接続テーブルに登録（DISCONNECTED）
        let connection_id = ConnectionIdFactory::generate();
        self.repository
            .register_connection(connection_id.clone())
            .await?;

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        // 3. 自分の接続 ID を通知
        let notification = Notification::Connected {
            connection_id: connection_id.clone(),
        };
        if let Err(e) = self
            .message_pusher
            .push_to(&connection_id, &notification)
            .await
        {
            tracing::warn!("Failed to send connected to '{}': {}", connection_id, e);
        }

        Ok(connection_id)
    }
}

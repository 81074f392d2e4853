//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 名簿・カーソルへの登録と、3 種類の通知の順序と宛先
//!
//! ### なぜこのテストが必要か
//! - 参加者は名簿に高々 1 件（同じユーザーの複数接続でも重複しない）
//! - 後から参加した接続は最新のコード・言語と、自分を含む名簿をスナップショットで受け取る
//! - 別のルームへ参加すると、先に元のルームから退出する
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの参加 / 既存ルームへの参加
//! - 正常系：同じルームへの再参加（冪等）
//! - 正常系：同じルームへ別の参加者として再参加（退出＋参加として通知）
//! - 正常系：別ルームへの参加（暗黙の退出）
//! - 異常系：接続数の上限超過（別ルームから移る場合も元のルームに残る）

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::domain::{
    ConnectionId, Cursor, IdentityProvider, MessagePusher, Notification, Participant, RoomId,
    RoomRepository, Timestamp,
};

use super::{error::JoinRoomError, leave_room::LeaveRoomUseCase};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// IdentityProvider（外部のユーザー ID プロバイダの抽象化）
    identity_provider: Arc<dyn IdentityProvider>,
    /// 別ルームへ参加するときの暗黙の退出に使う
    leave_room: Arc<LeaveRoomUseCase>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        identity_provider: Arc<dyn IdentityProvider>,
        leave_room: Arc<LeaveRoomUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            identity_provider,
            leave_room,
            clock,
        }
    }

    /// クライアントが名乗った参加者情報を解決する
    ///
    /// ディスパッチロックの外側で呼ぶこと。
    pub async fn resolve_participant(
        &self,
        claimed: Participant,
    ) -> Result<Participant, JoinRoomError> {
        Ok(self.identity_provider.resolve(claimed).await?)
    }

    /// ルーム参加を実行
    ///
    /// 通知は次の順で送られます。
    ///
    /// 1. `user-joined` を他の接続へ
    /// 2. `room-state` を参加した接続へ
    /// 3. `participants-updated` を参加した接続を含むルーム全体へ
    ///
    /// 参加中のルームへの再参加では `room-state` だけを送り直します。
    /// ただし別の参加者を名乗った再参加では、他の接続へ以前の参加者の `user-left` を送ってから
    /// 通常の参加と同じ通知を送ります。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `room_id` - 参加するルーム（存在しなければ作成）
    /// * `participant` - 解決済みの参加者情報
    /// * `cursor` - 初期カーソル位置
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 参加成功
    /// * `Err(JoinRoomError)` - 参加失敗（接続状態は元に戻る）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        participant: Participant,
        cursor: Option<Cursor>,
    ) -> Result<(), JoinRoomError> {
        // 1. 別のルームに参加中なら、先にそのルームから退出
        //    参加先が満員なら、元のルームには手を付けずに拒否する
        let mut state = self.repository.connection_state(&connection_id).await?;
        if let Some(current) = state.joined_room()
            && current != &room_id
        {
            if let Some(target) = self.repository.get_room(&room_id).await {
                target.check_admission(&connection_id)?;
            }
            tracing::debug!(
                "Connection '{}' switches room '{}' -> '{}'",
                connection_id,
                current,
                room_id
            );
            self.leave_room.leave_current(&connection_id).await?;
            state = self.repository.connection_state(&connection_id).await?;
        }
        let rejoin = state.joined_room().is_some();

        // 2. DISCONNECTED (or JOINED) → JOINING
        let joining = state.begin_join(room_id.clone())?;
        self.repository
            .set_connection_state(&connection_id, joining.clone())
            .await?;

        // 3. 名簿とカーソルに登録
        let now = Timestamp::new(self.clock.now_millis());
        let mut room = self.repository.get_or_create_room(&room_id, now).await;
        // 再参加で別の参加者を名乗った場合は、以前の参加者の退出として扱う
        let replaced = room
            .presence_of(&connection_id)
            .map(|presence| presence.participant.clone())
            .filter(|previous| previous.id != participant.id);
        if let Err(e) = room.admit(connection_id.clone(), participant.clone(), cursor) {
            tracing::warn!(
                "Connection '{}' cannot join room '{}': {}",
                connection_id,
                room_id,
                e
            );
            self.repository
                .set_connection_state(&connection_id, joining.abort_join()?)
                .await?;
            return Err(e.into());
        }

        let others = room.connection_ids_except(&connection_id);
        let everyone = room.connection_ids();
        let snapshot = room.snapshot();
        let participants = room.participants.clone();
        self.repository.save_room(room).await;

        // 4. JOINING → JOINED
        self.repository
            .set_connection_state(&connection_id, joining.complete_join()?)
            .await?;

        tracing::info!(
            "Connection '{}' ({}) joined room '{}'",
            connection_id,
            participant.id,
            room_id
        );

        // 5. 通知
        let announce = !rejoin || replaced.is_some();
        if let Some(previous) = replaced
            && !others.is_empty()
        {
            let left = Notification::UserLeft {
                participant: previous,
                connection_id: connection_id.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast(others.clone(), &left).await {
                tracing::warn!("Failed to broadcast user-left: {}", e);
            }
        }

        if announce && !others.is_empty() {
            let joined = Notification::UserJoined {
                participant,
                connection_id: connection_id.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast(others, &joined).await {
                tracing::warn!("Failed to broadcast user-joined: {}", e);
            }
        }

        if let Err(e) = self
            .message_pusher
            .push_to(&connection_id, &Notification::RoomState(snapshot))
            .await
        {
            tracing::warn!("Failed to send room-state to '{}': {}", connection_id, e);
        }

        if announce {
            let updated = Notification::ParticipantsUpdated { participants };
            if let Err(e) = self.message_pusher.broadcast(everyone, &updated).await {
                tracing::warn!("Failed to broadcast participants-updated: {}", e);
            }
        }

        Ok(())
    }
}

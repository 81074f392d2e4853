//! Repository trait 定義
//!
//! ルームレジストリ（roomId → Room）と接続テーブル（connectionId → 接続状態）への
//! インターフェース。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 排他制御
//!
//! 個々のメソッドはアトミックだが、「取得 → 変更 → 保存」の一連の操作は
//! 呼び出し側（UI 層のディスパッチロック）で直列化される前提です。

use async_trait::async_trait;

use super::{
    connection::ConnectionState,
    entity::Room,
    error::RepositoryError,
    value_object::{ConnectionId, RoomId, Timestamp},
};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを取得し、存在しなければ空のルームを作成して登録する
    async fn get_or_create_room(&self, room_id: &RoomId, now: Timestamp) -> Room;

    /// ルームを取得
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// ルームを保存（上書き）
    async fn save_room(&self, room: Room);

    /// ルームを削除
    async fn remove_room(&self, room_id: &RoomId) -> Option<Room>;

    /// 全てのルームを取得（RoomId 順）
    async fn get_rooms(&self) -> Vec<Room>;

    /// 接続を登録（状態は DISCONNECTED）
    async fn register_connection(&self, connection_id: ConnectionId)
    -> Result<(), RepositoryError>;

    /// 接続の状態を取得
    async fn connection_state(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<ConnectionState, RepositoryError>;

    /// 接続の状態を更新
    async fn set_connection_state(
        &self,
        connection_id: &ConnectionId,
        state: ConnectionState,
    ) -> Result<(), RepositoryError>;

    /// 接続を登録解除し、最後の状態を返す
    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Option<ConnectionState>;

    /// 登録中の接続数
    async fn count_connections(&self) -> usize;
}

//! ドメイン層
//!
//! コラボレーションルームのビジネスルールを表現します。
//!
//! - `value_object`: RoomId, ConnectionId, Language などの値オブジェクト
//! - `entity`: Room（プレゼンス索引を含む集約）, Participant
//! - `command`: クライアントからの要求（バリデーション済み）
//! - `connection`: 接続ごとのライフサイクル状態機械
//! - `notification`: クライアントへ通知するドメインイベント
//! - `repository` / `message_pusher` / `identity`: Infrastructure 層が実装する trait（依存性の逆転）

pub mod command;
pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod identity;
pub mod message_pusher;
pub mod notification;
pub mod repository;
pub mod value_object;

pub use command::Command;
pub use connection::ConnectionState;
pub use entity::{Departure, Participant, Presence, Room, RoomSnapshot};
pub use error::{
    IdentityError, MessagePushError, RepositoryError, RoomError, TransitionError,
    ValueObjectError,
};
pub use factory::ConnectionIdFactory;
pub use identity::IdentityProvider;
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use notification::{Notification, RejectionReason};
pub use repository::RoomRepository;
pub use value_object::{
    ConnectionId, Cursor, Language, ParticipantId, RoomId, RoomRetention, SourceCode, Timestamp,
};

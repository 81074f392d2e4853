//! 接続ごとのライフサイクル状態機械
//!
//! ```text
//! DISCONNECTED ──begin_join──▶ JOINING ──complete_join──▶ JOINED
//!      ▲                          │  │                       │
//!      └────────abort_join────────┘  └──begin_leave──┐  begin_leave
//!      │                                             ▼       ▼
//!      └───────────────────complete_leave─────────────── LEAVING
//! ```
//!
//! - `DISCONNECTED` はどのルームにも参加していない状態（トランスポートは生きていてもよい）
//! - 参加中のルームへの再 join は `JOINED → JOINING` として許可する
//! - 別のルームへの join は、先に leave して `DISCONNECTED` に戻ってから行う
//! - 参加処理の途中で切れた接続（JOINING）や退出途中の接続（LEAVING）も leave で片付けられる

use super::{error::TransitionError, value_object::RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Joining { room_id: RoomId },
    Joined { room_id: RoomId },
    Leaving { room_id: RoomId },
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Joining { .. } => "joining",
            ConnectionState::Joined { .. } => "joined",
            ConnectionState::Leaving { .. } => "leaving",
        }
    }

    /// 参加中（JOINED）のルーム
    pub fn joined_room(&self) -> Option<&RoomId> {
        match self {
            ConnectionState::Joined { room_id } => Some(room_id),
            _ => None,
        }
    }

    pub fn begin_join(self, room_id: RoomId) -> Result<Self, TransitionError> {
        match self {
            ConnectionState::Disconnected => Ok(ConnectionState::Joining { room_id }),
            ConnectionState::Joined { room_id: current } if current == room_id => {
                Ok(ConnectionState::Joining { room_id })
            }
            other => Err(other.reject("join")),
        }
    }

    pub fn complete_join(self) -> Result<Self, TransitionError> {
        match self {
            ConnectionState::Joining { room_id } => Ok(ConnectionState::Joined { room_id }),
            other => Err(other.reject("complete join")),
        }
    }

    pub fn abort_join(self) -> Result<Self, TransitionError> {
        match self {
            ConnectionState::Joining { .. } => Ok(ConnectionState::Disconnected),
            other => Err(other.reject("abort join")),
        }
    }

    /// 状態が指しているルーム（JOINING / JOINED / LEAVING）
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            ConnectionState::Disconnected => None,
            ConnectionState::Joining { room_id }
            | ConnectionState::Joined { room_id }
            | ConnectionState::Leaving { room_id } => Some(room_id),
        }
    }

    pub fn begin_leave(self) -> Result<Self, TransitionError> {
        match self {
            ConnectionState::Joining { room_id }
            | ConnectionState::Joined { room_id }
            | ConnectionState::Leaving { room_id } => Ok(ConnectionState::Leaving { room_id }),
            other => Err(other.reject("leave")),
        }
    }

    pub fn complete_leave(self) -> Result<Self, TransitionError> {
        match self {
            ConnectionState::Leaving { .. } => Ok(ConnectionState::Disconnected),
            other => Err(other.reject("complete leave")),
        }
    }

    fn reject(&self, event: &'static str) -> TransitionError {
        TransitionError {
            from: self.name(),
            event,
        }
    }
}

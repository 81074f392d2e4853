//! クライアントへ通知するドメインイベント
//!
//! UseCase 層はこの型で「何を通知するか」だけを決め、
//! ワイヤーフォーマットへの変換は Infrastructure 層（DTO）が担当します。

use super::{
    entity::{Participant, RoomSnapshot},
    value_object::{ConnectionId, Cursor, Language, SourceCode},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// 接続直後に、その接続自身の ID を伝える
    Connected { connection_id: ConnectionId },
    /// 参加した接続だけに送るルームのスナップショット
    RoomState(RoomSnapshot),
    UserJoined {
        participant: Participant,
        connection_id: ConnectionId,
    },
    UserLeft {
        participant: Participant,
        connection_id: ConnectionId,
    },
    ParticipantsUpdated { participants: Vec<Participant> },
    CodeUpdated {
        code: SourceCode,
        connection_id: ConnectionId,
    },
    LanguageUpdated {
        language: Language,
        connection_id: ConnectionId,
    },
    CursorUpdated {
        connection_id: ConnectionId,
        cursor: Cursor,
        participant: Participant,
    },
    SimulationStarted {
        connection_id: ConnectionId,
        code: SourceCode,
        language: Language,
    },
    /// 送信元だけに返す拒否通知
    Rejected {
        reason: RejectionReason,
        message: String,
    },
}

/// 拒否理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    MalformedMessage,
    NotInRoom,
    RoomFull,
    IdentityMismatch,
    InvalidState,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MalformedMessage => "malformed-message",
            RejectionReason::NotInRoom => "not-in-room",
            RejectionReason::RoomFull => "room-full",
            RejectionReason::IdentityMismatch => "identity-mismatch",
            RejectionReason::InvalidState => "invalid-state",
        }
    }
}

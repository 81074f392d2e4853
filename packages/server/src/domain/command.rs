//! クライアントからの要求（バリデーション済み）

use super::{
    entity::Participant,
    value_object::{Cursor, Language, RoomId, SourceCode},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    JoinRoom {
        room_id: RoomId,
        participant: Participant,
        cursor: Option<Cursor>,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    ChangeCode {
        room_id: RoomId,
        code: SourceCode,
    },
    ChangeLanguage {
        room_id: RoomId,
        language: Language,
    },
    MoveCursor {
        room_id: RoomId,
        cursor: Cursor,
        participant: Option<Participant>,
    },
    RequestSimulation {
        room_id: RoomId,
        code: SourceCode,
        language: Language,
    },
}

impl Command {
    /// メッセージ種別名（ログ用）
    pub fn kind(&self) -> &'static str {
        match self {
            Command::JoinRoom { .. } => "join-room",
            Command::LeaveRoom { .. } => "leave-room",
            Command::ChangeCode { .. } => "code-change",
            Command::ChangeLanguage { .. } => "language-change",
            Command::MoveCursor { .. } => "cursor-change",
            Command::RequestSimulation { .. } => "simulation-request",
        }
    }
}

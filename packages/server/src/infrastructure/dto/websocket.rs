//! WebSocket message DTOs.
//!
//! Every frame is a JSON object whose `type` field names the message
//! (`join-room`, `code-updated`, ...); payload fields are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cursor position in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorDto {
    pub line: u32,
    pub column: u32,
}

/// Participant as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorDto>,
}

// ========================================
// Client → Server
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomMessage),
    LeaveRoom(LeaveRoomMessage),
    CodeChange(CodeChangeMessage),
    LanguageChange(LanguageChangeMessage),
    CursorChange(CursorChangeMessage),
    SimulationRequest(SimulationRequestMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomMessage {
    pub room_id: String,
    #[serde(alias = "user")]
    pub participant: ParticipantDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomMessage {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeMessage {
    pub room_id: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChangeMessage {
    pub room_id: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorChangeMessage {
    pub room_id: String,
    pub cursor: CursorDto,
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequestMessage {
    pub room_id: String,
    pub code: String,
    pub language: String,
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Connected(ConnectedMessage),
    RoomState(RoomStateMessage),
    UserJoined(PeerPresenceMessage),
    UserLeft(PeerPresenceMessage),
    ParticipantsUpdated(ParticipantsUpdatedMessage),
    CodeUpdated(CodeUpdatedMessage),
    LanguageUpdated(LanguageUpdatedMessage),
    CursorUpdated(CursorUpdatedMessage),
    SimulationStarted(SimulationStartedMessage),
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: String,
}

/// Full snapshot, sent only to the joining connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateMessage {
    pub code: String,
    pub language: String,
    pub participants: Vec<ParticipantDto>,
    /// connectionId → participant with its latest cursor
    pub cursors: BTreeMap<String, ParticipantDto>,
}

/// Payload of `user-joined` and `user-left`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerPresenceMessage {
    pub participant: ParticipantDto,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsUpdatedMessage {
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdatedMessage {
    pub code: String,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageUpdatedMessage {
    pub language: String,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdatedMessage {
    pub connection_id: String,
    pub cursor: CursorDto,
    pub participant: ParticipantDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStartedMessage {
    pub connection_id: String,
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub reason: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_accepts_user_alias() {
        // テスト項目: join-room の participant は "user" という名前でも受け付けられる
        // given (前提条件):
        let json = r#"{"type":"join-room","roomId":"r1","user":{"id":"u1","name":"Alice","image":"https://example.com/a.png"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            msg,
            ClientMessage::JoinRoom(JoinRoomMessage {
                room_id: "r1".to_string(),
                participant: ParticipantDto {
                    id: "u1".to_string(),
                    name: "Alice".to_string(),
                    image: Some("https://example.com/a.png".to_string()),
                    cursor: None,
                },
            })
        );
    }

    #[test]
    fn test_cursor_change_participant_is_optional() {
        // テスト項目: cursor-change の participant は省略できる
        // given (前提条件):
        let json = r#"{"type":"cursor-change","roomId":"r1","cursor":{"line":3,"column":9}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        let ClientMessage::CursorChange(change) = msg else {
            panic!("expected cursor-change, got {msg:?}");
        };
        assert_eq!(change.cursor, CursorDto { line: 3, column: 9 });
        assert_eq!(change.participant, None);
    }

    #[test]
    fn test_missing_room_id_is_rejected() {
        // テスト項目: roomId が欠けたメッセージはパースエラーになる
        // given (前提条件):
        let json = r#"{"type":"code-change","code":"x=1"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_code_updated_wire_format() {
        // テスト項目: code-updated が type タグと camelCase のフィールドで出力される
        // given (前提条件):
        let msg = ServerMessage::CodeUpdated(CodeUpdatedMessage {
            code: "x=1".to_string(),
            connection_id: "c1".to_string(),
        });

        // when (操作):
        let value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({"type": "code-updated", "code": "x=1", "connectionId": "c1"})
        );
    }

    #[test]
    fn test_participant_without_cursor_omits_field() {
        // テスト項目: カーソルを持たない参加者は cursor / image フィールドを出力しない
        // given (前提条件):
        let msg = ServerMessage::ParticipantsUpdated(ParticipantsUpdatedMessage {
            participants: vec![ParticipantDto {
                id: "u1".to_string(),
                name: "Alice".to_string(),
                image: None,
                cursor: None,
            }],
        });

        // when (操作):
        let value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({
                "type": "participants-updated",
                "participants": [{"id": "u1", "name": "Alice"}]
            })
        );
    }
}

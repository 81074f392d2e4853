//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    Command, Cursor, Notification, Participant, ParticipantId, Presence, RoomId, RoomSnapshot,
    SourceCode, ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;

/// Display name used when the client sends an empty one
pub const ANONYMOUS_NAME: &str = "Anonymous";

// ========================================
// DTO → Domain
// ========================================

impl From<dto::CursorDto> for Cursor {
    fn from(dto: dto::CursorDto) -> Self {
        Cursor::new(dto.line, dto.column)
    }
}

impl TryFrom<dto::ParticipantDto> for Participant {
    type Error = ValueObjectError;

    fn try_from(dto: dto::ParticipantDto) -> Result<Self, Self::Error> {
        let name = if dto.name.trim().is_empty() {
            ANONYMOUS_NAME.to_string()
        } else {
            dto.name
        };
        let image = dto.image.filter(|url| !url.trim().is_empty());
        Ok(Participant::new(ParticipantId::new(dto.id)?, name, image))
    }
}

impl TryFrom<dto::ClientMessage> for Command {
    type Error = ValueObjectError;

    fn try_from(message: dto::ClientMessage) -> Result<Self, Self::Error> {
        let command = match message {
            dto::ClientMessage::JoinRoom(msg) => {
                let cursor = msg.participant.cursor.map(Cursor::from);
                Command::JoinRoom {
                    room_id: RoomId::new(msg.room_id)?,
                    participant: Participant::try_from(msg.participant)?,
                    cursor,
                }
            }
            dto::ClientMessage::LeaveRoom(msg) => Command::LeaveRoom {
                room_id: RoomId::new(msg.room_id)?,
            },
            dto::ClientMessage::CodeChange(msg) => Command::ChangeCode {
                room_id: RoomId::new(msg.room_id)?,
                code: SourceCode::new(msg.code)?,
            },
            dto::ClientMessage::LanguageChange(msg) => Command::ChangeLanguage {
                room_id: RoomId::new(msg.room_id)?,
                language: msg.language.parse()?,
            },
            dto::ClientMessage::CursorChange(msg) => Command::MoveCursor {
                room_id: RoomId::new(msg.room_id)?,
                cursor: msg.cursor.into(),
                participant: msg.participant.map(Participant::try_from).transpose()?,
            },
            dto::ClientMessage::SimulationRequest(msg) => Command::RequestSimulation {
                room_id: RoomId::new(msg.room_id)?,
                code: SourceCode::new(msg.code)?,
                language: msg.language.parse()?,
            },
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Cursor> for dto::CursorDto {
    fn from(cursor: Cursor) -> Self {
        Self {
            line: cursor.line,
            column: cursor.column,
        }
    }
}

impl From<&Participant> for dto::ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id.as_str().to_string(),
            name: participant.name.clone(),
            image: participant.image.clone(),
            cursor: None,
        }
    }
}

impl From<&Presence> for dto::ParticipantDto {
    fn from(presence: &Presence) -> Self {
        Self {
            cursor: presence.cursor.map(dto::CursorDto::from),
            ..dto::ParticipantDto::from(&presence.participant)
        }
    }
}

impl From<&RoomSnapshot> for dto::RoomStateMessage {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            code: snapshot.code.as_str().to_string(),
            language: snapshot.language.as_str().to_string(),
            participants: participant_dtos(&snapshot.participants),
            cursors: snapshot
                .cursors
                .iter()
                .map(|(connection_id, presence)| {
                    (connection_id.as_str().to_string(), presence.into())
                })
                .collect(),
        }
    }
}

impl From<&Notification> for dto::ServerMessage {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::Connected { connection_id } => {
                dto::ServerMessage::Connected(dto::ConnectedMessage {
                    connection_id: connection_id.as_str().to_string(),
                })
            }
            Notification::RoomState(snapshot) => dto::ServerMessage::RoomState(snapshot.into()),
            Notification::UserJoined {
                participant,
                connection_id,
            } => dto::ServerMessage::UserJoined(dto::PeerPresenceMessage {
                participant: participant.into(),
                connection_id: connection_id.as_str().to_string(),
            }),
            Notification::UserLeft {
                participant,
                connection_id,
            } => dto::ServerMessage::UserLeft(dto::PeerPresenceMessage {
                participant: participant.into(),
                connection_id: connection_id.as_str().to_string(),
            }),
            Notification::ParticipantsUpdated { participants } => {
                dto::ServerMessage::ParticipantsUpdated(dto::ParticipantsUpdatedMessage {
                    participants: participant_dtos(participants),
                })
            }
            Notification::CodeUpdated {
                code,
                connection_id,
            } => dto::ServerMessage::CodeUpdated(dto::CodeUpdatedMessage {
                code: code.as_str().to_string(),
                connection_id: connection_id.as_str().to_string(),
            }),
            Notification::LanguageUpdated {
                language,
                connection_id,
            } => dto::ServerMessage::LanguageUpdated(dto::LanguageUpdatedMessage {
                language: language.as_str().to_string(),
                connection_id: connection_id.as_str().to_string(),
            }),
            Notification::CursorUpdated {
                connection_id,
                cursor,
                participant,
            } => dto::ServerMessage::CursorUpdated(dto::CursorUpdatedMessage {
                connection_id: connection_id.as_str().to_string(),
                cursor: (*cursor).into(),
                participant: dto::ParticipantDto {
                    cursor: Some((*cursor).into()),
                    ..participant.into()
                },
            }),
            Notification::SimulationStarted {
                connection_id,
                code,
                language,
            } => dto::ServerMessage::SimulationStarted(dto::SimulationStartedMessage {
                connection_id: connection_id.as_str().to_string(),
                code: code.as_str().to_string(),
                language: language.as_str().to_string(),
            }),
            Notification::Rejected { reason, message } => {
                dto::ServerMessage::Error(dto::ErrorMessage {
                    reason: reason.as_str().to_string(),
                    message: message.clone(),
                })
            }
        }
    }
}

fn participant_dtos(participants: &[Participant]) -> Vec<dto::ParticipantDto> {
    participants.iter().map(dto::ParticipantDto::from).collect()
}

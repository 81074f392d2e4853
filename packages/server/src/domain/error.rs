//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成に失敗したときのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id must be at most {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("unknown language '{0}' (expected 'javascript' or 'arduino')")]
    UnknownLanguage(String),

    #[error("code must be at most {max} bytes (got {actual})")]
    CodeTooLarge { max: usize, actual: usize },
}

/// Room 集約の不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is full ({capacity} connections)")]
    CapacityExceeded { capacity: usize },

    #[error("connection '{0}' is not a member of this room")]
    NotAMember(String),
}

/// 接続状態機械で許可されていない遷移
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {event} while {from}")]
pub struct TransitionError {
    pub from: &'static str,
    pub event: &'static str,
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),

    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode message: {0}")]
    EncodeFailed(String),
}

/// IdentityProvider のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity rejected: {0}")]
    Rejected(String),
}

//! UseCase 層のエラー定義
//!
//! 各エラーは UI 層で `error` メッセージの拒否理由に変換されます。

use thiserror::Error;

use crate::domain::{
    IdentityError, RejectionReason, RepositoryError, RoomError, TransitionError,
};

/// 参加者接続のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム参加のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinRoomError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    InvalidState(#[from] TransitionError),
    #[error(transparent)]
    Leave(#[from] LeaveRoomError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl JoinRoomError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            JoinRoomError::Room(RoomError::CapacityExceeded { .. }) => RejectionReason::RoomFull,
            JoinRoomError::Room(RoomError::NotAMember(_)) => RejectionReason::NotInRoom,
            JoinRoomError::Identity(_) => RejectionReason::IdentityMismatch,
            JoinRoomError::Leave(e) => e.reason(),
            JoinRoomError::InvalidState(_) | JoinRoomError::Repository(_) => {
                RejectionReason::InvalidState
            }
        }
    }
}

/// ルーム退出のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaveRoomError {
    #[error("connection is not in room '{0}'")]
    NotInRoom(String),
    #[error(transparent)]
    InvalidState(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LeaveRoomError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            LeaveRoomError::NotInRoom(_) => RejectionReason::NotInRoom,
            LeaveRoomError::InvalidState(_) | LeaveRoomError::Repository(_) => {
                RejectionReason::InvalidState
            }
        }
    }
}

/// コード・言語・カーソル同期のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("connection is not in room '{0}'")]
    NotInRoom(String),
    #[error("participant '{claimed}' does not match joined identity '{joined}'")]
    IdentityMismatch { joined: String, claimed: String },
}

impl SyncError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            SyncError::NotInRoom(_) => RejectionReason::NotInRoom,
            SyncError::IdentityMismatch { .. } => RejectionReason::IdentityMismatch,
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
    #[error("invalid room id")]
    InvalidRoomId,
}

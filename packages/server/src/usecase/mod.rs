//! UseCase 層
//!
//! 1 ユースケース = 1 構造体（`new` で依存を受け取り、`execute` で実行）。
//! Repository / MessagePusher / IdentityProvider は trait object として注入されます。
//!
//! ルームを変更するユースケースは UI 層のディスパッチロックの内側で呼ばれる前提です。

mod apply_code_change;
mod apply_cursor_change;
mod apply_language_change;
mod connect_participant;
mod disconnect_participant;
mod error;
mod evict_idle_rooms;
mod get_room_detail;
mod get_rooms;
mod join_room;
mod leave_room;
mod request_simulation;

#[cfg(test)]
mod test_support;

pub use apply_code_change::ApplyCodeChangeUseCase;
pub use apply_cursor_change::ApplyCursorChangeUseCase;
pub use apply_language_change::ApplyLanguageChangeUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetRoomDetailError, JoinRoomError, LeaveRoomError, SyncError};
pub use evict_idle_rooms::EvictIdleRoomsUseCase;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use request_simulation::RequestSimulationUseCase;

//! Server state shared by the handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::MessagePusher,
    usecase::{
        ApplyCodeChangeUseCase, ApplyCursorChangeUseCase, ApplyLanguageChangeUseCase,
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase, RequestSimulationUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ルームを変更する処理を 1 つずつ実行するためのロック
    ///
    /// 変更とその通知の間に、他の接続の変更が割り込まないようにします。
    pub dispatch_lock: Mutex<()>,
    /// MessagePusher（拒否通知の送信に使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub apply_code_change_usecase: Arc<ApplyCodeChangeUseCase>,
    pub apply_language_change_usecase: Arc<ApplyLanguageChangeUseCase>,
    pub apply_cursor_change_usecase: Arc<ApplyCursorChangeUseCase>,
    pub request_simulation_usecase: Arc<RequestSimulationUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}

//! Server execution logic.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use kyodo_shared::time::{Clock, SystemClock};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    domain::{IdentityProvider, MessagePusher, RoomRepository, RoomRetention},
    infrastructure::{
        identity::TrustedIdentityProvider, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    usecase::{
        ApplyCodeChangeUseCase, ApplyCursorChangeUseCase, ApplyLanguageChangeUseCase,
        ConnectParticipantUseCase, DisconnectParticipantUseCase, EvictIdleRoomsUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        RequestSimulationUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// 空ルームの掃除間隔の上限
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Server configuration
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// 空になったルームの保持ポリシー
    pub room_retention: RoomRetention,
    /// 1 ルームあたりの最大接続数
    pub max_connections_per_room: usize,
}

/// Collaboration room server
///
/// # Example
///
/// ```ignore
/// let server = Server::in_memory(ServerConfig {
///     room_retention: RoomRetention::Ttl(Duration::from_secs(300)),
///     max_connections_per_room: 50,
/// });
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// EvictIdleRoomsUseCase（空ルーム破棄のユースケース）
    evict_idle_rooms_usecase: Arc<EvictIdleRoomsUseCase>,
    room_retention: RoomRetention,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        state: AppState,
        evict_idle_rooms_usecase: Arc<EvictIdleRoomsUseCase>,
        room_retention: RoomRetention,
    ) -> Self {
        Self {
            state: Arc::new(state),
            evict_idle_rooms_usecase,
            room_retention,
        }
    }

    /// Wire the in-memory implementations into a Server
    ///
    /// Dependencies are created in order:
    /// 1. Repository
    /// 2. MessagePusher / IdentityProvider / Clock
    /// 3. UseCases
    /// 4. AppState
    pub fn in_memory(config: ServerConfig) -> Self {
        // 1. Repository (in-memory database)
        let repository: Arc<dyn RoomRepository> = Arc::new(
            InMemoryRoomRepository::with_room_capacity(config.max_connections_per_room),
        );

        // 2. MessagePusher (WebSocket implementation), IdentityProvider, Clock
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new(
            Arc::new(Mutex::new(HashMap::new())),
        ));
        let identity_provider: Arc<dyn IdentityProvider> = Arc::new(TrustedIdentityProvider);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 3. UseCases
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            clock.clone(),
            config.room_retention,
        ));
        let state = AppState {
            dispatch_lock: Mutex::new(()),
            message_pusher: message_pusher.clone(),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                leave_room_usecase.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                identity_provider,
                leave_room_usecase.clone(),
                clock.clone(),
            )),
            leave_room_usecase,
            apply_code_change_usecase: Arc::new(ApplyCodeChangeUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            apply_language_change_usecase: Arc::new(ApplyLanguageChangeUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            apply_cursor_change_usecase: Arc::new(ApplyCursorChangeUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            request_simulation_usecase: Arc::new(RequestSimulationUseCase::new(
                repository.clone(),
                message_pusher,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository.clone())),
        };
        let evict_idle_rooms_usecase = Arc::new(EvictIdleRoomsUseCase::new(
            repository,
            clock,
            config.room_retention,
        ));

        // 4. Server
        Self::new(state, evict_idle_rooms_usecase, config.room_retention)
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let sweeper = self.spawn_room_sweeper();

        tracing::info!(
            "Collaboration server listening on {}",
            listener.local_addr()?
        );

        // Set up graceful shutdown signal handler
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result
    }

    /// Run the collaboration server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Room retention: {:?}", self.room_retention);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// 保持ポリシーに従って空ルームを定期的に破棄するタスクを起動する
    fn spawn_room_sweeper(&self) -> Option<JoinHandle<()>> {
        let period = sweep_interval(self.room_retention)?;
        let state = self.state.clone();
        let usecase = self.evict_idle_rooms_usecase.clone();

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let _guard = state.dispatch_lock.lock().await;
                let evicted = usecase.execute().await;
                if !evicted.is_empty() {
                    tracing::debug!("Swept {} idle room(s)", evicted.len());
                }
            }
        }))
    }
}

fn sweep_interval(retention: RoomRetention) -> Option<Duration> {
    match retention {
        RoomRetention::Retain => None,
        RoomRetention::Immediate => Some(MAX_SWEEP_INTERVAL),
        RoomRetention::Ttl(ttl) => {
            Some((ttl / 2).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_interval() {
        // テスト項目: 保持ポリシーごとの掃除間隔
        // given (前提条件):
        let short = RoomRetention::Ttl(Duration::from_millis(500));
        let default = RoomRetention::Ttl(Duration::from_secs(300));

        // when (操作) / then (期待する結果):
        assert_eq!(sweep_interval(RoomRetention::Retain), None);
        assert_eq!(sweep_interval(RoomRetention::Immediate), Some(MAX_SWEEP_INTERVAL));
        assert_eq!(sweep_interval(short), Some(Duration::from_secs(1)));
        assert_eq!(sweep_interval(default), Some(MAX_SWEEP_INTERVAL));
    }
}

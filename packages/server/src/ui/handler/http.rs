//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kyodo_shared::time::timestamp_to_rfc3339;

use crate::{
    infrastructure::dto::http::{ParticipantDetailDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            id: room.id.as_str().to_string(),
            language: room.language.as_str().to_string(),
            participant_count: room.participants.len(),
            connection_count: room.connection_count(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(room) => {
            // Domain Model から DTO への変換
            let room_detail = RoomDetailDto {
                id: room.id.as_str().to_string(),
                code: room.code.as_str().to_string(),
                language: room.language.as_str().to_string(),
                participants: room
                    .participants
                    .iter()
                    .map(|p| ParticipantDetailDto {
                        id: p.id.as_str().to_string(),
                        name: p.name.clone(),
                        image: p.image.clone(),
                        connection_count: room.connection_count_of(&p.id),
                    })
                    .collect(),
                created_at: timestamp_to_rfc3339(room.created_at.value()),
            };
            Ok(Json(room_detail))
        }
        Err(GetRoomDetailError::RoomNotFound | GetRoomDetailError::InvalidRoomId) => {
            Err(StatusCode::NOT_FOUND)
        }
    }
}

//! HTTP route handlers
//!
//! Each endpoint maps 1:1 onto a registry operation; snapshot-shaped
//! responses carry the money line computed from the tally at read time.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CastVoteRequest, CreateRoomResponse, JoinRequest, SnapshotResponse};
use crate::AppState;

/// POST /rooms
pub async fn create_room(State(state): State<Arc<AppState>>) -> Json<CreateRoomResponse> {
    let room_id = state.registry.create_room().await;
    tracing::info!("Created room {}", room_id);
    Json(CreateRoomResponse { room_id })
}

/// POST /rooms/:room_id/join
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<SnapshotResponse>> {
    state.registry.join(&room_id, &request.name).await?;
    tracing::debug!("{} joined room {}", request.name, room_id);

    let view = state.registry.snapshot(&room_id).await?;
    Ok(Json(view.into()))
}

/// POST /rooms/:room_id/vote
pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<SnapshotResponse>> {
    state
        .registry
        .cast_vote(&room_id, &request.name, request.vote)
        .await?;
    tracing::debug!(
        "{} voted {} in room {}",
        request.name,
        request.vote.as_str(),
        room_id
    );

    let view = state.registry.snapshot(&room_id).await?;
    Ok(Json(view.into()))
}

/// GET /rooms/:room_id
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<SnapshotResponse>> {
    let view = state.registry.snapshot(&room_id).await?;
    Ok(Json(view.into()))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

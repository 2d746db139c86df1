//! Player endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use shuttlestats_core::{PlayerName, StatLine};

use crate::db::repos::{Player, PlayerRepo, PlayerStats};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson};
use crate::http::server::AppState;

use super::DeleteResponse;

/// Create player request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlayerRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Newly created player
#[derive(Serialize)]
pub struct PlayerResponse {
    pub id: i32,
    pub name: String,
    pub created_at: String,
}

impl From<Player> for PlayerResponse {
    fn from(p: Player) -> Self {
        Self {
            id: p.id,
            name: p.name,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Player row in the stats listing
#[derive(Serialize)]
pub struct PlayerStatsResponse {
    pub id: i32,
    pub name: String,
    #[serde(flatten)]
    pub stats: StatLine,
}

impl From<PlayerStats> for PlayerStatsResponse {
    fn from(p: PlayerStats) -> Self {
        Self {
            id: p.id,
            name: p.name,
            stats: p.stats,
        }
    }
}

/// GET /players - every player with stats, alphabetical
async fn list_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlayerStatsResponse>>, ApiError> {
    let players = PlayerRepo::new(&state.pool).list_with_stats().await?;
    Ok(Json(players.into_iter().map(PlayerStatsResponse::from).collect()))
}

/// POST /players - register a player
async fn create_player(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), ApiError> {
    let name = PlayerName::new(req.name.as_deref().unwrap_or_default())?;
    let player = PlayerRepo::new(&state.pool).create(&name).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))))
}

/// DELETE /players/{id} - remove a player and their pairs
async fn delete_player(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<DeleteResponse>, ApiError> {
    PlayerRepo::new(&state.pool).delete(id).await?;
    Ok(Json(DeleteResponse::deleted("player", id)))
}

/// Player routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/{id}", delete(delete_player))
}

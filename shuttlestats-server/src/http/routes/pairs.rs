//! Pair endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use shuttlestats_core::{Pairing, StatLine};

use crate::db::repos::{PairRepo, PairStats};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson};
use crate::http::server::AppState;

use super::DeleteResponse;

/// Create pair request: two existing player names
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePairRequest {
    #[serde(default)]
    pub player1: Option<String>,
    #[serde(default)]
    pub player2: Option<String>,
}

/// Pair row with stats
#[derive(Serialize)]
pub struct PairResponse {
    pub id: i32,
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1: String,
    pub player2: String,
    pub pair_name: String,
    #[serde(flatten)]
    pub stats: StatLine,
}

impl From<PairStats> for PairResponse {
    fn from(p: PairStats) -> Self {
        let pair_name = p.pair.display_name();
        Self {
            id: p.pair.id,
            player1_id: p.pair.player1_id,
            player2_id: p.pair.player2_id,
            player1: p.pair.player1,
            player2: p.pair.player2,
            pair_name,
            stats: p.stats,
        }
    }
}

/// GET /pairs - every pair with stats, by pair name
async fn list_pairs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PairResponse>>, ApiError> {
    let pairs = PairRepo::new(&state.pool).list_with_stats().await?;
    Ok(Json(pairs.into_iter().map(PairResponse::from).collect()))
}

/// POST /pairs - pair up two players
async fn create_pair(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreatePairRequest>,
) -> Result<(StatusCode, Json<PairResponse>), ApiError> {
    let pairing = Pairing::new(
        req.player1.as_deref().unwrap_or_default(),
        req.player2.as_deref().unwrap_or_default(),
    )?;
    let pair = PairRepo::new(&state.pool).create(&pairing).await?;

    Ok((StatusCode::CREATED, Json(PairResponse::from(pair))))
}

/// DELETE /pairs/{id} - remove a pair, keeping its matches
async fn delete_pair(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<DeleteResponse>, ApiError> {
    PairRepo::new(&state.pool).delete(id).await?;
    Ok(Json(DeleteResponse::deleted("pair", id)))
}

/// Pair routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pairs", get(list_pairs).post(create_pair))
        .route("/pairs/{id}", delete(delete_pair))
}

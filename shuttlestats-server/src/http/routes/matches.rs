//! Match endpoints
//!
//! Writes take raw set scores; every derived figure (result, set tallies,
//! point totals) is computed server-side before the transactional write.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shuttlestats_core::{
    derive_outcome, parse_match_date, MatchResult, OpponentName, SetScore, TeamTotals,
    ValidationError,
};

use crate::db::repos::{MatchGroup, MatchRecord, MatchRepo, NewMatch, SetRecord, StatsRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson};
use crate::http::server::AppState;

use super::DeleteResponse;

/// One set as entered by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSetScore {
    #[serde(rename = "pointsFor", default)]
    pub points_for: Option<Value>,
    #[serde(rename = "pointsAgainst", default)]
    pub points_against: Option<Value>,
}

/// Create or replace match request
///
/// Also the shape of each match in a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub pairing: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub sets: Vec<RawSetScore>,
}

impl MatchRequest {
    /// Validate every field and derive the outcome from the set scores.
    pub fn validate(self) -> Result<NewMatch, ValidationError> {
        let date = parse_match_date(self.date.as_deref().unwrap_or_default())?;
        let opponent = OpponentName::new(self.opponent.as_deref().unwrap_or_default())?;

        let scores = self
            .sets
            .iter()
            .enumerate()
            .map(|(i, s)| SetScore::from_json(i + 1, s.points_for.as_ref(), s.points_against.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let outcome = derive_outcome(&scores)?;

        let pairing = self
            .pairing
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());

        Ok(NewMatch {
            date,
            pairing,
            opponent,
            outcome,
        })
    }
}

/// Persisted set
#[derive(Debug, Serialize)]
pub struct SetResponse {
    pub match_id: i32,
    pub set_number: i32,
    pub points_for: i32,
    pub points_against: i32,
}

impl From<SetRecord> for SetResponse {
    fn from(s: SetRecord) -> Self {
        Self {
            match_id: s.match_id,
            set_number: s.set_number,
            points_for: s.points_for,
            points_against: s.points_against,
        }
    }
}

/// Single match with its sets
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub pair_id: Option<i32>,
    pub pairing: Option<String>,
    pub opponent: String,
    pub result: MatchResult,
    pub points_for: i32,
    pub points_against: i32,
    pub sets_for: i32,
    pub sets_against: i32,
    pub created_at: String,
    pub sets: Vec<SetResponse>,
}

impl From<MatchRecord> for MatchResponse {
    fn from(m: MatchRecord) -> Self {
        Self {
            id: m.id,
            date: m.date,
            pair_id: m.pair_id,
            pairing: m.pairing,
            opponent: m.opponent,
            result: m.result,
            points_for: m.points_for,
            points_against: m.points_against,
            sets_for: m.sets_for,
            sets_against: m.sets_against,
            created_at: m.created_at.to_rfc3339(),
            sets: m.sets.into_iter().map(SetResponse::from).collect(),
        }
    }
}

/// All matches of one fixture (date + opponent)
#[derive(Debug, Serialize)]
pub struct MatchGroupResponse {
    pub date: NaiveDate,
    pub opponent: String,
    pub match_ids: Vec<i32>,
    pub games_for: i64,
    pub games_against: i64,
    pub games_drawn: i64,
    pub sets_for: i64,
    pub sets_against: i64,
    pub points_for: i64,
    pub points_against: i64,
    pub sets: Vec<SetResponse>,
}

impl From<MatchGroup> for MatchGroupResponse {
    fn from(g: MatchGroup) -> Self {
        Self {
            date: g.date,
            opponent: g.opponent,
            match_ids: g.match_ids,
            games_for: g.games_for,
            games_against: g.games_against,
            games_drawn: g.games_drawn,
            sets_for: g.sets_for,
            sets_against: g.sets_against,
            points_for: g.points_for,
            points_against: g.points_against,
            sets: g.sets.into_iter().map(SetResponse::from).collect(),
        }
    }
}

/// GET /matches - fixtures grouped by date and opponent
async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MatchGroupResponse>>, ApiError> {
    let groups = MatchRepo::new(&state.pool).list_groups().await?;
    Ok(Json(groups.into_iter().map(MatchGroupResponse::from).collect()))
}

/// GET /matches/games - individual matches, most recent first
async fn list_games(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MatchResponse>>, ApiError> {
    let matches = MatchRepo::new(&state.pool).list().await?;
    Ok(Json(matches.into_iter().map(MatchResponse::from).collect()))
}

/// GET /matches/totals - team-wide totals
async fn totals(State(state): State<Arc<AppState>>) -> Result<Json<TeamTotals>, ApiError> {
    let totals = StatsRepo::new(&state.pool).team_totals().await?;
    Ok(Json(totals))
}

/// GET /matches/{id}
async fn get_match(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<MatchResponse>, ApiError> {
    let record = MatchRepo::new(&state.pool).get(id).await?;
    Ok(Json(MatchResponse::from(record)))
}

/// POST /matches - record a match from its set scores
async fn create_match(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<MatchRequest>,
) -> Result<(StatusCode, Json<MatchResponse>), ApiError> {
    let new = req.validate()?;
    let record = MatchRepo::new(&state.pool).create(&new).await?;

    Ok((StatusCode::CREATED, Json(MatchResponse::from(record))))
}

/// PUT /matches/{id} - replace a match and its sets
async fn replace_match(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    ValidJson(req): ValidJson<MatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let new = req.validate()?;
    let record = MatchRepo::new(&state.pool).replace(id, &new).await?;
    Ok(Json(MatchResponse::from(record)))
}

/// DELETE /matches/{id}
async fn delete_match(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<DeleteResponse>, ApiError> {
    MatchRepo::new(&state.pool).delete(id).await?;
    Ok(Json(DeleteResponse::deleted("match", id)))
}

/// Match routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matches", get(list_groups).post(create_match))
        .route("/matches/games", get(list_games))
        .route("/matches/totals", get(totals))
        .route(
            "/matches/{id}",
            get(get_match).put(replace_match).delete(delete_match),
        )
}

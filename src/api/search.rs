//! Search, availability, and statistics endpoints.
//!
//! All three are thin callers into the pure filter engine; the repository
//! supplies the games list and nothing here re-implements a predicate.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::domain::filter::{self, FeeFilter, GameStats, SearchCriteria};
use crate::errors::AppError;
use crate::models::Game;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct GameSearchQuery {
    /// Free-text query over name, location, and date.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Exact capacity match.
    #[serde(default)]
    pub players: Option<i64>,
    /// One of all|free|paid.
    #[serde(default)]
    pub fee: FeeFilter,
    /// When present, restrict to games this actor can still join.
    #[serde(default)]
    pub player_id: Option<String>,
}

/// GET /api/games/search - The public browse/search surface.
///
/// Only public games are visible here; criteria AND-compose on top, and an
/// optional `player_id` layers the available-to-actor view.
pub async fn search_games(
    State(state): State<AppState>,
    Query(params): Query<GameSearchQuery>,
) -> ApiResult<Vec<Game>> {
    let games = state.repo.list_games().await?;
    let mut games = filter::public_games(&games);

    if let Some(player_id) = &params.player_id {
        games = filter::available_to(&games, player_id);
    }

    let criteria = SearchCriteria {
        text: params.q,
        location: params.location,
        date: params.date,
        player_count: params.players,
        fee: params.fee,
    };

    success(filter::search(&games, &criteria))
}

/// Availability query parameters.
#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub player_id: String,
}

/// GET /api/games/available - Games the actor can still register for.
pub async fn available_games(
    State(state): State<AppState>,
    Query(params): Query<AvailableQuery>,
) -> ApiResult<Vec<Game>> {
    if params.player_id.trim().is_empty() {
        return Err(AppError::Validation("player_id is required".to_string()));
    }

    let games = state.repo.list_games().await?;
    success(filter::available_to(&games, &params.player_id))
}

/// GET /api/stats - Aggregate statistics over all games.
pub async fn game_stats(State(state): State<AppState>) -> ApiResult<GameStats> {
    let games = state.repo.list_games().await?;
    success(filter::stats(&games))
}

//! Game API endpoints: CRUD, registration, payment, roster removal.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::domain::command::creategame_command;
use crate::domain::payment::{
    registration_path, PaymentAttempt, PaymentForm, PaymentState, RegistrationPath,
};
use crate::errors::AppError;
use crate::models::{Actor, CreateGameRequest, Game, JoinGameRequest, UpdateGameRequest};
use crate::AppState;

/// GET /api/games - List all games.
pub async fn list_games(State(state): State<AppState>) -> ApiResult<Vec<Game>> {
    let games = state.repo.list_games().await?;
    success(games)
}

/// GET /api/games/:id - Get a single game.
pub async fn get_game(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Game> {
    match state.repo.get_game(&id).await? {
        Some(game) => success(game),
        None => Err(AppError::NotFound(format!("Game {} not found", id))),
    }
}

/// POST /api/games - Create a new game.
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> ApiResult<Game> {
    if request.date.trim().is_empty()
        || request.time.trim().is_empty()
        || request.location.trim().is_empty()
    {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    if request.created_by.trim().is_empty() {
        return Err(AppError::Validation("Creator is required".to_string()));
    }
    if request.players <= 0 {
        return Err(AppError::Validation(
            "Player count must be positive".to_string(),
        ));
    }
    if request.has_fee && request.fee <= 0.0 {
        return Err(AppError::Validation(
            "Please enter a valid fee amount".to_string(),
        ));
    }

    let game = state.repo.create_game(&request).await?;
    tracing::info!(game_id = %game.id, "Created game {}", game.name);
    success(game)
}

/// PUT /api/games/:id - Update a game. The roster is preserved verbatim.
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateGameRequest>,
) -> ApiResult<Game> {
    if let Some(players) = request.players {
        if players <= 0 {
            return Err(AppError::Validation(
                "Player count must be positive".to_string(),
            ));
        }
    }
    if request.has_fee == Some(true) && request.fee.is_some_and(|f| f <= 0.0) {
        return Err(AppError::Validation(
            "Please enter a valid fee amount".to_string(),
        ));
    }

    let game = state.repo.update_game(&id, &request).await?;
    success(game)
}

/// POST /api/games/:id/join - Register the actor for a free game.
///
/// The fee gate runs before the roster engine: fee games are answered with
/// 402 and must go through POST /api/games/:id/payments instead. A repeat
/// join by the same actor returns the unchanged game.
pub async fn join_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> ApiResult<Game> {
    validate_actor(&request)?;

    let game = state
        .repo
        .get_game(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))?;

    if registration_path(&game) == RegistrationPath::RequirePayment {
        return Err(AppError::PaymentRequired(format!(
            "Game requires a ${:.2} fee; submit payment to register",
            game.fee
        )));
    }

    let actor = Actor {
        id: request.player_id,
        name: request.name,
        skill: request.skill,
    };
    let game = state.repo.register_player(&id, &actor, false).await?;
    tracing::info!(game_id = %id, player_id = %actor.id, "Player registered");
    success(game)
}

/// Request body for the payment endpoint: the joining actor plus the
/// payment form fields.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(flatten)]
    pub form: PaymentForm,
}

/// POST /api/games/:id/payments - Run the payment flow for a fee game and
/// register the actor on success.
pub async fn submit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<Game> {
    if request.player_id.trim().is_empty() || request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Player id and name are required".to_string(),
        ));
    }

    let game = state
        .repo
        .get_game(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))?;

    if registration_path(&game) == RegistrationPath::ImmediateRegister {
        return Err(AppError::BadRequest(
            "Game has no fee; register via join".to_string(),
        ));
    }

    let now = Utc::now();
    let mut attempt = PaymentAttempt::new();
    attempt.open_form().map_err(AppError::from)?;
    attempt.submit(&request.form, now).map_err(AppError::from)?;

    match attempt.resolve(now).map_err(AppError::from)? {
        PaymentState::Succeeded => {
            let actor = Actor {
                id: request.player_id,
                name: request.name,
                skill: request.skill,
            };
            // Exactly one registration per successful attempt, paid.
            let game = state.repo.register_player(&id, &actor, true).await?;
            tracing::info!(game_id = %id, player_id = %actor.id, "Payment succeeded, player registered");
            success(game)
        }
        _ => Err(AppError::PaymentFailed(
            "Payment did not complete".to_string(),
        )),
    }
}

/// DELETE /api/games/:id/players/:player_id - Remove a participant.
pub async fn remove_player(
    State(state): State<AppState>,
    Path((id, player_id)): Path<(String, String)>,
) -> ApiResult<Game> {
    let game = state.repo.unregister_player(&id, &player_id).await?;
    success(game)
}

/// Display string mirroring a game's creation fields.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub command: String,
}

/// GET /api/games/:id/command - The `!!creategame` chat command mirror.
pub async fn game_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CommandResponse> {
    match state.repo.get_game(&id).await? {
        Some(game) => success(CommandResponse {
            command: creategame_command(&game),
        }),
        None => Err(AppError::NotFound(format!("Game {} not found", id))),
    }
}

fn validate_actor(request: &JoinGameRequest) -> Result<(), AppError> {
    if request.player_id.trim().is_empty() || request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Player id and name are required".to_string(),
        ));
    }
    Ok(())
}

//! User API endpoints and login.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::auth::verify_password;
use crate::errors::AppError;
use crate::models::{CreateUserRequest, LoginRequest, UpdateUserRequest, User};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.repo.list_users().await?;
    success(users)
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    match state.repo.get_user(&id).await? {
        Some(user) => success(user),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

/// POST /api/users - Create a new user with a server-assigned id.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    if request.username.trim().is_empty()
        || request.password.is_empty()
        || request.name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Username, password and name are required".to_string(),
        ));
    }

    let user = state.repo.create_user(&request).await?;
    tracing::info!(user_id = %user.id, "Created user {}", user.username);
    success(user)
}

/// PUT /api/users/:id - Update a user.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let user = state.repo.update_user(&id, &request).await?;
    success(user)
}

/// POST /api/login - Map credentials to a stable actor identity.
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<User> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let (user, stored_password) = state
        .repo
        .get_user_credentials(&request.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &stored_password) {
        return Err(invalid());
    }

    success(user)
}

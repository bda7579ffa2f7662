//! Database repository for CRUD operations and roster mutations.
//!
//! Every write that can race with another session goes through a
//! conditional `UPDATE ... WHERE id = ? AND version = ?`; a write that
//! affects zero rows means the row changed (or vanished) between fetch and
//! write and surfaces as a conflict rather than a silent lost update.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::roster::{self, RegistrationError};
use crate::errors::AppError;
use crate::models::{
    Actor, CreateGameRequest, CreateUserRequest, Game, GameStatus, Participant, UpdateGameRequest,
    UpdateUserRequest, User, UserRole,
};
use crate::models::sport_label;

const GAME_COLUMNS: &str = "id, name, date, time, sport, location, players, status, is_public, \
     has_fee, fee, notes, joined_players, created_by, created_at, updated_at, version";

const USER_COLUMNS: &str =
    "id, username, name, email, role, skill_level, created_at, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== GAME OPERATIONS ====================

    /// List all games.
    pub async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM games ORDER BY date, time, created_at",
            GAME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(game_from_row).collect())
    }

    /// Get a game by ID.
    pub async fn get_game(&self, id: &str) -> Result<Option<Game>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(game_from_row))
    }

    /// Create a new game with an empty roster and a server-assigned id.
    /// The display name is derived from sport + location.
    pub async fn create_game(&self, request: &CreateGameRequest) -> Result<Game, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let name = format!(
            "{} Game at {}",
            sport_label(&request.sport),
            request.location
        );
        let fee = if request.has_fee { request.fee } else { 0.0 };

        sqlx::query(
            r#"INSERT INTO games (
                id, name, date, time, sport, location, players, status,
                is_public, has_fee, fee, notes, joined_players,
                created_by, created_at, updated_at, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Upcoming', ?, ?, ?, ?, '[]', ?, ?, ?, 1)"#,
        )
        .bind(&id)
        .bind(&name)
        .bind(&request.date)
        .bind(&request.time)
        .bind(&request.sport)
        .bind(&request.location)
        .bind(request.players)
        .bind(request.is_public as i32)
        .bind(request.has_fee as i32)
        .bind(fee)
        .bind(&request.notes)
        .bind(&request.created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Game {
            id,
            name,
            date: request.date.clone(),
            time: request.time.clone(),
            sport: request.sport.clone(),
            location: request.location.clone(),
            players: request.players,
            status: GameStatus::Upcoming,
            is_public: request.is_public,
            has_fee: request.has_fee,
            fee,
            notes: request.notes.clone(),
            joined_players: Vec::new(),
            created_by: request.created_by.clone(),
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update a game with optimistic concurrency control. The stored roster
    /// is preserved verbatim; manager edits never touch `joined_players`.
    pub async fn update_game(
        &self,
        id: &str,
        request: &UpdateGameRequest,
    ) -> Result<Game, AppError> {
        let existing = self
            .get_game(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let date = request.date.as_ref().unwrap_or(&existing.date);
        let time = request.time.as_ref().unwrap_or(&existing.time);
        let sport = request.sport.as_ref().unwrap_or(&existing.sport);
        let location = request.location.as_ref().unwrap_or(&existing.location);
        let players = request.players.unwrap_or(existing.players);
        let status = request.status.unwrap_or(existing.status);
        let is_public = request.is_public.unwrap_or(existing.is_public);
        let has_fee = request.has_fee.unwrap_or(existing.has_fee);
        let fee = if has_fee {
            request.fee.unwrap_or(existing.fee)
        } else {
            0.0
        };
        // The effective state after merging must keep the fee invariant;
        // flagging a fee without an amount (supplied or stored) is invalid.
        if has_fee && fee <= 0.0 {
            return Err(AppError::Validation(
                "Please enter a valid fee amount".to_string(),
            ));
        }
        let notes = request.notes.clone().or(existing.notes.clone());
        let name = format!("{} Game at {}", sport_label(sport), location);

        // Conditional UPDATE with version check to prevent lost updates
        let result = sqlx::query(
            r#"UPDATE games SET
                name = ?, date = ?, time = ?, sport = ?, location = ?,
                players = ?, status = ?, is_public = ?, has_fee = ?, fee = ?,
                notes = ?, updated_at = ?, version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(&name)
        .bind(date)
        .bind(time)
        .bind(sport)
        .bind(location)
        .bind(players)
        .bind(status.as_str())
        .bind(is_public as i32)
        .bind(has_fee as i32)
        .bind(fee)
        .bind(&notes)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Row changed between read and write
            let current = self.get_game(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|g| g.version).unwrap_or(0),
            });
        }

        Ok(Game {
            id: id.to_string(),
            name,
            date: date.clone(),
            time: time.clone(),
            sport: sport.clone(),
            location: location.clone(),
            players,
            status,
            is_public,
            has_fee,
            fee,
            notes,
            joined_players: existing.joined_players,
            created_by: existing.created_by,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }

    /// Register an actor for a game: fetch the authoritative row, run the
    /// roster engine, then write the new roster only if the row is still at
    /// the version we read. An actor who already holds a spot gets the
    /// unchanged game back without a write.
    pub async fn register_player(
        &self,
        game_id: &str,
        actor: &Actor,
        paid: bool,
    ) -> Result<Game, AppError> {
        let existing = self
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

        let joined_date = Utc::now().format("%Y-%m-%d").to_string();
        let updated = match roster::try_register(&existing, actor, &joined_date, paid) {
            Ok(game) => game,
            Err(RegistrationError::AlreadyRegistered) => return Ok(existing),
            Err(err) => return Err(err.into()),
        };

        self.write_roster(updated).await
    }

    /// Remove a participant from a game's roster. Removing an absent id is
    /// a no-op returning the stored game.
    pub async fn unregister_player(
        &self,
        game_id: &str,
        participant_id: &str,
    ) -> Result<Game, AppError> {
        let existing = self
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

        let updated = roster::remove_participant(&existing, participant_id);
        if updated.joined_players.len() == existing.joined_players.len() {
            return Ok(existing);
        }

        self.write_roster(updated).await
    }

    /// Persist a roster change computed by the engine under a version
    /// check. `game` must carry the version of the row it was derived from.
    async fn write_roster(&self, mut game: Game) -> Result<Game, AppError> {
        let now = Utc::now().to_rfc3339();
        let read_version = game.version;
        let roster_json = serde_json::to_string(&game.joined_players)?;

        let result = sqlx::query(
            "UPDATE games SET joined_players = ?, updated_at = ?, version = ? \
             WHERE id = ? AND version = ?",
        )
        .bind(&roster_json)
        .bind(&now)
        .bind(read_version + 1)
        .bind(&game.id)
        .bind(read_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_game(&game.id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent roster modification detected".to_string(),
                current_version: current.map(|g| g.version).unwrap_or(0),
            });
        }

        game.updated_at = now;
        game.version = read_version + 1;
        Ok(game)
    }

    // ==================== USER OPERATIONS ====================

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Look up a user and their stored credential by username.
    pub async fn get_user_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {}, password FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|r| (user_from_row(r), r.get("password"))))
    }

    /// Create a new user with a server-assigned stable id.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO users (
                id, username, password, name, email, role, skill_level,
                created_at, updated_at, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"#,
        )
        .bind(&id)
        .bind(&request.username)
        .bind(&request.password)
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.role.as_str())
        .bind(&request.skill_level)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation(format!("Username {} is taken", request.username))
            }
            _ => AppError::from(err),
        })?;

        Ok(User {
            id,
            username: request.username.clone(),
            name: request.name.clone(),
            email: request.email.clone(),
            role: request.role,
            skill_level: request.skill_level.clone(),
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update a user with optimistic concurrency control.
    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let email = request.email.clone().or(existing.email.clone());
        let skill_level = request.skill_level.clone().or(existing.skill_level.clone());

        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, skill_level = ?, updated_at = ?, version = ? \
             WHERE id = ? AND version = ?",
        )
        .bind(name)
        .bind(&email)
        .bind(&skill_level)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_user(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|u| u.version).unwrap_or(0),
            });
        }

        Ok(User {
            id: id.to_string(),
            username: existing.username,
            name: name.clone(),
            email,
            role: existing.role,
            skill_level,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }
}

// Helper functions for row conversion

fn game_from_row(row: &sqlx::sqlite::SqliteRow) -> Game {
    let is_public: i32 = row.get("is_public");
    let has_fee: i32 = row.get("has_fee");
    let status_str: String = row.get("status");
    let roster_str: String = row.get("joined_players");

    Game {
        id: row.get("id"),
        name: row.get("name"),
        date: row.get("date"),
        time: row.get("time"),
        sport: row.get("sport"),
        location: row.get("location"),
        players: row.get("players"),
        status: GameStatus::from_str(&status_str).unwrap_or(GameStatus::Upcoming),
        is_public: is_public != 0,
        has_fee: has_fee != 0,
        fee: row.get("fee"),
        notes: row.get("notes"),
        joined_players: parse_roster(&roster_str),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let role_str: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        email: row.get("email"),
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::Player),
        skill_level: row.get("skill_level"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn parse_roster(s: &str) -> Vec<Participant> {
    serde_json::from_str(s).unwrap_or_default()
}

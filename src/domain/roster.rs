//! Roster engine: pure registration and removal over a game value.
//!
//! Callers are responsible for fetching the latest persisted game before
//! invoking these functions and for writing the result back; nothing here
//! mutates its input or touches storage.

use crate::models::{Actor, Game, GameStatus, Participant};

/// Skill recorded for actors who never set one.
pub const DEFAULT_SKILL: &str = "Intermediate";

/// Why a registration attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The game is completed and closed to registration.
    GameClosed,
    /// The actor already holds a roster spot. Benign; callers may treat
    /// the existing game as the successful outcome.
    AlreadyRegistered,
    /// The roster is at capacity.
    GameFull,
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::GameClosed => write!(f, "game is closed to registration"),
            RegistrationError::AlreadyRegistered => write!(f, "player is already registered"),
            RegistrationError::GameFull => write!(f, "game is full"),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Attempt to register `actor` for `game`, returning the updated game.
///
/// Preconditions are checked in order, short-circuiting on the first
/// failure: closed game, duplicate registration, full roster. On success
/// the participant is appended with `hasPaid` set for free games and
/// cleared for fee games; the payment path flips it via `paid`.
pub fn try_register(
    game: &Game,
    actor: &Actor,
    joined_date: &str,
    paid: bool,
) -> Result<Game, RegistrationError> {
    if game.status == GameStatus::Completed {
        return Err(RegistrationError::GameClosed);
    }
    if game.has_participant(&actor.id) {
        return Err(RegistrationError::AlreadyRegistered);
    }
    if game.is_full() {
        return Err(RegistrationError::GameFull);
    }

    let participant = Participant {
        id: actor.id.clone(),
        name: actor.name.clone(),
        joined_date: joined_date.to_string(),
        has_paid: !game.has_fee || paid,
        skill: Some(
            actor
                .skill
                .clone()
                .unwrap_or_else(|| DEFAULT_SKILL.to_string()),
        ),
    };

    let mut updated = game.clone();
    updated.joined_players.push(participant);
    Ok(updated)
}

/// Remove a participant from the roster. Removing an absent id is a no-op
/// returning an equal-valued game; no capacity check applies.
pub fn remove_participant(game: &Game, participant_id: &str) -> Game {
    let mut updated = game.clone();
    updated.joined_players.retain(|p| p.id != participant_id);
    updated
}

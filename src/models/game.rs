//! Game model matching the legacy `games` collection schema.
//!
//! Field names are the wire contract: the snake_case column names
//! (`has_fee`, `is_public`, `joined_players`, `players`) and the camelCase
//! participant members (`joinedDate`, `hasPaid`, `skill`) must stay exactly
//! as existing rows carry them.

use serde::{Deserialize, Serialize};

/// Sports with a canonical display label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sport {
    Soccer,
    Basketball,
    Football,
    Volleyball,
    Tennis,
}

impl Sport {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "soccer" => Some(Sport::Soccer),
            "basketball" => Some(Sport::Basketball),
            "football" => Some(Sport::Football),
            "volleyball" => Some(Sport::Volleyball),
            "tennis" => Some(Sport::Tennis),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sport::Soccer => "Soccer",
            Sport::Basketball => "Basketball",
            Sport::Football => "Football",
            Sport::Volleyball => "Volleyball",
            Sport::Tennis => "Tennis",
        }
    }
}

/// Display label for a sport string, falling back to capitalizing free text.
pub fn sport_label(sport: &str) -> String {
    match Sport::from_str(sport) {
        Some(s) => s.label().to_string(),
        None => {
            let mut chars = sport.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// Game lifecycle status. Completed games reject registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    Upcoming,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Upcoming => "Upcoming",
            GameStatus::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Upcoming" => Some(GameStatus::Upcoming),
            "Completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// A registered player embedded in a game's roster.
///
/// Serialized member names match the legacy entries stored in
/// `joined_players`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(rename = "joinedDate")]
    pub joined_date: String,
    #[serde(rename = "hasPaid")]
    pub has_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

/// A schedulable pickup game with capacity, fee, and roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub sport: String,
    pub location: String,
    /// Maximum participants (legacy column name).
    pub players: i64,
    pub status: GameStatus,
    pub is_public: bool,
    pub has_fee: bool,
    pub fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub joined_players: Vec<Participant>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

impl Game {
    /// Whether the roster already holds the given participant id.
    pub fn has_participant(&self, id: &str) -> bool {
        self.joined_players.iter().any(|p| p.id == id)
    }

    /// Whether the roster has reached capacity.
    pub fn is_full(&self) -> bool {
        self.joined_players.len() as i64 >= self.players
    }
}

/// The actor joining a game, as supplied by the identity layer.
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skill: Option<String>,
}

/// Request body for creating a new game. The roster starts empty and the
/// name is derived from sport + location.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    pub date: String,
    pub time: String,
    #[serde(default = "default_sport")]
    pub sport: String,
    pub location: String,
    pub players: i64,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub has_fee: bool,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
}

fn default_sport() -> String {
    "soccer".to_string()
}

fn default_public() -> bool {
    true
}

/// Request body for manager edits. There is deliberately no roster field:
/// edits preserve `joined_players` verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub players: Option<i64>,
    #[serde(default)]
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub has_fee: Option<bool>,
    #[serde(default)]
    pub fee: Option<f64>,
    /// Replacement notes. Omitting this field keeps the stored notes;
    /// clearing notes once set is not supported.
    #[serde(default)]
    pub notes: Option<String>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for joining a game.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinGameRequest {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub skill: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_label_known_and_free_text() {
        assert_eq!(sport_label("soccer"), "Soccer");
        assert_eq!(sport_label("tennis"), "Tennis");
        assert_eq!(sport_label("pickleball"), "Pickleball");
        assert_eq!(sport_label(""), "");
    }

    #[test]
    fn participant_wire_names_are_legacy_camel_case() {
        let p = Participant {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            joined_date: "2025-06-01".to_string(),
            has_paid: true,
            skill: Some("Intermediate".to_string()),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["joinedDate"], "2025-06-01");
        assert_eq!(json["hasPaid"], true);
        assert_eq!(json["skill"], "Intermediate");
    }

    #[test]
    fn status_round_trip() {
        assert_eq!(GameStatus::from_str("Upcoming"), Some(GameStatus::Upcoming));
        assert_eq!(
            GameStatus::from_str("Completed"),
            Some(GameStatus::Completed)
        );
        assert_eq!(GameStatus::from_str("cancelled"), None);
        assert_eq!(GameStatus::Completed.as_str(), "Completed");
    }
}

//! Derived `!!creategame` command string.
//!
//! A one-way, display-only mirror of a game's creation fields for pasting
//! into an external chat interface. No parser exists for it.

use crate::models::Game;

pub fn creategame_command(game: &Game) -> String {
    let fee = if game.has_fee {
        format!("${:.2}", game.fee)
    } else {
        "free".to_string()
    };
    let visibility = if game.is_public { "public" } else { "private" };

    format!(
        "!!creategame {} {} {} {} {} {}",
        game.date, game.time, game.players, game.location, fee, visibility
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameStatus;

    fn game() -> Game {
        Game {
            id: "g1".to_string(),
            name: "Soccer Game at Mission Field, SF".to_string(),
            date: "2025-05-25".to_string(),
            time: "10:00 AM".to_string(),
            sport: "soccer".to_string(),
            location: "Mission Field, SF".to_string(),
            players: 10,
            status: GameStatus::Upcoming,
            is_public: true,
            has_fee: false,
            fee: 0.0,
            notes: None,
            joined_players: Vec::new(),
            created_by: "manager@example.com".to_string(),
            created_at: "2025-05-25T00:00:00Z".to_string(),
            updated_at: "2025-05-25T00:00:00Z".to_string(),
            version: 1,
        }
    }

    #[test]
    fn free_public_game() {
        assert_eq!(
            creategame_command(&game()),
            "!!creategame 2025-05-25 10:00 AM 10 Mission Field, SF free public"
        );
    }

    #[test]
    fn fee_private_game() {
        let mut g = game();
        g.has_fee = true;
        g.fee = 7.5;
        g.is_public = false;
        assert_eq!(
            creategame_command(&g),
            "!!creategame 2025-05-25 10:00 AM 10 Mission Field, SF $7.50 private"
        );
    }
}

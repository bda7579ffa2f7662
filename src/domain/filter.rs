//! Filter/search engine and aggregate statistics.
//!
//! Pure, order-preserving predicate composition over a games slice. Every
//! listing surface uses some subset of these filters; this module is the
//! single consolidated version.

use serde::Deserialize;

use crate::models::{Game, GameStatus};

/// Tri-state fee filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeFilter {
    #[default]
    #[serde(alias = "all")]
    Any,
    #[serde(alias = "free")]
    FreeOnly,
    #[serde(alias = "paid")]
    PaidOnly,
}

impl FeeFilter {
    fn matches(&self, game: &Game) -> bool {
        match self {
            FeeFilter::Any => true,
            FeeFilter::FreeOnly => !game.has_fee,
            FeeFilter::PaidOnly => game.has_fee,
        }
    }
}

/// Search criteria, AND-composed; an absent criterion matches everything.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Case-insensitive substring over name, location, and date.
    pub text: Option<String>,
    /// Exact location match, case-insensitive.
    pub location: Option<String>,
    /// Exact date match.
    pub date: Option<String>,
    /// Exact capacity match.
    pub player_count: Option<i64>,
    /// Free/paid/any.
    pub fee: FeeFilter,
}

impl SearchCriteria {
    fn matches(&self, game: &Game) -> bool {
        if let Some(text) = &self.text {
            if !text.is_empty() {
                let query = text.to_lowercase();
                let hit = game.name.to_lowercase().contains(&query)
                    || game.location.to_lowercase().contains(&query)
                    || game.date.to_lowercase().contains(&query);
                if !hit {
                    return false;
                }
            }
        }
        if let Some(location) = &self.location {
            if !game.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }
        if let Some(date) = &self.date {
            if &game.date != date {
                return false;
            }
        }
        if let Some(count) = self.player_count {
            if game.players != count {
                return false;
            }
        }
        self.fee.matches(game)
    }
}

/// Filter games by criteria, preserving input order.
pub fn search(games: &[Game], criteria: &SearchCriteria) -> Vec<Game> {
    games
        .iter()
        .filter(|g| criteria.matches(g))
        .cloned()
        .collect()
}

/// Games the actor can still register for: not yet joined, not completed.
pub fn available_to(games: &[Game], actor_id: &str) -> Vec<Game> {
    games
        .iter()
        .filter(|g| g.status != GameStatus::Completed && !g.has_participant(actor_id))
        .cloned()
        .collect()
}

/// The public browse surface: only public games.
pub fn public_games(games: &[Game]) -> Vec<Game> {
    games.iter().filter(|g| g.is_public).cloned().collect()
}

/// Aggregate statistics, recomputed on demand and never stored.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GameStats {
    pub total_games: usize,
    pub upcoming_games: usize,
    pub total_players: usize,
    /// Fees actually collected: paid participants times fee.
    pub total_collected: f64,
    /// Fees nominally owed: roster size times fee for fee games.
    pub total_owed: f64,
}

pub fn stats(games: &[Game]) -> GameStats {
    let total_games = games.len();
    let upcoming_games = games
        .iter()
        .filter(|g| g.status == GameStatus::Upcoming)
        .count();
    let total_players = games.iter().map(|g| g.joined_players.len()).sum();

    let mut total_collected = 0.0;
    let mut total_owed = 0.0;
    for game in games {
        if !game.has_fee {
            continue;
        }
        let paid = game.joined_players.iter().filter(|p| p.has_paid).count();
        total_collected += paid as f64 * game.fee;
        total_owed += game.joined_players.len() as f64 * game.fee;
    }

    GameStats {
        total_games,
        upcoming_games,
        total_players,
        total_collected,
        total_owed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;

    fn game(id: &str, location: &str, date: &str, has_fee: bool) -> Game {
        Game {
            id: id.to_string(),
            name: format!("Soccer Game at {}", location),
            date: date.to_string(),
            time: "10:00 AM".to_string(),
            sport: "soccer".to_string(),
            location: location.to_string(),
            players: 10,
            status: GameStatus::Upcoming,
            is_public: true,
            has_fee,
            fee: if has_fee { 10.0 } else { 0.0 },
            notes: None,
            joined_players: Vec::new(),
            created_by: "manager@example.com".to_string(),
            created_at: "2025-05-25T00:00:00Z".to_string(),
            updated_at: "2025-05-25T00:00:00Z".to_string(),
            version: 1,
        }
    }

    fn participant(id: &str, has_paid: bool) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_string(),
            joined_date: "2025-05-26".to_string(),
            has_paid,
            skill: None,
        }
    }

    fn sample() -> Vec<Game> {
        vec![
            game("g1", "Park A", "2025-06-01", false),
            game("g2", "Park B", "2025-06-02", true),
            game("g3", "Park A", "2025-06-03", true),
        ]
    }

    #[test]
    fn empty_criteria_returns_all_in_order() {
        let games = sample();
        let results = search(&games, &SearchCriteria::default());
        assert_eq!(results.len(), 3);
        let ids: Vec<&str> = results.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3"]);
    }

    #[test]
    fn free_only_returns_exactly_free_games() {
        let games = sample();
        let criteria = SearchCriteria {
            fee: FeeFilter::FreeOnly,
            ..Default::default()
        };
        let results = search(&games, &criteria);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g1");
        assert!(results.iter().all(|g| !g.has_fee));
    }

    #[test]
    fn paid_only_returns_exactly_fee_games() {
        let games = sample();
        let criteria = SearchCriteria {
            fee: FeeFilter::PaidOnly,
            ..Default::default()
        };
        let ids: Vec<String> = search(&games, &criteria).into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["g2", "g3"]);
    }

    #[test]
    fn location_filter_is_exact_case_insensitive() {
        // Scenario C: {location: "Park A"} over a two-game list.
        let games = vec![
            game("g1", "Park A", "2025-06-01", false),
            game("g2", "Park B", "2025-06-02", true),
        ];
        let criteria = SearchCriteria {
            location: Some("park a".to_string()),
            ..Default::default()
        };
        let results = search(&games, &criteria);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g1");
    }

    #[test]
    fn text_matches_any_of_name_location_date() {
        let games = sample();

        let by_name = SearchCriteria {
            text: Some("SOCCER".to_string()),
            ..Default::default()
        };
        assert_eq!(search(&games, &by_name).len(), 3);

        let by_date = SearchCriteria {
            text: Some("06-02".to_string()),
            ..Default::default()
        };
        let results = search(&games, &by_date);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g2");

        let miss = SearchCriteria {
            text: Some("hockey".to_string()),
            ..Default::default()
        };
        assert!(search(&games, &miss).is_empty());
    }

    #[test]
    fn criteria_compose_with_and() {
        let games = sample();
        let criteria = SearchCriteria {
            location: Some("Park A".to_string()),
            fee: FeeFilter::PaidOnly,
            ..Default::default()
        };
        let results = search(&games, &criteria);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g3");
    }

    #[test]
    fn player_count_filter_is_exact() {
        let mut games = sample();
        games[1].players = 6;
        let criteria = SearchCriteria {
            player_count: Some(6),
            ..Default::default()
        };
        let results = search(&games, &criteria);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g2");
    }

    #[test]
    fn available_excludes_joined_and_completed() {
        let mut games = sample();
        games[0].joined_players.push(participant("alice", true));
        games[2].status = GameStatus::Completed;

        let results = available_to(&games, "alice");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "g2");
    }

    #[test]
    fn public_browse_hides_private_games() {
        let mut games = sample();
        games[1].is_public = false;
        let ids: Vec<String> = public_games(&games).into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["g1", "g3"]);
    }

    #[test]
    fn stats_aggregate_collected_and_owed() {
        let mut games = sample();
        // g2: $10 fee, one paid and one unpaid participant.
        games[1].joined_players.push(participant("alice", true));
        games[1].joined_players.push(participant("bob", false));
        // g3: $10 fee, completed, one paid participant.
        games[2].status = GameStatus::Completed;
        games[2].joined_players.push(participant("carol", true));
        // g1 is free; its participant contributes no money.
        games[0].joined_players.push(participant("dave", true));

        let s = stats(&games);
        assert_eq!(s.total_games, 3);
        assert_eq!(s.upcoming_games, 2);
        assert_eq!(s.total_players, 4);
        assert_eq!(s.total_collected, 20.0);
        assert_eq!(s.total_owed, 30.0);
    }
}

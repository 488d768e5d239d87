use crate::entities::game_teams::GameTeam;
use crate::entities::games::Game;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Provider match id recorded for staff-entered results.
pub const MANUAL_MATCH_ID: &str = "manual";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchResult {
    pub match_result_id: i64,
    pub game_id: i64,
    pub provider_match_id: String,
    pub map_name: String,
    pub rounds_played: i32,
    pub winner_team_id: i64,
    pub loser_team_id: i64,
    pub winner_score: i32,
    pub loser_score: i32,
    pub match_started_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn is_manual(&self) -> bool {
        self.provider_match_id == MANUAL_MATCH_ID
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchPlayerStat {
    pub match_player_stat_id: i64,
    pub match_result_id: i64,
    pub user_id: i64,
    pub team_id: i64,
    pub agent: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub score: i32,
    pub headshots: i32,
    pub bodyshots: i32,
    pub legshots: i32,
}

/// Every row a decided game touches. Written together or not at all.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub result: MatchResult,
    pub stats: Vec<MatchPlayerStat>,
    /// Both participants with their grade set.
    pub graded: Vec<GameTeam>,
    pub game: Game,
    /// Winner's seat in the next bracket game, if it is not seated yet.
    pub advanced: Option<GameTeam>,
}

use crate::entities::match_results::{MatchPlayerStat, MatchResult};
use crate::models::brackets::round_name;
use crate::models::game_teams::Grade;
use crate::models::games::{Game, GameStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GameTeamSummary {
    pub team_id: i64,
    pub name: Option<String>,
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerLine {
    pub user_id: i64,
    pub team_id: i64,
    pub agent: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub score: i32,
}

impl From<MatchPlayerStat> for PlayerLine {
    fn from(value: MatchPlayerStat) -> Self {
        Self {
            user_id: value.user_id,
            team_id: value.team_id,
            agent: value.agent,
            kills: value.kills,
            deaths: value.deaths,
            assists: value.assists,
            score: value.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResultSummary {
    pub provider_match_id: String,
    pub map_name: String,
    pub winner_team_id: i64,
    pub loser_team_id: i64,
    pub winner_score: i32,
    pub loser_score: i32,
    pub manual: bool,
    /// Empty for manual results.
    pub players: Vec<PlayerLine>,
}

impl MatchResultSummary {
    pub fn new(result: MatchResult, stats: Vec<MatchPlayerStat>) -> Self {
        Self {
            manual: result.is_manual(),
            provider_match_id: result.provider_match_id,
            map_name: result.map_name,
            winner_team_id: result.winner_team_id,
            loser_team_id: result.loser_team_id,
            winner_score: result.winner_score,
            loser_score: result.loser_score,
            players: stats.into_iter().map(PlayerLine::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: i64,
    pub match_number: i32,
    pub bracket_position: i32,
    pub status: GameStatus,
    pub next_game_id: Option<i64>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub teams: Vec<GameTeamSummary>,
    pub result: Option<MatchResultSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    pub round: i32,
    pub name: String,
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentResult {
    pub contest_id: i64,
    pub total_rounds: i32,
    pub rounds: Vec<RoundResult>,
    pub champion_team_id: Option<i64>,
}

impl TournamentResult {
    /// Groups bracket games by round, ordered by match number within a round.
    /// `games` must carry bracket coordinates; ad-hoc games are ignored.
    pub fn assemble(contest_id: i64, games: Vec<(Game, GameSummary)>) -> Self {
        let total_rounds = games
            .iter()
            .filter_map(|(game, _)| game.round())
            .max()
            .unwrap_or(0);

        let mut rounds: Vec<RoundResult> = (1..=total_rounds)
            .map(|round| RoundResult {
                round,
                name: round_name(round, total_rounds),
                games: vec![],
            })
            .collect();
        for (game, summary) in games {
            let slot = game
                .round()
                .and_then(|round| usize::try_from(round - 1).ok())
                .and_then(|index| rounds.get_mut(index));
            if let Some(slot) = slot {
                slot.games.push(summary);
            }
        }
        for round in &mut rounds {
            round.games.sort_by_key(|game| game.match_number);
        }

        let champion_team_id = match rounds.last().map(|round| round.games.as_slice()) {
            Some([final_game]) if final_game.status == GameStatus::Finished => final_game
                .result
                .as_ref()
                .map(|result| result.winner_team_id),
            _ => None,
        };

        Self {
            contest_id,
            total_rounds,
            rounds,
            champion_team_id,
        }
    }
}

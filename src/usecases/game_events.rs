use crate::common::context::Context;
use crate::entities::game_events::{GameEvent, GameEventType, MatchDetectedEvent};
use crate::entities::match_results::MatchResult;
use crate::models::games::Game;
use chrono::Utc;

pub fn publish<C: Context>(ctx: &C, game: &Game, event_type: GameEventType) {
    ctx.events().publish_game_event(GameEvent {
        event_type: event_type.as_str(),
        game_id: game.game_id,
        contest_id: game.contest_id,
        status: game.status.as_str(),
        detection_status: game.detection_status.as_str(),
        timestamp: Utc::now(),
    });
}

pub fn publish_match_detected<C: Context>(ctx: &C, game: &Game, result: &MatchResult) {
    ctx.events().publish_match_detected(MatchDetectedEvent {
        game_id: game.game_id,
        contest_id: game.contest_id,
        provider_match_id: result.provider_match_id.clone(),
        winner_team_id: result.winner_team_id,
        loser_team_id: result.loser_team_id,
        winner_score: result.winner_score,
        loser_score: result.loser_score,
        map_name: result.map_name.clone(),
        manual: result.is_manual(),
        timestamp: Utc::now(),
    });
}

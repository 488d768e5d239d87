use crate::adapters::match_history::MatchDetail;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::game_events::GameEventType;
use crate::entities::match_results::{
    GameOutcome, MANUAL_MATCH_ID, MatchPlayerStat, MatchResult,
};
use crate::models::game_teams::{GameTeam, Grade, split_winner};
use crate::models::games::{DetectionStatus, Game, GameStatus};
use crate::models::match_detection::{
    AccountHandle, ResolvedOutcome, Roster, RosterMember, affiliated_players, resolve_outcome,
    rosters_present, within_window,
};
use crate::usecases::{game_events, game_teams, games};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    Detected { provider_match_id: String },
    /// Nothing validated yet; the game stays DETECTING.
    NoMatchFound,
    /// The window closed and the game is now FAILED.
    WindowExpired,
    ProviderUnavailable,
    /// A side has no linked accounts to look up.
    RosterUnresolved,
}

/// A staff-entered result.
#[derive(Debug, Clone)]
pub struct ManualResult {
    pub winner_team_id: i64,
    pub winner_score: i32,
    pub loser_score: i32,
    pub map_name: Option<String>,
    pub rounds_played: Option<i32>,
}

pub async fn detect_game<C: Context>(ctx: &C, game_id: i64) -> ServiceResult<DetectionOutcome> {
    detect_game_at(ctx, game_id, Utc::now()).await
}

pub async fn detect_game_at<C: Context>(
    ctx: &C,
    game_id: i64,
    now: DateTime<Utc>,
) -> ServiceResult<DetectionOutcome> {
    let mut game = games::fetch_one(ctx, game_id).await?;
    if game.detection_status != DetectionStatus::Detecting {
        return Err(AppError::DetectionNotDetecting);
    }
    let (Some(window_start), Some(window_end)) =
        (game.scheduled_start_time, game.detection_window_end())
    else {
        return Err(AppError::GamesNotScheduled);
    };

    if game.is_detection_window_expired(now) {
        game.mark_detection_failed()?;
        games::update(ctx, &game).await?;
        warn!(game_id, window_end = %window_end, "Detection window expired");
        game_events::publish(ctx, &game, GameEventType::Failed);
        return Ok(DetectionOutcome::WindowExpired);
    }

    let participants = game_teams::fetch_by_game(ctx, game_id).await?;
    let [team_a, team_b] = participants.as_slice() else {
        return Err(AppError::GamesTeamCountMismatch);
    };
    let roster_a = fetch_roster(ctx, team_a.team_id).await?;
    let roster_b = fetch_roster(ctx, team_b.team_id).await?;
    let Some(reference) = roster_a.reference() else {
        warn!(game_id, team_id = team_a.team_id, "No linked accounts on team");
        return Ok(DetectionOutcome::RosterUnresolved);
    };
    if roster_b.members.is_empty() {
        warn!(game_id, team_id = team_b.team_id, "No linked accounts on team");
        return Ok(DetectionOutcome::RosterUnresolved);
    }

    let recent = match ctx
        .match_history()
        .fetch_recent_matches(ctx.region(), &reference.handle.name, &reference.handle.tag)
        .await
    {
        Ok(recent) => recent,
        Err(e) if e.is_transient() => {
            warn!(game_id, handle = %reference.handle, "Recent matches unavailable: {e}");
            return Ok(DetectionOutcome::ProviderUnavailable);
        }
        Err(e) => return Err(e),
    };

    for candidate in within_window(recent, window_start, window_end) {
        let detail = match ctx
            .match_history()
            .fetch_match_detail(&candidate.match_id)
            .await
        {
            Ok(detail) => detail,
            Err(e) if e.is_transient() => {
                warn!(game_id, match_id = %candidate.match_id, "Match detail unavailable: {e}");
                return Ok(DetectionOutcome::ProviderUnavailable);
            }
            Err(e) => {
                warn!(game_id, match_id = %candidate.match_id, "Skipping candidate: {e}");
                continue;
            }
        };
        if !rosters_present(&detail, &[&roster_a, &roster_b]) {
            debug!(game_id, match_id = %detail.match_id, "Candidate is missing roster players");
            continue;
        }

        let outcome = resolve_outcome(&detail, &reference.handle, team_a.team_id, team_b.team_id)?;
        let provider_match_id = detail.match_id.clone();
        let rosters = [&roster_a, &roster_b];
        record_detected_result(ctx, game, &participants, rosters, detail, outcome).await?;
        return Ok(DetectionOutcome::Detected { provider_match_id });
    }

    debug!(game_id, "No matching provider match yet");
    Ok(DetectionOutcome::NoMatchFound)
}

/// Team members with a linked account. Members without one are skipped.
async fn fetch_roster<C: Context>(ctx: &C, team_id: i64) -> ServiceResult<Roster> {
    let members = match ctx.teams().fetch_members(team_id).await {
        Ok(members) => members,
        Err(e) => return unexpected(e),
    };
    let mut roster = Roster {
        team_id,
        members: Vec::with_capacity(members.len()),
    };
    for member in members {
        match ctx.accounts().fetch_linked(member.user_id).await? {
            Some(account) => roster.members.push(RosterMember {
                user_id: member.user_id,
                team_id,
                handle: AccountHandle::from(account),
            }),
            None => warn!(team_id, user_id = member.user_id, "Member has no linked account"),
        }
    }
    Ok(roster)
}

async fn ensure_no_result<C: Context>(ctx: &C, game_id: i64) -> ServiceResult<()> {
    match ctx.match_results().fetch_by_game(game_id).await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err(AppError::DetectionResultAlreadyRecorded),
        Err(e) => unexpected(e),
    }
}

async fn record_detected_result<C: Context>(
    ctx: &C,
    mut game: Game,
    participants: &[GameTeam],
    rosters: [&Roster; 2],
    detail: MatchDetail,
    outcome: ResolvedOutcome,
) -> ServiceResult<()> {
    let (winner, loser) = split_winner(participants, outcome.winner_team_id)?;
    ensure_no_result(ctx, game.game_id).await?;

    let now = Utc::now();
    let ended_at = detail.started_at + TimeDelta::seconds(detail.duration_seconds);
    game.mark_detected(detail.match_id.clone())?;
    game.finish(now)?;
    if let Err(e) = game.record_actual_times(detail.started_at, ended_at) {
        warn!(game_id = game.game_id, match_id = %detail.match_id, "Keeping local times: {e}");
    }

    let stats = affiliated_players(&detail, &rosters)
        .into_iter()
        .map(|(member, player)| MatchPlayerStat {
            match_player_stat_id: 0,
            match_result_id: 0,
            user_id: member.user_id,
            team_id: member.team_id,
            agent: player.agent.clone(),
            kills: player.kills,
            deaths: player.deaths,
            assists: player.assists,
            score: player.score,
            headshots: player.headshots,
            bodyshots: player.bodyshots,
            legshots: player.legshots,
        })
        .collect();
    let result = MatchResult {
        match_result_id: 0,
        game_id: game.game_id,
        provider_match_id: detail.match_id,
        map_name: detail.map_name,
        rounds_played: detail.rounds_played,
        winner_team_id: outcome.winner_team_id,
        loser_team_id: outcome.loser_team_id,
        winner_score: outcome.winner_score,
        loser_score: outcome.loser_score,
        match_started_at: detail.started_at,
        duration_seconds: detail.duration_seconds,
        created_at: now,
    };

    let result = persist_outcome(ctx, &game, result, stats, winner, loser).await?;

    info!(
        game_id = game.game_id,
        match_id = %result.provider_match_id,
        winner_team_id = result.winner_team_id,
        winner_score = result.winner_score,
        loser_score = result.loser_score,
        "Match detected"
    );
    game_events::publish(ctx, &game, GameEventType::Detected);
    game_events::publish_match_detected(ctx, &game, &result);
    game_events::publish(ctx, &game, GameEventType::Finished);
    Ok(())
}

/// Writes the decided game in one transaction so a failure leaves nothing behind and
/// the next attempt starts clean.
async fn persist_outcome<C: Context>(
    ctx: &C,
    game: &Game,
    result: MatchResult,
    stats: Vec<MatchPlayerStat>,
    winner: &GameTeam,
    loser: &GameTeam,
) -> ServiceResult<MatchResult> {
    let advanced = match game.next_game_id {
        Some(next_game_id) => {
            game_teams::plan_advancement(ctx, next_game_id, winner.team_id).await?
        }
        None => None,
    };
    let outcome = GameOutcome {
        result,
        stats,
        graded: vec![
            winner.with_grade(Grade::Winner).as_entity(),
            loser.with_grade(Grade::Loser).as_entity(),
        ],
        game: game.as_entity(),
        advanced: advanced.as_ref().map(GameTeam::as_entity),
    };
    let result = match ctx.match_results().record_outcome(outcome).await {
        Ok(result) => result,
        Err(e) => return unexpected(e),
    };
    if let Some(seat) = advanced {
        info!(
            next_game_id = seat.game_id,
            team_id = seat.team_id,
            "Winner advanced to next game"
        );
    }
    Ok(result)
}

/// Records a result entered by staff, bypassing the provider.
pub async fn submit_manual_result<C: Context>(
    ctx: &C,
    game_id: i64,
    args: ManualResult,
) -> ServiceResult<MatchResult> {
    if args.winner_score < 0 || args.loser_score < 0 || args.winner_score < args.loser_score {
        return Err(AppError::MatchResultsInvalidScore);
    }

    let mut game = games::fetch_one(ctx, game_id).await?;
    if !game.detection_status.accepts_manual_result() {
        return Err(AppError::DetectionManualResultNotAllowed);
    }
    if game.status.is_terminal() {
        return Err(AppError::GamesInvalidStatusTransition(
            game.status,
            GameStatus::Finished,
        ));
    }

    let participants = game_teams::fetch_by_game(ctx, game_id).await?;
    let (winner, loser) = split_winner(&participants, args.winner_team_id)?;
    ensure_no_result(ctx, game_id).await?;

    let now = Utc::now();
    if game.force_manual_result() {
        warn!(game_id, "Forced manual result past the detection state machine");
    }
    match game.status {
        GameStatus::Pending => game.finish_without_activation(now)?,
        _ => game.finish(now)?,
    }
    let match_started_at = game.started_at.unwrap_or(now);

    let result = MatchResult {
        match_result_id: 0,
        game_id,
        provider_match_id: MANUAL_MATCH_ID.to_owned(),
        map_name: args.map_name.unwrap_or_default(),
        rounds_played: args
            .rounds_played
            .unwrap_or(args.winner_score + args.loser_score),
        winner_team_id: winner.team_id,
        loser_team_id: loser.team_id,
        winner_score: args.winner_score,
        loser_score: args.loser_score,
        match_started_at,
        duration_seconds: (now - match_started_at).num_seconds().max(0),
        created_at: now,
    };
    let result = persist_outcome(ctx, &game, result, vec![], winner, loser).await?;

    info!(game_id, winner_team_id = winner.team_id, "Manual result recorded");
    game_events::publish(ctx, &game, GameEventType::ManualResult);
    game_events::publish_match_detected(ctx, &game, &result);
    game_events::publish(ctx, &game, GameEventType::Finished);
    Ok(result)
}

/// Puts a FAILED game back into detection with a fresh window starting now.
pub async fn restart_detection<C: Context>(
    ctx: &C,
    game_id: i64,
    window_minutes: i32,
) -> ServiceResult<Game> {
    let mut game = games::fetch_one(ctx, game_id).await?;
    game.restart_detection(window_minutes, Utc::now())?;
    games::update(ctx, &game).await?;
    info!(
        game_id,
        window_minutes = game.detection_window_minutes,
        "Detection restarted"
    );
    game_events::publish(ctx, &game, GameEventType::Detecting);
    Ok(game)
}

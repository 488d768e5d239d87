use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::game_events::GameEventType;
use crate::models::games::{DetectionStatus, Game, GameStatus, GameTeamType};
use crate::usecases::{game_events, game_teams};
use chrono::{DateTime, Utc};
use tracing::info;

pub async fn create<C: Context>(
    ctx: &C,
    contest_id: i64,
    team_type: GameTeamType,
) -> ServiceResult<Game> {
    if ctx.contests().fetch_one(contest_id).await?.is_none() {
        return Err(AppError::ContestsNotFound);
    }
    let game = Game::new(contest_id, team_type, Utc::now());
    match ctx.games().create(game.as_entity()).await {
        Ok(game) => Game::try_from(game),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_one<C: Context>(ctx: &C, game_id: i64) -> ServiceResult<Game> {
    match ctx.games().fetch_one(game_id).await {
        Ok(Some(game)) => Game::try_from(game),
        Ok(None) => Err(AppError::GamesNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_by_contest<C: Context>(ctx: &C, contest_id: i64) -> ServiceResult<Vec<Game>> {
    match ctx.games().fetch_by_contest(contest_id).await {
        Ok(games) => games.into_iter().map(Game::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_by_contest_and_round<C: Context>(
    ctx: &C,
    contest_id: i64,
    round: i32,
) -> ServiceResult<Vec<Game>> {
    match ctx.games().fetch_by_contest_and_round(contest_id, round).await {
        Ok(games) => games.into_iter().map(Game::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_ready_to_activate<C: Context>(
    ctx: &C,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<Game>> {
    match ctx.games().fetch_ready_to_activate(now).await {
        Ok(games) => games.into_iter().map(Game::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_by_detection_status<C: Context>(
    ctx: &C,
    detection_status: DetectionStatus,
) -> ServiceResult<Vec<Game>> {
    match ctx
        .games()
        .fetch_by_detection_status(detection_status.as_str())
        .await
    {
        Ok(games) => games.into_iter().map(Game::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn update<C: Context>(ctx: &C, game: &Game) -> ServiceResult<()> {
    match ctx.games().update(&game.as_entity()).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Sets the start time staff agreed on, and the detection window that follows it.
pub async fn schedule<C: Context>(
    ctx: &C,
    game_id: i64,
    scheduled_start_time: DateTime<Utc>,
    window_minutes: i32,
) -> ServiceResult<Game> {
    let mut game = fetch_one(ctx, game_id).await?;
    game.set_schedule(scheduled_start_time, window_minutes, Utc::now())?;
    update(ctx, &game).await?;
    info!(
        game_id,
        scheduled_start_time = %scheduled_start_time,
        window_minutes = game.detection_window_minutes,
        "Game scheduled"
    );
    game_events::publish(ctx, &game, GameEventType::Scheduled);
    Ok(game)
}

/// Cancels a pending game on behalf of the leader of one of its teams.
pub async fn cancel<C: Context>(ctx: &C, game_id: i64, user_id: i64) -> ServiceResult<Game> {
    let mut game = fetch_one(ctx, game_id).await?;
    if game.status != GameStatus::Pending {
        return Err(AppError::GamesNotPending);
    }

    let mut is_leader = false;
    for game_team in game_teams::fetch_by_game(ctx, game_id).await? {
        let leader = ctx.teams().fetch_leader(game_team.team_id).await?;
        if leader.is_some_and(|leader| leader.user_id == user_id) {
            is_leader = true;
            break;
        }
    }
    if !is_leader {
        return Err(AppError::GamesCancelForbidden);
    }

    game.transition_status(GameStatus::Cancelled)?;
    update(ctx, &game).await?;
    info!(game_id, user_id, "Game cancelled");
    game_events::publish(ctx, &game, GameEventType::Cancelled);
    Ok(game)
}

/// Removes a pending ad-hoc game and its participants.
pub async fn delete<C: Context>(ctx: &C, game_id: i64) -> ServiceResult<()> {
    let game = fetch_one(ctx, game_id).await?;
    if game.is_bracket_game() {
        return Err(AppError::GamesBracketGame);
    }
    if game.status != GameStatus::Pending {
        return Err(AppError::GamesNotPending);
    }
    ctx.game_teams().delete_by_game(game_id).await?;
    if !ctx.games().delete(game_id).await? {
        return Err(AppError::GamesNotFound);
    }
    info!(game_id, "Game deleted");
    Ok(())
}

/// Moves a due game into ACTIVE / DETECTING.
pub async fn activate<C: Context>(
    ctx: &C,
    mut game: Game,
    now: DateTime<Utc>,
) -> ServiceResult<Game> {
    game.activate_for_detection(now)?;
    update(ctx, &game).await?;
    info!(game_id = game.game_id, "Game activated for detection");
    game_events::publish(ctx, &game, GameEventType::Activated);
    game_events::publish(ctx, &game, GameEventType::Detecting);
    Ok(game)
}

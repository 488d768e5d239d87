use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::game_teams::{GameTeam, Grade};
use crate::models::games::GameStatus;
use crate::usecases::games;
use chrono::Utc;
use hashbrown::HashSet;
use tracing::{info, warn};

/// Teams per game.
const GAME_TEAM_LIMIT: usize = 2;

pub async fn fetch_one<C: Context>(ctx: &C, game_team_id: i64) -> ServiceResult<GameTeam> {
    match ctx.game_teams().fetch_one(game_team_id).await {
        Ok(Some(game_team)) => GameTeam::try_from(game_team),
        Ok(None) => Err(AppError::GameTeamsNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_by_game<C: Context>(ctx: &C, game_id: i64) -> ServiceResult<Vec<GameTeam>> {
    match ctx.game_teams().fetch_by_game(game_id).await {
        Ok(game_teams) => game_teams.into_iter().map(GameTeam::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

/// Enters a team into a pending game.
pub async fn join<C: Context>(ctx: &C, game_id: i64, team_id: i64) -> ServiceResult<GameTeam> {
    let game = games::fetch_one(ctx, game_id).await?;
    if game.status != GameStatus::Pending {
        return Err(AppError::GamesNotPending);
    }
    if ctx.teams().fetch_one(team_id).await?.is_none() {
        return Err(AppError::TeamsNotFound);
    }

    let game_teams = fetch_by_game(ctx, game_id).await?;
    if game_teams.iter().any(|gt| gt.team_id == team_id) {
        return Err(AppError::GameTeamsAlreadyJoined);
    }
    if game_teams.len() >= GAME_TEAM_LIMIT {
        return Err(AppError::GameTeamsGameFull);
    }
    ensure_contest_capacity(ctx, game.contest_id, team_id).await?;

    let members = ctx.teams().fetch_members(team_id).await?;
    if members.len() != game.team_type.party_size() {
        return Err(AppError::GameTeamsTeamSizeMismatch);
    }

    let game_team = GameTeam::new(game_id, team_id, Utc::now());
    match ctx.game_teams().create(game_team.as_entity()).await {
        Ok(game_team) => GameTeam::try_from(game_team),
        Err(e) => unexpected(e),
    }
}

/// A team new to the contest only gets in while fewer than `max_team_count` distinct
/// teams play in its games.
async fn ensure_contest_capacity<C: Context>(
    ctx: &C,
    contest_id: i64,
    team_id: i64,
) -> ServiceResult<()> {
    let contest = match ctx.contests().fetch_one(contest_id).await {
        Ok(Some(contest)) => contest,
        Ok(None) => return Err(AppError::ContestsNotFound),
        Err(e) => return unexpected(e),
    };

    let mut participating = HashSet::new();
    for game in games::fetch_by_contest(ctx, contest_id).await? {
        for game_team in fetch_by_game(ctx, game.game_id).await? {
            participating.insert(game_team.team_id);
        }
    }
    if !participating.contains(&team_id)
        && participating.len() >= contest.max_team_count.max(0) as usize
    {
        return Err(AppError::GameTeamsContestFull);
    }
    Ok(())
}

/// Staff correction of a single team's placement.
pub async fn set_grade<C: Context>(
    ctx: &C,
    game_team_id: i64,
    grade: i32,
) -> ServiceResult<GameTeam> {
    let grade = Grade::try_from(grade)?;
    let mut game_team = fetch_one(ctx, game_team_id).await?;
    let others = fetch_by_game(ctx, game_team.game_id).await?;
    if others
        .iter()
        .any(|other| other.game_team_id != game_team_id && other.grade == Some(grade))
    {
        return Err(AppError::GameTeamsDuplicateGrade);
    }

    game_team.grade = Some(grade);
    ctx.game_teams()
        .update_grades(&[game_team.as_entity()])
        .await?;
    Ok(game_team)
}

/// The seat `team_id` still needs in the next bracket game. `None` when it is already
/// seated, so a retried result never seats a winner twice.
pub async fn plan_advancement<C: Context>(
    ctx: &C,
    next_game_id: i64,
    team_id: i64,
) -> ServiceResult<Option<GameTeam>> {
    let seated = fetch_by_game(ctx, next_game_id).await?;
    if seated.iter().any(|gt| gt.team_id == team_id) {
        warn!(next_game_id, team_id, "Winner already advanced");
        return Ok(None);
    }
    if seated.len() >= GAME_TEAM_LIMIT {
        return Err(AppError::GameTeamsGameFull);
    }
    Ok(Some(GameTeam::new(next_game_id, team_id, Utc::now())))
}

/// Places `team_id` into the next bracket game. Repeated calls for the same team are
/// no-ops.
pub async fn advance_winner<C: Context>(
    ctx: &C,
    next_game_id: i64,
    team_id: i64,
) -> ServiceResult<Option<GameTeam>> {
    let Some(seat) = plan_advancement(ctx, next_game_id, team_id).await? else {
        return Ok(None);
    };
    let game_team = match ctx.game_teams().create(seat.as_entity()).await {
        Ok(game_team) => GameTeam::try_from(game_team)?,
        Err(e) => return unexpected(e),
    };
    info!(next_game_id, team_id, "Winner advanced to next game");
    Ok(Some(game_team))
}

use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::contests::Contest;
use crate::models::brackets;
use crate::models::game_teams::GameTeam;
use crate::models::games::{Game, GameTeamType};
use crate::usecases::{game_teams, games};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

pub use crate::models::brackets::round_name;

async fn fetch_contest<C: Context>(ctx: &C, contest_id: i64) -> ServiceResult<Contest> {
    match ctx.contests().fetch_one(contest_id).await {
        Ok(Some(contest)) => Ok(contest),
        Ok(None) => Err(AppError::ContestsNotFound),
        Err(e) => unexpected(e),
    }
}

/// Creates every game of a single-elimination bracket and links each one to the game
/// its winner advances to.
pub async fn generate<C: Context>(
    ctx: &C,
    contest_id: i64,
    team_type: GameTeamType,
    max_team_count: i32,
) -> ServiceResult<Vec<Game>> {
    let slots = brackets::plan(max_team_count)?;
    fetch_contest(ctx, contest_id).await?;
    if ctx.games().count_by_contest(contest_id).await? > 0 {
        return Err(AppError::BracketsAlreadyGenerated);
    }

    let now = Utc::now();
    let planned = slots
        .iter()
        .map(|slot| Game::new_bracket_game(contest_id, team_type, slot.coordinates, now))
        .map(|game| game.as_entity())
        .collect();
    let mut created = match ctx.games().create_many(planned).await {
        Ok(created) => created,
        Err(e) => return unexpected(e),
    };

    let game_ids: Vec<i64> = created.iter().map(|game| game.game_id).collect();
    for (game, slot) in created.iter_mut().zip(&slots) {
        game.next_game_id = slot.next_slot.map(|next| game_ids[next]);
    }
    ctx.games().update_many(&created).await?;

    info!(
        contest_id,
        max_team_count,
        games = created.len(),
        "Bracket generated"
    );
    created.into_iter().map(Game::try_from).collect()
}

/// Shuffles the contest's registered teams into the first round.
pub async fn allocate_teams<C: Context>(ctx: &C, contest_id: i64) -> ServiceResult<Vec<GameTeam>> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    allocate_teams_with_rng(ctx, contest_id, &mut rng).await
}

pub async fn allocate_teams_with_rng<C: Context, R: Rng + Send>(
    ctx: &C,
    contest_id: i64,
    rng: &mut R,
) -> ServiceResult<Vec<GameTeam>> {
    let contest = fetch_contest(ctx, contest_id).await?;
    if !contest.registration_closed {
        return Err(AppError::BracketsRegistrationOpen);
    }

    let first_round = games::fetch_by_contest_and_round(ctx, contest_id, 1).await?;
    if first_round.is_empty() {
        return Err(AppError::BracketsNotGenerated);
    }
    for game in &first_round {
        if !game_teams::fetch_by_game(ctx, game.game_id).await?.is_empty() {
            return Err(AppError::BracketsAlreadyAllocated);
        }
    }

    let registered = ctx.contests().fetch_registered_team_ids(contest_id).await?;
    if registered.len() < first_round.len() * 2 {
        return Err(AppError::BracketsNotEnoughTeams);
    }

    let now = Utc::now();
    let shuffled = brackets::shuffle_teams(registered, rng);
    let pairs = first_round
        .iter()
        .zip(shuffled.chunks_exact(2))
        .flat_map(|(game, pair)| {
            pair.iter()
                .map(|team_id| GameTeam::new(game.game_id, *team_id, now).as_entity())
        })
        .collect();

    let allocated = match ctx.game_teams().create_many(pairs).await {
        Ok(allocated) => allocated,
        Err(e) => return unexpected(e),
    };
    info!(contest_id, teams = allocated.len(), "Teams allocated to first round");
    allocated.into_iter().map(GameTeam::try_from).collect()
}

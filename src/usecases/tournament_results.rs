use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::games::GameStatus;
use crate::models::tournament_results::{
    GameSummary, GameTeamSummary, MatchResultSummary, TournamentResult,
};
use crate::usecases::{game_teams, games};

/// Read-only bracket overview of a contest.
pub async fn fetch<C: Context>(ctx: &C, contest_id: i64) -> ServiceResult<TournamentResult> {
    if ctx.contests().fetch_one(contest_id).await?.is_none() {
        return Err(AppError::ContestsNotFound);
    }

    let mut summaries = vec![];
    for game in games::fetch_by_contest(ctx, contest_id).await? {
        let Some(bracket) = game.bracket else {
            continue;
        };

        let mut teams = vec![];
        for game_team in game_teams::fetch_by_game(ctx, game.game_id).await? {
            let name = match ctx.teams().fetch_one(game_team.team_id).await {
                Ok(team) => team.map(|team| team.name),
                Err(e) => return unexpected(e),
            };
            teams.push(GameTeamSummary {
                team_id: game_team.team_id,
                name,
                grade: game_team.grade,
            });
        }

        let result = match game.status {
            GameStatus::Finished => fetch_result(ctx, game.game_id).await?,
            _ => None,
        };

        let summary = GameSummary {
            game_id: game.game_id,
            match_number: bracket.match_number,
            bracket_position: bracket.bracket_position,
            status: game.status,
            next_game_id: game.next_game_id,
            scheduled_start_time: game.scheduled_start_time,
            teams,
            result,
        };
        summaries.push((game, summary));
    }

    Ok(TournamentResult::assemble(contest_id, summaries))
}

async fn fetch_result<C: Context>(
    ctx: &C,
    game_id: i64,
) -> ServiceResult<Option<MatchResultSummary>> {
    let result = match ctx.match_results().fetch_by_game(game_id).await {
        Ok(Some(result)) => result,
        Ok(None) => return Ok(None),
        Err(e) => return unexpected(e),
    };
    match ctx
        .match_results()
        .fetch_player_stats(result.match_result_id)
        .await
    {
        Ok(stats) => Ok(Some(MatchResultSummary::new(result, stats))),
        Err(e) => unexpected(e),
    }
}

mod common;

use bracket_service::common::error::AppError;
use bracket_service::models::games::GameTeamType;
use bracket_service::usecases::{brackets, games};
use common::{CONTEST_ID, MemoryContext};
use hashbrown::HashSet;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[tokio::test]
async fn power_of_two_brackets_halve_each_round() {
    for max_team_count in [2, 4, 8, 16, 32] {
        let ctx = MemoryContext::default();
        ctx.add_contest(CONTEST_ID, max_team_count, false);

        let created = brackets::generate(&ctx, CONTEST_ID, GameTeamType::Full, max_team_count)
            .await
            .unwrap();
        assert_eq!(created.len() as i32, max_team_count - 1);

        let rounds = max_team_count.trailing_zeros() as i32;
        let all = games::fetch_by_contest(&ctx, CONTEST_ID).await.unwrap();
        for round in 1..=rounds {
            let in_round: Vec<_> = all.iter().filter(|g| g.round() == Some(round)).collect();
            assert_eq!(in_round.len() as i32, max_team_count >> round);
        }

        let positions: Vec<i32> = all
            .iter()
            .map(|g| g.bracket.unwrap().bracket_position)
            .collect();
        assert_eq!(positions, (1..max_team_count).collect::<Vec<_>>());

        for game in &all {
            let round = game.round().unwrap();
            match game.next_game_id {
                None => assert_eq!(round, rounds),
                Some(next_game_id) => {
                    let next = all.iter().find(|g| g.game_id == next_game_id).unwrap();
                    assert_eq!(next.round(), Some(round + 1));
                    let expected = (game.match_number().unwrap() + 1) / 2;
                    assert_eq!(next.match_number(), Some(expected));
                }
            }
        }
    }
}

#[tokio::test]
async fn non_power_of_two_is_rejected_before_anything_is_written() {
    let ctx = MemoryContext::default();
    ctx.add_contest(CONTEST_ID, 6, false);
    for max_team_count in [0, 1, 6, 10, -4] {
        let result = brackets::generate(&ctx, CONTEST_ID, GameTeamType::Full, max_team_count).await;
        assert!(matches!(result, Err(AppError::BracketsInvalidTeamCount)));
    }
    assert!(ctx.db.games.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rebuilding_a_bracket_is_rejected() {
    let ctx = MemoryContext::default();
    ctx.add_contest(CONTEST_ID, 4, false);
    brackets::generate(&ctx, CONTEST_ID, GameTeamType::Full, 4)
        .await
        .unwrap();
    let again = brackets::generate(&ctx, CONTEST_ID, GameTeamType::Full, 4).await;
    assert!(matches!(again, Err(AppError::BracketsAlreadyGenerated)));
    assert_eq!(ctx.db.games.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_contest_is_not_found() {
    let ctx = MemoryContext::default();
    let result = brackets::generate(&ctx, 99, GameTeamType::Full, 4).await;
    assert!(matches!(result, Err(AppError::ContestsNotFound)));
}

#[test]
fn round_names_count_back_from_the_final() {
    assert_eq!(brackets::round_name(3, 3), "Final");
    assert_eq!(brackets::round_name(2, 3), "Semi-finals");
    assert_eq!(brackets::round_name(1, 3), "Quarter-finals");
    assert_eq!(brackets::round_name(1, 4), "Round of 16");
    assert_eq!(brackets::round_name(1, 5), "Round of 32");
}

async fn generated_contest(registered: i64, closed: bool) -> MemoryContext {
    let ctx = MemoryContext::default();
    ctx.add_contest(CONTEST_ID, 8, closed);
    for team_id in 1..=registered {
        ctx.add_team(team_id, 2);
        ctx.register(CONTEST_ID, team_id);
    }
    brackets::generate(&ctx, CONTEST_ID, GameTeamType::Duo, 8)
        .await
        .unwrap();
    ctx
}

#[tokio::test]
async fn allocation_fills_first_round_with_every_team_once() {
    let ctx = generated_contest(8, true).await;
    let mut rng = StdRng::seed_from_u64(7);
    let allocated = brackets::allocate_teams_with_rng(&ctx, CONTEST_ID, &mut rng)
        .await
        .unwrap();
    assert_eq!(allocated.len(), 8);

    let first_round = games::fetch_by_contest_and_round(&ctx, CONTEST_ID, 1)
        .await
        .unwrap();
    let mut seen = HashSet::new();
    for game in &first_round {
        let team_ids = ctx.team_ids_in(game.game_id);
        assert_eq!(team_ids.len(), 2);
        seen.extend(team_ids);
    }
    assert_eq!(seen, (1..=8).collect::<HashSet<i64>>());

    let later_rounds = games::fetch_by_contest(&ctx, CONTEST_ID).await.unwrap();
    for game in later_rounds.iter().filter(|g| g.round() != Some(1)) {
        assert!(ctx.team_ids_in(game.game_id).is_empty());
    }
}

#[tokio::test]
async fn allocation_is_rejected_twice() {
    let ctx = generated_contest(8, true).await;
    brackets::allocate_teams(&ctx, CONTEST_ID).await.unwrap();
    let again = brackets::allocate_teams(&ctx, CONTEST_ID).await;
    assert!(matches!(again, Err(AppError::BracketsAlreadyAllocated)));
    assert_eq!(ctx.db.game_teams.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn allocation_requires_closed_registration() {
    let ctx = generated_contest(8, false).await;
    let result = brackets::allocate_teams(&ctx, CONTEST_ID).await;
    assert!(matches!(result, Err(AppError::BracketsRegistrationOpen)));
}

#[tokio::test]
async fn allocation_requires_enough_teams() {
    let ctx = generated_contest(7, true).await;
    let result = brackets::allocate_teams(&ctx, CONTEST_ID).await;
    assert!(matches!(result, Err(AppError::BracketsNotEnoughTeams)));
    assert!(ctx.db.game_teams.lock().unwrap().is_empty());
}

#[tokio::test]
async fn allocation_requires_a_bracket() {
    let ctx = MemoryContext::default();
    ctx.add_contest(CONTEST_ID, 8, true);
    let result = brackets::allocate_teams(&ctx, CONTEST_ID).await;
    assert!(matches!(result, Err(AppError::BracketsNotGenerated)));
}

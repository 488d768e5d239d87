use crate::common::error::{AppError, ServiceResult};
use crate::models::games::BracketCoordinates;
use rand::Rng;
use rand::seq::SliceRandom;

/// One game of a planned bracket, before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketSlot {
    pub coordinates: BracketCoordinates,
    /// Index into the plan of the game the winner advances to.
    pub next_slot: Option<usize>,
}

/// Number of rounds for a bracket of `max_team_count` teams.
pub fn round_count(max_team_count: i32) -> ServiceResult<u32> {
    if max_team_count < 2 || !(max_team_count as u32).is_power_of_two() {
        return Err(AppError::BracketsInvalidTeamCount);
    }
    Ok((max_team_count as u32).trailing_zeros())
}

/// Lays out every game of a single-elimination bracket, round by round, and links
/// (round, match) to (round + 1, ceil(match / 2)).
pub fn plan(max_team_count: i32) -> ServiceResult<Vec<BracketSlot>> {
    let rounds = round_count(max_team_count)?;
    let mut slots = Vec::with_capacity(max_team_count as usize - 1);
    let mut round_offsets = Vec::with_capacity(rounds as usize);
    let mut bracket_position = 0;
    for round in 1..=rounds {
        round_offsets.push(slots.len());
        let games_in_round = max_team_count >> round;
        for match_number in 1..=games_in_round {
            bracket_position += 1;
            slots.push(BracketSlot {
                coordinates: BracketCoordinates {
                    round: round as i32,
                    match_number,
                    bracket_position,
                },
                next_slot: None,
            });
        }
    }

    for slot in slots.iter_mut() {
        let BracketCoordinates {
            round,
            match_number,
            ..
        } = slot.coordinates;
        if round as u32 == rounds {
            continue;
        }
        let next_offset = round_offsets[round as usize];
        let next_match = (match_number + 1) / 2;
        slot.next_slot = Some(next_offset + next_match as usize - 1);
    }
    Ok(slots)
}

/// Display name of `round` in a bracket with `total_rounds` rounds.
pub fn round_name(round: i32, total_rounds: i32) -> String {
    match i64::from(total_rounds) - i64::from(round) {
        0 => "Final".to_owned(),
        1 => "Semi-finals".to_owned(),
        2 => "Quarter-finals".to_owned(),
        k if k < 0 => format!("Round {round}"),
        k => match u32::try_from(k + 1).ok().and_then(|shift| 1u64.checked_shl(shift)) {
            Some(teams) => format!("Round of {teams}"),
            None => format!("Round {round}"),
        },
    }
}

/// Uniformly permutes the registered teams (Fisher-Yates).
pub fn shuffle_teams<R: Rng + ?Sized>(mut team_ids: Vec<i64>, rng: &mut R) -> Vec<i64> {
    team_ids.shuffle(rng);
    team_ids
}

use crate::adapters::match_history::{MatchDetail, MatchPlayer, RecentMatch};
use crate::common::error::{AppError, ServiceResult};
use crate::entities::accounts::LinkedAccount;
use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use std::fmt::{Display, Formatter};

/// An external account handle, compared case-insensitively.
#[derive(Debug, Clone, Eq)]
pub struct AccountHandle {
    pub name: String,
    pub tag: String,
}

impl AccountHandle {
    pub fn new(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_owned(),
            tag: tag.to_owned(),
        }
    }

    /// Lowercased `name#tag`.
    pub fn key(&self) -> String {
        format!("{}#{}", self.name, self.tag).to_lowercase()
    }
}

impl PartialEq for AccountHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
            && self.tag.to_lowercase() == other.tag.to_lowercase()
    }
}

impl Display for AccountHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

impl From<LinkedAccount> for AccountHandle {
    fn from(value: LinkedAccount) -> Self {
        Self {
            name: value.account_name,
            tag: value.account_tag,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RosterMember {
    pub user_id: i64,
    pub team_id: i64,
    pub handle: AccountHandle,
}

/// The members of one tournament team that have a linked account.
#[derive(Debug, Clone)]
pub struct Roster {
    pub team_id: i64,
    pub members: Vec<RosterMember>,
}

impl Roster {
    /// The member whose handle anchors the provider lookup.
    pub fn reference(&self) -> Option<&RosterMember> {
        self.members.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOutcome {
    pub winner_team_id: i64,
    pub loser_team_id: i64,
    pub winner_score: i32,
    pub loser_score: i32,
}

/// Matches that started inside `[window_start, window_end]`, most recent first.
pub fn within_window(
    mut matches: Vec<RecentMatch>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<RecentMatch> {
    matches.retain(|m| m.started_at >= window_start && m.started_at <= window_end);
    matches.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    matches
}

/// Whether every rostered handle of both teams played in the match.
pub fn rosters_present(detail: &MatchDetail, rosters: &[&Roster]) -> bool {
    let participants: HashSet<String> = detail
        .players
        .iter()
        .map(|player| player.handle().key())
        .collect();
    rosters
        .iter()
        .flat_map(|roster| roster.members.iter())
        .all(|member| participants.contains(&member.handle.key()))
}

/// Maps the provider's sides onto the two tournament teams, using the side the
/// reference player of `team_a` played on.
pub fn resolve_outcome(
    detail: &MatchDetail,
    reference: &AccountHandle,
    team_a_id: i64,
    team_b_id: i64,
) -> ServiceResult<ResolvedOutcome> {
    let side_a_id = detail
        .player(reference)
        .map(|player| player.side_id.as_str())
        .ok_or(AppError::DetectionSideUnresolved)?;
    let side_a = detail
        .side(side_a_id)
        .ok_or(AppError::DetectionSideUnresolved)?;
    let side_b = detail
        .sides
        .iter()
        .find(|side| !side.side_id.eq_ignore_ascii_case(side_a_id))
        .ok_or(AppError::DetectionSideUnresolved)?;

    match (side_a.has_won, side_b.has_won) {
        (true, false) => Ok(ResolvedOutcome {
            winner_team_id: team_a_id,
            loser_team_id: team_b_id,
            winner_score: side_a.rounds_won,
            loser_score: side_b.rounds_won,
        }),
        (false, true) => Ok(ResolvedOutcome {
            winner_team_id: team_b_id,
            loser_team_id: team_a_id,
            winner_score: side_b.rounds_won,
            loser_score: side_a.rounds_won,
        }),
        _ => Err(AppError::DetectionNoWinner),
    }
}

/// Pairs each match participant with its roster entry. Players outside both rosters
/// are dropped.
pub fn affiliated_players<'a>(
    detail: &'a MatchDetail,
    rosters: &[&'a Roster],
) -> Vec<(&'a RosterMember, &'a MatchPlayer)> {
    detail
        .players
        .iter()
        .filter_map(|player| {
            let key = player.handle().key();
            rosters
                .iter()
                .flat_map(|roster| roster.members.iter())
                .find(|member| member.handle.key() == key)
                .map(|member| (member, player))
        })
        .collect()
}

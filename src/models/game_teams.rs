use crate::common::error::{AppError, ServiceResult};
use crate::entities::game_teams::GameTeam as Entity;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Winner = 1,
    Loser = 2,
}

impl TryFrom<i32> for Grade {
    type Error = AppError;

    fn try_from(value: i32) -> ServiceResult<Self> {
        match value {
            1 => Ok(Grade::Winner),
            2 => Ok(Grade::Loser),
            _ => Err(AppError::GameTeamsInvalidGrade),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameTeam {
    pub game_team_id: i64,
    pub game_id: i64,
    pub team_id: i64,
    pub grade: Option<Grade>,
    pub created_at: DateTime<Utc>,
}

impl GameTeam {
    pub fn new(game_id: i64, team_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            game_team_id: 0,
            game_id,
            team_id,
            grade: None,
            created_at: now,
        }
    }

    pub fn with_grade(&self, grade: Grade) -> Self {
        Self {
            grade: Some(grade),
            ..self.clone()
        }
    }

    pub fn as_entity(&self) -> Entity {
        self.clone().into()
    }
}

impl From<GameTeam> for Entity {
    fn from(value: GameTeam) -> Self {
        Entity {
            game_team_id: value.game_team_id,
            game_id: value.game_id,
            team_id: value.team_id,
            grade: value.grade.map(|grade| grade as i32),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<Entity> for GameTeam {
    type Error = AppError;

    fn try_from(value: Entity) -> ServiceResult<Self> {
        Ok(Self {
            game_team_id: value.game_team_id,
            game_id: value.game_id,
            team_id: value.team_id,
            grade: value.grade.map(Grade::try_from).transpose()?,
            created_at: value.created_at,
        })
    }
}

/// The winner and loser rows of a two-team game.
pub fn split_winner<'a>(
    game_teams: &'a [GameTeam],
    winner_team_id: i64,
) -> ServiceResult<(&'a GameTeam, &'a GameTeam)> {
    let [first, second] = game_teams else {
        return Err(AppError::GamesTeamCountMismatch);
    };
    match winner_team_id {
        id if id == first.team_id => Ok((first, second)),
        id if id == second.team_id => Ok((second, first)),
        _ => Err(AppError::GameTeamsWinnerNotInGame),
    }
}

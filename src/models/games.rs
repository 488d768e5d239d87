use crate::common::error::{AppError, ServiceResult};
use crate::entities::games::Game as Entity;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_DETECTION_WINDOW_MINUTES: i32 = 120;
pub const MAX_GAME_DURATION_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Pending,
    Active,
    Finished,
    Cancelled,
}

impl GameStatus {
    pub const ALL: [GameStatus; 4] = [
        GameStatus::Pending,
        GameStatus::Active,
        GameStatus::Finished,
        GameStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Pending => "PENDING",
            GameStatus::Active => "ACTIVE",
            GameStatus::Finished => "FINISHED",
            GameStatus::Cancelled => "CANCELLED",
        }
    }

    pub const fn can_transition_to(self, next: GameStatus) -> bool {
        matches!(
            (self, next),
            (GameStatus::Pending, GameStatus::Active)
                | (GameStatus::Pending, GameStatus::Cancelled)
                | (GameStatus::Active, GameStatus::Finished)
                | (GameStatus::Active, GameStatus::Cancelled)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Finished | GameStatus::Cancelled)
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = AppError;

    fn from_str(s: &str) -> ServiceResult<Self> {
        match s {
            "PENDING" => Ok(GameStatus::Pending),
            "ACTIVE" => Ok(GameStatus::Active),
            "FINISHED" => Ok(GameStatus::Finished),
            "CANCELLED" => Ok(GameStatus::Cancelled),
            _ => Err(AppError::Unexpected),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionStatus {
    None,
    Detecting,
    Detected,
    Failed,
    Manual,
}

impl DetectionStatus {
    pub const ALL: [DetectionStatus; 5] = [
        DetectionStatus::None,
        DetectionStatus::Detecting,
        DetectionStatus::Detected,
        DetectionStatus::Failed,
        DetectionStatus::Manual,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DetectionStatus::None => "NONE",
            DetectionStatus::Detecting => "DETECTING",
            DetectionStatus::Detected => "DETECTED",
            DetectionStatus::Failed => "FAILED",
            DetectionStatus::Manual => "MANUAL",
        }
    }

    pub const fn can_transition_to(self, next: DetectionStatus) -> bool {
        matches!(
            (self, next),
            (DetectionStatus::None, DetectionStatus::Detecting)
                | (DetectionStatus::Detecting, DetectionStatus::Detected)
                | (DetectionStatus::Detecting, DetectionStatus::Failed)
                | (DetectionStatus::Detecting, DetectionStatus::Manual)
                | (DetectionStatus::Failed, DetectionStatus::Manual)
                | (DetectionStatus::Failed, DetectionStatus::Detecting)
        )
    }

    /// States from which staff may still submit a manual result.
    pub const fn accepts_manual_result(self) -> bool {
        matches!(
            self,
            DetectionStatus::None | DetectionStatus::Detecting | DetectionStatus::Failed
        )
    }
}

impl Display for DetectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> ServiceResult<Self> {
        match s {
            "NONE" => Ok(DetectionStatus::None),
            "DETECTING" => Ok(DetectionStatus::Detecting),
            "DETECTED" => Ok(DetectionStatus::Detected),
            "FAILED" => Ok(DetectionStatus::Failed),
            "MANUAL" => Ok(DetectionStatus::Manual),
            _ => Err(AppError::Unexpected),
        }
    }
}

/// Party size of each side.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameTeamType {
    Solo = 1,
    Duo = 2,
    Trio = 3,
    Quad = 4,
    Full = 5,
}

impl GameTeamType {
    pub const fn party_size(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for GameTeamType {
    type Error = AppError;

    fn try_from(value: u8) -> ServiceResult<Self> {
        match value {
            1 => Ok(GameTeamType::Solo),
            2 => Ok(GameTeamType::Duo),
            3 => Ok(GameTeamType::Trio),
            4 => Ok(GameTeamType::Quad),
            5 => Ok(GameTeamType::Full),
            _ => Err(AppError::GamesInvalidTeamType),
        }
    }
}

/// Where a game sits in a generated bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketCoordinates {
    pub round: i32,
    pub match_number: i32,
    pub bracket_position: i32,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub game_id: i64,
    pub contest_id: i64,
    pub status: GameStatus,
    pub team_type: GameTeamType,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub bracket: Option<BracketCoordinates>,
    pub next_game_id: Option<i64>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub detection_window_minutes: i32,
    pub detected_match_id: Option<String>,
    pub detection_status: DetectionStatus,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(contest_id: i64, team_type: GameTeamType, now: DateTime<Utc>) -> Self {
        Self {
            game_id: 0,
            contest_id,
            status: GameStatus::Pending,
            team_type,
            started_at: None,
            ended_at: None,
            bracket: None,
            next_game_id: None,
            scheduled_start_time: None,
            detection_window_minutes: DEFAULT_DETECTION_WINDOW_MINUTES,
            detected_match_id: None,
            detection_status: DetectionStatus::None,
            created_at: now,
        }
    }

    pub fn new_bracket_game(
        contest_id: i64,
        team_type: GameTeamType,
        coordinates: BracketCoordinates,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            bracket: Some(coordinates),
            ..Self::new(contest_id, team_type, now)
        }
    }

    pub fn round(&self) -> Option<i32> {
        self.bracket.map(|b| b.round)
    }

    pub fn match_number(&self) -> Option<i32> {
        self.bracket.map(|b| b.match_number)
    }

    pub fn is_bracket_game(&self) -> bool {
        self.bracket.is_some()
    }

    pub fn transition_status(&mut self, next: GameStatus) -> ServiceResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::GamesInvalidStatusTransition(self.status, next));
        }
        self.status = next;
        Ok(())
    }

    pub fn transition_detection(&mut self, next: DetectionStatus) -> ServiceResult<()> {
        if !self.detection_status.can_transition_to(next) {
            return Err(AppError::GamesInvalidDetectionTransition(
                self.detection_status,
                next,
            ));
        }
        self.detection_status = next;
        Ok(())
    }

    /// Moves the game to ACTIVE and starts detection. Nothing changes unless both
    /// transitions are legal.
    pub fn activate_for_detection(&mut self, now: DateTime<Utc>) -> ServiceResult<()> {
        if !self.status.can_transition_to(GameStatus::Active) {
            return Err(AppError::GamesInvalidStatusTransition(
                self.status,
                GameStatus::Active,
            ));
        }
        if !self
            .detection_status
            .can_transition_to(DetectionStatus::Detecting)
        {
            return Err(AppError::GamesInvalidDetectionTransition(
                self.detection_status,
                DetectionStatus::Detecting,
            ));
        }
        self.status = GameStatus::Active;
        self.started_at = Some(now);
        self.detection_status = DetectionStatus::Detecting;
        Ok(())
    }

    pub fn mark_detected(&mut self, match_id: String) -> ServiceResult<()> {
        self.transition_detection(DetectionStatus::Detected)?;
        self.detected_match_id = Some(match_id);
        Ok(())
    }

    pub fn mark_detection_failed(&mut self) -> ServiceResult<()> {
        self.transition_detection(DetectionStatus::Failed)
    }

    pub fn mark_manual_result(&mut self) -> ServiceResult<()> {
        self.transition_detection(DetectionStatus::Manual)
    }

    /// Staff override: lands on MANUAL even from states the transition table rejects.
    /// Returns whether the regular transition had to be bypassed.
    pub fn force_manual_result(&mut self) -> bool {
        match self.mark_manual_result() {
            Ok(()) => false,
            Err(_) => {
                self.detection_status = DetectionStatus::Manual;
                true
            }
        }
    }

    /// Ends the game at `now`. A start more than two hours back is pulled forward so
    /// the stored span never exceeds the cap.
    pub fn finish(&mut self, now: DateTime<Utc>) -> ServiceResult<()> {
        self.transition_status(GameStatus::Finished)?;
        let earliest = now - TimeDelta::minutes(MAX_GAME_DURATION_MINUTES);
        self.started_at = Some(self.started_at.unwrap_or(now).clamp(earliest, now));
        self.ended_at = Some(now);
        Ok(())
    }

    /// Finishes a game that was never activated, stamping both ends at `now`.
    pub fn finish_without_activation(&mut self, now: DateTime<Utc>) -> ServiceResult<()> {
        if self.status != GameStatus::Pending {
            return Err(AppError::GamesInvalidStatusTransition(
                self.status,
                GameStatus::Finished,
            ));
        }
        self.started_at = Some(now);
        self.ended_at = Some(now);
        self.status = GameStatus::Finished;
        Ok(())
    }

    /// Records when the real-world match actually ran.
    pub fn record_actual_times(
        &mut self,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let duration = ended_at - started_at;
        let max_duration = TimeDelta::minutes(MAX_GAME_DURATION_MINUTES);
        if duration < TimeDelta::zero() || duration > max_duration {
            return Err(AppError::GamesInvalidDuration);
        }
        self.started_at = Some(started_at);
        self.ended_at = Some(ended_at);
        Ok(())
    }

    pub fn set_schedule(
        &mut self,
        scheduled_start_time: DateTime<Utc>,
        window_minutes: i32,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        if self.status != GameStatus::Pending {
            return Err(AppError::GamesNotPending);
        }
        if scheduled_start_time <= now {
            return Err(AppError::GamesScheduleInPast);
        }
        self.scheduled_start_time = Some(scheduled_start_time);
        self.detection_window_minutes = match window_minutes {
            m if m > 0 => m,
            _ => DEFAULT_DETECTION_WINDOW_MINUTES,
        };
        Ok(())
    }

    /// Staff retry of a failed detection, with the window re-anchored at `now`.
    pub fn restart_detection(
        &mut self,
        window_minutes: i32,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        if self.detection_status != DetectionStatus::Failed {
            return Err(AppError::GamesInvalidDetectionTransition(
                self.detection_status,
                DetectionStatus::Detecting,
            ));
        }
        if self.status != GameStatus::Active {
            return Err(AppError::GamesInvalidStatusTransition(
                self.status,
                GameStatus::Active,
            ));
        }
        self.transition_detection(DetectionStatus::Detecting)?;
        self.scheduled_start_time = Some(now);
        self.detection_window_minutes = match window_minutes {
            m if m > 0 => m,
            _ => DEFAULT_DETECTION_WINDOW_MINUTES,
        };
        Ok(())
    }

    pub fn detection_window_end(&self) -> Option<DateTime<Utc>> {
        self.scheduled_start_time
            .map(|start| start + TimeDelta::minutes(self.detection_window_minutes as i64))
    }

    pub fn is_detection_window_expired(&self, now: DateTime<Utc>) -> bool {
        self.detection_window_end().is_some_and(|end| now > end)
    }

    pub fn is_ready_to_activate(&self, now: DateTime<Utc>) -> bool {
        self.status == GameStatus::Pending
            && self
                .scheduled_start_time
                .is_some_and(|scheduled| scheduled <= now)
    }

    pub fn as_entity(&self) -> Entity {
        self.clone().into()
    }
}

impl From<Game> for Entity {
    fn from(game: Game) -> Self {
        Entity {
            game_id: game.game_id,
            contest_id: game.contest_id,
            status: game.status.as_str().to_owned(),
            team_type: game.team_type as _,
            started_at: game.started_at,
            ended_at: game.ended_at,
            round: game.bracket.map(|b| b.round),
            match_number: game.bracket.map(|b| b.match_number),
            bracket_position: game.bracket.map(|b| b.bracket_position),
            next_game_id: game.next_game_id,
            scheduled_start_time: game.scheduled_start_time,
            detection_window_minutes: game.detection_window_minutes,
            detected_match_id: game.detected_match_id,
            detection_status: game.detection_status.as_str().to_owned(),
            created_at: game.created_at,
        }
    }
}

impl TryFrom<Entity> for Game {
    type Error = AppError;

    fn try_from(value: Entity) -> ServiceResult<Self> {
        let bracket = match (value.round, value.match_number) {
            (Some(round), Some(match_number)) if round >= 1 && match_number >= 1 => {
                Some(BracketCoordinates {
                    round,
                    match_number,
                    bracket_position: value.bracket_position.unwrap_or_default(),
                })
            }
            (None, None) => None,
            _ => return Err(AppError::GamesInvalidBracketCoordinates),
        };
        Ok(Self {
            game_id: value.game_id,
            contest_id: value.contest_id,
            status: value.status.parse()?,
            team_type: GameTeamType::try_from(value.team_type)?,
            started_at: value.started_at,
            ended_at: value.ended_at,
            bracket,
            next_game_id: value.next_game_id,
            scheduled_start_time: value.scheduled_start_time,
            detection_window_minutes: value.detection_window_minutes,
            detected_match_id: value.detected_match_id,
            detection_status: value.detection_status.parse()?,
            created_at: value.created_at,
        })
    }
}

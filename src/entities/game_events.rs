use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEventType {
    Scheduled,
    Activated,
    Detecting,
    Detected,
    Failed,
    Finished,
    ManualResult,
    Cancelled,
}

impl GameEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEventType::Scheduled => "GAME_SCHEDULED",
            GameEventType::Activated => "GAME_ACTIVATED",
            GameEventType::Detecting => "GAME_DETECTING",
            GameEventType::Detected => "GAME_DETECTED",
            GameEventType::Failed => "GAME_DETECTION_FAILED",
            GameEventType::Finished => "GAME_FINISHED",
            GameEventType::ManualResult => "GAME_MANUAL_RESULT",
            GameEventType::Cancelled => "GAME_CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameEvent {
    pub event_type: &'static str,
    pub game_id: i64,
    pub contest_id: i64,
    pub status: &'static str,
    pub detection_status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetectedEvent {
    pub game_id: i64,
    pub contest_id: i64,
    pub provider_match_id: String,
    pub winner_team_id: i64,
    pub loser_team_id: i64,
    pub winner_score: i32,
    pub loser_score: i32,
    pub map_name: String,
    pub manual: bool,
    pub timestamp: DateTime<Utc>,
}

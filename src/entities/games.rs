use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Game {
    pub game_id: i64,
    pub contest_id: i64,
    pub status: String,
    pub team_type: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub round: Option<i32>,
    pub match_number: Option<i32>,
    pub bracket_position: Option<i32>,
    pub next_game_id: Option<i64>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub detection_window_minutes: i32,
    pub detected_match_id: Option<String>,
    pub detection_status: String,
    pub created_at: DateTime<Utc>,
}

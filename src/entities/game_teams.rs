use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameTeam {
    pub game_team_id: i64,
    pub game_id: i64,
    pub team_id: i64,
    /// 1 = winner, 2 = loser
    pub grade: Option<i32>,
    pub created_at: DateTime<Utc>,
}

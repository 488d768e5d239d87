#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Contest {
    pub contest_id: i64,
    pub title: String,
    pub max_team_count: i32,
    pub team_type: u8,
    pub registration_closed: bool,
}

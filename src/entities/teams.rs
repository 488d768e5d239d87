#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    pub leader_user_id: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamMember {
    pub team_id: i64,
    pub user_id: i64,
    pub is_leader: bool,
}

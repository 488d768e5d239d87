use crate::entities::teams::{Team, TeamMember};
use async_trait::async_trait;
use sqlx::{MySql, Pool};

/// Read-only view of the team formation subsystem.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn fetch_one(&self, team_id: i64) -> anyhow::Result<Option<Team>>;
    async fn fetch_members(&self, team_id: i64) -> anyhow::Result<Vec<TeamMember>>;
    async fn fetch_leader(&self, team_id: i64) -> anyhow::Result<Option<TeamMember>>;
}

#[async_trait]
impl TeamRepository for Pool<MySql> {
    async fn fetch_one(&self, team_id: i64) -> anyhow::Result<Option<Team>> {
        const QUERY: &str = "SELECT team_id, name, leader_user_id FROM teams WHERE team_id = ?";
        Ok(sqlx::query_as(QUERY)
            .bind(team_id)
            .fetch_optional(self)
            .await?)
    }

    async fn fetch_members(&self, team_id: i64) -> anyhow::Result<Vec<TeamMember>> {
        const QUERY: &str = concat!(
            "SELECT team_id, user_id, is_leader FROM team_members ",
            "WHERE team_id = ? ORDER BY is_leader DESC, user_id"
        );
        Ok(sqlx::query_as(QUERY).bind(team_id).fetch_all(self).await?)
    }

    async fn fetch_leader(&self, team_id: i64) -> anyhow::Result<Option<TeamMember>> {
        const QUERY: &str = concat!(
            "SELECT team_id, user_id, is_leader FROM team_members ",
            "WHERE team_id = ? AND is_leader = 1"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(team_id)
            .fetch_optional(self)
            .await?)
    }
}

use crate::entities::contests::Contest;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

#[async_trait]
pub trait ContestRepository: Send + Sync {
    async fn fetch_one(&self, contest_id: i64) -> anyhow::Result<Option<Contest>>;
    /// Teams whose registration for the contest was accepted, in registration order.
    async fn fetch_registered_team_ids(&self, contest_id: i64) -> anyhow::Result<Vec<i64>>;
}

#[async_trait]
impl ContestRepository for Pool<MySql> {
    async fn fetch_one(&self, contest_id: i64) -> anyhow::Result<Option<Contest>> {
        const QUERY: &str = concat!(
            "SELECT contest_id, title, max_team_count, team_type, registration_closed ",
            "FROM contests WHERE contest_id = ?"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(contest_id)
            .fetch_optional(self)
            .await?)
    }

    async fn fetch_registered_team_ids(&self, contest_id: i64) -> anyhow::Result<Vec<i64>> {
        const QUERY: &str = concat!(
            "SELECT team_id FROM contest_teams ",
            "WHERE contest_id = ? AND status = 'ACCEPTED' ORDER BY registered_at"
        );
        Ok(sqlx::query_scalar(QUERY)
            .bind(contest_id)
            .fetch_all(self)
            .await?)
    }
}

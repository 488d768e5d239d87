use crate::entities::accounts::LinkedAccount;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn fetch_linked(&self, user_id: i64) -> anyhow::Result<Option<LinkedAccount>>;
}

#[async_trait]
impl AccountRepository for Pool<MySql> {
    async fn fetch_linked(&self, user_id: i64) -> anyhow::Result<Option<LinkedAccount>> {
        const QUERY: &str = concat!(
            "SELECT user_id, account_name, account_tag FROM linked_accounts ",
            "WHERE user_id = ? AND account_name IS NOT NULL AND account_tag IS NOT NULL"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(user_id)
            .fetch_optional(self)
            .await?)
    }
}

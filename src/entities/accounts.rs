/// A user's linked in-game account, `name#tag`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkedAccount {
    pub user_id: i64,
    pub account_name: String,
    pub account_tag: String,
}

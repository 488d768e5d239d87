use crate::entities::game_teams::GameTeam;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

const TABLE_NAME: &str = "game_teams";
const READ_FIELDS: &str = "game_team_id, game_id, team_id, grade, created_at";

#[async_trait]
pub trait GameTeamRepository: Send + Sync {
    async fn create(&self, game_team: GameTeam) -> anyhow::Result<GameTeam>;
    async fn create_many(&self, game_teams: Vec<GameTeam>) -> anyhow::Result<Vec<GameTeam>>;
    async fn fetch_one(&self, game_team_id: i64) -> anyhow::Result<Option<GameTeam>>;
    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Vec<GameTeam>>;
    async fn update_grades(&self, game_teams: &[GameTeam]) -> anyhow::Result<()>;
    async fn delete_by_game(&self, game_id: i64) -> anyhow::Result<u64>;
}

const INSERT_QUERY: &str = const_str::concat!(
    "INSERT INTO ",
    TABLE_NAME,
    " (game_id, team_id, grade, created_at) VALUES (?, ?, ?, ?)"
);

const GRADE_QUERY: &str =
    const_str::concat!("UPDATE ", TABLE_NAME, " SET grade = ? WHERE game_team_id = ?");

pub(crate) fn bind_insert<'q>(
    game_team: &'q GameTeam,
) -> sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments> {
    sqlx::query(INSERT_QUERY)
        .bind(game_team.game_id)
        .bind(game_team.team_id)
        .bind(game_team.grade)
        .bind(game_team.created_at)
}

pub(crate) fn bind_grade<'q>(
    game_team: &'q GameTeam,
) -> sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments> {
    sqlx::query(GRADE_QUERY)
        .bind(game_team.grade)
        .bind(game_team.game_team_id)
}

#[async_trait]
impl GameTeamRepository for Pool<MySql> {
    async fn create(&self, mut game_team: GameTeam) -> anyhow::Result<GameTeam> {
        let res = bind_insert(&game_team).execute(self).await?;
        game_team.game_team_id = res.last_insert_id() as _;
        Ok(game_team)
    }

    async fn create_many(&self, game_teams: Vec<GameTeam>) -> anyhow::Result<Vec<GameTeam>> {
        let mut tx = self.begin().await?;
        let mut created = Vec::with_capacity(game_teams.len());
        for mut game_team in game_teams {
            let res = bind_insert(&game_team).execute(&mut *tx).await?;
            game_team.game_team_id = res.last_insert_id() as _;
            created.push(game_team);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn fetch_one(&self, game_team_id: i64) -> anyhow::Result<Option<GameTeam>> {
        const QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " WHERE game_team_id = ?"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(game_team_id)
            .fetch_optional(self)
            .await?)
    }

    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Vec<GameTeam>> {
        const QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " WHERE game_id = ? ORDER BY game_team_id"
        );
        Ok(sqlx::query_as(QUERY).bind(game_id).fetch_all(self).await?)
    }

    async fn update_grades(&self, game_teams: &[GameTeam]) -> anyhow::Result<()> {
        let mut tx = self.begin().await?;
        for game_team in game_teams {
            bind_grade(game_team).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_by_game(&self, game_id: i64) -> anyhow::Result<u64> {
        const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE game_id = ?");
        let res = sqlx::query(QUERY).bind(game_id).execute(self).await?;
        Ok(res.rows_affected())
    }
}

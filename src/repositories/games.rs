use crate::entities::games::Game;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

const TABLE_NAME: &str = "games";
const READ_FIELDS: &str = concat!(
    "game_id, contest_id, status, team_type, started_at, ended_at, round, match_number, ",
    "bracket_position, next_game_id, scheduled_start_time, detection_window_minutes, ",
    "detected_match_id, detection_status, created_at"
);

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create(&self, game: Game) -> anyhow::Result<Game>;
    /// Inserts all games atomically, returning them with their ids in input order.
    async fn create_many(&self, games: Vec<Game>) -> anyhow::Result<Vec<Game>>;
    async fn fetch_one(&self, game_id: i64) -> anyhow::Result<Option<Game>>;
    async fn fetch_by_contest(&self, contest_id: i64) -> anyhow::Result<Vec<Game>>;
    async fn fetch_by_contest_and_round(
        &self,
        contest_id: i64,
        round: i32,
    ) -> anyhow::Result<Vec<Game>>;
    async fn fetch_ready_to_activate(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Game>>;
    async fn fetch_by_detection_status(&self, detection_status: &str)
    -> anyhow::Result<Vec<Game>>;
    async fn count_by_contest(&self, contest_id: i64) -> anyhow::Result<i64>;
    async fn update(&self, game: &Game) -> anyhow::Result<()>;
    async fn update_many(&self, games: &[Game]) -> anyhow::Result<()>;
    async fn delete(&self, game_id: i64) -> anyhow::Result<bool>;
}

const INSERT_QUERY: &str = const_str::concat!(
    "INSERT INTO ",
    TABLE_NAME,
    " (contest_id, status, team_type, started_at, ended_at, round, match_number, ",
    "bracket_position, next_game_id, scheduled_start_time, detection_window_minutes, ",
    "detected_match_id, detection_status, created_at) ",
    "VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
);

const UPDATE_QUERY: &str = const_str::concat!(
    "UPDATE ",
    TABLE_NAME,
    " SET status = ?, started_at = ?, ended_at = ?, next_game_id = ?, ",
    "scheduled_start_time = ?, detection_window_minutes = ?, detected_match_id = ?, ",
    "detection_status = ? WHERE game_id = ?"
);

fn bind_insert<'q>(
    game: &'q Game,
) -> sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments> {
    sqlx::query(INSERT_QUERY)
        .bind(game.contest_id)
        .bind(&game.status)
        .bind(game.team_type)
        .bind(game.started_at)
        .bind(game.ended_at)
        .bind(game.round)
        .bind(game.match_number)
        .bind(game.bracket_position)
        .bind(game.next_game_id)
        .bind(game.scheduled_start_time)
        .bind(game.detection_window_minutes)
        .bind(&game.detected_match_id)
        .bind(&game.detection_status)
        .bind(game.created_at)
}

pub(crate) fn bind_update<'q>(
    game: &'q Game,
) -> sqlx::query::Query<'q, MySql, sqlx::mysql::MySqlArguments> {
    sqlx::query(UPDATE_QUERY)
        .bind(&game.status)
        .bind(game.started_at)
        .bind(game.ended_at)
        .bind(game.next_game_id)
        .bind(game.scheduled_start_time)
        .bind(game.detection_window_minutes)
        .bind(&game.detected_match_id)
        .bind(&game.detection_status)
        .bind(game.game_id)
}

#[async_trait]
impl GameRepository for Pool<MySql> {
    async fn create(&self, mut game: Game) -> anyhow::Result<Game> {
        let res = bind_insert(&game).execute(self).await?;
        game.game_id = res.last_insert_id() as _;
        Ok(game)
    }

    async fn create_many(&self, games: Vec<Game>) -> anyhow::Result<Vec<Game>> {
        let mut tx = self.begin().await?;
        let mut created = Vec::with_capacity(games.len());
        for mut game in games {
            let res = bind_insert(&game).execute(&mut *tx).await?;
            game.game_id = res.last_insert_id() as _;
            created.push(game);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn fetch_one(&self, game_id: i64) -> anyhow::Result<Option<Game>> {
        let query = format!("SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE game_id = ?");
        Ok(sqlx::query_as(&query)
            .bind(game_id)
            .fetch_optional(self)
            .await?)
    }

    async fn fetch_by_contest(&self, contest_id: i64) -> anyhow::Result<Vec<Game>> {
        let query = format!(
            "SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE contest_id = ? ORDER BY bracket_position, game_id"
        );
        Ok(sqlx::query_as(&query)
            .bind(contest_id)
            .fetch_all(self)
            .await?)
    }

    async fn fetch_by_contest_and_round(
        &self,
        contest_id: i64,
        round: i32,
    ) -> anyhow::Result<Vec<Game>> {
        let query = format!(
            "SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE contest_id = ? AND round = ? ORDER BY match_number"
        );
        Ok(sqlx::query_as(&query)
            .bind(contest_id)
            .bind(round)
            .fetch_all(self)
            .await?)
    }

    async fn fetch_ready_to_activate(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Game>> {
        let query = format!(
            "SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE status = 'PENDING' AND scheduled_start_time <= ?"
        );
        Ok(sqlx::query_as(&query).bind(now).fetch_all(self).await?)
    }

    async fn fetch_by_detection_status(
        &self,
        detection_status: &str,
    ) -> anyhow::Result<Vec<Game>> {
        let query = format!("SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE detection_status = ?");
        Ok(sqlx::query_as(&query)
            .bind(detection_status)
            .fetch_all(self)
            .await?)
    }

    async fn count_by_contest(&self, contest_id: i64) -> anyhow::Result<i64> {
        const QUERY: &str =
            const_str::concat!("SELECT COUNT(*) FROM ", TABLE_NAME, " WHERE contest_id = ?");
        Ok(sqlx::query_scalar(QUERY)
            .bind(contest_id)
            .fetch_one(self)
            .await?)
    }

    async fn update(&self, game: &Game) -> anyhow::Result<()> {
        bind_update(game).execute(self).await?;
        Ok(())
    }

    async fn update_many(&self, games: &[Game]) -> anyhow::Result<()> {
        let mut tx = self.begin().await?;
        for game in games {
            bind_update(game).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, game_id: i64) -> anyhow::Result<bool> {
        const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE game_id = ?");
        let res = sqlx::query(QUERY).bind(game_id).execute(self).await?;
        Ok(res.rows_affected() > 0)
    }
}

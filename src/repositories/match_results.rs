use crate::entities::match_results::{GameOutcome, MatchPlayerStat, MatchResult};
use crate::repositories::{game_teams, games};
use async_trait::async_trait;
use sqlx::{MySql, Pool};

const TABLE_NAME: &str = "match_results";
const STATS_TABLE_NAME: &str = "match_player_stats";

const INSERT_QUERY: &str = const_str::concat!(
    "INSERT INTO ",
    TABLE_NAME,
    " (game_id, provider_match_id, map_name, rounds_played, winner_team_id, ",
    "loser_team_id, winner_score, loser_score, match_started_at, duration_seconds, ",
    "created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
);

const STATS_INSERT_QUERY: &str = const_str::concat!(
    "INSERT INTO ",
    STATS_TABLE_NAME,
    " (match_result_id, user_id, team_id, agent, kills, deaths, assists, score, ",
    "headshots, bodyshots, legshots) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
);

#[async_trait]
pub trait MatchResultRepository: Send + Sync {
    /// Stores the result, its player lines, both grades, the finished game row and the
    /// winner's next seat in one transaction.
    async fn record_outcome(&self, outcome: GameOutcome) -> anyhow::Result<MatchResult>;
    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Option<MatchResult>>;
    async fn fetch_player_stats(
        &self,
        match_result_id: i64,
    ) -> anyhow::Result<Vec<MatchPlayerStat>>;
}

#[async_trait]
impl MatchResultRepository for Pool<MySql> {
    async fn record_outcome(&self, outcome: GameOutcome) -> anyhow::Result<MatchResult> {
        let GameOutcome {
            mut result,
            stats,
            graded,
            game,
            advanced,
        } = outcome;

        let mut tx = self.begin().await?;
        let res = sqlx::query(INSERT_QUERY)
            .bind(result.game_id)
            .bind(&result.provider_match_id)
            .bind(&result.map_name)
            .bind(result.rounds_played)
            .bind(result.winner_team_id)
            .bind(result.loser_team_id)
            .bind(result.winner_score)
            .bind(result.loser_score)
            .bind(result.match_started_at)
            .bind(result.duration_seconds)
            .bind(result.created_at)
            .execute(&mut *tx)
            .await?;
        result.match_result_id = res.last_insert_id() as _;

        for stat in stats {
            sqlx::query(STATS_INSERT_QUERY)
                .bind(result.match_result_id)
                .bind(stat.user_id)
                .bind(stat.team_id)
                .bind(&stat.agent)
                .bind(stat.kills)
                .bind(stat.deaths)
                .bind(stat.assists)
                .bind(stat.score)
                .bind(stat.headshots)
                .bind(stat.bodyshots)
                .bind(stat.legshots)
                .execute(&mut *tx)
                .await?;
        }
        for game_team in &graded {
            game_teams::bind_grade(game_team).execute(&mut *tx).await?;
        }
        games::bind_update(&game).execute(&mut *tx).await?;
        if let Some(seat) = &advanced {
            game_teams::bind_insert(seat).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Option<MatchResult>> {
        const QUERY: &str = const_str::concat!(
            "SELECT match_result_id, game_id, provider_match_id, map_name, rounds_played, ",
            "winner_team_id, loser_team_id, winner_score, loser_score, match_started_at, ",
            "duration_seconds, created_at FROM ",
            TABLE_NAME,
            " WHERE game_id = ?"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(game_id)
            .fetch_optional(self)
            .await?)
    }

    async fn fetch_player_stats(
        &self,
        match_result_id: i64,
    ) -> anyhow::Result<Vec<MatchPlayerStat>> {
        const QUERY: &str = const_str::concat!(
            "SELECT match_player_stat_id, match_result_id, user_id, team_id, agent, kills, ",
            "deaths, assists, score, headshots, bodyshots, legshots FROM ",
            STATS_TABLE_NAME,
            " WHERE match_result_id = ?"
        );
        Ok(sqlx::query_as(QUERY)
            .bind(match_result_id)
            .fetch_all(self)
            .await?)
    }
}

use crate::adapters::match_history::{
    MatchDetail, MatchHistoryProvider, MatchPlayer, MatchSide, RecentMatch,
};
use crate::common::error::{AppError, ServiceResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): base, 2*base, 4*base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay * factor
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// HenrikDev-compatible match history client.
#[derive(Debug, Clone)]
pub struct HenrikClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct HenrikMatch {
    metadata: HenrikMetadata,
    players: HenrikPlayers,
    teams: Option<HenrikTeams>,
}

#[derive(Deserialize)]
struct HenrikMetadata {
    #[serde(rename = "matchid")]
    match_id: String,
    map: String,
    mode: String,
    /// unix seconds
    game_start: i64,
    /// seconds
    game_length: i64,
    #[serde(default)]
    rounds_played: i32,
}

#[derive(Deserialize)]
struct HenrikPlayers {
    all_players: Vec<HenrikPlayer>,
}

#[derive(Deserialize)]
struct HenrikPlayer {
    name: String,
    tag: String,
    team: String,
    character: String,
    stats: HenrikStats,
}

#[derive(Deserialize)]
struct HenrikStats {
    score: i32,
    kills: i32,
    deaths: i32,
    assists: i32,
    headshots: i32,
    bodyshots: i32,
    legshots: i32,
}

#[derive(Deserialize)]
struct HenrikTeams {
    red: Option<HenrikTeam>,
    blue: Option<HenrikTeam>,
}

#[derive(Deserialize)]
struct HenrikTeam {
    has_won: Option<bool>,
    rounds_won: Option<i32>,
}

fn timestamp(unix_seconds: i64) -> ServiceResult<DateTime<Utc>> {
    DateTime::from_timestamp(unix_seconds, 0).ok_or(AppError::ProviderUnavailable)
}

impl HenrikMatch {
    fn into_recent(self) -> ServiceResult<RecentMatch> {
        Ok(RecentMatch {
            started_at: timestamp(self.metadata.game_start)?,
            match_id: self.metadata.match_id,
            map_name: self.metadata.map,
            mode: self.metadata.mode,
            duration_seconds: self.metadata.game_length,
        })
    }

    fn into_detail(self) -> ServiceResult<MatchDetail> {
        let mut sides = vec![];
        if let Some(teams) = self.teams {
            for (side_id, team) in [("red", teams.red), ("blue", teams.blue)] {
                if let Some(team) = team {
                    sides.push(MatchSide {
                        side_id: side_id.to_owned(),
                        has_won: team.has_won.unwrap_or(false),
                        rounds_won: team.rounds_won.unwrap_or(0),
                    });
                }
            }
        }
        let players = self
            .players
            .all_players
            .into_iter()
            .map(|player| MatchPlayer {
                name: player.name,
                tag: player.tag,
                side_id: player.team.to_lowercase(),
                agent: player.character,
                kills: player.stats.kills,
                deaths: player.stats.deaths,
                assists: player.stats.assists,
                score: player.stats.score,
                headshots: player.stats.headshots,
                bodyshots: player.stats.bodyshots,
                legshots: player.stats.legshots,
            })
            .collect();
        Ok(MatchDetail {
            started_at: timestamp(self.metadata.game_start)?,
            match_id: self.metadata.match_id,
            map_name: self.metadata.map,
            mode: self.metadata.mode,
            duration_seconds: self.metadata.game_length,
            rounds_played: self.metadata.rounds_played,
            sides,
            players,
        })
    }
}

impl HenrikClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key,
            retry,
        })
    }

    fn make_url(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Unexpected)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GETs `url`, retrying 429s, 5xx and transport errors with exponential backoff.
    /// A 404 is final and reported as `not_found`.
    async fn get<T: DeserializeOwned>(&self, url: Url, not_found: AppError) -> ServiceResult<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut request = self.client.get(url.clone());
            if let Some(api_key) = &self.api_key {
                request = request.header(AUTHORIZATION, api_key);
            }

            let error = match request.send().await {
                Ok(response) => match response.status() {
                    StatusCode::OK => {
                        return match response.json::<Envelope<T>>().await {
                            Ok(envelope) => Ok(envelope.data),
                            Err(e) => {
                                warn!(url = url.as_str(), "Malformed provider response: {e}");
                                Err(AppError::ProviderUnavailable)
                            }
                        };
                    }
                    StatusCode::NOT_FOUND => return Err(not_found),
                    StatusCode::TOO_MANY_REQUESTS => {
                        warn!(url = url.as_str(), attempt, "Provider rate limited request");
                        AppError::ProviderRateLimited
                    }
                    status => {
                        warn!(url = url.as_str(), attempt, %status, "Provider request failed");
                        AppError::ProviderUnavailable
                    }
                },
                Err(e) => {
                    warn!(url = url.as_str(), attempt, "Provider request errored: {e}");
                    AppError::ProviderUnavailable
                }
            };

            if attempt >= self.retry.max_attempts {
                return Err(error);
            }
            tokio::time::sleep(self.retry.delay_after(attempt)).await;
        }
    }
}

#[async_trait]
impl MatchHistoryProvider for HenrikClient {
    async fn fetch_recent_matches(
        &self,
        region: &str,
        name: &str,
        tag: &str,
    ) -> ServiceResult<Vec<RecentMatch>> {
        let url = self.make_url(&["valorant", "v3", "matches", region, name, tag])?;
        let matches: Vec<HenrikMatch> = self.get(url, AppError::ProviderPlayerNotFound).await?;
        matches.into_iter().map(HenrikMatch::into_recent).collect()
    }

    async fn fetch_match_detail(&self, match_id: &str) -> ServiceResult<MatchDetail> {
        let url = self.make_url(&["valorant", "v2", "match", match_id])?;
        let detail: HenrikMatch = self.get(url, AppError::ProviderMatchNotFound).await?;
        detail.into_detail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const MATCH_JSON: &str = r#"{
        "metadata": {
            "matchid": "abc-123",
            "map": "Ascent",
            "mode": "Custom Game",
            "game_start": 1767225600,
            "game_length": 2100,
            "rounds_played": 22
        },
        "players": {
            "all_players": [
                {"name": "Alice", "tag": "EUW", "team": "Red", "character": "Jett",
                 "stats": {"score": 300, "kills": 20, "deaths": 10, "assists": 4,
                           "headshots": 12, "bodyshots": 30, "legshots": 2}},
                {"name": "Carol", "tag": "EUW", "team": "Blue", "character": "Sage",
                 "stats": {"score": 150, "kills": 9, "deaths": 18, "assists": 7,
                           "headshots": 3, "bodyshots": 25, "legshots": 5}}
            ]
        },
        "teams": {
            "red": {"has_won": true, "rounds_won": 13, "rounds_lost": 9},
            "blue": {"has_won": false, "rounds_won": 9, "rounds_lost": 13}
        }
    }"#;

    fn client(server: &Server) -> HenrikClient {
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };
        HenrikClient::new(&server.url(), Some("key".to_owned()), Duration::from_secs(5), retry)
            .unwrap()
    }

    #[test]
    fn backoff_doubles() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay_after(1), Duration::from_secs(1));
        assert_eq!(retry.delay_after(2), Duration::from_secs(2));
        assert_eq!(retry.delay_after(3), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn recent_matches_are_parsed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/valorant/v3/matches/eu/Alice/EUW")
            .match_header("authorization", "key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"status": 200, "data": [{MATCH_JSON}]}}"#))
            .create_async()
            .await;

        let matches = client(&server)
            .fetch_recent_matches("eu", "Alice", "EUW")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_id, "abc-123");
        assert_eq!(matches[0].started_at.timestamp(), 1767225600);
    }

    #[tokio::test]
    async fn match_detail_maps_sides_and_players() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/valorant/v2/match/abc-123")
            .with_status(200)
            .with_body(format!(r#"{{"status": 200, "data": {MATCH_JSON}}}"#))
            .create_async()
            .await;

        let detail = client(&server).fetch_match_detail("abc-123").await.unwrap();
        assert_eq!(detail.rounds_played, 22);
        assert_eq!(detail.sides.len(), 2);
        assert!(detail.side("red").unwrap().has_won);
        assert_eq!(detail.players[1].side_id, "blue");
        assert_eq!(detail.players[0].agent, "Jett");
    }

    #[tokio::test]
    async fn missing_player_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/valorant/v3/matches/eu/Ghost/0000")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let result = client(&server)
            .fetch_recent_matches("eu", "Ghost", "0000")
            .await;
        mock.assert_async().await;
        assert!(matches!(result, Err(AppError::ProviderPlayerNotFound)));
    }

    #[tokio::test]
    async fn rate_limits_exhaust_retries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/valorant/v3/matches/eu/Alice/EUW")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let result = client(&server)
            .fetch_recent_matches("eu", "Alice", "EUW")
            .await;
        mock.assert_async().await;
        assert!(matches!(result, Err(AppError::ProviderRateLimited)));
    }

    #[tokio::test]
    async fn server_errors_surface_as_unavailable() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/valorant/v2/match/abc-123")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = client(&server).fetch_match_detail("abc-123").await;
        mock.assert_async().await;
        assert!(matches!(result, Err(AppError::ProviderUnavailable)));
    }
}

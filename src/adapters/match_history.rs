use crate::common::error::ServiceResult;
use crate::models::match_detection::AccountHandle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RecentMatch {
    pub match_id: String,
    pub map_name: String,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// One of the two opposing groupings inside a provider match.
#[derive(Debug, Clone)]
pub struct MatchSide {
    pub side_id: String,
    pub has_won: bool,
    pub rounds_won: i32,
}

#[derive(Debug, Clone)]
pub struct MatchPlayer {
    pub name: String,
    pub tag: String,
    pub side_id: String,
    pub agent: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub score: i32,
    pub headshots: i32,
    pub bodyshots: i32,
    pub legshots: i32,
}

impl MatchPlayer {
    pub fn handle(&self) -> AccountHandle {
        AccountHandle::new(&self.name, &self.tag)
    }
}

#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub match_id: String,
    pub map_name: String,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub rounds_played: i32,
    pub sides: Vec<MatchSide>,
    pub players: Vec<MatchPlayer>,
}

impl MatchDetail {
    pub fn side(&self, side_id: &str) -> Option<&MatchSide> {
        self.sides
            .iter()
            .find(|side| side.side_id.eq_ignore_ascii_case(side_id))
    }

    pub fn player(&self, handle: &AccountHandle) -> Option<&MatchPlayer> {
        self.players.iter().find(|player| player.handle() == *handle)
    }
}

/// Read access to a third-party match history service.
///
/// A missing player is reported as `AppError::ProviderPlayerNotFound`; rate limiting and
/// outages that survive retries surface as `ProviderRateLimited` / `ProviderUnavailable`.
#[async_trait]
pub trait MatchHistoryProvider: Send + Sync {
    async fn fetch_recent_matches(
        &self,
        region: &str,
        name: &str,
        tag: &str,
    ) -> ServiceResult<Vec<RecentMatch>>;

    async fn fetch_match_detail(&self, match_id: &str) -> ServiceResult<MatchDetail>;
}

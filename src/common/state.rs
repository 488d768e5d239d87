use crate::adapters::henrik::HenrikClient;
use crate::adapters::match_history::MatchHistoryProvider;
use crate::common::context::Context;
use crate::repositories::accounts::AccountRepository;
use crate::repositories::contests::ContestRepository;
use crate::repositories::game_events::{EventPublisher, RedisEventPublisher};
use crate::repositories::game_teams::GameTeamRepository;
use crate::repositories::games::GameRepository;
use crate::repositories::locks::{DistributedLock, RedisLock};
use crate::repositories::match_results::MatchResultRepository;
use crate::repositories::teams::TeamRepository;
use sqlx::{MySql, Pool};

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<MySql>,
    pub locks: RedisLock,
    pub events: RedisEventPublisher,
    pub match_history: HenrikClient,
    pub region: String,
}

impl Context for AppState {
    fn games(&self) -> &dyn GameRepository {
        &self.db
    }

    fn game_teams(&self) -> &dyn GameTeamRepository {
        &self.db
    }

    fn match_results(&self) -> &dyn MatchResultRepository {
        &self.db
    }

    fn teams(&self) -> &dyn TeamRepository {
        &self.db
    }

    fn accounts(&self) -> &dyn AccountRepository {
        &self.db
    }

    fn contests(&self) -> &dyn ContestRepository {
        &self.db
    }

    fn match_history(&self) -> &dyn MatchHistoryProvider {
        &self.match_history
    }

    fn events(&self) -> &dyn EventPublisher {
        &self.events
    }

    fn locks(&self) -> &dyn DistributedLock {
        &self.locks
    }

    fn region(&self) -> &str {
        &self.region
    }
}

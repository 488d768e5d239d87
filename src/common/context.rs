use crate::adapters::match_history::MatchHistoryProvider;
use crate::repositories::accounts::AccountRepository;
use crate::repositories::contests::ContestRepository;
use crate::repositories::game_events::EventPublisher;
use crate::repositories::game_teams::GameTeamRepository;
use crate::repositories::games::GameRepository;
use crate::repositories::locks::DistributedLock;
use crate::repositories::match_results::MatchResultRepository;
use crate::repositories::teams::TeamRepository;

/// Every port the use cases depend on.
pub trait Context: Sync + Send {
    fn games(&self) -> &dyn GameRepository;
    fn game_teams(&self) -> &dyn GameTeamRepository;
    fn match_results(&self) -> &dyn MatchResultRepository;
    fn teams(&self) -> &dyn TeamRepository;
    fn accounts(&self) -> &dyn AccountRepository;
    fn contests(&self) -> &dyn ContestRepository;
    fn match_history(&self) -> &dyn MatchHistoryProvider;
    fn events(&self) -> &dyn EventPublisher;
    fn locks(&self) -> &dyn DistributedLock;

    /// Region passed to the match history provider.
    fn region(&self) -> &str;
}

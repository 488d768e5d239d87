pub mod brackets;
pub mod detection;
pub mod game_events;
pub mod game_teams;
pub mod games;
pub mod scheduler;
pub mod tournament_results;

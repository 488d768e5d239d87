pub mod accounts;
pub mod contests;
pub mod game_events;
pub mod game_teams;
pub mod games;
pub mod locks;
pub mod match_results;
pub mod teams;

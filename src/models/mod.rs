pub mod brackets;
pub mod game_teams;
pub mod games;
pub mod match_detection;
pub mod tournament_results;

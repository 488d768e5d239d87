pub mod henrik;
pub mod match_history;

pub mod game_scheduler;

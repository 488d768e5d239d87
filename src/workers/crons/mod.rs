pub mod activation_cron;
pub mod detection_cron;
pub mod tasks;

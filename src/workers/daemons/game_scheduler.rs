use crate::common::init;
use crate::cron_tasks;
use crate::settings::AppSettings;
use crate::usecases::scheduler::{run_activation_pass, run_detection_pass};
use std::convert::Infallible;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Drives both scheduler passes in-process, for deployments without an external trigger.
/// Each pass still takes its distributed lock, so several instances may run this.
pub async fn serve(settings: &AppSettings) -> anyhow::Result<Infallible> {
    let state = init::initialize_state(settings).await?;

    let mut activation = interval(settings.activation_interval);
    activation.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut detection = interval(settings.detection_interval);
    detection.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        activation_interval = ?settings.activation_interval,
        detection_interval = ?settings.detection_interval,
        "Game scheduler started"
    );
    loop {
        tokio::select! {
            _ = activation.tick() => {
                let ctx = state.clone();
                tokio::spawn(async move {
                    cron_tasks!(&ctx, run_activation_pass);
                });
            }
            _ = detection.tick() => {
                let ctx = state.clone();
                tokio::spawn(async move {
                    cron_tasks!(&ctx, run_detection_pass);
                });
            }
        }
    }
}

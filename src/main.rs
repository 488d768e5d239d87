use bracket_service::common::init;
use bracket_service::settings::AppSettings;
use bracket_service::workers::{crons, daemons};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "activation-cron" => crons::activation_cron::serve(settings).await,
        "detection-cron" => crons::detection_cron::serve(settings).await,
        "scheduler" => match daemons::game_scheduler::serve(settings).await? {},
        component => anyhow::bail!("Unknown app component: {component}"),
    }
}

use crate::common::init;
use crate::cron_tasks;
use crate::settings::AppSettings;
use crate::usecases::scheduler::run_activation_pass;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let ctx = init::initialize_state(settings).await?;
    cron_tasks! {
        &ctx,
        run_activation_pass,
    }
    Ok(())
}

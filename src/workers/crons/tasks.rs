/// Runs each scheduler pass against `$ctx` in order, logging how long it took and what
/// it reported. Failures are logged and never abort the remaining tasks.
#[macro_export]
macro_rules! cron_tasks {
    ($ctx:expr, $($t:path),* $(,)?) => {
        $({
            const TASK_NAME: &str = const_str::convert_ascii_case!(upper_camel, stringify!($t));
            let started = std::time::Instant::now();
            tracing::info!(task = TASK_NAME, "Starting task");
            match ($t)($ctx).await {
                Ok(Some(report)) => tracing::info!(
                    task = TASK_NAME,
                    elapsed = ?started.elapsed(),
                    processed = report.processed,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Completed task",
                ),
                Ok(None) => tracing::info!(task = TASK_NAME, "Lock held elsewhere, task skipped"),
                Err(e) => tracing::error!(task = TASK_NAME, "Error occurred in task: {e}"),
            }
        })*
    };
}

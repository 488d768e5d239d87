use crate::common::context::Context;
use crate::common::error::{ServiceResult, unexpected};
use crate::models::games::DetectionStatus;
use crate::usecases::detection::{self, DetectionOutcome};
use crate::usecases::games;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

pub const ACTIVATION_LOCK_KEY: &str = "scheduler:lock:activation";
pub const ACTIVATION_LOCK_TTL: Duration = Duration::from_secs(50);
pub const DETECTION_LOCK_KEY: &str = "scheduler:lock:detection";
pub const DETECTION_LOCK_TTL: Duration = Duration::from_secs(120);

/// The provider lags real matches by about this long.
pub const PROVIDER_PROPAGATION_DELAY_MINUTES: i64 = 30;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Acquires `key` for one pass. `false` means another instance holds it.
pub async fn acquire_lock<C: Context>(ctx: &C, key: &str, ttl: Duration) -> ServiceResult<bool> {
    match ctx.locks().try_acquire(key, ttl).await {
        Ok(acquired) => Ok(acquired),
        Err(e) => unexpected(e),
    }
}

pub async fn release_lock<C: Context>(ctx: &C, key: &str) {
    if let Err(e) = ctx.locks().release(key).await {
        error!(key, "Failed to release scheduler lock: {e:?}");
    }
}

/// Activates every due game. Returns `None` when another instance holds the pass lock.
pub async fn run_activation_pass<C: Context>(ctx: &C) -> ServiceResult<Option<PassReport>> {
    run_activation_pass_at(ctx, Utc::now()).await
}

pub async fn run_activation_pass_at<C: Context>(
    ctx: &C,
    now: DateTime<Utc>,
) -> ServiceResult<Option<PassReport>> {
    if !acquire_lock(ctx, ACTIVATION_LOCK_KEY, ACTIVATION_LOCK_TTL).await? {
        debug!("Activation pass already running elsewhere");
        return Ok(None);
    }
    let report = activate_due_games(ctx, now).await;
    release_lock(ctx, ACTIVATION_LOCK_KEY).await;
    report.map(Some)
}

async fn activate_due_games<C: Context>(
    ctx: &C,
    now: DateTime<Utc>,
) -> ServiceResult<PassReport> {
    let mut report = PassReport::default();
    for game in games::fetch_ready_to_activate(ctx, now).await? {
        let game_id = game.game_id;
        match games::activate(ctx, game, now).await {
            Ok(_) => report.processed += 1,
            Err(e) => {
                report.failed += 1;
                error!(game_id, "Failed to activate game: {e}");
            }
        }
    }
    if report.processed + report.failed > 0 {
        info!(
            processed = report.processed,
            failed = report.failed,
            "Activation pass finished"
        );
    }
    Ok(report)
}

/// Runs detection for every DETECTING game past the propagation delay. Returns `None`
/// when another instance holds the pass lock.
pub async fn run_detection_pass<C: Context>(ctx: &C) -> ServiceResult<Option<PassReport>> {
    run_detection_pass_at(ctx, Utc::now()).await
}

pub async fn run_detection_pass_at<C: Context>(
    ctx: &C,
    now: DateTime<Utc>,
) -> ServiceResult<Option<PassReport>> {
    if !acquire_lock(ctx, DETECTION_LOCK_KEY, DETECTION_LOCK_TTL).await? {
        debug!("Detection pass already running elsewhere");
        return Ok(None);
    }
    let report = detect_pending_games(ctx, now).await;
    release_lock(ctx, DETECTION_LOCK_KEY).await;
    report.map(Some)
}

async fn detect_pending_games<C: Context>(
    ctx: &C,
    now: DateTime<Utc>,
) -> ServiceResult<PassReport> {
    let delay = TimeDelta::minutes(PROVIDER_PROPAGATION_DELAY_MINUTES);
    let mut report = PassReport::default();
    for game in games::fetch_by_detection_status(ctx, DetectionStatus::Detecting).await? {
        let game_id = game.game_id;
        if game
            .scheduled_start_time
            .is_none_or(|scheduled| scheduled > now - delay)
        {
            report.skipped += 1;
            continue;
        }

        match detection::detect_game_at(ctx, game_id, now).await {
            Ok(DetectionOutcome::Detected { provider_match_id }) => {
                report.processed += 1;
                debug!(game_id, match_id = %provider_match_id, "Game detected");
            }
            Ok(outcome) => {
                report.processed += 1;
                debug!(game_id, ?outcome, "Detection attempted");
            }
            Err(e) => {
                report.failed += 1;
                error!(game_id, "Failed to detect game: {e}");
            }
        }
    }
    if report.processed + report.failed > 0 {
        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "Detection pass finished"
        );
    }
    Ok(report)
}

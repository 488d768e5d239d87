use crate::adapters::henrik::{HenrikClient, RetryPolicy};
use crate::common::redis_pool::{self, RedisPool};
use crate::common::state::AppState;
use crate::repositories::game_events::RedisEventPublisher;
use crate::repositories::locks::RedisLock;
use crate::settings::AppSettings;
use redis::{AsyncConnectionConfig, Commands};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let redis = initialize_redis(settings)?;
    let match_history = initialize_match_history(settings)?;
    Ok(AppState {
        db,
        locks: RedisLock::new(redis.clone()),
        events: RedisEventPublisher::new(redis),
        match_history,
        region: settings.match_history_region.clone(),
    })
}

pub fn initialize_db(settings: &AppSettings) -> impl Future<Output = sqlx::Result<Pool<MySql>>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url)
}

pub fn initialize_redis(settings: &AppSettings) -> anyhow::Result<RedisPool> {
    let redis_client = redis::Client::open(settings.redis_url.as_str())?;
    let mut conn = redis_client.get_connection_with_timeout(settings.redis_wait_timeout)?;
    let _: () = conn.ping()?;
    let redis_cfg = AsyncConnectionConfig::new()
        .set_connection_timeout(settings.redis_connection_timeout)
        .set_response_timeout(settings.redis_response_timeout);
    redis_pool::build(
        redis_client,
        redis_cfg,
        settings.redis_max_connections,
        settings.redis_wait_timeout,
    )
}

pub fn initialize_match_history(settings: &AppSettings) -> anyhow::Result<HenrikClient> {
    let retry = RetryPolicy {
        max_attempts: settings.match_history_max_attempts,
        base_delay: settings.match_history_backoff,
    };
    HenrikClient::new(
        &settings.match_history_base_url,
        settings.match_history_api_key.clone(),
        settings.match_history_timeout,
        retry,
    )
}

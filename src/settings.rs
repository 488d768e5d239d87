use crate::common::env::FromEnv;
use std::env;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,

    pub database_url: String,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub redis_url: String,
    pub redis_max_connections: usize,
    pub redis_connection_timeout: Duration,
    pub redis_response_timeout: Duration,
    pub redis_wait_timeout: Duration,

    pub match_history_base_url: String,
    pub match_history_api_key: Option<String>,
    pub match_history_region: String,
    pub match_history_max_attempts: u32,
    pub match_history_backoff: Duration,
    pub match_history_timeout: Duration,

    pub activation_interval: Duration,
    pub detection_interval: Duration,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT")?;
        let level = Level::from_env("LOG_LEVEL")?;

        let database_url = env::var("DATABASE_URL")?;
        let db_max_connections = usize::from_env("DB_MAX_CONNECTIONS")?;
        let db_wait_timeout_secs = u64::from_env("DB_WAIT_TIMEOUT_SECS")?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let redis_url = env::var("REDIS_URL")?;
        let redis_max_connections = usize::from_env("REDIS_MAX_CONNECTIONS")?;
        let redis_connection_timeout_secs = u64::from_env("REDIS_CONNECTION_TIMEOUT_SECS")?;
        let redis_connection_timeout = Duration::from_secs(redis_connection_timeout_secs);
        let redis_response_timeout_secs = u64::from_env("REDIS_RESPONSE_TIMEOUT_SECS")?;
        let redis_response_timeout = Duration::from_secs(redis_response_timeout_secs);
        let redis_wait_timeout_secs = u64::from_env("REDIS_WAIT_TIMEOUT_SECS")?;
        let redis_wait_timeout = Duration::from_secs(redis_wait_timeout_secs);

        let match_history_base_url = env::var("MATCH_HISTORY_BASE_URL")?;
        let match_history_api_key = env::var("MATCH_HISTORY_API_KEY").ok();
        let match_history_region = env::var("MATCH_HISTORY_REGION")?;
        let match_history_max_attempts = u32::from_env_or("MATCH_HISTORY_MAX_ATTEMPTS", 3)?;
        let match_history_backoff_ms = u64::from_env_or("MATCH_HISTORY_BACKOFF_MS", 1000)?;
        let match_history_backoff = Duration::from_millis(match_history_backoff_ms);
        let match_history_timeout_secs = u64::from_env_or("MATCH_HISTORY_TIMEOUT_SECS", 10)?;
        let match_history_timeout = Duration::from_secs(match_history_timeout_secs);

        let activation_interval_secs = u64::from_env_or("ACTIVATION_INTERVAL_SECS", 60)?;
        let activation_interval = Duration::from_secs(activation_interval_secs);
        let detection_interval_secs = u64::from_env_or("DETECTION_INTERVAL_SECS", 180)?;
        let detection_interval = Duration::from_secs(detection_interval_secs);

        Ok(AppSettings {
            app_component,
            level,

            database_url,
            db_max_connections,
            db_wait_timeout,

            redis_url,
            redis_max_connections,
            redis_connection_timeout,
            redis_response_timeout,
            redis_wait_timeout,

            match_history_base_url,
            match_history_api_key,
            match_history_region,
            match_history_max_attempts,
            match_history_backoff,
            match_history_timeout,

            activation_interval,
            detection_interval,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}

use deadpool::Runtime;
use deadpool::managed::{Manager, Metrics, Pool, RecycleResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncConnectionConfig, RedisError, RedisResult};
use std::time::Duration;

pub type RedisPool = Pool<RedisPoolManager>;

pub struct RedisPoolManager {
    client: redis::Client,
    config: AsyncConnectionConfig,
}

impl Manager for RedisPoolManager {
    type Type = MultiplexedConnection;
    type Error = RedisError;

    async fn create(&self) -> RedisResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection_with_config(&self.config)
            .await
    }

    /// Connections that stop answering PING are dropped instead of handed out.
    async fn recycle(
        &self,
        conn: &mut MultiplexedConnection,
        _metrics: &Metrics,
    ) -> RecycleResult<RedisError> {
        redis::cmd("PING").query_async::<()>(conn).await?;
        Ok(())
    }
}

/// Pool shared by the scheduler lock and the event publisher.
pub fn build(
    client: redis::Client,
    config: AsyncConnectionConfig,
    max_size: usize,
    wait_timeout: Duration,
) -> anyhow::Result<RedisPool> {
    let manager = RedisPoolManager { client, config };
    Ok(RedisPool::builder(manager)
        .max_size(max_size)
        .wait_timeout(Some(wait_timeout))
        .runtime(Runtime::Tokio1)
        .build()?)
}

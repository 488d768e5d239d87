use crate::common::redis_pool::RedisPool;
use async_trait::async_trait;
use std::ops::DerefMut;
use std::time::Duration;
use uuid::Uuid;

/// Cross-instance mutual exclusion with self-expiring locks.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Takes `key` for `ttl` if nobody holds it.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> anyhow::Result<bool>;
    async fn release(&self, key: &str) -> anyhow::Result<()>;
}

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

#[derive(Clone)]
pub struct RedisLock {
    redis: RedisPool,
    holder: String,
}

impl RedisLock {
    pub fn new(redis: RedisPool) -> Self {
        Self {
            redis,
            holder: Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> anyhow::Result<bool> {
        let mut redis = self.redis.get().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(&self.holder)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(redis.deref_mut())
            .await?;
        Ok(reply.is_some())
    }

    async fn release(&self, key: &str) -> anyhow::Result<()> {
        let mut redis = self.redis.get().await?;
        // only the holder may delete; an expired lock may already belong to another instance
        let script = redis::Script::new(RELEASE_SCRIPT);
        let _: i64 = script
            .key(key)
            .arg(&self.holder)
            .invoke_async(redis.deref_mut())
            .await?;
        Ok(())
    }
}

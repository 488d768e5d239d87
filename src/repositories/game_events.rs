use crate::common::redis_pool::RedisPool;
use crate::entities::game_events::{GameEvent, MatchDetectedEvent};
use redis::AsyncCommands;
use serde::Serialize;
use std::ops::DerefMut;
use tracing::error;

const GAME_EVENTS_CHANNEL: &str = "bracket:game_events";
const MATCH_DETECTED_CHANNEL: &str = "bracket:match_detected";

/// Fire-and-forget event sink. Implementations must never block or fail the caller.
pub trait EventPublisher: Send + Sync {
    fn publish_game_event(&self, event: GameEvent);
    fn publish_match_detected(&self, event: MatchDetectedEvent);
}

#[derive(Clone)]
pub struct RedisEventPublisher {
    redis: RedisPool,
}

impl RedisEventPublisher {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }

    fn spawn_publish<T: Serialize>(&self, channel: &'static str, payload: &T) {
        let message = match serde_json::to_string(payload) {
            Ok(message) => message,
            Err(e) => {
                error!(channel, "Failed to serialize event: {e:?}");
                return;
            }
        };
        let redis = self.redis.clone();
        tokio::spawn(async move {
            if let Err(e) = publish(&redis, channel, message).await {
                error!(channel, "Failed to publish event: {e:?}");
            }
        });
    }
}

async fn publish(redis: &RedisPool, channel: &str, message: String) -> anyhow::Result<()> {
    let mut redis = redis.get().await?;
    let _: i64 = redis.deref_mut().publish(channel, message).await?;
    Ok(())
}

impl EventPublisher for RedisEventPublisher {
    fn publish_game_event(&self, event: GameEvent) {
        self.spawn_publish(GAME_EVENTS_CHANNEL, &event);
    }

    fn publish_match_detected(&self, event: MatchDetectedEvent) {
        self.spawn_publish(MATCH_DETECTED_CHANNEL, &event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::redis_pool;
    use chrono::Utc;
    use redis::AsyncConnectionConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_redis_does_not_reach_the_caller() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let pool = redis_pool::build(
            client,
            AsyncConnectionConfig::new(),
            1,
            Duration::from_millis(50),
        )
        .unwrap();
        let publisher = RedisEventPublisher::new(pool);

        publisher.publish_game_event(GameEvent {
            event_type: "GAME_FINISHED",
            game_id: 7,
            contest_id: 1,
            status: "FINISHED",
            detection_status: "DETECTED",
            timestamp: Utc::now(),
        });
        publisher.publish_match_detected(MatchDetectedEvent {
            game_id: 7,
            contest_id: 1,
            provider_match_id: "abc-123".to_owned(),
            winner_team_id: 2,
            loser_team_id: 3,
            winner_score: 13,
            loser_score: 7,
            map_name: "Haven".to_owned(),
            manual: false,
            timestamp: Utc::now(),
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

//! SQLite-backed subscriber registry.

use async_trait::async_trait;

use super::types::{ChannelId, Subscriber};
use super::SubscriberRegistry;
use crate::db::DbPool;
use crate::{Result, ScoutError};

/// Row type for a subscriber from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SubscriberRow {
    subscriber_id: String,
    channel_id: i64,
}

impl TryFrom<SubscriberRow> for Subscriber {
    type Error = ScoutError;

    fn try_from(row: SubscriberRow) -> Result<Self> {
        Ok(Subscriber {
            subscriber_id: row.subscriber_id,
            destination: channel_from_db(row.channel_id)?,
        })
    }
}

fn channel_from_db(value: i64) -> Result<ChannelId> {
    u64::try_from(value)
        .map(ChannelId)
        .map_err(|_| ScoutError::Database(format!("invalid stored channel id: {value}")))
}

fn channel_to_db(channel: ChannelId) -> Result<i64> {
    i64::try_from(channel.get())
        .map_err(|_| ScoutError::Validation(format!("channel id out of range: {channel}")))
}

/// Subscriber registry persisted in the `subscriber_channels` table.
#[derive(Debug, Clone)]
pub struct SqliteSubscriberRegistry {
    pool: DbPool,
}

impl SqliteSubscriberRegistry {
    /// Create a new registry over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRegistry for SqliteSubscriberRegistry {
    async fn get_destination(&self, subscriber_id: &str) -> Result<Option<ChannelId>> {
        let channel: Option<i64> = sqlx::query_scalar(
            "SELECT channel_id FROM subscriber_channels WHERE subscriber_id = $1",
        )
        .bind(subscriber_id)
        .fetch_optional(&self.pool)
        .await?;

        channel.map(channel_from_db).transpose()
    }

    async fn set_destination(&self, subscriber_id: &str, destination: ChannelId) -> Result<()> {
        if subscriber_id.is_empty() {
            return Err(ScoutError::Validation(
                "subscriber id must not be empty".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO subscriber_channels (subscriber_id, channel_id, updated_at)
            VALUES ($1, $2, datetime('now'))
            ON CONFLICT(subscriber_id) DO UPDATE SET
                channel_id = excluded.channel_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_to_db(destination)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            "SELECT subscriber_id, channel_id FROM subscriber_channels ORDER BY subscriber_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Subscriber::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup() -> (Database, SqliteSubscriberRegistry) {
        let db = Database::open_in_memory().await.unwrap();
        let registry = SqliteSubscriberRegistry::new(db.pool().clone());
        (db, registry)
    }

    #[tokio::test]
    async fn test_get_destination_absent() {
        let (_db, registry) = setup().await;
        assert_eq!(registry.get_destination("guild-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get_destination() {
        let (_db, registry) = setup().await;

        registry
            .set_destination("guild-1", ChannelId(1001))
            .await
            .unwrap();

        assert_eq!(
            registry.get_destination("guild-1").await.unwrap(),
            Some(ChannelId(1001))
        );
        assert_eq!(registry.get_destination("guild-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_destination_last_write_wins() {
        let (_db, registry) = setup().await;

        registry.set_destination("guild-1", ChannelId(1)).await.unwrap();
        registry.set_destination("guild-1", ChannelId(2)).await.unwrap();

        assert_eq!(
            registry.get_destination("guild-1").await.unwrap(),
            Some(ChannelId(2))
        );
        assert_eq!(registry.list_subscribers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_subscribers() {
        let (_db, registry) = setup().await;

        registry.set_destination("b", ChannelId(20)).await.unwrap();
        registry.set_destination("a", ChannelId(10)).await.unwrap();

        let subscribers = registry.list_subscribers().await.unwrap();
        assert_eq!(
            subscribers,
            vec![
                Subscriber::new("a", ChannelId(10)),
                Subscriber::new("b", ChannelId(20)),
            ]
        );
    }

    #[tokio::test]
    async fn test_large_snowflake_round_trip() {
        let (_db, registry) = setup().await;
        let snowflake = ChannelId(1_234_567_890_123_456_789);

        registry.set_destination("guild", snowflake).await.unwrap();
        assert_eq!(
            registry.get_destination("guild").await.unwrap(),
            Some(snowflake)
        );
    }

    #[tokio::test]
    async fn test_out_of_range_channel_rejected() {
        let (_db, registry) = setup().await;
        let result = registry.set_destination("guild", ChannelId(u64::MAX)).await;
        assert!(matches!(result, Err(ScoutError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_subscriber_rejected() {
        let (_db, registry) = setup().await;
        let result = registry.set_destination("", ChannelId(1)).await;
        assert!(matches!(result, Err(ScoutError::Validation(_))));
    }
}

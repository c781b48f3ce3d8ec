//! Push subscription storage.
//!
//! Subscriptions are keyed by their push endpoint; saving a subscription for
//! an endpoint that already exists replaces it.

use super::connection::CacheDb;
use crate::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A stored web push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PushSubscription {
    pub id: i64,
    pub agent_name: String,
    pub endpoint: String,
    /// The subscription object exactly as the browser produced it.
    pub subscription_json: String,
    pub created_at: String,
}

impl CacheDb {
    /// Store or replace a push subscription.
    ///
    /// The endpoint is read from the subscription's `endpoint` field and is
    /// empty when the field is missing.
    pub async fn save_subscription(&self, agent_name: &str, subscription: &serde_json::Value) -> Result<(), Error> {
        if !subscription.is_object() {
            return Err(Error::InvalidInput("subscription must be a JSON object".into()));
        }

        let endpoint = subscription
            .get("endpoint")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let subscription_json = subscription.to_string();
        let agent_name = agent_name.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO push_subscriptions (agent_name, endpoint, subscription_json, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![agent_name, endpoint, subscription_json, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All stored subscriptions, oldest first.
    pub async fn list_subscriptions(&self) -> Result<Vec<PushSubscription>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PushSubscription>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, agent_name, endpoint, subscription_json, created_at
                     FROM push_subscriptions ORDER BY id ASC",
                )?;
                let subs = stmt
                    .query_map([], |row| {
                        Ok(PushSubscription {
                            id: row.get(0)?,
                            agent_name: row.get(1)?,
                            endpoint: row.get(2)?,
                            subscription_json: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(subs)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the subscription for an endpoint.
    ///
    /// Returns false if nothing was stored for it.
    pub async fn remove_subscription(&self, endpoint: &str) -> Result<bool, Error> {
        let endpoint = endpoint.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM push_subscriptions WHERE endpoint = ?1", params![endpoint])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_list() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let sub = json!({"endpoint": "https://push.example/abc", "keys": {"p256dh": "k", "auth": "a"}});

        db.save_subscription("dana", &sub).await.unwrap();

        let subs = db.list_subscriptions().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].agent_name, "dana");
        assert_eq!(subs[0].endpoint, "https://push.example/abc");
        let stored: serde_json::Value = serde_json::from_str(&subs[0].subscription_json).unwrap();
        assert_eq!(stored, sub);
    }

    #[tokio::test]
    async fn test_save_replaces_same_endpoint() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.save_subscription("dana", &json!({"endpoint": "https://push.example/abc"}))
            .await
            .unwrap();
        db.save_subscription("sam", &json!({"endpoint": "https://push.example/abc", "expirationTime": null}))
            .await
            .unwrap();

        let subs = db.list_subscriptions().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].agent_name, "sam");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.save_subscription("dana", &json!({"keys": {}})).await.unwrap();
        let subs = db.list_subscriptions().await.unwrap();
        assert_eq!(subs[0].endpoint, "");
    }

    #[tokio::test]
    async fn test_save_rejects_non_object() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.save_subscription("dana", &json!("https://push.example/abc")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.save_subscription("dana", &json!({"endpoint": "https://push.example/abc"}))
            .await
            .unwrap();

        assert!(db.remove_subscription("https://push.example/abc").await.unwrap());
        assert!(!db.remove_subscription("https://push.example/abc").await.unwrap());
        assert!(db.list_subscriptions().await.unwrap().is_empty());
    }
}

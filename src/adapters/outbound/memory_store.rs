use crate::common::DomainResult;
use crate::domains::agent_tracking::{DataStore, LocationRow, Subscription, SubscriptionId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

const SUBSCRIPTION_BUFFER: usize = 256;

#[derive(Default)]
struct Inner {
    /// table -> rider_id -> latest row
    tables: HashMap<String, HashMap<String, LocationRow>>,
    subscribers: HashMap<SubscriptionId, (String, mpsc::Sender<LocationRow>)>,
    published: usize,
}

/// In-process data store with one upserted row per agent and a push feed per
/// table. Used by the binary for local runs and by the tests.
#[derive(Default)]
pub struct InMemoryDataStore {
    inner: RwLock<Inner>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows without notifying subscribers, e.g. to prepare the bulk read.
    pub async fn insert_rows(&self, table: &str, rows: impl IntoIterator<Item = LocationRow>) {
        let mut inner = self.inner.write().await;
        let rows_by_agent = inner.tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Some(id) = row.rider_id.clone() {
                rows_by_agent.insert(id, row);
            }
        }
    }

    /// Drop every subscription on `table`, as if the backend lost the channel.
    pub async fn close_feed(&self, table: &str) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.subscribers.len();
        inner.subscribers.retain(|_, (t, _)| t.as_str() != table);
        before - inner.subscribers.len()
    }

    pub async fn subscriber_count(&self, table: &str) -> usize {
        let inner = self.inner.read().await;
        inner.subscribers.values().filter(|(t, _)| t == table).count()
    }

    /// Number of rows ever published through the feed.
    pub async fn published_count(&self) -> usize {
        self.inner.read().await.published
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn list_locations(&self, table: &str) -> DomainResult<Vec<LocationRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn subscribe(&self, table: &str) -> DomainResult<Subscription> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let id = Uuid::new_v4();
        self.inner
            .write()
            .await
            .subscribers
            .insert(id, (table.to_string(), tx));
        tracing::debug!("Subscription {} opened on '{}'", id, table);

        Ok(Subscription {
            id,
            table: table.to_string(),
            events: rx,
        })
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> DomainResult<()> {
        if self.inner.write().await.subscribers.remove(&id).is_none() {
            tracing::debug!("Subscription {} was already closed", id);
        }
        Ok(())
    }

    async fn publish(&self, table: &str, row: LocationRow) -> DomainResult<()> {
        let targets: Vec<(SubscriptionId, mpsc::Sender<LocationRow>)> = {
            let mut inner = self.inner.write().await;
            if let Some(id) = row.rider_id.clone() {
                inner
                    .tables
                    .entry(table.to_string())
                    .or_default()
                    .insert(id, row.clone());
            }
            inner.published += 1;
            inner
                .subscribers
                .iter()
                .filter(|(_, (t, _))| t == table)
                .map(|(id, (_, tx))| (*id, tx.clone()))
                .collect()
        };

        // Sends happen outside the lock.
        let mut dead = Vec::new();
        for (id, tx) in targets {
            if tx.send(row.clone()).await.is_err() {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut inner = self.inner.write().await;
            for id in dead {
                inner.subscribers.remove(&id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn releasing_a_dropped_subscription_succeeds() {
        let store = InMemoryDataStore::new();
        let subscription = store.subscribe("rider_locations").await.unwrap();

        assert_eq!(store.close_feed("rider_locations").await, 1);
        assert!(store.unsubscribe(subscription.id).await.is_ok());
        assert!(store.unsubscribe(subscription.id).await.is_ok());
        assert_eq!(store.subscriber_count("rider_locations").await, 0);
    }
}

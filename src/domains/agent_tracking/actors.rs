use super::aggregate::{AgentLocation, AgentStateStore};
use super::ports::Subscription;
use crate::domains::logger::DynLogger;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Drains one change-feed subscription into the state store. Rows are applied
/// strictly one at a time, so a burst from the feed queues in the channel
/// instead of interleaving.
pub struct LocationIngestActor {
    store: Arc<RwLock<AgentStateStore>>,
    subscription: Subscription,
    logger: DynLogger,
}

impl LocationIngestActor {
    pub fn new(store: Arc<RwLock<AgentStateStore>>, subscription: Subscription, logger: DynLogger) -> Self {
        Self {
            store,
            subscription,
            logger,
        }
    }

    pub async fn run(mut self) {
        while let Some(row) = self.subscription.events.recv().await {
            match AgentLocation::from_row(&row, Utc::now()) {
                Some(location) => {
                    let mut store = self.store.write().await;
                    store.apply(location);
                }
                None => {
                    tracing::debug!("Dropped incomplete location row: {:?}", row);
                }
            }
        }

        // No reconnect: the view reports itself disconnected and stays that way.
        self.logger.error(&format!(
            "Change feed on '{}' closed (subscription {})",
            self.subscription.table, self.subscription.id
        ));
        self.store
            .read()
            .await
            .announce_disconnected(&self.subscription.table);
    }
}

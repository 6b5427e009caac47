use super::aggregate::LocationRow;
use crate::common::DomainResult;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type SubscriptionId = Uuid;

/// A live change-feed subscription. The subscription is confirmed active
/// once it has been returned; the channel closing means the feed dropped.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub table: String,
    pub events: mpsc::Receiver<LocationRow>,
}

/// Port onto the managed backend holding the location table.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Bulk read of the latest row per agent.
    async fn list_locations(&self, table: &str) -> DomainResult<Vec<LocationRow>>;

    async fn subscribe(&self, table: &str) -> DomainResult<Subscription>;

    /// Releasing a subscription the backend already dropped succeeds.
    async fn unsubscribe(&self, id: SubscriptionId) -> DomainResult<()>;

    /// Write a row and notify every live subscription on `table`.
    async fn publish(&self, table: &str, row: LocationRow) -> DomainResult<()>;
}

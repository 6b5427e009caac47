use crate::common::DomainResult;
use crate::domains::geodesy::GeoPoint;
use async_trait::async_trait;

/// Port onto a turn-by-turn routing service.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Waypoints from `start` to `end`, in travel order. Implementations
    /// return `DomainError::RouteUnavailable` when no route exists.
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> DomainResult<Vec<GeoPoint>>;
}

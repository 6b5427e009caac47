use crate::common::DomainResult;
use crate::domains::geodesy::GeoPoint;

/// Port for the single persisted "home base" coordinate.
pub trait HomeBaseStore: Send + Sync {
    fn load(&self) -> DomainResult<Option<GeoPoint>>;
    fn save(&self, point: GeoPoint) -> DomainResult<()>;
}

/// Pick the initial map center: the device location if the platform gave us
/// one, else the persisted home base, else `default_center`. Never fails; an
/// unreadable home base is treated as absent.
pub fn resolve_center(device: Option<GeoPoint>, store: &dyn HomeBaseStore, default_center: GeoPoint) -> GeoPoint {
    if let Some(point) = device.filter(GeoPoint::is_finite) {
        return point;
    }

    match store.load() {
        Ok(Some(point)) if point.is_finite() => point,
        Ok(_) => default_center,
        Err(e) => {
            tracing::warn!("Ignoring unreadable home base: {}", e);
            default_center
        }
    }
}

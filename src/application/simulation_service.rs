use crate::common::ApplicationResult;
use crate::domains::geodesy::GeoPoint;
use crate::domains::home_base::{resolve_center, HomeBaseStore};
use crate::domains::route_simulation::{PlaybackReport, RouteSimulator};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs the route simulator from the persisted home base to a destination.
pub struct SimulationService {
    simulator: Arc<RouteSimulator>,
    home_base: Arc<dyn HomeBaseStore>,
    default_center: GeoPoint,
}

impl SimulationService {
    pub fn new(simulator: Arc<RouteSimulator>, home_base: Arc<dyn HomeBaseStore>, default_center: GeoPoint) -> Self {
        Self {
            simulator,
            home_base,
            default_center,
        }
    }

    pub fn simulator(&self) -> Arc<RouteSimulator> {
        self.simulator.clone()
    }

    pub fn start_point(&self) -> GeoPoint {
        resolve_center(None, self.home_base.as_ref(), self.default_center)
    }

    pub async fn run_to(&self, destination: GeoPoint) -> ApplicationResult<PlaybackReport> {
        let start = self.start_point();
        let report = self.simulator.run(start, destination).await?;
        Ok(report)
    }

    /// Run in the background. Aborting the handle cancels playback.
    pub fn spawn(self: Arc<Self>, destination: GeoPoint) -> JoinHandle<ApplicationResult<PlaybackReport>> {
        tokio::spawn(async move { self.run_to(destination).await })
    }
}

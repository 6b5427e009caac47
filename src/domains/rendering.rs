use crate::domains::geodesy::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the map currently shows for one agent. Lags behind the agent's true
/// position while an animation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedPosition {
    pub lat: f64,
    pub lng: f64,
    pub bearing_degrees: f64,
}

impl RenderedPosition {
    pub fn at(point: GeoPoint, bearing_degrees: f64) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            bearing_degrees,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Port to whatever draws the map (markers, trails, badges).
pub trait RenderSink: Send + Sync {
    fn render_position(&self, agent_id: &str, position: RenderedPosition);
    fn render_path(&self, agent_id: &str, path: &[GeoPoint]);
    fn render_presence(&self, presence: &HashMap<String, bool>);
    fn render_connection(&self, status: ConnectionStatus);
}

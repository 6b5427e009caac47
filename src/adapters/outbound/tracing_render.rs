use crate::domains::geodesy::GeoPoint;
use crate::domains::rendering::{ConnectionStatus, RenderSink, RenderedPosition};
use std::collections::HashMap;

/// Headless renderer: reports what a map would draw through `tracing`.
/// Frame-rate output goes to `trace`, everything else to `info`/`warn`.
pub struct TracingRenderSink;

impl RenderSink for TracingRenderSink {
    fn render_position(&self, agent_id: &str, position: RenderedPosition) {
        tracing::trace!(
            agent = agent_id,
            "marker at ({:.6}, {:.6}) heading {:.0}°",
            position.lat,
            position.lng,
            position.bearing_degrees
        );
    }

    fn render_path(&self, agent_id: &str, path: &[GeoPoint]) {
        if let Some(head) = path.last() {
            tracing::info!(agent = agent_id, "trail of {} points, latest {}", path.len(), head);
        }
    }

    fn render_presence(&self, presence: &HashMap<String, bool>) {
        let mut agents: Vec<_> = presence.iter().collect();
        agents.sort();
        for (agent_id, online) in agents {
            tracing::info!(agent = %agent_id, "{}", if *online { "online" } else { "offline" });
        }
    }

    fn render_connection(&self, status: ConnectionStatus) {
        match status {
            ConnectionStatus::Disconnected => tracing::warn!("live feed disconnected"),
            other => tracing::info!("live feed {:?}", other),
        }
    }
}

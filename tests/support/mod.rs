#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_tracker::common::{DomainError, DomainResult};
use fleet_tracker::domains::logger::DomainLogger;
use fleet_tracker::domains::{AgentLocation, ConnectionStatus, GeoPoint, RenderSink, RenderedPosition, RoutingService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct CaptureSink {
    pub positions: Mutex<Vec<(String, RenderedPosition)>>,
    pub paths: Mutex<Vec<(String, Vec<GeoPoint>)>>,
    pub presence: Mutex<Vec<HashMap<String, bool>>>,
    pub connection: Mutex<Vec<ConnectionStatus>>,
}

impl CaptureSink {
    pub fn positions_of(&self, agent_id: &str) -> Vec<RenderedPosition> {
        self.positions
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == agent_id)
            .map(|(_, p)| *p)
            .collect()
    }

    pub fn last_connection(&self) -> Option<ConnectionStatus> {
        self.connection.lock().unwrap().last().copied()
    }
}

impl RenderSink for CaptureSink {
    fn render_position(&self, agent_id: &str, position: RenderedPosition) {
        self.positions.lock().unwrap().push((agent_id.to_string(), position));
    }

    fn render_path(&self, agent_id: &str, path: &[GeoPoint]) {
        self.paths.lock().unwrap().push((agent_id.to_string(), path.to_vec()));
    }

    fn render_presence(&self, presence: &HashMap<String, bool>) {
        self.presence.lock().unwrap().push(presence.clone());
    }

    fn render_connection(&self, status: ConnectionStatus) {
        self.connection.lock().unwrap().push(status);
    }
}

pub struct BridgeCapture {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("INFO:{}", msg));
    }
    fn warn(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("WARN:{}", msg));
    }
    fn error(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("ERR:{}", msg));
    }
}

/// Routing service that always answers with the same waypoints (or error).
pub struct StaticRouting {
    pub waypoints: Option<Vec<GeoPoint>>,
}

impl StaticRouting {
    pub fn with(waypoints: Vec<GeoPoint>) -> Self {
        Self {
            waypoints: Some(waypoints),
        }
    }

    pub fn failing() -> Self {
        Self { waypoints: None }
    }
}

#[async_trait]
impl RoutingService for StaticRouting {
    async fn route(&self, _start: GeoPoint, _end: GeoPoint) -> DomainResult<Vec<GeoPoint>> {
        match &self.waypoints {
            Some(waypoints) => Ok(waypoints.clone()),
            None => Err(DomainError::InfrastructureError("connection refused".to_string())),
        }
    }
}

pub fn location(agent_id: &str, lat: f64, lng: f64) -> AgentLocation {
    AgentLocation::new(agent_id, lat, lng, Utc::now())
}

pub fn location_at(agent_id: &str, lat: f64, lng: f64, observed_at: DateTime<Utc>) -> AgentLocation {
    AgentLocation::new(agent_id, lat, lng, observed_at)
}

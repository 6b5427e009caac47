use super::events::TrackingEvent;
use crate::domains::geodesy::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::broadcast;

pub const DEFAULT_PATH_CAPACITY: usize = 50;
const EVENT_BUS_CAPACITY: usize = 1024;

/// A location row as it arrives from the data store, either from the bulk
/// read or from the change feed. Every column is optional because the feed
/// occasionally emits partial rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    #[serde(default)]
    pub rider_id: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A single validated observation of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentLocation {
    pub agent_id: String,
    pub lat: f64,
    pub lng: f64,
    pub observed_at: DateTime<Utc>,
}

impl AgentLocation {
    pub fn new(agent_id: impl Into<String>, lat: f64, lng: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            agent_id: agent_id.into(),
            lat,
            lng,
            observed_at,
        }
    }

    /// Validate a raw row. Rows without an id or usable coordinates yield
    /// `None`; a missing timestamp falls back to `received_at`.
    pub fn from_row(row: &LocationRow, received_at: DateTime<Utc>) -> Option<Self> {
        let agent_id = row.rider_id.as_deref().filter(|id| !id.is_empty())?;
        let (lat, lng) = (row.lat?, row.lng?);
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }

        Some(Self::new(
            agent_id,
            lat,
            lng,
            row.last_updated.unwrap_or(received_at),
        ))
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn to_row(&self) -> LocationRow {
        LocationRow {
            rider_id: Some(self.agent_id.clone()),
            lat: Some(self.lat),
            lng: Some(self.lng),
            last_updated: Some(self.observed_at),
        }
    }

    fn is_valid(&self) -> bool {
        !self.agent_id.is_empty() && self.position().is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub current: AgentLocation,
    pub previous: Option<AgentLocation>,
    /// Oldest first.
    pub path: VecDeque<GeoPoint>,
}

impl AgentState {
    fn first(location: AgentLocation) -> Self {
        let mut path = VecDeque::with_capacity(1);
        path.push_back(location.position());
        Self {
            current: location,
            previous: None,
            path,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.current.agent_id
    }

    /// True when the latest observation moved the agent.
    pub fn has_moved(&self) -> bool {
        self.previous
            .as_ref()
            .map(|prev| prev.position() != self.current.position())
            .unwrap_or(false)
    }
}

/// Single writer of `AgentState`. Every mutation is announced on a broadcast
/// bus so that renderers and the motion interpolator can observe it.
pub struct AgentStateStore {
    agents: HashMap<String, AgentState>,
    path_capacity: usize,
    events: broadcast::Sender<TrackingEvent>,
}

impl AgentStateStore {
    pub fn new(path_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            agents: HashMap::new(),
            path_capacity: path_capacity.max(1),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackingEvent> {
        self.events.subscribe()
    }

    /// Ingest one observation. Invalid observations are ignored and `None`
    /// is returned.
    pub fn apply(&mut self, event: AgentLocation) -> Option<&AgentState> {
        if !event.is_valid() {
            return None;
        }

        let capacity = self.path_capacity;
        let agent_id = event.agent_id.clone();
        let state = match self.agents.remove(&agent_id) {
            Some(existing) => {
                let AgentState { current, mut path, .. } = existing;
                path.push_back(event.position());
                while path.len() > capacity {
                    path.pop_front();
                }
                AgentState {
                    current: event,
                    previous: Some(current),
                    path,
                }
            }
            None => AgentState::first(event),
        };

        self.publish(&state);
        self.agents.insert(agent_id.clone(), state);
        self.agents.get(&agent_id)
    }

    /// Merge the bulk read taken at startup. Agents that already have live
    /// state keep it; the older seed row is dropped. Returns how many agents
    /// were seeded.
    pub fn seed(&mut self, locations: impl IntoIterator<Item = AgentLocation>) -> usize {
        let mut seeded = 0;
        for location in locations {
            if !location.is_valid() || self.agents.contains_key(&location.agent_id) {
                continue;
            }
            let state = AgentState::first(location);
            self.publish(&state);
            self.agents.insert(state.agent_id().to_string(), state);
            seeded += 1;
        }
        seeded
    }

    pub fn snapshot(&self) -> HashMap<String, AgentState> {
        self.agents.clone()
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentState> {
        self.agents.get(agent_id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Announce that the change feed for `table` has gone away.
    pub fn announce_disconnected(&self, table: &str) {
        let _ = self.events.send(TrackingEvent::FeedDisconnected {
            table: table.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn publish(&self, state: &AgentState) {
        // No receivers is fine: nobody is rendering yet.
        let _ = self.events.send(TrackingEvent::AgentStateUpdated {
            state: state.clone(),
            timestamp: Utc::now(),
        });
    }
}

impl Default for AgentStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_CAPACITY)
    }
}

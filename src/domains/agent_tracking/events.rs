use super::aggregate::AgentState;
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackingEvent {
    AgentStateUpdated {
        state: AgentState,
        timestamp: DateTime<Utc>,
    },
    FeedDisconnected {
        table: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for TrackingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TrackingEvent::AgentStateUpdated { .. } => "AgentStateUpdated",
            TrackingEvent::FeedDisconnected { .. } => "FeedDisconnected",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TrackingEvent::AgentStateUpdated { state, .. } => state.agent_id(),
            TrackingEvent::FeedDisconnected { table, .. } => table,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TrackingEvent::AgentStateUpdated { timestamp, .. } => *timestamp,
            TrackingEvent::FeedDisconnected { timestamp, .. } => *timestamp,
        }
    }
}

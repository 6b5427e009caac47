use crate::domains::agent_tracking::{AgentState, AgentStateStore};
use crate::domains::rendering::RenderSink;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_ONLINE_WINDOW: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub agent_id: String,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Online means the latest observation is younger than the window. Nothing is
/// remembered between evaluations, so agents near the threshold may flap.
#[derive(Debug, Clone)]
pub struct PresenceDetector {
    window: ChronoDuration,
}

impl PresenceDetector {
    pub fn new(window: Duration) -> Self {
        let window = ChronoDuration::from_std(window).unwrap_or_else(|_| ChronoDuration::minutes(10));
        Self { window }
    }

    pub fn is_online(&self, state: Option<&AgentState>, now: DateTime<Utc>) -> bool {
        match state {
            Some(state) => now - state.current.observed_at < self.window,
            None => false,
        }
    }

    pub fn evaluate(&self, states: &HashMap<String, AgentState>, now: DateTime<Utc>) -> HashMap<String, bool> {
        states
            .iter()
            .map(|(agent_id, state)| (agent_id.clone(), self.is_online(Some(state), now)))
            .collect()
    }

    /// Presence for an explicit roster; agents with no location are offline.
    pub fn records(
        &self,
        roster: &[String],
        states: &HashMap<String, AgentState>,
        now: DateTime<Utc>,
    ) -> Vec<PresenceRecord> {
        roster
            .iter()
            .map(|agent_id| {
                let state = states.get(agent_id);
                PresenceRecord {
                    agent_id: agent_id.clone(),
                    online: self.is_online(state, now),
                    last_seen: state.map(|s| s.current.observed_at),
                }
            })
            .collect()
    }
}

impl Default for PresenceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ONLINE_WINDOW)
    }
}

/// Re-evaluate presence for every known agent on a fixed cadence and push the
/// result to the renderer. The first evaluation happens immediately.
pub fn spawn_presence_monitor(
    detector: PresenceDetector,
    store: Arc<RwLock<AgentStateStore>>,
    sink: Arc<dyn RenderSink>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = time::interval(every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            let states = store.read().await.snapshot();
            let presence = detector.evaluate(&states, Utc::now());
            tracing::debug!(
                "Presence check: {}/{} agents online",
                presence.values().filter(|online| **online).count(),
                presence.len()
            );
            sink.render_presence(&presence);
        }
    })
}

use crate::common::{ApplicationError, ApplicationResult, DomainError, DomainEvent, DomainResult};
use crate::config::Config;
use crate::domains::agent_tracking::{
    AgentLocation, AgentState, AgentStateStore, DataStore, LocationIngestActor, SubscriptionId, TrackingEvent,
};
use crate::domains::geodesy::GeoPoint;
use crate::domains::logger::{DynLogger, ScopedLogger};
use crate::domains::motion::MotionInterpolator;
use crate::domains::presence::{spawn_presence_monitor, PresenceDetector};
use crate::domains::rendering::{ConnectionStatus, RenderSink};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// Everything one live map needs, owned in one place. Opening the view seeds
/// the store, attaches the change feed and starts the background tasks;
/// closing (or dropping) it stops all of them.
pub struct TrackingView {
    store: Arc<RwLock<AgentStateStore>>,
    data_store: Arc<dyn DataStore>,
    detector: PresenceDetector,
    subscription: Option<SubscriptionId>,
    tasks: Vec<JoinHandle<()>>,
    selected_agent: Option<String>,
    logger: DynLogger,
}

impl TrackingView {
    pub async fn open(
        config: &Config,
        data_store: Arc<dyn DataStore>,
        sink: Arc<dyn RenderSink>,
        logger: DynLogger,
    ) -> ApplicationResult<Self> {
        let logger = ScopedLogger::wrap("tracking", logger);
        let table = config.data_store.table.clone();
        let store = Arc::new(RwLock::new(AgentStateStore::new(config.tracking.path_capacity)));
        let detector = PresenceDetector::new(config.presence.online_window());

        // Observers attach before the seed so initial positions are rendered.
        let (motion_updates, render_updates) = {
            let store = store.read().await;
            (store.subscribe(), store.subscribe())
        };
        let interpolator = MotionInterpolator::new(
            sink.clone(),
            config.tracking.animation_duration(),
            config.tracking.frame_interval(),
        );

        let mut view = Self {
            store: store.clone(),
            data_store: data_store.clone(),
            detector: detector.clone(),
            subscription: None,
            tasks: Vec::new(),
            selected_agent: None,
            logger: logger.clone(),
        };
        view.tasks.push(tokio::spawn(interpolator.run(motion_updates)));
        view.tasks.push(tokio::spawn(forward_to_renderer(render_updates, sink.clone())));

        // Seed first, then subscribe: never both in flight.
        sink.render_connection(ConnectionStatus::Connecting);
        let rows = data_store
            .list_locations(&table)
            .await
            .map_err(|e| ApplicationError::DataStore(e.to_string()))?;
        let now = Utc::now();
        let seeded = store
            .write()
            .await
            .seed(rows.iter().filter_map(|row| AgentLocation::from_row(row, now)));
        logger.info(&format!("Seeded {} of {} agents from '{}'", seeded, rows.len(), table));

        let subscription = data_store
            .subscribe(&table)
            .await
            .map_err(|e| ApplicationError::DataStore(e.to_string()))?;
        view.subscription = Some(subscription.id);
        sink.render_connection(ConnectionStatus::Connected);
        logger.info(&format!("Live feed attached (subscription {})", subscription.id));

        let ingest = LocationIngestActor::new(store.clone(), subscription, logger.clone());
        view.tasks.push(tokio::spawn(ingest.run()));
        view.tasks.push(spawn_presence_monitor(
            detector,
            store,
            sink,
            config.presence.check_interval(),
        ));

        Ok(view)
    }

    pub fn store(&self) -> Arc<RwLock<AgentStateStore>> {
        self.store.clone()
    }

    pub async fn snapshot(&self) -> HashMap<String, AgentState> {
        self.store.read().await.snapshot()
    }

    pub async fn agent(&self, agent_id: &str) -> DomainResult<AgentState> {
        self.store
            .read()
            .await
            .get(agent_id)
            .cloned()
            .ok_or_else(|| DomainError::AgentNotFound {
                id: agent_id.to_string(),
            })
    }

    pub async fn presence(&self, now: DateTime<Utc>) -> HashMap<String, bool> {
        let states = self.store.read().await.snapshot();
        self.detector.evaluate(&states, now)
    }

    pub fn select_agent(&mut self, agent_id: Option<String>) {
        self.selected_agent = agent_id;
    }

    pub fn selected_agent(&self) -> Option<&str> {
        self.selected_agent.as_deref()
    }

    /// The selected agent alone, or everyone when nothing is selected. A
    /// selected agent with no known location yields nothing.
    pub async fn visible_agents(&self) -> Vec<AgentState> {
        let store = self.store.read().await;
        match &self.selected_agent {
            Some(agent_id) => store.get(agent_id).cloned().into_iter().collect(),
            None => {
                let mut all: Vec<_> = store.snapshot().into_values().collect();
                all.sort_by(|a, b| a.agent_id().cmp(b.agent_id()));
                all
            }
        }
    }

    /// Where the map should fly to for the current selection.
    pub async fn focus_center(&self) -> Option<GeoPoint> {
        let agent_id = self.selected_agent.as_deref()?;
        let store = self.store.read().await;
        store.get(agent_id).map(|state| state.current.position())
    }

    /// Stop every task and release the feed subscription.
    pub async fn close(mut self) -> ApplicationResult<()> {
        self.abort_tasks();
        if let Some(id) = self.subscription.take() {
            self.data_store
                .unsubscribe(id)
                .await
                .map_err(|e| ApplicationError::DataStore(e.to_string()))?;
        }
        self.logger.info("View closed");
        Ok(())
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for TrackingView {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

async fn forward_to_renderer(mut updates: broadcast::Receiver<TrackingEvent>, sink: Arc<dyn RenderSink>) {
    loop {
        match updates.recv().await {
            Ok(TrackingEvent::AgentStateUpdated { state, .. }) => {
                let path: Vec<GeoPoint> = state.path.iter().copied().collect();
                sink.render_path(state.agent_id(), &path);
            }
            Ok(event @ TrackingEvent::FeedDisconnected { .. }) => {
                tracing::warn!(
                    "Feed on '{}' lost at {}",
                    event.aggregate_id(),
                    event.occurred_at().to_rfc3339()
                );
                sink.render_connection(ConnectionStatus::Disconnected);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Renderer lagged, skipped {} updates", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

use super::ports::RoutingService;
use crate::common::{DomainError, DomainResult};
use crate::domains::agent_tracking::{AgentLocation, DataStore, LocationRow};
use crate::domains::geodesy::{lerp, GeoPoint};
use crate::domains::logger::DynLogger;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_STEPS_PER_SEGMENT: usize = 20;
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(1000);

/// Expand a sparse polyline: `steps_per_segment` points per consecutive pair
/// (starting at the segment's first waypoint), then the final waypoint once.
pub fn densify(waypoints: &[GeoPoint], steps_per_segment: usize) -> Vec<GeoPoint> {
    let Some(last) = waypoints.last() else {
        return Vec::new();
    };
    let steps = steps_per_segment.max(1);

    let mut points = Vec::with_capacity((waypoints.len() - 1) * steps + 1);
    for pair in waypoints.windows(2) {
        for step in 0..steps {
            let t = step as f64 / steps as f64;
            points.push(lerp(&pair[0], &pair[1], t));
        }
    }
    points.push(*last);
    points
}

/// A densified route, fixed for the lifetime of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRoute {
    points: Arc<[GeoPoint]>,
}

impl SimulatedRoute {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points: points.into() }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_m(&pair[1]))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Pending,
    Playing { index: usize },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub agent_id: String,
    pub points_published: usize,
    pub state: PlaybackState,
}

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub agent_id: String,
    pub table: String,
    pub steps_per_segment: usize,
    pub publish_interval: Duration,
    pub log_every: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            agent_id: "simulated-rider-01".to_string(),
            table: "rider_locations".to_string(),
            steps_per_segment: DEFAULT_STEPS_PER_SEGMENT,
            publish_interval: DEFAULT_PUBLISH_INTERVAL,
            log_every: 10,
        }
    }
}

/// Stands in for a real courier: replays a routed path into the change feed
/// at a fixed cadence so the tracker sees it through its normal ingestion path.
pub struct RouteSimulator {
    routing: Arc<dyn RoutingService>,
    data_store: Arc<dyn DataStore>,
    settings: SimulationSettings,
    logger: DynLogger,
    state: watch::Sender<PlaybackState>,
}

impl RouteSimulator {
    pub fn new(
        routing: Arc<dyn RoutingService>,
        data_store: Arc<dyn DataStore>,
        settings: SimulationSettings,
        logger: DynLogger,
    ) -> Self {
        let (state, _) = watch::channel(PlaybackState::Pending);
        Self {
            routing,
            data_store,
            settings,
            logger,
            state,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    pub async fn fetch_route(&self, start: GeoPoint, end: GeoPoint) -> DomainResult<Vec<GeoPoint>> {
        let waypoints = self.routing.route(start, end).await.map_err(|e| match e {
            DomainError::RouteUnavailable { .. } => e,
            other => DomainError::RouteUnavailable {
                reason: other.to_string(),
            },
        })?;

        if waypoints.is_empty() {
            return Err(DomainError::RouteUnavailable {
                reason: format!("no route from {} to {}", start, end),
            });
        }
        Ok(waypoints)
    }

    pub async fn prepare(&self, start: GeoPoint, end: GeoPoint) -> DomainResult<SimulatedRoute> {
        let waypoints = self.fetch_route(start, end).await?;
        let route = SimulatedRoute::new(densify(&waypoints, self.settings.steps_per_segment));
        self.logger.info(&format!(
            "Route loaded: {} waypoints densified to {} steps ({:.0} m)",
            waypoints.len(),
            route.len(),
            route.length_m()
        ));
        Ok(route)
    }

    /// Fetch, densify and play. A routing failure aborts before anything is
    /// published.
    pub async fn run(&self, start: GeoPoint, end: GeoPoint) -> DomainResult<PlaybackReport> {
        let route = match self.prepare(start, end).await {
            Ok(route) => route,
            Err(e) => {
                self.logger.error(&format!("Simulation aborted: {}", e));
                return Err(e);
            }
        };
        self.play(&route).await
    }

    /// Publish one location per interval, in route order. The first tick is
    /// only scheduled after the feed subscription has been confirmed.
    pub async fn play(&self, route: &SimulatedRoute) -> DomainResult<PlaybackReport> {
        let table = self.settings.table.clone();
        let mut handshake = self.data_store.subscribe(&table).await?;
        self.logger.info(&format!(
            "Connected to '{}', starting playback of {} steps",
            table,
            route.len()
        ));

        let result = self.publish_route(route, &mut handshake.events).await;

        if let Err(e) = self.data_store.unsubscribe(handshake.id).await {
            tracing::warn!("Failed to release playback subscription {}: {}", handshake.id, e);
        }
        result
    }

    async fn publish_route(
        &self,
        route: &SimulatedRoute,
        feed: &mut mpsc::Receiver<LocationRow>,
    ) -> DomainResult<PlaybackReport> {
        let period = self.settings.publish_interval.max(Duration::from_millis(1));
        let mut ticks = time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let total = route.len();
        let mut index = 0;
        self.state.send_replace(PlaybackState::Playing { index });

        while index < total {
            tokio::select! {
                _ = ticks.tick() => {
                    let point = route.points()[index];
                    let location = AgentLocation::new(
                        self.settings.agent_id.clone(),
                        point.lat,
                        point.lng,
                        Utc::now(),
                    );
                    self.data_store.publish(&self.settings.table, location.to_row()).await?;

                    if self.settings.log_every > 0 && index % self.settings.log_every == 0 {
                        self.logger.info(&format!("Step {}/{} {}", index, total, point));
                    }
                    index += 1;
                    self.state.send_replace(PlaybackState::Playing { index });
                }
                echoed = feed.recv() => {
                    if echoed.is_none() {
                        self.logger.error("Feed dropped during playback");
                        return Err(DomainError::FeedDisconnected { table: self.settings.table.clone() });
                    }
                }
            }
        }

        self.state.send_replace(PlaybackState::Finished);
        self.logger.info("Destination reached, playback finished");
        Ok(PlaybackReport {
            agent_id: self.settings.agent_id.clone(),
            points_published: index,
            state: PlaybackState::Finished,
        })
    }
}

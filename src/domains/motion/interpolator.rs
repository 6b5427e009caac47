use crate::domains::agent_tracking::AgentState;
use crate::domains::geodesy::{bearing, lerp, GeoPoint};
use crate::domains::rendering::RenderedPosition;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub enum MotionPhase {
    Idle,
    Animating {
        start: GeoPoint,
        target: GeoPoint,
        started_at: Instant,
    },
}

/// Per-agent animation state machine. Time is passed in, so the machine
/// itself never sleeps; a driver calls `tick` at frame cadence while
/// `is_animating` holds.
#[derive(Debug, Clone)]
pub struct AgentMotion {
    rendered: RenderedPosition,
    phase: MotionPhase,
    duration: Duration,
}

impl AgentMotion {
    pub fn new(initial: GeoPoint, duration: Duration) -> Self {
        Self {
            rendered: RenderedPosition::at(initial, 0.0),
            phase: MotionPhase::Idle,
            duration,
        }
    }

    pub fn rendered(&self) -> RenderedPosition {
        self.rendered
    }

    pub fn phase(&self) -> &MotionPhase {
        &self.phase
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, MotionPhase::Animating { .. })
    }

    /// React to a new agent state. Returns true if an animation started.
    ///
    /// An in-flight animation is replaced; the new one starts from the
    /// marker's current on-screen position rather than from `previous`.
    pub fn on_update(&mut self, state: &AgentState, now: Instant) -> bool {
        let target = state.current.position();
        let start = self.rendered.point();

        if !state.has_moved() || start == target {
            // First sighting or no movement: snap, keep heading.
            self.rendered = RenderedPosition::at(target, self.rendered.bearing_degrees);
            self.phase = MotionPhase::Idle;
            return false;
        }

        self.rendered.bearing_degrees = bearing(&start, &target);
        self.phase = MotionPhase::Animating {
            start,
            target,
            started_at: now,
        };
        true
    }

    /// Advance the animation to `now`. At full progress the machine returns to
    /// `Idle` with the marker exactly on the target.
    pub fn tick(&mut self, now: Instant) -> RenderedPosition {
        if let MotionPhase::Animating {
            start,
            target,
            started_at,
        } = self.phase
        {
            let progress = self.progress(started_at, now);
            let point = lerp(&start, &target, progress);
            self.rendered = RenderedPosition::at(point, self.rendered.bearing_degrees);
            if progress >= 1.0 {
                self.phase = MotionPhase::Idle;
            }
        }
        self.rendered
    }

    fn progress(&self, started_at: Instant, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::agent_tracking::{AgentLocation, AgentStateStore};
    use chrono::Utc;

    fn moved(store: &mut AgentStateStore, lat: f64, lng: f64) -> AgentState {
        store
            .apply(AgentLocation::new("a", lat, lng, Utc::now()))
            .cloned()
            .unwrap()
    }

    #[test]
    fn first_sighting_snaps_without_heading() {
        let mut store = AgentStateStore::default();
        let mut motion = AgentMotion::new(GeoPoint::new(0.0, 0.0), DEFAULT_ANIMATION_DURATION);

        let started = motion.on_update(&moved(&mut store, 5.0, 5.0), Instant::now());
        assert!(!started);
        assert_eq!(motion.rendered().point(), GeoPoint::new(5.0, 5.0));
        assert_eq!(motion.rendered().bearing_degrees, 0.0);
    }

    #[test]
    fn heading_is_set_before_motion_completes() {
        let mut store = AgentStateStore::default();
        let first = moved(&mut store, 0.0, 0.0);
        let mut motion = AgentMotion::new(first.current.position(), DEFAULT_ANIMATION_DURATION);
        motion.on_update(&first, Instant::now());

        let t0 = Instant::now();
        assert!(motion.on_update(&moved(&mut store, 0.0, 1.0), t0));
        assert!((motion.rendered().bearing_degrees - 90.0).abs() < 1e-9);
        assert_eq!(motion.rendered().point(), GeoPoint::new(0.0, 0.0));

        let half = motion.tick(t0 + Duration::from_millis(1500));
        assert!((half.lng - 0.5).abs() < 1e-9);
        assert!(motion.is_animating());

        let done = motion.tick(t0 + Duration::from_millis(4000));
        assert_eq!(done.point(), GeoPoint::new(0.0, 1.0));
        assert_eq!(motion.phase(), &MotionPhase::Idle);
    }

    #[test]
    fn unchanged_position_keeps_heading() {
        let mut store = AgentStateStore::default();
        let mut motion = AgentMotion::new(GeoPoint::new(0.0, 0.0), DEFAULT_ANIMATION_DURATION);
        let t0 = Instant::now();
        motion.on_update(&moved(&mut store, 0.0, 0.0), t0);
        motion.on_update(&moved(&mut store, 0.0, 1.0), t0);
        motion.tick(t0 + DEFAULT_ANIMATION_DURATION);
        let heading = motion.rendered().bearing_degrees;
        assert!((heading - 90.0).abs() < 1e-9);

        assert!(!motion.on_update(&moved(&mut store, 0.0, 1.0), t0));
        assert_eq!(motion.rendered().bearing_degrees, heading);
    }
}

use super::interpolator::AgentMotion;
use crate::domains::agent_tracking::{AgentState, TrackingEvent};
use crate::domains::rendering::{RenderSink, RenderedPosition};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

struct AgentAnimator {
    motion: Arc<Mutex<AgentMotion>>,
    frames: Option<JoinHandle<()>>,
}

impl AgentAnimator {
    fn cancel(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.abort();
        }
    }
}

impl Drop for AgentAnimator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Drives one `AgentMotion` per agent. Each animating agent owns exactly one
/// frame task; it is aborted before a replacement is scheduled and ends by
/// itself once the agent is idle again. Dropping the interpolator aborts
/// every outstanding frame task.
pub struct MotionInterpolator {
    animators: HashMap<String, AgentAnimator>,
    sink: Arc<dyn RenderSink>,
    duration: Duration,
    frame_interval: Duration,
}

impl MotionInterpolator {
    pub fn new(sink: Arc<dyn RenderSink>, duration: Duration, frame_interval: Duration) -> Self {
        Self {
            animators: HashMap::new(),
            sink,
            duration,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    pub async fn run(mut self, mut updates: broadcast::Receiver<TrackingEvent>) {
        loop {
            match updates.recv().await {
                Ok(TrackingEvent::AgentStateUpdated { state, .. }) => self.handle_update(&state),
                Ok(TrackingEvent::FeedDisconnected { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Motion interpolator lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.shutdown();
    }

    pub fn handle_update(&mut self, state: &AgentState) {
        let agent_id = state.agent_id().to_string();
        let duration = self.duration;
        let animator = self
            .animators
            .entry(agent_id.clone())
            .or_insert_with(|| AgentAnimator {
                motion: Arc::new(Mutex::new(AgentMotion::new(state.current.position(), duration))),
                frames: None,
            });

        // Never two frame loops for one agent.
        animator.cancel();

        // Heading (and the snap, if any) is visible right away. Every render
        // for an agent happens under its motion lock.
        let started = match animator.motion.lock() {
            Ok(mut motion) => {
                let started = motion.on_update(state, Instant::now());
                self.sink.render_position(&agent_id, motion.rendered());
                started
            }
            Err(_) => return,
        };

        if started {
            animator.frames = Some(spawn_frames(
                agent_id,
                animator.motion.clone(),
                self.sink.clone(),
                self.frame_interval,
            ));
        }
    }

    pub fn rendered(&self, agent_id: &str) -> Option<RenderedPosition> {
        let animator = self.animators.get(agent_id)?;
        let motion = animator.motion.lock().ok()?;
        Some(motion.rendered())
    }

    pub fn is_animating(&self, agent_id: &str) -> bool {
        self.animators
            .get(agent_id)
            .and_then(|animator| animator.motion.lock().ok().map(|m| m.is_animating()))
            .unwrap_or(false)
    }

    pub fn shutdown(&mut self) {
        for animator in self.animators.values_mut() {
            animator.cancel();
        }
    }
}

fn spawn_frames(
    agent_id: String,
    motion: Arc<Mutex<AgentMotion>>,
    sink: Arc<dyn RenderSink>,
    frame_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut frames = time::interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            frames.tick().await;
            let animating = match motion.lock() {
                Ok(mut motion) => {
                    let position = motion.tick(Instant::now());
                    sink.render_position(&agent_id, position);
                    motion.is_animating()
                }
                Err(_) => return,
            };
            if !animating {
                return;
            }
        }
    })
}

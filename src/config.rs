use crate::common::{ApplicationError, ApplicationResult};
use crate::domains::geodesy::GeoPoint;
use crate::domains::route_simulation::SimulationSettings;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub presence: PresenceConfig,
    pub simulation: SimulationConfig,
    pub routing: RoutingConfig,
    pub data_store: DataStoreConfig,
    pub home_base: HomeBaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub path_capacity: usize,
    pub animation_duration_ms: u64,
    pub frame_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub online_window_secs: u64,
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent_id: String,
    pub steps_per_segment: usize,
    pub publish_interval_ms: u64,
    pub log_every: usize,
    pub destination: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStoreConfig {
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeBaseConfig {
    pub path: String,
    pub default_center: GeoPoint,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, or the defaults when no such file exists. A file that is
    /// present but unreadable or malformed is a configuration error.
    pub async fn load<P: AsRef<Path>>(path: P) -> ApplicationResult<Self> {
        let path = path.as_ref();
        match tokio::fs::try_exists(path).await {
            Ok(false) => {
                tracing::info!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            _ => Self::from_file(path)
                .await
                .map_err(|e| ApplicationError::Configuration(e.context(format!("loading {}", path.display())))),
        }
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            agent_id: self.simulation.agent_id.clone(),
            table: self.data_store.table.clone(),
            steps_per_segment: self.simulation.steps_per_segment,
            publish_interval: Duration::from_millis(self.simulation.publish_interval_ms),
            log_every: self.simulation.log_every,
        }
    }
}

impl TrackingConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl PresenceConfig {
    pub fn online_window(&self) -> Duration {
        Duration::from_secs(self.online_window_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            presence: PresenceConfig::default(),
            simulation: SimulationConfig::default(),
            routing: RoutingConfig::default(),
            data_store: DataStoreConfig::default(),
            home_base: HomeBaseConfig::default(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            path_capacity: 50,
            animation_duration_ms: 3000,
            frame_interval_ms: 16,
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            online_window_secs: 600,
            check_interval_secs: 60,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_id: "simulated-rider-01".to_string(),
            steps_per_segment: 20,
            publish_interval_ms: 1000,
            log_every: 10,
            destination: GeoPoint::new(13.020965012517026, 77.64319256724274),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            table: "rider_locations".to_string(),
        }
    }
}

impl Default for HomeBaseConfig {
    fn default() -> Self {
        Self {
            path: "home_base.json".to_string(),
            default_center: GeoPoint::new(17.3850, 78.4867),
        }
    }
}

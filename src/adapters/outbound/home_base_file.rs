use crate::common::{DomainError, DomainResult};
use crate::domains::geodesy::GeoPoint;
use crate::domains::home_base::HomeBaseStore;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps the home base as a `{"lat": .., "lng": ..}` JSON file.
pub struct FileHomeBaseStore {
    path: PathBuf,
}

impl FileHomeBaseStore {
    /// `FLEET_HOME_BASE_PATH` overrides the configured location when no
    /// explicit path is given.
    pub fn new(path: Option<PathBuf>, configured: &str) -> Self {
        let path = path.unwrap_or_else(|| match env::var("FLEET_HOME_BASE_PATH") {
            Ok(v) => PathBuf::from(v),
            Err(_) => PathBuf::from(configured),
        });
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HomeBaseStore for FileHomeBaseStore {
    fn load(&self) -> DomainResult<Option<GeoPoint>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::InfrastructureError(format!("{}", e))),
        };
        let point: GeoPoint = serde_json::from_str(&content)?;
        Ok(Some(point))
    }

    fn save(&self, point: GeoPoint) -> DomainResult<()> {
        if !point.is_finite() {
            return Err(DomainError::InvalidLocation {
                reason: format!("home base must be finite, got {}", point),
            });
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        }
        let json = serde_json::to_string(&point)?;
        fs::write(&self.path, json).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        Ok(())
    }
}

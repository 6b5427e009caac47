use crate::common::{DomainError, DomainResult};
use crate::config::RoutingConfig;
use crate::domains::geodesy::GeoPoint;
use crate::domains::route_simulation::RoutingService;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: geojson::Geometry,
}

/// Routing adapter for an OSRM `route` endpoint, requesting full-overview
/// GeoJSON geometry.
pub struct OsrmRoutingClient {
    http: Client,
    base_url: String,
    profile: String,
}

impl OsrmRoutingClient {
    pub fn new(config: &RoutingConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DomainError::InfrastructureError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        })
    }

    /// OSRM wants `lng,lat` pairs in the path.
    pub fn route_url(&self, start: GeoPoint, end: GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, self.profile, start.lng, start.lat, end.lng, end.lat
        )
    }
}

/// Decode an OSRM response body into `(lat, lng)` waypoints of the first route.
pub fn parse_route_response(body: &str) -> DomainResult<Vec<GeoPoint>> {
    let response: OsrmResponse = serde_json::from_str(body)?;

    if let Some(code) = response.code.as_deref() {
        if code != "Ok" {
            return Err(DomainError::RouteUnavailable {
                reason: format!("{}: {}", code, response.message.unwrap_or_default()),
            });
        }
    }

    let route = response.routes.into_iter().next().ok_or_else(|| DomainError::RouteUnavailable {
        reason: "routing service returned no routes".to_string(),
    })?;

    let coordinates = match route.geometry.value {
        geojson::Value::LineString(coordinates) => coordinates,
        _ => {
            return Err(DomainError::RouteUnavailable {
                reason: "route geometry is not a LineString".to_string(),
            })
        }
    };

    let waypoints = coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] => Ok(GeoPoint::new(*lat, *lng)),
            _ => Err(DomainError::RouteUnavailable {
                reason: "malformed coordinate in route geometry".to_string(),
            }),
        })
        .collect::<DomainResult<Vec<_>>>()?;

    if waypoints.is_empty() {
        return Err(DomainError::RouteUnavailable {
            reason: "route geometry is empty".to_string(),
        });
    }
    Ok(waypoints)
}

#[async_trait]
impl RoutingService for OsrmRoutingClient {
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> DomainResult<Vec<GeoPoint>> {
        let url = self.route_url(start, end);
        tracing::info!("Fetching route: {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| DomainError::RouteUnavailable {
            reason: format!("request failed: {}", e),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DomainError::RouteUnavailable {
            reason: format!("failed to read response: {}", e),
        })?;

        if !status.is_success() {
            return Err(DomainError::RouteUnavailable {
                reason: format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
            });
        }

        parse_route_response(&body).map_err(|e| match e {
            DomainError::SerializationError(e) => DomainError::RouteUnavailable {
                reason: format!("unparseable response: {}", e),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_lng_lat_order() {
        let client = OsrmRoutingClient::new(&RoutingConfig::default()).unwrap();
        let url = client.route_url(GeoPoint::new(12.5, 77.5), GeoPoint::new(13.0, 78.0));
        assert_eq!(
            url,
            "http://router.project-osrm.org/route/v1/driving/77.5,12.5;78,13?overview=full&geometries=geojson"
        );
    }
}

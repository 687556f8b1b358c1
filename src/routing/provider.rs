//! Route computation against an OpenRouteService-compatible directions API.

use super::RouteError;
use crate::config::RoutingConfig;
use crate::model::{Coordinate, Polyline, RouteProfile, RouteQuery};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

const ACCEPT: &str = "application/json, application/geo+json, application/gpx+xml, img/png; charset=utf-8";

#[async_trait]
pub trait RouteProvider: Send + Sync + 'static {
    async fn route(&self, query: &RouteQuery) -> Result<Polyline, RouteError>;
}

pub struct OpenRouteService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouteService {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: std::time::Duration) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouteError::Config(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// `Ok(None)` when no API key is configured: routing is then disabled.
    pub fn from_config(config: &RoutingConfig) -> Result<Option<Self>, RouteError> {
        match config.api_key() {
            Some(key) => Self::new(config.base_url.clone(), key, config.timeout()).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self, profile: RouteProfile) -> String {
        format!("{}/v2/directions/{}/geojson", self.base_url, profile)
    }
}

#[async_trait]
impl RouteProvider for OpenRouteService {
    #[instrument(skip_all, fields(query = %query))]
    async fn route(&self, query: &RouteQuery) -> Result<Polyline, RouteError> {
        let body = json!({ "coordinates": [query.origin.to_array(), query.destination.to_array()] });
        let response = self
            .client
            .post(self.endpoint(query.profile))
            .header("Authorization", &self.api_key)
            .header("Accept", ACCEPT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }
        let text = response.text().await?;
        let path = parse_directions(&text)?;
        debug!(points = path.len(), "Route received");
        Ok(path)
    }
}

#[derive(Deserialize)]
struct Directions {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Deserialize)]
struct DirectionsFeature {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<Vec<f64>>,
}

/// Extracts `features[0].geometry.coordinates`. Extra components (elevation) are ignored.
pub fn parse_directions(body: &str) -> Result<Polyline, RouteError> {
    let directions: Directions = serde_json::from_str(body).map_err(|e| RouteError::Decode(e.to_string()))?;
    let feature = directions.features.into_iter().next().ok_or(RouteError::Empty)?;

    let points = feature
        .geometry
        .coordinates
        .iter()
        .map(|raw| raw.get(..2).and_then(Coordinate::from_slice))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| RouteError::Decode("route contains an invalid position".into()))?;

    if points.is_empty() {
        return Err(RouteError::Empty);
    }
    Ok(Polyline(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_first_feature() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                { "geometry": { "type": "LineString", "coordinates": [[-7.98, 31.63], [-7.9, 31.7, 450.0], [-7.6, 33.57]] } },
                { "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] } }
            ]
        })
        .to_string();

        let path = parse_directions(&body).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.points()[1], Coordinate::new(-7.9, 31.7));
    }

    #[test]
    fn empty_and_malformed_bodies_fail() {
        assert_eq!(parse_directions(r#"{"features": []}"#), Err(RouteError::Empty));
        assert_eq!(parse_directions(r#"{}"#), Err(RouteError::Empty));
        assert_eq!(
            parse_directions(r#"{"features": [{"geometry": {"coordinates": []}}]}"#),
            Err(RouteError::Empty)
        );
        assert!(matches!(parse_directions("<html>"), Err(RouteError::Decode(_))));
        assert!(matches!(
            parse_directions(r#"{"features": [{"geometry": {"coordinates": [[1.0]]}}]}"#),
            Err(RouteError::Decode(_))
        ));
    }

    #[test]
    fn no_key_means_no_provider() {
        let config = RoutingConfig::default();
        assert!(OpenRouteService::from_config(&config).unwrap().is_none());

        let config = RoutingConfig {
            api_key: Some("k".into()),
            base_url: "http://localhost:8080/".into(),
            ..RoutingConfig::default()
        };
        let provider = OpenRouteService::from_config(&config).unwrap().unwrap();
        assert_eq!(
            provider.endpoint(RouteProfile::DrivingCar),
            "http://localhost:8080/v2/directions/driving-car/geojson"
        );
    }
}

//! OpenRouteService `foot-walking` directions (GeoJSON).

use super::{DirectionsProvider, Route, RouteRequest, RouteSource, RouteStep};
use crate::credentials::Provider;
use crate::geo::Coordinate;
use crate::http::{self, ProviderError};
use serde::Deserialize;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/v2";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: LineString,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct LineString {
    /// `[lon, lat]` pairs, optionally with elevation
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    way_points: Vec<usize>,
}

/// OpenRouteService client.
pub struct OpenRouteService {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl Default for OpenRouteService {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenRouteService {
    pub fn new() -> Self {
        Self {
            http: http::build_client(http::DEFAULT_TIMEOUT),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "vi".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn request_body(&self, request: &RouteRequest) -> serde_json::Value {
        let coordinates: Vec<[f64; 2]> = request
            .anchors()
            .iter()
            .map(|c| [c.longitude, c.latitude])
            .collect();

        serde_json::json!({
            "coordinates": coordinates,
            "instructions": true,
            "geometry": true,
            "elevation": false,
            "language": self.language,
        })
    }
}

impl DirectionsProvider for OpenRouteService {
    fn provider(&self) -> Provider {
        Provider::OpenRouteService
    }

    async fn route(&self, api_key: &str, request: &RouteRequest) -> Result<Route, ProviderError> {
        let url = format!("{}/directions/foot-walking/geojson", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", api_key)
            .header("Accept", "application/json, application/geo+json")
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::classify_status(status, &body));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Normalize a GeoJSON directions body into a canonical route.
pub(crate) fn parse_response(body: &str) -> Result<Route, ProviderError> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("geojson body: {}", e)))?;

    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no route found".to_string()))?;

    let coordinates = feature
        .geometry
        .coordinates
        .iter()
        .map(|pair| match pair.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
            _ => Err(ProviderError::InvalidResponse(
                "coordinate with fewer than two values".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let segments = &feature.properties.segments;
    let distance: f64 = segments.iter().map(|s| s.distance).sum();
    let duration: f64 = segments.iter().map(|s| s.duration).sum();

    let steps = segments
        .iter()
        .flat_map(|s| s.steps.iter())
        .map(|step| {
            let start = step.way_points.first().copied().unwrap_or(0);
            let end = step.way_points.last().copied().unwrap_or(start);
            RouteStep {
                instruction: step.instruction.clone(),
                distance: step.distance,
                duration: step.duration,
                start_index: start,
                end_index: end,
            }
        })
        .collect();

    Route::from_provider(coordinates, distance, duration, steps, RouteSource::Secondary)
}

//! Google Directions (walking mode).

use super::{polyline, strip_markup, DirectionsProvider, Route, RouteRequest, RouteSource, RouteStep};
use crate::credentials::Provider;
use crate::geo::{self, Coordinate};
use crate::http::{self, ProviderError};
use serde::Deserialize;

/// Default Directions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<GoogleRoute>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    overview_polyline: EncodedPolyline,
    #[serde(default)]
    legs: Vec<GoogleLeg>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    #[serde(default)]
    distance: TextValue,
    #[serde(default)]
    duration: TextValue,
    #[serde(default)]
    steps: Vec<GoogleStep>,
}

#[derive(Debug, Default, Deserialize)]
struct TextValue {
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleStep {
    #[serde(default)]
    html_instructions: String,
    #[serde(default)]
    distance: TextValue,
    #[serde(default)]
    duration: TextValue,
    end_location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Directions client.
pub struct GoogleDirections {
    http: reqwest::Client,
    base_url: String,
    language: String,
    region: String,
}

impl Default for GoogleDirections {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleDirections {
    pub fn new() -> Self {
        Self {
            http: http::build_client(http::DEFAULT_TIMEOUT),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "vi".to_string(),
            region: "VN".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Instruction language and region bias.
    pub fn with_locale(mut self, language: impl Into<String>, region: impl Into<String>) -> Self {
        self.language = language.into();
        self.region = region.into();
        self
    }

    fn query(&self, api_key: &str, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", request.origin.to_string()),
            ("destination", request.destination.to_string()),
            ("mode", "walking".to_string()),
            ("language", self.language.clone()),
            ("region", self.region.clone()),
            ("key", api_key.to_string()),
        ];

        if !request.waypoints.is_empty() {
            let joined = request
                .waypoints
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join("|");
            query.push(("waypoints", joined));
        }

        query
    }
}

impl DirectionsProvider for GoogleDirections {
    fn provider(&self) -> Provider {
        Provider::GoogleMaps
    }

    async fn route(&self, api_key: &str, request: &RouteRequest) -> Result<Route, ProviderError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&self.query(api_key, request))
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

/// Map a Directions `status` field to an error, `None` for `OK`.
fn status_error(status: &str, message: Option<&str>) -> Option<ProviderError> {
    let detail = format!("{} ({})", status, message.unwrap_or("no details"));
    match status {
        "OK" => None,
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Some(ProviderError::QuotaExceeded),
        "REQUEST_DENIED" | "INVALID_REQUEST" | "NOT_FOUND" | "ZERO_RESULTS"
        | "MAX_WAYPOINTS_EXCEEDED" | "MAX_ROUTE_LENGTH_EXCEEDED" => {
            Some(ProviderError::InvalidRequest(detail))
        }
        _ => Some(ProviderError::Network(detail)),
    }
}

/// Normalize a Directions JSON body into a canonical route.
pub(crate) fn parse_response(body: &str) -> Result<Route, ProviderError> {
    let response: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("directions body: {}", e)))?;

    if let Some(err) = status_error(&response.status, response.error_message.as_deref()) {
        return Err(err);
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no routes in response".to_string()))?;

    let coordinates = polyline::decode(&route.overview_polyline.points)?;

    let mut distance = 0.0;
    let mut duration = 0.0;
    let mut steps = Vec::new();
    let mut floor = 0;

    for leg in &route.legs {
        distance += leg.distance.value;
        duration += leg.duration.value;

        for step in &leg.steps {
            let end_location = Coordinate::new(step.end_location.lat, step.end_location.lng);
            let end = nearest_index_from(&coordinates, end_location, floor);
            steps.push(RouteStep {
                instruction: strip_markup(&step.html_instructions),
                distance: step.distance.value,
                duration: step.duration.value,
                start_index: floor,
                end_index: end,
            });
            floor = end;
        }
    }

    Route::from_provider(coordinates, distance, duration, steps, RouteSource::Primary)
}

/// Index of the polyline point nearest to `target`, searching from `from`.
fn nearest_index_from(coordinates: &[Coordinate], target: Coordinate, from: usize) -> usize {
    coordinates
        .iter()
        .enumerate()
        .skip(from)
        .fold((from, f64::INFINITY), |(best, best_d), (i, c)| {
            let d = geo::distance(*c, target);
            if d < best_d {
                (i, d)
            } else {
                (best, best_d)
            }
        })
        .0
}

//! Walking directions.
//!
//! Providers return a canonical [`Route`]. The [`RoutingChain`] tries the
//! primary mapping provider, then the secondary routing engine, then the local
//! geometric fallback, so planning always ends with a usable route.

pub mod chain;
pub mod fallback;
pub mod google;
pub mod instructions;
pub mod ors;
pub mod polyline;

use crate::credentials::Provider;
use crate::geo::{self, BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub use crate::http::ProviderError;
pub use chain::{ChainSettings, RoutingChain};
pub use fallback::FallbackRouter;
pub use google::GoogleDirections;
pub use instructions::{InstructionLocale, InstructionTemplates};
pub use ors::OpenRouteService;

/// Average walking speed used for duration estimates (m/s).
pub const WALKING_SPEED_MPS: f64 = 1.4;

/// Which link of the chain produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Primary,
    Secondary,
    Fallback,
}

/// One maneuver of a route, covering `coordinates[start_index..=end_index]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub start_index: usize,
    pub end_index: usize,
}

/// Canonical walking route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    coordinates: Vec<Coordinate>,
    distance: f64,
    duration: f64,
    steps: Vec<RouteStep>,
    bbox: BoundingBox,
    source: RouteSource,
}

impl Route {
    /// Build a route, enforcing the canonical invariants.
    ///
    /// Fewer than two points is an invalid response. Negative or non-finite
    /// totals are clamped to zero, the bounding box is recomputed and step
    /// ranges are clamped into the polyline and made monotonic.
    pub fn new(
        coordinates: Vec<Coordinate>,
        distance: f64,
        duration: f64,
        steps: Vec<RouteStep>,
        source: RouteSource,
    ) -> Result<Self, ProviderError> {
        if coordinates.len() < 2 {
            return Err(ProviderError::InvalidResponse(format!(
                "route has {} coordinate(s), need at least 2",
                coordinates.len()
            )));
        }

        let bbox = BoundingBox::from_coordinates(&coordinates).ok_or_else(|| {
            ProviderError::InvalidResponse("route has no coordinates".to_string())
        })?;
        let steps = normalize_steps(steps, coordinates.len());

        Ok(Self {
            coordinates,
            distance: non_negative(distance),
            duration: non_negative(duration),
            steps,
            bbox,
            source,
        })
    }

    /// Like [`Route::new`], filling totals from the polyline when a provider
    /// reports zero for a path that actually has length.
    pub fn from_provider(
        coordinates: Vec<Coordinate>,
        distance: f64,
        duration: f64,
        steps: Vec<RouteStep>,
        source: RouteSource,
    ) -> Result<Self, ProviderError> {
        let length = geo::path_length(&coordinates);
        let distance = if non_negative(distance) > 0.0 {
            distance
        } else {
            length
        };
        let duration = if non_negative(duration) > 0.0 {
            duration
        } else {
            distance / WALKING_SPEED_MPS
        };

        Self::new(coordinates, distance, duration, steps, source)
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Total distance in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }

    pub fn start(&self) -> Coordinate {
        self.coordinates[0]
    }

    pub fn end(&self) -> Coordinate {
        self.coordinates[self.coordinates.len() - 1]
    }

    /// Length of the polyline itself, which may differ from the provider's
    /// reported distance.
    pub fn polyline_length(&self) -> f64 {
        geo::path_length(&self.coordinates)
    }
}

/// Origin, ordered waypoints and destination of a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
}

impl RouteRequest {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
        }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Coordinate>) -> Self {
        self.waypoints = waypoints;
        self
    }

    /// Origin, waypoints, destination in walking order.
    pub fn anchors(&self) -> Vec<Coordinate> {
        let mut anchors = Vec::with_capacity(self.waypoints.len() + 2);
        anchors.push(self.origin);
        anchors.extend(self.waypoints.iter().copied());
        anchors.push(self.destination);
        anchors
    }
}

/// A walking-directions backend.
pub trait DirectionsProvider: Send + Sync {
    /// Which credential set this provider draws keys from
    fn provider(&self) -> Provider;

    /// Request a route using the given API key
    fn route(
        &self,
        api_key: &str,
        request: &RouteRequest,
    ) -> impl std::future::Future<Output = Result<Route, ProviderError>> + Send;
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn normalize_steps(steps: Vec<RouteStep>, len: usize) -> Vec<RouteStep> {
    let last = len.saturating_sub(1);
    let mut floor = 0;

    steps
        .into_iter()
        .map(|mut step| {
            step.start_index = step.start_index.clamp(floor, last);
            step.end_index = step.end_index.clamp(step.start_index, last);
            step.distance = non_negative(step.distance);
            step.duration = non_negative(step.duration);
            floor = step.end_index;
            step
        })
        .collect()
}

fn markup_pattern() -> Option<&'static regex::Regex> {
    static PATTERN: OnceLock<Option<regex::Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| regex::Regex::new(r"<[^>]*>").ok())
        .as_ref()
}

/// Strip HTML tags and common entities from a provider instruction.
pub fn strip_markup(html: &str) -> String {
    let text = match markup_pattern() {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    };
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

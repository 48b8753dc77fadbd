//! Integration test for the routing chain when no provider can answer.

use std::time::Duration;
use wanderer::credentials::{CredentialRotator, CredentialSet, Provider};
use wanderer::geo::{self, CompassDirection, Coordinate};
use wanderer::routing::{
    ChainSettings, GoogleDirections, InstructionTemplates, OpenRouteService, RouteRequest,
    RouteSource, RoutingChain, WALKING_SPEED_MPS,
};

const ORIGIN: Coordinate = Coordinate::new(10.762622, 106.660172);
const DESTINATION: Coordinate = Coordinate::new(10.771701, 106.698059);

fn request() -> RouteRequest {
    RouteRequest::new(ORIGIN, DESTINATION).with_waypoints(vec![
        Coordinate::new(10.765500, 106.672800),
        Coordinate::new(10.768600, 106.685400),
    ])
}

fn fast_settings() -> ChainSettings {
    ChainSettings {
        max_retries: 1,
        backoff_base: Duration::from_millis(0),
    }
}

fn assert_fallback_route(route: &wanderer::Route, request: &RouteRequest) {
    assert_eq!(route.source(), RouteSource::Fallback);
    assert!(route.coordinates().len() >= 2);
    assert!(route.distance() > 0.0);
    assert!(route.bbox().contains(&ORIGIN));
    assert!(route.bbox().contains(&DESTINATION));

    // Waypoints sit close to the straight corridor
    let direct = geo::distance(ORIGIN, DESTINATION);
    assert!(route.distance() >= direct);
    assert!(route.distance() < direct * 1.05);
    assert!((route.duration() - route.distance() / WALKING_SPEED_MPS).abs() < 1e-6);

    // One step per anchor pair, each phrased with a compass direction
    let templates = InstructionTemplates::default();
    assert_eq!(route.steps().len(), request.anchors().len() - 1);
    for step in route.steps() {
        assert!(
            CompassDirection::ALL
                .iter()
                .any(|d| step.instruction.contains(templates.direction(*d))),
            "no compass direction in '{}'",
            step.instruction
        );
        assert!(step.start_index <= step.end_index);
        assert!(step.end_index < route.coordinates().len());
    }

    assert_eq!(route.start(), ORIGIN);
    assert_eq!(route.end(), DESTINATION);
}

#[tokio::test]
async fn test_no_providers_configured() {
    let chain = RoutingChain::new(CredentialRotator::new().into_shared(), fast_settings());
    let request = request();
    let route = chain.route(&request).await;
    assert_fallback_route(&route, &request);
}

#[tokio::test]
async fn test_providers_without_keys() {
    let chain = RoutingChain::new(CredentialRotator::new().into_shared(), fast_settings())
        .with_primary(GoogleDirections::new())
        .with_secondary(OpenRouteService::new());

    let request = request();
    let route = chain.route(&request).await;
    assert_fallback_route(&route, &request);
}

#[tokio::test]
async fn test_unreachable_providers() {
    let rotator = CredentialRotator::new()
        .with_set(Provider::GoogleMaps, CredentialSet::new(vec!["g-key".to_string()]))
        .with_set(Provider::OpenRouteService, CredentialSet::new(vec!["o-key".to_string()]))
        .into_shared();

    // Nothing listens on the discard port
    let chain = RoutingChain::new(rotator, fast_settings())
        .with_primary(GoogleDirections::new().with_base_url("http://127.0.0.1:9/directions/json"))
        .with_secondary(OpenRouteService::new().with_base_url("http://127.0.0.1:9/v2"));

    let request = request();
    let route = chain.route(&request).await;
    assert_fallback_route(&route, &request);
}

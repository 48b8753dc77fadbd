//! Provider fallback chain: primary -> secondary -> local approximation.

use super::{
    DirectionsProvider, FallbackRouter, GoogleDirections, OpenRouteService, ProviderError, Route,
    RouteRequest,
};
use crate::credentials::{Provider, SharedRotator};
use std::time::Duration;

/// Retry policy shared by both remote providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    /// Transient failures tolerated per provider before giving up on it
    pub max_retries: u32,
    /// Backoff before retry `n` is `backoff_base * n`
    pub backoff_base: Duration,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

/// Ordered walking-directions providers ending in a local fallback.
pub struct RoutingChain<P = GoogleDirections, S = OpenRouteService> {
    primary: Option<P>,
    secondary: Option<S>,
    fallback: FallbackRouter,
    rotator: SharedRotator,
    settings: ChainSettings,
}

impl RoutingChain {
    /// Chain with no remote providers; add them with the `with_*` builders.
    pub fn new(rotator: SharedRotator, settings: ChainSettings) -> Self {
        Self {
            primary: None,
            secondary: None,
            fallback: FallbackRouter::default(),
            rotator,
            settings,
        }
    }
}

impl<P, S> RoutingChain<P, S>
where
    P: DirectionsProvider,
    S: DirectionsProvider,
{
    pub fn with_primary<P2: DirectionsProvider>(self, primary: P2) -> RoutingChain<P2, S> {
        RoutingChain {
            primary: Some(primary),
            secondary: self.secondary,
            fallback: self.fallback,
            rotator: self.rotator,
            settings: self.settings,
        }
    }

    pub fn with_secondary<S2: DirectionsProvider>(self, secondary: S2) -> RoutingChain<P, S2> {
        RoutingChain {
            primary: self.primary,
            secondary: Some(secondary),
            fallback: self.fallback,
            rotator: self.rotator,
            settings: self.settings,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackRouter) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn rotator(&self) -> &SharedRotator {
        &self.rotator
    }

    /// Compute a walking route. Never fails: provider errors are logged and
    /// the next link of the chain is tried.
    pub async fn route(&self, request: &RouteRequest) -> Route {
        {
            let mut rotator = self.rotator.lock().await;
            rotator.reset(Provider::GoogleMaps);
            rotator.reset(Provider::OpenRouteService);
        }

        if let Some(primary) = &self.primary {
            match self.attempt(primary, request).await {
                Ok(route) => {
                    tracing::info!(
                        "{} route: {:.0} m, {} points",
                        primary.provider(),
                        route.distance(),
                        route.coordinates().len()
                    );
                    return route;
                }
                Err(e) => tracing::warn!("{} failed, trying next provider: {}", primary.provider(), e),
            }
        }

        if let Some(secondary) = &self.secondary {
            let has_keys = self.rotator.lock().await.has_keys(secondary.provider());
            if has_keys {
                match self.attempt(secondary, request).await {
                    Ok(route) => {
                        tracing::info!(
                            "{} route: {:.0} m, {} points",
                            secondary.provider(),
                            route.distance(),
                            route.coordinates().len()
                        );
                        return route;
                    }
                    Err(e) => tracing::warn!(
                        "{} failed, using local fallback: {}",
                        secondary.provider(),
                        e
                    ),
                }
            } else {
                tracing::debug!("No {} keys configured, skipping", secondary.provider());
            }
        }

        tracing::info!("Using local fallback route");
        self.fallback.route(request)
    }

    /// Run one provider to completion under the retry and rotation policy.
    async fn attempt<D: DirectionsProvider>(
        &self,
        provider: &D,
        request: &RouteRequest,
    ) -> Result<Route, ProviderError> {
        let kind = provider.provider();
        let mut failures = 0u32;

        loop {
            let key = {
                let mut rotator = self.rotator.lock().await;
                if rotator.should_rotate(kind) {
                    rotator.advance(kind);
                }
                rotator.current_key(kind)?.to_string()
            };

            match provider.route(&key, request).await {
                Ok(route) => {
                    self.rotator.lock().await.record_request(kind);
                    return Ok(route);
                }
                Err(ProviderError::QuotaExceeded) => {
                    tracing::warn!("{} key over quota, rotating", kind);
                    if !self.rotator.lock().await.advance(kind) {
                        return Err(ProviderError::QuotaExceeded);
                    }
                }
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures >= self.settings.max_retries.max(1) {
                        return Err(e);
                    }
                    let delay = self.settings.backoff_base * failures;
                    tracing::warn!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        kind,
                        failures,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

//! Service container.
//!
//! Builds the shared credential rotator, the routing chain and the story
//! generator from configuration, and hands them to callers explicitly.

use crate::config::{AppConfig, ProviderSettings};
use crate::credentials::{CredentialRotator, CredentialSet, KeyStats, Provider, SharedRotator};
use crate::geo::Coordinate;
use crate::http::ProviderError;
use crate::routing::{FallbackRouter, GoogleDirections, OpenRouteService, Route, RoutingChain};
use crate::session::{SessionError, WalkPlan};
use crate::story::{GroqClient, Story, StoryGenerator};
use serde::Serialize;

/// Every provider, in status display order.
pub const PROVIDERS: [Provider; 3] = [Provider::GoogleMaps, Provider::OpenRouteService, Provider::Groq];

/// Health of one external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    /// Switched on in config
    pub enabled: bool,
    /// At least one usable key
    pub has_keys: bool,
    /// Enabled and has keys
    pub ready: bool,
    pub stats: KeyStats,
}

/// Everything needed to plan a walk.
pub struct Services {
    rotator: SharedRotator,
    providers: ProviderSettings,
    routing: RoutingChain,
    stories: StoryGenerator,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Self {
        let rotator = build_rotator(config).into_shared();
        let providers = &config.providers;

        let fallback = FallbackRouter::new(config.instruction_templates())
            .with_point_spacing(config.walking.fallback_point_spacing_m)
            .with_walking_speed(config.walking.walking_speed_mps);
        let mut routing =
            RoutingChain::new(rotator.clone(), config.chain_settings()).with_fallback(fallback);

        if providers.google_enabled {
            let mut google =
                GoogleDirections::new().with_locale(providers.language.clone(), providers.region.clone());
            if let Some(url) = &providers.google_base_url {
                google = google.with_base_url(url.clone());
            }
            routing = routing.with_primary(google);
        }

        if providers.openrouteservice_enabled {
            let mut ors = OpenRouteService::new().with_language(providers.language.clone());
            if let Some(url) = &providers.openrouteservice_base_url {
                ors = ors.with_base_url(url.clone());
            }
            routing = routing.with_secondary(ors);
        }

        let mut stories = StoryGenerator::new(rotator.clone(), config.story_settings());
        if providers.groq_enabled {
            let mut groq = GroqClient::new().with_model(config.story.model.clone());
            if let Some(url) = &providers.groq_base_url {
                groq = groq.with_base_url(url.clone());
            }
            stories = stories.with_client(groq);
        }

        tracing::debug!(
            "Services ready (google: {}, ors: {}, groq: {})",
            providers.google_enabled,
            providers.openrouteservice_enabled,
            providers.groq_enabled
        );

        Self {
            rotator,
            providers: providers.clone(),
            routing,
            stories,
        }
    }

    pub fn rotator(&self) -> &SharedRotator {
        &self.rotator
    }

    pub fn routing(&self) -> &RoutingChain {
        &self.routing
    }

    pub fn stories(&self) -> &StoryGenerator {
        &self.stories
    }

    /// Route from `start` through the plan's checkpoints.
    pub async fn plan_route(&self, plan: &WalkPlan, start: Coordinate) -> Result<Route, SessionError> {
        let request = plan.route_request(start)?;
        Ok(self.routing.route(&request).await)
    }

    /// Story for a planned walk. Falls back rather than failing.
    pub async fn generate_story(&self, plan: &WalkPlan, route: Option<&Route>) -> Story {
        self.stories.generate(&plan.story_request(route)).await
    }

    pub fn is_enabled(&self, provider: Provider) -> bool {
        match provider {
            Provider::GoogleMaps => self.providers.google_enabled,
            Provider::OpenRouteService => self.providers.openrouteservice_enabled,
            Provider::Groq => self.providers.groq_enabled,
        }
    }

    /// Enabled, has-keys and ready flags plus key statistics per provider.
    pub async fn status(&self) -> Vec<ProviderStatus> {
        let rotator = self.rotator.lock().await;
        PROVIDERS
            .iter()
            .map(|&provider| {
                let enabled = self.is_enabled(provider);
                let has_keys = rotator.has_keys(provider);
                let status = ProviderStatus {
                    provider,
                    enabled,
                    has_keys,
                    ready: enabled && has_keys,
                    stats: rotator.stats(provider),
                };
                tracing::debug!(
                    "{}: enabled={} keys={}/{} ready={}",
                    provider,
                    enabled,
                    status.stats.current,
                    status.stats.total,
                    status.ready
                );
                status
            })
            .collect()
    }

    /// Try the current story key against the LLM endpoint.
    ///
    /// `None` when story generation is disabled.
    pub async fn check_story_connection(&self) -> Option<Result<(), ProviderError>> {
        let client = self.stories.client()?;
        let key = self
            .rotator
            .lock()
            .await
            .current_key(Provider::Groq)
            .map(str::to_string);

        let result = match key {
            Ok(key) => client.test_connection(&key).await,
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(()) => tracing::info!("{} connection OK", Provider::Groq),
            Err(e) => tracing::warn!("{} connection failed: {}", Provider::Groq, e),
        }
        Some(result)
    }
}

/// Rotator loaded with every configured key.
pub fn build_rotator(config: &AppConfig) -> CredentialRotator {
    let max = config.providers.max_requests_per_key.unwrap_or(0);
    let set = |keys: &[String]| CredentialSet::new(keys.to_vec()).with_max_requests_per_key(max);

    CredentialRotator::new()
        .with_set(Provider::GoogleMaps, set(&config.api_keys.google_maps))
        .with_set(Provider::OpenRouteService, set(&config.api_keys.openrouteservice))
        .with_set(Provider::Groq, set(&config.api_keys.groq))
}

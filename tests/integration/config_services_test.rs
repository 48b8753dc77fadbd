//! Integration test: configuration file to planned walk.

use tempfile::tempdir;
use wanderer::config::{load_config_from, save_config_to, AppConfig};
use wanderer::geo::Coordinate;
use wanderer::routing::RouteSource;
use wanderer::session::WalkPlan;
use wanderer::story::{FallbackStyle, Genre};
use wanderer::{Provider, Services};

#[tokio::test]
async fn test_offline_config_plans_with_fallbacks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api_keys]
groq = ["YOUR_GROQ_API_KEY"]

[providers]
google_enabled = false
openrouteservice_enabled = false

[walking]
default_genre = "sci-fi"
instruction_locale = "en"
fallback_point_spacing_m = 50.0

[story]
fallback = "simplified"
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.walking.default_genre, Genre::SciFi);

    let services = Services::from_config(&config);
    // Placeholder keys are dropped
    assert!(!services.rotator().lock().await.has_keys(Provider::Groq));

    let mut plan = WalkPlan::new(config.walking.default_genre).looped(true);
    plan.add_checkpoint(Coordinate::new(10.7769, 106.7009));
    plan.add_checkpoint(Coordinate::new(10.7798, 106.6990));

    let start = Coordinate::new(10.7756, 106.7019);
    let route = services.plan_route(&plan, start).await.unwrap();
    assert_eq!(route.source(), RouteSource::Fallback);
    assert_eq!(route.end(), start);
    assert_eq!(route.steps().len(), 3);
    assert!(route.steps()[0].instruction.starts_with("Head "));

    let story = services.generate_story(&plan, Some(&route)).await;
    assert_eq!(story.len(), 3);
    assert_eq!(story.genre, Genre::SciFi);
    assert_eq!(story.segments[0].checkpoint_id, Some(plan.checkpoints[0].id));
    assert_eq!(story.segments[2].checkpoint_id, None);
    assert_eq!(config.story.fallback, FallbackStyle::Simplified);
}

#[test]
fn test_config_round_trip_keeps_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.api_keys.google_maps = vec!["AIza-1".to_string(), "AIza-2".to_string()];
    config.walking.trigger_radius_m = 35.0;
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.api_keys.google_maps, config.api_keys.google_maps);
    assert_eq!(loaded.walking.trigger_radius_m, 35.0);
    assert_eq!(loaded.data_dir, dir.path());
}

//! Unit tests for API key rotation.

use wanderer::credentials::{CredentialError, CredentialRotator, CredentialSet, Provider};

fn rotator(provider: Provider, n: usize) -> CredentialRotator {
    CredentialRotator::new().with_set(
        provider,
        CredentialSet::new((1..=n).map(|i| format!("{}-key-{}", provider, i))),
    )
}

#[test]
fn test_advancing_through_every_key_exhausts() {
    for n in 1..=4 {
        let mut rotator = rotator(Provider::OpenRouteService, n);

        for i in 0..n {
            assert!(!rotator.is_exhausted(Provider::OpenRouteService));
            let advanced = rotator.advance(Provider::OpenRouteService);
            assert_eq!(advanced, i + 1 < n);
        }

        assert!(rotator.is_exhausted(Provider::OpenRouteService));
        assert_eq!(
            rotator.current_key(Provider::OpenRouteService),
            Err(CredentialError::KeysExhausted(Provider::OpenRouteService))
        );
    }
}

#[test]
fn test_reset_restores_first_key() {
    let mut rotator = rotator(Provider::GoogleMaps, 2);
    rotator.advance(Provider::GoogleMaps);
    rotator.advance(Provider::GoogleMaps);
    assert!(rotator.current_key(Provider::GoogleMaps).is_err());

    rotator.reset(Provider::GoogleMaps);
    assert_eq!(rotator.current_key(Provider::GoogleMaps).unwrap(), "Google Maps-key-1");
}

#[test]
fn test_providers_rotate_independently() {
    let mut rotator = CredentialRotator::new()
        .with_set(Provider::GoogleMaps, CredentialSet::new(vec!["g1".into(), "g2".into()]))
        .with_set(Provider::Groq, CredentialSet::new(vec!["q1".into()]));

    rotator.advance(Provider::GoogleMaps);
    assert_eq!(rotator.current_key(Provider::GoogleMaps).unwrap(), "g2");
    assert_eq!(rotator.current_key(Provider::Groq).unwrap(), "q1");

    rotator.reset_all();
    assert_eq!(rotator.current_key(Provider::GoogleMaps).unwrap(), "g1");
}

#[test]
fn test_unconfigured_provider() {
    let rotator = CredentialRotator::new();
    assert_eq!(
        rotator.current_key(Provider::Groq),
        Err(CredentialError::NoKeysConfigured(Provider::Groq))
    );
    assert!(!rotator.has_keys(Provider::Groq));
    assert_eq!(rotator.stats(Provider::Groq).total, 0);
}

#[test]
fn test_request_budget_triggers_rotation() {
    let mut rotator = CredentialRotator::new().with_set(
        Provider::Groq,
        CredentialSet::new(vec!["a".into(), "b".into()]).with_max_requests_per_key(2),
    );

    rotator.record_request(Provider::Groq);
    assert!(!rotator.should_rotate(Provider::Groq));
    rotator.record_request(Provider::Groq);
    assert!(rotator.should_rotate(Provider::Groq));

    rotator.advance(Provider::Groq);
    assert!(!rotator.should_rotate(Provider::Groq));
    let stats = rotator.stats(Provider::Groq);
    assert_eq!((stats.current, stats.total, stats.remaining), (2, 2, 1));
}

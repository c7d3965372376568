//! Integration tests for location resolution with Wiremock
//!
//! Runs the resolver against a mock Nominatim server with the real
//! HTTP client and the SQLite-backed cache.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use vendor_locator::adapters::outbound::{
    DashMapGeocodeCache, NominatimConfig, NominatimGeocoder, SqliteGeocodeCache,
};
use vendor_locator::infrastructure::{CancelHandle, Throttle};
use vendor_locator::{GeocodeCache, GeocodeError, KeyNormalization, LocationResolver, ResolveError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocoder_for(server: &MockServer) -> NominatimGeocoder {
    NominatimGeocoder::new(NominatimConfig {
        base_url: server.uri(),
        user_agent: "vendor-locator-tests/1.0".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn place(lat: &str, lon: &str) -> serde_json::Value {
    serde_json::json!([{ "lat": lat, "lon": lon, "display_name": "somewhere" }])
}

/// A resolved location is written to the cache file and served from it
/// after a restart without contacting the geocoder again.
#[tokio::test]
async fn test_cache_survives_restart() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("geocode.db");

    let first_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Brooklyn, NY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place("40.6782", "-73.9442")))
        .expect(1)
        .mount(&first_server)
        .await;

    {
        let cache = Arc::new(SqliteGeocodeCache::open(&cache_path).unwrap());
        let resolver = LocationResolver::new(Arc::new(geocoder_for(&first_server)), cache.clone());

        let coordinate = resolver.resolve("Brooklyn, NY").await.unwrap();
        assert!((coordinate.latitude() - 40.6782).abs() < 1e-9);
        assert!((coordinate.longitude() - -73.9442).abs() < 1e-9);

        cache.flush().await;
    }

    let second_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&second_server)
        .await;

    let cache = Arc::new(SqliteGeocodeCache::open(&cache_path).unwrap());
    assert_eq!(cache.len(), 1);
    let resolver = LocationResolver::new(Arc::new(geocoder_for(&second_server)), cache);

    let coordinate = resolver.resolve("Brooklyn, NY").await.unwrap();
    assert!((coordinate.latitude() - 40.6782).abs() < 1e-9);
}

/// Unknown places are reported as not found and retried next time.
#[tokio::test]
async fn test_no_match_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = LocationResolver::new(Arc::new(geocoder_for(&server)), cache.clone());

    for _ in 0..2 {
        let err = resolver.resolve("Atlantis").await.unwrap_err();
        assert!(matches!(err, ResolveError::NoMatch));
        assert!(err.is_not_found());
    }
    assert!(cache.is_empty());
}

/// Upstream failures stay distinguishable from "not found".
#[tokio::test]
async fn test_service_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = LocationResolver::new(Arc::new(geocoder_for(&server)), cache.clone());

    let err = resolver.resolve("Queens, NY").await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Service(GeocodeError::Status { status: 503 })
    ));
    assert!(err.is_transient());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let resolver = LocationResolver::new(
        Arc::new(geocoder_for(&server)),
        Arc::new(DashMapGeocodeCache::new()),
    );

    let err = resolver.resolve("Queens, NY").await.unwrap_err();
    assert!(matches!(err, ResolveError::Service(GeocodeError::Malformed(_))));
}

/// A slow geocoder is abandoned at the resolver deadline.
#[tokio::test]
async fn test_slow_geocoder_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(place("40.0", "-74.0"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = LocationResolver::new(Arc::new(geocoder_for(&server)), cache.clone())
        .with_deadline(Duration::from_millis(200));

    let started = Instant::now();
    let err = resolver.resolve("Staten Island").await.unwrap_err();

    assert!(matches!(err, ResolveError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(cache.is_empty());
}

/// Cancelling mid-lookup returns promptly and caches nothing.
#[tokio::test]
async fn test_cancel_in_flight_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(place("40.0", "-74.0"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = Arc::new(LocationResolver::new(
        Arc::new(geocoder_for(&server)),
        cache.clone(),
    ));
    let cancel = CancelHandle::new();

    let task = {
        let resolver = resolver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { resolver.resolve_with_cancel("Bronx", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(ResolveError::Cancelled)));
    assert!(cache.is_empty());
}

/// Concurrent resolutions of one place all agree and leave one entry.
#[tokio::test]
async fn test_concurrent_resolves_of_same_place() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Harlem"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place("40.8116", "-73.9465")))
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = Arc::new(LocationResolver::new(
        Arc::new(geocoder_for(&server)),
        cache.clone(),
    ));

    let lookups = (0..8).map(|_| {
        let resolver = resolver.clone();
        async move { resolver.resolve("Harlem").await }
    });
    let results = futures::future::join_all(lookups).await;

    for result in results {
        let coordinate = result.unwrap();
        assert!((coordinate.latitude() - 40.8116).abs() < 1e-9);
    }
    assert_eq!(cache.len(), 1);
}

/// Equivalent spellings share one cache entry under trim_lowercase keys.
#[tokio::test]
async fn test_normalized_keys_share_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Brooklyn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place("40.6782", "-73.9442")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(DashMapGeocodeCache::new());
    let resolver = LocationResolver::new(Arc::new(geocoder_for(&server)), cache.clone())
        .with_normalization(KeyNormalization::TrimLowercase);

    let first = resolver.resolve("Brooklyn").await.unwrap();
    let second = resolver.resolve("  BROOKLYN ").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("brooklyn"), Some(first));
}

/// Throttled lookups are spaced at least the minimum interval apart.
#[tokio::test]
async fn test_throttle_spaces_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place("40.0", "-74.0")))
        .expect(2)
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server)
        .with_throttle(Arc::new(Throttle::new(Duration::from_millis(300))));
    let resolver = LocationResolver::new(Arc::new(geocoder), Arc::new(DashMapGeocodeCache::new()));

    let started = Instant::now();
    resolver.resolve("Astoria").await.unwrap();
    resolver.resolve("Flushing").await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
}

/// Lookups abandoned at the deadline while queued behind the throttle do
/// not hold up requests that arrive after the burst has drained.
#[tokio::test]
async fn test_idle_request_after_timed_out_burst() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place("40.0", "-74.0")))
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server)
        .with_throttle(Arc::new(Throttle::new(Duration::from_millis(100))));
    let resolver = Arc::new(
        LocationResolver::new(Arc::new(geocoder), Arc::new(DashMapGeocodeCache::new()))
            .with_deadline(Duration::from_millis(150)),
    );

    let burst = (0..20).map(|i| {
        let resolver = resolver.clone();
        async move { resolver.resolve(&format!("place-{}", i)).await }
    });
    let results = futures::future::join_all(burst).await;
    let timed_out = results
        .iter()
        .filter(|r| matches!(r, Err(ResolveError::Timeout(_))))
        .count();
    assert!(timed_out > 0);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let coordinate = resolver.resolve("fresh-place").await.unwrap();
    assert!((coordinate.latitude() - 40.0).abs() < 1e-9);
}

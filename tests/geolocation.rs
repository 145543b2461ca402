/* tests/geolocation.rs */

//! End-to-end tests against a local mock geolocation service.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
use regional::{
    ClientAddress, GeoLookup, HeaderMap, HttpGeoLookup, RegionError, RegionGate, Settings,
    select_footer_variant, select_query_filter,
};
use serde_json::{Value, json};

async fn country(Path(ip): Path<String>) -> Json<Value> {
    let code = match ip.as_str() {
        "2.16.0.1" => "DE",
        "8.8.8.8" => "US",
        _ => return Json(json!({"status": "fail", "message": "reserved range"})),
    };
    Json(json!({"status": "success", "countryCode": code}))
}

async fn slow(Path(_ip): Path<String>) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"countryCode": "DE"}))
}

async fn broken(Path(_ip): Path<String>) -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn text(Path(_ip): Path<String>) -> &'static str {
    "a:1:{s:11:\"countryCode\";s:2:\"DE\";}"
}

async fn spawn_geo_service() -> SocketAddr {
    let app = Router::new()
        .route("/json/{ip}", get(country))
        .route("/slow/{ip}", get(slow))
        .route("/broken/{ip}", get(broken))
        .route("/text/{ip}", get(text));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn settings(addr: SocketAddr, path: &str) -> Settings {
    Settings {
        lookup_endpoint: format!("http://{addr}/{path}"),
        timeout_ms: 500,
        ..Settings::default()
    }
}

fn forwarded(ip: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for".to_string(), ip.to_string());
    headers
}

#[tokio::test]
async fn test_german_forwarded_address_selects_eu_content() {
    let addr = spawn_geo_service().await;
    let gate = RegionGate::from_settings(&settings(addr, "json")).unwrap();

    let content = gate.evaluate(&forwarded("2.16.0.1"), Some("10.0.0.1")).await;
    assert!(content.is_eu());
    assert_eq!(content.classification.country_code.as_deref(), Some("de"));
    assert_eq!(content.filter, select_query_filter(true));
    assert_eq!(content.footer, select_footer_variant(true));
}

#[tokio::test]
async fn test_us_address_selects_non_eu_content() {
    let addr = spawn_geo_service().await;
    let gate = RegionGate::from_settings(&settings(addr, "json")).unwrap();

    let content = gate.evaluate(&HeaderMap::new(), Some("8.8.8.8")).await;
    assert!(!content.is_eu());
    assert_eq!(content.classification.country_code.as_deref(), Some("us"));
    assert_eq!(content.footer, select_footer_variant(false));
}

#[tokio::test]
async fn test_failing_service_selects_non_eu_content() {
    let addr = spawn_geo_service().await;

    for path in ["broken", "text", "json"] {
        let gate = RegionGate::from_settings(&settings(addr, path)).unwrap();
        let content = gate.evaluate(&forwarded("192.168.1.1"), None).await;
        assert!(!content.is_eu(), "{path}");
        assert_eq!(content.classification.country_code, None, "{path}");
        assert_eq!(content.filter, select_query_filter(false), "{path}");
    }
}

#[tokio::test]
async fn test_unreachable_service_selects_non_eu_content() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gate = RegionGate::from_settings(&settings(addr, "json")).unwrap();
    let content = gate.evaluate(&forwarded("2.16.0.1"), None).await;
    assert!(!content.is_eu());
    assert_eq!(content.footer.disclaimer.loss_percentage, "70.1%");
}

#[tokio::test]
async fn test_slow_service_is_time_bounded() {
    let addr = spawn_geo_service().await;
    let gate = RegionGate::from_settings(&settings(addr, "slow")).unwrap();

    let started = Instant::now();
    let content = gate.evaluate(&forwarded("2.16.0.1"), None).await;
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!content.is_eu());
}

#[tokio::test]
async fn test_lookup_error_kinds() {
    let addr = spawn_geo_service().await;
    let address = ClientAddress::from("2.16.0.1");
    let timeout = Duration::from_millis(300);

    let lookup = HttpGeoLookup::with_options(&format!("http://{addr}/slow"), timeout, 0).unwrap();
    assert_eq!(lookup.country_code(&address).await, Err(RegionError::Timeout(timeout)));

    let lookup = HttpGeoLookup::with_options(&format!("http://{addr}/broken"), timeout, 1).unwrap();
    assert_eq!(lookup.country_code(&address).await, Err(RegionError::Status(500)));

    let lookup = HttpGeoLookup::with_options(&format!("http://{addr}/text"), timeout, 0).unwrap();
    assert!(matches!(lookup.country_code(&address).await, Err(RegionError::Parse(_))));

    let lookup = HttpGeoLookup::with_options(&format!("http://{addr}/json"), timeout, 0).unwrap();
    assert_eq!(
        lookup.country_code(&ClientAddress::from("10.0.0.1")).await,
        Err(RegionError::MissingCountryCode)
    );
}

#[tokio::test]
async fn test_timeout_bounds_all_retries() {
    let addr = spawn_geo_service().await;
    let timeout = Duration::from_millis(300);
    let lookup = HttpGeoLookup::with_options(&format!("http://{addr}/slow"), timeout, 3).unwrap();

    let started = Instant::now();
    let result = lookup.country_code(&ClientAddress::from("2.16.0.1")).await;
    assert_eq!(result, Err(RegionError::Timeout(timeout)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_cached_gate_reuses_classification() {
    let addr = spawn_geo_service().await;
    let settings = Settings {
        cache_ttl_secs: Some(300),
        ..settings(addr, "json")
    };
    let gate = RegionGate::from_settings(&settings).unwrap();

    let first = gate.evaluate(&forwarded("2.16.0.1"), None).await;
    let second = gate.evaluate(&forwarded("2.16.0.1"), None).await;
    assert_eq!(first, second);
    assert_eq!(gate.classifier().cache().map(|c| c.len()), Some(1));
}

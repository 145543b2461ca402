/* demos/axum.rs */

use axum::{
    Router,
    http::StatusCode,
    response::{Html, Json},
    routing::get,
};
use regional::{RegionGate, RegionLayer, RegionalContent, Settings};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load(Some(Path::new("regional.toml")))?;
    let gate = RegionGate::from_settings(&settings)?;

    let app = Router::new()
        .route("/", get(page_handler))
        .route("/region", get(region_handler))
        .layer(RegionLayer::new(gate));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;

    println!("Server starting on http://localhost:3000");
    println!("Geolocation endpoint: {}", settings.lookup_endpoint);
    println!("Test endpoints:");
    println!("  • GET /        - Page with the regional footer");
    println!("  • GET /region  - JSON classification and query filter");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Forwarded-For: 2.16.0.1' http://localhost:3000/region");
    println!("  curl -H 'Client-IP: 8.8.8.8' http://localhost:3000/region");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Page with the footer variant selected for the visitor
async fn page_handler(content: RegionalContent) -> Result<Html<String>, StatusCode> {
    let footer = content.render_footer().map_err(|e| {
        tracing::error!("footer render failed: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Regional Demo</title></head>\n<body>\n<p>Visitor {} is served the {} variant.</p>\n{}</body>\n</html>\n",
        content.classification.address,
        content.footer.name(),
        footer
    )))
}

/// Classification details in JSON format
async fn region_handler(content: RegionalContent) -> Json<serde_json::Value> {
    Json(json!({
        "address": content.classification.address,
        "country_code": content.classification.country_code,
        "is_eu": content.classification.is_eu,
        "variant": content.footer.name(),
        "filter": content.filter,
    }))
}

/* src/middleware.rs */

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::classifier::GeoLookup;
use crate::pipeline::{RegionGate, RegionalContent};
use crate::resolver::{self, ClientAddress};

/// Layer that classifies each request and stores the selected
/// [`RegionalContent`] as a request extension.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, response::Html, routing::get};
/// use regional::{RegionGate, RegionLayer, RegionalContent, Settings};
///
/// async fn footer(content: RegionalContent) -> Html<String> {
///     Html(content.render_footer().unwrap_or_default())
/// }
///
/// let gate = RegionGate::from_settings(&Settings::default()).unwrap();
/// let app: Router = Router::new()
///     .route("/footer", get(footer))
///     .layer(RegionLayer::new(gate));
/// ```
pub struct RegionLayer<L> {
    gate: Arc<RegionGate<L>>,
}

impl<L> Clone for RegionLayer<L> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
        }
    }
}

impl<L> RegionLayer<L> {
    pub fn new(gate: RegionGate<L>) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }

    /// Create a layer over a gate shared with other routers.
    pub fn from_shared(gate: Arc<RegionGate<L>>) -> Self {
        Self { gate }
    }
}

impl<S, L> Layer<S> for RegionLayer<L> {
    type Service = RegionService<S, L>;

    fn layer(&self, inner: S) -> Self::Service {
        RegionService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Service produced by [`RegionLayer`].
pub struct RegionService<S, L> {
    inner: S,
    gate: Arc<RegionGate<L>>,
}

impl<S: Clone, L> Clone for RegionService<S, L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<S, L> Service<Request> for RegionService<S, L>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    L: GeoLookup + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let header_map = headers_to_map(req.headers());
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.ip().to_string());

        // The readied service goes into the future; keep a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gate = self.gate.clone();

        Box::pin(async move {
            let content = gate.evaluate(&header_map, remote_addr.as_deref()).await;
            req.extensions_mut().insert(content);
            inner.call(req).await
        })
    }
}

/// Convert Axum headers to our internal header map format.
fn headers_to_map(headers: &HeaderMap) -> resolver::HeaderMap {
    let mut map = resolver::HeaderMap::new();

    for (name, value) in headers.iter() {
        if let Ok(value_str) = value.to_str() {
            map.insert(name.as_str().to_lowercase(), value_str.to_string());
        }
    }

    map
}

/// Extracts the content selected by [`RegionLayer`]; without the layer,
/// yields the non-EU default for the connection address.
impl<S> FromRequestParts<S> for RegionalContent
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content) = parts.extensions.get::<RegionalContent>() {
            return Ok(content.clone());
        }

        let address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| ClientAddress::new(connect_info.0.ip().to_string()))
            .unwrap_or_default();
        Ok(RegionalContent::fallback(address))
    }
}

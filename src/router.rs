use crate::config::Config;
use crate::handlers;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Builds the application router.
///
/// The predict routes sit behind a body size limit and a per-IP rate limiter.
/// The client IP is read from `X-Forwarded-For`, `X-Real-Ip` or `Forwarded`,
/// falling back to the peer address, so the server must be served with
/// connect info. Health and info routes bypass rate limiting.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit_replenish_ms)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let predict_routes = Router::new()
        .route(
            "/api/predict",
            post(handlers::predict).get(handlers::predict_info),
        )
        .layer(
            ServiceBuilder::new()
                // `RequestBodyLimitLayer` is the only cap; axum's 2 MiB extractor default is lifted
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    let app = Router::new()
        .route("/", get(handlers::api_info))
        .route("/api/health", get(handlers::health))
        .merge(predict_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}

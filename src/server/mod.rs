pub mod handlers;
mod types;

pub use types::{ErrorResponse, HealthResponse, InputDetails, PredictResponse};

use crate::{config::Config, predictor::PredictorService, Error, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use handlers::AppState;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the `/api` router; CORS applies to that prefix only.
pub fn router(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::config(format!("Invalid CORS origin: '{}'", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .layer(cors);

    Ok(Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn run(config: Config) -> Result<()> {
    // Artifacts load once; a failure leaves the service up but unhealthy
    let predictor = PredictorService::from_config(&config.model).await;
    let state = AppState::new(predictor, &config.server);
    let app = router(state, &config.server.cors_origins)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("🚀 Backend API running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

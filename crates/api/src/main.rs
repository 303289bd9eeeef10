use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chartrelay_core::config::Settings;
use chartrelay_core::domain::contract::{
    decode_body, AdviceRequest, AdviceResult, AnalysisRequest, AnalysisResult,
};
use chartrelay_core::relay::{RelayError, RelayService};

mod cors;

const WELCOME: &str = "Welcome to the Dividend Beat Server App!";
const ANALYZE_FAILED: &str = "Failed to analyze image";
const ADVICE_FAILED: &str = "Failed to get advice from image";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    if let Err(e) = serve(settings).await {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "api exited with error");
        return Err(e);
    }

    Ok(())
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = settings.require_openai_api_key() {
        tracing::warn!(error = %e, "relay requests will fail until the key is set");
    }

    let relay = RelayService::from_settings(&settings)?;
    tracing::info!(?relay, model = %settings.openai_model, "relay configured");

    let app = build_router(AppState { relay }, &settings);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
struct AppState {
    relay: RelayService,
}

fn build_router(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .route("/advice", post(advice))
        .with_state(state)
        .layer(cors::cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn healthz() -> &'static str {
    "ok"
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = match decode::<AnalysisRequest>(&headers, &body) {
        Ok(req) => state.relay.analyze(&req).await,
        Err(e) => Err(e),
    };
    result
        .map(Json)
        .map_err(|e| ApiError::new("analyze", ANALYZE_FAILED, e))
}

async fn advice(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AdviceResult>, ApiError> {
    let result = match decode::<AdviceRequest>(&headers, &body) {
        Ok(req) => state.relay.advise(&req).await,
        Err(e) => Err(e),
    };
    result
        .map(Json)
        .map_err(|e| ApiError::new("advice", ADVICE_FAILED, e))
}

/// Bodies not sent as `application/json` are read as `{}` and still go upstream.
fn decode<T>(headers: &HeaderMap, body: &[u8]) -> Result<T, RelayError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let declared_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));

    decode_body(declared_json, body).map_err(|e| RelayError::InvalidInput(e.to_string()))
}

/// Every relay failure surfaces as 500 with a fixed per-endpoint message.
#[derive(Debug)]
struct ApiError {
    message: &'static str,
    source: RelayError,
}

impl ApiError {
    fn new(endpoint: &'static str, message: &'static str, source: RelayError) -> Self {
        tracing::error!(endpoint, error = %source, details = %source.details(), "{message}");
        Self { message, source }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: serde_json::Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.source.details(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

//! api-server — HTTP front end for the visit counter.
//!
//! Serves one page: every GET of `/` lazily creates the `test` table,
//! inserts a random visit row inside a transaction, and renders the current
//! row count. The page writes on every view; that is the observed behavior
//! being preserved, not an accident.
//!
//! Storage: PostgreSQL (default) or in-memory when STORAGE_PROVIDER=memory
//! (or when the `postgres` feature is disabled).
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT and DATABASE_URL optional
//! cargo run -p api-server
//!
//! # without a database
//! STORAGE_PROVIDER=memory cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use domain::adapters::memory_store::InMemoryStore;
use domain::page;
use domain::random::RandomVisitIdSource;
use domain::service::VisitService;
use domain::{CoreError, VisitId, VisitStore};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local store abstraction supporting memory or postgres (feature-gated).
enum AnyStore {
    Memory(InMemoryStore),
    #[cfg(feature = "postgres")]
    Postgres(postgres_adapter::PgVisitStore),
    #[cfg(test)]
    Failing(FailingStore),
}

#[async_trait]
impl VisitStore for AnyStore {
    async fn ensure_schema(&self) -> Result<(), CoreError> {
        match self {
            AnyStore::Memory(s) => s.ensure_schema().await,
            #[cfg(feature = "postgres")]
            AnyStore::Postgres(s) => s.ensure_schema().await,
            #[cfg(test)]
            AnyStore::Failing(s) => s.ensure_schema().await,
        }
    }

    async fn record_visit(&self, id: VisitId) -> Result<(), CoreError> {
        match self {
            AnyStore::Memory(s) => s.record_visit(id).await,
            #[cfg(feature = "postgres")]
            AnyStore::Postgres(s) => s.record_visit(id).await,
            #[cfg(test)]
            AnyStore::Failing(s) => s.record_visit(id).await,
        }
    }

    async fn count_visits(&self) -> Result<u64, CoreError> {
        match self {
            AnyStore::Memory(s) => s.count_visits().await,
            #[cfg(feature = "postgres")]
            AnyStore::Postgres(s) => s.count_visits().await,
            #[cfg(test)]
            AnyStore::Failing(s) => s.count_visits().await,
        }
    }
}

// Store double whose operations always fail, standing in for an unreachable
// database.
#[cfg(test)]
struct FailingStore;

#[cfg(test)]
#[async_trait]
impl VisitStore for FailingStore {
    async fn ensure_schema(&self) -> Result<(), CoreError> {
        Err(CoreError::Store("connection refused".into()))
    }

    async fn record_visit(&self, _id: VisitId) -> Result<(), CoreError> {
        Err(CoreError::Store("connection refused".into()))
    }

    async fn count_visits(&self) -> Result<u64, CoreError> {
        Err(CoreError::Store("connection refused".into()))
    }
}

#[derive(Clone)]
struct AppState {
    service: Arc<VisitService<AnyStore, RandomVisitIdSource>>,
}

impl AppState {
    fn new(store: AnyStore) -> Self {
        Self {
            service: Arc::new(VisitService::new(store, RandomVisitIdSource::new())),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);

    let store = match build_store(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to init store: {e}");
            std::process::exit(1);
        }
    };
    let state = AppState::new(store);

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .route("/", get(show_page))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct a store instance based on config and feature flags.
fn build_store(cfg: &config::Config) -> Result<AnyStore, CoreError> {
    match cfg.storage_provider {
        #[cfg(feature = "postgres")]
        config::StorageProvider::Postgres => Ok(AnyStore::Postgres(
            postgres_adapter::PgVisitStore::connect_lazy(&cfg.database_url)?,
        )),
        _ => Ok(AnyStore::Memory(InMemoryStore::new())),
    }
}

async fn show_page(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.record_and_count().await {
        Ok(count) => {
            info!(count, "visit recorded");
            Html(page::render_count(count)).into_response()
        }
        Err(e) => {
            // No retry, no fallback: the failure is logged and surfaced as 500.
            error!(err = ?e, "visit failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page::error_page())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::util::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(AnyStore::Memory(InMemoryStore::new()));
        Router::new().route("/", get(show_page)).with_state(state)
    }

    async fn get_body(router: &Router) -> (StatusCode, String) {
        let resp = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn first_view_shows_one() {
        let router = app();
        let (status, body) = get_body(&router).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Your number is: 1</h1>"));
    }

    #[tokio::test]
    async fn tenth_view_shows_ten() {
        let router = app();
        for _ in 0..9 {
            let (status, _) = get_body(&router).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = get_body(&router).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Your number is: 10</h1>"));
    }

    #[tokio::test]
    async fn store_failure_returns_error_page() {
        let state = AppState::new(AnyStore::Failing(FailingStore));
        let router = Router::new().route("/", get(show_page)).with_state(state);
        let resp = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains("Your number is:"));
    }

    #[tokio::test]
    async fn page_is_served_as_html() {
        let router = app();
        let resp = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert!(content_type.starts_with("text/html"));
    }
}

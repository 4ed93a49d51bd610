use crate::backend::Backend;
use crate::error::AskError;
use crate::handler::{self, QueryRequest, QueryResponse};
use crate::llm::SqlGenerator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const UNANSWERABLE_DETAIL: &str = "Question cannot be answered with the provided schema.";
pub const UNSAFE_DETAIL: &str =
    "Generated query failed safety checks. Only read-only SELECTs allowed.";

/// Everything a request needs; shared by all in-flight requests.
pub struct AppState<G, B> {
    pub generator: G,
    pub backend: B,
    /// Upper bound on one whole question-to-rows round trip.
    pub request_timeout: Option<Duration>,
    /// Row bound for requests that do not name one.
    pub default_max_results: usize,
}

/// Error body for non-2xx responses.
pub struct ApiError(AskError);

impl From<AskError> for ApiError {
    fn from(err: AskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            AskError::Unanswerable => (StatusCode::BAD_REQUEST, UNANSWERABLE_DETAIL.to_string()),
            AskError::UnsafeQuery { .. } => (StatusCode::BAD_REQUEST, UNSAFE_DETAIL.to_string()),
            AskError::Llm { .. } | AskError::Config { .. } => {
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            AskError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, self.0.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub fn router<G, B>(state: Arc<AppState<G, B>>) -> Router
where
    G: SqlGenerator + 'static,
    B: Backend + 'static,
{
    Router::new()
        .route("/query", post(query::<G, B>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until ctrl-c.
pub async fn serve<G, B>(listen: SocketAddr, state: AppState<G, B>) -> Result<(), AskError>
where
    G: SqlGenerator + 'static,
    B: Backend + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn query<G, B>(
    State(state): State<Arc<AppState<G, B>>>,
    Json(mut request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError>
where
    G: SqlGenerator + 'static,
    B: Backend + 'static,
{
    request.max_results.get_or_insert(state.default_max_results);

    let run = handler::generate_and_run(&state.generator, &state.backend, &request);
    let response = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| AskError::Timeout {
                seconds: limit.as_secs(),
            })??,
        None => run.await?,
    };
    Ok(Json(response))
}

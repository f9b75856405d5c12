//! HTTP API.
//!
//! | Route | Method | Body |
//! |---|---|---|
//! | `/load_data` | GET | first cleaned dataset records |
//! | `/predict` | POST | `{"sentence1": .., "sentence2": ..}` |
//! | `/model_info` | GET | loaded model summary |
//! | `/reload` | POST | re-read artifacts from the model directory |
//!
//! Errors are JSON objects `{"error": "..."}` with status 400 when the
//! request itself is wrong and 500 for everything else.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{PlagiarismError, Result};
use crate::service::{ModelInfo, Prediction, ServiceContext};

/// Error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Classify `err` and prefix its message with `context`.
    fn from_error(context: &str, err: PlagiarismError) -> Self {
        if err.is_client_error() {
            return Self::new(StatusCode::BAD_REQUEST, strip_client_prefix(&err));
        }
        tracing::error!(error = %err, "{context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {err}"))
    }

    fn join(context: &str, err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {err}"))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn strip_client_prefix(err: &PlagiarismError) -> String {
    match err {
        PlagiarismError::InvalidRequest(msg) => msg.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// `/predict` request body. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub sentence1: Option<String>,
    #[serde(default)]
    pub sentence2: Option<String>,
}

/// Build the application router.
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    Router::new()
        .route("/load_data", get(load_data))
        .route("/predict", post(predict))
        .route("/model_info", get(model_info))
        .route("/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, ctx: Arc<ServiceContext>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        model_ready = ctx.is_ready(),
        "listening"
    );

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for Ctrl-C; shutting down");
    }
    tracing::info!("shutting down");
}

async fn load_data(
    State(ctx): State<Arc<ServiceContext>>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    const CONTEXT: &str = "Failed to load dataset";

    let limit = ctx.config().server.preview_limit;
    let records = tokio::task::spawn_blocking(move || ctx.preview(limit))
        .await
        .map_err(|err| ApiError::join(CONTEXT, err))?
        .map_err(|err| ApiError::from_error(CONTEXT, err))?;

    let value = serde_json::to_value(records)
        .map_err(|err| ApiError::from_error(CONTEXT, err.into()))?;
    Ok(Json(value))
}

async fn predict(
    State(ctx): State<Arc<ServiceContext>>,
    payload: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> std::result::Result<Json<Prediction>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let sentence1 = request.sentence1.unwrap_or_default();
    let sentence2 = request.sentence2.unwrap_or_default();
    let prediction = ctx
        .predict(&sentence1, &sentence2)
        .map_err(|err| ApiError::from_error("Prediction failed", err))?;

    tracing::debug!(
        prediction = prediction.prediction,
        confidence = %prediction.confidence,
        "predicted"
    );
    Ok(Json(prediction))
}

async fn model_info(
    State(ctx): State<Arc<ServiceContext>>,
) -> std::result::Result<Json<ModelInfo>, ApiError> {
    ctx.model_info()
        .map(Json)
        .map_err(|err| ApiError::from_error("Model unavailable", err))
}

async fn reload(
    State(ctx): State<Arc<ServiceContext>>,
) -> std::result::Result<Json<ModelInfo>, ApiError> {
    const CONTEXT: &str = "Reload failed";

    let snapshot = tokio::task::spawn_blocking(move || ctx.reload())
        .await
        .map_err(|err| ApiError::join(CONTEXT, err))?
        .map_err(|err| ApiError::from_error(CONTEXT, err))?;
    Ok(Json(snapshot.info()))
}

// HTTP route handlers exposing the grading engine to the platform's
// routing layer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use aula_common::store::RedisStore;
use aula_common::types::Language;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::grader::GradingHarness;
use crate::sandbox::ExecutionSandbox;

pub type EngineHarness = GradingHarness<ExecutionSandbox, RedisStore, RedisStore>;

pub struct AppState {
    pub harness: EngineHarness,
    pub store: Arc<RedisStore>,
    /// Global admission control: bounds concurrently grading submissions
    /// so a burst cannot exhaust host CPU/memory.
    pub admission: tokio::sync::Semaphore,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/run", post(run_code))
        .route("/challenges/:challenge_id/submit", post(submit_code))
        .route("/submissions/:submission_id", get(get_submission))
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub language: Language,
    pub code: String,
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: u64,
    #[serde(default = "default_memory_limit")]
    pub memory_limit_mb: u64,
}

fn default_time_limit() -> u64 {
    10
}

fn default_memory_limit() -> u64 {
    256
}

#[derive(Debug, Serialize)]
struct RunResponse {
    #[serde(flatten)]
    result: aula_common::types::ExecutionResult,
    success: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    pub code: String,
}

fn overloaded() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "El motor de ejecucion esta ocupado, intenta de nuevo en unos segundos"
        })),
    )
}

/// POST /run - fast-iteration path: execute once, no grading, nothing
/// persisted.
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> impl IntoResponse {
    let _permit = match state.admission.try_acquire() {
        Ok(permit) => permit,
        Err(_) => return overloaded().into_response(),
    };

    match state
        .harness
        .run(
            &payload.code,
            &payload.language,
            payload.time_limit_seconds,
            payload.memory_limit_mb,
        )
        .await
    {
        Ok(result) => {
            let success = result.success();
            (StatusCode::OK, Json(RunResponse { result, success })).into_response()
        }
        Err(e) => {
            // Infrastructure failure: generic message, details for operators
            error!(error = %e, "Run execution failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "No se pudo ejecutar el codigo, intenta de nuevo"
                })),
            )
                .into_response()
        }
    }
}

/// POST /challenges/{id}/submit - grade one submission against the
/// challenge's test cases.
pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> impl IntoResponse {
    let _permit = match state.admission.try_acquire() {
        Ok(permit) => permit,
        Err(_) => return overloaded().into_response(),
    };

    match state
        .harness
        .submit(&challenge_id, &payload.user_id, &payload.code)
        .await
    {
        Ok(Some(result)) => {
            info!(
                challenge_id = %challenge_id,
                submission_id = %result.submission_id,
                is_correct = result.is_correct,
                attempt_number = result.attempt_number,
                "Submission processed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Desafio no encontrado"
            })),
        )
            .into_response(),
        Err(e) => {
            // A crashed sandbox is not a wrong answer: the attempt was not
            // recorded and the caller gets a generic failure
            error!(challenge_id = %challenge_id, error = %e, "Submission grading failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "No se pudo calificar el envio, intenta de nuevo"
                })),
            )
                .into_response()
        }
    }
}

/// GET /submissions/{id} - fetch a persisted submission record.
/// Hidden-test detail was withheld at write time, so the stored record is
/// safe to serve directly.
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.submission(&submission_id).await {
        Ok(Some(submission)) => (StatusCode::OK, Json(submission)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Envio no encontrado"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(submission_id = %submission_id, error = %e, "Failed to fetch submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "No se pudo consultar el envio"
                })),
            )
                .into_response()
        }
    }
}

/// GET /health - readiness probe
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

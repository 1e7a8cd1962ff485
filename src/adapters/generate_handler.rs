//! HTTP handlers for schema validation, generation and submission.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::adapters::delivery::DeliveryFanout;
use crate::domain::{
    DeliveryOutcome, DeliveryTarget, GenerationError, GenerationRequest, GenerationResult,
    GeneratorPort, RawFieldInput, Schema, SchemaBuilder, ValidationError,
};

/// Shared state for the generation endpoints
#[derive(Clone)]
pub struct GenerateState {
    pub generator: Arc<dyn GeneratorPort>,
    pub delivery: DeliveryFanout,
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub schema: Schema,
    pub count: Value,
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    pub fields: Vec<RawFieldInput>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub fields: Vec<RawFieldInput>,
    pub count: Value,
    /// Comma-separated delivery URLs. Blank means no delivery.
    #[serde(default)]
    pub targets: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub data: GenerationResult,
    pub deliveries: Vec<DeliveryOutcome>,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorView {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl From<&ValidationError> for ValidationErrorView {
    fn from(e: &ValidationError) -> Self {
        Self {
            kind: e.kind(),
            field: e.field().map(String::from),
            message: e.to_string(),
        }
    }
}

fn views(errors: &[ValidationError]) -> Vec<ValidationErrorView> {
    errors.iter().map(ValidationErrorView::from).collect()
}

fn generation_failure(e: &GenerationError) -> (StatusCode, Json<Value>) {
    // Diagnostic detail stays in the server log.
    error!(error = %e, "generation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": GenerationError::LABEL })),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /generate - generate records for an already-built schema
pub async fn generate(
    State(state): State<GenerateState>,
    Json(body): Json<GenerateBody>,
) -> impl IntoResponse {
    let request = match GenerationRequest::from_raw_count(body.schema, &body.count) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "ValidationError", "details": views(&[e]) })),
            )
                .into_response()
        }
    };

    match state.generator.generate(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => generation_failure(&e).into_response(),
    }
}

/// POST /api/schema/validate - check raw builder input without generating
pub async fn validate_schema(Json(body): Json<ValidateBody>) -> impl IntoResponse {
    match SchemaBuilder::validate(&body.fields) {
        Ok(schema) => (StatusCode::OK, Json(json!({ "schema": schema }))).into_response(),
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": views(&errors) })),
        )
            .into_response(),
    }
}

/// POST /api/submit - build, generate and deliver in one call
pub async fn submit(
    State(state): State<GenerateState>,
    Json(body): Json<SubmitBody>,
) -> impl IntoResponse {
    let request = match SchemaBuilder::validate(&body.fields) {
        Ok(schema) => GenerationRequest::from_raw_count(schema, &body.count).map_err(|e| vec![e]),
        Err(mut errors) => {
            if let Err(e) = GenerationRequest::from_raw_count(Schema::new(), &body.count) {
                errors.push(e);
            }
            Err(errors)
        }
    };
    let request = match request {
        Ok(request) => request,
        Err(errors) => {
            info!(errors = errors.len(), "submission rejected");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": views(&errors) })),
            )
                .into_response();
        }
    };

    let data = match state.generator.generate(&request).await {
        Ok(data) => data,
        Err(e) => return generation_failure(&e).into_response(),
    };

    let targets = body
        .targets
        .as_deref()
        .map(DeliveryTarget::parse_list)
        .unwrap_or_default();
    let deliveries = state.delivery.deliver(&data, &targets).await;

    (StatusCode::OK, Json(SubmitResponse { data, deliveries })).into_response()
}

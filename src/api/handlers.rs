use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::{
    requests::AnalyzeRequest,
    responses::{ErrorResponse, HealthResponse},
    state::AppState,
};
use crate::error::AnalysisError;
use crate::pipeline::pipeline::BodyShapeReport;

/// `POST /analyze`
///
/// Any failure, including an unreadable JSON body, is answered with
/// `400 {"error": "..."}`. Only an oversized body keeps its 413.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<BodyShapeReport>, ErrorResponse> {
    let image = match payload {
        Ok(Json(AnalyzeRequest { image: Some(Value::String(image)) })) => image,
        Ok(Json(AnalyzeRequest { image: Some(other) })) => {
            warn!(kind = json_kind(&other), "image is not a string");
            return Err(AnalysisError::ImageProcessing(
                format!("expected a base64 data URI string, got {}", json_kind(&other))
            ).into());
        }
        Ok(Json(AnalyzeRequest { image: None })) => return Err(AnalysisError::MissingImage.into()),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(error = %rejection.body_text(), "analyze request body too large");
            return Err(ErrorResponse {
                error: rejection.body_text(),
                status: StatusCode::PAYLOAD_TOO_LARGE,
            });
        }
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected analyze request body");
            return Err(AnalysisError::MissingImage.into());
        }
    };

    match state.pipeline.analyze(&image).await {
        Ok(report) => {
            info!(body_shape = %report.body_shape, "analyze request served");
            Ok(Json(report))
        }
        Err(err) => {
            warn!(error = %err, "analyze request failed");
            Err(err.into())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `GET /health`
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let detector_ready = state.pipeline.is_ready().await;
    let status = if detector_ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse {
            status: if detector_ready { "healthy" } else { "degraded" }.to_string(),
            detector_ready,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

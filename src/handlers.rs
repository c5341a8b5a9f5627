use crate::errors::AppError;
use crate::models::{ApiInfo, EndpointInfo, HealthResponse, PredictInfo, PredictionResponse};
use crate::{scoring, validation};
use axum::{body::Bytes, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

pub const SERVICE_NAME: &str = "sme-health-api";

/// Health check endpoint.
///
/// Always healthy. `model_trained` stays in the payload for existing clients;
/// scoring is rule-based and needs no training.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            success: true,
            message: "Financial Health Survey API is running".to_string(),
            status: "healthy".to_string(),
            model_trained: true,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

/// GET /
///
/// Lists the routes this service exposes.
pub async fn api_info() -> Json<ApiInfo> {
    let endpoint = |method: &str, path: &str, description: &str| EndpointInfo {
        method: method.to_string(),
        path: path.to_string(),
        description: description.to_string(),
    };

    Json(ApiInfo {
        message: "Financial Health Survey API".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            endpoint("GET", "/", "API info"),
            endpoint("GET", "/api/health", "Health check"),
            endpoint("POST", "/api/predict", "Submit survey for prediction"),
            endpoint("GET", "/api/predict", "Prediction API usage"),
        ],
    })
}

/// GET /api/predict
///
/// Static usage notes; no computation.
pub async fn predict_info() -> Json<PredictInfo> {
    Json(PredictInfo {
        message: "Financial Health Prediction API".to_string(),
        method: "POST".to_string(),
        description: "Submit survey data to get financial health prediction".to_string(),
    })
}

/// POST /api/predict
///
/// Scores a submitted survey and echoes it back alongside the prediction.
///
/// The body is taken as raw bytes so that a malformed document is reported
/// with the same generic 500 as any other processing failure, while a missing
/// required field is a 400 naming the field.
pub async fn predict(body: Bytes) -> Result<Json<PredictionResponse>, AppError> {
    let request_id = Uuid::new_v4();

    tracing::info_span!("predict", %request_id).in_scope(
        || -> Result<Json<PredictionResponse>, AppError> {
            tracing::info!("POST /api/predict - {} byte body", body.len());

            let payload: Value = serde_json::from_slice(&body)?;
            let record = validation::parse_survey(&payload)?;
            let result = scoring::score_survey(&record);

            tracing::info!(
                "Prediction for {}: {} (score {:.2})",
                record.country,
                result.category,
                result.score
            );
            tracing::debug!("Confidence scores: {:?}", result.confidence_scores);

            Ok(Json(PredictionResponse::from_result(result, payload)))
        },
    )
}

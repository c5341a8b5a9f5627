use crate::errors::{AppError, ResultExt};
use crate::models::{HealthResponse, PredictInfo, PredictionResponse, SurveyRecord};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Base URL used when `SME_HEALTH_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const HEALTH_PATH: &str = "/api/health";
pub const PREDICT_PATH: &str = "/api/predict";

/// Client for a running instance of the financial health API.
#[derive(Clone)]
pub struct HealthApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HealthApiClient {
    /// Creates a client for `base_url`, which must be an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AppError::ExternalApi(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::ExternalApi(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create API client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from `SME_HEALTH_API_URL`, falling back to localhost.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url = match std::env::var("SME_HEALTH_API_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => {
                tracing::warn!(
                    "SME_HEALTH_API_URL not set, falling back to {}",
                    DEFAULT_API_URL
                );
                DEFAULT_API_URL.to_string()
            }
        };
        Self::new(base_url.trim())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches the health document.
    pub async fn health(&self) -> Result<HealthResponse, AppError> {
        let url = self.url(HEALTH_PATH);
        tracing::debug!("Checking API health: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Health check request to {} failed", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApi(format!(
                "Health check returned {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .context("Failed to parse health response")
    }

    /// Returns whether the API reports itself healthy. Never fails.
    pub async fn check_health(&self) -> bool {
        match self.health().await {
            Ok(health) => health.success,
            Err(e) => {
                tracing::warn!("API health check failed: {}", e);
                false
            }
        }
    }

    /// Submits a survey for prediction.
    pub async fn submit_survey(
        &self,
        survey: &SurveyRecord,
    ) -> Result<PredictionResponse, AppError> {
        let payload = serde_json::to_value(survey)?;
        self.submit_survey_json(&payload).await
    }

    /// Submits a raw survey document for prediction.
    ///
    /// A validation rejection (400) is returned as `AppError::MissingField` when
    /// the server names the field, so callers can tell it apart from transport
    /// failures.
    pub async fn submit_survey_json(
        &self,
        payload: &serde_json::Value,
    ) -> Result<PredictionResponse, AppError> {
        let url = self.url(PREDICT_PATH);
        tracing::info!("Submitting survey to {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Prediction request to {} failed", url))?;

        let status = response.status();
        if status.is_success() {
            let prediction: PredictionResponse = response
                .json()
                .await
                .context("Failed to parse prediction response")?;
            tracing::info!(
                "✓ Prediction received: {}",
                prediction
                    .prediction
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            return Ok(prediction);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::BAD_REQUEST {
            let missing = serde_json::from_str::<PredictionResponse>(&error_text)
                .ok()
                .and_then(|body| body.error)
                .and_then(|error| {
                    error
                        .strip_prefix("Missing required field: ")
                        .map(str::to_string)
                });
            if let Some(field) = missing {
                return Err(AppError::MissingField(field));
            }
        }

        Err(AppError::ExternalApi(format!(
            "HTTP {}: {}",
            status, error_text
        )))
    }

    /// Fetches the usage notes of the predict route.
    pub async fn predict_info(&self) -> Result<PredictInfo, AppError> {
        let url = self.url(PREDICT_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Predict info returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .context("Failed to parse predict info response")
    }
}

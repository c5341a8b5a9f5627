use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ============ Survey Input ============

/// One completed financial health survey, as submitted by the survey form.
///
/// `country`, `owner_age`, `personal_income` and `business_turnover` are required
/// (see [`crate::validation`]). Every other field may be absent or null.
/// Categorical answers are kept verbatim; the scorer compares them by exact
/// string equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    /// Country of the business (free-form).
    pub country: String,
    /// Age of the owner in years.
    #[serde(deserialize_with = "de_number")]
    pub owner_age: f64,
    #[serde(default)]
    pub owner_sex: Option<String>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub business_age_years: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub business_age_months: Option<f64>,
    #[serde(default)]
    pub covid_essential_service: Option<String>,
    #[serde(deserialize_with = "de_number")]
    pub personal_income: f64,
    /// Monthly business expenses. Absent or zero expenses score as a divisor of 1.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub business_expenses: Option<f64>,
    #[serde(deserialize_with = "de_number")]
    pub business_turnover: f64,
    #[serde(default)]
    pub keeps_financial_records: Option<String>,
    #[serde(default)]
    pub has_mobile_money: Option<String>,
    #[serde(default)]
    pub has_insurance: Option<String>,
    #[serde(default)]
    pub future_risk_theft_stock: Option<String>,
    #[serde(default)]
    pub attitude_stable_business_environment: Option<String>,
    #[serde(default)]
    pub compliance_income_tax: Option<String>,
    #[serde(default)]
    pub has_cellphone: Option<String>,
    #[serde(default)]
    pub motivation_make_more_money: Option<String>,
}

/// Survey forms post numbers either as JSON numbers or as the raw text of an input.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Survey amounts must be finite; `"NaN"`, `"inf"` and overflowing text are rejected.
fn finite<E: de::Error>(n: f64) -> Result<f64, E> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(E::custom(format!("non-finite number {}", n)))
    }
}

fn parse_text_number<E: de::Error>(text: &str) -> Result<f64, E> {
    let n = text
        .trim()
        .parse::<f64>()
        .map_err(|_| E::custom(format!("invalid number '{}'", text)))?;
    finite(n)
}

fn de_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => finite(n),
        NumberOrText::Text(text) => parse_text_number(&text),
    }
}

fn de_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => finite(n).map(Some),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => parse_text_number(&text).map(Some),
    }
}

// ============ Scoring Output ============

/// Risk category derived from the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// All categories, in the order they are reported.
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pseudo-probabilities over the three categories. Not a calibrated posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Medium")]
    pub medium: f64,
    #[serde(rename = "High")]
    pub high: f64,
}

impl ConfidenceScores {
    /// Distribution with all weight on a single category.
    pub fn one_hot(category: RiskCategory) -> Self {
        let mut scores = Self {
            low: 0.0,
            medium: 0.0,
            high: 0.0,
        };
        *scores.get_mut(category) = 1.0;
        scores
    }

    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Low => self.low,
            RiskCategory::Medium => self.medium,
            RiskCategory::High => self.high,
        }
    }

    fn get_mut(&mut self, category: RiskCategory) -> &mut f64 {
        match category {
            RiskCategory::Low => &mut self.low,
            RiskCategory::Medium => &mut self.medium,
            RiskCategory::High => &mut self.high,
        }
    }

    pub fn sum(&self) -> f64 {
        self.low + self.medium + self.high
    }

    /// Iterates `(category, confidence)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, f64)> + '_ {
        RiskCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Result of scoring one survey. Computed per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Health score in [0, 100].
    pub score: f64,
    pub category: RiskCategory,
    pub confidence_scores: ConfidenceScores,
    pub recommendation: &'static str,
}

// ============ API Responses ============

/// Body of `POST /api/predict`, for both success and failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<RiskCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<ConfidenceScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Echo of the submitted survey JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResponse {
    pub fn from_result(result: ScoreResult, survey_data: Value) -> Self {
        Self {
            success: true,
            prediction: Some(result.category),
            confidence_scores: Some(result.confidence_scores),
            recommendation: Some(result.recommendation.to_string()),
            survey_data: Some(survey_data),
            error: None,
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub model_trained: bool,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

/// Body of `GET /api/predict`: usage notes for the predict route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictInfo {
    pub message: String,
    pub method: String,
    pub description: String,
}

/// One advertised route in the API info document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub service: String,
    pub version: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_fields_accept_text() {
        let record: SurveyRecord = serde_json::from_value(json!({
            "country": "Eswatini",
            "owner_age": "35",
            "personal_income": 50000,
            "business_turnover": " 80000.5 ",
            "business_expenses": ""
        }))
        .unwrap();

        assert_eq!(record.owner_age, 35.0);
        assert_eq!(record.business_turnover, 80000.5);
        assert_eq!(record.business_expenses, None);
        assert_eq!(record.has_insurance, None);
    }

    #[test]
    fn test_non_numeric_text_rejected() {
        let result: Result<SurveyRecord, _> = serde_json::from_value(json!({
            "country": "Eswatini",
            "owner_age": "thirty",
            "personal_income": 50000,
            "business_turnover": 80000
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_non_finite_text_rejected() {
        for text in ["NaN", "nan", "inf", "-inf", "infinity", "1e400"] {
            let result: Result<SurveyRecord, _> = serde_json::from_value(json!({
                "country": "Eswatini",
                "owner_age": 35,
                "personal_income": 50000,
                "business_turnover": text
            }));
            assert!(result.is_err(), "turnover {:?} accepted", text);

            let result: Result<SurveyRecord, _> = serde_json::from_value(json!({
                "country": "Eswatini",
                "owner_age": 35,
                "personal_income": 50000,
                "business_turnover": 80000,
                "business_expenses": text
            }));
            assert!(result.is_err(), "expenses {:?} accepted", text);
        }
    }

    #[test]
    fn test_null_optional_fields() {
        let record: SurveyRecord = serde_json::from_value(json!({
            "country": "Lesotho",
            "owner_age": 40,
            "personal_income": 1000,
            "business_turnover": 2000,
            "business_expenses": null,
            "has_cellphone": null
        }))
        .unwrap();

        assert_eq!(record.business_expenses, None);
        assert_eq!(record.has_cellphone, None);
    }

    #[test]
    fn test_confidence_scores_serialize_in_report_order() {
        let scores = ConfidenceScores {
            low: 0.1,
            medium: 0.2,
            high: 0.7,
        };
        let text = serde_json::to_string(&scores).unwrap();
        assert_eq!(text, r#"{"Low":0.1,"Medium":0.2,"High":0.7}"#);
    }

    #[test]
    fn test_one_hot() {
        let scores = ConfidenceScores::one_hot(RiskCategory::Medium);
        assert_eq!(scores.get(RiskCategory::Medium), 1.0);
        assert_eq!(scores.sum(), 1.0);
    }

    #[test]
    fn test_error_response_deserializes() {
        let response: PredictionResponse = serde_json::from_value(json!({
            "success": false,
            "error": "Missing required field: country"
        }))
        .unwrap();

        assert!(!response.success);
        assert_eq!(response.prediction, None);
        assert_eq!(
            response.error.as_deref(),
            Some("Missing required field: country")
        );
    }
}

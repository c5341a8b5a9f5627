use crate::errors::AppError;
use crate::models::SurveyRecord;
use serde::Deserialize;
use serde_json::Value;

/// Survey fields that must be present and non-null, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "country",
    "owner_age",
    "personal_income",
    "business_turnover",
];

/// Checks the raw request body for the required survey fields.
///
/// Reports the first field, in [`REQUIRED_FIELDS`] order, that is absent or null.
/// Values are not type-checked here; an empty string counts as present.
/// A body that is not a JSON object is an internal failure, not a validation error.
pub fn validate_required_fields(payload: &Value) -> Result<(), AppError> {
    let Some(fields) = payload.as_object() else {
        return Err(AppError::Internal(format!(
            "Survey payload must be a JSON object, got {}",
            json_kind(payload)
        )));
    };

    for field in REQUIRED_FIELDS {
        match fields.get(field) {
            None | Some(Value::Null) => return Err(AppError::MissingField(field.to_string())),
            Some(_) => {}
        }
    }

    Ok(())
}

/// Validates the raw body, then decodes it into a [`SurveyRecord`].
pub fn parse_survey(payload: &Value) -> Result<SurveyRecord, AppError> {
    validate_required_fields(payload)?;
    let record = SurveyRecord::deserialize(payload)?;
    Ok(record)
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

//! Scores survey responses from the command line.
//!
//! Usage:
//!   score_survey --samples              score the built-in sample responses
//!   score_survey <survey.json>...       score survey files
//!   score_survey --remote <args>        submit to the API at SME_HEALTH_API_URL instead

use anyhow::Context;
use dotenvy::dotenv;
use serde_json::{json, Value};
use sme_health_api::client::HealthApiClient;
use sme_health_api::models::{ConfidenceScores, RiskCategory};
use sme_health_api::{scoring, validation};
use std::env;

const USAGE: &str = "Usage: score_survey [--remote] (--samples | <survey.json>...)";

/// Two representative responses, as collected by the survey form.
fn sample_surveys() -> Vec<(String, Value)> {
    vec![
        (
            "sample 1".to_string(),
            json!({
                "country": "zimbabwe",
                "owner_age": 35,
                "owner_sex": "Female",
                "business_age_years": 5,
                "business_age_months": 6,
                "covid_essential_service": "Yes",
                "personal_income": 50000,
                "business_expenses": 25000,
                "business_turnover": 80000,
                "keeps_financial_records": "Yes, always",
                "has_mobile_money": "Have now",
                "has_insurance": "Yes",
                "future_risk_theft_stock": "No",
                "attitude_stable_business_environment": "Yes",
                "compliance_income_tax": "Yes",
                "has_cellphone": "Yes",
                "motivation_make_more_money": "Yes"
            }),
        ),
        (
            "sample 2".to_string(),
            json!({
                "country": "malawi",
                "owner_age": 28,
                "owner_sex": "Male",
                "business_age_years": 2,
                "business_age_months": 0,
                "covid_essential_service": "No",
                "personal_income": 15000,
                "business_expenses": 12000,
                "business_turnover": 20000,
                "keeps_financial_records": "Yes, sometimes",
                "has_mobile_money": "Never had",
                "has_insurance": "No",
                "future_risk_theft_stock": "Yes",
                "attitude_stable_business_environment": "Don't know or N/A",
                "compliance_income_tax": "No",
                "has_cellphone": "Yes",
                "motivation_make_more_money": "Yes"
            }),
        ),
    ]
}

/// `score` is only known when scoring locally; the API response does not carry it.
fn print_prediction(
    label: &str,
    score: Option<f64>,
    category: RiskCategory,
    confidence: &ConfidenceScores,
    recommendation: &str,
) {
    println!("{}:", label);
    if let Some(score) = score {
        println!("  Health Score: {:.2}", score);
    }
    println!("  Financial Health: {}", category);
    println!("  Confidence Scores:");
    for (category, value) in confidence.iter() {
        println!("    {}: {:.3} ({:.1}%)", category, value, value * 100.0);
    }
    println!("  Recommendation: {}", recommendation);
    println!();
}

fn score_locally(label: &str, payload: &Value) -> anyhow::Result<()> {
    let record = validation::parse_survey(payload).with_context(|| label.to_string())?;
    let result = scoring::score_survey(&record);
    print_prediction(
        label,
        Some(result.score),
        result.category,
        &result.confidence_scores,
        result.recommendation,
    );
    Ok(())
}

async fn score_remotely(client: &HealthApiClient, label: &str, payload: &Value) -> anyhow::Result<()> {
    let response = client
        .submit_survey_json(payload)
        .await
        .with_context(|| label.to_string())?;

    let (Some(category), Some(confidence)) = (response.prediction, response.confidence_scores)
    else {
        anyhow::bail!("{}: response carried no prediction", label);
    };
    print_prediction(
        label,
        None,
        category,
        &confidence,
        response.recommendation.as_deref().unwrap_or_default(),
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut remote = false;
    let mut use_samples = false;
    let mut files = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--remote" => remote = true,
            "--samples" => use_samples = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => files.push(arg),
        }
    }

    let mut surveys = if use_samples { sample_surveys() } else { Vec::new() };
    for path in files {
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path))?;
        let payload: Value =
            serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path))?;
        surveys.push((path, payload));
    }

    if surveys.is_empty() {
        anyhow::bail!("{}", USAGE);
    }

    if remote {
        let client = HealthApiClient::from_env()?;
        if !client.check_health().await {
            anyhow::bail!("API at {} is not healthy", client.base_url());
        }
        tracing::info!("Submitting {} survey(s) to {}", surveys.len(), client.base_url());
        for (label, payload) in &surveys {
            score_remotely(&client, label, payload).await?;
        }
    } else {
        for (label, payload) in &surveys {
            score_locally(label, payload)?;
        }
    }

    Ok(())
}

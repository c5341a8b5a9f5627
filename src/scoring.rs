//! Rule-based financial health scoring.
//!
//! score = min(turnover / expenses × 10, 40)      income stability
//!       + 15 records + 10 insurance               financial management
//!       + 8 mobile money + 7 cellphone            technology adoption
//!       + 5 covid essential + 5 stable outlook    business resilience
//!       + 5 income tax + 5 motivation             compliance and planning
//!
//! Categorical answers only count on an exact match with the literal below.
//! The survey form offers "Yes"/"No"/"Don't know" for the outlook and
//! motivation questions, so `"Positive"` and `"High"` never match live traffic.
//! Both literals are kept as-is.

use crate::models::{ConfidenceScores, RiskCategory, ScoreResult, SurveyRecord};

const INCOME_RATIO_MULTIPLIER: f64 = 10.0;
const W_INCOME_STABILITY: f64 = 40.0;

const W_FINANCIAL_RECORDS: f64 = 15.0;
const W_INSURANCE: f64 = 10.0;
const W_MOBILE_MONEY: f64 = 8.0;
const W_CELLPHONE: f64 = 7.0;
const W_COVID_ESSENTIAL: f64 = 5.0;
const W_STABLE_ENVIRONMENT: f64 = 5.0;
const W_INCOME_TAX: f64 = 5.0;
const W_MOTIVATION: f64 = 5.0;

const YES: &str = "Yes";
const STABLE_ENVIRONMENT_LITERAL: &str = "Positive";
const MOTIVATION_LITERAL: &str = "High";

/// Lower bound (inclusive) of the `High` category.
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Lower bound (inclusive) of the `Medium` category.
pub const MEDIUM_THRESHOLD: f64 = 40.0;

const MEDIUM_CENTER: f64 = 55.0;

const HIGH_RECOMMENDATION: &str = "Excellent financial health! Continue maintaining good financial practices and consider expanding your business operations.";
const MEDIUM_RECOMMENDATION: &str = "Moderate financial health. Focus on improving financial record-keeping, increasing turnover, and reducing financial risks.";
const LOW_RECOMMENDATION: &str = "Financial health needs improvement. Consider seeking financial advisory services, improving cash flow management, and building emergency funds.";

fn answered(answer: &Option<String>, literal: &str) -> bool {
    answer.as_deref() == Some(literal)
}

fn points(answer: &Option<String>, literal: &str, weight: f64) -> f64 {
    if answered(answer, literal) {
        weight
    } else {
        0.0
    }
}

/// Income stability component in [0, 40].
///
/// Zero or absent expenses divide by 1. The ratio saturates at 4.0.
pub fn income_stability(record: &SurveyRecord) -> f64 {
    let divisor = match record.business_expenses {
        Some(expenses) if expenses != 0.0 => expenses,
        _ => 1.0,
    };
    let ratio = record.business_turnover / divisor;

    // Negative monetary inputs are accepted unvalidated; floor keeps the score in range.
    (ratio * INCOME_RATIO_MULTIPLIER).clamp(0.0, W_INCOME_STABILITY)
}

/// Computes the health score of a survey, in [0, 100].
pub fn calculate_health_score(record: &SurveyRecord) -> f64 {
    let mut score = income_stability(record);

    // Financial management practices
    score += points(&record.keeps_financial_records, YES, W_FINANCIAL_RECORDS);
    score += points(&record.has_insurance, YES, W_INSURANCE);

    // Technology adoption
    score += points(&record.has_mobile_money, YES, W_MOBILE_MONEY);
    score += points(&record.has_cellphone, YES, W_CELLPHONE);

    // Business resilience
    score += points(&record.covid_essential_service, YES, W_COVID_ESSENTIAL);
    score += points(
        &record.attitude_stable_business_environment,
        STABLE_ENVIRONMENT_LITERAL,
        W_STABLE_ENVIRONMENT,
    );

    // Compliance and planning
    score += points(&record.compliance_income_tax, YES, W_INCOME_TAX);
    score += points(
        &record.motivation_make_more_money,
        MOTIVATION_LITERAL,
        W_MOTIVATION,
    );

    score
}

impl RiskCategory {
    /// Closed thresholds: `[70, ∞)` High, `[40, 70)` Medium, below 40 Low.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskCategory::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskCategory::High => HIGH_RECOMMENDATION,
            RiskCategory::Medium => MEDIUM_RECOMMENDATION,
            RiskCategory::Low => LOW_RECOMMENDATION,
        }
    }
}

/// Smoothed closeness of `score` to each category, normalized to sum to 1.
pub fn confidence_distribution(score: f64) -> ConfidenceScores {
    let low = ((MEDIUM_THRESHOLD - score) / MEDIUM_THRESHOLD).max(0.0);
    let medium = if (MEDIUM_THRESHOLD..=HIGH_THRESHOLD).contains(&score) {
        (HIGH_THRESHOLD - (score - MEDIUM_CENTER).abs()) / 15.0
    } else {
        (1.0 - (score - MEDIUM_CENTER).abs() / 30.0).max(0.0)
    };
    let high = ((score - 30.0) / HIGH_THRESHOLD).max(0.0);

    let total = low + medium + high;
    if !(total.is_finite() && total > 0.0) {
        tracing::warn!(
            "Degenerate confidence distribution for score {}, falling back to one-hot",
            score
        );
        return ConfidenceScores::one_hot(RiskCategory::from_score(score));
    }

    ConfidenceScores {
        low: low / total,
        medium: medium / total,
        high: high / total,
    }
}

/// Scores a survey: health score, category, confidence distribution and recommendation.
pub fn score_survey(record: &SurveyRecord) -> ScoreResult {
    let score = calculate_health_score(record);
    let category = RiskCategory::from_score(score);

    ScoreResult {
        score,
        category,
        confidence_scores: confidence_distribution(score),
        recommendation: category.recommendation(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_record() -> SurveyRecord {
        SurveyRecord {
            country: "Eswatini".to_string(),
            owner_age: 35.0,
            personal_income: 50000.0,
            business_turnover: 0.0,
            ..Default::default()
        }
    }

    fn yes() -> Option<String> {
        Some("Yes".to_string())
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let result = score_survey(&base_record());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.category, RiskCategory::Low);
        assert_eq!(result.confidence_scores, ConfidenceScores::one_hot(RiskCategory::Low));
    }

    #[test]
    fn test_income_ratio_saturates() {
        let record = SurveyRecord {
            business_turnover: 1_000_000.0,
            business_expenses: Some(10.0),
            ..base_record()
        };
        assert_eq!(income_stability(&record), 40.0);
    }

    #[test]
    fn test_zero_expenses_divides_by_one() {
        let record = SurveyRecord {
            business_turnover: 2.5,
            business_expenses: Some(0.0),
            ..base_record()
        };
        assert_eq!(income_stability(&record), 25.0);

        let absent = SurveyRecord {
            business_expenses: None,
            ..record
        };
        assert_eq!(income_stability(&absent), 25.0);
    }

    #[test]
    fn test_negative_turnover_floors_at_zero() {
        let record = SurveyRecord {
            business_turnover: -5000.0,
            business_expenses: Some(1000.0),
            ..base_record()
        };
        assert_eq!(income_stability(&record), 0.0);
    }

    #[test]
    fn test_all_practices_max_score() {
        let record = SurveyRecord {
            business_turnover: 100.0,
            business_expenses: Some(10.0),
            keeps_financial_records: yes(),
            has_insurance: yes(),
            has_mobile_money: yes(),
            has_cellphone: yes(),
            covid_essential_service: yes(),
            attitude_stable_business_environment: Some("Positive".to_string()),
            compliance_income_tax: yes(),
            motivation_make_more_money: Some("High".to_string()),
            ..base_record()
        };
        assert_eq!(calculate_health_score(&record), 100.0);
    }

    #[test]
    fn test_case_variants_do_not_count() {
        let record = SurveyRecord {
            keeps_financial_records: Some("yes".to_string()),
            has_insurance: Some("YES".to_string()),
            has_mobile_money: Some("Yes ".to_string()),
            ..base_record()
        };
        assert_eq!(calculate_health_score(&record), 0.0);
    }

    #[test]
    fn test_thresholds_are_closed_below() {
        assert_eq!(RiskCategory::from_score(70.0), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(69.999), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(40.0), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(39.999), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(100.0), RiskCategory::High);
    }

    #[test]
    fn test_confidence_at_medium_center() {
        // low = 0, medium = 70 / 15, high = 25 / 70
        let scores = confidence_distribution(55.0);
        let medium_raw = 70.0 / 15.0;
        let high_raw = 25.0 / 70.0;
        let total = medium_raw + high_raw;

        assert_eq!(scores.low, 0.0);
        assert!((scores.medium - medium_raw / total).abs() < 1e-12);
        assert!((scores.high - high_raw / total).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_at_top_of_range() {
        // low = 0, medium = max(0, 1 - 45/30) = 0, high = 1
        let scores = confidence_distribution(100.0);
        assert_eq!(scores, ConfidenceScores::one_hot(RiskCategory::High));
    }

    #[test]
    fn test_confidence_sums_to_one_across_range() {
        for tenth in 0..=1000 {
            let score = f64::from(tenth) / 10.0;
            let scores = confidence_distribution(score);
            assert!((scores.sum() - 1.0).abs() < 1e-9, "score {}", score);
            for (_, value) in scores.iter() {
                assert!((0.0..=1.0).contains(&value), "score {}", score);
            }
        }
    }

    #[test]
    fn test_degenerate_score_falls_back_to_one_hot() {
        let scores = confidence_distribution(f64::NAN);
        assert_eq!(scores.sum(), 1.0);
    }

    #[test]
    fn test_recommendation_matches_category() {
        assert!(RiskCategory::High.recommendation().starts_with("Excellent"));
        assert!(RiskCategory::Medium.recommendation().starts_with("Moderate"));
        assert!(RiskCategory::Low
            .recommendation()
            .starts_with("Financial health needs improvement"));
    }
}

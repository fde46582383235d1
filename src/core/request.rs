use std::collections::HashMap;

use thiserror::Error;

use super::types::ScenarioRequest;

pub const DEFAULT_INVESTMENT_STRATEGY: &str = "balanced";
pub const DEFAULT_RETIREMENT_INVESTMENT_STRATEGY: &str = "conservative";

/// A required form field that cannot be turned into a request value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Form field name and its wire alias.
#[derive(Copy, Clone, Debug)]
struct Field {
    form: &'static str,
    wire: &'static str,
}

impl Field {
    const fn new(form: &'static str, wire: &'static str) -> Self {
        Field { form, wire }
    }
}

const CURRENT_AGE: Field = Field::new("current-age", "current_age");
const RETIREMENT_AGE: Field = Field::new("retirement-age", "retirement_age");
const MONTHLY_INCOME: Field = Field::new("monthly-income", "monthly_income");
const MONTHLY_EXPENSES: Field = Field::new("monthly-expenses", "monthly_expenses");
const MONTHLY_SAVINGS: Field = Field::new("monthly-savings", "monthly_savings");
const INVESTMENT_STRATEGY: Field = Field::new("investment-strategy", "investment_strategy");
const RETIREMENT_INVESTMENT_STRATEGY: Field = Field::new(
    "retirement-investment-strategy",
    "retirement_investment_strategy",
);
const INVESTMENT_INCREASE: Field = Field::new("investment-increase", "investment_increase");
const CAREER_SWITCH_IMPACT: Field = Field::new("career-switch-impact", "career_switch_impact");
const CAREER_SWITCH_AGE: Field = Field::new("career-switch-age", "career_switch_age");
const PURCHASE_AMOUNT: Field = Field::new("purchase-amount", "purchase_amount");
const PURCHASE_AGE: Field = Field::new("purchase-age", "purchase_age");

/// Assembles a [`ScenarioRequest`] from raw form values.
///
/// The five required numbers must parse and respect their ranges; the
/// optional numbers fall back to zero when blank or unparsable. Strategy
/// names are passed through untouched.
pub fn build_request(raw: &HashMap<String, String>) -> Result<ScenarioRequest, ValidationError> {
    let current_age = required_age(raw, CURRENT_AGE)?;
    let retirement_age = required_age(raw, RETIREMENT_AGE)?;
    if retirement_age <= current_age {
        return Err(ValidationError::new(
            RETIREMENT_AGE.form,
            "must be greater than current-age",
        ));
    }

    Ok(ScenarioRequest {
        current_age,
        retirement_age,
        monthly_income: required_amount(raw, MONTHLY_INCOME)?,
        monthly_expenses: required_amount(raw, MONTHLY_EXPENSES)?,
        monthly_savings: required_amount(raw, MONTHLY_SAVINGS)?,
        investment_strategy: strategy(raw, INVESTMENT_STRATEGY, DEFAULT_INVESTMENT_STRATEGY),
        retirement_investment_strategy: strategy(
            raw,
            RETIREMENT_INVESTMENT_STRATEGY,
            DEFAULT_RETIREMENT_INVESTMENT_STRATEGY,
        ),
        investment_increase: optional_amount(raw, INVESTMENT_INCREASE),
        career_switch_impact: optional_amount(raw, CAREER_SWITCH_IMPACT),
        career_switch_age: optional_age(raw, CAREER_SWITCH_AGE),
        purchase_amount: optional_amount(raw, PURCHASE_AMOUNT),
        purchase_age: optional_age(raw, PURCHASE_AGE),
    })
}

fn lookup<'a>(raw: &'a HashMap<String, String>, field: Field) -> Option<&'a str> {
    raw.get(field.form)
        .or_else(|| raw.get(field.wire))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required_age(raw: &HashMap<String, String>, field: Field) -> Result<u32, ValidationError> {
    let text = lookup(raw, field).ok_or_else(|| ValidationError::new(field.form, "is required"))?;
    let value = text.parse::<i64>().map_err(|_| {
        ValidationError::new(field.form, format!("must be a whole number, got {text:?}"))
    })?;
    if value < 0 {
        return Err(ValidationError::new(field.form, "must be >= 0"));
    }
    u32::try_from(value).map_err(|_| ValidationError::new(field.form, "is out of range"))
}

fn required_amount(raw: &HashMap<String, String>, field: Field) -> Result<f64, ValidationError> {
    let text = lookup(raw, field).ok_or_else(|| ValidationError::new(field.form, "is required"))?;
    let value = text
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ValidationError::new(field.form, format!("must be a number, got {text:?}"))
        })?;
    if value < 0.0 {
        return Err(ValidationError::new(field.form, "must be >= 0"));
    }
    Ok(value)
}

fn optional_amount(raw: &HashMap<String, String>, field: Field) -> f64 {
    lookup(raw, field)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn optional_age(raw: &HashMap<String, String>, field: Field) -> u32 {
    lookup(raw, field)
        .and_then(|text| text.parse::<u32>().ok())
        .unwrap_or(0)
}

fn strategy(raw: &HashMap<String, String>, field: Field, default: &str) -> String {
    lookup(raw, field).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_form() -> HashMap<String, String> {
        form(&[
            ("current-age", "30"),
            ("retirement-age", "65"),
            ("monthly-income", "5000"),
            ("monthly-expenses", "3000"),
            ("monthly-savings", "1000"),
            ("investment-strategy", "aggressive"),
            ("retirement-investment-strategy", "balanced"),
            ("investment-increase", ""),
            ("career-switch-impact", ""),
            ("career-switch-age", ""),
            ("purchase-amount", ""),
            ("purchase-age", ""),
        ])
    }

    #[test]
    fn build_request_sets_required_fields_and_zeroes_blank_optionals() {
        let request = build_request(&base_form()).expect("valid form");

        assert_eq!(request.current_age, 30);
        assert_eq!(request.retirement_age, 65);
        assert_eq!(request.monthly_income, 5000.0);
        assert_eq!(request.monthly_expenses, 3000.0);
        assert_eq!(request.monthly_savings, 1000.0);
        assert_eq!(request.investment_strategy, "aggressive");
        assert_eq!(request.retirement_investment_strategy, "balanced");
        assert_eq!(request.investment_increase, 0.0);
        assert_eq!(request.career_switch_impact, 0.0);
        assert_eq!(request.career_switch_age, 0);
        assert_eq!(request.purchase_amount, 0.0);
        assert_eq!(request.purchase_age, 0);
    }

    #[test]
    fn build_request_reads_optional_fields_and_allows_negative_impact() {
        let mut raw = base_form();
        raw.insert("investment-increase".into(), "10".into());
        raw.insert("career-switch-impact".into(), "-12000".into());
        raw.insert("career-switch-age".into(), "40".into());
        raw.insert("purchase-amount".into(), " 250000.50 ".into());
        raw.insert("purchase-age".into(), "35".into());

        let request = build_request(&raw).expect("valid form");
        assert_eq!(request.investment_increase, 10.0);
        assert_eq!(request.career_switch_impact, -12_000.0);
        assert_eq!(request.career_switch_age, 40);
        assert_eq!(request.purchase_amount, 250_000.5);
        assert_eq!(request.purchase_age, 35);
    }

    #[test]
    fn build_request_defaults_unparsable_optionals_to_zero() {
        let mut raw = base_form();
        raw.insert("investment-increase".into(), "lots".into());
        raw.insert("purchase-amount".into(), "NaN".into());
        raw.insert("career-switch-age".into(), "forty".into());
        raw.remove("purchase-age");

        let request = build_request(&raw).expect("optional fields never fail");
        assert_eq!(request.investment_increase, 0.0);
        assert_eq!(request.purchase_amount, 0.0);
        assert_eq!(request.career_switch_age, 0);
        assert_eq!(request.purchase_age, 0);
    }

    #[test]
    fn build_request_names_the_unparsable_required_field() {
        for field in [
            "current-age",
            "retirement-age",
            "monthly-income",
            "monthly-expenses",
            "monthly-savings",
        ] {
            let mut raw = base_form();
            raw.insert(field.to_string(), "abc".to_string());
            let err = build_request(&raw).expect_err("garbage must be rejected");
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn build_request_rejects_blank_and_non_finite_required_values() {
        let mut raw = base_form();
        raw.insert("monthly-income".into(), "   ".into());
        let err = build_request(&raw).expect_err("blank income must be rejected");
        assert_eq!(err.field, "monthly-income");
        assert!(err.to_string().contains("is required"));

        let mut raw = base_form();
        raw.insert("monthly-savings".into(), "inf".into());
        let err = build_request(&raw).expect_err("infinite savings must be rejected");
        assert_eq!(err.field, "monthly-savings");
    }

    #[test]
    fn build_request_rejects_negative_required_values() {
        let mut raw = base_form();
        raw.insert("monthly-expenses".into(), "-1".into());
        let err = build_request(&raw).expect_err("negative expenses must be rejected");
        assert_eq!(err.field, "monthly-expenses");

        let mut raw = base_form();
        raw.insert("current-age".into(), "-3".into());
        let err = build_request(&raw).expect_err("negative age must be rejected");
        assert_eq!(err.field, "current-age");
    }

    #[test]
    fn build_request_rejects_retirement_not_after_current_age() {
        let mut raw = base_form();
        raw.insert("retirement-age".into(), "30".into());
        let err = build_request(&raw).expect_err("retirement must follow current age");
        assert_eq!(err.field, "retirement-age");
    }

    #[test]
    fn build_request_accepts_wire_names_and_defaults_strategies() {
        let raw = form(&[
            ("current_age", "45"),
            ("retirement_age", "60"),
            ("monthly_income", "8000"),
            ("monthly_expenses", "4000"),
            ("monthly_savings", "2500"),
        ]);
        let request = build_request(&raw).expect("wire names are accepted");
        assert_eq!(request.current_age, 45);
        assert_eq!(request.investment_strategy, DEFAULT_INVESTMENT_STRATEGY);
        assert_eq!(
            request.retirement_investment_strategy,
            DEFAULT_RETIREMENT_INVESTMENT_STRATEGY
        );
    }

    #[test]
    fn strategies_pass_through_without_membership_check() {
        let mut raw = base_form();
        raw.insert("investment-strategy".into(), "yolo".into());
        let request = build_request(&raw).expect("strategy is opaque");
        assert_eq!(request.investment_strategy, "yolo");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_valid_required_fields_round_trip_into_request(
            current_age in 0u32..100,
            span in 1u32..60,
            income in 0u32..1_000_000,
            expenses in 0u32..1_000_000,
            savings in 0u32..1_000_000
        ) {
            let raw = form(&[
                ("current-age", &current_age.to_string()),
                ("retirement-age", &(current_age + span).to_string()),
                ("monthly-income", &income.to_string()),
                ("monthly-expenses", &expenses.to_string()),
                ("monthly-savings", &savings.to_string()),
            ]);
            let request = build_request(&raw).expect("generated form is valid");
            prop_assert_eq!(request.current_age, current_age);
            prop_assert_eq!(request.retirement_age, current_age + span);
            prop_assert_eq!(request.monthly_income, income as f64);
            prop_assert_eq!(request.monthly_expenses, expenses as f64);
            prop_assert_eq!(request.monthly_savings, savings as f64);
            prop_assert_eq!(request.purchase_age, 0);
        }
    }
}

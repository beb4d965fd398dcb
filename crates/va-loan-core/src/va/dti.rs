use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VaLoanError;
use crate::policy::{DtiLimits, VaLoanPolicy};
use crate::validation;
use crate::{types::*, VaLoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtiInput {
    /// Gross monthly income.
    pub monthly_income: Money,
    /// Recurring non-housing obligations (auto, cards, student loans).
    pub monthly_debts: Money,
    pub proposed_housing_payment: Money,
}

/// Ceiling that sets the maximum housing payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtiConstraint {
    FrontEnd,
    BackEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtiOutput {
    pub front_end_ratio: Percent,
    pub back_end_ratio: Percent,
    pub max_front_end_limit: Percent,
    pub max_back_end_limit: Percent,
    pub front_end_within_limit: bool,
    pub back_end_within_limit: bool,
    pub within_limits: bool,
    pub max_affordable_housing_payment: Money,
    pub binding_constraint: DtiConstraint,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Front-end / back-end debt-to-income against the built-in VA ceilings.
pub fn evaluate_dti(input: &DtiInput) -> VaLoanResult<ComputationOutput<DtiOutput>> {
    evaluate_dti_with_policy(input, &VaLoanPolicy::default())
}

pub fn evaluate_dti_with_policy(
    input: &DtiInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<ComputationOutput<DtiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    policy.validate()?;

    let output = compute_dti(input, &policy.dti)?;

    if output.max_affordable_housing_payment.is_zero() {
        warnings.push(format!(
            "Monthly debts of {} use the full {}% back-end allowance; no housing payment fits.",
            input.monthly_debts, policy.dti.back_end_percent
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "policy_version": policy.version,
        "front_end_limit_pct": policy.dti.front_end_percent.to_string(),
        "back_end_limit_pct": policy.dti.back_end_percent.to_string(),
        "compensating_factors": "not considered; hard ceilings only",
    });

    Ok(with_metadata(
        "VA Debt-to-Income (front-end / back-end)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn compute_dti(input: &DtiInput, limits: &DtiLimits) -> VaLoanResult<DtiOutput> {
    validate_input(input)?;

    if input.monthly_income.is_zero() {
        return Err(VaLoanError::ArithmeticDegenerate {
            context: "debt-to-income ratio with zero monthly income".into(),
        });
    }

    let income = input.monthly_income;
    let housing = input.proposed_housing_payment;

    let front_end_ratio = housing / income * dec!(100);
    let back_end_ratio = (housing + input.monthly_debts) / income * dec!(100);

    let front_end_within_limit = front_end_ratio <= limits.front_end_percent;
    let back_end_within_limit = back_end_ratio <= limits.back_end_percent;

    let max_by_front_end = percent_of(income, limits.front_end_percent);
    let max_by_back_end = percent_of(income, limits.back_end_percent) - input.monthly_debts;
    let (binding_constraint, max_housing) = if max_by_back_end < max_by_front_end {
        (DtiConstraint::BackEnd, max_by_back_end)
    } else {
        (DtiConstraint::FrontEnd, max_by_front_end)
    };

    let output = DtiOutput {
        front_end_ratio,
        back_end_ratio,
        max_front_end_limit: limits.front_end_percent,
        max_back_end_limit: limits.back_end_percent,
        front_end_within_limit,
        back_end_within_limit,
        within_limits: front_end_within_limit && back_end_within_limit,
        max_affordable_housing_payment: max_housing.max(Decimal::ZERO),
        binding_constraint,
    };
    tracing::debug!(
        front_end = %output.front_end_ratio,
        back_end = %output.back_end_ratio,
        max_housing = %output.max_affordable_housing_payment,
        "dti evaluated"
    );
    Ok(output)
}

fn validate_input(input: &DtiInput) -> VaLoanResult<()> {
    validation::non_negative("monthly_income", input.monthly_income)?;
    validation::non_negative("monthly_debts", input.monthly_debts)?;
    validation::non_negative("proposed_housing_payment", input.proposed_housing_payment)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

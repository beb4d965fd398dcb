//! Maximum and recommended home price from income, debts and VA DTI ceilings.
//!
//! The solver is closed-form: the DTI ceiling gives a housing budget, the
//! annuity present value turns the P&I share of it into a maximum loan, and
//! the funding fee is backed out by dividing by `1 + fee rate`. That last
//! step treats the fee as a multiplier on an already-sized loan rather than
//! solving fee, payment and DTI jointly, so the fee tier is estimated from
//! the fee-inclusive price. Near a down-payment band boundary the tier the
//! composer later applies can differ from the one used here.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VaLoanError;
use crate::mortgage::payment::{compute_mortgage, MortgageInput, MortgageOutput};
use crate::policy::VaLoanPolicy;
use crate::time_value::{self, annuity_present_value};
use crate::va::dti::{compute_dti, DtiInput};
use crate::va::funding_fee::{compute_funding_fee, FundingFeeInput, LoanPurpose};
use crate::validation;
use crate::{types::*, VaLoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtLineItem {
    #[serde(default)]
    pub label: String,
    pub monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub annual_base_salary: Money,
    /// Basic Allowance for Housing, counted only when `include_housing_allowance`.
    #[serde(default)]
    pub monthly_housing_allowance: Money,
    #[serde(default)]
    pub include_housing_allowance: bool,
    #[serde(default)]
    pub other_monthly_income: Money,
    #[serde(default)]
    pub debts: Vec<DebtLineItem>,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    pub property_tax_rate_percent: Percent,
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    pub is_first_time_use: bool,
    pub has_disability_rating: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub total_monthly_income: Money,
    pub total_monthly_debts: Money,
    pub max_affordable_housing_payment: Money,
    pub principal_and_interest_budget: Money,
    /// Largest fee-inclusive loan the P&I budget retires.
    pub max_loan_amount: Money,
    pub funding_fee_percent: Percent,
    /// `max_loan_amount` with the funding fee backed out.
    pub base_loan_amount: Money,
    pub max_home_price: Money,
    pub recommended_home_price: Money,
    /// Breakdown at the recommended price; `None` when that price is zero.
    pub recommended: Option<MortgageOutput>,
    pub front_end_ratio: Percent,
    pub back_end_ratio: Percent,
    pub within_limits: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the maximum and recommended home price under the built-in policy.
pub fn solve_affordability(
    input: &AffordabilityInput,
) -> VaLoanResult<ComputationOutput<AffordabilityOutput>> {
    solve_affordability_with_policy(input, &VaLoanPolicy::default())
}

pub fn solve_affordability_with_policy(
    input: &AffordabilityInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    policy.validate()?;

    let (output, warnings) = compute_affordability(input, policy)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "policy_version": policy.version,
        "front_end_limit_pct": policy.dti.front_end_percent.to_string(),
        "back_end_limit_pct": policy.dti.back_end_percent.to_string(),
        "estimated_monthly_insurance": policy.estimated_monthly_insurance.to_string(),
        "affordability_buffer": policy.affordability_buffer.to_string(),
        "housing_allowance_counted": input.include_housing_allowance,
        "funding_fee_inversion": "approximate: max loan divided by (1 + fee rate)",
    });

    Ok(with_metadata(
        "VA Affordability (DTI-constrained annuity inversion, buffered recommendation)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compute_affordability(
    input: &AffordabilityInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<(AffordabilityOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    // 1-2. Income and debts
    let housing_allowance = if input.include_housing_allowance {
        input.monthly_housing_allowance
    } else {
        Decimal::ZERO
    };
    let total_monthly_income =
        input.annual_base_salary / dec!(12) + housing_allowance + input.other_monthly_income;
    if total_monthly_income.is_zero() {
        return Err(VaLoanError::invalid(
            "monthly_income",
            "Affordability requires a positive monthly income.",
        ));
    }
    let total_monthly_debts: Money = input.debts.iter().map(|d| d.monthly_payment).sum();

    // 3. Ceiling on the whole housing payment
    let dti_ceiling = compute_dti(
        &DtiInput {
            monthly_income: total_monthly_income,
            monthly_debts: total_monthly_debts,
            proposed_housing_payment: Decimal::ZERO,
        },
        &policy.dti,
    )?;
    let max_housing = dti_ceiling.max_affordable_housing_payment;
    if max_housing.is_zero() {
        warnings.push(format!(
            "Monthly debts of {total_monthly_debts} leave no room under the {}% back-end limit.",
            policy.dti.back_end_percent
        ));
    }

    // 4. P&I share of the ceiling
    let raw_budget = max_housing - policy.estimated_monthly_insurance - input.monthly_hoa;
    let principal_and_interest_budget = raw_budget.max(Decimal::ZERO);
    if raw_budget <= Decimal::ZERO && !max_housing.is_zero() {
        warnings.push(
            "Insurance estimate and HOA consume the entire housing budget; no loan fits.".into(),
        );
    }
    let monthly_insurance = input.annual_insurance / dec!(12);
    if monthly_insurance > policy.estimated_monthly_insurance {
        warnings.push(format!(
            "Actual insurance ({}/mo) exceeds the {}/mo estimate used to size the loan.",
            monthly_insurance.round_dp(2),
            policy.estimated_monthly_insurance
        ));
    }

    // 5. Annuity inversion
    let max_loan_amount = annuity_present_value(
        principal_and_interest_budget,
        time_value::monthly_rate(input.annual_rate_percent),
        time_value::number_of_payments(input.term_years),
    )?;

    // 6. Back out the funding fee
    let estimated_price = max_loan_amount + input.down_payment;
    let estimated_down_percent = if estimated_price.is_zero() {
        Decimal::ZERO
    } else {
        input.down_payment / estimated_price * dec!(100)
    };
    let fee = compute_funding_fee(
        &FundingFeeInput {
            loan_amount: max_loan_amount,
            is_first_time_use: input.is_first_time_use,
            has_disability_rating: input.has_disability_rating,
            down_payment_percent: estimated_down_percent,
            loan_purpose: LoanPurpose::Purchase,
        },
        policy,
    )?;
    let base_loan_amount = max_loan_amount / (Decimal::ONE + fee.fee_percent / dec!(100));

    // 7-8. Maximum and buffered recommendation
    let max_home_price = base_loan_amount + input.down_payment;
    let recommended_home_price = (max_home_price * policy.affordability_buffer)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    // 9. Full breakdown and realized DTI at the recommended price
    let recommended = if recommended_home_price > Decimal::ZERO {
        let down = input.down_payment.min(recommended_home_price);
        Some(compute_mortgage(
            &MortgageInput {
                home_price: recommended_home_price,
                down_payment_percent: down / recommended_home_price * dec!(100),
                term_years: input.term_years,
                annual_rate_percent: input.annual_rate_percent,
                property_tax_rate_percent: input.property_tax_rate_percent,
                annual_insurance: input.annual_insurance,
                monthly_hoa: input.monthly_hoa,
                is_first_time_use: input.is_first_time_use,
                has_disability_rating: input.has_disability_rating,
                include_funding_fee: true,
            },
            policy,
        )?)
    } else {
        warnings.push("No home price is affordable with these inputs.".into());
        None
    };

    let housing_at_recommended = recommended
        .as_ref()
        .map(|m| m.payment.total)
        .unwrap_or(Decimal::ZERO);
    let realized = compute_dti(
        &DtiInput {
            monthly_income: total_monthly_income,
            monthly_debts: total_monthly_debts,
            proposed_housing_payment: housing_at_recommended,
        },
        &policy.dti,
    )?;
    if !realized.within_limits {
        warnings.push(format!(
            "Payment at the recommended price exceeds DTI limits (front-end {}%, back-end {}%).",
            realized.front_end_ratio.round_dp(2),
            realized.back_end_ratio.round_dp(2)
        ));
    }

    tracing::debug!(
        income = %total_monthly_income,
        %max_housing,
        %max_home_price,
        %recommended_home_price,
        "affordability solved"
    );

    let output = AffordabilityOutput {
        total_monthly_income,
        total_monthly_debts,
        max_affordable_housing_payment: max_housing,
        principal_and_interest_budget,
        max_loan_amount,
        funding_fee_percent: fee.fee_percent,
        base_loan_amount,
        max_home_price,
        recommended_home_price,
        recommended,
        front_end_ratio: realized.front_end_ratio,
        back_end_ratio: realized.back_end_ratio,
        within_limits: realized.within_limits,
    };
    Ok((output, warnings))
}

fn validate_input(input: &AffordabilityInput) -> VaLoanResult<()> {
    validation::non_negative("annual_base_salary", input.annual_base_salary)?;
    validation::non_negative("monthly_housing_allowance", input.monthly_housing_allowance)?;
    validation::non_negative("other_monthly_income", input.other_monthly_income)?;
    for debt in &input.debts {
        validation::non_negative("debts.monthly_payment", debt.monthly_payment)?;
    }
    validation::non_negative("down_payment", input.down_payment)?;
    validation::percent("annual_rate_percent", input.annual_rate_percent)?;
    validation::term_years("term_years", input.term_years)?;
    validation::percent("property_tax_rate_percent", input.property_tax_rate_percent)?;
    validation::non_negative("annual_insurance", input.annual_insurance)?;
    validation::non_negative("monthly_hoa", input.monthly_hoa)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VaLoanError;
use crate::mortgage::amortization::monthly_payment;
use crate::policy::VaLoanPolicy;
use crate::time_value;
use crate::va::funding_fee::{compute_funding_fee, FundingFeeInput, FundingFeeOutput, LoanPurpose};
use crate::validation;
use crate::{types::*, VaLoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    pub down_payment_percent: Percent,
    pub term_years: u32,
    pub annual_rate_percent: Percent,
    /// Annual property tax as a percentage of the home price.
    pub property_tax_rate_percent: Percent,
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    pub is_first_time_use: bool,
    pub has_disability_rating: bool,
    /// When false the loan carries no funding fee at all.
    #[serde(default = "default_include_funding_fee")]
    pub include_funding_fee: bool,
}

fn default_include_funding_fee() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub hoa: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub home_price: Money,
    pub down_payment_amount: Money,
    pub base_loan_amount: Money,
    /// `None` when the fee was excluded from the calculation.
    pub funding_fee: Option<FundingFeeOutput>,
    pub funding_fee_amount: Money,
    /// Base loan plus the financed funding fee.
    pub total_loan_amount: Money,
    pub payment: PaymentBreakdown,
    pub number_of_payments: u32,
    pub total_of_payments: Money,
    pub total_interest_paid: Money,
    pub loan_to_value_percent: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full monthly payment for a VA purchase: P&I on the fee-inclusive loan
/// plus escrowed tax, insurance and HOA.
pub fn compose_mortgage_payment(
    input: &MortgageInput,
) -> VaLoanResult<ComputationOutput<MortgageOutput>> {
    compose_mortgage_payment_with_policy(input, &VaLoanPolicy::default())
}

pub fn compose_mortgage_payment_with_policy(
    input: &MortgageInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    policy.validate()?;

    let output = compute_mortgage(input, policy)?;

    if output.loan_to_value_percent > dec!(100) {
        warnings.push(format!(
            "Financing the funding fee puts the loan above the home price (LTV {}%).",
            output.loan_to_value_percent.round_dp(2)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "policy_version": policy.version,
        "loan_purpose": "purchase",
        "funding_fee_included": input.include_funding_fee,
        "funding_fee_financed": true,
        "term_years": input.term_years,
        "annual_rate_pct": input.annual_rate_percent.to_string(),
    });

    Ok(with_metadata(
        "VA Mortgage Payment (PITI + HOA, funding fee financed)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn compute_mortgage(
    input: &MortgageInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<MortgageOutput> {
    validate_input(input)?;

    let down_payment_amount = percent_of(input.home_price, input.down_payment_percent);
    let base_loan_amount = input.home_price - down_payment_amount;

    let funding_fee = if input.include_funding_fee {
        Some(compute_funding_fee(
            &FundingFeeInput {
                loan_amount: base_loan_amount,
                is_first_time_use: input.is_first_time_use,
                has_disability_rating: input.has_disability_rating,
                down_payment_percent: input.down_payment_percent,
                loan_purpose: LoanPurpose::Purchase,
            },
            policy,
        )?)
    } else {
        None
    };
    let funding_fee_amount = funding_fee
        .as_ref()
        .map(|f| f.fee_amount)
        .unwrap_or(Decimal::ZERO);
    let total_loan_amount = base_loan_amount + funding_fee_amount;

    let principal_and_interest =
        monthly_payment(total_loan_amount, input.annual_rate_percent, input.term_years)?;
    let property_tax = percent_of(input.home_price, input.property_tax_rate_percent) / dec!(12);
    let insurance = input.annual_insurance / dec!(12);
    let hoa = input.monthly_hoa;

    let number_of_payments = time_value::number_of_payments(input.term_years);
    let total_of_payments = principal_and_interest * Decimal::from(number_of_payments);

    let output = MortgageOutput {
        home_price: input.home_price,
        down_payment_amount,
        base_loan_amount,
        funding_fee,
        funding_fee_amount,
        total_loan_amount,
        payment: PaymentBreakdown {
            principal_and_interest,
            property_tax,
            insurance,
            hoa,
            total: principal_and_interest + property_tax + insurance + hoa,
        },
        number_of_payments,
        total_of_payments,
        total_interest_paid: total_of_payments - total_loan_amount,
        loan_to_value_percent: total_loan_amount / input.home_price * dec!(100),
    };
    tracing::debug!(
        home_price = %input.home_price,
        total_loan = %output.total_loan_amount,
        monthly_total = %output.payment.total,
        "mortgage payment composed"
    );
    Ok(output)
}

fn validate_input(input: &MortgageInput) -> VaLoanResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(VaLoanError::invalid(
            "home_price",
            "Home price must be positive.",
        ));
    }
    validation::percent("down_payment_percent", input.down_payment_percent)?;
    validation::percent("property_tax_rate_percent", input.property_tax_rate_percent)?;
    validation::non_negative("annual_insurance", input.annual_insurance)?;
    validation::non_negative("monthly_hoa", input.monthly_hoa)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

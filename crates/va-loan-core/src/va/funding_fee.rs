use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VaLoanError;
use crate::policy::VaLoanPolicy;
use crate::validation;
use crate::{types::*, VaLoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinanceKind {
    CashOut,
    /// Interest Rate Reduction Refinance Loan (streamline).
    Irrrl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanPurpose {
    #[default]
    Purchase,
    Refinance { kind: RefinanceKind },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingFeeInput {
    pub loan_amount: Money,
    pub is_first_time_use: bool,
    pub has_disability_rating: bool,
    /// Ignored for refinances.
    pub down_payment_percent: Percent,
    #[serde(default)]
    pub loan_purpose: LoanPurpose,
}

/// Row of the fee table that produced the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeTier {
    DisabilityExempt,
    Purchase { min_down_payment_percent: Percent },
    CashOutRefinance,
    Irrrl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingFeeOutput {
    pub fee_percent: Percent,
    pub fee_amount: Money,
    pub is_exempt: bool,
    pub fee_tier: FeeTier,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve the VA funding fee under the built-in policy.
pub fn resolve_funding_fee(
    input: &FundingFeeInput,
) -> VaLoanResult<ComputationOutput<FundingFeeOutput>> {
    resolve_funding_fee_with_policy(input, &VaLoanPolicy::default())
}

/// Resolve the VA funding fee against an explicit policy table.
pub fn resolve_funding_fee_with_policy(
    input: &FundingFeeInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<ComputationOutput<FundingFeeOutput>> {
    let start = Instant::now();
    policy.validate()?;

    let output = compute_funding_fee(input, policy)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "policy_version": policy.version,
        "loan_purpose": input.loan_purpose,
        "first_time_use": input.is_first_time_use,
        "fee_financed": true,
    });

    Ok(with_metadata(
        "VA Funding Fee (tiered by usage, purpose and down payment)",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn compute_funding_fee(
    input: &FundingFeeInput,
    policy: &VaLoanPolicy,
) -> VaLoanResult<FundingFeeOutput> {
    validate_input(input)?;

    // The exemption overrides every other field.
    if input.has_disability_rating {
        tracing::debug!("funding fee waived: disability rating");
        return Ok(FundingFeeOutput {
            fee_percent: Decimal::ZERO,
            fee_amount: Decimal::ZERO,
            is_exempt: true,
            fee_tier: FeeTier::DisabilityExempt,
        });
    }

    let schedule = &policy.funding_fee;
    let (fee_percent, fee_tier) = match input.loan_purpose {
        LoanPurpose::Purchase => {
            let (_, band) = schedule
                .purchase_band(input.down_payment_percent)
                .ok_or_else(|| {
                    VaLoanError::invalid(
                        "policy.funding_fee.purchase",
                        "No purchase fee band covers this down payment.",
                    )
                })?;
            let pct = if input.is_first_time_use {
                band.first_use_percent
            } else {
                band.subsequent_use_percent
            };
            (
                pct,
                FeeTier::Purchase {
                    min_down_payment_percent: band.min_down_payment_percent,
                },
            )
        }
        LoanPurpose::Refinance {
            kind: RefinanceKind::CashOut,
        } => (
            schedule.cash_out.for_usage(input.is_first_time_use),
            FeeTier::CashOutRefinance,
        ),
        LoanPurpose::Refinance {
            kind: RefinanceKind::Irrrl,
        } => (schedule.irrrl_percent, FeeTier::Irrrl),
    };

    let fee_amount = percent_of(input.loan_amount, fee_percent);
    tracing::debug!(%fee_percent, %fee_amount, ?fee_tier, "funding fee resolved");

    Ok(FundingFeeOutput {
        fee_percent,
        fee_amount,
        is_exempt: false,
        fee_tier,
    })
}

fn validate_input(input: &FundingFeeInput) -> VaLoanResult<()> {
    validation::non_negative("loan_amount", input.loan_amount)?;
    validation::percent("down_payment_percent", input.down_payment_percent)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

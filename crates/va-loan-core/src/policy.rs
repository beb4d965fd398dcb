//! Versioned VA lending policy: funding-fee tables, DTI ceilings and the
//! affordability assumptions.
//!
//! The named constants are the built-in policy. [`VaLoanPolicy`] carries
//! the same values as data so callers can load a newer table without
//! touching calculation code; any field left out of a serialized policy
//! falls back to the built-in value.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::VaLoanError;
use crate::types::{Money, Percent, Rate};
use crate::VaLoanResult;

/// Identifier of the built-in policy (VA funding-fee table effective 2023-04-07).
pub const POLICY_VERSION: &str = "va-2023-04-07";

/// Housing payment ceiling as a share of gross monthly income.
pub const FRONT_END_DTI_LIMIT: Percent = dec!(31);
/// Housing plus recurring debts ceiling as a share of gross monthly income.
pub const BACK_END_DTI_LIMIT: Percent = dec!(41);

/// Share of the maximum home price offered as the recommended price.
pub const AFFORDABILITY_BUFFER: Rate = dec!(0.80);
/// Flat monthly insurance estimate used when sizing the P&I budget.
pub const ESTIMATED_MONTHLY_INSURANCE: Money = dec!(100);

/// Purchase fee bands: (minimum down payment %, first use %, subsequent use %).
pub const PURCHASE_FEE_BANDS: [(Percent, Percent, Percent); 3] = [
    (dec!(0), dec!(2.15), dec!(3.30)),
    (dec!(5), dec!(1.50), dec!(1.50)),
    (dec!(10), dec!(1.25), dec!(1.25)),
];
pub const CASH_OUT_FIRST_USE_PERCENT: Percent = dec!(2.15);
pub const CASH_OUT_SUBSEQUENT_USE_PERCENT: Percent = dec!(3.30);
pub const IRRRL_FEE_PERCENT: Percent = dec!(0.50);

/// Longest loan term the calculators accept.
pub const MAX_TERM_YEARS: u32 = 40;

// ---------------------------------------------------------------------------
// Policy record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBand {
    pub min_down_payment_percent: Percent,
    pub first_use_percent: Percent,
    pub subsequent_use_percent: Percent,
}

/// Cash-out refinance rates; omitted fields keep the built-in rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeRates {
    pub first_use_percent: Percent,
    pub subsequent_use_percent: Percent,
}

impl Default for FeeRates {
    fn default() -> Self {
        FeeRates {
            first_use_percent: CASH_OUT_FIRST_USE_PERCENT,
            subsequent_use_percent: CASH_OUT_SUBSEQUENT_USE_PERCENT,
        }
    }
}

impl FeeRates {
    pub fn for_usage(&self, is_first_time_use: bool) -> Percent {
        if is_first_time_use {
            self.first_use_percent
        } else {
            self.subsequent_use_percent
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingFeeSchedule {
    /// Ascending by `min_down_payment_percent`; the first band starts at 0.
    /// An override replaces the whole table, so every band is complete.
    pub purchase: Vec<FeeBand>,
    pub cash_out: FeeRates,
    pub irrrl_percent: Percent,
}

impl Default for FundingFeeSchedule {
    fn default() -> Self {
        FundingFeeSchedule {
            purchase: PURCHASE_FEE_BANDS
                .iter()
                .map(|&(min, first, subsequent)| FeeBand {
                    min_down_payment_percent: min,
                    first_use_percent: first,
                    subsequent_use_percent: subsequent,
                })
                .collect(),
            cash_out: FeeRates::default(),
            irrrl_percent: IRRRL_FEE_PERCENT,
        }
    }
}

impl FundingFeeSchedule {
    /// Index and band covering `down_payment_percent` (the highest band
    /// whose minimum does not exceed it).
    pub fn purchase_band(&self, down_payment_percent: Percent) -> Option<(usize, &FeeBand)> {
        self.purchase
            .iter()
            .enumerate()
            .rev()
            .find(|(_, band)| down_payment_percent >= band.min_down_payment_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtiLimits {
    pub front_end_percent: Percent,
    pub back_end_percent: Percent,
}

impl Default for DtiLimits {
    fn default() -> Self {
        DtiLimits {
            front_end_percent: FRONT_END_DTI_LIMIT,
            back_end_percent: BACK_END_DTI_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaLoanPolicy {
    pub version: String,
    pub funding_fee: FundingFeeSchedule,
    pub dti: DtiLimits,
    pub affordability_buffer: Rate,
    pub estimated_monthly_insurance: Money,
}

impl Default for VaLoanPolicy {
    fn default() -> Self {
        VaLoanPolicy {
            version: POLICY_VERSION.to_string(),
            funding_fee: FundingFeeSchedule::default(),
            dti: DtiLimits::default(),
            affordability_buffer: AFFORDABILITY_BUFFER,
            estimated_monthly_insurance: ESTIMATED_MONTHLY_INSURANCE,
        }
    }
}

impl VaLoanPolicy {
    /// Reject tables the calculators cannot use.
    pub fn validate(&self) -> VaLoanResult<()> {
        if self.version.trim().is_empty() {
            return Err(VaLoanError::invalid(
                "policy.version",
                "Policy version must not be empty.",
            ));
        }

        let bands = &self.funding_fee.purchase;
        match bands.first() {
            None => {
                return Err(VaLoanError::invalid(
                    "policy.funding_fee.purchase",
                    "At least one purchase fee band is required.",
                ))
            }
            Some(first) if !first.min_down_payment_percent.is_zero() => {
                return Err(VaLoanError::invalid(
                    "policy.funding_fee.purchase",
                    "The first purchase fee band must start at 0% down.",
                ))
            }
            Some(_) => {}
        }
        if bands
            .windows(2)
            .any(|w| w[1].min_down_payment_percent <= w[0].min_down_payment_percent)
        {
            return Err(VaLoanError::invalid(
                "policy.funding_fee.purchase",
                "Purchase fee bands must be strictly ascending by minimum down payment.",
            ));
        }
        for band in bands {
            check_percent("policy.funding_fee.purchase", band.min_down_payment_percent)?;
            check_percent("policy.funding_fee.purchase", band.first_use_percent)?;
            check_percent("policy.funding_fee.purchase", band.subsequent_use_percent)?;
        }
        check_percent(
            "policy.funding_fee.cash_out",
            self.funding_fee.cash_out.first_use_percent,
        )?;
        check_percent(
            "policy.funding_fee.cash_out",
            self.funding_fee.cash_out.subsequent_use_percent,
        )?;
        check_percent("policy.funding_fee.irrrl_percent", self.funding_fee.irrrl_percent)?;

        for (field, limit) in [
            ("policy.dti.front_end_percent", self.dti.front_end_percent),
            ("policy.dti.back_end_percent", self.dti.back_end_percent),
        ] {
            if limit <= Decimal::ZERO || limit > dec!(100) {
                return Err(VaLoanError::invalid(field, "DTI ceiling must be in (0, 100]."));
            }
        }

        if self.affordability_buffer <= Decimal::ZERO || self.affordability_buffer > Decimal::ONE {
            return Err(VaLoanError::invalid(
                "policy.affordability_buffer",
                "Buffer must be a fraction in (0, 1].",
            ));
        }
        if self.estimated_monthly_insurance < Decimal::ZERO {
            return Err(VaLoanError::invalid(
                "policy.estimated_monthly_insurance",
                "Insurance estimate cannot be negative.",
            ));
        }
        Ok(())
    }
}

fn check_percent(field: &str, value: Percent) -> VaLoanResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(VaLoanError::invalid(field, "Percentage must be between 0 and 100."));
    }
    Ok(())
}

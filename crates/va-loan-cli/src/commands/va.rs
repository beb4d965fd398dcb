use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use va_loan_core::va::dti::{self, DtiInput};
use va_loan_core::va::funding_fee::{self, FundingFeeInput, LoanPurpose, RefinanceKind};
use va_loan_core::VaLoanPolicy;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PurposeArg {
    Purchase,
    CashOut,
    Irrrl,
}

impl From<PurposeArg> for LoanPurpose {
    fn from(arg: PurposeArg) -> Self {
        match arg {
            PurposeArg::Purchase => LoanPurpose::Purchase,
            PurposeArg::CashOut => LoanPurpose::Refinance {
                kind: RefinanceKind::CashOut,
            },
            PurposeArg::Irrrl => LoanPurpose::Refinance {
                kind: RefinanceKind::Irrrl,
            },
        }
    }
}

/// Arguments for the VA funding fee
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FundingFeeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Base loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Down payment as a percent of the price (e.g. 5 for 5%)
    #[arg(long, default_value = "0")]
    pub down_payment_percent: Decimal,

    /// Borrower has used the VA benefit before
    #[arg(long)]
    pub subsequent_use: bool,

    /// Borrower has a service-connected disability rating (fee waived)
    #[arg(long)]
    pub disability: bool,

    /// Loan purpose
    #[arg(long, value_enum, default_value = "purchase")]
    pub purpose: PurposeArg,
}

/// Arguments for debt-to-income evaluation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DtiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Recurring monthly debt payments
    #[arg(long, default_value = "0")]
    pub monthly_debts: Decimal,

    /// Proposed monthly housing payment
    #[arg(long, default_value = "0")]
    pub housing_payment: Decimal,
}

pub fn run_funding_fee(
    args: FundingFeeArgs,
    policy: &VaLoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let fee_input: FundingFeeInput = input::resolve(args.input.as_deref(), || {
        Ok(FundingFeeInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            is_first_time_use: !args.subsequent_use,
            has_disability_rating: args.disability,
            down_payment_percent: args.down_payment_percent,
            loan_purpose: args.purpose.into(),
        })
    })?;

    let result = funding_fee::resolve_funding_fee_with_policy(&fee_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dti(args: DtiArgs, policy: &VaLoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let dti_input: DtiInput = input::resolve(args.input.as_deref(), || {
        Ok(DtiInput {
            monthly_income: args
                .monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            monthly_debts: args.monthly_debts,
            proposed_housing_payment: args.housing_payment,
        })
    })?;

    let result = dti::evaluate_dti_with_policy(&dti_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use va_loan_core::mortgage::affordability::{self, AffordabilityInput, DebtLineItem};
use va_loan_core::mortgage::amortization::{self, AmortizationInput};
use va_loan_core::mortgage::payment::{self, MortgageInput};
use va_loan_core::VaLoanPolicy;

use crate::input;

/// Arguments for the amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// First payment date (YYYY-MM-DD); defaults to the 1st of next month
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Emit only the period rows (useful with --output table/csv)
    #[arg(long)]
    pub schedule_only: bool,
}

/// Arguments for the full monthly mortgage payment
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MortgageArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Home purchase price
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Down payment as a percent of the price
    #[arg(long, default_value = "0")]
    pub down_payment_percent: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Annual property tax as a percent of the price
    #[arg(long, default_value = "0")]
    pub tax_rate: Decimal,

    /// Annual homeowners insurance premium
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Monthly HOA dues
    #[arg(long, default_value = "0")]
    pub hoa: Decimal,

    /// Borrower has used the VA benefit before
    #[arg(long)]
    pub subsequent_use: bool,

    /// Borrower has a service-connected disability rating (fee waived)
    #[arg(long)]
    pub disability: bool,

    /// Leave the funding fee out of the loan
    #[arg(long)]
    pub no_funding_fee: bool,
}

/// Arguments for the affordability solver
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual base salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Monthly Basic Allowance for Housing; counted when given
    #[arg(long)]
    pub bah: Option<Decimal>,

    /// Other monthly income
    #[arg(long, default_value = "0")]
    pub other_income: Decimal,

    /// Monthly debt payments (comma-separated, e.g. "450,150")
    #[arg(long, value_delimiter = ',')]
    pub debts: Vec<Decimal>,

    /// Cash down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Annual property tax as a percent of the price
    #[arg(long, default_value = "0")]
    pub tax_rate: Decimal,

    /// Annual homeowners insurance premium
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Monthly HOA dues
    #[arg(long, default_value = "0")]
    pub hoa: Decimal,

    /// Borrower has used the VA benefit before
    #[arg(long)]
    pub subsequent_use: bool,

    /// Borrower has a service-connected disability rating (fee waived)
    #[arg(long)]
    pub disability: bool,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = input::resolve(args.input.as_deref(), || {
        Ok(AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            start_date: match args.start_date {
                Some(date) => date,
                None => first_of_next_month()?,
            },
        })
    })?;

    let result = amortization::amortize(&amort_input)?;
    if args.schedule_only {
        return Ok(serde_json::to_value(result.result.schedule)?);
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_mortgage(
    args: MortgageArgs,
    policy: &VaLoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = input::resolve(args.input.as_deref(), || {
        Ok(MortgageInput {
            home_price: args
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            down_payment_percent: args.down_payment_percent,
            term_years: args.term_years,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            property_tax_rate_percent: args.tax_rate,
            annual_insurance: args.insurance,
            monthly_hoa: args.hoa,
            is_first_time_use: !args.subsequent_use,
            has_disability_rating: args.disability,
            include_funding_fee: !args.no_funding_fee,
        })
    })?;

    let result = payment::compose_mortgage_payment_with_policy(&mortgage_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordability(
    args: AffordabilityArgs,
    policy: &VaLoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput =
        input::resolve(args.input.as_deref(), || affordability_from_flags(&args))?;

    let result = affordability::solve_affordability_with_policy(&afford_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

fn affordability_from_flags(
    args: &AffordabilityArgs,
) -> Result<AffordabilityInput, Box<dyn std::error::Error>> {
    let debts = args
        .debts
        .iter()
        .enumerate()
        .map(|(i, amount)| DebtLineItem {
            label: format!("debt {}", i + 1),
            monthly_payment: *amount,
        })
        .collect();
    Ok(AffordabilityInput {
        annual_base_salary: args
            .salary
            .ok_or("--salary is required (or provide --input)")?,
        monthly_housing_allowance: args.bah.unwrap_or(Decimal::ZERO),
        include_housing_allowance: args.bah.is_some(),
        other_monthly_income: args.other_income,
        debts,
        down_payment: args.down_payment,
        annual_rate_percent: args
            .rate
            .ok_or("--rate is required (or provide --input)")?,
        term_years: args.term_years,
        property_tax_rate_percent: args.tax_rate,
        annual_insurance: args.insurance,
        monthly_hoa: args.hoa,
        is_first_time_use: !args.subsequent_use,
        has_disability_rating: args.disability,
    })
}

fn first_of_next_month() -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| "could not determine next month".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use va_loan_core::VaLoanError;

    #[derive(Parser)]
    struct AffordabilityCli {
        #[command(flatten)]
        args: AffordabilityArgs,
    }

    #[test]
    fn test_negative_debt_reaches_engine_validation() {
        let cli = AffordabilityCli::try_parse_from([
            "affordability",
            "--salary",
            "96000",
            "--rate",
            "6.5",
            "--debts",
            "-5",
        ])
        .unwrap();
        assert_eq!(cli.args.debts, vec![Decimal::from(-5)]);

        let input = affordability_from_flags(&cli.args).unwrap();
        let err = affordability::solve_affordability_with_policy(&input, &VaLoanPolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            VaLoanError::InvalidInput { ref field, .. } if field == "debts.monthly_payment"
        ));
    }
}

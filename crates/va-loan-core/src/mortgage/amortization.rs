use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VaLoanError;
use crate::time_value::{self, level_payment};
use crate::validation;
use crate::{types::*, VaLoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    /// Due date of the first payment; later periods follow monthly.
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    pub period: u32,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Twelve-period rollup of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    pub payoff_date: NaiveDate,
    pub schedule: Vec<AmortizationPeriod>,
    pub annual_summary: Vec<AnnualSummary>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly principal-and-interest payment for a fixed-rate loan.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> VaLoanResult<Money> {
    validate_terms(principal, annual_rate_percent, term_years)?;
    level_payment(
        principal,
        time_value::monthly_rate(annual_rate_percent),
        time_value::number_of_payments(term_years),
    )
}

/// Build the full month-by-month amortization schedule.
pub fn amortize(input: &AmortizationInput) -> VaLoanResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let output = build_schedule(input)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal": input.principal.to_string(),
        "annual_rate_pct": input.annual_rate_percent.to_string(),
        "term_years": input.term_years,
        "first_payment": input.start_date,
        "compounding": "monthly",
    });

    Ok(with_metadata(
        "Level-Payment Amortization Schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_schedule(input: &AmortizationInput) -> VaLoanResult<AmortizationOutput> {
    let payment = monthly_payment(input.principal, input.annual_rate_percent, input.term_years)?;
    let rate = time_value::monthly_rate(input.annual_rate_percent);
    let nper = time_value::number_of_payments(input.term_years);

    let mut schedule = Vec::with_capacity(nper as usize);
    let mut annual_summary = Vec::with_capacity(input.term_years as usize);
    let mut balance = input.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut year_principal = Decimal::ZERO;
    let mut year_interest = Decimal::ZERO;

    for period in 1..=nper {
        let interest = balance * rate;
        // The final period absorbs any drift so the loan closes at exactly zero.
        let principal_portion = if period == nper {
            balance
        } else {
            (payment - interest).min(balance)
        };
        let payment_amount = principal_portion + interest;
        balance -= principal_portion;

        let payment_date = input
            .start_date
            .checked_add_months(Months::new(period - 1))
            .ok_or_else(|| {
                VaLoanError::DateError(format!(
                    "payment date for period {period} is out of range"
                ))
            })?;

        total_interest += interest;
        total_paid += payment_amount;
        year_principal += principal_portion;
        year_interest += interest;

        schedule.push(AmortizationPeriod {
            period,
            payment_date,
            payment_amount,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
        });

        if period % 12 == 0 {
            annual_summary.push(AnnualSummary {
                year: period / 12,
                principal_paid: year_principal,
                interest_paid: year_interest,
                ending_balance: balance,
            });
            year_principal = Decimal::ZERO;
            year_interest = Decimal::ZERO;
        }
    }

    let payoff_date = schedule
        .last()
        .map(|p| p.payment_date)
        .unwrap_or(input.start_date);

    tracing::debug!(
        %payment,
        periods = nper,
        %total_interest,
        "amortization schedule built"
    );

    Ok(AmortizationOutput {
        monthly_payment: payment,
        number_of_payments: nper,
        total_interest,
        total_paid,
        payoff_date,
        schedule,
        annual_summary,
    })
}

fn validate_terms(principal: Money, annual_rate_percent: Percent, term_years: u32) -> VaLoanResult<()> {
    validation::non_negative("principal", principal)?;
    validation::percent("annual_rate_percent", annual_rate_percent)?;
    validation::term_years("term_years", term_years)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_input() -> AmortizationInput {
        AmortizationInput {
            principal: dec!(250_000),
            annual_rate_percent: dec!(6),
            term_years: 30,
            start_date: date(2025, 1, 1),
        }
    }

    fn run(input: &AmortizationInput) -> AmortizationOutput {
        amortize(input).unwrap().result
    }

    #[test]
    fn test_schedule_length() {
        let out = run(&standard_input());
        assert_eq!(out.schedule.len(), 360);
        assert_eq!(out.number_of_payments, 360);
        assert_eq!(out.annual_summary.len(), 30);
    }

    #[test]
    fn test_principal_is_conserved() {
        let out = run(&standard_input());
        let total_principal: Decimal = out.schedule.iter().map(|p| p.principal_portion).sum();
        assert!((total_principal - dec!(250_000)).abs() <= TOL);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_first_period_split() {
        let out = run(&standard_input());
        let first = &out.schedule[0];
        // 250k * 0.5% = 1,250 interest
        assert_eq!(first.interest_portion, dec!(1250));
        assert_eq!(first.principal_portion, out.monthly_payment - dec!(1250));
        assert_eq!(out.monthly_payment.round_dp(2), dec!(1498.88));
    }

    #[test]
    fn test_interest_falls_principal_rises() {
        let out = run(&standard_input());
        for w in out.schedule[..359].windows(2) {
            assert!(w[1].interest_portion < w[0].interest_portion);
            assert!(w[1].principal_portion > w[0].principal_portion);
        }
    }

    #[test]
    fn test_zero_rate_fallback() {
        let input = AmortizationInput {
            principal: dec!(100_000),
            annual_rate_percent: Decimal::ZERO,
            term_years: 15,
            start_date: date(2025, 1, 1),
        };
        let out = run(&input);
        assert_eq!(out.monthly_payment, dec!(100_000) / dec!(180));
        assert!(out.schedule.iter().all(|p| p.interest_portion.is_zero()));
        assert_eq!(out.total_interest, Decimal::ZERO);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_payment_dates_advance_monthly() {
        let mut input = standard_input();
        input.start_date = date(2025, 1, 31);
        let out = run(&input);
        assert_eq!(out.schedule[0].payment_date, date(2025, 1, 31));
        assert_eq!(out.schedule[1].payment_date, date(2025, 2, 28));
        assert_eq!(out.schedule[2].payment_date, date(2025, 3, 31));
        assert_eq!(out.payoff_date, date(2054, 12, 31));
    }

    #[test]
    fn test_annual_summary_matches_schedule() {
        let out = run(&standard_input());
        let first_year_interest: Decimal =
            out.schedule[..12].iter().map(|p| p.interest_portion).sum();
        assert_eq!(out.annual_summary[0].interest_paid, first_year_interest);
        assert_eq!(out.annual_summary[0].ending_balance, out.schedule[11].remaining_balance);
        assert_eq!(out.annual_summary[29].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_totals() {
        let out = run(&standard_input());
        assert!((out.total_paid - out.total_interest - dec!(250_000)).abs() < TOL);
    }

    #[test]
    fn test_restartable() {
        let input = standard_input();
        assert_eq!(run(&input), run(&input));
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut input = standard_input();
        input.term_years = 0;
        assert!(matches!(amortize(&input), Err(VaLoanError::InvalidInput { .. })));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut input = standard_input();
        input.annual_rate_percent = dec!(-0.5);
        assert!(amortize(&input).is_err());
    }
}

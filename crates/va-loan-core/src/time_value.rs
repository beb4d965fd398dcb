use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::VaLoanError;
use crate::types::{Money, Percent, Rate};
use crate::VaLoanResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Monthly periodic rate from an annual percentage (6.5 -> 0.0054166...).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Number of monthly payments in a term of whole years.
pub fn number_of_payments(term_years: u32) -> u32 {
    term_years * MONTHS_PER_YEAR
}

/// Level payment that retires `principal` over `nper` periods:
/// `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P / n` when the rate is zero.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> VaLoanResult<Money> {
    if nper == 0 {
        return Err(VaLoanError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(VaLoanError::ArithmeticDegenerate {
            context: "level payment annuity factor".into(),
        });
    }

    // Reduce the annuity factor before scaling by the principal.
    let per_dollar = rate
        .checked_mul(factor)
        .map(|scaled| scaled / denom)
        .ok_or_else(|| overflow("level payment annuity factor"))?;
    principal
        .checked_mul(per_dollar)
        .ok_or_else(|| overflow("level payment"))
}

/// Principal a level `payment` retires over `nper` periods:
/// `PMT·(1 − (1+r)^−n) / r`, or `PMT·n` when the rate is zero.
pub fn annuity_present_value(payment: Money, rate: Rate, nper: u32) -> VaLoanResult<Money> {
    if rate.is_zero() {
        return Ok(payment * Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    if factor.is_zero() {
        return Err(VaLoanError::ArithmeticDegenerate {
            context: "annuity present value discount factor".into(),
        });
    }

    let per_dollar = (Decimal::ONE - Decimal::ONE / factor) / rate;
    payment
        .checked_mul(per_dollar)
        .ok_or_else(|| overflow("annuity present value"))
}

/// `(1 + rate)^n` by repeated multiplication.
fn compound_factor(rate: Rate, n: u32) -> VaLoanResult<Decimal> {
    let base = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(base)
            .ok_or_else(|| overflow("compound factor"))?;
    }
    Ok(result)
}

fn overflow(context: &str) -> VaLoanError {
    VaLoanError::ArithmeticDegenerate {
        context: format!("{context} exceeds decimal range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_payment_textbook() {
        // $200k, 6% / 12, 360 months -> $1,199.10
        let pmt = level_payment(dec!(200_000), dec!(0.005), 360).unwrap();
        assert_eq!(pmt.round_dp(2), dec!(1199.10));
    }

    #[test]
    fn test_level_payment_zero_rate() {
        let pmt = level_payment(dec!(120_000), Decimal::ZERO, 120).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_level_payment_zero_periods() {
        assert!(level_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let rate = monthly_rate(dec!(6.5));
        let pmt = level_payment(dec!(300_000), rate, 360).unwrap();
        let pv = annuity_present_value(pmt, rate, 360).unwrap();
        assert!((pv - dec!(300_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_present_value_zero_rate() {
        let pv = annuity_present_value(dec!(500), Decimal::ZERO, 180).unwrap();
        assert_eq!(pv, dec!(90_000));
    }

    #[test]
    fn test_large_principal_at_max_rate() {
        let rate = monthly_rate(dec!(100));
        let pmt = level_payment(dec!(50_000_000_000_000), rate, 480).unwrap();
        // Interest alone is P·r; the level payment sits just above it.
        let interest_only = dec!(50_000_000_000_000) * rate;
        assert!(pmt >= interest_only);
        assert!(pmt < interest_only * dec!(1.001));
    }

    #[test]
    fn test_payment_overflow_is_an_error() {
        let err = level_payment(Decimal::MAX, dec!(2), 12).unwrap_err();
        assert!(matches!(err, VaLoanError::ArithmeticDegenerate { .. }));
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
        assert_eq!(number_of_payments(30), 360);
    }
}

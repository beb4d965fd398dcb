//! Range checks shared by the calculators' `validate_input` functions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::VaLoanError;
use crate::policy::MAX_TERM_YEARS;
use crate::types::{Money, Percent};
use crate::VaLoanResult;

pub(crate) fn non_negative(field: &str, value: Money) -> VaLoanResult<()> {
    if value < Decimal::ZERO {
        return Err(VaLoanError::invalid(field, "Amount cannot be negative."));
    }
    Ok(())
}

pub(crate) fn percent(field: &str, value: Percent) -> VaLoanResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(VaLoanError::invalid(
            field,
            "Percentage must be between 0 and 100.",
        ));
    }
    Ok(())
}

pub(crate) fn term_years(field: &str, years: u32) -> VaLoanResult<()> {
    if years == 0 || years > MAX_TERM_YEARS {
        return Err(VaLoanError::invalid(
            field,
            format!("Loan term must be between 1 and {MAX_TERM_YEARS} years."),
        ));
    }
    Ok(())
}

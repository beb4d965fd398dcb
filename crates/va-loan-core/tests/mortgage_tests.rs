use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use va_loan_core::mortgage::affordability::{self, AffordabilityInput, DebtLineItem};
use va_loan_core::mortgage::amortization::{self, AmortizationInput};
use va_loan_core::mortgage::payment::{self, MortgageInput};
use va_loan_core::VaLoanError;

// ===========================================================================
// End-to-end mortgage example
// ===========================================================================

fn reference_mortgage() -> MortgageInput {
    MortgageInput {
        home_price: dec!(425_000),
        down_payment_percent: Decimal::ZERO,
        term_years: 30,
        annual_rate_percent: dec!(6.5),
        property_tax_rate_percent: dec!(1.2),
        annual_insurance: dec!(1200),
        monthly_hoa: Decimal::ZERO,
        is_first_time_use: true,
        has_disability_rating: false,
        include_funding_fee: true,
    }
}

/// Standard annuity payment, computed independently of the engine.
fn annuity_payment(principal: Decimal, monthly_rate: Decimal, n: u64) -> Decimal {
    let factor = (Decimal::ONE + monthly_rate).powu(n);
    principal * monthly_rate * factor / (factor - Decimal::ONE)
}

#[test]
fn test_reference_mortgage_end_to_end() {
    let out = payment::compose_mortgage_payment(&reference_mortgage())
        .unwrap()
        .result;

    assert_eq!(out.base_loan_amount, dec!(425_000));
    assert_eq!(out.funding_fee_amount, dec!(9137.50));
    assert_eq!(out.total_loan_amount, dec!(434_137.50));

    let expected_pi = annuity_payment(dec!(434_137.50), dec!(6.5) / dec!(1200), 360);
    assert_eq!(
        out.payment.principal_and_interest.round_dp(2),
        expected_pi.round_dp(2)
    );

    // 425,000 × 1.2% / 12
    assert_eq!(out.payment.property_tax, dec!(425));
    assert_eq!(out.payment.insurance, dec!(100));
    assert_eq!(out.payment.hoa, Decimal::ZERO);
    assert_eq!(
        out.payment.total,
        out.payment.principal_and_interest + dec!(525)
    );
    assert_eq!(
        out.total_interest_paid,
        out.payment.principal_and_interest * dec!(360) - dec!(434_137.50)
    );
}

#[test]
fn test_composer_is_idempotent() {
    let input = reference_mortgage();
    let a = payment::compose_mortgage_payment(&input).unwrap();
    let b = payment::compose_mortgage_payment(&input).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.warnings, b.warnings);
    assert_eq!(a.assumptions, b.assumptions);
}

// ===========================================================================
// Amortization properties
// ===========================================================================

#[test]
fn test_amortization_conserves_principal() {
    let cases = [
        (dec!(434_137.50), dec!(6.5), 30),
        (dec!(180_000), dec!(5.25), 15),
        (dec!(95_500.55), dec!(7.875), 20),
        (dec!(1_250_000), dec!(0.125), 30),
    ];
    for (principal, rate, years) in cases {
        let out = amortization::amortize(&AmortizationInput {
            principal,
            annual_rate_percent: rate,
            term_years: years,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        })
        .unwrap()
        .result;

        let repaid: Decimal = out.schedule.iter().map(|p| p.principal_portion).sum();
        assert!(
            (repaid - principal).abs() <= dec!(0.01),
            "principal drift for {principal} @ {rate}%: {}",
            repaid - principal
        );
        assert_eq!(out.schedule.len() as u32, years * 12);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }
}

#[test]
fn test_large_loan_at_top_rate_returns_payment() {
    let pmt = amortization::monthly_payment(dec!(50_000_000_000_000), dec!(100), 40).unwrap();
    assert!(pmt > Decimal::ZERO);
}

#[test]
fn test_zero_rate_payment_is_exact_division() {
    for years in [15u32, 20, 30] {
        let pmt = amortization::monthly_payment(dec!(300_000), Decimal::ZERO, years).unwrap();
        assert_eq!(pmt, dec!(300_000) / Decimal::from(years * 12));
    }
}

#[test]
fn test_schedule_depends_only_on_inputs() {
    let input = AmortizationInput {
        principal: dec!(200_000),
        annual_rate_percent: dec!(6),
        term_years: 20,
        start_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
    };
    let a = amortization::amortize(&input).unwrap().result;
    let b = amortization::amortize(&input).unwrap().result;
    assert_eq!(a, b);
}

// ===========================================================================
// Affordability
// ===========================================================================

fn household() -> AffordabilityInput {
    AffordabilityInput {
        annual_base_salary: dec!(72_000),
        monthly_housing_allowance: dec!(2100),
        include_housing_allowance: true,
        other_monthly_income: dec!(400),
        debts: vec![DebtLineItem {
            label: "Truck".into(),
            monthly_payment: dec!(525),
        }],
        down_payment: dec!(10_000),
        annual_rate_percent: dec!(6.25),
        term_years: 30,
        property_tax_rate_percent: dec!(1.1),
        annual_insurance: dec!(1500),
        monthly_hoa: dec!(40),
        is_first_time_use: false,
        has_disability_rating: false,
    }
}

#[test]
fn test_recommended_price_is_buffered_max() {
    let out = affordability::solve_affordability(&household())
        .unwrap()
        .result;
    let expected = (out.max_home_price * dec!(0.80))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(out.recommended_home_price, expected);
    assert!(out.recommended_home_price <= out.max_home_price);
}

#[test]
fn test_affordability_income_composition() {
    let out = affordability::solve_affordability(&household())
        .unwrap()
        .result;
    // 6,000 salary + 2,100 BAH + 400 other
    assert_eq!(out.total_monthly_income, dec!(8500));
    assert_eq!(out.total_monthly_debts, dec!(525));
}

/// The fee is backed out of the DTI-sized loan as a multiplier rather than
/// solved jointly with the payment ceiling. Re-composing at the maximum
/// price only reproduces the P&I budget when the down-payment tier the
/// solver estimated matches the tier the composer applies.
#[test]
fn test_fee_inversion_is_an_approximation() {
    let input = household();
    let out = affordability::solve_affordability(&input).unwrap().result;

    let max_price = out.max_home_price;
    let composed = payment::compose_mortgage_payment(&MortgageInput {
        home_price: max_price,
        down_payment_percent: input.down_payment / max_price * dec!(100),
        term_years: input.term_years,
        annual_rate_percent: input.annual_rate_percent,
        property_tax_rate_percent: input.property_tax_rate_percent,
        annual_insurance: input.annual_insurance,
        monthly_hoa: input.monthly_hoa,
        is_first_time_use: input.is_first_time_use,
        has_disability_rating: input.has_disability_rating,
        include_funding_fee: true,
    })
    .unwrap()
    .result;

    // Both sides land in the 0-5% tier here, so the approximation is tight.
    assert_eq!(out.funding_fee_percent, dec!(3.30));
    assert!(
        (composed.payment.principal_and_interest - out.principal_and_interest_budget).abs()
            < dec!(0.01)
    );
    // Property tax is not part of the budget, so the full payment at the
    // maximum price overshoots the DTI ceiling.
    assert!(composed.payment.total > out.max_affordable_housing_payment);
}

#[test]
fn test_affordability_zero_income_is_rejected() {
    let mut input = household();
    input.annual_base_salary = Decimal::ZERO;
    input.include_housing_allowance = false;
    input.other_monthly_income = Decimal::ZERO;
    let err = affordability::solve_affordability(&input).unwrap_err();
    assert!(matches!(err, VaLoanError::InvalidInput { .. }));
}

#[test]
fn test_affordability_is_idempotent() {
    let input = household();
    let a = affordability::solve_affordability(&input).unwrap();
    let b = affordability::solve_affordability(&input).unwrap();
    assert_eq!(a.result, b.result);
}

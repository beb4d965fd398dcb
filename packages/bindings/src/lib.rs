use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use va_loan_core::VaLoanPolicy;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

fn to_json(output: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

/// Built-in policy, or the caller's overrides merged over it.
fn policy(policy_json: Option<String>) -> NapiResult<VaLoanPolicy> {
    match policy_json {
        Some(json) => parse(&json),
        None => Ok(VaLoanPolicy::default()),
    }
}

// ---------------------------------------------------------------------------
// VA
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_funding_fee(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: va_loan_core::va::funding_fee::FundingFeeInput = parse(&input_json)?;
    let output = va_loan_core::va::funding_fee::resolve_funding_fee_with_policy(
        &input,
        &policy(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn evaluate_dti(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: va_loan_core::va::dti::DtiInput = parse(&input_json)?;
    let output = va_loan_core::va::dti::evaluate_dti_with_policy(&input, &policy(policy_json)?)
        .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: va_loan_core::mortgage::amortization::AmortizationInput = parse(&input_json)?;
    let output =
        va_loan_core::mortgage::amortization::amortize(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn compose_mortgage_payment(
    input_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let input: va_loan_core::mortgage::payment::MortgageInput = parse(&input_json)?;
    let output = va_loan_core::mortgage::payment::compose_mortgage_payment_with_policy(
        &input,
        &policy(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn solve_affordability(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: va_loan_core::mortgage::affordability::AffordabilityInput = parse(&input_json)?;
    let output = va_loan_core::mortgage::affordability::solve_affordability_with_policy(
        &input,
        &policy(policy_json)?,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[napi]
pub fn default_policy() -> NapiResult<String> {
    to_json(&VaLoanPolicy::default())
}

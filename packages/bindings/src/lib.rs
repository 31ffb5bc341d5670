use napi::Result as NapiResult;
use napi_derive::napi;

use bond_yield_core::clock::SystemClock;
use bond_yield_core::fixed_income::{self, BondYieldRequest};
use bond_yield_core::CalculationConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(input_json: &str) -> NapiResult<BondYieldRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

/// Full yield analysis: `ComputationOutput<BondResult>` as JSON.
#[napi]
pub fn calculate_bond_yield(input_json: String) -> NapiResult<String> {
    let input = parse_request(&input_json)?;
    let output = fixed_income::calculate_bond_yield(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Cash flow schedule rows as a JSON array.
#[napi]
pub fn bond_cash_flow_schedule(input_json: String) -> NapiResult<String> {
    let input = parse_request(&input_json)?;
    let rows =
        fixed_income::bond_cash_flow_schedule(&input, &SystemClock, &CalculationConfig::default())
            .map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

/// Violation messages as a JSON array; empty when the request is valid.
#[napi]
pub fn validate_bond_input(input_json: String) -> NapiResult<String> {
    let input = parse_request(&input_json)?;
    let violations = fixed_income::validate_bond_request(&input);
    serde_json::to_string(&violations).map_err(to_napi_error)
}

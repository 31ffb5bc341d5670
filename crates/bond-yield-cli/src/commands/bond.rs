use clap::Args;
use serde_json::{json, Value};

use bond_yield_core::clock::SystemClock;
use bond_yield_core::fixed_income::{self, validate_bond_request, BondYieldRequest};
use bond_yield_core::CalculationConfig;

use crate::input;

/// Bond description, from a file, flags, or piped stdin. Any bond flag
/// without `--input` builds the request from flags alone; flags also
/// override fields loaded from a file.
#[derive(Args, Debug, Default)]
pub struct BondArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
    /// Face (par) value
    #[arg(long)]
    pub face_value: Option<f64>,
    /// Annual coupon rate in percent (5 = 5%)
    #[arg(long)]
    pub coupon_rate: Option<f64>,
    /// Market price
    #[arg(long)]
    pub market_price: Option<f64>,
    /// Years to maturity
    #[arg(long)]
    pub years: Option<f64>,
    /// Coupon frequency: annual or semi-annual
    #[arg(long)]
    pub frequency: Option<String>,
    /// Settlement date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub settlement_date: Option<String>,
}

impl BondArgs {
    fn has_flags(&self) -> bool {
        self.face_value.is_some()
            || self.coupon_rate.is_some()
            || self.market_price.is_some()
            || self.years.is_some()
            || self.frequency.is_some()
            || self.settlement_date.is_some()
    }

    fn apply_overrides(self, mut request: BondYieldRequest) -> BondYieldRequest {
        request.face_value = self.face_value.or(request.face_value);
        request.annual_coupon_rate_pct = self.coupon_rate.or(request.annual_coupon_rate_pct);
        request.market_price = self.market_price.or(request.market_price);
        request.years_to_maturity = self.years.or(request.years_to_maturity);
        request.coupon_frequency = self.frequency.or(request.coupon_frequency);
        request.settlement_date = self.settlement_date.or(request.settlement_date);
        request
    }
}

fn resolve_request(args: BondArgs) -> Result<BondYieldRequest, Box<dyn std::error::Error>> {
    let base: BondYieldRequest = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if args.has_flags() {
        BondYieldRequest::default()
    } else if let Some(request) = input::stdin::read_stdin()? {
        request
    } else {
        return Err("--input <file>, bond flags, or stdin required".into());
    };
    Ok(args.apply_overrides(base))
}

/// Full yield analysis with the cash flow schedule.
pub fn run_yield(
    args: BondArgs,
    config: &CalculationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(args)?;
    let result = fixed_income::calculate_bond_yield_with(&request, &SystemClock, config)?;
    Ok(serde_json::to_value(result)?)
}

/// Cash flow schedule only.
pub fn run_schedule(
    args: BondArgs,
    config: &CalculationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(args)?;
    let rows = fixed_income::bond_cash_flow_schedule(&request, &SystemClock, config)?;
    Ok(serde_json::to_value(rows)?)
}

/// Check a request without computing anything.
pub fn run_validate(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(args)?;
    let violations = validate_bond_request(&request);
    Ok(json!({
        "valid": violations.is_empty(),
        "violations": violations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_loaded_fields() {
        let args = BondArgs {
            market_price: Some(980.0),
            settlement_date: Some("2024-05-01".into()),
            ..BondArgs::default()
        };
        let loaded = BondYieldRequest::new(
            1000.0,
            5.0,
            950.0,
            10.0,
            fixed_income::CouponFrequency::Annual,
        );
        let merged = args.apply_overrides(loaded);
        assert_eq!(merged.market_price, Some(980.0));
        assert_eq!(merged.face_value, Some(1000.0));
        assert_eq!(merged.settlement_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_flags_alone_build_a_request() {
        let args = BondArgs {
            face_value: Some(1000.0),
            coupon_rate: Some(5.0),
            market_price: Some(950.0),
            years: Some(10.0),
            frequency: Some("semi-annual".into()),
            ..BondArgs::default()
        };
        assert!(args.has_flags());
        let request = resolve_request(args).unwrap();
        assert!(validate_bond_request(&request).is_empty());
    }

    #[test]
    fn test_any_single_flag_selects_flag_input() {
        let args = BondArgs {
            frequency: Some("annual".into()),
            ..BondArgs::default()
        };
        assert!(args.has_flags());
        let request = resolve_request(args).unwrap();
        assert_eq!(request.coupon_frequency.as_deref(), Some("annual"));
        assert_eq!(request.face_value, None);
        assert_eq!(validate_bond_request(&request).len(), 4);
        assert!(!BondArgs::default().has_flags());
    }

    #[test]
    fn test_validate_reports_missing_flags() {
        let args = BondArgs {
            face_value: Some(1000.0),
            ..BondArgs::default()
        };
        let value = run_validate(args).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["violations"].as_array().unwrap().len(), 4);
    }
}

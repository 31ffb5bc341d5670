use crate::calendar::parse_settlement_date;
use crate::fixed_income::inputs::{BondYieldRequest, CouponFrequency};

/// Highest coupon rate percentage the request interface accepts.
const MAX_COUPON_RATE_PCT: f64 = 100.0;

/// Largest face value or market price accepted. Interest totals over the
/// longest schedule must still fit a cent-scaled decimal.
pub const MAX_AMOUNT: f64 = 1e15;

/// Check a request against every input rule and return the violations in
/// rule order. An empty list means the request is valid. Rules do not
/// short-circuit; a request with three problems reports three messages.
///
/// Period count is not checked here: a maturity that rounds to zero periods
/// is rejected when the pricing context is built.
pub fn validate_bond_request(request: &BondYieldRequest) -> Vec<String> {
    let mut violations = Vec::new();

    if !is_positive(request.face_value) {
        violations.push("faceValue must be a finite number greater than 0".to_string());
    } else if exceeds_max_amount(request.face_value) {
        violations.push(format!("faceValue must not exceed {MAX_AMOUNT}"));
    }

    match request.annual_coupon_rate_pct {
        Some(rate) if rate.is_finite() && rate >= 0.0 => {
            if rate > MAX_COUPON_RATE_PCT {
                violations.push("annualCouponRatePct must not exceed 100".to_string());
            }
        }
        _ => violations.push(
            "annualCouponRatePct must be a finite number greater than or equal to 0".to_string(),
        ),
    }

    if !is_positive(request.market_price) {
        violations.push("marketPrice must be a finite number greater than 0".to_string());
    } else if exceeds_max_amount(request.market_price) {
        violations.push(format!("marketPrice must not exceed {MAX_AMOUNT}"));
    }

    if !is_positive(request.years_to_maturity) {
        violations.push("yearsToMaturity must be a finite number greater than 0".to_string());
    }

    let frequency_ok = request
        .coupon_frequency
        .as_deref()
        .is_some_and(|raw| raw.parse::<CouponFrequency>().is_ok());
    if !frequency_ok {
        violations.push("couponFrequency must be one of: annual, semi-annual".to_string());
    }

    if let Some(raw) = request.settlement_date.as_deref() {
        if parse_settlement_date(raw).is_none() {
            violations.push(format!("settlementDate '{raw}' is not a valid calendar date"));
        }
    }

    violations
}

fn is_positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v.is_finite() && v > 0.0)
}

fn exceeds_max_amount(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > MAX_AMOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid() -> BondYieldRequest {
        BondYieldRequest::new(1000.0, 5.0, 950.0, 10.0, CouponFrequency::SemiAnnual)
    }

    #[test]
    fn test_valid_request_has_no_violations() {
        assert!(validate_bond_request(&valid()).is_empty());
        assert!(validate_bond_request(&valid().with_settlement_date("2024-01-31")).is_empty());
    }

    #[test]
    fn test_zero_coupon_is_valid() {
        let mut request = valid();
        request.annual_coupon_rate_pct = Some(0.0);
        assert!(validate_bond_request(&request).is_empty());
    }

    #[test]
    fn test_all_rules_reported_in_order() {
        let request = BondYieldRequest {
            face_value: Some(0.0),
            annual_coupon_rate_pct: Some(-1.0),
            market_price: Some(f64::NAN),
            years_to_maturity: Some(f64::INFINITY),
            coupon_frequency: Some("quarterly".into()),
            settlement_date: Some("2024-13-01".into()),
        };
        assert_eq!(
            validate_bond_request(&request),
            vec![
                "faceValue must be a finite number greater than 0".to_string(),
                "annualCouponRatePct must be a finite number greater than or equal to 0"
                    .to_string(),
                "marketPrice must be a finite number greater than 0".to_string(),
                "yearsToMaturity must be a finite number greater than 0".to_string(),
                "couponFrequency must be one of: annual, semi-annual".to_string(),
                "settlementDate '2024-13-01' is not a valid calendar date".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_fields_are_violations() {
        let violations = validate_bond_request(&BondYieldRequest::default());
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn test_coupon_rate_upper_bound() {
        let mut request = valid();
        request.annual_coupon_rate_pct = Some(100.0);
        assert!(validate_bond_request(&request).is_empty());
        request.annual_coupon_rate_pct = Some(100.5);
        assert_eq!(
            validate_bond_request(&request),
            vec!["annualCouponRatePct must not exceed 100".to_string()]
        );
    }

    #[test]
    fn test_amount_ceiling() {
        let mut request = valid();
        request.face_value = Some(MAX_AMOUNT);
        request.market_price = Some(MAX_AMOUNT);
        assert!(validate_bond_request(&request).is_empty());

        request.face_value = Some(1e27);
        request.market_price = Some(2e15);
        assert_eq!(
            validate_bond_request(&request),
            vec![
                "faceValue must not exceed 1000000000000000".to_string(),
                "marketPrice must not exceed 1000000000000000".to_string(),
            ]
        );
    }

    #[test]
    fn test_small_maturity_passes_validation() {
        // Rounds to zero periods, which is caught when pricing, not here.
        let mut request = valid();
        request.years_to_maturity = Some(0.1);
        assert!(validate_bond_request(&request).is_empty());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::parse_settlement_date;
use crate::clock::Clock;
use crate::config::{CalculationConfig, PeriodRounding};
use crate::error::BondYieldError;
use crate::fixed_income::validation::validate_bond_request;
use crate::types::{Rate, Years};
use crate::BondYieldResult;

/// Fractional period counts closer than this to a whole number are whole.
const PERIOD_ALIGNMENT_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Coupon frequency
// ---------------------------------------------------------------------------

/// Supported coupon frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouponFrequency {
    #[serde(rename = "annual")]
    Annual,
    #[serde(rename = "semi-annual")]
    SemiAnnual,
}

impl CouponFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
        }
    }

    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CouponFrequency::Annual => "annual",
            CouponFrequency::SemiAnnual => "semi-annual",
        }
    }
}

impl fmt::Display for CouponFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponFrequency {
    type Err = BondYieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "1" => Ok(CouponFrequency::Annual),
            "semi-annual" | "semiannual" | "semi_annual" | "2" => Ok(CouponFrequency::SemiAnnual),
            other => Err(BondYieldError::InvalidInput {
                field: "couponFrequency".into(),
                reason: format!("unsupported coupon frequency '{other}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Request (untrusted)
// ---------------------------------------------------------------------------

/// Bond yield request as supplied by an external caller. Nothing here is
/// trusted until [`BondInput::from_request`] has accepted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BondYieldRequest {
    pub face_value: Option<f64>,
    /// Annual coupon rate as a percentage (5 = 5%).
    pub annual_coupon_rate_pct: Option<f64>,
    pub market_price: Option<f64>,
    pub years_to_maturity: Option<f64>,
    /// `"annual"` or `"semi-annual"`.
    pub coupon_frequency: Option<String>,
    /// ISO-8601 date. Defaults to today when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<String>,
}

impl BondYieldRequest {
    pub fn new(
        face_value: f64,
        annual_coupon_rate_pct: f64,
        market_price: f64,
        years_to_maturity: f64,
        frequency: CouponFrequency,
    ) -> Self {
        Self {
            face_value: Some(face_value),
            annual_coupon_rate_pct: Some(annual_coupon_rate_pct),
            market_price: Some(market_price),
            years_to_maturity: Some(years_to_maturity),
            coupon_frequency: Some(frequency.as_str().to_string()),
            settlement_date: None,
        }
    }

    pub fn with_settlement_date(mut self, date: impl Into<String>) -> Self {
        self.settlement_date = Some(date.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Validated input
// ---------------------------------------------------------------------------

/// A validated bond description with the settlement date resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondInput {
    pub face_value: f64,
    pub annual_coupon_rate_pct: f64,
    pub market_price: f64,
    pub years_to_maturity: Years,
    pub coupon_frequency: CouponFrequency,
    pub settlement_date: NaiveDate,
}

impl BondInput {
    /// Validate `request` and resolve its settlement date, falling back to
    /// `clock` when none was given. Every rule violation is reported at once.
    pub fn from_request(request: &BondYieldRequest, clock: &dyn Clock) -> BondYieldResult<Self> {
        let violations = validate_bond_request(request);
        if !violations.is_empty() {
            return Err(BondYieldError::ValidationFailed { violations });
        }

        let frequency = request
            .coupon_frequency
            .as_deref()
            .unwrap_or_default()
            .parse::<CouponFrequency>()?;
        let settlement_date = match request.settlement_date.as_deref() {
            Some(raw) => parse_settlement_date(raw).ok_or_else(|| BondYieldError::InvalidInput {
                field: "settlementDate".into(),
                reason: format!("'{raw}' is not a valid calendar date"),
            })?,
            None => clock.today(),
        };

        Ok(Self {
            face_value: request.face_value.unwrap_or_default(),
            annual_coupon_rate_pct: request.annual_coupon_rate_pct.unwrap_or_default(),
            market_price: request.market_price.unwrap_or_default(),
            years_to_maturity: request.years_to_maturity.unwrap_or_default(),
            coupon_frequency: frequency,
            settlement_date,
        })
    }
}

// ---------------------------------------------------------------------------
// Pricing context
// ---------------------------------------------------------------------------

/// Quantities derived once per request and shared by the solver and the
/// schedule builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingContext {
    /// Coupon rate as a decimal (0.05 = 5%).
    pub coupon_rate: Rate,
    pub annual_coupon: f64,
    /// Coupon paid each period.
    pub coupon_payment: f64,
    pub total_periods: u32,
    pub frequency: f64,
}

impl PricingContext {
    pub fn new(input: &BondInput, config: &CalculationConfig) -> BondYieldResult<Self> {
        let per_year = input.coupon_frequency.periods_per_year();
        let frequency = f64::from(per_year);
        let coupon_rate = input.annual_coupon_rate_pct / 100.0;
        let annual_coupon = input.face_value * coupon_rate;

        let raw_periods = input.years_to_maturity * frequency;
        let rounded = raw_periods.round();
        if rounded < 1.0 {
            return Err(BondYieldError::DegeneratePeriodCount {
                years: input.years_to_maturity,
                frequency: per_year,
                periods: rounded as i64,
            });
        }
        if config.period_rounding == PeriodRounding::Exact
            && (raw_periods - rounded).abs() > PERIOD_ALIGNMENT_EPSILON
        {
            return Err(BondYieldError::InvalidInput {
                field: "yearsToMaturity".into(),
                reason: format!(
                    "{} years is not a whole number of {} coupon periods",
                    input.years_to_maturity, input.coupon_frequency
                ),
            });
        }
        if rounded > f64::from(config.max_periods) {
            return Err(BondYieldError::InvalidInput {
                field: "yearsToMaturity".into(),
                reason: format!(
                    "{rounded} coupon periods exceeds the limit of {}",
                    config.max_periods
                ),
            });
        }

        Ok(Self {
            coupon_rate,
            annual_coupon,
            coupon_payment: annual_coupon / frequency,
            total_periods: rounded as u32,
            frequency,
        })
    }
}

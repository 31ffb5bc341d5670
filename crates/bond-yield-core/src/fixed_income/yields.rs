use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calendar::add_months;
use crate::clock::{Clock, SystemClock};
use crate::config::{CalculationConfig, NonConvergencePolicy};
use crate::error::BondYieldError;
use crate::fixed_income::inputs::{BondInput, BondYieldRequest, PricingContext};
use crate::fixed_income::solver::{solve_periodic_yield, YieldProblem, YieldSolution};
use crate::rounding::{round_money, round_pct};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::BondYieldResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Market price relative to face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingStatus {
    Premium,
    Discount,
    Par,
}

impl TradingStatus {
    /// Classify by the sign of `market_price - face_value`.
    pub fn classify(market_price: f64, face_value: f64) -> Self {
        let diff = market_price - face_value;
        if diff > 0.0 {
            TradingStatus::Premium
        } else if diff < 0.0 {
            TradingStatus::Discount
        } else {
            TradingStatus::Par
        }
    }
}

/// One coupon period of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub period: u32,
    pub payment_date: NaiveDate,
    pub coupon_payment: Money,
    /// Coupons received up to and including this period.
    pub cumulative_interest: Money,
    /// Face value until the final period, zero after the bullet repayment.
    pub remaining_principal: Money,
}

/// Yield metrics and cash flow schedule for one bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondResult {
    /// The validated request with the settlement date filled in.
    pub inputs: BondInput,
    pub annual_coupon_amount: Money,
    pub coupon_payment: Money,
    pub total_periods: u32,
    /// Annual coupon / market price, in percent.
    pub current_yield_pct: Percent,
    /// Nominal annual YTM (periodic yield * frequency), in percent.
    pub ytm_pct: Percent,
    /// (1 + periodic yield)^frequency - 1, in percent.
    pub effective_annual_yield_pct: Percent,
    pub total_interest_earned: Money,
    pub trading_status: TradingStatus,
    /// Market price minus face value.
    pub premium_discount_amount: Money,
    pub cash_flow_schedule: Vec<CashFlowRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate YTM, current and effective yields, and the cash flow schedule,
/// using today's date for a missing settlement date and default settings.
pub fn calculate_bond_yield(
    request: &BondYieldRequest,
) -> BondYieldResult<ComputationOutput<BondResult>> {
    calculate_bond_yield_with(request, &SystemClock, &CalculationConfig::default())
}

/// [`calculate_bond_yield`] with an explicit clock and configuration.
pub fn calculate_bond_yield_with(
    request: &BondYieldRequest,
    clock: &dyn Clock,
    config: &CalculationConfig,
) -> BondYieldResult<ComputationOutput<BondResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation --
    let input = BondInput::from_request(request, clock)?;
    let ctx = PricingContext::new(&input, config)?;

    // -- YTM --
    let problem = YieldProblem::new(
        input.market_price,
        ctx.coupon_payment,
        input.face_value,
        ctx.total_periods,
    );
    let solution = solve_periodic_yield(&problem, &config.solver);

    if !solution.converged {
        match config.non_convergence {
            NonConvergencePolicy::Fail => {
                return Err(BondYieldError::ConvergenceFailure {
                    function: "YTM bisection".into(),
                    iterations: solution.iterations,
                    last_delta: solution.residual,
                });
            }
            NonConvergencePolicy::BestEffort => {
                warn!(
                    "YTM did not converge; returning best estimate r={} (residual {})",
                    solution.periodic_yield, solution.residual
                );
                warnings.push(format!(
                    "YTM solver did not converge after {} iterations; periodic yield {} is a \
                     best estimate (price residual {:.6})",
                    solution.iterations, solution.periodic_yield, solution.residual
                ));
            }
        }
    }

    let output = build_bond_result(input, &ctx, &solution)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "Newton-Raphson with bisection fallback",
        "solver_phase": solution.phase,
        "solver_iterations": solution.iterations,
        "price_tolerance": config.solver.price_tolerance,
        "period_rounding": config.period_rounding,
        "principal": "bullet repayment at final period",
        "rounding": "money 2dp, yields 6dp, half away from zero"
    });

    Ok(with_metadata(
        "Bond Yield to Maturity and Cash Flow Schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Validate `request` and build its cash flow schedule without solving for
/// yield.
pub fn bond_cash_flow_schedule(
    request: &BondYieldRequest,
    clock: &dyn Clock,
    config: &CalculationConfig,
) -> BondYieldResult<Vec<CashFlowRow>> {
    let input = BondInput::from_request(request, clock)?;
    let ctx = PricingContext::new(&input, config)?;
    build_cash_flow_schedule(&input, &ctx)
}

/// Assemble the rounded result record from a solved periodic yield.
pub fn build_bond_result(
    input: BondInput,
    ctx: &PricingContext,
    solution: &YieldSolution,
) -> BondYieldResult<BondResult> {
    let periodic = solution.periodic_yield;
    let ytm_pct = periodic * ctx.frequency * 100.0;
    let effective_pct = ((1.0 + periodic).powf(ctx.frequency) - 1.0) * 100.0;
    let current_yield_pct = ctx.annual_coupon / input.market_price * 100.0;
    // Interest totals are multiples of the reported (rounded) coupon.
    let coupon_payment = round_money(ctx.coupon_payment)?;
    let total_interest = coupon_payment * Decimal::from(ctx.total_periods);

    let cash_flow_schedule = build_cash_flow_schedule(&input, ctx)?;

    Ok(BondResult {
        annual_coupon_amount: round_money(ctx.annual_coupon)?,
        coupon_payment,
        total_periods: ctx.total_periods,
        current_yield_pct: round_pct(current_yield_pct)?,
        ytm_pct: round_pct(ytm_pct)?,
        effective_annual_yield_pct: round_pct(effective_pct)?,
        total_interest_earned: total_interest,
        trading_status: TradingStatus::classify(input.market_price, input.face_value),
        premium_discount_amount: round_money(input.market_price - input.face_value)?,
        cash_flow_schedule,
        inputs: input,
    })
}

/// One row per coupon period. Payment dates are offset from settlement by
/// whole months (never chained row to row), so a month-end clamp in one row
/// does not drag later rows off month-end.
pub fn build_cash_flow_schedule(
    input: &BondInput,
    ctx: &PricingContext,
) -> BondYieldResult<Vec<CashFlowRow>> {
    let months_per_period = input.coupon_frequency.months_per_period();
    let coupon_payment = round_money(ctx.coupon_payment)?;
    let face_value = round_money(input.face_value)?;

    (1..=ctx.total_periods)
        .map(|period| -> BondYieldResult<CashFlowRow> {
            let months = period.checked_mul(months_per_period).ok_or_else(|| {
                BondYieldError::DateError(format!("period {period} is too far in the future"))
            })?;
            let remaining_principal = if period == ctx.total_periods {
                Money::ZERO
            } else {
                face_value
            };

            Ok(CashFlowRow {
                period,
                payment_date: add_months(input.settlement_date, months)?,
                coupon_payment,
                cumulative_interest: coupon_payment * Decimal::from(period),
                remaining_principal,
            })
        })
        .collect()
}

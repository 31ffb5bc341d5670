use serde::{Deserialize, Serialize};

/// Default cap on the number of coupon periods in one request.
pub const DEFAULT_MAX_PERIODS: u32 = 1200;

/// Tuning for the two-phase YTM solver. `Default` holds the production
/// constants; override only for experiments or tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Newton-Raphson iteration budget.
    pub newton_max_iterations: u32,
    /// Price residual below which a rate is accepted.
    pub price_tolerance: f64,
    /// Smallest usable |f'(r)| before Newton is abandoned.
    pub min_derivative: f64,
    /// Step size below which Newton is treated as converged.
    pub step_tolerance: f64,
    /// Newton iterates at or below this are out of bounds.
    pub min_rate: f64,
    /// Newton iterates above this are out of bounds.
    pub max_rate: f64,
    /// Lower end of the initial bisection bracket.
    pub bracket_low: f64,
    /// Upper end of the initial bisection bracket.
    pub bracket_high: f64,
    /// How many times `bracket_high` may be doubled looking for a sign change.
    pub max_bracket_expansions: u32,
    /// Bisection iteration budget.
    pub bisection_max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            newton_max_iterations: 50,
            price_tolerance: 1e-10,
            min_derivative: 1e-12,
            step_tolerance: 1e-12,
            min_rate: -0.999999,
            max_rate: 10.0,
            bracket_low: -0.99,
            bracket_high: 1.0,
            max_bracket_expansions: 20,
            bisection_max_iterations: 200,
        }
    }
}

/// How `years * frequency` becomes a whole number of periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodRounding {
    /// Round to the nearest whole period (2.5y semi-annual = 5 periods,
    /// 2.2y annual = 2 periods).
    #[default]
    Round,
    /// Reject maturities that do not fall on a coupon date.
    Exact,
}

/// What to do when neither solver phase reaches the price tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Return the best estimate and attach a warning.
    #[default]
    BestEffort,
    /// Fail the request with `ConvergenceFailure`.
    Fail,
}

/// Per-request calculation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    pub solver: SolverConfig,
    pub period_rounding: PeriodRounding,
    pub non_convergence: NonConvergencePolicy,
    pub max_periods: u32,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            period_rounding: PeriodRounding::default(),
            non_convergence: NonConvergencePolicy::default(),
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let cfg: CalculationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, CalculationConfig::default());
        assert_eq!(cfg.solver.newton_max_iterations, 50);
        assert_eq!(cfg.solver.bisection_max_iterations, 200);
        assert_eq!(cfg.max_periods, DEFAULT_MAX_PERIODS);
    }

    #[test]
    fn test_partial_override() {
        let cfg: CalculationConfig = serde_json::from_str(
            r#"{"period_rounding":"exact","non_convergence":"fail","solver":{"newton_max_iterations":3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.period_rounding, PeriodRounding::Exact);
        assert_eq!(cfg.non_convergence, NonConvergencePolicy::Fail);
        assert_eq!(cfg.solver.newton_max_iterations, 3);
        assert_eq!(cfg.solver.price_tolerance, 1e-10);
    }
}

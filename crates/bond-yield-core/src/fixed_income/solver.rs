//! Periodic yield-to-maturity solver.
//!
//! Finds the periodic rate r that reprices a level-coupon bullet bond to its
//! market price:
//!
//!   sum_{t=1}^{N} C / (1+r)^t + F / (1+r)^N = P
//!
//! The search runs as a two-state machine. It starts in [`SolvePhase::Newton`],
//! which converges in a handful of steps for ordinary inputs. If Newton hits a
//! flat derivative, leaves the sane rate range or runs out of iterations, the
//! machine moves to [`SolvePhase::Bisection`], which always terminates. A
//! bisection run that spends its whole budget without repricing within
//! tolerance, bracketed or not, is reported as unconverged in the returned
//! [`YieldSolution`], never raised.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::time_value::{bond_price, bond_price_derivative};
use crate::types::Rate;

/// Newton never starts below this rate.
const MIN_INITIAL_GUESS: f64 = -0.95;

/// Which phase produced a [`YieldSolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolvePhase {
    Newton,
    Bisection,
}

/// Why the Newton phase handed over to bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonExit {
    /// Derivative non-finite or too close to zero.
    FlatDerivative,
    /// Next iterate was non-finite or outside the configured rate range.
    OutOfBounds,
    /// Iteration budget spent without meeting either tolerance.
    IterationsExhausted,
}

/// Result of a yield solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldSolution {
    /// Periodic yield as a decimal, not annualized.
    pub periodic_yield: Rate,
    pub phase: SolvePhase,
    /// Iterations spent across both phases.
    pub iterations: u32,
    /// Model price minus market price at `periodic_yield`.
    pub residual: f64,
    /// False when bisection exhausted its iterations; `periodic_yield` is
    /// then the midpoint of the final bracket.
    pub converged: bool,
    /// Whether bisection ran on a sign-changing bracket. Always true for a
    /// Newton solution.
    pub bracketed: bool,
}

/// A bond pricing problem in solver terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldProblem {
    pub market_price: f64,
    pub coupon_payment: f64,
    pub face_value: f64,
    pub periods: u32,
}

impl YieldProblem {
    pub fn new(market_price: f64, coupon_payment: f64, face_value: f64, periods: u32) -> Self {
        Self {
            market_price,
            coupon_payment,
            face_value,
            periods,
        }
    }

    /// f(r) = P(r) - market price
    pub fn residual(&self, rate: Rate) -> f64 {
        bond_price(rate, self.coupon_payment, self.face_value, self.periods) - self.market_price
    }

    /// f'(r) = dP/dr
    pub fn slope(&self, rate: Rate) -> f64 {
        bond_price_derivative(rate, self.coupon_payment, self.face_value, self.periods)
    }

    /// Coupon rate per period (annual rate / frequency), floored at -0.95.
    pub fn initial_guess(&self) -> Rate {
        (self.coupon_payment / self.face_value).max(MIN_INITIAL_GUESS)
    }
}

enum NewtonOutcome {
    Converged(YieldSolution),
    Abandoned { exit: NewtonExit, iterations: u32 },
}

/// Solve for the periodic yield of `problem`. Pure and deterministic: the
/// same inputs always give bit-identical output.
pub fn solve_periodic_yield(problem: &YieldProblem, config: &SolverConfig) -> YieldSolution {
    match newton_phase(problem, config) {
        NewtonOutcome::Converged(solution) => {
            debug!(
                "YTM Newton converged after {} iterations at r={}",
                solution.iterations, solution.periodic_yield
            );
            solution
        }
        NewtonOutcome::Abandoned { exit, iterations } => {
            debug!("YTM Newton abandoned after {iterations} iterations ({exit:?}); bisecting");
            bisection_phase(problem, config, iterations)
        }
    }
}

fn newton_phase(problem: &YieldProblem, config: &SolverConfig) -> NewtonOutcome {
    let mut rate = problem.initial_guess();

    for iteration in 0..config.newton_max_iterations {
        let residual = problem.residual(rate);
        if residual.abs() < config.price_tolerance {
            return NewtonOutcome::Converged(YieldSolution {
                periodic_yield: rate,
                phase: SolvePhase::Newton,
                iterations: iteration,
                residual,
                converged: true,
                bracketed: true,
            });
        }

        let slope = problem.slope(rate);
        if !slope.is_finite() || slope.abs() < config.min_derivative {
            return NewtonOutcome::Abandoned {
                exit: NewtonExit::FlatDerivative,
                iterations: iteration,
            };
        }

        let next = rate - residual / slope;
        if !next.is_finite() || next <= config.min_rate || next > config.max_rate {
            return NewtonOutcome::Abandoned {
                exit: NewtonExit::OutOfBounds,
                iterations: iteration + 1,
            };
        }

        if (next - rate).abs() < config.step_tolerance {
            return NewtonOutcome::Converged(YieldSolution {
                periodic_yield: next,
                phase: SolvePhase::Newton,
                iterations: iteration + 1,
                residual: problem.residual(next),
                converged: true,
                bracketed: true,
            });
        }

        rate = next;
    }

    NewtonOutcome::Abandoned {
        exit: NewtonExit::IterationsExhausted,
        iterations: config.newton_max_iterations,
    }
}

fn bisection_phase(problem: &YieldProblem, config: &SolverConfig, spent: u32) -> YieldSolution {
    let mut low = config.bracket_low;
    let mut high = config.bracket_high;
    let mut f_low = problem.residual(low);
    let mut f_high = problem.residual(high);

    // Price falls monotonically in the rate for positive cash flows, so
    // pushing `high` up eventually drives the residual negative.
    let mut expansions = 0;
    while sign(f_low) == sign(f_high) && expansions < config.max_bracket_expansions {
        high *= 2.0;
        f_high = problem.residual(high);
        expansions += 1;
    }

    let bracketed = sign(f_low) != sign(f_high);
    if !bracketed {
        warn!(
            "YTM bisection found no sign change in [{low}, {high}] after {expansions} expansions"
        );
    }

    let mut iterations = spent;
    for _ in 0..config.bisection_max_iterations {
        iterations += 1;
        let mid = (low + high) / 2.0;
        let f_mid = problem.residual(mid);

        if f_mid.abs() < config.price_tolerance {
            debug!("YTM bisection converged after {iterations} total iterations at r={mid}");
            return YieldSolution {
                periodic_yield: mid,
                phase: SolvePhase::Bisection,
                iterations,
                residual: f_mid,
                converged: true,
                bracketed,
            };
        }

        if sign(f_mid) == sign(f_low) {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }

    let mid = (low + high) / 2.0;
    let residual = problem.residual(mid);
    warn!("YTM bisection exhausted {iterations} iterations at r={mid} (residual {residual})");
    YieldSolution {
        periodic_yield: mid,
        phase: SolvePhase::Bisection,
        iterations,
        residual,
        converged: false,
        bracketed,
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(price: f64, coupon: f64, face: f64, periods: u32) -> YieldSolution {
        solve_periodic_yield(
            &YieldProblem::new(price, coupon, face, periods),
            &SolverConfig::default(),
        )
    }

    #[test]
    fn test_par_bond_yield_equals_coupon_rate() {
        let sol = solve(1000.0, 25.0, 1000.0, 20);
        assert_eq!(sol.phase, SolvePhase::Newton);
        assert!(sol.converged);
        assert!((sol.periodic_yield - 0.025).abs() < 1e-10, "got {}", sol.periodic_yield);
    }

    #[test]
    fn test_discount_bond_newton_reprices() {
        let sol = solve(950.0, 25.0, 1000.0, 20);
        assert_eq!(sol.phase, SolvePhase::Newton);
        assert!(sol.converged);
        assert!(sol.iterations < 10, "took {} iterations", sol.iterations);
        assert!(sol.periodic_yield > 0.025);
        let repriced = bond_price(sol.periodic_yield, 25.0, 1000.0, 20);
        assert!((repriced - 950.0).abs() < 1e-8);
    }

    #[test]
    fn test_zero_coupon_matches_closed_form() {
        let sol = solve(600.0, 0.0, 1000.0, 10);
        let expected = (1000.0_f64 / 600.0).powf(0.1) - 1.0;
        assert!(
            ((sol.periodic_yield - expected) / expected).abs() < 1e-6,
            "got {} expected {expected}",
            sol.periodic_yield
        );
    }

    #[test]
    fn test_newton_out_of_bounds_falls_back_to_bisection() {
        // One period, price 1 against 1050 at maturity: r = 1049.
        let sol = solve(1.0, 50.0, 1000.0, 1);
        assert_eq!(sol.phase, SolvePhase::Bisection);
        assert!(sol.converged);
        assert!((sol.periodic_yield - 1049.0).abs() < 1e-6, "got {}", sol.periodic_yield);
    }

    #[test]
    fn test_disabled_newton_still_solves_by_bisection() {
        let config = SolverConfig {
            newton_max_iterations: 0,
            ..SolverConfig::default()
        };
        let sol = solve_periodic_yield(&YieldProblem::new(950.0, 25.0, 1000.0, 20), &config);
        let newton = solve(950.0, 25.0, 1000.0, 20);
        assert_eq!(sol.phase, SolvePhase::Bisection);
        assert!(sol.converged);
        assert!((sol.periodic_yield - newton.periodic_yield).abs() < 1e-9);
    }

    #[test]
    fn test_negative_yield_when_price_exceeds_undiscounted_flows() {
        // Price above C*N + F needs r < 0.
        let sol = solve(1200.0, 10.0, 1000.0, 5);
        assert!(sol.converged);
        assert!(sol.periodic_yield < 0.0);
        assert!(sol.residual.abs() < 1e-8);
    }

    #[test]
    fn test_missing_bracket_returns_unconverged_midpoint() {
        let config = SolverConfig {
            newton_max_iterations: 0,
            max_bracket_expansions: 0,
            ..SolverConfig::default()
        };
        let sol = solve_periodic_yield(&YieldProblem::new(1.0, 50.0, 1000.0, 1), &config);
        assert_eq!(sol.phase, SolvePhase::Bisection);
        assert!(!sol.converged);
        assert!(!sol.bracketed);
        assert!(sol.periodic_yield.is_finite());
        assert!(sol.periodic_yield <= 1.0);
        assert_eq!(sol.iterations, config.bisection_max_iterations);
    }

    #[test]
    fn test_exhausted_bisection_is_unconverged() {
        // Prices near 1e12 carry ~1e-4 of float noise, so some of these can
        // never reprice within 1e-10 even on a valid bracket.
        let config = SolverConfig {
            newton_max_iterations: 0,
            ..SolverConfig::default()
        };
        let mut exhausted = 0;
        for k in 0..200 {
            let price = 9.1e11 + f64::from(k) * 1234.567;
            let sol = solve_periodic_yield(&YieldProblem::new(price, 2.5e10, 1e12, 20), &config);
            assert!(sol.bracketed);
            let off_tolerance = sol.residual.abs() >= config.price_tolerance;
            if sol.iterations == config.bisection_max_iterations && off_tolerance {
                exhausted += 1;
                assert!(!sol.converged, "exhausted run reported converged: {sol:?}");
            }
            if sol.converged {
                assert!(sol.residual.abs() < config.price_tolerance, "{sol:?}");
            }
        }
        assert!(exhausted > 0);
    }

    #[test]
    fn test_solver_is_deterministic() {
        let a = solve(987.65, 31.25, 1000.0, 17);
        let b = solve(987.65, 31.25, 1000.0, 17);
        assert_eq!(a.periodic_yield.to_bits(), b.periodic_yield.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_initial_guess_floor() {
        let problem = YieldProblem::new(950.0, 25.0, 1000.0, 20);
        assert_eq!(problem.initial_guess(), 0.025);
        let problem = YieldProblem::new(950.0, -990.0, 1000.0, 20);
        assert_eq!(problem.initial_guess(), MIN_INITIAL_GUESS);
    }
}

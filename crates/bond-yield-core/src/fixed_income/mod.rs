pub mod inputs;
pub mod solver;
pub mod validation;
pub mod yields;

pub use inputs::{BondInput, BondYieldRequest, CouponFrequency, PricingContext};
pub use solver::{solve_periodic_yield, SolvePhase, YieldProblem, YieldSolution};
pub use validation::validate_bond_request;
pub use yields::{
    bond_cash_flow_schedule, build_bond_result, build_cash_flow_schedule, calculate_bond_yield,
    calculate_bond_yield_with, BondResult, CashFlowRow, TradingStatus,
};

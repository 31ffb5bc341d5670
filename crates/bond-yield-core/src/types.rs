use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary values on the output side. Always rounded to 2 dp before they
/// leave the core.
pub type Money = Decimal;

/// Yields expressed as percentages (5.25 = 5.25%), rounded to 6 dp.
pub type Percent = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Solver-side only.
pub type Rate = f64;

/// Year fractions or counts
pub type Years = f64;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64_solver_decimal_output".to_string(),
        },
    }
}

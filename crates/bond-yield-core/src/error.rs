use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondYieldError {
    #[error("Validation failed: {}", violations.join("; "))]
    ValidationFailed { violations: Vec<String> },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Degenerate period count: {years} years at {frequency} payments/yr rounds to {periods} periods")]
    DegeneratePeriodCount {
        years: f64,
        frequency: u32,
        periods: i64,
    },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: f64,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BondYieldError {
    fn from(e: serde_json::Error) -> Self {
        BondYieldError::SerializationError(e.to_string())
    }
}

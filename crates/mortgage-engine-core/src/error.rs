use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageEngineError {
    /// Rejected before simulation begins; no partial schedule is produced.
    #[error("Invalid configuration for track '{track}': {reason}")]
    Configuration { track: String, reason: String },

    /// Raised mid-simulation; the partial schedule is discarded.
    #[error("Track '{track}' cannot amortize at month {month}: {reason}")]
    Amortization {
        track: String,
        month: u32,
        reason: String,
    },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MortgageEngineError {
    fn from(e: serde_json::Error) -> Self {
        MortgageEngineError::SerializationError(e.to_string())
    }
}

pub mod amortization;
pub mod engine;
pub mod error;
pub mod mortgage;
pub mod schedule;
pub mod types;

pub use engine::simulate_mortgage;
pub use error::MortgageEngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type MortgageEngineResult<T> = Result<T, MortgageEngineError>;

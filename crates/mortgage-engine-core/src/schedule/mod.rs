pub mod aggregate;
pub mod annual;

pub use aggregate::{aggregate, MortgageSchedule};
pub use annual::{annual_debt_service, to_annual, AnnualRecord};

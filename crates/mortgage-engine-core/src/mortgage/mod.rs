pub mod portfolio;
pub mod track;

pub use portfolio::{Mortgage, MortgageSummary};
pub use track::{
    GraceKind, GracePeriod, Prepayment, PrepaymentAmount, PrepaymentEffect, RateChange,
    RepaymentMethod, Track,
};

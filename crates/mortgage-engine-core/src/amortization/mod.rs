pub mod events;
pub mod payment;
pub mod rates;
pub mod simulator;

pub use rates::RateTimeline;
pub use simulator::{simulate_track, MonthlyRecord, TrackSchedule, BALANCE_EPSILON};

//! Top-level entry point: validate, simulate every track, aggregate.

use std::time::Instant;

use rayon::prelude::*;

use crate::amortization::{simulate_track, TrackSchedule};
use crate::mortgage::Mortgage;
use crate::schedule::MortgageSchedule;
use crate::types::{with_metadata, ComputationOutput};
use crate::MortgageEngineResult;

/// Simulate a whole mortgage.
///
/// Tracks share no state, so they are simulated in parallel; aggregation is
/// a pure reduction that runs after the join. Identical inputs produce
/// identical schedules: per-track simulation is deterministic and the
/// combined schedule follows declared track order.
pub fn simulate_mortgage(
    mortgage: &Mortgage,
) -> MortgageEngineResult<ComputationOutput<MortgageSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    mortgage.validate()?;

    let schedules: Vec<TrackSchedule> = mortgage
        .tracks
        .par_iter()
        .map(simulate_track)
        .collect::<MortgageEngineResult<Vec<_>>>()?;

    for (track, schedule) in mortgage.tracks.iter().zip(&schedules) {
        if schedule.months() < track.term_months {
            warnings.push(format!(
                "Track '{}' fully repaid at month {} of a {}-month term",
                track.name,
                schedule.months(),
                track.term_months
            ));
        }
    }

    let output = MortgageSchedule::build(schedules, mortgage.summary());

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-Track Mortgage Amortization",
        &serde_json::json!({
            "tracks": mortgage.tracks.len(),
            "total_principal": mortgage.total_principal().to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

//! Cross-track aggregation into a single month-indexed schedule.
//!
//! Tracks are independent, so every column sums: a track's balance is
//! already net of its own amortization, and a track that matured early
//! contributes nothing from that month on.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{MonthlyRecord, TrackSchedule};
use crate::mortgage::MortgageSummary;
use crate::types::Money;

/// Mortgage-level schedule: combined month-indexed totals plus the
/// per-track breakdown in declared track order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageSchedule {
    pub tracks: Vec<TrackSchedule>,
    pub combined: Vec<MonthlyRecord>,
    pub summary: MortgageSummary,
    /// Total payment due in the first month across all tracks.
    pub first_month_payment: Money,
    pub total_interest_paid: Money,
}

impl MortgageSchedule {
    pub fn build(tracks: Vec<TrackSchedule>, summary: MortgageSummary) -> Self {
        let combined = aggregate(&tracks);
        let first_month_payment = combined.first().map_or(Decimal::ZERO, |r| r.payment);
        let total_interest_paid = tracks.iter().map(|t| t.total_interest).sum();
        Self {
            tracks,
            combined,
            summary,
            first_month_payment,
            total_interest_paid,
        }
    }

    /// Breakdown for one track by name.
    pub fn track(&self, name: &str) -> Option<&TrackSchedule> {
        self.tracks.iter().find(|t| t.track == name)
    }

    /// Months until every track is repaid.
    pub fn horizon_months(&self) -> u32 {
        self.combined.len() as u32
    }

    /// Pair each combined row with a calendar date, month 1 falling on
    /// `first_payment`.
    pub fn dated(&self, first_payment: NaiveDate) -> Vec<(NaiveDate, &MonthlyRecord)> {
        self.combined
            .iter()
            .map(|r| (first_payment + Months::new(r.month - 1), r))
            .collect()
    }
}

/// Sum payment, interest, principal and balance across all tracks for every
/// month up to the longest maturity. Iteration follows declared track order,
/// never an unordered container, so output is deterministic.
pub fn aggregate(tracks: &[TrackSchedule]) -> Vec<MonthlyRecord> {
    let horizon = tracks.iter().map(|t| t.rows.len()).max().unwrap_or(0);

    let mut combined = Vec::with_capacity(horizon);
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;

    for idx in 0..horizon {
        let mut payment = Decimal::ZERO;
        let mut interest = Decimal::ZERO;
        let mut principal = Decimal::ZERO;
        let mut balance = Decimal::ZERO;
        let mut events: Vec<String> = Vec::new();

        for schedule in tracks {
            // Rows are contiguous from month 1, so index = month - 1.
            if let Some(row) = schedule.rows.get(idx) {
                payment += row.payment;
                interest += row.interest;
                principal += row.principal;
                balance += row.balance;
                events.extend(row.events.iter().map(|e| format!("{}: {e}", schedule.track)));
            }
        }

        cumulative_principal += principal;
        cumulative_interest += interest;

        combined.push(MonthlyRecord {
            month: idx as u32 + 1,
            payment,
            interest,
            principal,
            balance,
            cumulative_principal,
            cumulative_interest,
            events,
        });
    }

    combined
}

//! Rate resolver: the effective annual rate of a track at any month.

use rust_decimal::Decimal;

use crate::mortgage::Track;
use crate::types::Rate;
use crate::MortgageEngineResult;

use super::payment;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RateSegment {
    from_month: u32,
    annual_rate: Rate,
}

/// Piecewise-constant annual rate over the life of one track, built from the
/// base rate plus its scheduled changes applied cumulatively in ascending
/// month order.
///
/// A change scheduled for month `m` is visible from month `m`'s record
/// onward; months already finalized are never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTimeline {
    segments: Vec<RateSegment>,
}

impl RateTimeline {
    pub fn for_track(track: &Track) -> MortgageEngineResult<Self> {
        let mut changes: Vec<_> = track.rate_changes.iter().collect();
        changes.sort_by_key(|rc| rc.month);

        let mut segments = vec![RateSegment {
            from_month: 1,
            annual_rate: track.annual_rate,
        }];
        let mut rate = track.annual_rate;
        let mut prev_month: Option<u32> = None;

        for rc in changes {
            if prev_month == Some(rc.month) {
                return Err(track.config_err(&format!(
                    "two rate changes share effective month {}",
                    rc.month
                )));
            }
            prev_month = Some(rc.month);

            rate += rc.delta;
            if rate < Decimal::ZERO {
                return Err(track.config_err(&format!(
                    "cumulative rate becomes negative at month {}",
                    rc.month
                )));
            }
            segments.push(RateSegment {
                from_month: rc.month,
                annual_rate: rate,
            });
        }

        Ok(Self { segments })
    }

    /// Effective annual nominal rate for the given 1-based month.
    pub fn annual_rate_at(&self, month: u32) -> Rate {
        self.segments
            .iter()
            .rev()
            .find(|s| s.from_month <= month)
            .map(|s| s.annual_rate)
            // months before the first segment only arise for month 0 queries
            .unwrap_or(self.segments[0].annual_rate)
    }

    /// Effective monthly accrual rate for the given month.
    pub fn monthly_rate_at(&self, month: u32) -> Rate {
        payment::monthly_rate(self.annual_rate_at(month))
    }
}

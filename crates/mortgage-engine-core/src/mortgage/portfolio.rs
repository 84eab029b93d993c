use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageEngineError;
use crate::types::{Money, Rate};
use crate::MortgageEngineResult;

use super::track::Track;

/// A mortgage as an ordered set of independent tracks.
///
/// Tracks never share balance; the declared order is preserved everywhere a
/// per-track breakdown is reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mortgage {
    pub tracks: Vec<Track>,
}

/// Principal-weighted headline figures across all tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageSummary {
    pub total_principal: Money,
    /// Principal-weighted average of the tracks' base annual rates.
    pub weighted_annual_rate: Rate,
    /// Principal-weighted average term in months.
    pub weighted_term_months: Decimal,
    pub track_count: usize,
}

impl Mortgage {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// The single-loan case.
    pub fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
        }
    }

    /// Validate the whole configuration before simulation begins.
    pub fn validate(&self) -> MortgageEngineResult<()> {
        if self.tracks.is_empty() {
            return Err(MortgageEngineError::InvalidInput {
                field: "tracks".into(),
                reason: "A mortgage needs at least one track".into(),
            });
        }

        let mut seen = HashSet::new();
        for track in &self.tracks {
            track.validate()?;
            if !seen.insert(track.name.as_str()) {
                return Err(MortgageEngineError::Configuration {
                    track: track.name.clone(),
                    reason: "duplicate track name; names key the per-track breakdown".into(),
                });
            }
        }
        Ok(())
    }

    pub fn total_principal(&self) -> Money {
        self.tracks.iter().map(|t| t.principal).sum()
    }

    pub fn summary(&self) -> MortgageSummary {
        let total = self.total_principal();
        let (weighted_annual_rate, weighted_term_months) = if total.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            let rate = self
                .tracks
                .iter()
                .map(|t| t.annual_rate * t.principal)
                .sum::<Decimal>()
                / total;
            let term = self
                .tracks
                .iter()
                .map(|t| Decimal::from(t.term_months) * t.principal)
                .sum::<Decimal>()
                / total;
            (rate, term)
        };

        MortgageSummary {
            total_principal: total,
            weighted_annual_rate,
            weighted_term_months,
            track_count: self.tracks.len(),
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::rates::RateTimeline;
use crate::error::MortgageEngineError;
use crate::types::{Money, Rate};
use crate::MortgageEngineResult;

/// Repayment method for a mortgage track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentMethod {
    /// Constant total payment; the principal/interest mix shifts over time.
    Annuity,
    /// Constant principal installment; payment declines as interest declines.
    EqualPrincipal,
    /// Interest-only until the final month, when the full principal is due.
    Bullet,
}

/// Payment relief during an initial grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraceKind {
    /// Pay interest only; principal is untouched.
    InterestOnly,
    /// No payment at all; interest capitalizes into the balance.
    FullDeferral,
}

/// Grace window covering months 1..=months of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePeriod {
    pub kind: GraceKind,
    pub months: u32,
}

/// Scheduled change of the annual nominal rate.
///
/// The change is visible in the record of `month` itself: that month's payment
/// is recomputed from the prior month's closing balance over the remaining
/// term at the new rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateChange {
    pub month: u32,
    /// Signed change of the annual rate (0.015 = +1.5 percentage points).
    pub delta: Rate,
}

/// Amount of an out-of-schedule principal reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrepaymentAmount {
    /// Fixed amount, capped at the outstanding balance when applied.
    Partial(Money),
    /// Pay off whatever balance remains.
    FullPayoff,
}

/// How a prepayment reshapes the rest of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentEffect {
    /// Keep the payment basis; the loan reaches zero before its nominal term.
    ShortenTerm,
    /// Keep the term; a lower payment is derived from the reduced balance.
    ReducePayment,
}

impl PrepaymentEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrepaymentEffect::ShortenTerm => "shorten_term",
            PrepaymentEffect::ReducePayment => "reduce_payment",
        }
    }
}

/// Scheduled prepayment event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prepayment {
    pub month: u32,
    pub amount: PrepaymentAmount,
    pub effect: PrepaymentEffect,
}

/// One independently amortizing tranche of a mortgage.
///
/// A track is an immutable configuration; simulating it produces a read-only
/// monthly schedule. Tracks share nothing with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub principal: Money,
    /// Annual nominal rate as a decimal fraction (0.035 = 3.5%).
    pub annual_rate: Rate,
    pub term_months: u32,
    pub method: RepaymentMethod,
    /// Annual inflation index rate. When set, the balance grows by the
    /// compounded monthly equivalent every month, grace included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexation: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace: Option<GracePeriod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rate_changes: Vec<RateChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepayments: Vec<Prepayment>,
}

impl Track {
    /// Plain annuity track with no indexation, grace or scheduled events.
    pub fn new(
        name: impl Into<String>,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
    ) -> Self {
        Self {
            name: name.into(),
            principal,
            annual_rate,
            term_months,
            method: RepaymentMethod::Annuity,
            indexation: None,
            grace: None,
            rate_changes: Vec::new(),
            prepayments: Vec::new(),
        }
    }

    /// Validate the configuration. Fails fast with [`MortgageEngineError::Configuration`]
    /// before any simulation work; an invalid track never yields a partial schedule.
    pub fn validate(&self) -> MortgageEngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(MortgageEngineError::InvalidInput {
                field: "name".into(),
                reason: "Track name must not be empty".into(),
            });
        }
        if self.principal <= Decimal::ZERO {
            return Err(self.config_err("principal must be positive"));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(self.config_err("annual rate cannot be negative"));
        }
        if self.term_months == 0 {
            return Err(self.config_err("term must be at least one month"));
        }
        if let Some(index_rate) = self.indexation {
            if index_rate <= Decimal::NEGATIVE_ONE {
                return Err(self.config_err("indexation rate must be greater than -100%"));
            }
        }
        if let Some(grace) = &self.grace {
            if grace.months == 0 {
                return Err(self.config_err("grace period must last at least one month"));
            }
            if grace.months >= self.term_months {
                return Err(self.config_err(&format!(
                    "grace period of {} months must be shorter than the {}-month term",
                    grace.months, self.term_months
                )));
            }
        }
        for rc in &self.rate_changes {
            if rc.month == 0 || rc.month > self.term_months {
                return Err(self.config_err(&format!(
                    "rate change at month {} is outside the {}-month term",
                    rc.month, self.term_months
                )));
            }
        }
        for pp in &self.prepayments {
            if pp.month == 0 || pp.month > self.term_months {
                return Err(self.config_err(&format!(
                    "prepayment at month {} is outside the {}-month term",
                    pp.month, self.term_months
                )));
            }
            if let PrepaymentAmount::Partial(amount) = pp.amount {
                if amount <= Decimal::ZERO {
                    return Err(self.config_err(&format!(
                        "prepayment at month {} must have a positive amount",
                        pp.month
                    )));
                }
            }
        }

        // Conflicting effective months and a cumulative rate dropping below
        // zero are caught while building the rate timeline.
        RateTimeline::for_track(self)?;

        Ok(())
    }

    pub(crate) fn config_err(&self, reason: &str) -> MortgageEngineError {
        MortgageEngineError::Configuration {
            track: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_track() -> Track {
        Track::new("Fixed", dec!(500_000), dec!(0.035), 240)
    }

    #[test]
    fn test_valid_track() {
        assert!(base_track().validate().is_ok());
    }

    #[test]
    fn test_zero_principal_rejected() {
        let mut track = base_track();
        track.principal = Decimal::ZERO;
        assert!(track.validate().is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut track = base_track();
        track.annual_rate = dec!(-0.01);
        assert!(track.validate().is_err());
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut track = base_track();
        track.term_months = 0;
        assert!(track.validate().is_err());
    }

    #[test]
    fn test_grace_must_be_shorter_than_term() {
        let mut track = base_track();
        track.grace = Some(GracePeriod {
            kind: GraceKind::InterestOnly,
            months: 240,
        });
        assert!(track.validate().is_err());

        track.grace = Some(GracePeriod {
            kind: GraceKind::InterestOnly,
            months: 239,
        });
        assert!(track.validate().is_ok());
    }

    #[test]
    fn test_event_month_beyond_term_rejected() {
        let mut track = base_track();
        track.rate_changes = vec![RateChange {
            month: 241,
            delta: dec!(0.01),
        }];
        assert!(track.validate().is_err());

        let mut track = base_track();
        track.prepayments = vec![Prepayment {
            month: 0,
            amount: PrepaymentAmount::Partial(dec!(10_000)),
            effect: PrepaymentEffect::ReducePayment,
        }];
        assert!(track.validate().is_err());
    }

    #[test]
    fn test_duplicate_rate_change_month_rejected() {
        let mut track = base_track();
        track.rate_changes = vec![
            RateChange {
                month: 61,
                delta: dec!(0.01),
            },
            RateChange {
                month: 61,
                delta: dec!(-0.005),
            },
        ];
        let err = track.validate().unwrap_err();
        assert!(matches!(
            err,
            MortgageEngineError::Configuration { .. }
        ));
    }

    #[test]
    fn test_nonpositive_prepayment_amount_rejected() {
        let mut track = base_track();
        track.prepayments = vec![Prepayment {
            month: 12,
            amount: PrepaymentAmount::Partial(Decimal::ZERO),
            effect: PrepaymentEffect::ShortenTerm,
        }];
        assert!(track.validate().is_err());
    }
}

//! Month-by-month state machine for a single track.
//!
//! Each month is one pure transition `(state, month) -> (state', record)`.
//! The fixed evaluation order inside a month is: rate updates, indexation,
//! grace handling, scheduled amortization, prepayments, termination check.
//! Whenever the amortization basis changes (new rate, indexed balance, grace
//! end, reduce-payment prepayment) the scheduled payment is re-derived from
//! (current balance, current rate, remaining months) and applies forward
//! only; finalized records are never touched.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageEngineError;
use crate::mortgage::{GraceKind, PrepaymentAmount, PrepaymentEffect, RepaymentMethod, Track};
use crate::types::{Money, Rate};
use crate::MortgageEngineResult;

use super::events::{EventKind, EventQueue};
use super::payment::{
    annuity_payment, equal_principal_installment, interest_on, monthly_growth_factor, monthly_rate,
};

/// Unrounded balance at or below this is treated as fully repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// One row of an amortization schedule. Monetary fields are rounded to cents
/// at record time; the simulation itself carries full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// 1-based month index.
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Closing balance after this month's principal and any prepayment.
    pub balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
    /// What happened this month, e.g. `rate_change +0.015` or `grace_end`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Complete read-only schedule for one track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSchedule {
    pub track: String,
    pub rows: Vec<MonthlyRecord>,
    pub total_principal: Money,
    pub total_interest: Money,
}

impl TrackSchedule {
    /// Number of months actually simulated; less than the nominal term when
    /// the track is repaid early.
    pub fn months(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn closing_balance(&self) -> Money {
        self.rows.last().map_or(Decimal::ZERO, |r| r.balance)
    }
}

/// Immutable per-track context shared by every monthly transition.
struct TrackPlan<'a> {
    track: &'a Track,
    queue: EventQueue,
    /// Monthly balance growth from indexation; zero for unindexed tracks.
    index_factor: Rate,
}

/// State threaded through the simulation. `basis` is the scheduled-payment
/// basis for the track's method: the level payment for annuity tracks, the
/// principal installment for equal-principal tracks, unused for bullet.
#[derive(Debug, Clone)]
struct TrackState {
    balance: Money,
    annual_rate: Rate,
    basis: Money,
    cumulative_principal: Money,
    cumulative_interest: Money,
}

/// Simulate one track to full repayment or to its nominal term.
///
/// Fails with [`MortgageEngineError::Configuration`] before any work if the
/// track is invalid, and with [`MortgageEngineError::Amortization`] if the
/// term runs out with principal still outstanding; no partial schedule is
/// ever returned.
pub fn simulate_track(track: &Track) -> MortgageEngineResult<TrackSchedule> {
    track.validate()?;

    let plan = TrackPlan {
        track,
        queue: EventQueue::for_track(track),
        index_factor: track.indexation.map_or(Decimal::ZERO, monthly_growth_factor),
    };

    let mut state = TrackState {
        balance: track.principal,
        annual_rate: track.annual_rate,
        // Not read while a grace window is active; the grace-end transition
        // re-derives it from the balance as of that month.
        basis: derive_basis(
            track.method,
            track.principal,
            monthly_rate(track.annual_rate),
            track.term_months,
        )?,
        cumulative_principal: Decimal::ZERO,
        cumulative_interest: Decimal::ZERO,
    };

    let mut rows = Vec::with_capacity(track.term_months as usize);
    for month in 1..=track.term_months {
        let (next, record) = step(&plan, &state, month)?;
        state = next;
        rows.push(record);
        if state.balance <= BALANCE_EPSILON {
            break;
        }
    }

    if state.balance > BALANCE_EPSILON {
        return Err(MortgageEngineError::Amortization {
            track: track.name.clone(),
            month: track.term_months,
            reason: format!(
                "balance of {} remains after the final scheduled month",
                round2(state.balance)
            ),
        });
    }

    Ok(TrackSchedule {
        track: track.name.clone(),
        rows,
        total_principal: round2(state.cumulative_principal),
        total_interest: round2(state.cumulative_interest),
    })
}

/// One month of simulation as a pure transition.
fn step(
    plan: &TrackPlan<'_>,
    state: &TrackState,
    month: u32,
) -> MortgageEngineResult<(TrackState, MonthlyRecord)> {
    let mut next = state.clone();
    let mut labels: Vec<String> = Vec::new();

    let grace_months = plan.track.grace.map_or(0, |g| g.months);
    let in_grace = month <= grace_months;
    // Months still to pay, counting this one.
    let remaining = plan.track.term_months - (month - 1);

    // 1. Rate updates. The queue orders these ahead of same-month
    //    prepayments, so the basis reflects the new rate before any
    //    principal is taken.
    for event in plan.queue.at_month(month) {
        if let EventKind::RateChange { delta } = event.kind {
            next.annual_rate += delta;
            if !in_grace {
                next.basis = derive_basis(
                    plan.track.method,
                    next.balance,
                    monthly_rate(next.annual_rate),
                    remaining,
                )?;
            }
            labels.push(rate_change_label(delta));
        }
    }

    // 2. Indexation grows the balance before interest accrues, grace
    //    months included.
    if !plan.index_factor.is_zero() {
        next.balance *= Decimal::ONE + plan.index_factor;
    }

    let rate_m = monthly_rate(next.annual_rate);
    let interest;
    let mut payment;
    let mut principal;

    match plan.track.grace {
        // 3. Grace window: no principal is scheduled.
        Some(grace) if in_grace => {
            interest = interest_on(next.balance, rate_m);
            principal = Decimal::ZERO;
            match grace.kind {
                GraceKind::FullDeferral => {
                    next.balance += interest;
                    payment = Decimal::ZERO;
                    if labels.is_empty() {
                        labels.push("grace:full_deferral".into());
                    }
                }
                GraceKind::InterestOnly => {
                    payment = interest;
                    if labels.is_empty() {
                        labels.push("grace:interest_only".into());
                    }
                }
            }
        }
        // 4. Scheduled amortization.
        _ => {
            if grace_months > 0 && month == grace_months + 1 {
                // First month after the window: re-derive from the
                // (indexed) grace-end balance over the full remaining term.
                next.basis = derive_basis(plan.track.method, next.balance, rate_m, remaining)?;
                labels.push("grace_end".into());
            } else if !plan.index_factor.is_zero() {
                // The indexed balance is a new amortization basis every month.
                next.basis = derive_basis(plan.track.method, next.balance, rate_m, remaining)?;
            }

            interest = interest_on(next.balance, rate_m);
            match plan.track.method {
                RepaymentMethod::Annuity => {
                    let scheduled = next.basis;
                    let mut due = (scheduled - interest).max(Decimal::ZERO);
                    if due > next.balance {
                        due = next.balance;
                        payment = due + interest;
                    } else {
                        payment = scheduled;
                    }
                    principal = due;
                }
                RepaymentMethod::EqualPrincipal => {
                    principal = next.basis.min(next.balance);
                    payment = interest + principal;
                }
                RepaymentMethod::Bullet => {
                    if month < plan.track.term_months {
                        payment = interest;
                        principal = Decimal::ZERO;
                    } else {
                        principal = next.balance;
                        payment = interest + principal;
                    }
                }
            }
            next.balance -= principal;
        }
    }

    // 5. Prepayments, applied to the post-amortization balance.
    for event in plan.queue.at_month(month) {
        if let EventKind::Prepayment { amount, effect } = event.kind {
            if next.balance <= Decimal::ZERO {
                continue;
            }
            let extra = match amount {
                PrepaymentAmount::Partial(a) => a.min(next.balance),
                PrepaymentAmount::FullPayoff => next.balance,
            };
            next.balance -= extra;
            payment += extra;
            principal += extra;

            let months_left = plan.track.term_months - month;
            if effect == PrepaymentEffect::ReducePayment
                && !in_grace
                && months_left > 0
                && next.balance > BALANCE_EPSILON
            {
                next.basis = derive_basis(plan.track.method, next.balance, rate_m, months_left)?;
            }
            // ShortenTerm keeps the basis; the balance simply reaches zero
            // before the nominal term.
            labels.push(format!("prepayment {} ({})", round2(extra), effect.as_str()));
        }
    }

    next.cumulative_principal += principal;
    next.cumulative_interest += interest;

    let record = MonthlyRecord {
        month,
        payment: round2(payment),
        interest: round2(interest),
        principal: round2(principal),
        balance: round2(next.balance.max(Decimal::ZERO)),
        cumulative_principal: round2(next.cumulative_principal),
        cumulative_interest: round2(next.cumulative_interest),
        events: labels,
    };
    Ok((next, record))
}

/// Scheduled-payment basis for a method over the given remaining months.
fn derive_basis(
    method: RepaymentMethod,
    balance: Money,
    rate_m: Rate,
    months: u32,
) -> MortgageEngineResult<Money> {
    match method {
        RepaymentMethod::Annuity => annuity_payment(balance, rate_m, months),
        RepaymentMethod::EqualPrincipal => equal_principal_installment(balance, months),
        RepaymentMethod::Bullet => Ok(Decimal::ZERO),
    }
}

fn rate_change_label(delta: Rate) -> String {
    if delta.is_sign_negative() {
        format!("rate_change {delta}")
    } else {
        format!("rate_change +{delta}")
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

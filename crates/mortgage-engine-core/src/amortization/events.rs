//! Per-track event queue: rate changes and prepayments merged into one
//! chronological sequence with an explicit same-month tie-break.

use crate::mortgage::{PrepaymentAmount, PrepaymentEffect, Track};
use crate::types::Rate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    RateChange {
        delta: Rate,
    },
    Prepayment {
        amount: PrepaymentAmount,
        effect: PrepaymentEffect,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub month: u32,
    pub kind: EventKind,
}

impl ScheduledEvent {
    /// Same-month ordering: the rate is updated (and the payment basis
    /// re-derived) before any principal is taken out of the balance.
    fn kind_priority(&self) -> u8 {
        match self.kind {
            EventKind::RateChange { .. } => 0,
            EventKind::Prepayment { .. } => 1,
        }
    }
}

/// All scheduled events of one track, sorted by (month, kind priority).
/// Within the same month and kind the declared order is preserved.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<ScheduledEvent>,
}

impl EventQueue {
    pub fn for_track(track: &Track) -> Self {
        let mut events: Vec<ScheduledEvent> =
            Vec::with_capacity(track.rate_changes.len() + track.prepayments.len());

        events.extend(track.rate_changes.iter().map(|rc| ScheduledEvent {
            month: rc.month,
            kind: EventKind::RateChange { delta: rc.delta },
        }));
        events.extend(track.prepayments.iter().map(|pp| ScheduledEvent {
            month: pp.month,
            kind: EventKind::Prepayment {
                amount: pp.amount,
                effect: pp.effect,
            },
        }));

        // sort_by_key is stable, so declared order survives within a key
        events.sort_by_key(|e| (e.month, e.kind_priority()));
        Self { events }
    }

    /// Events scheduled for `month`, already in application order.
    pub fn at_month(&self, month: u32) -> &[ScheduledEvent] {
        let start = self.events.partition_point(|e| e.month < month);
        let end = self.events.partition_point(|e| e.month <= month);
        &self.events[start..end]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

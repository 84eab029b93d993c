//! Annual roll-up: the interface surface the pro-forma projector consumes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::MonthlyRecord;
use crate::types::Money;

/// Twelve consecutive months summed; the final block may be partial when the
/// horizon is not a whole number of years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    /// 1-based year index.
    pub year: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Closing balance of the block's last month.
    pub closing_balance: Money,
}

pub fn to_annual(records: &[MonthlyRecord]) -> Vec<AnnualRecord> {
    records
        .chunks(12)
        .enumerate()
        .map(|(idx, block)| AnnualRecord {
            year: idx as u32 + 1,
            payment: block.iter().map(|r| r.payment).sum(),
            interest: block.iter().map(|r| r.interest).sum(),
            principal: block.iter().map(|r| r.principal).sum(),
            closing_balance: block.last().map_or(Decimal::ZERO, |r| r.balance),
        })
        .collect()
}

/// Just the payment column: the debt service the pro-forma layer subtracts
/// from NOI each year.
pub fn annual_debt_service(records: &[MonthlyRecord]) -> Vec<Money> {
    to_annual(records).into_iter().map(|y| y.payment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::simulate_track;
    use crate::mortgage::Track;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blocks_of_twelve_with_partial_tail() {
        let track = Track::new("T", dec!(100_000), dec!(0.04), 30);
        let schedule = simulate_track(&track).unwrap();
        let annual = to_annual(&schedule.rows);

        assert_eq!(annual.len(), 3);
        assert_eq!(annual[0].year, 1);
        // Final block covers months 25..=30 only
        let tail_payment: Decimal = schedule.rows[24..].iter().map(|r| r.payment).sum();
        assert_eq!(annual[2].payment, tail_payment);
        assert_eq!(annual[2].closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_annual_sums_match_monthly() {
        let track = Track::new("T", dec!(100_000), dec!(0.04), 120);
        let schedule = simulate_track(&track).unwrap();
        let annual = to_annual(&schedule.rows);

        let year1_interest: Decimal = schedule.rows[..12].iter().map(|r| r.interest).sum();
        assert_eq!(annual[0].interest, year1_interest);
        assert_eq!(annual[0].closing_balance, schedule.rows[11].balance);
    }

    #[test]
    fn test_annual_debt_service_is_payment_column() {
        let track = Track::new("T", dec!(100_000), dec!(0.04), 24);
        let schedule = simulate_track(&track).unwrap();
        let service = annual_debt_service(&schedule.rows);
        let annual = to_annual(&schedule.rows);
        assert_eq!(service.len(), 2);
        assert_eq!(service[0], annual[0].payment);
    }
}

use chrono::NaiveDate;
use mortgage_engine_core::mortgage::{Mortgage, RepaymentMethod, Track};
use pretty_assertions::assert_eq;
use mortgage_engine_core::schedule::{annual_debt_service, to_annual};
use mortgage_engine_core::simulate_mortgage;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn two_track_mortgage() -> Mortgage {
    // Track A: 500,000 / 240 months / 3.2% annuity
    // Track B: 300,000 / 240 months / 2.0% equal principal
    let track_a = Track::new("A", dec!(500_000), dec!(0.032), 240);
    let mut track_b = Track::new("B", dec!(300_000), dec!(0.02), 240);
    track_b.method = RepaymentMethod::EqualPrincipal;
    Mortgage::new(vec![track_a, track_b])
}

// ===========================================================================
// Aggregation across tracks
// ===========================================================================

#[test]
fn test_two_track_aggregation_is_additive() {
    let result = simulate_mortgage(&two_track_mortgage()).unwrap();
    let schedule = &result.result;

    let a = schedule.track("A").unwrap();
    let b = schedule.track("B").unwrap();

    // Track A's level payment is 2,823.31; track B opens at exactly 1,750
    assert!((a.rows[0].payment - dec!(2823.31)).abs() <= dec!(0.01));
    assert_eq!(b.rows[0].payment, dec!(1750));

    // Month 1 total is the sum of the two, and so is every other month
    assert_eq!(
        schedule.combined[0].payment,
        a.rows[0].payment + b.rows[0].payment
    );
    for (idx, row) in schedule.combined.iter().enumerate() {
        let expected = a.rows.get(idx).map_or(Decimal::ZERO, |r| r.payment)
            + b.rows.get(idx).map_or(Decimal::ZERO, |r| r.payment);
        assert_eq!(row.payment, expected);
    }

    assert_eq!(schedule.horizon_months(), 240);
    assert_eq!(schedule.combined.last().unwrap().balance, Decimal::ZERO);
    assert_eq!(schedule.first_month_payment, a.rows[0].payment + dec!(1750));
}

#[test]
fn test_unequal_maturities() {
    let mortgage = Mortgage::new(vec![
        Track::new("Long", dec!(400_000), dec!(0.035), 360),
        Track::new("Short", dec!(100_000), dec!(0.028), 120),
    ]);
    let result = simulate_mortgage(&mortgage).unwrap();
    let schedule = &result.result;

    assert_eq!(schedule.horizon_months(), 360);

    // Once the short track matures, the total is just the long track
    let long = schedule.track("Long").unwrap();
    assert_eq!(schedule.combined[120].payment, long.rows[120].payment);
    assert_eq!(schedule.combined[120].balance, long.rows[120].balance);
}

// ===========================================================================
// Annual roll-up
// ===========================================================================

#[test]
fn test_annual_rollup_conserves_principal() {
    let result = simulate_mortgage(&two_track_mortgage()).unwrap();
    let annual = to_annual(&result.result.combined);

    assert_eq!(annual.len(), 20);
    // Per-record cent rounding drifts the column sum by a few cents over
    // 240 months; the engine's own totals stay within a cent.
    let principal_total: Decimal = annual.iter().map(|y| y.principal).sum();
    assert!((principal_total - dec!(800_000)).abs() <= dec!(0.25));
    let exact: Decimal = result.result.tracks.iter().map(|t| t.total_principal).sum();
    assert!((exact - dec!(800_000)).abs() <= dec!(0.02));
    assert_eq!(annual.last().unwrap().closing_balance, Decimal::ZERO);

    // Year boundaries take the December close
    assert_eq!(annual[0].closing_balance, result.result.combined[11].balance);
}

#[test]
fn test_annual_debt_service_feed() {
    let result = simulate_mortgage(&two_track_mortgage()).unwrap();
    let service = annual_debt_service(&result.result.combined);

    assert_eq!(service.len(), 20);
    // Equal-principal payments decline, so debt service declines year on year
    for window in service.windows(2) {
        assert!(window[1] < window[0]);
    }
}

// ===========================================================================
// Engine envelope and calendar anchoring
// ===========================================================================

#[test]
fn test_envelope_metadata() {
    let result = simulate_mortgage(&two_track_mortgage()).unwrap();
    assert_eq!(result.methodology, "Multi-Track Mortgage Amortization");
    assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    assert_eq!(result.assumptions["tracks"], 2);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_dated_schedule() {
    let result = simulate_mortgage(&two_track_mortgage()).unwrap();
    let first = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
    let dated = result.result.dated(first);

    assert_eq!(dated.len(), 240);
    assert_eq!(dated[0].0, first);
    assert_eq!(dated[3].0, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
    assert_eq!(dated[239].0, NaiveDate::from_ymd_opt(2046, 8, 1).unwrap());
}

// ===========================================================================
// Configuration input contract
// ===========================================================================

#[test]
fn test_mortgage_loads_from_json() {
    let raw = r#"{
        "tracks": [
            {
                "name": "Fixed",
                "principal": "480000",
                "annual_rate": "0.041",
                "term_months": 300,
                "method": "Annuity",
                "prepayments": [
                    {
                        "month": 36,
                        "amount": { "Partial": "40000" },
                        "effect": "ReducePayment"
                    }
                ]
            }
        ]
    }"#;
    let mortgage: Mortgage = serde_json::from_str(raw).unwrap();
    assert_eq!(mortgage.tracks.len(), 1);
    assert_eq!(mortgage.tracks[0].principal, dec!(480_000));

    let result = simulate_mortgage(&mortgage).unwrap();
    assert_eq!(result.result.horizon_months(), 300);
}

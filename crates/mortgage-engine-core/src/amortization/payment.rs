//! Periodic payment formulas for the three repayment methods.
//!
//! Every formula is a pure function of (balance, monthly rate, remaining
//! months), which is what makes segment recomputation after a rate change,
//! grace end or prepayment correct: the simulator can re-derive the payment
//! basis at any month without looking backwards.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::MortgageEngineError;
use crate::mortgage::RepaymentMethod;
use crate::types::{Money, Rate};
use crate::MortgageEngineResult;

pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual nominal rate to the monthly rate used for accrual.
pub fn monthly_rate(annual: Rate) -> Rate {
    annual / MONTHS_PER_YEAR
}

/// Interest accrued on a balance over one month.
pub fn interest_on(balance: Money, monthly_rate: Rate) -> Money {
    balance * monthly_rate
}

/// Level payment that fully amortizes `balance` at `monthly_rate` over
/// `months`. Zero-rate loans degrade to straight principal division.
pub fn annuity_payment(
    balance: Money,
    monthly_rate: Rate,
    months: u32,
) -> MortgageEngineResult<Money> {
    if months == 0 {
        return Err(MortgageEngineError::DivisionByZero {
            context: "annuity payment over zero remaining months".into(),
        });
    }
    if monthly_rate.is_zero() {
        return Ok(balance / Decimal::from(months));
    }

    let factor = (Decimal::ONE + monthly_rate).powd(Decimal::from(months));
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(MortgageEngineError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }
    Ok(balance * monthly_rate * factor / denom)
}

/// Constant principal installment over the remaining months.
pub fn equal_principal_installment(balance: Money, months: u32) -> MortgageEngineResult<Money> {
    if months == 0 {
        return Err(MortgageEngineError::DivisionByZero {
            context: "principal installment over zero remaining months".into(),
        });
    }
    Ok(balance / Decimal::from(months))
}

/// Payment due this month for a method, given the remaining months.
///
/// For bullet loans the final month (`months == 1`) carries the full balance
/// on top of interest.
pub fn periodic_payment(
    method: RepaymentMethod,
    balance: Money,
    monthly_rate: Rate,
    months: u32,
) -> MortgageEngineResult<Money> {
    match method {
        RepaymentMethod::Annuity => annuity_payment(balance, monthly_rate, months),
        RepaymentMethod::EqualPrincipal => {
            let installment = equal_principal_installment(balance, months)?;
            Ok(installment + interest_on(balance, monthly_rate))
        }
        RepaymentMethod::Bullet => {
            if months == 0 {
                return Err(MortgageEngineError::DivisionByZero {
                    context: "bullet payment over zero remaining months".into(),
                });
            }
            let interest = interest_on(balance, monthly_rate);
            if months == 1 {
                Ok(interest + balance)
            } else {
                Ok(interest)
            }
        }
    }
}

/// Monthly growth factor equivalent to an annual index rate compounded
/// monthly: (1 + annual)^(1/12) - 1, solved as the twelfth root of the
/// annual factor so the result is pure Decimal arithmetic.
pub fn monthly_growth_factor(annual_index_rate: Rate) -> Rate {
    if annual_index_rate.is_zero() {
        return Decimal::ZERO;
    }
    twelfth_root(Decimal::ONE + annual_index_rate) - Decimal::ONE
}

/// Twelfth root of x via Newton's method: g_{k+1} = g_k - (g_k^12 - x) / (12 g_k^11).
///
/// Inputs are annual index factors close to 1, so a guess of 1 converges in a
/// handful of iterations.
fn twelfth_root(x: Decimal) -> Decimal {
    if x == Decimal::ONE || x == Decimal::ZERO {
        return x;
    }

    let mut guess = Decimal::ONE;
    for _ in 0..40 {
        let g11 = int_pow(guess, 11);
        if g11.is_zero() {
            break;
        }
        let g12 = g11 * guess;
        let delta = (g12 - x) / (dec!(12) * g11);
        guess -= delta;
        if delta.abs() < dec!(0.0000000000001) {
            break;
        }
    }
    guess
}

/// base^n for a small positive integer exponent via iterative multiplication.
fn int_pow(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}

//! Interest calculations.
//!
//! Pure integer arithmetic on basis-point rates. Every multiplication
//! happens before the division it feeds and every step is checked, so a
//! result is either exact-to-floor or an `ArithmeticOverflow` error.

use crate::error::LoanCoreError;
use crate::types::{
    InterestMode, LoanRecord, BASIS_POINTS, DAILY_RATE_SCALE, SECONDS_IN_YEAR,
};

fn mul(a: i128, b: i128) -> Result<i128, LoanCoreError> {
    a.checked_mul(b).ok_or(LoanCoreError::ArithmeticOverflow)
}

fn div(a: i128, b: i128) -> Result<i128, LoanCoreError> {
    a.checked_div(b).ok_or(LoanCoreError::ArithmeticOverflow)
}

/// `amount × rate_bps / 10_000`, floored.
pub fn apply_bps(amount: i128, rate_bps: u32) -> Result<i128, LoanCoreError> {
    if amount < 0 {
        return Err(LoanCoreError::ArithmeticOverflow);
    }
    div(mul(amount, rate_bps as i128)?, BASIS_POINTS)
}

/// Whole-term interest: the rate already covers the full loan term.
pub fn simple_interest(principal: i128, rate_bps: u32) -> Result<i128, LoanCoreError> {
    apply_bps(principal, rate_bps)
}

/// Interest accrued on `balance` between `last_accrual` and `now`, treating
/// `annual_rate_bps` as an APR. Accrual stops at the due date
/// (`start + duration_secs`).
pub fn prorated_interest(
    balance: i128,
    annual_rate_bps: u32,
    duration_secs: u64,
    start: u64,
    last_accrual: u64,
    now: u64,
) -> Result<i128, LoanCoreError> {
    if duration_secs == 0 {
        return Err(LoanCoreError::ZeroDuration);
    }
    if now < last_accrual {
        return Err(LoanCoreError::InvalidTimestamp);
    }
    if balance < 0 {
        return Err(LoanCoreError::ArithmeticOverflow);
    }

    let due = start
        .checked_add(duration_secs)
        .ok_or(LoanCoreError::ArithmeticOverflow)?;
    let accrue_until = now.min(due);
    if accrue_until <= last_accrual {
        return Ok(0);
    }
    let elapsed = (accrue_until - last_accrual) as i128;

    let numerator = mul(mul(balance, annual_rate_bps as i128)?, elapsed)?;
    let denominator = mul(BASIS_POINTS, SECONDS_IN_YEAR as i128)?;
    div(numerator, denominator)
}

/// Interest per day on `principal` at an annual rate, scaled by
/// `DAILY_RATE_SCALE`. Comparison only; never used for settlement.
pub fn daily_rate(principal: i128, annual_rate_bps: u32) -> Result<i128, LoanCoreError> {
    if principal < 0 {
        return Err(LoanCoreError::ArithmeticOverflow);
    }
    let numerator = mul(mul(principal, annual_rate_bps as i128)?, DAILY_RATE_SCALE)?;
    div(numerator, mul(BASIS_POINTS, 365)?)
}

/// Interest owed on a loan record at `now`, per its interest mode.
pub fn interest_due(loan: &LoanRecord, now: u64) -> Result<i128, LoanCoreError> {
    match loan.terms.interest_mode {
        InterestMode::FullTerm => simple_interest(loan.balance, loan.terms.interest_rate_bps),
        InterestMode::Prorated => prorated_interest(
            loan.balance,
            loan.terms.interest_rate_bps,
            loan.terms.duration_secs,
            loan.start_date,
            loan.last_accrual_timestamp,
            now,
        ),
    }
}

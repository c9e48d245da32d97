//! Settlement amounts for rollovers and refinances.
//!
//! Closing a loan and opening its successor on the same collateral only
//! moves the net difference between the parties. These functions decide
//! that difference; the contract performs the transfers.

use crate::error::LoanCoreError;
use crate::interest::apply_bps;
use crate::types::{
    RepaySettlement, RolloverAmounts, BASIS_POINTS, MIN_INTEREST_IMPROVEMENT_BPS, MIN_REFINANCE_COOLDOWN,
};

fn add(a: i128, b: i128) -> Result<i128, LoanCoreError> {
    a.checked_add(b).ok_or(LoanCoreError::ArithmeticOverflow)
}

fn sub(a: i128, b: i128) -> Result<i128, LoanCoreError> {
    a.checked_sub(b).ok_or(LoanCoreError::ArithmeticOverflow)
}

/// Split a full repayment of `balance` plus `interest` between the lender
/// and the protocol.
pub fn repay_settlement(
    balance: i128,
    interest: i128,
    interest_fee_bps: u32,
    principal_fee_bps: u32,
) -> Result<RepaySettlement, LoanCoreError> {
    let amount_from_payer = add(balance, interest)?;
    let protocol_fee = add(
        apply_bps(interest, interest_fee_bps)?,
        apply_bps(balance, principal_fee_bps)?,
    )?;
    Ok(RepaySettlement {
        interest,
        amount_from_payer,
        amount_to_lender: sub(amount_from_payer, protocol_fee)?,
        protocol_fee,
    })
}

/// Net amounts for replacing a loan of `old_balance` (plus `old_interest`
/// owed) with a new loan of `new_principal`.
///
/// * `borrower_fee_bps` / `lender_fee_bps` – rollover fees charged on the new
///   principal.
/// * `interest_fee_bps` – protocol share of the old loan's interest, from the
///   old loan's fee snapshot.
///
/// When the new lender is the old lender, what the lender owes for the new
/// loan and what it is owed for the old one are netted into a single
/// transfer.
pub fn rollover_amounts(
    old_balance: i128,
    old_interest: i128,
    new_principal: i128,
    same_lender: bool,
    borrower_fee_bps: u32,
    lender_fee_bps: u32,
    interest_fee_bps: u32,
) -> Result<RolloverAmounts, LoanCoreError> {
    if new_principal <= 0 {
        return Err(LoanCoreError::ZeroAmount);
    }
    if old_balance < 0 || old_interest < 0 {
        return Err(LoanCoreError::InvalidTerms);
    }

    let repay_amount = add(old_balance, old_interest)?;
    let borrower_fee = apply_bps(new_principal, borrower_fee_bps)?;
    let lender_fee = apply_bps(new_principal, lender_fee_bps)?;
    let interest_fee = apply_bps(old_interest, interest_fee_bps)?;

    let borrower_owed = sub(new_principal, borrower_fee)?;
    let lender_funding = add(new_principal, lender_fee)?;
    let old_lender_due = sub(repay_amount, interest_fee)?;

    let mut amounts = RolloverAmounts {
        interest_fee,
        fee: add(add(borrower_fee, lender_fee)?, interest_fee)?,
        ..Default::default()
    };

    if repay_amount > borrower_owed {
        amounts.need_from_borrower = repay_amount - borrower_owed;
    } else {
        amounts.leftover_principal = sub(lender_funding, repay_amount)?;
        amounts.amount_to_borrower = borrower_owed - repay_amount;
    }

    if same_lender {
        if lender_funding >= old_lender_due {
            amounts.amount_from_lender = lender_funding - old_lender_due;
        } else {
            amounts.amount_to_lender = old_lender_due - lender_funding;
        }
    } else {
        amounts.amount_from_lender = lender_funding;
        amounts.amount_to_old_lender = old_lender_due;
    }

    check_invariants(&amounts)?;
    Ok(amounts)
}

/// Refinance settlement: always a lender change, and the borrower never
/// receives funds since the principal cannot grow.
pub fn refinance_amounts(
    old_balance: i128,
    old_interest: i128,
    new_principal: i128,
    borrower_fee_bps: u32,
    lender_fee_bps: u32,
    interest_fee_bps: u32,
) -> Result<RolloverAmounts, LoanCoreError> {
    if new_principal > old_balance {
        return Err(LoanCoreError::PrincipalIncrease);
    }
    let amounts = rollover_amounts(
        old_balance,
        old_interest,
        new_principal,
        false,
        borrower_fee_bps,
        lender_fee_bps,
        interest_fee_bps,
    )?;
    if amounts.amount_to_borrower > 0 {
        return Err(LoanCoreError::PrincipalIncrease);
    }
    Ok(amounts)
}

/// Inflows must equal outflows plus retained fees, no field may be
/// negative, and a borrower top-up excludes any payout to the borrower.
pub fn check_invariants(a: &RolloverAmounts) -> Result<(), LoanCoreError> {
    let fields = [
        a.amount_from_lender,
        a.need_from_borrower,
        a.leftover_principal,
        a.amount_to_old_lender,
        a.amount_to_lender,
        a.amount_to_borrower,
        a.interest_fee,
        a.fee,
    ];
    if fields.iter().any(|v| *v < 0) {
        return Err(LoanCoreError::ArithmeticOverflow);
    }
    if a.need_from_borrower > 0 && (a.leftover_principal > 0 || a.amount_to_borrower > 0) {
        return Err(LoanCoreError::ArithmeticOverflow);
    }

    let inflow = add(a.amount_from_lender, a.need_from_borrower)?;
    let outflow = add(
        add(add(a.amount_to_old_lender, a.amount_to_lender)?, a.amount_to_borrower)?,
        a.fee,
    )?;
    if inflow != outflow {
        return Err(LoanCoreError::ArithmeticOverflow);
    }
    Ok(())
}

/// The new rate must sit at least `MIN_INTEREST_IMPROVEMENT_BPS` (relative)
/// below the old one.
pub fn validate_rate_improvement(old_rate_bps: u32, new_rate_bps: u32) -> Result<(), LoanCoreError> {
    let basis = BASIS_POINTS as u64;
    let required = old_rate_bps as u64 * (basis - MIN_INTEREST_IMPROVEMENT_BPS as u64);
    if new_rate_bps as u64 * basis > required {
        return Err(LoanCoreError::InsufficientRateImprovement);
    }
    Ok(())
}

pub fn validate_refinance_window(start_date: u64, now: u64) -> Result<(), LoanCoreError> {
    let open_at = start_date
        .checked_add(MIN_REFINANCE_COOLDOWN)
        .ok_or(LoanCoreError::ArithmeticOverflow)?;
    if now < open_at {
        return Err(LoanCoreError::RefinanceCooldown);
    }
    Ok(())
}

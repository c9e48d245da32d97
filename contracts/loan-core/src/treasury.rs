//! Protocol fee accounting.
//!
//! Fees stay in the contract's own token balance; these entries only track
//! who may withdraw how much, per currency. Default fees are recorded for
//! reporting and never withdrawn since a claim moves collateral, not
//! currency.

use soroban_sdk::{Address, Env, Symbol};

use crate::error::LoanCoreError;
use crate::interest::apply_bps;
use crate::storage::{self, DataKey};
use crate::types::{AffiliateSplit, MAX_AFFILIATE_SPLIT_BPS};

fn balance(env: &Env, key: &DataKey) -> i128 {
    env.storage().persistent().get(key).unwrap_or(0)
}

fn add_to(env: &Env, key: &DataKey, amount: i128) -> Result<(), LoanCoreError> {
    let next = balance(env, key)
        .checked_add(amount)
        .ok_or(LoanCoreError::ArithmeticOverflow)?;
    storage::write_persistent(env, key, &next);
    Ok(())
}

pub fn protocol_balance(env: &Env, currency: &Address) -> i128 {
    balance(env, &DataKey::ProtocolFees(currency.clone()))
}

pub fn affiliate_balance(env: &Env, affiliate: &Address, currency: &Address) -> i128 {
    balance(
        env,
        &DataKey::AffiliateFees(affiliate.clone(), currency.clone()),
    )
}

pub fn default_fees(env: &Env, currency: &Address) -> i128 {
    balance(env, &DataKey::DefaultFees(currency.clone()))
}

pub fn split(env: &Env, code: &Symbol) -> Option<AffiliateSplit> {
    env.storage()
        .persistent()
        .get(&DataKey::AffiliateSplit(code.clone()))
}

pub fn set_split(
    env: &Env,
    code: &Symbol,
    affiliate: &Address,
    split_bps: u32,
) -> Result<AffiliateSplit, LoanCoreError> {
    if split_bps > MAX_AFFILIATE_SPLIT_BPS {
        return Err(LoanCoreError::InvalidSplit);
    }
    let entry = AffiliateSplit {
        affiliate: affiliate.clone(),
        split_bps,
    };
    storage::write_persistent(env, &DataKey::AffiliateSplit(code.clone()), &entry);
    Ok(entry)
}

/// Credit a collected fee, routing the affiliate's share when the loan
/// carries a code with a configured split.
pub fn credit_fee(
    env: &Env,
    currency: &Address,
    amount: i128,
    affiliate_code: &Option<Symbol>,
) -> Result<(), LoanCoreError> {
    if amount == 0 {
        return Ok(());
    }
    let mut protocol_share = amount;
    if let Some(entry) = affiliate_code.as_ref().and_then(|code| split(env, code)) {
        let affiliate_share = apply_bps(amount, entry.split_bps)?;
        if affiliate_share > 0 {
            add_to(
                env,
                &DataKey::AffiliateFees(entry.affiliate, currency.clone()),
                affiliate_share,
            )?;
            protocol_share -= affiliate_share;
        }
    }
    add_to(env, &DataKey::ProtocolFees(currency.clone()), protocol_share)
}

pub fn credit_default_fee(env: &Env, currency: &Address, amount: i128) -> Result<(), LoanCoreError> {
    if amount == 0 {
        return Ok(());
    }
    add_to(env, &DataKey::DefaultFees(currency.clone()), amount)
}

pub fn debit_protocol(env: &Env, currency: &Address, amount: i128) -> Result<(), LoanCoreError> {
    if amount <= 0 {
        return Err(LoanCoreError::ZeroAmount);
    }
    let key = DataKey::ProtocolFees(currency.clone());
    let available = balance(env, &key);
    if amount > available {
        return Err(LoanCoreError::InsufficientFees);
    }
    storage::write_persistent(env, &key, &(available - amount));
    Ok(())
}

/// Zero the affiliate's balance and return what it held.
pub fn take_affiliate_balance(
    env: &Env,
    affiliate: &Address,
    currency: &Address,
) -> Result<i128, LoanCoreError> {
    let key = DataKey::AffiliateFees(affiliate.clone(), currency.clone());
    let owed = balance(env, &key);
    if owed <= 0 {
        return Err(LoanCoreError::InsufficientFees);
    }
    env.storage().persistent().remove(&key);
    Ok(owed)
}

//! Storage keys and typed accessors.
//!
//! Configuration and the loan counter live in instance storage; every
//! per-loan, per-party or per-currency entry is persistent and has its TTL
//! extended whenever it is written. Entries that live as long as a loan
//! (record, notes, lock, receipt) are also extended when read, so a loan
//! longer than one bump period stays live while it is in use.

use soroban_sdk::{contracttype, Address, BytesN, Env, Symbol, TryFromVal, Val};

use crate::error::LoanCoreError;
use crate::types::{
    LoanRecord, Role, INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT,
    PERSISTENT_LIFETIME_THRESHOLD,
};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    // instance
    Admin,
    FeeController,
    NextLoanId,
    Paused,
    Entered,
    // persistent
    Loan(u64),
    CollateralLock(BytesN<32>),
    BorrowerNote(u64),
    LenderNote(u64),
    NoteReceipt(u64),
    Nonce(Address, u64),
    Role(Role, Address),
    ProtocolFees(Address),
    AffiliateFees(Address, Address),
    AffiliateSplit(Symbol),
    DefaultFees(Address),
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

pub fn write_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

/// Read a persistent entry, extending its TTL when present.
pub fn read_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: TryFromVal<Env, Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

pub fn has_persistent(env: &Env, key: &DataKey) -> bool {
    let present = env.storage().persistent().has(key);
    if present {
        bump_persistent(env, key);
    }
    present
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn require_initialized(env: &Env) -> Result<(), LoanCoreError> {
    if !is_initialized(env) {
        return Err(LoanCoreError::NotInitialized);
    }
    bump_instance(env);
    Ok(())
}

pub fn fee_controller(env: &Env) -> Result<Address, LoanCoreError> {
    env.storage()
        .instance()
        .get(&DataKey::FeeController)
        .ok_or(LoanCoreError::NotInitialized)
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
}

/// Reserve the next loan id. Ids start at 1.
pub fn next_loan_id(env: &Env) -> Result<u64, LoanCoreError> {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextLoanId)
        .unwrap_or(1);
    let next = id.checked_add(1).ok_or(LoanCoreError::ArithmeticOverflow)?;
    env.storage().instance().set(&DataKey::NextLoanId, &next);
    Ok(id)
}

pub fn load_loan(env: &Env, loan_id: u64) -> Result<LoanRecord, LoanCoreError> {
    try_load_loan(env, loan_id).ok_or(LoanCoreError::LoanNotFound)
}

pub fn try_load_loan(env: &Env, loan_id: u64) -> Option<LoanRecord> {
    read_persistent(env, &DataKey::Loan(loan_id))
}

pub fn save_loan(env: &Env, loan: &LoanRecord) {
    write_persistent(env, &DataKey::Loan(loan.id), loan);
}

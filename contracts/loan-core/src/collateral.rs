//! Collateral locks.
//!
//! A `(asset, token_id)` pair backs at most one active loan. The lock key is
//! the SHA-256 of the pair's XDR encoding, so the same unit always maps to
//! the same key whatever loan references it.

use soroban_sdk::{xdr::ToXdr, BytesN, Env};

use crate::error::LoanCoreError;
use crate::storage::{self, DataKey};
use crate::types::Collateral;

pub fn key(env: &Env, collateral: &Collateral) -> BytesN<32> {
    let encoded = (collateral.asset.clone(), collateral.token_id).to_xdr(env);
    env.crypto().sha256(&encoded).into()
}

pub fn is_locked(env: &Env, key: &BytesN<32>) -> bool {
    storage::has_persistent(env, &DataKey::CollateralLock(key.clone()))
}

pub fn acquire(env: &Env, key: &BytesN<32>) -> Result<(), LoanCoreError> {
    if is_locked(env, key) {
        return Err(LoanCoreError::CollateralInUse);
    }
    storage::write_persistent(env, &DataKey::CollateralLock(key.clone()), &true);
    Ok(())
}

/// Release is a no-op when the key is not held.
pub fn release(env: &Env, key: &BytesN<32>) {
    env.storage()
        .persistent()
        .remove(&DataKey::CollateralLock(key.clone()));
}

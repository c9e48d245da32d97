//! Per-party signature nonces with a bounded number of uses.
//!
//! The first consumption fixes `max_uses` for the `(party, nonce)` pair;
//! any later `max_uses` argument is ignored.

use soroban_sdk::{Address, Env};

use crate::error::LoanCoreError;
use crate::storage::{self, DataKey};
use crate::types::NonceUsage;

pub fn usage(env: &Env, party: &Address, nonce: u64) -> Option<NonceUsage> {
    env.storage()
        .persistent()
        .get(&DataKey::Nonce(party.clone(), nonce))
}

pub fn is_used(env: &Env, party: &Address, nonce: u64) -> bool {
    usage(env, party, nonce).is_some_and(|u| u.uses >= u.max_uses)
}

pub fn consume(
    env: &Env,
    party: &Address,
    nonce: u64,
    max_uses: u32,
) -> Result<NonceUsage, LoanCoreError> {
    let key = DataKey::Nonce(party.clone(), nonce);
    let next = match env.storage().persistent().get::<_, NonceUsage>(&key) {
        Some(current) if current.uses >= current.max_uses => {
            return Err(LoanCoreError::NonceExhausted);
        }
        Some(current) => NonceUsage {
            uses: current.uses + 1,
            max_uses: current.max_uses,
        },
        None if max_uses == 0 => return Err(LoanCoreError::ZeroAmount),
        None => NonceUsage { uses: 1, max_uses },
    };
    storage::write_persistent(env, &key, &next);
    Ok(next)
}

/// Exhaust a nonce so it can never be consumed again.
pub fn cancel(env: &Env, party: &Address, nonce: u64) -> Result<NonceUsage, LoanCoreError> {
    let key = DataKey::Nonce(party.clone(), nonce);
    let cancelled = match env.storage().persistent().get::<_, NonceUsage>(&key) {
        Some(current) if current.uses >= current.max_uses => {
            return Err(LoanCoreError::NonceUsed);
        }
        Some(current) => NonceUsage {
            uses: current.max_uses,
            max_uses: current.max_uses,
        },
        None => NonceUsage {
            uses: 1,
            max_uses: 1,
        },
    };
    storage::write_persistent(env, &key, &cancelled);
    Ok(cancelled)
}

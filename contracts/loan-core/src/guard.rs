//! Scoped reentrancy guard.
//!
//! Holding a `ReentrancyGuard` marks the contract busy in instance storage;
//! the mark is cleared when the guard drops, on every return path. A call
//! that fails is rolled back wholesale, so the mark never outlives it.

use soroban_sdk::Env;

use crate::error::LoanCoreError;
use crate::storage::DataKey;

pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    pub fn enter(env: &'a Env) -> Result<Self, LoanCoreError> {
        if env.storage().instance().has(&DataKey::Entered) {
            return Err(LoanCoreError::Reentrancy);
        }
        env.storage().instance().set(&DataKey::Entered, &true);
        Ok(Self { env })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&DataKey::Entered);
    }
}

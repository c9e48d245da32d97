//! Role membership. Every gated entry point names the role it needs;
//! holding `Admin` does not imply any other role.

use soroban_sdk::{Address, Env};

use crate::error::LoanCoreError;
use crate::storage::{self, DataKey};
use crate::types::Role;

pub fn has(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Role(role, account.clone()))
        .unwrap_or(false)
}

pub fn require(env: &Env, role: Role, account: &Address) -> Result<(), LoanCoreError> {
    if !has(env, role, account) {
        return Err(LoanCoreError::Unauthorized);
    }
    Ok(())
}

pub fn grant(env: &Env, role: Role, account: &Address) {
    storage::write_persistent(env, &DataKey::Role(role, account.clone()), &true);
}

pub fn revoke(env: &Env, role: Role, account: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Role(role, account.clone()));
}

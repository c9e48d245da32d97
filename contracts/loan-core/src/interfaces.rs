//! Contracts the loan core calls into.

use soroban_sdk::{contractclient, Address, Env};

use crate::types::FeeSnapshot;

/// Source of the current protocol fee rates.
#[contractclient(name = "FeeSourceClient")]
pub trait FeeSource {
    fn get_snapshot(env: Env) -> FeeSnapshot;
}

/// Collateral contract holding the pledged units. `transfer` must require
/// `from` to authorize and fail if `from` does not own `token_id`.
#[contractclient(name = "CollateralClient")]
pub trait CollateralInterface {
    fn transfer(env: Env, from: Address, to: Address, token_id: u64);
}

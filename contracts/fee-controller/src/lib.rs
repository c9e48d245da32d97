//! Fee Controller Contract
//!
//! Versioned table of named protocol fees, each stored in basis points and
//! bounded by a ceiling fixed at initialization. The loan core reads a full
//! `FeeSnapshot` when a loan starts so later rate changes never reach
//! existing loans.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env,
};

/// Absolute upper bound for any fee (100%).
pub const BASIS_POINTS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FeeControllerError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    RateExceedsMax = 3,
}

/// Fee identifiers. Borrower fees are charged on principal paid out to the
/// borrower, lender fees on the amounts the lender funds or receives.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeeId {
    BorrowerOrigination = 0,
    LenderOrigination = 1,
    BorrowerRollover = 2,
    LenderRollover = 3,
    LenderInterest = 4,
    LenderPrincipal = 5,
    LenderDefault = 6,
}

/// Every fee rate in one struct. Also used to pass the ceilings at
/// initialization.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FeeSnapshot {
    pub borrower_origination_fee: u32,
    pub lender_origination_fee: u32,
    pub borrower_rollover_fee: u32,
    pub lender_rollover_fee: u32,
    pub lender_interest_fee: u32,
    pub lender_principal_fee: u32,
    pub lender_default_fee: u32,
}

impl FeeSnapshot {
    pub fn get(&self, fee: FeeId) -> u32 {
        match fee {
            FeeId::BorrowerOrigination => self.borrower_origination_fee,
            FeeId::LenderOrigination => self.lender_origination_fee,
            FeeId::BorrowerRollover => self.borrower_rollover_fee,
            FeeId::LenderRollover => self.lender_rollover_fee,
            FeeId::LenderInterest => self.lender_interest_fee,
            FeeId::LenderPrincipal => self.lender_principal_fee,
            FeeId::LenderDefault => self.lender_default_fee,
        }
    }

    fn set(&mut self, fee: FeeId, rate: u32) {
        match fee {
            FeeId::BorrowerOrigination => self.borrower_origination_fee = rate,
            FeeId::LenderOrigination => self.lender_origination_fee = rate,
            FeeId::BorrowerRollover => self.borrower_rollover_fee = rate,
            FeeId::LenderRollover => self.lender_rollover_fee = rate,
            FeeId::LenderInterest => self.lender_interest_fee = rate,
            FeeId::LenderPrincipal => self.lender_principal_fee = rate,
            FeeId::LenderDefault => self.lender_default_fee = rate,
        }
    }
}

/// Emitted on every successful `set_fee`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeUpdatedEvent {
    pub fee: FeeId,
    pub old_rate: u32,
    pub new_rate: u32,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct FeeController;

fn load_admin(env: &Env) -> Result<Address, FeeControllerError> {
    env.storage()
        .instance()
        .get(&symbol_short!("admin"))
        .ok_or(FeeControllerError::NotInitialized)
}

fn load_table(env: &Env, key: soroban_sdk::Symbol) -> FeeSnapshot {
    env.storage().instance().get(&key).unwrap_or_default()
}

#[contractimpl]
impl FeeController {
    /// Initialize with the fee administrator and the per-fee ceilings.
    ///
    /// A zero ceiling means no cap was configured for that fee; the
    /// absolute bound of 10_000 bps still applies. All rates start at zero.
    pub fn initialize(
        env: Env,
        admin: Address,
        max_fees: FeeSnapshot,
    ) -> Result<(), FeeControllerError> {
        if env.storage().instance().has(&symbol_short!("admin")) {
            return Err(FeeControllerError::AlreadyInitialized);
        }

        env.storage()
            .instance()
            .set(&symbol_short!("admin"), &admin);
        env.storage()
            .instance()
            .set(&symbol_short!("max_fees"), &max_fees);
        env.storage()
            .instance()
            .set(&symbol_short!("fees"), &FeeSnapshot::default());

        env.events()
            .publish((symbol_short!("fee"), symbol_short!("init")), (admin,));

        Ok(())
    }

    /// Update a single fee rate (admin only).
    pub fn set_fee(env: Env, fee: FeeId, rate: u32) -> Result<(), FeeControllerError> {
        let admin = load_admin(&env)?;
        admin.require_auth();

        let ceiling = match load_table(&env, symbol_short!("max_fees")).get(fee) {
            0 => BASIS_POINTS,
            max => max.min(BASIS_POINTS),
        };
        if rate > ceiling {
            return Err(FeeControllerError::RateExceedsMax);
        }

        let mut fees = load_table(&env, symbol_short!("fees"));
        let old_rate = fees.get(fee);
        fees.set(fee, rate);
        env.storage().instance().set(&symbol_short!("fees"), &fees);

        env.events().publish(
            (symbol_short!("fee"), symbol_short!("fee_upd")),
            FeeUpdatedEvent {
                fee,
                old_rate,
                new_rate: rate,
            },
        );

        Ok(())
    }

    /// Hand the fee administrator role to a new address.
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), FeeControllerError> {
        let admin = load_admin(&env)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&symbol_short!("admin"), &new_admin);

        env.events().publish(
            (symbol_short!("fee"), symbol_short!("adm_upd")),
            (admin, new_admin),
        );

        Ok(())
    }

    pub fn get_fee(env: Env, fee: FeeId) -> u32 {
        load_table(&env, symbol_short!("fees")).get(fee)
    }

    pub fn get_max_fee(env: Env, fee: FeeId) -> u32 {
        load_table(&env, symbol_short!("max_fees")).get(fee)
    }

    /// Full set of current rates, embedded into new loans.
    pub fn get_snapshot(env: Env) -> FeeSnapshot {
        load_table(&env, symbol_short!("fees"))
    }

    pub fn admin(env: Env) -> Option<Address> {
        env.storage().instance().get(&symbol_short!("admin"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

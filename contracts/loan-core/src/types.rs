//! Core data types and protocol constants for the loan core.

use soroban_sdk::{contracttype, Address, Symbol};

/// Denominator for every basis-point rate.
pub const BASIS_POINTS: i128 = 10_000;
/// 365 days. Prorated interest treats rates as annual over this period.
pub const SECONDS_IN_YEAR: u64 = 31_536_000;
pub const SECONDS_IN_DAY: u64 = 86_400;
/// Scale applied to `daily_rate` so sub-unit daily interest still compares.
pub const DAILY_RATE_SCALE: i128 = 1_000_000;

pub const MIN_LOAN_DURATION: u64 = 3_600;
pub const MAX_LOAN_DURATION: u64 = 3 * SECONDS_IN_YEAR;
pub const MIN_INTEREST_RATE_BPS: u32 = 1;
pub const MAX_INTEREST_RATE_BPS: u32 = 1_000_000;

/// A loan must be this old before it can be refinanced.
pub const MIN_REFINANCE_COOLDOWN: u64 = 2 * SECONDS_IN_DAY;
/// Refinanced rate must be at least 10% (relative) below the old rate.
pub const MIN_INTEREST_IMPROVEMENT_BPS: u32 = 1_000;

pub const MAX_AFFILIATE_SPLIT_BPS: u32 = 5_000;

/// Persistent entry TTL management, in ledgers (~5s each).
pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const PERSISTENT_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoanState {
    DoesNotExist = 0,
    Active = 1,
    Repaid = 2,
    Defaulted = 3,
}

/// How the loan's rate is applied.
///
/// * `FullTerm` – the rate is the interest for the whole term, owed in full
///   whenever the loan closes.
/// * `Prorated` – the rate is an APR accrued per second up to the due date.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InterestMode {
    FullTerm = 0,
    Prorated = 1,
}

/// A pledged collateral unit: an NFT or a vault id on a collateral contract.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Collateral {
    pub asset: Address,
    pub token_id: u64,
}

/// Agreed loan terms. Immutable once the loan starts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanTerms {
    pub principal: i128,
    pub interest_rate_bps: u32,
    pub duration_secs: u64,
    pub collateral: Collateral,
    pub payable_currency: Address,
    /// Last ledger timestamp at which the terms may be used to start a loan.
    pub deadline: u64,
    pub affiliate_code: Option<Symbol>,
    pub interest_mode: InterestMode,
}

/// Fee rates captured at loan start.
///
/// Field names mirror the fee controller's snapshot exactly; the struct is
/// decoded straight from its cross-contract return value.
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

/// Stored loan. Borrower and lender are whoever holds the loan's notes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanRecord {
    pub id: u64,
    pub terms: LoanTerms,
    pub fee_snapshot: FeeSnapshot,
    pub state: LoanState,
    pub start_date: u64,
    /// Outstanding principal.
    pub balance: i128,
    pub last_accrual_timestamp: u64,
    pub interest_paid: i128,
}

impl LoanRecord {
    pub fn due_date(&self) -> Option<u64> {
        self.start_date.checked_add(self.terms.duration_secs)
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NonceUsage {
    pub uses: u32,
    pub max_uses: u32,
}

/// A counterparty signature nonce to consume as part of an origination.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignerNonce {
    pub party: Address,
    pub nonce: u64,
    pub max_uses: u32,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoteKind {
    Borrower = 0,
    Lender = 1,
}

/// Funds held for the lender note holder after a force repay.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteReceipt {
    pub currency: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AffiliateSplit {
    pub affiliate: Address,
    pub split_bps: u32,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Admin = 0,
    Originator = 1,
    FeeClaimer = 2,
    AffiliateManager = 3,
    Pauser = 4,
}

/// Amounts moved by a repayment.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RepaySettlement {
    pub interest: i128,
    pub amount_from_payer: i128,
    pub amount_to_lender: i128,
    pub protocol_fee: i128,
}

/// Net movements for closing one loan and opening its successor on the same
/// collateral.
///
/// `need_from_borrower` is mutually exclusive with both `leftover_principal`
/// and `amount_to_borrower`. Inflows (`amount_from_lender`,
/// `need_from_borrower`) always equal outflows (`amount_to_old_lender`,
/// `amount_to_lender`, `amount_to_borrower`) plus `fee`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RolloverAmounts {
    pub amount_from_lender: i128,
    pub need_from_borrower: i128,
    pub leftover_principal: i128,
    pub amount_to_old_lender: i128,
    pub amount_to_lender: i128,
    pub amount_to_borrower: i128,
    /// Part of `fee` taken from the old lender's interest.
    pub interest_fee: i128,
    /// Total retained by the protocol.
    pub fee: i128,
}

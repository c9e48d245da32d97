//! Event payloads and publishers.
//!
//! Topics are `(domain, action)` short symbols; the payload is one of the
//! structs below so indexers can decode it without positional guessing.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::{Collateral, NoteKind, RepaySettlement, Role, RolloverAmounts};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanStartedEvent {
    pub loan_id: u64,
    pub lender: Address,
    pub borrower: Address,
    pub principal: i128,
    pub collateral: Collateral,
    pub currency: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanRepaidEvent {
    pub loan_id: u64,
    pub payer: Address,
    pub settlement: RepaySettlement,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanClaimedEvent {
    pub loan_id: u64,
    pub lender: Address,
    pub default_fee: i128,
}

/// Shared by rollovers and refinances.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanReplacedEvent {
    pub old_loan_id: u64,
    pub new_loan_id: u64,
    pub amounts: RolloverAmounts,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteRedeemedEvent {
    pub loan_id: u64,
    pub recipient: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteTransferredEvent {
    pub loan_id: u64,
    pub kind: NoteKind,
    pub from: Address,
    pub to: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NonceEvent {
    pub party: Address,
    pub nonce: u64,
    pub uses: u32,
    pub max_uses: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeesWithdrawnEvent {
    pub currency: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AffiliateSplitEvent {
    pub code: Symbol,
    pub affiliate: Address,
    pub split_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleEvent {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

pub fn publish_loan_started(env: &Env, event: LoanStartedEvent) {
    env.events()
        .publish((symbol_short!("loan"), symbol_short!("started")), event);
}

/// `force` selects the force-repay topic.
pub fn publish_loan_repaid(env: &Env, force: bool, event: LoanRepaidEvent) {
    let action = if force {
        symbol_short!("frc_rpy")
    } else {
        symbol_short!("repaid")
    };
    env.events().publish((symbol_short!("loan"), action), event);
}

pub fn publish_loan_claimed(env: &Env, event: LoanClaimedEvent) {
    env.events()
        .publish((symbol_short!("loan"), symbol_short!("claimed")), event);
}

pub fn publish_loan_rolled(env: &Env, event: LoanReplacedEvent) {
    env.events()
        .publish((symbol_short!("loan"), symbol_short!("rolled")), event);
}

pub fn publish_loan_refinanced(env: &Env, event: LoanReplacedEvent) {
    env.events()
        .publish((symbol_short!("loan"), symbol_short!("refi")), event);
}

pub fn publish_note_redeemed(env: &Env, event: NoteRedeemedEvent) {
    env.events()
        .publish((symbol_short!("note"), symbol_short!("redeem")), event);
}

pub fn publish_note_transferred(env: &Env, event: NoteTransferredEvent) {
    env.events()
        .publish((symbol_short!("note"), symbol_short!("xfer")), event);
}

pub fn publish_nonce_used(env: &Env, event: NonceEvent) {
    env.events()
        .publish((symbol_short!("nonce"), symbol_short!("used")), event);
}

pub fn publish_nonce_cancelled(env: &Env, event: NonceEvent) {
    env.events()
        .publish((symbol_short!("nonce"), symbol_short!("cancel")), event);
}

pub fn publish_fees_withdrawn(env: &Env, event: FeesWithdrawnEvent) {
    env.events()
        .publish((symbol_short!("fees"), symbol_short!("wdraw")), event);
}

pub fn publish_affiliate_withdrawn(env: &Env, event: FeesWithdrawnEvent) {
    env.events()
        .publish((symbol_short!("fees"), symbol_short!("aff_wd")), event);
}

pub fn publish_affiliate_split(env: &Env, event: AffiliateSplitEvent) {
    env.events()
        .publish((symbol_short!("fees"), symbol_short!("aff_set")), event);
}

pub fn publish_role_granted(env: &Env, event: RoleEvent) {
    env.events()
        .publish((symbol_short!("role"), symbol_short!("grant")), event);
}

pub fn publish_role_revoked(env: &Env, event: RoleEvent) {
    env.events()
        .publish((symbol_short!("role"), symbol_short!("revoke")), event);
}

pub fn publish_paused(env: &Env, paused: bool, by: Address) {
    let action = if paused {
        symbol_short!("paused")
    } else {
        symbol_short!("unpause")
    };
    env.events().publish((symbol_short!("core"), action), (by,));
}

//! Borrower and lender notes.
//!
//! Each loan has one borrower note and one lender note, minted together at
//! start. Whoever holds a note is the loan's borrower or lender for every
//! later operation, so moving a note moves the position.

use soroban_sdk::{Address, Env};

use crate::error::LoanCoreError;
use crate::storage::{self, DataKey};
use crate::types::NoteKind;

fn note_key(kind: NoteKind, loan_id: u64) -> DataKey {
    match kind {
        NoteKind::Borrower => DataKey::BorrowerNote(loan_id),
        NoteKind::Lender => DataKey::LenderNote(loan_id),
    }
}

pub fn owner_of(env: &Env, kind: NoteKind, loan_id: u64) -> Option<Address> {
    storage::read_persistent(env, &note_key(kind, loan_id))
}

/// Current holder, failing with `InvalidState` when the note was burned.
pub fn holder(env: &Env, kind: NoteKind, loan_id: u64) -> Result<Address, LoanCoreError> {
    owner_of(env, kind, loan_id).ok_or(LoanCoreError::InvalidState)
}

pub fn require_holder(
    env: &Env,
    kind: NoteKind,
    loan_id: u64,
    who: &Address,
) -> Result<(), LoanCoreError> {
    match owner_of(env, kind, loan_id) {
        Some(owner) if owner == *who => Ok(()),
        _ => Err(LoanCoreError::Unauthorized),
    }
}

pub fn mint(env: &Env, loan_id: u64, borrower: &Address, lender: &Address) {
    storage::write_persistent(env, &DataKey::BorrowerNote(loan_id), borrower);
    storage::write_persistent(env, &DataKey::LenderNote(loan_id), lender);
}

pub fn burn(env: &Env, kind: NoteKind, loan_id: u64) {
    env.storage().persistent().remove(&note_key(kind, loan_id));
}

pub fn burn_both(env: &Env, loan_id: u64) {
    burn(env, NoteKind::Borrower, loan_id);
    burn(env, NoteKind::Lender, loan_id);
}

pub fn transfer(
    env: &Env,
    kind: NoteKind,
    loan_id: u64,
    from: &Address,
    to: &Address,
) -> Result<(), LoanCoreError> {
    require_holder(env, kind, loan_id, from)?;
    storage::write_persistent(env, &note_key(kind, loan_id), to);
    Ok(())
}

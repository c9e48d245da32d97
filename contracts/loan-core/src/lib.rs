//! Loan Core Contract
//!
//! Lifecycle and settlement for peer-to-peer loans against locked
//! collateral. A loan starts `Active` and ends `Repaid` (repay, force repay,
//! rollover, refinance) or `Defaulted` (claim). Positions are represented by
//! a borrower note and a lender note held in this contract.
//!
//! Every mutating entry point follows the same order: reentrancy guard,
//! pause check, authorization, validation, all storage effects, then token
//! and collateral transfers. A failed transfer returns `TransferFailed` and
//! the host rolls back the whole call.

#![no_std]

mod collateral;
mod error;
mod events;
mod guard;
mod interest;
mod interfaces;
mod nonce;
mod notes;
mod roles;
mod settlement;
mod storage;
mod treasury;
mod types;

use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, Symbol};

pub use error::LoanCoreError;
pub use events::{
    AffiliateSplitEvent, FeesWithdrawnEvent, LoanClaimedEvent, LoanRepaidEvent, LoanReplacedEvent,
    LoanStartedEvent, NonceEvent, NoteRedeemedEvent, NoteTransferredEvent, RoleEvent,
};
pub use interfaces::{CollateralClient, CollateralInterface, FeeSource, FeeSourceClient};
pub use types::*;

use guard::ReentrancyGuard;
use storage::DataKey;

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn ensure_live(env: &Env) -> Result<(), LoanCoreError> {
    storage::require_initialized(env)?;
    if storage::is_paused(env) {
        return Err(LoanCoreError::Paused);
    }
    Ok(())
}

/// `require_auth` once per distinct address; the host rejects a second
/// authorization of the same address within one frame.
fn require_auth_each(parties: &[&Address]) {
    for (i, party) in parties.iter().enumerate() {
        if !parties[..i].contains(party) {
            party.require_auth();
        }
    }
}

fn require_active(env: &Env, loan: &LoanRecord) -> Result<(), LoanCoreError> {
    if loan.state != LoanState::Active {
        log!(env, "loan not active", loan.id, loan.state as u32);
        return Err(LoanCoreError::InvalidState);
    }
    Ok(())
}

fn validate_terms(env: &Env, terms: &LoanTerms, now: u64) -> Result<(), LoanCoreError> {
    if terms.principal <= 0 {
        return Err(LoanCoreError::ZeroAmount);
    }
    if terms.duration_secs < MIN_LOAN_DURATION || terms.duration_secs > MAX_LOAN_DURATION {
        log!(env, "duration out of range", terms.duration_secs);
        return Err(LoanCoreError::InvalidTerms);
    }
    if terms.interest_rate_bps < MIN_INTEREST_RATE_BPS
        || terms.interest_rate_bps > MAX_INTEREST_RATE_BPS
    {
        log!(env, "rate out of range", terms.interest_rate_bps);
        return Err(LoanCoreError::InvalidTerms);
    }
    if terms.deadline < now {
        log!(env, "terms expired", terms.deadline, now);
        return Err(LoanCoreError::TermsExpired);
    }
    Ok(())
}

/// A successor loan must pledge the same unit and pay out the same currency.
fn check_successor_terms(old: &LoanTerms, new: &LoanTerms) -> Result<(), LoanCoreError> {
    if old.collateral != new.collateral {
        return Err(LoanCoreError::CollateralMismatch);
    }
    if old.payable_currency != new.payable_currency {
        return Err(LoanCoreError::CurrencyMismatch);
    }
    Ok(())
}

fn current_fees(env: &Env) -> Result<FeeSnapshot, LoanCoreError> {
    let source = storage::fee_controller(env)?;
    Ok(FeeSourceClient::new(env, &source).get_snapshot())
}

fn consume_signer_nonce(env: &Env, signer_nonce: Option<SignerNonce>) -> Result<(), LoanCoreError> {
    if let Some(sn) = signer_nonce {
        let usage = nonce::consume(env, &sn.party, sn.nonce, sn.max_uses)?;
        events::publish_nonce_used(
            env,
            NonceEvent {
                party: sn.party,
                nonce: sn.nonce,
                uses: usage.uses,
                max_uses: usage.max_uses,
            },
        );
    }
    Ok(())
}

/// Write a fresh `Active` record and mint its notes.
fn open_loan(
    env: &Env,
    terms: &LoanTerms,
    fee_snapshot: FeeSnapshot,
    now: u64,
    borrower: &Address,
    lender: &Address,
) -> Result<u64, LoanCoreError> {
    let id = storage::next_loan_id(env)?;
    let loan = LoanRecord {
        id,
        terms: terms.clone(),
        fee_snapshot,
        state: LoanState::Active,
        start_date: now,
        balance: terms.principal,
        last_accrual_timestamp: now,
        interest_paid: 0,
    };
    storage::save_loan(env, &loan);
    notes::mint(env, id, borrower, lender);
    Ok(id)
}

/// Mark a loan fully repaid as of `now`.
fn close_repaid(env: &Env, loan: &mut LoanRecord, interest: i128, now: u64) -> Result<(), LoanCoreError> {
    loan.interest_paid = loan
        .interest_paid
        .checked_add(interest)
        .ok_or(LoanCoreError::ArithmeticOverflow)?;
    loan.balance = 0;
    loan.last_accrual_timestamp = now;
    loan.state = LoanState::Repaid;
    storage::save_loan(env, loan);
    Ok(())
}

fn move_currency(
    env: &Env,
    currency: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), LoanCoreError> {
    if amount == 0 {
        return Ok(());
    }
    match token::Client::new(env, currency).try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "currency transfer failed", from.clone(), to.clone(), amount);
            Err(LoanCoreError::TransferFailed)
        }
    }
}

fn move_collateral(
    env: &Env,
    collateral: &Collateral,
    from: &Address,
    to: &Address,
) -> Result<(), LoanCoreError> {
    match CollateralClient::new(env, &collateral.asset).try_transfer(from, to, &collateral.token_id)
    {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "collateral transfer failed", collateral.token_id);
            Err(LoanCoreError::TransferFailed)
        }
    }
}

/// Route the net movements of a rollover or refinance. Inflows first so the
/// contract never pays out funds it has not received.
fn settle_replacement(
    env: &Env,
    currency: &Address,
    borrower: &Address,
    new_lender: &Address,
    old_lender: &Address,
    amounts: &RolloverAmounts,
) -> Result<(), LoanCoreError> {
    let this = env.current_contract_address();
    move_currency(env, currency, new_lender, &this, amounts.amount_from_lender)?;
    move_currency(env, currency, borrower, &this, amounts.need_from_borrower)?;
    move_currency(env, currency, &this, old_lender, amounts.amount_to_old_lender)?;
    move_currency(env, currency, &this, new_lender, amounts.amount_to_lender)?;
    move_currency(env, currency, &this, borrower, amounts.amount_to_borrower)
}

/// Close `old` and open its successor on the same collateral. Effects only.
#[allow(clippy::too_many_arguments)]
fn replace_loan(
    env: &Env,
    old: &mut LoanRecord,
    old_interest: i128,
    new_terms: &LoanTerms,
    fees: FeeSnapshot,
    now: u64,
    borrower: &Address,
    new_lender: &Address,
    amounts: &RolloverAmounts,
) -> Result<u64, LoanCoreError> {
    close_repaid(env, old, old_interest, now)?;
    notes::burn_both(env, old.id);

    let lock = collateral::key(env, &old.terms.collateral);
    if !collateral::is_locked(env, &lock) {
        log!(env, "collateral lock missing", old.id);
        return Err(LoanCoreError::InvalidState);
    }

    let new_id = open_loan(env, new_terms, fees, now, borrower, new_lender)?;

    let currency = &new_terms.payable_currency;
    treasury::credit_fee(env, currency, amounts.interest_fee, &old.terms.affiliate_code)?;
    treasury::credit_fee(
        env,
        currency,
        amounts.fee - amounts.interest_fee,
        &new_terms.affiliate_code,
    )?;
    Ok(new_id)
}

fn repay_quote(loan: &LoanRecord, now: u64) -> Result<RepaySettlement, LoanCoreError> {
    let interest = interest::interest_due(loan, now)?;
    settlement::repay_settlement(
        loan.balance,
        interest,
        loan.fee_snapshot.lender_interest_fee,
        loan.fee_snapshot.lender_principal_fee,
    )
}

/// Shared body of `repay` and `force_repay`. A forced repayment leaves the
/// proceeds in the contract as a receipt on the lender note.
fn settle_repayment(
    env: &Env,
    loan_id: u64,
    payer: &Address,
    force: bool,
) -> Result<RepaySettlement, LoanCoreError> {
    let _guard = ReentrancyGuard::enter(env)?;
    ensure_live(env)?;
    payer.require_auth();

    let now = env.ledger().timestamp();
    let mut loan = storage::load_loan(env, loan_id)?;
    require_active(env, &loan)?;
    let borrower = notes::holder(env, NoteKind::Borrower, loan_id)?;
    let lender = notes::holder(env, NoteKind::Lender, loan_id)?;

    let quote = repay_quote(&loan, now)?;
    let currency = loan.terms.payable_currency.clone();

    // effects
    close_repaid(env, &mut loan, quote.interest, now)?;
    collateral::release(env, &collateral::key(env, &loan.terms.collateral));
    treasury::credit_fee(env, &currency, quote.protocol_fee, &loan.terms.affiliate_code)?;
    if force {
        notes::burn(env, NoteKind::Borrower, loan_id);
        storage::write_persistent(
            env,
            &DataKey::NoteReceipt(loan_id),
            &NoteReceipt {
                currency: currency.clone(),
                amount: quote.amount_to_lender,
            },
        );
    } else {
        notes::burn_both(env, loan_id);
    }

    // interactions
    let this = env.current_contract_address();
    move_currency(env, &currency, payer, &this, quote.amount_from_payer)?;
    if !force {
        move_currency(env, &currency, &this, &lender, quote.amount_to_lender)?;
    }
    move_collateral(env, &loan.terms.collateral, &this, &borrower)?;

    events::publish_loan_repaid(
        env,
        force,
        LoanRepaidEvent {
            loan_id,
            payer: payer.clone(),
            settlement: quote.clone(),
        },
    );
    Ok(quote)
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct LoanCore;

#[contractimpl]
impl LoanCore {
    // ----- configuration -----

    /// One-time setup. `admin` receives the `Admin` role; every other role
    /// must be granted explicitly.
    pub fn initialize(env: Env, admin: Address, fee_controller: Address) -> Result<(), LoanCoreError> {
        if storage::is_initialized(&env) {
            return Err(LoanCoreError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::FeeController, &fee_controller);
        env.storage().instance().set(&DataKey::NextLoanId, &1u64);
        storage::set_paused(&env, false);
        storage::bump_instance(&env);
        roles::grant(&env, Role::Admin, &admin);
        Ok(())
    }

    pub fn set_fee_controller(
        env: Env,
        caller: Address,
        fee_controller: Address,
    ) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Admin, &caller)?;
        env.storage()
            .instance()
            .set(&DataKey::FeeController, &fee_controller);
        Ok(())
    }

    pub fn grant_role(env: Env, caller: Address, role: Role, account: Address) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Admin, &caller)?;
        roles::grant(&env, role, &account);
        events::publish_role_granted(
            &env,
            RoleEvent {
                role,
                account,
                sender: caller,
            },
        );
        Ok(())
    }

    pub fn revoke_role(env: Env, caller: Address, role: Role, account: Address) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Admin, &caller)?;
        roles::revoke(&env, role, &account);
        events::publish_role_revoked(
            &env,
            RoleEvent {
                role,
                account,
                sender: caller,
            },
        );
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Pauser, &caller)?;
        storage::set_paused(&env, true);
        events::publish_paused(&env, true, caller);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Pauser, &caller)?;
        storage::set_paused(&env, false);
        events::publish_paused(&env, false, caller);
        Ok(())
    }

    // ----- lifecycle -----

    /// Originate a loan. The lender funds `principal` plus the lender
    /// origination fee; the borrower receives `principal` less the borrower
    /// origination fee and pledges the collateral.
    ///
    /// # Errors
    /// * `Unauthorized` – caller lacks the `Originator` role
    /// * `InvalidTerms` / `ZeroAmount` / `TermsExpired` – bad terms
    /// * `NonceExhausted` / `ZeroAmount` – signer nonce rejected
    /// * `CollateralInUse` – the unit already backs an active loan
    /// * `TransferFailed` – a party could not deliver funds or collateral
    pub fn start_loan(
        env: Env,
        caller: Address,
        lender: Address,
        borrower: Address,
        terms: LoanTerms,
        signer_nonce: Option<SignerNonce>,
    ) -> Result<u64, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        require_auth_each(&[&caller, &lender, &borrower]);
        roles::require(&env, Role::Originator, &caller)?;

        let now = env.ledger().timestamp();
        validate_terms(&env, &terms, now)?;
        consume_signer_nonce(&env, signer_nonce)?;

        let fees = current_fees(&env)?;
        let borrower_fee = interest::apply_bps(terms.principal, fees.borrower_origination_fee)?;
        let lender_fee = interest::apply_bps(terms.principal, fees.lender_origination_fee)?;
        let total_fee = borrower_fee
            .checked_add(lender_fee)
            .ok_or(LoanCoreError::ArithmeticOverflow)?;
        let lender_funding = terms
            .principal
            .checked_add(lender_fee)
            .ok_or(LoanCoreError::ArithmeticOverflow)?;

        // effects
        collateral::acquire(&env, &collateral::key(&env, &terms.collateral))?;
        let loan_id = open_loan(&env, &terms, fees, now, &borrower, &lender)?;
        treasury::credit_fee(&env, &terms.payable_currency, total_fee, &terms.affiliate_code)?;

        // interactions
        let this = env.current_contract_address();
        move_collateral(&env, &terms.collateral, &borrower, &this)?;
        move_currency(&env, &terms.payable_currency, &lender, &this, lender_funding)?;
        move_currency(
            &env,
            &terms.payable_currency,
            &this,
            &borrower,
            terms.principal - borrower_fee,
        )?;

        events::publish_loan_started(
            &env,
            LoanStartedEvent {
                loan_id,
                lender,
                borrower,
                principal: terms.principal,
                collateral: terms.collateral,
                currency: terms.payable_currency,
            },
        );
        Ok(loan_id)
    }

    /// Repay a loan in full. Anyone may pay; the lender note holder receives
    /// the proceeds net of protocol fees and the borrower note holder gets
    /// the collateral back.
    pub fn repay(env: Env, loan_id: u64, payer: Address) -> Result<RepaySettlement, LoanCoreError> {
        settle_repayment(&env, loan_id, &payer, false)
    }

    /// Repay without pushing funds to the lender. The proceeds are held as a
    /// receipt redeemable by whoever holds the lender note.
    pub fn force_repay(
        env: Env,
        loan_id: u64,
        payer: Address,
    ) -> Result<RepaySettlement, LoanCoreError> {
        settle_repayment(&env, loan_id, &payer, true)
    }

    /// Collect a force-repay receipt. Burns the lender note.
    pub fn redeem_note(
        env: Env,
        loan_id: u64,
        holder: Address,
        recipient: Address,
    ) -> Result<i128, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        holder.require_auth();

        let loan = storage::load_loan(&env, loan_id)?;
        if loan.state != LoanState::Repaid {
            log!(&env, "receipt on unrepaid loan", loan_id);
            return Err(LoanCoreError::InvalidState);
        }
        let key = DataKey::NoteReceipt(loan_id);
        let receipt: NoteReceipt =
            storage::read_persistent(&env, &key).ok_or(LoanCoreError::NoReceipt)?;
        notes::require_holder(&env, NoteKind::Lender, loan_id, &holder)?;

        env.storage().persistent().remove(&key);
        notes::burn(&env, NoteKind::Lender, loan_id);

        move_currency(
            &env,
            &receipt.currency,
            &env.current_contract_address(),
            &recipient,
            receipt.amount,
        )?;

        events::publish_note_redeemed(
            &env,
            NoteRedeemedEvent {
                loan_id,
                recipient,
                amount: receipt.amount,
            },
        );
        Ok(receipt.amount)
    }

    /// Take the collateral of an expired, unpaid loan. Returns the default
    /// fee recorded against it.
    pub fn claim(env: Env, loan_id: u64, claimant: Address) -> Result<i128, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        claimant.require_auth();

        let now = env.ledger().timestamp();
        let mut loan = storage::load_loan(&env, loan_id)?;
        require_active(&env, &loan)?;
        notes::require_holder(&env, NoteKind::Lender, loan_id, &claimant)?;

        let due = loan.due_date().ok_or(LoanCoreError::ArithmeticOverflow)?;
        if now < due {
            log!(&env, "loan not expired", loan_id, due, now);
            return Err(LoanCoreError::NotExpired);
        }

        let interest = interest::interest_due(&loan, now)?;
        let owed = loan
            .balance
            .checked_add(interest)
            .ok_or(LoanCoreError::ArithmeticOverflow)?;
        let default_fee = interest::apply_bps(owed, loan.fee_snapshot.lender_default_fee)?;

        // effects
        loan.state = LoanState::Defaulted;
        loan.last_accrual_timestamp = now;
        storage::save_loan(&env, &loan);
        collateral::release(&env, &collateral::key(&env, &loan.terms.collateral));
        notes::burn_both(&env, loan_id);
        treasury::credit_default_fee(&env, &loan.terms.payable_currency, default_fee)?;

        // interactions
        move_collateral(
            &env,
            &loan.terms.collateral,
            &env.current_contract_address(),
            &claimant,
        )?;

        events::publish_loan_claimed(
            &env,
            LoanClaimedEvent {
                loan_id,
                lender: claimant,
                default_fee,
            },
        );
        Ok(default_fee)
    }

    /// Replace an active loan with new terms on the same collateral, with the
    /// same or a different lender. Only net amounts move; the collateral
    /// stays in custody.
    ///
    /// # Errors
    /// * `Unauthorized` – caller lacks `Originator`, or `borrower` does not
    ///   hold the borrower note
    /// * `CollateralMismatch` / `CurrencyMismatch` – new terms differ
    /// * `TransferFailed` – a party could not deliver funds
    pub fn rollover(
        env: Env,
        caller: Address,
        old_loan_id: u64,
        borrower: Address,
        new_lender: Address,
        new_terms: LoanTerms,
        signer_nonce: Option<SignerNonce>,
    ) -> Result<u64, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        require_auth_each(&[&caller, &borrower, &new_lender]);
        roles::require(&env, Role::Originator, &caller)?;

        let now = env.ledger().timestamp();
        let mut old = storage::load_loan(&env, old_loan_id)?;
        require_active(&env, &old)?;
        notes::require_holder(&env, NoteKind::Borrower, old_loan_id, &borrower)?;
        let old_lender = notes::holder(&env, NoteKind::Lender, old_loan_id)?;

        check_successor_terms(&old.terms, &new_terms)?;
        validate_terms(&env, &new_terms, now)?;
        consume_signer_nonce(&env, signer_nonce)?;

        let fees = current_fees(&env)?;
        let old_interest = interest::interest_due(&old, now)?;
        let amounts = settlement::rollover_amounts(
            old.balance,
            old_interest,
            new_terms.principal,
            new_lender == old_lender,
            fees.borrower_rollover_fee,
            fees.lender_rollover_fee,
            old.fee_snapshot.lender_interest_fee,
        )?;

        let new_loan_id = replace_loan(
            &env,
            &mut old,
            old_interest,
            &new_terms,
            fees,
            now,
            &borrower,
            &new_lender,
            &amounts,
        )?;

        settle_replacement(
            &env,
            &new_terms.payable_currency,
            &borrower,
            &new_lender,
            &old_lender,
            &amounts,
        )?;

        events::publish_loan_rolled(
            &env,
            LoanReplacedEvent {
                old_loan_id,
                new_loan_id,
                amounts,
            },
        );
        Ok(new_loan_id)
    }

    /// Move an active loan to a new lender on strictly better terms for the
    /// borrower: same interest mode, no larger principal, a rate at least 10%
    /// lower, and no earlier due date. The borrower only authorizes when it
    /// must top up.
    pub fn refinance(
        env: Env,
        caller: Address,
        old_loan_id: u64,
        new_lender: Address,
        new_terms: LoanTerms,
    ) -> Result<u64, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        require_auth_each(&[&caller, &new_lender]);
        roles::require(&env, Role::Originator, &caller)?;

        let now = env.ledger().timestamp();
        let mut old = storage::load_loan(&env, old_loan_id)?;
        require_active(&env, &old)?;
        let borrower = notes::holder(&env, NoteKind::Borrower, old_loan_id)?;
        let old_lender = notes::holder(&env, NoteKind::Lender, old_loan_id)?;

        if new_lender == old_lender {
            return Err(LoanCoreError::SameLender);
        }
        check_successor_terms(&old.terms, &new_terms)?;
        // rates are only comparable within one interest mode
        if new_terms.interest_mode != old.terms.interest_mode {
            return Err(LoanCoreError::InterestModeMismatch);
        }
        validate_terms(&env, &new_terms, now)?;
        if new_terms.principal > old.balance {
            log!(&env, "refinance raises principal", old.balance, new_terms.principal);
            return Err(LoanCoreError::PrincipalIncrease);
        }
        settlement::validate_refinance_window(old.start_date, now)?;
        settlement::validate_rate_improvement(
            old.terms.interest_rate_bps,
            new_terms.interest_rate_bps,
        )?;
        let old_due = old.due_date().ok_or(LoanCoreError::ArithmeticOverflow)?;
        let new_due = now
            .checked_add(new_terms.duration_secs)
            .ok_or(LoanCoreError::ArithmeticOverflow)?;
        if new_due < old_due {
            log!(&env, "refinance shortens due date", old_due, new_due);
            return Err(LoanCoreError::DueDateShortened);
        }

        let fees = current_fees(&env)?;
        let old_interest = interest::interest_due(&old, now)?;
        let amounts = settlement::refinance_amounts(
            old.balance,
            old_interest,
            new_terms.principal,
            0,
            fees.lender_rollover_fee,
            old.fee_snapshot.lender_interest_fee,
        )?;
        if amounts.need_from_borrower > 0 && borrower != caller && borrower != new_lender {
            borrower.require_auth();
        }

        let new_loan_id = replace_loan(
            &env,
            &mut old,
            old_interest,
            &new_terms,
            fees,
            now,
            &borrower,
            &new_lender,
            &amounts,
        )?;

        settle_replacement(
            &env,
            &new_terms.payable_currency,
            &borrower,
            &new_lender,
            &old_lender,
            &amounts,
        )?;

        events::publish_loan_refinanced(
            &env,
            LoanReplacedEvent {
                old_loan_id,
                new_loan_id,
                amounts,
            },
        );
        Ok(new_loan_id)
    }

    /// Hand a borrower or lender position to another address.
    pub fn transfer_note(
        env: Env,
        kind: NoteKind,
        loan_id: u64,
        from: Address,
        to: Address,
    ) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        from.require_auth();
        storage::load_loan(&env, loan_id)?;
        notes::transfer(&env, kind, loan_id, &from, &to)?;
        events::publish_note_transferred(
            &env,
            NoteTransferredEvent {
                loan_id,
                kind,
                from,
                to,
            },
        );
        Ok(())
    }

    // ----- nonces -----

    pub fn consume_nonce(
        env: Env,
        caller: Address,
        party: Address,
        nonce: u64,
        max_uses: u32,
    ) -> Result<NonceUsage, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        ensure_live(&env)?;
        caller.require_auth();
        roles::require(&env, Role::Originator, &caller)?;
        let usage = nonce::consume(&env, &party, nonce, max_uses)?;
        events::publish_nonce_used(
            &env,
            NonceEvent {
                party,
                nonce,
                uses: usage.uses,
                max_uses: usage.max_uses,
            },
        );
        Ok(usage)
    }

    /// Exhaust one of the caller's own nonces. Allowed while paused.
    pub fn cancel_nonce(env: Env, party: Address, nonce: u64) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        party.require_auth();
        let usage = nonce::cancel(&env, &party, nonce)?;
        events::publish_nonce_cancelled(
            &env,
            NonceEvent {
                party,
                nonce,
                uses: usage.uses,
                max_uses: usage.max_uses,
            },
        );
        Ok(())
    }

    // ----- fees -----

    pub fn withdraw_fees(
        env: Env,
        caller: Address,
        currency: Address,
        amount: i128,
        to: Address,
    ) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::FeeClaimer, &caller)?;

        treasury::debit_protocol(&env, &currency, amount)?;
        move_currency(&env, &currency, &env.current_contract_address(), &to, amount)?;

        events::publish_fees_withdrawn(
            &env,
            FeesWithdrawnEvent {
                currency,
                to,
                amount,
            },
        );
        Ok(())
    }

    pub fn set_affiliate_split(
        env: Env,
        caller: Address,
        code: Symbol,
        affiliate: Address,
        split_bps: u32,
    ) -> Result<(), LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        caller.require_auth();
        roles::require(&env, Role::AffiliateManager, &caller)?;
        treasury::set_split(&env, &code, &affiliate, split_bps)?;
        events::publish_affiliate_split(
            &env,
            AffiliateSplitEvent {
                code,
                affiliate,
                split_bps,
            },
        );
        Ok(())
    }

    pub fn withdraw_affiliate_fees(
        env: Env,
        affiliate: Address,
        currency: Address,
        to: Address,
    ) -> Result<i128, LoanCoreError> {
        let _guard = ReentrancyGuard::enter(&env)?;
        storage::require_initialized(&env)?;
        affiliate.require_auth();

        let amount = treasury::take_affiliate_balance(&env, &affiliate, &currency)?;
        move_currency(&env, &currency, &env.current_contract_address(), &to, amount)?;

        events::publish_affiliate_withdrawn(
            &env,
            FeesWithdrawnEvent {
                currency,
                to,
                amount,
            },
        );
        Ok(amount)
    }

    // ----- views -----

    pub fn get_loan(env: Env, loan_id: u64) -> Result<LoanRecord, LoanCoreError> {
        storage::load_loan(&env, loan_id)
    }

    pub fn loan_state(env: Env, loan_id: u64) -> LoanState {
        storage::try_load_loan(&env, loan_id)
            .map(|loan| loan.state)
            .unwrap_or(LoanState::DoesNotExist)
    }

    pub fn borrower_of(env: Env, loan_id: u64) -> Option<Address> {
        notes::owner_of(&env, NoteKind::Borrower, loan_id)
    }

    pub fn lender_of(env: Env, loan_id: u64) -> Option<Address> {
        notes::owner_of(&env, NoteKind::Lender, loan_id)
    }

    pub fn note_receipt(env: Env, loan_id: u64) -> Option<NoteReceipt> {
        storage::read_persistent(&env, &DataKey::NoteReceipt(loan_id))
    }

    pub fn collateral_key(env: Env, collateral: Collateral) -> BytesN<32> {
        collateral::key(&env, &collateral)
    }

    pub fn is_collateral_locked(env: Env, collateral: Collateral) -> bool {
        collateral::is_locked(&env, &collateral::key(&env, &collateral))
    }

    /// What `repay` would move if called now.
    pub fn quote_repay(env: Env, loan_id: u64) -> Result<RepaySettlement, LoanCoreError> {
        let loan = storage::load_loan(&env, loan_id)?;
        require_active(&env, &loan)?;
        repay_quote(&loan, env.ledger().timestamp())
    }

    /// What `rollover` would move if called now at current fee rates.
    pub fn quote_rollover(
        env: Env,
        old_loan_id: u64,
        new_lender: Address,
        new_principal: i128,
    ) -> Result<RolloverAmounts, LoanCoreError> {
        let loan = storage::load_loan(&env, old_loan_id)?;
        require_active(&env, &loan)?;
        let old_lender = notes::holder(&env, NoteKind::Lender, old_loan_id)?;
        let fees = current_fees(&env)?;
        let old_interest = interest::interest_due(&loan, env.ledger().timestamp())?;
        settlement::rollover_amounts(
            loan.balance,
            old_interest,
            new_principal,
            new_lender == old_lender,
            fees.borrower_rollover_fee,
            fees.lender_rollover_fee,
            loan.fee_snapshot.lender_interest_fee,
        )
    }

    /// Interest per day on the outstanding balance, scaled by
    /// `DAILY_RATE_SCALE`.
    pub fn daily_interest(env: Env, loan_id: u64) -> Result<i128, LoanCoreError> {
        let loan = storage::load_loan(&env, loan_id)?;
        interest::daily_rate(loan.balance, loan.terms.interest_rate_bps)
    }

    pub fn fees_withdrawable(env: Env, currency: Address) -> i128 {
        treasury::protocol_balance(&env, &currency)
    }

    pub fn affiliate_balance(env: Env, affiliate: Address, currency: Address) -> i128 {
        treasury::affiliate_balance(&env, &affiliate, &currency)
    }

    pub fn affiliate_split(env: Env, code: Symbol) -> Option<AffiliateSplit> {
        treasury::split(&env, &code)
    }

    pub fn default_fees_accrued(env: Env, currency: Address) -> i128 {
        treasury::default_fees(&env, &currency)
    }

    pub fn is_nonce_used(env: Env, party: Address, nonce: u64) -> bool {
        nonce::is_used(&env, &party, nonce)
    }

    pub fn nonce_usage(env: Env, party: Address, nonce: u64) -> Option<NonceUsage> {
        nonce::usage(&env, &party, nonce)
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        roles::has(&env, role, &account)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn fee_controller(env: Env) -> Result<Address, LoanCoreError> {
        storage::fee_controller(&env)
    }
}

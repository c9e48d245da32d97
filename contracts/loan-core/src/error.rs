use soroban_sdk::contracterror;

/// Error codes surfaced by every `LoanCore` entry point.
///
/// Codes are stable; indexers and callers branch on the number. Context that
/// does not fit in a code (loan ids, due times, amounts) is written to the
/// diagnostic log at the failure site.
#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LoanCoreError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    Paused = 4,
    Reentrancy = 5,
    LoanNotFound = 6,
    InvalidState = 7,
    CollateralInUse = 8,
    CollateralMismatch = 9,
    CurrencyMismatch = 10,
    NotExpired = 11,
    NonceExhausted = 12,
    NonceUsed = 13,
    ZeroAmount = 14,
    ArithmeticOverflow = 15,
    InvalidTerms = 16,
    TermsExpired = 17,
    NoReceipt = 18,
    SameLender = 19,
    PrincipalIncrease = 20,
    RefinanceCooldown = 21,
    InsufficientRateImprovement = 22,
    DueDateShortened = 23,
    InsufficientFees = 24,
    InvalidSplit = 25,
    InvalidTimestamp = 26,
    ZeroDuration = 27,
    TransferFailed = 28,
    InterestModeMismatch = 29,
}

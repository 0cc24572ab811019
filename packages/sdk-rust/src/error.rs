//! SDK error type and the closed failure taxonomy shown to users.

use std::fmt;

use solana_sdk::{
    instruction::InstructionError, program_error::ProgramError, pubkey::Pubkey,
    signer::SignerError, transaction::TransactionError,
};

use crate::{instructions::SYSTEM_PROGRAM_ID, math::atomic_to_ui};

/// Closed set of failure categories every error collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    UserRejected,
    InsufficientFunds,
    InvalidAddress,
    AccountCollision,
    AccountNotFound,
    ConfigurationError,
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UserRejected       => "user_rejected",
            FailureKind::InsufficientFunds  => "insufficient_funds",
            FailureKind::InvalidAddress     => "invalid_address",
            FailureKind::AccountCollision   => "account_collision",
            FailureKind::AccountNotFound    => "account_not_found",
            FailureKind::ConfigurationError => "configuration_error",
            FailureKind::Unknown            => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-triggered operation an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateToken,
    CreatePool,
    AddLiquidity,
    Swap,
    Airdrop,
}

impl Action {
    pub(crate) const ALL: [Action; 5] = [
        Action::CreateToken,
        Action::CreatePool,
        Action::AddLiquidity,
        Action::Swap,
        Action::Airdrop,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    fn label(&self) -> &'static str {
        match self {
            Action::CreateToken  => "Token creation",
            Action::CreatePool   => "Pool creation",
            Action::AddLiquidity => "Adding liquidity",
            Action::Swap         => "Swap",
            Action::Airdrop      => "Airdrop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All errors returned by the HookSwap SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Ledger / network ─────────────────────────────────────────────────────
    /// The ledger rejected a request; `kind` is derived from the structured
    /// transaction error, `message` is the raw client text.
    #[error("{message}")]
    Ledger { kind: FailureKind, message: String },

    /// The signer declined to sign.
    #[error("Signature request declined: {0}")]
    UserRejected(String),

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("{0}")]
    Configuration(String),

    // ── Local prechecks ──────────────────────────────────────────────────────
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error(
        "Insufficient token balance. You have {} tokens, need {}",
        atomic_to_ui(*available, *decimals),
        atomic_to_ui(*required, *decimals)
    )]
    InsufficientBalance { required: u64, available: u64, decimals: u8 },

    /// Another call for the same action is still in flight on this client.
    #[error("{0} already in progress")]
    Busy(Action),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Integer overflow in amount scaling")]
    MathOverflow,

    // ── Account parsing ──────────────────────────────────────────────────────
    #[error("Account parse error at offset {offset}: {reason}")]
    ParseError { offset: usize, reason: String },

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Category of this error in the closed taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Ledger { kind, .. }          => *kind,
            Error::UserRejected(_)              => FailureKind::UserRejected,
            Error::Configuration(_)             => FailureKind::ConfigurationError,
            Error::InvalidAddress { .. }        => FailureKind::InvalidAddress,
            Error::AccountNotFound(_)           => FailureKind::AccountNotFound,
            Error::InsufficientBalance { .. }   => FailureKind::InsufficientFunds,
            Error::Busy(_)
            | Error::MathOverflow
            | Error::ParseError { .. }
            | Error::Program(_)
            | Error::InvalidArgument(_)         => FailureKind::Unknown,
        }
    }

    /// One-line notification for the user, phrased for the action that failed.
    pub fn user_message(&self, action: Action) -> String {
        match (self.kind(), action) {
            (FailureKind::UserRejected, _) => "Transaction was rejected".into(),
            (FailureKind::InsufficientFunds, _) if matches!(self, Error::InsufficientBalance { .. }) => {
                self.to_string()
            }
            (FailureKind::InsufficientFunds, Action::CreateToken) => {
                "Insufficient SOL balance. Please get some devnet SOL.".into()
            }
            (FailureKind::InsufficientFunds, _) => "Insufficient SOL for transaction fees".into(),
            (FailureKind::InvalidAddress, _) => "Invalid token address provided".into(),
            (FailureKind::AccountCollision, Action::CreatePool) => "Pool structure already exists".into(),
            (FailureKind::AccountCollision, _) => "Account already exists".into(),
            (FailureKind::AccountNotFound, _) => {
                "Token account not found. Please ensure you have the tokens.".into()
            }
            (FailureKind::ConfigurationError, _) => self.to_string(),
            (FailureKind::Unknown, _) => format!("{action} failed: {self}"),
        }
    }

    pub(crate) fn from_signer(err: SignerError) -> Self {
        match err {
            SignerError::UserCancel(reason) => Error::UserRejected(reason),
            other => Error::Ledger { kind: FailureKind::Unknown, message: other.to_string() },
        }
    }
}

// ─── Structured classification ────────────────────────────────────────────────

const SYSTEM_ACCOUNT_ALREADY_IN_USE: u32 = 0;
const SYSTEM_RESULT_WITH_NEGATIVE_LAMPORTS: u32 = 1;
const TOKEN_INSUFFICIENT_FUNDS: u32 = 1;

/// Map a transaction error onto the taxonomy.
///
/// `failing_program` is the program of the instruction named by an
/// `InstructionError`, needed to interpret `Custom` codes.
pub fn classify_transaction_error(
    err: &TransactionError,
    failing_program: Option<&Pubkey>,
) -> FailureKind {
    match err {
        TransactionError::InsufficientFundsForFee
        | TransactionError::InsufficientFundsForRent { .. }
        | TransactionError::AccountNotFound => FailureKind::InsufficientFunds,
        TransactionError::InstructionError(_, ix_err) => match ix_err {
            InstructionError::InsufficientFunds => FailureKind::InsufficientFunds,
            InstructionError::AccountAlreadyInitialized => FailureKind::AccountCollision,
            InstructionError::Custom(code) => classify_custom(*code, failing_program),
            _ => FailureKind::Unknown,
        },
        _ => FailureKind::Unknown,
    }
}

fn classify_custom(code: u32, program: Option<&Pubkey>) -> FailureKind {
    let Some(program) = program else {
        return FailureKind::Unknown;
    };
    let system = *program == SYSTEM_PROGRAM_ID;
    let ata    = *program == spl_associated_token_account::id();
    let token  = *program == spl_token::id() || *program == spl_token_2022::id();

    match code {
        SYSTEM_ACCOUNT_ALREADY_IN_USE if system || ata => FailureKind::AccountCollision,
        SYSTEM_RESULT_WITH_NEGATIVE_LAMPORTS if system => FailureKind::InsufficientFunds,
        TOKEN_INSUFFICIENT_FUNDS if token => FailureKind::InsufficientFunds,
        _ => FailureKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_payer_shortfalls_are_insufficient_funds() {
        for err in [
            TransactionError::InsufficientFundsForFee,
            TransactionError::InsufficientFundsForRent { account_index: 1 },
            TransactionError::AccountNotFound,
        ] {
            assert_eq!(classify_transaction_error(&err, None), FailureKind::InsufficientFunds);
        }
    }

    #[test]
    fn custom_codes_depend_on_program() {
        let in_use = TransactionError::InstructionError(0, InstructionError::Custom(0));
        assert_eq!(
            classify_transaction_error(&in_use, Some(&SYSTEM_PROGRAM_ID)),
            FailureKind::AccountCollision
        );
        assert_eq!(
            classify_transaction_error(&in_use, Some(&spl_associated_token_account::id())),
            FailureKind::AccountCollision
        );
        // Token-2022 code 0 is NotRentExempt, not a collision.
        assert_eq!(
            classify_transaction_error(&in_use, Some(&spl_token_2022::id())),
            FailureKind::Unknown
        );

        let short = TransactionError::InstructionError(2, InstructionError::Custom(1));
        assert_eq!(
            classify_transaction_error(&short, Some(&spl_token_2022::id())),
            FailureKind::InsufficientFunds
        );
        assert_eq!(classify_transaction_error(&short, None), FailureKind::Unknown);
    }

    #[test]
    fn signer_cancel_is_user_rejected() {
        let err = Error::from_signer(SignerError::UserCancel("declined".into()));
        assert_eq!(err.kind(), FailureKind::UserRejected);
        assert_eq!(err.user_message(Action::Swap), "Transaction was rejected");
    }

    #[test]
    fn messages_follow_the_action() {
        let collision = Error::Ledger {
            kind:    FailureKind::AccountCollision,
            message: "account already in use".into(),
        };
        assert_eq!(collision.user_message(Action::CreatePool), "Pool structure already exists");

        let broke = Error::Ledger { kind: FailureKind::InsufficientFunds, message: "x".into() };
        assert!(broke.user_message(Action::CreateToken).contains("devnet SOL"));

        let raw = Error::Ledger { kind: FailureKind::Unknown, message: "blockhash not found".into() };
        assert_eq!(raw.user_message(Action::Swap), "Swap failed: blockhash not found");
    }

    #[test]
    fn insufficient_balance_reports_ui_amounts() {
        let err = Error::InsufficientBalance { required: 5_000_000, available: 1_500_000, decimals: 6 };
        assert_eq!(err.kind(), FailureKind::InsufficientFunds);
        assert_eq!(
            err.user_message(Action::Swap),
            "Insufficient token balance. You have 1.5 tokens, need 5"
        );
    }
}

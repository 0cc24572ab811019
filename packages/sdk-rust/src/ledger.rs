//! The seam between flows and the network.
//!
//! [`RpcLedger`] talks to a Solana RPC node at `confirmed` commitment and turns
//! client failures into classified [`Error::Ledger`] values.

use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};

use crate::error::{classify_transaction_error, Error, FailureKind, Result};

/// Everything a flow needs from the ledger.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    async fn latest_blockhash(&self) -> Result<Hash>;

    async fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64>;

    /// `Ok(None)` when the account does not exist.
    async fn account(&self, key: &Pubkey) -> Result<Option<Account>>;

    /// Lamports held by `key`; 0 for a missing account.
    async fn balance(&self, key: &Pubkey) -> Result<u64>;

    /// Submit a signed transaction and wait for confirmation.
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature>;

    /// Ask the cluster faucet for lamports and wait for confirmation.
    async fn request_airdrop(&self, key: &Pubkey, lamports: u64) -> Result<Signature>;
}

// ─── RPC ──────────────────────────────────────────────────────────────────────

pub struct RpcLedger {
    rpc: RpcClient,
}

impl RpcLedger {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()),
        }
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }
}

impl Ledger for RpcLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc.get_latest_blockhash().await.map_err(|e| ledger_error(e, None))
    }

    async fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64> {
        self.rpc
            .get_minimum_balance_for_rent_exemption(space)
            .await
            .map_err(|e| ledger_error(e, None))
    }

    async fn account(&self, key: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(key, self.rpc.commitment())
            .await
            .map_err(|e| ledger_error(e, None))?;
        Ok(response.value)
    }

    async fn balance(&self, key: &Pubkey) -> Result<u64> {
        self.rpc.get_balance(key).await.map_err(|e| ledger_error(e, None))
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature> {
        log::debug!("submitting {} instruction(s) to {}", tx.message.instructions.len(), self.rpc.url());
        let sig = self
            .rpc
            .send_and_confirm_transaction(tx)
            .await
            .map_err(|e| ledger_error(e, Some(tx)))?;
        log::info!("confirmed {sig}");
        Ok(sig)
    }

    async fn request_airdrop(&self, key: &Pubkey, lamports: u64) -> Result<Signature> {
        let sig = self
            .rpc
            .request_airdrop(key, lamports)
            .await
            .map_err(|e| ledger_error(e, None))?;
        self.rpc
            .poll_for_signature_with_commitment(&sig, self.rpc.commitment())
            .await
            .map_err(|e| ledger_error(e, None))?;
        log::info!("airdrop of {lamports} lamports to {key} confirmed: {sig}");
        Ok(sig)
    }
}

/// Classify a client failure from its structured transaction error.
///
/// `tx` resolves which program raised an `InstructionError`.
fn ledger_error(err: ClientError, tx: Option<&Transaction>) -> Error {
    let kind = match err.get_transaction_error() {
        Some(tx_err) => {
            let failing_program = match (&tx_err, tx) {
                (solana_sdk::transaction::TransactionError::InstructionError(idx, _), Some(tx)) => {
                    failing_program(tx, *idx as usize)
                }
                _ => None,
            };
            classify_transaction_error(&tx_err, failing_program.as_ref())
        }
        None => FailureKind::Unknown,
    };
    log::debug!("ledger error classified as {kind}: {err}");
    Error::Ledger { kind, message: err.to_string() }
}

fn failing_program(tx: &Transaction, index: usize) -> Option<Pubkey> {
    let ix = tx.message.instructions.get(index)?;
    tx.message.account_keys.get(ix.program_id_index as usize).copied()
}

// ─── In-memory ledger for tests ───────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::{
        client_error::ClientErrorKind,
        rpc_request::{RpcError, RpcResponseErrorData},
        rpc_response::RpcSimulateTransactionResult,
    };
    use solana_sdk::{
        instruction::{Instruction, InstructionError},
        transaction::TransactionError,
    };

    use crate::instructions::{create_account_ix, SYSTEM_PROGRAM_ID};

    fn preflight_failure(err: serde_json::Value) -> ClientError {
        let sim: RpcSimulateTransactionResult =
            serde_json::from_value(serde_json::json!({ "err": err, "logs": ["Program log: failed"] })).unwrap();
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            code:    -32002,
            message: "Transaction simulation failed".into(),
            data:    RpcResponseErrorData::SendTransactionPreflightFailure(sim),
        })
        .into()
    }

    fn kind_of(err: Error) -> FailureKind {
        match err {
            Error::Ledger { kind, .. } => kind,
            other => panic!("expected a ledger error, got {other:?}"),
        }
    }

    /// One-instruction transaction invoking `program`.
    fn tx_for(program: Pubkey) -> Transaction {
        let payer = Pubkey::new_unique();
        let ix = if program == SYSTEM_PROGRAM_ID {
            create_account_ix(&payer, &Pubkey::new_unique(), 1, 0, &SYSTEM_PROGRAM_ID)
        } else {
            Instruction { program_id: program, accounts: vec![], data: vec![] }
        };
        Transaction::new_with_payer(&[ix], Some(&payer))
    }

    #[test]
    fn transaction_errors_are_classified() {
        let err = ClientError::from(TransactionError::InsufficientFundsForFee);
        assert_eq!(kind_of(ledger_error(err, None)), FailureKind::InsufficientFunds);
    }

    #[test]
    fn preflight_failures_use_the_simulated_error() {
        let err = preflight_failure(serde_json::json!("InsufficientFundsForFee"));
        assert_eq!(kind_of(ledger_error(err, None)), FailureKind::InsufficientFunds);
    }

    #[test]
    fn custom_codes_resolve_the_failing_program() {
        let custom = |code| serde_json::json!({ "InstructionError": [0, { "Custom": code }] });

        let tx = tx_for(SYSTEM_PROGRAM_ID);
        let err = ledger_error(preflight_failure(custom(0)), Some(&tx));
        assert_eq!(kind_of(err), FailureKind::AccountCollision);

        let tx = tx_for(spl_token_2022::id());
        let err = ledger_error(preflight_failure(custom(1)), Some(&tx));
        assert_eq!(kind_of(err), FailureKind::InsufficientFunds);

        // Without the transaction the program is unknown.
        let err = ledger_error(preflight_failure(custom(1)), None);
        assert_eq!(kind_of(err), FailureKind::Unknown);

        let direct = ClientError::from(TransactionError::InstructionError(0, InstructionError::Custom(0)));
        assert_eq!(kind_of(ledger_error(direct, Some(&tx_for(SYSTEM_PROGRAM_ID)))), FailureKind::AccountCollision);
    }

    #[test]
    fn failures_without_a_transaction_error_are_unknown() {
        let err: ClientError = ClientErrorKind::Custom("connection reset".into()).into();
        let err = ledger_error(err, None);
        assert!(matches!(&err, Error::Ledger { message, .. } if message.contains("connection reset")));
        assert_eq!(kind_of(err), FailureKind::Unknown);
    }

    #[test]
    fn failing_program_is_read_from_the_message() {
        let tx = tx_for(spl_token_2022::id());
        assert_eq!(failing_program(&tx, 0), Some(spl_token_2022::id()));
        assert_eq!(failing_program(&tx, 3), None);
    }
}

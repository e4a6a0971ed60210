//! The create → sign → broadcast → confirm cycle of a single transfer.
//!
//! The envelope lifecycle is strictly linear and enforced by types: signing
//! consumes a [`RawTransaction`], broadcasting consumes a
//! [`SignedTransaction`], and only a [`TxHash`] can be queried for
//! confirmation. No stage can be skipped.

use std::fmt;

use log::{debug, info, trace};

use bftnet_common::api::{
    CreateRawTransactionParams, GetTransactionParams, GetTransactionResult,
    SignTransactionParams, SubmitTransactionParams,
};
use bftnet_common::rpc::RpcError;

use crate::api::LedgerApi;
use crate::clock::Clock;
use crate::config::SIGN_EXPIRY;
use crate::error::HarnessError;
use crate::poller::{poll_until, BackoffConfig, PollOutcome};

/// Unsigned transfer payload, as returned by the cluster.
#[derive(Debug, Clone)]
pub struct RawTransaction(String);

/// Signed transfer payload, ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction(String);

/// Hash of a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drives one transfer from creation through observed confirmation.
pub struct TransferWorkflow<'a, A: LedgerApi + ?Sized> {
    api: &'a A,
    clock: &'a dyn Clock,
    backoff: BackoffConfig,
}

impl<'a, A: LedgerApi + ?Sized> TransferWorkflow<'a, A> {
    pub fn new(api: &'a A, clock: &'a dyn Clock, backoff: BackoffConfig) -> Self {
        Self {
            api,
            clock,
            backoff,
        }
    }

    /// Run the full cycle and return the confirmed hash.
    ///
    /// Returns only once the transaction is queryable as accepted; an
    /// exhausted confirmation budget aborts with
    /// [`HarnessError::ConfirmationExhausted`] rather than proceeding on an
    /// unconfirmed transfer.
    pub async fn run(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> Result<TxHash, HarnessError> {
        debug!("creating raw transfer of {} to {}", amount, recipient);
        let raw = self.create(recipient, amount).await?;
        let signed = self.sign(sender, raw).await?;
        let hash = self.broadcast(signed).await?;
        info!(
            "broadcast transfer {} -> {} amount {} hash {}",
            sender, recipient, amount, hash
        );
        self.await_confirmation(&hash).await?;
        Ok(hash)
    }

    async fn create(&self, recipient: &str, amount: u64) -> Result<RawTransaction, HarnessError> {
        let raw = self
            .api
            .create_raw_transaction(CreateRawTransactionParams {
                recipient: recipient.to_owned(),
                amount,
                transfer_only: true,
            })
            .await?;
        Ok(RawTransaction(raw))
    }

    async fn sign(
        &self,
        sender: &str,
        raw: RawTransaction,
    ) -> Result<SignedTransaction, HarnessError> {
        let signed = self
            .api
            .sign_transaction(SignTransactionParams {
                signer: sender.to_owned(),
                raw: raw.0,
                expiry: SIGN_EXPIRY.to_owned(),
            })
            .await?;
        Ok(SignedTransaction(signed))
    }

    async fn broadcast(&self, signed: SignedTransaction) -> Result<TxHash, HarnessError> {
        let hash = self
            .api
            .submit_transaction(SubmitTransactionParams { data: signed.0 })
            .await?;
        Ok(TxHash(hash))
    }

    /// Poll `get_transaction` until a non-empty, error-free record shows up.
    ///
    /// A protocol error here means "not queryable yet" and counts as a
    /// negative observation; only transport failures abort the poll.
    async fn await_confirmation(
        &self,
        hash: &TxHash,
    ) -> Result<GetTransactionResult, HarnessError> {
        let api = self.api;
        let outcome = poll_until(
            self.clock,
            &self.backoff,
            move || {
                let hash = hash.0.clone();
                async move {
                    match api.get_transaction(GetTransactionParams { hash: hash.clone() }).await {
                        Ok(record) => Ok(Some(record)),
                        Err(RpcError::Protocol { code, message }) => {
                            trace!("{} not yet queryable ({}: {})", hash, code, message);
                            Ok(None)
                        }
                        Err(err) => Err(HarnessError::from(err)),
                    }
                }
            },
            |record: &Option<GetTransactionResult>| {
                record.as_ref().is_some_and(|r| r.is_confirmed())
            },
        )
        .await?;

        match outcome {
            PollOutcome::Satisfied {
                value: Some(record),
                attempts,
            } => {
                debug!("{} confirmed after {} attempts", hash, attempts);
                Ok(record)
            }
            PollOutcome::Satisfied { value: None, attempts }
            | PollOutcome::Exhausted { attempts, .. } => {
                Err(HarnessError::ConfirmationExhausted {
                    hash: hash.0.clone(),
                    attempts,
                })
            }
        }
    }
}

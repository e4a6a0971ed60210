//! Wallet bootstrap: the strictly sequential steps that take a freshly
//! provisioned cluster to a signing-ready wallet with three known accounts.

use log::info;

use bftnet_common::api::{
    CreateAccountParams, GenerateSeedParams, ImportPrivateKeyParams, SaveSeedParams,
    UnlockWalletParams, SEED_LANGUAGE_ENGLISH,
};

use crate::api::LedgerApi;
use crate::config::ORIGIN_PRIVATE_KEY;
use crate::error::HarnessError;
use crate::transfer::TxHash;

/// Identifiers derived during the run.
///
/// Once recorded they are immutable facts: later steps reference them but
/// never rewrite them. The context is threaded explicitly through every
/// step instead of living in ambient state.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub origin: String,
    pub alex: String,
    pub bob: String,
    // transaction hashes in confirmation order
    pub confirmed: Vec<TxHash>,
}

/// Sequences the wallet bootstrap against a [`LedgerApi`].
///
/// Each step requires an error-free response, and state-changing steps
/// additionally require the cluster's explicit success flag. The first
/// failed assertion aborts the bootstrap; there is no partial-success
/// continuation.
pub struct ScenarioDriver<'a, A: LedgerApi + ?Sized> {
    api: &'a A,
    passphrase: String,
}

impl<'a, A: LedgerApi + ?Sized> ScenarioDriver<'a, A> {
    pub fn new(api: &'a A, passphrase: String) -> Self {
        Self { api, passphrase }
    }

    pub async fn bootstrap(&self) -> Result<RunContext, HarnessError> {
        info!("generating wallet seed");
        let generated = self
            .api
            .generate_seed(GenerateSeedParams {
                language: SEED_LANGUAGE_ENGLISH,
            })
            .await?;

        info!("persisting seed under passphrase");
        let saved = self
            .api
            .save_seed(SaveSeedParams {
                seed: generated.seed,
                passphrase: self.passphrase.clone(),
            })
            .await?;
        if !saved.success {
            return Err(HarnessError::StepFailed { step: "save_seed" });
        }

        info!("unlocking wallet for signing");
        let unlocked = self
            .api
            .unlock_wallet(UnlockWalletParams {
                passphrase: self.passphrase.clone(),
                wallet_only: true,
            })
            .await?;
        if !unlocked.success {
            return Err(HarnessError::StepFailed {
                step: "unlock_wallet",
            });
        }

        let origin = self
            .api
            .import_private_key(ImportPrivateKeyParams {
                private_key: ORIGIN_PRIVATE_KEY.to_owned(),
                label: String::from("origin"),
            })
            .await?;
        info!("imported origin key, address {}", origin.address);

        let alex = self
            .api
            .create_account(CreateAccountParams {
                label: String::from("alex"),
            })
            .await?;
        let bob = self
            .api
            .create_account(CreateAccountParams {
                label: String::from("bob"),
            })
            .await?;
        info!("created accounts alex={} bob={}", alex.address, bob.address);

        Ok(RunContext {
            origin: origin.address,
            alex: alex.address,
            bob: bob.address,
            confirmed: Vec::new(),
        })
    }
}

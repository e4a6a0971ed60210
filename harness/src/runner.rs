//! Run orchestration: sync readiness, wallet bootstrap, the funded
//! transfers and the closing account sweep, in that order and never
//! overlapping.

use log::info;

use bftnet_common::api::{GetAccountsResult, GetSyncStatusResult};

use crate::api::LedgerApi;
use crate::clock::Clock;
use crate::config::{FUNDING_AMOUNT, SEQUENTIAL_TRANSFERS, TRANSFER_AMOUNT};
use crate::error::HarnessError;
use crate::poller::{poll_until, BackoffConfig, PollOutcome};
use crate::scenario::{RunContext, ScenarioDriver};
use crate::transfer::TransferWorkflow;

/// Sequences the whole scenario against one [`LedgerApi`].
///
/// Every call blocks until its response; transfers are never pipelined, so
/// causal ordering stays observable and the balance assertions stay simple.
pub struct HarnessRunner<'a, A: LedgerApi + ?Sized> {
    api: &'a A,
    clock: &'a dyn Clock,
    backoff: BackoffConfig,
    passphrase: String,
}

impl<'a, A: LedgerApi + ?Sized> HarnessRunner<'a, A> {
    pub fn new(
        api: &'a A,
        clock: &'a dyn Clock,
        backoff: BackoffConfig,
        passphrase: String,
    ) -> Self {
        Self {
            api,
            clock,
            backoff,
            passphrase,
        }
    }

    /// Block until the cluster reports itself synchronized.
    pub async fn wait_for_sync(&self) -> Result<GetSyncStatusResult, HarnessError> {
        info!("waiting for cluster sync");
        let api = self.api;
        let outcome = poll_until(
            self.clock,
            &self.backoff,
            move || async move { api.get_sync_status().await.map_err(HarnessError::from) },
            |status: &GetSyncStatusResult| status.synced,
        )
        .await?;

        match outcome {
            PollOutcome::Satisfied { value, attempts } => {
                info!(
                    "cluster synchronized at height {} after {} probes",
                    value.height, attempts
                );
                Ok(value)
            }
            PollOutcome::Exhausted { attempts, .. } => {
                Err(HarnessError::SyncTimeout { attempts })
            }
        }
    }

    /// The full scenario: bootstrap, fund alex and bob, then ten
    /// sequential confirmed transfers to bob.
    pub async fn execute(&self) -> Result<RunContext, HarnessError> {
        self.wait_for_sync().await?;

        let peers = self.api.get_peers().await?;
        info!("client-facing node reports {} peers", peers.total_peers);

        let driver = ScenarioDriver::new(self.api, self.passphrase.clone());
        let mut ctx = driver.bootstrap().await?;

        let workflow = TransferWorkflow::new(self.api, self.clock, self.backoff.clone());

        info!("funding alex with {}", FUNDING_AMOUNT);
        let hash = workflow.run(&ctx.origin, &ctx.alex, FUNDING_AMOUNT).await?;
        ctx.confirmed.push(hash);

        info!("funding bob with {}", FUNDING_AMOUNT);
        let hash = workflow.run(&ctx.origin, &ctx.bob, FUNDING_AMOUNT).await?;
        ctx.confirmed.push(hash);

        for i in 0..SEQUENTIAL_TRANSFERS {
            info!(
                "sequential transfer {}/{} to bob",
                i + 1,
                SEQUENTIAL_TRANSFERS
            );
            let hash = workflow.run(&ctx.origin, &ctx.bob, TRANSFER_AMOUNT).await?;
            ctx.confirmed.push(hash);
        }

        let accounts = self.accounts_summary().await?;
        info!(
            "scenario complete, {} transfers confirmed across {} accounts",
            ctx.confirmed.len(),
            accounts.accounts.len()
        );

        Ok(ctx)
    }

    /// Enumerate known accounts and log their observed balances.
    pub async fn accounts_summary(&self) -> Result<GetAccountsResult, HarnessError> {
        let accounts = self.api.get_accounts().await?;
        for account in &accounts.accounts {
            info!(
                "account {:8} {} balance {}",
                account.label, account.address, account.balance
            );
        }
        Ok(accounts)
    }
}

//! End-to-end scenario tests against an in-process mock cluster.
//!
//! The mock implements the full [`LedgerApi`] surface with deterministic
//! key derivation, a configurable confirmation lag and a recorded event
//! log, so the harness's sequencing and balance expectations can be
//! asserted without a real topology. Tests run under a paused tokio
//! runtime, which makes the production-shaped backoff schedule instant.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use sha3::{Digest, Sha3_256};

use bftnet_common::api::*;
use bftnet_common::rpc::{RpcError, RpcResult};
use bftnet_harness::api::LedgerApi;
use bftnet_harness::clock::SystemClock;
use bftnet_harness::config::{
    DEFAULT_PASSPHRASE, FUNDING_AMOUNT, ORIGIN_PRIVATE_KEY, SEQUENTIAL_TRANSFERS, TRANSFER_AMOUNT,
};
use bftnet_harness::error::HarnessError;
use bftnet_harness::poller::BackoffConfig;
use bftnet_harness::runner::HarnessRunner;
use bftnet_harness::scenario::ScenarioDriver;
use bftnet_harness::transfer::TransferWorkflow;

// The origin address is funded at genesis in the mock, like the known key
// it is imported from would be on a real devnet.
const ORIGIN_GENESIS_BALANCE: u64 = 1_000_000_000_000;

// Queries a broadcast transaction stays pending before it confirms.
const DEFAULT_CONFIRMATION_LAG: u32 = 3;

fn derive_address(input: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(input.as_bytes());
    format!("bft1{}", hex::encode(&hasher.finalize()[..20]))
}

fn not_found() -> RpcError {
    RpcError::Protocol {
        code: -32000,
        message: String::from("transaction not found"),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Created { recipient: String },
    Confirmed { recipient: String, balance_after: u64 },
}

struct PendingTx {
    sender: String,
    recipient: String,
    amount: u64,
    queries_left: u32,
}

#[derive(Default)]
struct MockState {
    sync_probes: u32,
    unlocked: bool,
    accounts: Vec<AccountEntry>,
    pending: HashMap<String, PendingTx>,
    confirmed: HashMap<String, u64>,
    events: Vec<Event>,
}

struct MockLedger {
    state: Mutex<MockState>,
    // probes reporting unsynced before the first positive
    synced_after: u32,
    confirmation_lag: u32,
    fail_unlock: bool,
}

impl MockLedger {
    fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            synced_after: 0,
            confirmation_lag: DEFAULT_CONFIRMATION_LAG,
            fail_unlock: false,
        }
    }

    fn with_sync_lag(mut self, probes: u32) -> Self {
        self.synced_after = probes;
        self
    }

    fn with_confirmation_lag(mut self, queries: u32) -> Self {
        self.confirmation_lag = queries;
        self
    }

    fn failing_unlock(mut self) -> Self {
        self.fail_unlock = true;
        self
    }

    fn sync_probes(&self) -> u32 {
        self.state.lock().sync_probes
    }

    fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    fn balance_of(&self, address: &str) -> u64 {
        self.state
            .lock()
            .accounts
            .iter()
            .find(|a| a.address == address)
            .map(|a| a.balance)
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn get_sync_status(&self) -> RpcResult<GetSyncStatusResult> {
        let mut state = self.state.lock();
        state.sync_probes += 1;
        Ok(GetSyncStatusResult {
            synced: state.sync_probes > self.synced_after,
            height: state.sync_probes as u64,
        })
    }

    async fn get_peers(&self) -> RpcResult<GetPeersResult> {
        let peers = (0..4)
            .map(|i| PeerEntry {
                id: i,
                addr: format!("172.28.0.{}:13802", 10 + i),
                version: String::from("mock-1.0"),
                height: 1,
            })
            .collect::<Vec<_>>();
        let total_peers = peers.len();
        Ok(GetPeersResult { peers, total_peers })
    }

    async fn generate_seed(&self, params: GenerateSeedParams) -> RpcResult<GenerateSeedResult> {
        assert_eq!(params.language, SEED_LANGUAGE_ENGLISH);
        Ok(GenerateSeedResult {
            seed: String::from("cluster lumber noble slogan echo gravity remind matrix ozone"),
        })
    }

    async fn save_seed(&self, params: SaveSeedParams) -> RpcResult<SaveSeedResult> {
        assert!(!params.seed.is_empty());
        assert!(!params.passphrase.is_empty());
        Ok(SaveSeedResult { success: true })
    }

    async fn unlock_wallet(&self, params: UnlockWalletParams) -> RpcResult<UnlockWalletResult> {
        assert!(params.wallet_only);
        if self.fail_unlock {
            return Ok(UnlockWalletResult { success: false });
        }
        self.state.lock().unlocked = true;
        Ok(UnlockWalletResult { success: true })
    }

    async fn import_private_key(
        &self,
        params: ImportPrivateKeyParams,
    ) -> RpcResult<ImportPrivateKeyResult> {
        let address = derive_address(&params.private_key);
        self.state.lock().accounts.push(AccountEntry {
            label: params.label,
            address: address.clone(),
            balance: ORIGIN_GENESIS_BALANCE,
        });
        Ok(ImportPrivateKeyResult { address })
    }

    async fn create_account(&self, params: CreateAccountParams) -> RpcResult<CreateAccountResult> {
        let address = derive_address(&params.label);
        self.state.lock().accounts.push(AccountEntry {
            label: params.label,
            address: address.clone(),
            balance: 0,
        });
        Ok(CreateAccountResult { address })
    }

    async fn create_raw_transaction(
        &self,
        params: CreateRawTransactionParams,
    ) -> RpcResult<String> {
        assert!(params.transfer_only);
        self.state.lock().events.push(Event::Created {
            recipient: params.recipient.clone(),
        });
        Ok(format!("raw|{}|{}", params.recipient, params.amount))
    }

    async fn sign_transaction(&self, params: SignTransactionParams) -> RpcResult<String> {
        let state = self.state.lock();
        if !state.unlocked {
            return Err(RpcError::Protocol {
                code: -32010,
                message: String::from("wallet locked"),
            });
        }
        if !state.accounts.iter().any(|a| a.address == params.signer) {
            return Err(RpcError::Protocol {
                code: -32011,
                message: String::from("unknown signer"),
            });
        }
        Ok(format!("signed|{}|{}", params.signer, params.raw))
    }

    async fn submit_transaction(&self, params: SubmitTransactionParams) -> RpcResult<String> {
        let parts: Vec<&str> = params.data.split('|').collect();
        // signed|<sender>|raw|<recipient>|<amount>
        assert_eq!(parts.len(), 5, "malformed signed payload");
        let (sender, recipient) = (parts[1].to_owned(), parts[3].to_owned());
        let amount: u64 = parts[4].parse().expect("malformed amount");

        let mut hasher = Sha3_256::new();
        hasher.update(params.data.as_bytes());
        let hash = hex::encode(&hasher.finalize()[..16]);

        self.state.lock().pending.insert(
            hash.clone(),
            PendingTx {
                sender,
                recipient,
                amount,
                queries_left: self.confirmation_lag,
            },
        );
        Ok(hash)
    }

    async fn get_transaction(
        &self,
        params: GetTransactionParams,
    ) -> RpcResult<GetTransactionResult> {
        let mut state = self.state.lock();

        if let Some(height) = state.confirmed.get(&params.hash).copied() {
            return Ok(GetTransactionResult {
                hash: params.hash,
                receipt: json!({"ok": true}),
                height: Some(height),
            });
        }

        let confirm_now = match state.pending.get_mut(&params.hash) {
            Some(pending) => {
                pending.queries_left -= 1;
                pending.queries_left == 0
            }
            None => return Err(not_found()),
        };

        if !confirm_now {
            return Err(not_found());
        }

        let tx = state.pending.remove(&params.hash).expect("pending entry");
        for account in state.accounts.iter_mut() {
            if account.address == tx.sender {
                account.balance -= tx.amount;
            } else if account.address == tx.recipient {
                account.balance += tx.amount;
            }
        }
        let balance_after = state
            .accounts
            .iter()
            .find(|a| a.address == tx.recipient)
            .map(|a| a.balance)
            .unwrap_or(0);
        state.events.push(Event::Confirmed {
            recipient: tx.recipient,
            balance_after,
        });
        let height = state.confirmed.len() as u64 + 1;
        state.confirmed.insert(params.hash.clone(), height);

        Ok(GetTransactionResult {
            hash: params.hash,
            receipt: json!({"ok": true}),
            height: Some(height),
        })
    }

    async fn get_accounts(&self) -> RpcResult<GetAccountsResult> {
        Ok(GetAccountsResult {
            accounts: self.state.lock().accounts.clone(),
        })
    }
}

fn runner<'a>(mock: &'a MockLedger, clock: &'a SystemClock) -> HarnessRunner<'a, MockLedger> {
    HarnessRunner::new(
        mock,
        clock,
        BackoffConfig::default(),
        DEFAULT_PASSPHRASE.to_owned(),
    )
}

#[tokio::test(start_paused = true)]
async fn importing_the_known_key_derives_the_same_address_every_run() {
    let first = MockLedger::new();
    let second = MockLedger::new();

    let ctx_a = ScenarioDriver::new(&first, DEFAULT_PASSPHRASE.to_owned())
        .bootstrap()
        .await
        .unwrap();
    let ctx_b = ScenarioDriver::new(&second, DEFAULT_PASSPHRASE.to_owned())
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(ctx_a.origin, ctx_b.origin);
    assert_eq!(ctx_a.origin, derive_address(ORIGIN_PRIVATE_KEY));
    // derived accounts are distinct from each other and from origin
    assert_ne!(ctx_a.alex, ctx_a.bob);
    assert_ne!(ctx_a.alex, ctx_a.origin);
}

#[tokio::test(start_paused = true)]
async fn funding_transfer_confirms_within_the_poll_budget() {
    let clock = SystemClock;
    let mock = MockLedger::new();

    let ctx = ScenarioDriver::new(&mock, DEFAULT_PASSPHRASE.to_owned())
        .bootstrap()
        .await
        .unwrap();

    let workflow = TransferWorkflow::new(&mock, &clock, BackoffConfig::default());
    let hash = workflow
        .run(&ctx.origin, &ctx.alex, FUNDING_AMOUNT)
        .await
        .unwrap();

    // the confirmed record stays queryable, non-empty and error-free
    let record = mock
        .get_transaction(GetTransactionParams {
            hash: hash.0.clone(),
        })
        .await
        .unwrap();
    assert!(record.is_confirmed());
    assert!(record.height.is_some());

    assert_eq!(mock.balance_of(&ctx.alex), FUNDING_AMOUNT);
    assert_eq!(
        mock.balance_of(&ctx.origin),
        ORIGIN_GENESIS_BALANCE - FUNDING_AMOUNT
    );
}

#[tokio::test(start_paused = true)]
async fn full_scenario_accumulates_exactly_on_bob() {
    let clock = SystemClock;
    let mock = MockLedger::new().with_sync_lag(2);

    let ctx = runner(&mock, &clock).execute().await.unwrap();

    let expected_transfers = 2 + SEQUENTIAL_TRANSFERS as usize;
    assert_eq!(ctx.confirmed.len(), expected_transfers);

    // bob received his funding plus the ten sequential transfers, exactly
    let expected_bob = FUNDING_AMOUNT + u64::from(SEQUENTIAL_TRANSFERS) * TRANSFER_AMOUNT;
    assert_eq!(mock.balance_of(&ctx.bob), expected_bob);
    assert_eq!(mock.balance_of(&ctx.alex), FUNDING_AMOUNT);
    assert_eq!(
        mock.balance_of(&ctx.origin),
        ORIGIN_GENESIS_BALANCE - FUNDING_AMOUNT - expected_bob
    );

    // transfers were never pipelined: every creation follows the previous
    // confirmation, so the event log strictly alternates
    let events = mock.events();
    assert_eq!(events.len(), expected_transfers * 2);
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Created { .. } => assert_eq!(i % 2, 0, "creation out of order at {i}"),
            Event::Confirmed { .. } => assert_eq!(i % 2, 1, "confirmation out of order at {i}"),
        }
    }

    // bob's observable balance increased monotonically
    let bob_balances: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            Event::Confirmed {
                recipient,
                balance_after,
            } if *recipient == ctx.bob => Some(*balance_after),
            _ => None,
        })
        .collect();
    assert_eq!(bob_balances.len(), 1 + SEQUENTIAL_TRANSFERS as usize);
    assert!(bob_balances.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*bob_balances.last().unwrap(), expected_bob);
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_unlock_aborts_the_bootstrap() {
    let mock = MockLedger::new().failing_unlock();

    let err = ScenarioDriver::new(&mock, DEFAULT_PASSPHRASE.to_owned())
        .bootstrap()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HarnessError::StepFailed {
            step: "unlock_wallet"
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn confirmation_exhaustion_aborts_the_run() {
    let clock = SystemClock;
    let mock = MockLedger::new().with_confirmation_lag(u32::MAX);

    let ctx = ScenarioDriver::new(&mock, DEFAULT_PASSPHRASE.to_owned())
        .bootstrap()
        .await
        .unwrap();

    let workflow = TransferWorkflow::new(&mock, &clock, BackoffConfig::default());
    let err = workflow
        .run(&ctx.origin, &ctx.alex, FUNDING_AMOUNT)
        .await
        .unwrap_err();

    match err {
        HarnessError::ConfirmationExhausted { attempts, .. } => assert_eq!(attempts, 16),
        other => panic!("expected confirmation exhaustion, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn sync_wait_stops_on_the_first_positive_probe() {
    let clock = SystemClock;
    let mock = MockLedger::new().with_sync_lag(5);

    let status = runner(&mock, &clock).wait_for_sync().await.unwrap();
    assert!(status.synced);
    // five negative probes, then the sixth succeeded immediately
    assert_eq!(mock.sync_probes(), 6);
}

#[tokio::test(start_paused = true)]
async fn sync_exhaustion_is_a_timeout() {
    let clock = SystemClock;
    let mock = MockLedger::new().with_sync_lag(u32::MAX);

    let err = runner(&mock, &clock).wait_for_sync().await.unwrap_err();
    match err {
        HarnessError::SyncTimeout { attempts } => assert_eq!(attempts, 16),
        other => panic!("expected sync timeout, got {other:?}"),
    }
}

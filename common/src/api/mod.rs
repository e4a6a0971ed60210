use serde::{Deserialize, Serialize};
use serde_json::Value;

// Wallet seed language selector understood by the cluster (0 = english).
pub const SEED_LANGUAGE_ENGLISH: u8 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSyncStatusResult {
    // whether the replica set has converged on a common height
    pub synced: bool,
    // height the client-facing node currently observes
    pub height: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerEntry {
    pub id: u64,
    pub addr: String,
    pub version: String,
    pub height: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPeersResult {
    pub peers: Vec<PeerEntry>,
    pub total_peers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSeedParams {
    pub language: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSeedResult {
    // mnemonic phrase; consumed once by save_seed and never persisted here
    pub seed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSeedParams {
    pub seed: String,
    pub passphrase: String,
}

// State-changing wallet calls acknowledge with an explicit success flag;
// absence of a protocol error alone is not enough for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSeedResult {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockWalletParams {
    pub passphrase: String,
    // unlock for signing only, leaving staking subsystems untouched
    pub wallet_only: bool,
}

pub type UnlockWalletResult = SaveSeedResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPrivateKeyParams {
    pub private_key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPrivateKeyResult {
    // address derivation is a pure function of the key
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountParams {
    pub label: String,
}

pub type CreateAccountResult = ImportPrivateKeyResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRawTransactionParams {
    pub recipient: String,
    pub amount: u64,
    // plain value transfer, no token or contract semantics
    pub transfer_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransactionParams {
    // address whose key signs the payload; must be unlocked
    pub signer: String,
    // unsigned payload as returned by create_raw_transaction
    pub raw: String,
    // validity window, e.g. "2h"
    pub expiry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionParams {
    // signed payload in hex
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTransactionParams {
    pub hash: String,
}

/// Record returned by `get_transaction` once a broadcast transaction is
/// queryable. The receipt stays null until the cluster has ordered and
/// executed the transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTransactionResult {
    pub hash: String,
    #[serde(default)]
    pub receipt: Value,
    #[serde(default)]
    pub height: Option<u64>,
}

impl GetTransactionResult {
    pub fn is_confirmed(&self) -> bool {
        !self.receipt.is_null()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub label: String,
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountsResult {
    pub accounts: Vec<AccountEntry>,
}

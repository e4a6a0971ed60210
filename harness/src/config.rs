use std::time::Duration;

use clap::Parser;

use crate::poller::BackoffConfig;

// JSON-RPC endpoint of the client-facing node
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8801/json_rpc";

// Provisioning defaults
pub const DEFAULT_IMAGE: &str = "bftnet/node";
pub const DEFAULT_NETWORK: &str = "bftnet-e2e";
pub const NETWORK_SUBNET: &str = "172.28.0.0/24";
pub const REPLICA_COUNT: usize = 4;
pub const REPLICA_PORT: u16 = 13802;
pub const RPC_PORT: u16 = 8801;
// settling interval after the topology is launched
pub const DEFAULT_SETTLE_SECS: u64 = 15;

// Readiness poller defaults; delay after failed attempt i is
// base_delay * multiplier^i, so 16 attempts bound the total wait to
// base_delay * (2^16 - 1).
pub const DEFAULT_POLL_ATTEMPTS: u32 = 16;
pub const DEFAULT_POLL_BASE_DELAY_SECS: u64 = 1;
pub const DEFAULT_POLL_MULTIPLIER: u32 = 2;

// Wallet bootstrap
pub const DEFAULT_PASSPHRASE: &str = "bftnet-e2e";
// Known key whose derived address is funded at genesis; the baseline
// sender of every transfer in the scenario.
pub const ORIGIN_PRIVATE_KEY: &str =
    "4545d9a1babf9c216f0d687b9b25b2f7de1c2a01e42bc31d38e2afb4426b6d21";
// fixed validity window passed to sign_transaction
pub const SIGN_EXPIRY: &str = "2h";

// Scenario amounts, in base units
pub const FUNDING_AMOUNT: u64 = 10_000_000_000;
pub const TRANSFER_AMOUNT: u64 = 1_000_000_000;
pub const SEQUENTIAL_TRANSFERS: u32 = 10;

/// Command line configuration of a harness run
#[derive(Parser, Debug, Clone)]
#[command(name = "bftnet-harness")]
#[command(about = "End-to-end harness for a BFT ledger cluster")]
pub struct Config {
    /// JSON-RPC endpoint of the client-facing node
    #[clap(long, default_value_t = String::from(DEFAULT_ENDPOINT))]
    pub endpoint: String,

    /// Node image tag used when provisioning the topology
    #[clap(long, default_value_t = String::from(DEFAULT_IMAGE))]
    pub image: String,

    /// Name of the isolated network the nodes are attached to
    #[clap(long, default_value_t = String::from(DEFAULT_NETWORK))]
    pub network: String,

    /// Wallet passphrase used to persist the seed and unlock for signing
    #[clap(long, default_value_t = String::from(DEFAULT_PASSPHRASE))]
    pub passphrase: String,

    /// Seconds to wait after the topology is launched
    #[clap(long, default_value_t = DEFAULT_SETTLE_SECS)]
    pub settle_secs: u64,

    /// Maximum attempts for sync and confirmation polling
    #[clap(long, default_value_t = DEFAULT_POLL_ATTEMPTS)]
    pub poll_attempts: u32,

    /// Base delay of the exponential backoff, in seconds
    #[clap(long, default_value_t = DEFAULT_POLL_BASE_DELAY_SECS)]
    pub poll_base_delay_secs: u64,

    /// Backoff multiplier applied per failed attempt
    #[clap(long, default_value_t = DEFAULT_POLL_MULTIPLIER)]
    pub poll_multiplier: u32,

    /// Reuse an already-running cluster instead of provisioning one
    #[clap(long)]
    pub skip_provision: bool,

    /// Leave the cluster running after the scenario completes
    #[clap(long)]
    pub keep_cluster: bool,
}

impl Config {
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            max_attempts: self.poll_attempts,
            base_delay: Duration::from_secs(self.poll_base_delay_secs),
            multiplier: self.poll_multiplier,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

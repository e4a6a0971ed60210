use thiserror::Error;

use bftnet_common::rpc::RpcError;

use crate::provision::ProvisionError;

/// Run-level error taxonomy.
///
/// Any of these aborts the run; the distinction exists so the caller can
/// tell a broken transport from a refusing cluster from a cluster that
/// simply never confirmed in time.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    // the call succeeded at the protocol level but the cluster did not
    // acknowledge the state change
    #[error("step `{step}` was not acknowledged by the cluster")]
    StepFailed { step: &'static str },
    #[error("cluster did not reach sync within {attempts} probes")]
    SyncTimeout { attempts: u32 },
    #[error("transaction {hash} unconfirmed after {attempts} attempts")]
    ConfirmationExhausted { hash: String, attempts: u32 },
}

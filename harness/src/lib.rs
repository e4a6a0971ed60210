//! End-to-end harness for a BFT ledger cluster.
//!
//! The harness provisions an isolated five-node topology (four replicas and
//! one client-facing node), waits for the cluster to report itself
//! synchronized, bootstraps a wallet and then drives a sequence of dependent
//! transfer workflows, awaiting each confirmation before issuing the next.
//!
//! The consensus protocol itself is opaque to this crate: every interaction
//! goes through the client-facing node's JSON-RPC endpoint.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod poller;
pub mod provision;
pub mod runner;
pub mod scenario;
pub mod transfer;

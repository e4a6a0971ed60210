//! Shared types for the BFTNet end-to-end harness.
//!
//! This crate holds everything the harness and the cluster agree on over the
//! wire: the JSON-RPC envelope, the transport client used to reach the
//! client-facing node, and the parameter/result structs of every method the
//! harness consumes.

pub mod api;
pub mod rpc;

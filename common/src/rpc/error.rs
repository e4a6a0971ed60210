use reqwest::StatusCode;
use thiserror::Error;

/// The call could not be completed at the transport level.
///
/// None of these variants carry a decoded result; when the endpoint reports
/// a non-success status the body is discarded.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("request could not be sent: {0}")]
    Send(#[source] reqwest::Error),
    #[error("endpoint returned HTTP status {0}")]
    Status(StatusCode),
    #[error("response body could not be read: {0}")]
    Body(#[source] reqwest::Error),
    #[error("malformed JSON-RPC payload: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("response carries neither a result nor an error")]
    MissingResult,
}

/// Error taxonomy of a single RPC call.
///
/// Transport failures mean the exchange itself broke down; protocol errors
/// mean the cluster answered and refused. Retry policy lives with the
/// caller, never here.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("rpc error {code}: {message}")]
    Protocol { code: i32, message: String },
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

pub type RpcResult<T> = Result<T, RpcError>;

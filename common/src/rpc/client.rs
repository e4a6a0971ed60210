use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use super::{RpcError, RpcRequest, RpcResponse, RpcResult, TransportError};

/// Client for the JSON-RPC endpoint exposed by the client-facing node.
///
/// Sends one request, decodes one response. It performs no retries on its
/// own; bounded retry with backoff belongs one layer up, in the poller.
pub struct RpcClient {
    client: reqwest::Client,
    endpoint: Url,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)?
        } else {
            Url::parse(&format!("http://{}", endpoint))?
        };

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Send a single call and return its raw result payload.
    ///
    /// A non-success HTTP status fails with a transport error before any
    /// decoding happens; a non-null error member fails with a protocol
    /// error. When debug logging is enabled, the outgoing and incoming JSON
    /// are framed by begin/end markers so both sides of an exchange can be
    /// correlated by id.
    pub async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let request = RpcRequest::new(self.next_id(), method, params);

        if log::log_enabled!(log::Level::Debug) {
            debug!("--- rpc request #{} begin ---", request.id);
            debug!(
                "{}",
                serde_json::to_string(&request).unwrap_or_else(|_| String::from("<unencodable>"))
            );
            debug!("--- rpc request #{} end ---", request.id);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(TransportError::Send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status).into());
        }

        let body = response.text().await.map_err(TransportError::Body)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("--- rpc response #{} begin ---", request.id);
            debug!("{}", body.trim());
            debug!("--- rpc response #{} end ---", request.id);
        }

        let decoded: RpcResponse =
            serde_json::from_str(&body).map_err(TransportError::Envelope)?;

        if let Some(error) = decoded.error {
            return Err(RpcError::Protocol {
                code: error.code,
                message: error.message,
            });
        }

        decoded
            .result
            .ok_or_else(|| TransportError::MissingResult.into())
    }

    /// Call with typed params, decoding the result into `R`.
    pub async fn call_typed<P, R>(&self, method: &str, params: &P) -> RpcResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(TransportError::Envelope)?;
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| TransportError::Envelope(e).into())
    }

    /// Call a method that takes no parameters.
    pub async fn call_no_params<R: DeserializeOwned>(&self, method: &str) -> RpcResult<R> {
        let result = self.call(method, Value::Null).await?;
        serde_json::from_value(result).map_err(|e| TransportError::Envelope(e).into())
    }
}

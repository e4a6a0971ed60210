use async_trait::async_trait;
use log::trace;

use bftnet_common::api::*;
use bftnet_common::rpc::{RpcClient, RpcResult};

/// Full method surface the harness consumes from the client-facing node.
///
/// The HTTP client implements it for real runs; tests substitute an
/// in-process mock cluster.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn get_sync_status(&self) -> RpcResult<GetSyncStatusResult>;
    async fn get_peers(&self) -> RpcResult<GetPeersResult>;
    async fn generate_seed(&self, params: GenerateSeedParams) -> RpcResult<GenerateSeedResult>;
    async fn save_seed(&self, params: SaveSeedParams) -> RpcResult<SaveSeedResult>;
    async fn unlock_wallet(&self, params: UnlockWalletParams) -> RpcResult<UnlockWalletResult>;
    async fn import_private_key(
        &self,
        params: ImportPrivateKeyParams,
    ) -> RpcResult<ImportPrivateKeyResult>;
    async fn create_account(&self, params: CreateAccountParams) -> RpcResult<CreateAccountResult>;
    async fn create_raw_transaction(&self, params: CreateRawTransactionParams)
        -> RpcResult<String>;
    async fn sign_transaction(&self, params: SignTransactionParams) -> RpcResult<String>;
    async fn submit_transaction(&self, params: SubmitTransactionParams) -> RpcResult<String>;
    async fn get_transaction(&self, params: GetTransactionParams)
        -> RpcResult<GetTransactionResult>;
    async fn get_accounts(&self) -> RpcResult<GetAccountsResult>;
}

/// JSON-RPC implementation of [`LedgerApi`] over the transport client.
pub struct ClusterApi {
    client: RpcClient,
}

impl ClusterApi {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LedgerApi for ClusterApi {
    async fn get_sync_status(&self) -> RpcResult<GetSyncStatusResult> {
        trace!("get_sync_status");
        self.client.call_no_params("get_sync_status").await
    }

    async fn get_peers(&self) -> RpcResult<GetPeersResult> {
        trace!("get_peers");
        self.client.call_no_params("get_peers").await
    }

    async fn generate_seed(&self, params: GenerateSeedParams) -> RpcResult<GenerateSeedResult> {
        trace!("generate_seed");
        self.client.call_typed("generate_seed", &params).await
    }

    async fn save_seed(&self, params: SaveSeedParams) -> RpcResult<SaveSeedResult> {
        trace!("save_seed");
        self.client.call_typed("save_seed", &params).await
    }

    async fn unlock_wallet(&self, params: UnlockWalletParams) -> RpcResult<UnlockWalletResult> {
        trace!("unlock_wallet");
        self.client.call_typed("unlock_wallet", &params).await
    }

    async fn import_private_key(
        &self,
        params: ImportPrivateKeyParams,
    ) -> RpcResult<ImportPrivateKeyResult> {
        trace!("import_private_key");
        self.client.call_typed("import_private_key", &params).await
    }

    async fn create_account(&self, params: CreateAccountParams) -> RpcResult<CreateAccountResult> {
        trace!("create_account: {}", params.label);
        self.client.call_typed("create_account", &params).await
    }

    async fn create_raw_transaction(
        &self,
        params: CreateRawTransactionParams,
    ) -> RpcResult<String> {
        trace!("create_raw_transaction");
        self.client
            .call_typed("create_raw_transaction", &params)
            .await
    }

    async fn sign_transaction(&self, params: SignTransactionParams) -> RpcResult<String> {
        trace!("sign_transaction: signer {}", params.signer);
        self.client.call_typed("sign_transaction", &params).await
    }

    async fn submit_transaction(&self, params: SubmitTransactionParams) -> RpcResult<String> {
        trace!("submit_transaction");
        self.client.call_typed("submit_transaction", &params).await
    }

    async fn get_transaction(
        &self,
        params: GetTransactionParams,
    ) -> RpcResult<GetTransactionResult> {
        trace!("get_transaction: {}", params.hash);
        self.client.call_typed("get_transaction", &params).await
    }

    async fn get_accounts(&self) -> RpcResult<GetAccountsResult> {
        trace!("get_accounts");
        self.client.call_no_params("get_accounts").await
    }
}

use std::ops::{Deref, DerefMut};

use crate::EthQuery;
use ethers::types::{
    Address, Block, BlockNumber, Bytes, Filter, Log, Transaction, TransactionReceipt,
    TransactionRequest, TxHash, H256, U256, U64,
};
pub use jsonrpsee_core as core;
use jsonrpsee_core::{client::ClientT, params::ArrayParams, rpc_params, Error};
use serde::de::DeserializeOwned;

/// Adapter for [`ClientT`] to [`EthQuery`].
#[repr(transparent)]
pub struct Adapter<T: ClientT + Send + Sync>(pub T);

impl<T> Adapter<T>
where
    T: ClientT + Send + Sync,
{
    pub fn into_inner(self) -> T {
        self.0
    }

    async fn rpc<R>(&self, method: &'static str, params: ArrayParams) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        tracing::trace!("{method}");
        <T as ClientT>::request(&self.0, method, params).await
    }
}

impl<T> From<T> for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> AsRef<T> for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> Deref for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Clone for Adapter<T>
where
    T: ClientT + Send + Sync + Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> std::fmt::Debug for Adapter<T>
where
    T: ClientT + Send + Sync + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Adapter").field(&self.0).finish()
    }
}

#[async_trait::async_trait]
impl<T> EthQuery for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    type Error = Error;

    async fn block_number(&self) -> Result<U64, Self::Error> {
        self.rpc("eth_blockNumber", rpc_params![]).await
    }

    async fn chain_id(&self) -> Result<U256, Self::Error> {
        self.rpc("eth_chainId", rpc_params![]).await
    }

    async fn gas_price(&self) -> Result<U256, Self::Error> {
        self.rpc("eth_gasPrice", rpc_params![]).await
    }

    async fn accounts(&self) -> Result<Vec<Address>, Self::Error> {
        self.rpc("eth_accounts", rpc_params![]).await
    }

    async fn get_balance(&self, account: Address, at: BlockNumber) -> Result<U256, Self::Error> {
        self.rpc("eth_getBalance", rpc_params![account, at]).await
    }

    async fn get_transaction_count(
        &self,
        account: Address,
        at: BlockNumber,
    ) -> Result<U256, Self::Error> {
        self.rpc("eth_getTransactionCount", rpc_params![account, at]).await
    }

    async fn get_code(&self, account: Address, at: BlockNumber) -> Result<Bytes, Self::Error> {
        self.rpc("eth_getCode", rpc_params![account, at]).await
    }

    async fn get_storage_at(
        &self,
        account: Address,
        index: H256,
        at: BlockNumber,
    ) -> Result<H256, Self::Error> {
        self.rpc("eth_getStorageAt", rpc_params![account, index, at]).await
    }

    async fn call(&self, tx: &TransactionRequest, at: BlockNumber) -> Result<Bytes, Self::Error> {
        self.rpc("eth_call", rpc_params![tx, at]).await
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, Self::Error> {
        self.rpc("eth_estimateGas", rpc_params![tx]).await
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, Self::Error> {
        self.rpc("eth_sendTransaction", rpc_params![tx]).await
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash, Self::Error> {
        self.rpc("eth_sendRawTransaction", rpc_params![tx]).await
    }

    async fn transaction_by_hash(&self, tx: TxHash) -> Result<Option<Transaction>, Self::Error> {
        self.rpc("eth_getTransactionByHash", rpc_params![tx]).await
    }

    async fn transaction_receipt(
        &self,
        tx: TxHash,
    ) -> Result<Option<TransactionReceipt>, Self::Error> {
        self.rpc("eth_getTransactionReceipt", rpc_params![tx]).await
    }

    async fn block(&self, at: BlockNumber) -> Result<Option<Block<H256>>, Self::Error> {
        self.rpc("eth_getBlockByNumber", rpc_params![at, false]).await
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, Self::Error> {
        self.rpc("eth_getLogs", rpc_params![filter]).await
    }

    async fn new_filter(&self, filter: &Filter) -> Result<U256, Self::Error> {
        self.rpc("eth_newFilter", rpc_params![filter]).await
    }

    async fn new_block_filter(&self) -> Result<U256, Self::Error> {
        self.rpc("eth_newBlockFilter", rpc_params![]).await
    }

    async fn new_pending_transaction_filter(&self) -> Result<U256, Self::Error> {
        self.rpc("eth_newPendingTransactionFilter", rpc_params![]).await
    }

    async fn get_filter_changes<R>(&self, id: U256) -> Result<Vec<R>, Self::Error>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.rpc("eth_getFilterChanges", rpc_params![id]).await
    }

    async fn get_filter_logs(&self, id: U256) -> Result<Vec<Log>, Self::Error> {
        self.rpc("eth_getFilterLogs", rpc_params![id]).await
    }

    async fn uninstall_filter(&self, id: U256) -> Result<bool, Self::Error> {
        self.rpc("eth_uninstallFilter", rpc_params![id]).await
    }
}

#[cfg(feature = "jsonrpsee")]
pub mod jsonrpsee;

use async_trait::async_trait;
use ethers::types::{
    Address, Block, BlockNumber, Bytes, Filter, Log, Transaction, TransactionReceipt,
    TransactionRequest, TxHash, H256, U256, U64,
};
use serde::de::DeserializeOwned;

/// Ethereum JSON-RPC query methods.
///
/// Every method maps to exactly one `eth_*` call; implementors decide how the
/// request is transported.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait EthQuery: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current latest block number.
    async fn block_number(&self) -> Result<U64, Self::Error>;

    /// Returns the currently configured chain ID, a value used in replay-protected
    /// transaction signing as introduced by EIP-155.
    async fn chain_id(&self) -> Result<U256, Self::Error>;

    /// Returns the current gas price in wei.
    async fn gas_price(&self) -> Result<U256, Self::Error>;

    /// Returns a list of addresses owned by client.
    async fn accounts(&self) -> Result<Vec<Address>, Self::Error>;

    /// Returns the balance of the account.
    async fn get_balance(&self, account: Address, at: BlockNumber) -> Result<U256, Self::Error>;

    /// Returns the number of transactions sent from an address.
    async fn get_transaction_count(
        &self,
        account: Address,
        at: BlockNumber,
    ) -> Result<U256, Self::Error>;

    /// Returns code at a given account
    async fn get_code(&self, account: Address, at: BlockNumber) -> Result<Bytes, Self::Error>;

    /// Get storage value of address at index.
    async fn get_storage_at(
        &self,
        account: Address,
        index: H256,
        at: BlockNumber,
    ) -> Result<H256, Self::Error>;

    /// Executes a new message call immediately without creating a transaction on the blockchain.
    async fn call(&self, tx: &TransactionRequest, at: BlockNumber) -> Result<Bytes, Self::Error>;

    /// Returns an estimate of how much gas is necessary to allow the transaction to complete.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, Self::Error>;

    /// Submits an unsigned transaction which will be signed by the node
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, Self::Error>;

    /// Submits a pre-signed transaction for broadcast to the Ethereum network.
    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash, Self::Error>;

    /// Returns information about a transaction for a given hash.
    async fn transaction_by_hash(&self, tx: TxHash) -> Result<Option<Transaction>, Self::Error>;

    /// Returns the receipt of a transaction by transaction hash, `None` while the transaction
    /// is still pending.
    async fn transaction_receipt(
        &self,
        tx: TxHash,
    ) -> Result<Option<TransactionReceipt>, Self::Error>;

    /// Returns information about a block, transactions are returned as hashes.
    async fn block(&self, at: BlockNumber) -> Result<Option<Block<H256>>, Self::Error>;

    /// Returns an array of all logs matching a given filter object.
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, Self::Error>;

    /// Creates a filter object, based on filter options, to notify when the state changes (logs).
    async fn new_filter(&self, filter: &Filter) -> Result<U256, Self::Error>;

    /// Creates a filter in the node, to notify when a new block arrives.
    async fn new_block_filter(&self) -> Result<U256, Self::Error>;

    /// Creates a filter in the node, to notify when new pending transactions arrive.
    async fn new_pending_transaction_filter(&self) -> Result<U256, Self::Error>;

    /// Polling method for a filter, which returns an array of changes which occurred since
    /// last poll. The item type depends on the kind of filter.
    async fn get_filter_changes<R>(&self, id: U256) -> Result<Vec<R>, Self::Error>
    where
        R: DeserializeOwned + Send + 'static;

    /// Returns an array of all logs matching filter with given id.
    async fn get_filter_logs(&self, id: U256) -> Result<Vec<Log>, Self::Error>;

    /// Uninstalls a filter with given id.
    async fn uninstall_filter(&self, id: U256) -> Result<bool, Self::Error>;
}

//! Ethereum convenience client.
//!
//! [`Eth`] bundles a JSON-RPC query client with a filter manager, contract bindings and a helper
//! that waits for transactions to be mined. The query methods of [`EthQuery`] are reachable
//! directly on [`Eth`].
use ethers::types::TxHash;
use jsonrpsee::{
    http_client::{HttpClient, HttpClientBuilder},
    ws_client::{WsClient, WsClientBuilder},
};
use std::{ops::Deref, sync::Arc};

mod config;
pub mod contract;
mod error;
pub mod filter;
#[cfg(test)]
mod mock;
pub mod receipt;
pub mod units;
pub mod util;

pub use config::{
    ConfigError, EthOptions, ReceiptConfig, DEFAULT_FILTER_INTERVAL, DEFAULT_RECEIPT_INTERVAL,
    DEFAULT_RECEIPT_TIMEOUT,
};
pub use contract::{Contract, ContractError, ContractFactory, DecodedEvent, MethodOutput};
pub use error::{Error, LogErrorExt, TruncatedError};
pub use ethers::abi::{Abi, Token};
pub use ethers::types::{Bytes, U256};
pub use ethkit_backend::{jsonrpsee::Adapter, EthQuery};
pub use filter::{EthFilter, FilterHandle, FilterWatch};
pub use receipt::{ReceiptError, ReceiptResult, ReceiptWaiter};
pub use units::{from_wei, parse_u256, to_wei, UnitError};
pub use util::{
    from_ascii, from_utf8, hex_to_bytes, is_address, is_hex_string, keccak256, strip_hex_prefix,
    to_ascii, to_utf8, HexError,
};

/// Query client backed by a `jsonrpsee` HTTP client.
pub type HttpQuery = Adapter<HttpClient>;

/// Query client backed by a `jsonrpsee` WebSocket client.
pub type WsQuery = Adapter<WsClient>;

/// Facade over a query client.
#[derive(Debug)]
pub struct Eth<Q> {
    query: Arc<Q>,
    options: EthOptions,
    filter: EthFilter<Arc<Q>>,
    receipts: ReceiptWaiter<Arc<Q>>,
}

impl<Q> Clone for Eth<Q> {
    fn clone(&self) -> Self {
        Self {
            query: Arc::clone(&self.query),
            options: self.options.clone(),
            filter: self.filter.clone(),
            receipts: self.receipts.clone(),
        }
    }
}

impl Eth<HttpQuery> {
    /// Connects to a node over HTTP.
    ///
    /// # Errors
    /// Fails if `options` are invalid or the client can't be built from `url`.
    pub fn http(url: &str, options: EthOptions) -> Result<Self, Error> {
        let client = HttpClientBuilder::default().build(url)?;
        tracing::debug!("http client created for {url}");
        Ok(Self::new(Adapter(client), options)?)
    }
}

impl Eth<WsQuery> {
    /// Connects to a node over WebSocket.
    ///
    /// # Errors
    /// Fails if `options` are invalid or the connection can't be established.
    pub async fn ws(url: &str, options: EthOptions) -> Result<Self, Error> {
        // Validate before opening the connection.
        options.receipt()?;
        options.filter_interval()?;
        let client = WsClientBuilder::default().build(url).await?;
        tracing::debug!("websocket connected to {url}");
        Ok(Self::new(Adapter(client), options)?)
    }
}

impl<Q> Eth<Q>
where
    Q: EthQuery,
{
    /// # Errors
    /// Returns [`ConfigError`] if a polling interval is zero.
    pub fn new(query: Q, options: EthOptions) -> Result<Self, ConfigError> {
        let receipt = options.receipt()?;
        let filter_interval = options.filter_interval()?;
        let query = Arc::new(query);
        Ok(Self {
            filter: EthFilter::new(Arc::clone(&query), filter_interval),
            receipts: ReceiptWaiter::new(Arc::clone(&query), receipt),
            query,
            options,
        })
    }

    /// Replaces the query client, filters and contracts created before keep using the old one.
    pub fn set_provider(&mut self, query: Q) {
        let query = Arc::new(query);
        self.filter = EthFilter::new(Arc::clone(&query), self.filter.poll_interval());
        self.receipts = ReceiptWaiter::new(Arc::clone(&query), *self.receipts.config());
        self.query = query;
    }

    pub const fn provider(&self) -> &Arc<Q> {
        &self.query
    }

    pub const fn options(&self) -> &EthOptions {
        &self.options
    }

    pub const fn filter(&self) -> &EthFilter<Arc<Q>> {
        &self.filter
    }

    /// Bindings for `abi`, see [`ContractFactory`].
    pub fn contract(&self, abi: Abi) -> ContractFactory<Arc<Q>> {
        ContractFactory::new(Arc::clone(&self.query), abi)
    }

    /// Waits until `tx` is mined, polling its receipt with the configured interval and timeout.
    ///
    /// # Errors
    /// Returns the query error verbatim or [`ReceiptError::Timeout`].
    pub async fn get_transaction_success(&self, tx: TxHash) -> ReceiptResult<Q::Error> {
        self.receipts.wait(tx).await
    }

    /// Same as [`Eth::get_transaction_success`], `on_done` receives the outcome once.
    ///
    /// # Errors
    /// Returns the query error verbatim or [`ReceiptError::Timeout`].
    pub async fn get_transaction_success_with<F>(
        &self,
        tx: TxHash,
        on_done: F,
    ) -> ReceiptResult<Q::Error>
    where
        F: FnOnce(&ReceiptResult<Q::Error>),
    {
        self.receipts.wait_with(tx, on_done).await
    }
}

impl<Q> Deref for Eth<Q> {
    type Target = Q;

    fn deref(&self) -> &Self::Target {
        &self.query
    }
}

//! Scripted [`EthQuery`] used by the unit tests. Every request is recorded and answered with the
//! next queued response, or the fallback once the queue is drained.
use async_trait::async_trait;
use ethers::types::{
    Address, Block, BlockNumber, Bytes, Filter, Log, Transaction, TransactionReceipt,
    TransactionRequest, TxHash, H256, U256, U64,
};
use ethkit_backend::EthQuery;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

#[derive(Debug, Clone)]
struct Response {
    result: Result<Value, MockError>,
    delay: Duration,
}

#[derive(Debug, Default)]
struct Inner {
    responses: VecDeque<Response>,
    fallback: Option<Response>,
    requests: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default)]
pub struct MockQuery {
    inner: Arc<Mutex<Inner>>,
}

impl MockQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, value: Value) {
        self.add_delayed_response(value, Duration::ZERO);
    }

    pub fn add_delayed_response(&self, value: Value, delay: Duration) {
        self.push(Response { result: Ok(value), delay });
    }

    pub fn add_error(&self, message: &str) {
        self.push(Response { result: Err(MockError(message.into())), delay: Duration::ZERO });
    }

    /// Answer used once every queued response has been consumed.
    pub fn set_fallback(&self, value: Value) {
        self.inner.lock().unwrap().fallback =
            Some(Response { result: Ok(value), delay: Duration::ZERO });
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.inner.lock().unwrap().requests.iter().filter(|(name, _)| name == method).count()
    }

    pub fn assert_request(&self, index: usize, method: &str, params: &Value) {
        let requests = self.requests();
        let Some((name, actual)) = requests.get(index) else {
            panic!("request #{index} was never sent, got {requests:?}");
        };
        assert_eq!(name, method, "unexpected method for request #{index}");
        assert_eq!(actual, params, "unexpected params for request #{index}");
    }

    fn push(&self, response: Response) {
        self.inner.lock().unwrap().responses.push_back(response);
    }

    async fn respond<R>(&self, method: &str, params: Value) -> Result<R, MockError>
    where
        R: DeserializeOwned,
    {
        let response = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push((method.to_string(), params));
            inner.responses.pop_front().or_else(|| inner.fallback.clone())
        };
        let Some(Response { result, delay }) = response else {
            return Err(MockError(format!("no response scripted for {method}")));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        serde_json::from_value(result?).map_err(|error| MockError(error.to_string()))
    }
}

fn value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap()
}

#[async_trait]
impl EthQuery for MockQuery {
    type Error = MockError;

    async fn block_number(&self) -> Result<U64, Self::Error> {
        self.respond("eth_blockNumber", json!([])).await
    }

    async fn chain_id(&self) -> Result<U256, Self::Error> {
        self.respond("eth_chainId", json!([])).await
    }

    async fn gas_price(&self) -> Result<U256, Self::Error> {
        self.respond("eth_gasPrice", json!([])).await
    }

    async fn accounts(&self) -> Result<Vec<Address>, Self::Error> {
        self.respond("eth_accounts", json!([])).await
    }

    async fn get_balance(&self, account: Address, at: BlockNumber) -> Result<U256, Self::Error> {
        self.respond("eth_getBalance", json!([account, at])).await
    }

    async fn get_transaction_count(
        &self,
        account: Address,
        at: BlockNumber,
    ) -> Result<U256, Self::Error> {
        self.respond("eth_getTransactionCount", json!([account, at])).await
    }

    async fn get_code(&self, account: Address, at: BlockNumber) -> Result<Bytes, Self::Error> {
        self.respond("eth_getCode", json!([account, at])).await
    }

    async fn get_storage_at(
        &self,
        account: Address,
        index: H256,
        at: BlockNumber,
    ) -> Result<H256, Self::Error> {
        self.respond("eth_getStorageAt", json!([account, index, at])).await
    }

    async fn call(&self, tx: &TransactionRequest, at: BlockNumber) -> Result<Bytes, Self::Error> {
        self.respond("eth_call", json!([value(tx), at])).await
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, Self::Error> {
        self.respond("eth_estimateGas", json!([value(tx)])).await
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, Self::Error> {
        self.respond("eth_sendTransaction", json!([value(tx)])).await
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash, Self::Error> {
        self.respond("eth_sendRawTransaction", json!([tx])).await
    }

    async fn transaction_by_hash(&self, tx: TxHash) -> Result<Option<Transaction>, Self::Error> {
        self.respond("eth_getTransactionByHash", json!([tx])).await
    }

    async fn transaction_receipt(
        &self,
        tx: TxHash,
    ) -> Result<Option<TransactionReceipt>, Self::Error> {
        self.respond("eth_getTransactionReceipt", json!([tx])).await
    }

    async fn block(&self, at: BlockNumber) -> Result<Option<Block<H256>>, Self::Error> {
        self.respond("eth_getBlockByNumber", json!([at, false])).await
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, Self::Error> {
        self.respond("eth_getLogs", json!([value(filter)])).await
    }

    async fn new_filter(&self, filter: &Filter) -> Result<U256, Self::Error> {
        self.respond("eth_newFilter", json!([value(filter)])).await
    }

    async fn new_block_filter(&self) -> Result<U256, Self::Error> {
        self.respond("eth_newBlockFilter", json!([])).await
    }

    async fn new_pending_transaction_filter(&self) -> Result<U256, Self::Error> {
        self.respond("eth_newPendingTransactionFilter", json!([])).await
    }

    async fn get_filter_changes<R>(&self, id: U256) -> Result<Vec<R>, Self::Error>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.respond("eth_getFilterChanges", json!([id])).await
    }

    async fn get_filter_logs(&self, id: U256) -> Result<Vec<Log>, Self::Error> {
        self.respond("eth_getFilterLogs", json!([id])).await
    }

    async fn uninstall_filter(&self, id: U256) -> Result<bool, Self::Error> {
        self.respond("eth_uninstallFilter", json!([id])).await
    }
}

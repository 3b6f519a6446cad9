use ethers::abi::{Abi, Error as AbiError, Function, LogParam, RawLog, StateMutability, Token};
use ethers::types::{
    Address, BlockNumber, Bytes, Filter, Log, NameOrAddress, TransactionRequest, TxHash, U256,
};
use ethkit_backend::EthQuery;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ContractError<E> {
    /// Unknown function or event, or arguments that don't match the ABI.
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Rpc(E),

    #[error("contract bytecode is required to deploy")]
    MissingBytecode,

    /// Anonymous events have no signature topic to filter on.
    #[error("event {0} is anonymous")]
    AnonymousEvent(String),
}

/// Result of [`Contract::invoke`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutput {
    /// Decoded outputs of a `view` or `pure` function.
    Return(Vec<Token>),
    /// Hash of the transaction sent for a state changing function.
    Submitted(TxHash),
}

/// Event decoded from a log.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub params: Vec<LogParam>,
}

/// Creates [`Contract`] bindings for a single ABI.
#[derive(Debug, Clone)]
pub struct ContractFactory<Q> {
    query: Q,
    abi: Arc<Abi>,
    bytecode: Option<Bytes>,
    defaults: TransactionRequest,
}

impl<Q> ContractFactory<Q>
where
    Q: EthQuery + Clone,
{
    pub fn new(query: Q, abi: Abi) -> Self {
        Self { query, abi: Arc::new(abi), bytecode: None, defaults: TransactionRequest::default() }
    }

    /// Creation code used by [`ContractFactory::deploy`].
    #[must_use]
    pub fn with_bytecode(mut self, bytecode: impl Into<Bytes>) -> Self {
        self.bytecode = Some(bytecode.into());
        self
    }

    /// Transaction fields applied to every call and transaction unless overridden.
    #[must_use]
    pub fn with_defaults(mut self, defaults: TransactionRequest) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Binds the ABI to a deployed contract.
    pub fn at(&self, address: Address) -> Contract<Q> {
        Contract {
            query: self.query.clone(),
            abi: Arc::clone(&self.abi),
            address,
            defaults: self.defaults.clone(),
        }
    }

    /// Sends the creation transaction, `args` are encoded with the ABI constructor.
    ///
    /// # Errors
    /// Fails if no bytecode was provided, if `args` don't match the constructor or if
    /// `eth_sendTransaction` fails.
    pub async fn deploy(
        &self,
        args: &[Token],
        overrides: TransactionRequest,
    ) -> Result<TxHash, ContractError<Q::Error>> {
        let bytecode = self.bytecode.as_ref().ok_or(ContractError::MissingBytecode)?;
        let data = match self.abi.constructor() {
            Some(constructor) => constructor.encode_input(bytecode.to_vec(), args)?,
            None if args.is_empty() => bytecode.to_vec(),
            None => return Err(AbiError::InvalidData.into()),
        };
        let mut tx = merge(&self.defaults, overrides);
        tx.to = None;
        tx.data = Some(data.into());
        let hash = self.query.send_transaction(&tx).await.map_err(ContractError::Rpc)?;
        tracing::debug!("contract deployment sent: {hash:?}");
        Ok(hash)
    }
}

/// ABI bound to a contract address.
#[derive(Debug, Clone)]
pub struct Contract<Q> {
    query: Q,
    abi: Arc<Abi>,
    address: Address,
    defaults: TransactionRequest,
}

impl<Q> Contract<Q>
where
    Q: EthQuery,
{
    pub const fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Calls `name` against the latest block and decodes its outputs.
    ///
    /// # Errors
    /// Fails on ABI mismatch or if `eth_call` fails.
    pub async fn call(
        &self,
        name: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, ContractError<Q::Error>> {
        self.call_at(name, args, BlockNumber::Latest).await
    }

    /// # Errors
    /// Fails on ABI mismatch or if `eth_call` fails.
    pub async fn call_at(
        &self,
        name: &str,
        args: &[Token],
        at: BlockNumber,
    ) -> Result<Vec<Token>, ContractError<Q::Error>> {
        let function = self.abi.function(name)?;
        let tx = self.transaction(function.encode_input(args)?, TransactionRequest::default());
        let output = self.query.call(&tx, at).await.map_err(ContractError::Rpc)?;
        Ok(function.decode_output(&output)?)
    }

    /// Sends a transaction invoking `name`.
    ///
    /// # Errors
    /// Fails on ABI mismatch or if `eth_sendTransaction` fails.
    pub async fn send(
        &self,
        name: &str,
        args: &[Token],
        overrides: TransactionRequest,
    ) -> Result<TxHash, ContractError<Q::Error>> {
        let function = self.abi.function(name)?;
        let tx = self.transaction(function.encode_input(args)?, overrides);
        let hash = self.query.send_transaction(&tx).await.map_err(ContractError::Rpc)?;
        tracing::debug!("{name} sent to {:?}: {hash:?}", self.address);
        Ok(hash)
    }

    /// # Errors
    /// Fails on ABI mismatch or if `eth_estimateGas` fails.
    pub async fn estimate_gas(
        &self,
        name: &str,
        args: &[Token],
        overrides: TransactionRequest,
    ) -> Result<U256, ContractError<Q::Error>> {
        let function = self.abi.function(name)?;
        let tx = self.transaction(function.encode_input(args)?, overrides);
        self.query.estimate_gas(&tx).await.map_err(ContractError::Rpc)
    }

    /// Calls `view` and `pure` functions, sends a transaction with the defaults otherwise.
    ///
    /// # Errors
    /// See [`Contract::call`] and [`Contract::send`].
    pub async fn invoke(
        &self,
        name: &str,
        args: &[Token],
    ) -> Result<MethodOutput, ContractError<Q::Error>> {
        if is_constant(self.abi.function(name)?) {
            self.call(name, args).await.map(MethodOutput::Return)
        } else {
            let overrides = TransactionRequest::default();
            self.send(name, args, overrides).await.map(MethodOutput::Submitted)
        }
    }

    /// Filter matching the logs of event `name` emitted by this contract.
    ///
    /// # Errors
    /// Fails if the event is unknown or anonymous.
    pub fn event_filter(&self, name: &str) -> Result<Filter, ContractError<Q::Error>> {
        let event = self.abi.event(name)?;
        if event.anonymous {
            return Err(ContractError::AnonymousEvent(event.name.clone()));
        }
        Ok(Filter::new().address(self.address).topic0(event.signature()))
    }

    /// Decodes a log emitted by one of the ABI's non-anonymous events, `None` if no event matches.
    pub fn decode_log(&self, log: &Log) -> Option<DecodedEvent> {
        let topic = log.topics.first()?;
        let event = self
            .abi
            .events()
            .find(|event| !event.anonymous && event.signature() == *topic)?;
        let raw = RawLog { topics: log.topics.clone(), data: log.data.to_vec() };
        match event.parse_log(raw) {
            Ok(decoded) => Some(DecodedEvent { name: event.name.clone(), params: decoded.params }),
            Err(error) => {
                tracing::debug!("log doesn't match event {}: {error}", event.name);
                None
            },
        }
    }

    fn transaction(&self, data: Vec<u8>, overrides: TransactionRequest) -> TransactionRequest {
        let mut tx = merge(&self.defaults, overrides);
        tx.to = Some(NameOrAddress::Address(self.address));
        tx.data = Some(data.into());
        tx
    }
}

#[allow(deprecated)]
fn is_constant(function: &Function) -> bool {
    function.constant.unwrap_or(false) ||
        matches!(function.state_mutability, StateMutability::Pure | StateMutability::View)
}

/// Fields set in `overrides` win over `defaults`.
fn merge(defaults: &TransactionRequest, overrides: TransactionRequest) -> TransactionRequest {
    let mut tx = overrides;
    tx.from = tx.from.or(defaults.from);
    tx.to = tx.to.or_else(|| defaults.to.clone());
    tx.gas = tx.gas.or(defaults.gas);
    tx.gas_price = tx.gas_price.or(defaults.gas_price);
    tx.value = tx.value.or(defaults.value);
    tx.data = tx.data.or_else(|| defaults.data.clone());
    tx.nonce = tx.nonce.or(defaults.nonce);
    tx.chain_id = tx.chain_id.or(defaults.chain_id);
    tx
}

use crate::{config::ReceiptConfig, error::LogErrorExt};
use ethers::types::{TransactionReceipt, TxHash};
use ethkit_backend::EthQuery;
use futures_util::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Outcome of waiting for a transaction receipt.
pub type ReceiptResult<E> = Result<TransactionReceipt, ReceiptError<E>>;

/// Pending `eth_getTransactionReceipt` request, tagged with the budget consumed once it was sent.
type ReceiptRequest<'a, E> = BoxFuture<'a, (Duration, Result<Option<TransactionReceipt>, E>)>;

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError<E> {
    /// `eth_getTransactionReceipt` failed, the error is returned as is.
    #[error(transparent)]
    Rpc(E),

    /// No receipt was found within the configured timeout.
    #[error("Receipt timeout waiting for tx hash: {0:?}")]
    Timeout(TxHash),
}

impl<E> ReceiptError<E> {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Waits for a transaction to be mined by polling `eth_getTransactionReceipt`.
///
/// A new request is issued every `interval`, regardless of whether the previous request has
/// completed, so slow nodes may see overlapping requests. Every request consumes `interval` from
/// the `timeout` budget. The wait settles exactly once, with the first of:
/// - a request failing, the error is returned verbatim;
/// - a request returning a receipt;
/// - a request that consumed the last of the budget returning no receipt, or the budget being
///   exhausted while requests are still in flight.
///
/// Once settled the timer is dropped and the results of in-flight requests are discarded.
#[derive(Debug, Clone)]
pub struct ReceiptWaiter<Q> {
    query: Q,
    config: ReceiptConfig,
}

impl<Q: EthQuery> ReceiptWaiter<Q> {
    pub const fn new(query: Q, config: ReceiptConfig) -> Self {
        Self { query, config }
    }

    pub const fn config(&self) -> &ReceiptConfig {
        &self.config
    }

    pub const fn query(&self) -> &Q {
        &self.query
    }

    /// Waits until the receipt of `tx` is available.
    ///
    /// # Errors
    /// See [`ReceiptWaiter`] for the conditions under which an error is returned.
    pub async fn wait(&self, tx: TxHash) -> ReceiptResult<Q::Error> {
        self.poll_receipt(tx).await
    }

    /// Same as [`ReceiptWaiter::wait`], `on_done` is invoked with the outcome right before it is
    /// returned.
    ///
    /// # Errors
    /// See [`ReceiptWaiter`] for the conditions under which an error is returned.
    pub async fn wait_with<F>(&self, tx: TxHash, on_done: F) -> ReceiptResult<Q::Error>
    where
        F: FnOnce(&ReceiptResult<Q::Error>),
    {
        let outcome = self.poll_receipt(tx).await;
        on_done(&outcome);
        outcome
    }

    async fn poll_receipt(&self, tx: TxHash) -> ReceiptResult<Q::Error> {
        let interval = self.config.interval();
        let timeout = self.config.timeout();

        // The first request is sent one interval after the call.
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Budget consumed by the requests issued so far.
        let mut elapsed = Duration::ZERO;
        let mut attempts = 0u32;
        let mut in_flight = FuturesUnordered::<ReceiptRequest<'_, Q::Error>>::new();

        loop {
            tokio::select! {
                // Settle on completed requests before issuing new ones.
                biased;

                Some((budget, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    match result {
                        Ok(Some(receipt)) => return Ok(receipt),
                        Ok(None) if budget >= timeout => {
                            tracing::warn!("no receipt for {tx:?} after {timeout:?}");
                            return Err(ReceiptError::Timeout(tx));
                        },
                        Ok(None) => {},
                        Err(error) => {
                            tracing::error!(
                                "failed to retrieve receipt for {tx:?}: {}",
                                error.truncate()
                            );
                            return Err(ReceiptError::Rpc(error));
                        },
                    }
                },

                _ = ticker.tick() => {
                    if attempts > 0 && elapsed >= timeout {
                        tracing::warn!(
                            "no receipt for {tx:?} after {timeout:?}, {} request(s) pending",
                            in_flight.len()
                        );
                        return Err(ReceiptError::Timeout(tx));
                    }
                    attempts += 1;
                    elapsed = elapsed.saturating_add(interval);
                    tracing::debug!("polling receipt for {tx:?}, attempt {attempts}");

                    let budget = elapsed;
                    let request = self.query.transaction_receipt(tx);
                    in_flight.push(async move { (budget, request.await) }.boxed());
                },
            }
        }
    }
}

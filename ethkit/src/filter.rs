use crate::error::LogErrorExt;
use ethers::types::{Filter, Log, TxHash, H256, U256};
use ethkit_backend::EthQuery;
use futures_util::{future::BoxFuture, FutureExt, Stream};
use serde::de::DeserializeOwned;
use std::{
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Filter created with `eth_newFilter`, changes are logs.
pub type LogFilter<Q> = FilterHandle<Q, Log>;

/// Filter created with `eth_newBlockFilter`, changes are block hashes.
pub type BlockFilter<Q> = FilterHandle<Q, H256>;

/// Filter created with `eth_newPendingTransactionFilter`, changes are transaction hashes.
pub type PendingTransactionFilter<Q> = FilterHandle<Q, TxHash>;

/// Installs filters on the node and hands out handles to poll them.
#[derive(Debug, Clone)]
pub struct EthFilter<Q> {
    query: Q,
    poll_interval: Duration,
}

impl<Q> EthFilter<Q>
where
    Q: EthQuery + Clone,
{
    pub const fn new(query: Q, poll_interval: Duration) -> Self {
        Self { query, poll_interval }
    }

    /// Interval used by [`FilterHandle::watch`].
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// # Errors
    /// Returns the query error if `eth_newFilter` fails.
    pub async fn new_filter(&self, filter: &Filter) -> Result<LogFilter<Q>, Q::Error> {
        let id = self.query.new_filter(filter).await?;
        tracing::debug!("installed log filter {id:#x}");
        Ok(self.handle(id))
    }

    /// # Errors
    /// Returns the query error if `eth_newBlockFilter` fails.
    pub async fn new_block_filter(&self) -> Result<BlockFilter<Q>, Q::Error> {
        let id = self.query.new_block_filter().await?;
        tracing::debug!("installed block filter {id:#x}");
        Ok(self.handle(id))
    }

    /// # Errors
    /// Returns the query error if `eth_newPendingTransactionFilter` fails.
    pub async fn new_pending_transaction_filter(
        &self,
    ) -> Result<PendingTransactionFilter<Q>, Q::Error> {
        let id = self.query.new_pending_transaction_filter().await?;
        tracing::debug!("installed pending transaction filter {id:#x}");
        Ok(self.handle(id))
    }

    fn handle<R>(&self, id: U256) -> FilterHandle<Q, R> {
        FilterHandle {
            query: self.query.clone(),
            id,
            poll_interval: self.poll_interval,
            _marker: PhantomData,
        }
    }
}

/// An installed filter, `R` is the type of the changes reported by the node.
pub struct FilterHandle<Q, R> {
    query: Q,
    id: U256,
    poll_interval: Duration,
    _marker: PhantomData<fn() -> R>,
}

impl<Q: Clone, R> Clone for FilterHandle<Q, R> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            id: self.id,
            poll_interval: self.poll_interval,
            _marker: PhantomData,
        }
    }
}

impl<Q, R> std::fmt::Debug for FilterHandle<Q, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterHandle")
            .field("id", &self.id)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<Q, R> FilterHandle<Q, R>
where
    Q: EthQuery,
    R: DeserializeOwned + Send + 'static,
{
    pub const fn id(&self) -> U256 {
        self.id
    }

    /// Changes since the last poll.
    ///
    /// # Errors
    /// Returns the query error if `eth_getFilterChanges` fails.
    pub async fn changes(&self) -> Result<Vec<R>, Q::Error> {
        self.query.get_filter_changes(self.id).await
    }

    /// Removes the filter from the node, returns `false` if the node didn't know about it.
    ///
    /// # Errors
    /// Returns the query error if `eth_uninstallFilter` fails.
    pub async fn uninstall(self) -> Result<bool, Q::Error> {
        let removed = self.query.uninstall_filter(self.id).await?;
        tracing::debug!("uninstalled filter {:#x}: {removed}", self.id);
        Ok(removed)
    }
}

impl<Q> FilterHandle<Q, Log>
where
    Q: EthQuery,
{
    /// Every log matching the filter.
    ///
    /// # Errors
    /// Returns the query error if `eth_getFilterLogs` fails.
    pub async fn logs(&self) -> Result<Vec<Log>, Q::Error> {
        self.query.get_filter_logs(self.id).await
    }
}

impl<Q, R> FilterHandle<Q, R>
where
    Q: EthQuery + Clone + Unpin + 'static,
    R: DeserializeOwned + Send + 'static,
{
    /// Polls the filter every `poll_interval`, the first poll happens one interval from now.
    ///
    /// Must be called within a tokio runtime.
    pub fn watch(&self) -> FilterWatch<Q, R> {
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        FilterWatch {
            query: self.query.clone(),
            id: self.id,
            ticker,
            pending: None,
        }
    }
}

/// Stream of filter changes.
///
/// Polls returning no changes are skipped, failed polls are yielded as errors and the stream
/// keeps polling. The stream never ends, dropping it stops the polling but leaves the filter
/// installed on the node.
pub struct FilterWatch<Q: EthQuery, R> {
    /// Query client used to fetch the changes.
    query: Q,

    /// Filter identifier.
    id: U256,

    /// Controls when the next `eth_getFilterChanges` is sent.
    ticker: Interval,

    /// Request in flight, at most one at a time.
    pending: Option<BoxFuture<'static, Result<Vec<R>, Q::Error>>>,
}

impl<Q: EthQuery, R> FilterWatch<Q, R> {
    pub const fn id(&self) -> U256 {
        self.id
    }
}

impl<Q, R> Stream for FilterWatch<Q, R>
where
    Q: EthQuery + Clone + Unpin + 'static,
    R: DeserializeOwned + Send + 'static,
{
    type Item = Result<Vec<R>, Q::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(mut pending) = self.pending.take() {
                match pending.poll_unpin(cx) {
                    Poll::Pending => {
                        self.pending = Some(pending);
                        return Poll::Pending;
                    },
                    Poll::Ready(Ok(changes)) if changes.is_empty() => {},
                    Poll::Ready(Ok(changes)) => return Poll::Ready(Some(Ok(changes))),
                    Poll::Ready(Err(error)) => {
                        tracing::warn!(
                            "failed to poll filter {:#x}: {}",
                            self.id,
                            error.truncate()
                        );
                        return Poll::Ready(Some(Err(error)));
                    },
                }
            }

            if self.ticker.poll_tick(cx).is_pending() {
                return Poll::Pending;
            }
            let query = self.query.clone();
            let id = self.id;
            self.pending = Some(async move { query.get_filter_changes::<R>(id).await }.boxed());
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between two `eth_getTransactionReceipt` requests.
pub const DEFAULT_RECEIPT_INTERVAL: Duration = Duration::from_millis(7_000);

/// Default budget for waiting on a transaction receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_millis(800_000);

/// Default interval between two `eth_getFilterChanges` requests.
pub const DEFAULT_FILTER_INTERVAL: Duration = Duration::from_millis(300);

/// Invalid [`EthOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("receipt polling interval must be greater than zero")]
    ZeroInterval,
    #[error("filter polling interval must be greater than zero")]
    ZeroFilterInterval,
}

/// Options accepted by [`crate::Eth`], all durations are in milliseconds.
///
/// ```json
/// { "timeout": 800000, "interval": 7000, "filterInterval": 300 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EthOptions {
    /// Receipt polling budget.
    pub timeout: u64,
    /// Receipt polling interval.
    pub interval: u64,
    /// Filter polling interval.
    pub filter_interval: u64,
}

impl Default for EthOptions {
    fn default() -> Self {
        Self {
            timeout: millis(DEFAULT_RECEIPT_TIMEOUT),
            interval: millis(DEFAULT_RECEIPT_INTERVAL),
            filter_interval: millis(DEFAULT_FILTER_INTERVAL),
        }
    }
}

impl EthOptions {
    /// Validated receipt polling configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroInterval`] if `interval` is zero.
    pub fn receipt(&self) -> Result<ReceiptConfig, ConfigError> {
        ReceiptConfig::new(
            Duration::from_millis(self.interval),
            Duration::from_millis(self.timeout),
        )
    }

    /// Validated filter polling interval.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroFilterInterval`] if `filter_interval` is zero.
    pub fn filter_interval(&self) -> Result<Duration, ConfigError> {
        if self.filter_interval == 0 {
            return Err(ConfigError::ZeroFilterInterval);
        }
        Ok(Duration::from_millis(self.filter_interval))
    }
}

/// Receipt polling configuration, the interval is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptConfig {
    interval: Duration,
    timeout: Duration,
}

impl ReceiptConfig {
    /// # Errors
    /// Returns [`ConfigError::ZeroInterval`] if `interval` is zero.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self { interval, timeout })
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self { interval: DEFAULT_RECEIPT_INTERVAL, timeout: DEFAULT_RECEIPT_TIMEOUT }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

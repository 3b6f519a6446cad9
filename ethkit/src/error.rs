use crate::config::ConfigError;
use std::fmt;

/// Errors longer than this many chars are cut before being logged.
const MAX_LOGGED_ERROR_LEN: usize = 100;

/// Errors raised while building an [`crate::Eth`] instance.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to build the JSON-RPC client.
    #[error("failed to build the rpc client: {0}")]
    Client(#[from] jsonrpsee::core::Error),
}

/// Error message trimmed and capped at [`MAX_LOGGED_ERROR_LEN`] chars.
pub struct TruncatedError<'a, E>(&'a E);

impl<E: fmt::Display> fmt::Display for TruncatedError<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.0.to_string();
        let message = message.trim();
        match message.char_indices().nth(MAX_LOGGED_ERROR_LEN) {
            Some((end, _)) => write!(f, "{}...", message[..end].trim_end()),
            None => f.write_str(message),
        }
    }
}

/// Used as `tracing::warn!("...: {}", error.truncate())`.
pub trait LogErrorExt: Sized {
    fn truncate(&self) -> TruncatedError<'_, Self>;
}

impl<E: std::error::Error> LogErrorExt for E {
    fn truncate(&self) -> TruncatedError<'_, Self> {
        TruncatedError(self)
    }
}

// Error taxonomy shared across the engine
use thiserror::Error;

/// Errors surfaced by the warranty engine.
///
/// `Validation` never reaches the network; `Transport` and `Service`
/// come back from the backend or extraction service; `Unauthorized`
/// means the session has been invalidated and must not be retried.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Rejected locally before any request was made (wrong file type,
    /// missing selection, bad state for the requested transition).
    #[error("{0}")]
    Validation(String),

    /// The HTTP call itself failed (network, DNS, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a structured error message.
    #[error("{0}")]
    Service(String),

    /// The server rejected the bearer credential (401).
    #[error("session expired or invalid")]
    Unauthorized,
}

impl WalletError {
    /// Message shown to the user when a bill scan fails.
    ///
    /// Server-supplied messages are surfaced verbatim; everything else
    /// collapses to the generic retry prompt.
    pub fn scan_display_message(&self) -> String {
        match self {
            WalletError::Service(msg) => msg.clone(),
            WalletError::Validation(msg) => msg.clone(),
            _ => "Failed to scan bill. Please try again.".to_string(),
        }
    }
}

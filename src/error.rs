//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant is a local precondition violation surfaced to the immediate
/// caller. A failed operation never leaves partial state behind.
#[derive(Error, Debug)]
pub enum Error {
    /// Account creation with a handle that is already taken
    #[error("Handle already taken: {0}")]
    DuplicateHandle(String),

    /// Account lookup failed
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Payment amount is non-positive after normalization
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// Payee does not resolve to an existing account
    #[error("Invalid payment target: {0}")]
    InvalidTarget(String),

    /// Balance insufficient and no default funding instrument attached
    #[error("No funding instrument available for {0}")]
    NoFundingInstrument(String),

    /// Funding instrument lookup failed
    #[error("Funding instrument not found: {0}")]
    InstrumentNotFound(String),

    /// Record store error
    ///
    /// Reserved for store implementations backed by durable storage; the
    /// in-memory store has no failure path that maps here.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}

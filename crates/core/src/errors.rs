use thiserror::Error;

/// Unified error type for the portfolio-ledger-core facade.
///
/// The accounting engine itself never fails; these errors come from the
/// validation and lookup layer in [`crate::PortfolioTracker`].
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Lookup ──────────────────────────────────────────────────────
    #[error("Instrument not found: {0}")]
    InstrumentNotFound(String),

    #[error("Instrument already exists: {0}")]
    DuplicateInstrument(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Loan already exists: {0}")]
    DuplicateLoan(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Insufficient quantity of {ticker}: selling {requested}, holding {available} on {date}")]
    InsufficientQuantity {
        ticker: String,
        requested: String,
        available: String,
        date: String,
    },
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

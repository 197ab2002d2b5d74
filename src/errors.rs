use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Covenant verification rejected the transaction
    #[error("Verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// State wire encoding/decoding
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Chain source lookups
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Rejection reasons raised by the covenant verifiers
///
/// Every variant is fatal to the transaction under verification. The carried
/// message is part of the observable protocol contract and is matched verbatim
/// by tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Token amount bookkeeping does not balance
    #[error("conservation violation: {0}")]
    ConservationViolation(String),

    /// Signature or ownership mismatch
    #[error("authorization failure: {0}")]
    AuthorizationFailure(String),

    /// Provenance chain is broken
    #[error("backtrace mismatch: {0}")]
    BacktraceMismatch(String),

    /// Input/output/type count over a variant's fixed capacity
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Witness data disagrees with the actual transaction contents
    #[error("state mismatch: {0}")]
    StateMismatch(String),

    /// Malformed construction or unlock arguments
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two populated guard slots carry the same token script hash
    #[error("duplicate type slot: {0}")]
    DuplicateTypeSlot(String),
}

impl VerifyError {
    pub fn conservation(msg: impl Into<String>) -> Self {
        Self::ConservationViolation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::AuthorizationFailure(msg.into())
    }

    pub fn backtrace(msg: impl Into<String>) -> Self {
        Self::BacktraceMismatch(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::CapacityExceeded(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::StateMismatch(msg.into())
    }

    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// The protocol message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::ConservationViolation(m)
            | Self::AuthorizationFailure(m)
            | Self::BacktraceMismatch(m)
            | Self::CapacityExceeded(m)
            | Self::StateMismatch(m)
            | Self::InvalidParameter(m)
            | Self::DuplicateTypeSlot(m) => m,
        }
    }
}

/// State wire format errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a field could be read
    #[error("Unexpected end of data while reading {field}")]
    UnexpectedEof { field: &'static str },

    /// Bytes left over after the last field
    #[error("Trailing bytes after state: {0}")]
    TrailingBytes(usize),

    /// Field decoded but its value is outside the allowed domain
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Chain source error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Transaction is unknown to the chain source
    #[error("Transaction not found: {txid}")]
    TransactionNotFound { txid: String },

    /// Raw transaction bytes could not be decoded
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// Outpoint is not in the UTXO set
    #[error("Output not found or already spent: {outpoint}")]
    MissingOutput { outpoint: String },

    /// The same outpoint is spent twice within one transaction
    #[error("Duplicate input: {outpoint}")]
    DuplicateInput { outpoint: String },

    /// Per-output state hash list does not line up with the outputs
    #[error("Expected {expected} output state hashes, got {actual}")]
    StateCountMismatch { expected: usize, actual: usize },
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for covenant verification
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Result type for the state codec
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for chain source operations
pub type LedgerResult<T> = Result<T, LedgerError>;

// Additional From implementations for common error types
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(format!("TOML error: {}", err))
    }
}

//! Error handling for the ledger primitives
//!
//! Every fallible operation in the crate returns [`LedgerError`]. Nothing in
//! here is logged on the way out: the caller decides what to do with it.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error kinds surfaced by key handling, codecs and the block model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Entropy or curve failure while generating a key pair
    KeyGen(String),
    /// Malformed text, rejected key material or a length mismatch
    Decode(String),
    /// Blob length is not evenly divisible by the requested part count
    MalformedInput { length: usize, parts: usize },
    /// The signing primitive failed
    Sign(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Block invariant violations
    InvalidBlock(String),
    /// Transaction invariant violations
    InvalidTransaction(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::KeyGen(msg) => write!(f, "Key generation error: {msg}"),
            LedgerError::Decode(msg) => write!(f, "Decode error: {msg}"),
            LedgerError::MalformedInput { length, parts } => write!(
                f,
                "Malformed input: {length} bytes cannot be split into {parts} equal parts"
            ),
            LedgerError::Sign(msg) => write!(f, "Signing error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            LedgerError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<bs58::decode::Error> for LedgerError {
    fn from(err: bs58::decode::Error) -> Self {
        LedgerError::Decode(format!("Invalid base58 encoding: {err}"))
    }
}

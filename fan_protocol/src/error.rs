/*!
Common error types for the fan protocol library.
*/

use thiserror::Error;

/// Common result type used throughout the protocol library
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised to callers of the protocol library.
///
/// Malformed responses are never reported through this type; the decoder
/// recovers from them locally and returns partial or empty results.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Write command with a different number of addresses and values
    #[error("Parameter and value lists must have the same length ({addresses} addresses, {values} values)")]
    ValueCountMismatch { addresses: usize, values: usize },

    /// Password does not fit the two-digit length field
    #[error("Password is {0} bytes long, at most 99 are allowed")]
    PasswordTooLong(usize),

    /// Write value longer than the one-byte length field can describe
    #[error("Value for parameter {address:#04x} is {len} bytes long, at most 255 are allowed")]
    ValueTooLong { address: u8, len: usize },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Create a value count mismatch error
    pub fn value_count_mismatch(addresses: usize, values: usize) -> Self {
        Self::ValueCountMismatch { addresses, values }
    }
}

use thiserror::Error;

/// The two failure families of the cryptographic core.
///
/// Verification routines never use this type to report a failed check on well-formed data. They return
/// `Ok(false)` instead, so callers can tell "the signature does not match" apart from "the request was malformed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The caller supplied something structurally wrong: an out-of-range account, a malformed address, a disallowed
    /// address scheme, a bad signature length, an invalid public key or nonce.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(&'static str),
    /// A cryptographic primitive failed even though its inputs were structurally valid. These are fatal to the
    /// current operation and are never retried.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
}

impl CryptoError {
    pub fn is_internal(&self) -> bool {
        matches!(self, CryptoError::InternalError(_))
    }

    pub fn is_invalid_parameters(&self) -> bool {
        matches!(self, CryptoError::InvalidParameters(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid currency configuration: {0}")]
    InvalidConfig(#[from] ron::error::SpannedError),
    #[error("Invalid currency configuration: {0}")]
    InvalidValue(String),
}

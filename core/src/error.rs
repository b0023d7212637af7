// Error types for the Lattice core
use thiserror::Error;

use lattice_crypto::CryptoError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Size limit exceeded: {what} is {actual} bytes, maximum {max}")]
    InvalidSize {
        what: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("Unexpected end of stream at position {position}")]
    EndOfStream { position: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate signer {0}")]
    DuplicateSigner(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account is locked")]
    AccountLocked,

    #[error("No private key available for {0}")]
    MissingKey(String),

    #[error("Insufficient signatures: got {got}, need {need}")]
    InsufficientSignatures { got: usize, need: usize },

    #[error("Network magic is not configured")]
    MissingNetworkMagic,

    #[error("Invalid NEF container: {0}")]
    InvalidNef(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

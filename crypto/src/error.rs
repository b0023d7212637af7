// Error types for cryptographic operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Crypto backend failure: {0}")]
    Backend(String),

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid WIF string")]
    InvalidWif,

    #[error("Wrong passphrase or corrupt key container")]
    InvalidPassphraseOrCorrupt,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

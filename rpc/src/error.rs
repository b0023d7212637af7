// RPC-layer error types
use thiserror::Error;

use lattice_core::CoreError;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::InvalidFormat(err.to_string())
    }
}

// Null RPC client for offline use
use lattice_core::{ChainRpc, CoreError, InvocationOutcome};

/// A [`ChainRpc`] implementation with no transport behind it.
///
/// Every call fails with a network error, which the transaction builder
/// treats as "node unreachable" and degrades to its offline estimates.
/// Useful for air-gapped signing and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

impl ChainRpc for OfflineClient {
    fn block_count(&self) -> Result<u32, CoreError> {
        tracing::debug!("offline client: block_count refused");
        Err(CoreError::Network("offline client".into()))
    }

    fn invoke_script(&self, script: &[u8]) -> Result<InvocationOutcome, CoreError> {
        tracing::debug!(script_len = script.len(), "offline client: invoke_script refused");
        Err(CoreError::Network("offline client".into()))
    }
}

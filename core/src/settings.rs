// Protocol parameters consumed across the SDK
use crate::error::CoreError;

/// Per-network configuration.
///
/// The fee constants are defaults only; production deployments read the
/// live values from the on-chain policy contract and overwrite them here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSettings {
    /// Version byte prepended to script hashes in addresses.
    pub address_version: u8,
    /// 32-bit network identifier mixed into every signing digest. Must be
    /// set before any signing call.
    pub network_magic: Option<u32>,
    /// Default distance between the current height and a new transaction's
    /// expiry.
    pub valid_until_block_increment: u32,
    /// Floor for the network fee of any transaction.
    pub min_network_fee: u64,
    /// Network fee charged per serialized byte.
    pub network_fee_per_byte: u64,
    /// Network fee charged per signature verification.
    pub network_fee_per_signature: u64,
    /// Hard cap on a serialized transaction.
    pub max_transaction_bytes: u32,
    /// Hard cap on a transaction script.
    pub max_script_bytes: u32,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            address_version: 0x35,
            network_magic: None,
            valid_until_block_increment: 1000,
            min_network_fee: 100_000,
            network_fee_per_byte: 1_000,
            network_fee_per_signature: 1_000_000,
            max_transaction_bytes: 102_400,
            max_script_bytes: 65_536,
        }
    }
}

impl ProtocolSettings {
    /// Settings bound to a specific network magic.
    pub fn for_network(magic: u32) -> Self {
        Self {
            network_magic: Some(magic),
            ..Self::default()
        }
    }

    /// The configured magic, or the error every signing path reports when
    /// it is absent.
    pub fn magic(&self) -> Result<u32, CoreError> {
        self.network_magic.ok_or(CoreError::MissingNetworkMagic)
    }
}

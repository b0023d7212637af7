// Node response models
//
// Pure data records mirroring the node's JSON conventions: lower-case
// concatenated field names, base64 scripts, `0x`-prefixed hex hashes and
// stringly-typed fee amounts. Unknown fields are ignored on input; every
// record parses from and re-emits the node's own shape.

pub mod block;
pub mod invocation;
pub mod mempool;
pub mod nep17;
pub mod transaction;

pub use block::RpcBlock;
pub use invocation::{RpcInvocationResult, RpcStackItem};
pub use mempool::RawMemPool;
pub use nep17::{Nep17Transfer, Nep17Transfers};
pub use transaction::{RpcSigner, RpcTransaction, RpcWitness};

use serde::de::DeserializeOwned;
use serde::Serialize;

use lattice_core::WitnessScopes;

use crate::error::RpcError;

/// Parse a model from a JSON string.
pub fn parse<T: DeserializeOwned>(json: &str) -> Result<T, RpcError> {
    serde_json::from_str(json).map_err(RpcError::from)
}

/// Parse a model from an already-decoded JSON value.
pub fn from_value<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, RpcError> {
    serde_json::from_value(value.clone()).map_err(RpcError::from)
}

/// Emit a model as a JSON value.
pub fn to_value<T: Serialize>(model: &T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(model).map_err(RpcError::from)
}

/// Emit a model as a JSON string.
pub fn emit<T: Serialize>(model: &T) -> Result<String, RpcError> {
    serde_json::to_string(model).map_err(RpcError::from)
}

const SCOPE_NAMES: &[(u8, &str)] = &[
    (0x01, "CalledByEntry"),
    (0x10, "CustomContracts"),
    (0x20, "CustomGroups"),
    (0x40, "WitnessRules"),
    (0x80, "Global"),
];

/// Node text form of a scope bitfield, e.g. `"CalledByEntry, CustomContracts"`.
pub(crate) fn scopes_to_string(scopes: WitnessScopes) -> String {
    if scopes.bits() == 0 {
        return "None".to_string();
    }
    let names: Vec<&str> = SCOPE_NAMES
        .iter()
        .filter(|(bit, _)| scopes.bits() & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    names.join(", ")
}

/// Inverse of [`scopes_to_string`].
pub(crate) fn parse_scopes(text: &str) -> Result<WitnessScopes, RpcError> {
    let mut bits = 0u8;
    for part in text.split(',') {
        let name = part.trim();
        if name.is_empty() || name == "None" {
            continue;
        }
        let bit = SCOPE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(bit, _)| *bit)
            .ok_or_else(|| RpcError::InvalidFormat(format!("unknown witness scope {name:?}")))?;
        bits |= bit;
    }
    WitnessScopes::from_byte(bits).map_err(RpcError::from)
}

/// Decode a base64 script field.
pub(crate) fn decode_base64(field: &str, what: &str) -> Result<Vec<u8>, RpcError> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(field)
        .map_err(|e| RpcError::InvalidFormat(format!("{what}: {e}")))
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Parse a stringly-typed integer amount (fees, gas, token quantities).
pub(crate) fn parse_amount(field: &str, what: &str) -> Result<i64, RpcError> {
    field
        .parse::<i64>()
        .map_err(|_| RpcError::InvalidFormat(format!("{what} is not an integer: {field:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_string_roundtrip() {
        for byte in [0x00u8, 0x01, 0x11, 0x31, 0x40, 0x80] {
            let scopes = WitnessScopes::from_byte(byte).unwrap();
            let text = scopes_to_string(scopes);
            assert_eq!(parse_scopes(&text).unwrap().bits(), byte, "{text}");
        }
    }

    #[test]
    fn test_unknown_scope_rejected() {
        assert!(parse_scopes("Sideways").is_err());
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(parse_amount("997750", "fee").unwrap(), 997_750);
        assert!(parse_amount("1.5", "fee").is_err());
        assert!(parse_amount("gas", "fee").is_err());
    }
}

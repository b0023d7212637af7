// Base58-Check address encoding
//
// An address is Base58-Check(version ‖ script_hash). The version byte is a
// protocol parameter; the default for the main network lives in the core
// crate's settings.

use crate::error::CryptoError;

/// Encode a 20-byte script hash as an address under `version`.
pub fn encode_address(version: u8, script_hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(script_hash);
    bs58::encode(payload).with_check().into_string()
}

/// Decode an address back to its script hash, verifying the checksum and
/// the expected version byte.
pub fn decode_address(address: &str, version: u8) -> Result<[u8; 20], CryptoError> {
    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
    if payload.len() != 21 {
        return Err(CryptoError::InvalidAddress(format!(
            "expected 21 payload bytes, got {}",
            payload.len()
        )));
    }
    if payload[0] != version {
        return Err(CryptoError::InvalidAddress(format!(
            "version byte {:#04x}, expected {:#04x}",
            payload[0], version
        )));
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

// Fixed-length hash newtypes
//
// Textual conventions follow the node: transaction/block hashes print as
// big-endian hex (byte-reversed), contract/account script hashes print as
// little-endian hex (raw byte order). Both parsers tolerate a `0x` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::io::{BinaryWriter, MemoryReader, Serializable};

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// 20-byte hash identifying a contract or an account's verification script.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash160(pub [u8; 20]);

impl Hash160 {
    pub const LEN: usize = 20;

    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let array: [u8; 20] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidFormat(format!("Hash160 needs 20 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }

    /// Script hash of `script`: `RIPEMD160(SHA256(script))`.
    pub fn from_script(script: &[u8]) -> Self {
        Self(lattice_crypto::hash::hash160(script))
    }

    /// Parse the little-endian hex form, tolerating a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(strip_prefix(s))
            .map_err(|e| CoreError::InvalidFormat(format!("Hash160 hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode a Base58-Check address under `version`.
    pub fn from_address(address: &str, version: u8) -> Result<Self, CoreError> {
        Ok(Self(lattice_crypto::address::decode_address(
            address, version,
        )?))
    }

    /// Encode as a Base58-Check address under `version`.
    pub fn to_address(&self, version: u8) -> String {
        lattice_crypto::address::encode_address(version, &self.0)
    }
}

impl std::fmt::Display for Hash160 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash160({})", self.to_hex())
    }
}

impl Serializable for Hash160 {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_bytes(&self.0);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let mut bytes = [0u8; 20];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash160 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // node JSON convention
        serializer.serialize_str(&format!("0x{}", self.to_hex()))
    }
}

impl<'de> Deserialize<'de> for Hash160 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// 32-byte hash of a transaction, block or Merkle node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const LEN: usize = 32;

    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidFormat(format!("Hash256 needs 32 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }

    /// `sha256d` of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(lattice_crypto::hash::sha256d(data))
    }

    /// Parse the big-endian hex form, tolerating a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let mut bytes = hex::decode(strip_prefix(s))
            .map_err(|e| CoreError::InvalidFormat(format!("Hash256 hex: {e}")))?;
        bytes.reverse();
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Big-endian hex text form.
    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl Serializable for Hash256 {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_bytes(&self.0);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // node JSON convention
        serializer.serialize_str(&format!("0x{}", self.to_hex()))
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash160_hex_is_raw_order() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xAB;
        let hash = Hash160(bytes);
        assert!(hash.to_hex().starts_with("ab"));
        assert_eq!(Hash160::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_hash256_hex_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        let hash = Hash256(bytes);
        // byte 0 prints last in big-endian text
        assert!(hash.to_hex().ends_with("01"));
        assert_eq!(Hash256::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_0x_prefix_tolerated() {
        let hash = Hash256([9u8; 32]);
        let prefixed = format!("0x{}", hash.to_hex());
        assert_eq!(Hash256::from_hex(&prefixed).unwrap(), hash);

        let small = Hash160([7u8; 20]);
        let prefixed = format!("0x{}", small.to_hex());
        assert_eq!(Hash160::from_hex(&prefixed).unwrap(), small);
    }

    #[test]
    fn test_bad_lengths_rejected() {
        assert!(Hash160::from_hex("abcd").is_err());
        assert!(Hash256::from_hex("not hex").is_err());
    }

    #[test]
    fn test_wire_roundtrip() {
        let hash = Hash160([3u8; 20]);
        let bytes = hash.to_wire().unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(Hash160::from_wire(&bytes).unwrap(), hash);
    }
}

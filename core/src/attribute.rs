// Transaction attributes
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::Hash256;
use crate::io::{BinaryWriter, MemoryReader, Serializable};

/// Maximum byte length of an oracle response payload.
pub const MAX_ORACLE_RESULT_LEN: usize = 0xFFFF;

/// Status of an oracle request resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OracleResponseCode {
    Success = 0x00,
    ProtocolNotSupported = 0x10,
    ConsensusUnreachable = 0x12,
    NotFound = 0x14,
    Timeout = 0x16,
    Forbidden = 0x18,
    ResponseTooLarge = 0x1A,
    InsufficientFunds = 0x1C,
    ContentTypeNotSupported = 0x1F,
    Error = 0xFF,
}

impl TryFrom<u8> for OracleResponseCode {
    type Error = CoreError;

    fn try_from(byte: u8) -> Result<Self, CoreError> {
        let code = match byte {
            0x00 => Self::Success,
            0x10 => Self::ProtocolNotSupported,
            0x12 => Self::ConsensusUnreachable,
            0x14 => Self::NotFound,
            0x16 => Self::Timeout,
            0x18 => Self::Forbidden,
            0x1A => Self::ResponseTooLarge,
            0x1C => Self::InsufficientFunds,
            0x1F => Self::ContentTypeNotSupported,
            0xFF => Self::Error,
            other => {
                return Err(CoreError::InvalidFormat(format!(
                    "unknown oracle response code {other:#04x}"
                )))
            }
        };
        Ok(code)
    }
}

/// Optional per-transaction metadata. At most one of each variant may
/// appear in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionAttribute {
    /// Priority lane marker; no payload.
    HighPriority,
    /// Result of an oracle request, attached by the oracle committee.
    OracleResponse {
        id: u64,
        code: OracleResponseCode,
        result: Vec<u8>,
    },
    /// The transaction is invalid before this height.
    NotValidBefore { height: u32 },
    /// The transaction conflicts with (supersedes) another by hash.
    Conflicts { hash: Hash256 },
}

impl TransactionAttribute {
    pub const HIGH_PRIORITY_TAG: u8 = 0x01;
    pub const ORACLE_RESPONSE_TAG: u8 = 0x11;
    pub const NOT_VALID_BEFORE_TAG: u8 = 0x20;
    pub const CONFLICTS_TAG: u8 = 0x21;

    pub fn tag(&self) -> u8 {
        match self {
            TransactionAttribute::HighPriority => Self::HIGH_PRIORITY_TAG,
            TransactionAttribute::OracleResponse { .. } => Self::ORACLE_RESPONSE_TAG,
            TransactionAttribute::NotValidBefore { .. } => Self::NOT_VALID_BEFORE_TAG,
            TransactionAttribute::Conflicts { .. } => Self::CONFLICTS_TAG,
        }
    }
}

impl Serializable for TransactionAttribute {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_u8(self.tag());
        match self {
            TransactionAttribute::HighPriority => {}
            TransactionAttribute::OracleResponse { id, code, result } => {
                if result.len() > MAX_ORACLE_RESULT_LEN {
                    return Err(CoreError::InvalidSize {
                        what: "oracle result",
                        actual: result.len(),
                        max: MAX_ORACLE_RESULT_LEN,
                    });
                }
                writer.write_u64(*id);
                writer.write_u8(*code as u8);
                writer.write_var_bytes(result);
            }
            TransactionAttribute::NotValidBefore { height } => {
                writer.write_u32(*height);
            }
            TransactionAttribute::Conflicts { hash } => {
                Serializable::serialize(hash, writer)?;
            }
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let attribute = match reader.read_u8()? {
            Self::HIGH_PRIORITY_TAG => TransactionAttribute::HighPriority,
            Self::ORACLE_RESPONSE_TAG => {
                let id = reader.read_u64()?;
                let code = OracleResponseCode::try_from(reader.read_u8()?)?;
                let result = reader.read_var_bytes(MAX_ORACLE_RESULT_LEN)?;
                TransactionAttribute::OracleResponse { id, code, result }
            }
            Self::NOT_VALID_BEFORE_TAG => TransactionAttribute::NotValidBefore {
                height: reader.read_u32()?,
            },
            Self::CONFLICTS_TAG => TransactionAttribute::Conflicts {
                hash: Serializable::deserialize(reader)?,
            },
            other => {
                return Err(CoreError::InvalidFormat(format!(
                    "unknown attribute tag {other:#04x}"
                )))
            }
        };
        Ok(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_priority_is_one_byte() {
        let bytes = TransactionAttribute::HighPriority.to_wire().unwrap();
        assert_eq!(bytes, vec![0x01]);
        assert_eq!(
            TransactionAttribute::from_wire(&bytes).unwrap(),
            TransactionAttribute::HighPriority
        );
    }

    #[test]
    fn test_oracle_response_roundtrip() {
        let attribute = TransactionAttribute::OracleResponse {
            id: 42,
            code: OracleResponseCode::Success,
            result: vec![1, 2, 3],
        };
        let bytes = attribute.to_wire().unwrap();
        assert_eq!(bytes[0], 0x11);
        assert_eq!(TransactionAttribute::from_wire(&bytes).unwrap(), attribute);
    }

    #[test]
    fn test_oracle_result_cap() {
        let attribute = TransactionAttribute::OracleResponse {
            id: 1,
            code: OracleResponseCode::Error,
            result: vec![0u8; MAX_ORACLE_RESULT_LEN + 1],
        };
        assert!(attribute.to_wire().is_err());
    }

    #[test]
    fn test_not_valid_before_roundtrip() {
        let attribute = TransactionAttribute::NotValidBefore { height: 123_456 };
        let bytes = attribute.to_wire().unwrap();
        assert_eq!(bytes[0], 0x20);
        assert_eq!(bytes.len(), 5);
        assert_eq!(TransactionAttribute::from_wire(&bytes).unwrap(), attribute);
    }

    #[test]
    fn test_conflicts_roundtrip() {
        let attribute = TransactionAttribute::Conflicts {
            hash: Hash256([6u8; 32]),
        };
        let bytes = attribute.to_wire().unwrap();
        assert_eq!(bytes[0], 0x21);
        assert_eq!(bytes.len(), 33);
        assert_eq!(TransactionAttribute::from_wire(&bytes).unwrap(), attribute);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(TransactionAttribute::from_wire(&[0x7F]).is_err());
    }

    #[test]
    fn test_unknown_oracle_code_rejected() {
        let mut bytes = TransactionAttribute::OracleResponse {
            id: 1,
            code: OracleResponseCode::Success,
            result: vec![],
        }
        .to_wire()
        .unwrap();
        bytes[9] = 0x33;
        assert!(TransactionAttribute::from_wire(&bytes).is_err());
    }
}

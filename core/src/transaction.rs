// Transaction record and canonical serialization
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::attribute::TransactionAttribute;
use crate::error::CoreError;
use crate::hash::{Hash160, Hash256};
use crate::io::{BinaryWriter, MemoryReader, Serializable};
use crate::script::MAX_SCRIPT_LEN;
use crate::signer::Signer;
use crate::witness::Witness;

use lattice_crypto::hash::{sha256, sha256d};

/// Maximum serialized size of a transaction.
pub const MAX_TRANSACTION_SIZE: usize = 102_400;

/// Maximum number of attributes a transaction can carry.
pub const MAX_TRANSACTION_ATTRIBUTES: usize = 16;

/// Maximum number of signers a transaction can carry.
pub const MAX_TRANSACTION_SIGNERS: usize = 16;

/// Fixed-width header bytes: version, nonce, fees, expiry.
pub const HEADER_SIZE: usize = 1 + 4 + 8 + 8 + 4;

/// An immutable transaction.
///
/// The hash depends only on the pre-witness body, so it is stable across
/// resigning. Fees are in the smallest fee unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    pub system_fee: i64,
    pub network_fee: i64,
    pub valid_until_block: u32,
    pub signers: Vec<Signer>,
    pub attributes: Vec<TransactionAttribute>,
    pub script: Vec<u8>,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// The fee payer: the first signer, regardless of scope.
    pub fn sender(&self) -> Option<&Hash160> {
        self.signers.first().map(|signer| &signer.account)
    }

    fn serialize_body(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_u8(self.version);
        writer.write_u32(self.nonce);
        writer.write_i64(self.system_fee);
        writer.write_i64(self.network_fee);
        writer.write_u32(self.valid_until_block);
        writer.write_var_int(self.signers.len() as u64);
        for signer in &self.signers {
            Serializable::serialize(signer, writer)?;
        }
        writer.write_var_int(self.attributes.len() as u64);
        for attribute in &self.attributes {
            Serializable::serialize(attribute, writer)?;
        }
        writer.write_var_bytes(&self.script);
        Ok(())
    }

    /// Serialization without witnesses: the input to both the transaction
    /// hash and the signing digest.
    pub fn unsigned_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut writer = BinaryWriter::with_capacity(HEADER_SIZE + self.script.len() + 64);
        self.serialize_body(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// On-wire transaction hash: `sha256d` of the pre-witness body.
    pub fn hash(&self) -> Result<Hash256, CoreError> {
        Ok(Hash256(sha256d(&self.unsigned_bytes()?)))
    }

    /// The 32-byte digest each signer signs:
    /// `SHA256(magic_le ‖ SHA256(body))`.
    pub fn signing_digest(&self, network_magic: u32) -> Result<[u8; 32], CoreError> {
        let body_hash = sha256(&self.unsigned_bytes()?);
        let mut message = Vec::with_capacity(4 + 32);
        message.extend_from_slice(&network_magic.to_le_bytes());
        message.extend_from_slice(&body_hash);
        Ok(sha256(&message))
    }

    /// Total serialized size, including witnesses.
    pub fn size(&self) -> Result<usize, CoreError> {
        Ok(self.to_wire()?.len())
    }

    /// Structural checks that do not need the witness list yet.
    pub fn validate_unsigned(&self) -> Result<(), CoreError> {
        if self.valid_until_block == 0 {
            return Err(CoreError::InvalidArgument(
                "valid_until_block must be positive".into(),
            ));
        }
        if self.signers.is_empty() {
            return Err(CoreError::InvalidState("transaction has no signers".into()));
        }
        if self.signers.len() > MAX_TRANSACTION_SIGNERS {
            return Err(CoreError::InvalidSize {
                what: "signer list",
                actual: self.signers.len(),
                max: MAX_TRANSACTION_SIGNERS,
            });
        }
        let mut seen = HashSet::new();
        for signer in &self.signers {
            signer.validate()?;
            if !seen.insert(signer.account) {
                return Err(CoreError::DuplicateSigner(signer.account.to_string()));
            }
        }
        if self.attributes.len() > MAX_TRANSACTION_ATTRIBUTES {
            return Err(CoreError::InvalidSize {
                what: "attribute list",
                actual: self.attributes.len(),
                max: MAX_TRANSACTION_ATTRIBUTES,
            });
        }
        for tag in [
            TransactionAttribute::HIGH_PRIORITY_TAG,
            TransactionAttribute::ORACLE_RESPONSE_TAG,
            TransactionAttribute::NOT_VALID_BEFORE_TAG,
        ] {
            if self.attributes.iter().filter(|a| a.tag() == tag).count() > 1 {
                return Err(CoreError::InvalidArgument(format!(
                    "attribute {tag:#04x} may appear at most once"
                )));
            }
        }
        if self.script.is_empty() {
            return Err(CoreError::InvalidState("transaction has no script".into()));
        }
        if self.script.len() > MAX_SCRIPT_LEN {
            return Err(CoreError::InvalidSize {
                what: "script",
                actual: self.script.len(),
                max: MAX_SCRIPT_LEN,
            });
        }
        Ok(())
    }

    /// Full validation of a signed transaction.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.validate_unsigned()?;
        if self.witnesses.len() != self.signers.len() {
            return Err(CoreError::InvalidState(format!(
                "{} witnesses for {} signers",
                self.witnesses.len(),
                self.signers.len()
            )));
        }
        let size = self.size()?;
        if size > MAX_TRANSACTION_SIZE {
            return Err(CoreError::InvalidSize {
                what: "transaction",
                actual: size,
                max: MAX_TRANSACTION_SIZE,
            });
        }
        Ok(())
    }
}

impl Serializable for Transaction {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        self.serialize_body(writer)?;
        writer.write_var_int(self.witnesses.len() as u64);
        for witness in &self.witnesses {
            Serializable::serialize(witness, writer)?;
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let version = reader.read_u8()?;
        let nonce = reader.read_u32()?;
        let system_fee = reader.read_i64()?;
        let network_fee = reader.read_i64()?;
        let valid_until_block = reader.read_u32()?;

        let signer_count = reader.read_var_int_max(MAX_TRANSACTION_SIGNERS as u64)? as usize;
        let mut signers = Vec::with_capacity(signer_count);
        for _ in 0..signer_count {
            signers.push(Serializable::deserialize(reader)?);
        }

        let attribute_count =
            reader.read_var_int_max(MAX_TRANSACTION_ATTRIBUTES as u64)? as usize;
        let mut attributes = Vec::with_capacity(attribute_count);
        for _ in 0..attribute_count {
            attributes.push(Serializable::deserialize(reader)?);
        }

        let script = reader.read_var_bytes(MAX_SCRIPT_LEN)?;

        let witness_count = reader.read_var_int_max(MAX_TRANSACTION_SIGNERS as u64)? as usize;
        if witness_count != signer_count {
            return Err(CoreError::InvalidFormat(format!(
                "{witness_count} witnesses for {signer_count} signers"
            )));
        }
        let mut witnesses = Vec::with_capacity(witness_count);
        for _ in 0..witness_count {
            witnesses.push(Serializable::deserialize(reader)?);
        }

        Ok(Self {
            version,
            nonce,
            system_fee,
            network_fee,
            valid_until_block,
            signers,
            attributes,
            script,
            witnesses,
        })
    }
}

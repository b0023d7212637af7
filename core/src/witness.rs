// Witness: the authorization proof attached to a signer
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::Hash160;
use crate::io::{var_bytes_size, BinaryWriter, MemoryReader, Serializable};
use crate::script::builder::{multi_sig_script, single_sig_script, ScriptBuilder};
use crate::script::MAX_SCRIPT_LEN;

use lattice_crypto::SIGNATURE_LEN;

/// A pair of scripts: the invocation script pushes arguments (signatures),
/// the verification script is the predicate the chain evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Witness {
    pub invocation_script: Vec<u8>,
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-signature witness: `PUSHDATA1 64 sig` against the CheckSig
    /// verification script for `public_key`.
    pub fn from_signature(
        signature: &[u8; SIGNATURE_LEN],
        public_key: &[u8],
    ) -> Result<Self, CoreError> {
        let mut builder = ScriptBuilder::new();
        builder.push_data(signature)?;
        Ok(Self {
            invocation_script: builder.into_script()?,
            verification_script: single_sig_script(public_key)?,
        })
    }

    /// Multi-signature witness. `signatures` must already be ordered to
    /// match the sorted public-key list and hold at least `threshold`
    /// entries.
    pub fn from_multi_sig(
        signatures: &[[u8; SIGNATURE_LEN]],
        threshold: usize,
        public_keys: &[Vec<u8>],
    ) -> Result<Self, CoreError> {
        if signatures.len() < threshold {
            return Err(CoreError::InsufficientSignatures {
                got: signatures.len(),
                need: threshold,
            });
        }
        let mut builder = ScriptBuilder::new();
        for signature in signatures {
            builder.push_data(signature)?;
        }
        Ok(Self {
            invocation_script: builder.into_script()?,
            verification_script: multi_sig_script(threshold, public_keys)?,
        })
    }

    /// Hash of the verification script; equals the owning account's hash.
    pub fn script_hash(&self) -> Hash160 {
        Hash160::from_script(&self.verification_script)
    }

    /// Data items pushed by the invocation script, in push order. For a
    /// signature witness these are the signatures.
    ///
    /// Accepts the canonical `PUSHDATA` forms; a bare length byte below
    /// 0x4C is tolerated for witnesses produced by legacy tooling.
    pub fn pushed_data(&self) -> Result<Vec<Vec<u8>>, CoreError> {
        let mut reader = MemoryReader::new(&self.invocation_script);
        let mut items = Vec::new();
        while !reader.is_at_end() {
            let opcode = reader.read_u8()?;
            let length = match opcode {
                0x0C => reader.read_u8()? as usize,
                0x0D => reader.read_u16()? as usize,
                0x0E => reader.read_u32()? as usize,
                direct @ 0x01..=0x4B => direct as usize,
                other => {
                    return Err(CoreError::InvalidFormat(format!(
                        "invocation script holds non-push opcode {other:#04x}"
                    )))
                }
            };
            items.push(reader.read_bytes(length)?);
        }
        Ok(items)
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        var_bytes_size(&self.invocation_script) + var_bytes_size(&self.verification_script)
    }
}

impl Serializable for Witness {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_var_bytes(&self.invocation_script);
        writer.write_var_bytes(&self.verification_script);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let invocation_script = reader.read_var_bytes(MAX_SCRIPT_LEN)?;
        let verification_script = reader.read_var_bytes(MAX_SCRIPT_LEN)?;
        Ok(Self {
            invocation_script,
            verification_script,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::hash::sha256;
    use lattice_crypto::KeyPair;

    #[test]
    fn test_wire_roundtrip() {
        let witness = Witness::new(vec![1, 2, 3], vec![4, 5, 6]);
        let bytes = witness.to_wire().unwrap();
        assert_eq!(bytes, vec![3, 1, 2, 3, 3, 4, 5, 6]);
        assert_eq!(Witness::from_wire(&bytes).unwrap(), witness);
    }

    #[test]
    fn test_size_matches_serialization() {
        let witness = Witness::new(vec![0u8; 300], vec![7u8; 40]);
        assert_eq!(witness.size(), witness.to_wire().unwrap().len());
    }

    #[test]
    fn test_single_sig_witness_shape() {
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"tx digest");
        let signature = pair.sign(&digest).unwrap();
        let witness = Witness::from_signature(&signature, &pair.public_key()).unwrap();

        assert_eq!(witness.invocation_script.len(), 66);
        assert_eq!(witness.invocation_script[0], 0x0C);
        assert_eq!(witness.invocation_script[1], 0x40);
        assert_eq!(witness.verification_script.len(), 40);
    }

    #[test]
    fn test_multi_sig_witness_threshold() {
        let pairs: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate().unwrap()).collect();
        let keys: Vec<Vec<u8>> = pairs.iter().map(|p| p.public_key().to_vec()).collect();
        let digest = sha256(b"digest");
        let sigs: Vec<[u8; 64]> = pairs[..2].iter().map(|p| p.sign(&digest).unwrap()).collect();

        let witness = Witness::from_multi_sig(&sigs, 2, &keys).unwrap();
        // two pushed signatures: 2 × (2-byte prefix + 64)
        assert_eq!(witness.invocation_script.len(), 132);

        assert!(matches!(
            Witness::from_multi_sig(&sigs[..1], 2, &keys),
            Err(CoreError::InsufficientSignatures { got: 1, need: 2 })
        ));
    }

    #[test]
    fn test_pushed_data_extracts_signatures() {
        let pairs: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate().unwrap()).collect();
        let keys: Vec<Vec<u8>> = pairs.iter().map(|p| p.public_key().to_vec()).collect();
        let digest = sha256(b"digest");
        let sigs: Vec<[u8; 64]> = pairs[..2].iter().map(|p| p.sign(&digest).unwrap()).collect();
        let witness = Witness::from_multi_sig(&sigs, 2, &keys).unwrap();

        let pushed = witness.pushed_data().unwrap();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0], sigs[0]);
        assert_eq!(pushed[1], sigs[1]);
    }

    #[test]
    fn test_pushed_data_accepts_legacy_direct_push() {
        let witness = Witness::new(vec![0x03, 0xAA, 0xBB, 0xCC], vec![]);
        assert_eq!(witness.pushed_data().unwrap(), vec![vec![0xAA, 0xBB, 0xCC]]);

        let witness = Witness::new(vec![0x66], vec![]);
        assert!(witness.pushed_data().is_err());
    }

    #[test]
    fn test_script_hash_matches_verification_script() {
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"x");
        let signature = pair.sign(&digest).unwrap();
        let witness = Witness::from_signature(&signature, &pair.public_key()).unwrap();
        assert_eq!(
            witness.script_hash(),
            Hash160::from_script(&witness.verification_script)
        );
    }
}

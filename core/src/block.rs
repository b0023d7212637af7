// Block and header structures with Merkle verification
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::{Hash160, Hash256};
use crate::io::{BinaryWriter, MemoryReader, Serializable};
use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use crate::witness::Witness;

/// Maximum transactions accepted when deserializing a block.
pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 65_535;

/// Block header. The hash covers every field except the witness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_hash: Hash256,
    pub merkle_root: Hash256,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub nonce: u64,
    pub index: u32,
    pub primary_index: u8,
    pub next_consensus: Hash160,
    pub witness: Witness,
}

impl BlockHeader {
    fn serialize_unsigned(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_u32(self.version);
        Serializable::serialize(&self.prev_hash, writer)?;
        Serializable::serialize(&self.merkle_root, writer)?;
        writer.write_u64(self.timestamp);
        writer.write_u64(self.nonce);
        writer.write_u32(self.index);
        writer.write_u8(self.primary_index);
        Serializable::serialize(&self.next_consensus, writer)?;
        Ok(())
    }

    /// Block hash: `sha256d` over the witness-free header fields.
    pub fn hash(&self) -> Result<Hash256, CoreError> {
        let mut writer = BinaryWriter::with_capacity(105);
        self.serialize_unsigned(&mut writer)?;
        Ok(Hash256::digest(writer.as_slice()))
    }
}

impl Serializable for BlockHeader {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        self.serialize_unsigned(writer)?;
        // consensus witness, wire-framed as a one-element list
        writer.write_var_int(1);
        Serializable::serialize(&self.witness, writer)
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let version = reader.read_u32()?;
        let prev_hash = Serializable::deserialize(reader)?;
        let merkle_root = Serializable::deserialize(reader)?;
        let timestamp = reader.read_u64()?;
        let nonce = reader.read_u64()?;
        let index = reader.read_u32()?;
        let primary_index = reader.read_u8()?;
        let next_consensus = Serializable::deserialize(reader)?;
        let witness_count = reader.read_var_int()?;
        if witness_count != 1 {
            return Err(CoreError::InvalidFormat(format!(
                "header carries {witness_count} witnesses, expected 1"
            )));
        }
        let witness = Serializable::deserialize(reader)?;
        Ok(Self {
            version,
            prev_hash,
            merkle_root,
            timestamp,
            nonce,
            index,
            primary_index,
            next_consensus,
            witness,
        })
    }
}

/// A block: header plus ordered transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn hash(&self) -> Result<Hash256, CoreError> {
        self.header.hash()
    }

    pub fn index(&self) -> u32 {
        self.header.index
    }

    /// Merkle root over the transaction hashes, in block order.
    pub fn calculate_merkle_root(&self) -> Result<Hash256, CoreError> {
        let hashes = self
            .transactions
            .iter()
            .map(|tx| tx.hash())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merkle_root(&hashes))
    }

    /// Verify the structural commitments of a block received from a node:
    /// the stored Merkle root must match the transactions and a consensus
    /// witness must be present. (Evaluating the witness needs a VM and is
    /// out of scope here.)
    pub fn verify(&self) -> Result<(), CoreError> {
        let computed = self.calculate_merkle_root()?;
        if computed != self.header.merkle_root {
            return Err(CoreError::InvalidFormat(format!(
                "merkle root mismatch: header {} computed {}",
                self.header.merkle_root, computed
            )));
        }
        if self.header.witness.verification_script.is_empty()
            && self.header.witness.invocation_script.is_empty()
        {
            return Err(CoreError::InvalidFormat(
                "block carries no consensus witness".into(),
            ));
        }
        Ok(())
    }

    /// [`verify`](Self::verify), additionally requiring the header to hash
    /// to `expected_hash` (as reported by the node).
    pub fn verify_with_hash(&self, expected_hash: &Hash256) -> Result<(), CoreError> {
        self.verify()?;
        let computed = self.hash()?;
        if &computed != expected_hash {
            return Err(CoreError::InvalidFormat(format!(
                "block hash mismatch: expected {expected_hash}, computed {computed}"
            )));
        }
        Ok(())
    }
}

impl Serializable for Block {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        Serializable::serialize(&self.header, writer)?;
        writer.write_var_int(self.transactions.len() as u64);
        for transaction in &self.transactions {
            Serializable::serialize(transaction, writer)?;
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let header = Serializable::deserialize(reader)?;
        let count = reader.read_var_int_max(MAX_TRANSACTIONS_PER_BLOCK as u64)? as usize;
        let mut transactions = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            transactions.push(Serializable::deserialize(reader)?);
        }
        Ok(Self {
            header,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::opcode::OpCode;
    use crate::signer::Signer;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 0,
            prev_hash: Hash256([1u8; 32]),
            merkle_root: Hash256::zero(),
            timestamp: 1_700_000_000_000,
            nonce: 42,
            index: 7,
            primary_index: 0,
            next_consensus: Hash160([2u8; 20]),
            witness: Witness::new(vec![0x0C], vec![0x41]),
        }
    }

    fn sample_tx(nonce: u32) -> Transaction {
        Transaction {
            version: 0,
            nonce,
            system_fee: 0,
            network_fee: 0,
            valid_until_block: 100,
            signers: vec![Signer::called_by_entry(Hash160([3u8; 20]))],
            attributes: vec![],
            script: vec![OpCode::Push1 as u8],
            witnesses: vec![Witness::empty()],
        }
    }

    #[test]
    fn test_header_wire_roundtrip() {
        let header = sample_header();
        let bytes = header.to_wire().unwrap();
        assert_eq!(BlockHeader::from_wire(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_hash_excludes_witness() {
        let mut header = sample_header();
        let before = header.hash().unwrap();
        header.witness = Witness::new(vec![9, 9, 9], vec![8]);
        assert_eq!(header.hash().unwrap(), before);
    }

    #[test]
    fn test_header_layout() {
        let header = sample_header();
        let bytes = header.to_wire().unwrap();
        // version LE at offset 0, prev_hash after
        assert_eq!(&bytes[..4], &0u32.to_le_bytes());
        assert_eq!(&bytes[4..36], &[1u8; 32]);
        // timestamp at 68, nonce at 76, index at 84, primary at 88
        assert_eq!(&bytes[68..76], &1_700_000_000_000u64.to_le_bytes());
        assert_eq!(&bytes[76..84], &42u64.to_le_bytes());
        assert_eq!(&bytes[84..88], &7u32.to_le_bytes());
        assert_eq!(bytes[88], 0);
        assert_eq!(&bytes[89..109], &[2u8; 20]);
    }

    #[test]
    fn test_block_roundtrip_and_verify() {
        let transactions = vec![sample_tx(1), sample_tx(2)];
        let mut header = sample_header();
        let mut block = Block::new(header.clone(), transactions);
        header.merkle_root = block.calculate_merkle_root().unwrap();
        block.header = header;

        block.verify().unwrap();
        let expected = block.hash().unwrap();
        block.verify_with_hash(&expected).unwrap();

        let bytes = block.to_wire().unwrap();
        let parsed = Block::from_wire(&bytes).unwrap();
        assert_eq!(parsed, block);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_verify_rejects_wrong_merkle_root() {
        let block = Block::new(sample_header(), vec![sample_tx(1)]);
        // header still holds the zero root
        assert!(block.verify().is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_hash() {
        let mut block = Block::new(sample_header(), vec![]);
        block.header.merkle_root = Hash256::zero();
        assert!(block.verify_with_hash(&Hash256([0xEE; 32])).is_err());
    }

    #[test]
    fn test_verify_requires_witness() {
        let mut block = Block::new(sample_header(), vec![]);
        block.header.witness = Witness::empty();
        assert!(block.verify().is_err());
    }

    #[test]
    fn test_single_tx_merkle_root_is_tx_hash() {
        let tx = sample_tx(9);
        let tx_hash = tx.hash().unwrap();
        let block = Block::new(sample_header(), vec![tx]);
        assert_eq!(block.calculate_merkle_root().unwrap(), tx_hash);
    }
}

// Block response record
use serde::{Deserialize, Serialize};

use lattice_core::{Block, BlockHeader, Hash160, Hash256, ProtocolSettings, Serializable};

use crate::error::RpcError;
use crate::models::transaction::{RpcTransaction, RpcWitness};

/// Block as the node transmits it. The nonce travels as a hex string and
/// `nextconsensus` as an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcBlock {
    pub hash: Hash256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub version: u32,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: Hash256,
    #[serde(rename = "merkleroot")]
    pub merkle_root: Hash256,
    #[serde(rename = "time")]
    pub timestamp: u64,
    pub nonce: String,
    pub index: u32,
    #[serde(default)]
    pub primary: u8,
    #[serde(rename = "nextconsensus")]
    pub next_consensus: String,
    pub witnesses: Vec<RpcWitness>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tx: Vec<RpcTransaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u32>,
    #[serde(
        rename = "nextblockhash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_block_hash: Option<Hash256>,
}

impl RpcBlock {
    pub fn from_block(block: &Block, settings: &ProtocolSettings) -> Result<Self, RpcError> {
        Ok(Self {
            hash: block.hash()?,
            size: Some(block.to_wire()?.len() as u32),
            version: block.header.version,
            previous_block_hash: block.header.prev_hash,
            merkle_root: block.header.merkle_root,
            timestamp: block.header.timestamp,
            nonce: format!("{:016X}", block.header.nonce),
            index: block.header.index,
            primary: block.header.primary_index,
            next_consensus: block
                .header
                .next_consensus
                .to_address(settings.address_version),
            witnesses: vec![RpcWitness::from_witness(&block.header.witness)],
            tx: block
                .transactions
                .iter()
                .map(|t| RpcTransaction::from_transaction(t, settings.address_version))
                .collect::<Result<Vec<_>, _>>()?,
            confirmations: None,
            next_block_hash: None,
        })
    }

    /// Rebuild the block and verify its commitments: Merkle root over the
    /// carried transactions and the reported block hash.
    pub fn into_block(&self, settings: &ProtocolSettings) -> Result<Block, RpcError> {
        let witness = self
            .witnesses
            .first()
            .ok_or_else(|| RpcError::InvalidFormat("block carries no witness".into()))?
            .into_witness()?;
        let nonce = u64::from_str_radix(&self.nonce, 16)
            .map_err(|_| RpcError::InvalidFormat(format!("nonce is not hex: {:?}", self.nonce)))?;
        let header = BlockHeader {
            version: self.version,
            prev_hash: self.previous_block_hash,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            nonce,
            index: self.index,
            primary_index: self.primary,
            next_consensus: Hash160::from_address(&self.next_consensus, settings.address_version)?,
            witness,
        };
        let transactions = self
            .tx
            .iter()
            .map(RpcTransaction::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        let block = Block::new(header, transactions);
        block.verify_with_hash(&self.hash)?;
        Ok(block)
    }
}

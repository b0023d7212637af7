// Transaction, signer and witness response records
use serde::{Deserialize, Serialize};

use lattice_core::{
    Hash160, Hash256, Signer, Transaction, TransactionAttribute, Witness, WitnessRule,
};

use crate::error::RpcError;
use crate::models::{decode_base64, encode_base64, parse_amount, parse_scopes, scopes_to_string};

/// Witness as the node transmits it: both scripts base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcWitness {
    pub invocation: String,
    pub verification: String,
}

impl RpcWitness {
    pub fn from_witness(witness: &Witness) -> Self {
        Self {
            invocation: encode_base64(&witness.invocation_script),
            verification: encode_base64(&witness.verification_script),
        }
    }

    pub fn into_witness(&self) -> Result<Witness, RpcError> {
        Ok(Witness::new(
            decode_base64(&self.invocation, "invocation script")?,
            decode_base64(&self.verification, "verification script")?,
        ))
    }
}

/// Signer as the node transmits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcSigner {
    pub account: Hash160,
    pub scopes: String,
    #[serde(
        rename = "allowedcontracts",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowed_contracts: Vec<Hash160>,
    #[serde(
        rename = "allowedgroups",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowed_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<WitnessRule>,
}

impl RpcSigner {
    pub fn from_signer(signer: &Signer) -> Self {
        Self {
            account: signer.account,
            scopes: scopes_to_string(signer.scopes),
            allowed_contracts: signer.allowed_contracts.clone(),
            allowed_groups: signer.allowed_groups.clone(),
            rules: signer.rules.clone(),
        }
    }

    pub fn into_signer(&self) -> Result<Signer, RpcError> {
        let signer = Signer {
            account: self.account,
            scopes: parse_scopes(&self.scopes)?,
            allowed_contracts: self.allowed_contracts.clone(),
            allowed_groups: self.allowed_groups.clone(),
            rules: self.rules.clone(),
        };
        signer.validate()?;
        Ok(signer)
    }
}

/// Transaction as the node transmits it. Fees travel as decimal strings
/// and the script as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcTransaction {
    pub hash: Hash256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub version: u8,
    pub nonce: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(rename = "sysfee")]
    pub system_fee: String,
    #[serde(rename = "netfee")]
    pub network_fee: String,
    #[serde(rename = "validuntilblock")]
    pub valid_until_block: u32,
    pub signers: Vec<RpcSigner>,
    #[serde(default)]
    pub attributes: Vec<TransactionAttribute>,
    pub script: String,
    pub witnesses: Vec<RpcWitness>,
    #[serde(rename = "blockhash", default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u32>,
    #[serde(rename = "blocktime", default, skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,
}

impl RpcTransaction {
    /// Record for a transaction this SDK produced. `address_version`
    /// renders the sender field.
    pub fn from_transaction(
        transaction: &Transaction,
        address_version: u8,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            hash: transaction.hash()?,
            size: Some(transaction.size()? as u32),
            version: transaction.version,
            nonce: transaction.nonce,
            sender: transaction
                .sender()
                .map(|hash| hash.to_address(address_version)),
            system_fee: transaction.system_fee.to_string(),
            network_fee: transaction.network_fee.to_string(),
            valid_until_block: transaction.valid_until_block,
            signers: transaction.signers.iter().map(RpcSigner::from_signer).collect(),
            attributes: transaction.attributes.clone(),
            script: encode_base64(&transaction.script),
            witnesses: transaction
                .witnesses
                .iter()
                .map(RpcWitness::from_witness)
                .collect(),
            block_hash: None,
            confirmations: None,
            block_time: None,
        })
    }

    /// Reconstruct the wire transaction and check the reported hash
    /// against the recomputed one.
    pub fn into_transaction(&self) -> Result<Transaction, RpcError> {
        let transaction = Transaction {
            version: self.version,
            nonce: self.nonce,
            system_fee: parse_amount(&self.system_fee, "sysfee")?,
            network_fee: parse_amount(&self.network_fee, "netfee")?,
            valid_until_block: self.valid_until_block,
            signers: self
                .signers
                .iter()
                .map(RpcSigner::into_signer)
                .collect::<Result<Vec<_>, _>>()?,
            attributes: self.attributes.clone(),
            script: decode_base64(&self.script, "script")?,
            witnesses: self
                .witnesses
                .iter()
                .map(RpcWitness::into_witness)
                .collect::<Result<Vec<_>, _>>()?,
        };
        let computed = transaction.hash()?;
        if computed != self.hash {
            return Err(RpcError::InvalidFormat(format!(
                "transaction hash mismatch: reported {}, computed {computed}",
                self.hash
            )));
        }
        Ok(transaction)
    }
}

// Token transfer history records
use serde::{Deserialize, Serialize};

use lattice_core::{Hash160, Hash256};

use crate::error::RpcError;
use crate::models::parse_amount;

/// One entry in an account's transfer history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nep17Transfer {
    pub timestamp: u64,
    #[serde(rename = "assethash")]
    pub asset_hash: Hash160,
    /// Counterparty address; absent for mint and burn events.
    #[serde(
        rename = "transferaddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transfer_address: Option<String>,
    pub amount: String,
    #[serde(rename = "blockindex")]
    pub block_index: u32,
    #[serde(rename = "transfernotifyindex")]
    pub transfer_notify_index: u32,
    #[serde(rename = "txhash")]
    pub tx_hash: Hash256,
}

impl Nep17Transfer {
    /// The amount in the token's smallest unit.
    pub fn amount(&self) -> Result<i64, RpcError> {
        parse_amount(&self.amount, "transfer amount")
    }
}

/// Transfer history of one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nep17Transfers {
    pub sent: Vec<Nep17Transfer>,
    pub received: Vec<Nep17Transfer>,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sent": [],
        "received": [
            {
                "timestamp": 1554283931,
                "assethash": "0x1aada0032aba1ef6d1f07bbd8bec1d85f5380fb3",
                "transferaddress": "AYwgBNMepiv5ocGcyNT4mA8zPLTQ8pDBis",
                "amount": "100000000000",
                "blockindex": 368082,
                "transfernotifyindex": 0,
                "txhash": "0x240ab1369712ad2782b99a02a8f9fcaa41d1e96322017ae90d0449a3ba52a564"
            }
        ],
        "address": "AbHgdBaWEnHkCiLtDZXjhvhaAK2cwFh5pF"
    }"#;

    #[test]
    fn test_parse_node_sample() {
        let transfers: Nep17Transfers = crate::models::parse(SAMPLE).unwrap();
        assert_eq!(transfers.received.len(), 1);
        let entry = &transfers.received[0];
        assert_eq!(entry.amount().unwrap(), 100_000_000_000);
        assert_eq!(entry.block_index, 368_082);
        assert_eq!(
            entry.asset_hash.to_hex(),
            "1aada0032aba1ef6d1f07bbd8bec1d85f5380fb3"
        );
        assert_eq!(
            entry.tx_hash.to_hex(),
            "240ab1369712ad2782b99a02a8f9fcaa41d1e96322017ae90d0449a3ba52a564"
        );
    }

    #[test]
    fn test_emit_uses_node_names() {
        let transfers: Nep17Transfers = crate::models::parse(SAMPLE).unwrap();
        let value = crate::models::to_value(&transfers).unwrap();
        let entry = &value["received"][0];
        assert!(entry.get("assethash").is_some());
        assert!(entry.get("transferaddress").is_some());
        assert!(entry.get("asset_hash").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let transfers: Nep17Transfers = crate::models::parse(SAMPLE).unwrap();
        let json = crate::models::emit(&transfers).unwrap();
        let reparsed: Nep17Transfers = crate::models::parse(&json).unwrap();
        assert_eq!(reparsed, transfers);
    }

    #[test]
    fn test_missing_transfer_address_tolerated() {
        let json = r#"{
            "timestamp": 1,
            "assethash": "1aada0032aba1ef6d1f07bbd8bec1d85f5380fb3",
            "amount": "5",
            "blockindex": 2,
            "transfernotifyindex": 0,
            "txhash": "240ab1369712ad2782b99a02a8f9fcaa41d1e96322017ae90d0449a3ba52a564"
        }"#;
        let transfer: Nep17Transfer = crate::models::parse(json).unwrap();
        assert!(transfer.transfer_address.is_none());
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let transfers: Nep17Transfers = crate::models::parse(SAMPLE).unwrap();
        let mut entry = transfers.received[0].clone();
        entry.amount = "many".into();
        assert!(entry.amount().is_err());
    }
}

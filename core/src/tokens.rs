// Thin wrappers over the two native tokens
use crate::error::CoreError;
use crate::hash::Hash160;
use crate::script::builder::ScriptBuilder;
use crate::script::{CallFlags, ScriptParameter};
use crate::tx_builder::nep17_transfer_script;

/// A fungible token identified by its contract hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungibleToken {
    pub script_hash: Hash160,
    pub symbol: &'static str,
    pub decimals: u8,
}

impl FungibleToken {
    /// The governance token (indivisible voting asset).
    pub fn governance() -> Self {
        Self {
            script_hash: Hash160([
                0xef, 0x40, 0x73, 0xa0, 0xf2, 0xb3, 0x05, 0xa3, 0x8e, 0xc4, 0x05, 0x0e, 0x4d,
                0x3d, 0x28, 0xbc, 0x40, 0xea, 0x63, 0xf5,
            ]),
            symbol: "GOV",
            decimals: 0,
        }
    }

    /// The utility token fees are denominated in.
    pub fn utility() -> Self {
        Self {
            script_hash: Hash160([
                0xd2, 0xa4, 0xcf, 0xf3, 0x19, 0x13, 0x01, 0x61, 0x55, 0xe3, 0x8e, 0x47, 0x4a,
                0x2c, 0x06, 0xd0, 0x8b, 0xe2, 0x76, 0xcf,
            ]),
            symbol: "UTL",
            decimals: 8,
        }
    }

    /// Invocation script transferring `amount` of this token.
    pub fn transfer_script(
        &self,
        from: &Hash160,
        to: &Hash160,
        amount: i64,
        data: Option<ScriptParameter>,
    ) -> Result<Vec<u8>, CoreError> {
        nep17_transfer_script(&self.script_hash, from, to, amount, data)
    }

    /// Invocation script querying an account's balance.
    pub fn balance_of_script(&self, account: &Hash160) -> Result<Vec<u8>, CoreError> {
        let mut builder = ScriptBuilder::new();
        builder.contract_call(
            &self.script_hash,
            "balanceOf",
            &[ScriptParameter::Hash160(*account)],
            CallFlags::ReadOnly,
        )?;
        builder.into_script()
    }
}

// Transaction builder: assembles scripts, signers and fees into a
// chain-valid transaction and orchestrates signing
use rand::Rng;

use crate::account::Account;
use crate::attribute::TransactionAttribute;
use crate::client::ChainRpc;
use crate::error::CoreError;
use crate::hash::Hash160;
use crate::script::builder::ScriptBuilder;
use crate::script::{CallFlags, ScriptParameter};
use crate::settings::ProtocolSettings;
use crate::signer::Signer;
use crate::transaction::{Transaction, MAX_TRANSACTION_ATTRIBUTES};
use crate::witness::Witness;

use lattice_crypto::SIGNATURE_LEN;

/// Builds unsigned transactions and signs them against wallet accounts.
///
/// Every fallible operation leaves the builder exactly as it was, so a
/// failed build or sign can be retried after fixing the input.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    settings: ProtocolSettings,
    version: u8,
    nonce: u32,
    system_fee: i64,
    network_fee: i64,
    valid_until_block: Option<u32>,
    signers: Vec<Signer>,
    attributes: Vec<TransactionAttribute>,
    script: Option<Vec<u8>>,
}

impl TransactionBuilder {
    /// A fresh builder with a cryptographically random nonce.
    pub fn new(settings: ProtocolSettings) -> Self {
        Self {
            settings,
            version: 0,
            nonce: rand::rngs::OsRng.gen(),
            system_fee: 0,
            network_fee: 0,
            valid_until_block: None,
            signers: Vec::new(),
            attributes: Vec::new(),
            script: None,
        }
    }

    pub fn settings(&self) -> &ProtocolSettings {
        &self.settings
    }

    pub fn version(&mut self, version: u8) -> &mut Self {
        self.version = version;
        self
    }

    pub fn nonce(&mut self, nonce: u32) -> &mut Self {
        self.nonce = nonce;
        self
    }

    /// Set the expiry height directly. Zero is rejected.
    pub fn valid_until_block(&mut self, height: u32) -> Result<&mut Self, CoreError> {
        if height == 0 {
            return Err(CoreError::InvalidArgument(
                "valid_until_block must be positive".into(),
            ));
        }
        self.valid_until_block = Some(height);
        Ok(self)
    }

    /// Query the node for the current height and set the expiry to
    /// `height + increment` (the configured default when `increment` is 0).
    pub fn valid_until_block_from(
        &mut self,
        client: &dyn ChainRpc,
        increment: u32,
    ) -> Result<&mut Self, CoreError> {
        let height = client.block_count()?;
        let increment = if increment == 0 {
            self.settings.valid_until_block_increment
        } else {
            increment
        };
        let expiry = height
            .checked_add(increment)
            .ok_or(CoreError::Overflow("valid_until_block"))?;
        self.valid_until_block = Some(expiry);
        Ok(self)
    }

    pub fn script(&mut self, script: Vec<u8>) -> Result<&mut Self, CoreError> {
        let max = self.settings.max_script_bytes as usize;
        if script.len() > max {
            return Err(CoreError::InvalidSize {
                what: "script",
                actual: script.len(),
                max,
            });
        }
        self.script = Some(script);
        Ok(self)
    }

    /// Append a signer, rejecting a duplicate account hash.
    pub fn add_signer(&mut self, signer: Signer) -> Result<&mut Self, CoreError> {
        signer.validate()?;
        if self.signers.iter().any(|s| s.account == signer.account) {
            return Err(CoreError::DuplicateSigner(signer.account.to_string()));
        }
        self.signers.push(signer);
        Ok(self)
    }

    /// Promote the signer with `account` to index 0, making it the fee
    /// payer.
    pub fn first_signer(&mut self, account: &Hash160) -> Result<&mut Self, CoreError> {
        let index = self
            .signers
            .iter()
            .position(|s| &s.account == account)
            .ok_or_else(|| CoreError::NotFound(format!("signer {account}")))?;
        self.signers.swap(0, index);
        Ok(self)
    }

    pub fn add_attribute(&mut self, attribute: TransactionAttribute) -> Result<&mut Self, CoreError> {
        if self.attributes.len() >= MAX_TRANSACTION_ATTRIBUTES {
            return Err(CoreError::InvalidSize {
                what: "attribute list",
                actual: self.attributes.len() + 1,
                max: MAX_TRANSACTION_ATTRIBUTES,
            });
        }
        self.attributes.push(attribute);
        Ok(self)
    }

    /// Idempotent toggle for the high-priority attribute.
    pub fn high_priority(&mut self, enabled: bool) -> &mut Self {
        let present = self
            .attributes
            .iter()
            .any(|a| matches!(a, TransactionAttribute::HighPriority));
        if enabled && !present {
            self.attributes.push(TransactionAttribute::HighPriority);
        } else if !enabled {
            self.attributes
                .retain(|a| !matches!(a, TransactionAttribute::HighPriority));
        }
        self
    }

    pub fn add_network_fee(&mut self, amount: i64) -> &mut Self {
        self.network_fee += amount;
        self
    }

    pub fn add_system_fee(&mut self, amount: i64) -> &mut Self {
        self.system_fee += amount;
        self
    }

    /// Compute and store both fees.
    ///
    /// The network fee is `max(size × per_byte + signers × per_signature,
    /// floor)` over the unsigned serialization. The system fee comes from
    /// test-executing the script on the node; when the node is unreachable
    /// the same size-based formula stands in as an estimate.
    pub fn calculate_fees(&mut self, client: &dyn ChainRpc) -> Result<(i64, i64), CoreError> {
        let unsigned = self.build_unsigned()?;
        let size = unsigned.unsigned_bytes()?.len();

        let per_byte = self.settings.network_fee_per_byte as i64;
        let per_signature = self.settings.network_fee_per_signature as i64;
        let base = size as i64 * per_byte + self.signers.len() as i64 * per_signature;
        let network_fee = base.max(self.settings.min_network_fee as i64);

        let system_fee = match client.invoke_script(&unsigned.script) {
            Ok(outcome) => outcome.gas_consumed,
            Err(CoreError::Network(_)) => size as i64 * per_byte,
            Err(other) => return Err(other),
        };

        self.network_fee = network_fee;
        self.system_fee = system_fee;
        Ok((system_fee, network_fee))
    }

    /// Produce the unsigned transaction described so far.
    pub fn build_unsigned(&self) -> Result<Transaction, CoreError> {
        let script = self
            .script
            .clone()
            .ok_or_else(|| CoreError::InvalidState("no script set".into()))?;
        let valid_until_block = self
            .valid_until_block
            .ok_or_else(|| CoreError::InvalidState("no valid_until_block set".into()))?;
        if self.signers.is_empty() {
            return Err(CoreError::InvalidState("no signers added".into()));
        }
        let transaction = Transaction {
            version: self.version,
            nonce: self.nonce,
            system_fee: self.system_fee,
            network_fee: self.network_fee,
            valid_until_block,
            signers: self.signers.clone(),
            attributes: self.attributes.clone(),
            script,
            witnesses: Vec::new(),
        };
        transaction.validate_unsigned()?;
        Ok(transaction)
    }

    /// Build and sign: one witness per signer, in signer order.
    ///
    /// `accounts` supplies the key material. A multi-signature signer draws
    /// signatures from the other provided accounts whose keys participate
    /// in it, ordered by the sorted public-key list.
    pub fn sign(&self, accounts: &[Account]) -> Result<Transaction, CoreError> {
        let mut transaction = self.build_unsigned()?;
        let magic = self.settings.magic()?;
        let digest = transaction.signing_digest(magic)?;

        let mut witnesses = Vec::with_capacity(transaction.signers.len());
        for signer in &transaction.signers {
            let account = accounts
                .iter()
                .find(|a| a.script_hash() == &signer.account)
                .ok_or_else(|| {
                    CoreError::NotFound(format!("account for signer {}", signer.account))
                })?;
            witnesses.push(witness_for(account, accounts, &digest)?);
        }

        transaction.witnesses = witnesses;
        transaction.validate()?;
        Ok(transaction)
    }
}

fn witness_for(
    account: &Account,
    accounts: &[Account],
    digest: &[u8; 32],
) -> Result<Witness, CoreError> {
    if let Some((threshold, public_keys)) = account.multi_sig_info() {
        if account.is_locked() {
            return Err(CoreError::AccountLocked);
        }
        // walk the sorted key list and sign with every available member key
        let mut signatures: Vec<[u8; SIGNATURE_LEN]> = Vec::with_capacity(threshold);
        for public_key in public_keys {
            if signatures.len() == threshold {
                break;
            }
            let member = accounts.iter().find(|a| {
                a.key_pair()
                    .map(|pair| pair.public_key().as_slice() == public_key.as_slice())
                    .unwrap_or(false)
            });
            if let Some(member) = member {
                signatures.push(member.sign_digest(digest)?);
            }
        }
        if signatures.len() < threshold {
            return Err(CoreError::InsufficientSignatures {
                got: signatures.len(),
                need: threshold,
            });
        }
        return Witness::from_multi_sig(&signatures, threshold, public_keys);
    }

    let signature = account.sign_digest(digest)?;
    let public_key = match account.key_pair() {
        Some(pair) => pair.public_key(),
        None => return Err(CoreError::MissingKey(account.address().to_string())),
    };
    Witness::from_signature(&signature, &public_key)
}

/// Build the invocation script of a token `transfer` call.
pub fn nep17_transfer_script(
    token: &Hash160,
    from: &Hash160,
    to: &Hash160,
    amount: i64,
    data: Option<ScriptParameter>,
) -> Result<Vec<u8>, CoreError> {
    if amount < 0 {
        return Err(CoreError::InvalidArgument(
            "transfer amount must be non-negative".into(),
        ));
    }
    let mut builder = ScriptBuilder::new();
    builder.contract_call(
        token,
        "transfer",
        &[
            ScriptParameter::Hash160(*from),
            ScriptParameter::Hash160(*to),
            ScriptParameter::Integer(amount),
            data.unwrap_or(ScriptParameter::Null),
        ],
        CallFlags::All,
    )?;
    builder.into_script()
}

impl TransactionBuilder {
    /// Builder pre-loaded for a token transfer: the transfer script plus
    /// `from` as a `CalledByEntry` signer and fee payer.
    pub fn nep17_transfer(
        settings: ProtocolSettings,
        token: &Hash160,
        from: &Account,
        to: &Hash160,
        amount: i64,
        data: Option<ScriptParameter>,
    ) -> Result<Self, CoreError> {
        let script = nep17_transfer_script(token, from.script_hash(), to, amount, data)?;
        let mut builder = Self::new(settings);
        builder.script(script)?;
        builder.add_signer(Signer::called_by_entry(*from.script_hash()))?;
        Ok(builder)
    }

    /// Builder pre-loaded for an arbitrary contract call with JSON-encoded
    /// parameters (an array of booleans, integers, strings and nested
    /// arrays).
    pub fn contract_call(
        settings: ProtocolSettings,
        contract: &Hash160,
        method: &str,
        parameters: &serde_json::Value,
        signers: Vec<Signer>,
    ) -> Result<Self, CoreError> {
        let parsed = parse_json_parameters(parameters)?;
        let mut script_builder = ScriptBuilder::new();
        script_builder.contract_call(contract, method, &parsed, CallFlags::All)?;
        let script = script_builder.into_script()?;

        let mut builder = Self::new(settings);
        builder.script(script)?;
        for signer in signers {
            builder.add_signer(signer)?;
        }
        Ok(builder)
    }
}

/// Convert a JSON parameter array into script parameters.
fn parse_json_parameters(value: &serde_json::Value) -> Result<Vec<ScriptParameter>, CoreError> {
    let items = value
        .as_array()
        .ok_or_else(|| CoreError::InvalidFormat("parameters must be a JSON array".into()))?;
    items.iter().map(parse_json_parameter).collect()
}

fn parse_json_parameter(value: &serde_json::Value) -> Result<ScriptParameter, CoreError> {
    match value {
        serde_json::Value::Null => Ok(ScriptParameter::Null),
        serde_json::Value::Bool(b) => Ok(ScriptParameter::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(ScriptParameter::Integer)
            .ok_or_else(|| CoreError::InvalidFormat(format!("non-integer numeric {n}"))),
        serde_json::Value::String(s) => Ok(ScriptParameter::String(s.clone())),
        serde_json::Value::Array(items) => Ok(ScriptParameter::Array(
            items
                .iter()
                .map(parse_json_parameter)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        serde_json::Value::Object(_) => Err(CoreError::InvalidFormat(
            "object parameters are not supported".into(),
        )),
    }
}

// Signers: who authorizes a transaction, and in which contexts
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::Hash160;
use crate::io::{BinaryWriter, MemoryReader, Serializable};

use lattice_crypto::PUBLIC_KEY_COMPRESSED_LEN;

/// Maximum entries in a signer's contract/group/rule lists.
pub const MAX_SIGNER_SUBITEMS: usize = 16;

/// Maximum nesting depth of a witness-rule condition.
const MAX_CONDITION_NESTING: u8 = 2;

/// Witness-scope bitfield.
///
/// `GLOBAL` must appear alone; the three `CUSTOM_*`/`RULES` bits each imply
/// a non-empty companion list on the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessScopes(u8);

impl WitnessScopes {
    pub const NONE: WitnessScopes = WitnessScopes(0x00);
    pub const CALLED_BY_ENTRY: WitnessScopes = WitnessScopes(0x01);
    pub const CUSTOM_CONTRACTS: WitnessScopes = WitnessScopes(0x10);
    pub const CUSTOM_GROUPS: WitnessScopes = WitnessScopes(0x20);
    pub const WITNESS_RULES: WitnessScopes = WitnessScopes(0x40);
    pub const GLOBAL: WitnessScopes = WitnessScopes(0x80);

    const ALL_BITS: u8 = 0x01 | 0x10 | 0x20 | 0x40 | 0x80;

    /// Validate a raw scope byte.
    pub fn from_byte(byte: u8) -> Result<Self, CoreError> {
        if byte & !Self::ALL_BITS != 0 {
            return Err(CoreError::InvalidFormat(format!(
                "unknown witness scope bits {byte:#04x}"
            )));
        }
        let scopes = WitnessScopes(byte);
        if scopes.contains(Self::GLOBAL) && byte != Self::GLOBAL.0 {
            return Err(CoreError::InvalidFormat(
                "Global scope cannot be combined with other scopes".into(),
            ));
        }
        Ok(scopes)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: WitnessScopes) -> bool {
        self.0 & other.0 == other.0
    }

    /// Combine two scopes, re-checking the Global exclusivity rule.
    pub fn union(self, other: WitnessScopes) -> Result<Self, CoreError> {
        Self::from_byte(self.0 | other.0)
    }
}

/// Outcome of a matched witness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WitnessRuleAction {
    Deny = 0,
    Allow = 1,
}

/// Predicate deciding whether a rule applies to an execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WitnessCondition {
    Boolean { expression: bool },
    Not { expression: Box<WitnessCondition> },
    And { expressions: Vec<WitnessCondition> },
    Or { expressions: Vec<WitnessCondition> },
    ScriptHash { hash: Hash160 },
    Group { group: String },
    CalledByEntry,
    CalledByContract { hash: Hash160 },
    CalledByGroup { group: String },
}

impl WitnessCondition {
    fn tag(&self) -> u8 {
        match self {
            WitnessCondition::Boolean { .. } => 0x00,
            WitnessCondition::Not { .. } => 0x01,
            WitnessCondition::And { .. } => 0x02,
            WitnessCondition::Or { .. } => 0x03,
            WitnessCondition::ScriptHash { .. } => 0x18,
            WitnessCondition::Group { .. } => 0x19,
            WitnessCondition::CalledByEntry => 0x20,
            WitnessCondition::CalledByContract { .. } => 0x28,
            WitnessCondition::CalledByGroup { .. } => 0x29,
        }
    }

    fn group_bytes(group: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = hex::decode(group)
            .map_err(|e| CoreError::InvalidFormat(format!("group key hex: {e}")))?;
        if bytes.len() != PUBLIC_KEY_COMPRESSED_LEN {
            return Err(CoreError::InvalidFormat(
                "group key must be a 33-byte compressed point".into(),
            ));
        }
        Ok(bytes)
    }

    fn serialize_at(&self, writer: &mut BinaryWriter, depth: u8) -> Result<(), CoreError> {
        if depth > MAX_CONDITION_NESTING {
            return Err(CoreError::InvalidArgument(
                "witness condition nested too deeply".into(),
            ));
        }
        writer.write_u8(self.tag());
        match self {
            WitnessCondition::Boolean { expression } => writer.write_bool(*expression),
            WitnessCondition::Not { expression } => {
                expression.serialize_at(writer, depth + 1)?;
            }
            WitnessCondition::And { expressions } | WitnessCondition::Or { expressions } => {
                if expressions.is_empty() || expressions.len() > MAX_SIGNER_SUBITEMS {
                    return Err(CoreError::InvalidArgument(
                        "compound condition needs 1..=16 subexpressions".into(),
                    ));
                }
                writer.write_var_int(expressions.len() as u64);
                for expression in expressions {
                    expression.serialize_at(writer, depth + 1)?;
                }
            }
            WitnessCondition::ScriptHash { hash } | WitnessCondition::CalledByContract { hash } => {
                Serializable::serialize(hash, writer)?;
            }
            WitnessCondition::Group { group } | WitnessCondition::CalledByGroup { group } => {
                writer.write_bytes(&Self::group_bytes(group)?);
            }
            WitnessCondition::CalledByEntry => {}
        }
        Ok(())
    }

    fn deserialize_at(reader: &mut MemoryReader<'_>, depth: u8) -> Result<Self, CoreError> {
        if depth > MAX_CONDITION_NESTING {
            return Err(CoreError::InvalidFormat(
                "witness condition nested too deeply".into(),
            ));
        }
        let tag = reader.read_u8()?;
        let condition = match tag {
            0x00 => WitnessCondition::Boolean {
                expression: reader.read_bool()?,
            },
            0x01 => WitnessCondition::Not {
                expression: Box::new(Self::deserialize_at(reader, depth + 1)?),
            },
            0x02 | 0x03 => {
                let count = reader.read_var_int_max(MAX_SIGNER_SUBITEMS as u64)? as usize;
                if count == 0 {
                    return Err(CoreError::InvalidFormat(
                        "compound condition with no subexpressions".into(),
                    ));
                }
                let mut expressions = Vec::with_capacity(count);
                for _ in 0..count {
                    expressions.push(Self::deserialize_at(reader, depth + 1)?);
                }
                if tag == 0x02 {
                    WitnessCondition::And { expressions }
                } else {
                    WitnessCondition::Or { expressions }
                }
            }
            0x18 => WitnessCondition::ScriptHash {
                hash: Serializable::deserialize(reader)?,
            },
            0x19 => WitnessCondition::Group {
                group: hex::encode(reader.read_bytes(PUBLIC_KEY_COMPRESSED_LEN)?),
            },
            0x20 => WitnessCondition::CalledByEntry,
            0x28 => WitnessCondition::CalledByContract {
                hash: Serializable::deserialize(reader)?,
            },
            0x29 => WitnessCondition::CalledByGroup {
                group: hex::encode(reader.read_bytes(PUBLIC_KEY_COMPRESSED_LEN)?),
            },
            other => {
                return Err(CoreError::InvalidFormat(format!(
                    "unknown witness condition tag {other:#04x}"
                )))
            }
        };
        Ok(condition)
    }
}

/// A rule-scoped witness restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessRule {
    pub action: WitnessRuleAction,
    pub condition: WitnessCondition,
}

impl Serializable for WitnessRule {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_u8(self.action as u8);
        self.condition.serialize_at(writer, 0)
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let action = match reader.read_u8()? {
            0 => WitnessRuleAction::Deny,
            1 => WitnessRuleAction::Allow,
            other => {
                return Err(CoreError::InvalidFormat(format!(
                    "unknown witness rule action {other:#04x}"
                )))
            }
        };
        Ok(Self {
            action,
            condition: WitnessCondition::deserialize_at(reader, 0)?,
        })
    }
}

/// A transaction signer: account hash, scope bits and scope payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signer {
    pub account: Hash160,
    pub scopes: WitnessScopes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_contracts: Vec<Hash160>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<WitnessRule>,
}

impl Signer {
    /// Signer whose witness only counts at transaction entry.
    pub fn called_by_entry(account: Hash160) -> Self {
        Self {
            account,
            scopes: WitnessScopes::CALLED_BY_ENTRY,
            allowed_contracts: Vec::new(),
            allowed_groups: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Signer whose witness is valid in any context.
    pub fn global(account: Hash160) -> Self {
        Self {
            scopes: WitnessScopes::GLOBAL,
            ..Self::called_by_entry(account)
        }
    }

    /// Fee-only signer; its witness authorizes nothing else.
    pub fn none(account: Hash160) -> Self {
        Self {
            scopes: WitnessScopes::NONE,
            ..Self::called_by_entry(account)
        }
    }

    /// Restrict the witness to specific contracts, adding the
    /// `CUSTOM_CONTRACTS` scope.
    pub fn allow_contracts(mut self, contracts: Vec<Hash160>) -> Result<Self, CoreError> {
        if contracts.is_empty() || contracts.len() > MAX_SIGNER_SUBITEMS {
            return Err(CoreError::InvalidArgument(
                "contract allow-list needs 1..=16 entries".into(),
            ));
        }
        self.scopes = self.scopes.union(WitnessScopes::CUSTOM_CONTRACTS)?;
        self.allowed_contracts = contracts;
        Ok(self)
    }

    /// Restrict the witness to contracts signed by specific key groups,
    /// adding the `CUSTOM_GROUPS` scope. Keys are hex compressed points.
    pub fn allow_groups(mut self, groups: Vec<String>) -> Result<Self, CoreError> {
        if groups.is_empty() || groups.len() > MAX_SIGNER_SUBITEMS {
            return Err(CoreError::InvalidArgument(
                "group allow-list needs 1..=16 entries".into(),
            ));
        }
        for group in &groups {
            WitnessCondition::group_bytes(group)?;
        }
        self.scopes = self.scopes.union(WitnessScopes::CUSTOM_GROUPS)?;
        self.allowed_groups = groups;
        Ok(self)
    }

    /// Attach witness rules, adding the `WITNESS_RULES` scope.
    pub fn with_rules(mut self, rules: Vec<WitnessRule>) -> Result<Self, CoreError> {
        if rules.is_empty() || rules.len() > MAX_SIGNER_SUBITEMS {
            return Err(CoreError::InvalidArgument(
                "rule list needs 1..=16 entries".into(),
            ));
        }
        self.scopes = self.scopes.union(WitnessScopes::WITNESS_RULES)?;
        self.rules = rules;
        Ok(self)
    }

    /// Check the scope/payload pairing invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        WitnessScopes::from_byte(self.scopes.bits())?;
        if self.scopes.contains(WitnessScopes::CUSTOM_CONTRACTS) && self.allowed_contracts.is_empty()
        {
            return Err(CoreError::InvalidArgument(
                "CustomContracts scope with empty contract list".into(),
            ));
        }
        if self.scopes.contains(WitnessScopes::CUSTOM_GROUPS) && self.allowed_groups.is_empty() {
            return Err(CoreError::InvalidArgument(
                "CustomGroups scope with empty group list".into(),
            ));
        }
        if self.scopes.contains(WitnessScopes::WITNESS_RULES) && self.rules.is_empty() {
            return Err(CoreError::InvalidArgument(
                "WitnessRules scope with empty rule list".into(),
            ));
        }
        Ok(())
    }
}

impl Serializable for Signer {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        self.validate()?;
        Serializable::serialize(&self.account, writer)?;
        writer.write_u8(self.scopes.bits());
        if self.scopes.contains(WitnessScopes::CUSTOM_CONTRACTS) {
            writer.write_var_int(self.allowed_contracts.len() as u64);
            for contract in &self.allowed_contracts {
                Serializable::serialize(contract, writer)?;
            }
        }
        if self.scopes.contains(WitnessScopes::CUSTOM_GROUPS) {
            writer.write_var_int(self.allowed_groups.len() as u64);
            for group in &self.allowed_groups {
                writer.write_bytes(&WitnessCondition::group_bytes(group)?);
            }
        }
        if self.scopes.contains(WitnessScopes::WITNESS_RULES) {
            writer.write_var_int(self.rules.len() as u64);
            for rule in &self.rules {
                Serializable::serialize(rule, writer)?;
            }
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let account = Serializable::deserialize(reader)?;
        let scopes = WitnessScopes::from_byte(reader.read_u8()?)?;

        let mut allowed_contracts = Vec::new();
        if scopes.contains(WitnessScopes::CUSTOM_CONTRACTS) {
            let count = reader.read_var_int_max(MAX_SIGNER_SUBITEMS as u64)? as usize;
            for _ in 0..count {
                allowed_contracts.push(Serializable::deserialize(reader)?);
            }
        }
        let mut allowed_groups = Vec::new();
        if scopes.contains(WitnessScopes::CUSTOM_GROUPS) {
            let count = reader.read_var_int_max(MAX_SIGNER_SUBITEMS as u64)? as usize;
            for _ in 0..count {
                allowed_groups.push(hex::encode(reader.read_bytes(PUBLIC_KEY_COMPRESSED_LEN)?));
            }
        }
        let mut rules = Vec::new();
        if scopes.contains(WitnessScopes::WITNESS_RULES) {
            let count = reader.read_var_int_max(MAX_SIGNER_SUBITEMS as u64)? as usize;
            for _ in 0..count {
                rules.push(Serializable::deserialize(reader)?);
            }
        }

        let signer = Self {
            account,
            scopes,
            allowed_contracts,
            allowed_groups,
            rules,
        };
        signer.validate()?;
        Ok(signer)
    }
}

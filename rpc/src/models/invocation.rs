// Script test-execution response records
use serde::{Deserialize, Serialize};

use lattice_core::{InvocationOutcome, StackValue};

use crate::error::RpcError;
use crate::models::{decode_base64, parse_amount};

/// One VM stack item, as `{"type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcStackItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
}

impl RpcStackItem {
    /// Narrow to the [`StackValue`] subset the fee path consumes; anything
    /// richer (arrays, maps, pointers) degrades to `Any`.
    pub fn into_stack_value(&self) -> Result<StackValue, RpcError> {
        let value = match self.item_type.as_str() {
            "Boolean" => StackValue::Boolean(self.value.as_bool().ok_or_else(|| {
                RpcError::InvalidFormat("Boolean stack item without bool value".into())
            })?),
            "Integer" => {
                let text = self.value.as_str().ok_or_else(|| {
                    RpcError::InvalidFormat("Integer stack item without string value".into())
                })?;
                StackValue::Integer(parse_amount(text, "stack integer")?)
            }
            "ByteString" => {
                let text = self.value.as_str().ok_or_else(|| {
                    RpcError::InvalidFormat("ByteString stack item without string value".into())
                })?;
                StackValue::ByteString(decode_base64(text, "stack byte string")?)
            }
            _ => StackValue::Any,
        };
        Ok(value)
    }
}

/// Result of `invokescript`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcInvocationResult {
    pub script: String,
    pub state: String,
    #[serde(rename = "gasconsumed")]
    pub gas_consumed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default)]
    pub stack: Vec<RpcStackItem>,
}

impl RpcInvocationResult {
    /// Convert into the outcome the transaction builder consumes. A
    /// faulted execution is still an outcome; the caller decides whether
    /// `FAULT` is acceptable for its use.
    pub fn into_outcome(&self) -> Result<InvocationOutcome, RpcError> {
        if self.state != "HALT" {
            tracing::warn!(state = %self.state, exception = ?self.exception, "script did not halt cleanly");
        }
        Ok(InvocationOutcome {
            gas_consumed: parse_amount(&self.gas_consumed, "gasconsumed")?,
            stack: self
                .stack
                .iter()
                .map(RpcStackItem::into_stack_value)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

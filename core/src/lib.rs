// Lattice Core - transactions, scripts, blocks and accounts
//
// This crate implements the consensus-critical client side of the chain:
// the binary wire codec, the script assembler, transaction construction
// and signing, block verification and the executable container format.
// It emits and parses VM bytecode but never executes it.

pub mod account;
pub mod attribute;
pub mod block;
pub mod client;
pub mod error;
pub mod hash;
pub mod io;
pub mod merkle;
pub mod nef;
pub mod script;
pub mod settings;
pub mod signer;
pub mod tokens;
pub mod transaction;
pub mod tx_builder;
pub mod witness;

pub use account::{Account, AccountKind};
pub use attribute::{OracleResponseCode, TransactionAttribute};
pub use block::{Block, BlockHeader};
pub use client::{ChainRpc, InvocationOutcome, StackValue};
pub use error::CoreError;
pub use hash::{Hash160, Hash256};
pub use io::{BinaryWriter, MemoryReader, Serializable};
pub use merkle::merkle_root;
pub use nef::{MethodToken, NefFile};
pub use script::{CallFlags, OpCode, ScriptBuilder, ScriptParameter};
pub use settings::ProtocolSettings;
pub use signer::{Signer, WitnessCondition, WitnessRule, WitnessRuleAction, WitnessScopes};
pub use tokens::FungibleToken;
pub use transaction::Transaction;
pub use tx_builder::TransactionBuilder;
pub use witness::Witness;

// Lattice RPC - node response models and the offline client
//
// Pure data records for node replies (blocks, transactions, mempool,
// token transfers, script invocations) with JSON conversions in the
// node's own field-name conventions, plus a null RPC client for
// air-gapped use. The transport itself lives outside the SDK.

pub mod client;
pub mod error;
pub mod models;

pub use client::OfflineClient;
pub use error::RpcError;
pub use models::{
    Nep17Transfer, Nep17Transfers, RawMemPool, RpcBlock, RpcInvocationResult, RpcSigner,
    RpcStackItem, RpcTransaction, RpcWitness,
};

// System-call name table
//
// Syscall IDs are the xxHash32 (seed 0) of the canonical service name,
// written little-endian after the SYSCALL opcode. The name set is closed,
// so the table is built once on first use and never mutated afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub const SYSTEM_CONTRACT_CALL: &str = "System.Contract.Call";
pub const SYSTEM_CONTRACT_CALL_NATIVE: &str = "System.Contract.CallNative";
pub const SYSTEM_CONTRACT_GET_CALL_FLAGS: &str = "System.Contract.GetCallFlags";
pub const SYSTEM_CONTRACT_CREATE_STANDARD_ACCOUNT: &str = "System.Contract.CreateStandardAccount";
pub const SYSTEM_CONTRACT_CREATE_MULTISIG_ACCOUNT: &str = "System.Contract.CreateMultisigAccount";
pub const SYSTEM_CRYPTO_CHECK_SIG: &str = "System.Crypto.CheckSig";
pub const SYSTEM_CRYPTO_CHECK_MULTISIG: &str = "System.Crypto.CheckMultisig";
pub const SYSTEM_RUNTIME_PLATFORM: &str = "System.Runtime.Platform";
pub const SYSTEM_RUNTIME_GET_TRIGGER: &str = "System.Runtime.GetTrigger";
pub const SYSTEM_RUNTIME_GET_TIME: &str = "System.Runtime.GetTime";
pub const SYSTEM_RUNTIME_GET_SCRIPT_CONTAINER: &str = "System.Runtime.GetScriptContainer";
pub const SYSTEM_RUNTIME_GET_EXECUTING_SCRIPT_HASH: &str = "System.Runtime.GetExecutingScriptHash";
pub const SYSTEM_RUNTIME_GET_CALLING_SCRIPT_HASH: &str = "System.Runtime.GetCallingScriptHash";
pub const SYSTEM_RUNTIME_GET_ENTRY_SCRIPT_HASH: &str = "System.Runtime.GetEntryScriptHash";
pub const SYSTEM_RUNTIME_CHECK_WITNESS: &str = "System.Runtime.CheckWitness";
pub const SYSTEM_RUNTIME_GET_INVOCATION_COUNTER: &str = "System.Runtime.GetInvocationCounter";
pub const SYSTEM_RUNTIME_LOG: &str = "System.Runtime.Log";
pub const SYSTEM_RUNTIME_NOTIFY: &str = "System.Runtime.Notify";
pub const SYSTEM_RUNTIME_GET_NOTIFICATIONS: &str = "System.Runtime.GetNotifications";
pub const SYSTEM_RUNTIME_GAS_LEFT: &str = "System.Runtime.GasLeft";
pub const SYSTEM_RUNTIME_BURN_GAS: &str = "System.Runtime.BurnGas";
pub const SYSTEM_RUNTIME_GET_NETWORK: &str = "System.Runtime.GetNetwork";
pub const SYSTEM_RUNTIME_GET_RANDOM: &str = "System.Runtime.GetRandom";
pub const SYSTEM_STORAGE_GET_CONTEXT: &str = "System.Storage.GetContext";
pub const SYSTEM_STORAGE_GET_READ_ONLY_CONTEXT: &str = "System.Storage.GetReadOnlyContext";
pub const SYSTEM_STORAGE_AS_READ_ONLY: &str = "System.Storage.AsReadOnly";
pub const SYSTEM_STORAGE_GET: &str = "System.Storage.Get";
pub const SYSTEM_STORAGE_FIND: &str = "System.Storage.Find";
pub const SYSTEM_STORAGE_PUT: &str = "System.Storage.Put";
pub const SYSTEM_STORAGE_DELETE: &str = "System.Storage.Delete";
pub const SYSTEM_ITERATOR_NEXT: &str = "System.Iterator.Next";
pub const SYSTEM_ITERATOR_VALUE: &str = "System.Iterator.Value";

const NAMES: &[&str] = &[
    SYSTEM_CONTRACT_CALL,
    SYSTEM_CONTRACT_CALL_NATIVE,
    SYSTEM_CONTRACT_GET_CALL_FLAGS,
    SYSTEM_CONTRACT_CREATE_STANDARD_ACCOUNT,
    SYSTEM_CONTRACT_CREATE_MULTISIG_ACCOUNT,
    SYSTEM_CRYPTO_CHECK_SIG,
    SYSTEM_CRYPTO_CHECK_MULTISIG,
    SYSTEM_RUNTIME_PLATFORM,
    SYSTEM_RUNTIME_GET_TRIGGER,
    SYSTEM_RUNTIME_GET_TIME,
    SYSTEM_RUNTIME_GET_SCRIPT_CONTAINER,
    SYSTEM_RUNTIME_GET_EXECUTING_SCRIPT_HASH,
    SYSTEM_RUNTIME_GET_CALLING_SCRIPT_HASH,
    SYSTEM_RUNTIME_GET_ENTRY_SCRIPT_HASH,
    SYSTEM_RUNTIME_CHECK_WITNESS,
    SYSTEM_RUNTIME_GET_INVOCATION_COUNTER,
    SYSTEM_RUNTIME_LOG,
    SYSTEM_RUNTIME_NOTIFY,
    SYSTEM_RUNTIME_GET_NOTIFICATIONS,
    SYSTEM_RUNTIME_GAS_LEFT,
    SYSTEM_RUNTIME_BURN_GAS,
    SYSTEM_RUNTIME_GET_NETWORK,
    SYSTEM_RUNTIME_GET_RANDOM,
    SYSTEM_STORAGE_GET_CONTEXT,
    SYSTEM_STORAGE_GET_READ_ONLY_CONTEXT,
    SYSTEM_STORAGE_AS_READ_ONLY,
    SYSTEM_STORAGE_GET,
    SYSTEM_STORAGE_FIND,
    SYSTEM_STORAGE_PUT,
    SYSTEM_STORAGE_DELETE,
    SYSTEM_ITERATOR_NEXT,
    SYSTEM_ITERATOR_VALUE,
];

static FORWARD: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| NAMES.iter().map(|name| (*name, xxhash32(name.as_bytes(), 0))).collect());

static REVERSE: Lazy<HashMap<u32, &'static str>> =
    Lazy::new(|| FORWARD.iter().map(|(name, id)| (*id, *name)).collect());

/// ID of a known service name.
pub fn lookup(name: &str) -> Option<u32> {
    FORWARD.get(name).copied()
}

/// Canonical name of a known service ID.
pub fn reverse_lookup(id: u32) -> Option<&'static str> {
    REVERSE.get(&id).copied()
}

/// All registered service names.
pub fn names() -> &'static [&'static str] {
    NAMES
}

const PRIME1: u32 = 2_654_435_761;
const PRIME2: u32 = 2_246_822_519;
const PRIME3: u32 = 3_266_489_917;
const PRIME4: u32 = 668_265_263;
const PRIME5: u32 = 374_761_393;

fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes[..4].try_into().unwrap())
}

fn round(acc: u32, lane: u32) -> u32 {
    acc.wrapping_add(lane.wrapping_mul(PRIME2))
        .rotate_left(13)
        .wrapping_mul(PRIME1)
}

/// xxHash32. The service names are all shorter than 64 bytes, but the full
/// algorithm is implemented so the IDs match the published vectors exactly.
pub fn xxhash32(data: &[u8], seed: u32) -> u32 {
    let mut offset = 0;
    let mut hash = if data.len() >= 16 {
        let mut v1 = seed.wrapping_add(PRIME1).wrapping_add(PRIME2);
        let mut v2 = seed.wrapping_add(PRIME2);
        let mut v3 = seed;
        let mut v4 = seed.wrapping_sub(PRIME1);
        while offset + 16 <= data.len() {
            v1 = round(v1, read_u32_le(&data[offset..]));
            v2 = round(v2, read_u32_le(&data[offset + 4..]));
            v3 = round(v3, read_u32_le(&data[offset + 8..]));
            v4 = round(v4, read_u32_le(&data[offset + 12..]));
            offset += 16;
        }
        v1.rotate_left(1)
            .wrapping_add(v2.rotate_left(7))
            .wrapping_add(v3.rotate_left(12))
            .wrapping_add(v4.rotate_left(18))
    } else {
        seed.wrapping_add(PRIME5)
    };

    hash = hash.wrapping_add(data.len() as u32);

    while offset + 4 <= data.len() {
        hash = hash
            .wrapping_add(read_u32_le(&data[offset..]).wrapping_mul(PRIME3))
            .rotate_left(17)
            .wrapping_mul(PRIME4);
        offset += 4;
    }
    while offset < data.len() {
        hash = hash
            .wrapping_add((data[offset] as u32).wrapping_mul(PRIME5))
            .rotate_left(11)
            .wrapping_mul(PRIME1);
        offset += 1;
    }

    hash ^= hash >> 15;
    hash = hash.wrapping_mul(PRIME2);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(PRIME3);
    hash ^= hash >> 16;
    hash
}

// Script builder: emits bytecode for the stack VM
use num_bigint::BigInt;

use crate::error::CoreError;
use crate::hash::Hash160;
use crate::script::interop;
use crate::script::opcode::OpCode;
use crate::script::{CallFlags, ScriptParameter, MAX_SCRIPT_LEN};

use lattice_crypto::PUBLIC_KEY_COMPRESSED_LEN;

/// Appends instructions to a growing byte buffer.
///
/// The builder never executes anything; it only guarantees that what it
/// emits is well-formed at the instruction level.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Finish, enforcing the transaction-script size cap.
    pub fn into_script(self) -> Result<Vec<u8>, CoreError> {
        if self.script.len() > MAX_SCRIPT_LEN {
            return Err(CoreError::InvalidSize {
                what: "script",
                actual: self.script.len(),
                max: MAX_SCRIPT_LEN,
            });
        }
        Ok(self.script)
    }

    /// The raw bytes emitted so far, without the size check.
    pub fn as_bytes(&self) -> &[u8] {
        &self.script
    }

    pub fn emit(&mut self, opcode: OpCode) -> &mut Self {
        self.script.push(opcode as u8);
        self
    }

    pub fn emit_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend_from_slice(bytes);
        self
    }

    /// `SYSCALL` followed by the little-endian ID of a known service name.
    pub fn emit_syscall(&mut self, name: &str) -> Result<&mut Self, CoreError> {
        let id = interop::lookup(name)
            .ok_or_else(|| CoreError::InvalidArgument(format!("unknown syscall {name:?}")))?;
        Ok(self.emit_syscall_id(id))
    }

    pub fn emit_syscall_id(&mut self, id: u32) -> &mut Self {
        self.emit(OpCode::Syscall);
        self.script.extend_from_slice(&id.to_le_bytes());
        self
    }

    /// Push an integer using the tightest encoding: `PUSHM1`,
    /// `PUSH0`..`PUSH16`, or the smallest `PUSHINT{8,16,32,64}` holding the
    /// value in two's-complement little-endian.
    pub fn push_integer(&mut self, value: i64) -> &mut Self {
        if value == -1 {
            return self.emit(OpCode::PushM1);
        }
        if (0..=16).contains(&value) {
            if let Some(opcode) = OpCode::for_small_int(value as u8) {
                return self.emit(opcode);
            }
        }
        if let Ok(v) = i8::try_from(value) {
            self.emit(OpCode::PushInt8);
            self.script.extend_from_slice(&v.to_le_bytes());
        } else if let Ok(v) = i16::try_from(value) {
            self.emit(OpCode::PushInt16);
            self.script.extend_from_slice(&v.to_le_bytes());
        } else if let Ok(v) = i32::try_from(value) {
            self.emit(OpCode::PushInt32);
            self.script.extend_from_slice(&v.to_le_bytes());
        } else {
            self.emit(OpCode::PushInt64);
            self.script.extend_from_slice(&value.to_le_bytes());
        }
        self
    }

    /// Push an arbitrary-precision integer, extending the tightness rule to
    /// `PUSHINT128` and `PUSHINT256`. Values outside 256 signed bits are
    /// rejected.
    pub fn push_big_integer(&mut self, value: &BigInt) -> Result<&mut Self, CoreError> {
        if let Ok(small) = i64::try_from(value) {
            return Ok(self.push_integer(small));
        }
        let bytes = value.to_signed_bytes_le();
        let (opcode, width) = if bytes.len() <= 16 {
            (OpCode::PushInt128, 16)
        } else if bytes.len() <= 32 {
            (OpCode::PushInt256, 32)
        } else {
            return Err(CoreError::InvalidArgument(
                "integer exceeds 256 bits".into(),
            ));
        };
        let fill = if value.sign() == num_bigint::Sign::Minus {
            0xFF
        } else {
            0x00
        };
        self.emit(opcode);
        self.script.extend_from_slice(&bytes);
        self.script.extend(std::iter::repeat(fill).take(width - bytes.len()));
        Ok(self)
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.emit(if value { OpCode::Push1 } else { OpCode::Push0 })
    }

    /// Push raw data with the smallest `PUSHDATA` form. Empty data becomes
    /// `PUSH0`.
    pub fn push_data(&mut self, data: &[u8]) -> Result<&mut Self, CoreError> {
        if data.is_empty() {
            return Ok(self.emit(OpCode::Push0));
        }
        if data.len() <= 0xFF {
            self.emit(OpCode::PushData1);
            self.script.push(data.len() as u8);
        } else if data.len() <= 0xFFFF {
            self.emit(OpCode::PushData2);
            self.script.extend_from_slice(&(data.len() as u16).to_le_bytes());
        } else if data.len() <= 0xFFFF_FFFF {
            self.emit(OpCode::PushData4);
            self.script.extend_from_slice(&(data.len() as u32).to_le_bytes());
        } else {
            return Err(CoreError::InvalidArgument("data exceeds PUSHDATA4".into()));
        }
        self.script.extend_from_slice(data);
        Ok(self)
    }

    pub fn push_string(&mut self, value: &str) -> Result<&mut Self, CoreError> {
        self.push_data(value.as_bytes())
    }

    pub fn push_hash160(&mut self, hash: &Hash160) -> Result<&mut Self, CoreError> {
        self.push_data(hash.as_bytes())
    }

    pub fn push_null(&mut self) -> &mut Self {
        self.emit(OpCode::PushNull)
    }

    pub fn push_parameter(&mut self, parameter: &ScriptParameter) -> Result<&mut Self, CoreError> {
        match parameter {
            ScriptParameter::Null => {
                self.push_null();
            }
            ScriptParameter::Bool(v) => {
                self.push_bool(*v);
            }
            ScriptParameter::Integer(v) => {
                self.push_integer(*v);
            }
            ScriptParameter::ByteArray(bytes) => {
                self.push_data(bytes)?;
            }
            ScriptParameter::String(s) => {
                self.push_string(s)?;
            }
            ScriptParameter::Hash160(hash) => {
                self.push_hash160(hash)?;
            }
            ScriptParameter::Array(items) => {
                self.push_array(items)?;
            }
        }
        Ok(self)
    }

    /// Push `items` as a VM array: elements in reverse order, then the count
    /// and `PACK`; an empty array is `NEWARRAY0`.
    pub fn push_array(&mut self, items: &[ScriptParameter]) -> Result<&mut Self, CoreError> {
        if items.is_empty() {
            return Ok(self.emit(OpCode::NewArray0));
        }
        for item in items.iter().rev() {
            self.push_parameter(item)?;
        }
        self.push_integer(items.len() as i64);
        Ok(self.emit(OpCode::Pack))
    }

    /// Emit a full contract invocation via `System.Contract.Call`.
    pub fn contract_call(
        &mut self,
        hash: &Hash160,
        method: &str,
        args: &[ScriptParameter],
        call_flags: CallFlags,
    ) -> Result<&mut Self, CoreError> {
        if method.is_empty() {
            return Err(CoreError::InvalidArgument("method name is empty".into()));
        }
        self.push_array(args)?;
        self.push_integer(call_flags.bits() as i64);
        self.push_string(method)?;
        self.push_data(hash.as_bytes())?;
        self.emit_syscall(interop::SYSTEM_CONTRACT_CALL)
    }
}

/// Verification script for a single compressed public key:
/// `PUSHDATA1 33 key ‖ SYSCALL CheckSig` (40 bytes).
pub fn single_sig_script(public_key: &[u8]) -> Result<Vec<u8>, CoreError> {
    if public_key.len() != PUBLIC_KEY_COMPRESSED_LEN
        || (public_key[0] != 0x02 && public_key[0] != 0x03)
    {
        return Err(CoreError::InvalidArgument(
            "expected a 33-byte compressed public key".into(),
        ));
    }
    let mut builder = ScriptBuilder::new();
    builder.push_data(public_key)?;
    builder.emit_syscall(interop::SYSTEM_CRYPTO_CHECK_SIG)?;
    builder.into_script()
}

/// Verification script for an M-of-N key set:
/// `PUSH(M) ‖ keys ‖ PUSH(N) ‖ SYSCALL CheckMultisig`.
///
/// Keys are sorted by their compressed encoding before emission; the sort
/// is what keeps the script hash stable across callers.
pub fn multi_sig_script(threshold: usize, public_keys: &[Vec<u8>]) -> Result<Vec<u8>, CoreError> {
    let count = public_keys.len();
    if threshold == 0 || threshold > count || count > 1024 {
        return Err(CoreError::InvalidArgument(format!(
            "invalid multi-sig parameters: m={threshold}, n={count}"
        )));
    }
    for key in public_keys {
        if key.len() != PUBLIC_KEY_COMPRESSED_LEN || (key[0] != 0x02 && key[0] != 0x03) {
            return Err(CoreError::InvalidArgument(
                "expected 33-byte compressed public keys".into(),
            ));
        }
    }
    let mut sorted: Vec<&Vec<u8>> = public_keys.iter().collect();
    sorted.sort();

    let mut builder = ScriptBuilder::new();
    builder.push_integer(threshold as i64);
    for key in sorted {
        builder.push_data(key)?;
    }
    builder.push_integer(count as i64);
    builder.emit_syscall(interop::SYSTEM_CRYPTO_CHECK_MULTISIG)?;
    builder.into_script()
}

/// Whether `script` is the canonical single-signature verification script.
pub fn is_single_sig_script(script: &[u8]) -> bool {
    let Some(id) = interop::lookup(interop::SYSTEM_CRYPTO_CHECK_SIG) else {
        return false;
    };
    script.len() == 40
        && script[0] == OpCode::PushData1 as u8
        && script[1] == PUBLIC_KEY_COMPRESSED_LEN as u8
        && script[35] == OpCode::Syscall as u8
        && script[36..40] == id.to_le_bytes()
}

/// Parse a canonical multi-signature verification script, returning the
/// threshold and the ordered public keys.
pub fn parse_multi_sig_script(script: &[u8]) -> Option<(usize, Vec<Vec<u8>>)> {
    fn read_int(script: &[u8], offset: &mut usize) -> Option<usize> {
        let opcode = OpCode::try_from(*script.get(*offset)?).ok()?;
        if let Some(v) = opcode.small_int_value() {
            *offset += 1;
            return usize::try_from(v).ok();
        }
        match opcode {
            OpCode::PushInt8 => {
                let v = *script.get(*offset + 1)? as i8;
                *offset += 2;
                usize::try_from(v).ok()
            }
            OpCode::PushInt16 => {
                let bytes = script.get(*offset + 1..*offset + 3)?;
                let v = i16::from_le_bytes(bytes.try_into().ok()?);
                *offset += 3;
                usize::try_from(v).ok()
            }
            _ => None,
        }
    }

    let mut offset = 0usize;
    let threshold = read_int(script, &mut offset)?;

    let mut keys = Vec::new();
    while script.get(offset) == Some(&(OpCode::PushData1 as u8))
        && script.get(offset + 1) == Some(&(PUBLIC_KEY_COMPRESSED_LEN as u8))
    {
        let key = script.get(offset + 2..offset + 2 + PUBLIC_KEY_COMPRESSED_LEN)?;
        keys.push(key.to_vec());
        offset += 2 + PUBLIC_KEY_COMPRESSED_LEN;
    }

    let count = read_int(script, &mut offset)?;
    if count != keys.len() || threshold == 0 || threshold > count {
        return None;
    }
    let id = interop::lookup(interop::SYSTEM_CRYPTO_CHECK_MULTISIG)?;
    let tail = script.get(offset..)?;
    if tail.len() != 5 || tail[0] != OpCode::Syscall as u8 || tail[1..] != id.to_le_bytes() {
        return None;
    }
    Some((threshold, keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::KeyPair;

    #[test]
    fn test_push_integer_tightness() {
        let cases: &[(i64, &[u8])] = &[
            (-1, &[0x0F]),
            (0, &[0x10]),
            (1, &[0x11]),
            (16, &[0x20]),
            (17, &[0x00, 0x11]),
            (127, &[0x00, 0x7F]),
            (-2, &[0x00, 0xFE]),
            (128, &[0x01, 0x80, 0x00]),
            (32767, &[0x01, 0xFF, 0x7F]),
            (32768, &[0x02, 0x00, 0x80, 0x00, 0x00]),
            (
                1i64 << 31,
                &[0x03, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00],
            ),
            (
                i64::MAX,
                &[0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F],
            ),
            (
                i64::MIN,
                &[0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80],
            ),
        ];
        for (value, expected) in cases {
            let mut builder = ScriptBuilder::new();
            builder.push_integer(*value);
            assert_eq!(builder.as_bytes(), *expected, "encoding of {value}");
        }
    }

    #[test]
    fn test_push_big_integer_widths() {
        let mut builder = ScriptBuilder::new();
        let value = BigInt::from(i64::MAX) + 1;
        builder.push_big_integer(&value).unwrap();
        assert_eq!(builder.as_bytes()[0], OpCode::PushInt128 as u8);
        assert_eq!(builder.len(), 17);

        let mut builder = ScriptBuilder::new();
        let value = BigInt::from(1) << 200;
        builder.push_big_integer(&value).unwrap();
        assert_eq!(builder.as_bytes()[0], OpCode::PushInt256 as u8);
        assert_eq!(builder.len(), 33);

        let mut builder = ScriptBuilder::new();
        assert!(builder.push_big_integer(&(BigInt::from(1) << 300)).is_err());
    }

    #[test]
    fn test_push_big_integer_negative_fill() {
        let mut builder = ScriptBuilder::new();
        let value = -(BigInt::from(i64::MAX) + 2i64);
        builder.push_big_integer(&value).unwrap();
        let bytes = builder.as_bytes();
        // sign-extension keeps the two's-complement value intact
        assert_eq!(bytes[0], OpCode::PushInt128 as u8);
        assert_eq!(bytes[16], 0xFF);
    }

    #[test]
    fn test_push_bool() {
        let mut builder = ScriptBuilder::new();
        builder.push_bool(true).push_bool(false);
        assert_eq!(builder.as_bytes(), &[0x11, 0x10]);
    }

    #[test]
    fn test_push_data_classes() {
        let mut builder = ScriptBuilder::new();
        builder.push_data(&[]).unwrap();
        assert_eq!(builder.as_bytes(), &[0x10]);

        let mut builder = ScriptBuilder::new();
        builder.push_data(&[0xAA; 200]).unwrap();
        assert_eq!(builder.as_bytes()[..2], [0x0C, 200]);

        let mut builder = ScriptBuilder::new();
        builder.push_data(&[0xBB; 0x100]).unwrap();
        assert_eq!(builder.as_bytes()[..3], [0x0D, 0x00, 0x01]);

        let mut builder = ScriptBuilder::new();
        builder.push_data(&[0xCC; 0x1_0001]).unwrap();
        assert_eq!(builder.as_bytes()[..5], [0x0E, 0x01, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_emit_syscall() {
        let mut builder = ScriptBuilder::new();
        builder.emit_syscall(interop::SYSTEM_CONTRACT_CALL).unwrap();
        assert_eq!(builder.as_bytes(), &[0x41, 0x89, 0x0F, 0xDA, 0x9E]);
        assert!(builder.emit_syscall("Not.A.Service").is_err());
    }

    #[test]
    fn test_single_sig_script_shape() {
        let pair = KeyPair::generate().unwrap();
        let script = single_sig_script(&pair.public_key()).unwrap();
        assert_eq!(script.len(), 40);
        assert_eq!(script[0], 0x0C);
        assert_eq!(script[1], 0x21);
        assert_eq!(script[35], 0x41);
        assert!(is_single_sig_script(&script));
    }

    #[test]
    fn test_single_sig_script_known_key() {
        let key =
            hex::decode("035fdb1d1f06759547020891ae97c729327853aeb1256b6fe0473bc2e9fa42ff50")
                .unwrap();
        let script = single_sig_script(&key).unwrap();
        assert_eq!(script.len(), 40);
        assert_eq!(&script[2..35], &key[..]);
        // SYSCALL CheckSig tail
        assert_eq!(script[36..40], 0x5AAB_9463u32.to_le_bytes());
    }

    #[test]
    fn test_single_sig_rejects_uncompressed() {
        let pair = KeyPair::generate().unwrap();
        assert!(single_sig_script(&pair.public_key_uncompressed()).is_err());
    }

    #[test]
    fn test_multi_sig_script_sorted() {
        let mut keys: Vec<Vec<u8>> = (0..3)
            .map(|_| KeyPair::generate().unwrap().public_key().to_vec())
            .collect();
        let script = multi_sig_script(2, &keys).unwrap();
        assert_eq!(script[0], OpCode::Push2 as u8);

        let (threshold, parsed) = parse_multi_sig_script(&script).unwrap();
        assert_eq!(threshold, 2);
        keys.sort();
        assert_eq!(parsed, keys);

        // input order must not matter
        let mut shuffled = keys.clone();
        shuffled.rotate_left(1);
        assert_eq!(multi_sig_script(2, &shuffled).unwrap(), script);
    }

    #[test]
    fn test_multi_sig_ends_with_checkmultisig() {
        let keys: Vec<Vec<u8>> = (0..3)
            .map(|_| KeyPair::generate().unwrap().public_key().to_vec())
            .collect();
        let script = multi_sig_script(2, &keys).unwrap();
        let len = script.len();
        assert_eq!(script[len - 5], 0x41);
        assert_eq!(script[len - 4..], 0xA8B8_0A37u32.to_le_bytes());
        // PUSH3 precedes the syscall
        assert_eq!(script[len - 6], OpCode::Push3 as u8);
    }

    #[test]
    fn test_multi_sig_parameter_validation() {
        let keys: Vec<Vec<u8>> = (0..2)
            .map(|_| KeyPair::generate().unwrap().public_key().to_vec())
            .collect();
        assert!(multi_sig_script(0, &keys).is_err());
        assert!(multi_sig_script(3, &keys).is_err());
    }

    #[test]
    fn test_contract_call_layout() {
        let hash = Hash160([0x42; 20]);
        let mut builder = ScriptBuilder::new();
        builder
            .contract_call(
                &hash,
                "transfer",
                &[ScriptParameter::Integer(1), ScriptParameter::Bool(true)],
                CallFlags::All,
            )
            .unwrap();
        let script = builder.into_script().unwrap();
        // args are reversed: true first, then 1
        assert_eq!(script[0], OpCode::Push1 as u8);
        assert_eq!(script[1], OpCode::Push1 as u8);
        assert_eq!(script[2], OpCode::Push2 as u8);
        assert_eq!(script[3], OpCode::Pack as u8);
        // trailing 5 bytes: SYSCALL + System.Contract.Call id
        let len = script.len();
        assert_eq!(script[len - 5], 0x41);
        assert_eq!(script[len - 4..], 0x9EDA_0F89u32.to_le_bytes());
    }

    #[test]
    fn test_contract_call_empty_args() {
        let hash = Hash160([0x01; 20]);
        let mut builder = ScriptBuilder::new();
        builder
            .contract_call(&hash, "symbol", &[], CallFlags::ReadOnly)
            .unwrap();
        assert_eq!(builder.as_bytes()[0], OpCode::NewArray0 as u8);
        assert!(builder.contract_call(&hash, "", &[], CallFlags::None).is_err());
    }

    #[test]
    fn test_nested_array_parameter() {
        let mut builder = ScriptBuilder::new();
        builder
            .push_parameter(&ScriptParameter::Array(vec![
                ScriptParameter::Integer(7),
                ScriptParameter::Array(vec![]),
            ]))
            .unwrap();
        let bytes = builder.as_bytes();
        // inner empty array first (reverse order), then 7, then PUSH2 PACK
        assert_eq!(bytes[0], OpCode::NewArray0 as u8);
        assert_eq!(bytes[1], OpCode::Push7 as u8);
        assert_eq!(bytes[2], OpCode::Push2 as u8);
        assert_eq!(bytes[3], OpCode::Pack as u8);
    }

    #[test]
    fn test_script_size_cap() {
        let mut builder = ScriptBuilder::new();
        builder.push_data(&vec![0u8; MAX_SCRIPT_LEN]).unwrap();
        assert!(builder.into_script().is_err());
    }
}

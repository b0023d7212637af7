// NEF: the executable container for deployable contracts
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::Hash160;
use crate::io::{BinaryWriter, MemoryReader, Serializable};

use lattice_crypto::hash::checksum4;

/// `"NEF3"` little-endian.
pub const NEF_MAGIC: u32 = 0x3346_454E;

/// Fixed width of the compiler field.
pub const COMPILER_FIELD_LEN: usize = 64;

/// Maximum entries in the method-token table.
pub const MAX_METHOD_TOKENS: usize = 255;

/// Maximum byte length of the contained script.
pub const MAX_NEF_SCRIPT_LEN: usize = 512 * 1024;

const MAX_SOURCE_LEN: usize = 255;
const MAX_METHOD_NAME_LEN: usize = 32;

/// A pre-bound external method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodToken {
    pub contract_hash: Hash160,
    pub method: String,
    pub parameter_count: u16,
    pub has_return_value: bool,
    pub call_flags: u8,
}

impl Serializable for MethodToken {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        let method = self.method.as_bytes();
        if method.is_empty() || method.len() > MAX_METHOD_NAME_LEN {
            return Err(CoreError::InvalidArgument(format!(
                "method name must be 1..={MAX_METHOD_NAME_LEN} bytes"
            )));
        }
        Serializable::serialize(&self.contract_hash, writer)?;
        writer.write_u8(method.len() as u8);
        writer.write_bytes(method);
        writer.write_u16(self.parameter_count);
        writer.write_u8(self.has_return_value as u8);
        writer.write_u8(self.call_flags);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let contract_hash = Serializable::deserialize(reader)?;
        let method_len = reader.read_u8()? as usize;
        if method_len == 0 || method_len > MAX_METHOD_NAME_LEN {
            return Err(CoreError::InvalidNef("method name length".into()));
        }
        let method = String::from_utf8(reader.read_bytes(method_len)?)
            .map_err(|_| CoreError::InvalidNef("method name is not UTF-8".into()))?;
        let parameter_count = reader.read_u16()?;
        let has_return_value = reader.read_bool()?;
        let call_flags = reader.read_u8()?;
        Ok(Self {
            contract_hash,
            method,
            parameter_count,
            has_return_value,
            call_flags,
        })
    }
}

/// The on-disk/on-wire executable container.
///
/// Mutators recompute the trailing checksum eagerly, so a `NefFile` in hand
/// always verifies unless it was tampered with after serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NefFile {
    compiler: String,
    source: String,
    tokens: Vec<MethodToken>,
    script: Vec<u8>,
    checksum: u32,
}

impl NefFile {
    pub fn new(compiler: &str, source: &str, script: Vec<u8>) -> Result<Self, CoreError> {
        if compiler.len() > COMPILER_FIELD_LEN {
            return Err(CoreError::InvalidArgument(format!(
                "compiler field exceeds {COMPILER_FIELD_LEN} bytes"
            )));
        }
        if source.len() > MAX_SOURCE_LEN {
            return Err(CoreError::InvalidArgument(format!(
                "source field exceeds {MAX_SOURCE_LEN} bytes"
            )));
        }
        if script.is_empty() || script.len() > MAX_NEF_SCRIPT_LEN {
            return Err(CoreError::InvalidArgument(
                "script must be 1 byte to 512 KiB".into(),
            ));
        }
        let mut file = Self {
            compiler: compiler.to_string(),
            source: source.to_string(),
            tokens: Vec::new(),
            script,
            checksum: 0,
        };
        file.checksum = file.compute_checksum()?;
        Ok(file)
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[MethodToken] {
        &self.tokens
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Append a method token, refreshing the checksum.
    pub fn add_method_token(&mut self, token: MethodToken) -> Result<(), CoreError> {
        if self.tokens.len() >= MAX_METHOD_TOKENS {
            return Err(CoreError::InvalidSize {
                what: "method-token table",
                actual: self.tokens.len() + 1,
                max: MAX_METHOD_TOKENS,
            });
        }
        self.tokens.push(token);
        self.checksum = self.compute_checksum()?;
        Ok(())
    }

    /// Replace the script, refreshing the checksum.
    pub fn set_script(&mut self, script: Vec<u8>) -> Result<(), CoreError> {
        if script.is_empty() || script.len() > MAX_NEF_SCRIPT_LEN {
            return Err(CoreError::InvalidArgument(
                "script must be 1 byte to 512 KiB".into(),
            ));
        }
        self.script = script;
        self.checksum = self.compute_checksum()?;
        Ok(())
    }

    fn serialize_without_checksum(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        writer.write_u32(NEF_MAGIC);
        let mut compiler_field = [0u8; COMPILER_FIELD_LEN];
        compiler_field[..self.compiler.len()].copy_from_slice(self.compiler.as_bytes());
        writer.write_bytes(&compiler_field);
        writer.write_u8(self.source.len() as u8);
        writer.write_bytes(self.source.as_bytes());
        writer.write_bytes(&[0u8; 2]);
        writer.write_u8(self.tokens.len() as u8);
        for token in &self.tokens {
            Serializable::serialize(token, writer)?;
        }
        writer.write_u8(0);
        writer.write_var_bytes(&self.script);
        Ok(())
    }

    /// First 4 bytes of `sha256d` over everything preceding the checksum.
    fn compute_checksum(&self) -> Result<u32, CoreError> {
        let mut writer = BinaryWriter::with_capacity(128 + self.script.len());
        self.serialize_without_checksum(&mut writer)?;
        Ok(u32::from_le_bytes(checksum4(writer.as_slice())))
    }

    /// Recompute the checksum and compare with the stored value.
    pub fn verify(&self) -> Result<(), CoreError> {
        if self.compute_checksum()? != self.checksum {
            return Err(CoreError::InvalidNef("checksum mismatch".into()));
        }
        Ok(())
    }
}

impl Serializable for NefFile {
    fn serialize(&self, writer: &mut BinaryWriter) -> Result<(), CoreError> {
        self.serialize_without_checksum(writer)?;
        writer.write_u32(self.checksum);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader<'_>) -> Result<Self, CoreError> {
        let magic = reader.read_u32()?;
        if magic != NEF_MAGIC {
            return Err(CoreError::InvalidNef(format!("bad magic {magic:#010x}")));
        }
        let mut compiler_field = [0u8; COMPILER_FIELD_LEN];
        reader.read_exact(&mut compiler_field)?;
        let end = compiler_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(COMPILER_FIELD_LEN);
        let compiler = String::from_utf8(compiler_field[..end].to_vec())
            .map_err(|_| CoreError::InvalidNef("compiler field is not UTF-8".into()))?;

        let source_len = reader.read_u8()? as usize;
        let source = String::from_utf8(reader.read_bytes(source_len)?)
            .map_err(|_| CoreError::InvalidNef("source field is not UTF-8".into()))?;

        let mut reserved = [0u8; 2];
        reader.read_exact(&mut reserved)?;
        if reserved != [0, 0] {
            return Err(CoreError::InvalidNef("reserved bytes must be zero".into()));
        }

        let token_count = reader.read_u8()? as usize;
        let mut tokens = Vec::with_capacity(token_count);
        for _ in 0..token_count {
            tokens.push(Serializable::deserialize(reader)?);
        }

        if reader.read_u8()? != 0 {
            return Err(CoreError::InvalidNef("reserved byte must be zero".into()));
        }

        let script = reader.read_var_bytes(MAX_NEF_SCRIPT_LEN)?;
        if script.is_empty() {
            return Err(CoreError::InvalidNef("empty script".into()));
        }
        let checksum = reader.read_u32()?;

        let file = Self {
            compiler,
            source,
            tokens,
            script,
            checksum,
        };
        file.verify()?;
        Ok(file)
    }
}

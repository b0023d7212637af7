// Opcode catalog for the chain's stack VM
//
// The SDK emits and walks bytecode; it never executes it. Operand metadata
// is enough to skip over any instruction without understanding it.

use crate::error::CoreError;

/// How many operand bytes follow an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandLen {
    /// No operand.
    None,
    /// A fixed number of operand bytes.
    Fixed(usize),
    /// A little-endian length prefix of the given width, then that many bytes.
    Prefixed(usize),
}

macro_rules! opcodes {
    ( $( $(#[$meta:meta])* $name:ident = $value:literal ),+ $(,)? ) => {
        /// VM instruction set (emitter subset).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $( $(#[$meta])* $name = $value, )+
        }

        impl TryFrom<u8> for OpCode {
            type Error = CoreError;

            fn try_from(byte: u8) -> Result<Self, CoreError> {
                match byte {
                    $( $value => Ok(OpCode::$name), )+
                    other => Err(CoreError::InvalidFormat(format!(
                        "unknown opcode {other:#04x}"
                    ))),
                }
            }
        }
    };
}

opcodes! {
    // Constants
    PushInt8 = 0x00,
    PushInt16 = 0x01,
    PushInt32 = 0x02,
    PushInt64 = 0x03,
    PushInt128 = 0x04,
    PushInt256 = 0x05,
    PushA = 0x0A,
    PushNull = 0x0B,
    /// Push up to 255 bytes with a 1-byte length prefix.
    PushData1 = 0x0C,
    PushData2 = 0x0D,
    PushData4 = 0x0E,
    PushM1 = 0x0F,
    Push0 = 0x10,
    Push1 = 0x11,
    Push2 = 0x12,
    Push3 = 0x13,
    Push4 = 0x14,
    Push5 = 0x15,
    Push6 = 0x16,
    Push7 = 0x17,
    Push8 = 0x18,
    Push9 = 0x19,
    Push10 = 0x1A,
    Push11 = 0x1B,
    Push12 = 0x1C,
    Push13 = 0x1D,
    Push14 = 0x1E,
    Push15 = 0x1F,
    Push16 = 0x20,

    // Flow control
    Nop = 0x21,
    Jmp = 0x22,
    JmpL = 0x23,
    JmpIf = 0x24,
    JmpIfL = 0x25,
    JmpIfNot = 0x26,
    JmpIfNotL = 0x27,
    JmpEq = 0x28,
    JmpEqL = 0x29,
    JmpNe = 0x2A,
    JmpNeL = 0x2B,
    JmpGt = 0x2C,
    JmpGtL = 0x2D,
    JmpGe = 0x2E,
    JmpGeL = 0x2F,
    JmpLt = 0x30,
    JmpLtL = 0x31,
    JmpLe = 0x32,
    JmpLeL = 0x33,
    Call = 0x34,
    CallL = 0x35,
    CallA = 0x36,
    CallT = 0x37,
    Abort = 0x38,
    Assert = 0x39,
    Throw = 0x3A,
    Try = 0x3B,
    TryL = 0x3C,
    EndTry = 0x3D,
    EndTryL = 0x3E,
    EndFinally = 0x3F,
    Ret = 0x40,
    /// Dispatch into the host service table by 4-byte name hash.
    Syscall = 0x41,

    // Stack
    Depth = 0x43,
    Drop = 0x45,
    Nip = 0x46,
    XDrop = 0x48,
    Clear = 0x49,
    Dup = 0x4A,
    Over = 0x4B,
    Pick = 0x4D,
    Tuck = 0x4E,
    Swap = 0x50,
    Rot = 0x51,
    Roll = 0x52,
    Reverse3 = 0x53,
    Reverse4 = 0x54,
    ReverseN = 0x55,

    // Splice
    NewBuffer = 0x88,
    Memcpy = 0x89,
    Cat = 0x8B,
    Substr = 0x8C,
    Left = 0x8D,
    Right = 0x8E,

    // Bitwise logic
    Invert = 0x90,
    And = 0x91,
    Or = 0x92,
    Xor = 0x93,
    Equal = 0x97,
    NotEqual = 0x98,

    // Arithmetic
    Sign = 0x99,
    Abs = 0x9A,
    Negate = 0x9B,
    Inc = 0x9C,
    Dec = 0x9D,
    Add = 0x9E,
    Sub = 0x9F,
    Mul = 0xA0,
    Div = 0xA1,
    Mod = 0xA2,
    Pow = 0xA3,
    Sqrt = 0xA4,
    ModMul = 0xA5,
    ModPow = 0xA6,
    Shl = 0xA8,
    Shr = 0xA9,
    Not = 0xAA,
    BoolAnd = 0xAB,
    BoolOr = 0xAC,
    Nz = 0xB1,
    NumEqual = 0xB3,
    NumNotEqual = 0xB4,
    Lt = 0xB5,
    Le = 0xB6,
    Gt = 0xB7,
    Ge = 0xB8,
    Min = 0xB9,
    Max = 0xBA,
    Within = 0xBB,

    // Compound types
    PackMap = 0xBE,
    PackStruct = 0xBF,
    Pack = 0xC0,
    Unpack = 0xC1,
    NewArray0 = 0xC2,
    NewArray = 0xC3,
    NewArrayT = 0xC4,
    NewStruct0 = 0xC5,
    NewStruct = 0xC6,
    NewMap = 0xC8,
    Size = 0xCA,
    HasKey = 0xCB,
    Keys = 0xCC,
    Values = 0xCD,
    PickItem = 0xCE,
    Append = 0xCF,
    SetItem = 0xD0,
    ReverseItems = 0xD1,
    Remove = 0xD2,
    ClearItems = 0xD3,
    PopItem = 0xD4,

    // Type introspection
    IsNull = 0xD8,
    IsType = 0xD9,
    Convert = 0xDB,
}

impl OpCode {
    /// Operand layout of this instruction.
    pub fn operand_len(self) -> OperandLen {
        use OpCode::*;
        match self {
            PushInt8 => OperandLen::Fixed(1),
            PushInt16 => OperandLen::Fixed(2),
            PushInt32 => OperandLen::Fixed(4),
            PushInt64 => OperandLen::Fixed(8),
            PushInt128 => OperandLen::Fixed(16),
            PushInt256 => OperandLen::Fixed(32),
            PushA => OperandLen::Fixed(4),
            PushData1 => OperandLen::Prefixed(1),
            PushData2 => OperandLen::Prefixed(2),
            PushData4 => OperandLen::Prefixed(4),
            Jmp | JmpIf | JmpIfNot | JmpEq | JmpNe | JmpGt | JmpGe | JmpLt | JmpLe | Call
            | EndTry => OperandLen::Fixed(1),
            JmpL | JmpIfL | JmpIfNotL | JmpEqL | JmpNeL | JmpGtL | JmpGeL | JmpLtL | JmpLeL
            | CallL | EndTryL | Syscall => OperandLen::Fixed(4),
            CallT => OperandLen::Fixed(2),
            Try => OperandLen::Fixed(2),
            TryL => OperandLen::Fixed(8),
            IsType | Convert => OperandLen::Fixed(1),
            NewArrayT => OperandLen::Fixed(1),
            _ => OperandLen::None,
        }
    }

    /// `PUSH0`..`PUSH16` for `0..=16`.
    pub fn for_small_int(value: u8) -> Option<OpCode> {
        if value <= 16 {
            OpCode::try_from(OpCode::Push0 as u8 + value).ok()
        } else {
            None
        }
    }

    /// Inverse of [`for_small_int`](Self::for_small_int), including `PUSHM1`.
    pub fn small_int_value(self) -> Option<i64> {
        let byte = self as u8;
        if self == OpCode::PushM1 {
            Some(-1)
        } else if (OpCode::Push0 as u8..=OpCode::Push16 as u8).contains(&byte) {
            Some((byte - OpCode::Push0 as u8) as i64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants() {
        assert_eq!(OpCode::PushData1 as u8, 0x0C);
        assert_eq!(OpCode::PushM1 as u8, 0x0F);
        assert_eq!(OpCode::Push16 as u8, 0x20);
        assert_eq!(OpCode::Syscall as u8, 0x41);
        assert_eq!(OpCode::Pack as u8, 0xC0);
        assert_eq!(OpCode::NewArray0 as u8, 0xC2);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for byte in [0x00u8, 0x0C, 0x10, 0x20, 0x41, 0x9E, 0xC0, 0xDB] {
            assert_eq!(OpCode::try_from(byte).unwrap() as u8, byte);
        }
        assert!(OpCode::try_from(0xFC).is_err());
    }

    #[test]
    fn test_small_int_mapping() {
        assert_eq!(OpCode::for_small_int(0), Some(OpCode::Push0));
        assert_eq!(OpCode::for_small_int(16), Some(OpCode::Push16));
        assert_eq!(OpCode::for_small_int(17), None);
        assert_eq!(OpCode::Push5.small_int_value(), Some(5));
        assert_eq!(OpCode::PushM1.small_int_value(), Some(-1));
        assert_eq!(OpCode::Nop.small_int_value(), None);
    }

    #[test]
    fn test_operand_metadata() {
        assert_eq!(OpCode::PushData1.operand_len(), OperandLen::Prefixed(1));
        assert_eq!(OpCode::Syscall.operand_len(), OperandLen::Fixed(4));
        assert_eq!(OpCode::Add.operand_len(), OperandLen::None);
    }
}

use crate::constants::{HEADER_DATA_OFFSET, OPTYPE_COUNT, WORD_BYTES};
use crate::value::Value;
use num::traits::ToPrimitive;
use num::FromPrimitive;
use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

/// Operation selectors of the instruction set.
///
/// The numbering is stable and dense from 0; it is part of the binary
/// format. The operand column lists what the assembler expects after the
/// mnemonic, the stream column how many words the instruction occupies.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive, EnumFromStr)]
pub enum OpCode {
    //  Mnemonic     | Operands        | Stream | Effect
    //---------------+-----------------+--------+----------------------------------------------
    NOP,          // |                 | 1      | Does nothing
    HALT,         // |                 | 1      | Stops the machine
    //---------------+-----------------+--------+----------------------------------------------
    // Locals        |                 |        |
    LOAD,         // | [index]         | 1      | Pushes local <index>
    STORE,        // | [index]         | 1      | Pops into local <index>
    LOADCONST,    // | !type literal   | 2      | Pushes the following stream word
    STORECONST,   // | [index] !type n | 2      | Writes the following stream word to local <index>
    //---------------+-----------------+--------+----------------------------------------------
    // Arithmetic    |                 |        |
    CONVERT,      // | @from @to       | 1      | Numeric cast between lanes
    ADD,          // | @type           | 1      | lhs + rhs in the lane of <type>
    SUB,          // | @type           | 1      | lhs - rhs
    MUL,          // | @type           | 1      | lhs * rhs
    DIV,          // | @type           | 1      | lhs / rhs; integer division by zero is fatal
    //---------------+-----------------+--------+----------------------------------------------
    // Logic         |                 |        |
    LAND,         // |                 | 1      | Boolean and on the i8 lane
    LOR,          // |                 | 1      | Boolean or on the i8 lane
    LNOT,         // |                 | 1      | Boolean not on the i8 lane
    //---------------+-----------------+--------+----------------------------------------------
    // Comparisons   |                 |        |
    GT,           // | @type           | 1      | Pushes (lhs > rhs) as 0/1 in i8
    GEQ,          // | @type           | 1      | Pushes (lhs >= rhs)
    LT,           // | @type           | 1      | Pushes (lhs < rhs)
    LEQ,          // | @type           | 1      | Pushes (lhs <= rhs)
    EQ,           // | @type           | 1      | Pushes (lhs == rhs)
    NOTEQ,        // | @type           | 1      | Pushes (lhs != rhs)
    //---------------+-----------------+--------+----------------------------------------------
    // Bitwise       |                 |        |
    BAND,         // |                 | 1      | 64-bit and
    BOR,          // |                 | 1      | 64-bit or
    BXOR,         // |                 | 1      | 64-bit xor
    BNOT,         // |                 | 1      | 64-bit complement
    LSHIFT,       // |                 | 1      | lhs << (rhs mod 64)
    RSHIFT,       // |                 | 1      | lhs >> (rhs mod 64), arithmetic
    //---------------+-----------------+--------+----------------------------------------------
    // Control flow  |                 |        |
    JMP,          // | label           | 1      | Relative jump, displacement in words
    JMPIF,        // | label           | 1      | Pops an i8 flag, jumps when non-zero
    CREATELOCALS, // | [count]         | 1      | Appends <count> zeroed locals to the frame
    CALL,         // | [argc] $"name"  | 1+n    | Calls the named function or built-in
    RET,          // | [n]             | 1      | Returns to the caller (operand unused)
    CALLINDIRECT, // | [argc]          | 1      | Pops a pointer, calls the unit it addresses
    GETGLOBAL,    // | $"name"         | 1+n    | Pushes a pointer to the named unit
}

/// Operand type hints. The numbering is stable; `NONE` means "not
/// applicable" and defaults to i64 semantics in arithmetic. `PTR` has i64
/// width but is never a conversion target.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive, EnumFromStr)]
pub enum DataType {
    NONE,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    PTR,
}

macro_rules! impl_enum_display {
    ($e:ty) => {
        impl std::fmt::Display for $e {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

impl_enum_display!(OpCode);
impl_enum_display!(DataType);

#[inline]
pub fn enum_to_u8<T: ToPrimitive + Copy>(val: T) -> u8 {
    val.to_u8().unwrap()
}

/// The packed record at the head of every instruction.
///
/// Fits in one machine word: byte 0 the opcode, bytes 1..=3 the operand type
/// hints, bytes 4..=7 the signed 32-bit immediate in native order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InstructionHeader {
    pub code: OpCode,
    pub optype: [DataType; OPTYPE_COUNT],
    pub data: i32,
}

impl InstructionHeader {
    pub fn new(code: OpCode) -> InstructionHeader {
        InstructionHeader {
            code,
            optype: [DataType::NONE; OPTYPE_COUNT],
            data: 0,
        }
    }

    pub fn with_type(code: OpCode, optype: DataType) -> InstructionHeader {
        let mut out = InstructionHeader::new(code);
        out.optype[0] = optype;
        out
    }

    pub fn with_types(code: OpCode, first: DataType, second: DataType) -> InstructionHeader {
        let mut out = InstructionHeader::new(code);
        out.optype[0] = first;
        out.optype[1] = second;
        out
    }

    pub fn with_data(code: OpCode, data: i32) -> InstructionHeader {
        let mut out = InstructionHeader::new(code);
        out.data = data;
        out
    }

    pub fn encode(self) -> Value {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[0] = enum_to_u8(self.code);
        for (i, optype) in self.optype.iter().enumerate() {
            bytes[1 + i] = enum_to_u8(*optype);
        }
        bytes[HEADER_DATA_OFFSET..].copy_from_slice(&self.data.to_ne_bytes());
        Value::from_bytes(bytes)
    }

    /// Decodes a stream slot as a header. `None` when the opcode byte is not
    /// a known operation; unknown type hint bytes decay to `NONE`.
    pub fn decode(value: Value) -> Option<InstructionHeader> {
        let bytes = value.bytes();
        let code = OpCode::from_u8(bytes[0])?;

        let mut optype = [DataType::NONE; OPTYPE_COUNT];
        for (i, slot) in optype.iter_mut().enumerate() {
            *slot = DataType::from_u8(bytes[1 + i]).unwrap_or(DataType::NONE);
        }

        let mut immediate = [0u8; 4];
        immediate.copy_from_slice(&bytes[HEADER_DATA_OFFSET..]);

        Some(InstructionHeader {
            code,
            optype,
            data: i32::from_ne_bytes(immediate),
        })
    }
}

pub fn make_instruction(code: OpCode) -> Value {
    InstructionHeader::new(code).encode()
}

pub fn make_typed_instruction(code: OpCode, optype: DataType) -> Value {
    InstructionHeader::with_type(code, optype).encode()
}

pub fn make_convert_instruction(from: DataType, to: DataType) -> Value {
    InstructionHeader::with_types(OpCode::CONVERT, from, to).encode()
}

pub fn make_data_instruction(code: OpCode, data: i32) -> Value {
    InstructionHeader::with_data(code, data).encode()
}

/// Constructs a bare instruction word.
#[macro_export]
macro_rules! instr {
    ($opcode:ident) => {
        make_instruction(OpCode::$opcode)
    };
}

/// Constructs an instruction word with one operand type hint.
#[macro_export]
macro_rules! instr_t {
    ($opcode:ident, $t:ident) => {
        make_typed_instruction(OpCode::$opcode, DataType::$t)
    };
}

/// Constructs an instruction word with a 32-bit immediate.
#[macro_export]
macro_rules! instr_d {
    ($opcode:ident, $data:expr) => {
        make_data_instruction(OpCode::$opcode, $data)
    };
}

/// Constructs a CONVERT instruction word.
#[macro_export]
macro_rules! instr_c {
    ($from:ident, $to:ident) => {
        make_convert_instruction(DataType::$from, DataType::$to)
    };
}

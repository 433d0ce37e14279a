use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use super::builtins::{self, Builtin};
use super::Fault;
use crate::instructions::{DataType, InstructionHeader, OpCode};
use crate::program::DataUnit;
use crate::value::Value;

macro_rules! binary_arith {
    ($self:ident, $t:expr, $wrap:ident, $op:tt) => {{
        let rhs = $self.pop()?;
        let lhs = $self.pop()?;
        let out = match $t {
            DataType::I8 => Value::from(lhs.i8().$wrap(rhs.i8())),
            DataType::I16 => Value::from(lhs.i16().$wrap(rhs.i16())),
            DataType::I32 => Value::from(lhs.i32().$wrap(rhs.i32())),
            DataType::F32 => Value::from(lhs.f32() $op rhs.f32()),
            DataType::F64 => Value::from(lhs.f64() $op rhs.f64()),
            // NONE and PTR share the i64 lane.
            _ => Value::from(lhs.i64().$wrap(rhs.i64())),
        };
        $self.push(out)
    }};
}

macro_rules! compare {
    ($self:ident, $t:expr, $op:tt) => {{
        let rhs = $self.pop()?;
        let lhs = $self.pop()?;
        let flag = match $t {
            DataType::I8 => lhs.i8() $op rhs.i8(),
            DataType::I16 => lhs.i16() $op rhs.i16(),
            DataType::I32 => lhs.i32() $op rhs.i32(),
            DataType::I64 => lhs.i64() $op rhs.i64(),
            DataType::F32 => lhs.f32() $op rhs.f32(),
            DataType::F64 => lhs.f64() $op rhs.f64(),
            // NONE and PTR compare as unsigned words (pointer ordering).
            _ => lhs.ptr() $op rhs.ptr(),
        };
        $self.push(Value::from(flag as i8))
    }};
}

macro_rules! bitwise {
    ($self:ident, $op:tt) => {{
        let rhs = $self.pop()?;
        let lhs = $self.pop()?;
        $self.push(Value::from(lhs.i64() $op rhs.i64()))
    }};
}

pub struct Core {
    image: Vec<Value>,
    unit_map: HashMap<String, usize>,
    stack: Vec<Value>,
    stack_limit: usize,
    value_frame_base: usize,
    value_frame_stack: Vec<usize>,
    locals: Vec<Value>,
    local_frame_base: usize,
    frame_index_stack: Vec<usize>,
    return_stack: Vec<usize>,
    ins_index: usize,
    running: bool,
    builtins: HashMap<&'static str, Builtin>,
    out: Box<dyn Write>,
}

impl Core {
    pub fn new(stack_words: usize, locals_reserve: usize, out: Box<dyn Write>) -> Core {
        Core {
            image: Vec::new(),
            unit_map: HashMap::new(),
            stack: Vec::with_capacity(stack_words),
            stack_limit: stack_words,
            value_frame_base: 0,
            value_frame_stack: Vec::new(),
            locals: Vec::with_capacity(locals_reserve),
            local_frame_base: 0,
            frame_index_stack: Vec::new(),
            return_stack: Vec::new(),
            ins_index: 0,
            running: false,
            builtins: builtins::table(),
            out,
        }
    }

    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.out = out;
    }

    pub fn load_units(&mut self, units: Vec<DataUnit>) {
        let additional: usize = units.iter().map(|unit| unit.data.len()).sum();
        self.image.reserve(additional);

        for unit in units {
            let start = self.image.len();
            self.image.extend(unit.data);
            self.unit_map.insert(unit.name, start);
        }
    }

    pub fn run(&mut self, entry: &str) -> Result<(), Fault> {
        let start = *self
            .unit_map
            .get(entry)
            .ok_or_else(|| Fault::UnknownEntry(entry.to_owned()))?;

        self.ins_index = start;
        self.running = true;

        while self.running && self.ins_index < self.image.len() {
            let slot = self.image[self.ins_index];
            self.ins_index += 1;
            self.execute(slot)?;
        }

        Ok(())
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack[..]
    }

    fn execute(&mut self, slot: Value) -> Result<(), Fault> {
        let header =
            InstructionHeader::decode(slot).ok_or_else(|| Fault::UnknownOpcode(slot.bytes()[0]))?;

        match header.code {
            OpCode::NOP => Ok(()),

            OpCode::HALT => {
                self.running = false;
                Ok(())
            }

            OpCode::LOAD => {
                let value = *self.local_slot(header.data)?;
                self.push(value)
            }

            OpCode::STORE => {
                let value = self.pop()?;
                *self.local_slot(header.data)? = value;
                Ok(())
            }

            OpCode::LOADCONST => {
                let value = self.fetch()?;
                self.push(value)
            }

            OpCode::STORECONST => {
                let value = self.fetch()?;
                *self.local_slot(header.data)? = value;
                Ok(())
            }

            OpCode::CONVERT => self.convert(header.optype[0], header.optype[1]),

            OpCode::ADD => binary_arith!(self, header.optype[0], wrapping_add, +),
            OpCode::SUB => binary_arith!(self, header.optype[0], wrapping_sub, -),
            OpCode::MUL => binary_arith!(self, header.optype[0], wrapping_mul, *),
            OpCode::DIV => self.divide(header.optype[0]),

            OpCode::LAND => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(Value::from((lhs.i8() != 0 && rhs.i8() != 0) as i8))
            }

            OpCode::LOR => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(Value::from((lhs.i8() != 0 || rhs.i8() != 0) as i8))
            }

            OpCode::LNOT => {
                let value = self.pop()?;
                self.push(Value::from((value.i8() == 0) as i8))
            }

            OpCode::GT => compare!(self, header.optype[0], >),
            OpCode::GEQ => compare!(self, header.optype[0], >=),
            OpCode::LT => compare!(self, header.optype[0], <),
            OpCode::LEQ => compare!(self, header.optype[0], <=),
            OpCode::EQ => compare!(self, header.optype[0], ==),
            OpCode::NOTEQ => compare!(self, header.optype[0], !=),

            OpCode::BAND => bitwise!(self, &),
            OpCode::BOR => bitwise!(self, |),
            OpCode::BXOR => bitwise!(self, ^),

            OpCode::BNOT => {
                let value = self.pop()?;
                self.push(Value::from(!value.i64()))
            }

            OpCode::LSHIFT => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(Value::from(lhs.i64() << rhs.i64().rem_euclid(64)))
            }

            OpCode::RSHIFT => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(Value::from(lhs.i64() >> rhs.i64().rem_euclid(64)))
            }

            OpCode::JMP => {
                self.jump(header.data);
                Ok(())
            }

            OpCode::JMPIF => {
                let flag = self.pop()?;
                if flag.i8() != 0 {
                    self.jump(header.data);
                }
                Ok(())
            }

            OpCode::CREATELOCALS => {
                let count = header.data.max(0) as usize;
                self.locals.resize(self.locals.len() + count, Value::default());
                Ok(())
            }

            OpCode::CALL => {
                let name = self.read_inline_str()?;
                self.call_named(&name, header.data)
            }

            OpCode::RET => self.function_return(),

            OpCode::CALLINDIRECT => {
                let target = self.pop()?;
                self.enter_frame(target.ptr() as usize, header.data)
            }

            OpCode::GETGLOBAL => {
                let name = self.read_inline_str()?;
                let start = *self
                    .unit_map
                    .get(&name)
                    .ok_or(Fault::UnknownGlobal(name))?;
                self.push(Value::from_ptr(start as u64))
            }
        }
    }

    fn fetch(&mut self) -> Result<Value, Fault> {
        let slot = self
            .image
            .get(self.ins_index)
            .copied()
            .ok_or(Fault::TruncatedStream)?;
        self.ins_index += 1;
        Ok(slot)
    }

    pub fn pop(&mut self) -> Result<Value, Fault> {
        if self.stack.len() <= self.value_frame_base {
            return Err(Fault::FrameViolation);
        }
        Ok(self.stack.pop().unwrap())
    }

    fn push(&mut self, value: Value) -> Result<(), Fault> {
        if self.stack.len() >= self.stack_limit {
            return Err(Fault::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    fn local_slot(&mut self, index: i32) -> Result<&mut Value, Fault> {
        if index < 0 {
            return Err(Fault::BadLocalIndex(index));
        }
        let at = self.local_frame_base + index as usize;
        if at >= self.locals.len() {
            return Err(Fault::BadLocalIndex(index));
        }
        Ok(&mut self.locals[at])
    }

    fn jump(&mut self, offset: i32) {
        // The header word has already been consumed, hence the -1.
        self.ins_index = (self.ins_index as i64 + i64::from(offset) - 1) as usize;
    }

    /// Reads an inline-packed name starting at the current stream position
    /// and advances past its `len / 8 + 1` slots.
    fn read_inline_str(&mut self) -> Result<String, Fault> {
        let mut bytes = Vec::new();

        loop {
            let chunk = self.fetch()?.bytes();
            match chunk.iter().position(|&b| b == 0) {
                Some(end) => {
                    bytes.extend_from_slice(&chunk[..end]);
                    break;
                }
                None => bytes.extend_from_slice(&chunk),
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn call_named(&mut self, name: &str, argc: i32) -> Result<(), Fault> {
        // Built-ins execute in the caller's value frame: they pop their
        // operands directly off the operand stack and no callee frame is
        // created, so the call completes in place.
        if let Some(builtin) = self.builtins.get(name).copied() {
            return builtin(self, argc);
        }

        let target = *self
            .unit_map
            .get(name)
            .ok_or_else(|| Fault::UnknownFunction(name.to_owned()))?;
        self.enter_frame(target, argc)
    }

    fn enter_frame(&mut self, target: usize, argc: i32) -> Result<(), Fault> {
        self.return_stack.push(self.ins_index);
        self.frame_index_stack.push(self.local_frame_base);
        self.local_frame_base = self.locals.len();

        // Arguments land in locals 0..argc in pop order.
        for _ in 0..argc {
            let value = self.pop()?;
            self.locals.push(value);
        }

        self.value_frame_stack.push(self.value_frame_base);
        self.value_frame_base = self.stack.len();

        self.ins_index = target;
        Ok(())
    }

    fn function_return(&mut self) -> Result<(), Fault> {
        let return_index = match self.return_stack.pop() {
            Some(index) => index,
            None => {
                self.running = false;
                return Ok(());
            }
        };

        // The callee's frame base equals the pre-call locals length, so
        // truncating to it restores the caller's locals view.
        self.locals.truncate(self.local_frame_base);
        self.local_frame_base = self.frame_index_stack.pop().unwrap_or(0);
        self.value_frame_base = self.value_frame_stack.pop().unwrap_or(0);
        self.ins_index = return_index;
        Ok(())
    }

    fn divide(&mut self, optype: DataType) -> Result<(), Fault> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;

        let out = match optype {
            DataType::I8 => Value::from(Self::int_div(lhs.i8() as i64, rhs.i8() as i64)? as i8),
            DataType::I16 => Value::from(Self::int_div(lhs.i16() as i64, rhs.i16() as i64)? as i16),
            DataType::I32 => Value::from(Self::int_div(lhs.i32() as i64, rhs.i32() as i64)? as i32),
            DataType::F32 => Value::from(lhs.f32() / rhs.f32()),
            DataType::F64 => Value::from(lhs.f64() / rhs.f64()),
            _ => Value::from(Self::int_div(lhs.i64(), rhs.i64())?),
        };
        self.push(out)
    }

    fn int_div(lhs: i64, rhs: i64) -> Result<i64, Fault> {
        if rhs == 0 {
            return Err(Fault::DivisionByZero);
        }
        Ok(lhs.wrapping_div(rhs))
    }

    fn convert(&mut self, from: DataType, to: DataType) -> Result<(), Fault> {
        // A no-op conversion leaves the stack untouched; the operand is not
        // popped. PTR is never a conversion target.
        if from == to || to == DataType::PTR {
            return Ok(());
        }

        let value = self.pop()?;
        let out = match from {
            DataType::I8 => Self::cast_int(value.i8() as i64, to),
            DataType::I16 => Self::cast_int(value.i16() as i64, to),
            DataType::I32 => Self::cast_int(value.i32() as i64, to),
            DataType::F32 => Self::cast_float(value.f32() as f64, to),
            DataType::F64 => Self::cast_float(value.f64(), to),
            // NONE and PTR sources read the i64 lane.
            _ => Self::cast_int(value.i64(), to),
        };
        self.push(out)
    }

    fn cast_int(wide: i64, to: DataType) -> Value {
        match to {
            DataType::I8 => Value::from(wide as i8),
            DataType::I16 => Value::from(wide as i16),
            DataType::I32 => Value::from(wide as i32),
            DataType::F32 => Value::from(wide as f32),
            DataType::F64 => Value::from(wide as f64),
            _ => Value::from(wide),
        }
    }

    fn cast_float(wide: f64, to: DataType) -> Value {
        match to {
            DataType::I8 => Value::from(wide as i8),
            DataType::I16 => Value::from(wide as i16),
            DataType::I32 => Value::from(wide as i32),
            DataType::I64 => Value::from(wide as i64),
            DataType::F32 => Value::from(wide as f32),
            _ => Value::from(wide),
        }
    }

    /// Collects the NUL-terminated byte run starting at the given word index
    /// of the program image.
    pub fn image_str(&self, start: usize) -> String {
        let mut bytes = Vec::new();

        'words: for slot in self.image.iter().skip(start) {
            for &byte in slot.bytes().iter() {
                if byte == 0 {
                    break 'words;
                }
                bytes.push(byte);
            }
        }

        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn print<T: fmt::Display>(&mut self, value: T) {
        let _ = write!(self.out, "{}", value);
    }
}

use crate::constants::WORD_BYTES;
use crate::Word;
use std::fmt;

/// A single machine word reinterpretable as any of the supported lanes.
///
/// There is no runtime type tag; the opcode that consumes a value supplies
/// the interpretation. Constructors zero the whole slot before setting their
/// lane, so narrow lanes are zero-extended in the stored word.
#[derive(Clone, Copy)]
pub union Value {
    i8: i8,
    i16: i16,
    i32: i32,
    i64: i64,
    f32: f32,
    f64: f64,
    ptr: u64,
    raw: Word,
    bytes: [u8; WORD_BYTES],
}

impl Value {
    pub fn from_raw(raw: Word) -> Value {
        Value { raw }
    }

    /// A pointer value. The pointer lane holds a word index into the loaded
    /// program image.
    pub fn from_ptr(index: u64) -> Value {
        Value { ptr: index }
    }

    pub fn from_bytes(bytes: [u8; WORD_BYTES]) -> Value {
        Value { bytes }
    }

    pub fn i8(self) -> i8 {
        unsafe { self.i8 }
    }

    pub fn i16(self) -> i16 {
        unsafe { self.i16 }
    }

    pub fn i32(self) -> i32 {
        unsafe { self.i32 }
    }

    pub fn i64(self) -> i64 {
        unsafe { self.i64 }
    }

    pub fn f32(self) -> f32 {
        unsafe { self.f32 }
    }

    pub fn f64(self) -> f64 {
        unsafe { self.f64 }
    }

    pub fn ptr(self) -> u64 {
        unsafe { self.ptr }
    }

    pub fn raw(self) -> Word {
        unsafe { self.raw }
    }

    pub fn bytes(self) -> [u8; WORD_BYTES] {
        unsafe { self.bytes }
    }

    /// Packs a string into a run of words, 8 bytes per slot. The run always
    /// occupies `len / 8 + 1` slots, so a terminating 0 byte exists in the
    /// final slot even when the length is a multiple of the word size.
    pub fn pack_str(text: &str) -> Vec<Value> {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len() / WORD_BYTES + 1);

        for chunk in bytes.chunks(WORD_BYTES) {
            let mut slot = [0u8; WORD_BYTES];
            slot[..chunk.len()].copy_from_slice(chunk);
            out.push(Value::from_bytes(slot));
        }

        if bytes.len() % WORD_BYTES == 0 {
            out.push(Value::default());
        }

        out
    }
}

macro_rules! impl_value_from {
    ($T:ty, $lane:ident) => {
        impl From<$T> for Value {
            fn from(value: $T) -> Value {
                let mut out = Value::default();
                out.$lane = value;
                out
            }
        }
    };
}

impl_value_from!(i8, i8);
impl_value_from!(i16, i16);
impl_value_from!(i32, i32);
impl_value_from!(i64, i64);
impl_value_from!(f32, f32);
impl_value_from!(f64, f64);

impl Default for Value {
    fn default() -> Value {
        Value { raw: 0 }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.raw() == other.raw()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Value({:#018x})", self.raw())
    }
}

mod builtins;
mod core;

use std::error::Error as StdError;
use std::fmt;
use std::io::Write;

use crate::constants;
use crate::program::DataUnit;
use crate::value::Value;

use self::core::Core;

/// Fatal runtime conditions. Execution stops at the first fault; there is no
/// recovery path visible to bytecode.
#[derive(Clone, Debug, PartialEq)]
pub enum Fault {
    UnknownOpcode(u8),
    StackOverflow,
    FrameViolation,
    DivisionByZero,
    BadLocalIndex(i32),
    TruncatedStream,
    UnknownFunction(String),
    UnknownGlobal(String),
    UnknownEntry(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fault::UnknownOpcode(code) => write!(f, "Unknown instruction: {:#04x}.", code),
            Fault::StackOverflow => f.write_str("Stack overflow error."),
            Fault::FrameViolation => {
                f.write_str("Value stack operation fell outside of function frame.")
            }
            Fault::DivisionByZero => f.write_str("Integer division by zero."),
            Fault::BadLocalIndex(index) => {
                write!(f, "Local index {} is outside of the current frame.", index)
            }
            Fault::TruncatedStream => f.write_str("Instruction stream ended unexpectedly."),
            Fault::UnknownFunction(name) => write!(f, "Unknown function: \"{}\".", name),
            Fault::UnknownGlobal(name) => write!(f, "Unknown global: \"{}\".", name),
            Fault::UnknownEntry(name) => {
                write!(f, "Unable to find entry function: \"{}\".", name)
            }
        }
    }
}

impl StdError for Fault {}

/// The virtual machine. Owns the loaded program image, the operand stack and
/// the locals vector; strictly single threaded.
pub struct Machine {
    core: Core,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::with_limits(
            constants::DEFAULT_STACK_WORDS,
            constants::DEFAULT_LOCALS_RESERVE,
        )
    }

    /// A machine with an operand stack capacity of `stack_words` words and
    /// `locals_reserve` pre-allocated local slots.
    pub fn with_limits(stack_words: usize, locals_reserve: usize) -> Machine {
        Machine {
            core: Core::new(stack_words, locals_reserve, Box::new(std::io::stdout())),
        }
    }

    /// Redirects built-in output, primarily for capturing it in tests.
    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.core.set_output(out);
    }

    /// Appends the units to the program image and records their start
    /// offsets. Later units win on name collisions. May be called repeatedly
    /// before `run`.
    pub fn load_units(&mut self, units: Vec<DataUnit>) {
        self.core.load_units(units);
    }

    /// Transfers control to the named entry unit and executes until the
    /// machine halts, returns past the outermost frame, walks off the end of
    /// the image, or faults.
    pub fn run(&mut self, entry: &str) -> Result<(), Fault> {
        self.core.run(entry)
    }

    pub fn stack(&self) -> &[Value] {
        self.core.stack()
    }

    pub fn stack_top(&self) -> Option<Value> {
        self.core.stack().last().copied()
    }
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new()
    }
}

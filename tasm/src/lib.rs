//! Assembler for the [tvm](../tvm/index.html) virtual machine.
//!
//! The main function provided by this crate is [`assemble`](fn.assemble.html),
//! which accepts source text written in the TVM assembly language and outputs
//! the assembled named units, ready to be loaded into a
//! [`Machine`](../tvm/struct.Machine.html) or serialized with the
//! [tmodfile](../tmodfile/index.html) crate.
//!
//! Parsing is implemented using [pest]; the [`Error`](type.Error.html) type
//! is an alias of `pest::error::Error`, so assembler diagnostics carry spans
//! and support pest's pretty formatting.
//!
//! # Assembly language
//!
//! A module is a sequence of `function` and `global` blocks:
//!
//! ```text
//! function main {
//!     loadconst !i64 5
//!     call [1] $"fact"
//!     halt
//! }
//!
//! global greeting {
//!     $"hello"
//! }
//! ```
//!
//! A `function` body holds instructions and `label NAME` markers. Jumps name
//! a label of the same function and are encoded as signed word displacements
//! once the body closes. A `global` body holds raw data words: string
//! literals (packed 8 bytes per word, NUL terminated) and typed literals.
//!
//! Operand syntax:
//!
//! Form       | Meaning
//! -----------|--------------------------------------------------------------
//! `@type`    | operand type hint; one of i8, i16, i32, i64, f32, f64, ptr
//! `!type n`  | typed literal; integers auto-detect base (`0x` hex, leading `0` octal), floats use decimal notation
//! `[n]`      | embedded 32-bit operand (local index, argument count, ...)
//! `$"text"`  | string literal, no escape sequences
//!
//! Integer literals out of range for their stated width are rejected.
//!
//! [pest]: https://docs.rs/pest/

mod numbers;
mod parser;
mod units;


use parser::{AsmParser, Rule};
use pest::iterators::Pair;
use pest::{Parser, Span};
use tvm::DataUnit;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// Assembles source text into a list of named units.
pub fn assemble(input: &str) -> Result<Vec<DataUnit>> {
    units::process_module(parse(input)?)
}

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(AsmParser::parse(Rule::program, input)?.next().unwrap())
}

//! The TVM module container format.
//!
//! A module is the concatenation of unit encodings with no outer header.
//! Each unit is encoded as the ASCII decimal length of its name, a `0xFF`
//! separator, the name bytes, the ASCII decimal byte length of its word
//! payload, a `0xFF` separator, and the payload words as raw bytes in host
//! order. The format is not portable across endiannesses.

use byteorder::ByteOrder;
use std::error::Error as StdError;
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tvm::constants::WORD_BYTES;
use tvm::{DataUnit, Value};
use util::Endian;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    UnexpectedEnd,
    BadLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::UnexpectedEnd => f.write_str("Unexpected end of module data."),
            Error::BadLength => f.write_str("Malformed length prefix."),
        }
    }
}

impl StdError for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

pub fn write<W: Write>(writer: &mut W, units: &[DataUnit]) -> std::io::Result<()> {
    for unit in units {
        write_unit(writer, unit)?;
    }
    Ok(())
}

fn write_unit<W: Write>(writer: &mut W, unit: &DataUnit) -> std::io::Result<()> {
    writer.write_all(unit.name.len().to_string().as_bytes())?;
    writer.write_all(&[0xFF])?;
    writer.write_all(unit.name.as_bytes())?;

    writer.write_all((unit.data.len() * WORD_BYTES).to_string().as_bytes())?;
    writer.write_all(&[0xFF])?;

    let mut slot = [0u8; WORD_BYTES];
    for value in &unit.data {
        Endian::write_u64(&mut slot, value.raw());
        writer.write_all(&slot)?;
    }

    Ok(())
}

pub fn to_bytes(units: &[DataUnit]) -> Vec<u8> {
    let mut out = Vec::new();
    write(&mut out, units).unwrap();
    out
}

pub fn read<R: Read>(reader: &mut R) -> Result<Vec<DataUnit>, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_bytes(&bytes)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Vec<DataUnit>, Error> {
    let mut index = 0;
    let mut out = Vec::new();

    while index < bytes.len() {
        let name_length = read_length(bytes, &mut index)?;
        let name = String::from_utf8_lossy(take(bytes, &mut index, name_length)?).into_owned();

        let payload_length = read_length(bytes, &mut index)?;
        let payload = take(bytes, &mut index, payload_length)?;

        let mut data = Vec::with_capacity(payload_length / WORD_BYTES);
        for chunk in payload.chunks(WORD_BYTES) {
            let mut slot = [0u8; WORD_BYTES];
            slot[..chunk.len()].copy_from_slice(chunk);
            data.push(Value::from_bytes(slot));
        }

        out.push(DataUnit::new(name, data));
    }

    Ok(out)
}

fn read_length(bytes: &[u8], index: &mut usize) -> Result<usize, Error> {
    let start = *index;
    loop {
        let byte = *bytes.get(*index).ok_or(Error::UnexpectedEnd)?;
        *index += 1;
        if byte == 0xFF {
            break;
        }
    }

    let digits = &bytes[start..*index - 1];
    let text = std::str::from_utf8(digits).map_err(|_| Error::BadLength)?;
    text.parse().map_err(|_| Error::BadLength)
}

fn take<'b>(bytes: &'b [u8], index: &mut usize, length: usize) -> Result<&'b [u8], Error> {
    let end = index.checked_add(length).ok_or(Error::BadLength)?;
    if end > bytes.len() {
        return Err(Error::UnexpectedEnd);
    }
    let out = &bytes[*index..end];
    *index = end;
    Ok(out)
}

pub trait ReadModExt: Read + Sized {
    fn read_mod(&mut self) -> Result<Vec<DataUnit>, Error> {
        read(self)
    }
}

impl<R: Read + Sized> ReadModExt for R {}

pub trait WriteModExt: Write + Sized {
    fn write_mod(&mut self, units: &[DataUnit]) -> std::io::Result<()> {
        write(self, units)
    }
}

impl<W: Write + Sized> WriteModExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<DataUnit>, Error> {
    BufReader::new(File::open(path)?).read_mod()
}

pub fn write_file<P: AsRef<Path>>(path: P, units: &[DataUnit]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_mod(units)?;
    writer.flush()
}

//! Front end glue for the TVM toolchain: loads module files or assembles
//! source on the fly, configures a [`Machine`](../tvm/struct.Machine.html)
//! and transfers control to the entry function.

use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tvm::constants;
use tvm::Machine;

#[derive(Debug)]
pub enum Error {
    Asm(tasm::Error),
    Mod(tmodfile::Error),
    Exec(tvm::Fault),
    Io(std::io::Error, PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Asm(err) => {
                writeln!(f, "Assembling input failed:")?;
                write!(f, "{}", err)
            }
            Error::Mod(err) => write!(f, "Reading module failed: {}", err),
            Error::Exec(fault) => write!(f, "{}", fault),
            Error::Io(err, path) => {
                write!(f, "Accessing file \"{}\" failed: {}", path.display(), err)
            }
        }
    }
}

/// Machine and entry configuration shared by all run modes.
pub struct Options {
    pub stack_words: usize,
    pub locals_reserve: usize,
    pub entry: String,
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            stack_words: constants::DEFAULT_STACK_WORDS,
            locals_reserve: constants::DEFAULT_LOCALS_RESERVE,
            entry: "main".to_owned(),
            verbose: false,
        }
    }
}

/// Deserializes the given module files into one machine and runs it.
pub fn run_modules(paths: &[&str], options: &Options) -> Result<Machine, Error> {
    let mut machine = Machine::with_limits(options.stack_words, options.locals_reserve);

    for path in paths {
        if options.verbose {
            eprintln!("Deserializing module \"{}\".", path);
        }
        let units = tmodfile::read_file(path).map_err(|err| match err {
            tmodfile::Error::Io(io_err) => Error::Io(io_err, PathBuf::from(path)),
            other => Error::Mod(other),
        })?;
        machine.load_units(units);
    }

    run_machine(machine, options)
}

/// Assembles the given source files in memory and runs them in one machine.
pub fn run_sources(paths: &[&str], options: &Options) -> Result<Machine, Error> {
    let mut machine = Machine::with_limits(options.stack_words, options.locals_reserve);

    for path in paths {
        if options.verbose {
            eprintln!("Assembling \"{}\".", path);
        }
        let source = read_source(path)?;
        let units = tasm::assemble(&source).map_err(|err| Error::Asm(err.with_path(path)))?;
        machine.load_units(units);
    }

    run_machine(machine, options)
}

/// Assembles one source file to a module file; returns the written path.
pub fn assemble_file(input: &str, output: Option<&str>) -> Result<PathBuf, Error> {
    let source = read_source(input)?;
    let units = tasm::assemble(&source).map_err(|err| Error::Asm(err.with_path(input)))?;

    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(input).with_extension("tmod"));

    tmodfile::write_file(&output_path, &units)
        .map_err(|err| Error::Io(err, output_path.clone()))?;

    Ok(output_path)
}

fn read_source(path: &str) -> Result<String, Error> {
    let file = File::open(path).map_err(|err| Error::Io(err, PathBuf::from(path)))?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, PathBuf::from(path)))?;
    Ok(source)
}

fn run_machine(mut machine: Machine, options: &Options) -> Result<Machine, Error> {
    if options.verbose {
        eprintln!("Running entry function \"{}\".", options.entry);
    }

    machine.run(&options.entry).map_err(Error::Exec)?;

    if options.verbose {
        match machine.stack_top() {
            Some(top) => eprintln!("Top of stack after halt: {:#018x}.", top.raw()),
            None => eprintln!("Value stack is empty after halt."),
        }
    }

    Ok(machine)
}

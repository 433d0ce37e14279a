#[macro_use]
extern crate clap;

use clap::Arg;
use tvm::constants::WORD_BYTES;

#[derive(Debug)]
enum Error {
    Tvx(tvx::Error),
    Clap(clap::Error),
    Usage(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tvx(err) => write!(f, "{}", err),
            Error::Clap(err) => write!(f, "{}", err),
            Error::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the module or assembly files to use")
                .required(true)
                .multiple(true),
        )
        .arg(
            Arg::with_name("run_source")
                .short("r")
                .long("run-source")
                .help("Treats the inputs as assembly source and runs them directly"),
        )
        .arg(
            Arg::with_name("compile")
                .short("c")
                .long("compile")
                .conflicts_with("run_source")
                .help("Assembles the inputs to module files without running"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the output file for --compile with a single input"),
        )
        .arg(
            Arg::with_name("stack")
                .long("stack")
                .takes_value(true)
                .value_name("MEGABYTES")
                .default_value("1")
                .help("Sets the operand stack size in megabytes"),
        )
        .arg(
            Arg::with_name("locals")
                .long("locals")
                .takes_value(true)
                .value_name("THOUSANDS")
                .default_value("8")
                .help("Sets the number of pre-allocated locals in thousands"),
        )
        .arg(
            Arg::with_name("entry")
                .short("e")
                .long("entry")
                .takes_value(true)
                .value_name("NAME")
                .default_value("main")
                .help("Sets the entry function name"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enables verbose logging"),
        )
        .get_matches();

    if let Err(err) = tvx_main(&matches) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn tvx_main(matches: &clap::ArgMatches) -> Result<(), Error> {
    let inputs: Vec<&str> = matches.values_of("INPUT").unwrap().collect();

    let stack_mb = value_t!(matches.value_of("stack"), usize).map_err(Error::Clap)?;
    let locals_thousands = value_t!(matches.value_of("locals"), usize).map_err(Error::Clap)?;

    let options = tvx::Options {
        stack_words: stack_mb * (1 << 20) / WORD_BYTES,
        locals_reserve: locals_thousands * 1024,
        entry: matches.value_of("entry").unwrap().to_owned(),
        verbose: matches.is_present("verbose"),
    };

    if matches.is_present("compile") {
        let output = matches.value_of("output");
        if output.is_some() && inputs.len() > 1 {
            return Err(Error::Usage(
                "--output can only be combined with a single input file.",
            ));
        }
        for input in &inputs {
            let written = tvx::assemble_file(input, output).map_err(Error::Tvx)?;
            if options.verbose {
                eprintln!("Wrote module \"{}\".", written.display());
            }
        }
        return Ok(());
    }

    if matches.is_present("run_source") {
        tvx::run_sources(&inputs, &options).map_err(Error::Tvx)?;
    } else {
        tvx::run_modules(&inputs, &options).map_err(Error::Tvx)?;
    }

    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use slog::{error, info, o, Drain, Level, LevelFilter, Logger};
use slog_term::{FullFormat, TermDecorator};

use hack_toolchain::assembler::{assemble_with_logger, Options, SymbolPolicy};

enum Error {
    Assembly(PathBuf, hack_toolchain::Error),
    NoSources(PathBuf),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("hackasm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assembles Hack assembly into the textual Hack binary format")
        .arg(Arg::with_name("source")
             .help("An .asm file or a directory containing .asm files")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("output")
             .help("Where to write the binary when assembling a single file")
             .short("o")
             .long("output")
             .value_name("FILE")
             .takes_value(true))
        .arg(Arg::with_name("strict")
             .help("Reject symbols that are neither predefined nor declared as labels")
             .long("strict"))
        .arg(Arg::with_name("verbose")
             .help("Log more, can be repeated")
             .short("v")
             .multiple(true))
        .get_matches()
}

fn build_logger(verbosity: u64) -> Logger {
    let level = match verbosity {
        0 => Level::Warning,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };

    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn discover(source: &Path) -> Result<Vec<PathBuf>, Error> {
    if !source.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }

    let mut files = fs::read_dir(source)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;

    files.retain(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "asm"));
    files.sort();

    if files.is_empty() {
        return Err(Error::NoSources(source.to_path_buf()));
    }

    Ok(files)
}

fn run(args: &ArgMatches, logger: &Logger) -> Result<(), Error> {
    let source = Path::new(args.value_of("source").unwrap_or("."));
    let files = discover(source)?;

    let options = Options {
        symbol_policy: if args.is_present("strict") {
            SymbolPolicy::Strict
        } else {
            SymbolPolicy::Allocate
        },
    };

    for file in &files {
        let file_log = logger.new(o!("path" => file.display().to_string()));

        let asm = fs::read_to_string(file)?;
        let program = assemble_with_logger(&asm, options, file_log.clone())
            .map_err(|err| Error::Assembly(file.clone(), err))?;

        let output = match args.value_of("output") {
            Some(output) if files.len() == 1 => PathBuf::from(output),
            _ => file.with_extension("hack"),
        };

        fs::write(&output, program.to_text())?;

        info!(file_log, "wrote binary"; "output" => %output.display(), "instructions" => program.len());
    }

    Ok(())
}

fn main() {
    let args = parse_arguments();
    let logger = build_logger(args.occurrences_of("verbose"));

    let code = match run(&args, &logger) {
        Ok(()) => 0,
        Err(Error::Assembly(path, err)) => {
            error!(logger, "assembly failed"; "path" => %path.display(), "error" => %err);
            eprintln!("error: {}: {}", path.display(), err);
            1
        }
        Err(Error::NoSources(dir)) => {
            eprintln!("error: no .asm files in {}", dir.display());
            1
        }
        Err(Error::IO(err)) => {
            eprintln!("IO error: {}", err);
            1
        }
    };

    // Flushes the asynchronous drain before exiting.
    drop(logger);
    std::process::exit(code);
}

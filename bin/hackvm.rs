use std::fs;
use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use slog::{error, info, o, Drain, Level, LevelFilter, Logger};
use slog_term::{FullFormat, TermDecorator};

use hack_toolchain::translator::{translate_with_logger, Options};

enum Error {
    Translation(hack_toolchain::Error),
    NoSources(PathBuf),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<hack_toolchain::Error> for Error {
    fn from(e: hack_toolchain::Error) -> Error {
        Error::Translation(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("hackvm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translates Hack VM code into Hack assembly")
        .arg(Arg::with_name("source")
             .help("A .vm file or a directory containing .vm files")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("output")
             .help("Where to write the assembly, defaults to X.asm or Dir/Dir.asm")
             .short("o")
             .long("output")
             .value_name("FILE")
             .takes_value(true))
        .arg(Arg::with_name("no-bootstrap")
             .help("Do not emit the code that sets up the stack and calls Sys.init")
             .long("no-bootstrap"))
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

/// The `.vm` files to translate and the default output path.
fn discover(source: &Path) -> Result<(Vec<PathBuf>, PathBuf), Error> {
    if !source.is_dir() {
        return Ok((vec![source.to_path_buf()], source.with_extension("asm")));
    }

    let mut files = fs::read_dir(source)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;

    files.retain(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "vm"));
    files.sort();

    if files.is_empty() {
        return Err(Error::NoSources(source.to_path_buf()));
    }

    let mut name = source.canonicalize()?
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "out".into());

    name.push(".asm");

    let output = source.join(name);

    Ok((files, output))
}

fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn run(args: &ArgMatches, logger: &Logger) -> Result<PathBuf, Error> {
    let source = Path::new(args.value_of("source").unwrap_or("."));
    let (files, default_output) = discover(source)?;

    let mut units = Vec::with_capacity(files.len());

    for file in &files {
        info!(logger, "reading unit"; "path" => %file.display());
        units.push((unit_name(file), fs::read_to_string(file)?));
    }

    let options = Options {
        bootstrap: !args.is_present("no-bootstrap"),
    };

    let asm = translate_with_logger(
        units.iter().map(|(name, source)| (name.as_str(), source.as_str())),
        options,
        logger.clone(),
    )?;

    let output = args.value_of("output").map(PathBuf::from).unwrap_or(default_output);
    fs::write(&output, asm)?;

    Ok(output)
}

fn main() {
    let args = parse_arguments();
    let logger = build_logger(args.occurrences_of("verbose"));

    let code = match run(&args, &logger) {
        Ok(output) => {
            info!(logger, "wrote assembly"; "path" => %output.display());
            0
        }
        Err(Error::Translation(err)) => {
            error!(logger, "translation failed"; "error" => %err);
            eprintln!("error: {}", err);
            1
        }
        Err(Error::NoSources(dir)) => {
            eprintln!("error: no .vm files in {}", dir.display());
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

use std::fmt::{self, Display};

use itertools::Itertools;
use nom::error::ErrorKind as NomErrorKind;

/// The compute instruction field a mnemonic was looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Dest,
    Comp,
    Jump,
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Dest => write!(f, "destination"),
            Field::Comp => write!(f, "computation"),
            Field::Jump => write!(f, "jump"),
        }
    }
}

/// The reason a translation was aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A dest, comp or jump mnemonic that is not part of the instruction set.
    UnknownMnemonic {
        field: Field,
        mnemonic: String,
        /// The closest known mnemonic, if any is close enough to be a likely typo.
        suggestion: Option<&'static str>,
    },

    /// A symbol was declared twice, or a label reuses a predefined name.
    DuplicateSymbol { name: String },

    /// A symbol was referenced but never declared and could not be allocated.
    UnknownSymbol { name: String },

    /// A line that does not have the shape of any known command.
    MalformedCommand { reason: String },

    /// An address that does not fit into the 15 bits of an address instruction.
    AddressOutOfRange { value: u32 },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::UnknownMnemonic { field, mnemonic, suggestion: Some(s) } =>
                write!(f, "unknown {} mnemonic '{}', did you mean '{}'?", field, mnemonic, s),
            ErrorKind::UnknownMnemonic { field, mnemonic, suggestion: None } =>
                write!(f, "unknown {} mnemonic '{}'", field, mnemonic),
            ErrorKind::DuplicateSymbol { name } => write!(f, "symbol '{}' is already defined", name),
            ErrorKind::UnknownSymbol { name } => write!(f, "undefined symbol '{}'", name),
            ErrorKind::MalformedCommand { reason } => write!(f, "malformed command: {}", reason),
            ErrorKind::AddressOutOfRange { value } => write!(f, "address {} is out of range", value),
        }
    }
}

/// Error type that contains the reason of the error, the location it was detected at
/// and a stack of contexts describing what was being done at the time.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,

    /// The 1-based source line of the offending command.
    pub line: Option<usize>,

    /// The name of the translation unit, when translating VM code.
    pub unit: Option<String>,

    /// Innermost context first.
    pub context: Vec<&'static str>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            kind,
            line: None,
            unit: None,
            context: Vec::new(),
        }
    }

    pub fn malformed<S: Into<String>>(reason: S) -> Error {
        Error::new(ErrorKind::MalformedCommand { reason: reason.into() })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Attaches a line number unless a more precise one is already known.
    pub fn at_line(mut self, line: usize) -> Error {
        self.line.get_or_insert(line);
        self
    }

    pub fn in_unit<S: Into<String>>(mut self, unit: S) -> Error {
        if self.unit.is_none() {
            self.unit = Some(unit.into());
        }

        self
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.unit, self.line) {
            (Some(unit), Some(line)) => write!(f, "{}:{}: ", unit, line)?,
            (Some(unit), None) => write!(f, "{}: ", unit)?,
            (None, Some(line)) => write!(f, "line {}: ", line)?,
            (None, None) => (),
        }

        if !self.context.is_empty() {
            write!(f, "{}: ", self.context.iter().rev().join(": "))?;
        }

        write!(f, "{}", self.kind)
    }
}

pub trait ErrorExt {
    fn context(self, ctx: &'static str) -> Self;
    fn at_line(self, line: usize) -> Self;
}

impl<R> ErrorExt for std::result::Result<R, Error> {
    fn context(self, ctx: &'static str) -> Self {
        self.map_err(|mut err| {
            err.context.push(ctx);
            err
        })
    }

    fn at_line(self, line: usize) -> Self {
        self.map_err(|err| err.at_line(line))
    }
}

impl<'a> nom::error::ParseError<&'a str> for Error {
    fn from_error_kind(input: &'a str, kind: NomErrorKind) -> Self {
        let rest: String = input.chars().take(20).collect();
        Error::malformed(format!("unexpected input at '{}' ({:?})", rest, kind))
    }

    fn append(_input: &'a str, _kind: NomErrorKind, other: Self) -> Self {
        other
    }

    fn add_context(_input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.context.push(ctx);
        other
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Parsing Hack symbolic assembly.

pub mod command;
pub mod parser;

pub use self::command::{Command, Operand, SourceCommand};
pub use self::parser::Parser;

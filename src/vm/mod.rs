//! Parsing of the stack-based VM language.

mod command;
mod parser;
mod token;

pub use self::command::{ArithmeticOp, Command, Segment, SourceCommand};
pub use self::parser::{parse_line, Parser};
pub use self::token::Token;

//! Parsing and storing assembled Hack programs.

mod parser;
mod program;

pub use self::parser::parse_words;
pub use self::program::Program;

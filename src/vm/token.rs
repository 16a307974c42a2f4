//! Tokens and a tokenizer for the VM language.

use logos::{Lexer, Logos};

use std::fmt;

/// Tokens of a line of VM code.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Input that is not part of any token, such as `$`. Whitespace and comments are skipped.
    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,

    /// A non-negative decimal number that fits in 16 bits.
    #[regex("[0-9]+", number_callback)]
    Number(u16),

    /// A command, segment or identifier. Identifiers may contain `A-Za-z0-9_.:` and do
    /// not start with a digit. `-` is accepted so that `if-goto` is a single word.
    #[regex(r"[A-Za-z_.:][A-Za-z0-9_.:\-]*", Lexer::slice)]
    Word(&'a str),
}

fn number_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<u16, std::num::ParseIntError> {
    lex.slice().parse()
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Number(num) => write!(f, "{}", num),
            Token::Word(word) => write!(f, "{}", word),
        }
    }
}

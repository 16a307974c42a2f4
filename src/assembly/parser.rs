use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, map, opt, verify},
    error::context,
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::error::{Error, ErrorExt, ErrorKind, Result};
use crate::instruction::MAX_ADDRESS;
use crate::parsing::{significant_lines, Cursor};

use super::command::{Command, Operand, SourceCommand};

type ParseResult<'a, T> = IResult<&'a str, T, Error>;

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.$:".contains(c)
}

fn symbol(input: &str) -> ParseResult<&str> {
    verify(
        take_while1(is_symbol_char),
        |s: &str| !s.starts_with(|c: char| c.is_ascii_digit()),
    )(input)
}

fn literal(input: &str) -> ParseResult<u16> {
    let (rest, digits) = take_while1(|c: char| c.is_ascii_digit())(input)?;

    let value = digits.parse::<u32>().unwrap_or(std::u32::MAX);

    if value > MAX_ADDRESS as u32 {
        return Err(nom::Err::Failure(Error::new(ErrorKind::AddressOutOfRange { value })));
    }

    Ok((rest, value as u16))
}

fn address(input: &str) -> ParseResult<Command> {
    preceded(
        char('@'),
        context("address command", alt((
            map(all_consuming(literal), |value| Command::Address(Operand::Literal(value))),
            map(all_consuming(symbol), |s: &str| Command::Address(Operand::Symbol(s.to_string()))),
        ))),
    )(input)
}

fn label(input: &str) -> ParseResult<Command> {
    context(
        "label declaration",
        map(
            delimited(char('('), symbol, char(')')),
            |s: &str| Command::Label(s.to_string()),
        ),
    )(input)
}

fn mnemonic(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c != '=' && c != ';')(input)
}

fn compute(input: &str) -> ParseResult<Command> {
    context(
        "compute command",
        map(
            tuple((
                opt(terminated(mnemonic, char('='))),
                mnemonic,
                opt(preceded(char(';'), mnemonic)),
            )),
            |(dest, comp, jump)| Command::Compute {
                dest: dest.map(str::to_string),
                comp: comp.to_string(),
                jump: jump.map(str::to_string),
            },
        ),
    )(input)
}

fn command(input: &str) -> ParseResult<Command> {
    match input.chars().next() {
        Some('@') => address(input),
        Some('(') => label(input),
        _ => compute(input),
    }
}

/// Classifies a single line that has had its comments and whitespace removed.
pub fn parse_line(line: &str) -> Result<Command> {
    match all_consuming(command)(line) {
        Ok((_, command)) => Ok(command),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(Error::malformed("expected more input")),
    }
}

/// Cursor over the classified commands of an assembly source.
///
/// The whole source is classified when the parser is created, so a malformed line is
/// reported before any command is handed out.
#[derive(Debug, Clone)]
pub struct Parser {
    cursor: Cursor<SourceCommand>,
}

impl Parser {
    pub fn parse(source: &str) -> Result<Parser> {
        let commands = significant_lines(source)
            .map(|(line, text)| {
                let text = text.split_whitespace().collect::<String>();

                parse_line(&text)
                    .map(|command| SourceCommand { command, line })
                    .at_line(line)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Parser {
            cursor: Cursor::new(commands),
        })
    }

    pub fn has_more_commands(&self) -> bool {
        self.cursor.has_more()
    }

    /// Makes the next command the current one and returns it.
    pub fn advance(&mut self) -> Option<&SourceCommand> {
        self.cursor.advance()
    }

    pub fn current(&self) -> Option<&SourceCommand> {
        self.cursor.current()
    }

    /// Rewinds to the first command.
    pub fn reset(&mut self) {
        self.cursor.reset()
    }

    /// The command following the current one, without advancing.
    pub fn peek(&self) -> Option<&SourceCommand> {
        self.cursor.items().get(self.cursor.offset())
    }

    pub fn commands(&self) -> &[SourceCommand] {
        self.cursor.items()
    }
}

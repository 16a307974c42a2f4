use logos::Logos;

use crate::error::{Error, ErrorExt, Result};
use crate::instruction::MAX_ADDRESS;
use crate::parsing::{significant_lines, Cursor};

use super::command::{ArithmeticOp, Command, Segment, SourceCommand};
use super::token::Token;

const KEYWORDS: &[&str] = &[
    "push", "pop", "label", "goto", "if-goto", "function", "call", "return",
];

/// Validates a label or function name. Names end up inside assembly symbols, so they may
/// only use characters an assembly symbol allows.
fn identifier(word: &str) -> Result<String> {
    if word.contains('-') {
        return Err(Error::malformed(format!("'{}' is not a valid identifier", word)));
    }

    Ok(word.to_string())
}

/// Validates a function name. A name ending in `.<digits>` reads like a static variable
/// symbol and would share its assembly symbol with one.
fn function_name(word: &str) -> Result<String> {
    let name = identifier(word)?;

    let numeric_suffix = match name.rfind('.') {
        Some(dot) => {
            let suffix = &name[dot + 1..];
            !suffix.is_empty() && suffix.bytes().all(|byte| byte.is_ascii_digit())
        }
        None => false,
    };

    if numeric_suffix {
        return Err(Error::malformed(format!(
            "function name '{}' clashes with a static variable symbol",
            name,
        )));
    }

    Ok(name)
}

fn segment(word: &str) -> Result<Segment> {
    Segment::from_word(word)
        .ok_or_else(|| Error::malformed(format!("unknown segment '{}'", word)))
}

fn classify(tokens: &[Token]) -> Result<Command> {
    use Token::{Number, Word};

    if let [Word(word)] = tokens {
        if let Some(op) = ArithmeticOp::from_word(word) {
            return Ok(Command::Arithmetic(op));
        }
    }

    let command = match tokens {
        [Word("return")] => Command::Return,

        [Word("push"), Word(name), Number(index)] => {
            let segment = segment(name)?;
            segment.check_index(*index)?;
            Command::Push(segment, *index)
        }

        [Word("pop"), Word(name), Number(index)] => {
            let segment = segment(name)?;

            if segment == Segment::Constant {
                return Err(Error::malformed("cannot pop into the constant segment"));
            }

            segment.check_index(*index)?;
            Command::Pop(segment, *index)
        }

        [Word("label"), Word(label)] => Command::Label(identifier(label)?),
        [Word("goto"), Word(label)] => Command::Goto(identifier(label)?),
        [Word("if-goto"), Word(label)] => Command::IfGoto(identifier(label)?),

        [Word("function"), Word(name), Number(locals)] => Command::Function {
            name: function_name(name)?,
            locals: *locals,
        },

        [Word("call"), Word(name), Number(args)] => {
            // The frame offset args + 5 is built from an address literal.
            if *args > MAX_ADDRESS - 5 {
                return Err(Error::malformed(format!(
                    "{} arguments is more than a call can pass (0..={})",
                    args,
                    MAX_ADDRESS - 5,
                )));
            }

            Command::Call {
                name: function_name(name)?,
                args: *args,
            }
        }

        [Word(word), ..]
            if KEYWORDS.iter().any(|keyword| keyword == word)
                || ArithmeticOp::from_word(word).is_some() =>
        {
            return Err(Error::malformed(format!("wrong operands for '{}'", word)));
        }

        [Word(word), ..] => return Err(Error::malformed(format!("unknown command '{}'", word))),
        [token, ..] => return Err(Error::malformed(format!("unexpected '{}'", token))),
        [] => return Err(Error::malformed("expected a command")),
    };

    Ok(command)
}

/// Classifies a single line of VM code.
pub fn parse_line(line: &str) -> Result<Command> {
    let mut tokens = Vec::new();

    let mut lexer = Token::lexer(line);

    while let Some(token) = lexer.next() {
        if token == Token::Error {
            return Err(Error::malformed(format!("unexpected '{}'", lexer.slice())));
        }

        tokens.push(token);
    }

    classify(&tokens)
}

/// Cursor over the classified commands of one VM translation unit.
#[derive(Debug, Clone)]
pub struct Parser {
    cursor: Cursor<SourceCommand>,
}

impl Parser {
    pub fn parse(source: &str) -> Result<Parser> {
        let commands = significant_lines(source)
            .map(|(line, text)| {
                parse_line(text)
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

    pub fn advance(&mut self) -> Option<&SourceCommand> {
        self.cursor.advance()
    }

    pub fn current(&self) -> Option<&SourceCommand> {
        self.cursor.current()
    }

    pub fn reset(&mut self) {
        self.cursor.reset()
    }

    pub fn commands(&self) -> &[SourceCommand] {
        self.cursor.items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("add").unwrap(), Command::Arithmetic(ArithmeticOp::Add));
        assert_eq!(parse_line("shiftright").unwrap(), Command::Arithmetic(ArithmeticOp::ShiftRight));
        assert_eq!(parse_line("push constant 7").unwrap(), Command::Push(Segment::Constant, 7));
        assert_eq!(parse_line("pop  temp\t7").unwrap(), Command::Pop(Segment::Temp, 7));
        assert_eq!(parse_line("if-goto LOOP_START").unwrap(), Command::IfGoto("LOOP_START".into()));
        assert_eq!(parse_line("return").unwrap(), Command::Return);
        assert_eq!(
            parse_line("function Main.fibonacci 2").unwrap(),
            Command::Function { name: "Main.fibonacci".into(), locals: 2 },
        );
        assert_eq!(
            parse_line("call Math.multiply 2").unwrap(),
            Command::Call { name: "Math.multiply".into(), args: 2 },
        );
    }

    #[test]
    fn test_parse_line_malformed() {
        let lines = &[
            "push constant",
            "push stack 1",
            "pop constant 3",
            "push pointer 2",
            "pop temp 8",
            "push constant 32768",
            "add 1",
            "label",
            "label a$b",
            "goto x-y",
            "function Main.f",
            "function Main.3 0",
            "call Main.3 0",
            "call Main.f 40000",
            "call Main.f 32763",
            "jump LOOP",
            "7",
        ];

        for line in lines {
            match parse_line(line) {
                Err(Error { kind: ErrorKind::MalformedCommand { .. }, .. }) => (),
                other => panic!("{:?} parsed as {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_operand_bounds() {
        assert!(parse_line("push pointer 1").is_ok());
        assert!(parse_line("push temp 7").is_ok());
        assert!(parse_line("push constant 32767").is_ok());
        assert!(parse_line("push local 900").is_ok());
        assert!(parse_line("call Main.f 32762").is_ok());
        assert!(parse_line("function Main.f2 0").is_ok());
        assert!(parse_line("function Main.3d 0").is_ok());
    }

    #[test]
    fn test_parser_lines() {
        let source = "// SimpleAdd\npush constant 7\n\npush constant 8 // second\nadd\n";
        let mut parser = Parser::parse(source).unwrap();

        assert_eq!(parser.commands().len(), 3);
        assert_eq!(parser.advance().unwrap().line, 2);
        assert_eq!(parser.advance().unwrap().line, 4);
        assert_eq!(parser.current().unwrap().command, Command::Push(Segment::Constant, 8));
        assert!(parser.has_more_commands());
        assert_eq!(parser.advance().unwrap().command, Command::Arithmetic(ArithmeticOp::Add));
        assert!(!parser.has_more_commands());

        let err = Parser::parse("push constant 1\npop constant 1\n").unwrap_err();
        assert_eq!(err.line, Some(2));
    }
}

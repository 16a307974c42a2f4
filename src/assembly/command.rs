use std::fmt;

/// The value of an address command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A decimal literal, `@42`.
    Literal(u16),
    /// A label or a variable, `@LOOP`.
    Symbol(String),
}

/// A classified line of assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `@value`
    Address(Operand),

    /// `dest=comp;jump`. The mnemonics are validated only when the command is encoded.
    Compute {
        dest: Option<String>,
        comp: String,
        jump: Option<String>,
    },

    /// `(SYMBOL)`, a pseudo command that names the address of the next instruction.
    Label(String),
}

impl Command {
    /// Returns true for commands that occupy a word of ROM.
    pub fn is_instruction(&self) -> bool {
        match self {
            Command::Label(_) => false,
            _ => true,
        }
    }

    /// Returns true for compute commands that carry a jump.
    pub fn jumps(&self) -> bool {
        match self {
            Command::Compute { jump: Some(jump), .. } => jump != "null" && jump != "NULL",
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Address(Operand::Literal(value)) => write!(f, "@{}", value),
            Command::Address(Operand::Symbol(symbol)) => write!(f, "@{}", symbol),
            Command::Label(symbol) => write!(f, "({})", symbol),
            Command::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest)?;
                }

                write!(f, "{}", comp)?;

                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }

                Ok(())
            }
        }
    }
}

/// A command together with the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub command: Command,
    /// 1-based line number in the assembly source.
    pub line: usize,
}

use std::fmt;

use crate::error::{Error, Result};
use crate::instruction::MAX_ADDRESS;

/// A memory segment of the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Argument,
    Local,
    Static,
    Constant,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn from_word(word: &str) -> Option<Segment> {
        let segment = match word {
            "argument" => Segment::Argument,
            "local" => Segment::Local,
            "static" => Segment::Static,
            "constant" => Segment::Constant,
            "this" => Segment::This,
            "that" => Segment::That,
            "pointer" => Segment::Pointer,
            "temp" => Segment::Temp,
            _ => return None,
        };

        Some(segment)
    }

    pub fn name(self) -> &'static str {
        match self {
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Constant => "constant",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    /// The largest index the segment accepts.
    pub fn max_index(self) -> u16 {
        match self {
            Segment::Pointer => 1,
            Segment::Temp => 7,
            _ => MAX_ADDRESS,
        }
    }

    pub fn check_index(self, index: u16) -> Result<()> {
        if index > self.max_index() {
            return Err(Error::malformed(format!(
                "index {} is out of range for segment '{}' (0..={})",
                index,
                self,
                self.max_index(),
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operators that work on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

impl ArithmeticOp {
    pub fn from_word(word: &str) -> Option<ArithmeticOp> {
        let op = match word {
            "add" => ArithmeticOp::Add,
            "sub" => ArithmeticOp::Sub,
            "neg" => ArithmeticOp::Neg,
            "eq" => ArithmeticOp::Eq,
            "gt" => ArithmeticOp::Gt,
            "lt" => ArithmeticOp::Lt,
            "and" => ArithmeticOp::And,
            "or" => ArithmeticOp::Or,
            "not" => ArithmeticOp::Not,
            "shiftleft" => ArithmeticOp::ShiftLeft,
            "shiftright" => ArithmeticOp::ShiftRight,
            _ => return None,
        };

        Some(op)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
            ArithmeticOp::ShiftLeft => "shiftleft",
            ArithmeticOp::ShiftRight => "shiftright",
        }
    }
}

/// A single VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    /// The label operand of `label`, `goto` and `if-goto`.
    pub fn label(&self) -> Option<&str> {
        match self {
            Command::Label(label) | Command::Goto(label) | Command::IfGoto(label) => Some(label),
            _ => None,
        }
    }

    /// The function named by `function` and `call`.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Command::Function { name, .. } | Command::Call { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op.name()),
            Command::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Command::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Command::Label(label) => write!(f, "label {}", label),
            Command::Goto(label) => write!(f, "goto {}", label),
            Command::IfGoto(label) => write!(f, "if-goto {}", label),
            Command::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Command::Call { name, args } => write!(f, "call {} {}", name, args),
            Command::Return => write!(f, "return"),
        }
    }
}

/// A command together with the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub command: Command,
    pub line: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Command::IfGoto("END".into()).label(), Some("END"));
        assert_eq!(Command::Return.label(), None);
        assert_eq!(Command::Call { name: "Sys.init".into(), args: 0 }.function_name(), Some("Sys.init"));
        assert_eq!(Command::Push(Segment::Local, 0).function_name(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Pop(Segment::That, 5).to_string(), "pop that 5");
        assert_eq!(Command::IfGoto("LOOP".into()).to_string(), "if-goto LOOP");
        assert_eq!(Command::Arithmetic(ArithmeticOp::ShiftLeft).to_string(), "shiftleft");
        assert_eq!(Command::Function { name: "Main.main".into(), locals: 2 }.to_string(), "function Main.main 2");
    }

    #[test]
    fn test_segment_bounds() {
        assert!(Segment::Pointer.check_index(1).is_ok());
        assert!(Segment::Pointer.check_index(2).is_err());
        assert!(Segment::Temp.check_index(8).is_err());
        assert!(Segment::Constant.check_index(32768).is_err());
        assert!(Segment::Static.check_index(240).is_ok());
    }
}

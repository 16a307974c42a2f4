use std::convert::TryFrom;

use crate::error::Result;
use crate::instruction::{Instruction, InvalidInstruction};
use crate::source_map::SourceMap;
use crate::symbol_table::SymbolTable;

use super::parser::parse_words;

/// An assembled program: the ROM image together with the symbols and source lines it
/// was produced from.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// ROM contents, starting from address 0.
    pub words: Vec<u16>,
    pub symbol_table: SymbolTable,
    /// ROM address to 1-based line of the assembly source.
    pub source_map: SourceMap<usize>,
}

impl Program {
    /// Reads a program from the textual binary format. The result carries only the
    /// predefined symbols and an empty source map.
    pub fn parse_text(text: &str) -> Result<Program> {
        Ok(Program {
            words: parse_words(text)?,
            ..Program::default()
        })
    }

    pub fn to_words(&self) -> Vec<u16> {
        self.words.clone()
    }

    /// Renders the program in the textual binary format, one newline-terminated line per
    /// instruction.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.words.len() * 17);

        for word in &self.words {
            text.push_str(&format!("{:016b}\n", word));
        }

        text
    }

    /// Decodes every word of the program.
    pub fn instructions(&self) -> std::result::Result<Vec<Instruction>, InvalidInstruction> {
        self.words.iter().map(|word| Instruction::try_from(*word)).collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

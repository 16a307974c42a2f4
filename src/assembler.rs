//! Translation of symbolic Hack assembly into binary words.
//!
//! Assembly happens in two passes over the same [Parser]. The first pass assigns every
//! `(LABEL)` the ROM address of the instruction following it. The second pass encodes the
//! instructions, resolving symbols through the table and allocating RAM for variables on
//! their first use.

use slog::{debug, o, trace, Discard, Logger};

use crate::assembly::{Command, Operand, Parser};
use crate::binary::Program;
use crate::error::{Error, ErrorExt, ErrorKind, Result};
use crate::instruction::{encode_comp, encode_dest, encode_jump, MAX_ADDRESS};
use crate::source_map::SourceMap;
use crate::symbol_table::{SymbolKind, SymbolTable, FIRST_VARIABLE_ADDRESS};

/// What to do with a symbol that is used but never declared as a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPolicy {
    /// Allocate a variable for it, unless the following instruction jumps to it.
    Allocate,
    /// Every symbol has to be predefined or declared as a label.
    Strict,
}

impl Default for SymbolPolicy {
    fn default() -> SymbolPolicy {
        SymbolPolicy::Allocate
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub symbol_policy: SymbolPolicy,
}

/// Assembles `source` with the default options.
///
/// ```
/// let program = hack_toolchain::assemble("@2\nD=A\n").unwrap();
/// assert_eq!(program.to_text(), "0000000000000010\n1110110000010000\n");
/// ```
pub fn assemble(source: &str) -> Result<Program> {
    assemble_with_logger(source, Options::default(), None)
}

pub fn assemble_with_logger<L>(source: &str, options: Options, logger: L) -> Result<Program>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "assembly"));

    let parser = Parser::parse(source).context("parsing")?;

    Assembler::new(parser, options, logger).run()
}

struct Assembler {
    parser: Parser,
    symbol_table: SymbolTable,
    options: Options,
    logger: Logger,
}

impl Assembler {
    fn new(parser: Parser, options: Options, logger: Logger) -> Assembler {
        Assembler {
            parser,
            symbol_table: SymbolTable::new(),
            options,
            logger,
        }
    }

    fn run(mut self) -> Result<Program> {
        self.define_labels().context("pass 1")?;
        let (words, source_map) = self.encode().context("pass 2")?;

        debug!(self.logger, "assembly finished"; "instructions" => words.len());

        Ok(Program {
            words,
            symbol_table: self.symbol_table,
            source_map,
        })
    }

    /// Pass 1: binds every label to the address of the next instruction.
    fn define_labels(&mut self) -> Result<()> {
        let mut address: u32 = 0;

        self.parser.reset();

        while let Some(entry) = self.parser.advance() {
            if entry.command.is_instruction() {
                address += 1;
                continue;
            }

            if let Command::Label(symbol) = &entry.command {
                if address > MAX_ADDRESS as u32 {
                    return Err(Error::new(ErrorKind::AddressOutOfRange { value: address }))
                        .at_line(entry.line);
                }

                trace!(self.logger, "add a label to the symbol table"; "symbol" => symbol, "address" => address);

                self.symbol_table
                    .add_entry(symbol.as_str(), address as u16, SymbolKind::Label)
                    .at_line(entry.line)?;
            }
        }

        debug!(self.logger, "labels defined"; "instructions" => address);

        Ok(())
    }

    /// Pass 2: encodes instructions, allocating variables as they are first seen.
    fn encode(&mut self) -> Result<(Vec<u16>, SourceMap<usize>)> {
        let mut words = Vec::with_capacity(self.parser.commands().len());
        let mut source_map = SourceMap::default();
        let mut next_variable = FIRST_VARIABLE_ADDRESS as u32;

        self.parser.reset();

        while let Some(entry) = self.parser.advance().cloned() {
            let word = match &entry.command {
                Command::Label(_) => continue,

                Command::Address(Operand::Literal(value)) => *value,

                Command::Address(Operand::Symbol(symbol)) => {
                    if self.symbol_table.contains(symbol) {
                        self.symbol_table.get_address(symbol)?
                    } else {
                        let jump_target = self.parser
                            .peek()
                            .map(|next| next.command.jumps())
                            .unwrap_or(false);

                        if jump_target || self.options.symbol_policy == SymbolPolicy::Strict {
                            return Err(Error::new(ErrorKind::UnknownSymbol { name: symbol.clone() }))
                                .at_line(entry.line);
                        }

                        if next_variable > MAX_ADDRESS as u32 {
                            return Err(Error::new(ErrorKind::AddressOutOfRange { value: next_variable }))
                                .at_line(entry.line);
                        }

                        let address = next_variable as u16;
                        next_variable += 1;

                        trace!(self.logger, "allocate a variable"; "symbol" => symbol, "address" => address);

                        self.symbol_table.add_entry(symbol.as_str(), address, SymbolKind::Variable)?;
                        address
                    }
                }

                Command::Compute { dest, comp, jump } => {
                    let word = encode_comp(comp)
                        .and_then(|comp| Ok(comp << 6 | encode_dest(dest.as_deref())? << 3))
                        .and_then(|word| Ok(word | encode_jump(jump.as_deref())?));

                    word.at_line(entry.line)?
                }
            };

            source_map.insert(words.len() as u16, entry.line);
            words.push(word);
        }

        Ok((words, source_map))
    }
}

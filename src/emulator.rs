//! [Emulator] for executing assembled [programs](crate::binary::Program).
//!
//! The emulator is used to check the behaviour of translated code. It executes one
//! instruction per cycle and has no screen or keyboard devices; their memory maps are
//! plain RAM.

use std::convert::TryFrom;
use std::fmt;

use slog::{debug, o, trace, Discard, Logger};

use crate::binary::Program;
use crate::instruction::{Computation, Instruction, Jump};

/// Number of words in the data memory.
pub const RAM_SIZE: usize = 0x8000;

/// Contains the registers of the Hack CPU.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Address of the next instruction to be executed.
    pub pc: u16,
    pub a: u16,
    pub d: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulationError {
    /// The word at `address` does not decode into an instruction.
    InvalidInstruction { address: u16, word: u16 },
    /// A data access outside the RAM.
    InvalidAddress { address: u16 },
}

impl fmt::Display for EmulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmulationError::InvalidInstruction { address, word } =>
                write!(f, "invalid instruction {:016b} at ROM address {}", word, address),
            EmulationError::InvalidAddress { address } =>
                write!(f, "RAM address {} is out of range", address),
        }
    }
}

impl std::error::Error for EmulationError {}

/// Trait for implementing the memories of a Hack machine.
pub trait Memory {
    /// Error type returned by all methods of this trait.
    type Error;

    /// Fetch the instruction from the specified ROM address.
    ///
    /// # Returns
    /// `None` if `addr` is past the end of the program.
    fn get_instruction(&mut self, addr: u16) -> Result<Option<Instruction>, Self::Error>;

    /// The code word at `addr`, if it is within the program.
    fn get_code(&self, addr: u16) -> Option<u16>;

    fn get_data(&mut self, addr: u16) -> Result<u16, Self::Error>;

    fn set_data(&mut self, addr: u16, data: u16) -> Result<(), Self::Error>;
}

/// Separate instruction and data memories, as in the Hack computer.
#[derive(Debug, Clone)]
pub struct Machine {
    pub rom: Vec<u16>,
    pub ram: Vec<u16>,
}

impl Machine {
    pub fn new(rom: Vec<u16>) -> Machine {
        Machine {
            rom,
            ram: vec![0; RAM_SIZE],
        }
    }
}

impl Memory for Machine {
    type Error = EmulationError;

    fn get_instruction(&mut self, addr: u16) -> Result<Option<Instruction>, EmulationError> {
        match self.rom.get(addr as usize) {
            None => Ok(None),
            Some(&word) => Instruction::try_from(word)
                .map(Some)
                .map_err(|_| EmulationError::InvalidInstruction { address: addr, word }),
        }
    }

    fn get_code(&self, addr: u16) -> Option<u16> {
        self.rom.get(addr as usize).copied()
    }

    fn get_data(&mut self, addr: u16) -> Result<u16, EmulationError> {
        self.ram
            .get(addr as usize)
            .copied()
            .ok_or(EmulationError::InvalidAddress { address: addr })
    }

    fn set_data(&mut self, addr: u16, data: u16) -> Result<(), EmulationError> {
        let slot = self.ram
            .get_mut(addr as usize)
            .ok_or(EmulationError::InvalidAddress { address: addr })?;

        *slot = data;

        Ok(())
    }
}

/// Evaluates a computation. Arithmetic wraps around at 16 bits.
pub fn compute(comp: Computation, a: u16, d: u16, m: u16) -> u16 {
    let shift_right = |x: u16| ((x as i16) >> 1) as u16;

    match comp {
        Computation::Zero => 0,
        Computation::One => 1,
        Computation::MinusOne => 0xFFFF,
        Computation::D => d,
        Computation::A => a,
        Computation::NotD => !d,
        Computation::NotA => !a,
        Computation::NegD => d.wrapping_neg(),
        Computation::NegA => a.wrapping_neg(),
        Computation::DPlusOne => d.wrapping_add(1),
        Computation::APlusOne => a.wrapping_add(1),
        Computation::DMinusOne => d.wrapping_sub(1),
        Computation::AMinusOne => a.wrapping_sub(1),
        Computation::DPlusA => d.wrapping_add(a),
        Computation::DMinusA => d.wrapping_sub(a),
        Computation::AMinusD => a.wrapping_sub(d),
        Computation::DAndA => d & a,
        Computation::DOrA => d | a,

        Computation::M => m,
        Computation::NotM => !m,
        Computation::NegM => m.wrapping_neg(),
        Computation::MPlusOne => m.wrapping_add(1),
        Computation::MMinusOne => m.wrapping_sub(1),
        Computation::DPlusM => d.wrapping_add(m),
        Computation::DMinusM => d.wrapping_sub(m),
        Computation::MMinusD => m.wrapping_sub(d),
        Computation::DAndM => d & m,
        Computation::DOrM => d | m,

        Computation::AShiftLeft => a << 1,
        Computation::DShiftLeft => d << 1,
        Computation::MShiftLeft => m << 1,
        Computation::AShiftRight => shift_right(a),
        Computation::DShiftRight => shift_right(d),
        Computation::MShiftRight => shift_right(m),
    }
}

/// The emulator contains all the state needed for executing a Hack program.
#[derive(Clone, Debug)]
pub struct Emulator<Mem> {
    /// The instruction and data memories of the emulated machine.
    pub memory: Mem,

    /// The registers of the CPU.
    pub context: Context,

    /// True once the program has run off the end of the ROM or entered the
    /// `(END) @END 0;JMP` idiom.
    pub halted: bool,

    /// Number of instructions executed so far.
    pub cycles: u64,

    logger: Logger,
}

impl Emulator<Machine> {
    /// Creates an emulator with `program` in ROM and zeroed RAM.
    pub fn from_program(program: &Program) -> Emulator<Machine> {
        Emulator::new(Machine::new(program.to_words()))
    }

    /// Reads a word of RAM. Out of range addresses read as zero.
    pub fn ram(&self, addr: u16) -> u16 {
        self.memory.ram.get(addr as usize).copied().unwrap_or(0)
    }

    /// The value of `SP`.
    pub fn stack_pointer(&self) -> u16 {
        self.ram(0)
    }

    /// The value on top of the stack, as a signed number.
    pub fn stack_top(&self) -> Option<i16> {
        match self.stack_pointer() {
            0 => None,
            sp => Some(self.ram(sp - 1) as i16),
        }
    }
}

impl<Mem> Emulator<Mem> where Mem: Memory {
    pub fn new(memory: Mem) -> Emulator<Mem> {
        Emulator::with_logger(memory, None)
    }

    pub fn with_logger<L: Into<Option<Logger>>>(memory: Mem, logger: L) -> Emulator<Mem> {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "emulation"));

        Emulator {
            memory,
            context: Context::default(),
            halted: false,
            cycles: 0,
            logger,
        }
    }

    /// Returns true if an unconditional jump goes back to the `@target` right before it,
    /// which is how a Hack program halts itself.
    fn is_halt_loop(&self, target: u16, jump: Jump) -> bool {
        jump == Jump::Always
            && self.context.pc.checked_sub(1) == Some(target)
            && self.memory.get_code(target) == Some(target)
    }

    /// Fetches and executes the instruction the program counter points to.
    ///
    /// # Errors
    /// Returns a memory error if the instruction can not be decoded or accesses memory
    /// outside the RAM.
    pub fn step(&mut self) -> Result<(), Mem::Error> {
        if self.halted {
            return Ok(());
        }

        let pc = self.context.pc;

        let instruction = match self.memory.get_instruction(pc)? {
            Some(instruction) => instruction,
            None => {
                debug!(self.logger, "program counter left the program"; "pc" => pc);
                self.halted = true;
                return Ok(());
            }
        };

        trace!(self.logger, "execute"; "pc" => pc, "instruction" => %instruction);

        self.cycles += 1;

        match instruction {
            Instruction::Address(value) => {
                self.context.a = value;
                self.context.pc = pc.wrapping_add(1);
            }
            Instruction::Compute { dest, comp, jump } => {
                let address = self.context.a;

                let m = if comp.reads_memory() {
                    self.memory.get_data(address)?
                } else {
                    0
                };

                let value = compute(comp, address, self.context.d, m);

                if dest.m {
                    self.memory.set_data(address, value)?;
                }

                if dest.a {
                    self.context.a = value;
                }

                if dest.d {
                    self.context.d = value;
                }

                if jump.test(value as i16) {
                    if self.is_halt_loop(address, jump) {
                        debug!(self.logger, "halted"; "pc" => pc, "cycles" => self.cycles);
                        self.halted = true;
                    }

                    self.context.pc = address;
                } else {
                    self.context.pc = pc.wrapping_add(1);
                }
            }
        }

        Ok(())
    }

    /// Executes the program until it halts or `max_cycles` instructions have been
    /// executed. Returns true if the program halted.
    pub fn run(&mut self, max_cycles: u64) -> Result<bool, Mem::Error> {
        let limit = self.cycles.saturating_add(max_cycles);

        while !self.halted && self.cycles < limit {
            self.step()?;
        }

        Ok(self.halted)
    }
}

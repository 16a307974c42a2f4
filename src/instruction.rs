//! Types for representing Hack instructions and their binary fields.
//!
//! Every table in this module is an exhaustive `match`, so adding a variant to the
//! instruction set fails to compile until every direction of the mapping knows about it.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Field, Result};

/// The largest address an address instruction can carry.
pub const MAX_ADDRESS: u16 = 0x7FFF;

/// The destination registers of a compute instruction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    /// The destination of an instruction that stores its result nowhere.
    pub const NULL: Dest = Dest { a: false, d: false, m: false };

    pub fn bits(self) -> u16 {
        (self.a as u16) << 2 | (self.d as u16) << 1 | self.m as u16
    }

    pub fn from_bits(bits: u16) -> Dest {
        Dest {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }

    pub fn is_null(self) -> bool {
        self == Dest::NULL
    }
}

impl FromStr for Dest {
    type Err = Error;

    fn from_str(input: &str) -> Result<Dest> {
        if input.is_empty() || input == "null" || input == "NULL" {
            return Ok(Dest::NULL);
        }

        let unknown = || Error::new(ErrorKind::UnknownMnemonic {
            field: Field::Dest,
            mnemonic: input.to_string(),
            suggestion: None,
        });

        let mut dest = Dest::NULL;

        for register in input.chars() {
            let slot = match register {
                'A' => &mut dest.a,
                'D' => &mut dest.d,
                'M' => &mut dest.m,
                _ => return Err(unknown()),
            };

            if *slot {
                return Err(unknown());
            }

            *slot = true;
        }

        Ok(dest)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.a {
            write!(f, "A")?;
        }

        if self.m {
            write!(f, "M")?;
        }

        if self.d {
            write!(f, "D")?;
        }

        Ok(())
    }
}

/// The computations of the Hack ALU, including the shift extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Computation {
    /// The constant `0`.
    Zero,
    /// The constant `1`.
    One,
    /// The constant `-1`.
    MinusOne,
    D,
    A,
    /// `!D`, bitwise not.
    NotD,
    NotA,
    /// `-D`, two's complement negation.
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,

    /// `M`, the memory word addressed by `A`.
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,

    /// `A<<`, logical shift left by one bit.
    AShiftLeft,
    DShiftLeft,
    MShiftLeft,
    /// `A>>`, arithmetic shift right by one bit.
    AShiftRight,
    DShiftRight,
    MShiftRight,
}

impl Computation {
    /// Every computation of the instruction set, in table order.
    pub const ALL: [Computation; 34] = [
        Computation::Zero,
        Computation::One,
        Computation::MinusOne,
        Computation::D,
        Computation::A,
        Computation::NotD,
        Computation::NotA,
        Computation::NegD,
        Computation::NegA,
        Computation::DPlusOne,
        Computation::APlusOne,
        Computation::DMinusOne,
        Computation::AMinusOne,
        Computation::DPlusA,
        Computation::DMinusA,
        Computation::AMinusD,
        Computation::DAndA,
        Computation::DOrA,
        Computation::M,
        Computation::NotM,
        Computation::NegM,
        Computation::MPlusOne,
        Computation::MMinusOne,
        Computation::DPlusM,
        Computation::DMinusM,
        Computation::MMinusD,
        Computation::DAndM,
        Computation::DOrM,
        Computation::AShiftLeft,
        Computation::DShiftLeft,
        Computation::MShiftLeft,
        Computation::AShiftRight,
        Computation::DShiftRight,
        Computation::MShiftRight,
    ];

    /// The 10-bit comp field: the 3-bit opcode prefix, the `a` bit and the six `c` bits.
    pub fn bits(self) -> u16 {
        match self {
            Computation::Zero        => 0b111_0_101010,
            Computation::One         => 0b111_0_111111,
            Computation::MinusOne    => 0b111_0_111010,
            Computation::D           => 0b111_0_001100,
            Computation::A           => 0b111_0_110000,
            Computation::NotD        => 0b111_0_001101,
            Computation::NotA        => 0b111_0_110001,
            Computation::NegD        => 0b111_0_001111,
            Computation::NegA        => 0b111_0_110011,
            Computation::DPlusOne    => 0b111_0_011111,
            Computation::APlusOne    => 0b111_0_110111,
            Computation::DMinusOne   => 0b111_0_001110,
            Computation::AMinusOne   => 0b111_0_110010,
            Computation::DPlusA      => 0b111_0_000010,
            Computation::DMinusA     => 0b111_0_010011,
            Computation::AMinusD     => 0b111_0_000111,
            Computation::DAndA       => 0b111_0_000000,
            Computation::DOrA        => 0b111_0_010101,

            Computation::M           => 0b111_1_110000,
            Computation::NotM        => 0b111_1_110001,
            Computation::NegM        => 0b111_1_110011,
            Computation::MPlusOne    => 0b111_1_110111,
            Computation::MMinusOne   => 0b111_1_110010,
            Computation::DPlusM      => 0b111_1_000010,
            Computation::DMinusM     => 0b111_1_010011,
            Computation::MMinusD     => 0b111_1_000111,
            Computation::DAndM       => 0b111_1_000000,
            Computation::DOrM        => 0b111_1_010101,

            Computation::AShiftLeft  => 0b101_0_100000,
            Computation::DShiftLeft  => 0b101_0_110000,
            Computation::MShiftLeft  => 0b101_1_100000,
            Computation::AShiftRight => 0b101_0_000000,
            Computation::DShiftRight => 0b101_0_010000,
            Computation::MShiftRight => 0b101_1_000000,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Computation> {
        let comp = match bits {
            0b111_0_101010 => Computation::Zero,
            0b111_0_111111 => Computation::One,
            0b111_0_111010 => Computation::MinusOne,
            0b111_0_001100 => Computation::D,
            0b111_0_110000 => Computation::A,
            0b111_0_001101 => Computation::NotD,
            0b111_0_110001 => Computation::NotA,
            0b111_0_001111 => Computation::NegD,
            0b111_0_110011 => Computation::NegA,
            0b111_0_011111 => Computation::DPlusOne,
            0b111_0_110111 => Computation::APlusOne,
            0b111_0_001110 => Computation::DMinusOne,
            0b111_0_110010 => Computation::AMinusOne,
            0b111_0_000010 => Computation::DPlusA,
            0b111_0_010011 => Computation::DMinusA,
            0b111_0_000111 => Computation::AMinusD,
            0b111_0_000000 => Computation::DAndA,
            0b111_0_010101 => Computation::DOrA,

            0b111_1_110000 => Computation::M,
            0b111_1_110001 => Computation::NotM,
            0b111_1_110011 => Computation::NegM,
            0b111_1_110111 => Computation::MPlusOne,
            0b111_1_110010 => Computation::MMinusOne,
            0b111_1_000010 => Computation::DPlusM,
            0b111_1_010011 => Computation::DMinusM,
            0b111_1_000111 => Computation::MMinusD,
            0b111_1_000000 => Computation::DAndM,
            0b111_1_010101 => Computation::DOrM,

            0b101_0_100000 => Computation::AShiftLeft,
            0b101_0_110000 => Computation::DShiftLeft,
            0b101_1_100000 => Computation::MShiftLeft,
            0b101_0_000000 => Computation::AShiftRight,
            0b101_0_010000 => Computation::DShiftRight,
            0b101_1_000000 => Computation::MShiftRight,

            _ => return None,
        };

        Some(comp)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Computation::Zero        => "0",
            Computation::One         => "1",
            Computation::MinusOne    => "-1",
            Computation::D           => "D",
            Computation::A           => "A",
            Computation::NotD        => "!D",
            Computation::NotA        => "!A",
            Computation::NegD        => "-D",
            Computation::NegA        => "-A",
            Computation::DPlusOne    => "D+1",
            Computation::APlusOne    => "A+1",
            Computation::DMinusOne   => "D-1",
            Computation::AMinusOne   => "A-1",
            Computation::DPlusA      => "D+A",
            Computation::DMinusA     => "D-A",
            Computation::AMinusD     => "A-D",
            Computation::DAndA       => "D&A",
            Computation::DOrA        => "D|A",

            Computation::M           => "M",
            Computation::NotM        => "!M",
            Computation::NegM        => "-M",
            Computation::MPlusOne    => "M+1",
            Computation::MMinusOne   => "M-1",
            Computation::DPlusM      => "D+M",
            Computation::DMinusM     => "D-M",
            Computation::MMinusD     => "M-D",
            Computation::DAndM       => "D&M",
            Computation::DOrM        => "D|M",

            Computation::AShiftLeft  => "A<<",
            Computation::DShiftLeft  => "D<<",
            Computation::MShiftLeft  => "M<<",
            Computation::AShiftRight => "A>>",
            Computation::DShiftRight => "D>>",
            Computation::MShiftRight => "M>>",
        }
    }

    /// Returns true if the computation reads the memory word addressed by `A`.
    pub fn reads_memory(self) -> bool {
        self.bits() & 0b000_1_000000 != 0
    }

    /// Finds the known mnemonic closest to `input`, if it is within two edits.
    fn suggest(input: &str) -> Option<&'static str> {
        Computation::ALL
            .iter()
            .map(|comp| comp.mnemonic())
            .map(|mnemonic| (edit_distance::edit_distance(input, mnemonic), mnemonic))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, mnemonic)| mnemonic)
    }
}

impl FromStr for Computation {
    type Err = Error;

    fn from_str(input: &str) -> Result<Computation> {
        let comp = match input {
            "0"   => Computation::Zero,
            "1"   => Computation::One,
            "-1"  => Computation::MinusOne,
            "D"   => Computation::D,
            "A"   => Computation::A,
            "!D"  => Computation::NotD,
            "!A"  => Computation::NotA,
            "-D"  => Computation::NegD,
            "-A"  => Computation::NegA,
            "D+1" => Computation::DPlusOne,
            "A+1" => Computation::APlusOne,
            "D-1" => Computation::DMinusOne,
            "A-1" => Computation::AMinusOne,
            "D+A" => Computation::DPlusA,
            "D-A" => Computation::DMinusA,
            "A-D" => Computation::AMinusD,
            "D&A" => Computation::DAndA,
            "D|A" => Computation::DOrA,
            "M"   => Computation::M,
            "!M"  => Computation::NotM,
            "-M"  => Computation::NegM,
            "M+1" => Computation::MPlusOne,
            "M-1" => Computation::MMinusOne,
            "D+M" => Computation::DPlusM,
            "D-M" => Computation::DMinusM,
            "M-D" => Computation::MMinusD,
            "D&M" => Computation::DAndM,
            "D|M" => Computation::DOrM,
            "A<<" => Computation::AShiftLeft,
            "D<<" => Computation::DShiftLeft,
            "M<<" => Computation::MShiftLeft,
            "A>>" => Computation::AShiftRight,
            "D>>" => Computation::DShiftRight,
            "M>>" => Computation::MShiftRight,
            _ => {
                return Err(Error::new(ErrorKind::UnknownMnemonic {
                    field: Field::Comp,
                    mnemonic: input.to_string(),
                    suggestion: Computation::suggest(input),
                }));
            }
        };

        Ok(comp)
    }
}

impl fmt::Display for Computation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Describes the predicate of a (un)conditional jump. The predicate is tested against the
/// result of the computation as a signed 16-bit value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    /// No jump.
    Never,
    /// `JGT`
    Greater,
    /// `JEQ`
    Equal,
    /// `JGE`
    GreaterOrEqual,
    /// `JLT`
    Less,
    /// `JNE`
    NotEqual,
    /// `JLE`
    LessOrEqual,
    /// `JMP`
    Always,
}

impl Jump {
    pub fn bits(self) -> u16 {
        match self {
            Jump::Never          => 0b000,
            Jump::Greater        => 0b001,
            Jump::Equal          => 0b010,
            Jump::GreaterOrEqual => 0b011,
            Jump::Less           => 0b100,
            Jump::NotEqual       => 0b101,
            Jump::LessOrEqual    => 0b110,
            Jump::Always         => 0b111,
        }
    }

    pub fn from_bits(bits: u16) -> Jump {
        match bits & 0b111 {
            0b000 => Jump::Never,
            0b001 => Jump::Greater,
            0b010 => Jump::Equal,
            0b011 => Jump::GreaterOrEqual,
            0b100 => Jump::Less,
            0b101 => Jump::NotEqual,
            0b110 => Jump::LessOrEqual,
            _ => Jump::Always,
        }
    }

    pub fn mnemonic(self) -> Option<&'static str> {
        match self {
            Jump::Never          => None,
            Jump::Greater        => Some("JGT"),
            Jump::Equal          => Some("JEQ"),
            Jump::GreaterOrEqual => Some("JGE"),
            Jump::Less           => Some("JLT"),
            Jump::NotEqual       => Some("JNE"),
            Jump::LessOrEqual    => Some("JLE"),
            Jump::Always         => Some("JMP"),
        }
    }

    /// Returns true if a computation producing `value` makes the jump happen.
    pub fn test(self, value: i16) -> bool {
        match self {
            Jump::Never          => false,
            Jump::Greater        => value > 0,
            Jump::Equal          => value == 0,
            Jump::GreaterOrEqual => value >= 0,
            Jump::Less           => value < 0,
            Jump::NotEqual       => value != 0,
            Jump::LessOrEqual    => value <= 0,
            Jump::Always         => true,
        }
    }
}

impl FromStr for Jump {
    type Err = Error;

    fn from_str(input: &str) -> Result<Jump> {
        let jump = match input {
            "" | "null" | "NULL" => Jump::Never,
            "JGT" => Jump::Greater,
            "JEQ" => Jump::Equal,
            "JGE" => Jump::GreaterOrEqual,
            "JLT" => Jump::Less,
            "JNE" => Jump::NotEqual,
            "JLE" => Jump::LessOrEqual,
            "JMP" => Jump::Always,
            _ => {
                return Err(Error::new(ErrorKind::UnknownMnemonic {
                    field: Field::Jump,
                    mnemonic: input.to_string(),
                    suggestion: None,
                }));
            }
        };

        Ok(jump)
    }
}

/// Encodes the destination mnemonic of a compute instruction into its 3-bit field.
/// A missing destination encodes to `000`.
pub fn encode_dest(mnemonic: Option<&str>) -> Result<u16> {
    Ok(mnemonic.map(str::parse::<Dest>).transpose()?.unwrap_or_default().bits())
}

/// Encodes a computation mnemonic into its 10-bit field.
pub fn encode_comp(mnemonic: &str) -> Result<u16> {
    Ok(mnemonic.parse::<Computation>()?.bits())
}

/// Encodes the jump mnemonic of a compute instruction into its 3-bit field.
/// A missing jump encodes to `000`.
pub fn encode_jump(mnemonic: Option<&str>) -> Result<u16> {
    match mnemonic {
        Some(mnemonic) => Ok(mnemonic.parse::<Jump>()?.bits()),
        None => Ok(Jump::Never.bits()),
    }
}

/// A single Hack instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `@value`, loads a 15-bit value into the `A` register.
    Address(u16),

    /// `dest=comp;jump`
    Compute {
        dest: Dest,
        comp: Computation,
        jump: Jump,
    },
}

impl Instruction {
    /// Builds a compute instruction from its mnemonics.
    pub fn compute(dest: Option<&str>, comp: &str, jump: Option<&str>) -> Result<Instruction> {
        Ok(Instruction::Compute {
            dest: dest.map(str::parse).transpose()?.unwrap_or_default(),
            comp: comp.parse()?,
            jump: jump.map(str::parse).transpose()?.unwrap_or(Jump::Never),
        })
    }
}

impl From<Instruction> for u16 {
    fn from(instruction: Instruction) -> u16 {
        match instruction {
            Instruction::Address(address) => {
                debug_assert!(address <= MAX_ADDRESS, "address {} does not fit in 15 bits", address);
                address & MAX_ADDRESS
            }
            Instruction::Compute { dest, comp, jump } =>
                comp.bits() << 6 | dest.bits() << 3 | jump.bits(),
        }
    }
}

/// A word that does not decode into any instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidInstruction(pub u16);

impl fmt::Display for InvalidInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid instruction word {:016b}", self.0)
    }
}

impl TryFrom<u16> for Instruction {
    type Error = InvalidInstruction;

    fn try_from(word: u16) -> std::result::Result<Instruction, InvalidInstruction> {
        if word & 0x8000 == 0 {
            return Ok(Instruction::Address(word));
        }

        let comp = Computation::from_bits(word >> 6)
            .ok_or(InvalidInstruction(word))?;

        Ok(Instruction::Compute {
            dest: Dest::from_bits(word >> 3),
            comp,
            jump: Jump::from_bits(word),
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Address(address) => write!(f, "@{}", address),
            Instruction::Compute { dest, comp, jump } => {
                if !dest.is_null() {
                    write!(f, "{}=", dest)?;
                }

                write!(f, "{}", comp)?;

                if let Some(jump) = jump.mnemonic() {
                    write!(f, ";{}", jump)?;
                }

                Ok(())
            }
        }
    }
}

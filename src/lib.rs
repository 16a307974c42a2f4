//! A crate for translating programs of the stack-based Hack VM language down to the binary
//! machine code of the 16-bit Hack computer.
//!
//! Currently this crate provides the functionality to:
//! - Translate `.vm` files into Hack assembly, one translation unit per file.
//! - Assemble `.asm` files into the textual `.hack` binary format.
//! - Execute assembled programs in an emulator.
//!
//! The instruction set includes the shift extension: `A<<`, `D<<`, `M<<`, `A>>`, `D>>` and
//! `M>>` are accepted by the assembler and used by the `shiftleft` and `shiftright` VM
//! commands.
//!
//! # Example
//! ```
//! use hack_toolchain::{
//!     assemble,
//!     emulator::Emulator,
//!     translator::{translate_with_logger, Options},
//! };
//!
//! // Adds 7 and 8 on the stack.
//! let vm_source = r#"
//!     push constant 7
//!     push constant 8
//!     add
//! "#;
//!
//! // Translate the VM code into assembly, without the call to Sys.init.
//! let asm = translate_with_logger(vec![("Main", vm_source)], Options { bootstrap: false }, None)
//!     .expect("translation failed");
//!
//! // Assemble it and load the binary into an emulator.
//! let program = assemble(&asm).expect("assembly failed");
//! let mut emulator = Emulator::from_program(&program);
//!
//! // Point SP to the base of the stack and run until the program falls off the ROM.
//! emulator.memory.ram[0] = 256;
//! assert_eq!(emulator.run(1000), Ok(true));
//!
//! assert_eq!(emulator.stack_pointer(), 257);
//! assert_eq!(emulator.stack_top(), Some(15));
//! ```
//!
//! # Executables
//!
//! Both executables are behind the `tools` feature.
//!
//! ## `hackvm`
//!
//! Translates a single `.vm` file into a sibling `.asm` file, or every `.vm` file of a
//! directory `Dir` into `Dir/Dir.asm`.
//!
//! ## `hackasm`
//!
//! Assembles a single `.asm` file into a sibling `.hack` file, or every `.asm` file of a
//! directory.

pub mod parsing;
pub mod error;
pub mod instruction;
pub mod symbol_table;
pub mod source_map;
pub mod assembly;
pub mod binary;
pub mod assembler;
pub mod vm;
pub mod translator;
pub mod emulator;

pub use crate::assembler::assemble;
pub use crate::binary::Program;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::translator::translate;

#![allow(dead_code)]

use hack_toolchain::{
    assemble,
    emulator::{Emulator, Machine},
    translator::{translate_with_logger, Options, STACK_BASE},
};

pub const MAX_CYCLES: u64 = 1_000_000;

/// Translates, assembles and runs `units` until the program halts.
///
/// Without the bootstrap code `SP` is pointed to the base of the stack before running.
pub fn run_units(units: &[(&str, &str)], bootstrap: bool) -> Emulator<Machine> {
    run_with_setup(units, bootstrap, |_| ())
}

pub fn run_with_setup<F>(units: &[(&str, &str)], bootstrap: bool, setup: F) -> Emulator<Machine>
where
    F: FnOnce(&mut Emulator<Machine>),
{
    let asm = translate_with_logger(units.iter().cloned(), Options { bootstrap }, None)
        .expect("could not translate the units");

    let program = assemble(&asm).expect("could not assemble the translated code");

    let mut emulator = Emulator::from_program(&program);

    if !bootstrap {
        emulator.memory.ram[0] = STACK_BASE;
    }

    setup(&mut emulator);

    let halted = emulator.run(MAX_CYCLES).expect("emulation failed");
    assert!(halted, "the program did not halt in {} cycles", MAX_CYCLES);

    emulator
}

/// VM code that pushes `value`. Negative values are built with `neg` since constants are
/// limited to 0..=32767.
pub fn push(value: i16) -> String {
    if value >= 0 {
        format!("push constant {}\n", value)
    } else if value == i16::min_value() {
        "push constant 32767\nneg\npush constant 1\nsub\n".to_string()
    } else {
        format!("push constant {}\nneg\n", -value)
    }
}

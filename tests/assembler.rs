mod common;

use hack_toolchain::{
    assemble,
    assembler::{assemble_with_logger, Options, SymbolPolicy},
    emulator::Emulator,
    ErrorKind, Program,
};

use slog::{Logger, Drain, o};
use slog_term::{TermDecorator, FullFormat};

#[test]
fn test_max() {
    let program = assemble(include_str!("fixtures/Max.asm"))
        .expect("could not assemble the program");

    assert_eq!(program.to_text(), include_str!("fixtures/Max.hack"));
    assert_eq!(program.symbol_table.get_address("OUTPUT_FIRST").unwrap(), 10);
    assert_eq!(program.symbol_table.get_address("INFINITE_LOOP").unwrap(), 14);

    // @R1 on line 5 of the source is the third instruction.
    assert_eq!(program.source_map.get_source_location(2), Some(&5));
}

#[test]
fn test_max_with_logger() {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let program = assemble_with_logger(include_str!("fixtures/Max.asm"), Options::default(), logger)
        .expect("could not assemble the program");

    assert_eq!(program.len(), 16);
}

#[test]
fn test_parse_binary_text() {
    let program = Program::parse_text(include_str!("fixtures/Max.hack")).unwrap();
    let mut emulator = Emulator::from_program(&program);

    emulator.memory.ram[0] = 12;
    emulator.memory.ram[1] = 5;

    assert_eq!(emulator.run(100), Ok(true));
    assert_eq!(emulator.ram(2), 12);
}

#[test]
fn test_variables_follow_first_use() {
    let source = r#"
        @i
        M=1
        @sum
        M=0
    (LOOP)
        @i
        D=M
        @100
        D=D-A
        @END
        D;JGT
        @i
        D=M
        @sum
        M=D+M
        @i
        M=M+1
        @LOOP
        0;JMP
    (END)
        @END
        0;JMP
    "#;

    let program = assemble(source).unwrap();

    assert_eq!(program.words[0], 16);
    assert_eq!(program.words[2], 17);

    let mut emulator = Emulator::from_program(&program);
    assert_eq!(emulator.run(10_000), Ok(true));
    assert_eq!(emulator.ram(17), 5050);
}

#[test]
fn test_shift_instructions() {
    let program = assemble("@3\nD=A\nD=D<<\nM=D>>\nA=A>>\nD=M<<\n").unwrap();
    let text = program.to_text();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[2], "1010110000010000");
    assert_eq!(lines[3], "1010010000001000");
    assert_eq!(lines[4], "1010000000100000");
    assert_eq!(lines[5], "1011100000010000");
}

#[test]
fn test_deterministic() {
    let source = include_str!("fixtures/Max.asm");
    assert_eq!(assemble(source).unwrap().words, assemble(source).unwrap().words);
}

#[test]
fn test_errors() {
    let err = assemble("@0\nD=Q\n").unwrap_err();

    match err.kind() {
        ErrorKind::UnknownMnemonic { mnemonic, suggestion, .. } => {
            assert_eq!(mnemonic, "Q");
            assert!(suggestion.is_some());
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(err.line, Some(2));

    let err = assemble("@0\n0;JUMP\n").unwrap_err();
    assert!(err.to_string().contains("unknown jump mnemonic 'JUMP'"));

    let err = assemble("@40000\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::AddressOutOfRange { value: 40000 });

    let strict = Options { symbol_policy: SymbolPolicy::Strict };
    let err = assemble_with_logger("@counter\nM=0\n", strict, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownSymbol { name: "counter".into() });
}

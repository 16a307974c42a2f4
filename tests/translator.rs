mod common;

use common::{push, run_units, run_with_setup};

use hack_toolchain::{
    assemble,
    translator::{translate, translate_with_logger, Options},
    ErrorKind,
};

#[test]
fn test_simple_add() {
    let emulator = run_units(&[("SimpleAdd", include_str!("fixtures/SimpleAdd.vm"))], false);

    assert_eq!(emulator.stack_pointer(), 257);
    assert_eq!(emulator.ram(256), 15);
}

#[test]
fn test_simple_add_binary() {
    let asm = translate_with_logger(
        vec![("SimpleAdd", include_str!("fixtures/SimpleAdd.vm"))],
        Options { bootstrap: false },
        None,
    ).unwrap();

    let text = assemble(&asm).unwrap().to_text();
    let lines = text.lines().take(7).collect::<Vec<_>>();

    assert_eq!(lines, vec![
        "0000000000000111", // @7
        "1110110000010000", // D=A
        "0000000000000000", // @SP
        "1111110000100000", // A=M
        "1110001100001000", // M=D
        "0000000000000000", // @SP
        "1111110111001000", // M=M+1
    ]);
}

#[test]
fn test_comparisons() {
    let min = i16::min_value();
    let max = i16::max_value();

    let pairs = [
        (0, 0), (1, 0), (0, 1), (-1, 0), (0, -1), (-1, -1),
        (max, min), (min, max), (min, min), (max, max),
        (0, min), (min, 0), (-1, max), (max, -1), (1, min), (min, 1),
        (min + 1, min), (min, min + 1), (100, -100), (-100, 100), (-5, -3), (-3, -5),
    ];

    for &(x, y) in pairs.iter() {
        for &(op, expected) in [("eq", x == y), ("gt", x > y), ("lt", x < y)].iter() {
            let source = format!("{}{}{}\n", push(x), push(y), op);
            let emulator = run_units(&[("Main", source.as_str())], false);

            assert_eq!(emulator.stack_pointer(), 257, "{} {} {}", x, op, y);
            assert_eq!(
                emulator.stack_top(),
                Some(if expected { -1 } else { 0 }),
                "{} {} {}", x, op, y,
            );
        }
    }
}

#[test]
fn test_arithmetic_and_logic() {
    let source = format!(
        "{}{}sub\n{}{}and\n{}{}or\n{}not\n{}neg\n",
        push(5), push(9), push(12), push(10), push(12), push(3), push(0), push(-7),
    );

    let emulator = run_units(&[("Main", source.as_str())], false);

    assert_eq!(emulator.stack_pointer(), 261);
    assert_eq!(emulator.ram(256) as i16, -4);
    assert_eq!(emulator.ram(257), 8);
    assert_eq!(emulator.ram(258), 15);
    assert_eq!(emulator.ram(259) as i16, -1);
    assert_eq!(emulator.ram(260), 7);
}

#[test]
fn test_shifts() {
    let source = format!(
        "{}shiftleft\n{}shiftright\n{}shiftright\n{}shiftleft\n",
        push(5), push(-8), push(9), push(0x4001),
    );

    let emulator = run_units(&[("Main", source.as_str())], false);

    assert_eq!(emulator.ram(256), 10);
    assert_eq!(emulator.ram(257) as i16, -4);
    assert_eq!(emulator.ram(258), 4);
    assert_eq!(emulator.ram(259), 0x8002);
}

#[test]
fn test_pointer_segments() {
    let emulator = run_units(&[("PointerTest", include_str!("fixtures/PointerTest.vm"))], false);

    assert_eq!(emulator.stack_pointer(), 257);
    assert_eq!(emulator.ram(256), 6084);
    assert_eq!(emulator.ram(3), 3030);
    assert_eq!(emulator.ram(4), 3040);
    assert_eq!(emulator.ram(3032), 32);
    assert_eq!(emulator.ram(3046), 46);
}

#[test]
fn test_local_argument_and_temp() {
    let source = "push constant 10\npop local 0\npush constant 21\npop argument 2\n\
                  push constant 36\npop temp 6\npush local 0\npush argument 2\nadd\npush temp 6\nadd\n";

    let emulator = run_with_setup(&[("Main", source)], false, |emulator| {
        emulator.memory.ram[1] = 300;
        emulator.memory.ram[2] = 400;
    });

    assert_eq!(emulator.ram(300), 10);
    assert_eq!(emulator.ram(402), 21);
    assert_eq!(emulator.ram(11), 36);
    assert_eq!(emulator.stack_pointer(), 257);
    assert_eq!(emulator.ram(256), 67);
}

#[test]
fn test_call_restores_caller_frame() {
    let source = r#"
        push constant 10
        push constant 20
        call Main.add 2
    label DONE
        goto DONE

    function Main.add 2
        push local 0
        push local 1
        add
        pop temp 0
        push argument 0
        push argument 1
        add
        pop local 1
        push constant 5000
        pop pointer 0
        push constant 5100
        pop pointer 1
        push local 1
        return
    "#;

    let emulator = run_with_setup(&[("Main", source)], false, |emulator| {
        emulator.memory.ram[1] = 300;
        emulator.memory.ram[2] = 400;
        emulator.memory.ram[3] = 3000;
        emulator.memory.ram[4] = 3010;

        // Stale values where the callee's locals will live.
        emulator.memory.ram[5] = 99;
        emulator.memory.ram[263] = 77;
        emulator.memory.ram[264] = 88;
    });

    // Both arguments are replaced by the return value.
    assert_eq!(emulator.stack_pointer(), 257);
    assert_eq!(emulator.ram(256), 30);

    assert_eq!(emulator.ram(1), 300);
    assert_eq!(emulator.ram(2), 400);
    assert_eq!(emulator.ram(3), 3000);
    assert_eq!(emulator.ram(4), 3010);

    // The locals were zeroed on entry.
    assert_eq!(emulator.ram(5), 0);
}

#[test]
fn test_fibonacci() {
    let units = [
        ("Main", include_str!("fixtures/FibonacciElement/Main.vm")),
        ("Sys", include_str!("fixtures/FibonacciElement/Sys.vm")),
    ];

    let emulator = run_units(&units, true);

    assert_eq!(emulator.stack_pointer(), 262);
    assert_eq!(emulator.ram(261), 3);

    let sys = include_str!("fixtures/FibonacciElement/Sys.vm").replace("push constant 4", "push constant 12");
    let units = [("Main", units[0].1), ("Sys", sys.as_str())];

    let emulator = run_units(&units, true);
    assert_eq!(emulator.ram(261), 144);
}

#[test]
fn test_statics_are_per_unit() {
    let units = [
        ("Class1", include_str!("fixtures/StaticsTest/Class1.vm")),
        ("Class2", include_str!("fixtures/StaticsTest/Class2.vm")),
        ("Sys", include_str!("fixtures/StaticsTest/Sys.vm")),
    ];

    let emulator = run_units(&units, true);

    assert_eq!(emulator.stack_pointer(), 263);
    assert_eq!(emulator.ram(261) as i16, -2);
    assert_eq!(emulator.ram(262), 8);

    // Class1.0 and Class1.1 come before Class2.0 and Class2.1.
    assert_eq!(emulator.ram(16), 6);
    assert_eq!(emulator.ram(17), 8);
    assert_eq!(emulator.ram(18), 23);
    assert_eq!(emulator.ram(19), 15);
}

#[test]
fn test_loops_in_different_functions() {
    let source = r#"
    function Main.count 1
    label LOOP
        push local 0
        push constant 1
        add
        pop local 0
        push local 0
        push argument 0
        lt
        if-goto LOOP
        push local 0
        return

    function Main.twice 0
        push argument 0
    label LOOP
        push constant 1
        sub
        push constant 0
        return
    "#;

    let sys = "function Sys.init 0\npush constant 7\ncall Main.count 1\nlabel END\ngoto END\n";

    let emulator = run_units(&[("Main", source), ("Sys", sys)], true);

    assert_eq!(emulator.ram(261), 7);
}

#[test]
fn test_translation_errors() {
    let err = translate(vec![("Main", "push constant 1\npush that\n")]).unwrap_err();

    assert_eq!(err.unit.as_deref(), Some("Main"));
    assert_eq!(err.line, Some(2));

    match err.kind {
        ErrorKind::MalformedCommand { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }

    assert!(translate(vec![("Main", "pop pointer 2\n")]).is_err());
    assert!(translate(vec![("Main", "frobnicate\n")]).is_err());
}

#[test]
fn test_deterministic() {
    let units = vec![
        ("Main", include_str!("fixtures/FibonacciElement/Main.vm")),
        ("Sys", include_str!("fixtures/FibonacciElement/Sys.vm")),
    ];

    let first = translate(units.clone()).unwrap();
    let second = translate(units).unwrap();

    assert_eq!(first, second);
    assert_eq!(assemble(&first).unwrap().words, assemble(&second).unwrap().words);
}

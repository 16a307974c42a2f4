//! Translation of VM code into Hack assembly.
//!
//! The stack lives in RAM starting at address 256 and grows upwards; `SP` points to the
//! first free slot. `R13` and `R14` are used as scratch registers by the generated code.
//!
//! Every emitted compute instruction uses a mnemonic of the instruction set table, so the
//! output of the translator can always be fed to the assembler as is.

use std::fmt::Display;

use slog::{debug, o, trace, Discard, Logger};

use crate::error::{Error, ErrorExt, Result};
use crate::vm::{ArithmeticOp, Command, Parser, Segment};

/// The address the bootstrap code points `SP` to.
pub const STACK_BASE: u16 = 256;

const POINTER_BASE: u16 = 3;
const TEMP_BASE: u16 = 5;

/// Scope of labels generated before any translation unit has been selected.
const BOOTSTRAP_SCOPE: &str = "BOOTSTRAP";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Emit the code that initializes `SP` and calls `Sys.init`.
    pub bootstrap: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options { bootstrap: true }
    }
}

/// Assembly text under construction.
#[derive(Debug, Clone, Default)]
struct Asm {
    text: String,
}

impl Asm {
    fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn comment<T: Display>(&mut self, comment: T) {
        self.line(&format!("// {}", comment));
    }

    /// `@value`
    fn at<T: Display>(&mut self, value: T) {
        self.line(&format!("@{}", value));
    }

    /// `(label)`
    fn label<T: Display>(&mut self, label: T) {
        self.line(&format!("({})", label));
    }
}

/// `*SP = D; SP++`
fn push_d(asm: &mut Asm) {
    asm.at("SP");
    asm.line("A=M");
    asm.line("M=D");
    asm.at("SP");
    asm.line("M=M+1");
}

/// `SP--; D = *SP`, leaves `A` pointing at the popped slot.
fn pop_d(asm: &mut Asm) {
    asm.at("SP");
    asm.line("AM=M-1");
    asm.line("D=M");
}

/// Replaces the top of the stack with `comp` applied to it.
fn unary(asm: &mut Asm, comp: &str) {
    asm.at("SP");
    asm.line("A=M-1");
    asm.line(&format!("M={}", comp));
}

/// Pops `y`, then replaces `x` with `comp`, where `D` holds `y` and `M` holds `x`.
fn binary(asm: &mut Asm, comp: &str) {
    pop_d(asm);
    asm.line("A=A-1");
    asm.line(&format!("M={}", comp));
}

/// Labels of a single comparison.
struct ComparisonLabels {
    base: String,
}

impl ComparisonLabels {
    fn new(scope: &str, index: usize) -> ComparisonLabels {
        ComparisonLabels {
            base: format!("{}$cmp${}", scope, index),
        }
    }

    fn get(&self, tag: &str) -> String {
        format!("{}${}", self.base, tag)
    }
}

fn equality(asm: &mut Asm, labels: &ComparisonLabels) {
    let end = labels.get("END");

    pop_d(asm);
    asm.line("A=A-1");
    asm.line("D=M-D");
    asm.line("M=-1");
    asm.at(&end);
    asm.line("D;JEQ");
    asm.at("SP");
    asm.line("A=M-1");
    asm.line("M=0");
    asm.label(&end);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordering {
    Greater,
    Less,
}

/// `gt` and `lt`. `x - y` overflows when the operands have different signs, so the
/// operands are first dispatched on their sign bits and only subtracted when they agree.
fn ordering(asm: &mut Asm, labels: &ComparisonLabels, ordering: Ordering) {
    let y_negative = labels.get("Y_NEG");
    let same_sign = labels.get("SAME_SIGN");
    let is_true = labels.get("TRUE");
    let is_false = labels.get("FALSE");
    let end = labels.get("END");

    // x < 0 <= y, and y < 0 <= x
    let (x_low, x_high, jump) = match ordering {
        Ordering::Greater => (&is_false, &is_true, "JGT"),
        Ordering::Less => (&is_true, &is_false, "JLT"),
    };

    asm.at("SP");
    asm.line("A=M-1");
    asm.line("A=A-1");
    asm.line("D=M");
    asm.at("R13");
    asm.line("M=D");
    pop_d(asm);
    asm.at("R14");
    asm.line("M=D");

    asm.at(&y_negative);
    asm.line("D;JLT");
    asm.at("R13");
    asm.line("D=M");
    asm.at(x_low);
    asm.line("D;JLT");
    asm.at(&same_sign);
    asm.line("0;JMP");

    asm.label(&y_negative);
    asm.at("R13");
    asm.line("D=M");
    asm.at(x_high);
    asm.line("D;JGE");

    asm.label(&same_sign);
    asm.at("R13");
    asm.line("D=M");
    asm.at("R14");
    asm.line("D=D-M");
    asm.at(&is_true);
    asm.line(&format!("D;{}", jump));

    asm.label(&is_false);
    asm.at("SP");
    asm.line("A=M-1");
    asm.line("M=0");
    asm.at(&end);
    asm.line("0;JMP");

    asm.label(&is_true);
    asm.at("SP");
    asm.line("A=M-1");
    asm.line("M=-1");
    asm.label(&end);
}

/// The base pointer register of a segment addressed through a pointer.
fn base_register(segment: Segment) -> Option<&'static str> {
    match segment {
        Segment::Local => Some("LCL"),
        Segment::Argument => Some("ARG"),
        Segment::This => Some("THIS"),
        Segment::That => Some("THAT"),
        _ => None,
    }
}

/// Generates assembly for a sequence of VM commands.
///
/// Labels are scoped by the current unit and function. Return and comparison labels are
/// numbered with counters that keep growing across units, so every generated label is
/// unique within the output.
pub struct CodeGenerator {
    asm: Asm,
    unit: String,
    function: String,
    return_counter: usize,
    comparison_counter: usize,
    logger: Logger,
}

impl Default for CodeGenerator {
    fn default() -> CodeGenerator {
        CodeGenerator::new()
    }
}

impl CodeGenerator {
    pub fn new() -> CodeGenerator {
        CodeGenerator::with_logger(None)
    }

    pub fn with_logger<L: Into<Option<Logger>>>(logger: L) -> CodeGenerator {
        CodeGenerator {
            asm: Asm::default(),
            unit: String::new(),
            function: String::new(),
            return_counter: 0,
            comparison_counter: 0,
            logger: logger.into().unwrap_or(Logger::root(Discard, o!())),
        }
    }

    /// Selects the translation unit the following commands belong to. The unit name
    /// qualifies the `static` segment and labels. Resets the current function.
    pub fn set_unit<S: Into<String>>(&mut self, name: S) {
        self.unit = name.into();
        self.function.clear();

        debug!(self.logger, "begin unit"; "unit" => &self.unit);
    }

    /// The prefix of labels generated at this point.
    fn scope(&self) -> String {
        match (self.unit.is_empty(), self.function.is_empty()) {
            (true, true) => BOOTSTRAP_SCOPE.to_string(),
            (false, true) => self.unit.clone(),
            (true, false) => self.function.clone(),
            (false, false) => format!("{}.{}", self.unit, self.function),
        }
    }

    fn static_symbol(&self, index: u16) -> String {
        match self.unit.as_str() {
            "" => format!("{}.{}", BOOTSTRAP_SCOPE, index),
            unit => format!("{}.{}", unit, index),
        }
    }

    /// Sets `SP` to the base of the stack and calls `Sys.init`.
    pub fn write_bootstrap(&mut self) {
        self.asm.comment("bootstrap");
        self.asm.at(STACK_BASE);
        self.asm.line("D=A");
        self.asm.at("SP");
        self.asm.line("M=D");
        self.write_call("Sys.init", 0);
    }

    /// Writes `command`, preceded by a comment holding its VM text.
    pub fn write_command(&mut self, command: &Command) -> Result<()> {
        trace!(self.logger, "translate command"; "command" => %command);

        self.asm.comment(command);

        match command {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push(segment, index) => self.write_push(*segment, *index)?,
            Command::Pop(segment, index) => self.write_pop(*segment, *index)?,
            Command::Label(label) => self.write_label(label),
            Command::Goto(label) => self.write_goto(label),
            Command::IfGoto(label) => self.write_if_goto(label),
            Command::Function { name, locals } => self.write_function(name, *locals),
            Command::Call { name, args } => self.write_call(name, *args),
            Command::Return => self.write_return(),
        }

        Ok(())
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) {
        match op {
            ArithmeticOp::Add => binary(&mut self.asm, "D+M"),
            ArithmeticOp::Sub => binary(&mut self.asm, "M-D"),
            ArithmeticOp::And => binary(&mut self.asm, "D&M"),
            ArithmeticOp::Or => binary(&mut self.asm, "D|M"),
            ArithmeticOp::Neg => unary(&mut self.asm, "-M"),
            ArithmeticOp::Not => unary(&mut self.asm, "!M"),
            ArithmeticOp::ShiftLeft => unary(&mut self.asm, "M<<"),
            ArithmeticOp::ShiftRight => unary(&mut self.asm, "M>>"),
            ArithmeticOp::Eq => {
                let labels = self.next_comparison();
                equality(&mut self.asm, &labels);
            }
            ArithmeticOp::Gt => {
                let labels = self.next_comparison();
                ordering(&mut self.asm, &labels, Ordering::Greater);
            }
            ArithmeticOp::Lt => {
                let labels = self.next_comparison();
                ordering(&mut self.asm, &labels, Ordering::Less);
            }
        }
    }

    fn next_comparison(&mut self) -> ComparisonLabels {
        self.comparison_counter += 1;
        ComparisonLabels::new(&self.scope(), self.comparison_counter)
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<()> {
        segment.check_index(index)?;

        if let Some(base) = base_register(segment) {
            self.asm.at(index);
            self.asm.line("D=A");
            self.asm.at(base);
            self.asm.line("A=D+M");
            self.asm.line("D=M");
        } else if segment == Segment::Constant {
            self.asm.at(index);
            self.asm.line("D=A");
        } else {
            let address = self.direct_address(segment, index);

            self.asm.at(address);
            self.asm.line("D=M");
        }

        push_d(&mut self.asm);

        Ok(())
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<()> {
        segment.check_index(index)?;

        if let Some(base) = base_register(segment) {
            self.asm.at(index);
            self.asm.line("D=A");
            self.asm.at(base);
            self.asm.line("D=D+M");
            self.asm.at("R13");
            self.asm.line("M=D");
            pop_d(&mut self.asm);
            self.asm.at("R13");
            self.asm.line("A=M");
            self.asm.line("M=D");
        } else if segment == Segment::Constant {
            return Err(Error::malformed("cannot pop into the constant segment"));
        } else {
            let address = self.direct_address(segment, index);

            pop_d(&mut self.asm);
            self.asm.at(address);
            self.asm.line("M=D");
        }

        Ok(())
    }

    /// The symbol or address of a segment that is not addressed through a pointer.
    fn direct_address(&self, segment: Segment, index: u16) -> String {
        match segment {
            Segment::Pointer => (POINTER_BASE + index).to_string(),
            Segment::Temp => (TEMP_BASE + index).to_string(),
            _ => self.static_symbol(index),
        }
    }

    fn scoped_label(&self, label: &str) -> String {
        format!("{}${}", self.scope(), label)
    }

    pub fn write_label(&mut self, label: &str) {
        let label = self.scoped_label(label);
        self.asm.label(label);
    }

    pub fn write_goto(&mut self, label: &str) {
        let label = self.scoped_label(label);
        self.asm.at(label);
        self.asm.line("0;JMP");
    }

    pub fn write_if_goto(&mut self, label: &str) {
        let label = self.scoped_label(label);
        pop_d(&mut self.asm);
        self.asm.at(label);
        self.asm.line("D;JNE");
    }

    /// Declares a function and zeroes its local variables.
    pub fn write_function(&mut self, name: &str, locals: u16) {
        self.function = name.to_string();

        trace!(self.logger, "begin function"; "function" => name, "locals" => locals);

        self.asm.label(name);

        for _ in 0..locals {
            self.asm.at("SP");
            self.asm.line("A=M");
            self.asm.line("M=0");
            self.asm.at("SP");
            self.asm.line("M=M+1");
        }
    }

    /// Saves the caller's frame, repositions `ARG` and `LCL` and jumps to `name`.
    pub fn write_call(&mut self, name: &str, args: u16) {
        self.return_counter += 1;
        let return_label = format!("{}$ret${}", self.scope(), self.return_counter);

        self.asm.at(&return_label);
        self.asm.line("D=A");
        push_d(&mut self.asm);

        for register in &["LCL", "ARG", "THIS", "THAT"] {
            self.asm.at(register);
            self.asm.line("D=M");
            push_d(&mut self.asm);
        }

        // ARG = SP - 5 - args
        self.asm.at(args);
        self.asm.line("D=A");
        self.asm.at(5);
        self.asm.line("D=D+A");
        self.asm.at("SP");
        self.asm.line("D=M-D");
        self.asm.at("ARG");
        self.asm.line("M=D");

        self.asm.at("SP");
        self.asm.line("D=M");
        self.asm.at("LCL");
        self.asm.line("M=D");

        self.asm.at(name);
        self.asm.line("0;JMP");
        self.asm.label(&return_label);
    }

    /// Places the return value where the caller's arguments began, restores the
    /// caller's frame and jumps back to the return address.
    pub fn write_return(&mut self) {
        // R13 = frame, R14 = return address
        self.asm.at("LCL");
        self.asm.line("D=M");
        self.asm.at("R13");
        self.asm.line("M=D");
        self.asm.at(5);
        self.asm.line("A=D-A");
        self.asm.line("D=M");
        self.asm.at("R14");
        self.asm.line("M=D");

        // *ARG = pop(), SP = ARG + 1
        pop_d(&mut self.asm);
        self.asm.at("ARG");
        self.asm.line("A=M");
        self.asm.line("M=D");
        self.asm.line("D=A+1");
        self.asm.at("SP");
        self.asm.line("M=D");

        for register in &["THAT", "THIS", "ARG", "LCL"] {
            self.asm.at("R13");
            self.asm.line("AM=M-1");
            self.asm.line("D=M");
            self.asm.at(register);
            self.asm.line("M=D");
        }

        self.asm.at("R14");
        self.asm.line("A=M");
        self.asm.line("0;JMP");
    }

    pub fn finish(self) -> String {
        self.asm.text
    }
}

/// Translates VM translation units with the default options. Each unit is a pair of the
/// unit name and its source.
pub fn translate<'a, I>(units: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    translate_with_logger(units, Options::default(), None)
}

pub fn translate_with_logger<'a, I, L>(units: I, options: Options, logger: L) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "translation"));

    let mut generator = CodeGenerator::with_logger(logger.clone());

    if options.bootstrap {
        generator.write_bootstrap();
    }

    for (name, source) in units {
        let mut parser = Parser::parse(source)
            .context("parsing")
            .map_err(|err| err.in_unit(name))?;

        generator.set_unit(name);

        while let Some(entry) = parser.advance() {
            generator
                .write_command(&entry.command)
                .at_line(entry.line)
                .map_err(|err| err.in_unit(name))?;
        }
    }

    let output = generator.finish();

    debug!(logger, "translation finished"; "lines" => output.lines().count());

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn translate_unit(name: &str, source: &str) -> String {
        translate_with_logger(vec![(name, source)], Options { bootstrap: false }, None).unwrap()
    }

    fn code_lines(asm: &str) -> Vec<&str> {
        asm.lines().filter(|line| !line.starts_with("//")).collect()
    }

    #[test]
    fn test_push_constant() {
        let asm = translate_unit("Main", "push constant 7\n");

        assert_eq!(asm.lines().next(), Some("// push constant 7"));
        assert_eq!(code_lines(&asm), vec!["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
    }

    #[test]
    fn test_segment_addressing() {
        let asm = translate_unit("Main", "push temp 6\npop pointer 1\npush static 3\npop local 2\n");
        let lines = code_lines(&asm);

        assert_eq!(&lines[..2], &["@11", "D=M"]);
        assert!(lines.contains(&"@4"));
        assert!(lines.contains(&"@Main.3"));
        assert!(lines.contains(&"@LCL"));
    }

    #[test]
    fn test_labels_are_scoped() {
        let source = "function Main.f 0\nlabel LOOP\ngoto LOOP\nfunction Main.g 0\nlabel LOOP\n";
        let asm = translate_unit("Main", source);

        let code = code_lines(&asm).join("\n");

        assert!(code.contains("(Main.Main.f$LOOP)\n@Main.Main.f$LOOP\n0;JMP"));
        assert!(code.contains("(Main.Main.g$LOOP)"));
    }

    #[test]
    fn test_generated_labels_are_unique() {
        let units = vec![
            ("A", "push constant 1\npush constant 1\neq\ncall B.f 0\n"),
            ("B", "function B.f 0\npush constant 1\npush constant 2\nlt\ncall A.g 0\n"),
        ];

        let asm = translate_with_logger(units, Options::default(), None).unwrap();

        let mut labels = asm
            .lines()
            .filter(|line| line.starts_with('('))
            .collect::<Vec<_>>();
        let count = labels.len();

        labels.sort();
        labels.dedup();

        assert_eq!(labels.len(), count);
        assert!(asm.contains("(BOOTSTRAP$ret$1)"));
        assert!(asm.contains("(A$ret$2)"));
        assert!(asm.contains("(B.B.f$ret$3)"));
    }

    #[test]
    fn test_bootstrap() {
        let asm = translate(vec![("Sys", "function Sys.init 0\n")]).unwrap();
        let lines = code_lines(&asm);

        assert_eq!(&lines[..4], &["@256", "D=A", "@SP", "M=D"]);
        assert!(lines.contains(&"@Sys.init"));

        let asm = translate_unit("Sys", "function Sys.init 0\n");
        assert_eq!(code_lines(&asm), vec!["(Sys.init)"]);
    }

    #[test]
    fn test_errors_name_unit_and_line() {
        let units = vec![("Main", "push constant 1\n"), ("Util", "push constant 1\npop constant 0\n")];
        let err = translate(units).unwrap_err();

        assert_eq!(err.unit.as_deref(), Some("Util"));
        assert_eq!(err.line, Some(2));
        assert!(err.to_string().starts_with("Util:2: "));
    }

    #[test]
    fn test_rejects_unassemblable_operands() {
        let source = "function Main.f 0\npush constant 0\nreturn\nfunction Main.main 0\ncall Main.f 40000\n";
        let err = translate(vec![("Main", source)]).unwrap_err();

        assert!(matches!(err.kind, ErrorKind::MalformedCommand { .. }));
        assert_eq!(err.line, Some(5));

        let err = translate(vec![("Main", "function Main.3 0\npop static 3\n")]).unwrap_err();

        assert!(matches!(err.kind, ErrorKind::MalformedCommand { .. }));
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_deterministic() {
        let source = "function Main.main 1\npush constant 3\npush local 0\ngt\nreturn\n";

        assert_eq!(
            translate(vec![("Main", source)]).unwrap(),
            translate(vec![("Main", source)]).unwrap(),
        );
    }
}

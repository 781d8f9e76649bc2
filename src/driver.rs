//! Statement driver: one parse/generate/emit cycle per input line.
//!
//! The driver sits in `Ready` until the input runs out, then writes the
//! shutdown sequence and moves to `Halted`. A fatal error writes whatever
//! the statement had already emitted, appends `EXIT 1` and also halts; no
//! further input is read after that.

use std::io::{BufRead, Write};

use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::asm::{self, Instruction};
use crate::codegen;
use crate::config::Config;
use crate::context::Context;
use crate::error::{CompileResult, IoSnafu};
use crate::parser::{Statement, parse_statement};
use crate::symbol::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
  Ready,
  Halted,
}

pub struct Driver<R, W> {
  input: R,
  output: W,
  context: Context,
  raw: Vec<u8>,
  line: String,
  line_no: usize,
  state: DriverState,
  dump_ast: bool,
}

impl<R: BufRead, W: Write> Driver<R, W> {
  pub fn new(input: R, output: W, config: &Config) -> Self {
    Self {
      input,
      output,
      context: Context::new(SymbolTable::with_capacity(config.symbol_capacity)),
      raw: Vec::new(),
      line: String::new(),
      line_no: 0,
      state: DriverState::Ready,
      dump_ast: config.dump_ast,
    }
  }

  pub fn state(&self) -> DriverState {
    self.state
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  /// The line most recently read, newline included.
  pub fn current_line(&self) -> &str {
    &self.line
  }

  /// 1-based number of the line most recently read.
  pub fn line_number(&self) -> usize {
    self.line_no
  }

  pub fn into_output(self) -> W {
    self.output
  }

  /// Process statements until the driver halts.
  pub fn run(&mut self) -> CompileResult<()> {
    while self.step()? == DriverState::Ready {}
    Ok(())
  }

  /// Read, compile and emit exactly one line.
  pub fn step(&mut self) -> CompileResult<DriverState> {
    if self.state == DriverState::Halted {
      return Ok(DriverState::Halted);
    }

    self.context.begin_statement();
    self.read_line()?;

    let mut code = Vec::new();
    let outcome = self.translate(&mut code);
    self.emit(&code)?;

    match outcome {
      Ok(true) => {
        info!(lines = self.line_no, "end of input");
        if self.dump_ast {
          eprint!("{}", self.context.symbols.listing());
        }
        self.emit(&asm::shutdown_sequence())?;
        self.state = DriverState::Halted;
      }
      Ok(false) => {}
      Err(err) => {
        warn!(line = self.line_no, error = %err, "fatal error");
        self.emit(&asm::failure_sequence())?;
        self.state = DriverState::Halted;
        self.output.flush().context(IoSnafu)?;
        return Err(err);
      }
    }

    self.output.flush().context(IoSnafu)?;
    Ok(self.state)
  }

  /// Input is an opaque byte stream; bytes that are not UTF-8 decode to
  /// U+FFFD and lex as unknown tokens.
  fn read_line(&mut self) -> CompileResult<()> {
    self.raw.clear();
    if self.input.read_until(b'\n', &mut self.raw).context(IoSnafu)? > 0 {
      self.line_no += 1;
    }
    self.line = String::from_utf8_lossy(&self.raw).into_owned();
    Ok(())
  }

  /// Returns `true` once the end of the stream is reached.
  fn translate(&mut self, code: &mut Vec<Instruction>) -> CompileResult<bool> {
    match parse_statement(&self.line)? {
      Statement::EndOfStream => Ok(true),
      Statement::Empty => Ok(false),
      Statement::Expr(node) => {
        debug!(line = self.line_no, ast = %node, "parsed statement");
        if self.dump_ast {
          eprintln!("{node}");
        }
        let value = codegen::generate(&node, &mut self.context, code)?;
        debug!(value, registers = self.context.registers.live(), "evaluated");
        Ok(false)
      }
    }
  }

  fn emit(&mut self, code: &[Instruction]) -> CompileResult<()> {
    for instr in code {
      writeln!(self.output, "{instr}").context(IoSnafu)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CompileError;

  fn driver(input: &str) -> Driver<&[u8], Vec<u8>> {
    Driver::new(input.as_bytes(), Vec::new(), &Config::default())
  }

  fn output(driver: Driver<&[u8], Vec<u8>>) -> String {
    String::from_utf8(driver.into_output()).unwrap()
  }

  #[test]
  fn steps_one_line_at_a_time() {
    let mut d = driver("x = 2\n\ny = x\n");
    assert_eq!(d.step().unwrap(), DriverState::Ready);
    assert_eq!(d.current_line(), "x = 2\n");
    assert_eq!(d.context().registers.live(), 1);
    assert_eq!(d.step().unwrap(), DriverState::Ready);
    assert_eq!(d.context().registers.live(), 0);
    assert_eq!(d.step().unwrap(), DriverState::Ready);
    assert_eq!(d.line_number(), 3);
    assert_eq!(d.step().unwrap(), DriverState::Halted);
    assert_eq!(d.step().unwrap(), DriverState::Halted);
    assert_eq!(
      output(d),
      "MOV r0 2\nMOV [0] r0\nMOV r0 [0]\nMOV [4] r0\nMOV r0 [0]\nMOV r1 [4]\nMOV r2 [8]\nEXIT 0\n"
    );
  }

  #[test]
  fn fatal_error_halts_without_reading_on() {
    let mut d = driver("x = 1\n(1+2\nx = 3\n");
    let err = d.run().unwrap_err();
    assert!(matches!(err, CompileError::MismatchedParen { .. }));
    assert_eq!(d.state(), DriverState::Halted);
    assert_eq!(d.line_number(), 2);
    assert_eq!(d.current_line(), "(1+2\n");
    assert_eq!(d.context().symbols.get("x").unwrap(), 1);
    assert_eq!(output(d), "MOV r0 1\nMOV [0] r0\nEXIT 1\n");
  }

  #[test]
  fn partial_code_precedes_failure_marker() {
    let mut d = driver("y = 3 + 1/0\n");
    assert!(matches!(d.run(), Err(CompileError::DivideByZero)));
    assert_eq!(output(d), "MOV r0 3\nMOV r1 1\nMOV r2 0\nEXIT 1\n");
  }

  #[test]
  fn invalid_utf8_is_a_program_error() {
    let mut d = Driver::new(&b"x = 1\n\xff = 2\n"[..], Vec::new(), &Config::default());
    let err = d.run().unwrap_err();
    assert!(!err.is_io());
    assert!(matches!(err, CompileError::NotNumberOrIdentifier { loc: 0, .. }));
    assert_eq!(d.line_number(), 2);
    assert_eq!(output(d), "MOV r0 1\nMOV [0] r0\nEXIT 1\n");
  }

  #[test]
  fn symbol_capacity_comes_from_config() {
    let config = Config {
      symbol_capacity: 4,
      ..Config::default()
    };
    let mut d = Driver::new("a = 1\nb = 2\n".as_bytes(), Vec::new(), &config);
    assert!(matches!(
      d.run(),
      Err(CompileError::TableExhausted { capacity: 4, .. })
    ));
    assert_eq!(d.line_number(), 2);
  }
}

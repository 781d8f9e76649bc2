//! Instruction set of the target register machine.
//!
//! Registers are unbounded (`r0`, `r1`, ...) and memory is a flat array of
//! 4-byte slots addressed as `[offset]`.

use std::fmt;

use crate::parser::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Reg(usize),
  Imm(i32),
  Mem(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
  Mov(Operand, Operand),
  Binary(BinaryOp, usize, usize),
  Exit(i32),
}

impl Instruction {
  pub fn load_imm(reg: usize, value: i32) -> Self {
    Self::Mov(Operand::Reg(reg), Operand::Imm(value))
  }

  pub fn load(reg: usize, offset: usize) -> Self {
    Self::Mov(Operand::Reg(reg), Operand::Mem(offset))
  }

  pub fn store(offset: usize, reg: usize) -> Self {
    Self::Mov(Operand::Mem(offset), Operand::Reg(reg))
  }
}

impl BinaryOp {
  pub fn mnemonic(self) -> &'static str {
    match self {
      BinaryOp::Add => "ADD",
      BinaryOp::Sub => "SUB",
      BinaryOp::Mul => "MUL",
      BinaryOp::Div => "DIV",
      BinaryOp::And => "AND",
      BinaryOp::Or => "OR",
      BinaryOp::Xor => "XOR",
    }
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Reg(n) => write!(f, "r{n}"),
      Operand::Imm(value) => write!(f, "{value}"),
      Operand::Mem(offset) => write!(f, "[{offset}]"),
    }
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instruction::Mov(dst, src) => write!(f, "MOV {dst} {src}"),
      Instruction::Binary(op, lhs, rhs) => write!(f, "{} r{lhs} r{rhs}", op.mnemonic()),
      Instruction::Exit(code) => write!(f, "EXIT {code}"),
    }
  }
}

/// Reload the builtin variables into `r0..r2` and exit successfully.
pub fn shutdown_sequence() -> [Instruction; 4] {
  [
    Instruction::load(0, 0),
    Instruction::load(1, 4),
    Instruction::load(2, 8),
    Instruction::Exit(0),
  ]
}

pub fn failure_sequence() -> [Instruction; 1] {
  [Instruction::Exit(1)]
}

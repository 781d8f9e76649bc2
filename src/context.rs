//! Interpreter state shared by the parse/generate cycle of a run.
//!
//! The symbol table lives for the whole run; the register counter and the
//! identifier-seen flag are per statement and reset by [`Context::begin_statement`].

use crate::symbol::SymbolTable;

/// Virtual register allocator for an idealized infinite-register machine.
/// Registers are never reused within a statement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCounter {
  next: usize,
}

impl RegisterCounter {
  /// Number of live registers.
  pub fn live(&self) -> usize {
    self.next
  }

  /// Materialize a value into a fresh register and return its number.
  pub fn alloc(&mut self) -> usize {
    let reg = self.next;
    self.next += 1;
    reg
  }

  /// The most recently allocated register.
  pub fn top(&self) -> usize {
    self.next.saturating_sub(1)
  }

  /// Consume the two most recent registers, leaving the result in the lower one.
  pub fn combine(&mut self) -> (usize, usize) {
    debug_assert!(self.next >= 2, "binary operation needs two live registers");
    let rhs = self.top();
    let lhs = rhs.saturating_sub(1);
    self.next = rhs;
    (lhs, rhs)
  }

  pub fn reset(&mut self) {
    self.next = 0;
  }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
  pub symbols: SymbolTable,
  pub registers: RegisterCounter,
  /// Set once any variable has been read in the current statement.
  pub identifier_seen: bool,
}

impl Context {
  pub fn new(symbols: SymbolTable) -> Self {
    Self {
      symbols,
      registers: RegisterCounter::default(),
      identifier_seen: false,
    }
  }

  pub fn begin_statement(&mut self) {
    self.registers.reset();
    self.identifier_seen = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn combine_consumes_two_produces_one() {
    let mut regs = RegisterCounter::default();
    assert_eq!(regs.alloc(), 0);
    assert_eq!(regs.alloc(), 1);
    assert_eq!(regs.alloc(), 2);
    assert_eq!(regs.combine(), (1, 2));
    assert_eq!(regs.live(), 2);
    assert_eq!(regs.combine(), (0, 1));
    assert_eq!(regs.live(), 1);
    assert_eq!(regs.top(), 0);
  }

  #[test]
  fn begin_statement_resets_per_statement_state() {
    let mut ctx = Context::default();
    ctx.registers.alloc();
    ctx.identifier_seen = true;
    ctx.symbols.set("w", 3).unwrap();

    ctx.begin_statement();
    assert_eq!(ctx.registers.live(), 0);
    assert!(!ctx.identifier_seen);
    assert_eq!(ctx.symbols.get("w").unwrap(), 3);
  }
}

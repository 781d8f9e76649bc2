//! Fixed-capacity symbol table mapping variable names to their current value.
//!
//! Entries are append-only and addressed by slot; slot `i` lives at memory
//! offset `i * 4` on the target machine. The first three slots are always
//! `x`, `y` and `z`, which the shutdown sequence reloads into `r0..r2`.

use snafu::ensure;
use tracing::debug;

use crate::error::{CompileResult, NotFoundSnafu, TableExhaustedSnafu};

pub const DEFAULT_CAPACITY: usize = 64;
pub const SLOT_WIDTH: usize = 4;
pub const BUILTIN_NAMES: [&str; 3] = ["x", "y", "z"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
  pub name: String,
  pub value: i32,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
  entries: Vec<Symbol>,
  capacity: usize,
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::with_capacity(DEFAULT_CAPACITY)
  }
}

impl SymbolTable {
  /// Build a table seeded with the builtin variables. The capacity never
  /// drops below the number of builtins.
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = capacity.max(BUILTIN_NAMES.len());
    let mut entries = Vec::with_capacity(capacity);
    entries.extend(BUILTIN_NAMES.iter().map(|name| Symbol {
      name: (*name).to_string(),
      value: 0,
    }));
    Self { entries, capacity }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn is_full(&self) -> bool {
    self.entries.len() >= self.capacity
  }

  /// Bound symbols in slot order.
  pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
    self.entries.iter()
  }

  /// One `name [offset] = value` line per bound symbol.
  pub fn listing(&self) -> String {
    self
      .iter()
      .enumerate()
      .map(|(slot, symbol)| {
        format!("{} [{}] = {}\n", symbol.name, offset(slot), symbol.value)
      })
      .collect()
  }

  pub fn slot(&self, name: &str) -> Option<usize> {
    self.entries.iter().position(|symbol| symbol.name == name)
  }

  /// Read a variable. Reading a name that was never assigned is fatal.
  pub fn get(&self, name: &str) -> CompileResult<i32> {
    if let Some(slot) = self.slot(name) {
      return Ok(self.entries[slot].value);
    }
    ensure!(
      !self.is_full(),
      TableExhaustedSnafu {
        name,
        capacity: self.capacity,
      }
    );
    NotFoundSnafu { name }.fail()
  }

  /// Write a variable, binding it in the next free slot on first use.
  pub fn set(&mut self, name: &str, value: i32) -> CompileResult<i32> {
    if let Some(slot) = self.slot(name) {
      self.entries[slot].value = value;
      return Ok(value);
    }
    ensure!(
      !self.is_full(),
      TableExhaustedSnafu {
        name,
        capacity: self.capacity,
      }
    );
    debug!(name, slot = self.entries.len(), "binding new variable");
    self.entries.push(Symbol {
      name: name.to_string(),
      value,
    });
    Ok(value)
  }
}

/// Memory offset of a slot on the target machine.
pub fn offset(slot: usize) -> usize {
  slot * SLOT_WIDTH
}

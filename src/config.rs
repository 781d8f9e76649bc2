use crate::symbol::DEFAULT_CAPACITY;

/// Run options for a [`Driver`](crate::driver::Driver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Maximum number of variables, builtins included.
  pub symbol_capacity: usize,
  /// Print each statement's AST in prefix notation to stderr, and the
  /// symbol table once the input ends.
  pub dump_ast: bool,
  /// Print a diagnostic to stderr when a fatal error ends the run.
  pub diagnostics: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      symbol_capacity: DEFAULT_CAPACITY,
      dump_ast: false,
      diagnostics: true,
    }
  }
}

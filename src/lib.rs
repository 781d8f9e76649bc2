//! Crate root: wires together the compilation pipeline.
//!
//! Each input line is one statement and flows through the same stages:
//! - `tokenizer` splits the line into tokens on demand.
//! - `parser` builds the expression AST, deciding assignment by lookahead.
//! - `codegen` evaluates the tree and lowers it to `asm` instructions,
//!   reading and writing variables through the `symbol` table held in the
//!   `context`.
//! - `driver` repeats the cycle per line and writes the shutdown or failure
//!   sequence at the end.
//! - `error` holds the single error type shared by every stage.

pub mod asm;
pub mod codegen;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod parser;
pub mod symbol;
pub mod tokenizer;

pub use config::Config;
pub use driver::{Driver, DriverState};
pub use error::{CompileError, CompileResult};

/// Run a whole program held in memory, returning everything written to the
/// output together with the error that ended the run, if any.
pub fn transduce(source: &str, config: &Config) -> (String, CompileResult<()>) {
  let mut driver = Driver::new(source.as_bytes(), Vec::new(), config);
  let result = driver.run();
  let output = String::from_utf8_lossy(&driver.into_output()).into_owned();
  (output, result)
}

//! Shared error type for the whole pipeline.
//!
//! Every error is fatal to the run: the driver appends the failure marker
//! and stops reading input. Errors that point at a column of the current
//! line can be rendered in the chibicc caret style with [`CompileError::report`].

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("expected an identifier after \"{op}\", but got \"{got}\""))]
  Undefined {
    op: String,
    got: String,
    loc: usize,
  },

  #[snafu(display("expected \")\", but got \"{got}\""))]
  MismatchedParen { got: String, loc: usize },

  #[snafu(display("expected a number or identifier, but got \"{got}\""))]
  NotNumberOrIdentifier { got: String, loc: usize },

  #[snafu(display("integer literal \"{text}\" does not fit in 32 bits"))]
  LiteralOutOfRange { text: String, loc: usize },

  #[snafu(display("variable \"{name}\" is read before it is assigned"))]
  NotFound { name: String },

  #[snafu(display("symbol table is full ({capacity} entries), cannot bind \"{name}\""))]
  TableExhausted { name: String, capacity: usize },

  #[snafu(display("left-hand side of \"{op}\" is not assignable"))]
  NotLValue { op: String, loc: usize },

  #[snafu(display("division by zero in a constant expression"))]
  DivideByZero,

  #[snafu(display("unexpected token \"{got}\""))]
  SyntaxError { got: String, loc: usize },

  #[snafu(display("I/O error: {source}"))]
  Io { source: std::io::Error },
}

impl CompileError {
  /// Byte offset in the statement line the error is anchored at, if any.
  pub fn loc(&self) -> Option<usize> {
    match self {
      Self::Undefined { loc, .. }
      | Self::MismatchedParen { loc, .. }
      | Self::NotNumberOrIdentifier { loc, .. }
      | Self::LiteralOutOfRange { loc, .. }
      | Self::NotLValue { loc, .. }
      | Self::SyntaxError { loc, .. } => Some(*loc),
      Self::NotFound { .. } | Self::TableExhausted { .. } | Self::DivideByZero | Self::Io { .. } => {
        None
      }
    }
  }

  /// `true` for failures of the host rather than of the program being compiled.
  pub fn is_io(&self) -> bool {
    matches!(self, Self::Io { .. })
  }

  /// Render the error against the statement line it came from, pointing at
  /// the offending byte with a caret when a location is known.
  pub fn report(&self, line: &str) -> String {
    let line = line.trim_end_matches('\n');
    let Some(loc) = self.loc() else {
      return format!("'{line}'\n{self}");
    };
    // Columns count chars, shifted by one for the opening quote; a location
    // on the stripped newline lands under the closing quote.
    let column = line[..loc.min(line.len())].chars().count() + 1;
    format!("'{line}'\n{:column$}^ {self}", "")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_points_at_location() {
    let err = CompileError::MismatchedParen {
      got: "\\n".to_string(),
      loc: 4,
    };
    assert_eq!(err.report("(1+2\n"), "'(1+2'\n     ^ expected \")\", but got \"\\n\"");
  }

  #[test]
  fn report_without_location_shows_message_only() {
    let err = CompileError::DivideByZero;
    assert_eq!(
      err.report("x = 1/0\n"),
      "'x = 1/0'\ndivision by zero in a constant expression"
    );
    assert!(!err.is_io());
  }
}

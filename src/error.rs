//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose – these routines format
//! messages in a style reminiscent of chibicc, pointing at the offending
//! byte with a caret. Lexical and syntactic failures are distinct variants
//! so callers can tell which stage rejected the input, but both render the
//! same way.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  /// The tokenizer hit a character it does not recognise.
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  Lex {
    expr_line: String,
    marker: String,
    message: String,
  },

  /// The parser expected a token class that was not there.
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  Syntax {
    expr_line: String,
    marker: String,
    message: String,
  },
}

impl CompileError {
  /// Lexical error anchored at a specific byte offset in the source.
  pub fn lex_at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let (expr_line, marker) = render_location(expr, loc);
    Self::Lex {
      expr_line,
      marker,
      message: message.into(),
    }
  }

  /// Syntax error anchored at a specific byte offset in the source.
  pub fn syntax_at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let (expr_line, marker) = render_location(expr, loc);
    Self::Syntax {
      expr_line,
      marker,
      message: message.into(),
    }
  }
}

/// Quote the source line and build a caret marker pointing at `loc`.
fn render_location(expr: &str, loc: usize) -> (String, String) {
  let expr_line = format!("'{expr}'");
  let safe_loc = loc.min(expr.len());
  let char_offset = expr[..safe_loc].chars().count() + 1; // account for opening quote
  let marker = format!("{}^", " ".repeat(char_offset));
  (expr_line, marker)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn caret_lands_under_the_offending_column() {
    let err = CompileError::lex_at("1 + $", 4, "invalid token: '$'");
    let rendered = err.to_string();
    let mut lines = rendered.lines();
    assert_eq!(lines.next(), Some("'1 + $'"));
    // Four source chars plus the opening quote puts the caret in column 5.
    assert_eq!(lines.next(), Some("     ^ invalid token: '$'"));
  }

  #[test]
  fn offset_past_the_end_is_clamped() {
    let err = CompileError::syntax_at("1 +", 5, "expected a number");
    let rendered = err.to_string();
    assert_eq!(rendered.lines().nth(1), Some("    ^ expected a number"));
  }
}

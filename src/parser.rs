//! Recursive-descent parser producing a binary-operator expression AST.
//!
//! The parser mirrors the classic chibicc structure: a precedence-climbing
//! set of helpers, one per grammar level, each looping greedily over the
//! operators at its own level so every chain of same-precedence operators
//! comes out left-leaning.
//!
//! Two normalizations happen here rather than in the code generator:
//! `a > b` is stored as `b < a` (and `a >= b` as `b <= a`), and unary minus
//! becomes a subtraction from zero. The `BinaryOp` enum therefore has no
//! greater-than tags at all, which is what lets the generator handle only
//! two relational cases.

use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind, describe_token, token_text};

/// Binary operators that can appear in a parsed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Eq,
  Ne,
  Lt,
  Le,
}

/// Expression tree produced by the parser. Every internal node owns exactly
/// two children; leaves carry their literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: i64,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// Parse a single expression from the token stream, consuming all input.
pub fn parse(tokens: Vec<Token>, source: &str) -> CompileResult<AstNode> {
  let mut stream = TokenStream::new(tokens, source);

  if stream.is_eof() {
    return Err(CompileError::syntax_at(source, 0, "expression is empty"));
  }

  let node = parse_expr(&mut stream)?;

  if !stream.is_eof() {
    let token = stream.current().ok_or_else(|| {
      CompileError::syntax_at(
        source,
        source.len(),
        "unexpected end of input after expression",
      )
    })?;
    let got = describe_token(Some(token), source);
    return Err(CompileError::syntax_at(
      source,
      token.loc,
      format!("unexpected token \"{got}\""),
    ));
  }

  Ok(node)
}

fn parse_expr(stream: &mut TokenStream) -> CompileResult<AstNode> {
  parse_equality(stream)
}

fn parse_equality(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_relational(stream)?;

  loop {
    let op_str = match stream
      .peek()
      .filter(|token| token.kind == TokenKind::Punctuator)
      .map(|token| token_text(token, stream.source))
    {
      Some(symbol @ "==") => symbol,
      Some(symbol @ "!=") => symbol,
      _ => break,
    };

    let op = match op_str {
      "==" => BinaryOp::Eq,
      "!=" => BinaryOp::Ne,
      _ => unreachable!(),
    };

    stream.skip(op_str)?;
    let rhs = parse_relational(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_relational(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_add(stream)?;

  loop {
    let op_str = match stream
      .peek()
      .filter(|token| token.kind == TokenKind::Punctuator)
      .map(|token| token_text(token, stream.source))
    {
      Some(symbol @ "<") => symbol,
      Some(symbol @ "<=") => symbol,
      Some(symbol @ ">") => symbol,
      Some(symbol @ ">=") => symbol,
      _ => break,
    };

    stream.skip(op_str)?;
    let rhs = parse_add(stream)?;

    // `>` and `>=` are normalized away by swapping operands, so the rest of
    // the pipeline only ever sees `<` and `<=`.
    node = match op_str {
      "<" => AstNode::binary(BinaryOp::Lt, node, rhs),
      "<=" => AstNode::binary(BinaryOp::Le, node, rhs),
      ">" => AstNode::binary(BinaryOp::Lt, rhs, node),
      ">=" => AstNode::binary(BinaryOp::Le, rhs, node),
      _ => unreachable!(),
    };
  }

  Ok(node)
}

fn parse_add(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_mul(stream)?;

  loop {
    let op_str = match stream
      .peek()
      .filter(|token| token.kind == TokenKind::Punctuator)
      .map(|token| token_text(token, stream.source))
    {
      Some(symbol @ "+") => symbol,
      Some(symbol @ "-") => symbol,
      _ => break,
    };

    let op = match op_str {
      "+" => BinaryOp::Add,
      "-" => BinaryOp::Sub,
      _ => unreachable!(),
    };

    stream.skip(op_str)?;
    let rhs = parse_mul(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_mul(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_unary(stream)?;

  loop {
    let op_str = match stream
      .peek()
      .filter(|token| token.kind == TokenKind::Punctuator)
      .map(|token| token_text(token, stream.source))
    {
      Some(symbol @ "*") => symbol,
      Some(symbol @ "/") => symbol,
      Some(symbol @ "%") => symbol,
      _ => break,
    };

    let op = match op_str {
      "*" => BinaryOp::Mul,
      "/" => BinaryOp::Div,
      "%" => BinaryOp::Mod,
      _ => unreachable!(),
    };

    stream.skip(op_str)?;
    let rhs = parse_unary(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_unary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.equal("+") {
    return parse_primary(stream);
  }

  // Unary minus is represented as `0 - operand` so the generator never needs
  // a dedicated negation instruction.
  if stream.equal("-") {
    let operand = parse_primary(stream)?;
    return Ok(AstNode::binary(BinaryOp::Sub, AstNode::number(0), operand));
  }

  parse_primary(stream)
}

fn parse_primary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.equal("(") {
    let node = parse_expr(stream)?;
    stream.skip(")")?;
    return Ok(node);
  }

  let (value, _) = stream.get_number()?;
  Ok(AstNode::number(value))
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
}

impl<'a> TokenStream<'a> {
  /// Take ownership of the token stream; the parser will advance `pos` as it consumes input.
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn current(&self) -> Option<&Token> {
    self.peek()
  }

  /// Consume the current token if it matches the provided punctuator.
  fn equal(&mut self, op: &str) -> bool {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Punctuator
      && token.len == op.len()
      && token_text(token, self.source) == op
    {
      self.pos += 1;
      return true;
    }
    false
  }

  fn skip(&mut self, s: &str) -> CompileResult<()> {
    if self.equal(s) {
      Ok(())
    } else {
      let (loc, got) = match self.tokens.get(self.pos) {
        Some(token) => (token.loc, describe_token(Some(token), self.source)),
        None => (self.source.len(), "EOF".to_string()),
      };
      Err(CompileError::syntax_at(
        self.source,
        loc,
        format!("expected \"{s}\", but got \"{got}\""),
      ))
    }
  }

  /// Parse the current token as an integer literal returning its value and location.
  fn get_number(&mut self) -> CompileResult<(i64, usize)> {
    if self.pos >= self.tokens.len() {
      return Err(CompileError::syntax_at(
        self.source,
        self.source.len(),
        "expected a number, but reached end of input",
      ));
    }

    if let Some(token) = self.tokens.get(self.pos)
      && token.kind == TokenKind::Num
    {
      let value = token.value.ok_or_else(|| {
        CompileError::syntax_at(
          self.source,
          token.loc,
          "internal error: numeric token missing value",
        )
      })?;
      let loc = token.loc;
      self.pos += 1;
      return Ok((value, loc));
    }

    let Some(token) = self.tokens.get(self.pos) else {
      return Err(CompileError::syntax_at(
        self.source,
        self.source.len(),
        "unexpected end of input while parsing number",
      ));
    };
    let got = describe_token(Some(token), self.source);
    Err(CompileError::syntax_at(
      self.source,
      token.loc,
      format!("expected a number, but got \"{got}\""),
    ))
  }

  fn is_eof(&self) -> bool {
    matches!(self.peek().map(|token| token.kind), Some(TokenKind::Eof))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn parse_source(source: &str) -> CompileResult<AstNode> {
    parse(tokenize(source)?, source)
  }

  fn num(value: i64) -> AstNode {
    AstNode::number(value)
  }

  fn bin(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::binary(op, lhs, rhs)
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let node = parse_source("1 + 2 * 3").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Add, num(1), bin(BinaryOp::Mul, num(2), num(3)))
    );
  }

  #[test]
  fn parentheses_override_precedence() {
    let node = parse_source("(1 + 2) * 3").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Mul, bin(BinaryOp::Add, num(1), num(2)), num(3))
    );
  }

  #[test]
  fn subtraction_chain_leans_left() {
    let node = parse_source("10 - 2 - 3").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Sub, bin(BinaryOp::Sub, num(10), num(2)), num(3))
    );
  }

  #[test]
  fn unary_minus_becomes_zero_minus_operand() {
    let node = parse_source("-3 + 5").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Add, bin(BinaryOp::Sub, num(0), num(3)), num(5))
    );
  }

  #[test]
  fn unary_plus_is_discarded() {
    assert_eq!(parse_source("+7").unwrap(), parse_source("7").unwrap());
  }

  #[test]
  fn greater_than_swaps_into_less_than() {
    // `a > b` and `b < a` must produce the same tree.
    assert_eq!(
      parse_source("5 > 3").unwrap(),
      parse_source("3 < 5").unwrap()
    );
    assert_eq!(
      parse_source("5 >= 3").unwrap(),
      bin(BinaryOp::Le, num(3), num(5))
    );
  }

  #[test]
  fn relational_sits_below_equality() {
    let node = parse_source("1 < 2 == 1").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Eq, bin(BinaryOp::Lt, num(1), num(2)), num(1))
    );
  }

  #[test]
  fn modulo_parses_at_multiplicative_level() {
    let node = parse_source("7 % 2 + 1").unwrap();
    assert_eq!(
      node,
      bin(BinaryOp::Add, bin(BinaryOp::Mod, num(7), num(2)), num(1))
    );
  }

  #[test]
  fn missing_operand_is_a_syntax_error() {
    let err = parse_source("1 +").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert!(err.to_string().contains("expected a number"));
  }

  #[test]
  fn unmatched_parenthesis_is_a_syntax_error() {
    let err = parse_source("(1 + 2").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert!(err.to_string().contains("expected \")\""));
  }

  #[test]
  fn trailing_token_is_rejected() {
    let err = parse_source("1 2").unwrap_err();
    assert!(err.to_string().contains("unexpected token \"2\""));
  }

  #[test]
  fn empty_input_is_rejected() {
    let err = parse_source("").unwrap_err();
    assert!(err.to_string().contains("expression is empty"));
  }
}

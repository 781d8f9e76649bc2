//! Recursive-descent parser producing one statement's expression AST.
//!
//! Each precedence level is its own helper and folds same-level operators
//! into a left-leaning tree. The only lookahead beyond the current token is
//! the assignment check: an identifier starts an assignment only when the
//! token after it is `=`, `+=` or `-=`, which is decided by peeking into the
//! token buffer before anything is consumed.

use std::collections::VecDeque;
use std::fmt;

use snafu::{OptionExt, ensure};

use crate::error::{
  CompileResult, LiteralOutOfRangeSnafu, MismatchedParenSnafu, NotLValueSnafu,
  NotNumberOrIdentifierSnafu, SyntaxSnafu, UndefinedSnafu,
};
use crate::tokenizer::{Lexer, Token, TokenKind, describe_token, token_text};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  And,
  Or,
  Xor,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::And => "&",
      BinaryOp::Or => "|",
      BinaryOp::Xor => "^",
    }
  }

  fn additive(text: &str) -> Self {
    if text.starts_with('+') {
      BinaryOp::Add
    } else {
      BinaryOp::Sub
    }
  }

  fn multiplicative(text: &str) -> Self {
    if text == "*" {
      BinaryOp::Mul
    } else {
      BinaryOp::Div
    }
  }
}

/// Every form that writes back to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
  Assign,
  AddAssign,
  SubAssign,
  Increment,
  Decrement,
}

impl AssignOp {
  pub fn symbol(self) -> &'static str {
    match self {
      AssignOp::Assign => "=",
      AssignOp::AddAssign => "+=",
      AssignOp::SubAssign => "-=",
      AssignOp::Increment => "++",
      AssignOp::Decrement => "--",
    }
  }

  /// The arithmetic applied to the variable's old value before the store,
  /// or `None` for a plain assignment.
  pub fn arithmetic(self) -> Option<BinaryOp> {
    match self {
      AssignOp::Assign => None,
      AssignOp::AddAssign | AssignOp::Increment => Some(BinaryOp::Add),
      AssignOp::SubAssign | AssignOp::Decrement => Some(BinaryOp::Sub),
    }
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: i32,
  },
  Var {
    name: String,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
  Assign {
    op: AssignOp,
    name: String,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i32) -> Self {
    Self::Num { value }
  }

  pub fn var(name: impl Into<String>) -> Self {
    Self::Var { name: name.into() }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  pub fn assign(op: AssignOp, name: impl Into<String>, rhs: AstNode) -> Self {
    Self::Assign {
      op,
      name: name.into(),
      rhs: Box::new(rhs),
    }
  }
}

/// Prefix rendering, e.g. `= x + 1 2`.
impl fmt::Display for AstNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AstNode::Num { value } => write!(f, "{value}"),
      AstNode::Var { name } => write!(f, "{name}"),
      AstNode::Binary { op, lhs, rhs } => write!(f, "{} {lhs} {rhs}", op.symbol()),
      AstNode::Assign { op, name, rhs } => write!(f, "{} {name} {rhs}", op.symbol()),
    }
  }
}

/// What one input line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
  Expr(AstNode),
  Empty,
  EndOfStream,
}

/// Parse a single statement line.
pub fn parse_statement(source: &str) -> CompileResult<Statement> {
  let mut stream = TokenStream::new(source);

  match stream.peek().kind {
    TokenKind::EndOfStream => return Ok(Statement::EndOfStream),
    TokenKind::End => return Ok(Statement::Empty),
    _ => {}
  }

  let expr = parse_assign(&mut stream)?;

  let token = stream.peek();
  if token.is_terminator() {
    return Ok(Statement::Expr(expr));
  }
  match token.kind {
    TokenKind::Assign | TokenKind::AddSubAssign => NotLValueSnafu {
      op: stream.text(&token),
      loc: token.loc,
    }
    .fail(),
    _ => SyntaxSnafu {
      got: stream.describe(&token),
      loc: token.loc,
    }
    .fail(),
  }
}

fn parse_assign(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.peek().kind == TokenKind::Ident {
    let next = stream.peek_nth(1);
    let op = match next.kind {
      TokenKind::Assign => Some(AssignOp::Assign),
      TokenKind::AddSubAssign if stream.text(&next) == "+=" => Some(AssignOp::AddAssign),
      TokenKind::AddSubAssign => Some(AssignOp::SubAssign),
      _ => None,
    };

    if let Some(op) = op {
      let ident = stream.advance();
      let name = stream.text(&ident);
      stream.advance();
      let rhs = parse_assign(stream)?;
      return Ok(AstNode::assign(op, name, rhs));
    }
  }

  parse_or(stream)
}

fn parse_or(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_xor(stream)?;

  while stream.consume(TokenKind::Or).is_some() {
    let rhs = parse_xor(stream)?;
    node = AstNode::binary(BinaryOp::Or, node, rhs);
  }

  Ok(node)
}

fn parse_xor(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_and(stream)?;

  while stream.consume(TokenKind::Xor).is_some() {
    let rhs = parse_and(stream)?;
    node = AstNode::binary(BinaryOp::Xor, node, rhs);
  }

  Ok(node)
}

fn parse_and(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_add(stream)?;

  while stream.consume(TokenKind::And).is_some() {
    let rhs = parse_add(stream)?;
    node = AstNode::binary(BinaryOp::And, node, rhs);
  }

  Ok(node)
}

fn parse_add(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_mul(stream)?;

  while let Some(token) = stream.consume(TokenKind::AddSub) {
    let op = BinaryOp::additive(stream.text(&token));
    let rhs = parse_mul(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_mul(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_unary(stream)?;

  while let Some(token) = stream.consume(TokenKind::MulDiv) {
    let op = BinaryOp::multiplicative(stream.text(&token));
    let rhs = parse_unary(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

/// Unary `+`/`-` become a binary operation against an implicit zero.
fn parse_unary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if let Some(token) = stream.consume(TokenKind::AddSub) {
    let op = BinaryOp::additive(stream.text(&token));
    let operand = parse_unary(stream)?;
    return Ok(AstNode::binary(op, AstNode::number(0), operand));
  }

  parse_primary(stream)
}

fn parse_primary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let token = stream.advance();
  let text = stream.text(&token);

  match token.kind {
    TokenKind::Num => {
      let value = text
        .parse::<i32>()
        .ok()
        .context(LiteralOutOfRangeSnafu {
          text,
          loc: token.loc,
        })?;
      Ok(AstNode::number(value))
    }
    TokenKind::Ident => Ok(AstNode::var(text)),
    TokenKind::IncDec => {
      let op = if text == "++" {
        AssignOp::Increment
      } else {
        AssignOp::Decrement
      };
      let target = stream.peek();
      ensure!(
        target.kind == TokenKind::Ident,
        UndefinedSnafu {
          op: text,
          got: stream.describe(&target),
          loc: target.loc,
        }
      );
      stream.advance();
      Ok(AstNode::assign(op, stream.text(&target), AstNode::number(1)))
    }
    TokenKind::LParen => {
      let node = parse_assign(stream)?;
      let close = stream.peek();
      ensure!(
        close.kind == TokenKind::RParen,
        MismatchedParenSnafu {
          got: stream.describe(&close),
          loc: close.loc,
        }
      );
      stream.advance();
      Ok(node)
    }
    _ => NotNumberOrIdentifierSnafu {
      got: stream.describe(&token),
      loc: token.loc,
    }
    .fail(),
  }
}

/// Lazily-filled token buffer over the lexer, allowing arbitrary lookahead
/// without consuming anything.
struct TokenStream<'a> {
  lexer: Lexer<'a>,
  lookahead: VecDeque<Token>,
}

impl<'a> TokenStream<'a> {
  fn new(source: &'a str) -> Self {
    Self {
      lexer: Lexer::new(source),
      lookahead: VecDeque::with_capacity(2),
    }
  }

  fn peek_nth(&mut self, n: usize) -> Token {
    while self.lookahead.len() <= n {
      let token = self.lexer.next_token();
      self.lookahead.push_back(token);
    }
    self.lookahead[n]
  }

  fn peek(&mut self) -> Token {
    self.peek_nth(0)
  }

  fn advance(&mut self) -> Token {
    let token = self.peek();
    self.lookahead.pop_front();
    token
  }

  /// Consume the current token if it has the given kind.
  fn consume(&mut self, kind: TokenKind) -> Option<Token> {
    if self.peek().kind == kind {
      Some(self.advance())
    } else {
      None
    }
  }

  fn text(&self, token: &Token) -> &'a str {
    token_text(token, self.lexer.source())
  }

  fn describe(&self, token: &Token) -> String {
    describe_token(token, self.lexer.source())
  }
}

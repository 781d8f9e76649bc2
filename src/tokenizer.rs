//! Lexical analysis: turns one input line into tokens on demand.
//!
//! The lexer knows nothing about the grammar. It is pulled one token at a
//! time by the parser, which owns all lookahead. A line handed to the lexer
//! normally ends with `\n`; a line that simply runs out of bytes means the
//! underlying stream ended.

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  /// Newline, the statement terminator.
  End,
  EndOfStream,
  Num,
  Ident,
  AddSub,
  MulDiv,
  Assign,
  AddSubAssign,
  IncDec,
  LParen,
  RParen,
  And,
  Or,
  Xor,
  Unknown,
}

/// A classified lexeme, addressed by byte range in its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  pub fn new(kind: TokenKind, loc: usize, len: usize) -> Self {
    Self { kind, loc, len }
  }

  pub fn is_terminator(&self) -> bool {
    matches!(self.kind, TokenKind::End | TokenKind::EndOfStream)
  }
}

/// Cursor over a single statement line.
pub struct Lexer<'a> {
  source: &'a str,
  pos: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Self {
    Self { source, pos: 0 }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  fn peek_byte(&self) -> Option<u8> {
    self.source.as_bytes().get(self.pos).copied()
  }

  fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
    while self.peek_byte().is_some_and(&pred) {
      self.pos += 1;
    }
  }

  /// Produce the next token. Once the line is exhausted every further call
  /// yields `EndOfStream`.
  pub fn next_token(&mut self) -> Token {
    self.eat_while(|c| c == b' ' || c == b'\t');

    let start = self.pos.min(self.source.len());
    let Some(c) = self.peek_byte() else {
      return Token::new(TokenKind::EndOfStream, start, 0);
    };
    self.pos += 1;

    let kind = match c {
      b'0'..=b'9' => {
        self.eat_while(|c| c.is_ascii_digit());
        TokenKind::Num
      }
      b'+' | b'-' => match self.peek_byte() {
        Some(next) if next == c => {
          self.pos += 1;
          TokenKind::IncDec
        }
        Some(b'=') => {
          self.pos += 1;
          TokenKind::AddSubAssign
        }
        _ => TokenKind::AddSub,
      },
      b'*' | b'/' => TokenKind::MulDiv,
      b'=' => TokenKind::Assign,
      b'(' => TokenKind::LParen,
      b')' => TokenKind::RParen,
      b'&' => TokenKind::And,
      b'|' => TokenKind::Or,
      b'^' => TokenKind::Xor,
      b'\n' => TokenKind::End,
      c if c.is_ascii_alphabetic() || c == b'_' => {
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        TokenKind::Ident
      }
      _ => {
        // Keep the token on a char boundary so `token_text` can slice it.
        let width = self.source[start..].chars().next().map_or(1, char::len_utf8);
        self.pos = start + width;
        TokenKind::Unknown
      }
    };

    Token::new(kind, start, self.pos - start)
  }
}

impl Iterator for Lexer<'_> {
  type Item = Token;

  /// Yields tokens up to and including the first terminator.
  fn next(&mut self) -> Option<Token> {
    if self.pos > self.source.len() {
      return None;
    }
    let token = self.next_token();
    if token.is_terminator() {
      // Park the cursor past the end so iteration stops after the terminator.
      self.pos = self.source.len() + 1;
    }
    Some(token)
  }
}

/// Spelling of a token inside the line it was lexed from. Terminators are
/// either the newline itself or empty.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  &source[token.loc..token.loc + token.len]
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token, source: &str) -> String {
  match token.kind {
    TokenKind::End => "\\n".to_string(),
    TokenKind::EndOfStream => "EOF".to_string(),
    _ => token_text(token, source).to_string(),
  }
}

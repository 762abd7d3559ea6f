//! Recursive-descent parser for subscription filters.
//!
//! ```text
//! or      := and ("or" and)*
//! and     := unary ("and" unary)*
//! unary   := "not" unary | primary
//! primary := "(" or ")" | "all" | call | field op literal
//! call    := ("contains" | "match") "(" field "," literal ")"
//! ```

use outpost_mapping::Path;

use crate::error::FilterError;
use crate::filter::{CompareOp, Filter, Literal};
use crate::lexer::{Spanned, Token, tokenize};

pub(crate) fn parse(source: &str) -> Result<Filter, FilterError> {
  let tokens = tokenize(source)?;
  if tokens.is_empty() {
    return Err(FilterError::Empty);
  }

  let mut parser = Parser { tokens, pos: 0 };
  let filter = parser.parse_or()?;

  match parser.peek() {
    None => Ok(filter),
    Some((token, span)) => Err(FilterError::UnexpectedToken {
      found: token.describe(),
      expected: "end of filter",
      offset: span.start,
    }),
  }
}

struct Parser {
  tokens: Vec<Spanned>,
  pos: usize,
}

impl Parser {
  fn peek(&self) -> Option<&Spanned> {
    self.tokens.get(self.pos)
  }

  fn advance(&mut self) -> Option<Spanned> {
    let token = self.tokens.get(self.pos).cloned();
    if token.is_some() {
      self.pos += 1;
    }
    token
  }

  /// Consume the next token if it equals `expected`.
  fn consume(&mut self, expected: &Token) -> bool {
    match self.peek() {
      Some((token, _)) if token == expected => {
        self.pos += 1;
        true
      }
      _ => false,
    }
  }

  fn expect(&mut self, expected: Token, description: &'static str) -> Result<(), FilterError> {
    match self.advance() {
      Some((token, _)) if token == expected => Ok(()),
      Some((token, span)) => Err(unexpected(&token, span.start, description)),
      None => Err(FilterError::UnexpectedEnd {
        expected: description,
      }),
    }
  }

  fn parse_or(&mut self) -> Result<Filter, FilterError> {
    let mut lhs = self.parse_and()?;
    while self.consume(&Token::Or) {
      let rhs = self.parse_and()?;
      lhs = Filter::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
  }

  fn parse_and(&mut self) -> Result<Filter, FilterError> {
    let mut lhs = self.parse_unary()?;
    while self.consume(&Token::And) {
      let rhs = self.parse_unary()?;
      lhs = Filter::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
  }

  fn parse_unary(&mut self) -> Result<Filter, FilterError> {
    if self.consume(&Token::Not) {
      let inner = self.parse_unary()?;
      return Ok(Filter::Not(Box::new(inner)));
    }
    self.parse_primary()
  }

  fn parse_primary(&mut self) -> Result<Filter, FilterError> {
    let Some((token, span)) = self.advance() else {
      return Err(FilterError::UnexpectedEnd {
        expected: "expression",
      });
    };

    match token {
      Token::LParen => {
        let inner = self.parse_or()?;
        self.expect(Token::RParen, "')'")?;
        Ok(inner)
      }
      Token::All => Ok(Filter::All),
      Token::Ident(name) if self.consume(&Token::LParen) => self.parse_call(name),
      Token::Ident(name) => {
        let field = field_path(&name)?;
        let op = match self.advance() {
          Some((Token::Eq, _)) => CompareOp::Eq,
          Some((Token::NotEq, _)) => CompareOp::NotEq,
          Some((other, span)) => return Err(unexpected(&other, span.start, "'=' or '!='")),
          None => {
            return Err(FilterError::UnexpectedEnd {
              expected: "'=' or '!='",
            });
          }
        };
        let value = self.parse_literal()?;
        Ok(Filter::Compare { field, op, value })
      }
      other => Err(unexpected(&other, span.start, "expression")),
    }
  }

  /// Parse the arguments of `name(` up to and including the closing paren.
  fn parse_call(&mut self, name: String) -> Result<Filter, FilterError> {
    let field = match self.advance() {
      Some((Token::Ident(field), _)) => field_path(&field)?,
      Some((other, span)) => return Err(unexpected(&other, span.start, "field name")),
      None => {
        return Err(FilterError::UnexpectedEnd {
          expected: "field name",
        });
      }
    };
    self.expect(Token::Comma, "','")?;
    let argument = self.parse_literal()?;
    self.expect(Token::RParen, "')'")?;

    match name.as_str() {
      "contains" => Ok(Filter::Contains {
        field,
        needle: argument,
      }),
      "match" => match argument {
        Literal::String(pattern) => Ok(Filter::Match { field, pattern }),
        _ => Err(FilterError::UnexpectedToken {
          found: format!("{argument:?}"),
          expected: "string pattern",
          offset: 0,
        }),
      },
      _ => Err(FilterError::UnknownFunction { name }),
    }
  }

  fn parse_literal(&mut self) -> Result<Literal, FilterError> {
    match self.advance() {
      Some((Token::String(value), _)) => Ok(Literal::String(value)),
      Some((Token::Number(value), _)) => Ok(Literal::Number(value)),
      Some((Token::True, _)) => Ok(Literal::Bool(true)),
      Some((Token::False, _)) => Ok(Literal::Bool(false)),
      Some((Token::Null, _)) => Ok(Literal::Null),
      Some((other, span)) => Err(unexpected(&other, span.start, "literal")),
      None => Err(FilterError::UnexpectedEnd { expected: "literal" }),
    }
  }
}

fn unexpected(token: &Token, offset: usize, expected: &'static str) -> FilterError {
  FilterError::UnexpectedToken {
    found: token.describe(),
    expected,
    offset,
  }
}

/// Filter fields name envelope members relative to the event root.
fn field_path(name: &str) -> Result<Path, FilterError> {
  Path::parse(&format!("$.{name}")).map_err(|source| FilterError::InvalidField {
    field: name.to_string(),
    source,
  })
}

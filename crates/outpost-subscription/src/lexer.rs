use std::ops::Range;

use logos::Logos;

use crate::error::FilterError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum Token {
  #[token("and")]
  And,
  #[token("or")]
  Or,
  #[token("not")]
  Not,
  #[token("true")]
  True,
  #[token("false")]
  False,
  #[token("null")]
  Null,
  #[token("all")]
  All,

  /// Field reference, possibly dotted: `context.page.url`.
  #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*", |lex| lex.slice().to_string())]
  Ident(String),

  #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
  #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
  String(String),

  #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
  Number(f64),

  #[token("=")]
  Eq,
  #[token("!=")]
  NotEq,
  #[token("(")]
  LParen,
  #[token(")")]
  RParen,
  #[token(",")]
  Comma,
}

impl Token {
  /// Short description used in error messages.
  pub(crate) fn describe(&self) -> String {
    match self {
      Token::And => "and".to_string(),
      Token::Or => "or".to_string(),
      Token::Not => "not".to_string(),
      Token::True => "true".to_string(),
      Token::False => "false".to_string(),
      Token::Null => "null".to_string(),
      Token::All => "all".to_string(),
      Token::Ident(name) => name.clone(),
      Token::String(value) => format!("\"{value}\""),
      Token::Number(value) => value.to_string(),
      Token::Eq => "=".to_string(),
      Token::NotEq => "!=".to_string(),
      Token::LParen => "(".to_string(),
      Token::RParen => ")".to_string(),
      Token::Comma => ",".to_string(),
    }
  }
}

pub(crate) type Spanned = (Token, Range<usize>);

/// Tokenize a filter expression.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, FilterError> {
  let mut lex = Token::lexer(source);
  let mut tokens = Vec::new();

  while let Some(result) = lex.next() {
    let span = lex.span();
    match result {
      Ok(token) => tokens.push((token, span)),
      Err(()) => {
        return Err(FilterError::InvalidToken {
          text: source[span.clone()].to_string(),
          offset: span.start,
        });
      }
    }
  }

  Ok(tokens)
}

/// Strip the surrounding quotes and resolve backslash escapes.
fn unescape(quoted: &str) -> String {
  let inner = &quoted[1..quoted.len() - 1];
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      match chars.next() {
        Some('n') => out.push('\n'),
        Some('t') => out.push('\t'),
        Some(other) => out.push(other),
        None => {}
      }
    } else {
      out.push(c);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(source: &str) -> Vec<Token> {
    tokenize(source)
      .unwrap()
      .into_iter()
      .map(|(token, _)| token)
      .collect()
  }

  #[test]
  fn test_tokenize_compound_filter() {
    assert_eq!(
      kinds(r#"type = "track" or type != 'page'"#),
      vec![
        Token::Ident("type".to_string()),
        Token::Eq,
        Token::String("track".to_string()),
        Token::Or,
        Token::Ident("type".to_string()),
        Token::NotEq,
        Token::String("page".to_string()),
      ]
    );
  }

  #[test]
  fn test_keywords_are_not_prefixes() {
    assert_eq!(
      kinds("android = order"),
      vec![
        Token::Ident("android".to_string()),
        Token::Eq,
        Token::Ident("order".to_string()),
      ]
    );
  }

  #[test]
  fn test_dotted_ident_and_number() {
    assert_eq!(
      kinds("properties.total = -12.5"),
      vec![
        Token::Ident("properties.total".to_string()),
        Token::Eq,
        Token::Number(-12.5),
      ]
    );
  }

  #[test]
  fn test_string_escapes() {
    assert_eq!(
      kinds(r#""say \"hi\"""#),
      vec![Token::String("say \"hi\"".to_string())]
    );
  }

  #[test]
  fn test_invalid_token() {
    let err = tokenize("type = \"track\" & x").unwrap_err();
    assert!(matches!(err, FilterError::InvalidToken { .. }));
  }
}

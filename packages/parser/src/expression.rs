//! Classification of braced JSX expressions
//!
//! Only the shapes the serializer emits are understood structurally. Anything
//! else is kept verbatim as [`Expression::Opaque`]; classification never fails.

use crate::tokenizer::{tokenize, unquote, Token};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `{}` or a comment-only expression
    Empty,
    Bool(bool),
    Str(String),
    Number(f64),
    Identifier(String),
    /// Member chain, e.g. `props.label` or `props["Button Label"]`
    Member(Vec<String>),
    /// Object literal with entries in source order
    Object(Vec<(String, Expression)>),
    Opaque(String),
}

impl Expression {
    /// Classify the text between a pair of braces
    pub fn classify(raw: &str) -> Expression {
        let source = raw.trim();
        let Some(tokens) = tokenize(source) else {
            return Expression::Opaque(source.to_string());
        };
        if tokens.is_empty() {
            return Expression::Empty;
        }

        let mut cursor = Cursor {
            source,
            tokens: &tokens,
            pos: 0,
        };
        match cursor.value() {
            Some(expr) if cursor.at_end() => expr,
            _ => Expression::Opaque(source.to_string()),
        }
    }

    /// `["props", "label"]` for `props.label`
    pub fn member_path(&self) -> Option<&[String]> {
        match self {
            Expression::Member(segments) => Some(segments),
            _ => None,
        }
    }
}

struct Cursor<'a, 'src> {
    source: &'src str,
    tokens: &'a [(Token<'src>, Range<usize>)],
    pos: usize,
}

impl<'a, 'src> Cursor<'a, 'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t);
        self.pos += 1;
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn value(&mut self) -> Option<Expression> {
        let expr = match self.peek()?.clone() {
            Token::String(s) | Token::SingleQuoteString(s) => {
                self.advance();
                Expression::Str(unquote(s))
            }
            Token::Number(n) => {
                self.advance();
                Expression::Number(n.parse().ok()?)
            }
            Token::Minus => {
                self.advance();
                match self.advance()? {
                    Token::Number(n) => Expression::Number(-n.parse::<f64>().ok()?),
                    _ => return None,
                }
            }
            Token::True => {
                self.advance();
                Expression::Bool(true)
            }
            Token::False => {
                self.advance();
                Expression::Bool(false)
            }
            Token::LBrace => self.object()?,
            Token::Ident(name) => {
                self.advance();
                self.member_chain(name)?
            }
            _ => return None,
        };
        Some(expr)
    }

    fn member_chain(&mut self, head: &str) -> Option<Expression> {
        let mut segments = vec![head.to_string()];
        loop {
            if self.check(&Token::Dot) {
                self.advance();
                let segment = self.advance()?.name()?;
                segments.push(segment.to_string());
            } else if self.check(&Token::LBracket) {
                // Computed access is only understood with a string key
                self.advance();
                let segment = match self.advance()? {
                    Token::String(s) | Token::SingleQuoteString(s) => unquote(s),
                    _ => return None,
                };
                if !matches!(self.advance()?, Token::RBracket) {
                    return None;
                }
                segments.push(segment);
            } else {
                break;
            }
        }

        if segments.len() == 1 {
            if head.contains('-') {
                return None;
            }
            return segments.pop().map(Expression::Identifier);
        }
        Some(Expression::Member(segments))
    }

    fn object(&mut self) -> Option<Expression> {
        self.advance();
        let mut entries = Vec::new();

        loop {
            if self.check(&Token::RBrace) {
                self.advance();
                break;
            }

            let key = match self.advance()? {
                Token::String(s) | Token::SingleQuoteString(s) => unquote(s),
                other => other.name()?.to_string(),
            };
            if !matches!(self.advance()?, Token::Colon) {
                return None;
            }

            let value = self.entry_value()?;
            entries.push((key, value));

            match self.peek()? {
                Token::Comma => {
                    self.advance();
                }
                Token::RBrace => {}
                _ => return None,
            }
        }

        Some(Expression::Object(entries))
    }

    /// Object values that are not simple shapes are kept as opaque source
    /// slices so callers can report exactly which entry was rejected.
    fn entry_value(&mut self) -> Option<Expression> {
        let start = self.pos;
        if let Some(value) = self.value() {
            if matches!(self.peek(), Some(Token::Comma | Token::RBrace)) {
                return Some(value);
            }
        }
        self.pos = start;

        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket if depth > 0 => depth -= 1,
                Token::Comma | Token::RBrace if depth == 0 => break,
                _ => {}
            }
            self.advance();
        }
        if self.pos == start {
            return None;
        }

        let from = self.tokens[start].1.start;
        let to = self.tokens[self.pos - 1].1.end;
        Some(Expression::Opaque(self.source[from..to].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(Expression::classify(r#" "Hello" "#), Expression::Str("Hello".into()));
        assert_eq!(Expression::classify("42"), Expression::Number(42.0));
        assert_eq!(Expression::classify("-1.5"), Expression::Number(-1.5));
        assert_eq!(Expression::classify("true"), Expression::Bool(true));
        assert_eq!(Expression::classify("/* has-bindings */"), Expression::Empty);
    }

    #[test]
    fn test_classify_member_and_identifier() {
        assert_eq!(
            Expression::classify("props.label"),
            Expression::Member(vec!["props".into(), "label".into()])
        );
        assert_eq!(
            Expression::classify("handleClick"),
            Expression::Identifier("handleClick".into())
        );
    }

    #[test]
    fn test_classify_computed_member() {
        assert_eq!(
            Expression::classify(r#"props["Button Label"]"#),
            Expression::Member(vec!["props".into(), "Button Label".into()])
        );
        assert_eq!(
            Expression::classify("tokens['font-size']"),
            Expression::Member(vec!["tokens".into(), "font-size".into()])
        );
        assert_eq!(
            Expression::classify("items[0]"),
            Expression::Opaque("items[0]".into())
        );
    }

    #[test]
    fn test_classify_style_object() {
        let expr = Expression::classify(r#"{ width: "10px", padding: 8, color: tokens.primary }"#);
        let Expression::Object(entries) = expr else {
            panic!("expected object");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ("width".to_string(), Expression::Str("10px".into())));
        assert_eq!(entries[1], ("padding".to_string(), Expression::Number(8.0)));
        assert_eq!(
            entries[2].1,
            Expression::Member(vec!["tokens".into(), "primary".into()])
        );
    }

    #[test]
    fn test_unsupported_object_entry_kept_as_opaque() {
        let Expression::Object(entries) = Expression::classify("{ width: a + b, color: \"red\" }")
        else {
            panic!("expected object");
        };
        assert_eq!(entries[0].1, Expression::Opaque("a + b".into()));
        assert_eq!(entries[1].1, Expression::Str("red".into()));
    }

    #[test]
    fn test_anything_else_is_opaque() {
        assert_eq!(
            Expression::classify("items.map(i => i)"),
            Expression::Opaque("items.map(i => i)".into())
        );
        assert_eq!(
            Expression::classify("`template ${x}`"),
            Expression::Opaque("`template ${x}`".into())
        );
    }
}

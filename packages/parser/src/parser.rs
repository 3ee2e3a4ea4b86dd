use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::expression::Expression;
use crate::markup::decode_entities;
use crate::tokenizer::Token;
use logos::Logos;
use std::ops::Range;

/// Recursive-descent parser for the editor module
///
/// Tokens are lexed on demand from the current byte offset. Tag headers and
/// the module scaffold go through the lexer; text between tags and braced
/// expressions are read raw, since JSX text is not tokenizable.
pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    /// Parse the module and return its root JSX element.
    ///
    /// Accepts either a full module (`export default function X() { return (...) }`)
    /// or a bare JSX element.
    pub fn parse_document(&mut self) -> ParseResult<JsxElement> {
        self.skip_trivia();
        if !self.rest().starts_with('<') {
            self.skip_to_return()?;
        }

        let has_paren = self.match_token(Token::LParen)?;
        if !self.check(Token::LAngle)? {
            return Err(ParseError::unexpected_token(
                self.peek_span()?,
                "JSX element",
                self.describe_peek()?,
            ));
        }

        let root = self.parse_element()?;
        if has_paren {
            self.expect(Token::RParen)?;
        }
        Ok(root)
    }

    /// Skip scaffold tokens up to a `return` that is followed by JSX
    fn skip_to_return(&mut self) -> ParseResult<()> {
        loop {
            match self.peek_lenient() {
                None => return Err(ParseError::MissingRoot),
                Some((Token::Return, span)) => {
                    self.pos = span.end;
                    if self.check(Token::LParen)? || self.check(Token::LAngle)? {
                        return Ok(());
                    }
                }
                Some((_, span)) => self.pos = span.end,
            }
        }
    }

    fn parse_element(&mut self) -> ParseResult<JsxElement> {
        let start = self.peek_span()?.start;
        self.expect(Token::LAngle)?;
        let tag = self.parse_tag_name()?;

        let mut attributes = Vec::new();
        loop {
            let (token, span) = self.peek_required("attribute, '/>' or '>'")?;
            match token {
                Token::Slash => {
                    self.pos = span.end;
                    self.expect(Token::RAngle)?;
                    return Ok(JsxElement {
                        tag,
                        attributes,
                        children: Vec::new(),
                        self_closing: true,
                        span: start..self.pos,
                    });
                }
                Token::RAngle => {
                    self.pos = span.end;
                    break;
                }
                Token::LBrace => {
                    return Err(ParseError::invalid_syntax(
                        span,
                        "spread attributes are not supported",
                    ));
                }
                other => match other.name() {
                    Some(_) => attributes.push(self.parse_attribute()?),
                    None => {
                        return Err(ParseError::unexpected_token(
                            span,
                            "attribute name",
                            other.to_string(),
                        ))
                    }
                },
            }
        }

        let children = self.parse_children(&tag)?;
        Ok(JsxElement {
            tag,
            attributes,
            children,
            self_closing: false,
            span: start..self.pos,
        })
    }

    /// Tag names may be dotted (`Card.Header`)
    fn parse_tag_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_name("tag name")?;
        while self.match_token(Token::Dot)? {
            name.push('.');
            name.push_str(&self.expect_name("tag name")?);
        }
        Ok(name)
    }

    fn parse_attribute(&mut self) -> ParseResult<JsxAttribute> {
        let start = self.peek_span()?.start;
        let mut name = self.expect_name("attribute name")?;
        if self.match_token(Token::Colon)? {
            name.push(':');
            name.push_str(&self.expect_name("attribute name")?);
        }

        if !self.match_token(Token::Equals)? {
            return Ok(JsxAttribute {
                name,
                value: AttrValue::Implicit,
                span: start..self.pos,
            });
        }

        self.skip_trivia();
        if let Some(value) = self.attribute_string()? {
            return Ok(JsxAttribute {
                name,
                value: AttrValue::Str(value),
                span: start..self.pos,
            });
        }

        let (token, span) = self.peek_required("attribute value")?;
        let value = match token {
            Token::LBrace => AttrValue::Expr(self.capture_braced()?),
            other => {
                return Err(ParseError::unexpected_token(
                    span,
                    "string or {expression}",
                    other.to_string(),
                ))
            }
        };

        Ok(JsxAttribute {
            name,
            value,
            span: start..self.pos,
        })
    }

    /// Quoted attribute value read raw: no backslash escapes, entities decoded
    fn attribute_string(&mut self) -> ParseResult<Option<String>> {
        let rest = self.rest();
        let Some(quote) = rest.chars().next().filter(|&c| matches!(c, '"' | '\'')) else {
            return Ok(None);
        };
        let Some(len) = rest[1..].find(quote) else {
            return Err(ParseError::unexpected_eof(format!("closing {}", quote)));
        };

        let raw = &rest[1..1 + len];
        self.pos += len + 2;
        Ok(Some(decode_entities(raw)))
    }

    /// Children in raw text mode until the matching closing tag
    fn parse_children(&mut self, tag: &str) -> ParseResult<Vec<JsxChild>> {
        let mut children = Vec::new();

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(ParseError::unexpected_eof(format!("</{}>", tag)));
            }

            if rest.starts_with("</") {
                let close_start = self.pos;
                self.pos += 2;
                let closing = self.parse_tag_name()?;
                self.expect(Token::RAngle)?;
                if closing != tag {
                    return Err(ParseError::invalid_syntax(
                        close_start..self.pos,
                        format!("mismatched closing tag: expected </{}>, found </{}>", tag, closing),
                    ));
                }
                return Ok(children);
            }

            if rest.starts_with('<') {
                children.push(JsxChild::Element(self.parse_element()?));
                continue;
            }

            if rest.starts_with('{') {
                children.push(JsxChild::Expression(self.capture_braced()?));
                continue;
            }

            let len = rest.find(['<', '{']).unwrap_or(rest.len());
            let span = self.pos..self.pos + len;
            let value = normalize_jsx_text(&rest[..len]);
            self.pos += len;
            if !value.is_empty() {
                children.push(JsxChild::Text { value, span });
            }
        }
    }

    /// Read a balanced `{ ... }` starting at the current position (after
    /// trivia). Strings, template literals and comments may contain braces.
    fn capture_braced(&mut self) -> ParseResult<JsxExpression> {
        self.skip_trivia();
        let start = self.pos;
        let bytes = self.source.as_bytes();
        if bytes.get(start) != Some(&b'{') {
            return Err(ParseError::unexpected_token(
                self.peek_span()?,
                "{",
                self.describe_peek()?,
            ));
        }

        let mut depth = 0usize;
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let raw = &self.source[start + 1..i];
                        self.pos = i + 1;
                        return Ok(JsxExpression {
                            raw: raw.to_string(),
                            expr: Expression::classify(raw),
                            span: start..self.pos,
                        });
                    }
                }
                quote @ (b'"' | b'\'' | b'`') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i += 2;
                    while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                        i += 1;
                    }
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }

        Err(ParseError::unexpected_eof("}"))
    }

    // Helper methods

    fn rest(&self) -> &'src str {
        self.source.get(self.pos..).unwrap_or_default()
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            let mut skipped = rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                skipped += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => skipped += end + 4,
                    None => skipped += trimmed.len(),
                }
            } else {
                self.pos += skipped;
                return;
            }
            self.pos += skipped;
        }
    }

    fn lex_at(&self) -> Option<(Result<Token<'src>, ()>, Range<usize>)> {
        let rest = self.rest();
        let mut lexer = Token::lexer(rest);
        let result = lexer.next()?;
        let span = lexer.span();
        Some((result, self.pos + span.start..self.pos + span.end))
    }

    fn peek(&self) -> ParseResult<Option<(Token<'src>, Range<usize>)>> {
        match self.lex_at() {
            None => Ok(None),
            Some((Ok(token), span)) => Ok(Some((token, span))),
            Some((Err(_), span)) => Err(ParseError::lexer_error(span)),
        }
    }

    /// Peek that steps over unlexable input one character at a time
    fn peek_lenient(&mut self) -> Option<(Token<'src>, Range<usize>)> {
        loop {
            match self.lex_at()? {
                (Ok(token), span) => return Some((token, span)),
                (Err(_), span) => {
                    let width = self.source[span.start..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1);
                    self.pos = span.start + width;
                }
            }
        }
    }

    fn peek_required(&self, expected: &str) -> ParseResult<(Token<'src>, Range<usize>)> {
        self.peek()?
            .ok_or_else(|| ParseError::unexpected_eof(expected))
    }

    fn peek_span(&self) -> ParseResult<Range<usize>> {
        Ok(self
            .peek()?
            .map(|(_, span)| span)
            .unwrap_or(self.source.len()..self.source.len()))
    }

    fn describe_peek(&self) -> ParseResult<String> {
        Ok(self
            .peek()?
            .map(|(token, _)| token.to_string())
            .unwrap_or_else(|| "end of input".to_string()))
    }

    fn check(&self, token: Token) -> ParseResult<bool> {
        Ok(self
            .peek()?
            .is_some_and(|(t, _)| std::mem::discriminant(&t) == std::mem::discriminant(&token)))
    }

    fn match_token(&mut self, token: Token) -> ParseResult<bool> {
        match self.peek()? {
            Some((t, span)) if std::mem::discriminant(&t) == std::mem::discriminant(&token) => {
                self.pos = span.end;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.match_token(token.clone())? {
            return Ok(());
        }
        match self.peek()? {
            Some((found, span)) => Err(ParseError::unexpected_token(
                span,
                token.to_string(),
                found.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(token.to_string())),
        }
    }

    fn expect_name(&mut self, expected: &str) -> ParseResult<String> {
        let (token, span) = self.peek_required(expected)?;
        match token.name() {
            Some(name) => {
                self.pos = span.end;
                Ok(name.to_string())
            }
            None => Err(ParseError::unexpected_token(span, expected, token.to_string())),
        }
    }
}

/// JSX whitespace rules: lines are trimmed at their inner edges, blank lines
/// are dropped and the remainder joined by single spaces.
pub fn normalize_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    let is_space = |c: char| c == ' ' || c == '\t' || c == '\r';

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut line: &str = line;
        if i != 0 {
            line = line.trim_start_matches(is_space);
        }
        if i != last {
            line = line.trim_end_matches(is_space);
        }
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseResult<JsxElement> {
        Parser::new(source).parse_document()
    }

    #[test]
    fn test_parse_bare_element() {
        let root = parse(r#"<div id="a" disabled />"#).unwrap();
        assert_eq!(root.tag, "div");
        assert!(root.self_closing);
        assert_eq!(root.attribute("id").unwrap().value, AttrValue::Str("a".into()));
        assert_eq!(root.attribute("disabled").unwrap().value, AttrValue::Implicit);
    }

    #[test]
    fn test_parse_module_scaffold() {
        let source = r#"import { props } from "./props";

export default function Screen() {
  return (
    <section id="root">
      <span id="label">Hello</span>
    </section>
  );
}
"#;
        let root = parse(source).unwrap();
        assert_eq!(root.tag, "section");
        assert_eq!(root.children.len(), 1);
        let JsxChild::Element(child) = &root.children[0] else {
            panic!("expected element child");
        };
        assert!(matches!(
            &child.children[..],
            [JsxChild::Text { value, .. }] if value == "Hello"
        ));
    }

    #[test]
    fn test_braced_children_and_attributes() {
        let root = parse(
            r#"<button onClick={() => { run("}") }} style={{ width: "10px" }}>{/* has-bindings */}{props.label}</button>"#,
        )
        .unwrap();

        let on_click = root.attribute("onClick").unwrap();
        let AttrValue::Expr(expr) = &on_click.value else {
            panic!("expected expression");
        };
        assert_eq!(expr.raw, r#"() => { run("}") }"#);
        assert!(matches!(expr.expr, Expression::Opaque(_)));

        assert_eq!(root.children.len(), 2);
        let JsxChild::Expression(label) = &root.children[1] else {
            panic!("expected expression child");
        };
        assert_eq!(label.expr.member_path().map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_attribute_strings_are_raw() {
        let root = parse("<p title=\"line one\nC:\\temp &quot;q&quot; &amp;\" alt='it&apos;s' />").unwrap();
        assert_eq!(
            root.attribute("title").unwrap().value,
            AttrValue::Str("line one\nC:\\temp \"q\" &".into())
        );
        assert_eq!(root.attribute("alt").unwrap().value, AttrValue::Str("it's".into()));
    }

    #[test]
    fn test_unterminated_attribute_string() {
        let err = parse(r#"<p title="open />"#).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse("<div><span></div></span>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_unterminated_element() {
        let err = parse("<div id=\"a\">text").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_missing_root() {
        let err = parse("export default function Screen() { return null; }").unwrap_err();
        assert_eq!(err, ParseError::MissingRoot);
    }

    #[test]
    fn test_jsx_text_normalization() {
        assert_eq!(normalize_jsx_text("\n      Hello world\n    "), "Hello world");
        assert_eq!(normalize_jsx_text("a\n   b"), "a b");
        assert_eq!(normalize_jsx_text("  keep inner  "), "  keep inner  ");
        assert_eq!(normalize_jsx_text("\n   \n"), "");
    }
}

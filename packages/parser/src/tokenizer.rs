use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token types for the editor module source
///
/// Only the module scaffold, tag headers, and braced expressions are lexed.
/// JSX text between tags is read raw by the parser.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token<'src> {
    // Keywords
    #[token("import")]
    Import,

    #[token("from")]
    From,

    #[token("export")]
    Export,

    #[token("default")]
    Default,

    #[token("function")]
    Function,

    #[token("return")]
    Return,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Identifiers, including dashed attribute names like ownership-type
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*(-[a-zA-Z0-9_$]+)*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice())]
    SingleQuoteString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token("/")]
    Slash,

    #[token("=")]
    Equals,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("-")]
    Minus,

    // Operators the scaffold never needs but user code may contain
    #[regex(r"[+*%!?&|^~@#`]", |lex| lex.slice())]
    Operator(&'src str),
}

impl<'src> Token<'src> {
    /// Text of a token usable as a name (identifiers and keywords)
    pub fn name(&self) -> Option<&'src str> {
        match self {
            Token::Ident(s) => Some(s),
            Token::Import => Some("import"),
            Token::From => Some("from"),
            Token::Export => Some("export"),
            Token::Default => Some("default"),
            Token::Function => Some("function"),
            Token::Return => Some("return"),
            Token::True => Some("true"),
            Token::False => Some("false"),
            _ => None,
        }
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Import => write!(f, "import"),
            Token::From => write!(f, "from"),
            Token::Export => write!(f, "export"),
            Token::Default => write!(f, "default"),
            Token::Function => write!(f, "function"),
            Token::Return => write!(f, "return"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) | Token::SingleQuoteString(s) => write!(f, "string {}", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Slash => write!(f, "/"),
            Token::Equals => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Minus => write!(f, "-"),
            Token::Operator(op) => write!(f, "{}", op),
        }
    }
}

/// Tokenize a whole fragment. Returns `None` when any byte fails to lex.
pub fn tokenize(source: &str) -> Option<Vec<(Token<'_>, Range<usize>)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(_) => return None,
        }
    }

    Some(tokens)
}

/// Decode a quoted string token into its value
pub fn unquote(literal: &str) -> String {
    if literal.starts_with('"') {
        if let Ok(value) = serde_json::from_str::<String>(literal) {
            return value;
        }
    }

    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => value.push(other),
            None => {}
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_scaffold() {
        let tokens = tokenize("export default function Screen() {").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Export,
                Token::Default,
                Token::Function,
                Token::Ident("Screen"),
                Token::LParen,
                Token::RParen,
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn test_dashed_identifiers() {
        let tokens = tokenize("ownership-type=\"screen\" data-state-visible").unwrap();
        assert_eq!(tokens[0].0, Token::Ident("ownership-type"));
        assert_eq!(tokens[2].0, Token::String("\"screen\""));
        assert_eq!(tokens[3].0, Token::Ident("data-state-visible"));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = tokenize("defaultValue returned").unwrap();
        assert_eq!(tokens[0].0, Token::Ident("defaultValue"));
        assert_eq!(tokens[1].0, Token::Ident("returned"));
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = tokenize("/* has-bindings */ // trailing").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a \"b\"""#), "a \"b\"");
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote(r#""line\nbreak""#), "line\nbreak");
    }
}

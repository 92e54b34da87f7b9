//! Tokenization using logos.
//!
//! A raw logos pass recognizes token shapes; a cooking pass parses number
//! payloads, unescapes strings, and interns symbol/keyword names.

use logos::Logos;
use rill_ir::{Name, Span, StringInterner};

use crate::error::ReadError;

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n,]+")]
#[logos(skip r";[^\n]*")]
enum RawToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("'")]
    Quote,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    // Bare ":" is the cons symbol; ":name" is a keyword. The explicit token
    // outranks the keyword regex only for the single-character case.
    #[token(":", priority = 3)]
    ColonSymbol,

    #[regex(r"0b[01]+|0o[0-7]+|0x[0-9a-fA-F]+", priority = 4)]
    RadixInt,
    #[regex(r"-?[0-9]+", priority = 3)]
    Int,
    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", priority = 4)]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[regex(r":[A-Za-z0-9_+\-*/<>=!?%.]+")]
    Keyword,
    #[regex(r"[A-Za-z_+\-*/<>=!?%.][A-Za-z0-9_+\-*/<>=!?%.:]*")]
    Symbol,
}

/// A cooked token: payload plus source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Token payload.
    pub kind: TokenKind,
    /// Byte range in the source.
    pub span: Span,
}

/// Cooked token payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `'` quote sugar.
    Quote,
    /// Integer literal, radix prefixes already applied.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal, escapes already applied.
    Str(String),
    /// `true` / `false`.
    Bool(bool),
    /// `nil`.
    Nil,
    /// Interned symbol.
    Symbol(Name),
    /// Interned keyword (without the leading `:`).
    Keyword(Name),
}

/// Tokenize `src`, interning symbol and keyword names.
pub fn tokenize(src: &str, interner: &StringInterner) -> Result<Vec<Token>, ReadError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(src);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                // An unterminated string literal reaches EOF without matching
                // the string regex; that is "need more input", not bad input.
                if src[lexer.span().start..].starts_with('"') {
                    return Err(ReadError::unbalanced(
                        "unterminated string literal",
                        Span::from_range(lexer.span().start..src.len()),
                    ));
                }
                return Err(ReadError::syntax(
                    format!("unexpected character {:?}", lexer.slice()),
                    span,
                ));
            }
        };
        let kind = cook(raw, lexer.slice(), span, interner)?;
        tokens.push(Token { kind, span });
    }

    Ok(tokens)
}

fn cook(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<TokenKind, ReadError> {
    let kind = match raw {
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Quote => TokenKind::Quote,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Nil => TokenKind::Nil,
        RawToken::ColonSymbol => TokenKind::Symbol(interner.intern(":")),
        RawToken::Int => {
            let value = slice
                .parse::<i64>()
                .map_err(|_| ReadError::syntax("integer literal out of range", span))?;
            TokenKind::Int(value)
        }
        RawToken::RadixInt => {
            let (radix, digits) = match &slice[..2] {
                "0b" => (2, &slice[2..]),
                "0o" => (8, &slice[2..]),
                _ => (16, &slice[2..]),
            };
            let value = i64::from_str_radix(digits, radix)
                .map_err(|_| ReadError::syntax("integer literal out of range", span))?;
            TokenKind::Int(value)
        }
        RawToken::Float => {
            let value = slice
                .parse::<f64>()
                .map_err(|_| ReadError::syntax("malformed float literal", span))?;
            TokenKind::Float(value)
        }
        RawToken::Str => TokenKind::Str(unescape(&slice[1..slice.len() - 1], span)?),
        RawToken::Keyword => TokenKind::Keyword(interner.intern(&slice[1..])),
        RawToken::Symbol => TokenKind::Symbol(interner.intern(slice)),
    };
    Ok(kind)
}

/// Apply string escapes: `\n`, `\t`, `\r`, `\\`, `\"`.
fn unescape(body: &str, span: Span) -> Result<String, ReadError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            other => {
                let found = other.map_or_else(String::new, |c| c.to_string());
                return Err(ReadError::syntax(
                    format!("unknown string escape \\{found}"),
                    span,
                ));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        tokenize(src, &interner)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_simple_call() {
        let interner = StringInterner::new();
        let tokens = tokenize("(print 1 2 3)", &interner).unwrap();
        let print = interner.intern("print");
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::LParen,
                TokenKind::Symbol(print),
                TokenKind::Int(1),
                TokenKind::Int(2),
                TokenKind::Int(3),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn string_literals_preserve_whitespace() {
        let kinds = kinds("(print \"this\" \" and that\")");
        assert!(kinds.contains(&TokenKind::Str("this".into())));
        assert!(kinds.contains(&TokenKind::Str(" and that".into())));
    }

    #[test]
    fn radix_int_literals() {
        assert_eq!(
            kinds("0b101 0o17 0xff"),
            vec![TokenKind::Int(5), TokenKind::Int(15), TokenKind::Int(255)]
        );
    }

    #[test]
    fn negative_numbers_are_numbers_not_symbols() {
        assert_eq!(
            kinds("-5 -2.5"),
            vec![TokenKind::Int(-5), TokenKind::Float(-2.5)]
        );
    }

    #[test]
    fn bare_colon_is_the_cons_symbol() {
        let interner = StringInterner::new();
        let tokens = tokenize("(: x xs) :key", &interner).unwrap();
        let colon = interner.intern(":");
        let key = interner.intern("key");
        assert_eq!(tokens[1].kind, TokenKind::Symbol(colon));
        assert_eq!(tokens[5].kind, TokenKind::Keyword(key));
    }

    #[test]
    fn comments_and_commas_are_skipped() {
        assert_eq!(
            kinds("{1 2, 3 4} ; trailing comment\n5"),
            vec![
                TokenKind::LBrace,
                TokenKind::Int(1),
                TokenKind::Int(2),
                TokenKind::Int(3),
                TokenKind::Int(4),
                TokenKind::RBrace,
                TokenKind::Int(5),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_unbalanced() {
        let interner = StringInterner::new();
        let err = tokenize("(print \"oops", &interner).unwrap_err();
        assert!(err.is_unbalanced());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\"c\\d""#),
            vec![TokenKind::Str("a\nb\"c\\d".into())]
        );
    }

    #[test]
    fn qualified_symbols_keep_the_slash() {
        let interner = StringInterner::new();
        let tokens = tokenize("foo/bar", &interner).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Symbol(interner.intern("foo/bar")));
    }
}

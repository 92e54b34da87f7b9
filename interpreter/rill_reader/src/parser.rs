//! Grouping tokens into expression trees.
//!
//! Recursive descent over the cooked token stream. Quote sugar desugars
//! here: `'x` becomes `(quote x)` before the evaluator ever sees it.

use rill_ir::{Expr, Name, Span, StringInterner};

use crate::error::ReadError;
use crate::lexer::{Token, TokenKind};

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    quote: Name,
    for_in: Name,
}

/// Parse every top-level form.
pub fn parse_program(tokens: &[Token], interner: &StringInterner) -> Result<Vec<Expr>, ReadError> {
    let mut parser = Parser::new(tokens, interner);
    let mut forms = Vec::new();
    while !parser.at_end() {
        forms.push(parser.expr()?);
    }
    Ok(forms)
}

/// Parse exactly one form; trailing tokens are a syntax error.
pub fn parse_one(tokens: &[Token], interner: &StringInterner) -> Result<Expr, ReadError> {
    let mut parser = Parser::new(tokens, interner);
    if parser.at_end() {
        return Err(ReadError::unbalanced(
            "unexpected end of input",
            Span::default(),
        ));
    }
    let expr = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ReadError::syntax(
            "unexpected content after expression",
            extra.span,
        ));
    }
    Ok(expr)
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], interner: &StringInterner) -> Self {
        Parser {
            tokens,
            pos: 0,
            quote: interner.intern("quote"),
            for_in: interner.intern("for-in"),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn last_span(&self) -> Span {
        self.tokens.last().map_or_else(Span::default, |t| t.span)
    }

    fn expr(&mut self) -> Result<Expr, ReadError> {
        let Some(token) = self.advance() else {
            return Err(ReadError::unbalanced(
                "unexpected end of input",
                self.last_span(),
            ));
        };

        match &token.kind {
            TokenKind::Int(n) => Ok(Expr::Int(*n)),
            TokenKind::Float(x) => Ok(Expr::Float(*x)),
            TokenKind::Str(s) => Ok(Expr::Str(s.clone())),
            TokenKind::Bool(b) => Ok(Expr::Bool(*b)),
            TokenKind::Nil => Ok(Expr::Nil),
            TokenKind::Symbol(name) => Ok(Expr::Symbol(*name)),
            TokenKind::Keyword(name) => Ok(Expr::Keyword(*name)),
            TokenKind::Quote => {
                let quoted = self.expr().map_err(|err| {
                    // A dangling quote at EOF still wants more input.
                    if err.is_unbalanced() {
                        ReadError::unbalanced("unterminated quote", token.span)
                    } else {
                        err
                    }
                })?;
                Ok(Expr::List(vec![Expr::Symbol(self.quote), quoted]))
            }
            TokenKind::LParen => {
                let items = self.seq(token.span, &TokenKind::RParen, "missing closing )")?;
                Ok(Expr::List(items))
            }
            TokenKind::LBracket => {
                let items = self.seq(token.span, &TokenKind::RBracket, "missing closing ]")?;
                Ok(Expr::Vector(items))
            }
            TokenKind::LBrace => {
                let items = self.seq(token.span, &TokenKind::RBrace, "missing closing }")?;
                // An embedded for-in is dict-comprehension sugar and is
                // pairs-by-construction; everything else must pair up here.
                let is_comprehension =
                    items.len() == 1 && items[0].head_symbol() == Some(self.for_in);
                if is_comprehension {
                    let mut drained = items;
                    let form = drained.remove(0);
                    return Ok(Expr::Map(vec![(form, Expr::Nil)]));
                }
                if items.len() % 2 != 0 {
                    return Err(ReadError::syntax(
                        "map literal requires an even number of elements",
                        token.span,
                    ));
                }
                let mut pairs = Vec::with_capacity(items.len() / 2);
                let mut iter = items.into_iter();
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    pairs.push((k, v));
                }
                Ok(Expr::Map(pairs))
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => Err(
                ReadError::syntax("unexpected closing delimiter", token.span),
            ),
        }
    }

    /// Parse expressions until `close`, consuming it.
    fn seq(
        &mut self,
        open_span: Span,
        close: &TokenKind,
        unbalanced_msg: &str,
    ) -> Result<Vec<Expr>, ReadError> {
        let mut items = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return Err(ReadError::unbalanced(unbalanced_msg, open_span));
            };
            if &token.kind == close {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.expr()?);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use crate::{read, read_one, ReadErrorKind};
    use pretty_assertions::assert_eq;
    use rill_ir::{Expr, StringInterner};

    #[test]
    fn parses_simple_sexp() {
        let interner = StringInterner::new();
        let forms = read("(print \"foo\" 1 3.14)", &interner).unwrap();
        let print = interner.intern("print");
        assert_eq!(
            forms,
            vec![Expr::List(vec![
                Expr::Symbol(print),
                Expr::Str("foo".into()),
                Expr::Int(1),
                Expr::Float(3.14),
            ])]
        );
    }

    #[test]
    fn parses_nested_sexp() {
        let interner = StringInterner::new();
        let forms = read("(print (+ \"spam\" \" and eggs\"))", &interner).unwrap();
        let print = interner.intern("print");
        let plus = interner.intern("+");
        assert_eq!(
            forms,
            vec![Expr::List(vec![
                Expr::Symbol(print),
                Expr::List(vec![
                    Expr::Symbol(plus),
                    Expr::Str("spam".into()),
                    Expr::Str(" and eggs".into()),
                ]),
            ])]
        );
    }

    #[test]
    fn vector_and_map_literals() {
        let interner = StringInterner::new();
        let forms = read("[1 2 3] {:a 1 :b 2}", &interner).unwrap();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert_eq!(
            forms,
            vec![
                Expr::Vector(vec![Expr::Int(1), Expr::Int(2), Expr::Int(3)]),
                Expr::Map(vec![
                    (Expr::Keyword(a), Expr::Int(1)),
                    (Expr::Keyword(b), Expr::Int(2)),
                ]),
            ]
        );
    }

    #[test]
    fn odd_map_literal_is_a_syntax_error() {
        let interner = StringInterner::new();
        let err = read("{:a 1 :b}", &interner).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::Syntax);
    }

    #[test]
    fn quote_sugar_desugars() {
        let interner = StringInterner::new();
        let forms = read("'x '()", &interner).unwrap();
        let quote = interner.intern("quote");
        let x = interner.intern("x");
        assert_eq!(
            forms,
            vec![
                Expr::List(vec![Expr::Symbol(quote), Expr::Symbol(x)]),
                Expr::List(vec![Expr::Symbol(quote), Expr::List(vec![])]),
            ]
        );
    }

    #[test]
    fn unclosed_list_is_unbalanced() {
        let interner = StringInterner::new();
        for src in ["(define x", "[1 2", "{:a", "(a (b c)", "'"] {
            let err = read(src, &interner).unwrap_err();
            assert!(err.is_unbalanced(), "{src:?} should be unbalanced");
        }
    }

    #[test]
    fn stray_close_is_syntax_not_unbalanced() {
        let interner = StringInterner::new();
        let err = read(") x", &interner).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::Syntax);
    }

    #[test]
    fn mismatched_delimiter_is_syntax() {
        let interner = StringInterner::new();
        let err = read("(1 2]", &interner).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::Syntax);
    }

    #[test]
    fn read_one_rejects_trailing_forms() {
        let interner = StringInterner::new();
        assert!(read_one("(+ 1 2)", &interner).is_ok());
        let err = read_one("(+ 1 2) extra", &interner).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::Syntax);
    }

    #[test]
    fn map_comprehension_passes_through_as_single_pair() {
        let interner = StringInterner::new();
        let forms = read("{(for-in (x xs) x x)}", &interner).unwrap();
        let Expr::Map(pairs) = &forms[0] else {
            panic!("expected map literal");
        };
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.head_symbol(), Some(interner.intern("for-in")));
        assert_eq!(pairs[0].1, Expr::Nil);
    }

    #[test]
    fn single_non_comprehension_map_entry_is_odd() {
        let interner = StringInterner::new();
        let err = read("{(f 1)}", &interner).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::Syntax);
    }

    #[test]
    fn empty_list_parses_to_empty_sequence() {
        let interner = StringInterner::new();
        let forms = read("()", &interner).unwrap();
        assert_eq!(forms, vec![Expr::List(vec![])]);
    }

    mod atom_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn integer_atoms_round_trip(n in any::<i64>()) {
                let interner = StringInterner::new();
                let forms = read(&n.to_string(), &interner).unwrap();
                prop_assert_eq!(forms, vec![Expr::Int(n)]);
            }

            #[test]
            fn symbol_atoms_intern(s in "[a-z][a-z0-9?!-]{0,10}") {
                // Guard against the literal keywords of the language.
                prop_assume!(!matches!(s.as_str(), "true" | "false" | "nil"));
                let interner = StringInterner::new();
                let forms = read(&s, &interner).unwrap();
                prop_assert_eq!(forms, vec![Expr::Symbol(interner.intern(&s))]);
            }
        }
    }
}

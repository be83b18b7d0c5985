//! One-token lookahead over a [`Lexer`], for parsers.

use crate::lexer::{Lexer, LexerError};
use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Errors returned by [`TokenStream::expect`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("expected {expected}, got {found} at line {line}, column {column}")]
    Mismatch {
        expected: TokenKind,
        found: TokenKind,
        line: usize,
        column: usize,
    },

    #[error("expected {expected}, got end of input")]
    UnexpectedEnd { expected: TokenKind },

    #[error("lexer error: {0}")]
    Lexer(#[from] LexerError),
}

/// A pull-based token cursor with a single token of lookahead.
///
/// Lexing errors surface from whichever call first reaches them and are
/// sticky: every later `peek`, `advance` or `expect` returns the same error.
/// As an `Iterator` the error is yielded once, after which it yields `None`.
#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    peeked: Option<Option<Token<'src>>>,
    error: Option<LexerError>,
    error_yielded: bool,
}

impl<'src> TokenStream<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            peeked: None,
            error: None,
            error_yielded: false,
        }
    }

    /// Make sure the lookahead slot holds the next token, or report the error.
    fn fill(&mut self) -> Result<(), LexerError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.peeked.is_none() {
            match self.lexer.next_token() {
                Ok(tok) => self.peeked = Some(tok),
                Err(err) => {
                    self.error = Some(err.clone());
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token<'src>>, LexerError> {
        self.fill()?;
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }

    pub fn peek_kind(&mut self) -> Result<Option<TokenKind>, LexerError> {
        Ok(self.peek()?.map(|t| t.kind))
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Result<Option<Token<'src>>, LexerError> {
        self.fill()?;
        Ok(self.peeked.take().flatten())
    }

    /// Whether the next token has the given kind.
    pub fn check(&mut self, kind: TokenKind) -> bool {
        matches!(self.peek_kind(), Ok(Some(k)) if k == kind)
    }

    /// Consume the next token if it has the given kind, otherwise leave it.
    pub fn expect(&mut self, expected: TokenKind) -> Result<Token<'src>, StreamError> {
        match self.peek()? {
            None => Err(StreamError::UnexpectedEnd { expected }),
            Some(tok) if tok.kind != expected => Err(StreamError::Mismatch {
                expected,
                found: tok.kind,
                line: tok.start.line_number(),
                column: tok.start.column_number(),
            }),
            Some(_) => match self.advance()? {
                Some(tok) => Ok(tok),
                None => Err(StreamError::UnexpectedEnd { expected }),
            },
        }
    }

    /// True once every token has been consumed. A pending error is not the end.
    pub fn is_at_end(&mut self) -> bool {
        self.fill().is_ok() && matches!(self.peeked, Some(None))
    }
}

impl<'src> From<Lexer<'src>> for TokenStream<'src> {
    fn from(lexer: Lexer<'src>) -> Self {
        Self::new(lexer)
    }
}

impl<'src> Iterator for TokenStream<'src> {
    type Item = Result<Token<'src>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error_yielded {
            return None;
        }
        match self.advance() {
            Ok(tok) => tok.map(Ok),
            Err(err) => {
                self.error_yielded = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(source: &str) -> TokenStream<'_> {
        TokenStream::new(Lexer::new(source))
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut ts = stream("var x");
        assert_eq!(ts.peek_kind(), Ok(Some(TokenKind::Var)));
        assert_eq!(ts.peek_kind(), Ok(Some(TokenKind::Var)));
        assert_eq!(ts.advance().unwrap().unwrap().text, "var");
        assert_eq!(ts.peek().unwrap().unwrap().text, "x");
        assert_eq!(ts.advance().unwrap().unwrap().kind, TokenKind::Id);
        assert_eq!(ts.advance(), Ok(None));
        assert!(ts.is_at_end());
    }

    #[test]
    fn test_expect_function_header() {
        let mut ts = stream("func main(): int {");
        ts.expect(TokenKind::Func).unwrap();
        let name = ts.expect(TokenKind::Id).unwrap();
        assert_eq!(name.text, "main");
        ts.expect(TokenKind::OpenParen).unwrap();
        assert!(!ts.check(TokenKind::Id));
        ts.expect(TokenKind::CloseParen).unwrap();
        if ts.check(TokenKind::Colon) {
            ts.expect(TokenKind::Colon).unwrap();
            assert_eq!(ts.expect(TokenKind::Id).unwrap().text, "int");
        }
        ts.expect(TokenKind::OpenBrace).unwrap();
        assert!(ts.is_at_end());
    }

    #[test]
    fn test_expect_mismatch_leaves_token() {
        let mut ts = stream("\n  x = 1");
        let err = ts.expect(TokenKind::Var).unwrap_err();
        assert_eq!(
            err,
            StreamError::Mismatch {
                expected: TokenKind::Var,
                found: TokenKind::Id,
                line: 2,
                column: 3,
            }
        );
        assert_eq!(err.to_string(), "expected VAR, got ID at line 2, column 3");
        assert_eq!(ts.expect(TokenKind::Id).unwrap().text, "x");
    }

    #[test]
    fn test_expect_at_end() {
        let mut ts = stream("  ");
        assert_eq!(
            ts.expect(TokenKind::CloseBrace),
            Err(StreamError::UnexpectedEnd {
                expected: TokenKind::CloseBrace
            })
        );
    }

    #[test]
    fn test_lexer_error_is_sticky() {
        let mut ts = stream("x #");
        assert_eq!(ts.advance().unwrap().unwrap().text, "x");
        assert!(!ts.is_at_end());
        let err = ts.peek().unwrap_err();
        assert!(matches!(err, LexerError::UnexpectedCharacter { ch: '#', .. }));
        assert_eq!(ts.advance(), Err(err.clone()));
        assert_eq!(ts.advance(), Err(err.clone()));
        assert_eq!(ts.expect(TokenKind::Id), Err(StreamError::Lexer(err)));
        assert!(!ts.check(TokenKind::Id));
    }

    #[test]
    fn test_iterator_error_stays_visible_to_peek() {
        let mut ts = stream("x #");
        assert_eq!(ts.advance().unwrap().unwrap().text, "x");
        let err = ts.peek().unwrap_err();

        assert_eq!(ts.next(), Some(Err(err.clone())));
        assert_eq!(ts.peek().unwrap_err(), err);
        assert!(!ts.is_at_end());
        assert_eq!(ts.advance(), Err(err.clone()));
        assert_eq!(ts.next(), None);
        assert_eq!(ts.peek_kind(), Err(err));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let results: Vec<_> = stream("a @ b").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().text, "a");
        assert!(matches!(
            results[1],
            Err(LexerError::UnexpectedCharacter { ch: '@', offset: 2, .. })
        ));
    }

    #[test]
    fn test_iterator_yields_peeked_token() {
        let mut ts = stream("a b c");
        assert_eq!(ts.peek_kind(), Ok(Some(TokenKind::Id)));
        let texts: Vec<_> = ts.map(|t| t.unwrap().text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}

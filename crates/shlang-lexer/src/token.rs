//! Token types for the shlang lexer.

use std::fmt;
use std::ops::Range;

/// Token kinds for the shlang language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // Punctuation
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,

    // Operators
    Equal,
    Plus,
    Minus,
    Mul,
    Div,

    // Literals
    String,
    Number,

    // Keywords
    For,
    To,
    While,
    If,
    Else,
    Return,
    Func,
    Var,

    Id,
}

impl TokenKind {
    /// Canonical upper-case name of the kind, e.g. `OPEN_PAREN`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::OpenParen => "OPEN_PAREN",
            TokenKind::CloseParen => "CLOSE_PAREN",
            TokenKind::OpenBrace => "OPEN_BRACE",
            TokenKind::CloseBrace => "CLOSE_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Equal => "EQUAL",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Mul => "MUL",
            TokenKind::Div => "DIV",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::For => "FOR",
            TokenKind::To => "TO",
            TokenKind::While => "WHILE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::Func => "FUNC",
            TokenKind::Var => "VAR",
            TokenKind::Id => "ID",
        }
    }

    /// Map a single character to its fixed punctuation or operator kind.
    pub fn from_punctuation(ch: char) -> Option<TokenKind> {
        match ch {
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            '=' => Some(TokenKind::Equal),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Mul),
            '/' => Some(TokenKind::Div),
            _ => None,
        }
    }

    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::CloseParen
                | TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::Comma
                | TokenKind::Colon
        )
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Equal | TokenKind::Plus | TokenKind::Minus | TokenKind::Mul | TokenKind::Div
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Number)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::For
                | TokenKind::To
                | TokenKind::While
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Return
                | TokenKind::Func
                | TokenKind::Var
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up an identifier to see if it's a keyword.
///
/// Matching is exact and case-sensitive: `For` and `fort` are both `Id`.
pub fn lookup_identifier(ident: &str) -> TokenKind {
    match ident {
        "for" => TokenKind::For,
        "to" => TokenKind::To,
        "while" => TokenKind::While,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "func" => TokenKind::Func,
        "var" => TokenKind::Var,
        _ => TokenKind::Id,
    }
}

/// Position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset within the source.
    pub offset: usize,
    /// Byte offset of the start of the current line.
    pub line_start: usize,
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column number, counted in characters.
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line_start: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line_start,
            line,
            column,
        }
    }

    /// Returns the 1-indexed line number.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }

    /// Returns the 1-indexed column number.
    pub fn column_number(&self) -> usize {
        self.column + 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_number(), self.column_number())
    }
}

/// A token produced by the lexer.
///
/// `text` borrows from the source buffer the lexer was created over. For
/// `String` tokens it is the content between the quotes; for every other
/// kind it is the whole lexeme. `start` and `end` always delimit the whole
/// lexeme, quotes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Start position in source.
    pub start: Position,
    /// End position in source (exclusive).
    pub end: Position,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, start: Position, end: Position) -> Self {
        Self {
            kind,
            text,
            start,
            end,
        }
    }

    /// Byte range of the whole lexeme in the source.
    pub fn span(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Copy the token out of the source buffer's lifetime.
    pub fn to_owned_token(&self) -> OwnedToken {
        OwnedToken {
            kind: self.kind,
            text: self.text.to_string(),
            start: self.start,
            end: self.end,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.text)
    }
}

/// A token that owns its text, for consumers that outlive the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl OwnedToken {
    pub fn span(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }
}

impl fmt::Display for OwnedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_identifier() {
        assert_eq!(lookup_identifier("for"), TokenKind::For);
        assert_eq!(lookup_identifier("to"), TokenKind::To);
        assert_eq!(lookup_identifier("while"), TokenKind::While);
        assert_eq!(lookup_identifier("if"), TokenKind::If);
        assert_eq!(lookup_identifier("else"), TokenKind::Else);
        assert_eq!(lookup_identifier("return"), TokenKind::Return);
        assert_eq!(lookup_identifier("func"), TokenKind::Func);
        assert_eq!(lookup_identifier("var"), TokenKind::Var);
        assert_eq!(lookup_identifier("fort"), TokenKind::Id);
        assert_eq!(lookup_identifier("For"), TokenKind::Id);
        assert_eq!(lookup_identifier("_var"), TokenKind::Id);
    }

    #[test]
    fn test_kind_classes() {
        assert!(TokenKind::Comma.is_punctuation());
        assert!(!TokenKind::Comma.is_operator());
        assert!(TokenKind::Div.is_operator());
        assert!(TokenKind::Equal.is_operator());
        assert!(TokenKind::Number.is_literal());
        assert!(TokenKind::String.is_literal());
        assert!(TokenKind::Func.is_keyword());
        assert!(!TokenKind::Id.is_keyword());
        assert!(!TokenKind::Id.is_literal());
    }

    #[test]
    fn test_from_punctuation() {
        assert_eq!(TokenKind::from_punctuation('('), Some(TokenKind::OpenParen));
        assert_eq!(TokenKind::from_punctuation(':'), Some(TokenKind::Colon));
        assert_eq!(TokenKind::from_punctuation('/'), Some(TokenKind::Div));
        assert_eq!(TokenKind::from_punctuation('%'), None);
        assert_eq!(TokenKind::from_punctuation('"'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::OpenBrace.to_string(), "OPEN_BRACE");
        assert_eq!(TokenKind::Id.to_string(), "ID");

        let tok = Token::new(
            TokenKind::String,
            "hi there",
            Position::new(0, 0, 0, 0),
            Position::new(10, 0, 0, 10),
        );
        assert_eq!(tok.to_string(), r#"STRING "hi there""#);
        assert_eq!(tok.span(), 0..10);
    }

    #[test]
    fn test_position() {
        let pos = Position::new(10, 5, 1, 5);
        assert_eq!(pos.line_number(), 2);
        assert_eq!(pos.column_number(), 6);
        assert_eq!(pos.to_string(), "2:6");
    }

    #[test]
    fn test_owned_token() {
        let source = String::from("abc");
        let owned = {
            let tok = Token::new(
                TokenKind::Id,
                &source[..],
                Position::default(),
                Position::new(3, 0, 0, 3),
            );
            tok.to_owned_token()
        };
        drop(source);
        assert_eq!(owned.text, "abc");
        assert_eq!(owned.kind, TokenKind::Id);
        assert_eq!(owned.span(), 0..3);
    }
}

//! Lexer for the shlang scripting language.

use std::iter::FusedIterator;

use crate::token::{Position, Token, TokenKind, lookup_identifier};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur during lexing.
///
/// Line and column are 1-indexed; `offset` is a byte offset into the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString {
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("Unexpected character {ch:?} at line {line}, column {column}")]
    UnexpectedCharacter {
        ch: char,
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl LexerError {
    pub fn offset(&self) -> usize {
        match self {
            LexerError::UnterminatedString { offset, .. }
            | LexerError::UnexpectedCharacter { offset, .. } => *offset,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            LexerError::UnterminatedString { line, .. }
            | LexerError::UnexpectedCharacter { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            LexerError::UnterminatedString { column, .. }
            | LexerError::UnexpectedCharacter { column, .. } => *column,
        }
    }
}

/// Lexer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    /// Accept `digits.digits` as a single NUMBER. When off, a number ends
    /// at the first non-digit and a following `.` is an unexpected character.
    pub fractional_numbers: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            fractional_numbers: true,
        }
    }
}

/// Saved lexer state for backtracking.
#[derive(Debug, Clone)]
pub struct LexerState {
    position: usize,
    ch: Option<char>,
    line: usize,
    column: usize,
    line_start: usize,
    finished: bool,
}

/// Lexer tokenizes shlang source code.
///
/// Tokens are produced on demand, either through [`Lexer::next_token`] or
/// through the `Iterator` impl. The first error ends the scan: it is
/// returned once and the lexer yields nothing afterwards.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    config: LexerConfig,
    position: usize,
    ch: Option<char>,
    line: usize,
    column: usize,
    line_start: usize,
    token_start: Position,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given input.
    pub fn new(source: &'src str) -> Self {
        Self::with_config(source, LexerConfig::default())
    }

    pub fn with_config(source: &'src str, config: LexerConfig) -> Self {
        Self {
            source,
            config,
            position: 0,
            ch: source.chars().next(),
            line: 0,
            column: 0,
            line_start: 0,
            token_start: Position::default(),
            finished: false,
        }
    }

    /// The buffer being scanned.
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn config(&self) -> LexerConfig {
        self.config
    }

    /// Rewind to the start of the source.
    pub fn reset(&mut self) {
        *self = Self::with_config(self.source, self.config);
    }

    /// Save the current lexer state for backtracking.
    pub fn save_state(&self) -> LexerState {
        LexerState {
            position: self.position,
            ch: self.ch,
            line: self.line,
            column: self.column,
            line_start: self.line_start,
            finished: self.finished,
        }
    }

    /// Restore a previously saved lexer state.
    pub fn restore_state(&mut self, state: LexerState) {
        self.position = state.position;
        self.ch = state.ch;
        self.line = state.line;
        self.column = state.column;
        self.line_start = state.line_start;
        self.finished = state.finished;
    }

    fn current_position(&self) -> Position {
        Position::new(self.position, self.line_start, self.line, self.column)
    }

    /// Consume the current character.
    fn read_char(&mut self) {
        if let Some(ch) = self.ch {
            self.position += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
                self.line_start = self.position;
            } else {
                self.column += 1;
            }
        }
        self.ch = self.source[self.position..].chars().next();
    }

    /// Peek at the character after the current one without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.source[self.position..].chars().nth(1)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ' | '\t' | '\n' | '\r')) {
            self.read_char();
        }
    }

    fn start_token(&mut self) {
        self.token_start = self.current_position();
    }

    /// Create a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind, text: &'src str) -> Token<'src> {
        Token::new(kind, text, self.token_start, self.current_position())
    }

    /// Get the next token, or `None` once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token<'src>>, LexerError> {
        if self.finished {
            return Ok(None);
        }

        self.skip_whitespace();
        self.start_token();

        let Some(ch) = self.ch else {
            self.finished = true;
            return Ok(None);
        };

        let result = if ch == '"' {
            self.read_string()
        } else if ch.is_ascii_digit() {
            Ok(self.read_number())
        } else if is_letter(ch) {
            Ok(self.read_identifier())
        } else if let Some(kind) = TokenKind::from_punctuation(ch) {
            let start = self.position;
            self.read_char();
            Ok(self.make_token(kind, &self.source[start..self.position]))
        } else {
            Err(LexerError::UnexpectedCharacter {
                ch,
                offset: self.position,
                line: self.token_start.line_number(),
                column: self.token_start.column_number(),
            })
        };

        match result {
            Ok(tok) => {
                trace!(kind = %tok.kind, offset = tok.start.offset, "token");
                Ok(Some(tok))
            }
            Err(err) => {
                debug!(error = %err, offset = err.offset(), "lexing stopped");
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Read an identifier or keyword.
    fn read_identifier(&mut self) -> Token<'src> {
        let start = self.position;
        while self.ch.is_some_and(|c| is_letter(c) || c.is_ascii_digit()) {
            self.read_char();
        }
        let text = &self.source[start..self.position];
        self.make_token(lookup_identifier(text), text)
    }

    /// Read a number literal: a digit run, optionally with one fractional part.
    fn read_number(&mut self) -> Token<'src> {
        let start = self.position;
        self.read_digits();

        if self.config.fractional_numbers
            && self.ch == Some('.')
            && self.peek_char().is_some_and(|c| c.is_ascii_digit())
        {
            self.read_char(); // consume .
            self.read_digits();
        }

        self.make_token(TokenKind::Number, &self.source[start..self.position])
    }

    fn read_digits(&mut self) {
        while self.ch.is_some_and(|c| c.is_ascii_digit()) {
            self.read_char();
        }
    }

    /// Read a double-quoted string literal. The text excludes the quotes
    /// and is taken verbatim; backslashes have no special meaning.
    fn read_string(&mut self) -> Result<Token<'src>, LexerError> {
        self.read_char(); // consume opening quote
        let start = self.position;

        while self.ch.is_some_and(|c| c != '"') {
            self.read_char();
        }

        if self.ch.is_none() {
            return Err(LexerError::UnterminatedString {
                offset: self.token_start.offset,
                line: self.token_start.line_number(),
                column: self.token_start.column_number(),
            });
        }

        let end = self.position;
        self.read_char(); // consume closing quote
        Ok(self.make_token(TokenKind::String, &self.source[start..end]))
    }

    /// Get the line text for a given position, without its line terminator.
    pub fn line_text(&self, pos: &Position) -> &'src str {
        self.line_from(pos.line_start)
    }

    /// Get the text of the line containing byte `offset`, such as
    /// [`LexerError::offset`]. Offsets past the end select the last line.
    pub fn line_text_at(&self, offset: usize) -> &'src str {
        let offset = offset.min(self.source.len());
        let line_start = self.source.as_bytes()[..offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        self.line_from(line_start)
    }

    fn line_from(&self, line_start: usize) -> &'src str {
        let rest = &self.source[line_start..];
        let line = rest.find('\n').map_or(rest, |i| &rest[..i]);
        line.strip_suffix('\r').unwrap_or(line)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl FusedIterator for Lexer<'_> {}

/// Check if a character can start an identifier.
fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Tokenize an input string into a vector of tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexerError> {
    Lexer::new(input).collect()
}

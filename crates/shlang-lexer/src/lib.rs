//! shlang lexer - tokenization for the shlang scripting language.
//!
//! This crate converts shlang source text into a lazy sequence of tokens
//! for a parser to consume. Tokens borrow their text from the source.
//!
//! # Example
//!
//! ```
//! use shlang_lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("var x = 42");
//! let token = lexer.next_token().unwrap().unwrap();
//! assert_eq!(token.kind, TokenKind::Var);
//! assert_eq!(token.text, "var");
//! ```

pub mod lexer;
pub mod stream;
pub mod token;

pub use lexer::{Lexer, LexerConfig, LexerError, LexerState, tokenize};
pub use stream::{StreamError, TokenStream};
pub use token::{OwnedToken, Position, Token, TokenKind, lookup_identifier};

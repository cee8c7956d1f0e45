//! Fermat front-end
//!
//! Lexer, AST, parser, and borrow checker for the fermat language.

pub mod ast;
pub mod borrow;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use borrow::{BorrowChecker, BorrowError, BorrowKind};
pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, LexerState, Source, Token};
pub use parser::Parser;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[error("unknown token when expecting an expression: {0}")]
    ExpectedExpression(String),
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

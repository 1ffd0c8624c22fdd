use thiserror::Error;

pub type ExprResult<T> = Result<T, ExprError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Unrecognized character at {pos}")]
    Lexer { pos: usize },
}

impl ExprError {
    pub fn unexpected_token(
        pos: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

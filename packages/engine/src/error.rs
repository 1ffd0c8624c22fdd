use thiserror::Error;
use weft_expression::ExprError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Structural errors surfaced by `bind` and by directive construction.
///
/// Absent data is never an error — it degrades to the absent-value
/// sentinel. These variants cover the fatal cases: malformed expressions,
/// unknown filters, and directive constructors that reject their input.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid expression `{attr}`: {source}")]
    Expression {
        attr: String,
        #[source]
        source: ExprError,
    },

    #[error("unknown filter `{name}`")]
    UnknownFilter { name: String },

    #[error("directive `{name}` failed to build: {message}")]
    Directive { name: String, message: String },
}

impl EngineError {
    pub fn directive(name: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Directive {
            name: name.into(),
            message: message.into(),
        }
    }
}

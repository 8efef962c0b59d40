/// Every failure an expression can produce, from parsing through evaluation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("empty expression")]
    EmptyExpression,

    #[error("syntax error: {message} at position {position}")]
    Syntax { message: String, position: usize },

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("illegal params: {0}")]
    IllegalParams(String),

    #[error("type coercion error: {0}")]
    TypeCoercion(String),

    #[error("nil operand: {0}")]
    NilOperand(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("unsupported literal: {0}")]
    UnsupportedLiteral(String),

    #[error("date parse error: {0}")]
    DateParse(String),

    #[error("invalid variables: {0}")]
    InvalidVariables(String),

    #[error("invalid function definition: {0}")]
    InvalidFunction(String),
}

impl Error {
    pub fn syntax<M: Into<String>>(message: M, position: usize) -> Self {
        Self::Syntax { message: message.into(), position }
    }

    pub fn illegal_params<M: Into<String>>(message: M) -> Self {
        Self::IllegalParams(message.into())
    }

    pub fn type_coercion<M: Into<String>>(message: M) -> Self {
        Self::TypeCoercion(message.into())
    }

    pub fn nil_operand<M: Into<String>>(message: M) -> Self {
        Self::NilOperand(message.into())
    }

    pub fn unsupported_operator<M: Into<String>>(message: M) -> Self {
        Self::UnsupportedOperator(message.into())
    }

    pub fn date_parse<M: Into<String>>(message: M) -> Self {
        Self::DateParse(message.into())
    }

    /// Byte offset for syntax errors, `None` for everything detected after parsing.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

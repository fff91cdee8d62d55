use thiserror::Error;

use crate::token::Pos;

/// A located compilation failure.
///
/// The first error aborts its phase and the whole compilation; there is no
/// multi-error aggregation. `Codegen` carries no position because it can
/// only arise from a pipeline-ordering bug (emitting IR for a program that
/// was never type-checked), never from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexical error at {pos}: {message}")]
    Lexical { pos: Pos, message: String },

    #[error("syntax error at {pos}: {message}")]
    Syntax { pos: Pos, message: String },

    #[error("semantic error at {pos}: {message}")]
    Semantic { pos: Pos, message: String },

    #[error("{0}")]
    Codegen(String),
}

impl Error {
    pub fn lexical(pos: Pos, message: impl Into<String>) -> Error {
        Error::Lexical {
            pos,
            message: message.into(),
        }
    }

    pub fn syntax(pos: Pos, message: impl Into<String>) -> Error {
        Error::Syntax {
            pos,
            message: message.into(),
        }
    }

    pub fn semantic(pos: Pos, message: impl Into<String>) -> Error {
        Error::Semantic {
            pos,
            message: message.into(),
        }
    }
}

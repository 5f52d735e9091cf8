//! Host-level errors: the things that stop the interpreter from running at
//! all, as distinct from in-language failure values.
//!
//! A failed primitive call or a `try` that times out produces an ordinary
//! atom (`out-of-time`, `out-of-data`, or whatever the caller passed as an
//! error tag) flowing back through `Result<NodeId, NodeId>` — that channel
//! never reaches here. [`AitError`] is for the host: a script file that
//! doesn't exist, input that isn't valid UTF-8, an arena invariant broken.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AitError {
    #[error("could not read {path}")]
    #[diagnostic(code(aitlisp::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not valid UTF-8")]
    #[diagnostic(code(aitlisp::encoding))]
    InvalidUtf8,

    #[error("unexpected end of input while reading an expression")]
    #[diagnostic(code(aitlisp::eof))]
    Eof,

    #[error("unbalanced parentheses: unexpected `)`")]
    #[diagnostic(code(aitlisp::reader::unbalanced))]
    UnbalancedParen,

    #[error("arena invariant violated: {0}")]
    #[diagnostic(code(aitlisp::arena::invariant))]
    Invariant(String),

    #[error("tape exhausted while reading a bit")]
    #[diagnostic(code(aitlisp::tape::exhausted))]
    TapeExhausted,
}

impl AitError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AitError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type AitResult<T> = Result<T, AitError>;

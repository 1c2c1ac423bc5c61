// Copyright (C) 2020-2026 Andy Kurnia.

use std::time::Duration;

pub struct MyError {
    s: String,
}

impl std::fmt::Display for MyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.s)
    }
}

impl std::fmt::Debug for MyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (self as &dyn std::fmt::Display).fmt(f)
    }
}

impl std::error::Error for MyError {}

pub fn new(s: String) -> MyError {
    MyError { s }
}

pub type BoxAnyError = Box<dyn std::error::Error + Send + Sync>;
pub type Returns<T> = Result<T, BoxAnyError>;

#[macro_export]
macro_rules! return_error {
    ($error:expr) => {
        return Err($crate::error::new($error).into());
    };
}

/// Failures the engine reports to whoever owns the AI turn.
///
/// Dictionary failures are fatal to the engine and must reach the caller.
/// Generation failures mean "no move this time" and the caller passes or
/// exchanges instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("dictionary unavailable: {0}")]
    DictionaryUnavailable(String),

    #[error("dictionary build exceeded its budget of {0:?}")]
    BuildTimeout(Duration),

    #[error("move generation exceeded its budget of {0:?}")]
    GenerationTimeout(Duration),

    #[error("no legal moves")]
    NoLegalMoves,

    #[error("invalid word {0:?}")]
    InvalidWord(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl EngineError {
    // callers treat a build timeout exactly like a missing dictionary.
    pub fn is_dictionary_failure(&self) -> bool {
        matches!(
            self,
            EngineError::DictionaryUnavailable(_) | EngineError::BuildTimeout(_)
        )
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::GenerationTimeout(_) | EngineError::NoLegalMoves
        )
    }
}

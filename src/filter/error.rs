use thiserror::Error;

/// Errors raised while turning filter text into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated pattern literal starting at position {0}")]
    UnterminatedPattern(usize),

    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Empty pattern literal at position {0}")]
    EmptyPattern(usize),

    #[error("Unrecognized character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
}

/// A grammar violation, reported against the offending token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {expected} at position {position}, found {found}")]
pub struct ParseError {
    /// Byte offset of the offending token in the filter text
    pub position: usize,
    pub expected: &'static str,
    pub found: String,
}

/// The body of a pattern literal is not a valid regular expression
#[derive(Debug, Error)]
#[error("Invalid pattern /{pattern}/ at position {position}: {source}")]
pub struct PatternError {
    pub position: usize,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Any error that can occur while compiling a filter expression
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

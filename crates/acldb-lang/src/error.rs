use thiserror::Error;

/// Parse failure with the 1-based program line it was found on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("string literal contains disallowed characters or is too long")]
    InvalidString,
    #[error("comment contains disallowed characters")]
    InvalidComment,
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },
    #[error("unknown command")]
    UnknownCommand,
    #[error("unknown right '{0}'")]
    UnknownRight(String),
    #[error("trailing tokens after command")]
    TrailingTokens,
    #[error("program header must be `as principal <p> password <s> do`")]
    InvalidHeader,
    #[error("program is missing the `***` terminator")]
    MissingTerminator,
}

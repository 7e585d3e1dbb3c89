use thiserror::Error;

/// Errors raised while parsing a single source file.
///
/// Any of these fails only the file it occurred in; the surrounding run
/// reports the failure and continues with the remaining files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {0}")]
    Unreadable(String),

    #[error("failed to build a syntax tree - parser returned no tree")]
    ParserFailed,

    #[error("source contains syntax errors that prevent analysis")]
    SyntaxError,

    #[error("parser language could not be configured: {0}")]
    LanguageSetup(String),
}

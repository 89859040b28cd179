//! Conversion errors

use herzog_nbformat::DocumentError;
use herzog_parser::ParseError;
use thiserror::Error;

/// Errors that abort a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ConvertError {
    /// 1-indexed script line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse(err) => err.line(),
            Self::Document(_) => None,
        }
    }
}

/// Result type for conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

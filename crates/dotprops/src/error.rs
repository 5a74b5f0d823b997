//! Error types for document operations.

use std::fmt;
use std::io;

use dotprops_tokenizer::ScanError;

/// Error type for loading and editing properties documents.
#[derive(Debug)]
pub enum Error {
    /// A malformed escape sequence was found while decoding input.
    Scan(ScanError),
    /// The key named by a comment operation does not exist.
    KeyNotFound(String),
    /// An underlying I/O failure.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan(err) => err.fmt(f),
            Error::KeyNotFound(key) => write!(f, "no such key: {key:?}"),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::KeyNotFound(_) => None,
        }
    }
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        Error::Scan(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

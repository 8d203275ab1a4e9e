//! Unified error type.

use std::fmt;

/// The error type returned by strata's fallible operations.
///
/// Failures inside a request's decode chain are [`Rejection`](crate::Rejection)s
/// and become HTTP responses. This type surfaces configuration mistakes made
/// while building decoders: an origin pattern that does not compile, or a
/// method list that cannot be a header value.
#[derive(Debug)]
pub enum Error {
    Pattern(regex::Error),
    Header(http::header::InvalidHeaderValue),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "invalid origin pattern: {e}"),
            Self::Header(e)  => write!(f, "invalid header value: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Header(e)  => Some(e),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Pattern(e)
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        Self::Header(e)
    }
}

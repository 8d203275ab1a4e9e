//! Early exit from a decode chain.

use std::fmt;

use http::StatusCode;
use serde_json::json;

use crate::response::{IntoResponse, Response};

/// Why a request stopped before (or inside) its handler.
///
/// Decode steps and handlers fail by returning a `Rejection`. The router
/// writes it as the request's only response: the status, and the message as
/// a JSON body `{"message": "..."}`.
///
/// Any [`std::error::Error`] converts into a `500 Internal Server Error`
/// rejection, so handlers can use `?` on their own fallible calls.
pub struct Rejection {
    status: StatusCode,
    message: Option<String>,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: Some(message.into()) }
    }

    /// `400 Bad Request`: the caller sent something malformed or invalid.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// `500 Internal Server Error`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Stops the chain with `status` and an empty body.
    pub fn empty(status: StatusCode) -> Self {
        Self { status, message: None }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
}

impl<E> From<E> for Rejection
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Self::internal(e.to_string())
    }
}

impl fmt::Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejection")
            .field("status", &self.status.as_u16())
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => Response::builder()
                .status(self.status)
                .json(json!({ "message": message }).to_string()),
            None => Response::status(self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_written_as_json() {
        let res = Rejection::bad_request("count is not 1").into_response();
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "count is not 1");
    }

    #[test]
    fn empty_rejection_has_no_body() {
        let res = Rejection::empty(StatusCode::FORBIDDEN).into_response();
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(res.body().is_empty());
    }

    #[test]
    fn foreign_errors_default_to_internal() {
        let io = std::io::Error::other("disk on fire");
        let rejection = Rejection::from(io);
        assert_eq!(rejection.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rejection.message(), Some("disk on fire"));
    }
}

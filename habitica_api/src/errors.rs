//! Error types for the API client.

use std::fmt;

use serde_json::Value;

/// Fixed message carried by every [`Error::UnknownConnection`].
pub const UNKNOWN_CONNECTION_MESSAGE: &str = "An unknown error occurred";

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server rejected the request with a structured error body.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// No usable server response (network failure, timeout, malformed response).
    #[error("{}", UNKNOWN_CONNECTION_MESSAGE)]
    UnknownConnection(#[source] ConnectionFailure),
    /// A value produced by an installed error handler.
    #[error(transparent)]
    Handled(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wraps any error value so an error handler can return it.
    pub fn handled<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Handled(Box::new(error))
    }

    /// HTTP status of an [`Error::Api`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Service-defined error tag of an [`Error::Api`], if any.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.error_type.as_deref(),
            _ => None,
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    pub fn is_unknown_connection(&self) -> bool {
        matches!(self, Self::UnknownConnection(_))
    }
}

/// A structured failure returned by the Habitica server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Service-defined error tag, e.g. `NotAuthorized`.
    pub error_type: Option<String>,
    /// Human readable message from the response body.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(error_type) = &self.error_type {
            write!(f, " {}", error_type)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// The original failure behind an [`Error::UnknownConnection`].
#[derive(thiserror::Error, Debug)]
pub enum ConnectionFailure {
    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid request URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Malformed error response (HTTP {status}): {body}")]
    MalformedErrorBody {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to decode response body: {body}")]
    MalformedBody {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A failed request as seen by the transport, before classification.
#[derive(Debug)]
pub(crate) enum RawFailure {
    /// The server answered with a non-2xx status and this body text.
    Response { status: u16, text: String },
    /// No usable response.
    Connection(ConnectionFailure),
}

impl From<reqwest::Error> for RawFailure {
    fn from(e: reqwest::Error) -> Self {
        Self::Connection(ConnectionFailure::Transport(e))
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Converts a raw transport failure into a typed domain error.
///
/// Any JSON body on a non-2xx response yields an [`Error::Api`]; fields that are
/// missing or not strings are left unset. A body that is not valid JSON is reported as an
/// [`Error::UnknownConnection`] carrying the body and the parse error.
pub(crate) fn format_error(failure: RawFailure) -> Error {
    match failure {
        RawFailure::Response { status, text } => {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => Error::Api(ApiError {
                    status,
                    error_type: string_field(&body, "error"),
                    message: string_field(&body, "message"),
                }),
                Err(source) => Error::UnknownConnection(ConnectionFailure::MalformedErrorBody {
                    status,
                    body: truncate_body(&text),
                    source,
                }),
            }
        }
        RawFailure::Connection(failure) => Error::UnknownConnection(failure),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

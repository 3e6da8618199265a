//! Error types for the Zendesk client.
//!
//! # Design
//! 404 and 422 map to `NotFound` and `Invalid`; any other unexpected status
//! is an `HttpError`. The `Missing*` and `SelfDeletion` variants are raised
//! locally, before any request is issued.

use thiserror::Error;

/// Errors returned by requests, models and sign-on helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 422; `body` carries the validation details.
    #[error("record invalid: {body}")]
    Invalid { body: String },

    /// The server returned a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Mandatory attributes were absent before a create call.
    #[error("{resource} requires {attributes:?}")]
    MissingAttributes {
        resource: &'static str,
        attributes: Vec<&'static str>,
    },

    /// The operation needs a persisted record.
    #[error("{resource} has no identity")]
    MissingIdentity { resource: &'static str },

    /// Refused to destroy the user the session is authenticated as.
    #[error("refusing to destroy the acting user {email}")]
    SelfDeletion { email: String },

    #[error("timestamp is required to build a login url")]
    MissingTimestamp,

    /// A session credential or setting is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

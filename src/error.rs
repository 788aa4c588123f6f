// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `PlatyR` library.
//!
//! This module provides a comprehensive error hierarchy for handling failures
//! across the library: configuration validation, protocol communication, JSON
//! parsing, action execution, and authentication.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when interacting
/// with a Platypush hub.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while validating client configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a message.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An action request was accepted by the hub but failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The hub rejected the request for authentication reasons.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Errors related to client configuration.
///
/// These errors occur when attempting to build a client from invalid
/// connection parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The hub host is empty.
    #[error("hub host must not be empty")]
    EmptyHost,

    /// The configured parameters do not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A duration parameter is outside the allowed range.
    #[error("{name} of {actual} ms is below the minimum of {min} ms")]
    DurationTooShort {
        /// The parameter that was rejected.
        name: &'static str,
        /// Minimum allowed value in milliseconds.
        min: u64,
        /// The actual value that was provided.
        actual: u64,
    },
}

/// Errors related to protocol communication.
///
/// The event socket handles its own transport failures internally (they
/// feed the reconnect loop and never escape to callers), so only the
/// action client's failure modes surface here.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// Errors related to parsing hub messages.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the message.
    #[error("missing field in message: {0}")]
    MissingField(String),

    /// Unexpected message format.
    #[error("unexpected message format: {0}")]
    UnexpectedFormat(String),
}

/// Errors returned by the hub's action API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The hub executed the action and reported one or more errors.
    #[error("action {action} failed: {}", errors.join("; "))]
    Action {
        /// The fully qualified action name that failed.
        action: String,
        /// Error messages reported by the hub.
        errors: Vec<String>,
    },

    /// The hub answered with an unexpected HTTP status.
    #[error("action {action} failed with HTTP status {code}")]
    Status {
        /// The fully qualified action name that failed.
        action: String,
        /// The HTTP status code.
        code: u16,
    },

    /// The hub answered 2xx but the body carried no response envelope.
    #[error("empty response for action {action}")]
    EmptyResponse {
        /// The fully qualified action name.
        action: String,
    },
}

/// Authentication failures reported by the hub.
///
/// These map to the HTTP statuses the hub uses for session handling. The
/// embedding application decides how to recover, typically by navigating to
/// the login or registration page (see
/// [`login_redirect`](crate::api::login_redirect)).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session or credentials were presented (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The session is valid but not allowed to perform the request (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// The hub has no registered users yet (HTTP 412).
    #[error("user registration required")]
    RegistrationRequired,
}

impl AuthError {
    /// Maps an HTTP status code to the corresponding authentication error.
    ///
    /// Returns `None` for statuses that do not signal an authentication
    /// problem.
    #[must_use]
    pub fn from_status(code: u16) -> Option<Self> {
        match code {
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            412 => Some(Self::RegistrationRequired),
            _ => None,
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

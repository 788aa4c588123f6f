// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session token handling and cookie header helpers.
//!
//! The hub authenticates requests through a `session_token` cookie.
//! [`Session`] carries that token and renders it as a cookie pair; the
//! free functions parse and format `Cookie:` header strings without
//! touching domain or security attributes.
//!
//! # Examples
//!
//! ```
//! use platyr_lib::session::{Session, SESSION_COOKIE};
//!
//! let session = Session::from_cookie_header("theme=dark; session_token=abc123");
//! assert_eq!(session.token(), Some("abc123"));
//! assert_eq!(session.cookie().as_deref(), Some("session_token=abc123"));
//! assert_eq!(SESSION_COOKIE, "session_token");
//! ```

/// Name of the cookie carrying the hub session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Authentication state for a hub, held as an optional session token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Creates an unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session holding the given token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Extracts the session from a `Cookie:` header string.
    ///
    /// Headers without a `session_token` cookie produce an
    /// unauthenticated session.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Self {
        Self {
            token: cookie_value(header, SESSION_COOKIE),
        }
    }

    /// Returns the session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replaces the session token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drops the session token.
    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Returns `true` when a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Renders the session as a `session_token=<token>` cookie pair.
    ///
    /// Returns `None` for unauthenticated sessions.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(|token| format_cookie(SESSION_COOKIE, token))
    }
}

/// Parses a `Cookie:` header string into name/value pairs.
///
/// Pairs are returned in header order; entries without a `=` separator
/// are skipped. Values are kept verbatim, without percent-decoding.
///
/// # Examples
///
/// ```
/// use platyr_lib::session::parse_cookies;
///
/// let cookies = parse_cookies("a=1; b=2");
/// assert_eq!(cookies, vec![("a".into(), "1".into()), ("b".into(), "2".into())]);
/// ```
#[must_use]
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Returns the value of the named cookie from a `Cookie:` header string.
///
/// When a name repeats, the first occurrence wins.
#[must_use]
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    parse_cookies(header)
        .into_iter()
        .find(|(cookie, _)| cookie == name)
        .map(|(_, value)| value)
}

/// Formats a single cookie pair for a `Cookie:` header.
#[must_use]
pub fn format_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}")
}

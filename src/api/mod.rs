// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action execution over the hub's HTTP API.
//!
//! [`ExecuteClient`] posts request envelopes to `POST /execute` and maps
//! the response into output values or typed failures.
//! [`login_redirect`] turns an authentication failure into the location
//! of the recovery page.

mod execute;

pub use execute::ExecuteClient;

use crate::error::AuthError;

/// Computes the recovery location for an authentication failure.
///
/// HTTP 401 and 403 recover through `/login`, HTTP 412 through
/// `/register`; the current path rides along as the `redirect` query
/// parameter so the user lands back where they started. Returns `None`
/// when the current path already points at the recovery page, so callers
/// never redirect in a loop.
///
/// # Examples
///
/// ```
/// use platyr_lib::api::login_redirect;
/// use platyr_lib::error::AuthError;
///
/// let location = login_redirect(&AuthError::Unauthorized, "/panel/music");
/// assert_eq!(location.as_deref(), Some("/login?redirect=%2Fpanel%2Fmusic"));
///
/// assert_eq!(login_redirect(&AuthError::Unauthorized, "/login"), None);
/// ```
#[must_use]
pub fn login_redirect(error: &AuthError, current_path: &str) -> Option<String> {
    let destination = match error {
        AuthError::Unauthorized | AuthError::Forbidden => "/login",
        AuthError::RegistrationRequired => "/register",
    };
    if current_path.starts_with(destination) {
        return None;
    }
    Some(format!(
        "{destination}?redirect={}",
        urlencoding::encode(current_path)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_and_forbidden_go_to_login() {
        assert_eq!(
            login_redirect(&AuthError::Unauthorized, "/panel/music"),
            Some("/login?redirect=%2Fpanel%2Fmusic".to_owned())
        );
        assert_eq!(
            login_redirect(&AuthError::Forbidden, "/panel/music"),
            Some("/login?redirect=%2Fpanel%2Fmusic".to_owned())
        );
    }

    #[test]
    fn registration_required_goes_to_register() {
        assert_eq!(
            login_redirect(&AuthError::RegistrationRequired, "/"),
            Some("/register?redirect=%2F".to_owned())
        );
    }

    #[test]
    fn never_redirects_from_the_destination_page() {
        assert_eq!(login_redirect(&AuthError::Unauthorized, "/login"), None);
        assert_eq!(
            login_redirect(&AuthError::Unauthorized, "/login?redirect=%2F"),
            None
        );
        assert_eq!(
            login_redirect(&AuthError::RegistrationRequired, "/register"),
            None
        );
    }

    #[test]
    fn query_strings_survive_the_round_trip() {
        let location = login_redirect(&AuthError::Unauthorized, "/panel/music?view=queue");
        assert_eq!(
            location.as_deref(),
            Some("/login?redirect=%2Fpanel%2Fmusic%3Fview%3Dqueue")
        );
    }
}

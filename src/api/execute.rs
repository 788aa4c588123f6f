// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the hub's `/execute` action endpoint.

use std::time::Duration;

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, AuthError, ProtocolError, Result};
use crate::session::Session;

// ============================================================================
// ExecuteClient - Action execution over POST /execute
// ============================================================================

/// Client for running actions on a hub.
///
/// Actions are dotted `plugin.method` names posted to `/execute` as a
/// request envelope. The hub runs the action and answers with an output
/// value or a list of errors; failures come back as typed errors so
/// callers decide their own rollback or retry policy.
///
/// # Examples
///
/// ```no_run
/// use platyr_lib::api::ExecuteClient;
/// use platyr_lib::ClientConfig;
/// use serde_json::json;
///
/// # async fn example() -> platyr_lib::Result<()> {
/// let client = ExecuteClient::new(&ClientConfig::new("hub.local"))?;
/// let status = client.execute("music.mpd.pause", json!({})).await?;
/// println!("{status}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExecuteClient {
    execute_url: String,
    client: Client,
    session: Session,
    target: String,
    timeout: Duration,
}

impl ExecuteClient {
    /// Creates an execute client for the configured hub.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if the
    /// configuration is invalid, or [`ProtocolError`] if the HTTP client
    /// cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ProtocolError::Http)?;

        let session = match config.token() {
            Some(token) => Session::with_token(token),
            None => Session::new(),
        };

        Ok(Self {
            execute_url: format!("{}/execute", config.base_url()),
            client,
            session,
            target: config.target().to_owned(),
            timeout: config.request_timeout(),
        })
    }

    /// Returns the URL actions are posted to.
    #[must_use]
    pub fn execute_url(&self) -> &str {
        &self.execute_url
    }

    /// Returns the session used for authentication.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs an action with the configured timeout.
    ///
    /// `args` holds the action's keyword arguments; `Value::Null` is
    /// treated as an empty argument object.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the hub reports an action failure or an
    /// unexpected status, [`AuthError`] for HTTP 401/403/412, and
    /// [`ProtocolError`] for transport failures and timeouts.
    pub async fn execute(&self, action: &str, args: Value) -> Result<Value> {
        self.execute_with_timeout(action, args, self.timeout).await
    }

    /// Runs an action with a per-call timeout.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_timeout(
        &self,
        action: &str,
        args: Value,
        timeout: Duration,
    ) -> Result<Value> {
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let envelope = RequestEnvelope::new(action, &args, &self.target);
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(action, id = %envelope.id, "Executing action");

        let mut request = self
            .client
            .post(&self.execute_url)
            .timeout(timeout)
            .json(&envelope);
        if let Some(cookie) = self.session.cookie() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                ProtocolError::Timeout(timeout_ms)
            } else {
                ProtocolError::Http(error)
            }
        })?;

        let status = response.status();
        if let Some(auth) = AuthError::from_status(status.as_u16()) {
            tracing::warn!(action, code = status.as_u16(), "Action rejected by auth");
            return Err(auth.into());
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                action: action.to_owned(),
                code: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        let Ok(envelope) = serde_json::from_str::<ResponseEnvelope>(&body) else {
            return Err(ApiError::EmptyResponse {
                action: action.to_owned(),
            }
            .into());
        };

        let errors = envelope.response.error_messages();
        if errors.is_empty() {
            Ok(envelope.response.output)
        } else {
            Err(ApiError::Action {
                action: action.to_owned(),
                errors,
            }
            .into())
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Request body for `POST /execute`.
#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    id: String,
    action: &'a str,
    args: &'a Value,
    target: &'a str,
}

impl<'a> RequestEnvelope<'a> {
    fn new(action: &'a str, args: &'a Value, target: &'a str) -> Self {
        Self {
            message_type: "request",
            id: Uuid::new_v4().to_string(),
            action,
            args,
            target,
        }
    }
}

/// Response body for `POST /execute`.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    output: Value,
    #[serde(default)]
    errors: Vec<Value>,
}

impl ResponseBody {
    /// Renders the error list as display strings.
    ///
    /// The hub usually sends strings but tracebacks may arrive as other
    /// JSON values.
    fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| match error {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

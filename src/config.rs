// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration for connecting to a Platypush hub.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a Platypush hub client.
///
/// Holds the connection parameters shared by the HTTP action client and the
/// WebSocket event socket. All parts of the client read from one
/// `ClientConfig`, so host, credentials and timeouts stay consistent across
/// transports.
///
/// # Examples
///
/// ```
/// use platyr_lib::ClientConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = ClientConfig::new("hub.local");
///
/// // With all options
/// let config = ClientConfig::new("hub.local")
///     .with_port(8443)
///     .with_tls()
///     .with_token("s3cret")
///     .with_request_timeout(Duration::from_secs(15));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host: String,
    port: u16,
    use_tls: bool,
    token: Option<String>,
    target: String,
    request_timeout: Duration,
    reconnect_floor: Duration,
    reconnect_ceiling: Duration,
    cache_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Default hub HTTP port.
    pub const DEFAULT_PORT: u16 = 8008;
    /// Default action request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    /// Initial reconnect window for the event socket.
    pub const DEFAULT_RECONNECT_FLOOR: Duration = Duration::from_millis(1000);
    /// Maximum reconnect window for the event socket.
    pub const DEFAULT_RECONNECT_CEILING: Duration = Duration::from_millis(30_000);
    /// Default action target.
    pub const DEFAULT_TARGET: &'static str = "localhost";

    /// Creates a new configuration for the specified hub host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the Platypush hub
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_tls: false,
            token: None,
            target: Self::DEFAULT_TARGET.to_string(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            reconnect_floor: Self::DEFAULT_RECONNECT_FLOOR,
            reconnect_ceiling: Self::DEFAULT_RECONNECT_CEILING,
            cache_path: None,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables TLS (`https`/`wss` schemes).
    #[must_use]
    pub fn with_tls(mut self) -> Self {
        self.use_tls = true;
        self
    }

    /// Sets the session token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the target the hub should route actions to.
    ///
    /// Defaults to `localhost`, which addresses the hub itself.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the action request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the initial reconnect window for the event socket.
    #[must_use]
    pub fn with_reconnect_floor(mut self, floor: Duration) -> Self {
        self.reconnect_floor = floor;
        self
    }

    /// Sets the maximum reconnect window for the event socket.
    #[must_use]
    pub fn with_reconnect_ceiling(mut self, ceiling: Duration) -> Self {
        self.reconnect_ceiling = ceiling;
        self
    }

    /// Sets the file used to persist the entity cache between runs.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether TLS is enabled.
    #[must_use]
    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Returns the session token if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the action target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the action request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the initial reconnect window.
    #[must_use]
    pub fn reconnect_floor(&self) -> Duration {
        self.reconnect_floor
    }

    /// Returns the maximum reconnect window.
    #[must_use]
    pub fn reconnect_ceiling(&self) -> Duration {
        self.reconnect_ceiling
    }

    /// Returns the entity cache file if set.
    #[must_use]
    pub fn cache_path(&self) -> Option<&PathBuf> {
        self.cache_path.as_ref()
    }

    /// Builds the base HTTP URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{scheme}://{}{}", self.host, self.port_suffix())
    }

    /// Builds the WebSocket URL of the hub's event stream.
    #[must_use]
    pub fn events_url(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{scheme}://{}{}/ws/events", self.host, self.port_suffix())
    }

    fn port_suffix(&self) -> String {
        if (self.use_tls && self.port == 443) || (!self.use_tls && self.port == 80) {
            String::new()
        } else {
            format!(":{}", self.port)
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the host is empty, a timeout is zero, or
    /// the reconnect ceiling is below the floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.host.contains('/') || self.host.contains("://") {
            return Err(ConfigError::InvalidUrl(self.host.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::DurationTooShort {
                name: "request timeout",
                min: 1,
                actual: 0,
            });
        }
        if self.reconnect_floor.is_zero() {
            return Err(ConfigError::DurationTooShort {
                name: "reconnect floor",
                min: 1,
                actual: 0,
            });
        }
        if self.reconnect_ceiling < self.reconnect_floor {
            return Err(ConfigError::DurationTooShort {
                name: "reconnect ceiling",
                min: u64::try_from(self.reconnect_floor.as_millis()).unwrap_or(u64::MAX),
                actual: u64::try_from(self.reconnect_ceiling.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = ClientConfig::new("hub.local");
        assert_eq!(config.host(), "hub.local");
        assert_eq!(config.port(), 8008);
        assert!(!config.use_tls());
        assert!(config.token().is_none());
        assert_eq!(config.target(), "localhost");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.reconnect_floor(), Duration::from_millis(1000));
        assert_eq!(config.reconnect_ceiling(), Duration::from_millis(30_000));
    }

    #[test]
    fn base_url_default_port() {
        let config = ClientConfig::new("hub.local");
        assert_eq!(config.base_url(), "http://hub.local:8008");
    }

    #[test]
    fn base_url_elides_standard_ports() {
        let config = ClientConfig::new("hub.local").with_port(80);
        assert_eq!(config.base_url(), "http://hub.local");

        let config = ClientConfig::new("hub.local").with_port(443).with_tls();
        assert_eq!(config.base_url(), "https://hub.local");
    }

    #[test]
    fn base_url_tls_custom_port() {
        let config = ClientConfig::new("hub.local").with_port(8443).with_tls();
        assert_eq!(config.base_url(), "https://hub.local:8443");
    }

    #[test]
    fn events_url_follows_scheme() {
        let config = ClientConfig::new("hub.local");
        assert_eq!(config.events_url(), "ws://hub.local:8008/ws/events");

        let config = ClientConfig::new("hub.local").with_tls();
        assert_eq!(config.events_url(), "wss://hub.local:8008/ws/events");
    }

    #[test]
    fn validate_rejects_empty_host() {
        let config = ClientConfig::new("");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHost)));
    }

    #[test]
    fn validate_rejects_host_with_scheme() {
        let config = ClientConfig::new("http://hub.local");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ClientConfig::new("hub.local").with_request_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationTooShort { .. })
        ));
    }

    #[test]
    fn validate_rejects_ceiling_below_floor() {
        let config = ClientConfig::new("hub.local")
            .with_reconnect_floor(Duration::from_secs(5))
            .with_reconnect_ceiling(Duration::from_secs(2));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationTooShort {
                name: "reconnect ceiling",
                ..
            })
        ));
    }

    #[test]
    fn builder_chain() {
        let config = ClientConfig::new("hub.local")
            .with_port(8443)
            .with_tls()
            .with_token("s3cret")
            .with_target("media-box")
            .with_request_timeout(Duration::from_secs(5))
            .with_cache_path("/tmp/entities.json");

        assert_eq!(config.port(), 8443);
        assert!(config.use_tls());
        assert_eq!(config.token(), Some("s3cret"));
        assert_eq!(config.target(), "media-box");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!(config.cache_path().is_some());
        assert!(config.validate().is_ok());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a real Platypush hub.
//!
//! These tests require a reachable hub and are ignored by default.
//! Run with: `cargo test --test real_hub -- --ignored`
//!
//! # Environment Variables
//!
//! - `PLATYPUSH_HOST` - Hub hostname or IP address
//! - `PLATYPUSH_PORT` - Hub port (default: 8008)
//! - `PLATYPUSH_TOKEN` - Session token, if the hub requires one
//!
//! # Example
//!
//! ```bash
//! export PLATYPUSH_HOST=192.168.1.10
//! export PLATYPUSH_TOKEN=secret
//! cargo test --test real_hub -- --ignored
//! ```

#![cfg(all(feature = "http", feature = "ws"))]

use std::env;
use std::time::Duration;

use platyr_lib::{ClientConfig, Hub};
use serde_json::json;
use tokio::time::sleep;

fn hub_config() -> ClientConfig {
    let host = env::var("PLATYPUSH_HOST").expect("PLATYPUSH_HOST not set");
    let port = env::var("PLATYPUSH_PORT")
        .unwrap_or_else(|_| "8008".to_string())
        .parse()
        .expect("Invalid PLATYPUSH_PORT");

    let mut config = ClientConfig::new(host).with_port(port);
    if let Ok(token) = env::var("PLATYPUSH_TOKEN") {
        config = config.with_token(token);
    }
    config
}

#[tokio::test]
#[ignore]
async fn connects_to_the_event_stream() {
    let hub = Hub::new(hub_config()).unwrap();
    hub.connect();

    let mut connected = false;
    for _ in 0..50 {
        if hub.is_connected() {
            connected = true;
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    assert!(connected, "hub did not open the event stream within 5s");

    hub.shutdown().await;
    assert!(!hub.is_connected());
}

#[tokio::test]
#[ignore]
async fn runs_a_read_only_action() {
    let hub = Hub::new(hub_config()).unwrap();

    let output = hub.execute("config.get", json!({})).await.unwrap();
    assert!(output.is_object(), "config.get should return an object");

    hub.shutdown().await;
}

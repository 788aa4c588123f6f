// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire envelope parsing for the hub event stream.

use serde_json::{Map, Value};

use crate::error::ParseError;

use super::{EventKind, EventName};

/// A parsed hub event.
///
/// Carries the event class name, the raw `args` payload, and a typed
/// [`EventKind`] view over the well-known classes. Handlers receive events by
/// reference; clone when a handler needs to keep one.
///
/// # Examples
///
/// ```
/// use platyr_lib::event::{parse_frame, EventKind};
///
/// let frame = r#"{
///     "type": "event",
///     "args": {
///         "type": "platypush.message.event.music.MusicPlayEvent",
///         "plugin": "music.mpd"
///     }
/// }"#;
///
/// let event = parse_frame(frame).unwrap().unwrap();
/// assert_eq!(event.name().short_name(), "MusicPlayEvent");
/// assert!(matches!(event.kind(), EventKind::MusicPlay));
/// ```
#[derive(Debug, Clone)]
pub struct Event {
    name: EventName,
    args: Map<String, Value>,
    kind: EventKind,
}

impl Event {
    /// Creates an event from a class name and payload, classifying it.
    #[must_use]
    pub fn new(name: EventName, args: Map<String, Value>) -> Self {
        let kind = EventKind::classify(&name, &args);
        Self { name, args, kind }
    }

    /// Returns the event class name.
    #[must_use]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Returns the typed view of this event.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Returns the raw event payload.
    #[must_use]
    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    /// Returns one payload field by name.
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }
}

/// Parses one frame from the hub's event stream.
///
/// The hub multiplexes message kinds over one socket; only envelopes with a
/// top-level `type` of `"event"` concern this client. Those parse into an
/// [`Event`]; everything else returns `Ok(None)` and is ignored.
///
/// # Errors
///
/// Returns [`ParseError`] when the frame is not valid JSON, is not an
/// object, or is an event envelope without a `args.type` class name.
pub fn parse_frame(text: &str) -> Result<Option<Event>, ParseError> {
    let value: Value = serde_json::from_str(text)?;

    let Value::Object(envelope) = value else {
        return Err(ParseError::UnexpectedFormat(
            "frame is not a JSON object".to_string(),
        ));
    };

    if envelope.get("type").and_then(Value::as_str) != Some("event") {
        return Ok(None);
    }

    let args = match envelope.get("args") {
        Some(Value::Object(args)) => args.clone(),
        Some(_) => {
            return Err(ParseError::UnexpectedFormat(
                "event args is not a JSON object".to_string(),
            ));
        }
        None => return Err(ParseError::MissingField("args".to_string())),
    };

    let Some(name) = args.get("type").and_then(Value::as_str) else {
        return Err(ParseError::MissingField("args.type".to_string()));
    };

    Ok(Some(Event::new(EventName::new(name), args)))
}

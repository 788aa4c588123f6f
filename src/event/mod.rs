// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub event model.
//!
//! This module defines the shape of events received over the hub's WebSocket
//! stream: the wire envelope, the dotted [`EventName`] identifying an event
//! class, and the typed [`EventKind`] view over the classes this library
//! knows about.
//!
//! # Examples
//!
//! ```
//! use platyr_lib::event::{parse_frame, EventKind};
//!
//! let frame = r#"{
//!     "type": "event",
//!     "args": {"type": "platypush.message.event.assistant.ConversationStartEvent"}
//! }"#;
//!
//! let event = parse_frame(frame).unwrap().unwrap();
//! assert!(matches!(event.kind(), EventKind::ConversationStart));
//! ```

mod envelope;
mod kind;
mod name;

pub use envelope::{Event, parse_frame};
pub use kind::{EventKind, Track};
pub use name::EventName;

pub use kind::{
    CONVERSATION_END, CONVERSATION_START, ENTITY_DELETE, ENTITY_UPDATE, MUSIC_PAUSE, MUSIC_PLAY,
    MUSIC_STOP, NEW_PLAYING_TRACK, SPEECH_RECOGNIZED,
};

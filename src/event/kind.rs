// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed classification of well-known hub events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;

use super::EventName;

/// Event class emitted when music playback starts.
pub const MUSIC_PLAY: &str = "platypush.message.event.music.MusicPlayEvent";
/// Event class emitted when music playback pauses.
pub const MUSIC_PAUSE: &str = "platypush.message.event.music.MusicPauseEvent";
/// Event class emitted when music playback stops.
pub const MUSIC_STOP: &str = "platypush.message.event.music.MusicStopEvent";
/// Event class emitted when the playing track changes.
pub const NEW_PLAYING_TRACK: &str = "platypush.message.event.music.NewPlayingTrackEvent";
/// Event class emitted when an entity changes state.
pub const ENTITY_UPDATE: &str = "platypush.message.event.entities.EntityUpdateEvent";
/// Event class emitted when an entity is removed.
pub const ENTITY_DELETE: &str = "platypush.message.event.entities.EntityDeleteEvent";
/// Event class emitted when an assistant conversation starts.
pub const CONVERSATION_START: &str = "platypush.message.event.assistant.ConversationStartEvent";
/// Event class emitted when an assistant conversation ends.
pub const CONVERSATION_END: &str = "platypush.message.event.assistant.ConversationEndEvent";
/// Event class emitted when the assistant recognizes a phrase.
pub const SPEECH_RECOGNIZED: &str = "platypush.message.event.assistant.SpeechRecognizedEvent";

/// A track as reported by music plugins.
///
/// Music backends differ in what they report; every field is optional and
/// absent fields stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Track artist.
    #[serde(default)]
    pub artist: Option<String>,

    /// Track title.
    #[serde(default)]
    pub title: Option<String>,

    /// Album name.
    #[serde(default)]
    pub album: Option<String>,

    /// Track length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,

    /// Source URL or file path.
    #[serde(default)]
    pub url: Option<String>,
}

/// Typed view over the well-known hub event classes.
///
/// Classification is lossless for the caller: the full raw payload stays
/// available on the enclosing [`Event`](super::Event), and event classes this
/// library does not know about classify as [`Unknown`](Self::Unknown) rather
/// than failing.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Music playback started.
    MusicPlay,

    /// Music playback paused.
    MusicPause,

    /// Music playback stopped.
    MusicStop,

    /// The playing track changed.
    NewPlayingTrack {
        /// The new track, when the payload carried one.
        track: Option<Track>,
    },

    /// An entity changed state.
    EntityUpdate {
        /// The updated entity.
        entity: Entity,
    },

    /// An entity was removed.
    EntityDelete {
        /// The removed entity.
        entity: Entity,
    },

    /// An assistant conversation started.
    ConversationStart,

    /// An assistant conversation ended.
    ConversationEnd,

    /// The assistant recognized a spoken phrase.
    SpeechRecognized {
        /// The recognized phrase.
        phrase: String,
    },

    /// An event class this library has no typed mapping for.
    Unknown,
}

impl EventKind {
    /// Classifies an event by its class name and payload.
    ///
    /// Payloads that do not match the expected shape for their class (an
    /// entity event without a decodable `entity`, a speech event without a
    /// `phrase`) classify as [`Unknown`](Self::Unknown); the raw payload
    /// remains available on the event.
    #[must_use]
    pub fn classify(name: &EventName, args: &Map<String, Value>) -> Self {
        match name.as_str() {
            MUSIC_PLAY => Self::MusicPlay,
            MUSIC_PAUSE => Self::MusicPause,
            MUSIC_STOP => Self::MusicStop,
            NEW_PLAYING_TRACK => Self::NewPlayingTrack {
                track: args
                    .get("track")
                    .and_then(|value| serde_json::from_value(value.clone()).ok()),
            },
            ENTITY_UPDATE => match decode_entity(args) {
                Some(entity) => Self::EntityUpdate { entity },
                None => Self::Unknown,
            },
            ENTITY_DELETE => match decode_entity(args) {
                Some(entity) => Self::EntityDelete { entity },
                None => Self::Unknown,
            },
            CONVERSATION_START => Self::ConversationStart,
            CONVERSATION_END => Self::ConversationEnd,
            SPEECH_RECOGNIZED => match args.get("phrase").and_then(Value::as_str) {
                Some(phrase) => Self::SpeechRecognized {
                    phrase: phrase.to_string(),
                },
                None => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }

    /// Returns `true` if this is a music playback event.
    #[must_use]
    pub fn is_music(&self) -> bool {
        matches!(
            self,
            Self::MusicPlay | Self::MusicPause | Self::MusicStop | Self::NewPlayingTrack { .. }
        )
    }

    /// Returns `true` if this is an entity event.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::EntityUpdate { .. } | Self::EntityDelete { .. })
    }

    /// Returns `true` if this is an assistant event.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        matches!(
            self,
            Self::ConversationStart | Self::ConversationEnd | Self::SpeechRecognized { .. }
        )
    }

    /// Returns the entity carried by an entity event.
    #[must_use]
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Self::EntityUpdate { entity } | Self::EntityDelete { entity } => Some(entity),
            _ => None,
        }
    }
}

fn decode_entity(args: &Map<String, Value>) -> Option<Entity> {
    let value = args.get("entity")?;
    match serde_json::from_value(value.clone()) {
        Ok(entity) => Some(entity),
        Err(error) => {
            tracing::warn!(%error, "Undecodable entity payload in entity event");
            None
        }
    }
}

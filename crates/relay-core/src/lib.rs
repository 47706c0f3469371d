//! Turns webhook payloads from unrelated producers into chat-ready text.
//!
//! The producers share no envelope, so relay sniffs: every known
//! [`EventSchema`] is tried against the raw buffer, each schema that both
//! decodes and passes its validity check contributes its message, and a
//! payload nothing recognizes is rendered as a sorted key/value dump.
//!
//! ```
//! let buf = br#"{"eventType":"Grab","series":{"title":"Foo"},
//!     "episodes":[{"seasonNumber":1,"episodeNumber":2}]}"#;
//! assert_eq!(relay_core::buffer_to_message(buf).unwrap(), "Sonarr: Foo 1x02 - \"Grab\"\n");
//! ```

use serde::de::{DeserializeOwned, Error as _, Unexpected};
use serde_json::Value;
use std::fmt;

pub mod dispatch;
pub mod error;
pub mod event;
pub mod fallback;
pub mod fold;

pub use dispatch::{
    attempt, buffer_to_message, buffer_to_message_with, Attempt, Diagnostics, Outcome, SCHEMA_ORDER,
};
#[cfg(feature = "telemetry")]
pub use dispatch::TracingDiagnostics;
pub use error::{RelayError, Result};
pub use event::{AlbumEvent, IncidentEvent, MediaPlayerEvent, SeriesEvent};
pub use fallback::{fallback, GenericFields};
pub use fold::Field;

/// The producer a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Series,
    Album,
    Incident,
    MediaPlayer,
}

impl SchemaKind {
    /// Name of the producing application, used as the message prefix.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Series => "Sonarr",
            Self::Album => "Lidarr",
            Self::Incident => "GCP",
            Self::MediaPlayer => "Plex",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A producer's payload shape together with its validity heuristic and formatter.
pub trait EventSchema: DeserializeOwned {
    const KIND: SchemaKind;

    /// Wire names of the fields this shape reads. Payload keys are matched
    /// against them case-insensitively before decoding.
    const FIELDS: &'static [Field];

    /// Decodes `buf` under this shape.
    ///
    /// Success only means the buffer is a JSON object whose load-bearing
    /// fields have the right types; it says nothing about whether the payload
    /// came from this producer. Check [`EventSchema::is_valid`] before use.
    fn decode(buf: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Value>(buf)? {
            Value::Object(object) => {
                serde_json::from_value(Value::Object(fold::fold_keys(object, Self::FIELDS)))
            }
            other => Err(serde_json::Error::invalid_type(
                unexpected(&other),
                &"a JSON object",
            )),
        }
    }

    /// Required-field check standing in for a discriminator.
    fn is_valid(&self) -> bool;

    /// One newline-terminated line per item in the payload.
    fn message(&self) -> String;

    fn into_variant(self) -> Variant;
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Every payload shape relay can render, including the generic fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    Series(SeriesEvent),
    Album(AlbumEvent),
    Incident(IncidentEvent),
    MediaPlayer(MediaPlayerEvent),
    Generic(GenericFields),
}

impl Variant {
    /// The schema this variant came from; `None` for the generic fallback.
    #[must_use]
    pub fn kind(&self) -> Option<SchemaKind> {
        match self {
            Self::Series(_) => Some(SchemaKind::Series),
            Self::Album(_) => Some(SchemaKind::Album),
            Self::Incident(_) => Some(SchemaKind::Incident),
            Self::MediaPlayer(_) => Some(SchemaKind::MediaPlayer),
            Self::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Series(e) => e.message(),
            Self::Album(e) => e.message(),
            Self::Incident(e) => e.message(),
            Self::MediaPlayer(e) => e.message(),
            Self::Generic(fields) => fields.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_prefix_messages() {
        assert_eq!(SchemaKind::Series.to_string(), "Sonarr");
        assert_eq!(SchemaKind::Album.to_string(), "Lidarr");
        assert_eq!(SchemaKind::Incident.to_string(), "GCP");
        assert_eq!(SchemaKind::MediaPlayer.to_string(), "Plex");
    }

    #[test]
    fn variant_kind_and_message() {
        let generic = Variant::Generic(GenericFields::default());
        assert_eq!(generic.kind(), None);
        assert_eq!(generic.message(), "");

        let incident = IncidentEvent::decode(br#"{"incident":{"incident_id":"1","summary":"s"}}"#)
            .expect("decode")
            .into_variant();
        assert_eq!(incident.kind(), Some(SchemaKind::Incident));
        assert_eq!(incident.message(), "GCP Alert - \"s\"\n");
    }
}

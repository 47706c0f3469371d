//! Payload shapes of the producers relay knows about.
//!
//! Each type mirrors only the fields relay needs to decide whether a payload
//! belongs to that producer and to render a one-line summary per item. Every
//! field is optional on the wire: a missing key or an explicit `null` decodes
//! to the zero value, so a payload from one producer usually decodes (uselessly)
//! under every other shape. [`EventSchema::is_valid`] is what tells them apart.

use serde::{Deserialize, Deserializer};
use std::fmt::{self, Write as _};

use crate::{EventSchema, Field, SchemaKind, Variant};

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Like [`nullable`], and also turns `null` list items into zero values.
fn nullable_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}

/// Double-quoted string with backslash escapes, the way Go's `%q` verb renders it.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\u{7}' => f.write_str("\\a")?,
                '\u{8}' => f.write_str("\\b")?,
                '\u{c}' => f.write_str("\\f")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                '\u{b}' => f.write_str("\\v")?,
                c if c == ' ' || !(c.is_control() || c.is_whitespace()) => f.write_char(c)?,
                c if c < ' ' || c == '\u{7f}' => write!(f, "\\x{:02x}", u32::from(c))?,
                c if u32::from(c) < 0x10000 => write!(f, "\\u{:04x}", u32::from(c))?,
                c => write!(f, "\\U{:08x}", u32::from(c))?,
            }
        }
        f.write_char('"')
    }
}

/// Download/import notification from a series library manager (Sonarr).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEvent {
    /// Event kind such as `"Grab"`, `"Download"` or `"Test"`.
    #[serde(default, deserialize_with = "nullable")]
    pub event_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub series: Series,
    #[serde(default, deserialize_with = "nullable_items")]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    #[serde(default, deserialize_with = "nullable")]
    pub season_number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub episode_number: i64,
}

impl EventSchema for SeriesEvent {
    const KIND: SchemaKind = SchemaKind::Series;
    const FIELDS: &'static [Field] = &[
        Field { name: "eventType", nested: &[] },
        Field { name: "series", nested: &[Field { name: "title", nested: &[] }] },
        Field {
            name: "episodes",
            nested: &[
                Field { name: "seasonNumber", nested: &[] },
                Field { name: "episodeNumber", nested: &[] },
            ],
        },
    ];

    fn is_valid(&self) -> bool {
        !self.event_type.is_empty() && !self.episodes.is_empty()
    }

    fn message(&self) -> String {
        self.episodes
            .iter()
            .map(|ep| {
                format!(
                    "{}: {} {}x{:02} - {}\n",
                    Self::KIND,
                    self.series.title,
                    ep.season_number,
                    ep.episode_number,
                    Quoted(&self.event_type)
                )
            })
            .collect()
    }

    fn into_variant(self) -> Variant {
        Variant::Series(self)
    }
}

/// Album notification from a music library manager (Lidarr).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub event_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub artist: Artist,
    #[serde(default, deserialize_with = "nullable_items")]
    pub albums: Vec<Album>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Artist {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Album {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
}

impl EventSchema for AlbumEvent {
    const KIND: SchemaKind = SchemaKind::Album;
    const FIELDS: &'static [Field] = &[
        Field { name: "eventType", nested: &[] },
        Field { name: "artist", nested: &[Field { name: "name", nested: &[] }] },
        Field { name: "albums", nested: &[Field { name: "title", nested: &[] }] },
    ];

    fn is_valid(&self) -> bool {
        !self.event_type.is_empty() && !self.albums.is_empty()
    }

    fn message(&self) -> String {
        self.albums
            .iter()
            .map(|album| {
                format!(
                    "{}: {} - {} - {}\n",
                    Self::KIND,
                    self.artist.name,
                    Quoted(&album.title),
                    self.event_type
                )
            })
            .collect()
    }

    fn into_variant(self) -> Variant {
        Variant::Album(self)
    }
}

/// Alerting incident from Google Cloud Monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IncidentEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub incident: Incident,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Incident {
    #[serde(default, deserialize_with = "nullable")]
    pub incident_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
}

impl EventSchema for IncidentEvent {
    const KIND: SchemaKind = SchemaKind::Incident;
    const FIELDS: &'static [Field] = &[Field {
        name: "incident",
        nested: &[
            Field { name: "incident_id", nested: &[] },
            Field { name: "summary", nested: &[] },
        ],
    }];

    fn is_valid(&self) -> bool {
        !self.incident.incident_id.is_empty()
    }

    fn message(&self) -> String {
        format!("{} Alert - {}\n", Self::KIND, Quoted(&self.incident.summary))
    }

    fn into_variant(self) -> Variant {
        Variant::Incident(self)
    }
}

/// Playback webhook from a Plex media server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaPlayerEvent {
    /// Event name such as `"media.play"`.
    #[serde(default, deserialize_with = "nullable")]
    pub event: String,
    #[serde(rename = "Metadata", default, deserialize_with = "nullable")]
    pub metadata: MediaMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// Show title for episodes.
    #[serde(default, deserialize_with = "nullable")]
    pub grandparent_title: String,
    /// Season number.
    #[serde(default, deserialize_with = "nullable")]
    pub parent_index: i64,
    /// Episode number.
    #[serde(default, deserialize_with = "nullable")]
    pub index: i64,
}

impl EventSchema for MediaPlayerEvent {
    const KIND: SchemaKind = SchemaKind::MediaPlayer;
    const FIELDS: &'static [Field] = &[
        Field { name: "event", nested: &[] },
        Field {
            name: "Metadata",
            nested: &[
                Field { name: "grandparentTitle", nested: &[] },
                Field { name: "parentIndex", nested: &[] },
                Field { name: "index", nested: &[] },
            ],
        },
    ];

    fn is_valid(&self) -> bool {
        !self.event.is_empty()
    }

    fn message(&self) -> String {
        format!(
            "{} - {} : {} {}x{}\n",
            Self::KIND,
            Quoted(&self.event),
            self.metadata.grandparent_title,
            self.metadata.parent_index,
            self.metadata.index
        )
    }

    fn into_variant(self) -> Variant {
        Variant::MediaPlayer(self)
    }
}

//! Tries every schema against a payload and assembles the final message.

use crate::error::{RelayError, Result};
use crate::event::{AlbumEvent, IncidentEvent, MediaPlayerEvent, SeriesEvent};
use crate::fallback::GenericFields;
use crate::{EventSchema, SchemaKind, Variant};

/// Order in which schemas are tried and their messages concatenated.
pub const SCHEMA_ORDER: [SchemaKind; 4] = [
    SchemaKind::Series,
    SchemaKind::Album,
    SchemaKind::Incident,
    SchemaKind::MediaPlayer,
];

type AttemptFn = fn(&[u8]) -> Attempt;

const ATTEMPTS: [AttemptFn; 4] = [
    attempt::<SeriesEvent>,
    attempt::<AlbumEvent>,
    attempt::<IncidentEvent>,
    attempt::<MediaPlayerEvent>,
];

/// What happened when one schema was tried against a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded and passed the validity check.
    Matched { variant: Variant, text: String },
    /// Decoded, but the required fields were empty.
    Invalid,
    /// The payload is not an object of this shape.
    DecodeFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub kind: SchemaKind,
    pub outcome: Outcome,
}

impl Attempt {
    /// The formatted text if this attempt matched.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Matched { text, .. } => Some(text.as_str()),
            Outcome::Invalid | Outcome::DecodeFailed(_) => None,
        }
    }
}

/// Decodes, validates and formats `buf` under `S`, absorbing any failure into
/// the returned [`Outcome`].
pub fn attempt<S: EventSchema>(buf: &[u8]) -> Attempt {
    let outcome = match S::decode(buf) {
        Err(err) => Outcome::DecodeFailed(err.to_string()),
        Ok(event) if !event.is_valid() => Outcome::Invalid,
        Ok(event) => {
            let text = event.message();
            Outcome::Matched {
                variant: event.into_variant(),
                text,
            }
        }
    };
    Attempt {
        kind: S::KIND,
        outcome,
    }
}

/// Receives the per-schema trail of a dispatch.
pub trait Diagnostics {
    fn record(&mut self, attempt: &Attempt);

    /// Called only when no schema matched.
    fn fallback(&mut self, _outcome: std::result::Result<&GenericFields, &RelayError>) {}
}

impl Diagnostics for () {
    fn record(&mut self, _attempt: &Attempt) {}
}

impl Diagnostics for Vec<Attempt> {
    fn record(&mut self, attempt: &Attempt) {
        self.push(attempt.clone());
    }
}

/// Logs every attempt through `tracing`.
#[cfg(feature = "telemetry")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

#[cfg(feature = "telemetry")]
impl Diagnostics for TracingDiagnostics {
    fn record(&mut self, attempt: &Attempt) {
        match &attempt.outcome {
            Outcome::Matched { text, .. } => {
                let lines = text.lines().count();
                tracing::debug!(schema = %attempt.kind, lines, "payload matched");
            }
            Outcome::Invalid => {
                tracing::debug!(schema = %attempt.kind, "decoded without required fields");
            }
            Outcome::DecodeFailed(err) => {
                tracing::debug!(schema = %attempt.kind, error = %err, "decoding json failed");
            }
        }
    }

    fn fallback(&mut self, outcome: std::result::Result<&GenericFields, &RelayError>) {
        match outcome {
            Ok(fields) => {
                tracing::debug!(keys = fields.len(), "no schema matched, rendering fields");
            }
            Err(err) => tracing::warn!(error = %err, "no schema matched and fallback failed"),
        }
    }
}

/// Converts a raw payload into a message. See [`buffer_to_message_with`].
///
/// # Errors
///
/// Returns [`RelayError::Decode`] when no schema matched and the payload is
/// not a flat string-valued JSON object.
pub fn buffer_to_message(buf: &[u8]) -> Result<String> {
    buffer_to_message_with(buf, &mut ())
}

/// Converts a raw payload into a message, reporting each step to `diag`.
///
/// Every schema is tried in [`SCHEMA_ORDER`] and every match contributes, so a
/// payload satisfying two heuristics yields both blocks back to back. When
/// nothing matched the payload is rendered by [`fallback`](crate::fallback::fallback).
///
/// # Errors
///
/// Same as [`buffer_to_message`].
pub fn buffer_to_message_with<D>(buf: &[u8], diag: &mut D) -> Result<String>
where
    D: Diagnostics + ?Sized,
{
    let mut msg = String::new();
    for try_schema in ATTEMPTS {
        let attempt = try_schema(buf);
        diag.record(&attempt);
        if let Some(text) = attempt.message() {
            msg.push_str(text);
        }
    }

    if !msg.is_empty() {
        return Ok(msg);
    }

    match GenericFields::parse(buf) {
        Ok(fields) => {
            diag.fallback(Ok(&fields));
            Ok(fields.message())
        }
        Err(err) => {
            diag.fallback(Err(&err));
            Err(err)
        }
    }
}

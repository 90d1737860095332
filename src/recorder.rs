//! Fluent, single-entry call recording.
//!
//! A [`CallRecorder`] accumulates the pieces of one call — arguments,
//! outputs, notes, a return value — and renders exactly one [`Entry`] into
//! its transcript when `log` (or `log_constructor`) is called, then resets
//! so the same recorder can describe the next call. Recorders are driven by
//! the interception proxies, but they are equally usable by hand when a test
//! wants to narrate a call the proxy machinery cannot see.

use crate::transcript::{Entry, EntryKind, Field, FieldRole, Transcript};
use crate::value::{format_value, Value};

/// Default emoji for recorded entries when the caller does not pick one.
pub const DEFAULT_EMOJI: &str = "🔧";

/// Accumulates one call record and renders it into a shared [`Transcript`].
#[derive(Debug)]
pub struct CallRecorder {
    transcript: Transcript,
    emoji: String,
    fields: Vec<Field>,
    notes: Vec<String>,
    return_value: Option<Value>,
    capability_name: Option<String>,
}

impl CallRecorder {
    pub fn new(transcript: Transcript, emoji: &str) -> Self {
        CallRecorder {
            transcript,
            emoji: emoji.to_string(),
            fields: Vec::new(),
            notes: Vec::new(),
            return_value: None,
            capability_name: None,
        }
    }

    /// The transcript this recorder appends to.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record an input argument. Fields render in the order they are added.
    pub fn with_argument<V: Into<Value>>(&mut self, name: &str, value: V) -> &mut Self {
        self.push_field(name, value.into(), FieldRole::Argument);
        self
    }

    /// Record an output field (♦️ glyph), ordered among the other fields.
    pub fn with_out<V: Into<Value>>(&mut self, name: &str, value: V) -> &mut Self {
        self.push_field(name, value.into(), FieldRole::Out);
        self
    }

    /// Record the return value. A `Null` value renders no `Returns:` line.
    pub fn with_return<V: Into<Value>>(&mut self, value: V) -> &mut Self {
        self.return_value = Some(value.into());
        self
    }

    /// Attach a note line. Repeatable; notes render in order.
    pub fn with_note(&mut self, note: &str) -> &mut Self {
        self.notes.push(note.to_string());
        self
    }

    /// Name the capability for a constructor entry header, overriding any
    /// resolution heuristic.
    pub fn for_capability(&mut self, name: &str) -> &mut Self {
        self.capability_name = Some(name.to_string());
        self
    }

    /// Render the accumulated state as a method-call entry, then reset.
    pub fn log(&mut self, label: &str) {
        self.emit(EntryKind::MethodCall, label.to_string());
    }

    /// Render the accumulated state as a constructor entry, labelled with
    /// the capability name set via [`for_capability`](Self::for_capability)
    /// (or `Unknown` when none was provided), then reset.
    pub fn log_constructor(&mut self) {
        let label = self
            .capability_name
            .take()
            .unwrap_or_else(|| "Unknown".to_string());
        self.emit(EntryKind::ConstructorCall, label);
    }

    fn push_field(&mut self, name: &str, value: Value, role: FieldRole) {
        self.fields.push(Field {
            name: name.to_string(),
            formatted_value: format_value(&value),
            role,
        });
    }

    fn emit(&mut self, kind: EntryKind, label: String) {
        let return_value = match self.return_value.take() {
            Some(Value::Null) | None => None,
            Some(value) => Some(format_value(&value)),
        };
        let entry = Entry {
            kind,
            emoji: self.emoji.clone(),
            label,
            fields: std::mem::take(&mut self.fields),
            notes: std::mem::take(&mut self.notes),
            return_value,
        };
        self.capability_name = None;
        entry.emit(&self.transcript);
    }
}

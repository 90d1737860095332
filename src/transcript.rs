//! The transcript buffer and its wire format.
//!
//! A [`Transcript`] is the ordered, append-only text log that approval
//! tooling diffs against a committed baseline. The buffer may be shared by
//! several recorders (and by the test itself) so calls against different
//! wrapped collaborators interleave in one log. Whitespace, glyphs, and line
//! order are part of the contract: identical inputs must produce identical
//! bytes.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

/// Glyph prefixing an input-argument field line.
pub const ARGUMENT_GLYPH: &str = "🔸";
/// Glyph prefixing an output-field line.
pub const OUT_GLYPH: &str = "♦️";
/// Glyph prefixing the `Returns:` line.
pub const RETURN_GLYPH: &str = "🔹";
/// Glyph prefixing a note line.
pub const NOTE_GLYPH: &str = "🗒️";

/// Shared, append-only text buffer.
///
/// Cloning the handle shares the underlying buffer. Appends are individually
/// atomic, but the ordering of entries across threads is the caller's
/// responsibility; a transcript is expected to be fed from one thread at a
/// time.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    buf: Arc<Mutex<String>>,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript::default()
    }

    /// Append raw text. Used by tests to interleave their own markers with
    /// recorded entries, and by recorders to emit rendered entries.
    pub fn append(&self, text: &str) {
        self.lock().push_str(text);
    }

    /// A snapshot of the accumulated text.
    pub fn render(&self) -> String {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of blank-line-terminated entries. Counts every `\n\n`
    /// separator, so externally appended text that ends in a blank line
    /// participates just like a recorded entry.
    pub fn entry_count(&self) -> usize {
        self.lock().matches("\n\n").count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        // A panic mid-append leaves at worst a truncated line; the transcript
        // must still render so the failure itself can be inspected.
        match self.buf.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Which header shape an entry renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    MethodCall,
    ConstructorCall,
}

/// The role of a recorded field, which selects its glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Argument,
    Out,
    Return,
}

impl FieldRole {
    pub fn glyph(self) -> &'static str {
        match self {
            FieldRole::Argument => ARGUMENT_GLYPH,
            FieldRole::Out => OUT_GLYPH,
            FieldRole::Return => RETURN_GLYPH,
        }
    }
}

/// One already-formatted field of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub formatted_value: String,
    pub role: FieldRole,
}

/// One rendered call record. Entries are built once by a recorder and never
/// mutated after emission; `Display` produces the exact wire bytes.
///
/// ```text
/// <emoji> <label>:
///   🔸 <name>: <value>
///   🗒️ <note>
///   🔹 Returns: <value>
/// <blank line>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub emoji: String,
    pub label: String,
    pub fields: Vec<Field>,
    pub notes: Vec<String>,
    pub return_value: Option<String>,
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            EntryKind::MethodCall => {
                writeln!(f, "{} {}:", self.emoji, self.label)?;
            }
            EntryKind::ConstructorCall => {
                writeln!(f, "{} {} constructor called with:", self.emoji, self.label)?;
            }
        }
        for field in &self.fields {
            writeln!(
                f,
                "  {} {}: {}",
                field.role.glyph(),
                field.name,
                field.formatted_value
            )?;
        }
        for note in &self.notes {
            writeln!(f, "  {} {}", NOTE_GLYPH, note)?;
        }
        if let Some(value) = &self.return_value {
            writeln!(f, "  {} Returns: {}", RETURN_GLYPH, value)?;
        }
        writeln!(f)
    }
}

impl Entry {
    /// Render this entry onto the end of a transcript.
    pub fn emit(&self, transcript: &Transcript) {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = write!(&mut text, "{}", self);
        transcript.append(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry {
            kind: EntryKind::MethodCall,
            emoji: "🧪".to_string(),
            label: "calculate".to_string(),
            fields: vec![
                Field {
                    name: "a".to_string(),
                    formatted_value: "5".to_string(),
                    role: FieldRole::Argument,
                },
                Field {
                    name: "b".to_string(),
                    formatted_value: "10".to_string(),
                    role: FieldRole::Argument,
                },
            ],
            notes: Vec::new(),
            return_value: Some("15".to_string()),
        }
    }

    #[test]
    fn method_entry_wire_format_is_byte_stable() {
        assert_eq!(
            sample_entry().to_string(),
            "🧪 calculate:\n  🔸 a: 5\n  🔸 b: 10\n  🔹 Returns: 15\n\n"
        );
    }

    #[test]
    fn constructor_entry_header() {
        let entry = Entry {
            kind: EntryKind::ConstructorCall,
            emoji: "🏗️".to_string(),
            label: "Repository".to_string(),
            fields: vec![Field {
                name: "path".to_string(),
                formatted_value: "db.sqlite".to_string(),
                role: FieldRole::Argument,
            }],
            notes: Vec::new(),
            return_value: None,
        };
        assert_eq!(
            entry.to_string(),
            "🏗️ Repository constructor called with:\n  🔸 path: db.sqlite\n\n"
        );
    }

    #[test]
    fn notes_render_between_fields_and_return() {
        let mut entry = sample_entry();
        entry.notes.push("first note".to_string());
        entry.notes.push("second note".to_string());
        assert_eq!(
            entry.to_string(),
            "🧪 calculate:\n  🔸 a: 5\n  🔸 b: 10\n  🗒️ first note\n  🗒️ second note\n  🔹 Returns: 15\n\n"
        );
    }

    #[test]
    fn shared_transcript_interleaves_external_writes() {
        let transcript = Transcript::new();
        transcript.append("🧪 Test started\n");
        sample_entry().emit(&transcript);
        transcript.append("🧪 Test ended\n");

        let text = transcript.render();
        assert!(text.starts_with("🧪 Test started\n🧪 calculate:"));
        assert!(text.ends_with("🧪 Test ended\n"));
    }

    #[test]
    fn clones_share_one_buffer() {
        let a = Transcript::new();
        let b = a.clone();
        a.append("one\n");
        b.append("two\n");
        assert_eq!(a.render(), "one\ntwo\n");
        assert_eq!(a.entry_count(), 0);
    }
}

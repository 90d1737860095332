//! Runtime values and their canonical text rendering.
//!
//! `Value` is the single dynamic-value currency shared by the recorder, the
//! interception proxies, and the factory's constructor matching. The
//! formatting rules exist for one reason: the rendered transcript is diffed
//! byte-for-byte against an approved baseline, so identical inputs must
//! always produce identical text.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Fixed transcript timestamp pattern, always rendered in UTC so the
/// transcript does not depend on the machine's local zone.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[month]/[day]/[year] [hour]:[minute]:[second]");

/// A dynamically-typed value captured from an intercepted call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Single-precision float; rendered with at most 2 decimal digits.
    Single(f32),
    /// Double-precision float; rendered with at most 10 decimal digits.
    Double(f64),
    Str(String),
    Seq(Vec<Value>),
    Timestamp(OffsetDateTime),
    /// Anything else, captured through its natural string form.
    Other(String),
}

impl Value {
    /// The shape tag used for constructor matching and error messages.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Single(_) => ValueKind::Single,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::Seq(_) => ValueKind::Seq,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Other(_) => ValueKind::Other,
        }
    }

    /// Capture a value that has no dedicated variant via its `Display` form.
    pub fn from_display<T: std::fmt::Display>(value: &T) -> Self {
        Value::Other(value.to_string())
    }
}

/// The shape of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Single,
    Double,
    Str,
    Seq,
    Timestamp,
    Other,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Single => "single",
            ValueKind::Double => "double",
            ValueKind::Str => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    /// Whether an argument of kind `arg` may bind to a parameter declared as
    /// `self`. Exact kinds always bind; integral arguments widen to either
    /// float kind and single widens to double; `Null` binds to any
    /// non-primitive parameter.
    pub fn accepts(self, arg: ValueKind) -> bool {
        if self == arg {
            return true;
        }
        match (self, arg) {
            (ValueKind::Double, ValueKind::Int)
            | (ValueKind::Double, ValueKind::Single)
            | (ValueKind::Single, ValueKind::Int) => true,
            (ValueKind::Str, ValueKind::Null)
            | (ValueKind::Seq, ValueKind::Null)
            | (ValueKind::Timestamp, ValueKind::Null)
            | (ValueKind::Other, ValueKind::Null) => true,
            _ => false,
        }
    }
}

/// One resolved constructor argument: declared name, declared shape, and the
/// value actually passed. Handed to constructor-notification observers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorParam {
    pub name: String,
    pub declared: ValueKind,
    pub value: Value,
}

impl ConstructorParam {
    pub fn new(name: impl Into<String>, declared: ValueKind, value: Value) -> Self {
        ConstructorParam {
            name: name.into(),
            declared,
            value,
        }
    }
}

/// Render a value into its canonical transcript text. Total: every value,
/// including `Null`, produces a string.
///
/// The priority order matters: sequences recurse per element before any
/// fallback stringification, so a sequence of floats is rendered with float
/// precision rules applied to each element.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Seq(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Single(v) => format_float(f64::from(*v), 2),
        Value::Double(v) => format_float(*v, 10),
        Value::Int(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Timestamp(ts) => format_timestamp(*ts),
        Value::Str(s) | Value::Other(s) => s.clone(),
    }
}

/// Round to at most `precision` decimal digits and trim trailing zeros (and
/// a dangling decimal point), so `12.00` renders as `12`.
fn format_float(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*}", precision, value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    match ts.to_offset(UtcOffset::UTC).format(TIMESTAMP_FORMAT) {
        Ok(text) => text,
        // Unreachable with this fixed description; keep the transcript total.
        Err(_) => String::from("<unrepresentable time>"),
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Single(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::Seq(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_formats_as_literal_null() {
        assert_eq!(format_value(&Value::Null), "null");
    }

    #[test]
    fn sequence_recurses_per_element() {
        let seq = Value::from(vec![1, 2, 3]);
        assert_eq!(format_value(&seq), "1,2,3");
    }

    #[test]
    fn float_sequence_applies_precision_per_element() {
        let seq = Value::Seq(vec![Value::Double(1.5), Value::Double(2.25)]);
        assert_eq!(format_value(&seq), "1.5,2.25");
    }

    #[test]
    fn empty_sequence_renders_empty() {
        assert_eq!(format_value(&Value::Seq(Vec::new())), "");
    }

    #[test]
    fn double_rounds_to_ten_digits_without_trailing_zeros() {
        assert_eq!(
            format_value(&Value::Double(123.456789123)),
            "123.456789123"
        );
        assert_eq!(format_value(&Value::Double(67.89)), "67.89");
        assert_eq!(format_value(&Value::Double(12.0)), "12");
    }

    #[test]
    fn single_rounds_to_two_digits() {
        assert_eq!(format_value(&Value::Single(12.345)), "12.35");
        assert_eq!(format_value(&Value::Single(12.34)), "12.34");
        assert_eq!(format_value(&Value::Single(3.0)), "3");
    }

    #[test]
    fn integers_render_verbatim() {
        assert_eq!(format_value(&Value::Int(42)), "42");
        assert_eq!(format_value(&Value::Int(-7)), "-7");
    }

    #[test]
    fn timestamp_renders_fixed_pattern_in_utc() {
        // 2023-12-25 10:30:45 UTC
        let ts = OffsetDateTime::from_unix_timestamp(1_703_500_245).unwrap();
        assert_eq!(
            format_value(&Value::Timestamp(ts)),
            "12/25/2023 10:30:45"
        );
    }

    #[test]
    fn timestamp_with_offset_is_pinned_to_utc() {
        let ts = OffsetDateTime::from_unix_timestamp(1_703_500_245)
            .unwrap()
            .to_offset(time::macros::offset!(+5));
        assert_eq!(
            format_value(&Value::Timestamp(ts)),
            "12/25/2023 10:30:45"
        );
    }

    #[test]
    fn widening_acceptance() {
        assert!(ValueKind::Double.accepts(ValueKind::Int));
        assert!(ValueKind::Double.accepts(ValueKind::Single));
        assert!(ValueKind::Single.accepts(ValueKind::Int));
        assert!(!ValueKind::Int.accepts(ValueKind::Double));
        assert!(ValueKind::Str.accepts(ValueKind::Null));
        assert!(!ValueKind::Int.accepts(ValueKind::Null));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }
}

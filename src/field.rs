//! Leaf values of a command: the lines that follow a tag.
//!
//! Every scalar field occupies exactly one line, except for two shapes:
//!
//! - [`FieldKind::List`]: a count line followed by that many element lines
//! - [`FieldKind::Aggregate`]: a value struct whose members are read inline,
//!   one after another, without a tag line of their own
//!
//! Numbers are trimmed before parsing. Strings are taken verbatim, including
//! leading and trailing whitespace. Booleans are written as integers and any
//! non-zero value reads as `true`.
//!
//! ## Optional fields
//!
//! A field declared with [`ScalarField::optional`] falls back to its default
//! when its line cannot be read. The offending line stays consumed and the
//! remaining fields of the same command are left at their defaults. Inside an
//! aggregate only the aggregate's remaining members are skipped.

use crate::codec::{LineSink, LineSource};
use crate::{Error, IniMap, Result, Value};
use std::fmt;

/// Shape of a scalar field.
#[derive(Clone)]
pub enum FieldKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// The first character of the line.
    Char,
    /// The whole line, untrimmed.
    Str,
    /// A `u32` element count followed by one line per element.
    List(Box<FieldKind>),
    /// An inline value struct, see [`Aggregate`].
    Aggregate(AggregateKind),
}

/// Members of an inline value struct, in line order.
///
/// # Examples
///
/// ```rust
/// use serde_omsi::{Aggregate, FieldKind, ScalarField};
///
/// struct Vector2;
///
/// impl Aggregate for Vector2 {
///     fn fields() -> Vec<ScalarField> {
///         vec![
///             ScalarField::new("x", FieldKind::F32),
///             ScalarField::new("y", FieldKind::F32),
///         ]
///     }
/// }
///
/// let kind = FieldKind::aggregate::<Vector2>();
/// assert_eq!(kind.line_count(), Some(2));
/// ```
pub trait Aggregate {
    fn fields() -> Vec<ScalarField>;
}

/// Type-erased handle to an [`Aggregate`] implementation.
#[derive(Clone, Copy)]
pub struct AggregateKind {
    name: &'static str,
    fields: fn() -> Vec<ScalarField>,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> Vec<ScalarField> {
        (self.fields)()
    }
}

impl FieldKind {
    /// The kind of an inline aggregate `T`.
    pub fn aggregate<T: Aggregate>() -> Self {
        FieldKind::Aggregate(AggregateKind {
            name: short_type_name::<T>(),
            fields: T::fields,
        })
    }

    /// Shorthand for `FieldKind::List(Box::new(item))`.
    pub fn list(item: FieldKind) -> Self {
        FieldKind::List(Box::new(item))
    }

    /// Number of lines the field occupies, when it does not depend on the data.
    pub fn line_count(&self) -> Option<usize> {
        match self {
            FieldKind::List(_) => None,
            FieldKind::Aggregate(aggregate) => aggregate
                .fields()
                .iter()
                .map(|f| f.kind.line_count())
                .sum(),
            _ => Some(1),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Bool => "a bool",
            FieldKind::I8 => "an i8",
            FieldKind::I16 => "an i16",
            FieldKind::I32 => "an i32",
            FieldKind::I64 => "an i64",
            FieldKind::U8 => "a u8",
            FieldKind::U16 => "a u16",
            FieldKind::U32 => "a u32",
            FieldKind::U64 => "a u64",
            FieldKind::F32 => "an f32",
            FieldKind::F64 => "an f64",
            FieldKind::Char => "a char",
            FieldKind::Str => "a string",
            FieldKind::List(_) => "a list length",
            FieldKind::Aggregate(_) => "an aggregate",
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::List(item) => f.debug_tuple("List").field(item).finish(),
            FieldKind::Aggregate(aggregate) => {
                f.debug_tuple("Aggregate").field(&aggregate.name).finish()
            }
            other => f.write_str(other.expected()),
        }
    }
}

/// A named scalar field of a command or aggregate.
#[derive(Clone, Debug)]
pub struct ScalarField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Value used when an optional field fails to read.
    pub fallback: Option<Value>,
}

impl ScalarField {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        ScalarField {
            name,
            kind,
            fallback: None,
        }
    }

    /// A field that falls back to `default` instead of failing.
    pub fn optional(name: &'static str, kind: FieldKind, default: impl Into<Value>) -> Self {
        ScalarField {
            name,
            kind,
            fallback: Some(default.into()),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Result of reading one field.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    Value(Value),
    /// An optional field failed and took its default; stop reading siblings.
    Fallback(Value),
}

/// Reads `field` from `lines`, applying its fallback on recoverable errors.
///
/// `current` is the value the field holds in the default object, used as the
/// starting point for aggregates.
pub(crate) fn decode_field(
    lines: &mut dyn LineSource,
    field: &ScalarField,
    owner: &str,
    current: Option<&Value>,
) -> Result<Outcome> {
    match decode_kind(lines, &field.kind, field.name, owner, current) {
        Ok(value) => Ok(Outcome::Value(value)),
        Err(err) if err.is_recoverable() => match &field.fallback {
            Some(default) => Ok(Outcome::Fallback(default.clone())),
            None => Err(err),
        },
        Err(err) => Err(err),
    }
}

pub(crate) fn decode_kind(
    lines: &mut dyn LineSource,
    kind: &FieldKind,
    name: &str,
    owner: &str,
    current: Option<&Value>,
) -> Result<Value> {
    match kind {
        FieldKind::List(item) => {
            let line = read_value_line(lines, name, owner)?;
            let count: u32 = line.trim().parse().map_err(|_| {
                Error::invalid_value(lines.line_number(), name, owner, &line, kind.expected())
            })?;
            let mut items = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                items.push(decode_kind(lines, item, name, owner, None)?);
            }
            Ok(Value::Array(items))
        }
        FieldKind::Aggregate(aggregate) => {
            let mut object: IniMap = current
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            for member in aggregate.fields() {
                let existing = object.get(member.name).cloned();
                match decode_field(lines, &member, aggregate.name, existing.as_ref())? {
                    Outcome::Value(value) => {
                        object.insert(member.name.to_string(), value);
                    }
                    Outcome::Fallback(value) => {
                        object.insert(member.name.to_string(), value);
                        break;
                    }
                }
            }
            Ok(Value::Object(object))
        }
        scalar => {
            let line = read_value_line(lines, name, owner)?;
            parse_scalar(scalar, &line).ok_or_else(|| {
                Error::invalid_value(lines.line_number(), name, owner, &line, scalar.expected())
            })
        }
    }
}

fn read_value_line(lines: &mut dyn LineSource, name: &str, owner: &str) -> Result<String> {
    let line = lines
        .next_line()?
        .ok_or_else(|| Error::unexpected_eof(lines.line_number(), name, owner))?;
    if let Some(limit) = lines.line_limit() {
        let length = line.chars().count();
        if length > limit {
            return Err(Error::LineTooLong {
                line: lines.line_number(),
                field: name.to_string(),
                owner: owner.to_string(),
                length,
                limit,
            });
        }
    }
    Ok(line)
}

fn parse_scalar(kind: &FieldKind, line: &str) -> Option<Value> {
    let text = line.trim();
    match kind {
        FieldKind::Bool => text.parse::<i64>().ok().map(|v| Value::Bool(v != 0)),
        FieldKind::I8 => text.parse::<i8>().ok().map(Value::from),
        FieldKind::I16 => text.parse::<i16>().ok().map(Value::from),
        FieldKind::I32 => text.parse::<i32>().ok().map(Value::from),
        FieldKind::I64 => text.parse::<i64>().ok().map(Value::from),
        FieldKind::U8 => text.parse::<u8>().ok().map(Value::from),
        FieldKind::U16 => text.parse::<u16>().ok().map(Value::from),
        FieldKind::U32 => text.parse::<u32>().ok().map(Value::from),
        FieldKind::U64 => text.parse::<u64>().ok().map(Value::from),
        FieldKind::F32 => text.parse::<f32>().ok().map(Value::from),
        FieldKind::F64 => text.parse::<f64>().ok().map(Value::from),
        FieldKind::Char => line.chars().next().map(Value::from),
        FieldKind::Str => Some(Value::String(line.to_string())),
        FieldKind::List(_) | FieldKind::Aggregate(_) => None,
    }
}

/// Writes `value` as the lines of a field of shape `kind`.
pub(crate) fn encode_kind(out: &mut dyn LineSink, kind: &FieldKind, value: &Value) -> Result<()> {
    match kind {
        FieldKind::List(item) => match value {
            Value::Array(items) => {
                out.write_line(&items.len().to_string())?;
                for element in items {
                    encode_kind(out, item, element)?;
                }
                Ok(())
            }
            Value::Null => out.write_line("0"),
            other => Err(Error::custom(format!(
                "expected a list, found {}",
                describe(other)
            ))),
        },
        FieldKind::Aggregate(aggregate) => {
            for member in aggregate.fields() {
                let member_value = value.get(member.name).unwrap_or(&Value::Null);
                encode_kind(out, &member.kind, member_value)?;
            }
            Ok(())
        }
        FieldKind::F32 => match value {
            Value::Number(n) => out.write_line(&(n.as_f64() as f32).to_string()),
            other => out.write_line(&other.to_string()),
        },
        FieldKind::Bool => match value {
            Value::Number(n) => out.write_line(if n.as_f64() != 0.0 { "1" } else { "0" }),
            other => out.write_line(&other.to_string()),
        },
        _ => match value {
            Value::Array(_) | Value::Object(_) => Err(Error::custom(format!(
                "expected a scalar, found {}",
                describe(value)
            ))),
            scalar => out.write_line(&scalar.to_string()),
        },
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lines {
        lines: Vec<&'static str>,
        read: usize,
        limit: Option<usize>,
    }

    impl Lines {
        fn new(lines: &[&'static str]) -> Self {
            Lines {
                lines: lines.to_vec(),
                read: 0,
                limit: None,
            }
        }
    }

    impl LineSource for Lines {
        fn next_line(&mut self) -> Result<Option<String>> {
            let line = self.lines.get(self.read).map(|s| s.to_string());
            if line.is_some() {
                self.read += 1;
            }
            Ok(line)
        }

        fn line_number(&self) -> usize {
            self.read
        }

        fn line_limit(&self) -> Option<usize> {
            self.limit
        }
    }

    #[derive(Default)]
    struct Out(Vec<String>);

    impl LineSink for Out {
        fn write_line(&mut self, line: &str) -> Result<()> {
            self.0.push(line.to_string());
            Ok(())
        }

        fn write_raw(&mut self, text: &str) -> Result<()> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    struct Colour;

    impl Aggregate for Colour {
        fn fields() -> Vec<ScalarField> {
            vec![
                ScalarField::new("r", FieldKind::U8),
                ScalarField::optional("g", FieldKind::U8, 7u8),
                ScalarField::new("b", FieldKind::U8),
            ]
        }
    }

    fn decode(lines: &mut Lines, kind: FieldKind) -> Result<Value> {
        decode_kind(lines, &kind, "field", "Owner", None)
    }

    #[test]
    fn test_scalar_parsing() {
        let mut lines = Lines::new(&[" 12 ", "-3", "2", "0.25", "R side", "  keep  "]);
        assert_eq!(decode(&mut lines, FieldKind::U8).unwrap(), Value::from(12u8));
        assert_eq!(decode(&mut lines, FieldKind::I32).unwrap(), Value::from(-3));
        assert_eq!(decode(&mut lines, FieldKind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(decode(&mut lines, FieldKind::F32).unwrap(), Value::from(0.25f32));
        assert_eq!(decode(&mut lines, FieldKind::Char).unwrap(), Value::from('R'));
        assert_eq!(decode(&mut lines, FieldKind::Str).unwrap(), Value::from("  keep  "));
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let mut lines = Lines::new(&["1", "300"]);
        decode(&mut lines, FieldKind::U8).unwrap();
        match decode(&mut lines, FieldKind::U8) {
            Err(Error::InvalidValue { line, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "300");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_char_line_is_invalid() {
        let mut lines = Lines::new(&[""]);
        assert!(matches!(
            decode(&mut lines, FieldKind::Char),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_list() {
        let mut lines = Lines::new(&["2", "a.wav", "b.wav", "x"]);
        let value = decode(&mut lines, FieldKind::list(FieldKind::Str)).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![Value::from("a.wav"), Value::from("b.wav")])
        );
        assert_eq!(lines.read, 3);
    }

    #[test]
    fn test_optional_falls_back_and_consumes_line() {
        let field = ScalarField::optional("index", FieldKind::U32, Value::Null);
        let mut lines = Lines::new(&["[matl_alpha]", "1"]);
        let outcome = decode_field(&mut lines, &field, "Matl", None).unwrap();
        assert_eq!(outcome, Outcome::Fallback(Value::Null));
        assert_eq!(lines.read, 1);
    }

    #[test]
    fn test_optional_at_end_of_stream() {
        let field = ScalarField::optional("bitmap", FieldKind::Str, Value::Null);
        let mut lines = Lines::new(&[]);
        let outcome = decode_field(&mut lines, &field, "Light", None).unwrap();
        assert_eq!(outcome, Outcome::Fallback(Value::Null));
    }

    #[test]
    fn test_aggregate_fallback_only_skips_members() {
        let mut lines = Lines::new(&["1", "x", "3"]);
        let value = decode(&mut lines, FieldKind::aggregate::<Colour>()).unwrap();
        assert_eq!(value.get("r"), Some(&Value::from(1u8)));
        assert_eq!(value.get("g"), Some(&Value::from(7u8)));
        assert_eq!(value.get("b"), None);
        assert_eq!(lines.read, 2);
    }

    #[test]
    fn test_line_limit() {
        let mut lines = Lines::new(&["abcdef"]);
        lines.limit = Some(4);
        assert!(matches!(
            decode(&mut lines, FieldKind::Str),
            Err(Error::LineTooLong {
                length: 6,
                limit: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_encode_shapes() {
        let mut out = Out::default();
        encode_kind(&mut out, &FieldKind::Bool, &Value::Bool(true)).unwrap();
        encode_kind(&mut out, &FieldKind::F32, &Value::from(0.1f32)).unwrap();
        encode_kind(&mut out, &FieldKind::list(FieldKind::I32), &Value::Null).unwrap();
        encode_kind(
            &mut out,
            &FieldKind::list(FieldKind::I32),
            &Value::Array(vec![Value::from(4), Value::from(5)]),
        )
        .unwrap();
        assert_eq!(out.0, vec!["1", "0.1", "0", "2", "4", "5"]);
    }

    #[test]
    fn test_encode_aggregate_in_member_order() {
        let mut colour = IniMap::new();
        colour.insert("b".into(), Value::from(3u8));
        colour.insert("r".into(), Value::from(1u8));
        colour.insert("g".into(), Value::from(2u8));
        let mut out = Out::default();
        encode_kind(
            &mut out,
            &FieldKind::aggregate::<Colour>(),
            &Value::Object(colour),
        )
        .unwrap();
        assert_eq!(out.0, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Colour>(), "Colour");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}

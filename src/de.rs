//! Conversion of the dynamic [`Value`] tree into typed Rust values.
//!
//! The resolver assembles a document as a [`Value`] and then deserializes the
//! caller's root type from it with [`ValueDeserializer`]. Options map `null`
//! to `None`, one-entry objects select enum variants and numbers convert into
//! whichever numeric type the target declares.
//!
//! ```rust
//! use serde_omsi::{from_value, ini};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Matl { path: String, index: Option<u32> }
//!
//! let matl: Matl = from_value(ini!({ "path": "glass.bmp", "index": null })).unwrap();
//! assert_eq!(matl, Matl { path: "glass.bmp".into(), index: None });
//! ```

use crate::{Error, IniMap, Number, Result, Value};
use serde::{de, forward_to_deserialize_any};

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
    owner: Option<&'static str>,
    key: String,
}

impl MapDeserializer {
    fn new(map: IniMap, owner: Option<&'static str>) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            owner,
            key: String::new(),
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                self.key.clone_from(&key);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(ValueDeserializer::new(value))
            .map_err(|e| match self.owner {
                Some(owner) => e.in_field(owner, &self.key),
                None => e,
            })
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj, None)),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
    owner: Option<&'static str>,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value, owner: None }
    }

    /// Reports conversion failures of an untyped object as fields of `owner`.
    pub(crate) fn with_owner(value: Value, owner: &'static str) -> Self {
        ValueDeserializer {
            value,
            owner: Some(owner),
        }
    }

    fn visit_object<'de, V>(obj: IniMap, owner: Option<&'static str>, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor
            .visit_map(MapDeserializer::new(obj, owner))
            .map_err(|e| match owner {
                Some(owner) => e.in_field(owner, ""),
                None => e,
            })
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Unsigned(u)) => visitor.visit_u64(u),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => Self::visit_object(obj, self.owner, visitor),
        }
    }

    // Booleans are written as integers, so accept either form.
    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Number(n) => visitor.visit_bool(n.as_f64() != 0.0),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer::new(other)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Object(obj) => Self::visit_object(obj, Some(name), visitor),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Object(obj) if obj.len() == 1 => {
                let mut entries = obj.into_iter();
                match entries.next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    }),
                    None => Err(Error::custom(format!("Expected a variant of {}", name))),
                }
            }
            other => Err(Error::custom(format!(
                "Expected a variant of {}, found {:?}",
                name, other
            ))),
        }
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map identifier ignored_any
    }
}

/// Deserializes a `T` from a [`Value`].
pub(crate) fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

/// Deserializes a resolved document, naming `owner` in conversion errors.
pub(crate) fn from_document<T: de::DeserializeOwned>(value: Value, owner: &'static str) -> Result<T> {
    T::deserialize(ValueDeserializer::with_owner(value, owner)).map_err(|e| e.in_field(owner, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_value;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Interior {
        light_a: i32,
        light_b: i32,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct SeatData {
        height: f32,
        illumination: Option<Interior>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Seat {
        Passenger(SeatData),
        Driver(SeatData),
    }

    #[test]
    fn test_option_of_struct() {
        let seat = SeatData {
            height: 0.5,
            illumination: Some(Interior {
                light_a: 1,
                light_b: -1,
            }),
        };
        let back: SeatData = from_value(to_value(&seat).unwrap()).unwrap();
        assert_eq!(back, seat);

        let empty: SeatData = from_value(to_value(&SeatData::default()).unwrap()).unwrap();
        assert_eq!(empty.illumination, None);
    }

    #[test]
    fn test_newtype_variant() {
        let seat = Seat::Driver(SeatData {
            height: 1.25,
            illumination: None,
        });
        let back: Seat = from_value(to_value(&seat).unwrap()).unwrap();
        assert_eq!(back, seat);
    }

    #[test]
    fn test_bool_from_integer() {
        let flag: bool = from_value(Value::from(2)).unwrap();
        assert!(flag);
        let flag: bool = from_value(Value::from(0)).unwrap();
        assert!(!flag);
    }

    #[test]
    fn test_float_field_accepts_integer() {
        let x: f32 = from_value(Value::from(3)).unwrap();
        assert_eq!(x, 3.0);
    }

    #[test]
    fn test_char_from_single_char_string() {
        let c: char = from_value(Value::from("R")).unwrap();
        assert_eq!(c, 'R');
        assert!(from_value::<char>(Value::from("RL")).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Mesh {
        #[allow(dead_code)]
        index: u8,
    }

    #[derive(Debug, Deserialize)]
    struct Lod {
        #[allow(dead_code)]
        meshes: Vec<Mesh>,
    }

    #[test]
    fn test_conversion_error_names_innermost_field() {
        let value = crate::ini!({ "meshes": [ { "index": 300 } ] });
        let err = from_document::<Lod>(value, "Lod").unwrap_err();
        match err {
            Error::Conversion { owner, field, message } => {
                assert_eq!(owner, "Mesh");
                assert_eq!(field, "index");
                assert!(message.contains("300"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_conversion_error_for_missing_field() {
        let err = from_document::<Mesh>(crate::ini!({}), "Mesh").unwrap_err();
        assert_eq!(err.to_string(), "Couldn't convert Mesh! missing field `index`");
    }

    #[test]
    fn test_unknown_variant_is_an_error() {
        let mut map = IniMap::new();
        map.insert("Conductor".into(), Value::Null);
        assert!(from_value::<Seat>(Value::Object(map)).is_err());
    }
}

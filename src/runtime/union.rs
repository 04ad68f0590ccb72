//! Helpers for tagged unions whose variant is inferred from the wire data.
use std::fmt;

use std::marker::PhantomData;

use serde::de::value::{
    BorrowedStrDeserializer, F64Deserializer, I64Deserializer, MapAccessDeserializer, SeqAccessDeserializer,
    StrDeserializer, StringDeserializer, U64Deserializer, UnitDeserializer,
};
use serde::de::{self, DeserializeOwned, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::Value;

use super::error::{AlternativeFailure, CodecError};

/// JSON token category used to classify incoming data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireShape {
    Null,
    Boolean,
    String,
    Integer,
    Float,
    Object,
    Array,
}

impl WireShape {
    pub fn as_str(self) -> &'static str {
        match self {
            WireShape::Null => "null",
            WireShape::Boolean => "boolean",
            WireShape::String => "string",
            WireShape::Integer => "integer",
            WireShape::Float => "float",
            WireShape::Object => "object",
            WireShape::Array => "array",
        }
    }

    pub fn of(value: &Value) -> WireShape {
        match value {
            Value::Null => WireShape::Null,
            Value::Bool(_) => WireShape::Boolean,
            Value::String(_) => WireShape::String,
            Value::Number(n) if n.is_f64() => WireShape::Float,
            Value::Number(_) => WireShape::Integer,
            Value::Array(_) => WireShape::Array,
            Value::Object(_) => WireShape::Object,
        }
    }
}

impl fmt::Display for WireShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NUMBERS
// ————————————————————————————————————————————————————————————————————————————

/// A numeric token as handed over by the stream. It is a private copy: trying
/// one interpretation and falling back to another never touches the stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberToken {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedNumber {
    Integer(i64),
    Float(f64),
}

impl NumberToken {
    pub fn shape(self) -> WireShape {
        match self {
            NumberToken::Signed(_) | NumberToken::Unsigned(_) => WireShape::Integer,
            NumberToken::Float(_) => WireShape::Float,
        }
    }

    fn as_integer(self) -> Result<i64, CodecError> {
        match self {
            NumberToken::Signed(v) => Ok(v),
            NumberToken::Unsigned(v) => {
                i64::try_from(v).map_err(|_| CodecError::NumberOutOfRange { token: v.to_string() })
            }
            NumberToken::Float(v) => Err(CodecError::NotAnInteger { token: v.to_string() }),
        }
    }

    fn as_float(self) -> f64 {
        match self {
            NumberToken::Signed(v) => v as f64,
            NumberToken::Unsigned(v) => v as f64,
            NumberToken::Float(v) => v,
        }
    }

    /// Pick the numeric alternative for this token.
    ///
    /// With both shapes declared the integer reading wins whenever it is exact;
    /// otherwise the token is re-read as a float. With a single declared shape
    /// the token must parse into it.
    pub fn resolve(self, union: &'static str, integer: bool, float: bool) -> Result<ResolvedNumber, CodecError> {
        match (integer, float) {
            (true, true) => Ok(match self.as_integer() {
                Ok(v) => ResolvedNumber::Integer(v),
                Err(_) => ResolvedNumber::Float(self.as_float()),
            }),
            (true, false) => self.as_integer().map(ResolvedNumber::Integer),
            (false, true) => Ok(ResolvedNumber::Float(self.as_float())),
            (false, false) => Err(CodecError::UnsupportedShape { union, shape: self.shape() }),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OBJECTS
// ————————————————————————————————————————————————————————————————————————————

/// Materialise the remainder of a map access into a shape-agnostic value.
pub fn capture_map<'de, A>(map: A) -> Result<Value, A::Error>
where
    A: MapAccess<'de>,
{
    Value::deserialize(MapAccessDeserializer::new(map))
}

/// Materialise the remainder of a sequence access into a shape-agnostic value.
pub fn capture_seq<'de, A>(seq: A) -> Result<Value, A::Error>
where
    A: SeqAccess<'de>,
{
    Value::deserialize(SeqAccessDeserializer::new(seq))
}

/// Ordered structural trial-decode over object-shaped alternatives.
///
/// The captured value is converted into each candidate in turn; the first
/// successful conversion wins. Failures are kept for the final error.
#[derive(Debug)]
pub struct ObjectTrial {
    union: &'static str,
    value: Value,
    failures: Vec<AlternativeFailure>,
}

impl ObjectTrial {
    pub fn new(union: &'static str, value: Value) -> Self {
        Self { union, value, failures: Vec::new() }
    }

    pub fn value(&self) -> &Value { &self.value }

    pub fn attempt<T: DeserializeOwned>(&mut self, label: &'static str) -> Option<T> {
        match T::deserialize(&self.value) {
            Ok(v) => Some(v),
            Err(error) => {
                log::trace!("{}: alternative {label} rejected: {error}", self.union);
                self.failures.push(AlternativeFailure { label, message: error.to_string() });
                None
            }
        }
    }

    pub fn finish(self) -> CodecError {
        if self.failures.is_empty() {
            return CodecError::UnsupportedShape { union: self.union, shape: WireShape::of(&self.value) };
        }
        CodecError::NoAlternativeMatched { union: self.union, failures: self.failures }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMPATIBILITY
// ————————————————————————————————————————————————————————————————————————————

/// Either a literal `false` ("no data") or a `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum FalseOr<T> {
    False,
    Value(T),
}

impl<T> FalseOr<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            FalseOr::False => None,
            FalseOr::Value(v) => Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FalseOr<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FalseOrVisitor(PhantomData))
    }
}

/// Streams everything except a literal boolean straight into `T`.
struct FalseOrVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for FalseOrVisitor<T> {
    type Value = FalseOr<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("false or a value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        if value {
            return Err(CodecError::TrueForNonBoolean.into_de());
        }
        Ok(FalseOr::False)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        T::deserialize(Present(I64Deserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        T::deserialize(Present(U64Deserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        T::deserialize(Present(F64Deserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        T::deserialize(Present(StrDeserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_borrowed_str<E: de::Error>(self, value: &'de str) -> Result<Self::Value, E> {
        T::deserialize(Present(BorrowedStrDeserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        T::deserialize(Present(StringDeserializer::new(value))).map(FalseOr::Value)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        T::deserialize(UnitDeserializer::new()).map(FalseOr::Value)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        T::deserialize(UnitDeserializer::new()).map(FalseOr::Value)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        T::deserialize(Present(deserializer)).map(FalseOr::Value)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(Present(MapAccessDeserializer::new(map))).map(FalseOr::Value)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        T::deserialize(Present(SeqAccessDeserializer::new(seq))).map(FalseOr::Value)
    }
}

/// A value already known not to be null: optional targets read it as `Some`.
struct Present<D>(D);

impl<'de, D: Deserializer<'de>> Deserializer<'de> for Present<D> {
    type Error = D::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, D::Error> {
        self.0.deserialize_any(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, D::Error> {
        visitor.visit_some(self.0)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

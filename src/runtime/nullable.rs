//! Nullable scalar wrappers.
//!
//! A plain `String`/`f64`/`bool` cannot tell "never assigned" apart from
//! "explicitly empty". These wrappers track a [`Presence`] next to the payload,
//! so an unset wrapper is omitted from its object while an explicit null is
//! still written as `null`.
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

use super::empty::IsEmpty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Unset,
    Null,
    Value,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for String {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
}

/// The closed set of payloads a [`Nullable`] may carry.
pub trait NullableScalar: sealed::Sealed + Default + Clone + PartialEq + Serialize + for<'de> Deserialize<'de> {
    const EXPECTING: &'static str;
}

impl NullableScalar for String {
    const EXPECTING: &'static str = "a string or null";
}

impl NullableScalar for f64 {
    const EXPECTING: &'static str = "a number or null";
}

impl NullableScalar for bool {
    const EXPECTING: &'static str = "a boolean or null";
}

/// Scalar value, or null, or not-yet-set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Nullable<T: NullableScalar> {
    presence: Presence,
    value: T,
}

pub type NullableString = Nullable<String>;
pub type NullableNumber = Nullable<f64>;
pub type NullableBool = Nullable<bool>;

impl<T: NullableScalar> Nullable<T> {
    pub fn unset() -> Self {
        Self { presence: Presence::Unset, value: T::default() }
    }

    pub fn null() -> Self {
        Self { presence: Presence::Null, value: T::default() }
    }

    pub fn new(value: T) -> Self {
        Self { presence: Presence::Value, value }
    }

    pub fn set(&mut self, value: T) {
        self.presence = Presence::Value;
        self.value = value;
    }

    pub fn set_null(&mut self) {
        self.presence = Presence::Null;
        self.value = T::default();
    }

    pub fn presence(&self) -> Presence { self.presence }

    /// True once the wrapper holds either null or a value.
    pub fn is_set(&self) -> bool { self.presence != Presence::Unset }

    pub fn is_null(&self) -> bool { self.presence == Presence::Null }

    pub fn is_value(&self) -> bool { self.presence == Presence::Value }

    pub fn value(&self) -> Option<&T> {
        match self.presence {
            Presence::Value => Some(&self.value),
            Presence::Unset | Presence::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self.presence {
            Presence::Value => Some(self.value),
            Presence::Unset | Presence::Null => None,
        }
    }
}

impl<T: NullableScalar> From<T> for Nullable<T> {
    fn from(value: T) -> Self { Self::new(value) }
}

impl From<&str> for Nullable<String> {
    fn from(value: &str) -> Self { Self::new(value.to_owned()) }
}

impl<T: NullableScalar> IsEmpty for Nullable<T> {
    fn is_empty(&self) -> bool { self.presence == Presence::Unset }
}

impl<T: NullableScalar> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.presence {
            Presence::Value => self.value.serialize(serializer),
            Presence::Null | Presence::Unset => serializer.serialize_none(),
        }
    }
}

struct NullableVisitor<T>(PhantomData<T>);

impl<'de, T: NullableScalar> Visitor<'de> for NullableVisitor<T> {
    type Value = Nullable<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(T::EXPECTING)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Nullable::null())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Nullable::null())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Nullable::new)
    }
}

impl<'de, T: NullableScalar> Deserialize<'de> for Nullable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(NullableVisitor(PhantomData))
    }
}

/// Degenerate nullable string: either a present string or "invalid"
/// (null and unset are the same state).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmptyString {
    valid: bool,
    value: String,
}

impl EmptyString {
    pub fn new(value: impl Into<String>) -> Self {
        Self { valid: true, value: value.into() }
    }

    pub fn invalid() -> Self { Self::default() }

    pub fn is_set(&self) -> bool { self.valid }

    pub fn is_null(&self) -> bool { !self.valid }

    pub fn is_value(&self) -> bool { self.valid }

    pub fn value(&self) -> Option<&str> {
        self.valid.then_some(self.value.as_str())
    }
}

impl From<&str> for EmptyString {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for EmptyString {
    fn from(value: String) -> Self { Self::new(value) }
}

impl IsEmpty for EmptyString {
    fn is_empty(&self) -> bool { !self.valid }
}

impl Serialize for EmptyString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.valid {
            serializer.serialize_str(&self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for EmptyString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(|value| match value {
            Some(value) => EmptyString::new(value),
            None => EmptyString::invalid(),
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

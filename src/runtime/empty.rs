//! Emptiness predicate used to decide field omission.
//!
//! A value is empty when there is nothing to write for it. Types with their own
//! notion of emptiness (the nullable wrappers, generated unions) report it
//! themselves; everything else is empty when it equals its zero value.
//!
//! Cyclic values are not supported: `Box`/reference impls simply delegate.
use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde_json::Value;

pub trait IsEmpty {
    fn is_empty(&self) -> bool;
}

/// Free-function form, usable as a `skip_serializing_if` path.
pub fn is_empty<T: IsEmpty + ?Sized>(value: &T) -> bool {
    value.is_empty()
}

macro_rules! zero_is_empty {
    ($($t:ty),* $(,)?) => {
        $(
            impl IsEmpty for $t {
                fn is_empty(&self) -> bool { *self == 0 }
            }
        )*
    };
}

zero_is_empty!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl IsEmpty for f32 {
    fn is_empty(&self) -> bool { *self == 0.0 }
}

impl IsEmpty for f64 {
    fn is_empty(&self) -> bool { *self == 0.0 }
}

impl IsEmpty for bool {
    fn is_empty(&self) -> bool { !*self }
}

impl IsEmpty for () {
    fn is_empty(&self) -> bool { true }
}

impl IsEmpty for str {
    fn is_empty(&self) -> bool { str::is_empty(self) }
}

impl IsEmpty for String {
    fn is_empty(&self) -> bool { self.as_str().is_empty() }
}

impl<T> IsEmpty for Option<T> {
    fn is_empty(&self) -> bool { self.is_none() }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<K, V, S> IsEmpty for IndexMap<K, V, S> {
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<K, V> IsEmpty for BTreeMap<K, V> {
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<K, V, S> IsEmpty for HashMap<K, V, S> {
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl IsEmpty for Value {
    fn is_empty(&self) -> bool { self.is_null() }
}

impl<T: IsEmpty + ?Sized> IsEmpty for Box<T> {
    fn is_empty(&self) -> bool { (**self).is_empty() }
}

impl<T: IsEmpty + ?Sized> IsEmpty for &T {
    fn is_empty(&self) -> bool { (**self).is_empty() }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

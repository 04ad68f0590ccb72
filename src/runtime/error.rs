use std::cell::RefCell;
use std::fmt;

use serde::{de, ser};
use thiserror::Error;

use super::union::WireShape;

/// Failure categories surfaced by generated codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required field missing, or an extension property under a closed policy.
    SchemaViolation,
    /// Wire shape not declared by a union, or no object alternative matched.
    ShapeMismatch,
    /// A nested value failed its own encode/decode.
    ValueCodecFailure,
    /// Malformed bytes reported by the underlying stream.
    StreamFailure,
}

/// One failed structural conversion during union trial-decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeFailure {
    pub label: &'static str,
    pub message: String,
}

impl fmt::Display for AlternativeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("{type_name}: required field {field} ({wire}) is not set")]
    RequiredUnset {
        type_name: &'static str,
        field: &'static str,
        wire: &'static str,
    },

    #[error("{type_name}: required fields not present: {}", quoted(.fields))]
    MissingRequired {
        type_name: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{type_name}: extension property not permitted: \"{key}\"")]
    ExtensionNotPermitted {
        type_name: &'static str,
        key: String,
    },

    #[error("{union}: unsupported wire shape for union: {shape}")]
    UnsupportedShape {
        union: &'static str,
        shape: WireShape,
    },

    #[error("{union}: no alternative matched ({})", joined(.failures))]
    NoAlternativeMatched {
        union: &'static str,
        failures: Vec<AlternativeFailure>,
    },

    #[error("{union}: cannot encode a union with no alternative set")]
    UnionNotSet { union: &'static str },

    #[error("number {token} does not fit a 64-bit signed integer")]
    NumberOutOfRange { token: String },

    #[error("number {token} is not an integer")]
    NotAnInteger { token: String },

    #[error("literal 'true' where a non-boolean value was expected")]
    TrueForNonBoolean,
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::RequiredUnset { .. }
            | CodecError::MissingRequired { .. }
            | CodecError::ExtensionNotPermitted { .. } => ErrorKind::SchemaViolation,
            CodecError::UnsupportedShape { .. } | CodecError::NoAlternativeMatched { .. } => {
                ErrorKind::ShapeMismatch
            }
            CodecError::UnionNotSet { .. }
            | CodecError::NumberOutOfRange { .. }
            | CodecError::NotAnInteger { .. }
            | CodecError::TrueForNonBoolean => ErrorKind::ValueCodecFailure,
        }
    }

    /// The attempted alternative whose failure was recorded last.
    pub fn last_attempted(&self) -> Option<&AlternativeFailure> {
        match self {
            CodecError::NoAlternativeMatched { failures, .. } => failures.last(),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RAISING
// ————————————————————————————————————————————————————————————————————————————

thread_local! {
    /// Kind and message of the codec error most recently raised on this thread.
    static RAISED: RefCell<Option<(ErrorKind, String)>> = const { RefCell::new(None) };
}

impl CodecError {
    /// Raise through a deserializer's error type, keeping the kind recoverable
    /// by [`from_str`](super::from_str) and friends.
    pub fn into_de<E: de::Error>(self) -> E {
        E::custom(self.remember())
    }

    /// Raise through a serializer's error type, keeping the kind recoverable
    /// by [`to_string`](super::to_string) and friends.
    pub fn into_ser<E: ser::Error>(self) -> E {
        E::custom(self.remember())
    }

    fn remember(self) -> Self {
        let entry = (self.kind(), self.to_string());
        RAISED.with(|raised| *raised.borrow_mut() = Some(entry));
        self
    }
}

pub(crate) fn reset_raised() {
    RAISED.with(|raised| raised.borrow_mut().take());
}

/// The kind of the codec error `message` was built from, if it is the last
/// one raised on this thread. Clears the record.
pub(crate) fn classify(message: &str) -> Option<ErrorKind> {
    RAISED
        .with(|raised| raised.borrow_mut().take())
        .filter(|(_, raised)| message.starts_with(raised.as_str()))
        .map(|(kind, _)| kind)
}

fn quoted(fields: &[&'static str]) -> String {
    fields.iter().map(|f| format!("\"{f}\"")).collect::<Vec<_>>().join(", ")
}

fn joined(failures: &[AlternativeFailure]) -> String {
    if failures.is_empty() {
        return "no object alternative attempted".to_string();
    }
    failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

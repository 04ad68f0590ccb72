//! Runtime support for generated codecs.
//!
//! Generated files import this module as `rt` and reach everything they need
//! through it: the `serde` traits, the emptiness predicate, the nullable
//! scalar wrappers and the union decoding helpers.
pub mod empty;
pub mod error;
pub mod nullable;
pub mod path;
pub mod union;

pub use empty::{is_empty, IsEmpty};
pub use error::{AlternativeFailure, CodecError, ErrorKind};
pub use nullable::{EmptyString, Nullable, NullableBool, NullableNumber, NullableScalar, NullableString, Presence};
pub use path::{from_slice, from_str, to_string, to_vec, DecodeError, EncodeError};
pub use union::{capture_map, capture_seq, FalseOr, NumberToken, ObjectTrial, ResolvedNumber, WireShape};

pub use indexmap::IndexMap;
pub use serde;
pub use serde_json::Value;

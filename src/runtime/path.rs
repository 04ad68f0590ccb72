//! JSON entry points for generated types, with JSON-path context on decode errors.
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::error::{classify, reset_raised, ErrorKind};

/// Decoding failure annotated with the JSON path where it happened.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {source}")]
pub struct DecodeError {
    pub path: String,
    pub kind: ErrorKind,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    fn new(path: String, source: serde_json::Error) -> Self {
        let kind = if source.is_syntax() || source.is_eof() || source.is_io() {
            ErrorKind::StreamFailure
        } else {
            // nested type mismatches surface as plain serde errors
            classify(&source.to_string()).unwrap_or(ErrorKind::ValueCodecFailure)
        };
        DecodeError { path, kind, source }
    }

    /// Stream failures are malformed bytes; everything else is a data failure.
    pub fn is_stream_failure(&self) -> bool {
        self.kind == ErrorKind::StreamFailure
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> String {
        self.source.to_string()
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for DecodeError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        DecodeError::new(path, err.into_inner())
    }
}

/// Encoding failure. The first unwritable value aborts the encode.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct EncodeError {
    pub kind: ErrorKind,
    #[source]
    pub source: serde_json::Error,
}

impl EncodeError {
    fn new(source: serde_json::Error) -> Self {
        let kind = if source.is_io() {
            ErrorKind::StreamFailure
        } else {
            classify(&source.to_string()).unwrap_or(ErrorKind::ValueCodecFailure)
        };
        EncodeError { kind, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub fn from_str<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    reset_raised();
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize::<_, T>(&mut *de)?;
    de.end().map_err(|source| DecodeError::new(".".to_string(), source))?;
    Ok(value)
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    reset_raised();
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize::<_, T>(&mut *de)?;
    de.end().map_err(|source| DecodeError::new(".".to_string(), source))?;
    Ok(value)
}

pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    reset_raised();
    serde_json::to_string(value).map_err(EncodeError::new)
}

pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    reset_raised();
    serde_json::to_vec(value).map_err(EncodeError::new)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

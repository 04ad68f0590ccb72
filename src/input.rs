//! Model document loading: file patterns, JSON pointer selection, jq pre-processing.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Model, ModelDocument, ModelError};
use crate::runtime::DecodeError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    #[error("glob pattern matched no files: {0}")]
    NoMatches(String),
    #[error("{}: JSON pointer `{pointer}` selects nothing", path.display())]
    Pointer { path: PathBuf, pointer: String },
    #[error("{}: jq filter failed: {source}", path.display())]
    Jq {
        path: PathBuf,
        #[source]
        source: crate::jq_exec::JqError,
    },
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
}

/// Parse a JSON file's contents, reporting the JSON path of any failure.
pub fn parse_with_path<T: DeserializeOwned>(source: &str, path: &Path) -> Result<T, LoadError> {
    crate::runtime::from_str(source).map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

fn from_value_with_path<T: DeserializeOwned>(value: Value, path: &Path) -> Result<T, LoadError> {
    serde_path_to_error::deserialize(value).map_err(|err| LoadError::Parse {
        path: path.to_path_buf(),
        source: DecodeError::from(err),
    })
}

/// Where model documents come from and how each is narrowed before parsing.
#[derive(Debug, Clone, Default)]
pub struct ModelSources {
    /// Literal paths or glob patterns.
    pub patterns: Vec<String>,
    /// JSON Pointer selecting the model inside each file (e.g. `/schema`).
    pub json_pointer: Option<String>,
    /// jq filter applied to each file; every output is a separate document.
    pub jq_expr: Option<String>,
}

impl ModelSources {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ModelSources { patterns: patterns.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    /// Load every matched document and merge them into one.
    pub fn load(&self) -> Result<ModelDocument, LoadError> {
        let mut merged = ModelDocument::default();
        for path in resolve_file_path_patterns(&self.patterns)? {
            log::info!("loading model document {}", path.display());
            for doc in self.load_file(&path)? {
                merged.merge(doc);
            }
        }
        log::debug!(
            "merged model: {} structs, {} aliases, {} unions",
            merged.structs.len(),
            merged.aliases.len(),
            merged.unions.len()
        );
        Ok(merged)
    }

    /// Load, merge and validate.
    pub fn load_model(&self) -> Result<Model, LoadError> {
        Ok(Model::build(self.load()?)?)
    }

    fn load_file(&self, path: &Path) -> Result<Vec<ModelDocument>, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut value: Value = parse_with_path(&source, path)?;
        if let Some(pointer) = self.json_pointer.as_deref() {
            value = value
                .pointer_mut(pointer)
                .map(Value::take)
                .ok_or_else(|| LoadError::Pointer { path: path.to_path_buf(), pointer: pointer.to_string() })?;
        }
        let values = match self.jq_expr.as_deref() {
            None => vec![value],
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &value)
                .map_err(|source| LoadError::Jq { path: path.to_path_buf(), source })?,
        };
        values.into_iter().map(|v| from_value_with_path(v, path)).collect()
    }
}

/// Load a single model file (no pointer, no jq) and validate it.
pub fn load_model_file(path: impl AsRef<Path>) -> Result<Model, LoadError> {
    let path = path.as_ref();
    ModelSources::new([path.to_string_lossy()]).load_model()
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let entries = glob::glob(pattern).map_err(|source| LoadError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let before = out.len();
        for entry in entries {
            out.push(entry?);
        }
        if out.len() == before {
            return Err(LoadError::NoMatches(pattern.to_string()));
        }
    }
    Ok(out)
}

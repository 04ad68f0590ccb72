//! Generation settings.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::LoadError;

pub const DEFAULT_RUNTIME_PATH: &str = "::json_codegen::runtime";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Compatibility mode: a literal `false` in place of a non-boolean field is
    /// read as "no data" and discarded instead of failing the decode.
    pub accept_false: bool,
    /// Path generated files import the runtime from (as `rt`).
    pub runtime_path: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            accept_false: false,
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
        }
    }
}

impl GenConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<GenConfig, LoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        crate::input::parse_with_path(&source, path)
    }
}

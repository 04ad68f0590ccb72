//! Code generator for JSON object codecs and tagged unions.
//!
//! A [`Model`] (structs, aliases and unions described in a JSON document) is
//! validated and turned into Rust source. The generated code depends only on
//! [`runtime`], which it imports as `rt`.
pub mod codegen;
pub mod config;
pub mod input;
pub mod jq_exec;
pub mod lower;
pub mod model;
pub mod runtime;

pub use codegen::{generate, Codegen};
pub use config::GenConfig;
pub use input::{load_model_file, LoadError, ModelSources};
pub use model::{Model, ModelDocument, ModelError};

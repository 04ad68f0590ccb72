//! Rust source generation for a [`Model`].
//!
//! Output layout is deterministic: header, aliases, object types and unions
//! (each group in lexicographic order by name), then the codec impls in the
//! same order. Fields and alternatives keep their declaration order.
pub mod object;
pub mod union;
pub mod writer;

use crate::config::GenConfig;
use crate::lower::rust_type;
use crate::model::Model;

pub use writer::SourceWriter;

pub const HEADER: &str = "// Code generated by json-codegen. DO NOT EDIT.";

pub struct Codegen {
    config: GenConfig,
    out: SourceWriter,
}

impl Codegen {
    pub fn new(config: GenConfig) -> Self {
        Self { config, out: SourceWriter::new() }
    }

    pub fn emit(&mut self, model: &Model) {
        let w = &mut self.out;
        w.line(HEADER);
        w.blank();
        w.line(format!("use {} as rt;", self.config.runtime_path));

        for alias in model.aliases.values() {
            log::debug!("emitting alias {}", alias.name);
            w.blank();
            w.doc(&alias.description);
            w.line(format!("pub type {} = {};", alias.name, rust_type(model, &alias.ty)));
        }

        for s in model.structs.values() {
            log::debug!("emitting struct {}", s.name);
            w.blank();
            object::emit_declaration(w, model, s);
        }

        for u in model.unions.values() {
            log::debug!("emitting union {}", u.name);
            w.blank();
            union::emit_declaration(w, model, u);
        }

        for s in model.structs.values() {
            w.blank();
            object::emit_is_empty(w, s);
            if s.generate_code {
                w.blank();
                object::emit_serialize(w, s);
                w.blank();
                object::emit_deserialize(w, model, s, &self.config);
            } else {
                log::debug!("{}: no codec generated, derived serde is used", s.name);
            }
        }

        for u in model.unions.values() {
            w.blank();
            union::emit_accessors(w, model, u);
            w.blank();
            union::emit_is_empty(w, u);
            w.blank();
            union::emit_serialize(w, u);
            w.blank();
            union::emit_deserialize(w, model, u);
        }
    }

    pub fn into_string(self) -> String {
        self.out.into_string()
    }
}

/// Generate the complete source file for `model`.
pub fn generate(model: &Model, config: &GenConfig) -> String {
    let mut cg = Codegen::new(config.clone());
    cg.emit(model);
    cg.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDocument;
    use serde_json::json;

    pub(crate) fn model(v: serde_json::Value) -> Model {
        let doc: ModelDocument = serde_json::from_value(v).unwrap();
        Model::build(doc).unwrap()
    }

    fn sample() -> Model {
        model(json!({
            "aliases": [
                {"name": "Zeta", "type": "integer"},
                {"name": "Alpha", "type": {"array": "string"}, "description": "Tags."}
            ],
            "structs": [
                {"name": "Zoo", "fields": [{"name": "a", "type": "string"}]},
                {"name": "Apple", "fields": [{"name": "b", "type": "bool"}]}
            ],
            "unions": [
                {"name": "Choice", "alternatives": [{"label": "Text", "type": "string"}]}
            ]
        }))
    }

    #[test]
    fn output_is_deterministic() {
        let config = GenConfig::default();
        assert_eq!(generate(&sample(), &config), generate(&sample(), &config));
    }

    #[test]
    fn declarations_are_sorted_by_name() {
        let src = generate(&sample(), &GenConfig::default());
        assert!(src.starts_with(HEADER));
        assert!(src.contains("use ::json_codegen::runtime as rt;"));
        let pos = |needle: &str| src.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("pub type Alpha = Vec<String>;") < pos("pub type Zeta = i64;"));
        assert!(pos("pub type Zeta") < pos("pub struct Apple"));
        assert!(pos("pub struct Apple") < pos("pub struct Zoo"));
        assert!(pos("pub struct Zoo") < pos("pub enum Choice"));
        assert!(pos("/// Tags.\npub type Alpha") > 0);
    }

    #[test]
    fn runtime_path_is_configurable() {
        let config = GenConfig { runtime_path: "crate::rt_support".into(), ..GenConfig::default() };
        let src = generate(&sample(), &config);
        assert!(src.contains("use crate::rt_support as rt;"));
    }
}

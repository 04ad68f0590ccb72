//! Object types: declaration, emptiness, and the field-by-field encoder/decoder.
use crate::config::GenConfig;
use crate::lower::{field_ident, rust_type, snake_case, str_literal, EXTENSION_FIELD};
use crate::model::{ExtensionPolicy, Field, Model, Struct, TypeRef, ValueCodec};

use super::SourceWriter;

pub fn emit_declaration(w: &mut SourceWriter, model: &Model, s: &Struct) {
    w.doc(&s.description);
    w.line("#[derive(Debug, Clone, PartialEq, Default)]");
    if !s.generate_code {
        // nested value type: derived serde with the same wire behaviour
        w.line("#[derive(rt::serde::Serialize, rt::serde::Deserialize)]");
        w.line("#[serde(crate = \"rt::serde\")]");
        if s.extensions == ExtensionPolicy::Closed {
            w.line("#[serde(deny_unknown_fields)]");
        }
    }
    w.open(format!("pub struct {} {{", s.name));
    for f in &s.fields {
        w.doc(&f.description);
        if !s.generate_code {
            if f.is_excluded() {
                w.line("#[serde(skip)]");
            } else if f.required {
                w.line(format!("#[serde(rename = {})]", str_literal(&f.wire_name)));
            } else {
                w.line(format!(
                    "#[serde(rename = {}, default, skip_serializing_if = \"rt::is_empty\")]",
                    str_literal(&f.wire_name)
                ));
            }
        }
        w.line(format!("pub {}: {},", field_ident(&f.name), rust_type(model, &f.ty)));
    }
    if let ExtensionPolicy::Typed(ty) = &s.extensions {
        w.line("/// Properties not declared above, in arrival order.");
        if !s.generate_code {
            w.line("#[serde(flatten)]");
        }
        w.line(format!("pub {EXTENSION_FIELD}: rt::IndexMap<String, {}>,", rust_type(model, ty)));
    }
    w.close("}");
}

pub fn emit_is_empty(w: &mut SourceWriter, s: &Struct) {
    let mut checks: Vec<String> = s
        .fields
        .iter()
        .map(|f| format!("rt::IsEmpty::is_empty(&self.{})", field_ident(&f.name)))
        .collect();
    if matches!(s.extensions, ExtensionPolicy::Typed(_)) {
        checks.push(format!("rt::IsEmpty::is_empty(&self.{EXTENSION_FIELD})"));
    }

    w.open(format!("impl rt::IsEmpty for {} {{", s.name));
    w.open("fn is_empty(&self) -> bool {");
    match checks.split_first() {
        None => w.line("true"),
        Some((first, rest)) => {
            w.line(first);
            for c in rest {
                w.line(format!("    && {c}"));
            }
        }
    }
    w.close("}");
    w.close("}");
}

/// Value expression handed to `serialize_entry`.
fn write_expr(f: &Field) -> String {
    let ident = field_ident(&f.name);
    match f.codec {
        ValueCodec::Str => format!("self.{ident}.as_str()"),
        ValueCodec::Bool | ValueCodec::Stream | ValueCodec::Generic => format!("&self.{ident}"),
    }
}

pub fn emit_serialize(w: &mut SourceWriter, s: &Struct) {
    w.open(format!("impl rt::serde::Serialize for {} {{", s.name));
    w.line("fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>");
    w.line("where");
    w.line("    S: rt::serde::Serializer,");
    w.open("{");
    w.line("use rt::serde::ser::SerializeMap as _;");

    if s.has_no_properties() {
        w.line("let map = serializer.serialize_map(Some(0))?;");
        w.line("map.end()");
        w.close("}");
        w.close("}");
        return;
    }

    w.line("let mut map = serializer.serialize_map(None)?;");
    for f in s.wire_fields() {
        let ident = field_ident(&f.name);
        let key = str_literal(&f.wire_name);
        w.blank();
        w.line(format!("// {}", f.name));
        if f.required && f.optional_ref {
            w.open(format!("let Some(value) = self.{ident}.as_ref() else {{"));
            w.line(format!(
                "return ::core::result::Result::Err(rt::CodecError::RequiredUnset {{ type_name: {}, field: {}, wire: {key} }}.into_ser());",
                str_literal(&s.name),
                str_literal(&f.name)
            ));
            w.close("};");
            w.line(format!("map.serialize_entry({key}, value)?;"));
        } else if f.required {
            w.line(format!("map.serialize_entry({key}, {})?;", write_expr(f)));
        } else {
            w.open(format!("if !rt::IsEmpty::is_empty(&self.{ident}) {{"));
            w.line(format!("map.serialize_entry({key}, {})?;", write_expr(f)));
            w.close("}");
        }
    }

    if matches!(s.extensions, ExtensionPolicy::Typed(_)) {
        w.blank();
        w.open(format!("for (key, value) in &self.{EXTENSION_FIELD} {{"));
        w.line("map.serialize_entry(key, value)?;");
        w.close("}");
    }
    w.line("map.end()");
    w.close("}");
    w.close("}");
}

fn received_flag(f: &Field) -> String {
    format!("{}_received", snake_case(&f.name))
}

pub fn emit_deserialize(w: &mut SourceWriter, model: &Model, s: &Struct, config: &GenConfig) {
    let name = &s.name;
    let visitor = format!("{name}Visitor");
    let type_lit = str_literal(name);
    let required: Vec<&Field> = s.wire_fields().filter(|f| f.required).collect();
    let has_fields = s.wire_fields().next().is_some();
    // the key is only needed when it is matched, rejected or stored
    let key_used = has_fields || !matches!(s.extensions, ExtensionPolicy::Open);

    w.open(format!("impl<'de> rt::serde::Deserialize<'de> for {name} {{"));
    w.line("fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>");
    w.line("where");
    w.line("    D: rt::serde::Deserializer<'de>,");
    w.open("{");
    w.line(format!("struct {visitor};"));
    w.blank();
    w.open(format!("impl<'de> rt::serde::de::Visitor<'de> for {visitor} {{"));
    w.line(format!("type Value = {name};"));
    w.blank();
    w.open("fn expecting(&self, formatter: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {");
    w.line(format!("formatter.write_str({})", str_literal(&format!("an object of type {name}"))));
    w.close("}");
    w.blank();
    w.line("#[allow(unused_mut)]");
    w.line(format!("fn visit_map<A>(self, mut map: A) -> ::core::result::Result<{name}, A::Error>"));
    w.line("where");
    w.line("    A: rt::serde::de::MapAccess<'de>,");
    w.open("{");
    w.line(format!("let mut out = {name}::default();"));
    for f in &required {
        w.line(format!("let mut {} = false;", received_flag(f)));
    }

    let key_var = if key_used { "key" } else { "_key" };
    w.open(format!("while let Some({key_var}) = map.next_key::<String>()? {{"));
    if has_fields {
        w.open("match key.as_str() {");
        for f in s.wire_fields() {
            w.open(format!("{} => {{", str_literal(&f.wire_name)));
            emit_read_field(w, model, f, config);
            w.close("}");
        }
        w.open("_ => {");
        emit_extension(w, model, s, &type_lit);
        w.close("}");
        w.close("}");
    } else {
        emit_extension(w, model, s, &type_lit);
    }
    w.close("}");

    if !required.is_empty() {
        w.blank();
        w.line("let mut missing = ::std::vec::Vec::new();");
        for f in &required {
            w.open(format!("if !{} {{", received_flag(f)));
            w.line(format!("missing.push({});", str_literal(&f.wire_name)));
            w.close("}");
        }
        w.open("if !missing.is_empty() {");
        w.line(format!(
            "return ::core::result::Result::Err(rt::CodecError::MissingRequired {{ type_name: {type_lit}, fields: missing }}.into_de());"
        ));
        w.close("}");
    }
    w.line("::core::result::Result::Ok(out)");
    w.close("}");
    w.close("}");
    w.blank();
    w.line(format!("deserializer.deserialize_map({visitor})"));
    w.close("}");
    w.close("}");
}

fn emit_read_field(w: &mut SourceWriter, model: &Model, f: &Field, config: &GenConfig) {
    let ident = field_ident(&f.name);
    let ty = rust_type(model, &f.ty);
    if config.accept_false && !f.accepts_bool {
        // a literal `false` here means "no data"
        w.open(format!("if let rt::FalseOr::Value(value) = map.next_value::<rt::FalseOr<{ty}>>()? {{"));
        w.line(format!("out.{ident} = value;"));
        w.close("}");
    } else {
        let read_ty = match (f.codec, model.resolve(&f.ty)) {
            (ValueCodec::Str, TypeRef::String) => "String".to_string(),
            (ValueCodec::Bool, TypeRef::Bool) => "bool".to_string(),
            _ => ty,
        };
        w.line(format!("out.{ident} = map.next_value::<{read_ty}>()?;"));
    }
    if f.required {
        w.line(format!("{} = true;", received_flag(f)));
    }
}

fn emit_extension(w: &mut SourceWriter, model: &Model, s: &Struct, type_lit: &str) {
    match &s.extensions {
        ExtensionPolicy::Closed => {
            w.line(format!(
                "return ::core::result::Result::Err(rt::CodecError::ExtensionNotPermitted {{ type_name: {type_lit}, key }}.into_de());"
            ));
        }
        ExtensionPolicy::Open => {
            w.line("map.next_value::<rt::serde::de::IgnoredAny>()?;");
        }
        ExtensionPolicy::Typed(ty) => {
            w.line(format!("let value = map.next_value::<{}>()?;", rust_type(model, ty)));
            w.line(format!("out.{EXTENSION_FIELD}.insert(key, value);"));
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::tests::model;
    use serde_json::json;

    fn product() -> Model {
        model(json!({
            "structs": [{
                "name": "Product",
                "description": "A product.",
                "extensions": "closed",
                "fields": [
                    {"name": "id", "type": "integer", "required": true, "description": "Identifier."},
                    {"name": "name", "type": "string", "required": true},
                    {"name": "description", "type": "empty_string"},
                    {"name": "owner", "type": {"optional": {"ref": "Product"}}, "required": true},
                    {"name": "notes", "json_name": "-", "type": "string"}
                ]
            }]
        }))
    }

    fn render(f: impl FnOnce(&mut SourceWriter)) -> String {
        let mut w = SourceWriter::new();
        f(&mut w);
        w.into_string()
    }

    #[test]
    fn declaration_keeps_excluded_fields() {
        let m = product();
        let src = render(|w| emit_declaration(w, &m, &m.structs["Product"]));
        assert!(src.starts_with("/// A product.\n#[derive(Debug, Clone, PartialEq, Default)]\npub struct Product {"));
        assert!(src.contains("    /// Identifier.\n    pub id: i64,"));
        assert!(src.contains("pub owner: Option<Box<Product>>,"));
        assert!(src.contains("pub notes: String,"));
        assert!(!src.contains("serde("));
    }

    #[test]
    fn encoder_follows_required_and_omission_rules() {
        let m = product();
        let src = render(|w| emit_serialize(w, &m.structs["Product"]));
        assert!(src.contains("map.serialize_entry(\"id\", &self.id)?;"));
        assert!(src.contains("map.serialize_entry(\"name\", self.name.as_str())?;"));
        assert!(src.contains("if !rt::IsEmpty::is_empty(&self.description) {"));
        assert!(src.contains("let Some(value) = self.owner.as_ref() else {"));
        assert!(src.contains("rt::CodecError::RequiredUnset { type_name: \"Product\", field: \"owner\", wire: \"owner\" }.into_ser()"));
        assert!(!src.contains("notes"));
        // declaration order is wire order
        assert!(src.find("\"id\"").unwrap() < src.find("\"name\"").unwrap());
        assert!(src.find("\"name\"").unwrap() < src.find("\"description\"").unwrap());
    }

    #[test]
    fn decoder_tracks_every_required_field() {
        let m = product();
        let src = render(|w| emit_deserialize(w, &m, &m.structs["Product"], &GenConfig::default()));
        assert!(src.contains("let mut id_received = false;"));
        assert!(src.contains("let mut owner_received = false;"));
        assert!(src.contains("\"id\" => {"));
        assert!(src.contains("out.name = map.next_value::<String>()?;"));
        assert!(src.contains("out.description = map.next_value::<rt::EmptyString>()?;"));
        assert!(src.contains("missing.push(\"owner\");"));
        assert!(src.contains("rt::CodecError::ExtensionNotPermitted { type_name: \"Product\", key }.into_de()"));
        assert!(src.contains("fields: missing }.into_de()"));
        assert!(!src.contains("\"-\""));
        assert!(!src.contains("FalseOr"));
    }

    #[test]
    fn accept_false_wraps_non_boolean_fields_only() {
        let m = model(json!({
            "structs": [{"name": "S", "fields": [
                {"name": "count", "type": "integer"},
                {"name": "flag", "type": "bool"},
                {"name": "maybe", "type": "nullable_bool"}
            ]}]
        }));
        let config = GenConfig { accept_false: true, ..GenConfig::default() };
        let src = render(|w| emit_deserialize(w, &m, &m.structs["S"], &config));
        assert!(src.contains("map.next_value::<rt::FalseOr<i64>>()?"));
        assert!(src.contains("out.flag = map.next_value::<bool>()?;"));
        assert!(src.contains("out.maybe = map.next_value::<rt::NullableBool>()?;"));
    }

    #[test]
    fn no_property_struct_writes_empty_object() {
        let m = model(json!({"structs": [{"name": "Nothing", "extensions": "closed"}]}));
        let s = &m.structs["Nothing"];
        let src = render(|w| emit_serialize(w, s));
        assert!(src.contains("serializer.serialize_map(Some(0))?"));
        assert!(!src.contains("let mut map"));
        let src = render(|w| emit_is_empty(w, s));
        assert!(src.contains("        true\n"));
    }

    #[test]
    fn typed_extensions_are_collected_and_written() {
        let m = model(json!({
            "structs": [{"name": "Bag", "extensions": {"typed": "integer"}}]
        }));
        let s = &m.structs["Bag"];
        let decl = render(|w| emit_declaration(w, &m, s));
        assert!(decl.contains("pub additional_properties: rt::IndexMap<String, i64>,"));
        let ser = render(|w| emit_serialize(w, s));
        assert!(ser.contains("for (key, value) in &self.additional_properties {"));
        let de = render(|w| emit_deserialize(w, &m, s, &GenConfig::default()));
        assert!(de.contains("out.additional_properties.insert(key, value);"));
        assert!(!de.contains("match key.as_str()"));
    }

    #[test]
    fn open_policy_discards_unknown_keys() {
        let m = model(json!({"structs": [{"name": "Loose"}]}));
        let de = render(|w| emit_deserialize(w, &m, &m.structs["Loose"], &GenConfig::default()));
        assert!(de.contains("while let Some(_key) = map.next_key::<String>()? {"));
        assert!(de.contains("map.next_value::<rt::serde::de::IgnoredAny>()?;"));
    }

    #[test]
    fn skipped_codec_uses_derived_serde() {
        let m = model(json!({
            "structs": [{"name": "Inner", "generate_code": false, "extensions": "closed", "fields": [
                {"name": "a", "type": "integer", "required": true},
                {"name": "b", "json_name": "bee", "type": "string"},
                {"name": "c", "json_name": "-", "type": "string"}
            ]}]
        }));
        let src = render(|w| emit_declaration(w, &m, &m.structs["Inner"]));
        assert!(src.contains("#[serde(crate = \"rt::serde\")]"));
        assert!(src.contains("#[serde(deny_unknown_fields)]"));
        assert!(src.contains("#[serde(rename = \"a\")]"));
        assert!(src.contains("#[serde(rename = \"bee\", default, skip_serializing_if = \"rt::is_empty\")]"));
        assert!(src.contains("#[serde(skip)]"));
    }
}

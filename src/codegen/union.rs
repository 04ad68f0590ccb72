//! Tagged unions: enum declaration, accessors, and the shape-driven codec.
use crate::lower::{accessor_stem, rust_type, str_literal, variant_ident};
use crate::model::{Alternative, Model, Union};
use crate::runtime::WireShape;

use super::SourceWriter;

fn shape_path(shape: WireShape) -> &'static str {
    match shape {
        WireShape::Null => "rt::WireShape::Null",
        WireShape::Boolean => "rt::WireShape::Boolean",
        WireShape::String => "rt::WireShape::String",
        WireShape::Integer => "rt::WireShape::Integer",
        WireShape::Float => "rt::WireShape::Float",
        WireShape::Object => "rt::WireShape::Object",
        WireShape::Array => "rt::WireShape::Array",
    }
}

fn has_payload(a: &Alternative) -> bool {
    a.shape != WireShape::Null
}

/// `Name::Variant` for an alternative.
fn variant(u: &Union, a: &Alternative) -> String {
    format!("{}::{}", u.name, variant_ident(&a.label))
}

pub fn emit_declaration(w: &mut SourceWriter, model: &Model, u: &Union) {
    w.doc(&u.description);
    w.line("#[derive(Debug, Clone, PartialEq, Default)]");
    w.open(format!("pub enum {} {{", u.name));
    w.line("/// No alternative assigned yet.");
    w.line("#[default]");
    w.line("NotSet,");
    for a in &u.alternatives {
        if has_payload(a) {
            w.line(format!("{}({}),", variant_ident(&a.label), rust_type(model, &a.ty)));
        } else {
            w.line(format!("{},", variant_ident(&a.label)));
        }
    }
    w.close("}");
}

pub fn emit_accessors(w: &mut SourceWriter, model: &Model, u: &Union) {
    let name = &u.name;
    w.open(format!("impl {name} {{"));
    w.open("pub fn is_not_set(&self) -> bool {");
    w.line(format!("matches!(self, {name}::NotSet)"));
    w.close("}");

    w.blank();
    w.line("/// Wire shape of the assigned alternative.");
    w.open("pub fn shape(&self) -> ::core::option::Option<rt::WireShape> {");
    w.open("match self {");
    w.line(format!("{name}::NotSet => ::core::option::Option::None,"));
    for a in &u.alternatives {
        let pattern = if has_payload(a) { format!("{}(_)", variant(u, a)) } else { variant(u, a) };
        w.line(format!("{pattern} => ::core::option::Option::Some({}),", shape_path(a.shape)));
    }
    w.close("}");
    w.close("}");

    for a in &u.alternatives {
        let stem = accessor_stem(&a.label);
        let v = variant(u, a);
        w.blank();
        if !has_payload(a) {
            w.open(format!("pub fn is_{stem}(&self) -> bool {{"));
            w.line(format!("matches!(self, {v})"));
            w.close("}");
            w.blank();
            w.open(format!("pub fn set_{stem}(&mut self) {{"));
            w.line(format!("*self = {v};"));
            w.close("}");
            continue;
        }
        let ty = rust_type(model, &a.ty);
        w.open(format!("pub fn is_{stem}(&self) -> bool {{"));
        w.line(format!("matches!(self, {v}(_))"));
        w.close("}");
        w.blank();
        w.open(format!("pub fn as_{stem}(&self) -> ::core::option::Option<&{ty}> {{"));
        w.open("match self {");
        w.line(format!("{v}(value) => ::core::option::Option::Some(value),"));
        w.line("_ => ::core::option::Option::None,");
        w.close("}");
        w.close("}");
        w.blank();
        w.open(format!("pub fn set_{stem}(&mut self, value: {ty}) {{"));
        w.line(format!("*self = {v}(value);"));
        w.close("}");
        w.blank();
        w.open(format!("pub fn from_{stem}(value: {ty}) -> Self {{"));
        w.line(format!("{v}(value)"));
        w.close("}");
    }
    w.close("}");
}

pub fn emit_is_empty(w: &mut SourceWriter, u: &Union) {
    w.open(format!("impl rt::IsEmpty for {} {{", u.name));
    w.open("fn is_empty(&self) -> bool {");
    w.line("self.is_not_set()");
    w.close("}");
    w.close("}");
}

pub fn emit_serialize(w: &mut SourceWriter, u: &Union) {
    let name = &u.name;
    w.open(format!("impl rt::serde::Serialize for {name} {{"));
    w.line("fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>");
    w.line("where");
    w.line("    S: rt::serde::Serializer,");
    w.open("{");
    w.open("match self {");
    w.line(format!(
        "{name}::NotSet => ::core::result::Result::Err(rt::CodecError::UnionNotSet {{ union: {} }}.into_ser()),",
        str_literal(name)
    ));
    for a in &u.alternatives {
        let v = variant(u, a);
        // shapes were checked against the payload type when the model was built
        let write = match a.shape {
            WireShape::Null => "serializer.serialize_unit()",
            WireShape::Boolean => "serializer.serialize_bool(*value)",
            WireShape::String => "serializer.serialize_str(value)",
            WireShape::Integer => "serializer.serialize_i64(*value)",
            WireShape::Float => "serializer.serialize_f64(*value)",
            WireShape::Object | WireShape::Array => "rt::serde::Serialize::serialize(value, serializer)",
        };
        if has_payload(a) {
            w.line(format!("{v}(value) => {write},"));
        } else {
            w.line(format!("{v} => {write},"));
        }
    }
    w.close("}");
    w.close("}");
    w.close("}");
}

fn expecting(u: &Union) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for (shape, text) in [
        (WireShape::Null, "null"),
        (WireShape::Boolean, "a boolean"),
        (WireShape::String, "a string"),
        (WireShape::Integer, "an integer"),
        (WireShape::Float, "a number"),
        (WireShape::Object, "an object"),
        (WireShape::Array, "an array"),
    ] {
        if u.has_shape(shape) {
            parts.push(text);
        }
    }
    match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.to_string(),
        None => "a value".to_string(),
    }
}

pub fn emit_deserialize(w: &mut SourceWriter, model: &Model, u: &Union) {
    let name = &u.name;
    let visitor = format!("{name}Visitor");
    let union_lit = str_literal(name);
    let objects: Vec<&Alternative> = u.object_alternatives().collect();
    let arrays: Vec<&Alternative> = u.array_alternatives().collect();

    w.open(format!("impl<'de> rt::serde::Deserialize<'de> for {name} {{"));
    w.line("fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>");
    w.line("where");
    w.line("    D: rt::serde::Deserializer<'de>,");
    w.open("{");
    w.line(format!("struct {visitor};"));
    w.blank();

    // shared helpers
    w.line("#[allow(dead_code)]");
    w.open(format!("impl {visitor} {{"));
    w.open("fn unsupported<E: rt::serde::de::Error>(shape: rt::WireShape) -> E {");
    w.line(format!("rt::CodecError::UnsupportedShape {{ union: {union_lit}, shape }}.into_de()"));
    w.close("}");
    w.blank();
    w.open(format!(
        "fn number<E: rt::serde::de::Error>(token: rt::NumberToken) -> ::core::result::Result<{name}, E> {{"
    ));
    let int_alt = u.alternative(WireShape::Integer);
    let float_alt = u.alternative(WireShape::Float);
    w.open(format!(
        "match token.resolve({union_lit}, {}, {}).map_err(rt::CodecError::into_de::<E>)? {{",
        int_alt.is_some(),
        float_alt.is_some()
    ));
    match int_alt {
        Some(a) => w.line(format!("rt::ResolvedNumber::Integer(value) => ::core::result::Result::Ok({}(value)),", variant(u, a))),
        None => w.line("rt::ResolvedNumber::Integer(_) => ::core::result::Result::Err(Self::unsupported(rt::WireShape::Integer)),"),
    }
    match float_alt {
        Some(a) => w.line(format!("rt::ResolvedNumber::Float(value) => ::core::result::Result::Ok({}(value)),", variant(u, a))),
        None => w.line("rt::ResolvedNumber::Float(_) => ::core::result::Result::Err(Self::unsupported(rt::WireShape::Float)),"),
    }
    w.close("}");
    w.close("}");
    for (helper, candidates) in [("object", &objects), ("array", &arrays)] {
        if candidates.is_empty() {
            continue;
        }
        w.blank();
        w.line("/// Trial-decode in declared order; the first alternative that converts wins.");
        w.open(format!(
            "fn {helper}<E: rt::serde::de::Error>(value: rt::Value) -> ::core::result::Result<{name}, E> {{"
        ));
        w.line(format!("let mut trial = rt::ObjectTrial::new({union_lit}, value);"));
        for a in candidates.iter() {
            w.open(format!(
                "if let ::core::option::Option::Some(value) = trial.attempt::<{}>({}) {{",
                rust_type(model, &a.ty),
                str_literal(&a.label)
            ));
            w.line(format!("return ::core::result::Result::Ok({}(value));", variant(u, a)));
            w.close("}");
        }
        w.line("::core::result::Result::Err(trial.finish().into_de())");
        w.close("}");
    }
    w.close("}");
    w.blank();

    w.open(format!("impl<'de> rt::serde::de::Visitor<'de> for {visitor} {{"));
    w.line(format!("type Value = {name};"));
    w.blank();
    w.open("fn expecting(&self, formatter: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {");
    w.line(format!("formatter.write_str({})", str_literal(&expecting(u))));
    w.close("}");

    let null = u.alternative(WireShape::Null).map(|a| format!("::core::result::Result::Ok({})", variant(u, a)));
    let null = null.unwrap_or_else(|| format!("::core::result::Result::Err({visitor}::unsupported({}))", shape_path(WireShape::Null)));
    for method in ["visit_unit", "visit_none"] {
        w.blank();
        w.line(format!("fn {method}<E>(self) -> ::core::result::Result<{name}, E>"));
        w.line("where");
        w.line("    E: rt::serde::de::Error,");
        w.open("{");
        w.line(&null);
        w.close("}");
    }

    for (method, arg, shape, payload) in [
        ("visit_bool", "bool", WireShape::Boolean, "value"),
        ("visit_str", "&str", WireShape::String, "value.to_owned()"),
        ("visit_string", "String", WireShape::String, "value"),
    ] {
        w.blank();
        let alt = u.alternative(shape);
        let param = if alt.is_some() { "value" } else { "_value" };
        w.line(format!("fn {method}<E>(self, {param}: {arg}) -> ::core::result::Result<{name}, E>"));
        w.line("where");
        w.line("    E: rt::serde::de::Error,");
        w.open("{");
        match alt {
            Some(a) => w.line(format!("::core::result::Result::Ok({}({payload}))", variant(u, a))),
            None => w.line(format!("::core::result::Result::Err({visitor}::unsupported({}))", shape_path(shape))),
        }
        w.close("}");
    }

    for (method, arg, token) in [
        ("visit_i64", "i64", "Signed"),
        ("visit_u64", "u64", "Unsigned"),
        ("visit_f64", "f64", "Float"),
    ] {
        w.blank();
        w.line(format!("fn {method}<E>(self, value: {arg}) -> ::core::result::Result<{name}, E>"));
        w.line("where");
        w.line("    E: rt::serde::de::Error,");
        w.open("{");
        w.line(format!("{visitor}::number(rt::NumberToken::{token}(value))"));
        w.close("}");
    }

    for (method, access, bound, capture, shape, helper, candidates) in [
        ("visit_map", "map", "MapAccess", "capture_map", WireShape::Object, "object", &objects),
        ("visit_seq", "seq", "SeqAccess", "capture_seq", WireShape::Array, "array", &arrays),
    ] {
        w.blank();
        let param = if candidates.is_empty() { format!("_{access}") } else { access.to_string() };
        w.line(format!("fn {method}<A>(self, {param}: A) -> ::core::result::Result<{name}, A::Error>"));
        w.line("where");
        w.line(format!("    A: rt::serde::de::{bound}<'de>,"));
        w.open("{");
        if candidates.is_empty() {
            w.line(format!("::core::result::Result::Err({visitor}::unsupported({}))", shape_path(shape)));
        } else {
            w.line(format!("{visitor}::{helper}(rt::{capture}({access})?)"));
        }
        w.close("}");
    }
    w.close("}");
    w.blank();
    w.line(format!("deserializer.deserialize_any({visitor})"));
    w.close("}");
    w.close("}");
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

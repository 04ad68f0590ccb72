//! Lowering from the structural model to Rust syntax: type spellings and identifiers.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Declared, Model, TypeRef};

/// Name of the generated extension property map.
pub const EXTENSION_FIELD: &str = "additional_properties";

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "try", "typeof", "unsized", "virtual", "yield",
];

pub fn is_valid_ident(s: &str) -> bool {
    IDENT.is_match(s) && s != "_"
}

fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let chars: Vec<char> = s.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !cur.is_empty() { out.push(std::mem::take(&mut cur)); }
            continue;
        }
        let boundary = c.is_uppercase() && !cur.is_empty() && {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower)
        };
        if boundary {
            out.push(std::mem::take(&mut cur));
        }
        cur.push(c);
    }
    if !cur.is_empty() { out.push(cur); }
    out
}

pub fn snake_case(s: &str) -> String {
    words(s).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")
}

pub fn upper_camel_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn escape_keyword(ident: String) -> String {
    match ident.as_str() {
        // not valid as raw identifiers
        "self" | "Self" | "super" | "crate" => format!("{ident}_"),
        s if KEYWORDS.contains(&s) => format!("r#{ident}"),
        _ => ident,
    }
}

/// Rust field identifier for a logical field name.
pub fn field_ident(name: &str) -> String {
    escape_keyword(snake_case(name))
}

/// Enum variant for a union alternative label.
pub fn variant_ident(label: &str) -> String {
    escape_keyword(upper_camel_case(label))
}

/// Method-name stem for a union alternative label (`is_<stem>`, `as_<stem>`, ...).
pub fn accessor_stem(label: &str) -> String {
    snake_case(label)
}

/// Spell a type reference as a Rust type. Generated files import the runtime as `rt`.
pub fn rust_type(model: &Model, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Null => "()".to_string(),
        TypeRef::String => "String".to_string(),
        TypeRef::Bool => "bool".to_string(),
        TypeRef::Integer => "i64".to_string(),
        TypeRef::Number => "f64".to_string(),
        TypeRef::Any => "rt::Value".to_string(),
        TypeRef::NullableString => "rt::NullableString".to_string(),
        TypeRef::NullableNumber => "rt::NullableNumber".to_string(),
        TypeRef::NullableBool => "rt::NullableBool".to_string(),
        TypeRef::EmptyString => "rt::EmptyString".to_string(),
        TypeRef::Ref(name) => name.clone(),
        TypeRef::Optional(inner) => {
            // boxed so declared types may refer to themselves
            if needs_box(model, inner) {
                format!("Option<Box<{}>>", rust_type(model, inner))
            } else {
                format!("Option<{}>", rust_type(model, inner))
            }
        }
        TypeRef::Array(inner) => format!("Vec<{}>", rust_type(model, inner)),
        TypeRef::Map(inner) => format!("rt::IndexMap<String, {}>", rust_type(model, inner)),
    }
}

fn needs_box(model: &Model, ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Ref(name) => match model.lookup(name) {
            Some(Declared::Struct(_)) | Some(Declared::Union(_)) => true,
            Some(Declared::Alias(alias)) => needs_box(model, &alias.ty),
            None => false,
        },
        _ => false,
    }
}

/// A Rust string literal for `s`.
pub fn str_literal(s: &str) -> String {
    format!("{s:?}")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

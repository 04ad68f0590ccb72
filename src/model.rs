//! Structural model: declared object types, aliases and unions.
//!
//! [`ModelDocument`] is the serde form read from input files. [`Model::build`]
//! checks the validity invariants once and resolves per-field codec metadata,
//! after which the model is immutable and read by the generators.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lower::is_valid_ident;
use crate::runtime::WireShape;

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT FORM
// ————————————————————————————————————————————————————————————————————————————

/// Reference to a value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Only valid as the payload of a union's null alternative.
    Null,
    String,
    Bool,
    Integer,
    Number,
    /// Any JSON value, kept as-is.
    Any,
    NullableString,
    NullableNumber,
    NullableBool,
    EmptyString,
    Ref(String),
    Optional(Box<TypeRef>),
    Array(Box<TypeRef>),
    Map(Box<TypeRef>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPolicy {
    /// No keys beyond the declared fields.
    Closed,
    /// Unrecognised keys are read and discarded.
    #[default]
    Open,
    /// Unrecognised keys are collected, in arrival order, as values of the given type.
    Typed(TypeRef),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelDocument {
    pub structs: Vec<StructDef>,
    pub aliases: Vec<AliasDef>,
    pub unions: Vec<UnionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub extensions: ExtensionPolicy,
    #[serde(default = "default_true")]
    pub generate_code: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    /// Object key on the wire; defaults to `name`. `"-"` excludes the field.
    #[serde(default)]
    pub json_name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub alternatives: Vec<AlternativeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlternativeDef {
    pub label: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Inferred from `ty` when omitted.
    #[serde(default)]
    pub shape: Option<WireShape>,
}

fn default_true() -> bool { true }

impl ModelDocument {
    /// Append another document's declarations. Name clashes are caught by [`Model::build`].
    pub fn merge(&mut self, other: ModelDocument) {
        self.structs.extend(other.structs);
        self.aliases.extend(other.aliases);
        self.unions.extend(other.unions);
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RESOLVED FORM
// ————————————————————————————————————————————————————————————————————————————

/// How a field's value is written and read, decided once at model build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCodec {
    /// Plain string, written directly.
    Str,
    /// Plain boolean, read directly.
    Bool,
    /// Nullable wrapper or union: the type's own stream codec.
    Stream,
    /// Everything else: the generic value reader/writer.
    Generic,
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub wire_name: String,
    pub ty: TypeRef,
    pub description: String,
    pub required: bool,
    pub codec: ValueCodec,
    /// The value type has an "absent" representation (`optional`).
    pub optional_ref: bool,
    /// A literal boolean is a legitimate value for this field.
    pub accepts_bool: bool,
}

impl Field {
    pub fn is_excluded(&self) -> bool { self.wire_name == "-" }
}

#[derive(Debug, Clone, Serialize)]
pub struct Struct {
    pub name: String,
    pub description: String,
    pub fields: Vec<Field>,
    pub extensions: ExtensionPolicy,
    pub generate_code: bool,
}

impl Struct {
    /// Encoded as `{}` with no field-by-field logic.
    pub fn has_no_properties(&self) -> bool {
        self.fields.is_empty() && !matches!(self.extensions, ExtensionPolicy::Typed(_))
    }

    pub fn wire_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_excluded())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alias {
    pub name: String,
    pub ty: TypeRef,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alternative {
    pub label: String,
    pub ty: TypeRef,
    pub shape: WireShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct Union {
    pub name: String,
    pub description: String,
    pub alternatives: Vec<Alternative>,
}

impl Union {
    pub fn alternative(&self, shape: WireShape) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.shape == shape)
    }

    pub fn has_shape(&self, shape: WireShape) -> bool {
        self.alternative(shape).is_some()
    }

    /// Object-classified alternatives, in declared order.
    pub fn object_alternatives(&self) -> impl Iterator<Item = &Alternative> {
        self.alternatives.iter().filter(|a| a.shape == WireShape::Object)
    }

    /// Array-classified alternatives, in declared order.
    pub fn array_alternatives(&self) -> impl Iterator<Item = &Alternative> {
        self.alternatives.iter().filter(|a| a.shape == WireShape::Array)
    }
}

/// What a type name refers to.
#[derive(Debug, Clone, Copy)]
pub enum Declared<'a> {
    Struct(&'a Struct),
    Alias(&'a Alias),
    Union(&'a Union),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Model {
    pub structs: BTreeMap<String, Struct>,
    pub aliases: BTreeMap<String, Alias>,
    pub unions: BTreeMap<String, Union>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("invalid identifier `{0}`")]
    InvalidIdent(String),
    #[error("`{owner}` references unknown type `{name}`")]
    UnknownType { owner: String, name: String },
    #[error("alias `{0}` is part of a cycle")]
    AliasCycle(String),
    #[error("`{type_name}`: field `{field}` is declared more than once")]
    DuplicateField { type_name: String, field: String },
    #[error("`{type_name}`: wire name `{wire}` is used by more than one field")]
    DuplicateWireName { type_name: String, wire: String },
    #[error("`{type_name}`: field `{field}` collides with the extension property map")]
    ReservedField { type_name: String, field: String },
    #[error("`{0}`: the null type is only valid as a union's null alternative")]
    NullOutsideUnion(String),
    #[error("union `{0}` declares no alternatives")]
    EmptyUnion(String),
    #[error("union `{union}`: label `{label}` is reserved or declared more than once")]
    DuplicateLabel { union: String, label: String },
    #[error("union `{union}` declares more than one {shape} alternative")]
    DuplicateShape { union: String, shape: WireShape },
    #[error("union `{union}`: alternative `{label}` cannot carry the {shape} shape")]
    ShapeTypeMismatch { union: String, label: String, shape: WireShape },
}

impl Model {
    pub fn build(doc: ModelDocument) -> Result<Model, ModelError> {
        let mut names = BTreeSet::new();
        let all_names = doc.structs.iter().map(|s| &s.name)
            .chain(doc.aliases.iter().map(|a| &a.name))
            .chain(doc.unions.iter().map(|u| &u.name));
        for name in all_names {
            if !is_valid_ident(name) {
                return Err(ModelError::InvalidIdent(name.clone()));
            }
            if !names.insert(name.clone()) {
                return Err(ModelError::DuplicateType(name.clone()));
            }
        }

        // Declarations first, so resolution below can see every name.
        let mut model = Model::default();
        for a in doc.aliases {
            let alias = Alias { name: a.name, ty: a.ty, description: a.description };
            model.aliases.insert(alias.name.clone(), alias);
        }
        for u in &doc.unions {
            let placeholder = Union { name: u.name.clone(), description: u.description.clone(), alternatives: Vec::new() };
            model.unions.insert(u.name.clone(), placeholder);
        }
        for s in &doc.structs {
            let placeholder = Struct {
                name: s.name.clone(),
                description: s.description.clone(),
                fields: Vec::new(),
                extensions: s.extensions.clone(),
                generate_code: s.generate_code,
            };
            model.structs.insert(s.name.clone(), placeholder);
        }

        for alias in model.aliases.values() {
            model.check_type_ref(&alias.name, &alias.ty, false)?;
            model.resolve_alias(&alias.name)?;
        }

        let mut unions = Vec::with_capacity(doc.unions.len());
        for u in doc.unions {
            unions.push(model.build_union(u)?);
        }
        for u in unions {
            model.unions.insert(u.name.clone(), u);
        }

        let mut structs = Vec::with_capacity(doc.structs.len());
        for s in doc.structs {
            structs.push(model.build_struct(s)?);
        }
        for s in structs {
            model.structs.insert(s.name.clone(), s);
        }

        log::debug!(
            "model built: {} structs, {} aliases, {} unions",
            model.structs.len(), model.aliases.len(), model.unions.len()
        );
        Ok(model)
    }

    pub fn lookup(&self, name: &str) -> Option<Declared<'_>> {
        if let Some(s) = self.structs.get(name) {
            return Some(Declared::Struct(s));
        }
        if let Some(a) = self.aliases.get(name) {
            return Some(Declared::Alias(a));
        }
        self.unions.get(name).map(Declared::Union)
    }

    /// Follow alias references until a non-alias type reference is reached.
    pub fn resolve<'a>(&'a self, ty: &'a TypeRef) -> &'a TypeRef {
        let mut current = ty;
        let mut hops = 0;
        while let TypeRef::Ref(name) = current {
            match self.aliases.get(name) {
                Some(alias) if hops <= self.aliases.len() => {
                    current = &alias.ty;
                    hops += 1;
                }
                _ => break,
            }
        }
        current
    }

    fn resolve_alias(&self, name: &str) -> Result<(), ModelError> {
        let mut seen = BTreeSet::new();
        let mut current = name;
        while let Some(alias) = self.aliases.get(current) {
            if !seen.insert(current) {
                return Err(ModelError::AliasCycle(name.to_string()));
            }
            match &alias.ty {
                TypeRef::Ref(next) => current = next,
                _ => break,
            }
        }
        Ok(())
    }

    fn check_type_ref(&self, owner: &str, ty: &TypeRef, null_allowed: bool) -> Result<(), ModelError> {
        match ty {
            TypeRef::Null if !null_allowed => Err(ModelError::NullOutsideUnion(owner.to_string())),
            TypeRef::Ref(name) if self.lookup(name).is_none() => Err(ModelError::UnknownType {
                owner: owner.to_string(),
                name: name.clone(),
            }),
            TypeRef::Optional(inner) | TypeRef::Array(inner) | TypeRef::Map(inner) => {
                self.check_type_ref(owner, inner, false)
            }
            _ => Ok(()),
        }
    }

    fn build_struct(&self, def: StructDef) -> Result<Struct, ModelError> {
        if let ExtensionPolicy::Typed(ty) = &def.extensions {
            self.check_type_ref(&def.name, ty, false)?;
        }

        let mut names = BTreeSet::new();
        let mut wires = BTreeSet::new();
        let mut fields = Vec::with_capacity(def.fields.len());
        for f in def.fields {
            if !is_valid_ident(&f.name) {
                return Err(ModelError::InvalidIdent(f.name));
            }
            if !names.insert(crate::lower::field_ident(&f.name)) {
                return Err(ModelError::DuplicateField { type_name: def.name.clone(), field: f.name });
            }
            if matches!(def.extensions, ExtensionPolicy::Typed(_))
                && crate::lower::field_ident(&f.name) == crate::lower::EXTENSION_FIELD
            {
                return Err(ModelError::ReservedField { type_name: def.name.clone(), field: f.name });
            }
            self.check_type_ref(&def.name, &f.ty, false)?;

            let wire_name = f.json_name.unwrap_or_else(|| f.name.clone());
            if wire_name != "-" && !wires.insert(wire_name.clone()) {
                return Err(ModelError::DuplicateWireName { type_name: def.name.clone(), wire: wire_name });
            }

            let codec = self.value_codec(&f.ty);
            let optional_ref = matches!(self.resolve(&f.ty), TypeRef::Optional(_));
            let accepts_bool = self.accepts_bool(&f.ty);
            log::trace!("{}.{}: {:?} codec", def.name, f.name, codec);
            fields.push(Field {
                name: f.name,
                wire_name,
                ty: f.ty,
                description: f.description,
                required: f.required,
                codec,
                optional_ref,
                accepts_bool,
            });
        }

        Ok(Struct {
            name: def.name,
            description: def.description,
            fields,
            extensions: def.extensions,
            generate_code: def.generate_code,
        })
    }

    fn build_union(&self, def: UnionDef) -> Result<Union, ModelError> {
        if def.alternatives.is_empty() {
            return Err(ModelError::EmptyUnion(def.name));
        }
        let mut labels = BTreeSet::new();
        let mut shapes = BTreeSet::new();
        let mut alternatives = Vec::with_capacity(def.alternatives.len());
        for a in def.alternatives {
            if !is_valid_ident(&a.label) {
                return Err(ModelError::InvalidIdent(a.label));
            }
            let variant = crate::lower::variant_ident(&a.label);
            if variant == "NotSet" || !labels.insert(variant) {
                return Err(ModelError::DuplicateLabel { union: def.name.clone(), label: a.label });
            }
            self.check_type_ref(&def.name, &a.ty, true)?;

            let inferred = self.infer_shape(&a.ty);
            let shape = a.shape.unwrap_or(inferred);
            let carries = match shape {
                WireShape::Array => inferred == WireShape::Array || matches!(self.resolve(&a.ty), TypeRef::Any),
                _ => inferred == shape,
            };
            if !carries {
                return Err(ModelError::ShapeTypeMismatch { union: def.name.clone(), label: a.label, shape });
            }
            // objects and arrays are told apart by trial-decode, in declared order
            let trialled = matches!(shape, WireShape::Object | WireShape::Array);
            if !trialled && !shapes.insert(shape) {
                return Err(ModelError::DuplicateShape { union: def.name.clone(), shape });
            }
            alternatives.push(Alternative { label: a.label, ty: a.ty, shape });
        }
        Ok(Union { name: def.name, description: def.description, alternatives })
    }

    /// The wire shape a value of this type naturally takes.
    pub fn infer_shape(&self, ty: &TypeRef) -> WireShape {
        match self.resolve(ty) {
            TypeRef::Null => WireShape::Null,
            TypeRef::String => WireShape::String,
            TypeRef::Bool => WireShape::Boolean,
            TypeRef::Integer => WireShape::Integer,
            TypeRef::Number => WireShape::Float,
            TypeRef::Array(_) => WireShape::Array,
            _ => WireShape::Object,
        }
    }

    pub fn value_codec(&self, ty: &TypeRef) -> ValueCodec {
        match self.resolve(ty) {
            TypeRef::String => ValueCodec::Str,
            TypeRef::Bool => ValueCodec::Bool,
            TypeRef::NullableString | TypeRef::NullableNumber | TypeRef::NullableBool | TypeRef::EmptyString => {
                ValueCodec::Stream
            }
            TypeRef::Ref(name) if self.unions.contains_key(name) => ValueCodec::Stream,
            _ => ValueCodec::Generic,
        }
    }

    /// Whether a literal boolean can be a real value of this type.
    pub fn accepts_bool(&self, ty: &TypeRef) -> bool {
        match self.resolve(ty) {
            TypeRef::Bool | TypeRef::NullableBool | TypeRef::Any => true,
            TypeRef::Optional(inner) => self.accepts_bool(inner),
            TypeRef::Ref(name) => self
                .unions
                .get(name)
                .is_some_and(|u| u.alternatives.iter().any(|a| {
                    a.shape == WireShape::Boolean || matches!(self.resolve(&a.ty), TypeRef::Any)
                })),
            _ => false,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> ModelDocument {
        serde_json::from_value(v).unwrap()
    }

    fn product() -> serde_json::Value {
        json!({
            "structs": [{
                "name": "Product",
                "fields": [
                    {"name": "id", "type": "integer", "required": true},
                    {"name": "name", "type": "string", "required": true},
                    {"name": "description", "type": "empty_string"},
                    {"name": "internal", "json_name": "-", "type": "string"}
                ]
            }]
        })
    }

    #[test]
    fn builds_fields_with_codec_metadata() {
        let model = Model::build(doc(product())).unwrap();
        let s = &model.structs["Product"];
        assert_eq!(s.extensions, ExtensionPolicy::Open);
        assert!(s.generate_code);
        let codecs: Vec<_> = s.fields.iter().map(|f| f.codec).collect();
        assert_eq!(codecs, [ValueCodec::Generic, ValueCodec::Str, ValueCodec::Stream, ValueCodec::Str]);
        assert_eq!(s.wire_fields().count(), 3);
        assert!(s.fields[3].is_excluded());
    }

    #[test]
    fn alias_and_union_references_resolve() {
        let model = Model::build(doc(json!({
            "aliases": [{"name": "Label", "type": "string"}],
            "unions": [{"name": "Flag", "alternatives": [
                {"label": "Bool", "type": "bool"},
                {"label": "Text", "type": {"ref": "Label"}}
            ]}],
            "structs": [{"name": "Holder", "fields": [
                {"name": "label", "type": {"ref": "Label"}},
                {"name": "flag", "type": {"ref": "Flag"}},
                {"name": "owner", "type": {"optional": {"ref": "Holder"}}, "required": true}
            ]}]
        }))).unwrap();
        let fields = &model.structs["Holder"].fields;
        assert_eq!(fields[0].codec, ValueCodec::Str);
        assert_eq!(fields[1].codec, ValueCodec::Stream);
        assert!(fields[1].accepts_bool);
        assert!(!fields[0].accepts_bool);
        assert!(fields[2].optional_ref);
        assert_eq!(model.unions["Flag"].alternatives[1].shape, WireShape::String);
    }

    #[test]
    fn rejects_duplicate_non_object_shapes() {
        let err = Model::build(doc(json!({
            "unions": [{"name": "U", "alternatives": [
                {"label": "A", "type": "integer"},
                {"label": "B", "type": "integer"}
            ]}]
        }))).unwrap_err();
        assert_eq!(err, ModelError::DuplicateShape { union: "U".into(), shape: WireShape::Integer });
    }

    #[test]
    fn multiple_object_alternatives_are_allowed() {
        let model = Model::build(doc(json!({
            "structs": [
                {"name": "A", "fields": [{"name": "age", "type": "integer", "required": true}]},
                {"name": "B", "fields": [{"name": "name", "type": "string", "required": true}]}
            ],
            "unions": [{"name": "U", "alternatives": [
                {"label": "A", "type": {"ref": "A"}},
                {"label": "B", "type": {"ref": "B"}},
                {"label": "List", "type": {"array": "integer"}, "shape": "array"},
                {"label": "Names", "type": {"array": "string"}}
            ]}]
        }))).unwrap();
        let u = &model.unions["U"];
        let objects: Vec<_> = u.object_alternatives().map(|a| a.label.as_str()).collect();
        assert_eq!(objects, ["A", "B"]);
        let arrays: Vec<_> = u.array_alternatives().map(|a| a.label.as_str()).collect();
        assert_eq!(arrays, ["List", "Names"]);
    }

    #[test]
    fn array_shape_needs_an_array_type() {
        let err = Model::build(doc(json!({
            "structs": [{"name": "A", "fields": [{"name": "age", "type": "integer"}]}],
            "unions": [{"name": "U", "alternatives": [
                {"label": "A", "type": {"ref": "A"}, "shape": "array"}
            ]}]
        }))).unwrap_err();
        assert!(matches!(err, ModelError::ShapeTypeMismatch { shape: WireShape::Array, .. }));

        let err = Model::build(doc(json!({
            "unions": [{"name": "U", "alternatives": [
                {"label": "L", "type": {"array": "integer"}, "shape": "object"}
            ]}]
        }))).unwrap_err();
        assert!(matches!(err, ModelError::ShapeTypeMismatch { shape: WireShape::Object, .. }));
    }

    #[test]
    fn rejects_shape_the_type_cannot_carry() {
        let err = Model::build(doc(json!({
            "unions": [{"name": "U", "alternatives": [
                {"label": "A", "type": "string", "shape": "integer"}
            ]}]
        }))).unwrap_err();
        assert!(matches!(err, ModelError::ShapeTypeMismatch { .. }));
    }

    #[test]
    fn rejects_unknown_references_and_cycles() {
        let err = Model::build(doc(json!({
            "structs": [{"name": "S", "fields": [{"name": "x", "type": {"ref": "Missing"}}]}]
        }))).unwrap_err();
        assert_eq!(err, ModelError::UnknownType { owner: "S".into(), name: "Missing".into() });

        let err = Model::build(doc(json!({
            "aliases": [
                {"name": "A", "type": {"ref": "B"}},
                {"name": "B", "type": {"ref": "A"}}
            ]
        }))).unwrap_err();
        assert!(matches!(err, ModelError::AliasCycle(_)));
    }

    #[test]
    fn rejects_duplicate_wire_names_but_not_excluded_fields() {
        let err = Model::build(doc(json!({
            "structs": [{"name": "S", "fields": [
                {"name": "a", "json_name": "k", "type": "string"},
                {"name": "b", "json_name": "k", "type": "string"}
            ]}]
        }))).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateWireName { .. }));

        Model::build(doc(json!({
            "structs": [{"name": "S", "fields": [
                {"name": "a", "json_name": "-", "type": "string"},
                {"name": "b", "json_name": "-", "type": "string"}
            ]}]
        }))).unwrap();
    }

    #[test]
    fn null_only_inside_unions() {
        let err = Model::build(doc(json!({
            "structs": [{"name": "S", "fields": [{"name": "a", "type": "null"}]}]
        }))).unwrap_err();
        assert_eq!(err, ModelError::NullOutsideUnion("S".into()));
    }

    #[test]
    fn no_property_structs() {
        let model = Model::build(doc(json!({
            "structs": [
                {"name": "Empty", "extensions": "closed"},
                {"name": "Bag", "extensions": {"typed": "integer"}}
            ]
        }))).unwrap();
        assert!(model.structs["Empty"].has_no_properties());
        assert!(!model.structs["Bag"].has_no_properties());
    }

    #[test]
    fn duplicate_type_names_across_documents() {
        let mut first = doc(product());
        first.merge(doc(product()));
        assert_eq!(Model::build(first).unwrap_err(), ModelError::DuplicateType("Product".into()));
    }
}

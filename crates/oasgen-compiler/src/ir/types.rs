//! Schema IR: the closed set of types handed to emitters.

use std::collections::BTreeMap;

use super::literal::{JsonType, Literal, Number};
use crate::document::Location;
use crate::resolve::RefKey;

/// Handle into [`super::Ir::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An edge of the type graph.
///
/// `indirect` edges must be realized through a heap cell or an index; every
/// cycle in the graph contains at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    pub id: TypeId,
    pub indirect: bool,
}

impl TypeRef {
    pub fn new(id: TypeId) -> Self {
        Self {
            id,
            indirect: false,
        }
    }
}

/// Where a type came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Target of a `$ref`, deduplicated by key.
    Component(RefKey),
    /// An unnamed schema, identified by its own location.
    Inline(RefKey),
    /// Synthesized by the compiler (wrappers, content-type sums).
    Builtin,
}

impl Origin {
    pub fn key(&self) -> Option<&RefKey> {
        match self {
            Origin::Component(key) | Origin::Inline(key) => Some(key),
            Origin::Builtin => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    String,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    /// Base64-encoded string (`format: byte`).
    Bytes,
}

impl PrimitiveKind {
    pub fn json_type(self) -> JsonType {
        match self {
            PrimitiveKind::String | PrimitiveKind::Bytes => JsonType::String,
            PrimitiveKind::Int32 | PrimitiveKind::Int64 => JsonType::Integer,
            PrimitiveKind::Float32 | PrimitiveKind::Float64 => JsonType::Number,
            PrimitiveKind::Bool => JsonType::Boolean,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "String",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::Float32 => "Float32",
            PrimitiveKind::Float64 => "Float64",
            PrimitiveKind::Bool => "Bool",
            PrimitiveKind::Bytes => "Bytes",
        }
    }
}

/// Format refinement of a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Duration,
    Uuid,
    Ipv4,
    Ipv6,
    Ip,
    Uri,
    Email,
    Hostname,
    Password,
    Custom(String),
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "date-time" => Format::DateTime,
            "date" => Format::Date,
            "time" => Format::Time,
            "duration" => Format::Duration,
            "uuid" => Format::Uuid,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "ip" => Format::Ip,
            "uri" | "url" => Format::Uri,
            "email" => Format::Email,
            "hostname" => Format::Hostname,
            "password" => Format::Password,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::DateTime => "date-time",
            Format::Date => "date",
            Format::Time => "time",
            Format::Duration => "duration",
            Format::Uuid => "uuid",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Ip => "ip",
            Format::Uri => "uri",
            Format::Email => "email",
            Format::Hostname => "hostname",
            Format::Password => "password",
            Format::Custom(name) => name,
        }
    }

    /// Name used for the primitive type carrying this format.
    pub fn type_name(&self) -> String {
        match self {
            Format::DateTime => "DateTime".to_string(),
            Format::Date => "Date".to_string(),
            Format::Time => "Time".to_string(),
            Format::Duration => "Duration".to_string(),
            Format::Uuid => "UUID".to_string(),
            Format::Ipv4 => "IPv4".to_string(),
            Format::Ipv6 => "IPv6".to_string(),
            Format::Ip => "IP".to_string(),
            Format::Uri => "URI".to_string(),
            Format::Email => "Email".to_string(),
            Format::Hostname => "Hostname".to_string(),
            Format::Password => "Password".to_string(),
            Format::Custom(name) => oasgen_core::utils::to_pascal_case(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bound {
    pub value: Number,
    pub exclusive: bool,
}

/// Runtime checks attached to a primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Validation {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub multiple_of: Option<Number>,
    /// Values excluded by `not`.
    pub excluded: Vec<Literal>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        *self == Validation::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub name: String,
    pub value: Literal,
}

/// Constraints on map keys (`propertyNames`, `minProperties`, `maxProperties`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

impl KeyConstraints {
    pub fn is_empty(&self) -> bool {
        *self == KeyConstraints::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternProperty {
    pub pattern: String,
    pub value: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Property name on the wire.
    pub name: String,
    pub target_name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Literal>,
    pub extra_tags: BTreeMap<String, String>,
    pub location: Location,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    pub name: String,
    pub ty: TypeRef,
    /// Discriminator values selecting this variant. The first one is used
    /// when encoding.
    pub tags: Vec<String>,
    /// Required fields whose presence selects this variant.
    pub unique_fields: Vec<String>,
    /// Wire type selecting this variant.
    pub json_type: Option<JsonType>,
    pub content_type: Option<String>,
}

impl Variant {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            name: String::new(),
            ty,
            tags: Vec::new(),
            unique_fields: Vec::new(),
            json_type: None,
            content_type: None,
        }
    }
}

/// How a decoder picks the variant of a sum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminator {
    Explicit { property: String },
    ByUniqueFields,
    ByJsonType,
    /// By wire type, then by unique fields among object variants.
    Mixed,
    ByContentType,
}

impl Discriminator {
    pub fn name(&self) -> &'static str {
        match self {
            Discriminator::Explicit { .. } => "explicit",
            Discriminator::ByUniqueFields => "by-unique-fields",
            Discriminator::ByJsonType => "by-json-type",
            Discriminator::Mixed => "mixed",
            Discriminator::ByContentType => "by-content-type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive {
        kind: PrimitiveKind,
        format: Option<Format>,
        validation: Validation,
    },
    Enum {
        base: PrimitiveKind,
        values: Vec<EnumValue>,
    },
    Array {
        element: TypeRef,
        min_items: Option<u64>,
        max_items: Option<u64>,
        unique: bool,
    },
    /// `additionalProperties`, `patternProperties` and explicit properties on
    /// one object. Decode priority: `props` fields, then `patterns` in order,
    /// then `value`.
    Map {
        value: Option<TypeRef>,
        patterns: Vec<PatternProperty>,
        props: Option<TypeRef>,
        /// `additionalProperties: false`; pattern matches are still accepted.
        closed: bool,
        key: KeyConstraints,
    },
    Struct {
        fields: Vec<Field>,
        /// `additionalProperties: false`.
        closed: bool,
    },
    Sum {
        variants: Vec<Variant>,
        discriminator: Discriminator,
    },
    Tuple {
        elements: Vec<TypeRef>,
    },
    Alias {
        target: TypeRef,
    },
    Generic {
        optional: bool,
        nullable: bool,
        inner: TypeRef,
    },
    Any,
    Stream,
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Primitive { .. } => "primitive",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Array { .. } => "array",
            TypeKind::Map { .. } => "map",
            TypeKind::Struct { .. } => "struct",
            TypeKind::Sum { .. } => "sum",
            TypeKind::Tuple { .. } => "tuple",
            TypeKind::Alias { .. } => "alias",
            TypeKind::Generic { .. } => "generic",
            TypeKind::Any => "any",
            TypeKind::Stream => "stream",
        }
    }

    /// Outgoing edges, in a fixed order.
    pub fn refs(&self) -> Vec<TypeRef> {
        match self {
            TypeKind::Primitive { .. } | TypeKind::Enum { .. } | TypeKind::Any | TypeKind::Stream => {
                Vec::new()
            }
            TypeKind::Array { element, .. } => vec![*element],
            TypeKind::Map {
                value,
                patterns,
                props,
                ..
            } => props
                .iter()
                .copied()
                .chain(patterns.iter().map(|p| p.value))
                .chain(value.iter().copied())
                .collect(),
            TypeKind::Struct { fields, .. } => fields.iter().map(|f| f.ty).collect(),
            TypeKind::Sum { variants, .. } => variants.iter().map(|v| v.ty).collect(),
            TypeKind::Tuple { elements } => elements.clone(),
            TypeKind::Alias { target } => vec![*target],
            TypeKind::Generic { inner, .. } => vec![*inner],
        }
    }

    /// Visit every edge mutably, in the order of [`TypeKind::refs`].
    pub fn refs_mut(&mut self) -> Vec<&mut TypeRef> {
        match self {
            TypeKind::Primitive { .. } | TypeKind::Enum { .. } | TypeKind::Any | TypeKind::Stream => {
                Vec::new()
            }
            TypeKind::Array { element, .. } => vec![element],
            TypeKind::Map {
                value,
                patterns,
                props,
                ..
            } => props
                .iter_mut()
                .chain(patterns.iter_mut().map(|p| &mut p.value))
                .chain(value.iter_mut())
                .collect(),
            TypeKind::Struct { fields, .. } => fields.iter_mut().map(|f| &mut f.ty).collect(),
            TypeKind::Sum { variants, .. } => variants.iter_mut().map(|v| &mut v.ty).collect(),
            TypeKind::Tuple { elements } => elements.iter_mut().collect(),
            TypeKind::Alias { target } => vec![target],
            TypeKind::Generic { inner, .. } => vec![inner],
        }
    }

    /// Whether a value of this kind can be built without following the
    /// edge at `index` of [`TypeKind::refs`].
    pub fn edge_escapes(&self, index: usize) -> bool {
        match self {
            TypeKind::Array { .. } | TypeKind::Generic { .. } => true,
            TypeKind::Map { props, .. } => !(props.is_some() && index == 0),
            TypeKind::Struct { fields, .. } => fields.get(index).is_some_and(|f| !f.required),
            _ => false,
        }
    }

    /// Kinds deduplicated by structure rather than by source identity.
    pub fn is_structural(&self) -> bool {
        match self {
            TypeKind::Primitive { .. }
            | TypeKind::Array { .. }
            | TypeKind::Tuple { .. }
            | TypeKind::Generic { .. }
            | TypeKind::Any
            | TypeKind::Stream => true,
            TypeKind::Map { props, .. } => props.is_none(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// Final target identifier.
    pub name: String,
    pub kind: TypeKind,
    pub origin: Origin,
    /// Preferred name, before collision handling.
    pub hint: Option<String>,
    pub location: Option<Location>,
    pub description: Option<String>,
}

impl Type {
    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeKind::Generic { nullable: true, .. })
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.kind, TypeKind::Generic { optional: true, .. })
    }
}

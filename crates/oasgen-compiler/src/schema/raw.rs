use std::collections::BTreeMap;

use crate::diagnostics::Span;
use crate::ir::{Bound, JsonType, Literal, Number};
use crate::resolve::RefKey;

/// An unresolved `$ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    pub raw: String,
    pub key: RefKey,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    Bool(bool),
    Schema(Box<RawSchema>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawProperty {
    pub name: String,
    pub key_span: Span,
    pub schema: RawSchema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDiscriminator {
    pub property: String,
    /// `(wire value, reference, span of the mapping value)` in declaration
    /// order.
    pub mapping: Vec<(String, String, Span)>,
    pub span: Span,
}

/// A schema object with validated keywords.
///
/// Subschemas written inline are parsed recursively; `$ref`s are kept as
/// [`SchemaRef`] and resolved by the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSchema {
    pub span: Span,
    /// Identity of the schema node itself.
    pub key: RefKey,
    pub reference: Option<SchemaRef>,
    /// `true`/`false` schemas (3.1).
    pub boolean: Option<bool>,

    /// Declared types, `null` included, in declaration order.
    pub types: Vec<JsonType>,
    pub type_span: Option<Span>,
    /// 3.0 `nullable: true`.
    pub nullable: bool,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Literal>,

    pub enum_values: Option<Vec<Literal>>,
    pub const_value: Option<Literal>,

    pub properties: Vec<RawProperty>,
    pub required: Vec<String>,
    pub additional: Option<Additional>,
    pub pattern_properties: Vec<(String, RawSchema)>,
    pub property_names: Option<Box<RawSchema>>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,

    pub items: Option<Box<RawSchema>>,
    pub prefix_items: Vec<RawSchema>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,

    pub all_of: Vec<RawSchema>,
    pub one_of: Vec<RawSchema>,
    pub any_of: Vec<RawSchema>,
    pub not: Option<Box<RawSchema>>,
    pub discriminator: Option<RawDiscriminator>,

    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub multiple_of: Option<Number>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,

    pub read_only: bool,
    pub write_only: bool,
    pub deprecated: bool,

    /// `x-ogen-name` (or `x-name`).
    pub x_name: Option<String>,
    /// `x-ogen-properties-type`.
    pub x_properties_type: Option<String>,
    /// `x-ogen-extra-tags`.
    pub x_extra_tags: BTreeMap<String, String>,
}

impl RawSchema {
    pub fn empty(key: RefKey, span: Span) -> Self {
        Self {
            span,
            key,
            reference: None,
            boolean: None,
            types: Vec::new(),
            type_span: None,
            nullable: false,
            format: None,
            title: None,
            description: None,
            default: None,
            enum_values: None,
            const_value: None,
            properties: Vec::new(),
            required: Vec::new(),
            additional: None,
            pattern_properties: Vec::new(),
            property_names: None,
            min_properties: None,
            max_properties: None,
            items: None,
            prefix_items: Vec::new(),
            min_items: None,
            max_items: None,
            unique_items: false,
            all_of: Vec::new(),
            one_of: Vec::new(),
            any_of: Vec::new(),
            not: None,
            discriminator: None,
            minimum: None,
            maximum: None,
            multiple_of: None,
            min_length: None,
            max_length: None,
            pattern: None,
            read_only: false,
            write_only: false,
            deprecated: false,
            x_name: None,
            x_properties_type: None,
            x_extra_tags: BTreeMap::new(),
        }
    }

    /// `nullable: true` or a `null` entry in `type`.
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.types.contains(&JsonType::Null)
    }

    /// Declared types other than `null`.
    pub fn non_null_types(&self) -> Vec<JsonType> {
        self.types
            .iter()
            .copied()
            .filter(|t| *t != JsonType::Null)
            .collect()
    }

    /// `{type: null}` and nothing else that shapes a value.
    pub fn is_null_only(&self) -> bool {
        self.types == [JsonType::Null] && self.reference.is_none()
    }

    pub fn has_object_keywords(&self) -> bool {
        !self.properties.is_empty()
            || !self.required.is_empty()
            || self.additional.is_some()
            || !self.pattern_properties.is_empty()
            || self.property_names.is_some()
            || self.min_properties.is_some()
            || self.max_properties.is_some()
    }

    pub fn has_array_keywords(&self) -> bool {
        self.items.is_some()
            || !self.prefix_items.is_empty()
            || self.min_items.is_some()
            || self.max_items.is_some()
            || self.unique_items
    }

    pub fn has_string_keywords(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some() || self.pattern.is_some()
    }

    pub fn has_numeric_keywords(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some() || self.multiple_of.is_some()
    }

    pub fn has_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    /// Whether anything beside `$ref` and annotations shapes the value.
    pub fn has_constraints(&self) -> bool {
        !self.types.is_empty()
            || self.nullable
            || self.format.is_some()
            || self.enum_values.is_some()
            || self.const_value.is_some()
            || self.has_object_keywords()
            || self.has_array_keywords()
            || self.has_string_keywords()
            || self.has_numeric_keywords()
            || self.has_composition()
            || self.not.is_some()
            || self.discriminator.is_some()
    }
}

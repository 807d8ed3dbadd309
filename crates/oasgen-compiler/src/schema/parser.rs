use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::document::{Node, Object, SourceId, Value};
use crate::ir::{Bound, JsonType, Literal, Number, SpecVersion};
use crate::resolve::{RefKey, key_error};

use super::raw::{Additional, RawDiscriminator, RawProperty, RawSchema, SchemaRef};

/// JSON-Schema keywords outside the supported grammar.
const UNSUPPORTED: &[&str] = &[
    "if",
    "then",
    "else",
    "dependentSchemas",
    "dependentRequired",
    "dependencies",
    "unevaluatedProperties",
    "unevaluatedItems",
    "contains",
    "minContains",
    "maxContains",
    "$dynamicRef",
    "$dynamicAnchor",
    "$recursiveRef",
    "$recursiveAnchor",
];

/// Maximum nesting of subschemas inside one schema object.
const MAX_NESTING: u32 = 64;

/// Converts schema nodes to [`RawSchema`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaParser {
    version: SpecVersion,
    depth: u32,
}

/// Spans of the keywords seen on one schema object, for locating
/// cross-keyword errors.
type KeywordSpans<'n> = HashMap<&'n str, Span>;

impl SchemaParser {
    pub fn new(version: SpecVersion) -> Self {
        Self { version, depth: 0 }
    }

    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// Parse the schema at `node`, whose own identity is `key`.
    pub fn parse(&self, node: &Node, source: SourceId, key: RefKey) -> Result<RawSchema, Diagnostic> {
        let span = Span::new(source, node.range);
        if self.depth >= MAX_NESTING {
            return Err(Diagnostic::new(DiagnosticKind::ParseLimit, span)
                .message(format!("subschemas nested more than {} levels deep", MAX_NESTING)));
        }
        let object = match &node.value {
            Value::Object(object) => object,
            Value::Bool(true) if self.version.is_31() => {
                let mut raw = RawSchema::empty(key, span);
                raw.boolean = Some(true);
                return Ok(raw);
            }
            Value::Bool(false) if self.version.is_31() => {
                return Err(invalid_type(span, &key, "the `false` schema admits no value"));
            }
            Value::Bool(_) => {
                return Err(invalid_type(span, &key, "boolean schemas require OpenAPI 3.1"));
            }
            _ => {
                let detail = format!("schema must be an object, found {}", node.type_name());
                return Err(invalid_type(span, &key, &detail));
            }
        };

        let mut raw = RawSchema::empty(key, span);
        if let Some(member) = object.member("$ref") {
            let value_span = Span::new(source, member.value.range);
            let Some(reference) = member.value.as_str() else {
                return Err(structure(value_span, "`$ref` must be a string"));
            };
            let target = RefKey::parse(reference, &raw.key.url)
                .map_err(|e| key_error(reference, value_span, e))?;
            raw.reference = Some(SchemaRef {
                raw: reference.to_string(),
                key: target,
                span: value_span,
            });
            // Siblings of `$ref` only count from 3.1 on.
            if !self.version.is_31() {
                raw.description = object.get("description").and_then(Node::as_str).map(String::from);
                return Ok(raw);
            }
        }

        let spans = self.keywords(object, source, &mut raw)?;
        self.validate(&raw, &spans)?;
        Ok(raw)
    }

    fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    fn keywords<'n>(
        &self,
        object: &'n Object,
        source: SourceId,
        raw: &mut RawSchema,
    ) -> Result<KeywordSpans<'n>, Diagnostic> {
        let mut spans: KeywordSpans<'n> = HashMap::new();
        let mut exclusive_min = false;
        let mut exclusive_max = false;

        for (name, member) in object.iter() {
            let value = &member.value;
            let key_span = Span::new(source, member.key_range);
            let at = Span::new(source, value.range);
            spans.insert(name, key_span);

            match name {
                "$ref" => {}
                "type" => {
                    raw.types = self.types(value, at, &raw.key)?;
                    raw.type_span = Some(at);
                }
                "nullable" => raw.nullable = boolean(value, at, name)?,
                "format" => raw.format = Some(string(value, at, name)?),
                "title" => raw.title = Some(string(value, at, name)?),
                "description" => raw.description = Some(string(value, at, name)?),
                "default" => raw.default = Some(Literal::from_node(value)),
                "enum" => {
                    let items = value
                        .as_array()
                        .filter(|items| !items.is_empty())
                        .ok_or_else(|| {
                            Diagnostic::new(DiagnosticKind::InvalidEnumValue, at)
                                .message("`enum` must be a non-empty array")
                        })?;
                    raw.enum_values = Some(items.iter().map(Literal::from_node).collect());
                }
                "const" => raw.const_value = Some(Literal::from_node(value)),

                "properties" => {
                    let props = object_of(value, at, name)?;
                    let base = raw.key.child("properties");
                    for (prop, member) in props.iter() {
                        let schema = self.nested().parse(&member.value, source, base.child(prop))?;
                        raw.properties.push(RawProperty {
                            name: prop.to_string(),
                            key_span: Span::new(source, member.key_range),
                            schema,
                        });
                    }
                }
                "required" => {
                    let items = value
                        .as_array()
                        .ok_or_else(|| structure(at, "`required` must be an array of strings"))?;
                    for item in items {
                        let Some(field) = item.as_str() else {
                            return Err(structure(
                                Span::new(source, item.range),
                                "`required` must be an array of strings",
                            ));
                        };
                        if !raw.required.iter().any(|r| r == field) {
                            raw.required.push(field.to_string());
                        }
                    }
                }
                "additionalProperties" => {
                    raw.additional = Some(match &value.value {
                        Value::Bool(b) => Additional::Bool(*b),
                        _ => Additional::Schema(Box::new(self.nested().parse(
                            value,
                            source,
                            raw.key.child(name),
                        )?)),
                    });
                }
                "patternProperties" => {
                    let patterns = object_of(value, at, name)?;
                    let base = raw.key.child(name);
                    for (pattern, member) in patterns.iter() {
                        check_regex(pattern, Span::new(source, member.key_range))?;
                        let schema = self.nested().parse(&member.value, source, base.child(pattern))?;
                        raw.pattern_properties.push((pattern.to_string(), schema));
                    }
                }
                "propertyNames" => {
                    let schema = self.nested().parse(value, source, raw.key.child(name))?;
                    let only_strings = schema.non_null_types().iter().all(|t| *t == JsonType::String)
                        && !schema.has_object_keywords()
                        && !schema.has_array_keywords()
                        && !schema.has_numeric_keywords()
                        && !schema.has_composition()
                        && schema.reference.is_none();
                    if !only_strings {
                        return Err(Diagnostic::new(DiagnosticKind::UnsupportedKeyword, key_span)
                            .message("propertyNames")
                            .hint("`propertyNames` may only carry string constraints"));
                    }
                    raw.property_names = Some(Box::new(schema));
                }
                "minProperties" => raw.min_properties = Some(count(value, at, name)?),
                "maxProperties" => raw.max_properties = Some(count(value, at, name)?),

                "items" => match &value.value {
                    // `items: false` closes a tuple; tuples are fixed-length already.
                    Value::Bool(false) if self.version.is_31() => {}
                    Value::Array(_) => {
                        return Err(structure(at, "`items` must be a schema; use `prefixItems` for tuples"));
                    }
                    _ => raw.items = Some(Box::new(self.nested().parse(value, source, raw.key.child(name))?)),
                },
                "prefixItems" => raw.prefix_items = self.list(value, source, &raw.key, name)?,
                "minItems" => raw.min_items = Some(count(value, at, name)?),
                "maxItems" => raw.max_items = Some(count(value, at, name)?),
                "uniqueItems" => raw.unique_items = boolean(value, at, name)?,

                "allOf" => raw.all_of = self.list(value, source, &raw.key, name)?,
                "oneOf" => raw.one_of = self.list(value, source, &raw.key, name)?,
                "anyOf" => raw.any_of = self.list(value, source, &raw.key, name)?,
                "not" => raw.not = Some(Box::new(self.nested().parse(value, source, raw.key.child(name))?)),
                "discriminator" => raw.discriminator = Some(discriminator(value, source, at)?),

                "minimum" => raw.minimum = Some(bound(value, at, name, false)?),
                "maximum" => raw.maximum = Some(bound(value, at, name, false)?),
                "exclusiveMinimum" => match &value.value {
                    Value::Bool(b) => exclusive_min = *b,
                    _ => raw.minimum = Some(bound(value, at, name, true)?),
                },
                "exclusiveMaximum" => match &value.value {
                    Value::Bool(b) => exclusive_max = *b,
                    _ => raw.maximum = Some(bound(value, at, name, true)?),
                },
                "multipleOf" => {
                    let n = number(value, at, name)?;
                    if n.as_f64() <= 0.0 {
                        return Err(Diagnostic::new(DiagnosticKind::ConstraintMismatch, at)
                            .message("`multipleOf` must be greater than 0"));
                    }
                    raw.multiple_of = Some(n);
                }
                "minLength" => raw.min_length = Some(count(value, at, name)?),
                "maxLength" => raw.max_length = Some(count(value, at, name)?),
                "pattern" => {
                    let pattern = string(value, at, name)?;
                    check_regex(&pattern, at)?;
                    raw.pattern = Some(pattern);
                }

                "readOnly" => raw.read_only = boolean(value, at, name)?,
                "writeOnly" => raw.write_only = boolean(value, at, name)?,
                "deprecated" => raw.deprecated = boolean(value, at, name)?,

                "x-ogen-name" | "x-name" => raw.x_name = Some(string(value, at, name)?),
                "x-ogen-properties-type" => raw.x_properties_type = Some(string(value, at, name)?),
                "x-ogen-extra-tags" => {
                    for (tag, member) in object_of(value, at, name)?.iter() {
                        let text = string(&member.value, Span::new(source, member.value.range), name)?;
                        raw.x_extra_tags.insert(tag.to_string(), text);
                    }
                }

                _ if UNSUPPORTED.contains(&name) => {
                    return Err(Diagnostic::new(DiagnosticKind::UnsupportedKeyword, key_span)
                        .message(name)
                        .at_pointer(raw.key.pointer.clone()));
                }
                _ => {}
            }
        }

        if exclusive_min && let Some(min) = &mut raw.minimum {
            min.exclusive = true;
        }
        if exclusive_max && let Some(max) = &mut raw.maximum {
            max.exclusive = true;
        }
        Ok(spans)
    }

    fn types(&self, value: &Node, at: Span, key: &RefKey) -> Result<Vec<JsonType>, Diagnostic> {
        let parse_one = |node: &Node| -> Result<JsonType, Diagnostic> {
            let name = node
                .as_str()
                .ok_or_else(|| invalid_type(at, key, "`type` must be a string"))?;
            JsonType::parse(name)
                .ok_or_else(|| invalid_type(at, key, &format!("unknown type `{}`", name)))
        };

        match &value.value {
            Value::String(_) => Ok(vec![parse_one(value)?]),
            Value::Array(_) if !self.version.is_31() => {
                Err(invalid_type(at, key, "type arrays require OpenAPI 3.1"))
            }
            Value::Array(items) if items.is_empty() => {
                Err(invalid_type(at, key, "`type` must not be empty"))
            }
            Value::Array(items) => {
                let mut types = Vec::new();
                for item in items {
                    let ty = parse_one(item)?;
                    if !types.contains(&ty) {
                        types.push(ty);
                    }
                }
                Ok(types)
            }
            _ => Err(invalid_type(at, key, "`type` must be a string or an array")),
        }
    }

    fn list(
        &self,
        value: &Node,
        source: SourceId,
        key: &RefKey,
        keyword: &str,
    ) -> Result<Vec<RawSchema>, Diagnostic> {
        let at = Span::new(source, value.range);
        let items = value
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| structure(at, &format!("`{}` must be a non-empty array", keyword)))?;
        let base = key.child(keyword);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.nested().parse(item, source, base.child(&i.to_string())))
            .collect()
    }

    /// Checks that need several keywords at once.
    fn validate(&self, raw: &RawSchema, spans: &KeywordSpans<'_>) -> Result<(), Diagnostic> {
        let span_of = |keyword: &str| spans.get(keyword).copied().unwrap_or(raw.span);

        if raw.nullable && raw.types.contains(&JsonType::Null) {
            return Err(Diagnostic::new(DiagnosticKind::MixedNullability, span_of("nullable"))
                .related_to(span_of("type"), "`null` listed here")
                .at_pointer(raw.key.pointer.clone()));
        }

        let types = raw.non_null_types();
        if !types.is_empty() {
            let has = |t: JsonType| types.contains(&t);
            let numeric = has(JsonType::Integer) || has(JsonType::Number);
            let groups: [(&[&str], bool, &str); 4] = [
                (&["minLength", "maxLength", "pattern"], has(JsonType::String), "strings"),
                (
                    &["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf"],
                    numeric,
                    "numbers",
                ),
                (
                    &["items", "prefixItems", "minItems", "maxItems", "uniqueItems"],
                    has(JsonType::Array),
                    "arrays",
                ),
                (
                    &[
                        "properties",
                        "additionalProperties",
                        "patternProperties",
                        "propertyNames",
                        "minProperties",
                        "maxProperties",
                    ],
                    has(JsonType::Object),
                    "objects",
                ),
            ];
            for (keywords, applies, applies_to) in groups {
                if applies {
                    continue;
                }
                if let Some(keyword) = keywords.iter().find(|k| spans.contains_key(**k)) {
                    let declared: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
                    return Err(Diagnostic::new(DiagnosticKind::ConstraintMismatch, span_of(*keyword))
                        .message(format!(
                            "`{}` applies to {}, not `{}`",
                            keyword,
                            applies_to,
                            declared.join(" | ")
                        ))
                        .at_pointer(raw.key.pointer.clone()));
                }
            }
        }

        let ranges = [
            ("minLength", raw.min_length, "maxLength", raw.max_length),
            ("minItems", raw.min_items, "maxItems", raw.max_items),
            ("minProperties", raw.min_properties, "maxProperties", raw.max_properties),
        ];
        for (min_kw, min, max_kw, max) in ranges {
            if let (Some(min), Some(max)) = (min, max)
                && min > max
            {
                return Err(range_error(span_of(min_kw), span_of(max_kw), min_kw, max_kw));
            }
        }
        if let (Some(min), Some(max)) = (raw.minimum, raw.maximum)
            && min.value.as_f64() > max.value.as_f64()
        {
            return Err(range_error(span_of("minimum"), span_of("maximum"), "minimum", "maximum"));
        }

        if !raw.types.is_empty() {
            let admits = |value: &Literal| {
                let json_type = value.json_type();
                raw.types.iter().any(|t| t.admits(json_type)) || (value.is_null() && raw.nullable)
            };
            let declared: Vec<&str> = raw.types.iter().map(|t| t.as_str()).collect();
            for (keyword, values) in [
                ("enum", raw.enum_values.as_deref().unwrap_or_default()),
                ("const", raw.const_value.as_slice()),
            ] {
                if let Some(bad) = values.iter().find(|v| !admits(v)) {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidEnumValue, span_of(keyword))
                        .message(format!("{} is not of type `{}`", bad, declared.join(" | ")))
                        .at_pointer(raw.key.pointer.clone()));
                }
            }
        }

        Ok(())
    }
}

fn invalid_type(span: Span, key: &RefKey, detail: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::InvalidType, span)
        .message(detail)
        .at_pointer(key.pointer.clone())
}

fn structure(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::InvalidStructure, span).message(detail)
}

fn range_error(min_span: Span, max_span: Span, min: &str, max: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::ConstraintMismatch, min_span)
        .message(format!("`{}` is greater than `{}`", min, max))
        .related_to(max_span, format!("`{}` declared here", max))
}

fn boolean(node: &Node, at: Span, keyword: &str) -> Result<bool, Diagnostic> {
    node.as_bool()
        .ok_or_else(|| structure(at, &format!("`{}` must be a boolean", keyword)))
}

fn string(node: &Node, at: Span, keyword: &str) -> Result<String, Diagnostic> {
    node.as_str()
        .map(String::from)
        .ok_or_else(|| structure(at, &format!("`{}` must be a string", keyword)))
}

fn count(node: &Node, at: Span, keyword: &str) -> Result<u64, Diagnostic> {
    node.as_u64().ok_or_else(|| {
        Diagnostic::new(DiagnosticKind::ConstraintMismatch, at)
            .message(format!("`{}` must be a non-negative integer", keyword))
    })
}

fn number(node: &Node, at: Span, keyword: &str) -> Result<Number, Diagnostic> {
    node.as_number()
        .map(Number::from_json)
        .ok_or_else(|| structure(at, &format!("`{}` must be a number", keyword)))
}

fn bound(node: &Node, at: Span, keyword: &str, exclusive: bool) -> Result<Bound, Diagnostic> {
    Ok(Bound {
        value: number(node, at, keyword)?,
        exclusive,
    })
}

fn object_of<'n>(node: &'n Node, at: Span, keyword: &str) -> Result<&'n Object, Diagnostic> {
    node.as_object()
        .ok_or_else(|| structure(at, &format!("`{}` must be an object", keyword)))
}

fn discriminator(node: &Node, source: SourceId, at: Span) -> Result<RawDiscriminator, Diagnostic> {
    let object = object_of(node, at, "discriminator")?;
    let invalid = |span: Span, detail: &str| {
        Diagnostic::new(DiagnosticKind::InvalidDiscriminator, span).message(detail)
    };

    let property = object
        .get("propertyName")
        .and_then(Node::as_str)
        .ok_or_else(|| invalid(at, "`propertyName` is required"))?;

    let mut mapping = Vec::new();
    if let Some(map) = object.get("mapping") {
        let map_span = Span::new(source, map.range);
        let entries = map
            .as_object()
            .ok_or_else(|| invalid(map_span, "`mapping` must be an object"))?;
        for (tag, member) in entries.iter() {
            let value_span = Span::new(source, member.value.range);
            let reference = member
                .value
                .as_str()
                .ok_or_else(|| invalid(value_span, "mapping values must be strings"))?;
            mapping.push((tag.to_string(), reference.to_string(), value_span));
        }
    }

    Ok(RawDiscriminator {
        property: property.to_string(),
        mapping,
        span: at,
    })
}

fn check_regex(pattern: &str, at: Span) -> Result<(), Diagnostic> {
    match regex_syntax::Parser::new().parse(pattern) {
        Ok(_) => Ok(()),
        Err(e) => {
            let text = e.to_string();
            let reason = text
                .lines()
                .last()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            Err(Diagnostic::new(DiagnosticKind::BadRegex, at).message(format!("`{}`: {}", pattern, reason)))
        }
    }
}

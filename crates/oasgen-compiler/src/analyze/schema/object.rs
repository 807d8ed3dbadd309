//! Objects, maps and arrays.

use crate::diagnostics::{Diagnostic, Span};
use crate::ir::{Field, KeyConstraints, Origin, PatternProperty, TypeId, TypeKind, TypeRef};
use crate::schema::{Additional, RawSchema};

use super::{Analyzer, Site};

impl<'s> Analyzer<'s> {
    pub(super) fn object(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        let closed = matches!(raw.additional, Some(Additional::Bool(false)));
        let has_props = !raw.properties.is_empty() || !raw.required.is_empty();

        let value = match &raw.additional {
            Some(Additional::Schema(schema)) => {
                Some(self.lower(schema, site.for_schema(schema, "Additional"))?)
            }
            Some(Additional::Bool(true)) => Some(self.any()),
            _ => None,
        };

        let mut patterns = Vec::new();
        for (i, (pattern, schema)) in raw.pattern_properties.iter().enumerate() {
            let hint = format!("Pattern{}", i);
            let value = self.lower(schema, site.for_schema(schema, &hint))?;
            patterns.push(PatternProperty {
                pattern: pattern.clone(),
                value: TypeRef::new(value),
            });
        }

        if value.is_none() && patterns.is_empty() {
            if !has_props && !closed {
                // Free-form object.
                let any = self.any();
                let kind = TypeKind::Map {
                    value: Some(TypeRef::new(any)),
                    patterns: Vec::new(),
                    props: None,
                    closed: false,
                    key: key_constraints(raw),
                };
                return Ok(self.finish(kind, raw, site));
            }
            let fields = self.fields(raw, site)?;
            return Ok(self.finish(TypeKind::Struct { fields, closed }, raw, site));
        }

        let props = if has_props {
            let hint = match &raw.x_properties_type {
                Some(name) => oasgen_core::utils::to_pascal_case(name),
                None => format!("{}Props", site.hint),
            };
            let fields = self.fields(raw, site)?;
            let id = self
                .arena
                .reserve(Origin::Inline(raw.key.child("properties")), hint);
            self.arena.fill(
                id,
                TypeKind::Struct {
                    fields,
                    closed: false,
                },
            );
            let location = self.location(raw.span, &raw.key);
            self.arena.describe(id, raw.span, location, None);
            Some(TypeRef::new(id))
        } else {
            None
        };

        let kind = TypeKind::Map {
            value: value.map(TypeRef::new),
            patterns,
            props,
            closed,
            key: key_constraints(raw),
        };
        Ok(self.finish(kind, raw, site))
    }

    fn fields(&mut self, raw: &RawSchema, site: &Site) -> Result<Vec<Field>, Diagnostic> {
        let mut fields = Vec::new();
        for property in &raw.properties {
            let schema = &property.schema;
            let ty = self.lower(schema, site.for_schema(schema, &property.name))?;
            let required = raw.required.contains(&property.name);
            fields.push(self.field(&property.name, property.key_span, schema, ty, required));
        }

        // `required` names without a declared property accept any value.
        for name in &raw.required {
            if raw.properties.iter().any(|p| &p.name == name) {
                continue;
            }
            let any = self.any();
            let schema = RawSchema::empty(raw.key.child("required"), raw.span);
            fields.push(self.field(name, raw.span, &schema, any, true));
        }
        Ok(fields)
    }

    fn field(&mut self, name: &str, at: Span, schema: &RawSchema, ty: TypeId, required: bool) -> Field {
        let nullable = matches!(
            self.arena.kind(ty),
            Some(TypeKind::Generic { nullable: true, .. })
        );
        let ty = if required {
            ty
        } else {
            self.arena.wrap(ty, true, false)
        };
        Field {
            name: name.to_string(),
            target_name: String::new(),
            ty: TypeRef::new(ty),
            required,
            nullable,
            default: schema.default.clone(),
            extra_tags: schema.x_extra_tags.clone(),
            location: self.location(at, &schema.key),
            description: schema.description.clone(),
        }
    }

    pub(super) fn array(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        if !raw.prefix_items.is_empty() {
            let mut elements = Vec::new();
            for (i, item) in raw.prefix_items.iter().enumerate() {
                let hint = format!("Item{}", i);
                let element = self.lower(item, site.for_schema(item, &hint))?;
                elements.push(TypeRef::new(element));
            }
            return Ok(self.finish(TypeKind::Tuple { elements }, raw, site));
        }

        let element = match &raw.items {
            Some(items) => self.lower(items, site.for_schema(items, "Item"))?,
            None => self.any(),
        };
        let kind = TypeKind::Array {
            element: TypeRef::new(element),
            min_items: raw.min_items,
            max_items: raw.max_items,
            unique: raw.unique_items,
        };
        Ok(self.finish(kind, raw, site))
    }

    pub(crate) fn any(&mut self) -> TypeId {
        self.arena.add(TypeKind::Any, Origin::Builtin, "Any")
    }
}

fn key_constraints(raw: &RawSchema) -> KeyConstraints {
    let names = raw.property_names.as_deref();
    KeyConstraints {
        min_length: names.and_then(|n| n.min_length),
        max_length: names.and_then(|n| n.max_length),
        pattern: names.and_then(|n| n.pattern.clone()),
        min_properties: raw.min_properties,
        max_properties: raw.max_properties,
    }
}

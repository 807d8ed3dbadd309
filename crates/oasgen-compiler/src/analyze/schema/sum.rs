//! `oneOf`/`anyOf` sums, `type` unions and variant classification.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{Discriminator, JsonType, TypeId, TypeKind, TypeRef, Variant};
use crate::resolve::{RefKey, key_error};
use crate::schema::{RawDiscriminator, RawSchema};

use super::{Analyzer, Site};

/// Unique field sets are searched up to this size.
const MAX_UNIQUE_FIELDS: usize = 3;

/// A lowered variant with the schema it came from.
struct Member<'r> {
    id: TypeId,
    branch: &'r RawSchema,
}

impl<'s> Analyzer<'s> {
    pub(super) fn sum(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        if !raw.one_of.is_empty() && !raw.any_of.is_empty() {
            return Err(Diagnostic::new(DiagnosticKind::UnsupportedKeyword, raw.span)
                .message("anyOf")
                .hint("`oneOf` and `anyOf` cannot be combined on one schema")
                .at_pointer(raw.key.pointer.clone()));
        }
        let branches = if raw.one_of.is_empty() {
            &raw.any_of
        } else {
            &raw.one_of
        };

        let siblings = object_siblings(raw);
        let mut nullable = false;
        let mut combined = Vec::new();
        for branch in branches {
            if branch.is_null_only() {
                nullable = true;
                continue;
            }
            match &siblings {
                Some(siblings) => {
                    let mut merged = RawSchema::empty(branch.key.clone(), branch.span);
                    merged.all_of = vec![siblings.clone(), branch.clone()];
                    combined.push(merged);
                }
                None => combined.push(branch.clone()),
            }
        }
        let wrap = |analyzer: &mut Self, id| {
            if nullable && !raw.is_nullable() {
                analyzer.arena.wrap(id, false, true)
            } else {
                id
            }
        };

        match combined.as_slice() {
            [] => {
                let any = self.finish(TypeKind::Any, raw, site);
                return Ok(self.arena.wrap(any, false, true));
            }
            [single] => {
                let id = self.lower(single, site.clone())?;
                return Ok(wrap(self, id));
            }
            _ => {}
        }

        let mut members = Vec::new();
        for (i, branch) in combined.iter().enumerate() {
            let hint = match (&branch.x_name, variant_reference(branch)) {
                (Some(name), _) => Site::new(oasgen_core::utils::to_pascal_case(name)),
                (None, Some(key)) if siblings.is_some() => site.child(&key.name()),
                (None, _) => site.child(&format!("Sum{}", i)),
            };
            let id = self.lower(branch, hint)?;
            members.push(Member { id, branch });
        }

        let (variants, discriminator) = match &raw.discriminator {
            Some(discriminator) => self.explicit(raw, discriminator, &members)?,
            None => self.classify(raw, &members)?,
        };
        tracing::trace!(
            key = %raw.key,
            variants = variants.len(),
            discriminator = discriminator.name(),
            "sum classified"
        );

        let id = self.finish(
            TypeKind::Sum {
                variants,
                discriminator,
            },
            raw,
            site,
        );
        Ok(wrap(self, id))
    }

    /// `type: [a, b, ...]` without composition: one variant per type.
    pub(super) fn type_union(
        &mut self,
        raw: &RawSchema,
        types: &[JsonType],
        site: &Site,
    ) -> Result<TypeId, Diagnostic> {
        // `number` already admits every integer.
        let types: Vec<JsonType> = types
            .iter()
            .copied()
            .filter(|t| !(*t == JsonType::Integer && types.contains(&JsonType::Number)))
            .collect();
        if let [single] = types.as_slice() {
            return self.lower_body(&narrow(raw, *single, 0), site);
        }

        let mut variants = Vec::new();
        for (i, json_type) in types.iter().enumerate() {
            let narrowed = narrow(raw, *json_type, i);
            let id = self.lower(&narrowed, site.child(json_type.as_str()))?;
            let mut variant = Variant::new(TypeRef::new(id));
            variant.json_type = Some(json_type.wire());
            variants.push(variant);
        }
        let kind = TypeKind::Sum {
            variants,
            discriminator: Discriminator::ByJsonType,
        };
        Ok(self.finish(kind, raw, site))
    }

    fn explicit(
        &self,
        raw: &RawSchema,
        discriminator: &RawDiscriminator,
        members: &[Member<'_>],
    ) -> Result<(Vec<Variant>, Discriminator), Diagnostic> {
        let invalid = |span: Span, detail: String| {
            Diagnostic::new(DiagnosticKind::InvalidDiscriminator, span).message(detail)
        };

        let mut mapping: Vec<(String, RefKey, Span)> = Vec::new();
        for (tag, reference, span) in &discriminator.mapping {
            let base = &raw.key.url;
            let target = if reference.contains('#') || reference.contains('/') {
                RefKey::parse(reference, base)
            } else {
                RefKey::parse(&format!("#/components/schemas/{}", reference), base)
            };
            let key = target.map_err(|e| key_error(reference, *span, e))?;
            mapping.push((tag.clone(), key, *span));
        }

        let mut variants = Vec::new();
        let mut claimed = BTreeSet::new();
        for member in members {
            let Some(key) = variant_reference(member.branch) else {
                return Err(invalid(
                    member.branch.span,
                    "an inline variant cannot be selected by a discriminator".to_string(),
                )
                .hint("move the variant to `components.schemas` and reference it"));
            };
            let mut tags: Vec<String> = mapping
                .iter()
                .filter(|(_, target, _)| *target == key)
                .map(|(tag, _, _)| tag.clone())
                .collect();
            if tags.is_empty() {
                tags.push(key.name());
            }
            for tag in &tags {
                if !claimed.insert(tag.clone()) {
                    return Err(invalid(
                        member.branch.span,
                        format!("tag `{}` selects more than one variant", tag),
                    ));
                }
            }
            let mut variant = Variant::new(TypeRef::new(member.id));
            variant.tags = tags;
            variants.push(variant);
        }

        let variant_keys: Vec<RefKey> = members
            .iter()
            .filter_map(|m| variant_reference(m.branch))
            .collect();
        if let Some((tag, target, span)) = mapping.iter().find(|(_, t, _)| !variant_keys.contains(t)) {
            return Err(invalid(
                *span,
                format!("mapping `{}` targets `{}`, which is not a variant", tag, target),
            ));
        }

        Ok((
            variants,
            Discriminator::Explicit {
                property: discriminator.property.clone(),
            },
        ))
    }

    /// Implicit classification: by JSON type, by unique fields, or both.
    fn classify(
        &self,
        raw: &RawSchema,
        members: &[Member<'_>],
    ) -> Result<(Vec<Variant>, Discriminator), Diagnostic> {
        let wire: Vec<Option<JsonType>> = members.iter().map(|m| self.wire_type(m.id)).collect();

        let distinct: BTreeSet<JsonType> = wire.iter().flatten().copied().collect();
        if wire.iter().all(Option::is_some) && distinct.len() == members.len() {
            let variants = members
                .iter()
                .zip(&wire)
                .map(|(m, t)| {
                    let mut variant = Variant::new(TypeRef::new(m.id));
                    variant.json_type = *t;
                    variant
                })
                .collect();
            return Ok((variants, Discriminator::ByJsonType));
        }

        if wire.iter().all(|t| *t == Some(JsonType::Object))
            && let Some(unique) = self.unique_fields(members)
        {
            let variants = members
                .iter()
                .zip(unique)
                .map(|(m, fields)| {
                    let mut variant = Variant::new(TypeRef::new(m.id));
                    variant.unique_fields = fields;
                    variant
                })
                .collect();
            return Ok((variants, Discriminator::ByUniqueFields));
        }

        if wire.iter().all(Option::is_some) {
            let mut buckets: BTreeMap<JsonType, Vec<usize>> = BTreeMap::new();
            for (i, t) in wire.iter().enumerate() {
                buckets.entry(t.unwrap_or(JsonType::Null)).or_default().push(i);
            }
            let objects = buckets.get(&JsonType::Object).cloned().unwrap_or_default();
            let others_single = buckets
                .iter()
                .all(|(t, indices)| *t == JsonType::Object || indices.len() == 1);
            if buckets.len() > 1 && objects.len() > 1 && others_single {
                let object_members: Vec<&Member<'_>> = objects.iter().map(|i| &members[*i]).collect();
                if let Some(unique) = self.unique_fields_of(&object_members) {
                    let mut unique = unique.into_iter();
                    let variants = members
                        .iter()
                        .zip(&wire)
                        .map(|(m, t)| {
                            let mut variant = Variant::new(TypeRef::new(m.id));
                            variant.json_type = *t;
                            if *t == Some(JsonType::Object) {
                                variant.unique_fields = unique.next().unwrap_or_default();
                            }
                            variant
                        })
                        .collect();
                    return Ok((variants, Discriminator::Mixed));
                }
            }
        }

        let mut diagnostic = Diagnostic::new(DiagnosticKind::AmbiguousSum, raw.span)
            .at_pointer(raw.key.pointer.clone());
        for member in members {
            diagnostic = diagnostic.related_to(member.branch.span, "variant declared here");
        }
        Err(diagnostic)
    }

    fn unique_fields(&self, members: &[Member<'_>]) -> Option<Vec<Vec<String>>> {
        let refs: Vec<&Member<'_>> = members.iter().collect();
        self.unique_fields_of(&refs)
    }

    /// A minimal set of required fields per variant that no other variant
    /// declares in full.
    fn unique_fields_of(&self, members: &[&Member<'_>]) -> Option<Vec<Vec<String>>> {
        let shapes: Vec<Vec<(String, bool)>> = members
            .iter()
            .map(|m| self.object_fields(m.id))
            .collect::<Option<_>>()?;

        let declared: Vec<BTreeSet<&str>> = shapes
            .iter()
            .map(|fields| fields.iter().map(|(name, _)| name.as_str()).collect())
            .collect();

        let mut result = Vec::new();
        for (i, fields) in shapes.iter().enumerate() {
            let required: Vec<&str> = fields
                .iter()
                .filter(|(_, required)| *required)
                .map(|(name, _)| name.as_str())
                .collect();
            let identifies = |set: &[&str]| {
                declared
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .all(|(_, other)| !set.iter().all(|name| other.contains(name)))
            };
            let found = (1..=MAX_UNIQUE_FIELDS.min(required.len()))
                .find_map(|size| combinations(&required, size).into_iter().find(|set| identifies(set.as_slice())))?;
            result.push(found.into_iter().map(String::from).collect());
        }
        Some(result)
    }

    /// Field names and requiredness of an object-shaped type.
    fn object_fields(&self, id: TypeId) -> Option<Vec<(String, bool)>> {
        match self.arena.kind(self.arena.underlying(id))? {
            TypeKind::Struct { fields, .. } => {
                Some(fields.iter().map(|f| (f.name.clone(), f.required)).collect())
            }
            TypeKind::Map { props: Some(props), .. } => self.object_fields(props.id),
            _ => None,
        }
    }

    /// The JSON type a decoder sees for values of `id`, if there is exactly one.
    fn wire_type(&self, id: TypeId) -> Option<JsonType> {
        let json_type = match self.arena.kind(self.arena.underlying(id))? {
            TypeKind::Primitive { kind, .. } => kind.json_type(),
            TypeKind::Enum { base, .. } => base.json_type(),
            TypeKind::Array { .. } | TypeKind::Tuple { .. } => JsonType::Array,
            TypeKind::Map { .. } | TypeKind::Struct { .. } => JsonType::Object,
            TypeKind::Stream => JsonType::String,
            TypeKind::Sum { .. } | TypeKind::Any | TypeKind::Alias { .. } | TypeKind::Generic { .. } => {
                return None;
            }
        };
        Some(json_type.wire())
    }
}

/// Key of the component a variant references.
fn variant_reference(branch: &RawSchema) -> Option<RefKey> {
    if let Some(reference) = &branch.reference {
        return Some(reference.key.clone());
    }
    // A variant merged with sibling keywords keeps its reference as the
    // last `allOf` branch.
    match branch.all_of.as_slice() {
        [_, inner] => inner.reference.as_ref().map(|r| r.key.clone()),
        _ => None,
    }
}

/// Object keywords next to `oneOf`/`anyOf`, applied to every variant.
fn object_siblings(raw: &RawSchema) -> Option<RawSchema> {
    if !raw.has_object_keywords() {
        return None;
    }
    let mut siblings = RawSchema::empty(raw.key.clone(), raw.span);
    siblings.properties = raw.properties.clone();
    siblings.required = raw.required.clone();
    siblings.additional = raw.additional.clone();
    siblings.pattern_properties = raw.pattern_properties.clone();
    siblings.property_names = raw.property_names.clone();
    siblings.min_properties = raw.min_properties;
    siblings.max_properties = raw.max_properties;
    Some(siblings)
}

/// The part of a multi-typed schema that applies to `json_type`.
fn narrow(raw: &RawSchema, json_type: JsonType, index: usize) -> RawSchema {
    let mut narrowed = raw.clone();
    narrowed.key = raw.key.child("type").child(&index.to_string());
    narrowed.types = vec![json_type];
    narrowed.nullable = false;
    narrowed.x_name = None;
    narrowed.discriminator = None;

    if json_type != JsonType::String {
        narrowed.min_length = None;
        narrowed.max_length = None;
        narrowed.pattern = None;
    }
    if !matches!(json_type, JsonType::Integer | JsonType::Number) {
        narrowed.minimum = None;
        narrowed.maximum = None;
        narrowed.multiple_of = None;
    }
    if json_type != JsonType::Object {
        narrowed.properties.clear();
        narrowed.required.clear();
        narrowed.additional = None;
        narrowed.pattern_properties.clear();
        narrowed.property_names = None;
        narrowed.min_properties = None;
        narrowed.max_properties = None;
    }
    if json_type != JsonType::Array {
        narrowed.items = None;
        narrowed.prefix_items.clear();
        narrowed.min_items = None;
        narrowed.max_items = None;
        narrowed.unique_items = false;
    }
    if let Some(format) = &raw.format {
        let numeric = matches!(format.as_str(), "int32" | "int64" | "float" | "double");
        let keep = match json_type {
            JsonType::String => !numeric,
            JsonType::Integer | JsonType::Number => numeric,
            _ => false,
        };
        if !keep {
            narrowed.format = None;
        }
    }
    let admits = |v: &crate::ir::Literal| json_type.admits(v.json_type());
    if let Some(values) = &raw.enum_values {
        let kept: Vec<_> = values.iter().filter(|v| admits(*v)).cloned().collect();
        narrowed.enum_values = (!kept.is_empty()).then_some(kept);
    }
    narrowed.const_value = raw.const_value.clone().filter(admits);
    if narrowed.default.as_ref().is_some_and(|d| !admits(d)) {
        narrowed.default = None;
    }
    narrowed
}

/// Subsets of `items` of the given size, in lexicographic index order.
fn combinations<'a>(items: &[&'a str], size: usize) -> Vec<Vec<&'a str>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    for (i, item) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], size - 1) {
            rest.insert(0, *item);
            result.push(rest);
        }
    }
    result
}

//! `allOf` merging and `not` exclusions.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{Bound, JsonType, Literal, TypeId};
use crate::schema::{Additional, RawSchema, SchemaRef};

use super::{Analyzer, Site};

/// What a `not` keyword removes from its sibling schema.
#[derive(Debug, Default)]
pub(crate) struct Exclusions {
    pub types: Vec<JsonType>,
    pub values: Vec<Literal>,
    span: Option<Span>,
}

impl Exclusions {
    /// Value exclusions only apply to primitives and enums.
    pub fn reject_values(&self) -> Result<(), Diagnostic> {
        match self.span {
            Some(span) if !self.values.is_empty() => Err(Diagnostic::new(DiagnosticKind::UnsupportedNot, span)
                .message("values can only be excluded from primitive schemas")),
            _ => Ok(()),
        }
    }

    pub fn everything_excluded(&self, fallback: Span) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::UnsupportedNot, self.span.unwrap_or(fallback))
            .message("`not` excludes every declared type")
    }
}

impl<'s> Analyzer<'s> {
    /// Parse the final target of a reference, following plain `$ref` chains.
    pub(crate) fn resolve_raw(&self, reference: &SchemaRef) -> Result<RawSchema, Diagnostic> {
        let target = self.resolver.resolve(&reference.raw, reference.span)?;
        self.parser.parse(target.node, target.source, target.key)
    }

    pub(super) fn exclusions(&mut self, raw: &RawSchema) -> Result<Exclusions, Diagnostic> {
        let Some(not) = &raw.not else {
            return Ok(Exclusions::default());
        };
        let not = match &not.reference {
            Some(reference) => self.resolve_raw(reference)?,
            None => (**not).clone(),
        };

        let unsupported = |detail: &str| {
            Diagnostic::new(DiagnosticKind::UnsupportedNot, not.span).message(detail)
        };

        let mut rest = not.clone();
        rest.types.clear();
        rest.nullable = false;
        rest.enum_values = None;
        rest.const_value = None;
        if rest.has_constraints() {
            return Err(unsupported("only `type`, `enum` and `const` can be negated"));
        }

        let mut values: Vec<Literal> = not.enum_values.clone().unwrap_or_default();
        values.extend(not.const_value.clone());
        let types = if values.is_empty() { not.types.clone() } else { Vec::new() };
        if values.is_empty() && types.is_empty() {
            return Err(unsupported("`not` excludes every value"));
        }

        Ok(Exclusions {
            types,
            values,
            span: Some(not.span),
        })
    }

    pub(super) fn all_of(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        if let [branch] = raw.all_of.as_slice()
            && let Some(reference) = &branch.reference
            && !branch.has_constraints()
            && !has_own_shape(raw)
        {
            let target = self.reference(reference)?;
            return Ok(self.alias(target, raw, site));
        }

        let merged = self.merge_all_of(raw)?;
        let base = self.lower_body(&merged, site)?;
        // A nullable branch makes the composition nullable; the schema's own
        // nullability is applied by the caller.
        if merged.is_nullable() && !raw.is_nullable() {
            return Ok(self.arena.wrap(base, false, true));
        }
        Ok(base)
    }

    /// `raw` with every `allOf` branch folded in.
    fn merge_all_of(&mut self, raw: &RawSchema) -> Result<RawSchema, Diagnostic> {
        let mut merged = raw.clone();
        merged.all_of.clear();
        for branch in &raw.all_of {
            let branch = self.flatten(branch)?;
            self.merge(&mut merged, &branch)?;
        }
        Ok(merged)
    }

    /// A branch with references resolved and nested `allOf` merged.
    fn flatten(&mut self, branch: &RawSchema) -> Result<RawSchema, Diagnostic> {
        let Some(reference) = &branch.reference else {
            if branch.all_of.is_empty() {
                return Ok(branch.clone());
            }
            return self.merge_all_of(branch);
        };

        let target = self.resolve_raw(reference)?;
        self.resolver
            .enter(&target.key, target.span.source, reference.span)?;
        let result = self.flatten(&target);
        self.resolver.leave();
        let mut flat = result?;

        if branch.has_constraints() {
            let mut siblings = branch.clone();
            siblings.reference = None;
            let siblings = self.flatten(&siblings)?;
            self.merge(&mut flat, &siblings)?;
        }
        // The referenced name belongs to the branch, not to the composition.
        flat.x_name = None;
        Ok(flat)
    }

    fn merge(&mut self, into: &mut RawSchema, other: &RawSchema) -> Result<(), Diagnostic> {
        let conflict = |detail: String| {
            Diagnostic::new(DiagnosticKind::AllOfConflict, other.span)
                .message(detail)
                .related_to(into.span, "conflicts with this schema")
        };

        into.types = merge_types(&into.types, &other.types).ok_or_else(|| {
            conflict(format!(
                "no type in common between {} and {}",
                type_list(&into.types),
                type_list(&other.types)
            ))
        })?;
        into.nullable |= other.nullable;

        match (&into.format, &other.format) {
            (Some(a), Some(b)) if a != b => {
                return Err(conflict(format!("formats `{}` and `{}` differ", a, b)));
            }
            (None, Some(b)) => into.format = Some(b.clone()),
            _ => {}
        }

        match (&into.enum_values, &other.enum_values) {
            (Some(a), Some(b)) => {
                let common: Vec<Literal> = a.iter().filter(|v| b.contains(v)).cloned().collect();
                if common.is_empty() {
                    return Err(conflict("`enum` lists have no value in common".to_string()));
                }
                into.enum_values = Some(common);
            }
            (None, Some(b)) => into.enum_values = Some(b.clone()),
            _ => {}
        }
        match (&into.const_value, &other.const_value) {
            (Some(a), Some(b)) if a != b => {
                return Err(conflict(format!("`const` values {} and {} differ", a, b)));
            }
            (None, Some(b)) => into.const_value = Some(b.clone()),
            _ => {}
        }

        for property in &other.properties {
            match into.properties.iter().position(|p| p.name == property.name) {
                Some(i) => {
                    let mut existing = into.properties[i].schema.clone();
                    if existing != property.schema {
                        let mut a = self.flatten(&existing)?;
                        let b = self.flatten(&property.schema)?;
                        self.merge(&mut a, &b)?;
                        a.key = into.key.child("properties").child(&property.name);
                        existing = a;
                    }
                    into.properties[i].schema = existing;
                }
                None => into.properties.push(property.clone()),
            }
        }
        for name in &other.required {
            if !into.required.contains(name) {
                into.required.push(name.clone());
            }
        }

        into.additional = match (into.additional.take(), &other.additional) {
            (None, b) => b.clone(),
            (a, None) => a,
            (Some(Additional::Bool(false)), _) | (_, Some(Additional::Bool(false))) => {
                Some(Additional::Bool(false))
            }
            (Some(Additional::Bool(true)), b) => b.clone(),
            (a, Some(Additional::Bool(true))) => a,
            (Some(Additional::Schema(mut a)), Some(Additional::Schema(b))) => {
                let b = self.flatten(b)?;
                let mut flat = self.flatten(&a)?;
                self.merge(&mut flat, &b)?;
                *a = flat;
                Some(Additional::Schema(a))
            }
        };

        for (pattern, schema) in &other.pattern_properties {
            match into.pattern_properties.iter().position(|(p, _)| p == pattern) {
                Some(i) => {
                    let mut a = self.flatten(&into.pattern_properties[i].1)?;
                    let b = self.flatten(schema)?;
                    self.merge(&mut a, &b)?;
                    into.pattern_properties[i].1 = a;
                }
                None => into.pattern_properties.push((pattern.clone(), schema.clone())),
            }
        }
        if into.property_names.is_none() {
            into.property_names = other.property_names.clone();
        }
        into.min_properties = max_opt(into.min_properties, other.min_properties);
        into.max_properties = min_opt(into.max_properties, other.max_properties);

        match (&mut into.items, &other.items) {
            (Some(a), Some(b)) => {
                let mut flat = self.flatten(a)?;
                let b = self.flatten(b)?;
                self.merge(&mut flat, &b)?;
                **a = flat;
            }
            (None, Some(b)) => into.items = Some(b.clone()),
            _ => {}
        }
        if !other.prefix_items.is_empty() {
            if into.prefix_items.is_empty() {
                into.prefix_items = other.prefix_items.clone();
            } else if into.prefix_items.len() != other.prefix_items.len() {
                return Err(conflict("`prefixItems` lengths differ".to_string()));
            } else {
                for (i, b) in other.prefix_items.iter().enumerate() {
                    let mut a = self.flatten(&into.prefix_items[i])?;
                    let b = self.flatten(b)?;
                    self.merge(&mut a, &b)?;
                    into.prefix_items[i] = a;
                }
            }
        }
        into.min_items = max_opt(into.min_items, other.min_items);
        into.max_items = min_opt(into.max_items, other.max_items);
        into.unique_items |= other.unique_items;

        if !other.one_of.is_empty() || !other.any_of.is_empty() {
            if !into.one_of.is_empty() || !into.any_of.is_empty() {
                return Err(conflict(
                    "more than one branch declares `oneOf` or `anyOf`".to_string(),
                ));
            }
            into.one_of = other.one_of.clone();
            into.any_of = other.any_of.clone();
        }
        if into.discriminator.is_none() {
            into.discriminator = other.discriminator.clone();
        }
        match (&into.not, &other.not) {
            (Some(_), Some(_)) => {
                return Err(conflict("more than one branch declares `not`".to_string()));
            }
            (None, Some(b)) => into.not = Some(b.clone()),
            _ => {}
        }

        into.minimum = tighter(into.minimum, other.minimum, true);
        into.maximum = tighter(into.maximum, other.maximum, false);
        into.multiple_of = match (into.multiple_of, other.multiple_of) {
            (Some(a), Some(b)) if a.is_multiple_of(b) => Some(a),
            (Some(a), Some(b)) if b.is_multiple_of(a) => Some(b),
            (Some(a), Some(b)) if a != b => {
                return Err(conflict(format!("`multipleOf` {} and {} are incompatible", a, b)));
            }
            (a, b) => a.or(b),
        };
        into.min_length = max_opt(into.min_length, other.min_length);
        into.max_length = min_opt(into.max_length, other.max_length);
        match (&into.pattern, &other.pattern) {
            (Some(a), Some(b)) if a != b => {
                return Err(conflict(format!("patterns `{}` and `{}` differ", a, b)));
            }
            (None, Some(b)) => into.pattern = Some(b.clone()),
            _ => {}
        }

        for (what, min, max) in [
            ("length", into.min_length, into.max_length),
            ("items", into.min_items, into.max_items),
            ("properties", into.min_properties, into.max_properties),
        ] {
            if let (Some(min), Some(max)) = (min, max)
                && min > max
            {
                return Err(conflict(format!("no {} count satisfies every branch", what)));
            }
        }
        if let (Some(min), Some(max)) = (into.minimum, into.maximum) {
            let (lo, hi) = (min.value.as_f64(), max.value.as_f64());
            if lo > hi || (lo == hi && (min.exclusive || max.exclusive)) {
                return Err(conflict("no number satisfies every branch".to_string()));
            }
        }

        into.read_only |= other.read_only;
        into.write_only |= other.write_only;
        into.deprecated |= other.deprecated;
        if into.description.is_none() {
            into.description = other.description.clone();
        }
        if into.title.is_none() {
            into.title = other.title.clone();
        }
        if into.default.is_none() {
            into.default = other.default.clone();
        }
        if into.x_properties_type.is_none() {
            into.x_properties_type = other.x_properties_type.clone();
        }
        for (tag, value) in &other.x_extra_tags {
            into.x_extra_tags
                .entry(tag.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(())
    }
}

/// Whether an `allOf` schema adds anything beside its branches.
fn has_own_shape(raw: &RawSchema) -> bool {
    let mut rest = raw.clone();
    rest.all_of.clear();
    rest.nullable = false;
    rest.types.retain(|t| *t != JsonType::Null);
    rest.has_constraints()
}

/// Intersection of declared types; `None` when nothing is left.
fn merge_types(a: &[JsonType], b: &[JsonType]) -> Option<Vec<JsonType>> {
    if a.is_empty() {
        return Some(b.to_vec());
    }
    if b.is_empty() {
        return Some(a.to_vec());
    }
    let nullable = a.contains(&JsonType::Null) || b.contains(&JsonType::Null);
    let mut out = Vec::new();
    for &t in a.iter().filter(|t| **t != JsonType::Null) {
        let common = if b.contains(&t) {
            Some(t)
        } else if (t == JsonType::Number && b.contains(&JsonType::Integer))
            || (t == JsonType::Integer && b.contains(&JsonType::Number))
        {
            Some(JsonType::Integer)
        } else {
            None
        };
        if let Some(common) = common
            && !out.contains(&common)
        {
            out.push(common);
        }
    }
    if out.is_empty() {
        return None;
    }
    if nullable {
        out.push(JsonType::Null);
    }
    Some(out)
}

fn type_list(types: &[JsonType]) -> String {
    let names: Vec<String> = types.iter().map(|t| format!("`{}`", t)).collect();
    names.join("|")
}

fn max_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// The stricter of two bounds: the larger minimum or the smaller maximum.
/// On equal values an exclusive bound wins.
fn tighter(a: Option<Bound>, b: Option<Bound>, lower: bool) -> Option<Bound> {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (a, b) => return a.or(b),
    };
    let (x, y) = (a.value.as_f64(), b.value.as_f64());
    if x == y {
        return Some(Bound {
            value: a.value,
            exclusive: a.exclusive || b.exclusive,
        });
    }
    let a_wins = if lower { x > y } else { x < y };
    Some(if a_wins { a } else { b })
}

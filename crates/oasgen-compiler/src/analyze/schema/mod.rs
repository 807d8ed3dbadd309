//! Schema lowering: `RawSchema` to arena types.
//!
//! Every `$ref` target gets a nominal slot reserved before its body is
//! lowered, so a recursive reference finds the slot and links to it.
//! Inline schemas are cached by their own key; structural kinds are
//! interned by the arena.

mod compose;
mod object;
mod primitive;
mod sum;

use oasgen_core::utils::to_pascal_case;

use crate::diagnostics::{Diagnostic, Span};
use crate::ir::{JsonType, Origin, TypeId, TypeKind, TypeRef};
use crate::schema::{RawSchema, SchemaRef};

use super::Analyzer;
use super::cursor::Cursor;

/// Naming context for the type a schema lowers to.
#[derive(Debug, Clone)]
pub(crate) struct Site {
    /// Preferred name, PascalCase.
    pub hint: String,
    /// Reserved nominal slot the result must land in.
    pub slot: Option<TypeId>,
}

impl Site {
    pub fn new(hint: impl Into<String>) -> Self {
        Self {
            hint: hint.into(),
            slot: None,
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        Self::new(format!("{}{}", self.hint, to_pascal_case(suffix)))
    }

    /// Preferred name of an inline schema, honoring `x-ogen-name`.
    fn for_schema(&self, raw: &RawSchema, suffix: &str) -> Self {
        match &raw.x_name {
            Some(name) => Self::new(to_pascal_case(name)),
            None => self.child(suffix),
        }
    }
}

impl<'s> Analyzer<'s> {
    /// Lower an inline schema found at `hint`'s position.
    pub(crate) fn schema(&mut self, raw: &RawSchema, hint: &str) -> Result<TypeId, Diagnostic> {
        let site = match &raw.x_name {
            Some(name) => Site::new(to_pascal_case(name)),
            None => Site::new(hint),
        };
        self.lower(raw, site)
    }

    /// Parse and lower the schema node under `cursor`.
    pub(crate) fn schema_at(&mut self, cursor: &Cursor<'s>, hint: &str) -> Result<TypeId, Diagnostic> {
        let raw = self.parser.parse(cursor.node, cursor.source, cursor.key.clone())?;
        self.schema(&raw, hint)
    }

    /// Lower a declared component schema.
    pub(crate) fn component(&mut self, cursor: &Cursor<'s>, via: Span) -> Result<TypeId, Diagnostic> {
        if let Some(id) = self.arena.by_key(&cursor.key) {
            return Ok(id);
        }
        self.declare(cursor, via)
    }

    /// Type of a `$ref` target.
    pub(crate) fn reference(&mut self, reference: &SchemaRef) -> Result<TypeId, Diagnostic> {
        if let Some(id) = self.arena.by_key(&reference.key) {
            return Ok(id);
        }
        // Rejects chains of plain references that loop.
        self.resolver.resolve(&reference.raw, reference.span)?;
        let target = self.resolver.lookup(&reference.key, reference.span)?;
        let cursor = Cursor::new(target.node, target.source, target.key);
        self.declare(&cursor, reference.span)
    }

    /// Reserve the nominal slot of a referenced schema and lower its body
    /// into it.
    fn declare(&mut self, cursor: &Cursor<'s>, via: Span) -> Result<TypeId, Diagnostic> {
        let key = cursor.key.clone();
        let raw = self.parser.parse(cursor.node, cursor.source, key.clone())?;
        let hint = match &raw.x_name {
            Some(name) => to_pascal_case(name),
            None => to_pascal_case(&key.name()),
        };

        let slot = self.arena.reserve(Origin::Component(key.clone()), hint.clone());
        self.arena.bind(key.clone(), slot);
        self.components.insert(key.clone(), slot);
        tracing::trace!(key = %key, "declared");

        self.resolver.enter(&key, cursor.source, via)?;
        let result = self.lower(
            &raw,
            Site {
                hint,
                slot: Some(slot),
            },
        );
        self.resolver.leave();

        let id = result?;
        if id != slot {
            self.arena.bind(key, id);
        }
        Ok(id)
    }

    pub(crate) fn lower(&mut self, raw: &RawSchema, site: Site) -> Result<TypeId, Diagnostic> {
        if site.slot.is_none()
            && let Some(id) = self.arena.by_key(&raw.key)
        {
            return Ok(id);
        }
        let id = self.lower_uncached(raw, &site)?;
        if site.slot.is_none() {
            self.arena.bind(raw.key.clone(), id);
        }
        Ok(id)
    }

    fn lower_uncached(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        if raw.boolean == Some(true) {
            return Ok(self.finish(TypeKind::Any, raw, site));
        }

        if let Some(reference) = &raw.reference {
            if raw.has_constraints() {
                return self.lower_uncached(&ref_as_all_of(raw, reference), site);
            }
            let target = self.reference(reference)?;
            return Ok(self.alias(target, raw, site));
        }

        if raw.is_null_only() {
            let any = self.finish(TypeKind::Any, raw, site);
            return Ok(self.arena.wrap(any, false, true));
        }

        let base = self.lower_body(raw, site)?;
        if raw.is_nullable() {
            return Ok(self.arena.wrap(base, false, true));
        }
        Ok(base)
    }

    /// Lower the non-null part of `raw`.
    fn lower_body(&mut self, raw: &RawSchema, site: &Site) -> Result<TypeId, Diagnostic> {
        if !raw.all_of.is_empty() {
            return self.all_of(raw, site);
        }
        if !raw.one_of.is_empty() || !raw.any_of.is_empty() {
            return self.sum(raw, site);
        }

        let exclusions = self.exclusions(raw)?;
        let mut types = raw.non_null_types();
        types.retain(|t| !exclusions.types.contains(t));
        if types.is_empty() && !raw.non_null_types().is_empty() {
            return Err(exclusions.everything_excluded(raw.span));
        }

        if raw.enum_values.is_some() || raw.const_value.is_some() {
            if types.is_empty() && self.config.infer_types {
                types.extend(self.infer(raw));
            }
            if let [single] = types.as_slice() {
                return self.enumeration(raw, *single, &exclusions.values, site);
            }
        }

        if types.is_empty() {
            if raw.has_object_keywords() {
                types.push(JsonType::Object);
            } else if raw.has_array_keywords() {
                types.push(JsonType::Array);
            } else if self.config.infer_types
                && let Some(inferred) = self.infer(raw)
            {
                types.push(inferred);
            } else if !exclusions.types.is_empty() {
                types = JsonType::ALL
                    .into_iter()
                    .filter(|t| *t != JsonType::Null && !exclusions.types.contains(t))
                    .collect();
            }
        }

        match types.as_slice() {
            [] => {
                exclusions.reject_values()?;
                Ok(self.finish(TypeKind::Any, raw, site))
            }
            [JsonType::Object] => {
                exclusions.reject_values()?;
                self.object(raw, site)
            }
            [JsonType::Array] => {
                exclusions.reject_values()?;
                self.array(raw, site)
            }
            [single] => self.primitive(raw, *single, &exclusions.values, site),
            many => {
                let many = many.to_vec();
                self.type_union(raw, &many, site)
            }
        }
    }

    /// Type implied by `format`, `default` and constraint keywords.
    fn infer(&self, raw: &RawSchema) -> Option<JsonType> {
        if let Some(format) = &raw.format {
            return Some(match format.as_str() {
                "int32" | "int64" => JsonType::Integer,
                "float" | "double" => JsonType::Number,
                _ => JsonType::String,
            });
        }
        let values = raw.enum_values.iter().flatten().chain(raw.const_value.as_ref());
        let mut seen = values.map(|v| v.json_type()).filter(|t| *t != JsonType::Null);
        if let Some(first) = seen.next() {
            return Some(seen.fold(first, |acc, t| match (acc, t) {
                (JsonType::Integer, JsonType::Number) | (JsonType::Number, JsonType::Integer) => {
                    JsonType::Number
                }
                (acc, _) => acc,
            }));
        }
        if raw.has_string_keywords() {
            return Some(JsonType::String);
        }
        if raw.has_numeric_keywords() {
            return Some(JsonType::Number);
        }
        raw.default.as_ref().map(|d| d.json_type()).filter(|t| *t != JsonType::Null)
    }

    /// Place a finished kind: into the reserved slot, or as a new type.
    /// A structural kind in a slot makes the slot an alias.
    fn finish(&mut self, kind: TypeKind, raw: &RawSchema, site: &Site) -> TypeId {
        if kind.is_structural() {
            let id = self
                .arena
                .add(kind, Origin::Inline(raw.key.clone()), site.hint.clone());
            return self.alias(id, raw, site);
        }
        let id = match site.slot {
            Some(slot) => slot,
            None => self
                .arena
                .reserve(Origin::Inline(raw.key.clone()), site.hint.clone()),
        };
        self.arena.fill(id, kind);
        self.describe(id, raw);
        id
    }

    fn alias(&mut self, target: TypeId, raw: &RawSchema, site: &Site) -> TypeId {
        let Some(slot) = site.slot else {
            return target;
        };
        self.arena.fill(
            slot,
            TypeKind::Alias {
                target: TypeRef::new(target),
            },
        );
        self.describe(slot, raw);
        slot
    }

    fn describe(&mut self, id: TypeId, raw: &RawSchema) {
        let location = self.location(raw.span, &raw.key);
        let description = raw.description.clone().or_else(|| raw.title.clone());
        self.arena.describe(id, raw.span, location, description);
    }
}

/// 3.1 `$ref` with sibling keywords: the reference is one more `allOf`
/// branch.
fn ref_as_all_of(raw: &RawSchema, reference: &SchemaRef) -> RawSchema {
    let mut branch = RawSchema::empty(reference.key.clone(), reference.span);
    branch.reference = Some(reference.clone());

    let mut merged = raw.clone();
    merged.reference = None;
    merged.all_of.insert(0, branch);
    merged
}

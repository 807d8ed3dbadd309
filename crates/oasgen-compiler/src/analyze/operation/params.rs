//! Operation parameters and response headers.

use oasgen_core::utils::to_pascal_case;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{
    MediaRange, Parameter, ParameterContent, ParameterIn, ParameterStyle, TypeId, TypeKind, TypeRef,
};

use super::super::Analyzer;
use super::super::cursor::Cursor;
use super::PathItem;

/// Header parameters owned by the transport layer.
const IGNORED_HEADERS: [&str; 3] = ["Accept", "Content-Type", "Authorization"];

const MAX_SHAPE_DEPTH: usize = 4;

/// A parameter declaration before analysis, after `$ref` resolution.
struct Declared<'s> {
    name: &'s str,
    in_: ParameterIn,
    cursor: Cursor<'s>,
    /// Span of the declaration at its use site.
    span: Span,
}

/// How a parameter value can be serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Array,
    Object,
    Nested,
    Binary,
}

impl<'s> Analyzer<'s> {
    /// Path-level and operation-level parameters. An operation-level
    /// declaration replaces a path-level one with the same name and location.
    pub(super) fn parameters(
        &mut self,
        item: &PathItem<'s>,
        op: &Cursor<'s>,
        op_name: &str,
    ) -> Result<Vec<Parameter>, Diagnostic> {
        let mut declared = Vec::new();
        if let Some(list) = item.cursor.get("parameters") {
            self.declare_params(&list, &mut declared)?;
        }
        if let Some(list) = op.get("parameters") {
            self.declare_params(&list, &mut declared)?;
        }

        if let Some(template) = &item.template {
            for name in template.params() {
                let found = declared
                    .iter()
                    .any(|d| d.in_ == ParameterIn::Path && d.name == name);
                if !found {
                    return Err(Diagnostic::new(DiagnosticKind::PathParameterMissing, op.span())
                        .message(name)
                        .at_pointer(op.key.pointer.clone())
                        .hint(format!(
                            "declare `{}` with `in: path` and `required: true`",
                            name
                        )));
                }
            }
        }

        let hint = format!("{}Params", op_name);
        let mut params = Vec::with_capacity(declared.len());
        for d in &declared {
            if d.in_ == ParameterIn::Path
                && !item.template.as_ref().is_some_and(|t| t.has_param(d.name))
            {
                return Err(Diagnostic::new(DiagnosticKind::UnknownPathParameter, d.span)
                    .message(d.name)
                    .at_pointer(d.cursor.key.pointer.clone()));
            }
            if d.in_ == ParameterIn::Header
                && IGNORED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(d.name))
            {
                tracing::debug!(operation = op_name, header = d.name, "header parameter ignored");
                continue;
            }
            params.push(self.parameter(&d.cursor, d.name, d.in_, &hint)?);
        }
        Ok(params)
    }

    fn declare_params(
        &self,
        list: &Cursor<'s>,
        declared: &mut Vec<Declared<'s>>,
    ) -> Result<(), Diagnostic> {
        list.array("`parameters`")?;
        let mut seen: Vec<(&str, ParameterIn)> = Vec::new();
        for entry in list.items() {
            let cursor = self.follow(&entry)?;
            cursor.object("parameter")?;
            let name = cursor.required_str("name", "parameter")?;
            let raw_in = cursor.required_str("in", "parameter")?;
            let Some(in_) = ParameterIn::parse(raw_in) else {
                return Err(cursor.invalid(&format!("unknown parameter location `{}`", raw_in)));
            };
            if seen.contains(&(name, in_)) {
                return Err(entry.invalid(&format!(
                    "parameter `{}` in {} is declared twice",
                    name,
                    in_.as_str()
                )));
            }
            seen.push((name, in_));

            let param = Declared {
                name,
                in_,
                span: entry.span(),
                cursor,
            };
            match declared.iter_mut().find(|d| d.name == name && d.in_ == in_) {
                Some(existing) => *existing = param,
                None => declared.push(param),
            }
        }
        Ok(())
    }

    /// One parameter or header object. `name` and `in_` come from the
    /// declaration, or from the header map for response headers.
    pub(super) fn parameter(
        &mut self,
        cursor: &Cursor<'s>,
        name: &str,
        in_: ParameterIn,
        hint_prefix: &str,
    ) -> Result<Parameter, Diagnostic> {
        let required = cursor.bool_field("required")?.unwrap_or(false);
        if in_ == ParameterIn::Path && !required {
            return Err(cursor
                .invalid(&format!("path parameter `{}` must be required", name))
                .hint("add `required: true`"));
        }

        let style = match cursor.str_field("style")? {
            Some(raw) => match ParameterStyle::parse(raw) {
                Some(style) => style,
                None => return Err(unsupported(cursor, &format!("unknown style `{}`", raw))),
            },
            None => in_.default_style(),
        };
        if !in_.allows(style) {
            return Err(unsupported(
                cursor,
                &format!("style `{}` is not allowed in {}", style.as_str(), in_.as_str()),
            ));
        }
        let explode = cursor
            .bool_field("explode")?
            .unwrap_or(style == ParameterStyle::Form);

        let hint = format!("{}{}", hint_prefix, to_pascal_case(name));
        let content = match (cursor.get("schema"), cursor.get("content")) {
            (Some(schema), None) => {
                let ty = self.schema_at(&schema, &hint)?;
                if let Err(detail) = self.check_serializable(ty, style, explode) {
                    return Err(unsupported(cursor, &format!("`{}`: {}", name, detail)));
                }
                ParameterContent::Schema(TypeRef::new(ty))
            }
            (None, Some(content)) => {
                let entries = content.members();
                let [(raw_media, key_span, entry)] = entries.as_slice() else {
                    return Err(unsupported(&content, "`content` must have exactly one entry"));
                };
                let media = MediaRange::parse(raw_media).map_err(|e| {
                    Diagnostic::new(DiagnosticKind::InvalidStructure, *key_span)
                        .message(e.to_string())
                        .at_pointer(entry.key.pointer.clone())
                })?;
                let ty = match entry.get("schema") {
                    Some(schema) => self.schema_at(&schema, &hint)?,
                    None => self.any(),
                };
                ParameterContent::Content {
                    media,
                    ty: TypeRef::new(ty),
                }
            }
            (Some(_), Some(_)) => {
                return Err(cursor.invalid(&format!(
                    "parameter `{}` declares both `schema` and `content`",
                    name
                )));
            }
            (None, None) => {
                return Err(cursor.invalid(&format!(
                    "parameter `{}` needs `schema` or `content`",
                    name
                )));
            }
        };

        Ok(Parameter {
            name: name.to_string(),
            target_name: cursor
                .str_field("x-ogen-name")?
                .map(String::from)
                .unwrap_or_default(),
            in_,
            required,
            style,
            explode,
            allow_reserved: cursor.bool_field("allowReserved")?.unwrap_or(false),
            deprecated: cursor.bool_field("deprecated")?.unwrap_or(false),
            content,
            description: cursor.str_field("description")?.map(String::from),
            location: self.location(cursor.span(), &cursor.key),
        })
    }

    fn check_serializable(
        &self,
        ty: TypeId,
        style: ParameterStyle,
        explode: bool,
    ) -> Result<(), String> {
        let shape = self.param_shape(ty, MAX_SHAPE_DEPTH);
        match style {
            ParameterStyle::DeepObject if shape != Shape::Object => {
                return Err("`deepObject` requires an object schema".to_string());
            }
            ParameterStyle::DeepObject if !explode => {
                return Err("`deepObject` requires `explode: true`".to_string());
            }
            ParameterStyle::SpaceDelimited | ParameterStyle::PipeDelimited
                if !matches!(shape, Shape::Array | Shape::Object) =>
            {
                return Err(format!(
                    "`{}` requires an array or object schema",
                    style.as_str()
                ));
            }
            _ => {}
        }
        match shape {
            Shape::Nested => Err("nested objects and arrays cannot be serialized".to_string()),
            Shape::Binary => Err("binary values cannot be serialized".to_string()),
            Shape::Scalar | Shape::Array | Shape::Object => Ok(()),
        }
    }

    /// Recursive types are `Nested` once `depth` runs out.
    fn param_shape(&self, ty: TypeId, depth: usize) -> Shape {
        if depth == 0 {
            return Shape::Nested;
        }
        let shape_of = |id: TypeId| self.param_shape(id, depth - 1);
        let Some(kind) = self.arena.kind(self.arena.underlying(ty)) else {
            return Shape::Nested;
        };
        match kind {
            TypeKind::Primitive { .. } | TypeKind::Enum { .. } | TypeKind::Any => Shape::Scalar,
            TypeKind::Stream => Shape::Binary,
            TypeKind::Array { element, .. } if shape_of(element.id) == Shape::Scalar => Shape::Array,
            TypeKind::Struct { fields, .. } => {
                let flat = fields
                    .iter()
                    .all(|f| matches!(shape_of(f.ty.id), Shape::Scalar | Shape::Array));
                if flat { Shape::Object } else { Shape::Nested }
            }
            TypeKind::Map {
                props: None,
                value,
                patterns,
                ..
            } => {
                let flat = value
                    .iter()
                    .chain(patterns.iter().map(|p| &p.value))
                    .all(|v| shape_of(v.id) == Shape::Scalar);
                if flat { Shape::Object } else { Shape::Nested }
            }
            TypeKind::Sum { variants, .. }
                if variants.iter().all(|v| shape_of(v.ty.id) == Shape::Scalar) =>
            {
                Shape::Scalar
            }
            _ => Shape::Nested,
        }
    }
}

fn unsupported(at: &Cursor<'_>, detail: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::UnsupportedParameter, at.span())
        .message(detail)
        .at_pointer(at.key.pointer.clone())
}

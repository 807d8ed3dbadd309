//! Primitives, formats and enumerations.

use std::collections::HashSet;

use oasgen_core::utils::to_pascal_case;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{EnumValue, Format, JsonType, Literal, PrimitiveKind, TypeId, TypeKind, Validation};
use crate::schema::RawSchema;

use super::{Analyzer, Site};

impl<'s> Analyzer<'s> {
    pub(super) fn primitive(
        &mut self,
        raw: &RawSchema,
        json_type: JsonType,
        excluded: &[Literal],
        site: &Site,
    ) -> Result<TypeId, Diagnostic> {
        if json_type == JsonType::String && raw.format.as_deref() == Some("binary") {
            return Ok(self.finish(TypeKind::Stream, raw, site));
        }
        let (kind, format) = self.primitive_kind(raw, json_type)?;

        let validation = Validation {
            min_length: raw.min_length,
            max_length: raw.max_length,
            pattern: raw.pattern.clone(),
            minimum: raw.minimum,
            maximum: raw.maximum,
            multiple_of: raw.multiple_of,
            excluded: excluded
                .iter()
                .filter(|v| json_type.admits(v.json_type()))
                .cloned()
                .collect(),
        };

        // Plain primitives are named by kind; validated ones keep the hint.
        let site = if validation.is_empty() {
            Site {
                hint: String::new(),
                slot: site.slot,
            }
        } else {
            site.clone()
        };
        let kind = TypeKind::Primitive {
            kind,
            format,
            validation,
        };
        Ok(self.finish(kind, raw, &site))
    }

    pub(super) fn enumeration(
        &mut self,
        raw: &RawSchema,
        json_type: JsonType,
        excluded: &[Literal],
        site: &Site,
    ) -> Result<TypeId, Diagnostic> {
        let at = raw.key.child("enum");
        if matches!(json_type, JsonType::Object | JsonType::Array) {
            return Err(Diagnostic::new(DiagnosticKind::UnsupportedKeyword, raw.span)
                .message("enum")
                .hint(format!("enumerations of {} values are not supported", json_type))
                .at_pointer(at.pointer));
        }
        let (base, _) = self.primitive_kind(raw, json_type)?;

        let declared = raw.enum_values.iter().flatten().chain(raw.const_value.as_ref());
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let mut has_null = false;
        for value in declared {
            if value.is_null() {
                has_null = true;
                continue;
            }
            if !seen.insert(value.clone()) {
                return Err(Diagnostic::new(DiagnosticKind::InvalidEnumValue, raw.span)
                    .message(format!("duplicate enum value {}", value))
                    .at_pointer(at.pointer));
            }
            if !json_type.admits(value.json_type()) {
                return Err(Diagnostic::new(DiagnosticKind::InvalidEnumValue, raw.span)
                    .message(format!("{} is not of type `{}`", value, json_type))
                    .at_pointer(at.pointer));
            }
            if excluded.contains(value) {
                continue;
            }
            values.push(EnumValue {
                name: to_pascal_case(&value.ident_text()),
                value: value.clone(),
            });
        }

        if values.is_empty() {
            return Err(Diagnostic::new(DiagnosticKind::InvalidEnumValue, raw.span)
                .message("no enum value is left")
                .at_pointer(at.pointer));
        }

        let id = self.finish(TypeKind::Enum { base, values }, raw, site);
        if has_null && !raw.is_nullable() {
            return Ok(self.arena.wrap(id, false, true));
        }
        Ok(id)
    }

    fn primitive_kind(
        &mut self,
        raw: &RawSchema,
        json_type: JsonType,
    ) -> Result<(PrimitiveKind, Option<Format>), Diagnostic> {
        let format = raw.format.as_deref();
        let custom = |f: &str| Format::Custom(f.to_string());
        let kind = match json_type {
            JsonType::String => match format {
                None => (PrimitiveKind::String, None),
                Some("byte" | "base64") => (PrimitiveKind::Bytes, None),
                Some(f) => match Format::parse(f) {
                    Some(known) => (PrimitiveKind::String, Some(known)),
                    None if self.config.is_custom_format("string", f) => {
                        (PrimitiveKind::String, Some(custom(f)))
                    }
                    None => {
                        tracing::debug!(format = f, key = %raw.key, "unknown string format");
                        self.warnings.push(
                            Diagnostic::new(DiagnosticKind::UnknownFormat, raw.span)
                                .message(f)
                                .at_pointer(raw.key.child("format").pointer),
                        );
                        (PrimitiveKind::String, None)
                    }
                },
            },
            JsonType::Integer => match format {
                None if exceeds_i32(raw) => (PrimitiveKind::Int64, None),
                None => (PrimitiveKind::Int32, None),
                Some(f @ ("int32" | "int8" | "int16" | "uint8" | "uint16")) => {
                    check_range(raw, f)?;
                    (PrimitiveKind::Int32, None)
                }
                Some("int64" | "uint32" | "uint64" | "uint") => (PrimitiveKind::Int64, None),
                Some(f) if self.config.is_custom_format("integer", f) => {
                    (PrimitiveKind::Int64, Some(custom(f)))
                }
                Some(f) => return Err(unsupported_format(raw, f, json_type)),
            },
            JsonType::Number => match format {
                Some("float") => (PrimitiveKind::Float32, None),
                None | Some("double") => (PrimitiveKind::Float64, None),
                Some("int32") => (PrimitiveKind::Int32, None),
                Some("int64") => (PrimitiveKind::Int64, None),
                Some(f) if self.config.is_custom_format("number", f) => {
                    (PrimitiveKind::Float64, Some(custom(f)))
                }
                Some(f) => return Err(unsupported_format(raw, f, json_type)),
            },
            JsonType::Boolean => match format {
                Some(f) if self.config.is_custom_format("boolean", f) => {
                    (PrimitiveKind::Bool, Some(custom(f)))
                }
                _ => (PrimitiveKind::Bool, None),
            },
            JsonType::Null | JsonType::Array | JsonType::Object => {
                return Err(Diagnostic::new(DiagnosticKind::Internal, raw.span)
                    .message(format!("`{}` is not a primitive type", json_type)));
            }
        };
        Ok(kind)
    }
}

/// Whether the declared bounds need more than 32 bits.
fn exceeds_i32(raw: &RawSchema) -> bool {
    let outside = |v: f64| v < i32::MIN as f64 || v > i32::MAX as f64;
    raw.minimum.is_some_and(|b| outside(b.value.as_f64()))
        || raw.maximum.is_some_and(|b| outside(b.value.as_f64()))
}

/// Bounds of a narrow integer format must fit the format.
fn check_range(raw: &RawSchema, format: &str) -> Result<(), Diagnostic> {
    let (lo, hi) = match format {
        "int8" => (i8::MIN as f64, i8::MAX as f64),
        "int16" => (i16::MIN as f64, i16::MAX as f64),
        "uint8" => (0.0, u8::MAX as f64),
        "uint16" => (0.0, u16::MAX as f64),
        _ => (i32::MIN as f64, i32::MAX as f64),
    };
    let checks = [
        ("minimum", raw.minimum, lo - 1.0, hi),
        ("maximum", raw.maximum, lo, hi + 1.0),
    ];
    for (keyword, bound, exclusive_lo, exclusive_hi) in checks {
        let Some(bound) = bound else {
            continue;
        };
        let v = bound.value.as_f64();
        let fits = if bound.exclusive {
            v >= exclusive_lo && v <= exclusive_hi
        } else {
            v >= lo && v <= hi
        };
        if !fits {
            return Err(Diagnostic::new(DiagnosticKind::ConstraintMismatch, raw.span)
                .message(format!(
                    "`{}` {} is outside the range of `{}`",
                    keyword, bound.value, format
                ))
                .at_pointer(raw.key.child(keyword).pointer));
        }
    }
    Ok(())
}

fn unsupported_format(raw: &RawSchema, format: &str, json_type: JsonType) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::UnsupportedFormat, raw.span)
        .message(format)
        .hint(format!(
            "register `{}` as a custom format for `{}` to accept it",
            format, json_type
        ))
        .at_pointer(raw.key.child("format").pointer)
}

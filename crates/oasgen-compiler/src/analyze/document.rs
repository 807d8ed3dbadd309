//! Version detection and the top-level object grammar.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::document::Document;
use crate::ir::SpecVersion;

use super::cursor::Cursor;
use super::{Analyzer, Stop};

const COMPONENT_SECTIONS: &[&str] = &[
    "schemas",
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "securitySchemes",
    "links",
    "callbacks",
    "pathItems",
];

/// The `openapi` version of a root document; only 3.0 and 3.1 are accepted.
pub(super) fn spec_version(document: &Document) -> Result<SpecVersion, Diagnostic> {
    let root = &document.root;
    let whole = Span::document(document.id);

    let Some(object) = root.as_object() else {
        return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, whole).message(format!(
            "document root must be an object, found {}",
            root.type_name()
        )));
    };

    if let Some(member) = object.member("swagger") {
        let version = member.value.as_str().unwrap_or("2.0");
        return Err(Diagnostic::new(
            DiagnosticKind::UnsupportedVersion,
            Span::new(document.id, member.value.range),
        )
        .message(version)
        .hint("convert the document to OpenAPI 3"));
    }

    let Some(member) = object.member("openapi") else {
        return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, whole)
            .message("missing `openapi` version field"));
    };
    let span = Span::new(document.id, member.value.range);
    let Some(text) = member.value.as_str() else {
        return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, span)
            .message("`openapi` must be a string"));
    };

    match SpecVersion::parse(text) {
        Some(version) if version.major == 3 && version.minor <= 1 => Ok(version),
        _ => Err(Diagnostic::new(DiagnosticKind::UnsupportedVersion, span).message(text)),
    }
}

impl<'s> Analyzer<'s> {
    pub(super) fn check_structure(&self, root: &Cursor<'s>) -> Result<(), Stop> {
        let Some(info) = root.get("info") else {
            return Err(root.invalid("missing `info` object").into());
        };
        info.object("`info`")?;
        info.required_str("title", "`info`")?;
        info.required_str("version", "`info`")?;

        let paths = root.get("paths");
        let components = root.get("components");
        let webhooks = root.get("webhooks");

        if self.version.is_31() {
            if paths.is_none() && components.is_none() && webhooks.is_none() {
                return Err(root
                    .invalid("one of `paths`, `components` or `webhooks` is required")
                    .into());
            }
        } else if paths.is_none() {
            return Err(root.invalid("missing `paths` object").into());
        }

        if let Some(paths) = &paths {
            paths.object("`paths`")?;
        }
        if let Some(webhooks) = &webhooks {
            if !self.version.is_31() {
                return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, root.key_span("webhooks"))
                    .message("`webhooks` requires OpenAPI 3.1")
                    .into());
            }
            webhooks.object("`webhooks`")?;
        }
        if let Some(components) = &components {
            components.object("`components`")?;
            for section in COMPONENT_SECTIONS {
                if let Some(entries) = components.get(section) {
                    entries.object(&format!("`components.{}`", section))?;
                }
            }
        }
        if let Some(security) = root.get("security") {
            security.array("`security`")?;
        }

        tracing::debug!(version = %self.version, "document structure checked");
        Ok(())
    }
}

//! Request bodies, responses and their content maps.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use oasgen_core::utils::to_pascal_case;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{
    BodyShape, Content, ContentKind, Discriminator, Encoding, MediaRange, Origin, ParameterIn,
    ParameterStyle, RequestBody, Response, StatusPattern, TypeId, TypeKind, TypeRef, Variant,
};

use super::super::Analyzer;
use super::super::cursor::Cursor;

impl<'s> Analyzer<'s> {
    pub(super) fn request_body(
        &mut self,
        body: &Cursor<'s>,
        op_name: &str,
    ) -> Result<RequestBody, Diagnostic> {
        let body = self.follow(body)?;
        body.object("request body")?;
        let Some(content) = body.get("content") else {
            return Err(body.invalid("request body requires `content`"));
        };

        let hint = format!("{}Req", op_name);
        let contents = self.contents(&content, &hint)?;
        if contents.is_empty() {
            return Err(content.invalid("request body `content` must not be empty"));
        }
        let shape = self.body_shape(&contents, &content, &hint);

        Ok(RequestBody {
            required: body.bool_field("required")?.unwrap_or(false),
            contents,
            shape,
            description: body.str_field("description")?.map(String::from),
        })
    }

    /// Responses keyed by status pattern. `x-` keys are skipped.
    pub(super) fn responses(
        &mut self,
        op: &Cursor<'s>,
        op_name: &str,
    ) -> Result<BTreeMap<StatusPattern, Response>, Diagnostic> {
        let mut responses = BTreeMap::new();
        let Some(map) = op.get("responses") else {
            return Ok(responses);
        };
        map.object("`responses`")?;

        let mut first_seen: HashMap<StatusPattern, Span> = HashMap::new();
        for (code, key_span, entry) in map.members() {
            if code.starts_with("x-") {
                continue;
            }
            let Some(status) = StatusPattern::parse(code) else {
                return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, key_span)
                    .message(format!("invalid response status `{}`", code))
                    .at_pointer(entry.key.pointer.clone())
                    .hint("use a code like `200`, a class like `2XX`, or `default`"));
            };
            if let Some(first) = first_seen.get(&status) {
                return Err(Diagnostic::new(DiagnosticKind::InvalidStructure, key_span)
                    .message(format!("response status `{}` is declared twice", status))
                    .related_to(*first, "first declared here")
                    .at_pointer(entry.key.pointer.clone()));
            }
            first_seen.insert(status, key_span);

            let hint = format!("{}{}", op_name, status.word());
            let response = self.response(&entry, status, &hint)?;
            responses.insert(status, response);
        }
        Ok(responses)
    }

    fn response(
        &mut self,
        entry: &Cursor<'s>,
        status: StatusPattern,
        hint: &str,
    ) -> Result<Response, Diagnostic> {
        let entry = self.follow(entry)?;
        entry.object("response")?;

        let mut headers = Vec::new();
        if let Some(map) = entry.get("headers") {
            map.object("`headers`")?;
            let prefix = format!("{}Headers", hint);
            for (name, _, header) in map.members() {
                if name.eq_ignore_ascii_case("Content-Type") {
                    tracing::trace!(response = hint, "`Content-Type` response header ignored");
                    continue;
                }
                let header = self.follow(&header)?;
                header.object("header")?;
                headers.push(self.parameter(&header, name, ParameterIn::Header, &prefix)?);
            }
        }

        let (contents, shape) = match entry.get("content") {
            Some(content) => {
                let contents = self.contents(&content, hint)?;
                let shape = (!contents.is_empty()).then(|| self.body_shape(&contents, &content, hint));
                (contents, shape)
            }
            None => (Vec::new(), None),
        };

        Ok(Response {
            status,
            description: entry.str_field("description")?.unwrap_or_default().to_string(),
            headers,
            contents,
            shape,
            location: self.location(entry.span(), &entry.key),
        })
    }

    /// A `content` map in declaration order. Two entries whose media types
    /// normalize to the same key overlap.
    fn contents(&mut self, content: &Cursor<'s>, hint: &str) -> Result<Vec<Content>, Diagnostic> {
        content.object("`content`")?;
        let entries = content.members();
        let several = entries.len() > 1;

        let mut seen: Vec<(String, Span)> = Vec::new();
        let mut contents = Vec::with_capacity(entries.len());
        for (raw_media, key_span, entry) in entries {
            let media = MediaRange::parse(raw_media).map_err(|e| {
                Diagnostic::new(DiagnosticKind::InvalidStructure, key_span)
                    .message(e.to_string())
                    .at_pointer(entry.key.pointer.clone())
            })?;
            let key = media.key();
            if let Some((_, first)) = seen.iter().find(|(k, _)| *k == key) {
                return Err(Diagnostic::new(DiagnosticKind::MediaPatternOverlap, key_span)
                    .message(format!("`{}` overlaps an earlier entry", raw_media))
                    .related_to(*first, "first declared here")
                    .at_pointer(entry.key.pointer.clone()));
            }
            seen.push((key, key_span));

            let kind = media.classify();
            let entry_hint = if several {
                format!("{}{}", hint, to_pascal_case(&media.essence()))
            } else {
                hint.to_string()
            };
            let ty = match entry.get("schema") {
                _ if kind == ContentKind::Binary => self.stream(),
                Some(schema) => self.schema_at(&schema, &entry_hint)?,
                None => self.stream(),
            };

            contents.push(Content {
                media,
                kind,
                ty: TypeRef::new(ty),
                encodings: self.encodings(&entry)?,
            });
        }
        Ok(contents)
    }

    fn encodings(&self, entry: &Cursor<'s>) -> Result<IndexMap<String, Encoding>, Diagnostic> {
        let mut encodings = IndexMap::new();
        let Some(map) = entry.get("encoding") else {
            return Ok(encodings);
        };
        map.object("`encoding`")?;
        for (field, _, encoding) in map.members() {
            encoding.object("encoding")?;
            let style = match encoding.str_field("style")? {
                Some(raw) => Some(ParameterStyle::parse(raw).ok_or_else(|| {
                    Diagnostic::new(DiagnosticKind::UnsupportedParameter, encoding.span())
                        .message(format!("unknown style `{}`", raw))
                        .at_pointer(encoding.key.pointer.clone())
                })?),
                None => None,
            };
            encodings.insert(
                field.to_string(),
                Encoding {
                    content_type: encoding.str_field("contentType")?.map(String::from),
                    style,
                    explode: encoding.bool_field("explode")?,
                    allow_reserved: encoding.bool_field("allowReserved")?.unwrap_or(false),
                },
            );
        }
        Ok(encodings)
    }

    /// One content is `Single`; contents sharing a type are `Shared`;
    /// otherwise a sum discriminated by content type.
    fn body_shape(&mut self, contents: &[Content], at: &Cursor<'s>, hint: &str) -> BodyShape {
        let first = contents[0].ty;
        if contents.len() == 1 {
            return BodyShape::Single(first);
        }
        if contents.iter().all(|c| c.ty.id == first.id) {
            return BodyShape::Shared(first);
        }

        let variants = contents
            .iter()
            .map(|content| Variant {
                content_type: Some(content.media.raw.clone()),
                ..Variant::new(content.ty)
            })
            .collect();
        let id = self.arena.reserve(Origin::Inline(at.key.clone()), hint);
        self.arena.fill(
            id,
            TypeKind::Sum {
                variants,
                discriminator: Discriminator::ByContentType,
            },
        );
        let location = self.location(at.span(), &at.key);
        self.arena.describe(id, at.span(), location, None);
        BodyShape::PerContent(TypeRef::new(id))
    }

    fn stream(&mut self) -> TypeId {
        self.arena.add(TypeKind::Stream, Origin::Builtin, "")
    }
}

//! Operation IR: parameters, bodies, responses.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::media::{ContentKind, MediaRange, best_match};
use super::security::SecurityRequirement;
use super::status::StatusPattern;
use super::types::TypeRef;
use crate::document::Location;
use crate::router::PathTemplate;

/// HTTP method token, in the order path items list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    /// Parse a path item key or a method token, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterIn {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterIn {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "query" => ParameterIn::Query,
            "header" => ParameterIn::Header,
            "path" => ParameterIn::Path,
            "cookie" => ParameterIn::Cookie,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterIn::Query => "query",
            ParameterIn::Header => "header",
            ParameterIn::Path => "path",
            ParameterIn::Cookie => "cookie",
        }
    }

    pub fn default_style(self) -> ParameterStyle {
        match self {
            ParameterIn::Path | ParameterIn::Header => ParameterStyle::Simple,
            ParameterIn::Query | ParameterIn::Cookie => ParameterStyle::Form,
        }
    }

    pub fn allows(self, style: ParameterStyle) -> bool {
        use ParameterStyle::*;
        match self {
            ParameterIn::Path => matches!(style, Simple | Label | Matrix),
            ParameterIn::Query => matches!(style, Form | SpaceDelimited | PipeDelimited | DeepObject),
            ParameterIn::Header => style == Simple,
            ParameterIn::Cookie => style == Form,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterStyle {
    Simple,
    Label,
    Matrix,
    Form,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "simple" => ParameterStyle::Simple,
            "label" => ParameterStyle::Label,
            "matrix" => ParameterStyle::Matrix,
            "form" => ParameterStyle::Form,
            "spaceDelimited" => ParameterStyle::SpaceDelimited,
            "pipeDelimited" => ParameterStyle::PipeDelimited,
            "deepObject" => ParameterStyle::DeepObject,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterStyle::Simple => "simple",
            ParameterStyle::Label => "label",
            ParameterStyle::Matrix => "matrix",
            ParameterStyle::Form => "form",
            ParameterStyle::SpaceDelimited => "spaceDelimited",
            ParameterStyle::PipeDelimited => "pipeDelimited",
            ParameterStyle::DeepObject => "deepObject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterContent {
    /// Serialized with `style`/`explode`.
    Schema(TypeRef),
    /// Serialized as a whole with a media type.
    Content { media: MediaRange, ty: TypeRef },
}

impl ParameterContent {
    pub fn ty(&self) -> TypeRef {
        match self {
            ParameterContent::Schema(ty) | ParameterContent::Content { ty, .. } => *ty,
        }
    }

    pub fn ty_mut(&mut self) -> &mut TypeRef {
        match self {
            ParameterContent::Schema(ty) | ParameterContent::Content { ty, .. } => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub target_name: String,
    pub in_: ParameterIn,
    pub required: bool,
    pub style: ParameterStyle,
    pub explode: bool,
    pub allow_reserved: bool,
    pub deprecated: bool,
    pub content: ParameterContent,
    pub description: Option<String>,
    pub location: Location,
}

/// Per-field serialization of form and multipart bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub content_type: Option<String>,
    pub style: Option<ParameterStyle>,
    pub explode: Option<bool>,
    pub allow_reserved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub media: MediaRange,
    pub kind: ContentKind,
    pub ty: TypeRef,
    pub encodings: IndexMap<String, Encoding>,
}

/// How the contents of a body map onto types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// One content type.
    Single(TypeRef),
    /// Several content types sharing one type; the emitter carries the
    /// content type next to the value.
    Shared(TypeRef),
    /// A sum with one variant per content type.
    PerContent(TypeRef),
}

impl BodyShape {
    pub fn ty(self) -> TypeRef {
        match self {
            BodyShape::Single(ty) | BodyShape::Shared(ty) | BodyShape::PerContent(ty) => ty,
        }
    }

    pub fn ty_mut(&mut self) -> &mut TypeRef {
        match self {
            BodyShape::Single(ty) | BodyShape::Shared(ty) | BodyShape::PerContent(ty) => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub required: bool,
    pub contents: Vec<Content>,
    pub shape: BodyShape,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusPattern,
    pub description: String,
    pub headers: Vec<Parameter>,
    pub contents: Vec<Content>,
    pub shape: Option<BodyShape>,
    pub location: Location,
}

/// Index into [`super::Ir::operations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u32);

impl OperationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub operation_id: Option<String>,
    /// `None` for webhook operations.
    pub path: Option<PathTemplate>,
    pub method: Method,
    pub params: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<StatusPattern, Response>,
    pub security: Vec<SecurityRequirement>,
    pub group: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub location: Location,
}

impl Operation {
    /// The response and content an emitted client would decode for a
    /// concrete status and content type: exact code before class before
    /// `default`, then the most specific media range.
    pub fn match_response(&self, status: u16, media: &str) -> Option<(&Response, Option<&Content>)> {
        let response = self
            .responses
            .values()
            .find(|r| r.status.matches(status))?;
        let Ok(media) = MediaRange::parse(media) else {
            return Some((response, None));
        };
        let content = best_match(response.contents.iter().map(|c| &c.media), &media)
            .map(|i| &response.contents[i]);
        Some((response, content))
    }

    /// Request content selected for an incoming content type.
    pub fn match_request(&self, media: &str) -> Option<&Content> {
        let body = self.request_body.as_ref()?;
        let media = MediaRange::parse(media).ok()?;
        best_match(body.contents.iter().map(|c| &c.media), &media).map(|i| &body.contents[i])
    }

    pub fn path_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.in_ == ParameterIn::Path)
    }

    /// Every type edge held by this operation.
    pub fn refs_mut(&mut self) -> Vec<&mut TypeRef> {
        let mut out: Vec<&mut TypeRef> = Vec::new();
        for param in &mut self.params {
            out.push(param.content.ty_mut());
        }
        if let Some(body) = &mut self.request_body {
            for content in &mut body.contents {
                out.push(&mut content.ty);
            }
            out.push(body.shape.ty_mut());
        }
        for response in self.responses.values_mut() {
            for header in &mut response.headers {
                out.push(header.content.ty_mut());
            }
            for content in &mut response.contents {
                out.push(&mut content.ty);
            }
            if let Some(shape) = &mut response.shape {
                out.push(shape.ty_mut());
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub name: String,
    pub operations: Vec<OperationId>,
}

/// Operations sharing an `x-ogen-operation-group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationGroup {
    pub name: String,
    pub operations: Vec<OperationId>,
}

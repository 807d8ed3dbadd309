use super::Span;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// Kinds earlier in the list are root causes: a broken document makes every
/// later check meaningless, an unresolved reference makes the schema that
/// uses it unanalyzable, and so on. Collections are sorted by this order
/// before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Document could not be read
    Io,

    // Document could not be parsed
    JsonSyntax,
    YamlSyntax,
    DuplicateKey,
    ParseLimit,
    UnsupportedVersion,
    InvalidStructure,

    // `$ref` resolution
    NotFound,
    CycleDetected,
    DepthLimit,
    InvalidPointer,

    // JSON Schema
    InvalidType,
    ConstraintMismatch,
    BadRegex,
    InvalidEnumValue,
    MixedNullability,
    UnsupportedKeyword,
    AllOfConflict,
    AmbiguousSum,
    InvalidDiscriminator,
    UnsupportedNot,
    UnsupportedFormat,
    RecursionNoEscape,
    UnknownFormat,

    // Operations
    DuplicateOperationName,
    PathParameterMissing,
    UnknownPathParameter,
    UnsupportedParameter,
    MediaPatternOverlap,
    UnknownSecurityScheme,

    // Routing
    InvalidPathTemplate,
    RouteConflict,

    // Bugs
    Internal,
}

/// Coarse error classes carried end-to-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    Io,
    Syntax,
    Reference,
    Schema,
    Operation,
    Routing,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Io => "io",
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Reference => "reference",
            ErrorCategory::Schema => "schema",
            ErrorCategory::Operation => "operation",
            ErrorCategory::Routing => "routing",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl DiagnosticKind {
    /// Default severity for this kind. Can be overridden by policy.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnknownFormat => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io => ErrorCategory::Io,
            Self::JsonSyntax
            | Self::YamlSyntax
            | Self::DuplicateKey
            | Self::ParseLimit
            | Self::UnsupportedVersion
            | Self::InvalidStructure => ErrorCategory::Syntax,
            Self::NotFound | Self::CycleDetected | Self::DepthLimit | Self::InvalidPointer => {
                ErrorCategory::Reference
            }
            Self::InvalidType
            | Self::ConstraintMismatch
            | Self::BadRegex
            | Self::InvalidEnumValue
            | Self::MixedNullability
            | Self::UnsupportedKeyword
            | Self::AllOfConflict
            | Self::AmbiguousSum
            | Self::InvalidDiscriminator
            | Self::UnsupportedNot
            | Self::UnsupportedFormat
            | Self::RecursionNoEscape
            | Self::UnknownFormat => ErrorCategory::Schema,
            Self::DuplicateOperationName
            | Self::PathParameterMissing
            | Self::UnknownPathParameter
            | Self::UnsupportedParameter
            | Self::MediaPatternOverlap
            | Self::UnknownSecurityScheme => ErrorCategory::Operation,
            Self::InvalidPathTemplate | Self::RouteConflict => ErrorCategory::Routing,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::MixedNullability => {
                Some("use either `nullable: true` or a `\"null\"` entry in `type`, not both")
            }
            Self::AmbiguousSum => {
                Some("add a `discriminator`, or give each variant a unique required field")
            }
            Self::RecursionNoEscape => {
                Some("make one of the recursive properties optional or nullable")
            }
            Self::UnsupportedNot => Some("`not` may only exclude enum values, consts or types"),
            Self::RouteConflict => {
                Some("paths that differ only in parameter names are the same route")
            }
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Io => "failed to read document",

            Self::JsonSyntax => "invalid JSON",
            Self::YamlSyntax => "invalid YAML",
            Self::DuplicateKey => "duplicate key",
            Self::ParseLimit => "document too large or too deeply nested",
            Self::UnsupportedVersion => "unsupported OpenAPI version",
            Self::InvalidStructure => "invalid document structure",

            Self::NotFound => "reference target not found",
            Self::CycleDetected => "reference cycle detected",
            Self::DepthLimit => "reference chain too deep",
            Self::InvalidPointer => "invalid JSON pointer",

            Self::InvalidType => "invalid schema type",
            Self::ConstraintMismatch => "constraint does not apply to this type",
            Self::BadRegex => "invalid regular expression",
            Self::InvalidEnumValue => "enum value does not match the schema type",
            Self::MixedNullability => "conflicting nullability declarations",
            Self::UnsupportedKeyword => "unsupported schema keyword",
            Self::AllOfConflict => "conflicting `allOf` branches",
            Self::AmbiguousSum => "cannot discriminate between variants",
            Self::InvalidDiscriminator => "invalid discriminator",
            Self::UnsupportedNot => "unsupported use of `not`",
            Self::UnsupportedFormat => "unsupported format",
            Self::RecursionNoEscape => "infinite recursion: no escape path",
            Self::UnknownFormat => "unknown format, treated as plain string",

            Self::DuplicateOperationName => "duplicate operation name",
            Self::PathParameterMissing => "path parameter is not declared",
            Self::UnknownPathParameter => "parameter is not in the path template",
            Self::UnsupportedParameter => "unsupported parameter serialization",
            Self::MediaPatternOverlap => "overlapping media types",
            Self::UnknownSecurityScheme => "unknown security scheme",

            Self::InvalidPathTemplate => "invalid path template",
            Self::RouteConflict => "conflicting routes",

            Self::Internal => "internal compiler error",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::NotFound => "reference target `{}` not found".to_string(),
            Self::CycleDetected => "reference cycle through `{}`".to_string(),
            Self::DuplicateKey => "duplicate key `{}`".to_string(),
            Self::UnsupportedVersion => "unsupported OpenAPI version `{}`".to_string(),
            Self::UnsupportedKeyword => "schema keyword `{}` is not supported".to_string(),
            Self::UnsupportedFormat => "format `{}` is not supported".to_string(),
            Self::UnknownFormat => "unknown format `{}`, treated as plain string".to_string(),
            Self::DuplicateOperationName => "operation `{}` is already defined".to_string(),
            Self::PathParameterMissing => {
                "path parameter `{}` is not declared in `parameters`".to_string()
            }
            Self::UnknownPathParameter => {
                "path parameter `{}` does not appear in the path template".to_string()
            }
            Self::UnknownSecurityScheme => "security scheme `{}` is not defined".to_string(),
            Self::RouteConflict => "route `{}` is already defined".to_string(),
            Self::Internal => "internal compiler error: {}".to_string(),

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A located problem in the input.
///
/// Diagnostics are plain values: analysis functions return
/// `Result<T, Diagnostic>` and stages collect them into [`super::Diagnostics`].
/// Every diagnostic has a primary span; chains (the `$ref` path that led to
/// a node, the first definition of a duplicate) are related spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) severity: Severity,
    pub(crate) span: Span,
    /// JSON pointer of the offending node within its document.
    pub(crate) pointer: Option<String>,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default message.
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            span,
            pointer: None,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    /// Provide custom detail, rendered using the kind's template.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message = self.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn related_to(mut self, span: Span, msg: impl Into<String>) -> Self {
        self.related.push(RelatedInfo::new(span, msg));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn at_pointer(mut self, pointer: impl Into<String>) -> Self {
        if self.pointer.is_none() {
            self.pointer = Some(pointer.into());
        }
        self
    }

    /// Report as a warning regardless of the kind's default severity.
    pub fn downgrade(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn pointer(&self) -> Option<&str> {
        self.pointer.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] at {}..{}: {}",
            self.severity,
            self.kind.category(),
            u32::from(self.span.range.start()),
            u32::from(self.span.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.span.range.start()),
                u32::from(related.span.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

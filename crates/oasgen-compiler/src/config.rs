//! Compilation settings.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use oasgen_core::keywords;

use crate::diagnostics::DiagnosticKind;
use crate::document::ParseLimits;
use crate::ir::Method;

const DEFAULT_DEPTH_LIMIT: u32 = 1000;
const DEFAULT_PARSE_FUEL: u32 = 1_000_000;
const DEFAULT_PARSE_DEPTH: u32 = 128;

/// Shared flag a driver sets to stop a running compilation.
///
/// Checked when entering a path, an operation or a component schema.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Identifier case convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Pascal,
    Camel,
    Snake,
}

impl Case {
    pub fn apply(self, s: &str) -> String {
        match self {
            Case::Pascal => oasgen_core::utils::to_pascal_case(s),
            Case::Camel => oasgen_core::utils::to_camel_case(s),
            Case::Snake => oasgen_core::utils::to_snake_case(s),
        }
    }
}

/// Naming conventions of the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    pub types: Case,
    pub fields: Case,
    pub reserved: &'static [&'static str],
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            types: Case::Pascal,
            fields: Case::Pascal,
            reserved: keywords::GO,
        }
    }
}

impl NamingConfig {
    pub fn is_reserved(&self, ident: &str) -> bool {
        keywords::is_reserved(self.reserved, ident)
    }
}

/// A format registered by the user, keyed by the JSON type it applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomFormat {
    pub json_type: String,
    pub format: String,
}

#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub depth_limit: u32,
    pub parse_fuel: u32,
    pub parse_depth: u32,
    pub infer_types: bool,
    pub filter_path: Option<regex_automata::meta::Regex>,
    pub filter_methods: Option<BTreeSet<Method>>,
    pub custom_formats: BTreeSet<CustomFormat>,
    pub naming: NamingConfig,
    pub downgrade: BTreeSet<DiagnosticKind>,
    pub cancel: Option<CancellationToken>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            parse_fuel: DEFAULT_PARSE_FUEL,
            parse_depth: DEFAULT_PARSE_DEPTH,
            infer_types: false,
            filter_path: None,
            filter_methods: None,
            custom_formats: BTreeSet::new(),
            naming: NamingConfig::default(),
            downgrade: BTreeSet::new(),
            cancel: None,
        }
    }
}

/// Invalid `--filter-path` expression.
#[derive(Debug, thiserror::Error)]
#[error("invalid path filter `{pattern}`: {source}")]
pub struct FilterError {
    pub pattern: String,
    #[source]
    pub source: Box<regex_automata::meta::BuildError>,
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth_limit(mut self, limit: u32) -> Self {
        self.depth_limit = limit;
        self
    }

    pub fn with_parse_fuel(mut self, fuel: u32) -> Self {
        self.parse_fuel = fuel;
        self
    }

    pub fn with_parse_depth(mut self, depth: u32) -> Self {
        self.parse_depth = depth;
        self
    }

    pub fn with_infer_types(mut self, infer: bool) -> Self {
        self.infer_types = infer;
        self
    }

    pub fn with_filter_path(mut self, pattern: &str) -> Result<Self, FilterError> {
        let regex = regex_automata::meta::Regex::new(pattern).map_err(|e| FilterError {
            pattern: pattern.to_string(),
            source: Box::new(e),
        })?;
        self.filter_path = Some(regex);
        Ok(self)
    }

    pub fn with_filter_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.filter_methods = Some(methods.into_iter().collect());
        self
    }

    pub fn with_custom_format(mut self, json_type: &str, format: &str) -> Self {
        self.custom_formats.insert(CustomFormat {
            json_type: json_type.to_string(),
            format: format.to_string(),
        });
        self
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_downgrade(mut self, kind: DiagnosticKind) -> Self {
        self.downgrade.insert(kind);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            fuel: self.parse_fuel,
            depth: self.parse_depth,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    pub fn is_downgraded(&self, kind: DiagnosticKind) -> bool {
        self.downgrade.contains(&kind)
    }

    pub fn is_custom_format(&self, json_type: &str, format: &str) -> bool {
        self.custom_formats
            .iter()
            .any(|f| f.json_type == json_type && f.format == format)
    }

    /// Whether an operation passes the path and method filters.
    pub fn selects(&self, path: &str, method: Method) -> bool {
        if let Some(regex) = &self.filter_path
            && !regex.is_match(path)
        {
            return false;
        }
        self.filter_methods
            .as_ref()
            .is_none_or(|methods| methods.contains(&method))
    }
}

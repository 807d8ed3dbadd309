//! Document store: parsed trees keyed by absolute URL.

use std::collections::{HashMap, HashSet};

use url::Url;

use super::fs::{Fetcher, FileSystem, LoadError};
use super::json::{ParseLimits, parse_json};
use super::node::{Node, Value};
use super::source_map::{SourceId, SourceMap};
use super::yaml::parse_yaml;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Detect from the URL's extension, then by sniffing the first
    /// non-whitespace byte.
    pub fn detect(url: &Url, content: &str) -> Format {
        let path = url.path().to_ascii_lowercase();
        if path.ends_with(".json") {
            return Format::Json;
        }
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            return Format::Yaml;
        }
        match content.trim_start().as_bytes().first() {
            Some(b'{') | Some(b'[') => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// An immutable parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: SourceId,
    pub url: Url,
    pub format: Format,
    pub root: Node,
}

/// The I/O side of loading.
pub struct Loader<'a> {
    pub fs: &'a dyn FileSystem,
    pub fetcher: &'a dyn Fetcher,
    pub limits: ParseLimits,
}

impl<'a> Loader<'a> {
    pub fn new(fs: &'a dyn FileSystem, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fs,
            fetcher,
            limits: ParseLimits::default(),
        }
    }

    pub fn limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    fn read(&self, url: &Url) -> Result<String, LoadError> {
        let bytes = match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| LoadError::InvalidLocation(url.to_string()))?;
                self.fs.read(&path).map_err(|source| LoadError::Read {
                    url: url.clone(),
                    source,
                })?
            }
            "http" | "https" => self.fetcher.fetch(url).map_err(|source| LoadError::Fetch {
                url: url.clone(),
                source,
            })?,
            scheme => {
                return Err(LoadError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    url: url.clone(),
                });
            }
        };
        String::from_utf8(bytes).map_err(|_| LoadError::NotUtf8(url.clone()))
    }
}

/// Holds every document of a compilation.
///
/// Loading is idempotent: a URL (fragment ignored) is read and parsed once.
/// Once [`DocumentStore::preload`] returns, the store is only read from.
#[derive(Debug, Default)]
pub struct DocumentStore {
    sources: SourceMap,
    documents: Vec<Option<Document>>,
    by_url: HashMap<Url, SourceId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn document(&self, id: SourceId) -> Option<&Document> {
        self.documents.get(id.index()).and_then(Option::as_ref)
    }

    pub fn by_url(&self, url: &Url) -> Option<&Document> {
        let url = without_fragment(url);
        self.by_url.get(&url).and_then(|&id| self.document(id))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Add an in-memory document. Parse errors go to `diagnostics`.
    pub fn insert(
        &mut self,
        url: &Url,
        content: String,
        limits: ParseLimits,
        diagnostics: &mut Diagnostics,
    ) -> SourceId {
        let url = without_fragment(url);
        if let Some(&id) = self.by_url.get(&url) {
            return id;
        }

        let format = Format::detect(&url, &content);
        let id = self.sources.add(url.clone(), content);
        let text = self.sources.content(id);
        let parsed = match format {
            Format::Json => parse_json(text, id, limits),
            Format::Yaml => parse_yaml(text, id),
        };

        let document = match parsed {
            Ok(root) => {
                tracing::debug!(url = %url, ?format, "document loaded");
                Some(Document {
                    id,
                    url: url.clone(),
                    format,
                    root,
                })
            }
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                None
            }
        };
        self.documents.push(document);
        self.by_url.insert(url, id);
        id
    }

    /// Read and parse `url` unless it is already loaded.
    pub fn load(
        &mut self,
        url: &Url,
        loader: &Loader<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<SourceId, LoadError> {
        let url = without_fragment(url);
        if let Some(&id) = self.by_url.get(&url) {
            return Ok(id);
        }
        let content = loader.read(&url)?;
        Ok(self.insert(&url, content, loader.limits, diagnostics))
    }

    /// Load every document reachable from `root` through `$ref`.
    ///
    /// Failures are reported at the referencing `$ref` and loading continues
    /// with the remaining references.
    pub fn preload(&mut self, root: SourceId, loader: &Loader<'_>, diagnostics: &mut Diagnostics) {
        let mut queue = vec![root];
        let mut visited: HashSet<SourceId> = HashSet::new();
        let mut failed: HashSet<Url> = HashSet::new();

        while let Some(id) = queue.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(document) = self.document(id) else {
                continue;
            };

            let mut refs = Vec::new();
            collect_refs(&document.root, &mut refs);
            let base = document.url.clone();

            for (reference, range) in refs {
                let span = Span::new(id, range);
                let target = match base.join(&reference) {
                    Ok(target) => without_fragment(&target),
                    Err(e) => {
                        diagnostics.push(
                            Diagnostic::new(DiagnosticKind::NotFound, span)
                                .message(format!("{} ({})", reference, e)),
                        );
                        continue;
                    }
                };
                if target == base || failed.contains(&target) {
                    continue;
                }
                match self.load(&target, loader, diagnostics) {
                    Ok(next) => queue.push(next),
                    Err(e) => {
                        tracing::warn!(url = %target, error = %e, "referenced document not loaded");
                        diagnostics.push(Diagnostic::new(DiagnosticKind::Io, span).message(e.to_string()));
                        failed.insert(target);
                    }
                }
            }
        }
    }
}

pub(crate) fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

fn collect_refs(node: &Node, out: &mut Vec<(String, rowan::TextRange)>) {
    match &node.value {
        Value::Object(object) => {
            if let Some(member) = object.member("$ref")
                && let Some(reference) = member.value.as_str()
            {
                out.push((reference.to_string(), member.value.range));
            }
            for (_, member) in object.iter() {
                collect_refs(&member.value, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, out)),
        _ => {}
    }
}

//! The compilation driver: load the root document, preload everything it
//! references, then analyze.


use url::Url;

use crate::analyze::analyze;
use crate::config::CompileConfig;
use crate::diagnostics::Diagnostics;
use crate::document::{DocumentStore, Fetcher, FileSystem, Loader, SourceId};
use crate::ir::Ir;
use crate::{Error, Result};

/// Compiles OpenAPI documents with injected I/O.
pub struct Compiler<'a> {
    fs: &'a dyn FileSystem,
    fetcher: &'a dyn Fetcher,
    config: CompileConfig,
}

/// Everything a compilation produced.
///
/// `ir` is `None` when an error was reported; `diagnostics` may hold
/// warnings either way. The store is kept so diagnostics can be rendered
/// against their sources.
#[derive(Debug)]
pub struct Compilation {
    pub store: DocumentStore,
    pub diagnostics: Diagnostics,
    pub ir: Option<Ir>,
}

impl Compilation {
    pub fn is_success(&self) -> bool {
        self.ir.is_some() && !self.diagnostics.has_errors()
    }

    pub fn render_diagnostics(&self, colored: bool) -> String {
        self.diagnostics
            .render_colored(self.store.sources(), colored)
    }
}

impl<'a> Compiler<'a> {
    pub fn new(fs: &'a dyn FileSystem, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fs,
            fetcher,
            config: CompileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile the document at `root`.
    ///
    /// Fails only when the root itself cannot be read, on cancellation and
    /// on internal errors; problems in the documents are diagnostics.
    pub fn compile(&self, root: &Url) -> Result<Compilation> {
        let span = tracing::info_span!("compile", url = %root);
        let _enter = span.enter();

        let loader = self.loader();
        let mut store = DocumentStore::new();
        let mut diagnostics = Diagnostics::new();
        let id = store.load(root, &loader, &mut diagnostics)?;
        self.run(store, id, &loader, diagnostics)
    }

    /// Compile an in-memory root document registered under `url`. Relative
    /// references are resolved against `url`.
    pub fn compile_source(&self, url: &Url, content: impl Into<String>) -> Result<Compilation> {
        let span = tracing::info_span!("compile", url = %url);
        let _enter = span.enter();

        let loader = self.loader();
        let mut store = DocumentStore::new();
        let mut diagnostics = Diagnostics::new();
        let id = store.insert(url, content.into(), loader.limits, &mut diagnostics);
        self.run(store, id, &loader, diagnostics)
    }

    fn loader(&self) -> Loader<'a> {
        Loader::new(self.fs, self.fetcher).limits(self.config.parse_limits())
    }

    fn run(
        &self,
        mut store: DocumentStore,
        root: SourceId,
        loader: &Loader<'_>,
        mut diagnostics: Diagnostics,
    ) -> Result<Compilation> {
        if !diagnostics.has_errors() {
            store.preload(root, loader, &mut diagnostics);
        }
        if self.config.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let ir = if diagnostics.has_errors() {
            None
        } else {
            analyze(&store, root, &self.config, &mut diagnostics)?
        };

        tracing::debug!(
            documents = store.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            success = ir.is_some(),
            "compilation finished"
        );
        Ok(Compilation {
            store,
            diagnostics,
            ir,
        })
    }
}

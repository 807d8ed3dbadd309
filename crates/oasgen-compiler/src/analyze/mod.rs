//! Semantic analysis: lowers the preloaded documents to the IR.
//!
//! One [`Analyzer`] walks the root document in declaration order:
//! - `document` - version and top-level structure
//! - `schema` - schema lowering into the type arena
//! - `operation` - paths, operations, webhooks and security
//! - `recursion` - indirect edges and escape checks
//! - `naming` - final identifiers
//! - `seal` - topological renumbering into the [`Ir`]
//! - `features` - the runtime feature vector
//!
//! Analysis stops at the first error unless its kind is downgraded in
//! [`CompileConfig::downgrade`]; then the enclosing operation (or component)
//! is dropped and the diagnostic is kept as a warning.

mod arena;
mod cursor;
mod document;
mod features;
mod naming;
mod operation;
mod recursion;
mod schema;
mod seal;

#[cfg(test)]
mod naming_tests;
#[cfg(test)]
mod operation_tests;
#[cfg(test)]
mod schema_tests;

use std::collections::{BTreeMap, HashMap};

use crate::config::CompileConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, Span};
use crate::document::{Document, DocumentStore, Location, SourceId};
use crate::ir::{Ir, Operation, SecurityModel, SpecVersion, TypeId, Webhook};
use crate::resolve::{RefKey, Resolver};
use crate::router::RouterBuilder;
use crate::schema::SchemaParser;
use crate::{Error, Result};

use arena::{Checkpoint, TypeArena};
use cursor::Cursor;

pub use naming::{NameAllocator, sanitize};

/// Why analysis ended early.
#[derive(Debug)]
pub(crate) enum Stop {
    Failed(Diagnostic),
    Cancelled,
    Internal(String),
}

impl From<Diagnostic> for Stop {
    fn from(diagnostic: Diagnostic) -> Self {
        Stop::Failed(diagnostic)
    }
}

/// Analyze the document `root` of a preloaded store.
///
/// Returns `Ok(None)` when analysis failed; the reasons are in
/// `diagnostics`. Warnings are pushed in either case.
pub fn analyze(
    store: &DocumentStore,
    root: SourceId,
    config: &CompileConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Option<Ir>> {
    let Some(document) = store.document(root) else {
        return Ok(None);
    };
    let version = match document::spec_version(document) {
        Ok(version) => version,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            return Ok(None);
        }
    };

    let mut analyzer = Analyzer::new(store, document, version, config);
    let outcome = analyzer.run().and_then(|()| analyzer.conclude());
    for warning in analyzer.warnings.drain(..) {
        diagnostics.push(warning);
    }

    match outcome {
        Ok(ir) => Ok(Some(ir)),
        Err(Stop::Failed(diagnostic)) => {
            diagnostics.push(diagnostic);
            Ok(None)
        }
        Err(Stop::Cancelled) => Err(Error::Cancelled),
        Err(Stop::Internal(message)) => Err(Error::Internal(message)),
    }
}

pub(crate) struct Analyzer<'s> {
    config: &'s CompileConfig,
    store: &'s DocumentStore,
    root: &'s Document,
    version: SpecVersion,
    parser: SchemaParser,
    resolver: Resolver<'s>,
    arena: TypeArena,
    components: BTreeMap<RefKey, TypeId>,
    warnings: Vec<Diagnostic>,
    operations: Vec<Operation>,
    operation_names: NameAllocator,
    /// Declared `operationId`s with the span of their first use.
    operation_ids: HashMap<String, Span>,
    routes: RouterBuilder,
    webhooks: Vec<Webhook>,
    security: SecurityModel,
}

impl<'s> Analyzer<'s> {
    fn new(
        store: &'s DocumentStore,
        root: &'s Document,
        version: SpecVersion,
        config: &'s CompileConfig,
    ) -> Self {
        Self {
            config,
            store,
            root,
            version,
            parser: SchemaParser::new(version),
            resolver: Resolver::new(store, config.depth_limit),
            arena: TypeArena::new(),
            components: BTreeMap::new(),
            warnings: Vec::new(),
            operations: Vec::new(),
            operation_names: NameAllocator::new(config.naming.reserved),
            operation_ids: HashMap::new(),
            routes: RouterBuilder::new(),
            webhooks: Vec::new(),
            security: SecurityModel::default(),
        }
    }

    fn run(&mut self) -> std::result::Result<(), Stop> {
        let root = self.root_cursor();
        self.check_structure(&root)?;
        self.security_schemes(&root)?;
        self.component_schemas(&root)?;
        self.paths(&root)?;
        self.webhooks(&root)?;
        Ok(())
    }

    fn root_cursor(&self) -> Cursor<'s> {
        Cursor::new(
            &self.root.root,
            self.root.id,
            RefKey::new(&self.root.url, ""),
        )
    }

    fn check_cancelled(&self) -> std::result::Result<(), Stop> {
        if self.config.is_cancelled() {
            tracing::debug!("cancellation requested");
            return Err(Stop::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn location(&self, span: Span, key: &RefKey) -> Location {
        self.store.sources().location(span, &key.pointer)
    }

    /// Keep a downgraded failure as a warning; `None` tells the caller to
    /// drop what it was building.
    fn recover<T>(
        &mut self,
        result: std::result::Result<T, Diagnostic>,
        what: &str,
    ) -> std::result::Result<Option<T>, Stop> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(diagnostic) if self.config.is_downgraded(diagnostic.kind()) => {
                tracing::warn!(
                    item = what,
                    reason = diagnostic.text(),
                    "dropped after downgraded error"
                );
                self.warnings.push(diagnostic.downgrade());
                Ok(None)
            }
            Err(diagnostic) => Err(Stop::Failed(diagnostic)),
        }
    }

    /// Lower every entry of `components.schemas`, in declaration order.
    fn component_schemas(&mut self, root: &Cursor<'s>) -> std::result::Result<(), Stop> {
        let Some(schemas) = root.get("components").and_then(|c| c.get("schemas")) else {
            return Ok(());
        };
        for (name, key_span, schema) in schemas.members() {
            self.check_cancelled()?;
            let checkpoint = self.arena.checkpoint();
            let result = self.component(&schema, key_span);
            if self.recover(result, name)?.is_none() {
                self.rollback(checkpoint);
            }
        }
        Ok(())
    }

    /// Forget every type created after `checkpoint`.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.arena.rollback(checkpoint);
        let len = self.arena.len();
        self.components.retain(|_, id| id.index() < len);
    }

    /// Whole-graph passes over the finished arena, then sealing.
    fn conclude(&mut self) -> std::result::Result<Ir, Stop> {
        if let Some(i) = self.arena.slots().iter().position(|s| s.kind.is_none()) {
            return Err(Stop::Internal(format!("type #{} was reserved but never filled", i)));
        }
        self.check_recursion()?;
        let names = self.assign_names();
        let router = std::mem::replace(&mut self.routes, RouterBuilder::new()).build();
        let mut ir = self.seal(names, router)?;
        ir.features = features::collect(&ir);
        Ok(ir)
    }
}

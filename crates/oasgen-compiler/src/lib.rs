//! oasgen compiler: OpenAPI 3.x documents to a sealed, typed IR.
//!
//! This crate provides the compilation pipeline:
//! - `document` - source map, JSON/YAML parsing with locations, document store
//! - `resolve` - `$ref` resolution with cycle and depth limits
//! - `schema` - JSON-Schema parsing into `RawSchema`
//! - `analyze` - schema and operation analysis, naming, feature detection
//! - `router` - path template parsing and the routing trie
//! - `ir` - the IR handed to emitters
//! - `diagnostics` - error reporting
//! - `compile` - the `Compiler` driver

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod ir;
pub mod resolve;
pub mod router;
pub mod schema;

#[cfg(test)]
pub mod test_utils;

pub use compile::{Compilation, Compiler};
pub use config::{CancellationToken, CompileConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity, Span};
pub use document::{
    DocumentStore, Fetcher, FileSystem, LoadError, Location, MemoryFs, NoFetcher, OsFileSystem,
    SourceId, SourceMap,
};
pub use ir::Ir;

/// Fatal errors that abort a compilation.
///
/// User-facing problems in the document are diagnostics, carried by
/// [`Compilation`]; these are the conditions under which no meaningful
/// diagnostics can be produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The driver requested cancellation; partial IR was discarded.
    #[error("compilation cancelled")]
    Cancelled,

    /// The root document could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

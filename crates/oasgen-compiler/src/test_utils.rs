//! Test helpers: compile in-memory documents.

use url::Url;

use crate::config::CompileConfig;
use crate::diagnostics::DiagnosticKind;
use crate::document::MemoryFs;
use crate::ir::Ir;
use crate::{Compilation, Compiler};

/// URL in-memory root documents are registered under.
pub const ROOT_URL: &str = "file:///api/openapi.yaml";

impl Compiler<'_> {
    /// Compile `src` as the root document, with no other files.
    pub fn compile_str(src: &str, config: CompileConfig) -> Compilation {
        Self::compile_with_fs(src, MemoryFs::new(), config)
    }

    /// Compile `src` as the root document; `fs` serves the files and
    /// remote documents it references.
    pub fn compile_with_fs(src: &str, fs: MemoryFs, config: CompileConfig) -> Compilation {
        let url = Url::parse(ROOT_URL).unwrap();
        Compiler::new(&fs, &fs)
            .with_config(config)
            .compile_source(&url, src)
            .unwrap()
    }

    pub fn expect_valid(src: &str) -> Ir {
        Self::expect_valid_with(src, CompileConfig::default())
    }

    pub fn expect_valid_with(src: &str, config: CompileConfig) -> Ir {
        let compilation = Self::compile_str(src, config);
        if !compilation.is_success() {
            panic!(
                "expected a valid document, got:\n{}",
                plain(&compilation)
            );
        }
        compilation.ir.unwrap()
    }

    /// Compile `src` and return the rendered diagnostics.
    pub fn expect_invalid(src: &str) -> String {
        Self::expect_invalid_with(src, CompileConfig::default())
    }

    pub fn expect_invalid_with(src: &str, config: CompileConfig) -> String {
        let compilation = Self::compile_str(src, config);
        if compilation.is_success() {
            panic!("expected an invalid document, but it compiled");
        }
        plain(&compilation)
    }
}

/// Kinds of every diagnostic of a compilation, in report order.
pub fn kinds(compilation: &Compilation) -> Vec<DiagnosticKind> {
    compilation.diagnostics.kinds()
}

/// One line per diagnostic, without source snippets.
pub fn plain(compilation: &Compilation) -> String {
    compilation
        .diagnostics
        .printer(compilation.store.sources())
        .plain(true)
        .render()
}

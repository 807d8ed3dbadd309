use std::path::PathBuf;

use oasgen_compiler::config::FilterError;
use oasgen_compiler::document::{Fetcher, LoadError, NoFetcher, OsFileSystem, location_to_url};
use oasgen_compiler::ir::Method;
use oasgen_compiler::{CompileConfig, Compiler};
use oasgen_core::{Colors, Style};

use super::fetch::HttpFetcher;
use super::output;

pub struct GenerateArgs {
    pub spec: String,
    pub target: PathBuf,
    pub package: String,
    pub clean: bool,
    pub infer_types: bool,
    pub filter_path: Option<String>,
    pub filter_methods: Option<Vec<Method>>,
    pub allow_remote: bool,
    pub color: bool,
}

impl GenerateArgs {
    fn config(&self) -> Result<CompileConfig, FilterError> {
        let mut config = CompileConfig::new().with_infer_types(self.infer_types);
        if let Some(pattern) = &self.filter_path {
            config = config.with_filter_path(pattern)?;
        }
        if let Some(methods) = &self.filter_methods {
            config = config.with_filter_methods(methods.iter().copied());
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("cannot determine the working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error(transparent)]
    Location(#[from] LoadError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("cannot start the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Compile(#[from] oasgen_compiler::Error),

    /// Diagnostics were already printed.
    #[error("generation failed with {0} error(s)")]
    Invalid(usize),

    #[error("cannot write to `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Compile(oasgen_compiler::Error::Internal(_)) => 2,
            _ => 1,
        }
    }
}

struct Summary {
    types: usize,
    operations: usize,
    path: PathBuf,
}

/// Run the generator; returns the process exit code.
pub fn run(args: GenerateArgs) -> i32 {
    match generate(&args) {
        Ok(summary) => {
            let c = Colors::new(args.color);
            println!(
                "{} types, {} operations {}",
                c.paint(Style::Name, summary.types),
                c.paint(Style::Name, summary.operations),
                c.paint(Style::Dim, format!("-> {}", summary.path.display())),
            );
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}

fn generate(args: &GenerateArgs) -> Result<Summary, GenerateError> {
    let cwd = std::env::current_dir().map_err(GenerateError::WorkingDir)?;
    let url = location_to_url(&args.spec, &cwd)?;
    let config = args.config()?;

    let http;
    let fetcher: &dyn Fetcher = if args.allow_remote {
        http = HttpFetcher::new()?;
        &http
    } else {
        &NoFetcher
    };

    let compilation = Compiler::new(&OsFileSystem, fetcher)
        .with_config(config)
        .compile(&url)?;
    if !compilation.diagnostics.is_empty() {
        eprint!("{}", compilation.render_diagnostics(args.color));
    }
    let errors = compilation.diagnostics.error_count();
    let Some(ir) = compilation.ir.filter(|_| errors == 0) else {
        return Err(GenerateError::Invalid(errors));
    };

    let write_error = |source| GenerateError::Write {
        path: args.target.clone(),
        source,
    };
    if args.clean {
        output::clean(&args.target).map_err(write_error)?;
    }
    let path = output::write_ir(&args.target, &args.package, &ir).map_err(write_error)?;

    Ok(Summary {
        types: ir.types.len(),
        operations: ir.operations.len(),
        path,
    })
}

//! Command builder for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI.
pub fn build_cli() -> Command {
    Command::new("oasgen")
        .about("Compile OpenAPI 3.x documents into a typed IR")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("oasgen <SPEC> --target <DIR> --package <NAME> [OPTIONS]")
        .after_help(
            r#"EXAMPLES:
  oasgen openapi.yaml --target api --package api
  oasgen openapi.yaml --target api --package api --clean
  oasgen https://example.com/openapi.json --target api --package api --allow-remote
  oasgen openapi.yaml --target api --package api --filter-path '^/pets' --filter-methods get,post

EXIT STATUS:
  0  success
  1  the document could not be loaded or is invalid
  2  internal error"#,
        )
        .arg(spec_arg())
        .arg(target_arg())
        .arg(package_arg())
        .arg(clean_arg())
        .arg(infer_types_arg())
        .arg(filter_path_arg())
        .arg(filter_methods_arg())
        .arg(allow_remote_arg())
        .arg(color_arg())
        .arg(verbose_arg())
}

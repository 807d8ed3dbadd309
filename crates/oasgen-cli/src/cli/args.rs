//! Argument builders for the CLI.
//!
//! Each function returns a `clap::Arg` composed into the command in
//! `commands.rs`.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};
use oasgen_compiler::ir::Method;

/// OpenAPI document: a path or a `file`/`http(s)` URL (positional).
pub fn spec_arg() -> Arg {
    Arg::new("spec")
        .value_name("SPEC")
        .required(true)
        .help("OpenAPI document path or URL")
}

/// Output directory (--target).
pub fn target_arg() -> Arg {
    Arg::new("target")
        .long("target")
        .value_name("DIR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Directory generated files are written to")
}

/// Package name of generated files (--package).
pub fn package_arg() -> Arg {
    Arg::new("package")
        .long("package")
        .value_name("NAME")
        .required(true)
        .value_parser(parse_package)
        .help("Package name written into generated files")
}

/// Remove previously generated files (--clean).
pub fn clean_arg() -> Arg {
    Arg::new("clean")
        .long("clean")
        .action(ArgAction::SetTrue)
        .help("Remove previously generated oas_* files first")
}

/// Infer missing `type` from other keywords (--infer-types).
pub fn infer_types_arg() -> Arg {
    Arg::new("infer_types")
        .long("infer-types")
        .action(ArgAction::SetTrue)
        .help("Infer a schema's type from enum, const, default, format and constraints")
}

/// Only operations whose path matches (--filter-path).
pub fn filter_path_arg() -> Arg {
    Arg::new("filter_path")
        .long("filter-path")
        .value_name("REGEX")
        .help("Only generate operations whose path matches REGEX")
}

/// Only operations with these methods (--filter-methods).
pub fn filter_methods_arg() -> Arg {
    Arg::new("filter_methods")
        .long("filter-methods")
        .value_name("METHODS")
        .value_delimiter(',')
        .value_parser(parse_method)
        .help("Only generate operations with these methods (comma-separated)")
}

/// Allow fetching `http(s)` references (--allow-remote).
pub fn allow_remote_arg() -> Arg {
    Arg::new("allow_remote")
        .long("allow-remote")
        .action(ArgAction::SetTrue)
        .help("Fetch remote documents over HTTP(S)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Log verbosity (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("Verbosity level (-v info, -vv debug, -vvv trace)")
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::parse(s.trim()).ok_or_else(|| format!("unknown HTTP method `{}`", s))
}

fn parse_package(s: &str) -> Result<String, String> {
    let valid = s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_');
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("`{}` is not a valid package name", s))
    }
}

//! Dispatch logic: extract params from `ArgMatches` and convert them to
//! command args.

use std::path::PathBuf;

use clap::ArgMatches;
use oasgen_compiler::ir::Method;

use super::ColorChoice;
use crate::commands::generate::GenerateArgs;

pub struct GenerateParams {
    pub spec: String,
    pub target: PathBuf,
    pub package: String,
    pub clean: bool,
    pub infer_types: bool,
    pub filter_path: Option<String>,
    pub filter_methods: Option<Vec<Method>>,
    pub allow_remote: bool,
    pub color: ColorChoice,
    pub verbose: u8,
}

impl GenerateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            spec: m.get_one::<String>("spec").cloned().unwrap_or_default(),
            target: m.get_one::<PathBuf>("target").cloned().unwrap_or_default(),
            package: m.get_one::<String>("package").cloned().unwrap_or_default(),
            clean: m.get_flag("clean"),
            infer_types: m.get_flag("infer_types"),
            filter_path: m.get_one::<String>("filter_path").cloned(),
            filter_methods: m
                .get_many::<Method>("filter_methods")
                .map(|methods| methods.copied().collect()),
            allow_remote: m.get_flag("allow_remote"),
            color: parse_color(m),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<GenerateParams> for GenerateArgs {
    fn from(p: GenerateParams) -> Self {
        Self {
            spec: p.spec,
            target: p.target,
            package: p.package,
            clean: p.clean,
            infer_types: p.infer_types,
            filter_path: p.filter_path,
            filter_methods: p.filter_methods,
            allow_remote: p.allow_remote,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

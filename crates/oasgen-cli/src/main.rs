mod cli;
mod commands;

use cli::{GenerateParams, build_cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();
    let params = GenerateParams::from_matches(&matches);
    init_tracing(params.verbose);

    let code = commands::generate::run(params.into());
    std::process::exit(code);
}

/// Log to stderr. `-v` flags override `RUST_LOG`; without either only
/// warnings are shown.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

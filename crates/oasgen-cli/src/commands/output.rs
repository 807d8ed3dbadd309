//! Files written into the target directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use oasgen_compiler::Ir;

/// Prefix of every generated file; `--clean` removes files carrying it.
pub const GENERATED_PREFIX: &str = "oas_";

pub const IR_FILE: &str = "oas_ir.txt";

/// Remove generated files from `target`. A missing directory is empty.
pub fn clean(target: &Path) -> io::Result<usize> {
    if !target.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(target)? {
        let entry = entry?;
        let generated = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(GENERATED_PREFIX));
        if generated && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    tracing::debug!(target = %target.display(), removed, "generated files removed");
    Ok(removed)
}

/// Write the IR dump of `ir` under a package header. Returns the file path.
pub fn write_ir(target: &Path, package: &str, ir: &Ir) -> io::Result<PathBuf> {
    fs::create_dir_all(target)?;
    let path = target.join(IR_FILE);
    fs::write(&path, render(package, ir))?;
    tracing::debug!(path = %path.display(), "IR written");
    Ok(path)
}

pub fn render(package: &str, ir: &Ir) -> String {
    let mut out = String::new();
    out.push_str("// Code generated by oasgen, DO NOT EDIT.\n\n");
    out.push_str(&format!("package {}\n\n", package));
    out.push_str(&ir.dump());
    out
}

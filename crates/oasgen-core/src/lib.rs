//! Shared utilities for the oasgen compiler and CLI.
//!
//! - `utils` - identifier case conversion and word splitting
//! - `keywords` - reserved word tables for target namespaces
//! - `colors` - ANSI styling for terminal output

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod colors;
pub mod keywords;
pub mod utils;

#[cfg(test)]
mod colors_tests;
#[cfg(test)]
mod utils_tests;

pub use colors::{Colors, Style};

//! Document store: sources, located JSON/YAML trees and I/O collaborators.

mod fs;
mod json;
mod lexer;
mod node;
pub mod pointer;
mod source_map;
mod store;
mod yaml;

#[cfg(test)]
mod json_tests;
#[cfg(test)]
mod pointer_tests;
#[cfg(test)]
mod store_tests;
#[cfg(test)]
mod yaml_tests;

pub use fs::{
    FetchError, Fetcher, FileSystem, LoadError, MemoryFs, NoFetcher, OsFileSystem,
    location_to_url,
};
pub use json::{ParseLimits, parse_json};
pub use node::{Member, Node, Object, Value};
pub use source_map::{Location, SourceId, SourceMap};
pub use store::{Document, DocumentStore, Format, Loader};
pub use yaml::parse_yaml;

pub(crate) use store::without_fragment;

//! JSON-Schema parsing: located schema nodes to [`RawSchema`].
//!
//! The parser validates keywords against the OpenAPI dialect of the root
//! document and keeps `$ref`s unresolved. Lowering to IR types happens in
//! [`crate::analyze`].

mod parser;
mod raw;

#[cfg(test)]
mod parser_tests;

pub use parser::SchemaParser;
pub use raw::{Additional, RawDiscriminator, RawProperty, RawSchema, SchemaRef};

//! `$ref` resolution.
//!
//! All documents are loaded before analysis starts, so resolution is pure
//! lookup in the [`DocumentStore`](crate::document::DocumentStore). The
//! [`Resolver`] keeps the stack of frames the analyzers descended through;
//! that stack is both the base-URL context and the chain reported with
//! `CycleDetected` and `DepthLimit`.

mod key;
mod resolver;

#[cfg(test)]
mod resolver_tests;

pub use key::{RefKey, RefKeyError};
pub use resolver::{Frame, Resolved, Resolver};

pub(crate) use resolver::{key_error, ref_member};

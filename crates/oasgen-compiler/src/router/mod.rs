//! Router planner: path templates compiled into a radix trie.
//!
//! Edges are literal byte runs or a single parameter placeholder. Each
//! terminal node maps methods to operations; each node also records the
//! methods reachable below it so a miss can be answered with `405` and an
//! `Allow` list.

pub mod percent;
mod template;
mod trie;

#[cfg(test)]
mod template_tests;

pub use template::{PathTemplate, Segment, TemplateError};
pub use trie::{Match, Route, RouteEntry, RouterBuilder, RouterPlan};

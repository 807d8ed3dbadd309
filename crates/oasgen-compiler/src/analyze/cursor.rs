//! Located navigation over document nodes.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::document::{Node, Object, SourceId};
use crate::resolve::RefKey;

/// A node together with its source and its canonical key.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'s> {
    pub node: &'s Node,
    pub source: SourceId,
    pub key: RefKey,
}

impl<'s> Cursor<'s> {
    pub fn new(node: &'s Node, source: SourceId, key: RefKey) -> Self {
        Self { node, source, key }
    }

    pub fn span(&self) -> Span {
        Span::new(self.source, self.node.range)
    }

    pub fn get(&self, name: &str) -> Option<Cursor<'s>> {
        let node = self.node.as_object()?.get(name)?;
        Some(Cursor::new(node, self.source, self.key.child(name)))
    }

    /// Span of the key `name`, falling back to the whole node.
    pub fn key_span(&self, name: &str) -> Span {
        self.node
            .as_object()
            .and_then(|o| o.member(name))
            .map(|m| Span::new(self.source, m.key_range))
            .unwrap_or_else(|| self.span())
    }

    /// Object members in declaration order, with the span of each key.
    /// Empty for non-objects.
    pub fn members(&self) -> Vec<(&'s str, Span, Cursor<'s>)> {
        let Some(object) = self.node.as_object() else {
            return Vec::new();
        };
        object
            .iter()
            .map(|(name, member)| {
                let cursor = Cursor::new(&member.value, self.source, self.key.child(name));
                (name, Span::new(self.source, member.key_range), cursor)
            })
            .collect()
    }

    /// Array items. Empty for non-arrays.
    pub fn items(&self) -> Vec<Cursor<'s>> {
        let Some(items) = self.node.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .map(|(i, node)| Cursor::new(node, self.source, self.key.child(&i.to_string())))
            .collect()
    }

    pub fn object(&self, what: &str) -> Result<&'s Object, Diagnostic> {
        self.node
            .as_object()
            .ok_or_else(|| self.expected(what, "an object"))
    }

    pub fn array(&self, what: &str) -> Result<&'s [Node], Diagnostic> {
        self.node
            .as_array()
            .ok_or_else(|| self.expected(what, "an array"))
    }

    pub fn as_str(&self, what: &str) -> Result<&'s str, Diagnostic> {
        self.node
            .as_str()
            .ok_or_else(|| self.expected(what, "a string"))
    }

    /// Optional string member.
    pub fn str_field(&self, name: &str) -> Result<Option<&'s str>, Diagnostic> {
        match self.get(name) {
            Some(field) => field.as_str(&format!("`{}`", name)).map(Some),
            None => Ok(None),
        }
    }

    /// Optional boolean member.
    pub fn bool_field(&self, name: &str) -> Result<Option<bool>, Diagnostic> {
        match self.get(name) {
            Some(field) => field
                .node
                .as_bool()
                .map(Some)
                .ok_or_else(|| field.expected(&format!("`{}`", name), "a boolean")),
            None => Ok(None),
        }
    }

    /// String member that must be present.
    pub fn required_str(&self, name: &str, owner: &str) -> Result<&'s str, Diagnostic> {
        match self.str_field(name)? {
            Some(value) => Ok(value),
            None => Err(self.invalid(&format!("{} requires `{}`", owner, name))),
        }
    }

    pub fn invalid(&self, detail: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::InvalidStructure, self.span())
            .message(detail)
            .at_pointer(self.key.pointer.clone())
    }

    fn expected(&self, what: &str, shape: &str) -> Diagnostic {
        self.invalid(&format!(
            "{} must be {}, found {}",
            what,
            shape,
            self.node.type_name()
        ))
    }
}

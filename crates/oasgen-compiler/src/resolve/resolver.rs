use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::document::{DocumentStore, Node, SourceId, pointer};

use super::key::{RefKey, RefKeyError};

/// Related locations attached to chain diagnostics are capped to keep
/// deep chains readable.
const MAX_CHAIN_NOTES: usize = 16;

/// One step of the active resolution chain.
#[derive(Debug, Clone)]
pub struct Frame {
    pub key: RefKey,
    pub source: SourceId,
    /// The `$ref` (or other reference) that led here.
    pub via: Span,
}

/// A node reached through `$ref`.
#[derive(Debug, Clone)]
pub struct Resolved<'s> {
    pub key: RefKey,
    pub source: SourceId,
    pub node: &'s Node,
}

/// Resolves `$ref` strings against the preloaded documents and tracks the
/// active chain.
pub struct Resolver<'s> {
    store: &'s DocumentStore,
    frames: Vec<Frame>,
    depth_limit: u32,
}

impl<'s> Resolver<'s> {
    pub fn new(store: &'s DocumentStore, depth_limit: u32) -> Self {
        Self {
            store,
            frames: Vec::new(),
            depth_limit,
        }
    }

    pub fn store(&self) -> &'s DocumentStore {
        self.store
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_active(&self, key: &RefKey) -> bool {
        self.frames.iter().any(|f| &f.key == key)
    }

    /// Canonical key of `reference`, resolved against the document that
    /// holds the `$ref` at `span`.
    pub fn key(&self, reference: &str, span: Span) -> Result<RefKey, Diagnostic> {
        let base = self.store.sources().url(span.source);
        RefKey::parse(reference, base).map_err(|e| key_error(reference, span, e))
    }

    /// Node addressed by `key`.
    pub fn lookup(&self, key: &RefKey, span: Span) -> Result<Resolved<'s>, Diagnostic> {
        let not_found = |detail: String| {
            self.with_chain(Diagnostic::new(DiagnosticKind::NotFound, span).message(detail))
        };

        let Some(document) = self.store.by_url(&key.url) else {
            return Err(not_found(key.to_string()));
        };
        let node = pointer::lookup(&document.root, &key.pointer).map_err(|e| match e {
            pointer::PointerError::Missing { .. } => not_found(key.to_string()),
            other => Diagnostic::new(DiagnosticKind::InvalidPointer, span).message(other.to_string()),
        })?;

        tracing::trace!(key = %key, "resolved");
        Ok(Resolved {
            key: key.clone(),
            source: document.id,
            node,
        })
    }

    /// Resolve one `$ref` step.
    pub fn target(&self, reference: &str, span: Span) -> Result<Resolved<'s>, Diagnostic> {
        let key = self.key(reference, span)?;
        self.lookup(&key, span)
    }

    /// Resolve `reference` and follow chains of plain `$ref` nodes to the
    /// final target.
    pub fn resolve(&self, reference: &str, span: Span) -> Result<Resolved<'s>, Diagnostic> {
        let mut current = self.target(reference, span)?;
        let mut chain: Vec<(RefKey, Span)> = vec![(current.key.clone(), span)];

        while is_plain_ref(current.node) {
            let Some((next_ref, next_span)) = ref_member(current.node, current.source) else {
                break;
            };
            let next = self.target(next_ref, next_span)?;
            if chain.iter().any(|(key, _)| *key == next.key) {
                let mut diagnostic = Diagnostic::new(DiagnosticKind::CycleDetected, span)
                    .message(next.key.to_string());
                for (key, at) in chain.iter().take(MAX_CHAIN_NOTES) {
                    diagnostic = diagnostic.related_to(*at, format!("refers to `{}`", key));
                }
                return Err(diagnostic.related_to(next_span, format!("refers to `{}`", next.key)));
            }
            if chain.len() >= self.depth_limit as usize {
                return Err(Diagnostic::new(DiagnosticKind::DepthLimit, span)
                    .message(format!("more than {} references", self.depth_limit)));
            }
            chain.push((next.key.clone(), next_span));
            current = next;
        }
        Ok(current)
    }

    /// Push a frame before descending into a referenced subtree.
    pub fn enter(&mut self, key: &RefKey, source: SourceId, via: Span) -> Result<(), Diagnostic> {
        if self.is_active(key) {
            let diagnostic =
                Diagnostic::new(DiagnosticKind::CycleDetected, via).message(key.to_string());
            return Err(self.with_chain(diagnostic));
        }
        if self.frames.len() >= self.depth_limit as usize {
            let diagnostic = Diagnostic::new(DiagnosticKind::DepthLimit, via)
                .message(format!("more than {} nested references", self.depth_limit));
            return Err(self.with_chain(diagnostic));
        }
        tracing::trace!(key = %key, depth = self.frames.len() + 1, "enter");
        self.frames.push(Frame {
            key: key.clone(),
            source,
            via,
        });
        Ok(())
    }

    pub fn leave(&mut self) {
        self.frames.pop();
    }

    /// Attach the innermost frames of the active chain.
    pub fn with_chain(&self, mut diagnostic: Diagnostic) -> Diagnostic {
        for frame in self.frames.iter().rev().take(MAX_CHAIN_NOTES) {
            diagnostic = diagnostic.related_to(frame.via, format!("via `{}`", frame.key));
        }
        diagnostic
    }
}

/// Diagnostic for a `$ref` string that does not form a key.
pub(crate) fn key_error(reference: &str, span: Span, error: RefKeyError) -> Diagnostic {
    match error {
        RefKeyError::Url { .. } => Diagnostic::new(DiagnosticKind::NotFound, span).message(reference),
        RefKeyError::NotPointer(_) | RefKeyError::Pointer(_) => {
            Diagnostic::new(DiagnosticKind::InvalidPointer, span).message(error.to_string())
        }
    }
}

/// The `$ref` string of an object node and its span.
pub(crate) fn ref_member(node: &Node, source: SourceId) -> Option<(&str, Span)> {
    let member = node.as_object()?.member("$ref")?;
    let reference = member.value.as_str()?;
    Some((reference, Span::new(source, member.value.range)))
}

/// A node that only redirects: `$ref` plus annotations or extensions.
fn is_plain_ref(node: &Node) -> bool {
    let Some(object) = node.as_object() else {
        return false;
    };
    object.contains_key("$ref")
        && object
            .keys()
            .all(|k| matches!(k, "$ref" | "description" | "summary") || k.starts_with("x-"))
}

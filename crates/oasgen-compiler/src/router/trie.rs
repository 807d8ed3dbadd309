use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::percent;
use super::template::{PathTemplate, Segment};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{Method, OperationId};

/// A matched operation with its decoded path arguments, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: OperationId,
    pub args: Vec<(String, String)>,
}

impl Route {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    Found(Route),
    /// The path exists but not for this method.
    MethodNotAllowed { allow: Vec<Method> },
    /// `OPTIONS` on a path without an explicit `OPTIONS` operation.
    Preflight { allow: Vec<Method> },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Handler {
    operation: OperationId,
    template: PathTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    label: String,
    node: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    /// Literal edges; no two labels share a first byte.
    literals: Vec<Edge>,
    param: Option<Box<Node>>,
    handlers: BTreeMap<Method, Handler>,
    methods_below: BTreeSet<Method>,
}

/// The routing trie of all operations with a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterPlan {
    root: Node,
    len: usize,
}

/// One operation to route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub template: PathTemplate,
    pub method: Method,
    pub operation: OperationId,
    pub span: Span,
}

enum Piece<'a> {
    Literal(&'a str),
    Param,
}

fn pieces(template: &PathTemplate) -> Vec<Piece<'_>> {
    template
        .segments()
        .iter()
        .map(|s| match s {
            Segment::Literal(l) => Piece::Literal(l),
            Segment::Param(_) => Piece::Param,
        })
        .collect()
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

impl Node {
    /// Walk (and grow) the trie along a literal run.
    fn literal_child(&mut self, mut text: &str, method: Method) -> &mut Node {
        let mut node = self;
        while let Some(first) = first_char(text) {
            let Some(pos) = node
                .literals
                .iter()
                .position(|e| first_char(&e.label) == Some(first))
            else {
                let mut leaf = Node::default();
                leaf.methods_below.insert(method);
                node.literals.push(Edge {
                    label: text.to_string(),
                    node: leaf,
                });
                let last = node.literals.len() - 1;
                return &mut node.literals[last].node;
            };

            let edge = &mut node.literals[pos];
            let shared = common_prefix(&edge.label, text);
            if shared < edge.label.len() {
                let tail = edge.label.split_off(shared);
                let below = std::mem::take(&mut edge.node);
                edge.node.methods_below = below.methods_below.clone();
                edge.node.literals.push(Edge {
                    label: tail,
                    node: below,
                });
            }
            text = &text[shared..];
            node = &mut node.literals[pos].node;
            node.methods_below.insert(method);
        }
        node
    }

    fn insert(&mut self, pieces: &[Piece<'_>], method: Method, handler: Handler) -> Result<(), OperationId> {
        self.methods_below.insert(method);
        let Some((head, rest)) = pieces.split_first() else {
            if let Some(existing) = self.handlers.get(&method) {
                return Err(existing.operation);
            }
            self.handlers.insert(method, handler);
            return Ok(());
        };
        let next = match head {
            Piece::Literal(text) => self.literal_child(text, method),
            Piece::Param => self.param.get_or_insert_with(Box::default).as_mut(),
        };
        next.insert(rest, method, handler)
    }

    /// Byte offsets at which a parameter capture entering this node may
    /// end, nearest first. A capture is never empty.
    fn param_ends(&self, rest: &str) -> Vec<usize> {
        let mut ends = Vec::new();
        for edge in &self.literals {
            let first = first_char(&edge.label);
            if let Some((i, _)) = rest.char_indices().skip(1).find(|(_, c)| Some(*c) == first)
                && !ends.contains(&i)
            {
                ends.push(i);
            }
        }
        if !self.handlers.is_empty() {
            let end = rest.find('/').unwrap_or(rest.len());
            if end > 0 && !ends.contains(&end) {
                ends.push(end);
            }
        }
        ends.sort_unstable();
        ends
    }

    fn walk<'n>(&'n self, rest: &str, method: Option<Method>, args: &mut Vec<String>) -> Option<&'n Node> {
        if let Some(method) = method
            && !self.methods_below.contains(&method)
        {
            return None;
        }
        if rest.is_empty() {
            let hit = match method {
                Some(method) => self.handlers.contains_key(&method),
                None => !self.handlers.is_empty(),
            };
            return hit.then_some(self);
        }

        for edge in &self.literals {
            if let Some(tail) = rest.strip_prefix(edge.label.as_str())
                && let Some(found) = edge.node.walk(tail, method, args)
            {
                return Some(found);
            }
        }

        let child = self.param.as_deref()?;
        for end in child.param_ends(rest) {
            args.push(rest[..end].to_string());
            if let Some(found) = child.walk(&rest[end..], method, args) {
                return Some(found);
            }
            args.pop();
        }
        None
    }

    fn collect<'n>(&'n self, out: &mut Vec<(Method, &'n Handler)>) {
        out.extend(self.handlers.iter().map(|(m, h)| (*m, h)));
        for edge in &self.literals {
            edge.node.collect(out);
        }
        if let Some(param) = &self.param {
            param.collect(out);
        }
    }
}

impl RouterPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a route. On a `(shape, method)` collision the plan is unchanged
    /// and the operation already holding the route is returned.
    pub fn insert(
        &mut self,
        template: &PathTemplate,
        method: Method,
        operation: OperationId,
    ) -> Result<(), OperationId> {
        let handler = Handler {
            operation,
            template: template.clone(),
        };
        self.root.insert(&pieces(template), method, handler)?;
        self.len += 1;
        Ok(())
    }

    pub fn find(&self, method: Method, path: &str) -> Match {
        let path = percent::normalize(path);

        let mut args = Vec::new();
        if let Some(node) = self.root.walk(&path, Some(method), &mut args)
            && let Some(handler) = node.handlers.get(&method)
        {
            let args = handler
                .template
                .params()
                .zip(args)
                .map(|(name, value)| (name.to_string(), percent::decode(&value)))
                .collect();
            return Match::Found(Route {
                operation: handler.operation,
                args,
            });
        }

        args.clear();
        let Some(node) = self.root.walk(&path, None, &mut args) else {
            return Match::NotFound;
        };
        let allow: Vec<Method> = node.handlers.keys().copied().collect();
        if method == Method::Options {
            Match::Preflight { allow }
        } else {
            Match::MethodNotAllowed { allow }
        }
    }

    /// Every route as `(method, template, operation)`, sorted by template
    /// then method.
    pub fn routes(&self) -> Vec<(Method, &PathTemplate, OperationId)> {
        let mut handlers = Vec::new();
        self.root.collect(&mut handlers);
        let mut out: Vec<_> = handlers
            .into_iter()
            .map(|(m, h)| (m, &h.template, h.operation))
            .collect();
        out.sort_by(|a, b| a.1.raw().cmp(b.1.raw()).then(a.0.cmp(&b.0)));
        out
    }
}

/// Builds a [`RouterPlan`] from operations, reporting conflicts.
///
/// Conflicts are detected as entries are added, so the report points back
/// at the earlier declaration. The plan itself is built from the entries
/// sorted by path.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    entries: Vec<RouteEntry>,
    shapes: HashMap<(String, Method), Span>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `entry` unless a route of the same shape and method exists.
    pub fn add(&mut self, entry: RouteEntry) -> Result<(), Diagnostic> {
        let shape = (entry.template.shape(), entry.method);
        if let Some(&first) = self.shapes.get(&shape) {
            let route = format!("{} {}", entry.method, shape.0);
            return Err(Diagnostic::new(DiagnosticKind::RouteConflict, entry.span)
                .message(route)
                .related_to(first, "first defined here"));
        }
        self.shapes.insert(shape, entry.span);
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(mut self) -> RouterPlan {
        self.entries.sort_by(|a, b| a.template.raw().cmp(b.template.raw()));

        let mut plan = RouterPlan::new();
        for entry in self.entries {
            if let Err(existing) = plan.insert(&entry.template, entry.method, entry.operation) {
                // `add` rejects equal shapes.
                tracing::warn!(
                    route = %entry.template,
                    existing = existing.index(),
                    "duplicate route skipped"
                );
            }
        }

        tracing::debug!(routes = plan.len(), "router built");
        plan
    }
}

//! Recursive types: indirect edges and escape checks.
//!
//! Strongly connected components of the type graph are found with Tarjan's
//! algorithm. Inside each recursive component a DFS marks back-edges
//! `indirect`; then every member must have a finite value, i.e. a way out of
//! the cycle through an optional field, a collection, a nullable wrapper or
//! another sum variant.

use indexmap::IndexSet;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{TypeId, TypeKind};

use super::arena::TypeArena;
use super::{Analyzer, Stop};

impl<'s> Analyzer<'s> {
    pub(super) fn check_recursion(&mut self) -> Result<(), Stop> {
        let graph = edges(&self.arena);
        let sccs = SccFinder::find(&graph);

        let mut recursive = 0;
        for scc in &sccs {
            let is_recursive = scc.len() > 1 || graph[scc[0].index()].contains(&scc[0]);
            if !is_recursive {
                continue;
            }
            recursive += 1;
            mark_back_edges(&mut self.arena, &graph, scc);
            if let Some(stuck) = no_escape(&self.arena, scc) {
                return Err(Stop::Failed(self.no_escape_error(stuck, scc)));
            }
        }
        tracing::debug!(types = graph.len(), recursive, "recursion checked");
        Ok(())
    }

    fn no_escape_error(&self, stuck: TypeId, scc: &[TypeId]) -> Diagnostic {
        let span_of = |id: TypeId| self.arena.slot(id).span;
        let members: Vec<TypeId> = scc.iter().copied().filter(|id| span_of(*id).is_some()).collect();
        let at = span_of(stuck)
            .or_else(|| members.first().and_then(|id| span_of(*id)))
            .unwrap_or_else(|| Span::document(self.root.id));

        let slot = self.arena.slot(stuck);
        let mut diagnostic = Diagnostic::new(DiagnosticKind::RecursionNoEscape, at).message(format!(
            "`{}` contains itself through required fields only",
            if slot.hint.is_empty() { "type" } else { slot.hint.as_str() }
        ));
        if let Some(key) = slot.origin.key() {
            diagnostic = diagnostic.at_pointer(key.pointer.clone());
        }
        for id in members {
            if id == stuck {
                continue;
            }
            if let Some(span) = span_of(id) {
                diagnostic = diagnostic.related_to(span, "part of the cycle");
            }
        }
        diagnostic
    }
}

/// Outgoing edges per type, in `TypeKind::refs` order.
fn edges(arena: &TypeArena) -> Vec<Vec<TypeId>> {
    arena
        .slots()
        .iter()
        .map(|slot| {
            slot.kind
                .as_ref()
                .map(|kind| kind.refs().into_iter().map(|r| r.id).collect())
                .unwrap_or_default()
        })
        .collect()
}

struct SccFinder<'g> {
    graph: &'g [Vec<TypeId>],
    index: usize,
    stack: Vec<TypeId>,
    on_stack: IndexSet<TypeId>,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    sccs: Vec<Vec<TypeId>>,
}

impl<'g> SccFinder<'g> {
    /// Components in reverse topological order; members sorted by id.
    fn find(graph: &'g [Vec<TypeId>]) -> Vec<Vec<TypeId>> {
        let mut finder = Self {
            graph,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: vec![None; graph.len()],
            lowlinks: vec![0; graph.len()],
            sccs: Vec::new(),
        };

        for i in 0..graph.len() {
            if finder.indices[i].is_none() {
                finder.strongconnect(TypeId(i as u32));
            }
        }

        for scc in &mut finder.sccs {
            scc.sort();
        }
        finder.sccs
    }

    fn strongconnect(&mut self, id: TypeId) {
        let v = id.index();
        self.indices[v] = Some(self.index);
        self.lowlinks[v] = self.index;
        self.index += 1;
        self.stack.push(id);
        self.on_stack.insert(id);

        let graph = self.graph;
        for &target in &graph[v] {
            let w = target.index();
            match self.indices[w] {
                None => {
                    self.strongconnect(target);
                    self.lowlinks[v] = self.lowlinks[v].min(self.lowlinks[w]);
                }
                Some(index) if self.on_stack.contains(&target) => {
                    self.lowlinks[v] = self.lowlinks[v].min(index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlinks[v]) == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.swap_remove(&w);
                scc.push(w);
                if w == id {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Mark every DFS back-edge inside `scc` as indirect. The walk starts from
/// the lowest id, so the first declared type keeps its direct edges.
fn mark_back_edges(arena: &mut TypeArena, graph: &[Vec<TypeId>], scc: &[TypeId]) {
    let mut colors = vec![Color::White; graph.len()];
    let mut back = Vec::new();
    for &root in scc {
        if colors[root.index()] == Color::White {
            visit(root, graph, scc, &mut colors, &mut back);
        }
    }
    for (from, edge) in back {
        if let Some(kind) = arena.kind_mut(from)
            && let Some(r) = kind.refs_mut().into_iter().nth(edge)
        {
            r.indirect = true;
        }
    }
}

fn visit(
    id: TypeId,
    graph: &[Vec<TypeId>],
    scc: &[TypeId],
    colors: &mut [Color],
    back: &mut Vec<(TypeId, usize)>,
) {
    colors[id.index()] = Color::Gray;
    for (edge, &target) in graph[id.index()].iter().enumerate() {
        if scc.binary_search(&target).is_err() {
            continue;
        }
        match colors[target.index()] {
            Color::White => visit(target, graph, scc, colors, back),
            Color::Gray => back.push((id, edge)),
            Color::Black => {}
        }
    }
    colors[id.index()] = Color::Black;
}

/// A member of `scc` with no finite value, if any.
fn no_escape(arena: &TypeArena, scc: &[TypeId]) -> Option<TypeId> {
    let mut finite = vec![false; scc.len()];
    let is_finite = |finite: &[bool], id: TypeId| match scc.binary_search(&id) {
        Ok(i) => finite[i],
        Err(_) => true,
    };

    loop {
        let mut changed = false;
        for (i, &id) in scc.iter().enumerate() {
            if finite[i] {
                continue;
            }
            let Some(kind) = arena.kind(id) else {
                continue;
            };
            let refs = kind.refs();
            let ok = match kind {
                TypeKind::Sum { .. } => refs.iter().any(|r| is_finite(&finite, r.id)),
                _ => refs
                    .iter()
                    .enumerate()
                    .all(|(edge, r)| kind.edge_escapes(edge) || is_finite(&finite, r.id)),
            };
            if ok {
                finite[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    scc.iter()
        .zip(&finite)
        .find(|(id, ok)| !**ok && arena.slot(**id).span.is_some())
        .or_else(|| scc.iter().zip(&finite).find(|(_, ok)| !**ok))
        .map(|(id, _)| *id)
}

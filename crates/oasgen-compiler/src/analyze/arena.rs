//! Type arena: slots addressed by `TypeId`, filled while lowering.

use std::collections::HashMap;

use crate::diagnostics::Span;
use crate::document::Location;
use crate::ir::{Origin, TypeId, TypeKind, TypeRef};
use crate::resolve::RefKey;

/// A type under construction. `kind` is `None` while the body of a nominal
/// type is still being lowered.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub kind: Option<TypeKind>,
    pub origin: Origin,
    pub hint: String,
    pub span: Option<Span>,
    pub location: Option<Location>,
    pub description: Option<String>,
}

/// Rollback point for dropping a partially analyzed operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    len: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TypeArena {
    slots: Vec<Slot>,
    by_key: HashMap<RefKey, TypeId>,
    interned: HashMap<TypeKind, TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, id: TypeId) -> &Slot {
        &self.slots[id.index()]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }

    pub fn kind(&self, id: TypeId) -> Option<&TypeKind> {
        self.slots[id.index()].kind.as_ref()
    }

    pub fn kind_mut(&mut self, id: TypeId) -> Option<&mut TypeKind> {
        self.slots[id.index()].kind.as_mut()
    }

    /// Strip `Alias` and `Generic` layers.
    pub fn underlying(&self, mut id: TypeId) -> TypeId {
        for _ in 0..self.slots.len() {
            match self.kind(id) {
                Some(TypeKind::Alias { target }) => id = target.id,
                Some(TypeKind::Generic { inner, .. }) => id = inner.id,
                _ => break,
            }
        }
        id
    }

    /// Reserve an empty nominal slot.
    pub fn reserve(&mut self, origin: Origin, hint: impl Into<String>) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(Slot {
            kind: None,
            origin,
            hint: hint.into(),
            span: None,
            location: None,
            description: None,
        });
        id
    }

    pub fn fill(&mut self, id: TypeId, kind: TypeKind) {
        self.slots[id.index()].kind = Some(kind);
    }

    pub fn describe(&mut self, id: TypeId, span: Span, location: Location, description: Option<String>) {
        let slot = &mut self.slots[id.index()];
        if slot.span.is_none() {
            slot.span = Some(span);
        }
        if slot.location.is_none() {
            slot.location = Some(location);
        }
        if slot.description.is_none() {
            slot.description = description;
        }
    }

    /// Add a finished type. Structural kinds are shared: an equal kind
    /// returns the existing slot and `hint` is dropped.
    pub fn add(&mut self, kind: TypeKind, origin: Origin, hint: impl Into<String>) -> TypeId {
        if kind.is_structural()
            && let Some(&id) = self.interned.get(&kind)
        {
            return id;
        }
        let structural = kind.is_structural();
        let id = self.reserve(origin, hint);
        if structural {
            self.interned.insert(kind.clone(), id);
        }
        self.fill(id, kind);
        id
    }

    /// Structural wrapper with normalized bits: a `Generic` never wraps
    /// another `Generic`.
    pub fn wrap(&mut self, inner: TypeId, optional: bool, nullable: bool) -> TypeId {
        if !optional && !nullable {
            return inner;
        }
        let (inner, optional, nullable) = match self.kind(inner) {
            Some(TypeKind::Generic {
                optional: o,
                nullable: n,
                inner: i,
            }) => (i.id, optional || *o, nullable || *n),
            _ => (inner, optional, nullable),
        };
        let kind = TypeKind::Generic {
            optional,
            nullable,
            inner: TypeRef::new(inner),
        };
        self.add(kind, Origin::Builtin, "")
    }

    pub fn by_key(&self, key: &RefKey) -> Option<TypeId> {
        self.by_key.get(key).copied()
    }

    pub fn bind(&mut self, key: RefKey, id: TypeId) {
        self.by_key.insert(key, id);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.slots.len(),
        }
    }

    /// Drop every slot created after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let len = checkpoint.len;
        self.slots.truncate(len);
        self.by_key.retain(|_, id| id.index() < len);
        self.interned.retain(|_, id| id.index() < len);
    }
}

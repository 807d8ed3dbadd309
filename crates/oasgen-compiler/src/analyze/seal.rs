//! Sealing: the arena is renumbered into topological order and moved,
//! together with operations and security, into the [`Ir`].

use std::collections::BTreeMap;

use crate::ir::{FeatureSet, Ir, OperationGroup, OperationId, Type, TypeId};
use crate::router::RouterPlan;

use super::arena::Slot;
use super::naming::Names;
use super::{Analyzer, Stop};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

impl<'s> Analyzer<'s> {
    pub(super) fn seal(&mut self, names: Names, router: RouterPlan) -> Result<Ir, Stop> {
        let slots = std::mem::take(&mut self.arena).into_slots();
        let order = topological_order(&slots).map_err(Stop::Internal)?;

        let mut remap = vec![TypeId(0); slots.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = TypeId(new as u32);
        }

        let mut slots: Vec<Option<Slot>> = slots.into_iter().map(Some).collect();
        let mut types = Vec::with_capacity(order.len());
        for &old in &order {
            let Some(slot) = slots[old].take() else {
                return Err(Stop::Internal(format!("type #{} ordered twice", old)));
            };
            let Some(mut kind) = slot.kind else {
                return Err(Stop::Internal(format!("type #{} was never filled", old)));
            };
            for edge in kind.refs_mut() {
                edge.id = remap[edge.id.index()];
            }
            types.push(Type {
                name: names.types[old].clone(),
                kind,
                origin: slot.origin,
                hint: (!slot.hint.is_empty()).then_some(slot.hint),
                location: slot.location,
                description: slot.description,
            });
        }

        let mut operations = std::mem::take(&mut self.operations);
        for operation in &mut operations {
            for edge in operation.refs_mut() {
                edge.id = remap[edge.id.index()];
            }
        }

        let components = std::mem::take(&mut self.components)
            .into_iter()
            .map(|(key, id)| (key, remap[id.index()]))
            .collect();

        let mut grouped: BTreeMap<String, Vec<OperationId>> = BTreeMap::new();
        for (i, operation) in operations.iter().enumerate() {
            if let Some(group) = &operation.group {
                grouped
                    .entry(group.clone())
                    .or_default()
                    .push(OperationId(i as u32));
            }
        }
        let groups = grouped
            .into_iter()
            .map(|(name, operations)| OperationGroup { name, operations })
            .collect();

        tracing::debug!(
            types = types.len(),
            operations = operations.len(),
            "IR sealed"
        );
        Ok(Ir {
            spec_version: self.version,
            types,
            operations,
            webhooks: std::mem::take(&mut self.webhooks),
            router,
            components,
            security: std::mem::take(&mut self.security),
            features: FeatureSet::new(),
            groups,
            names: names.sources,
        })
    }
}

/// Old indices in an order where every direct edge points backwards.
fn topological_order(slots: &[Slot]) -> Result<Vec<usize>, String> {
    let mut marks = vec![Mark::Unvisited; slots.len()];
    let mut order = Vec::with_capacity(slots.len());
    for i in 0..slots.len() {
        visit(i, slots, &mut marks, &mut order)?;
    }
    Ok(order)
}

fn visit(i: usize, slots: &[Slot], marks: &mut [Mark], order: &mut Vec<usize>) -> Result<(), String> {
    match marks[i] {
        Mark::Done => return Ok(()),
        Mark::Visiting => {
            return Err(format!("type #{} is on a cycle without an indirect edge", i));
        }
        Mark::Unvisited => {}
    }
    marks[i] = Mark::Visiting;
    if let Some(kind) = &slots[i].kind {
        for edge in kind.refs() {
            if !edge.indirect {
                visit(edge.id.index(), slots, marks, order)?;
            }
        }
    }
    marks[i] = Mark::Done;
    order.push(i);
    Ok(())
}

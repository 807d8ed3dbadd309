//! Final identifiers for types, constants, fields, parameters and schemes.

use std::collections::{BTreeMap, HashSet};

use oasgen_core::keywords;
use oasgen_core::utils::to_pascal_case;

use crate::ir::{Origin, Parameter, TypeId, TypeKind, TypeRef};

use super::Analyzer;

/// Hands out unique identifiers within one namespace.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    taken: HashSet<String>,
    reserved: &'static [&'static str],
}

impl NameAllocator {
    pub fn new(reserved: &'static [&'static str]) -> Self {
        Self {
            taken: HashSet::new(),
            reserved,
        }
    }

    /// Claim `base`, or the first free `base2`, `base3`, ...
    pub fn claim(&mut self, base: &str) -> String {
        let base = sanitize(base, self.reserved);
        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut counter = 2;
        loop {
            let name = format!("{}{}", base, counter);
            if self.taken.insert(name.clone()) {
                return name;
            }
            counter += 1;
        }
    }

    pub fn release(&mut self, name: &str) {
        self.taken.remove(name);
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

/// Reduce `name` to ASCII letters, digits and `_`. A leading digit gets a
/// `T` prefix; a reserved word gets a trailing `_`.
pub fn sanitize(name: &str, reserved: &[&str]) -> String {
    let mut out: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if out.is_empty() {
        out.push_str("Unnamed");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    if keywords::is_reserved(reserved, &out) {
        out.push('_');
    }
    out
}

/// Result of the naming pass.
pub(super) struct Names {
    /// Identifier per type, indexed by `TypeId`.
    pub types: Vec<String>,
    /// `url#pointer` of named source nodes to identifiers.
    pub sources: BTreeMap<String, String>,
}

impl<'s> Analyzer<'s> {
    pub(super) fn assign_names(&mut self) -> Names {
        let reserved = self.config.naming.reserved;
        let mut package = NameAllocator::new(reserved);
        let mut types = vec![String::new(); self.arena.len()];

        // Components first: they keep their declared names.
        let (components, rest): (Vec<usize>, Vec<usize>) = (0..self.arena.len())
            .partition(|&i| matches!(self.arena.slots()[i].origin, Origin::Component(_)));
        for i in components.into_iter().chain(rest) {
            let base = self.type_base_name(TypeId(i as u32), &types);
            types[i] = package.claim(&base);
        }

        for (i, name) in types.iter().enumerate() {
            let Some(TypeKind::Enum { values, .. }) = self.arena.kind_mut(TypeId(i as u32)) else {
                continue;
            };
            for value in values {
                value.name = package.claim(&format!("{}{}", name, value.name));
            }
        }

        let fields_case = self.config.naming.fields;
        for i in 0..types.len() {
            let kind = self.arena.kind_mut(TypeId(i as u32));
            match kind {
                Some(TypeKind::Struct { fields, .. }) => {
                    let mut scope = NameAllocator::new(reserved);
                    for field in fields {
                        field.target_name = scope.claim(&fields_case.apply(&field.name));
                    }
                }
                Some(TypeKind::Sum { variants, .. }) => {
                    let mut scope = NameAllocator::new(reserved);
                    for variant in variants {
                        let base = match &variant.content_type {
                            Some(media) => to_pascal_case(media),
                            None => types[variant.ty.id.index()].clone(),
                        };
                        variant.name = scope.claim(&base);
                    }
                }
                _ => {}
            }
        }

        for operation in &mut self.operations {
            let mut scope = NameAllocator::new(reserved);
            name_params(&mut operation.params, &mut scope, |p| fields_case.apply(p));
            for response in operation.responses.values_mut() {
                let mut scope = NameAllocator::new(reserved);
                name_params(&mut response.headers, &mut scope, |p| fields_case.apply(p));
            }
        }

        let mut schemes = NameAllocator::new(reserved);
        for scheme in &mut self.security.schemes {
            scheme.name = schemes.claim(&self.config.naming.types.apply(&scheme.key));
        }

        let mut sources = BTreeMap::new();
        for (slot, name) in self.arena.slots().iter().zip(&types) {
            if let Some(key) = slot.origin.key() {
                sources.entry(key.to_string()).or_insert_with(|| name.clone());
            }
        }
        for operation in &self.operations {
            let location = &operation.location;
            sources.insert(
                format!("{}#{}", location.url, location.pointer),
                operation.name.clone(),
            );
        }

        tracing::debug!(types = types.len(), "names assigned");
        Names { types, sources }
    }

    /// Preferred name of a type: structural kinds are named after their
    /// parts, nominal ones after their hint.
    fn type_base_name(&self, id: TypeId, names: &[String]) -> String {
        let slot = &self.arena.slots()[id.index()];
        let case = self.config.naming.types;
        let named = |r: &TypeRef| names[r.id.index()].clone();
        let hinted = || {
            if slot.hint.is_empty() {
                None
            } else {
                Some(case.apply(&slot.hint))
            }
        };

        let Some(kind) = &slot.kind else {
            return "Type".to_string();
        };
        match kind {
            TypeKind::Primitive {
                kind,
                format,
                validation,
            } => match hinted() {
                Some(hint) if !validation.is_empty() => hint,
                _ => format
                    .as_ref()
                    .map(|f| f.type_name())
                    .unwrap_or_else(|| kind.name().to_string()),
            },
            TypeKind::Array { element, .. } => format!("{}Array", named(element)),
            TypeKind::Tuple { elements } => hinted().unwrap_or_else(|| {
                let parts: String = elements.iter().map(named).collect();
                format!("{}Tuple", parts)
            }),
            TypeKind::Map {
                props: None,
                value,
                patterns,
                ..
            } => {
                let value = value.as_ref().or_else(|| patterns.first().map(|p| &p.value));
                match value {
                    Some(value) => format!("{}Map", named(value)),
                    None => "AnyMap".to_string(),
                }
            }
            TypeKind::Generic {
                optional,
                nullable,
                inner,
            } => {
                let prefix = match (*optional, *nullable) {
                    (true, true) => "OptNil",
                    (true, false) => "Opt",
                    (false, true) => "Nil",
                    (false, false) => "",
                };
                format!("{}{}", prefix, named(inner))
            }
            TypeKind::Any => "Any".to_string(),
            TypeKind::Stream => "Stream".to_string(),
            other => hinted().unwrap_or_else(|| to_pascal_case(other.name())),
        }
    }
}

fn name_params(params: &mut [Parameter], scope: &mut NameAllocator, case: impl Fn(&str) -> String) {
    for param in params {
        let base = if param.target_name.is_empty() {
            case(&param.name)
        } else {
            param.target_name.clone()
        };
        param.target_name = scope.claim(&base);
    }
}

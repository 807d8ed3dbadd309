//! The sealed IR handed to emitters.
//!
//! Everything here owns its data: once [`Ir`] is built the document store
//! can be dropped. Emitters read the IR and never mutate it.

mod classifier;
pub mod dump;
mod features;
mod literal;
mod media;
mod operation;
mod security;
mod status;
mod types;

#[cfg(test)]
mod classifier_tests;

use std::collections::BTreeMap;

pub use classifier::{ClassifierError, KeyClass, KeyClassifier};
pub use features::{Feature, FeatureSet};
pub use literal::{JsonType, Literal, Number};
pub use media::{ContentKind, MediaRange, MediaRangeError, best_match};
pub use operation::{
    BodyShape, Content, Encoding, Method, Operation, OperationGroup, OperationId, Parameter,
    ParameterContent, ParameterIn, ParameterStyle, RequestBody, Response, Webhook,
};
pub use security::{
    ApiKeyIn, FlowKind, OAuthFlow, SchemeKind, SchemeUse, SecurityModel, SecurityRequirement,
    SecurityScheme,
};
pub use status::StatusPattern;
pub use types::{
    Bound, Discriminator, EnumValue, Field, Format, KeyConstraints, Origin, PatternProperty,
    PrimitiveKind, Type, TypeId, TypeKind, TypeRef, Validation, Variant,
};

use crate::resolve::RefKey;
use crate::router::{Match, RouterPlan};

/// `openapi` version of the root document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SpecVersion {
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.split(['-', '+']).next()?.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// 3.1 and later: JSON Schema 2020-12 dialect.
    pub fn is_31(self) -> bool {
        self.major == 3 && self.minor >= 1
    }
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone)]
pub struct Ir {
    pub spec_version: SpecVersion,
    /// Topologically ordered: a type's non-indirect edges point to
    /// earlier entries.
    pub types: Vec<Type>,
    pub operations: Vec<Operation>,
    pub webhooks: Vec<Webhook>,
    pub router: RouterPlan,
    pub components: BTreeMap<RefKey, TypeId>,
    pub security: SecurityModel,
    pub features: FeatureSet,
    pub groups: Vec<OperationGroup>,
    /// `url#pointer` of every named source node to its identifier.
    pub names: BTreeMap<String, String>,
}

impl Ir {
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn type_id_by_name(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(|i| TypeId(i as u32))
    }

    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.index()]
    }

    pub fn operation_by_name(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|o| o.name == name)
    }

    /// Component type by the pointer it was declared at, e.g.
    /// `/components/schemas/Pet`.
    pub fn component(&self, pointer: &str) -> Option<&Type> {
        self.components
            .iter()
            .find(|(key, _)| key.pointer == pointer)
            .map(|(_, id)| self.ty(*id))
    }

    /// Strip `Alias` layers.
    pub fn resolve_alias(&self, mut id: TypeId) -> TypeId {
        let mut steps = 0;
        while let TypeKind::Alias { target } = &self.ty(id).kind {
            id = target.id;
            steps += 1;
            if steps > self.types.len() {
                break;
            }
        }
        id
    }

    pub fn find_route(&self, method: Method, path: &str) -> Match {
        self.router.find(method, path)
    }

    /// Key classifier of a map type. `None` for other kinds.
    pub fn key_classifier(&self, id: TypeId) -> Option<Result<KeyClassifier, ClassifierError>> {
        let TypeKind::Map {
            value,
            patterns,
            props,
            closed,
            ..
        } = &self.ty(id).kind
        else {
            return None;
        };

        let props = props
            .map(|p| match &self.ty(self.resolve_alias(p.id)).kind {
                TypeKind::Struct { fields, .. } => fields.iter().map(|f| f.name.clone()).collect(),
                _ => Vec::new(),
            })
            .unwrap_or_default();
        let patterns: Vec<String> = patterns.iter().map(|p| p.pattern.clone()).collect();
        Some(KeyClassifier::new(props, &patterns, value.is_some(), *closed))
    }

    pub fn dump(&self) -> String {
        dump::dump(self)
    }
}

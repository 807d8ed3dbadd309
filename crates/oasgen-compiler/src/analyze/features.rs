//! The runtime feature vector of a sealed IR.

use crate::ir::{ContentKind, Discriminator, Feature, FeatureSet, Format, Ir, TypeKind};

/// Walk the sealed IR and record which runtime features it needs.
pub(crate) fn collect(ir: &Ir) -> FeatureSet {
    let mut set = FeatureSet::new();

    for ty in &ir.types {
        match &ty.kind {
            TypeKind::Primitive {
                format, validation, ..
            } => {
                if let Some(format) = format {
                    set.insert_format(format.as_str());
                    if matches!(format, Format::Custom(_)) {
                        set.insert(Feature::CustomFormats);
                    }
                }
                if !validation.is_empty() {
                    set.insert(Feature::Validation);
                }
            }
            TypeKind::Array {
                min_items,
                max_items,
                unique,
                ..
            } => {
                if min_items.is_some() || max_items.is_some() || *unique {
                    set.insert(Feature::Validation);
                }
            }
            TypeKind::Map { patterns, key, .. } => {
                if !patterns.is_empty() {
                    set.insert(Feature::PatternedMaps);
                }
                if !key.is_empty() {
                    set.insert(Feature::Validation);
                }
            }
            TypeKind::Struct { fields, .. } => {
                if fields.iter().any(|f| f.default.is_some()) {
                    set.insert(Feature::Defaults);
                }
            }
            TypeKind::Sum { discriminator, .. } => {
                if *discriminator != Discriminator::ByContentType {
                    set.insert(Feature::DiscriminatedSums);
                }
            }
            TypeKind::Tuple { .. } => set.insert(Feature::Tuples),
            TypeKind::Any => set.insert(Feature::AnyValues),
            TypeKind::Stream => set.insert(Feature::BinaryStreams),
            TypeKind::Enum { .. } | TypeKind::Alias { .. } | TypeKind::Generic { .. } => {}
        }
    }

    for operation in &ir.operations {
        let bodies = operation.request_body.iter().flat_map(|b| &b.contents);
        let responses = operation.responses.values().flat_map(|r| &r.contents);
        for content in bodies.chain(responses) {
            match content.kind {
                ContentKind::Multipart => set.insert(Feature::Multipart),
                ContentKind::FormUrlEncoded => set.insert(Feature::FormUrlEncoded),
                ContentKind::JsonStream => set.insert(Feature::StreamingJson),
                _ => {}
            }
        }
        if operation.security.iter().any(|r| !r.schemes.is_empty()) {
            set.insert(Feature::Security);
        }
    }

    if !ir.webhooks.is_empty() {
        set.insert(Feature::Webhooks);
    }
    if !ir.groups.is_empty() {
        set.insert(Feature::OperationGroups);
    }

    tracing::debug!(
        features = set.iter().count(),
        formats = set.formats().count(),
        "features collected"
    );
    set
}

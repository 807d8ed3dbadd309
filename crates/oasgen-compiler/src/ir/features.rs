//! Runtime features used by a compiled API.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Multipart,
    FormUrlEncoded,
    StreamingJson,
    BinaryStreams,
    CustomFormats,
    Security,
    Webhooks,
    DiscriminatedSums,
    PatternedMaps,
    Tuples,
    AnyValues,
    Defaults,
    Validation,
    OperationGroups,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Multipart => "multipart",
            Feature::FormUrlEncoded => "form-urlencoded",
            Feature::StreamingJson => "streaming-json",
            Feature::BinaryStreams => "binary-streams",
            Feature::CustomFormats => "custom-formats",
            Feature::Security => "security",
            Feature::Webhooks => "webhooks",
            Feature::DiscriminatedSums => "discriminated-sums",
            Feature::PatternedMaps => "patterned-maps",
            Feature::Tuples => "tuples",
            Feature::AnyValues => "any-values",
            Feature::Defaults => "defaults",
            Feature::Validation => "validation",
            Feature::OperationGroups => "operation-groups",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered feature flags plus the formats in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    features: BTreeSet<Feature>,
    formats: BTreeSet<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: Feature) {
        self.features.insert(feature);
    }

    pub fn insert_format(&mut self, format: impl Into<String>) {
        self.formats.insert(format.into());
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().map(String::as_str)
    }

    pub fn has_multipart(&self) -> bool {
        self.has(Feature::Multipart)
    }

    pub fn has_streaming_json(&self) -> bool {
        self.has(Feature::StreamingJson)
    }

    pub fn has_custom_formats(&self) -> bool {
        self.has(Feature::CustomFormats)
    }

    pub fn has_security(&self) -> bool {
        self.has(Feature::Security)
    }

    pub fn has_webhooks(&self) -> bool {
        self.has(Feature::Webhooks)
    }

    pub fn has_discriminated_sums(&self) -> bool {
        self.has(Feature::DiscriminatedSums)
    }

    pub fn has_patterned_maps(&self) -> bool {
        self.has(Feature::PatternedMaps)
    }
}

use url::Url;

use crate::document::{pointer, without_fragment};
use crate::router::percent;

/// Canonical identity of anything reachable through `$ref`: an absolute
/// document URL without fragment, and an RFC 6901 pointer into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefKey {
    pub url: Url,
    pub pointer: String,
}

/// Why a `$ref` string is not a usable key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefKeyError {
    #[error("cannot resolve `{reference}` against `{base}`: {message}")]
    Url {
        reference: String,
        base: String,
        message: String,
    },
    #[error("fragment `{0}` is not a JSON pointer")]
    NotPointer(String),
    #[error(transparent)]
    Pointer(#[from] pointer::PointerError),
}

impl RefKey {
    pub fn new(url: &Url, pointer: impl Into<String>) -> Self {
        Self {
            url: without_fragment(url),
            pointer: pointer.into(),
        }
    }

    /// Resolve a `$ref` string against the URL of the document holding it.
    pub fn parse(reference: &str, base: &Url) -> Result<Self, RefKeyError> {
        let target = base.join(reference).map_err(|e| RefKeyError::Url {
            reference: reference.to_string(),
            base: base.to_string(),
            message: e.to_string(),
        })?;

        let fragment = percent::decode(target.fragment().unwrap_or_default());
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(RefKeyError::NotPointer(fragment));
        }
        pointer::parse(&fragment)?;
        Ok(Self::new(&target, fragment))
    }

    /// Key of a child node.
    pub fn child(&self, token: &str) -> Self {
        Self {
            url: self.url.clone(),
            pointer: pointer::join(&self.pointer, token),
        }
    }

    /// Last pointer token, e.g. `Pet` for `#/components/schemas/Pet`.
    pub fn name(&self) -> String {
        pointer::last_token(&self.pointer)
    }

    /// Whether the key names an entry of `components.<section>`.
    pub fn is_component(&self, section: &str) -> bool {
        pointer::parse(&self.pointer)
            .is_ok_and(|tokens| tokens.len() == 3 && tokens[0] == "components" && tokens[1] == section)
    }
}

impl std::fmt::Display for RefKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.url, self.pointer)
    }
}

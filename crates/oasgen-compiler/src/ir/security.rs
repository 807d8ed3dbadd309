//! Security schemes and requirements.

use std::collections::BTreeMap;

use crate::document::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyIn {
    Query,
    Header,
    Cookie,
}

impl ApiKeyIn {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "query" => ApiKeyIn::Query,
            "header" => ApiKeyIn::Header,
            "cookie" => ApiKeyIn::Cookie,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiKeyIn::Query => "query",
            ApiKeyIn::Header => "header",
            ApiKeyIn::Cookie => "cookie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlowKind {
    Implicit,
    Password,
    ClientCredentials,
    AuthorizationCode,
}

impl FlowKind {
    pub const ALL: [(&'static str, FlowKind); 4] = [
        ("implicit", FlowKind::Implicit),
        ("password", FlowKind::Password),
        ("clientCredentials", FlowKind::ClientCredentials),
        ("authorizationCode", FlowKind::AuthorizationCode),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Implicit => "implicit",
            FlowKind::Password => "password",
            FlowKind::ClientCredentials => "clientCredentials",
            FlowKind::AuthorizationCode => "authorizationCode",
        }
    }

    pub fn needs_authorization_url(self) -> bool {
        matches!(self, FlowKind::Implicit | FlowKind::AuthorizationCode)
    }

    pub fn needs_token_url(self) -> bool {
        !matches!(self, FlowKind::Implicit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthFlow {
    pub kind: FlowKind,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    pub scopes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeKind {
    ApiKey { name: String, in_: ApiKeyIn },
    Http { scheme: String, bearer_format: Option<String> },
    OAuth2 { flows: Vec<OAuthFlow> },
    OpenIdConnect { url: String },
    MutualTls,
}

impl SchemeKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemeKind::ApiKey { .. } => "apiKey",
            SchemeKind::Http { .. } => "http",
            SchemeKind::OAuth2 { .. } => "oauth2",
            SchemeKind::OpenIdConnect { .. } => "openIdConnect",
            SchemeKind::MutualTls => "mutualTLS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    /// Key under `components.securitySchemes`.
    pub key: String,
    pub name: String,
    pub kind: SchemeKind,
    pub description: Option<String>,
    pub location: Location,
}

/// One alternative of a `security` list: every entry must be satisfied.
/// An empty requirement allows anonymous access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub schemes: Vec<SchemeUse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeUse {
    pub scheme: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityModel {
    pub schemes: Vec<SecurityScheme>,
    /// Top-level `security`, applied to operations that do not override it.
    pub default: Vec<SecurityRequirement>,
}

impl SecurityModel {
    pub fn scheme(&self, key: &str) -> Option<&SecurityScheme> {
        self.schemes.iter().find(|s| s.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

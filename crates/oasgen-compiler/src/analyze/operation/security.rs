//! Security schemes and requirements.

use std::collections::BTreeMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::{
    ApiKeyIn, FlowKind, OAuthFlow, SchemeKind, SchemeUse, SecurityRequirement, SecurityScheme,
};

use super::super::cursor::Cursor;
use super::super::{Analyzer, Stop};

impl<'s> Analyzer<'s> {
    /// `components.securitySchemes` and the top-level `security` list.
    pub(in crate::analyze) fn security_schemes(&mut self, root: &Cursor<'s>) -> Result<(), Stop> {
        let schemes = root
            .get("components")
            .and_then(|c| c.get("securitySchemes"));
        for (key, _, entry) in schemes.iter().flat_map(|s| s.members()) {
            let scheme = self.security_scheme(key, &entry);
            if let Some(scheme) = self.recover(scheme, key)? {
                self.security.schemes.push(scheme);
            }
        }

        if let Some(list) = root.get("security") {
            let requirements = self.requirements_of(&list);
            if let Some(requirements) = self.recover(requirements, "security")? {
                self.security.default = requirements;
            }
        }
        tracing::debug!(
            schemes = self.security.schemes.len(),
            default = self.security.default.len(),
            "security analyzed"
        );
        Ok(())
    }

    fn security_scheme(&self, key: &str, entry: &Cursor<'s>) -> Result<SecurityScheme, Diagnostic> {
        let entry = self.follow(entry)?;
        entry.object("security scheme")?;
        let owner = "security scheme";

        let kind = match entry.required_str("type", owner)? {
            "apiKey" => {
                let name = entry.required_str("name", owner)?;
                let raw_in = entry.required_str("in", owner)?;
                let Some(in_) = ApiKeyIn::parse(raw_in) else {
                    return Err(entry.invalid(&format!("unknown API key location `{}`", raw_in)));
                };
                SchemeKind::ApiKey {
                    name: name.to_string(),
                    in_,
                }
            }
            "http" => SchemeKind::Http {
                scheme: entry.required_str("scheme", owner)?.to_ascii_lowercase(),
                bearer_format: entry.str_field("bearerFormat")?.map(String::from),
            },
            "oauth2" => SchemeKind::OAuth2 {
                flows: oauth_flows(&entry)?,
            },
            "openIdConnect" => SchemeKind::OpenIdConnect {
                url: entry.required_str("openIdConnectUrl", owner)?.to_string(),
            },
            "mutualTLS" if self.version.is_31() => SchemeKind::MutualTls,
            "mutualTLS" => return Err(entry.invalid("`mutualTLS` requires OpenAPI 3.1")),
            other => {
                return Err(entry.invalid(&format!("unknown security scheme type `{}`", other)));
            }
        };

        Ok(SecurityScheme {
            key: key.to_string(),
            name: String::new(),
            kind,
            description: entry.str_field("description")?.map(String::from),
            location: self.location(entry.span(), &entry.key),
        })
    }

    /// The operation's own `security`, or the document default. An empty
    /// list clears the default.
    pub(super) fn requirements(&self, op: &Cursor<'s>) -> Result<Vec<SecurityRequirement>, Diagnostic> {
        match op.get("security") {
            Some(list) => self.requirements_of(&list),
            None => Ok(self.security.default.clone()),
        }
    }

    fn requirements_of(&self, list: &Cursor<'s>) -> Result<Vec<SecurityRequirement>, Diagnostic> {
        list.array("`security`")?;
        let mut requirements = Vec::new();
        for item in list.items() {
            item.object("security requirement")?;
            let mut schemes = Vec::new();
            for (name, key_span, scopes) in item.members() {
                if self.security.scheme(name).is_none() {
                    return Err(Diagnostic::new(DiagnosticKind::UnknownSecurityScheme, key_span)
                        .message(name)
                        .at_pointer(scopes.key.pointer.clone()));
                }
                scopes.array("scopes")?;
                let scopes = scopes
                    .items()
                    .iter()
                    .map(|s| s.as_str("scope").map(String::from))
                    .collect::<Result<Vec<_>, _>>()?;
                schemes.push(SchemeUse {
                    scheme: name.to_string(),
                    scopes,
                });
            }
            requirements.push(SecurityRequirement { schemes });
        }
        Ok(requirements)
    }
}

fn oauth_flows(entry: &Cursor<'_>) -> Result<Vec<OAuthFlow>, Diagnostic> {
    let Some(flows) = entry.get("flows") else {
        return Err(entry.invalid("oauth2 security scheme requires `flows`"));
    };
    flows.object("`flows`")?;

    let mut out = Vec::new();
    for (name, kind) in FlowKind::ALL {
        let Some(flow) = flows.get(name) else {
            continue;
        };
        flow.object("OAuth flow")?;
        let owner = format!("`{}` flow", name);
        let authorization_url = if kind.needs_authorization_url() {
            Some(flow.required_str("authorizationUrl", &owner)?)
        } else {
            flow.str_field("authorizationUrl")?
        };
        let token_url = if kind.needs_token_url() {
            Some(flow.required_str("tokenUrl", &owner)?)
        } else {
            flow.str_field("tokenUrl")?
        };

        let mut scopes = BTreeMap::new();
        if let Some(map) = flow.get("scopes") {
            map.object("`scopes`")?;
            for (scope, _, description) in map.members() {
                scopes.insert(scope.to_string(), description.as_str("scope description")?.to_string());
            }
        }

        out.push(OAuthFlow {
            kind,
            authorization_url: authorization_url.map(String::from),
            token_url: token_url.map(String::from),
            refresh_url: flow.str_field("refreshUrl")?.map(String::from),
            scopes,
        });
    }

    if out.is_empty() {
        return Err(flows.invalid("oauth2 security scheme declares no flows"));
    }
    Ok(out)
}

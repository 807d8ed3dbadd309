//! RFC 6901 JSON pointers.

use super::node::{Node, Value};

/// Why a pointer failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("pointer `{0}` must be empty or start with `/`")]
    Syntax(String),
    #[error("invalid escape in pointer token `{0}`")]
    Escape(String),
    #[error("no member `{token}` at `{at}`")]
    Missing { at: String, token: String },
}

/// Escape one reference token (`~` → `~0`, `/` → `~1`).
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

pub fn unescape(token: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::Escape(token.to_string())),
        }
    }
    Ok(out)
}

/// Append an unescaped token to a pointer.
pub fn join(pointer: &str, token: &str) -> String {
    format!("{}/{}", pointer, escape(token))
}

/// Split a pointer into unescaped tokens.
pub fn parse(pointer: &str) -> Result<Vec<String>, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PointerError::Syntax(pointer.to_string()));
    };
    rest.split('/').map(unescape).collect()
}

/// Walk `pointer` from `root`.
pub fn lookup<'n>(root: &'n Node, pointer: &str) -> Result<&'n Node, PointerError> {
    let mut node = root;
    let mut at = String::new();
    for token in parse(pointer)? {
        let next = match &node.value {
            Value::Object(o) => o.get(&token),
            Value::Array(items) => token
                .parse::<usize>()
                .ok()
                .filter(|_| token == "0" || !token.starts_with('0'))
                .and_then(|i| items.get(i)),
            _ => None,
        };
        let Some(next) = next else {
            return Err(PointerError::Missing {
                at: if at.is_empty() { "/".to_string() } else { at },
                token,
            });
        };
        at = join(&at, &token);
        node = next;
    }
    Ok(node)
}

/// Last token of a pointer, unescaped. Empty for the root pointer.
pub fn last_token(pointer: &str) -> String {
    match pointer.rfind('/') {
        Some(i) => unescape(&pointer[i + 1..]).unwrap_or_else(|_| pointer[i + 1..].to_string()),
        None => String::new(),
    }
}

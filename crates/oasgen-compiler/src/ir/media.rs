//! Media ranges and content-type negotiation.

/// A content-type pattern such as `application/json`, `image/*` or
/// `text/plain; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRange {
    pub raw: String,
    pub kind: String,
    pub subtype: String,
    /// Parameters with lowercase names, sorted by name.
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid media type `{0}`")]
pub struct MediaRangeError(pub String);

impl MediaRange {
    pub fn parse(raw: &str) -> Result<Self, MediaRangeError> {
        let mut parts = raw.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return Err(MediaRangeError(raw.to_string()));
        };
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return Err(MediaRangeError(raw.to_string()));
        }

        let mut params = Vec::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((name, value)) = param.split_once('=') else {
                return Err(MediaRangeError(raw.to_string()));
            };
            params.push((
                name.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_string(),
            ));
        }
        params.sort();

        Ok(Self {
            raw: raw.to_string(),
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    /// `*/*` is 0, `type/*` is 1, `type/subtype` is 2, with parameters 3.
    pub fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ if self.params.is_empty() => 2,
            _ => 3,
        }
    }

    pub fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    /// Normalized form; two ranges overlap when their keys are equal.
    pub fn key(&self) -> String {
        let mut key = self.essence();
        for (name, value) in &self.params {
            key.push_str(&format!(";{}={}", name, value));
        }
        key
    }

    /// Whether a concrete media type falls under this range.
    pub fn matches(&self, media: &MediaRange) -> bool {
        if self.kind != "*" && self.kind != media.kind {
            return false;
        }
        if self.subtype != "*" && self.subtype != media.subtype {
            return false;
        }
        self.params
            .iter()
            .all(|p| media.params.iter().any(|q| q == p))
    }

    pub fn classify(&self) -> ContentKind {
        let essence = self.essence();
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("application", "x-ndjson" | "json-seq" | "jsonl" | "stream+json" | "x-jsonlines") => {
                ContentKind::JsonStream
            }
            ("application", "json") => ContentKind::Json,
            (_, sub) if sub.ends_with("+json") => ContentKind::Json,
            ("application", "x-www-form-urlencoded") => ContentKind::FormUrlEncoded,
            ("multipart", _) => ContentKind::Multipart,
            ("text", "plain") => ContentKind::TextPlain,
            _ if essence == "text/html" => ContentKind::TextPlain,
            _ => ContentKind::Binary,
        }
    }
}

impl std::fmt::Display for MediaRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Encoding family of a content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKind {
    Json,
    /// Newline-delimited JSON or JSON text sequences.
    JsonStream,
    FormUrlEncoded,
    Multipart,
    TextPlain,
    Binary,
}

impl ContentKind {
    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::JsonStream => "json-stream",
            ContentKind::FormUrlEncoded => "form",
            ContentKind::Multipart => "multipart",
            ContentKind::TextPlain => "text",
            ContentKind::Binary => "binary",
        }
    }
}

/// Index of the best range for `media` among `ranges`: most specific first,
/// declaration order on ties.
pub fn best_match<'r>(
    ranges: impl IntoIterator<Item = &'r MediaRange>,
    media: &MediaRange,
) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (i, range) in ranges.into_iter().enumerate() {
        if !range.matches(media) {
            continue;
        }
        let specificity = range.specificity();
        if best.is_none_or(|(_, s)| specificity > s) {
            best = Some((i, specificity));
        }
    }
    best.map(|(i, _)| i)
}

//! Path templates: `/pets/{petId}/toys`.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("path must start with `/`")]
    NoLeadingSlash,
    #[error("unclosed `{{` at byte {0}")]
    Unclosed(usize),
    #[error("unexpected `}}` at byte {0}")]
    Unopened(usize),
    #[error("empty parameter name at byte {0}")]
    EmptyParam(usize),
    #[error("parameter `{0}` appears twice")]
    DuplicateParam(String),
    #[error("parameters `{0}` and `{1}` are adjacent")]
    AdjacentParams(String, String),
}

/// A parsed path template.
///
/// Literal segments keep their bytes; parameters keep their names. Two
/// templates with the same [`shape`](PathTemplate::shape) are the same route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if !raw.starts_with('/') {
            return Err(TemplateError::NoLeadingSlash);
        }

        let mut segments: Vec<Segment> = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::Unclosed(i)),
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(i));
                    }
                    if name.is_empty() {
                        return Err(TemplateError::EmptyParam(i));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    } else if let Some(Segment::Param(prev)) = segments.last() {
                        return Err(TemplateError::AdjacentParams(prev.clone(), name));
                    }
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(p) if *p == name));
                    if duplicate {
                        return Err(TemplateError::DuplicateParam(name));
                    }
                    segments.push(Segment::Param(name));
                }
                '}' => return Err(TemplateError::Unopened(i)),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params().any(|p| p == name)
    }

    /// The template with parameter names erased: `/pets/{}`.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Param(_) => out.push_str("{}"),
            }
        }
        out
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

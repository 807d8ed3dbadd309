//! YAML front end.
//!
//! `serde_yaml` does the parsing; it does not expose node positions, so a
//! [`Locator`] walks the source lines alongside the parsed value and
//! recovers the range of every block mapping key and sequence item. Flow
//! collections and alias expansions inherit the range of the key that holds
//! them. Recovery never fails: when the text cannot be matched the parent's
//! range is used.

use rowan::{TextRange, TextSize};
use serde_yaml::Value as YamlValue;

use super::node::{Node, Object, Value};
use super::source_map::SourceId;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};

pub fn parse_yaml(source: &str, id: SourceId) -> Result<Node, Diagnostic> {
    let value: YamlValue = serde_yaml::from_str(source).map_err(|e| {
        let offset = e
            .location()
            .map(|l| TextSize::from(l.index().min(source.len()) as u32))
            .unwrap_or_default();
        let message = e.to_string();
        let message = match message.find(" at line ") {
            Some(cut) => message[..cut].to_string(),
            None => message,
        };
        Diagnostic::new(DiagnosticKind::YamlSyntax, Span::new(id, TextRange::empty(offset)))
            .message(message)
    })?;

    let locator = Locator::new(source, id);
    let root = TextRange::up_to(TextSize::of(source));
    let shape = Shape::of_root(source);
    locator.convert(&value, root, shape)
}

/// How a collection is laid out in the text.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Block collection whose entries start at or after this line and column.
    Block { line: usize, col: usize },
    /// Flow collection, alias or anything the locator cannot follow.
    Opaque,
}

impl Shape {
    fn of_root(source: &str) -> Self {
        let first = source
            .lines()
            .map(str::trim_start)
            .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("---"));
        match first {
            Some(l) if l.starts_with('{') || l.starts_with('[') => Shape::Opaque,
            _ => Shape::Block { line: 0, col: 0 },
        }
    }
}

struct Line<'s> {
    start: usize,
    text: &'s str,
}

struct Locator<'s> {
    lines: Vec<Line<'s>>,
    id: SourceId,
}

impl<'s> Locator<'s> {
    fn new(source: &'s str, id: SourceId) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for text in source.split('\n') {
            lines.push(Line {
                start,
                text: text.strip_suffix('\r').unwrap_or(text),
            });
            start += text.len() + 1;
        }
        Self { lines, id }
    }

    fn range(&self, line: usize, col: usize, len: usize) -> TextRange {
        let start = self.lines[line].start + col;
        TextRange::at(TextSize::from(start as u32), TextSize::from(len as u32))
    }

    /// Range from `col` to the end of the line's content, comments excluded.
    fn rest_of_line(&self, line: usize, col: usize) -> TextRange {
        let text = self.lines[line].text;
        let content = strip_comment(&text[col.min(text.len())..]).trim_end();
        self.range(line, col, content.len().max(1))
    }

    fn convert(&self, value: &YamlValue, range: TextRange, shape: Shape) -> Result<Node, Diagnostic> {
        let value = match value {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(*b),
            YamlValue::Number(n) => number(n),
            YamlValue::String(s) => Value::String(s.clone()),
            YamlValue::Tagged(tagged) => return self.convert(&tagged.value, range, shape),
            YamlValue::Sequence(items) => Value::Array(self.sequence(items, range, shape)?),
            YamlValue::Mapping(map) => Value::Object(self.mapping(map, range, shape)?),
        };
        Ok(Node::new(range, value))
    }

    fn mapping(
        &self,
        map: &serde_yaml::Mapping,
        parent: TextRange,
        shape: Shape,
    ) -> Result<Object, Diagnostic> {
        let mut object = Object::new();
        let mut cursor = match shape {
            Shape::Block { line, col } => Some((line, col)),
            Shape::Opaque => None,
        };
        let mut column: Option<usize> = None;

        for (key, value) in map {
            let key = self.key_string(key, parent)?;
            let found = cursor.and_then(|(line, col)| self.find_key(&key, line, col, column));

            let (key_range, child_range, child_shape) = match found {
                Some((line, col, len)) => {
                    column = Some(col);
                    cursor = Some((line + 1, 0));
                    let key_range = self.range(line, col, len);
                    let after = col + len;
                    let (child_range, child_shape) = self.value_layout(line, after, key_range);
                    (key_range, child_range, child_shape)
                }
                None => (parent, parent, Shape::Opaque),
            };

            let node = self.convert(value, child_range, child_shape)?;
            if let Some(previous) = object.insert(key.clone(), key_range, node) {
                return Err(Diagnostic::new(
                    DiagnosticKind::DuplicateKey,
                    Span::new(self.id, key_range),
                )
                .message(&key)
                .related_to(Span::new(self.id, previous), "first defined here"));
            }
        }
        Ok(object)
    }

    fn sequence(
        &self,
        items: &[YamlValue],
        parent: TextRange,
        shape: Shape,
    ) -> Result<Vec<Node>, Diagnostic> {
        let mut cursor = match shape {
            Shape::Block { line, col } => Some((line, col)),
            Shape::Opaque => None,
        };
        let mut column: Option<usize> = None;
        let mut out = Vec::with_capacity(items.len());

        for item in items {
            let found = cursor.and_then(|(line, col)| self.find_dash(line, col, column));
            let (range, item_shape) = match found {
                Some((line, col)) => {
                    column = Some(col);
                    cursor = Some((line + 1, 0));
                    let range = self.rest_of_line(line, col);
                    let rest = strip_comment(&self.lines[line].text[col + 1..]).trim();
                    let item_shape = if is_opaque_start(rest) {
                        Shape::Opaque
                    } else {
                        Shape::Block { line, col: col + 1 }
                    };
                    (range, item_shape)
                }
                None => (parent, Shape::Opaque),
            };
            out.push(self.convert(item, range, item_shape)?);
        }
        Ok(out)
    }

    /// Layout of the value that follows a key ending at `after`.
    fn value_layout(&self, line: usize, after: usize, key_range: TextRange) -> (TextRange, Shape) {
        let text = self.lines[line].text;
        let rest = &text[after.min(text.len())..];
        let colon = rest.find(':').map(|i| i + 1).unwrap_or(rest.len());
        let inline = strip_comment(&rest[colon..]).trim();

        if inline.is_empty() || inline.starts_with('|') || inline.starts_with('>') {
            return (key_range, Shape::Block { line: line + 1, col: 0 });
        }
        if is_opaque_start(inline) {
            return (key_range, Shape::Opaque);
        }
        // Inline scalar, or an anchored block collection on following lines.
        let range = key_range.cover(self.rest_of_line(line, after));
        if inline.starts_with('&') && !inline.contains(' ') {
            return (range, Shape::Block { line: line + 1, col: 0 });
        }
        (range, Shape::Block { line, col: after })
    }

    fn key_string(&self, key: &YamlValue, parent: TextRange) -> Result<String, Diagnostic> {
        match key {
            YamlValue::String(s) => Ok(s.clone()),
            YamlValue::Number(n) => Ok(n.to_string()),
            YamlValue::Bool(b) => Ok(b.to_string()),
            YamlValue::Null => Ok("null".to_string()),
            YamlValue::Tagged(tagged) => self.key_string(&tagged.value, parent),
            YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Diagnostic::new(
                DiagnosticKind::YamlSyntax,
                Span::new(self.id, parent),
            )
            .message("complex mapping keys are not supported")),
        }
    }

    /// Find `key:` at a key position, starting at (`line`, `col`).
    ///
    /// Once the mapping's column is known, only keys at that column match.
    fn find_key(
        &self,
        key: &str,
        line: usize,
        col: usize,
        column: Option<usize>,
    ) -> Option<(usize, usize, usize)> {
        for idx in line..self.lines.len() {
            let text = self.lines[idx].text;
            let min = if idx == line { col } else { 0 };
            for pos in key_positions(text) {
                if pos < min || column.is_some_and(|c| c != pos) {
                    continue;
                }
                if let Some(len) = match_key(&text[pos..], key) {
                    return Some((idx, pos, len));
                }
            }
        }
        None
    }

    fn find_dash(&self, line: usize, col: usize, column: Option<usize>) -> Option<(usize, usize)> {
        for idx in line..self.lines.len() {
            let text = self.lines[idx].text;
            let min = if idx == line { col } else { 0 };
            for pos in key_positions(text) {
                if pos < min || column.is_some_and(|c| c != pos) {
                    continue;
                }
                let rest = &text[pos..];
                if rest == "-" || rest.starts_with("- ") {
                    return Some((idx, pos));
                }
            }
        }
        None
    }
}

/// Columns where a key or a sequence dash may start: the indentation, and
/// after every leading `- ` marker.
fn key_positions(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut col = text.len() - text.trim_start_matches(' ').len();
    if col >= text.len() || text[col..].starts_with('#') {
        return positions;
    }
    positions.push(col);
    while text[col..].starts_with("- ") {
        col += 1;
        col += text[col..].len() - text[col..].trim_start_matches(' ').len();
        if col >= text.len() {
            break;
        }
        positions.push(col);
    }
    positions
}

/// Length of `key` as written at the start of `rest` (quotes included),
/// if `rest` is that key followed by a mapping colon.
fn match_key(rest: &str, key: &str) -> Option<usize> {
    for quote in ["", "'", "\""] {
        let Some(after_open) = rest.strip_prefix(quote) else {
            continue;
        };
        let Some(after_key) = after_open.strip_prefix(key) else {
            continue;
        };
        let Some(after_close) = after_key.strip_prefix(quote) else {
            continue;
        };
        let len = rest.len() - after_close.len();
        let after_space = after_close.trim_start_matches(' ');
        if let Some(tail) = after_space.strip_prefix(':')
            && (tail.is_empty() || tail.starts_with(' ') || tail.starts_with('\t'))
        {
            return Some(len);
        }
    }
    None
}

fn is_opaque_start(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[') || text.starts_with('*')
}

fn strip_comment(text: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && (prev == ' ' || i == 0) => return &text[..i],
            _ => {}
        }
        prev = c;
    }
    text
}

fn number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Number(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Value::Number(u.into());
    }
    match n.as_f64().and_then(serde_json::Number::from_f64) {
        Some(f) => Value::Number(f),
        None => Value::String(n.to_string()),
    }
}

//! Source storage for a compilation.
//!
//! Every loaded document keeps its text here so diagnostics and IR
//! locations can be mapped back to file, line and column.

use rowan::TextSize;
use url::Url;

use crate::diagnostics::Span;

/// Lightweight handle to a source in a compilation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct SourceId(pub(crate) u32);

impl SourceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A source-level position carried over into the IR.
///
/// Owns its strings so the IR stays valid after the document store is
/// dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub file: String,
    pub url: String,
    pub line: u32,
    pub column: u32,
    pub pointer: String,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Clone, Debug)]
struct SourceEntry {
    url: Url,
    name: String,
    content: String,
    line_starts: Vec<TextSize>,
}

/// Registry of all sources.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under its absolute URL.
    pub fn add(&mut self, url: Url, content: String) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        let name = display_name(&url);
        let line_starts = line_starts(&content);
        self.entries.push(SourceEntry {
            url,
            name,
            content,
            line_starts,
        });
        id
    }

    pub fn content(&self, id: SourceId) -> &str {
        &self.entries[id.index()].content
    }

    pub fn url(&self, id: SourceId) -> &Url {
        &self.entries[id.index()].url
    }

    /// File path for `file:` URLs, the URL itself otherwise.
    pub fn name(&self, id: SourceId) -> &str {
        &self.entries[id.index()].name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        (0..self.entries.len()).map(|i| SourceId(i as u32))
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub fn line_col(&self, id: SourceId, offset: TextSize) -> (u32, u32) {
        let entry = &self.entries[id.index()];
        let offset = offset.min(TextSize::of(entry.content.as_str()));
        let line = match entry.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = usize::from(entry.line_starts[line]);
        let column = entry.content[start..usize::from(offset)].chars().count();
        (line as u32 + 1, column as u32 + 1)
    }

    /// Byte offset of a 0-based line and column, clamped to the source.
    pub fn offset_of(&self, id: SourceId, line: usize, column: usize) -> TextSize {
        let entry = &self.entries[id.index()];
        let Some(&start) = entry.line_starts.get(line) else {
            return TextSize::of(entry.content.as_str());
        };
        let rest = &entry.content[usize::from(start)..];
        let column_bytes: usize = rest
            .chars()
            .take_while(|c| *c != '\n')
            .take(column)
            .map(char::len_utf8)
            .sum();
        start + TextSize::from(column_bytes as u32)
    }

    pub fn location(&self, span: Span, pointer: &str) -> Location {
        let (line, column) = self.line_col(span.source, span.range.start());
        Location {
            file: self.name(span.source).to_string(),
            url: self.url(span.source).to_string(),
            line,
            column,
            pointer: pointer.to_string(),
        }
    }
}

fn display_name(url: &Url) -> String {
    if url.scheme() == "file"
        && let Ok(path) = url.to_file_path()
    {
        return path.display().to_string();
    }
    url.to_string()
}

fn line_starts(content: &str) -> Vec<TextSize> {
    let mut starts = vec![TextSize::from(0)];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            starts.push(TextSize::from(i as u32 + 1));
        }
    }
    starts
}

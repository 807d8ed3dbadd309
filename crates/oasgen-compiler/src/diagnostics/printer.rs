//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::message::Severity;
use super::{Diagnostic, Diagnostics, Span};
use crate::document::SourceMap;

/// Builder for rendering diagnostics with various options.
///
/// Snippet mode (the default) renders each diagnostic with its source lines
/// via `annotate-snippets`. Plain mode renders one header line plus
/// `-->`, `= note` and `= help` lines, which is stable enough for tests.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: &'s SourceMap,
    colored: bool,
    plain: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics, sources: &'s SourceMap) -> Self {
        Self {
            diagnostics,
            sources,
            colored: false,
            plain: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn plain(mut self, value: bool) -> Self {
        self.plain = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        if self.plain {
            return self.format_plain(w);
        }

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.sorted().into_iter().enumerate() {
            let report = self.build_report(diag);
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn build_report<'a>(&'a self, diag: &'a Diagnostic) -> Vec<Group<'a>> {
        let primary = diag.span();
        let source = self.sources.content(primary.source);

        let mut snippet = Snippet::source(source)
            .line_start(1)
            .path(self.sources.name(primary.source))
            .annotation(
                AnnotationKind::Primary
                    .span(adjust_range(primary.range, source.len()))
                    .label(diag.text()),
            );

        let mut foreign = Vec::new();
        for related in diag.related() {
            if related.span.source == primary.source {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(related.span.range, source.len()))
                        .label(related.message()),
                );
            } else {
                foreign.push(related);
            }
        }

        let mut group = severity_to_level(diag.severity())
            .primary_title(diag.text())
            .element(snippet);

        for related in foreign {
            let other = self.sources.content(related.span.source);
            group = group.element(
                Snippet::source(other)
                    .line_start(1)
                    .path(self.sources.name(related.span.source))
                    .annotation(
                        AnnotationKind::Context
                            .span(adjust_range(related.span.range, other.len()))
                            .label(related.message()),
                    ),
            );
        }

        for hint in diag.hints() {
            group = group.element(Level::HELP.message(hint.as_str()));
        }

        vec![group]
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for diag in self.diagnostics.sorted() {
            writeln!(
                w,
                "{}[{}]: {}",
                diag.severity(),
                diag.category(),
                diag.text()
            )?;
            write!(w, "  --> {}", self.position(diag.span()))?;
            if let Some(pointer) = diag.pointer() {
                write!(w, " #{}", pointer)?;
            }
            w.write_char('\n')?;
            for related in diag.related() {
                writeln!(
                    w,
                    "  = note: {} at {}",
                    related.message(),
                    self.position(related.span())
                )?;
            }
            for hint in diag.hints() {
                writeln!(w, "  = help: {}", hint)?;
            }
        }
        Ok(())
    }

    fn position(&self, span: Span) -> String {
        let (line, column) = self.sources.line_col(span.source, span.range.start());
        format!("{}:{}:{}", self.sources.name(span.source), line, column)
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = usize::from(range.start()).min(limit);
    let end: usize = usize::from(range.end()).min(limit);

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}

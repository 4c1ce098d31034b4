//! Parse diagnostics.
//!
//! Failures are assembled in two stages. While a parse can still backtrack,
//! failed alternatives carry a [`ParseErr`]: a reason, footnotes and a set of
//! expected labels, merged as alternatives are tried. When a failure becomes
//! committed it is turned into an [`ErrInfo`], which captures the offending
//! source line right away. Printing an `ErrInfo` never needs the input again.
//!
//! An `ErrInfo` can be shown two ways:
//!
//! - [`ErrInfo::render`] lays out plain text at a configured width:
//!
//!   ```text
//!   numbers.txt:1:4: error: unexpected end of input, expected: digit
//!   1 | 123
//!     |    ^
//!   ```
//!
//! - [`ErrInfo::diagnostic`] builds a [`miette::Diagnostic`] for callers that
//!   already report errors through miette.

pub mod err;
pub mod render;

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use thiserror::Error;

use crate::config::RenderConfig;
use crate::delta::Delta;
use crate::rope::Line;

pub use err::{Expected, ParseErr};
pub use render::Rendering;

/// Message used when a failure has neither a reason nor expectations.
const UNSPECIFIED: &str = "unspecified error";

// ============================================================================
// DOC: a diagnostic ready to be laid out
// ============================================================================

/// The pieces of a committed diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    rendering: Rendering,
    reason: Option<String>,
    expected: Vec<String>,
    footnotes: Vec<String>,
}

impl Doc {
    /// Explain `err` at the position captured by `rendering`.
    pub fn explain(rendering: Rendering, err: &ParseErr) -> Self {
        Self {
            rendering,
            reason: err.reason.clone(),
            expected: printable_labels(&err.expected),
            footnotes: err.footnotes.clone(),
        }
    }

    pub fn rendering(&self) -> &Rendering {
        &self.rendering
    }

    /// The one-line message: the reason, what was expected, or both.
    pub fn message(&self) -> String {
        let reason = self.reason.as_deref();
        if self.expected.is_empty() {
            return reason.unwrap_or(UNSPECIFIED).to_string();
        }
        let expected = self.expected.join(", ");
        match reason {
            Some(reason) => format!("{reason}, expected: {expected}"),
            None => format!("expected: {expected}"),
        }
    }

    /// Lay the diagnostic out for printing at the configured width.
    pub fn layout(&self, config: &RenderConfig) -> Layout {
        let header = format!("{}: error:", self.rendering.delta());
        Layout {
            header: render::fill(&header, &self.message(), config),
            excerpt: self.rendering.excerpt(config),
            notes: self
                .footnotes
                .iter()
                .flat_map(|note| render::fill("note:", note, config))
                .collect(),
        }
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.layout(&RenderConfig::default()), f)
    }
}

/// A laid out diagnostic: the wrapped header, the source line with its caret
/// line, and any notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub header: Vec<String>,
    pub excerpt: [String; 2],
    pub notes: Vec<String>,
}

impl Layout {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.excerpt.iter())
            .chain(self.notes.iter())
            .map(String::as_str)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// Labels in printing order. An expected set holding only the empty label
/// means whitespace was wanted; otherwise empty labels are dropped.
fn printable_labels(expected: &Expected) -> Vec<String> {
    if expected.len() == 1 && expected.contains("") {
        return vec!["space".to_string()];
    }
    expected.iter().filter(|l| !l.is_empty()).cloned().collect()
}

// ============================================================================
// ERRINFO
// ============================================================================

/// A committed parse failure.
///
/// `deltas` lists every position implicated in the failure, the commit point
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{doc}")]
#[diagnostic(code(trefoil::parse))]
pub struct ErrInfo {
    doc: Doc,
    deltas: Vec<Delta>,
}

impl ErrInfo {
    /// Render `err` at `delta`, capturing `line` for the excerpt.
    pub fn commit(delta: &Delta, line: &Line, err: ParseErr) -> Self {
        let doc = Doc::explain(Rendering::caret(delta, line), &err);
        let mut deltas = Vec::with_capacity(1 + err.final_deltas.len());
        deltas.push(delta.clone());
        deltas.extend(err.final_deltas);
        Self { doc, deltas }
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// Where the failure was committed.
    pub fn delta(&self) -> &Delta {
        self.doc.rendering.delta()
    }

    pub fn message(&self) -> String {
        self.doc.message()
    }

    pub fn reason(&self) -> Option<&str> {
        self.doc.reason.as_deref()
    }

    pub fn expected(&self) -> &[String] {
        &self.doc.expected
    }

    pub fn render(&self, config: &RenderConfig) -> String {
        self.doc.layout(config).to_string()
    }

    /// The failure as a miette diagnostic over the captured source line.
    pub fn diagnostic(&self) -> ParseDiagnostic {
        let rendering = &self.doc.rendering;
        let text = rendering.source_text().to_string();
        let offset = rendering.caret_offset();
        let width = text[offset..].chars().next().map_or(0, char::len_utf8);
        let help = if self.doc.footnotes.is_empty() {
            None
        } else {
            Some(self.doc.footnotes.join("\n"))
        };
        ParseDiagnostic {
            message: format!("{}: {}", self.delta(), self.message()),
            excerpt: NamedSource::new(self.delta().source_name(), text),
            span: (offset, width).into(),
            help,
        }
    }
}

/// A committed failure in miette's terms.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(trefoil::parse))]
pub struct ParseDiagnostic {
    message: String,
    #[source_code]
    excerpt: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl ParseDiagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

//! Positions inside the input stream.
//!
//! A [`Delta`] is an immutable location: absolute byte offset, zero-based line
//! and column, the byte offset inside the current line and an optional source
//! name. Positions only ever move forward through [`Delta::advance`]; the
//! parser rewinds by holding on to an older `Delta`, never by mutating one.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Columns advanced by a tab character.
pub const TAB_STOP: usize = 8;

/// Name printed for positions that carry no source name.
const INTERACTIVE: &str = "(interactive)";

/// A location in the input stream.
///
/// # Examples
///
/// ```rust
/// use trefoil::Delta;
/// let d = Delta::named("app.log").advance_str("ab\nc");
/// assert_eq!(d.line, 1);
/// assert_eq!(d.column, 1);
/// assert_eq!(d.bytes, 4);
/// assert_eq!(d.to_string(), "app.log:2:2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    pub source: Option<Arc<str>>,
    pub line: usize,
    pub column: usize,
    pub bytes: usize,
    /// Bytes between the start of the current line and this position.
    pub line_bytes: usize,
}

impl Delta {
    /// The start of a named source.
    pub fn named(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// The position reached after consuming `c`.
    pub fn advance(&self, c: char) -> Self {
        let width = c.len_utf8();
        match c {
            '\n' => Self {
                source: self.source.clone(),
                line: self.line + 1,
                column: 0,
                bytes: self.bytes + width,
                line_bytes: 0,
            },
            '\t' => Self {
                source: self.source.clone(),
                line: self.line,
                column: self.column + TAB_STOP - self.column % TAB_STOP,
                bytes: self.bytes + width,
                line_bytes: self.line_bytes + width,
            },
            _ => Self {
                source: self.source.clone(),
                line: self.line,
                column: self.column + 1,
                bytes: self.bytes + width,
                line_bytes: self.line_bytes + width,
            },
        }
    }

    /// The position reached after consuming all of `text`.
    pub fn advance_str(&self, text: &str) -> Self {
        text.chars().fold(self.clone(), |d, c| d.advance(c))
    }

    /// Byte offset of the start of the current line.
    pub fn line_start(&self) -> usize {
        self.bytes - self.line_bytes
    }

    /// Source name used when printing, `(interactive)` when there is none.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(INTERACTIVE)
    }
}

impl PartialOrd for Delta {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Distance first; the remaining fields only keep `Ord` consistent with `Eq`.
impl Ord for Delta {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes
            .cmp(&other.bytes)
            .then(self.line.cmp(&other.line))
            .then(self.column.cmp(&other.column))
            .then(self.line_bytes.cmp(&other.line_bytes))
            .then_with(|| self.source.cmp(&other.source))
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name(), self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_bytes() {
        let d = Delta::default().advance_str("héllo\nw");
        assert_eq!(d.line, 1);
        assert_eq!(d.column, 1);
        assert_eq!(d.bytes, 8);
        assert_eq!(d.line_bytes, 1);
        assert_eq!(d.line_start(), 7);
    }

    #[test]
    fn tabs_jump_to_the_next_stop() {
        let d = Delta::default().advance_str("ab\tc");
        assert_eq!(d.column, 9);
        assert_eq!(d.line_bytes, 4);
    }

    #[test]
    fn positions_order_by_distance() {
        let start = Delta::named("x").advance_str("one\n");
        let d = start.advance_str("two");
        assert_eq!(d.line_start(), start.bytes);
        assert!(start < d);
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Delta::default().to_string(), "(interactive):1:1");
        assert_eq!(Delta::named("f.txt").advance_str("a\nbc").to_string(), "f.txt:2:3");
    }
}

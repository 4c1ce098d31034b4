//! The persistent input store.
//!
//! A [`Rope`] holds every chunk fed so far as a sequence of strands in an
//! `im::Vector`. Appending returns a new rope and leaves the old one intact,
//! so a `Step` that kept an earlier rope can be fed again independently.
//!
//! The parser never reads the rope directly. It works on a [`Line`], the text
//! of the line containing the current position, and asks the rope for the next
//! line only when the current one runs out.

use im::Vector;
use std::sync::Arc;

use crate::delta::Delta;

// ============================================================================
// LINE: the text the parser is currently scanning
// ============================================================================

/// The text of one line of input, starting at absolute byte offset `start`.
///
/// A line normally begins at the start of a source line and runs through its
/// terminating newline. The last line of a rope may still be incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    start: usize,
    text: Arc<str>,
}

impl Line {
    pub fn new(start: usize, text: impl Into<Arc<str>>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }

    /// A line holding no text at `at`.
    pub fn empty(at: usize) -> Self {
        Self::new(at, "")
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute byte offset just past the held text.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The held text from absolute offset `at` onward.
    pub fn rest(&self, at: usize) -> Option<&str> {
        at.checked_sub(self.start)
            .and_then(|offset| self.text.get(offset..))
    }

    /// The held text before absolute offset `at`.
    pub fn before(&self, at: usize) -> &str {
        at.checked_sub(self.start)
            .and_then(|offset| self.text.get(..offset))
            .unwrap_or("")
    }
}

// ============================================================================
// ROPE
// ============================================================================

#[derive(Debug, Clone)]
struct Strand {
    start: usize,
    text: Arc<str>,
}

/// Append-only, structurally shared input buffer.
#[derive(Debug, Clone, Default)]
pub struct Rope {
    strands: Vector<Strand>,
    base: usize,
    len: usize,
    last_line_start: usize,
}

impl Rope {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty rope whose first byte will sit at absolute offset `base`.
    pub fn starting_at(base: usize) -> Self {
        Self {
            strands: Vector::new(),
            base,
            len: base,
            last_line_start: base,
        }
    }

    /// A new rope with `chunk` appended. Empty chunks leave the rope as it is.
    pub fn push(&self, chunk: &str) -> Self {
        if chunk.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.strands.push_back(Strand {
            start: self.len,
            text: Arc::from(chunk),
        });
        next.len = self.len + chunk.len();
        if let Some(newline) = chunk.rfind('\n') {
            next.last_line_start = self.len + newline + 1;
        }
        next
    }

    /// Absolute offset just past the last byte fed.
    pub fn end(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == self.base
    }

    /// Whether `bytes` can be addressed: retained and not past the end.
    pub fn retains(&self, bytes: usize) -> bool {
        self.base <= bytes && bytes <= self.len
    }

    /// Whether the line containing `bytes` has been fed up to its newline.
    pub fn line_complete(&self, bytes: usize) -> bool {
        bytes < self.last_line_start
    }

    /// The line containing `at`, from its start (or the rope's base) through
    /// its newline, or up to the end of the rope when the line is incomplete.
    pub fn line_at(&self, at: &Delta) -> Option<Line> {
        if !self.retains(at.bytes) {
            return None;
        }
        let start = at.line_start().max(self.base);
        let mut text = String::new();
        for piece in self.pieces_from(start) {
            match piece.find('\n') {
                Some(newline) => {
                    text.push_str(&piece[..=newline]);
                    break;
                }
                None => text.push_str(piece),
            }
        }
        Some(Line::new(start, text))
    }

    /// Text between two absolute offsets, clamped to what is retained.
    pub fn slice(&self, from: usize, to: usize) -> String {
        let from = from.max(self.base);
        let to = to.min(self.len);
        let mut text = String::new();
        if from >= to {
            return text;
        }
        let mut at = from;
        for piece in self.pieces_from(from) {
            let take = (to - at).min(piece.len());
            text.push_str(piece.get(..take).unwrap_or(piece));
            at += take;
            if at >= to {
                break;
            }
        }
        text
    }

    /// Everything fed so far.
    pub fn text(&self) -> String {
        self.slice(self.base, self.len)
    }

    /// Strand texts starting at absolute offset `from`, the first one trimmed.
    fn pieces_from(&self, from: usize) -> impl Iterator<Item = &str> + '_ {
        let first = match self.strands.binary_search_by(|s| s.start.cmp(&from)) {
            Ok(index) => index,
            Err(0) => 0,
            Err(index) => index - 1,
        };
        self.strands
            .iter()
            .skip(first)
            .enumerate()
            .map(move |(i, strand)| {
                if i == 0 {
                    strand.text.get(from.saturating_sub(strand.start)..).unwrap_or("")
                } else {
                    &strand.text[..]
                }
            })
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.len == other.len && self.text() == other.text()
    }
}

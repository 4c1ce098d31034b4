//! Caret renderings and text layout for diagnostics.
//!
//! A [`Rendering`] captures the source line an error points into at the
//! moment the error is created, so printing it later never needs the rope.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::RenderConfig;
use crate::delta::{Delta, TAB_STOP};
use crate::rope::Line;

/// Marks text cut from a windowed source line.
const ELLIPSIS: &str = "...";

/// Indentation of wrapped header lines.
const HANGING_INDENT: usize = 4;

/// A captured source line with a caret position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    delta: Delta,
    line: Line,
}

impl Rendering {
    pub fn caret(delta: &Delta, line: &Line) -> Self {
        Self {
            delta: delta.clone(),
            line: line.clone(),
        }
    }

    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    /// The captured line without its line terminator.
    pub fn source_text(&self) -> &str {
        self.line.text().trim_end_matches(['\n', '\r'])
    }

    /// Byte offset of the caret inside [`Rendering::source_text`].
    pub fn caret_offset(&self) -> usize {
        let text = self.source_text();
        let mut offset = self.line.before(self.delta.bytes).len().min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// The numbered source line and the caret line beneath it.
    pub fn excerpt(&self, config: &RenderConfig) -> [String; 2] {
        let number = (self.delta.line + 1).to_string();
        let gutter = number.len() + 3;
        let budget = config.line_width().saturating_sub(gutter).max(ELLIPSIS.len() * 2 + 2);

        let cells = cells(self.source_text());
        let caret_offset = self.caret_offset();
        let caret_column = cells
            .iter()
            .take_while(|cell| cell.offset < caret_offset)
            .map(|cell| cell.text.width())
            .sum::<usize>();
        let total = cells.iter().map(|cell| cell.text.width()).sum::<usize>();

        let (shown, caret) = if total < budget {
            let shown: String = cells.iter().map(|cell| cell.text.as_str()).collect();
            (shown, caret_column)
        } else {
            window(&cells, caret_column, budget)
        };

        let source = format!("{number} | {shown}");
        let pointer = format!("{:width$} | {}^", "", " ".repeat(caret), width = number.len());
        [source.trim_end().to_string(), pointer]
    }
}

/// One printed unit of a source line: a character, or the spaces a tab expands to.
struct Cell {
    offset: usize,
    text: String,
}

fn cells(text: &str) -> Vec<Cell> {
    let mut column = 0;
    text.char_indices()
        .map(|(offset, c)| {
            let text = if c == '\t' {
                " ".repeat(TAB_STOP - column % TAB_STOP)
            } else if c.width().unwrap_or(0) == 0 && c.is_control() {
                String::new()
            } else {
                c.to_string()
            };
            column += text.width();
            Cell { offset, text }
        })
        .collect()
}

/// Cut a long line down to `budget` columns around the caret.
fn window(cells: &[Cell], caret_column: usize, budget: usize) -> (String, usize) {
    let room = budget - ELLIPSIS.len() * 2;
    let start = caret_column.saturating_sub(room / 2);
    let mut shown = String::new();
    let mut column = 0;
    let mut clipped_right = false;
    for cell in cells {
        let width = cell.text.width();
        if column >= start && column + width <= start + room {
            shown.push_str(&cell.text);
        } else if column >= start {
            clipped_right = true;
            break;
        }
        column += width;
    }
    let mut caret = caret_column - start;
    if start > 0 {
        shown.insert_str(0, ELLIPSIS);
        caret += ELLIPSIS.len();
    }
    if clipped_right {
        shown.push_str(ELLIPSIS);
    }
    (shown, caret)
}

/// Fill `words` after `prefix`, wrapping with a hanging indent.
///
/// A line never exceeds the configured width, and the text on it, not
/// counting indentation, never exceeds the ribbon width, unless a single
/// word is wider than that.
pub(crate) fn fill(prefix: &str, words: &str, config: &RenderConfig) -> Vec<String> {
    let width = config.line_width();
    let ribbon = config.ribbon_width();
    let mut lines = Vec::new();
    let mut current = prefix.trim_end().to_string();
    let mut indent = 0;
    for word in words.split_whitespace() {
        let used = current.width();
        let has_content = used > indent;
        let needed = usize::from(has_content) + word.width();
        let too_wide = used + needed > width;
        let too_full = used - indent + needed > ribbon;
        if has_content && (too_wide || too_full) {
            lines.push(std::mem::replace(&mut current, " ".repeat(HANGING_INDENT)));
            indent = HANGING_INDENT;
        } else if has_content {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}

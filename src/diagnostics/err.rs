//! The accumulating diagnostic carried by epsilon outcomes.

use std::collections::BTreeSet;
use std::ops::Add;

use crate::delta::Delta;

/// Labels describing what would have let a failing parse continue.
pub type Expected = BTreeSet<String>;

/// A diagnostic that is still being assembled.
///
/// Failed alternatives merge into one another so the final message can read
/// "expected X, Y". Nothing is rendered until the failure becomes committed;
/// at that point the error is turned into an [`ErrInfo`](super::ErrInfo).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErr {
    pub reason: Option<String>,
    pub footnotes: Vec<String>,
    pub expected: Expected,
    pub final_deltas: Vec<Delta>,
}

impl ParseErr {
    /// An error with a primary message.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// An error expecting exactly one thing.
    pub fn expecting(label: impl Into<String>) -> Self {
        Self {
            expected: Expected::from([label.into()]),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reason.is_none()
            && self.footnotes.is_empty()
            && self.expected.is_empty()
            && self.final_deltas.is_empty()
    }

    /// Combine with an error produced later.
    ///
    /// Expected sets union and final deltas concatenate. The later reason
    /// wins when it has one; footnotes stay with the reason they explain.
    pub fn merge(self, later: ParseErr) -> ParseErr {
        let footnotes = if later.reason.is_some() || self.reason.is_none() {
            later.footnotes
        } else {
            self.footnotes
        };
        let mut expected = self.expected;
        expected.extend(later.expected);
        let mut final_deltas = self.final_deltas;
        final_deltas.extend(later.final_deltas);
        ParseErr {
            reason: later.reason.or(self.reason),
            footnotes,
            expected,
            final_deltas,
        }
    }

    /// Replace the expected set with exactly `label`.
    pub fn relabel(self, label: &str) -> ParseErr {
        ParseErr {
            expected: Expected::from([label.to_string()]),
            ..self
        }
    }

    /// Add labels to the expected set.
    pub fn also_expecting(mut self, labels: &Expected) -> ParseErr {
        self.expected.extend(labels.iter().cloned());
        self
    }

    pub fn with_footnote(mut self, note: impl Into<String>) -> ParseErr {
        self.footnotes.push(note.into());
        self
    }

    pub fn with_final_delta(mut self, delta: Delta) -> ParseErr {
        self.final_deltas.push(delta);
        self
    }
}

impl Add for ParseErr {
    type Output = ParseErr;

    fn add(self, later: ParseErr) -> ParseErr {
        self.merge(later)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_expected_labels() {
        let merged = ParseErr::expecting("digit") + ParseErr::expecting("letter");
        let labels: Vec<_> = merged.expected.iter().map(String::as_str).collect();
        assert_eq!(labels, ["digit", "letter"]);
        assert_eq!(merged.reason, None);
    }

    #[test]
    fn later_reason_wins_and_keeps_its_footnotes() {
        let early = ParseErr::failed("first").with_footnote("about first");
        let late = ParseErr::failed("second").with_footnote("about second");
        let merged = early.clone() + late;
        assert_eq!(merged.reason.as_deref(), Some("second"));
        assert_eq!(merged.footnotes, ["about second"]);

        let merged = early + ParseErr::expecting("x");
        assert_eq!(merged.reason.as_deref(), Some("first"));
        assert_eq!(merged.footnotes, ["about first"]);
    }

    #[test]
    fn final_deltas_concatenate_in_order() {
        let a = Delta::default();
        let b = Delta::default().advance('x');
        let merged = ParseErr::default().with_final_delta(a.clone())
            + ParseErr::default().with_final_delta(b.clone());
        assert_eq!(merged.final_deltas, vec![a, b]);
    }

    #[test]
    fn empty_is_the_identity() {
        let e = ParseErr::failed("boom").also_expecting(&Expected::from(["x".to_string()]));
        assert_eq!(ParseErr::default() + e.clone(), e);
        assert_eq!(e.clone() + ParseErr::default(), e);
        assert!(ParseErr::default().is_empty());
    }

    #[test]
    fn relabel_replaces_the_set() {
        let e = (ParseErr::expecting("a") + ParseErr::expecting("b")).relabel("thing");
        assert_eq!(e.expected, Expected::from(["thing".to_string()]));
    }
}

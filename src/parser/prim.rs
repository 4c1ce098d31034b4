//! Primitive parsers: consuming one character, and reading or moving the
//! cursor.
//!
//! These are the only parsers that look at the rope, and the only ones that
//! suspend.

use std::rc::Rc;

use super::{Answer, ComOk, Cursor, Parser, Value};
use crate::delta::Delta;
use crate::diagnostics::{Expected, ParseErr};
use crate::it::{It, Probe, Thunk};
use crate::rope::{Line, Rope};

/// Reason given when a character was needed and the input had ended.
pub const END_OF_INPUT: &str = "unexpected end of input";

/// Columns scanned within a line before the parse returns to the driver
/// loop. Every consumed character costs a few stack frames until then.
const BOUNCE_COLUMNS: usize = 8;

/// Consume one character if `pred` accepts it.
pub fn satisfy(pred: impl Fn(char) -> bool + 'static) -> Parser<char> {
    Parser::new(move |k, cur| {
        let next_char = cur
            .line
            .rest(cur.delta.bytes)
            .and_then(|rest| rest.chars().next());
        let Some(c) = next_char else {
            return (k.eps_err)(ParseErr::failed(END_OF_INPUT));
        };
        if !pred(c) {
            return (k.eps_err)(ParseErr::default());
        }
        let next = cur.delta.advance(c);
        if cur.line.rest(next.bytes).is_some_and(|rest| !rest.is_empty()) {
            let at = Cursor::new(next, cur.line);
            if at.delta.column % BOUNCE_COLUMNS == 0 {
                let co = Rc::clone(&k.com_ok);
                return It::defer(move || co(c, Expected::new(), at.clone()));
            }
            return (k.com_ok)(c, Expected::new(), at);
        }
        refill(c, next, cur.line, &k.com_ok)
    })
}

/// Commit to `c` once the line holding `next` is available.
///
/// If the input ends first, the parse continues with whatever part of the
/// line has arrived, or with an empty line when `c` finished the old one.
fn refill(c: char, next: Delta, line: Line, co: &ComOk<char>) -> It<Answer> {
    let fallback = if c == '\n' {
        Line::empty(next.bytes)
    } else {
        line
    };
    let ks: Rc<dyn Fn(Line) -> It<Answer>> = {
        let (co, next) = (Rc::clone(co), next.clone());
        Rc::new(move |line: Line| co(c, Expected::new(), Cursor::new(next.clone(), line)))
    };
    let default = {
        let (ks, fallback) = (Rc::clone(&ks), fallback.clone());
        Thunk::lazy(move || ks(fallback))
    };
    It::want(default, move |rope: &Rope| {
        if rope.line_complete(next.bytes) {
            let line = rope.line_at(&next).unwrap_or_else(|| fallback.clone());
            return Probe::Satisfied(ks(line));
        }
        let (ks, rope, next, fallback) = (Rc::clone(&ks), rope.clone(), next.clone(), fallback.clone());
        Probe::Waiting(Thunk::lazy(move || ks(rope.line_at(&next).unwrap_or(fallback))))
    })
    .join()
}

/// The line holding `delta`, once the rope has all of it.
///
/// Yields `None` if the rope does not retain that position.
pub(crate) fn rewind_it(delta: &Delta) -> It<Option<Line>> {
    let delta = delta.clone();
    It::want(Thunk::ready(None), move |rope: &Rope| {
        if rope.line_complete(delta.bytes) {
            return Probe::Satisfied(rope.line_at(&delta));
        }
        let (rope, delta) = (rope.clone(), delta.clone());
        Probe::Waiting(Thunk::lazy(move || rope.line_at(&delta)))
    })
}

/// The current position, without consuming input.
pub fn mark() -> Parser<Delta> {
    Parser::new(|k, cur| (k.eps_ok)(cur.delta, ParseErr::default()))
}

pub fn position() -> Parser<Delta> {
    mark()
}

/// Move back to a position returned by [`mark`].
///
/// When the rope still holds the line for `delta` the parser commits there.
/// If it does not, but `delta` is exactly where the current line's text
/// ends, the parser commits there with an empty line; text before `delta`
/// cannot be shown in later diagnostics. Any other position fails.
pub fn release(delta: Delta) -> Parser<()> {
    Parser::new(move |k, cur: Cursor| {
        let (co, ee, delta) = (Rc::clone(&k.com_ok), Rc::clone(&k.eps_err), delta.clone());
        let held_end = cur.line.end();
        rewind_it(&delta).and_then(move |line| match line {
            Some(line) => co((), Expected::new(), Cursor::new(delta.clone(), line)),
            None if delta.bytes == held_end => {
                let line = Line::empty(delta.bytes);
                co((), Expected::new(), Cursor::new(delta.clone(), line))
            }
            None => ee(ParseErr::default().with_final_delta(delta.clone())),
        })
    })
}

/// The text of the current line, without consuming input.
pub fn line() -> Parser<String> {
    Parser::new(|k, cur| (k.eps_ok)(cur.line.text().to_string(), ParseErr::default()))
}

/// The current line from the cursor onward, without consuming input.
pub fn rest_of_line() -> Parser<String> {
    Parser::new(|k, cur| {
        let rest = cur.line.rest(cur.delta.bytes).unwrap_or("").to_string();
        (k.eps_ok)(rest, ParseErr::default())
    })
}

/// The text between two positions, read from the rope.
fn slice(from: Delta, to: Delta) -> Parser<String> {
    Parser::new(move |k, _cur| {
        let eo = Rc::clone(&k.eps_ok);
        let (from, to) = (from.bytes, to.bytes);
        It::peek(move |rope: &Rope| rope.slice(from, to))
            .and_then(move |text| eo(text, ParseErr::default()))
    })
}

/// Run `p` and return the text it consumed instead of its value.
pub fn sliced<A: Value>(p: &Parser<A>) -> Parser<String> {
    let p = p.clone();
    mark().and_then(move |from| {
        p.then(&mark())
            .and_then(move |to| slice(from.clone(), to))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{outcome, outcome_at, Outcome};
    use crate::parser::{char_, digit, many, some};

    #[test]
    fn satisfy_consumes_exactly_one_character() {
        match outcome(&satisfy(|c| c == 'é'), "éa") {
            Outcome::ComOk('é', x, d) => {
                assert!(x.is_empty());
                assert_eq!(d.bytes, 2);
                assert_eq!(d.column, 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn satisfy_rejects_without_a_diagnostic() {
        assert_eq!(
            outcome(&satisfy(|c| c == 'x'), "a"),
            Outcome::EpsErr(ParseErr::default())
        );
    }

    #[test]
    fn satisfy_at_the_end_reports_end_of_input() {
        assert_eq!(
            outcome(&satisfy(|_| true), ""),
            Outcome::EpsErr(ParseErr::failed(END_OF_INPUT))
        );
    }

    #[test]
    fn satisfy_crosses_into_the_next_line() {
        let p = char_('a').then(&char_('\n')).then(&char_('b'));
        assert!(matches!(outcome(&p, "a\nb"), Outcome::ComOk('b', _, d) if d.line == 1 && d.bytes == 3));
    }

    #[test]
    fn mark_and_release_rewind() {
        let p = mark().and_then(|m| some(&digit()).then(&release(m)).then(&mark()));
        match outcome(&p, "12\n") {
            Outcome::ComOk(d, _, _) => assert_eq!(d.bytes, 0),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn release_to_the_end_of_an_unretained_line_is_lossy() {
        let at = Delta::default().advance_str("abc");
        let cur = Cursor::new(at.clone(), Line::new(0, "abc"));
        match outcome_at(&release(at.clone()), cur, &Rope::new()) {
            Outcome::ComOk((), _, d) => assert_eq!(d, at),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn release_to_an_unknown_position_fails() {
        let far = Delta::default().advance_str("abcdef");
        let cur = Cursor::new(Delta::default(), Line::new(0, "abc"));
        assert_eq!(
            outcome_at(&release(far.clone()), cur, &Rope::new()),
            Outcome::EpsErr(ParseErr::default().with_final_delta(far))
        );
    }

    #[test]
    fn long_lines_are_scanned_in_bounded_stack() {
        let text = "7".repeat(100_000) + "x";
        let p = many(&digit()).zip(&rest_of_line());
        match outcome(&p, &text) {
            Outcome::ComOk((digits, rest), _, d) => {
                assert_eq!(digits.len(), 100_000);
                assert_eq!(rest, "x");
                assert_eq!(d.column, 100_000);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn waiting_lines_are_read_from_the_rope_they_waited_on() {
        let p = char_('a').then(&rest_of_line());
        let rope = Rope::new().push("a").push("bcd");
        let held = Line::new(0, "a");
        assert!(matches!(
            outcome_at(&p, Cursor::new(Delta::default(), held), &rope),
            Outcome::ComOk(rest, _, _) if rest == "bcd"
        ));
    }

    #[test]
    fn sliced_returns_consumed_text() {
        let p = sliced(&many(&digit())).zip(&rest_of_line());
        match outcome(&p, "123ab\n") {
            Outcome::ComOk((text, rest), _, _) => {
                assert_eq!(text, "123");
                assert_eq!(rest, "ab\n");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn line_reads_the_whole_current_line() {
        let p = char_('a').then(&line());
        assert!(matches!(outcome(&p, "ab\ncd"), Outcome::ComOk(l, _, _) if l == "ab\n"));
    }
}

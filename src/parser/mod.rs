//! The parser engine.
//!
//! A [`Parser`] is a function from four continuations and a [`Cursor`] to a
//! suspension-aware computation. Which continuation a parser calls says
//! whether it consumed input and whether it succeeded:
//!
//! | continuation | consumed input | outcome |
//! |--------------|----------------|---------|
//! | `eps_ok`     | no             | success, with a carried [`ParseErr`] |
//! | `eps_err`    | no             | failure, still backtrackable |
//! | `com_ok`     | yes            | success at a new cursor |
//! | `com_err`    | yes            | failure, already rendered as an [`ErrInfo`] |
//!
//! Alternation only tries its right operand after an epsilon failure, so a
//! committed outcome can never be discarded in favour of another branch. The
//! one exception is [`try_`], which turns a committed failure back into an
//! epsilon failure.
//!
//! Parsers are cheap to clone, hold no mutable state, and can be run any
//! number of times. They are `!Send`.

pub mod backtrack;
pub mod chars;
pub mod prim;
pub mod repeat;

use std::any::Any;
use std::rc::Rc;

use crate::delta::Delta;
use crate::diagnostics::{ErrInfo, Expected, ParseErr};
use crate::it::It;
use crate::rope::Line;

pub use backtrack::{look_ahead, not_followed_by, try_};
pub use chars::{
    alpha_num, any_char, between, char_, choice, digit, eof, letter, newline, none_of, one_of,
    space, spaces, string,
};
pub use prim::{line, mark, position, release, rest_of_line, satisfy, sliced};
pub use repeat::{many, many_accum, sep_by, sep_by1, skip_many, skip_some, some};

/// Anything a parser can produce.
pub trait Value: Clone + 'static {}

impl<T: Clone + 'static> Value for T {}

/// Where a parser is in the input: the position, and the text of the line
/// that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub delta: Delta,
    pub line: Line,
}

impl Cursor {
    pub fn new(delta: Delta, line: Line) -> Self {
        Self { delta, line }
    }
}

/// The final answer of every parse, whatever its value type. Success values
/// are erased here and recovered by the driver.
#[derive(Clone)]
pub(crate) enum Answer {
    Value(Rc<dyn Any>),
    Error(ErrInfo),
}

impl Answer {
    pub(crate) fn value<A: Value>(a: A) -> Self {
        Answer::Value(Rc::new(a))
    }
}

pub(crate) type EpsOk<A> = Rc<dyn Fn(A, ParseErr) -> It<Answer>>;
pub(crate) type EpsErr = Rc<dyn Fn(ParseErr) -> It<Answer>>;
pub(crate) type ComOk<A> = Rc<dyn Fn(A, Expected, Cursor) -> It<Answer>>;
pub(crate) type ComErr = Rc<dyn Fn(ErrInfo) -> It<Answer>>;

/// The four result continuations.
pub(crate) struct Konts<A> {
    pub(crate) eps_ok: EpsOk<A>,
    pub(crate) eps_err: EpsErr,
    pub(crate) com_ok: ComOk<A>,
    pub(crate) com_err: ComErr,
}

impl<A> Clone for Konts<A> {
    fn clone(&self) -> Self {
        Self {
            eps_ok: Rc::clone(&self.eps_ok),
            eps_err: Rc::clone(&self.eps_err),
            com_ok: Rc::clone(&self.com_ok),
            com_err: Rc::clone(&self.com_err),
        }
    }
}

type Run<A> = Rc<dyn Fn(&Konts<A>, Cursor) -> It<Answer>>;

/// A parser producing values of type `A`.
pub struct Parser<A> {
    run: Run<A>,
}

impl<A> Clone for Parser<A> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<A: Value> Parser<A> {
    pub(crate) fn new(run: impl Fn(&Konts<A>, Cursor) -> It<Answer> + 'static) -> Self {
        Self { run: Rc::new(run) }
    }

    pub(crate) fn run(&self, k: &Konts<A>, cur: Cursor) -> It<Answer> {
        (self.run)(k, cur)
    }

    // ========================================================================
    // FUNCTOR / MONAD
    // ========================================================================

    pub fn map<B: Value>(&self, f: impl Fn(A) -> B + 'static) -> Parser<B> {
        let p = self.clone();
        let f = Rc::new(f);
        Parser::new(move |k: &Konts<B>, cur| {
            let eps_ok = {
                let (f, eo) = (Rc::clone(&f), Rc::clone(&k.eps_ok));
                Rc::new(move |a: A, e: ParseErr| eo(f(a), e))
            };
            let com_ok = {
                let (f, co) = (Rc::clone(&f), Rc::clone(&k.com_ok));
                Rc::new(move |a: A, x: Expected, at: Cursor| co(f(a), x, at))
            };
            let konts = Konts {
                eps_ok,
                eps_err: Rc::clone(&k.eps_err),
                com_ok,
                com_err: Rc::clone(&k.com_err),
            };
            p.run(&konts, cur)
        })
    }

    /// Run `f` on the result and continue with the parser it returns.
    ///
    /// Once `self` has consumed input the combined parser has too: an epsilon
    /// success of the second parser is reported as committed, and an epsilon
    /// failure is rendered on the spot.
    pub fn and_then<B: Value>(&self, f: impl Fn(A) -> Parser<B> + 'static) -> Parser<B> {
        let p = self.clone();
        let f = Rc::new(f);
        Parser::new(move |k: &Konts<B>, cur: Cursor| {
            let eps_ok = {
                let (f, k, cur) = (Rc::clone(&f), k.clone(), cur.clone());
                Rc::new(move |a: A, e: ParseErr| {
                    let eps_ok = {
                        let (eo, e) = (Rc::clone(&k.eps_ok), e.clone());
                        Rc::new(move |b: B, later: ParseErr| eo(b, e.clone() + later))
                    };
                    let eps_err = {
                        let ee = Rc::clone(&k.eps_err);
                        Rc::new(move |later: ParseErr| ee(e.clone() + later))
                    };
                    let konts = Konts {
                        eps_ok,
                        eps_err,
                        ..k.clone()
                    };
                    f(a).run(&konts, cur.clone())
                })
            };
            let com_ok = {
                let (f, k) = (Rc::clone(&f), k.clone());
                Rc::new(move |a: A, x: Expected, at: Cursor| {
                    let eps_ok = {
                        let (co, x, at) = (Rc::clone(&k.com_ok), x.clone(), at.clone());
                        Rc::new(move |b: B, e: ParseErr| {
                            let mut expected = x.clone();
                            expected.extend(e.expected);
                            co(b, expected, at.clone())
                        })
                    };
                    let eps_err = {
                        let (ce, at) = (Rc::clone(&k.com_err), at.clone());
                        Rc::new(move |e: ParseErr| {
                            ce(ErrInfo::commit(&at.delta, &at.line, e.also_expecting(&x)))
                        })
                    };
                    let konts = Konts {
                        eps_ok,
                        eps_err,
                        ..k.clone()
                    };
                    f(a).run(&konts, at)
                })
            };
            let konts = Konts {
                eps_ok,
                eps_err: Rc::clone(&k.eps_err),
                com_ok,
                com_err: Rc::clone(&k.com_err),
            };
            p.run(&konts, cur)
        })
    }

    /// Run `next` after `self`, keeping the result of `next`.
    pub fn then<B: Value>(&self, next: &Parser<B>) -> Parser<B> {
        let next = next.clone();
        self.and_then(move |_| next.clone())
    }

    /// Run `next` after `self`, keeping the result of `self`.
    pub fn skip<B: Value>(&self, next: &Parser<B>) -> Parser<A> {
        let next = next.clone();
        self.and_then(move |a| {
            let a = a.clone();
            next.map(move |_| a.clone())
        })
    }

    pub fn zip<B: Value>(&self, other: &Parser<B>) -> Parser<(A, B)> {
        let other = other.clone();
        self.and_then(move |a| {
            let a = a.clone();
            other.map(move |b| (a.clone(), b))
        })
    }

    // ========================================================================
    // ALTERNATIVE
    // ========================================================================

    /// Try `self`, then `other` if `self` failed without consuming input.
    pub fn or(&self, other: &Parser<A>) -> Parser<A> {
        let (p, q) = (self.clone(), other.clone());
        Parser::new(move |k, cur| {
            let eps_err = {
                let (q, k, cur) = (q.clone(), k.clone(), cur.clone());
                Rc::new(move |first: ParseErr| {
                    let eps_ok = {
                        let (eo, first) = (Rc::clone(&k.eps_ok), first.clone());
                        Rc::new(move |a: A, second: ParseErr| eo(a, first.clone() + second))
                    };
                    let eps_err = {
                        let ee = Rc::clone(&k.eps_err);
                        Rc::new(move |second: ParseErr| ee(first.clone() + second))
                    };
                    let konts = Konts {
                        eps_ok,
                        eps_err,
                        ..k.clone()
                    };
                    q.run(&konts, cur.clone())
                })
            };
            let konts = Konts {
                eps_err,
                ..k.clone()
            };
            p.run(&konts, cur)
        })
    }

    /// Name what this parser expects in error messages.
    ///
    /// An epsilon failure always expects exactly `name`. An epsilon success
    /// is relabelled only when its carried error already has a reason.
    pub fn label(&self, name: impl Into<String>) -> Parser<A> {
        let p = self.clone();
        let name: Rc<str> = Rc::from(name.into());
        Parser::new(move |k, cur| {
            let eps_ok = {
                let (eo, name) = (Rc::clone(&k.eps_ok), Rc::clone(&name));
                Rc::new(move |a: A, e: ParseErr| {
                    if e.reason.is_some() {
                        eo(a, e.relabel(&name))
                    } else {
                        eo(a, e)
                    }
                })
            };
            let eps_err = {
                let (ee, name) = (Rc::clone(&k.eps_err), Rc::clone(&name));
                Rc::new(move |e: ParseErr| ee(e.relabel(&name)))
            };
            let konts = Konts {
                eps_ok,
                eps_err,
                ..k.clone()
            };
            p.run(&konts, cur)
        })
    }

    /// Attach `text` as a footnote when this parser fails without consuming
    /// input.
    pub fn note(&self, text: impl Into<String>) -> Parser<A> {
        let p = self.clone();
        let text: Rc<str> = Rc::from(text.into());
        Parser::new(move |k, cur| {
            let eps_err = {
                let (ee, text) = (Rc::clone(&k.eps_err), Rc::clone(&text));
                Rc::new(move |e: ParseErr| ee(e.with_footnote(&*text)))
            };
            let konts = Konts {
                eps_err,
                ..k.clone()
            };
            p.run(&konts, cur)
        })
    }

    /// See [`try_`].
    pub fn attempt(&self) -> Parser<A> {
        try_(self)
    }

    pub fn optional(&self) -> Parser<Option<A>> {
        optional(self)
    }
}

/// Apply the function a parser produces to the value of the next one.
pub fn ap<A: Value, B: Value>(pf: &Parser<Rc<dyn Fn(A) -> B>>, pa: &Parser<A>) -> Parser<B> {
    let pa = pa.clone();
    pf.and_then(move |f| pa.map(move |a| f(a)))
}

// ============================================================================
// CONSTANT PARSERS
// ============================================================================

/// Succeed with `value` without consuming input.
pub fn pure<A: Value>(value: A) -> Parser<A> {
    Parser::new(move |k, _cur| (k.eps_ok)(value.clone(), ParseErr::default()))
}

/// Fail without consuming input or saying why.
pub fn empty<A: Value>() -> Parser<A> {
    Parser::new(|k, _cur| (k.eps_err)(ParseErr::default()))
}

/// Fail without consuming input, with `message` as the reason.
pub fn fail<A: Value>(message: impl Into<String>) -> Parser<A> {
    let reason = message.into();
    Parser::new(move |k, _cur| (k.eps_err)(ParseErr::failed(reason.clone())))
}

/// Fail with the reason "unexpected `what`".
pub fn unexpected<A: Value>(what: impl AsRef<str>) -> Parser<A> {
    fail(format!("unexpected {}", what.as_ref()))
}

/// Build the parser only when it runs. Needed for recursive grammars.
pub fn lazy<A: Value>(build: impl Fn() -> Parser<A> + 'static) -> Parser<A> {
    Parser::new(move |k, cur| build().run(k, cur))
}

pub fn optional<A: Value>(p: &Parser<A>) -> Parser<Option<A>> {
    p.map(Some).or(&pure(None))
}


#[cfg(test)]
mod tests {
    use super::testing::{outcome, Outcome};
    use super::*;
    use std::cell::Cell;

    fn labels(e: &ParseErr) -> Vec<&str> {
        e.expected.iter().map(String::as_str).collect()
    }

    #[test]
    fn pure_wins_without_running_the_alternative() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let q = lazy(move || {
            flag.set(true);
            pure(2)
        });
        assert_eq!(outcome(&pure(1).or(&q), "x"), Outcome::EpsOk(1, ParseErr::default()));
        assert!(!ran.get());
    }

    #[test]
    fn failed_alternatives_union_their_labels() {
        let p = empty::<char>().label("a").or(&empty().label("b"));
        match outcome(&p, "") {
            Outcome::EpsErr(e) => assert_eq!(labels(&e), ["a", "b"]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn epsilon_success_after_failure_carries_the_failure() {
        let p = empty::<u8>().label("a").or(&pure(7));
        match outcome(&p, "") {
            Outcome::EpsOk(7, e) => assert_eq!(labels(&e), ["a"]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn map_touches_only_the_value() {
        let p = char_('a').map(|c| c.to_ascii_uppercase());
        assert!(matches!(outcome(&p, "ab"), Outcome::ComOk('A', _, d) if d.bytes == 1));
    }

    #[test]
    fn bind_after_commit_renders_epsilon_failures() {
        let p = char_('a').then(&char_('b'));
        match outcome(&p, "ax\n") {
            Outcome::ComErr(info) => {
                assert_eq!(info.delta().bytes, 1);
                assert_eq!(info.expected(), ["'b'"]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn bind_after_commit_promotes_epsilon_success() {
        let p = char_('a').then(&pure(5));
        assert!(matches!(outcome(&p, "a"), Outcome::ComOk(5, _, d) if d.bytes == 1));
    }

    #[test]
    fn bind_on_epsilon_merges_diagnostics() {
        let p = pure(()).label("ignored").or(&empty()).and_then(|()| empty::<()>().label("x"));
        match outcome(&p, "") {
            Outcome::EpsErr(e) => assert_eq!(labels(&e), ["x"]),
            other => panic!("unexpected outcome {other:?}"),
        }
        let p = empty::<()>().label("a").or(&pure(())).then(&empty::<()>().label("b"));
        match outcome(&p, "") {
            Outcome::EpsErr(e) => assert_eq!(labels(&e), ["a", "b"]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn label_keeps_silent_successes() {
        let p = pure(1).label("number");
        assert_eq!(outcome(&p, ""), Outcome::EpsOk(1, ParseErr::default()));
        let p = fail::<u8>("nope").or(&pure(1)).label("number");
        match outcome(&p, "") {
            Outcome::EpsOk(1, e) => assert_eq!(labels(&e), ["number"]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn label_replaces_the_expected_set_of_a_reasoned_failure() {
        let p = fail::<u8>("bad").label("X");
        match outcome(&p, "") {
            Outcome::EpsErr(e) => {
                assert_eq!(labels(&e), ["X"]);
                assert_eq!(e.reason.as_deref(), Some("bad"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn ap_applies_the_parsed_function() {
        let double: Rc<dyn Fn(char) -> String> = Rc::new(|c| format!("{c}{c}"));
        let p = ap(&pure(double), &any_char());
        assert!(matches!(outcome(&p, "zq"), Outcome::ComOk(s, _, _) if s == "zz"));
    }

    #[test]
    fn unexpected_sets_the_reason() {
        match outcome(&unexpected::<()>("'x'"), "") {
            Outcome::EpsErr(e) => assert_eq!(e.reason.as_deref(), Some("unexpected 'x'")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn note_adds_footnotes_only_to_epsilon_failures() {
        let p = char_('a').note("keys start with a");
        match outcome(&p, "b") {
            Outcome::EpsErr(e) => assert_eq!(e.footnotes, ["keys start with a"]),
            other => panic!("unexpected outcome {other:?}"),
        }
        let p = char_('a').then(&char_('b')).note("never shown");
        match outcome(&p, "ax\n") {
            Outcome::ComErr(info) => assert!(!info.render(&Default::default()).contains("note:")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

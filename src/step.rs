//! The incremental driver.
//!
//! [`step_parser`] starts a parse, [`Step::feed`] hands it more input and
//! [`Step::starve`] tells it nothing more is coming. Steps are persistent
//! values: feeding one returns a new step and leaves the old one usable, so
//! a parse can be forked and each branch fed different input.
//!
//! ```rust
//! use trefoil::{digit, some, step_parser, Delta, ParseResult};
//!
//! let p = some(&digit()).map(|ds| ds.iter().collect::<String>());
//! let step = step_parser(&p, Delta::default()).feed("12");
//! assert!(step.is_continuing());
//! match step.feed("3x").starve() {
//!     ParseResult::Success(n) => assert_eq!(n, "123"),
//!     ParseResult::Failure(e) => panic!("{e}"),
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::delta::Delta;
use crate::diagnostics::{ErrInfo, Expected, ParseErr};
use crate::it::It;
use crate::parser::prim::rewind_it;
use crate::parser::{Answer, Cursor, Konts, Parser, Value};
use crate::rope::{Line, Rope};

// ============================================================================
// PARSE RESULT
// ============================================================================

/// The final outcome of a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<A> {
    Success(A),
    Failure(ErrInfo),
}

impl<A> ParseResult<A> {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success(_))
    }

    pub fn into_result(self) -> Result<A, ErrInfo> {
        self.into()
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> ParseResult<B> {
        match self {
            ParseResult::Success(a) => ParseResult::Success(f(a)),
            ParseResult::Failure(e) => ParseResult::Failure(e),
        }
    }
}

impl<A> From<ParseResult<A>> for Result<A, ErrInfo> {
    fn from(result: ParseResult<A>) -> Self {
        match result {
            ParseResult::Success(a) => Ok(a),
            ParseResult::Failure(e) => Err(e),
        }
    }
}

fn settle<A: Value>(answer: Answer) -> ParseResult<A> {
    match answer {
        Answer::Value(value) => match value.downcast_ref::<A>() {
            Some(a) => ParseResult::Success(a.clone()),
            None => unreachable!("parse answer does not have the parser's value type"),
        },
        Answer::Error(e) => ParseResult::Failure(e),
    }
}

// ============================================================================
// STEP
// ============================================================================

/// A parse waiting for more input.
pub struct Suspended<A> {
    it: It<Answer>,
    value: PhantomData<fn() -> A>,
}

impl<A> Clone for Suspended<A> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
            value: PhantomData,
        }
    }
}

/// A parse in progress, together with all input it has been fed.
pub enum Step<A> {
    Done(Rope, A),
    Failed(Rope, ErrInfo),
    Continuing(Rope, Suspended<A>),
}

impl<A: Clone> Clone for Step<A> {
    fn clone(&self) -> Self {
        match self {
            Step::Done(rope, a) => Step::Done(rope.clone(), a.clone()),
            Step::Failed(rope, e) => Step::Failed(rope.clone(), e.clone()),
            Step::Continuing(rope, s) => Step::Continuing(rope.clone(), s.clone()),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Step<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Done(rope, a) => write!(f, "Done({}, {a:?})", rope.end()),
            Step::Failed(rope, e) => write!(f, "Failed({}, {:?})", rope.end(), e.message()),
            Step::Continuing(rope, _) => write!(f, "Continuing({})", rope.end()),
        }
    }
}

/// Start running `p` at `start`. Nothing is parsed until input is fed.
pub fn step_parser<A: Value>(p: &Parser<A>, start: Delta) -> Step<A> {
    debug!(start = %start, "starting parse");
    let rope = Rope::starting_at(start.bytes);
    let p = p.clone();
    let it = rewind_it(&start).and_then(move |line| {
        let line = line.unwrap_or_else(|| Line::empty(start.bytes));
        p.run(&top_konts(&start, &line), Cursor::new(start.clone(), line))
    });
    Step::classify(rope, it)
}

/// Continuations that end the parse. An epsilon failure is rendered at the
/// starting position, against the line that was current there.
fn top_konts<A: Value>(start: &Delta, line: &Line) -> Konts<A> {
    let (start, line) = (start.clone(), line.clone());
    Konts {
        eps_ok: Rc::new(|a: A, _: ParseErr| It::ready(Answer::value(a))),
        eps_err: Rc::new(move |e: ParseErr| {
            It::ready(Answer::Error(ErrInfo::commit(&start, &line, e)))
        }),
        com_ok: Rc::new(|a: A, _: Expected, _: Cursor| It::ready(Answer::value(a))),
        com_err: Rc::new(|e: ErrInfo| It::ready(Answer::Error(e))),
    }
}

impl<A: Value> Step<A> {
    fn classify(rope: Rope, it: It<Answer>) -> Self {
        match it.simplify(&rope) {
            It::Ready(answer) => match settle(answer) {
                ParseResult::Success(a) => Step::Done(rope, a),
                ParseResult::Failure(e) => {
                    debug!(at = %e.delta(), "parse failed: {}", e.message());
                    Step::Failed(rope, e)
                }
            },
            it => Step::Continuing(
                rope,
                Suspended {
                    it,
                    value: PhantomData,
                },
            ),
        }
    }

    /// Append `chunk` to the input.
    ///
    /// A finished step keeps its outcome and only grows its rope. A
    /// continuing step resumes with the longer rope.
    pub fn feed(&self, chunk: &str) -> Step<A> {
        trace!(bytes = chunk.len(), "feeding chunk");
        match self {
            Step::Done(rope, a) => Step::Done(rope.push(chunk), a.clone()),
            Step::Failed(rope, e) => Step::Failed(rope.push(chunk), e.clone()),
            Step::Continuing(rope, suspended) => {
                let rope = rope.push(chunk);
                let it = suspended.it.feed(&rope);
                Step::classify(rope, it)
            }
        }
    }

    /// The outcome if no more input will arrive.
    pub fn starve(&self) -> ParseResult<A> {
        match self {
            Step::Done(_, a) => ParseResult::Success(a.clone()),
            Step::Failed(_, e) => ParseResult::Failure(e.clone()),
            Step::Continuing(rope, suspended) => {
                debug!(end = rope.end(), "starving parse");
                settle(suspended.it.starve(rope))
            }
        }
    }

    pub fn rope(&self) -> &Rope {
        match self {
            Step::Done(rope, _) | Step::Failed(rope, _) | Step::Continuing(rope, _) => rope,
        }
    }

    pub fn is_continuing(&self) -> bool {
        matches!(self, Step::Continuing(..))
    }
}

//! The suspension primitive.
//!
//! An [`It`] is a computation over the [`Rope`] that has either finished
//! (`Ready`) or is waiting for more input (`Pending`). A pending computation
//! carries two things:
//!
//! - the answer it would give if the input ended right now, as a lazily
//!   evaluated, memoized [`Thunk`];
//! - a resume function that takes a newer rope and continues.
//!
//! A freshly created suspension has not looked at any rope yet. The driver
//! pumps such suspensions with [`It::simplify`] until each one has either
//! finished or inspected the current rope and decided to keep waiting.
//! Nothing in here mutates shared state, so any `It` can be resumed many
//! times with different ropes.

use once_cell::unsync::Lazy;
use std::fmt;
use std::rc::Rc;

use crate::rope::Rope;

// ============================================================================
// THUNK: memoized lazy answer
// ============================================================================

type Deferred<A> = Lazy<A, Box<dyn FnOnce() -> A>>;

/// A shared value computed at most once, on first use.
pub struct Thunk<A>(Rc<Deferred<A>>);

impl<A: 'static> Thunk<A> {
    /// A thunk that is already evaluated.
    pub fn ready(value: A) -> Self {
        Self::lazy(move || value)
    }

    pub fn lazy(f: impl FnOnce() -> A + 'static) -> Self {
        let f: Box<dyn FnOnce() -> A> = Box::new(f);
        Thunk(Rc::new(Lazy::new(f)))
    }

    pub fn force(&self) -> &A {
        Lazy::force(&self.0)
    }
}

impl<A> Clone for Thunk<A> {
    fn clone(&self) -> Self {
        Thunk(Rc::clone(&self.0))
    }
}

// ============================================================================
// IT
// ============================================================================

/// Outcome of inspecting a rope while waiting for input.
pub enum Probe<A> {
    /// Enough input is available; continue with this value.
    Satisfied(A),
    /// Keep waiting; this is the answer if nothing more arrives.
    Waiting(Thunk<A>),
}

type Resume<A> = Rc<dyn Fn(&Rope) -> It<A>>;

/// A suspended computation.
pub struct Pending<A> {
    best: Thunk<A>,
    seen: Option<Rope>,
    resume: Resume<A>,
}

/// A computation that is finished or waiting for the rope to grow.
pub enum It<A> {
    Ready(A),
    Pending(Pending<A>),
}

impl<A> Clone for Pending<A> {
    fn clone(&self) -> Self {
        Self {
            best: self.best.clone(),
            seen: self.seen.clone(),
            resume: Rc::clone(&self.resume),
        }
    }
}

impl<A: Clone> Clone for It<A> {
    fn clone(&self) -> Self {
        match self {
            It::Ready(a) => It::Ready(a.clone()),
            It::Pending(p) => It::Pending(p.clone()),
        }
    }
}

impl<A> fmt::Debug for It<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            It::Ready(_) => write!(f, "It::Ready(..)"),
            It::Pending(p) => write!(f, "It::Pending {{ fresh: {} }}", p.seen.is_none()),
        }
    }
}

impl<A: Clone + 'static> It<A> {
    pub fn ready(value: A) -> Self {
        It::Ready(value)
    }

    /// Wait until `probe` is satisfied by some rope. `default` is the answer
    /// if the input ends before the probe has been consulted at all.
    pub fn want(default: Thunk<A>, probe: impl Fn(&Rope) -> Probe<A> + 'static) -> Self {
        It::Pending(Pending {
            best: default,
            seen: None,
            resume: waiting(Rc::new(probe)),
        })
    }

    /// Run `f` the next time the computation is pumped.
    ///
    /// The work then starts from the driver's loop instead of from the call
    /// stack that built the suspension, so long chains of continuations can
    /// be cut into pieces of bounded depth.
    pub fn defer(f: impl Fn() -> It<A> + 'static) -> Self {
        let f = Rc::new(f);
        let fallback = Rc::clone(&f);
        It::want(Thunk::lazy(move || fallback()), move |_: &Rope| {
            Probe::Satisfied(f())
        })
        .join()
    }

    /// Read the rope the computation is currently being driven with.
    pub fn peek(read: impl Fn(&Rope) -> A + 'static) -> Self {
        let read = Rc::new(read);
        let fallback = Rc::clone(&read);
        It::want(Thunk::lazy(move || fallback(&Rope::new())), move |rope| {
            Probe::Satisfied(read(rope))
        })
    }

    /// Sequence a computation after this one.
    pub fn bind<B: Clone + 'static>(self, f: Rc<dyn Fn(A) -> It<B>>) -> It<B> {
        match self {
            It::Ready(a) => f(a),
            It::Pending(Pending { best, seen, resume }) => {
                let best = {
                    let f = Rc::clone(&f);
                    let seen = seen.clone();
                    Thunk::lazy(move || {
                        let next = f(best.force().clone());
                        match &seen {
                            Some(rope) => next.starve(rope),
                            None => next.extract(),
                        }
                    })
                };
                let resume: Resume<B> =
                    Rc::new(move |rope: &Rope| resume(rope).bind(Rc::clone(&f)));
                It::Pending(Pending { best, seen, resume })
            }
        }
    }

    pub fn and_then<B: Clone + 'static>(self, f: impl Fn(A) -> It<B> + 'static) -> It<B> {
        self.bind(Rc::new(f))
    }

    pub fn map<B: Clone + 'static>(self, f: impl Fn(A) -> B + 'static) -> It<B> {
        self.and_then(move |a| It::Ready(f(a)))
    }

    /// Resume every fresh suspension against `rope` until the computation has
    /// finished or is waiting on input that `rope` does not hold.
    pub fn simplify(self, rope: &Rope) -> Self {
        let mut it = self;
        loop {
            it = match it {
                It::Pending(p) if p.seen.is_none() => (p.resume)(rope),
                other => return other,
            };
        }
    }

    /// Continue with a rope that has grown since this computation last looked.
    pub fn feed(&self, rope: &Rope) -> Self {
        match self {
            It::Ready(a) => It::Ready(a.clone()),
            It::Pending(p) => (p.resume)(rope).simplify(rope),
        }
    }

    /// The answer when no more input will arrive after `rope`.
    pub fn starve(&self, rope: &Rope) -> A {
        self.clone().simplify(rope).extract()
    }

    /// The answer so far, without consulting any rope.
    pub fn extract(&self) -> A {
        match self {
            It::Ready(a) => a.clone(),
            It::Pending(p) => p.best.force().clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, It::Ready(_))
    }
}

impl<A: Clone + 'static> It<It<A>> {
    pub fn join(self) -> It<A> {
        self.bind(Rc::new(|inner: It<A>| inner))
    }
}

fn waiting<A: Clone + 'static>(probe: Rc<dyn Fn(&Rope) -> Probe<A>>) -> Resume<A> {
    Rc::new(move |rope: &Rope| match probe(rope) {
        Probe::Satisfied(a) => It::Ready(a),
        Probe::Waiting(best) => It::Pending(Pending {
            best,
            seen: Some(rope.clone()),
            resume: waiting(Rc::clone(&probe)),
        }),
    })
}

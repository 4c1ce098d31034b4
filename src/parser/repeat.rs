//! Repetition.
//!
//! Every repetition is built on [`many_accum`], which refuses to loop on a
//! parser that succeeds without consuming input: such a loop would never
//! end, so it is reported as a committed failure instead.

use im::Vector;
use std::rc::Rc;

use super::{pure, Cursor, Konts, Parser, Value};
use crate::diagnostics::{ErrInfo, Expected, ParseErr};
use crate::it::It;
use crate::parser::Answer;

pub const EMPTY_LOOP: &str =
    "a repetition combinator was applied to a parser that succeeds without consuming input";

type Combine<B, A> = Rc<dyn Fn(B, A) -> B>;

/// The failure for an empty success at `at`, keeping what it expected.
fn empty_loop(at: &Cursor, carried: ParseErr) -> ErrInfo {
    ErrInfo::commit(&at.delta, &at.line, carried + ParseErr::failed(EMPTY_LOOP))
}

/// Run `p` as often as it succeeds, folding the results into `init`.
///
/// Succeeds without consuming input if `p` fails straight away.
pub fn many_accum<A: Value, B: Value>(
    p: &Parser<A>,
    init: B,
    combine: impl Fn(B, A) -> B + 'static,
) -> Parser<B> {
    let p = p.clone();
    let combine: Combine<B, A> = Rc::new(combine);
    Parser::new(move |k: &Konts<B>, cur: Cursor| {
        let eps_ok = {
            let (ce, cur) = (Rc::clone(&k.com_err), cur.clone());
            Rc::new(move |_: A, e: ParseErr| ce(empty_loop(&cur, e)))
        };
        let eps_err = {
            let (eo, init) = (Rc::clone(&k.eps_ok), init.clone());
            Rc::new(move |e: ParseErr| eo(init.clone(), e))
        };
        let com_ok = {
            let (p, combine, k, init) = (p.clone(), Rc::clone(&combine), k.clone(), init.clone());
            Rc::new(move |a: A, x: Expected, at: Cursor| {
                let acc = combine(init.clone(), a);
                walk(&p, &combine, &k, acc, x, at)
            })
        };
        let konts = Konts {
            eps_ok,
            eps_err,
            com_ok,
            com_err: Rc::clone(&k.com_err),
        };
        p.run(&konts, cur)
    })
}

/// The loop after at least one committed success.
fn walk<A: Value, B: Value>(
    p: &Parser<A>,
    combine: &Combine<B, A>,
    k: &Konts<B>,
    acc: B,
    x: Expected,
    at: Cursor,
) -> It<Answer> {
    let eps_ok = {
        let (ce, at) = (Rc::clone(&k.com_err), at.clone());
        Rc::new(move |_: A, e: ParseErr| ce(empty_loop(&at, e)))
    };
    let eps_err = {
        let (co, acc, at) = (Rc::clone(&k.com_ok), acc.clone(), at.clone());
        Rc::new(move |e: ParseErr| {
            let mut expected = e.expected;
            expected.extend(x.iter().cloned());
            co(acc.clone(), expected, at.clone())
        })
    };
    let com_ok = {
        let (p, combine, k) = (p.clone(), Rc::clone(combine), k.clone());
        Rc::new(move |a: A, x: Expected, next: Cursor| {
            let acc = combine(acc.clone(), a);
            walk(&p, &combine, &k, acc, x, next)
        })
    };
    let konts = Konts {
        eps_ok,
        eps_err,
        com_ok,
        com_err: Rc::clone(&k.com_err),
    };
    p.run(&konts, at)
}

/// Zero or more `p`.
pub fn many<A: Value>(p: &Parser<A>) -> Parser<Vector<A>> {
    many_accum(p, Vector::new(), |mut items, a| {
        items.push_back(a);
        items
    })
}

/// One or more `p`.
pub fn some<A: Value>(p: &Parser<A>) -> Parser<Vector<A>> {
    let rest = many(p);
    p.and_then(move |first| {
        rest.map(move |mut items| {
            items.push_front(first.clone());
            items
        })
    })
}

pub fn skip_many<A: Value>(p: &Parser<A>) -> Parser<()> {
    many_accum(p, (), |(), _| ())
}

pub fn skip_some<A: Value>(p: &Parser<A>) -> Parser<()> {
    p.then(&skip_many(p))
}

/// One or more `p` separated by `sep`.
pub fn sep_by1<A: Value, S: Value>(p: &Parser<A>, sep: &Parser<S>) -> Parser<Vector<A>> {
    let rest = many(&sep.then(p));
    p.and_then(move |first| {
        rest.map(move |mut items| {
            items.push_front(first.clone());
            items
        })
    })
}

/// Zero or more `p` separated by `sep`.
pub fn sep_by<A: Value, S: Value>(p: &Parser<A>, sep: &Parser<S>) -> Parser<Vector<A>> {
    sep_by1(p, sep).or(&pure(Vector::new()))
}

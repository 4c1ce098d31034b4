//! Combinators that undo consumption.

use std::fmt::Debug;
use std::rc::Rc;

use super::{optional, pure, unexpected, Konts, Parser, Value};
use crate::diagnostics::{ErrInfo, Expected, ParseErr};
use crate::parser::Cursor;

/// Run `p`, turning a committed failure into an epsilon failure.
///
/// The diagnostic of the abandoned attempt is dropped.
pub fn try_<A: Value>(p: &Parser<A>) -> Parser<A> {
    let p = p.clone();
    Parser::new(move |k, cur| {
        let ee = Rc::clone(&k.eps_err);
        let konts = Konts {
            com_err: Rc::new(move |_: ErrInfo| ee(ParseErr::default())),
            ..k.clone()
        };
        p.run(&konts, cur)
    })
}

/// Run `p` and, if it succeeds, rewind to where it started.
///
/// An epsilon success keeps its carried diagnostic; a committed one is
/// reported as an epsilon success with none.
pub fn look_ahead<A: Value>(p: &Parser<A>) -> Parser<A> {
    let p = p.clone();
    Parser::new(move |k, cur| {
        let eo = Rc::clone(&k.eps_ok);
        let com_ok = Rc::new(move |a: A, _: Expected, _: Cursor| eo(a, ParseErr::default()));
        let konts = Konts {
            com_ok,
            ..k.clone()
        };
        p.run(&konts, cur)
    })
}

/// Succeed without consuming input exactly when `p` would fail here.
pub fn not_followed_by<A: Value + Debug>(p: &Parser<A>) -> Parser<()> {
    let ahead = optional(&look_ahead(p));
    try_(&ahead.and_then(|found| match found {
        Some(a) => unexpected(format!("{a:?}")),
        None => pure(()),
    }))
}

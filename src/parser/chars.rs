//! Character parsers and small structural helpers built on [`satisfy`].

use super::{empty, not_followed_by, pure, satisfy, skip_many, try_, Parser, Value};

pub fn any_char() -> Parser<char> {
    satisfy(|_| true)
}

pub fn char_(expected: char) -> Parser<char> {
    satisfy(move |c| c == expected).label(format!("{expected:?}"))
}

/// Any character contained in `set`.
pub fn one_of(set: &str) -> Parser<char> {
    let set = set.to_string();
    satisfy(move |c| set.contains(c))
}

/// Any character not contained in `set`.
pub fn none_of(set: &str) -> Parser<char> {
    let set = set.to_string();
    satisfy(move |c| !set.contains(c))
}

pub fn digit() -> Parser<char> {
    satisfy(|c| c.is_ascii_digit()).label("digit")
}

pub fn letter() -> Parser<char> {
    satisfy(char::is_alphabetic).label("letter")
}

pub fn alpha_num() -> Parser<char> {
    satisfy(char::is_alphanumeric).label("letter or digit")
}

pub fn space() -> Parser<char> {
    satisfy(char::is_whitespace).label("space")
}

/// Skip any amount of white space.
pub fn spaces() -> Parser<()> {
    skip_many(&space()).label("white space")
}

pub fn newline() -> Parser<char> {
    char_('\n').label("new-line")
}

/// Match `s` exactly. Input is consumed only on a full match; a partial
/// match fails without consuming anything.
pub fn string(s: &str) -> Parser<String> {
    let text = s.to_string();
    let chars = s
        .chars()
        .fold(pure(()), |acc, c| acc.then(&char_(c).map(|_| ())));
    try_(&chars)
        .map(move |()| text.clone())
        .label(format!("{s:?}"))
}

/// Succeed only where the input has ended.
pub fn eof() -> Parser<()> {
    not_followed_by(&any_char()).label("end of input")
}

pub fn between<O: Value, C: Value, A: Value>(
    open: &Parser<O>,
    close: &Parser<C>,
    p: &Parser<A>,
) -> Parser<A> {
    open.then(p).skip(close)
}

/// The first of `parsers` that succeeds or consumes input.
pub fn choice<A: Value>(parsers: impl IntoIterator<Item = Parser<A>>) -> Parser<A> {
    parsers
        .into_iter()
        .fold(empty(), |acc: Parser<A>, p| acc.or(&p))
}

//! A logfmt grammar: one record per line, made of `key=value` pairs.
//!
//! ```text
//! level=info msg="request served" status=200 path=/health
//! ```
//!
//! Values are either bare (anything up to the next blank) or double quoted
//! with `\"`, `\\`, `\n` and `\t` escapes. Blank lines are records with no
//! fields.

use serde::Serialize;

use crate::parser::{
    any_char, char_, choice, eof, look_ahead, many, newline, none_of, optional, position,
    satisfy, skip_many, some, Parser,
};

/// One `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// The fields of one line, with its one-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn blanks() -> Parser<()> {
    skip_many(&satisfy(|c| c == ' ' || c == '\t'))
}

fn key() -> Parser<String> {
    some(&satisfy(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')))
        .map(|cs| cs.iter().collect())
        .label("key")
}

fn escape() -> Parser<char> {
    char_('\\').then(&any_char()).map(|c| match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    })
}

fn quoted() -> Parser<String> {
    let body = many(&escape().or(&none_of("\"\\\n")));
    char_('"')
        .then(&body)
        .skip(&char_('"').label("closing quote"))
        .map(|cs| cs.iter().collect())
}

fn bare() -> Parser<String> {
    many(&none_of(" \t\r\n\"")).map(|cs| cs.iter().collect())
}

pub fn field() -> Parser<Field> {
    key()
        .skip(&char_('='))
        .zip(&quoted().or(&bare()))
        .map(|(key, value)| Field { key, value })
}

fn line_end() -> Parser<()> {
    let crlf = optional(&char_('\r')).then(&newline());
    choice([crlf.map(|_| ()), eof()]).label("end of line")
}

/// One line of logfmt. Fails without consuming input at the end of the
/// stream, so it can be repeated.
pub fn record() -> Parser<Record> {
    let fields = many(&field().skip(&blanks()));
    look_ahead(&any_char())
        .then(&position())
        .skip(&blanks())
        .zip(&fields)
        .skip(&line_end())
        .map(|(at, fields)| Record {
            line: at.line + 1,
            fields: fields.into_iter().collect(),
        })
}

/// A whole logfmt document.
pub fn document() -> Parser<Vec<Record>> {
    many(&record())
        .skip(&eof())
        .map(|records| records.into_iter().collect())
}

//! Whole-input entry points.
//!
//! These wrap the [`Step`] driver for the common cases: a string already in
//! memory, a file on disk, or a reader consumed in chunks.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::delta::Delta;
use crate::diagnostics::{ErrInfo, ParseErr};
use crate::error::TrefoilError;
use crate::parser::repeat::EMPTY_LOOP;
use crate::parser::{position, Parser, Value};
use crate::rope::{Line, Rope};
use crate::step::{step_parser, ParseResult, Step};

/// Chunk size used when the caller does not pick one.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Parse all of `text`, starting at `delta`.
pub fn parse_str<A: Value>(p: &Parser<A>, delta: Delta, text: &str) -> ParseResult<A> {
    step_parser(p, delta).feed(text).starve()
}

/// Parse the contents of the file at `path`. Positions are named after it.
pub fn parse_file<A: Value>(
    p: &Parser<A>,
    path: impl AsRef<Path>,
) -> Result<ParseResult<A>, TrefoilError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| TrefoilError::io(path, source))?;
    debug!(path = %path.display(), bytes = text.len(), "parsing file");
    Ok(parse_str(p, Delta::named(path.display().to_string()), &text))
}

/// Parse everything `reader` yields, feeding it in chunks of `chunk_size`
/// bytes.
pub fn parse_reader<A: Value>(
    p: &Parser<A>,
    delta: Delta,
    reader: impl Read,
    chunk_size: usize,
) -> Result<ParseResult<A>, TrefoilError> {
    let name = delta.source_name().to_string();
    let mut step = step_parser(p, delta);
    for chunk in Chunks::new(reader, chunk_size, name) {
        step = step.feed(&chunk?);
    }
    Ok(step.starve())
}

/// Parse `reader` as a sequence of `item`s, handing each one to `emit` as
/// soon as the parse of it is decided.
///
/// Returns how many items were emitted, or the first failure. An item that
/// succeeds without consuming input before the end of the stream is an
/// error, since it would repeat forever.
pub fn parse_each<A: Value>(
    item: &Parser<A>,
    start: Delta,
    reader: impl Read,
    chunk_size: usize,
    mut emit: impl FnMut(A),
) -> Result<ParseResult<usize>, TrefoilError> {
    let item = item.zip(&position());
    let name = start.source_name().to_string();
    let mut count = 0;
    let mut from = start.clone();
    let mut step = step_parser(&item, start);
    for chunk in Chunks::new(reader, chunk_size, name) {
        step = step.feed(&chunk?);
        while let Step::Done(rope, (a, end)) = &step {
            let (rope, a, end) = (rope.clone(), a.clone(), end.clone());
            if end.bytes == from.bytes {
                return Ok(ParseResult::Failure(stalled(&end, &rope)));
            }
            emit(a);
            count += 1;
            from = end.clone();
            step = step_parser(&item, end.clone()).feed(&rope.slice(end.bytes, rope.end()));
        }
        if let Step::Failed(_, e) = &step {
            return Ok(ParseResult::Failure(e.clone()));
        }
    }
    loop {
        if step.rope().is_empty() {
            info!(count, "stream finished");
            return Ok(ParseResult::Success(count));
        }
        let rope = step.rope().clone();
        match step.starve() {
            ParseResult::Success((a, end)) => {
                if end.bytes == from.bytes {
                    return Ok(ParseResult::Failure(stalled(&end, &rope)));
                }
                emit(a);
                count += 1;
                from = end.clone();
                step = step_parser(&item, end.clone()).feed(&rope.slice(end.bytes, rope.end()));
            }
            ParseResult::Failure(e) => return Ok(ParseResult::Failure(e)),
        }
    }
}

fn stalled(at: &Delta, rope: &Rope) -> ErrInfo {
    let line = rope
        .line_at(at)
        .unwrap_or_else(|| Line::empty(at.bytes));
    ErrInfo::commit(at, &line, ParseErr::failed(EMPTY_LOOP))
}

// ============================================================================
// CHUNKED READING
// ============================================================================

/// UTF-8 text read from `R` in chunks, never splitting a character.
struct Chunks<R> {
    reader: R,
    buffer: Vec<u8>,
    pending: Vec<u8>,
    name: String,
    done: bool,
}

impl<R: Read> Chunks<R> {
    fn new(reader: R, chunk_size: usize, name: String) -> Self {
        Self {
            reader,
            buffer: vec![0; chunk_size.max(4)],
            pending: Vec::new(),
            name,
            done: false,
        }
    }

    fn fail(&mut self, source: io::Error) -> Option<Result<String, TrefoilError>> {
        self.done = true;
        Some(Err(TrefoilError::io(PathBuf::from(&self.name), source)))
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = Result<String, TrefoilError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let n = match self.reader.read(&mut self.buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return self.fail(e),
            };
            if n == 0 {
                self.done = true;
                if self.pending.is_empty() {
                    return None;
                }
                let source = io::Error::new(io::ErrorKind::InvalidData, "stream ends mid-character");
                return self.fail(source);
            }
            self.pending.extend_from_slice(&self.buffer[..n]);
            let valid = match std::str::from_utf8(&self.pending).map(str::len) {
                Ok(len) => len,
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(e) => return self.fail(io::Error::new(io::ErrorKind::InvalidData, e)),
            };
            if valid > 0 {
                let bytes: Vec<u8> = self.pending.drain(..valid).collect();
                return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{char_, digit, many, newline, some};

    fn number_line() -> Parser<u32> {
        some(&digit())
            .skip(&newline())
            .map(|ds| ds.iter().fold(0, |n, d| n * 10 + d.to_digit(10).unwrap_or(0)))
    }

    #[test]
    fn chunks_never_split_characters() {
        let text = "añb€c";
        let chunks: Vec<String> = Chunks::new(text.as_bytes(), 1, "t".into())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(chunks.concat(), text);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let bytes: &[u8] = &[b'a', 0xff, b'b'];
        let result = Chunks::new(bytes, 8, "t".into()).collect::<Result<Vec<_>, _>>();
        assert!(matches!(result, Err(TrefoilError::Io { .. })));
    }

    #[test]
    fn reader_and_string_agree() {
        let p = many(&number_line());
        let text = "1\n22\n333\n";
        let whole = parse_str(&p, Delta::default(), text);
        let chunked = parse_reader(&p, Delta::default(), text.as_bytes(), 2).unwrap();
        assert_eq!(whole, chunked);
    }

    #[test]
    fn parse_each_emits_every_item() {
        let mut seen = Vec::new();
        let result = parse_each(
            &number_line(),
            Delta::default(),
            "1\n22\n333\n".as_bytes(),
            3,
            |n| seen.push(n),
        )
        .unwrap();
        assert_eq!(result, ParseResult::Success(3));
        assert_eq!(seen, [1, 22, 333]);
    }

    #[test]
    fn parse_each_stops_at_the_first_bad_item() {
        let mut seen = Vec::new();
        let result = parse_each(
            &number_line(),
            Delta::default(),
            "1\nx\n3\n".as_bytes(),
            64,
            |n| seen.push(n),
        )
        .unwrap();
        match result {
            ParseResult::Failure(e) => assert_eq!(e.delta().line, 1),
            ParseResult::Success(n) => panic!("unexpected success {n}"),
        }
        assert_eq!(seen, [1]);
    }

    #[test]
    fn parse_each_rejects_items_that_consume_nothing() {
        let result = parse_each(&many(&char_('a')), Delta::default(), "b".as_bytes(), 8, |_| {})
            .unwrap();
        match result {
            ParseResult::Failure(e) => assert_eq!(e.reason(), Some(EMPTY_LOOP)),
            ParseResult::Success(n) => panic!("unexpected success {n}"),
        }
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = parse_file(&digit(), "/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, TrefoilError::Io { .. }));
    }
}

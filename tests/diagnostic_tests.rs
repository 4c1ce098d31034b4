//! Golden master tests for diagnostic output.
//!
//! These tests capture the exact layout of committed parse failures to keep
//! error presentation stable across changes.

use miette::Diagnostic;

use trefoil::{
    char_, digit, newline, parse_str, some, string, Delta, ErrInfo, ParseResult, Parser,
    RenderConfig,
};

fn numbers() -> Parser<Vec<char>> {
    some(&digit())
        .skip(&newline())
        .map(|ds| ds.into_iter().collect())
}

/// Parse `text` as `numbers.txt` and return the failure.
fn failure<A: trefoil::Value + std::fmt::Debug>(p: &Parser<A>, text: &str) -> ErrInfo {
    match parse_str(p, Delta::named("numbers.txt"), text) {
        ParseResult::Failure(e) => e,
        ParseResult::Success(a) => panic!("expected a failure, got {a:?}"),
    }
}

#[test]
fn test_unexpected_character_diagnostic() {
    let output = failure(&numbers(), "123x\n").render(&RenderConfig::default());

    // Golden master snapshot
    let expected = "numbers.txt:1:4: error: expected: digit, new-line
1 | 123x
  |    ^";

    assert_eq!(output, expected);
}

#[test]
fn test_end_of_input_diagnostic() {
    let output = failure(&numbers(), "123").render(&RenderConfig::default());

    // Golden master snapshot
    let expected = "numbers.txt:1:4: error: unexpected end of input, expected: digit, new-line
1 | 123
  |    ^";

    assert_eq!(output, expected);
}

#[test]
fn test_narrow_width_wraps_the_header() {
    let config = RenderConfig::default().with_width(30);
    let output = failure(&numbers(), "123").render(&config);

    // Golden master snapshot
    let expected = "numbers.txt:1:4: error:
    unexpected end of input,
    expected: digit, new-line
1 | 123
  |    ^";

    assert_eq!(output, expected);
    assert!(output.lines().all(|line| line.len() <= 30));
}

#[test]
fn test_failure_on_a_later_line() {
    let p = some(&numbers());
    let output = failure(&p, "1\n22\n3 3\n").render(&RenderConfig::default());

    // Golden master snapshot
    let expected = "numbers.txt:3:2: error: expected: digit, new-line
3 | 3 3
  |  ^";

    assert_eq!(output, expected);
}

#[test]
fn test_footnotes_follow_the_excerpt() {
    let key = string("key").note("keys are spelled in lowercase");
    let p = char_('(').then(&key);
    let output = failure(&p, "(KEY)").render(&RenderConfig::default());

    // Golden master snapshot
    let expected = "numbers.txt:1:2: error: expected: \"key\"
1 | (KEY)
  |  ^
note: keys are spelled in lowercase";

    assert_eq!(output, expected);
}

#[test]
fn test_display_uses_the_default_layout() {
    let info = failure(&numbers(), "12a\n");
    assert_eq!(info.to_string(), info.render(&RenderConfig::default()));
}

#[test]
fn test_miette_diagnostic_points_at_the_caret() {
    let info = failure(&numbers(), "123x\n");
    let diagnostic = info.diagnostic();

    assert_eq!(
        diagnostic.message(),
        "numbers.txt:1:4: expected: digit, new-line"
    );
    assert_eq!(
        diagnostic.code().map(|c| c.to_string()).as_deref(),
        Some("trefoil::parse")
    );
    let labels: Vec<_> = diagnostic.labels().into_iter().flatten().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].label(), Some("here"));
    assert_eq!((labels[0].offset(), labels[0].len()), (3, 1));
    assert!(diagnostic.help().is_none());
}

#[test]
fn test_miette_diagnostic_carries_footnotes_as_help() {
    let p = char_('(').then(&string("key").note("keys are spelled in lowercase"));
    let diagnostic = failure(&p, "(KEY)").diagnostic();
    assert_eq!(
        diagnostic.help().map(|h| h.to_string()).as_deref(),
        Some("keys are spelled in lowercase")
    );
    assert_eq!(diagnostic.span().offset(), 1);
}

#[test]
fn test_error_at_end_of_input_has_an_empty_span() {
    let diagnostic = failure(&numbers(), "123").diagnostic();
    assert_eq!((diagnostic.span().offset(), diagnostic.span().len()), (3, 0));
}

#[test]
fn test_parse_failure_code_on_errinfo() {
    let info = failure(&numbers(), "x");
    assert_eq!(
        info.code().map(|c| c.to_string()).as_deref(),
        Some("trefoil::parse")
    );
    assert_eq!(info.deltas()[0], *info.delta());
}

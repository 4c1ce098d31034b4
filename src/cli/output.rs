//! Handles all user-facing output for the CLI.
//!
//! Records go to stdout, diagnostics to stderr. Color is used only when the
//! render configuration allows it and the stream is a terminal.

use std::io::{self, IsTerminal};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::RenderConfig;
use crate::diagnostics::ErrInfo;
use crate::logfmt::Record;

fn color_choice(config: &RenderConfig, terminal: bool) -> ColorChoice {
    if config.color && terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

pub fn stdout(config: &RenderConfig) -> StandardStream {
    StandardStream::stdout(color_choice(config, io::stdout().is_terminal()))
}

pub fn stderr(config: &RenderConfig) -> StandardStream {
    StandardStream::stderr(color_choice(config, io::stderr().is_terminal()))
}

/// Print a diagnostic: header in bold red, caret in green, notes in cyan.
pub fn print_error(out: &mut impl WriteColor, info: &ErrInfo, config: &RenderConfig) -> io::Result<()> {
    let layout = info.doc().layout(config);
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    for line in &layout.header {
        writeln!(out, "{line}")?;
    }
    out.reset()?;
    let [source, caret] = &layout.excerpt;
    writeln!(out, "{source}")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(out, "{caret}")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    for note in &layout.notes {
        writeln!(out, "{note}")?;
    }
    out.reset()
}

/// Print one record, as a JSON line or as `line: key=value ...`.
pub fn print_record(out: &mut impl WriteColor, record: &Record, json: bool) -> io::Result<()> {
    if json {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        return writeln!(out, "{line}");
    }
    write!(out, "{}:", record.line)?;
    for field in &record.fields {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, " {}", field.key)?;
        out.reset()?;
        if field.value.contains([' ', '\t', '"']) || field.value.is_empty() {
            write!(out, "={:?}", field.value)?;
        } else {
            write!(out, "={}", field.value)?;
        }
    }
    writeln!(out)
}

/// Print the one-line summary written after a successful check.
pub fn print_summary(out: &mut impl WriteColor, what: &str, count: usize) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "ok")?;
    out.reset()?;
    writeln!(out, ": {count} {what}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logfmt::Field;
    use termcolor::NoColor;

    #[test]
    fn records_print_as_key_value_pairs() {
        let record = Record {
            line: 3,
            fields: vec![
                Field { key: "a".into(), value: "1".into() },
                Field { key: "msg".into(), value: "hi there".into() },
            ],
        };
        let mut out = NoColor::new(Vec::new());
        print_record(&mut out, &record, false).unwrap();
        assert_eq!(String::from_utf8(out.into_inner()).unwrap(), "3: a=1 msg=\"hi there\"\n");

        let mut out = NoColor::new(Vec::new());
        print_record(&mut out, &record, true).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out.into_inner()).unwrap();
        assert_eq!(json["fields"][1]["value"], "hi there");
    }

    #[test]
    fn color_needs_both_config_and_terminal() {
        let config = RenderConfig::default();
        assert_eq!(color_choice(&config, true), ColorChoice::Auto);
        assert_eq!(color_choice(&config, false), ColorChoice::Never);
        let plain = RenderConfig { color: false, ..config };
        assert_eq!(color_choice(&plain, true), ColorChoice::Never);
    }
}

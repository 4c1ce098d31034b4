//! The trefoil command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

use crate::cli::args::{Command, Pattern, TrefoilArgs};
use crate::config::RenderConfig;
use crate::delta::Delta;
use crate::error::TrefoilError;
use crate::logfmt;
use crate::parser::{digit, eof, many, newline, some, Parser};
use crate::run::{parse_each, parse_file};
use crate::step::ParseResult;

pub mod args;
pub mod output;

/// Log filter used when `RUST_LOG` is unset.
pub fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "trefoil=warn",
        1 => "trefoil=debug",
        _ => "trefoil=trace",
    }
}

/// Run a parsed command line. Parse failures are printed and reported
/// through the exit code; other failures are returned.
pub fn run(args: TrefoilArgs) -> Result<ExitCode, TrefoilError> {
    let config = match &args.config {
        Some(path) => RenderConfig::from_yaml_file(path)?,
        None => RenderConfig::default(),
    };
    debug!(?config, "render configuration");
    match args.command {
        Command::Logfmt {
            file,
            chunk_size,
            json,
        } => match file {
            Some(path) => {
                let reader = File::open(&path).map_err(|e| TrefoilError::io(&path, e))?;
                stream_logfmt(reader, Delta::named(path.display().to_string()), chunk_size, json, &config)
            }
            None => stream_logfmt(io::stdin().lock(), Delta::named("<stdin>"), chunk_size, json, &config),
        },
        Command::Check { file, pattern } => check(&file, pattern, &config),
    }
}

fn stream_logfmt(
    reader: impl Read,
    start: Delta,
    chunk_size: usize,
    json: bool,
    config: &RenderConfig,
) -> Result<ExitCode, TrefoilError> {
    let name = start.source_name().to_string();
    let mut out = output::stdout(config);
    let mut write_error = None;
    let result = parse_each(&logfmt::record(), start, reader, chunk_size, |record| {
        if record.is_empty() || write_error.is_some() {
            return;
        }
        if let Err(e) = output::print_record(&mut out, &record, json) {
            write_error = Some(e);
        }
    })?;
    if let Some(e) = write_error {
        return Err(TrefoilError::io(name, e));
    }
    finish(result, config)
}

fn check(path: &Path, pattern: Pattern, config: &RenderConfig) -> Result<ExitCode, TrefoilError> {
    let (what, result) = match pattern {
        Pattern::Digits => ("numbers", parse_file(&digit_lines(), path)?),
        Pattern::Logfmt => {
            let records = logfmt::document().map(|records| records.len());
            ("records", parse_file(&records, path)?)
        }
    };
    if let ParseResult::Success(count) = &result {
        output::print_summary(&mut output::stdout(config), what, *count)
            .map_err(|e| TrefoilError::io(path, e))?;
    }
    finish(result, config)
}

/// One unsigned integer per line.
fn digit_lines() -> Parser<usize> {
    let line_end = newline().map(|_| ()).or(&eof());
    many(&some(&digit()).skip(&line_end))
        .skip(&eof())
        .map(|numbers| numbers.len())
}

fn finish(result: ParseResult<usize>, config: &RenderConfig) -> Result<ExitCode, TrefoilError> {
    match result {
        ParseResult::Success(_) => Ok(ExitCode::SUCCESS),
        ParseResult::Failure(info) => {
            output::print_error(&mut output::stderr(config), &info, config)
                .map_err(|e| TrefoilError::io(info.delta().source_name(), e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::parse_str;

    #[test]
    fn directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "trefoil=warn");
        assert_eq!(directive_for_verbosity(1), "trefoil=debug");
        assert_eq!(directive_for_verbosity(5), "trefoil=trace");
    }

    #[test]
    fn digit_lines_counts_numbers() {
        let result = parse_str(&digit_lines(), Delta::default(), "1\n23\n456");
        assert_eq!(result, ParseResult::Success(3));
        let result = parse_str(&digit_lines(), Delta::default(), "1\n2a\n");
        assert!(!result.is_success());
    }
}

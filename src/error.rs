use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::ErrInfo;

/// Failures outside the parse itself, plus the parse failure when a caller
/// wants a single error type.
#[derive(Debug, Error, Diagnostic)]
pub enum TrefoilError {
    #[error("could not read {}", .path.display())]
    #[diagnostic(code(trefoil::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid render configuration in {}", .path.display())]
    #[diagnostic(code(trefoil::config), help("expected keys: width, ribbon, color"))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(trefoil::parse))]
    Parse(#[from] ErrInfo),
}

impl TrefoilError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrefoilError::Io {
            path: path.into(),
            source,
        }
    }
}

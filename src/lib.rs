//! trefoil: a continuation-passing parser-combinator engine with caret
//! diagnostics and incremental, chunk-fed parsing.
//!
//! Parsers are built from combinators and run either over a complete input
//! ([`parse_str`], [`parse_file`]) or incrementally: [`step_parser`] starts a
//! parse, [`Step::feed`] supplies more input as it arrives, and
//! [`Step::starve`] finishes it.
//!
//! ```rust
//! use trefoil::{char_, digit, parse_str, sep_by, Delta, ParseResult};
//!
//! let list = sep_by(&digit(), &char_(','));
//! match parse_str(&list, Delta::named("input"), "1,2,x") {
//!     ParseResult::Success(_) => unreachable!(),
//!     ParseResult::Failure(e) => {
//!         assert_eq!(e.delta().column, 4);
//!         assert_eq!(e.expected(), ["digit"]);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod delta;
pub mod diagnostics;
pub mod error;
pub mod it;
pub mod logfmt;
pub mod parser;
pub mod rope;
pub mod run;
pub mod step;

pub use crate::config::RenderConfig;
pub use crate::delta::Delta;
pub use crate::diagnostics::{ErrInfo, Expected, ParseDiagnostic, ParseErr, Rendering};
pub use crate::error::TrefoilError;
pub use crate::it::It;
pub use crate::parser::*;
pub use crate::rope::{Line, Rope};
pub use crate::run::{parse_each, parse_file, parse_reader, parse_str};
pub use crate::step::{step_parser, ParseResult, Step};

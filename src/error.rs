// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for seabream parsing and pipeline stages.
//!
//! All loader and stage errors use [`Error`], with variants for each
//! failure mode. No external error crates — zero-dependency error type.
//!
//! A pipeline failure aborts the run: messages name the offending stage
//! and record group so the caller can locate the bad input. No partial
//! output is considered valid.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by seabream loaders and pipeline stages.
#[derive(Debug)]
pub enum Error {
    /// File I/O error with path context.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Unparseable tag identifier or missing required field.
    MalformedInput(String),
    /// A stage yielded zero rows for a group that downstream stages
    /// assume non-empty (e.g. no solar record for a date).
    EmptyResult(String),
    /// A contract the pipeline guarantees was broken (unlabeled record,
    /// broken solar nesting). Surfaced, never masked.
    InvariantViolation(String),
    /// Invalid caller-supplied parameters (bounds, ranges, sizes).
    InvalidInput(String),
}

/// Result type alias for seabream operations.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::MalformedInput(msg) => write!(f, "malformed input: {msg}"),
            Self::EmptyResult(msg) => write!(f, "empty result: {msg}"),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::MalformedInput(_)
            | Self::EmptyResult(_)
            | Self::InvariantViolation(_)
            | Self::InvalidInput(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io_error() {
        let err = Error::Io {
            path: PathBuf::from("data/sun_times/official_sun_times_2021.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("official_sun_times_2021.csv"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn display_all_stage_variants() {
        let cases: Vec<(Error, &str)> = vec![
            (
                Error::MalformedInput("tag 'A69-xx'".into()),
                "malformed input",
            ),
            (
                Error::EmptyResult("no solar day for 2021-07-01".into()),
                "empty result",
            ),
            (
                Error::InvariantViolation("unlabeled record".into()),
                "invariant violation",
            ),
            (Error::InvalidInput("eps must be > 0".into()), "invalid input"),
        ];
        for (err, expected_prefix) in cases {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "'{msg}' should start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_source_chain() {
        let io_err = Error::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::other("inner"),
        };
        assert!(std::error::Error::source(&io_err).is_some());
        assert!(std::error::Error::source(&Error::EmptyResult("y".into())).is_none());
    }
}

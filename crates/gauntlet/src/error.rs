//! Error types for sessions and configuration.
//!
//! Case-level problems never show up here: they are classified as
//! [`Outcome::Fail`](crate::Outcome::Fail) at the invocation boundary.
//! A [`SessionError`] is a fault of the pipeline itself (a malformed
//! case declaration, an I/O failure while writing the report, ...), and
//! it aborts the whole run.

use std::io;

use thiserror::Error;

use crate::arg::ArgKind;

/// Errors that abort a test session.
///
/// # Recovery
///
/// | Variant | Cause |
/// | --- | --- |
/// | [`Arity`](SessionError::Arity) | Fix the generic case's `params`/`with` declarations |
/// | [`Aborted`](SessionError::Aborted) | Raised on purpose by `abort_on_failure` |
/// | [`Config`](SessionError::Config) | Fix the configuration |
/// | [`Io`](SessionError::Io) | The report could not be written |
/// | [`Panic`](SessionError::Panic) | The pipeline panicked outside any case |
#[derive(Error, Debug)]
pub enum SessionError {
    /// A generic case's argument tuple does not fill its declared slots.
    ///
    /// Without the literals the open slots cannot be bound, so the case
    /// cannot even be named. Cases with exact slots only report the same
    /// mistake as an [`ArgMismatch`] failure instead.
    #[error("case '{suite}::{case}' declares {expected} parameter(s) but argument tuple #{tuple} supplies {actual}")]
    Arity {
        /// Suite display name.
        suite: String,
        /// Case display name.
        case: String,
        /// Zero-based tuple index (declaration order).
        tuple: usize,
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied arguments.
        actual: usize,
    },

    /// A case failed while `abort_on_failure` was enabled.
    #[error("aborted after '{suite}::{case}' failed: {message}")]
    Aborted {
        /// Suite display name.
        suite: String,
        /// Case display name.
        case: String,
        /// Top-level failure message.
        message: String,
    },

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Writing the report failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A panic escaped the discovery/run/report pipeline.
    #[error("panic outside of any test case: {0}")]
    Panic(String),
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The report width is too small to lay out the bars.
    #[error("report width {width} is below the minimum of {minimum}")]
    WidthTooSmall {
        /// Requested width.
        width: usize,
        /// Smallest accepted width.
        minimum: usize,
    },

    /// A width override could not be parsed.
    #[error("invalid width: {0:?}")]
    InvalidWidth(String),

    /// A color mode override could not be parsed.
    #[error("invalid color mode: {0:?} (expected auto, always or never)")]
    InvalidColorMode(String),
}

/// An argument tuple that does not fit a case's exact parameter slots.
///
/// Reported as the failure of that one invocation; the session goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgMismatch {
    /// Wrong number of values.
    #[error("declares {expected} parameter(s) but the argument tuple supplies {actual}")]
    Arity {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied arguments.
        actual: usize,
    },

    /// A literal of another kind than its slot declares.
    #[error("parameter #{slot} expects {expected} but the argument tuple supplies {actual}")]
    Kind {
        /// Zero-based parameter slot.
        slot: usize,
        /// Declared kind.
        expected: ArgKind,
        /// Kind of the supplied literal.
        actual: ArgKind,
    },
}

/// A specialized [`Result`] type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! # Gauntlet
//!
//! A test-execution harness with ordered suites, parameterized cases and a
//! color-coded console report.
//!
//! Gauntlet runs registered test suites strictly in sequence and prints:
//! - a live status line per invocation (`PASS`, `SKIP` or `FAIL`)
//! - the cause chain of every failure
//! - session totals with bar graphs
//! - per-suite time shares and time distribution between setup, per-case
//!   hooks and case bodies
//!
//! ## Example
//!
//! ```rust,no_run
//! use gauntlet::prelude::*;
//!
//! #[derive(Default)]
//! struct Arithmetic;
//!
//! impl TestSuite for Arithmetic {
//!     fn cases() -> Vec<Case<Self>> {
//!         vec![
//!             Case::new("addition", |_, args| {
//!                 let (a, b, sum) = (args.get::<i32>(0)?, args.get::<i32>(1)?, args.get::<i32>(2)?);
//!                 ensure!(a + b == sum, "{a} + {b} != {sum}");
//!                 Ok(())
//!             })
//!             .params([Param::of::<i32>(), Param::of::<i32>(), Param::of::<i32>()])
//!             .with(args![1, 2, 3])
//!             .with(args![10, -10, 0]),
//!             Case::test("not_ready", |_| skip!()),
//!         ]
//!     }
//! }
//!
//! fn main() {
//!     std::process::exit(gauntlet::run_tests!(Arithmetic));
//! }
//! ```
//!
//! ## Outcomes
//!
//! Hooks and case bodies return [`Step`]. `?` turns any error into a
//! failure with its source chain, [`skip!`] skips the invocation and
//! panics are caught and reported as failures. A failure whose message is
//! empty is counted without printing its details.
//!
//! ## Status
//!
//! The entry points return the number of failed invocations, or
//! [`SESSION_FAULT_STATUS`] when the run itself could not complete (an
//! invalid case declaration, an unwritable report, ...).

pub mod arg;
pub mod assertions;
pub mod bar;
pub mod case;
pub mod config;
pub mod console;
pub mod error;
pub mod expand;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod session;
pub mod suite;
pub mod timing;

pub use arg::{Arg, ArgKind, Args, FromArg, Param};
pub use case::Case;
pub use config::{ColorMode, Config};
pub use console::Console;
pub use error::{ArgMismatch, ConfigError, Result, SessionError};
pub use expand::{Expansion, Invocation};
pub use outcome::{Cause, Failure, Interrupt, Outcome, Step, Tally, guarded};
pub use runner::SuiteResult;
pub use session::{
    SESSION_FAULT_STATUS, Session, SessionReport, SessionTotals, run_tests, run_tests_with,
    run_units,
};
pub use suite::{Module, SuiteHandle, TestSuite, Unit};
pub use timing::{Bucket, Stopwatch, Timings};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assertions::{assert_seq_eq, assert_set_eq};
    pub use crate::{
        Arg, ArgKind, Args, Case, Config, Failure, Interrupt, Module, Param, Step, TestSuite, Unit,
        args, ensure, fail, skip,
    };
}

/// Runs the given suite types as one module named after the calling
/// module, with the configuration from the environment. Evaluates to the
/// session status.
///
/// ```rust,no_run
/// # use gauntlet::prelude::*;
/// # #[derive(Default)] struct Parser;
/// # impl TestSuite for Parser { fn cases() -> Vec<Case<Self>> { Vec::new() } }
/// # #[derive(Default)] struct Lexer;
/// # impl TestSuite for Lexer { fn cases() -> Vec<Case<Self>> { Vec::new() } }
/// let status: i32 = gauntlet::run_tests!(Parser, Lexer);
/// ```
#[macro_export]
macro_rules! run_tests {
    ($($suite:ty),* $(,)?) => {
        $crate::run_tests(&[$crate::Module::new(::std::module_path!())$(.suite::<$suite>())*])
    };
}

//! Outcome classification.
//!
//! Every suite hook and case body returns a [`Step`]: `Ok` to continue,
//! [`Interrupt::Skip`] to stop and mark the invocation skipped, or
//! [`Interrupt::Fail`] with a [`Failure`] describing what went wrong.
//! Panics are caught at the same boundary and become failures, so plain
//! `assert!`/`assert_eq!` work inside cases.
//!
//! [`attempt`] turns the per-case init, body and cleanup results into a
//! single [`Outcome`], and [`Tally`] counts outcomes.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use backtrace::Backtrace;
use serde::Serialize;

/// Result of a suite hook or a case body.
///
/// `Ok` means "continue".
pub type Step<T = ()> = Result<T, Interrupt>;

/// Why a hook or case body stopped early.
#[derive(Debug)]
pub enum Interrupt {
    /// The invocation is deliberately not executed any further.
    Skip,
    /// The invocation faulted.
    Fail(Failure),
}

impl Interrupt {
    /// Fails with an arbitrary [`anyhow::Error`], keeping its context chain.
    #[must_use]
    pub fn fail(err: impl Into<anyhow::Error>) -> Self {
        Self::Fail(Failure::from_anyhow(&err.into()))
    }
}

impl<E: StdError + Send + Sync + 'static> From<E> for Interrupt {
    fn from(err: E) -> Self {
        Self::Fail(Failure::from_error(&err))
    }
}

impl From<Failure> for Interrupt {
    fn from(failure: Failure) -> Self {
        Self::Fail(failure)
    }
}

/// One entry of a failure's cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// Short label for the fault (error type, `panic`, `assertion`, ...).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

/// A case fault with its cause chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    chain: Vec<Cause>,
    stack: Vec<String>,
}

impl Failure {
    /// Creates a failure with a single message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind("failure", message)
    }

    /// Creates an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::with_kind("assertion", message)
    }

    /// Creates a failure whose top-level entry carries `kind`.
    #[must_use]
    pub fn with_kind(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            chain: vec![Cause {
                kind: kind.into(),
                message: message.into(),
            }],
            stack: Vec::new(),
        }
    }

    /// Builds a failure from an error and every `source()` beneath it.
    #[must_use]
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        let mut failure = Self::with_kind(short_type_name::<E>(), err.to_string());
        let mut source = err.source();
        while let Some(inner) = source {
            failure.chain.push(Cause {
                kind: "caused by".to_string(),
                message: inner.to_string(),
            });
            source = inner.source();
        }
        failure
    }

    /// Builds a failure from an [`anyhow::Error`] and its context chain.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let mut links = err.chain();
        let top = links.next().map(ToString::to_string).unwrap_or_default();
        let mut failure = Self::with_kind("error", top);
        for inner in links {
            failure.chain.push(Cause {
                kind: "caused by".to_string(),
                message: inner.to_string(),
            });
        }
        failure
    }

    fn from_panic(payload: &(dyn Any + Send), record: Option<PanicRecord>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        let mut failure = Self::with_kind("panic", message);
        if let Some(record) = record {
            if let Some(location) = record.location {
                failure.chain.push(Cause {
                    kind: "at".to_string(),
                    message: location,
                });
            }
            failure.stack = record.stack;
        }
        failure
    }

    /// Appends `other`'s chain beneath this one, labelled with `context`.
    #[must_use]
    pub fn caused_by(mut self, context: &str, other: Self) -> Self {
        for cause in other.chain {
            self.chain.push(Cause {
                kind: format!("{context}: {}", cause.kind),
                message: cause.message,
            });
        }
        self.stack.extend(other.stack);
        self
    }

    /// Top-level message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.chain.first().map_or("", |c| c.message.as_str())
    }

    /// The full cause chain, outermost first.
    #[must_use]
    pub fn chain(&self) -> &[Cause] {
        &self.chain
    }

    /// Captured stack context (empty unless backtraces are enabled).
    #[must_use]
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Whether the report should omit the cause chain.
    ///
    /// A failure with a blank top-level message is still counted.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.message().trim().is_empty()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Classification of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Init, body and cleanup completed.
    Pass,
    /// Skipped before or during execution.
    Skip,
    /// Faulted.
    Fail(Failure),
}

impl Outcome {
    /// Status marker printed in the report.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Skip => "SKIP",
            Self::Fail(_) => "FAIL",
        }
    }

    /// Returns true for [`Outcome::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true for [`Outcome::Skip`].
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Returns true for [`Outcome::Fail`].
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// The phase of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Per-case init hook.
    Init,
    /// The case body.
    Body,
    /// Per-case cleanup hook.
    Cleanup,
}

/// Runs the phases of one invocation and classifies the result.
///
/// A `marked_skip` invocation runs nothing. An init fault or skip decides
/// the outcome and cleanup is not run; otherwise cleanup always runs after
/// the body. A body failure wins over a cleanup failure, which is appended
/// to its chain.
pub fn attempt(marked_skip: bool, mut run: impl FnMut(Phase) -> Step) -> Outcome {
    if marked_skip {
        return Outcome::Skip;
    }

    match run(Phase::Init) {
        Ok(()) => {}
        Err(Interrupt::Skip) => return Outcome::Skip,
        Err(Interrupt::Fail(failure)) => return Outcome::Fail(failure),
    }

    let body = run(Phase::Body);
    let cleanup = run(Phase::Cleanup);

    match (body, cleanup) {
        (Err(Interrupt::Fail(failure)), Err(Interrupt::Fail(cleanup))) => {
            Outcome::Fail(failure.caused_by("cleanup", cleanup))
        }
        (Err(Interrupt::Fail(failure)), _) | (_, Err(Interrupt::Fail(failure))) => {
            Outcome::Fail(failure)
        }
        (Err(Interrupt::Skip), _) | (_, Err(Interrupt::Skip)) => Outcome::Skip,
        (Ok(()), Ok(())) => Outcome::Pass,
    }
}

/// Pass/skip/fail counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Passed invocations.
    pub passed: usize,
    /// Skipped invocations.
    pub skipped: usize,
    /// Failed invocations.
    pub failed: usize,
}

impl Tally {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Skip => self.skipped += 1,
            Outcome::Fail(_) => self.failed += 1,
        }
    }

    /// Adds another tally into this one.
    pub fn merge(&mut self, other: &Self) {
        self.passed += other.passed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Total invocations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    /// Share of passed invocations in `[0, 1]`, zero when empty.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        ratio(self.passed, self.total())
    }

    /// Share of skipped invocations in `[0, 1]`, zero when empty.
    #[must_use]
    pub fn skip_rate(&self) -> f64 {
        ratio(self.skipped, self.total())
    }

    /// Share of failed invocations in `[0, 1]`, zero when empty.
    #[must_use]
    pub fn fail_rate(&self) -> f64 {
        ratio(self.failed, self.total())
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Invocation counts are far below 2^52"
)]
fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

// ============================================================================
// Panic capture
// ============================================================================

#[derive(Debug)]
struct PanicRecord {
    location: Option<String>,
    stack: Vec<String>,
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
    static BACKTRACES: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

const MAX_STACK_FRAMES: usize = 16;

/// Installs the process-wide panic hook (once) and sets whether panics on
/// this thread capture a backtrace.
///
/// Inside [`guarded`] the hook records the panic instead of printing it;
/// everywhere else it defers to the previously installed hook.
pub(crate) fn install_panic_capture(backtraces: bool) {
    BACKTRACES.with(|flag| flag.set(backtraces));
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !GUARDED.with(Cell::get) {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
            let stack = if BACKTRACES.with(Cell::get) {
                capture_stack()
            } else {
                Vec::new()
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(PanicRecord { location, stack }));
        }));
    });
}

/// Runs `f`, converting a panic into a [`Failure`].
pub(crate) fn catch<T>(f: impl FnOnce() -> T) -> Result<T, Failure> {
    let was_guarded = GUARDED.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    GUARDED.with(|flag| flag.set(was_guarded));

    result.map_err(|payload| {
        let record = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        Failure::from_panic(payload.as_ref(), record)
    })
}

/// Runs a hook or case body, classifying a panic as [`Interrupt::Fail`].
pub fn guarded<T>(f: impl FnOnce() -> Step<T>) -> Step<T> {
    catch(f).unwrap_or_else(|failure| Err(Interrupt::Fail(failure)))
}

fn capture_stack() -> Vec<String> {
    let bt = Backtrace::new();
    let mut lines = Vec::new();

    for frame in bt.frames() {
        for symbol in frame.symbols() {
            let name = symbol
                .name()
                .map_or_else(|| "<unknown>".to_string(), |n| n.to_string());

            // Panic machinery and this module are noise in the report.
            if name.contains("gauntlet::outcome")
                || name.contains("backtrace::")
                || name.contains("std::panic")
                || name.contains("core::panic")
                || name.starts_with("std::rt::")
            {
                continue;
            }

            let line = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => format!("at {name} ({}:{line})", file.display()),
                _ => format!("at {name}"),
            };
            lines.push(line);
        }
        if lines.len() >= MAX_STACK_FRAMES {
            break;
        }
    }

    lines
}

// ============================================================================
// Macros
// ============================================================================

/// Skips the current case. Never falls through.
///
/// Usable from a case body or any per-case hook; the invocation is
/// classified as skipped no matter what ran before.
#[macro_export]
macro_rules! skip {
    () => {
        return ::std::result::Result::Err($crate::Interrupt::Skip)
    };
}

/// Fails the current case with a formatted message.
///
/// `fail!()` without arguments fails with an empty message, which is
/// counted but not detailed in the report.
#[macro_export]
macro_rules! fail {
    () => {
        return ::std::result::Result::Err($crate::Interrupt::Fail($crate::Failure::assertion("")))
    };
    ($($arg:tt)+) => {
        return ::std::result::Result::Err($crate::Interrupt::Fail($crate::Failure::assertion(
            ::std::format!($($arg)+),
        )))
    };
}

/// Fails the current case unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::fail!("assertion failed: {}", ::std::stringify!($cond));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::fail!($($arg)+);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] io::Error);

    fn phases(init: Step, body: Step, cleanup: Step) -> (Outcome, Vec<Phase>) {
        let mut results = vec![Some(init), Some(body), Some(cleanup)];
        let mut seen = Vec::new();
        let outcome = attempt(false, |phase| {
            seen.push(phase);
            let idx = match phase {
                Phase::Init => 0,
                Phase::Body => 1,
                Phase::Cleanup => 2,
            };
            results[idx].take().unwrap_or(Ok(()))
        });
        (outcome, seen)
    }

    fn failed(message: &str) -> Step {
        Err(Interrupt::Fail(Failure::new(message)))
    }

    #[test]
    fn test_marked_skip_runs_nothing() {
        let mut calls = 0;
        let outcome = attempt(true, |_| {
            calls += 1;
            Ok(())
        });
        assert_eq!(outcome, Outcome::Skip);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_all_phases_ok_is_pass() {
        let (outcome, seen) = phases(Ok(()), Ok(()), Ok(()));
        assert!(outcome.is_pass());
        assert_eq!(seen, vec![Phase::Init, Phase::Body, Phase::Cleanup]);
    }

    #[test]
    fn test_init_failure_skips_body_and_cleanup() {
        let (outcome, seen) = phases(failed("init"), Ok(()), Ok(()));
        assert!(outcome.is_fail());
        assert_eq!(seen, vec![Phase::Init]);
    }

    #[test]
    fn test_body_skip_still_runs_cleanup() {
        let (outcome, seen) = phases(Ok(()), Err(Interrupt::Skip), Ok(()));
        assert!(outcome.is_skip());
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_cleanup_failure_after_skip_is_fail() {
        let (outcome, _) = phases(Ok(()), Err(Interrupt::Skip), failed("cleanup"));
        assert!(outcome.is_fail());
    }

    #[test]
    fn test_body_failure_keeps_cleanup_failure_in_chain() {
        let (outcome, _) = phases(Ok(()), failed("body"), failed("cleanup"));
        let Outcome::Fail(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.message(), "body");
        assert_eq!(failure.chain().len(), 2);
        assert_eq!(failure.chain()[1].kind, "cleanup: failure");
    }

    #[test]
    fn test_error_conversion_keeps_source_chain() {
        fn body() -> Step {
            Err(Outer(io::Error::other("inner")))?;
            Ok(())
        }
        let Err(Interrupt::Fail(failure)) = body() else {
            panic!("expected failure");
        };
        assert_eq!(failure.chain()[0].kind, "Outer");
        assert_eq!(failure.message(), "outer");
        assert_eq!(failure.chain()[1].message, "inner");
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err = anyhow::anyhow!("root").context("while loading");
        let Interrupt::Fail(failure) = Interrupt::fail(err) else {
            panic!("expected failure");
        };
        assert_eq!(failure.message(), "while loading");
        assert_eq!(failure.chain()[1].message, "root");
    }

    #[test]
    fn test_guarded_converts_panic() {
        install_panic_capture(false);
        let step: Step = guarded(|| panic!("boom {}", 7));
        let Err(Interrupt::Fail(failure)) = step else {
            panic!("expected failure");
        };
        assert_eq!(failure.message(), "boom 7");
        assert_eq!(failure.chain()[0].kind, "panic");
        assert_eq!(failure.chain()[1].kind, "at");
        assert!(failure.chain()[1].message.contains("outcome.rs"));
    }

    #[test]
    fn test_guarded_passes_through_step() {
        assert!(guarded(|| Ok::<_, Interrupt>(3)).is_ok());
        assert!(matches!(guarded(|| -> Step { Err(Interrupt::Skip) }), Err(Interrupt::Skip)));
    }

    #[test]
    fn test_silent_failure() {
        assert!(Failure::assertion("").is_silent());
        assert!(Failure::assertion("  ").is_silent());
        assert!(!Failure::assertion("x").is_silent());
    }

    #[test]
    fn test_macros() {
        fn skipper() -> Step {
            skip!();
        }
        fn failer(n: i32) -> Step {
            ensure!(n > 0);
            ensure!(n < 10, "{n} is too big");
            Ok(())
        }
        fn quiet() -> Step {
            fail!();
        }

        assert!(matches!(skipper(), Err(Interrupt::Skip)));
        assert!(failer(5).is_ok());
        match failer(0) {
            Err(Interrupt::Fail(f)) => assert_eq!(f.message(), "assertion failed: n > 0"),
            other => panic!("unexpected {other:?}"),
        }
        match failer(12) {
            Err(Interrupt::Fail(f)) => assert_eq!(f.message(), "12 is too big"),
            other => panic!("unexpected {other:?}"),
        }
        match quiet() {
            Err(Interrupt::Fail(f)) => assert!(f.is_silent()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tally_rates() {
        let mut tally = Tally::default();
        assert_eq!(tally.pass_rate(), 0.0);
        tally.record(&Outcome::Pass);
        tally.record(&Outcome::Skip);
        tally.record(&Outcome::Fail(Failure::new("x")));
        tally.record(&Outcome::Pass);
        assert_eq!(tally.total(), 4);
        assert!((tally.pass_rate() - 0.5).abs() < f64::EPSILON);
        assert!((tally.skip_rate() + tally.fail_rate() - 0.5).abs() < f64::EPSILON);

        let mut sum = Tally::default();
        sum.merge(&tally);
        sum.merge(&tally);
        assert_eq!(sum.failed, 2);
    }
}

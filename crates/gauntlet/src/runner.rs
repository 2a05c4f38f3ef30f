//! Suite runner.
//!
//! Drives one suite from construction to static cleanup:
//!
//! ```text
//! NotStarted -> StaticInit -> Running (Init -> Body -> Cleanup)* -> StaticCleanup -> Done
//! ```
//!
//! Case faults are classified at the invocation boundary and never stop
//! the suite. Static cleanup runs whenever an instance exists, even when
//! the case loop ends with a [`SessionError`]; that error is returned only
//! after the suite has reached `Done`.

use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::case::Case;
use crate::config::Config;
use crate::console::Console;
use crate::error::{Result, SessionError};
use crate::expand::{Expansion, Invocation, case_order};
use crate::outcome::{Failure, Interrupt, Outcome, Phase, Tally, attempt, catch, guarded};
use crate::report;
use crate::suite::TestSuite;
use crate::timing::{Bucket, Stopwatch, Timings};

/// Aggregate of one finished suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteResult {
    /// Display name.
    pub name: String,
    /// Fully qualified name.
    pub path: String,
    /// Name of the module the suite was registered in.
    pub module: String,
    /// Outcome counts.
    pub tally: Tally,
    /// Time per bucket.
    pub timings: Timings,
    /// A static cleanup or teardown fault. Counts are not affected.
    pub fault: Option<Failure>,
}

/// What the cases of a suite will do once static init is over.
enum State {
    /// Run normally.
    Ready,
    /// Skip every invocation.
    Skipped,
    /// Fail every invocation with this cause.
    Broken(Failure),
}

/// Mutable bookkeeping shared by the phases of one suite.
struct SuiteRun<'c, 'w, S> {
    console: &'c mut Console<'w>,
    config: &'c Config,
    instance: Option<S>,
    state: State,
    stopwatch: Stopwatch,
    timings: Timings,
    tally: Tally,
}

/// Runs suite `S`, registered in `module`.
///
/// # Errors
///
/// Returns an error for malformed case declarations, when the report cannot
/// be written, or when `abort_on_failure` escalates a case failure.
pub fn run_suite<S: TestSuite>(
    module: &str,
    console: &mut Console<'_>,
    config: &Config,
) -> Result<SuiteResult> {
    let span = info_span!("suite", name = S::name(), module);
    let _enter = span.enter();

    report::suite_header(console, S::path())?;

    let mut run = SuiteRun::<S> {
        console,
        config,
        instance: None,
        state: State::Ready,
        stopwatch: Stopwatch::start(),
        timings: Timings::default(),
        tally: Tally::default(),
    };

    run.static_init();
    let outcome = match catch(S::cases) {
        Ok(cases) => run.cases(&cases),
        Err(failure) => {
            warn!(message = failure.message(), "case list panicked");
            Ok(Some(failure))
        }
    };
    let fault = run.static_cleanup();

    let fault = match outcome {
        Ok(listing_fault) => listing_fault.or(fault),
        Err(err) => return Err(err),
    };
    if let Some(failure) = &fault {
        report::suite_fault(run.console, failure)?;
    }

    debug!(
        passed = run.tally.passed,
        skipped = run.tally.skipped,
        failed = run.tally.failed,
        "suite done"
    );

    Ok(SuiteResult {
        name: S::name().to_string(),
        path: S::path().to_string(),
        module: module.to_string(),
        tally: run.tally,
        timings: run.timings,
        fault,
    })
}

impl<S: TestSuite> SuiteRun<'_, '_, S> {
    fn static_init(&mut self) {
        self.stopwatch.restart();

        if S::skipped() {
            debug!("suite marked skipped");
            self.state = State::Skipped;
            return;
        }

        match catch(S::default) {
            Ok(mut suite) => {
                self.state = match guarded(|| suite.static_init()) {
                    Ok(()) => State::Ready,
                    Err(Interrupt::Skip) => {
                        debug!("static init skipped the suite");
                        State::Skipped
                    }
                    Err(Interrupt::Fail(failure)) => {
                        warn!(message = failure.message(), "static init failed");
                        State::Broken(failure)
                    }
                };
                self.instance = Some(suite);
            }
            Err(failure) => {
                warn!(message = failure.message(), "construction failed");
                self.state = State::Broken(failure);
            }
        }

        self.timings.record(Bucket::Ctor, &mut self.stopwatch);
    }

    /// Runs every invocation. A listing fault that must be reported is
    /// returned as `Ok(Some(..))`.
    fn cases(&mut self, cases: &[Case<S>]) -> Result<Option<Failure>> {
        for index in case_order(cases, self.config.filter.as_deref()) {
            let case = &cases[index];
            for invocation in Expansion::new(S::name(), index, case) {
                let invocation = invocation?;
                let line = report::open_case(self.console, &invocation.describe(case.name()))?;
                self.stopwatch.restart();

                let outcome = self.invoke(case, &invocation);

                self.tally.record(&outcome);
                debug!(case = case.name(), tuple = ?invocation.tuple, outcome = outcome.label());
                report::close_case(self.console, line, &outcome)?;
                self.stopwatch.restart();

                if self.config.abort_on_failure {
                    if let Outcome::Fail(failure) = &outcome {
                        return Err(SessionError::Aborted {
                            suite: S::name().to_string(),
                            case: case.name().to_string(),
                            message: failure.message().to_string(),
                        });
                    }
                }
            }
        }
        Ok(None)
    }

    /// Classifies one invocation. Arguments that do not fit the declared
    /// slots fail the body phase; init and cleanup still run around it.
    fn invoke(&mut self, case: &Case<S>, invocation: &Invocation) -> Outcome {
        if case.is_skipped() {
            return Outcome::Skip;
        }

        let suite = match (&self.state, self.instance.as_mut()) {
            (State::Ready, Some(suite)) => suite,
            (State::Broken(cause), _) => {
                return Outcome::Fail(
                    Failure::new("static initialization failed")
                        .caused_by("static init", cause.clone()),
                );
            }
            _ => return Outcome::Skip,
        };

        let timings = &mut self.timings;
        let stopwatch = &mut self.stopwatch;
        attempt(false, |phase| {
            let (step, bucket) = match phase {
                Phase::Init => (guarded(|| suite.init()), Bucket::Init),
                Phase::Body => {
                    let step = match &invocation.mismatch {
                        Some(mismatch) => Err(Interrupt::from(mismatch.clone())),
                        None => guarded(|| case.call(suite, &invocation.args)),
                    };
                    (step, Bucket::Method)
                }
                Phase::Cleanup => (guarded(|| suite.cleanup()), Bucket::Init),
            };
            timings.record(bucket, stopwatch);
            step
        })
    }

    fn static_cleanup(&mut self) -> Option<Failure> {
        self.stopwatch.restart();

        let mut fault = None;
        if let Some(mut suite) = self.instance.take() {
            if let Err(Interrupt::Fail(failure)) = guarded(|| suite.static_cleanup()) {
                warn!(message = failure.message(), "static cleanup failed");
                fault = Some(failure);
            }
            if let Err(failure) = catch(move || drop(suite)) {
                warn!(message = failure.message(), "drop panicked");
                fault.get_or_insert(failure);
            }
        }

        self.timings.record(Bucket::Ctor, &mut self.stopwatch);
        fault
    }
}

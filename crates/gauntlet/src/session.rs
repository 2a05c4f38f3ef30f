//! Test sessions.
//!
//! A [`Session`] discovers the suites registered in a set of modules,
//! orders them by priority (descending) and name (ascending), runs them
//! one after another and renders the full report. [`Session::status`]
//! folds the outcome into the integer status a test binary exits with.

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crossterm::{cursor, terminal};
use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::config::Config;
use crate::console::Console;
use crate::error::{Result, SessionError};
use crate::outcome::{Tally, catch, install_panic_capture};
use crate::report;
use crate::runner::SuiteResult;
use crate::suite::{Module, SuiteHandle, Unit};
use crate::timing::Timings;

/// Status returned when the pipeline itself faulted.
pub const SESSION_FAULT_STATUS: i32 = -1;

/// Session-wide sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTotals {
    /// Outcome counts over all suites.
    pub tally: Tally,
    /// Bucket times over all suites.
    pub timings: Timings,
    /// Wall-clock time of the whole session, report included.
    pub elapsed: Duration,
}

/// Everything a finished session produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Per-suite results, in run order.
    pub suites: Vec<SuiteResult>,
    /// Session-wide sums.
    pub totals: SessionTotals,
}

impl SessionReport {
    /// The failed-invocation count; zero means a clean run.
    #[must_use]
    pub fn status(&self) -> i32 {
        i32::try_from(self.totals.tally.failed).unwrap_or(i32::MAX)
    }
}

/// Orders the suites of `modules` for running: priority descending, then
/// display name ascending. Equal keys keep registration order.
#[must_use]
pub fn discover(modules: &[Module]) -> Vec<(&Module, &dyn SuiteHandle)> {
    let mut suites: Vec<(&Module, &dyn SuiteHandle)> = modules
        .iter()
        .flat_map(|m| m.suites().iter().map(move |s| (m, s.as_ref())))
        .collect();
    suites.sort_by(|(_, a), (_, b)| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.name().cmp(b.name()))
    });
    suites
}

/// A configured test session.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    interactive: bool,
    terminal_width: Option<usize>,
}

impl Session {
    /// Creates a session writing to a non-interactive output.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            interactive: false,
            terminal_width: None,
        }
    }

    /// Declares whether the output is the interactive terminal itself,
    /// which enables colors under [`ColorMode::Auto`](crate::ColorMode::Auto)
    /// and lets status lines detect output printed by the cases.
    #[must_use]
    pub const fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Sets the terminal width used to rewrite wrapped status lines.
    #[must_use]
    pub const fn with_terminal_width(mut self, width: Option<usize>) -> Self {
        self.terminal_width = width;
        self
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every suite in `modules`, writing the report to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, a malformed case
    /// declaration, an aborted run or a failed write.
    pub fn run<W: Write>(&self, modules: &[Module], mut out: W) -> Result<SessionReport> {
        self.config.validate()?;
        install_panic_capture(self.config.backtraces);

        let color = self.config.use_color(self.interactive);
        let mut console = Console::new(&mut out, color).with_terminal_width(self.terminal_width);
        if color && self.interactive {
            console = console.with_cursor_query(cursor::position);
        }
        self.run_on(modules, &mut console)
    }

    fn run_on(&self, modules: &[Module], console: &mut Console<'_>) -> Result<SessionReport> {
        let span = info_span!("session", modules = modules.len());
        let _enter = span.enter();

        let started = Instant::now();
        let width = self.config.width;
        let suites = discover(modules);
        info!(suites = suites.len(), "discovered suites");

        let listing: Vec<(&str, &str)> = suites.iter().map(|(m, s)| (m.name(), s.path())).collect();
        report::listing(console, width, &listing)?;

        let mut results = Vec::with_capacity(suites.len());
        let mut totals = SessionTotals::default();
        for (module, suite) in suites {
            let result = suite.run(module.name(), console, &self.config)?;
            totals.tally.merge(&result.tally);
            totals.timings += result.timings;
            results.push(result);
        }

        totals.elapsed = started.elapsed();
        report::summary(console, width, &results, &totals)?;
        report::legend(console, width, !results.is_empty())?;
        console.flush()?;

        info!(
            passed = totals.tally.passed,
            skipped = totals.tally.skipped,
            failed = totals.tally.failed,
            "session done"
        );

        Ok(SessionReport {
            suites: results,
            totals,
        })
    }

    /// Runs the session and returns the status to exit with: the failed
    /// count, or [`SESSION_FAULT_STATUS`] after printing the fault when the
    /// pipeline itself failed or panicked.
    pub fn status<W: Write>(&self, modules: &[Module], mut out: W) -> i32 {
        install_panic_capture(self.config.backtraces);

        let outcome = catch(|| self.run(modules, &mut out)).unwrap_or_else(|failure| {
            Err(SessionError::Panic(failure.message().to_string()))
        });

        match outcome {
            Ok(report) => report.status(),
            Err(err) => {
                error!(error = %err, "session fault");
                let color = self.config.use_color(self.interactive);
                let mut console = Console::new(&mut out, color);
                if let Err(io) = report::critical(&mut console, &err) {
                    warn!(error = %io, "could not print the session fault");
                }
                SESSION_FAULT_STATUS
            }
        }
    }
}

/// Runs `modules` with the configuration from the environment, reporting
/// to stdout. Returns the session status.
#[must_use]
pub fn run_tests(modules: &[Module]) -> i32 {
    match Config::from_env() {
        Ok(config) => run_tests_with(config, modules),
        Err(err) => {
            let mut out = io::stdout();
            let mut console = Console::new(&mut out, false);
            if let Err(io) = report::critical(&mut console, &SessionError::from(err)) {
                warn!(error = %io, "could not print the configuration error");
            }
            SESSION_FAULT_STATUS
        }
    }
}

/// Runs every module of `units`, like [`run_tests`].
#[must_use]
pub fn run_units(units: impl IntoIterator<Item = Unit>) -> i32 {
    let modules: Vec<Module> = units.into_iter().flat_map(Unit::into_modules).collect();
    run_tests(&modules)
}

/// Runs `modules` with `config`, reporting to stdout. Colors follow the
/// config and whether stdout is a terminal.
#[must_use]
pub fn run_tests_with(config: Config, modules: &[Module]) -> i32 {
    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let width = if interactive {
        terminal::size().ok().map(|(columns, _)| usize::from(columns))
    } else {
        None
    };

    Session::new(config)
        .interactive(interactive)
        .with_terminal_width(width)
        .status(modules, stdout.lock())
}

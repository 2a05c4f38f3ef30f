//! Console report sections.
//!
//! Every function here writes one part of the report through a
//! [`Console`]; none of them keeps state between calls.

use std::error::Error as StdError;
use std::io;

use crossterm::style::Color;

use crate::bar::{Segment, render_bar};
use crate::console::{Console, StatusLine, TEXT};
use crate::outcome::{Failure, Outcome, Tally};
use crate::runner::SuiteResult;
use crate::session::SessionTotals;
use crate::timing::{Bucket, Timings, millis};

const CASE_INDENT: &str = "    ";
const DETAIL_INDENT: &str = "       ";
const STACK_INDENT: &str = "     ";

/// Horizontal space the per-suite bars leave for labels.
const SUITE_BAR_MARGIN: usize = 35;
const SUITE_BAR_PADDING: usize = 8;

/// Bar and legend colors.
pub mod colors {
    use crossterm::style::Color;

    /// Passed invocations.
    pub const PASSED: Color = Color::Green;
    /// Skipped invocations.
    pub const SKIPPED: Color = Color::Yellow;
    /// Failed invocations.
    pub const FAILED: Color = Color::Red;
    /// A suite's share of the total time.
    pub const TIME_SHARE: Color = Color::Magenta;
    /// The rest of the total time.
    pub const TIME_REST: Color = Color::Black;
    /// Construction, static init and static cleanup.
    pub const CTOR: Color = Color::DarkBlue;
    /// Per-case init and cleanup.
    pub const INIT: Color = Color::Blue;
    /// Case bodies.
    pub const METHOD: Color = Color::Cyan;
}

/// Writes `═══ TEXT ═══` spanning `width` columns.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn banner(console: &mut Console<'_>, text: &str, width: usize) -> io::Result<()> {
    let line_width = width.saturating_sub(text.chars().count() + 2);
    let line = "═".repeat(line_width / 2);
    let odd = if line_width % 2 == 0 { "" } else { "═" };
    console.println(&format!("{line} {text} {line}{odd}"), TEXT)
}

/// Writes the opening banner and the list of discovered suites.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn listing(console: &mut Console<'_>, width: usize, suites: &[(&str, &str)]) -> io::Result<()> {
    banner(console, "UNIT TESTS", width)?;
    console.newline()?;
    console.println(&format!("Testing {} suite(s):", suites.len()), TEXT)?;
    for (module, path) in suites {
        console.println(&format!("  [{module}] {path}"), TEXT)?;
    }
    console.newline()
}

/// Writes the header line of one suite.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn suite_header(console: &mut Console<'_>, path: &str) -> io::Result<()> {
    console.println(&format!("  Testing suite '{path}'"), TEXT)
}

/// Opens the status line of one invocation.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn open_case(console: &mut Console<'_>, description: &str) -> io::Result<StatusLine> {
    console.open_status(CASE_INDENT, &format!(" Testing {description}"))
}

/// Fills in the status of one invocation, followed by failure details.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn close_case(console: &mut Console<'_>, line: StatusLine, outcome: &Outcome) -> io::Result<()> {
    let color = match outcome {
        Outcome::Pass => colors::PASSED,
        Outcome::Skip => colors::SKIPPED,
        Outcome::Fail(_) => colors::FAILED,
    };
    console.close_status(line, outcome.label(), color)?;

    if let Outcome::Fail(failure) = outcome {
        failure_details(console, failure)?;
    }
    Ok(())
}

/// Writes a failure's cause chain and stack context, unless it is silent.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn failure_details(console: &mut Console<'_>, failure: &Failure) -> io::Result<()> {
    if failure.is_silent() {
        return Ok(());
    }
    for cause in failure.chain() {
        console.println(
            &format!("{DETAIL_INDENT}[{}] {}", cause.kind, cause.message),
            colors::FAILED,
        )?;
    }
    for frame in failure.stack() {
        console.println(&format!("{STACK_INDENT}{frame}"), colors::FAILED)?;
    }
    console.set_foreground(TEXT)
}

/// Writes a suite-level fault that did not affect the counts.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn suite_fault(console: &mut Console<'_>, failure: &Failure) -> io::Result<()> {
    console.println(
        &format!("{CASE_INDENT}suite fault: {}", failure.message()),
        colors::FAILED,
    )?;
    failure_details(console, failure)
}

fn percent(rate: f64) -> String {
    format!("{:7.3}", rate * 100.0)
}

fn tally_bar(tally: &Tally) -> [Segment; 3] {
    [
        Segment::new(tally.pass_rate(), colors::PASSED),
        Segment::new(tally.skip_rate(), colors::SKIPPED),
        Segment::new(tally.fail_rate(), colors::FAILED),
    ]
}

/// Writes the `TEST RESULTS` block: session bar, totals, and one detail
/// block per suite.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn summary(
    console: &mut Console<'_>,
    width: usize,
    suites: &[SuiteResult],
    totals: &SessionTotals,
) -> io::Result<()> {
    let tally = &totals.tally;
    let total_time = totals.timings.total();

    console.newline()?;
    banner(console, "TEST RESULTS", width)?;
    console.newline()?;

    render_bar(console, 0, width, "", &tally_bar(tally))?;
    console.newline()?;
    for line in [
        format!("    SUITES:      {:3}", suites.len()),
        format!("    INVOCATIONS: {:3}", tally.total()),
        format!("    PASSED:      {:3} ({} %)", tally.passed, percent(tally.pass_rate())),
        format!("    SKIPPED:     {:3} ({} %)", tally.skipped, percent(tally.skip_rate())),
        format!("    FAILED:      {:3} ({} %)", tally.failed, percent(tally.fail_rate())),
        format!("    TIME:        {:9.3} ms", millis(total_time)),
        format!("    ELAPSED:     {:9.3} ms", millis(totals.elapsed)),
        "    DETAILS:".to_string(),
    ] {
        console.println(&line, TEXT)?;
    }

    let bar_width = width.saturating_sub(SUITE_BAR_MARGIN);
    let session_secs = total_time.as_secs_f64();

    for suite in suites {
        let timings = &suite.timings;
        let share = if session_secs <= f64::EPSILON {
            0.0
        } else {
            timings.total().as_secs_f64() / session_secs
        };

        console.newline()?;
        suite_details(console, suite, share)?;

        render_bar(
            console,
            SUITE_BAR_PADDING,
            bar_width,
            "TIME/TOTAL",
            &[
                Segment::new(share, colors::TIME_SHARE),
                Segment::new(1.0 - share, colors::TIME_REST),
            ],
        )?;
        render_bar(
            console,
            SUITE_BAR_PADDING,
            bar_width,
            "TIME DISTR",
            &[
                Segment::new(timings.share(Bucket::Ctor), colors::CTOR),
                Segment::new(timings.share(Bucket::Init), colors::INIT),
                Segment::new(timings.share(Bucket::Method), colors::METHOD),
            ],
        )?;
        render_bar(
            console,
            SUITE_BAR_PADDING,
            bar_width,
            "PASS/SKIP/FAIL",
            &tally_bar(&suite.tally),
        )?;
    }

    console.newline()
}

fn suite_details(console: &mut Console<'_>, suite: &SuiteResult, share: f64) -> io::Result<()> {
    let tally = &suite.tally;
    let timings: &Timings = &suite.timings;
    let bucket = |b: Bucket| {
        format!(
            "{:9.3} ms ({} %)",
            millis(timings.get(b)),
            percent(timings.share(b))
        )
    };

    for line in [
        format!("        SUITE:   {} [{}]", suite.path, suite.module),
        format!("        PASSED:  {:3} ({} %)", tally.passed, percent(tally.pass_rate())),
        format!("        SKIPPED: {:3} ({} %)", tally.skipped, percent(tally.skip_rate())),
        format!("        FAILED:  {:3} ({} %)", tally.failed, percent(tally.fail_rate())),
        format!(
            "        TIME:    {:9.3} ms ({} %)",
            millis(timings.total()),
            percent(share)
        ),
        format!("            SETUP AND TEARDOWN:         {}", bucket(Bucket::Ctor)),
        format!("            INITIALIZATION AND CLEANUP: {}", bucket(Bucket::Init)),
        format!("            CASE BODIES:                {}", bucket(Bucket::Method)),
    ] {
        console.println(&line, TEXT)?;
    }

    if let Some(fault) = &suite.fault {
        console.println(
            &format!("        FAULT:   {}", fault.message()),
            colors::FAILED,
        )?;
    }
    Ok(())
}

/// Writes the color legend (only when at least one suite ran) and the
/// closing rule.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn legend(console: &mut Console<'_>, width: usize, any_suites: bool) -> io::Result<()> {
    if any_suites {
        console.println("    GRAPH COLORS:", TEXT)?;
        for (color, description) in [
            (colors::PASSED, "Passed invocations"),
            (colors::SKIPPED, "Skipped invocations"),
            (colors::FAILED, "Failed invocations"),
            (colors::TIME_SHARE, "Time used by the suite (relative to the total time)"),
            (colors::CTOR, "Time used for suite construction, static init and static cleanup"),
            (colors::INIT, "Time used for per-case init and cleanup"),
            (colors::METHOD, "Time used for case bodies"),
        ] {
            console.print("       ███ ", color)?;
            console.println(description, TEXT)?;
        }
        console.newline()?;
    }
    console.println(&"═".repeat(width), TEXT)
}

/// Writes a fault that escaped the pipeline, with its source chain.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn critical(console: &mut Console<'_>, error: &(dyn StdError + 'static)) -> io::Result<()> {
    console.newline()?;
    console.newline()?;
    console.println("--- A CRITICAL ERROR OCCURRED ---:", Color::Red)?;
    console.println(&error.to_string(), Color::Red)?;

    let mut source = error.source();
    while let Some(inner) = source {
        console.println(&format!("  caused by: {inner}"), Color::Red)?;
        source = inner.source();
    }
    console.set_foreground(TEXT)?;
    console.flush()
}

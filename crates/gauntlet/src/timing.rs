//! Per-suite timing buckets.
//!
//! A [`Stopwatch`] measures the time since the last attribution point and
//! restarts on every [`Timings::record`], so no stretch of wall time is
//! counted twice and console writes between phases can be excluded by
//! calling [`Stopwatch::restart`].
//!
//! # Example
//!
//! ```rust
//! use gauntlet::{Bucket, Stopwatch, Timings};
//!
//! let mut sw = Stopwatch::start();
//! let mut timings = Timings::default();
//! timings.record(Bucket::Method, &mut sw);
//! assert!(timings.total() >= timings.method);
//! ```

use std::fmt;
use std::ops::AddAssign;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Restartable stopwatch.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Discards the time elapsed so far.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Elapsed time since the last restart.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns the elapsed time and restarts.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.started);
        self.started = now;
        elapsed
    }
}

/// Timing category of a suite phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Suite construction, static init and static cleanup.
    Ctor,
    /// Per-case init and cleanup.
    Init,
    /// Case bodies.
    Method,
}

impl Bucket {
    /// Label used in trace events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ctor => "ctor",
            Self::Init => "init",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated time per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timings {
    /// Construction and static init/cleanup.
    pub ctor: Duration,
    /// Per-case init and cleanup.
    pub init: Duration,
    /// Case bodies.
    pub method: Duration,
}

impl Timings {
    /// Attributes the stopwatch's lap to `bucket`, restarting it.
    pub fn record(&mut self, bucket: Bucket, stopwatch: &mut Stopwatch) -> Duration {
        let lap = stopwatch.lap();
        self.add(bucket, lap);
        tracing::trace!(bucket = bucket.as_str(), micros = lap.as_micros(), "attributed time");
        lap
    }

    /// Adds `duration` to `bucket`.
    pub fn add(&mut self, bucket: Bucket, duration: Duration) {
        let slot = match bucket {
            Bucket::Ctor => &mut self.ctor,
            Bucket::Init => &mut self.init,
            Bucket::Method => &mut self.method,
        };
        *slot = slot.saturating_add(duration);
    }

    /// Value of a single bucket.
    #[must_use]
    pub const fn get(&self, bucket: Bucket) -> Duration {
        match bucket {
            Bucket::Ctor => self.ctor,
            Bucket::Init => self.init,
            Bucket::Method => self.method,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.ctor
            .saturating_add(self.init)
            .saturating_add(self.method)
    }

    /// Share of `bucket` in this suite's total, zero when nothing was timed.
    #[must_use]
    pub fn share(&self, bucket: Bucket) -> f64 {
        let total = self.total().as_secs_f64();
        if total <= f64::EPSILON {
            0.0
        } else {
            self.get(bucket).as_secs_f64() / total
        }
    }
}

impl AddAssign for Timings {
    fn add_assign(&mut self, rhs: Self) {
        self.add(Bucket::Ctor, rhs.ctor);
        self.add(Bucket::Init, rhs.init);
        self.add(Bucket::Method, rhs.method);
    }
}

/// Milliseconds with fractional part, as printed in the report.
#[must_use]
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

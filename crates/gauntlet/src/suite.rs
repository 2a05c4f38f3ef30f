//! Suite registration.
//!
//! Suites are plain types implementing [`TestSuite`]. They are registered
//! explicitly into a [`Module`]; a [`Unit`] groups modules the way a
//! compiled artifact groups its modules.
//!
//! # Example
//!
//! ```rust
//! use gauntlet::{Case, Module, Step, TestSuite, ensure};
//!
//! #[derive(Default)]
//! struct Strings {
//!     buffer: String,
//! }
//!
//! impl TestSuite for Strings {
//!     fn init(&mut self) -> Step {
//!         self.buffer.clear();
//!         Ok(())
//!     }
//!
//!     fn cases() -> Vec<Case<Self>> {
//!         vec![Case::test("push", |s: &mut Self| {
//!             s.buffer.push('x');
//!             ensure!(s.buffer == "x");
//!             Ok(())
//!         })]
//!     }
//! }
//!
//! let module = Module::new("strings").suite::<Strings>();
//! assert_eq!(module.len(), 1);
//! assert_eq!(module.suites()[0].name(), "Strings");
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::case::Case;
use crate::config::Config;
use crate::console::Console;
use crate::error::Result;
use crate::outcome::{Step, short_type_name};
use crate::runner::{SuiteResult, run_suite};

/// A test suite: a group of cases sharing hooks and an ordering priority.
///
/// Only [`cases`](TestSuite::cases) is required. The instance is created
/// with [`Default`] right before the suite runs, and dropped after its
/// static cleanup.
pub trait TestSuite: Default + 'static {
    /// Display name, the last segment of the type path by default.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Fully qualified name, shown in listings and headers.
    fn path() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Ordering priority; higher runs first.
    fn priority() -> u32 {
        0
    }

    /// Skips the whole suite without instantiating it.
    fn skipped() -> bool {
        false
    }

    /// The suite's cases, in any order.
    fn cases() -> Vec<Case<Self>>;

    /// Runs once, before the first case.
    fn static_init(&mut self) -> Step {
        Ok(())
    }

    /// Runs once, after the last case, however the cases went.
    fn static_cleanup(&mut self) -> Step {
        Ok(())
    }

    /// Runs before every invocation.
    fn init(&mut self) -> Step {
        Ok(())
    }

    /// Runs after every invocation whose init succeeded.
    fn cleanup(&mut self) -> Step {
        Ok(())
    }
}

/// Type-erased view of a registered suite.
pub trait SuiteHandle {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Fully qualified name.
    fn path(&self) -> &'static str;

    /// Ordering priority.
    fn priority(&self) -> u32;

    /// Whether the suite is skipped entirely.
    fn skipped(&self) -> bool;

    /// Runs the suite, writing its section of the report.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed case declarations, when the report
    /// cannot be written, or when `abort_on_failure` escalates a failure.
    fn run(&self, module: &str, console: &mut Console<'_>, config: &Config) -> Result<SuiteResult>;
}

struct Registered<S>(PhantomData<fn() -> S>);

impl<S: TestSuite> SuiteHandle for Registered<S> {
    fn name(&self) -> &'static str {
        S::name()
    }

    fn path(&self) -> &'static str {
        S::path()
    }

    fn priority(&self) -> u32 {
        S::priority()
    }

    fn skipped(&self) -> bool {
        S::skipped()
    }

    fn run(&self, module: &str, console: &mut Console<'_>, config: &Config) -> Result<SuiteResult> {
        run_suite::<S>(module, console, config)
    }
}

/// A named collection of registered suites.
pub struct Module {
    name: String,
    suites: Vec<Box<dyn SuiteHandle>>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suites: Vec::new(),
        }
    }

    /// Registers suite type `S`.
    #[must_use]
    pub fn suite<S: TestSuite>(mut self) -> Self {
        self.suites.push(Box::new(Registered::<S>(PhantomData)));
        self
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered suites, in registration order.
    #[must_use]
    pub fn suites(&self) -> &[Box<dyn SuiteHandle>] {
        &self.suites
    }

    /// Number of registered suites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Whether no suite is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field(
                "suites",
                &self.suites.iter().map(|s| s.path()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A named group of modules, such as everything one crate registers.
#[derive(Debug)]
pub struct Unit {
    name: String,
    modules: Vec<Module>,
}

impl Unit {
    /// Creates an empty unit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    /// Adds a module.
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contained modules.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Consumes the unit, returning its modules.
    #[must_use]
    pub fn into_modules(self) -> Vec<Module> {
        self.modules
    }
}

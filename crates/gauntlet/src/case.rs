//! Case declarations.
//!
//! A [`Case`] is one test operation of a suite: a name, the parameter
//! slots it declares, zero or more literal argument tuples, an optional
//! skip marker, and the body itself.
//!
//! ```rust
//! use gauntlet::{Case, Param, Step, args, ensure};
//!
//! #[derive(Default)]
//! struct Math;
//!
//! let case: Case<Math> = Case::new("addition", |_, args| -> Step {
//!     let (a, b, sum) = (args.get::<i32>(0)?, args.get::<i32>(1)?, args.get::<i32>(2)?);
//!     ensure!(a + b == sum, "{a} + {b} != {sum}");
//!     Ok(())
//! })
//! .params([Param::of::<i32>(), Param::of::<i32>(), Param::of::<i32>()])
//! .with(args![1, 2, 3])
//! .with(args![10, -10, 0]);
//!
//! assert_eq!(case.tuples().len(), 2);
//! ```

use std::fmt;

use crate::arg::{Arg, Args, Param};
use crate::outcome::Step;

type Body<S> = Box<dyn Fn(&mut S, &Args) -> Step>;

/// One test case of suite type `S`.
pub struct Case<S> {
    name: String,
    params: Vec<Param>,
    tuples: Vec<Vec<Arg>>,
    skip: bool,
    body: Body<S>,
}

impl<S> Case<S> {
    /// Declares a case with the given display name and body.
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&mut S, &Args) -> Step + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            tuples: Vec::new(),
            skip: false,
            body: Box::new(body),
        }
    }

    /// Declares a case whose body ignores arguments.
    pub fn test(name: impl Into<String>, body: impl Fn(&mut S) -> Step + 'static) -> Self {
        Self::new(name, move |suite, _| body(suite))
    }

    /// Declares the parameter slots.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Adds one argument tuple. Each tuple yields one invocation, in the
    /// order the tuples were added.
    #[must_use]
    pub fn with(mut self, args: Vec<Arg>) -> Self {
        self.tuples.push(args);
        self
    }

    /// Marks the case as skipped.
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter slots.
    #[must_use]
    pub fn param_list(&self) -> &[Param] {
        &self.params
    }

    /// Declared argument tuples.
    #[must_use]
    pub fn tuples(&self) -> &[Vec<Arg>] {
        &self.tuples
    }

    /// Whether the case is marked skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Whether any slot is an open generic slot.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.params.iter().any(|p| matches!(p, Param::Generic))
    }

    /// Invokes the body.
    pub fn call(&self, suite: &mut S, args: &Args) -> Step {
        (self.body)(suite, args)
    }
}

impl<S> fmt::Debug for Case<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("tuples", &self.tuples)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

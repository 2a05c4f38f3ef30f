//! Case expansion.
//!
//! Turns a declared [`Case`] into the concrete invocations the runner
//! executes: one per argument tuple, in declaration order, or a single
//! argument-less invocation when the case declares neither parameters
//! nor tuples. Open [`Param::Generic`] slots are bound per tuple to the
//! kind of the literal supplied for them.
//!
//! A tuple that does not fit exact slots is the case's own mistake: the
//! invocation is still yielded, carrying an [`ArgMismatch`] that fails it
//! when it runs. A tuple that cannot fill the open slots of a generic case
//! leaves nothing to bind, so it is yielded as a [`SessionError`] and the
//! expansion stops.

use crate::arg::{Arg, ArgKind, Args, Param};
use crate::case::Case;
use crate::error::{ArgMismatch, Result, SessionError};

/// One concrete invocation of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Index of the case in its suite's declaration list.
    pub case: usize,
    /// Zero-based tuple index, `None` for argument-less cases.
    pub tuple: Option<usize>,
    /// Bound arguments.
    pub args: Args,
    /// Resolved parameter kinds, generic slots included.
    pub signature: Vec<ArgKind>,
    /// Why the arguments do not fit the declared slots, if they don't.
    pub mismatch: Option<ArgMismatch>,
}

impl Invocation {
    /// Renders `name(kinds)` plus ` with (args)` when arguments are bound.
    #[must_use]
    pub fn describe(&self, name: &str) -> String {
        let kinds = self
            .signature
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if self.args.is_empty() {
            format!("'{name}({kinds})'")
        } else {
            format!("'{name}({kinds})' with ({})", self.args)
        }
    }
}

/// Lazy, single-pass expansion of one case.
#[derive(Debug)]
pub struct Expansion<'a, S> {
    suite: &'a str,
    index: usize,
    case: &'a Case<S>,
    next: usize,
    done: bool,
}

impl<'a, S> Expansion<'a, S> {
    /// Expands the case at `index` of suite `suite`.
    #[must_use]
    pub const fn new(suite: &'a str, index: usize, case: &'a Case<S>) -> Self {
        Self {
            suite,
            index,
            case,
            next: 0,
            done: false,
        }
    }

    fn is_generic(&self) -> bool {
        self.case.param_list().contains(&Param::Generic)
    }

    fn arity_error(&self, tuple: usize, actual: usize) -> SessionError {
        SessionError::Arity {
            suite: self.suite.to_string(),
            case: self.case.name().to_string(),
            tuple,
            expected: self.case.param_list().len(),
            actual,
        }
    }

    /// The declared kinds, for invocations whose tuple could not be bound.
    fn declared(&self) -> Vec<ArgKind> {
        self.case
            .param_list()
            .iter()
            .filter_map(|p| match p {
                Param::Exact(kind) => Some(*kind),
                Param::Generic => None,
            })
            .collect()
    }

    fn invocation(
        &self,
        tuple: Option<usize>,
        values: &[Arg],
        signature: Vec<ArgKind>,
        mismatch: Option<ArgMismatch>,
    ) -> Invocation {
        Invocation {
            case: self.index,
            tuple,
            args: Args::new(values.to_vec()),
            signature,
            mismatch,
        }
    }

    fn bind(&self, tuple: usize) -> Result<Invocation> {
        let params = self.case.param_list();
        let values = &self.case.tuples()[tuple];

        if values.len() != params.len() {
            if self.is_generic() {
                return Err(self.arity_error(tuple, values.len()));
            }
            let mismatch = ArgMismatch::Arity {
                expected: params.len(),
                actual: values.len(),
            };
            return Ok(self.invocation(Some(tuple), values, self.declared(), Some(mismatch)));
        }

        let mut signature = Vec::with_capacity(params.len());
        let mut mismatch = None;
        for (slot, (param, value)) in params.iter().zip(values).enumerate() {
            let actual = value.kind();
            match *param {
                Param::Generic => signature.push(actual),
                Param::Exact(expected) => {
                    if expected != actual && mismatch.is_none() {
                        mismatch = Some(ArgMismatch::Kind {
                            slot,
                            expected,
                            actual,
                        });
                    }
                    signature.push(expected);
                }
            }
        }

        Ok(self.invocation(Some(tuple), values, signature, mismatch))
    }
}

impl<S> Iterator for Expansion<'_, S> {
    type Item = Result<Invocation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.case.tuples().is_empty() {
            self.done = true;
            let expected = self.case.param_list().len();
            if expected == 0 {
                return Some(Ok(self.invocation(None, &[], Vec::new(), None)));
            }
            if self.is_generic() {
                return Some(Err(self.arity_error(0, 0)));
            }
            let mismatch = ArgMismatch::Arity {
                expected,
                actual: 0,
            };
            return Some(Ok(self.invocation(None, &[], self.declared(), Some(mismatch))));
        }

        if self.next >= self.case.tuples().len() {
            self.done = true;
            return None;
        }

        let tuple = self.next;
        self.next += 1;
        let bound = self.bind(tuple);
        if bound.is_err() {
            self.done = true;
        }
        Some(bound)
    }
}

/// Indices of `cases` in ascending name order (stable for equal names),
/// keeping only names containing `filter` when one is given.
#[must_use]
pub fn case_order<S>(cases: &[Case<S>], filter: Option<&str>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cases.len())
        .filter(|&i| filter.is_none_or(|f| cases[i].name().contains(f)))
        .collect();
    order.sort_by(|&a, &b| cases[a].name().cmp(cases[b].name()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::Arg;
    use crate::args;

    struct Suite;

    fn noop(name: &str) -> Case<Suite> {
        Case::test(name, |_| Ok(()))
    }

    fn collect(case: &Case<Suite>) -> Vec<Result<Invocation>> {
        Expansion::new("Suite", 0, case).collect()
    }

    #[test]
    fn test_plain_case_yields_single_empty_invocation() {
        let invocations = collect(&noop("plain"));
        assert_eq!(invocations.len(), 1);
        let inv = invocations[0].as_ref().expect("plain case expands");
        assert!(inv.args.is_empty());
        assert_eq!(inv.tuple, None);
        assert_eq!(inv.describe("plain"), "'plain()'");
    }

    #[test]
    fn test_one_invocation_per_tuple_in_order() {
        let case = noop("add")
            .params([Param::of::<i32>(), Param::of::<i32>(), Param::of::<i32>()])
            .with(args![1, 2, 3])
            .with(args![10, -10, 0])
            .with(args![-1, 2, 1]);
        let invocations: Vec<Invocation> = collect(&case)
            .into_iter()
            .collect::<Result<_>>()
            .expect("tuples match");

        assert_eq!(invocations.len(), 3);
        assert_eq!(invocations[0].args[0], Arg::I32(1));
        assert_eq!(invocations[1].args[0], Arg::I32(10));
        assert_eq!(invocations[2].args[0], Arg::I32(-1));
        assert_eq!(invocations[1].tuple, Some(1));
        assert_eq!(
            invocations[1].describe("add"),
            "'add(i32, i32, i32)' with (10, -10, 0)"
        );
    }

    #[test]
    fn test_generic_slots_bind_per_tuple() {
        let case = noop("echo")
            .params([Param::Generic, Param::of::<bool>()])
            .with(args![1_u8, true])
            .with(args!["x", false]);
        let invocations: Vec<Invocation> = collect(&case)
            .into_iter()
            .collect::<Result<_>>()
            .expect("generic slots accept any kind");

        assert_eq!(invocations[0].signature, vec![ArgKind::U8, ArgKind::Bool]);
        assert_eq!(invocations[1].signature, vec![ArgKind::Str, ArgKind::Bool]);
    }

    #[test]
    fn test_generic_arity_mismatch_is_session_error_and_stops() {
        let case = noop("bad")
            .params([Param::Generic, Param::Generic])
            .with(args![1])
            .with(args![1, 2]);
        let results = collect(&case);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(SessionError::Arity {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_generic_params_without_tuples_is_session_error() {
        let case = noop("bad").params([Param::Generic]);
        let results = collect(&case);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(SessionError::Arity { actual: 0, .. })));
    }

    #[test]
    fn test_exact_kind_mismatch_fails_only_its_invocation() {
        let case = noop("typed")
            .params([Param::of::<i32>()])
            .with(args!["one"])
            .with(args![1]);
        let invocations: Vec<Invocation> = collect(&case)
            .into_iter()
            .collect::<Result<_>>()
            .expect("exact mismatches do not stop the expansion");

        assert_eq!(invocations.len(), 2);
        assert_eq!(
            invocations[0].mismatch,
            Some(ArgMismatch::Kind {
                slot: 0,
                expected: ArgKind::I32,
                actual: ArgKind::Str,
            })
        );
        assert_eq!(invocations[0].describe("typed"), "'typed(i32)' with (\"one\")");
        assert_eq!(invocations[1].mismatch, None);
    }

    #[test]
    fn test_exact_arity_mismatch_fails_only_its_invocation() {
        let case = noop("sum")
            .params([Param::of::<i32>(), Param::of::<i32>()])
            .with(args![1, 2, 3])
            .with(args![1, 2]);
        let invocations: Vec<Invocation> = collect(&case)
            .into_iter()
            .collect::<Result<_>>()
            .expect("exact mismatches do not stop the expansion");

        assert_eq!(
            invocations[0].mismatch,
            Some(ArgMismatch::Arity {
                expected: 2,
                actual: 3,
            })
        );
        assert_eq!(invocations[0].signature, vec![ArgKind::I32, ArgKind::I32]);
        assert!(invocations[1].mismatch.is_none());
    }

    #[test]
    fn test_exact_params_without_tuples_yield_failing_invocation() {
        let case = noop("typed").params([Param::of::<i32>()]);
        let results = collect(&case);
        assert_eq!(results.len(), 1);
        let inv = results[0].as_ref().expect("exact declarations expand");
        assert_eq!(inv.describe("typed"), "'typed(i32)'");
        assert_eq!(
            inv.mismatch,
            Some(ArgMismatch::Arity {
                expected: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_expansion_is_single_pass() {
        let case = noop("once").with(args![]).with(args![]);
        let mut expansion = Expansion::new("Suite", 0, &case);
        assert_eq!(expansion.by_ref().count(), 2);
        assert!(expansion.next().is_none());
    }

    #[test]
    fn test_case_order_sorts_and_filters() {
        let cases = vec![noop("zeta"), noop("alpha"), noop("mid_alpha"), noop("beta")];
        assert_eq!(case_order(&cases, None), vec![1, 3, 2, 0]);
        assert_eq!(case_order(&cases, Some("alpha")), vec![1, 2]);
    }
}

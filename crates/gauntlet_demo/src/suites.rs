//! The bundled sample suites.
//!
//! Together they exercise every outcome the report can show: passing,
//! failing and skipped cases, parameterized and generic cases, suite
//! priorities and a suite that is skipped as a whole.

use gauntlet::prelude::*;
use tracing::debug;

/// Name of the module the sample suites are registered under.
pub const MODULE: &str = "gauntlet_demo::suites";

/// The module holding every sample suite.
#[must_use]
pub fn module() -> Module {
    Module::new(MODULE)
        .suite::<Sample>()
        .suite::<Collections>()
        .suite::<Literals>()
        .suite::<Pending>()
}

/// The classic sample: one parameterized case and one case per outcome.
#[derive(Default)]
pub struct Sample {
    invocations: usize,
}

impl TestSuite for Sample {
    fn static_init(&mut self) -> Step {
        debug!("sample: static init");
        Ok(())
    }

    fn static_cleanup(&mut self) -> Step {
        debug!(invocations = self.invocations, "sample: static cleanup");
        Ok(())
    }

    fn init(&mut self) -> Step {
        self.invocations += 1;
        Ok(())
    }

    fn cases() -> Vec<Case<Self>> {
        vec![
            Case::new("addition", |_, args| {
                let (a, b, sum) = (args.get::<i32>(0)?, args.get::<i32>(1)?, args.get::<i32>(2)?);
                ensure!(a + b == sum, "{a} + {b} != {sum}");
                Ok(())
            })
            .params([Param::of::<i32>(), Param::of::<i32>(), Param::of::<i32>()])
            .with(args![1, 2, 3])
            .with(args![10, -10, 0])
            .with(args![-1, 2, 1]),
            Case::test("always_succeeds", |_| Ok(())),
            Case::test("always_fails", |_| fail!()),
            Case::test("skips_at_runtime", |_| skip!()),
            Case::test("marked_skipped", |_| Ok(())).skip(),
        ]
    }
}

/// Order-sensitive and order-insensitive comparisons, with a fresh fixture
/// per invocation. Runs first.
#[derive(Default)]
pub struct Collections {
    items: Vec<u32>,
}

impl TestSuite for Collections {
    fn priority() -> u32 {
        10
    }

    fn init(&mut self) -> Step {
        self.items = vec![3, 1, 2];
        Ok(())
    }

    fn cleanup(&mut self) -> Step {
        self.items.clear();
        Ok(())
    }

    fn cases() -> Vec<Case<Self>> {
        vec![
            Case::test("sorted", |suite: &mut Self| {
                suite.items.sort_unstable();
                assert_seq_eq([1, 2, 3], suite.items.iter().copied())
            }),
            Case::test("same_elements", |suite: &mut Self| {
                assert_set_eq([1, 2, 3], suite.items.iter().copied())
            }),
            Case::test("fixture_is_fresh", |suite: &mut Self| {
                ensure!(suite.items.len() == 3, "fixture leaked: {:?}", suite.items);
                suite.items.push(4);
                Ok(())
            }),
        ]
    }
}

/// Exact and generic parameter slots.
#[derive(Default)]
pub struct Literals;

impl TestSuite for Literals {
    fn priority() -> u32 {
        5
    }

    fn cases() -> Vec<Case<Self>> {
        vec![
            Case::new("parse", |_, args| {
                let (text, expected) = (args.get::<&str>(0)?, args.get::<i64>(1)?);
                let parsed: i64 = text.parse()?;
                ensure!(parsed == expected, "{text:?} parsed as {parsed}");
                Ok(())
            })
            .params([Param::of::<&str>(), Param::of::<i64>()])
            .with(args!["42", 42_i64])
            .with(args!["-7", -7_i64]),
            Case::new("displays", |_, args| {
                ensure!(!args[0].to_string().is_empty());
                Ok(())
            })
            .params([Param::Generic])
            .with(args![42_u8])
            .with(args![true])
            .with(args!['x'])
            .with(args![2.5_f64]),
        ]
    }
}

/// A suite that is switched off: listed and counted, never constructed.
#[derive(Default)]
pub struct Pending;

impl TestSuite for Pending {
    fn skipped() -> bool {
        true
    }

    fn cases() -> Vec<Case<Self>> {
        vec![Case::test("not_ready", |_| fail!("must never run"))]
    }
}

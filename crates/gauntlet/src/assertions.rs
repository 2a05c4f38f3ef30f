//! Assertion helpers for case bodies.
//!
//! Unlike `assert_eq!`, these return a [`Step`], so a mismatch fails the
//! case through `?` with a descriptive message instead of a panic.

use std::fmt::Debug;

use crate::outcome::{Failure, Interrupt, Step};

/// Fails unless `expected` and `actual` yield equal items in the same order.
///
/// # Errors
///
/// Returns [`Interrupt::Fail`] naming the first differing position.
///
/// # Example
///
/// ```rust
/// use gauntlet::assertions::assert_seq_eq;
///
/// assert!(assert_seq_eq([1, 2, 3], vec![1, 2, 3]).is_ok());
/// assert!(assert_seq_eq([1, 2], [2, 1]).is_err());
/// ```
pub fn assert_seq_eq<T, I, J>(expected: I, actual: J) -> Step
where
    T: PartialEq + Debug,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    let expected: Vec<T> = expected.into_iter().collect();
    let actual: Vec<T> = actual.into_iter().collect();

    if let Some(index) = expected.iter().zip(&actual).position(|(e, a)| e != a) {
        return Err(mismatch(format!(
            "sequences differ at index {index}: expected {:?}, got {:?}",
            expected[index], actual[index]
        )));
    }
    if expected.len() != actual.len() {
        return Err(mismatch(format!(
            "sequences differ in length: expected {}, got {}",
            expected.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Fails unless `expected` and `actual` have the same length and every item
/// of each is contained in the other, in any order.
///
/// # Errors
///
/// Returns [`Interrupt::Fail`] listing the items missing on either side.
pub fn assert_set_eq<T, I, J>(expected: I, actual: J) -> Step
where
    T: PartialEq + Debug,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    let expected: Vec<T> = expected.into_iter().collect();
    let actual: Vec<T> = actual.into_iter().collect();

    if expected.len() != actual.len() {
        return Err(mismatch(format!(
            "sets differ in size: expected {}, got {}",
            expected.len(),
            actual.len()
        )));
    }

    let missing: Vec<&T> = expected.iter().filter(|e| !actual.contains(e)).collect();
    let unexpected: Vec<&T> = actual.iter().filter(|a| !expected.contains(a)).collect();
    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(mismatch(format!(
            "sets differ: missing {missing:?}, unexpected {unexpected:?}"
        )))
    }
}

fn mismatch(message: String) -> Interrupt {
    Interrupt::Fail(Failure::assertion(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(step: Step) -> String {
        match step {
            Err(Interrupt::Fail(failure)) => failure.message().to_string(),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_seq_eq() {
        assert!(assert_seq_eq(Vec::<i32>::new(), []).is_ok());
        assert_eq!(
            message(assert_seq_eq([1, 2, 3], [1, 5, 3])),
            "sequences differ at index 1: expected 2, got 5"
        );
        assert_eq!(
            message(assert_seq_eq([1, 2], [1, 2, 3])),
            "sequences differ in length: expected 2, got 3"
        );
    }

    #[test]
    fn test_set_eq_ignores_order() {
        assert!(assert_set_eq(["a", "b", "c"], ["c", "a", "b"]).is_ok());
        assert_eq!(
            message(assert_set_eq([1, 2], [1])),
            "sets differ in size: expected 2, got 1"
        );
        assert_eq!(
            message(assert_set_eq([1, 2], [1, 3])),
            "sets differ: missing [2], unexpected [3]"
        );
    }
}

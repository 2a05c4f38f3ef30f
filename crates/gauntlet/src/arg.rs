//! Literal arguments for parameterized cases.
//!
//! A parameterized case receives one [`Args`] tuple per invocation. The
//! values are drawn from a closed set of literal kinds ([`Arg`]), and a
//! case declares what it accepts per slot with [`Param`]: either an exact
//! kind, or an open [`Param::Generic`] slot that is bound to whatever kind
//! the supplied literal turns out to be.
//!
//! # Example
//!
//! ```rust
//! use gauntlet::{Arg, ArgKind, Args, args};
//!
//! let args = Args::new(args![1_i32, "two", 3.0_f64]);
//! assert_eq!(args.get::<i32>(0).ok(), Some(1));
//! assert_eq!(args.get::<&str>(1).ok(), Some("two"));
//! assert_eq!(args[2].kind(), ArgKind::F64);
//! assert!(args.get::<bool>(0).is_err());
//! ```

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::outcome::{Failure, Interrupt, Step};

/// The kind of a literal argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `&str` / `String`
    Str,
}

impl ArgKind {
    /// Rust spelling of the kind, used in case signatures.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "&str",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single literal argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    /// Boolean literal.
    Bool(bool),
    /// Character literal.
    Char(char),
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// String literal.
    Str(String),
}

impl Arg {
    /// Returns the kind of this literal.
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Bool(_) => ArgKind::Bool,
            Self::Char(_) => ArgKind::Char,
            Self::I8(_) => ArgKind::I8,
            Self::U8(_) => ArgKind::U8,
            Self::I16(_) => ArgKind::I16,
            Self::U16(_) => ArgKind::U16,
            Self::I32(_) => ArgKind::I32,
            Self::U32(_) => ArgKind::U32,
            Self::I64(_) => ArgKind::I64,
            Self::U64(_) => ArgKind::U64,
            Self::F32(_) => ArgKind::F32,
            Self::F64(_) => ArgKind::F64,
            Self::Str(_) => ArgKind::Str,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v:?}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v:?}"),
            Self::F64(v) => write!(f, "{v:?}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// Extraction of a typed value out of an [`Arg`].
pub trait FromArg<'a>: Sized {
    /// The kind this type is extracted from.
    const KIND: ArgKind;

    /// Returns the value if `arg` holds [`Self::KIND`].
    fn from_arg(arg: &'a Arg) -> Option<Self>;
}

macro_rules! literal_kinds {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl<'a> FromArg<'a> for $ty {
                const KIND: ArgKind = ArgKind::$variant;

                fn from_arg(arg: &'a Arg) -> Option<Self> {
                    match arg {
                        Arg::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

literal_kinds! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<'a> FromArg<'a> for &'a str {
    const KIND: ArgKind = ArgKind::Str;

    fn from_arg(arg: &'a Arg) -> Option<Self> {
        match arg {
            Arg::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl<'a> FromArg<'a> for String {
    const KIND: ArgKind = ArgKind::Str;

    fn from_arg(arg: &'a Arg) -> Option<Self> {
        match arg {
            Arg::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Declared parameter slot of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// The slot only accepts literals of this kind.
    Exact(ArgKind),
    /// Open slot, bound per tuple to the kind of the supplied literal.
    Generic,
}

impl Param {
    /// Shorthand for an exact slot of the kind `T` is extracted from.
    #[must_use]
    pub const fn of<T: FromArg<'static>>() -> Self {
        Self::Exact(T::KIND)
    }
}

/// One bound argument tuple, handed to a case body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Arg>);

impl Args {
    /// Wraps a tuple of literals.
    #[must_use]
    pub const fn new(values: Vec<Arg>) -> Self {
        Self(values)
    }

    /// An empty tuple (cases without parameters).
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of values in the tuple.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tuple has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the raw literals.
    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }

    /// Extracts the value at `index` as `T`.
    ///
    /// # Errors
    ///
    /// Fails the running case when the slot is missing or holds another kind.
    pub fn get<'a, T: FromArg<'a>>(&'a self, index: usize) -> Step<T> {
        let arg = self.0.get(index).ok_or_else(|| {
            Interrupt::Fail(Failure::new(format!(
                "argument #{index} requested but the tuple has {} value(s)",
                self.0.len()
            )))
        })?;
        T::from_arg(arg).ok_or_else(|| {
            Interrupt::Fail(Failure::new(format!(
                "argument #{index} is {} ({arg}), not {}",
                arg.kind(),
                T::KIND
            )))
        })
    }
}

impl Index<usize> for Args {
    type Output = Arg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

impl From<Vec<Arg>> for Args {
    fn from(values: Vec<Arg>) -> Self {
        Self(values)
    }
}

/// Builds a `Vec<Arg>` from heterogeneous literals.
///
/// ```rust
/// use gauntlet::{Arg, args};
///
/// assert_eq!(args![1_i32, true], vec![Arg::I32(1), Arg::Bool(true)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($value)),+]
    };
}

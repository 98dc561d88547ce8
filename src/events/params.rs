//! # Event payloads.
//!
//! [`Params`] is the variadic payload handed to every listener of a firing
//! round. It is immutable and `Arc`-backed: all concurrent invocations of one
//! round share the same slice.
//!
//! Rendering follows the `[a b c]` convention:
//! ```rust
//! use eventvisor::params;
//!
//! let p = params!["foo", "bar"];
//! assert_eq!(format!("invalid params: {p}"), "invalid params: [foo bar]");
//! assert_eq!(p.len(), 2);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::value::Value;

/// Immutable, shared event payload.
#[derive(Clone, PartialEq)]
pub struct Params(Arc<[Value]>);

impl Params {
    /// Returns an empty payload.
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Returns the single value of a one-element payload.
    #[inline]
    pub fn single(&self) -> Option<&Value> {
        match &*self.0 {
            [v] => Some(v),
            _ => None,
        }
    }

    /// Sums the payload if every value is an integer.
    ///
    /// Returns `None` as soon as a non-integer is found or the sum overflows.
    pub fn sum_ints(&self) -> Option<i64> {
        self.0
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(v.as_int()?))
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for Params {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self(values.into())
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self(Arc::from(vec![value]))
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl FromIterator<Value> for Params {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Builds [`Params`] from a list of values convertible into [`Value`].
///
/// ```rust
/// use eventvisor::{params, Value};
///
/// let p = params![1, 2, 3];
/// assert_eq!(p.sum_ints(), Some(6));
/// assert!(params![].is_empty());
/// assert_eq!(params!["x"].single(), Some(&Value::from("x")));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::empty()
    };
    ($($v:expr),+ $(,)?) => {
        $crate::Params::from(::std::vec![$($crate::Value::from($v)),+])
    };
}

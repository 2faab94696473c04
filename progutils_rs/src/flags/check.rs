//! Value predicates attached to numeric options.

use std::collections::{BTreeSet, HashSet};

use super::convert::FlagValue;

/// Built-in predicates for numeric options and collections of numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    NonZero,
    GreaterThanZero,
}

/// Types a [`Check`] can be applied to.
///
/// Returns the failure message, or `None` when the value passes.
pub trait NumericCheck {
    fn check(&self, check: Check, flag: &str) -> Option<String>;
}

macro_rules! numeric_check {
    ($zero:expr => $($ty:ty),*) => {$(
        impl NumericCheck for $ty {
            fn check(&self, check: Check, flag: &str) -> Option<String> {
                match check {
                    Check::NonZero if *self == $zero => Some(format!("{flag} can't be zero")),
                    Check::GreaterThanZero if *self <= $zero => {
                        Some(format!("{flag} can't be zero or less: {self}"))
                    }
                    _ => None,
                }
            }
        }

        impl ElementCheck for $ty {
            fn fails(&self, check: Check) -> bool {
                match check {
                    Check::NonZero => *self == $zero,
                    Check::GreaterThanZero => *self <= $zero,
                }
            }
        }
    )*};
}

/// Element-wise form of [`NumericCheck`] used by collections.
pub trait ElementCheck {
    fn fails(&self, check: Check) -> bool;
}

numeric_check!(0 => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
numeric_check!(0.0 => f32, f64);

fn check_elements<'a, T, I>(items: I, rendered: String, check: Check, flag: &str) -> Option<String>
where
    T: ElementCheck + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if !items.into_iter().any(|v| v.fails(check)) {
        return None;
    }
    Some(match check {
        Check::NonZero => format!("{flag} can't contain any zero values: {rendered}"),
        Check::GreaterThanZero => {
            format!("{flag} can't contain any values zero or less: {rendered}")
        }
    })
}

impl<T: ElementCheck + FlagValue> NumericCheck for Vec<T>
where
    Vec<T>: FlagValue,
{
    fn check(&self, check: Check, flag: &str) -> Option<String> {
        check_elements(self.iter(), self.to_flag_string(), check, flag)
    }
}

impl<T: ElementCheck + Ord> NumericCheck for BTreeSet<T>
where
    BTreeSet<T>: FlagValue,
{
    fn check(&self, check: Check, flag: &str) -> Option<String> {
        check_elements(self.iter(), self.to_flag_string(), check, flag)
    }
}

impl<T: ElementCheck + Eq + std::hash::Hash> NumericCheck for HashSet<T>
where
    HashSet<T>: FlagValue,
{
    fn check(&self, check: Check, flag: &str) -> Option<String> {
        check_elements(self.iter(), self.to_flag_string(), check, flag)
    }
}

//! Raw argument text into typed program variables.
//!
//! Every bindable type implements [`FlagValue`]: it names itself for help
//! output, parses a raw value, and renders itself back for the parameters file.
//! Collections accept either a comma-separated list or the path of a file
//! whose non-blank lines are the elements.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs_utils;

/// A type that can be bound from a command-line value.
pub trait FlagValue: Sized {
    /// Type name shown in help and dumps.
    fn type_tag() -> String;

    /// Parse `raw`; `flag` is only used in error messages.
    fn from_arg(raw: &str, flag: &str) -> Result<Self>;

    /// Serialized form used for current and default values.
    fn to_flag_string(&self) -> String;

    /// Whether a bare flag with no value can be bound.
    fn accepts_empty() -> bool {
        false
    }
}

/// Element types allowed inside collections.
pub trait Scalar: FlagValue {}

/// Convert `raw` into `T`, treating an empty value for a non-boolean type as an error.
pub fn convert<T: FlagValue>(raw: &str, flag: &str) -> Result<T> {
    if raw.is_empty() && !T::accepts_empty() {
        return Err(Error::Conversion(format!(
            "Argument {flag} requires an option but none was given"
        )));
    }
    T::from_arg(raw, flag)
}

// ============================================================================
// Scalars
// ============================================================================

impl FlagValue for bool {
    fn type_tag() -> String {
        "bool".into()
    }

    fn from_arg(raw: &str, _flag: &str) -> Result<Self> {
        Ok(!raw.eq_ignore_ascii_case("no"))
    }

    fn to_flag_string(&self) -> String {
        self.to_string()
    }

    fn accepts_empty() -> bool {
        true
    }
}
impl Scalar for bool {}

impl FlagValue for String {
    fn type_tag() -> String {
        "string".into()
    }

    fn from_arg(raw: &str, _flag: &str) -> Result<Self> {
        Ok(raw.to_string())
    }

    fn to_flag_string(&self) -> String {
        self.clone()
    }
}
impl Scalar for String {}

impl FlagValue for char {
    fn type_tag() -> String {
        "char".into()
    }

    fn from_arg(raw: &str, _flag: &str) -> Result<Self> {
        Ok(raw.chars().next().unwrap_or(' '))
    }

    fn to_flag_string(&self) -> String {
        self.to_string()
    }
}
impl Scalar for char {}

impl FlagValue for PathBuf {
    fn type_tag() -> String {
        "path".into()
    }

    fn from_arg(raw: &str, _flag: &str) -> Result<Self> {
        Ok(PathBuf::from(raw))
    }

    fn to_flag_string(&self) -> String {
        self.display().to_string()
    }
}
impl Scalar for PathBuf {}

macro_rules! integer_flag_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn type_tag() -> String {
                stringify!($ty).into()
            }

            fn from_arg(raw: &str, flag: &str) -> Result<Self> {
                let trimmed = raw.trim();
                trimmed.parse::<$ty>().map_err(|e| match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::Conversion(
                        format!("{flag}: {trimmed} is out of range for {}", stringify!($ty)),
                    ),
                    _ => Error::Conversion(format!(
                        "{flag}: could not convert {trimmed:?} to {}",
                        stringify!($ty)
                    )),
                })
            }

            fn to_flag_string(&self) -> String {
                if *self == <$ty>::MAX {
                    "None".into()
                } else {
                    self.to_string()
                }
            }
        }
        impl Scalar for $ty {}
    )*};
}

integer_flag_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_flag_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn type_tag() -> String {
                stringify!($ty).into()
            }

            fn from_arg(raw: &str, flag: &str) -> Result<Self> {
                let trimmed = raw.trim();
                let value = trimmed.parse::<$ty>().map_err(|_| {
                    Error::Conversion(format!(
                        "{flag}: could not convert {trimmed:?} to {}",
                        stringify!($ty)
                    ))
                })?;
                if value.is_infinite() && !trimmed.to_ascii_lowercase().contains("inf") {
                    return Err(Error::Conversion(format!(
                        "{flag}: {trimmed} is out of range for {}",
                        stringify!($ty)
                    )));
                }
                Ok(value)
            }

            fn to_flag_string(&self) -> String {
                if *self == <$ty>::MAX {
                    "None".into()
                } else {
                    self.to_string()
                }
            }
        }
        impl Scalar for $ty {}
    )*};
}

float_flag_value!(f32, f64);

// ============================================================================
// Collections
// ============================================================================

/// Element strings for a collection value.
///
/// A value naming a readable file (optionally written `@path`) yields the file's
/// non-blank lines; anything else is split on commas.
pub fn input_values(raw: &str, flag: &str) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let candidate = raw.strip_prefix('@').unwrap_or(raw);
    if fs_utils::is_readable_file(Path::new(candidate)) {
        return fs_utils::read_lines(candidate).map_err(|e| {
            Error::Conversion(format!("{flag}: failed to read values from {candidate}: {e}"))
        });
    }
    Ok(raw.split(',').map(str::to_string).collect())
}

fn join_or_none<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let joined: Vec<String> = items.into_iter().collect();
    if joined.is_empty() {
        "None".into()
    } else {
        joined.join(",")
    }
}

fn duplicate_error(flag: &str, element: &str) -> Error {
    Error::Conversion(format!(
        "Error in processing option: {flag} found {element} more than once"
    ))
}

impl<T: Scalar> FlagValue for Vec<T> {
    fn type_tag() -> String {
        format!("vector<{}>", T::type_tag())
    }

    fn from_arg(raw: &str, flag: &str) -> Result<Self> {
        input_values(raw, flag)?
            .iter()
            .map(|element| T::from_arg(element, flag))
            .collect()
    }

    fn to_flag_string(&self) -> String {
        join_or_none(self.iter().map(FlagValue::to_flag_string))
    }
}

impl<T: Scalar + Ord> FlagValue for BTreeSet<T> {
    fn type_tag() -> String {
        format!("set<{}>", T::type_tag())
    }

    fn from_arg(raw: &str, flag: &str) -> Result<Self> {
        let mut out = BTreeSet::new();
        for element in input_values(raw, flag)? {
            if !out.insert(T::from_arg(&element, flag)?) {
                return Err(duplicate_error(flag, &element));
            }
        }
        Ok(out)
    }

    fn to_flag_string(&self) -> String {
        join_or_none(self.iter().map(FlagValue::to_flag_string))
    }
}

impl<T: Scalar + Eq + Hash> FlagValue for HashSet<T> {
    fn type_tag() -> String {
        format!("unordered_set<{}>", T::type_tag())
    }

    fn from_arg(raw: &str, flag: &str) -> Result<Self> {
        let mut out = HashSet::new();
        for element in input_values(raw, flag)? {
            if !out.insert(T::from_arg(&element, flag)?) {
                return Err(duplicate_error(flag, &element));
            }
        }
        Ok(out)
    }

    fn to_flag_string(&self) -> String {
        let mut rendered: Vec<String> = self.iter().map(FlagValue::to_flag_string).collect();
        rendered.sort();
        join_or_none(rendered)
    }
}

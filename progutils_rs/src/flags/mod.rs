//! Option metadata and typed conversion.
//!
//! - [`convert`] - raw strings into typed values ([`FlagValue`])
//! - [`check`] - value predicates for numeric options
//! - [`flag`] - one declared option
//! - [`registry`] - the options declared by one invocation

pub mod check;
pub mod convert;
pub mod flag;
pub mod registry;

pub use check::{Check, NumericCheck};
pub use convert::{FlagValue, Scalar, convert};
pub use flag::{DEFAULT_GROUP, Flag};
pub use registry::FlagRegistry;

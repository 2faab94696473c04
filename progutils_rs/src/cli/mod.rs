//! Command-line front end.
//!
//! ```text
//! argv ──► tokenizer ──► Invocation ──► CommandTree ──► CommandRegistry ──► handler
//!                                          │                                  │
//!                                          └─► BatchDispatcher (per file) ────┘
//!                                                                             ▼
//!                                                         ProgramSetup binds options
//! ```
//!
//! - [`tokenizer`] - argv into an [`Invocation`]
//! - [`setup`] - typed option binding, help and warnings inside a handler
//! - [`registry`] - one flat group of named handlers
//! - [`tree`] - registries nested into groups, with suggestions on a miss
//! - [`batch`] - one command over many files, sequential or sharded
//! - [`entrypoint`] - the `main` body shared by binaries

pub mod batch;
pub mod entrypoint;
pub mod invocation;
pub mod registry;
pub mod setup;
pub mod tokenizer;
pub mod tree;

pub use batch::{BatchDispatcher, BatchMode, BatchPlan, FileSelector};
pub use entrypoint::{EntryOptions, run, run_with};
pub use invocation::Invocation;
pub use registry::{Command, CommandRegistry, Handler};
pub use setup::{OptionSpec, ProgramSetup};
pub use tokenizer::{tokenize, tokenize_in};
pub use tree::CommandTree;

//! # progutils
//!
//! **Typed option binding and nested sub-command dispatch** for command-line programs
//! that bundle many small tools behind one binary.
//!
//! ## Features
//!
//! - **Tokenizer** - raw argv into an ordered flag/value map plus the sub-program name
//! - **Typed binding** - scalars and collections bound straight into program variables,
//!   with every problem collected before the program gives up
//! - **Grouped help** - aligned, colored help and a tab-delimited parameters file
//! - **Command trees** - registries composed into nested groups, with numbered listings
//! - **Did you mean** - closest command by global alignment score
//! - **Batch fan-out** - run one command over every matching file, optionally sharded
//!   across worker threads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use progutils::cli::{CommandRegistry, CommandTree, EntryOptions, OptionSpec, ProgramSetup, run};
//!
//! let mut registry = CommandRegistry::new("demo");
//! registry.register("greet", |inv| {
//!     let mut setup = ProgramSetup::new(inv);
//!     let mut name = String::new();
//!     setup.option(&mut name, OptionSpec::new("--name,-n", "Who to greet").required());
//!     setup.finish_setup(&mut std::io::stdout())?;
//!     println!("hello {name}");
//!     Ok(0)
//! });
//! let tree = CommandTree::new(registry);
//! let code = run(&tree, std::env::args().collect(), &EntryOptions::new("demo", "0.1.0"));
//! std::process::exit(code);
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Tokenizer, option binding, command registries/trees, batch fan-out and the entry point.
pub mod cli;

/// Error taxonomy shared by every stage of an invocation.
pub mod error;

/// Flag metadata, typed conversion and the per-invocation flag registry.
pub mod flags;

/// Global alignment score used for command suggestions.
pub mod fuzzy;

// ============================================================================
// Support Modules
// ============================================================================

/// ANSI color helpers for help output.
pub mod colors;

/// Environment-driven runtime settings.
pub mod config;

/// File listing and line reading used by conversion and batch planning.
pub mod fs_utils;

/// Terminal progress bar for sequential batches.
pub mod progress;

/// Run logs with timestamps and lap times.
pub mod run_log;

/// Stopwatch with named laps.
pub mod timer;

/// Small shared enums.
pub mod types;

pub use error::{Error, Result};
pub use types::ColorMode;

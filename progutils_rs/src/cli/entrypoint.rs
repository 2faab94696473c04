//! Shared `main` body for binaries built on a [`CommandTree`].
//!
//! Binaries build their tree, then hand the raw process arguments to [`run`],
//! which returns the exit status:
//!
//! - no arguments: print the listing, exit 0
//! - flags but no sub-program: print the listing, exit 1
//! - `--version` / `--dumpversion`: print the version, exit 0
//! - `batch` / `batchThreaded`: fan out through [`BatchDispatcher`]
//! - a number: the n-th listed command of the root registry
//! - anything else: dispatch through the tree, suggesting a name on a miss

use std::io::{self, Write};

use super::batch::{BatchDispatcher, BatchMode};
use super::invocation::Invocation;
use super::tokenizer::tokenize;
use super::tree::CommandTree;
use crate::colors::Painter;
use crate::config::RunnerConfig;
use crate::error::{Error, Result};

/// Options controlling binary-specific behavior.
#[derive(Debug, Clone)]
pub struct EntryOptions {
    /// Name shown in `--version` output.
    pub binary_name: String,
    pub version: String,
    pub config: RunnerConfig,
}

impl EntryOptions {
    /// Options with settings read from the environment.
    pub fn new(binary_name: &str, version: &str) -> Self {
        Self {
            binary_name: binary_name.to_string(),
            version: version.to_string(),
            config: RunnerConfig::from_env(),
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    fn painter(&self) -> Painter {
        Painter::new(self.config.color)
    }
}

/// Run one command line against `tree`, printing to stdout; returns the exit status.
pub fn run(tree: &CommandTree, args: Vec<String>, opts: &EntryOptions) -> i32 {
    let mut stdout = io::stdout();
    match run_with(tree, args, opts, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("{}", opts.painter().error(&e.to_string()));
            }
            e.exit_code()
        }
    }
}

/// [`run`] writing to `out` and returning errors instead of printing them.
pub fn run_with(
    tree: &CommandTree,
    args: Vec<String>,
    opts: &EntryOptions,
    out: &mut dyn Write,
) -> Result<i32> {
    let painter = opts.painter();
    if args.len() < 2 {
        tree.list(out, &painter, true)?;
        return Ok(0);
    }

    let inv = tokenize(args)?;
    if inv.dumping_version() {
        writeln!(out, "{}", opts.version)?;
        return Ok(0);
    }
    if inv.getting_version() {
        writeln!(out, "{} {}", opts.binary_name, opts.version)?;
        return Ok(0);
    }

    if inv.sub_program().is_empty() {
        // Flags without a program name, e.g. `prog --help`.
        tree.list(out, &painter, true)?;
        return Ok(1);
    }

    if let Some(mode) = BatchMode::from_command(inv.sub_program()) {
        tracing::debug!("{} is a batch command ({mode:?})", inv.sub_program_raw());
        return BatchDispatcher::new(tree, painter, opts.config.batch_threads).run(&inv, mode, out);
    }

    if let Ok(n) = inv.sub_program().parse::<usize>() {
        return run_numbered(tree, n, &inv, out, &painter);
    }

    tree.run_program(&inv, out, &painter)
}

fn run_numbered(
    tree: &CommandTree,
    n: usize,
    inv: &Invocation,
    out: &mut dyn Write,
    painter: &Painter,
) -> Result<i32> {
    match tree.registry().dispatch_by_number(n, inv) {
        Err(Error::Dispatch { command, .. }) if command == n.to_string() => {
            tree.report_miss(out, painter, &command, None)?;
            Ok(1)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::registry::CommandRegistry;
    use crate::cli::setup::{OptionSpec, ProgramSetup};
    use crate::types::ColorMode;

    fn opts() -> EntryOptions {
        EntryOptions::new("prog", "1.2.3").with_config(RunnerConfig {
            color: ColorMode::Never,
            ..RunnerConfig::default()
        })
    }

    fn tree() -> CommandTree {
        let mut root = CommandRegistry::new("prog");
        root.register("greet", |inv| {
            let mut setup = ProgramSetup::with_painter(inv, Painter::plain());
            let mut name = String::new();
            setup.option(&mut name, OptionSpec::new("--name", "who").required());
            setup.finish_setup(&mut io::sink())?;
            Ok(if name == "Ada" { 0 } else { 4 })
        })
        .register("fail", |_| {
            Err(Error::Handler {
                command: "fail".into(),
                message: "boom".into(),
            })
        })
        .register("seven", |_| Ok(7));
        let mut math = CommandRegistry::new("mathTools");
        math.register("sum", |_| Ok(0));
        let mut tree = CommandTree::new(root);
        tree.add_child(CommandTree::new(math));
        tree
    }

    fn call(args: &[&str]) -> (Result<i32>, String) {
        let mut out = Vec::new();
        let args = args.iter().map(|a| a.to_string()).collect();
        let result = run_with(&tree(), args, &opts(), &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn no_arguments_lists_programs() {
        let (result, out) = call(&["prog"]);
        assert_eq!(result.expect("listing"), 0);
        assert!(out.starts_with("Programs\n"));
        assert!(out.contains("mathTools\n1) sum"));
    }

    #[test]
    fn version_flags() {
        assert_eq!(call(&["prog", "--version"]).1, "prog 1.2.3\n");
        assert_eq!(call(&["prog", "--dumpversion"]).1, "1.2.3\n");
    }

    #[test]
    fn dispatches_by_name_and_number() {
        assert_eq!(call(&["prog", "GREET", "--name", "Ada"]).0.expect("greet"), 0);
        assert_eq!(call(&["prog", "3"]).0.expect("third"), 7);
        assert_eq!(call(&["prog", "sum"]).0.expect("child"), 0);
        let (result, out) = call(&["prog", "9"]);
        assert_eq!(result.expect("miss is reported"), 1);
        assert!(out.contains("Unrecognized command 9"));
    }

    #[test]
    fn misses_suggest() {
        let (result, out) = call(&["prog", "gret"]);
        assert_eq!(result.expect("miss is reported"), 1);
        assert!(out.contains("Did you mean         greet?"));
    }

    #[test]
    fn errors_map_to_status_one() {
        let (result, _) = call(&["prog", "greet"]);
        let err = result.expect_err("missing --name");
        assert!(err.is_reported());
        assert_eq!(err.exit_code(), 1);

        let (result, _) = call(&["prog", "fail"]);
        assert!(matches!(result, Err(Error::Handler { .. })));

        let (result, _) = call(&["prog", "greet", "---name", "Ada"]);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn leading_flag_without_program() {
        for flag in ["--help", "-h", "--getFlags", "--bogus"] {
            let (result, out) = call(&["prog", flag]);
            assert_eq!(result.expect("listing"), 1, "{flag}");
            assert!(out.starts_with("Programs\n"), "{flag}");
        }
    }
}

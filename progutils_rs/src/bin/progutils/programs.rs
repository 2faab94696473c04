//! Programs bundled with the `progutils` binary.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use progutils::cli::{CommandRegistry, CommandTree, Invocation, OptionSpec, ProgramSetup};
use progutils::flags::Check;
use progutils::{Error, Result};

pub fn build_tree() -> Result<CommandTree> {
    let mut root = CommandRegistry::new("progutils");
    root.register("greet", greet);

    let mut files = CommandRegistry::new("fileTools");
    files.register("countLines", count_lines).register("head", head);
    files.alias_of("wc", "countLines")?;

    let mut math = CommandRegistry::new("mathTools");
    math.register("sum", sum).register("uniq", uniq);

    let mut tree = CommandTree::new(root);
    tree.add_child(CommandTree::new(files))
        .add_child(CommandTree::new(math));
    Ok(tree)
}

fn handler_error(inv: &Invocation, err: anyhow::Error) -> Error {
    Error::Handler {
        command: inv.program_name(),
        message: format!("{err:#}"),
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

// ============================================================================
// Root
// ============================================================================

fn greet(inv: &Invocation) -> Result<i32> {
    let mut setup = ProgramSetup::new(inv);
    setup.set_description("Print a greeting");
    setup.add_example("MASTERPROGRAM SUBPROGRAM --name Ada --times 2 --shout");

    let mut name = String::new();
    let mut times = 1u32;
    let mut shout = false;
    let mut parameters: Option<PathBuf> = None;
    let mut path = PathBuf::new();
    let mut overwrite = false;

    setup.option(&mut name, OptionSpec::new("--name,-n", "Who to greet").required());
    setup.checked_option(
        &mut times,
        OptionSpec::new("--times,-t", "How many times to greet"),
        Check::GreaterThanZero,
    );
    setup.option(&mut shout, OptionSpec::new("--shout", "Upper-case the greeting"));
    if setup.option(
        &mut path,
        OptionSpec::new("--parameters", "Write the parameters table here").group("Output"),
    ) {
        parameters = Some(path);
    }
    setup.option(
        &mut overwrite,
        OptionSpec::new("--overWrite", "Overwrite the parameters file").group("Output"),
    );
    setup.finish_setup(&mut io::stdout())?;

    if let Some(path) = parameters {
        setup.write_parameters_file(&path, overwrite)?;
    }

    let mut line = format!("Hello, {name}!");
    if shout {
        line = line.to_uppercase();
    }
    let mut stdout = io::stdout().lock();
    for _ in 0..times {
        writeln!(stdout, "{line}")?;
    }
    Ok(0)
}

// ============================================================================
// fileTools
// ============================================================================

fn count_lines(inv: &Invocation) -> Result<i32> {
    let mut setup = ProgramSetup::new(inv);
    setup.set_description("Count the lines of a file");
    setup.add_example("MASTERPROGRAM SUBPROGRAM --file notes.txt");
    setup.add_example("MASTERPROGRAM batch -ending .txt -run SUBPROGRAM --file THIS");

    let mut file = PathBuf::new();
    let mut log = false;
    setup.option(&mut file, OptionSpec::new("--file,-f", "File to count").required());
    setup.option(&mut log, OptionSpec::new("--log", "Keep a run log in the working directory"));
    if setup.needs_help(0) {
        setup.print_flags(&mut io::stdout())?;
        return Err(Error::HelpRequested);
    }
    setup.finish_setup(&mut io::stdout())?;

    if log {
        setup.start_run_log(inv.working_dir())?;
    }
    let text = read_text(&inv.working_dir().join(&file)).map_err(|e| handler_error(inv, e))?;
    setup.log_current_time("count")?;
    println!("{}\t{}", file.display(), text.lines().count());
    if log {
        setup.log_run_time(&mut io::stdout())?;
    }
    Ok(0)
}

fn head(inv: &Invocation) -> Result<i32> {
    let mut setup = ProgramSetup::new(inv);
    setup.set_description("Print the first lines of a file");

    let mut file = PathBuf::new();
    let mut lines = 10usize;
    setup.option(&mut file, OptionSpec::new("--file,-f", "File to read").required());
    setup.checked_option(
        &mut lines,
        OptionSpec::new("--lines,-l", "Number of lines"),
        Check::NonZero,
    );
    setup.finish_setup(&mut io::stdout())?;

    let text = read_text(&inv.working_dir().join(&file)).map_err(|e| handler_error(inv, e))?;
    let mut stdout = io::stdout().lock();
    for line in text.lines().take(lines) {
        writeln!(stdout, "{line}")?;
    }
    Ok(0)
}

// ============================================================================
// mathTools
// ============================================================================

fn sum(inv: &Invocation) -> Result<i32> {
    let mut setup = ProgramSetup::new(inv);
    setup.set_description("Add up integers; values may also come from a file, one per line");
    setup.add_example("MASTERPROGRAM SUBPROGRAM --values 1,2,3");

    let mut values: Vec<i64> = Vec::new();
    setup.option(&mut values, OptionSpec::new("--values,-v", "Numbers to add").required());
    setup.finish_setup(&mut io::stdout())?;

    let total = values
        .iter()
        .try_fold(0i64, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| Error::Handler {
            command: inv.program_name(),
            message: "sum overflows i64".into(),
        })?;
    println!("{total}");
    Ok(0)
}

fn uniq(inv: &Invocation) -> Result<i32> {
    let mut setup = ProgramSetup::new(inv);
    setup.set_description("Print distinct integers in order; repeats are an error");

    let mut values: BTreeSet<i32> = BTreeSet::new();
    setup.option(&mut values, OptionSpec::new("--values,-v", "Numbers").required());
    setup.finish_setup(&mut io::stdout())?;

    let joined: Vec<String> = values.iter().map(i32::to_string).collect();
    println!("{}", joined.join(","));
    Ok(0)
}

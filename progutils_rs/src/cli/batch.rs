//! Running one command over every matching file.
//!
//! `prog batch -ending .txt -run countLines --file THIS` runs
//! `prog countLines --file <name>` once per `*.txt` file in the working
//! directory. `batchThreaded` does the same across worker threads.
//!
//! Threaded runs split the files round-robin into one fixed shard per worker;
//! there is no shared work queue. Handler output and run-log lines from
//! different workers are not synchronized with each other, so console output
//! may interleave. Each run-log entry is appended with a single write.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::Regex;

use super::invocation::Invocation;
use super::setup::{OptionSpec, ProgramSetup};
use super::tree::CommandTree;
use crate::colors::Painter;
use crate::error::{Error, Result};
use crate::fs_utils;
use crate::progress::BatchProgress;
use crate::run_log::{RunLog, file_stamp};
use crate::timer::{StopWatch, format_duration};

/// Replaced by each file's path in every argument value.
pub const SENTINEL: &str = "THIS";

/// Files whose name contains this are never batch inputs.
pub const RUN_LOG_MARKER: &str = "batchRunLog";

pub const SEQUENTIAL_COMMANDS: [&str; 2] = ["batch", "massRunWithEnding"];
pub const THREADED_COMMANDS: [&str; 2] = ["batchThreaded", "massRunWithEndingThreaded"];

const THREAD_FLAGS: &str = "-numThreads,-threads,-batchThreads";
const CONTROL_FLAGS: [&str; 6] = [
    "-ending",
    "-pattern",
    "-run",
    "-numThreads",
    "-threads",
    "-batchThreads",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchMode {
    Sequential,
    Threaded,
}

impl BatchMode {
    /// The batch mode a sub-program name asks for, if any.
    pub fn from_command(name: &str) -> Option<Self> {
        let is = |names: &[&str]| names.iter().any(|n| n.eq_ignore_ascii_case(name));
        if is(&SEQUENTIAL_COMMANDS[..]) {
            Some(BatchMode::Sequential)
        } else if is(&THREADED_COMMANDS[..]) {
            Some(BatchMode::Threaded)
        } else {
            None
        }
    }
}

/// Which files of the directory a batch runs over.
#[derive(Debug, Clone)]
pub enum FileSelector {
    /// File name ends with this text.
    Suffix(String),
    /// File name matches this regex in full.
    Pattern(Regex),
}

impl FileSelector {
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(FileSelector::Pattern)
            .map_err(|e| Error::Conversion(format!("-pattern {pattern}: {e}")))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            FileSelector::Suffix(suffix) => file_name.ends_with(suffix.as_str()),
            FileSelector::Pattern(re) => re.is_match(file_name),
        }
    }
}

// ============================================================================
// Planning
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub files: Vec<PathBuf>,
    pub thread_count: usize,
    pub invocations: Vec<Invocation>,
}

/// Copy of `template` aimed at `handler_name` with the batch-control flags removed.
fn strip_batch_flags(template: &Invocation, handler_name: &str) -> Invocation {
    let mut base = template.clone();
    for flag in CONTROL_FLAGS {
        base.remove_flag(flag);
    }
    let batch_name = template.sub_program().to_string();
    if !batch_name.is_empty() {
        base.remove_flag(&batch_name);
    }
    base.set_sub_program(handler_name);
    base
}

/// How a file is written into derived arguments: relative to the working
/// directory when it lives there.
fn display_path(file: &Path, working_dir: &Path) -> String {
    file.strip_prefix(working_dir)
        .unwrap_or(file)
        .display()
        .to_string()
}

impl BatchPlan {
    /// Derived invocations for every selected file of the template's working directory.
    pub fn plan(
        template: &Invocation,
        selector: &FileSelector,
        handler_name: &str,
        thread_count: usize,
    ) -> Result<Self> {
        let dir = template.working_dir();
        let files = fs_utils::list_files(dir, |name| {
            !name.contains(RUN_LOG_MARKER) && selector.matches(name)
        })?;

        let base = strip_batch_flags(template, handler_name);
        let invocations = files
            .iter()
            .map(|file| {
                let mut inv = base.clone();
                inv.replace_in_values(SENTINEL, &display_path(file, dir));
                inv.reset_command_line();
                inv
            })
            .collect();

        tracing::debug!(
            files = files.len(),
            threads = thread_count,
            "planned batch of {handler_name}"
        );
        Ok(Self {
            files,
            thread_count,
            invocations,
        })
    }

    /// Round-robin split: invocation `i` goes to shard `i % thread_count`.
    pub fn shards(&self) -> Vec<Vec<&Invocation>> {
        let count = self.thread_count.max(1);
        let mut shards: Vec<Vec<&Invocation>> = (0..count).map(|_| Vec::new()).collect();
        for (i, inv) in self.invocations.iter().enumerate() {
            shards[i % count].push(inv);
        }
        shards
    }
}

// ============================================================================
// Execution
// ============================================================================

pub struct BatchDispatcher<'a> {
    tree: &'a CommandTree,
    painter: Painter,
    default_threads: u32,
}

/// Options of one batch command line.
struct BatchOptions {
    selector: FileSelector,
    program: String,
    threads: u32,
}

impl<'a> BatchDispatcher<'a> {
    pub fn new(tree: &'a CommandTree, painter: Painter, default_threads: u32) -> Self {
        Self {
            tree,
            painter,
            default_threads,
        }
    }

    /// Parse the batch options of `inv`, plan, open the run log and execute.
    ///
    /// Returns 1 if any derived invocation failed.
    pub fn run(&self, inv: &Invocation, mode: BatchMode, out: &mut dyn Write) -> Result<i32> {
        let options = self.parse_options(inv, mode, out)?;
        let threads = match mode {
            BatchMode::Sequential => 1,
            BatchMode::Threaded => options.threads as usize,
        };

        let log_name = format!(
            "{RUN_LOG_MARKER}_{}-{}_{}.txt",
            inv.master_program(),
            options.program,
            file_stamp()
        );
        let mut log = RunLog::create(inv.working_dir().join(log_name))?;
        log.write_header(inv.working_dir(), inv.raw_command_line())?;

        let plan = BatchPlan::plan(inv, &options.selector, &options.program, threads)?;
        tracing::info!(
            "batch {} over {} file(s) with {threads} thread(s)",
            options.program,
            plan.invocations.len()
        );

        let watch = StopWatch::new("batch");
        let failures = self.execute(&plan, &mut log, out)?;
        let run_time = format!(
            "{} ({})",
            inv.program_name(),
            format_duration(watch.total(), 2)
        );
        log.append(&run_time)?;
        writeln!(out, "{run_time}")?;

        tracing::info!("batch {} finished, {failures} failure(s)", options.program);
        Ok(if failures > 0 { 1 } else { 0 })
    }

    fn parse_options(
        &self,
        inv: &Invocation,
        mode: BatchMode,
        out: &mut dyn Write,
    ) -> Result<BatchOptions> {
        let mut setup = ProgramSetup::with_painter(inv, self.painter);
        setup.set_description(
            "Run one command once per matching file; THIS in any value is replaced by the file",
        );
        setup.add_example("MASTERPROGRAM SUBPROGRAM -ending .txt -run countLines --file THIS");

        let mut ending = String::new();
        let mut pattern = String::new();
        let mut program = String::new();
        let mut threads = self.default_threads;

        let has_ending = setup.option(
            &mut ending,
            OptionSpec::new("-ending", "A file extension to run batch commands on"),
        );
        setup.option(
            &mut pattern,
            OptionSpec::new("-pattern", "File name regex to run batch commands on")
                .required_if(!has_ending),
        );
        setup.option(
            &mut program,
            OptionSpec::new("-run", "Program to run a batch of commands with").required(),
        );
        if mode == BatchMode::Threaded {
            setup.checked_option(
                &mut threads,
                OptionSpec::new(THREAD_FLAGS, "Number of threads to use for the batch commands"),
                crate::flags::Check::GreaterThanZero,
            );
        }

        if inv.getting_flags() || inv.printing_help() {
            writeln!(out, "{}", self.painter.header("Batch Commands"))?;
            setup.print_flags(out)?;
            if !program.is_empty() {
                writeln!(out, "{}", self.painter.header(&format!("{program} Commands")))?;
                let target = strip_batch_flags(inv, &program);
                match self.tree.run_program(&target, out, &self.painter) {
                    Ok(_) | Err(Error::HelpRequested) => {}
                    Err(e) => return Err(e),
                }
            }
            return Err(Error::HelpRequested);
        }

        setup.report_warnings(out)?;

        let selector = if has_ending {
            FileSelector::Suffix(ending)
        } else {
            FileSelector::pattern(&pattern)?
        };
        Ok(BatchOptions {
            selector,
            program,
            threads,
        })
    }

    /// Run every planned invocation; returns how many failed.
    pub fn execute(&self, plan: &BatchPlan, log: &mut RunLog, out: &mut dyn Write) -> Result<usize> {
        if plan.thread_count <= 1 {
            self.execute_sequential(plan, log, out)
        } else {
            Ok(self.execute_threaded(plan, log))
        }
    }

    /// Each command line is logged before it runs.
    fn execute_sequential(
        &self,
        plan: &BatchPlan,
        log: &mut RunLog,
        out: &mut dyn Write,
    ) -> Result<usize> {
        let mut failures = 0;
        let progress = BatchProgress::new(plan.invocations.len());
        for (inv, file) in plan.invocations.iter().zip(&plan.files) {
            let label = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let ok = progress.suspend(|| -> Result<bool> {
                log.start_lap(label.clone());
                writeln!(out, "{}", inv.raw_command_line())?;
                log.append(inv.raw_command_line())?;
                writeln!(out)?;

                let watch = StopWatch::new("command");
                let ok = self.run_one(inv, out);
                let line = format!(
                    "\tCurrent Command Run Time: {}",
                    format_duration(watch.total(), 6)
                );
                writeln!(out, "{line}")?;
                log.append(&line)?;
                writeln!(out)?;
                Ok(ok)
            })?;
            if !ok {
                failures += 1;
            }
            progress.advance(&label);
        }
        progress.finish();
        Ok(failures)
    }

    /// Each command line is logged, with its run time, after it finishes.
    fn execute_threaded(&self, plan: &BatchPlan, log: &RunLog) -> usize {
        let failures = AtomicUsize::new(0);
        let shards = plan.shards();

        std::thread::scope(|scope| {
            let handles: Vec<_> = shards
                .into_iter()
                .map(|shard| {
                    let failures = &failures;
                    scope.spawn(move || {
                        let mut stdout = io::stdout();
                        for inv in shard {
                            let watch = StopWatch::new("command");
                            if !self.run_one(inv, &mut stdout) {
                                failures.fetch_add(1, Ordering::Relaxed);
                            }
                            let entry = format!(
                                "{}\n\tRun Time: {}",
                                inv.raw_command_line(),
                                format_duration(watch.total(), 6)
                            );
                            if let Err(e) = log.append(&entry) {
                                tracing::warn!("failed to append to run log: {e}");
                            }
                        }
                    })
                })
                .collect();

            for (idx, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    tracing::error!("batch worker {idx} panicked");
                    failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        failures.into_inner()
    }

    /// Dispatch one derived invocation; true when it exited 0.
    fn run_one(&self, inv: &Invocation, out: &mut dyn Write) -> bool {
        match self.tree.run_program(inv, out, &self.painter) {
            Ok(0) => true,
            Ok(code) => {
                tracing::warn!("{} exited with {code}", inv.raw_command_line());
                false
            }
            Err(e) => {
                if !e.is_reported() {
                    eprintln!("{}", self.painter.error(&format!("[{}] {e}", inv.program_name())));
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::registry::CommandRegistry;
    use crate::cli::tokenizer::tokenize_in;
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let temp = TempDir::new().expect("temp dir");
        for name in files {
            std::fs::write(temp.path().join(name), "one\ntwo\n").expect("write");
        }
        temp
    }

    fn batch_inv(dir: &Path, args: &[&str]) -> Invocation {
        let mut full = vec!["prog"];
        full.extend_from_slice(args);
        tokenize_in(full, dir).expect("tokenize")
    }

    #[test]
    fn batch_names() {
        assert_eq!(BatchMode::from_command("batch"), Some(BatchMode::Sequential));
        assert_eq!(BatchMode::from_command("massrunwithending"), Some(BatchMode::Sequential));
        assert_eq!(BatchMode::from_command("batchthreaded"), Some(BatchMode::Threaded));
        assert_eq!(BatchMode::from_command("greet"), None);
    }

    #[test]
    fn plan_substitutes_and_strips() {
        let temp = dir_with(&["b.txt", "a.txt", "notes.md", "batchRunLog_prog-x_1.txt"]);
        let inv = batch_inv(
            temp.path(),
            &["batch", "-ending", ".txt", "-run", "countLines", "--file", "THIS", "--out", "THIS.counts"],
        );
        let plan = BatchPlan::plan(&inv, &FileSelector::Suffix(".txt".into()), "countLines", 1)
            .expect("plan");
        assert_eq!(plan.files.len(), 2);
        let first = &plan.invocations[0];
        assert_eq!(first.sub_program(), "countlines");
        assert_eq!(first.find_flag("--file"), Some(("--file", "a.txt")));
        assert_eq!(first.find_flag("--out"), Some(("--out", "a.txt.counts")));
        assert!(!first.has_flag("-ending") && !first.has_flag("-run"));
        assert_eq!(
            first.raw_command_line(),
            "prog countLines --file a.txt --out a.txt.counts"
        );
    }

    #[test]
    fn pattern_selector_matches_whole_name() {
        let temp = dir_with(&["s1.fastq", "s2.fastq", "s10.fastq", "xs1.fastq"]);
        let inv = batch_inv(temp.path(), &["batch", "-pattern", "s\\d\\.fastq", "-run", "x"]);
        let selector = FileSelector::pattern("s\\d\\.fastq").expect("regex");
        let plan = BatchPlan::plan(&inv, &selector, "x", 1).expect("plan");
        assert_eq!(plan.files.len(), 2);
        assert!(FileSelector::pattern("(").is_err());
    }

    #[test]
    fn five_files_two_threads_shard_three_and_two() {
        let temp = dir_with(&["1.txt", "2.txt", "3.txt", "4.txt", "5.txt"]);
        let inv = batch_inv(temp.path(), &["batchThreaded", "-ending", ".txt", "-run", "x"]);
        let plan = BatchPlan::plan(&inv, &FileSelector::Suffix(".txt".into()), "x", 2)
            .expect("plan");
        let shards = plan.shards();
        let sizes: Vec<usize> = shards.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 2]);
        assert!(std::ptr::eq(shards[0][1], &plan.invocations[2]));
        assert!(std::ptr::eq(shards[1][1], &plan.invocations[3]));
    }

    fn recording_tree(seen: Arc<Mutex<Vec<String>>>) -> CommandTree {
        let mut reg = CommandRegistry::new("prog");
        reg.register("record", move |inv| {
            let file = inv.find_flag("--file").map(|(_, v)| v.to_string()).unwrap_or_default();
            let code = if file.starts_with("bad") { 3 } else { 0 };
            seen.lock().expect("lock").push(file);
            Ok(code)
        });
        CommandTree::new(reg)
    }

    #[test]
    fn threaded_run_dispatches_every_file_once() {
        let temp = dir_with(&["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let tree = recording_tree(Arc::clone(&seen));
        let inv = batch_inv(
            temp.path(),
            &["batchThreaded", "-ending", ".txt", "-run", "record", "--file", "THIS", "-threads", "3"],
        );
        let mut out = Vec::new();
        let code = BatchDispatcher::new(&tree, Painter::plain(), 2)
            .run(&inv, BatchMode::Threaded, &mut out)
            .expect("batch");
        assert_eq!(code, 0);

        let files: BTreeSet<String> = seen.lock().expect("lock").iter().cloned().collect();
        assert_eq!(files.len(), 5);
        assert!(files.contains("c.txt"));

        let log = std::fs::read_dir(temp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .find(|e| e.file_name().to_string_lossy().starts_with("batchRunLog_prog-record_"))
            .expect("run log");
        let text = std::fs::read_to_string(log.path()).expect("read log");
        assert!(text.starts_with("Ran on: "));
        assert_eq!(text.matches("\tRun Time: ").count(), 5);
        assert!(text.contains("prog record --file e.txt"));
    }

    #[test]
    fn sequential_run_logs_before_running_and_counts_failures() {
        let temp = dir_with(&["bad.txt", "good.txt"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let tree = recording_tree(Arc::clone(&seen));
        let inv = batch_inv(
            temp.path(),
            &["batch", "-ending", ".txt", "-run", "record", "--file", "THIS"],
        );
        let mut out = Vec::new();
        let code = BatchDispatcher::new(&tree, Painter::plain(), 2)
            .run(&inv, BatchMode::Sequential, &mut out)
            .expect("batch");
        assert_eq!(code, 1);
        assert_eq!(*seen.lock().expect("lock"), vec!["bad.txt", "good.txt"]);
        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.starts_with("prog record --file bad.txt\n"));
        assert_eq!(printed.matches("Current Command Run Time").count(), 2);
    }

    #[test]
    fn missing_run_flag_fails_validation() {
        let temp = dir_with(&["a.txt"]);
        let tree = recording_tree(Arc::new(Mutex::new(Vec::new())));
        let inv = batch_inv(temp.path(), &["batch", "-ending", ".txt"]);
        let mut out = Vec::new();
        let err = BatchDispatcher::new(&tree, Painter::plain(), 2)
            .run(&inv, BatchMode::Sequential, &mut out)
            .expect_err("no -run");
        assert!(matches!(err, Error::Validation(_)));
        assert!(String::from_utf8(out).expect("utf8").contains("Need to have -run"));
    }
}

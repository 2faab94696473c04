//! Binding an invocation's arguments to program variables.
//!
//! A command body creates a [`ProgramSetup`], declares each option against a
//! `&mut` variable, then calls [`ProgramSetup::finish_setup`]. Problems found while
//! declaring and binding never stop the remaining options from being processed;
//! they are collected and reported together by `finish_setup`.
//!
//! ```rust,no_run
//! # use progutils::cli::{Invocation, OptionSpec, ProgramSetup};
//! # use progutils::flags::Check;
//! # fn body(inv: &Invocation) -> progutils::Result<i32> {
//! let mut setup = ProgramSetup::new(inv);
//! let mut name = String::new();
//! let mut times = 1u32;
//! setup.option(&mut name, OptionSpec::new("--name,-n", "Who to greet").required());
//! setup.checked_option(&mut times, OptionSpec::new("--times", "Repeats"), Check::GreaterThanZero);
//! setup.finish_setup(&mut std::io::stdout())?;
//! # Ok(0)
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::json;

use super::invocation::Invocation;
use crate::colors::Painter;
use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::flags::flag::normalize;
use crate::flags::{Check, Flag, FlagRegistry, FlagValue, NumericCheck, convert};
use crate::fs_utils;
use crate::run_log::{RunLog, file_stamp};
use crate::timer::{StopWatch, format_duration};

/// Placeholders replaced in usage examples.
pub const MASTER_PLACEHOLDER: &str = "MASTERPROGRAM";
pub const SUB_PLACEHOLDER: &str = "SUBPROGRAM";

const RESERVED: [&str; 5] = ["-h", "--help", "--getFlags", "--version", "--dumpversion"];

/// How one option is declared.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    flags: String,
    description: String,
    required: bool,
    group: String,
}

impl OptionSpec {
    /// `flags` is a comma-separated alias list such as `"--name,-n"`.
    pub fn new(flags: &str, description: &str) -> Self {
        Self {
            flags: flags.to_string(),
            description: description.to_string(),
            required: false,
            group: String::new(),
        }
    }

    pub fn required(self) -> Self {
        self.required_if(true)
    }

    pub fn required_if(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }
}

pub struct ProgramSetup {
    commands: Invocation,
    flags: FlagRegistry,
    warnings: Vec<String>,
    failed: bool,
    description: String,
    examples: Vec<String>,
    watch: StopWatch,
    run_log: Option<RunLog>,
    painter: Painter,
}

impl ProgramSetup {
    pub fn new(inv: &Invocation) -> Self {
        let painter = Painter::new(RunnerConfig::from_env().color);
        Self::with_painter(inv, painter)
    }

    pub fn with_painter(inv: &Invocation, painter: Painter) -> Self {
        Self {
            failed: inv.printing_help() || inv.getting_flags(),
            commands: inv.clone(),
            flags: FlagRegistry::new(),
            warnings: Vec::new(),
            description: String::new(),
            examples: Vec::new(),
            watch: StopWatch::new("start"),
            run_log: None,
            painter,
        }
    }

    pub fn invocation(&self) -> &Invocation {
        &self.commands
    }

    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Usage line shown in help; `MASTERPROGRAM` and `SUBPROGRAM` are filled in.
    pub fn add_example(&mut self, example: &str) {
        self.examples.push(example.to_string());
    }

    /// True when help was asked for or at most `min_args` arguments were given.
    pub fn needs_help(&self, min_args: usize) -> bool {
        self.commands.printing_help() || self.commands.arg_count() <= min_args
    }

    fn warn(&mut self, message: String) {
        tracing::debug!("{}: {message}", self.commands.program_name());
        self.warnings.push(message);
        self.failed = true;
    }

    // ========================================================================
    // Declaring options
    // ========================================================================

    /// Declare an option and bind it from the invocation; returns whether it was given.
    pub fn option<T: FlagValue>(&mut self, value: &mut T, spec: OptionSpec) -> bool {
        self.bind(value, &spec).is_some()
    }

    /// [`ProgramSetup::option`] plus a built-in value check.
    pub fn checked_option<T>(&mut self, value: &mut T, spec: OptionSpec, check: Check) -> bool
    where
        T: FlagValue + NumericCheck,
    {
        self.validated_option(value, spec, |v: &T, flag: &str| v.check(check, flag))
    }

    /// [`ProgramSetup::option`] plus a custom check returning a failure message.
    ///
    /// The predicate sees the bound value and the flag as the user typed it, and
    /// only runs when the option was given and converted.
    pub fn validated_option<T, F>(&mut self, value: &mut T, spec: OptionSpec, predicate: F) -> bool
    where
        T: FlagValue,
        F: FnOnce(&T, &str) -> Option<String>,
    {
        match self.bind(value, &spec) {
            Some(Some(key)) => {
                if let Some(message) = predicate(value, &key) {
                    self.warn(message);
                }
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// `None` when not given; `Some(Some(key))` when given and converted;
    /// `Some(None)` when given but conversion failed.
    fn bind<T: FlagValue>(&mut self, value: &mut T, spec: &OptionSpec) -> Option<Option<String>> {
        let mut flag = match Flag::new(
            &spec.flags,
            &spec.description,
            spec.required,
            &spec.group,
            value,
        ) {
            Ok(flag) => flag,
            Err(e) => {
                self.warn(e.to_string());
                return None;
            }
        };

        let found: Vec<(String, String)> = flag
            .aliases()
            .iter()
            .filter_map(|alias| self.commands.find_flag(alias))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut outcome = None;
        if let Some((key, raw)) = found.first() {
            match convert::<T>(raw, key) {
                Ok(converted) => {
                    *value = converted;
                    flag.set_value(value);
                    outcome = Some(Some(key.clone()));
                }
                Err(e) => {
                    self.warn(e.to_string());
                    outcome = Some(None);
                }
            }
        }
        if found.len() > 1 {
            let keys: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();
            self.warn(format!(
                "Found multiple flags for the same option, found {} but should only have one",
                keys.join(", ")
            ));
        }
        if found.is_empty() && flag.required {
            self.warn(format!(
                "Need to have {} see {} --help for more details",
                flag.aliases().join(" or "),
                self.commands.program_name()
            ));
        }

        if let Err(e) = self.flags.add(flag) {
            self.warn(e.to_string());
        }
        outcome
    }

    // ========================================================================
    // Finishing
    // ========================================================================

    /// Print help or warnings as needed and report whether the command may run.
    ///
    /// Returns [`Error::HelpRequested`] after printing help for `--help` or
    /// `--getFlags`, and [`Error::Validation`] after printing every warning when
    /// any option failed. Dash-led arguments that match no declared option are
    /// warnings.
    pub fn finish_setup(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.commands.printing_help() || self.commands.getting_flags() {
            self.print_flags(out)?;
            return Err(Error::HelpRequested);
        }

        let unknown: Vec<String> = self
            .commands
            .arguments()
            .keys()
            .filter(|key| key.starts_with('-'))
            .filter(|key| !RESERVED.iter().any(|r| normalize(r) == normalize(key)))
            .filter(|key| self.flags.find(key).is_none())
            .cloned()
            .collect();
        for key in unknown {
            self.warn(format!("Unrecognized option, {key} not using"));
        }
        self.report_warnings(out)
    }

    /// Print collected warnings; [`Error::Validation`] if any option failed.
    ///
    /// Unlike [`ProgramSetup::finish_setup`] this neither prints help nor
    /// complains about undeclared arguments.
    pub fn report_warnings(&self, out: &mut dyn Write) -> Result<()> {
        for warning in &self.warnings {
            writeln!(out, "{}", self.painter.warn(warning))?;
        }
        if self.failed {
            return Err(Error::Validation(self.warnings.clone()));
        }
        Ok(())
    }

    /// Program name, description, grouped flags and usage examples.
    pub fn print_flags(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", self.painter.header(&self.commands.program_name()))?;
        if !self.description.is_empty() {
            writeln!(out, "{}", self.description)?;
        }
        self.flags.render(out, &self.painter, true)?;
        if !self.examples.is_empty() {
            writeln!(out, "{}", self.painter.header("Examples"))?;
            for example in &self.examples {
                let line = example
                    .replace(MASTER_PLACEHOLDER, &self.commands.master_program_raw)
                    .replace(SUB_PLACEHOLDER, self.commands.sub_program_raw());
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Output files
    // ========================================================================

    /// Write the parameters table to `path`.
    pub fn write_parameters_file(&self, path: &Path, overwrite: bool) -> Result<()> {
        let mut table = Vec::new();
        self.flags.write_parameters(&mut table)?;
        let text = String::from_utf8_lossy(&table);
        fs_utils::write_new_file(path, &text, overwrite)?;
        Ok(())
    }

    /// Open `runLog_<program>_<timestamp>.txt` in `dir` and write its header.
    pub fn start_run_log(&mut self, dir: &Path) -> Result<PathBuf> {
        let name = format!(
            "runLog_{}_{}.txt",
            self.commands.program_name().replace("./", "").replace(' ', "-"),
            file_stamp()
        );
        let log = RunLog::create(dir.join(name))?;
        log.write_header(
            self.commands.working_dir(),
            self.commands.raw_command_line(),
        )?;
        let path = log.path().to_path_buf();
        self.run_log = Some(log);
        Ok(path)
    }

    /// Log the current lap in the run log, if one is open, and start `next`.
    pub fn log_current_time(&mut self, next: &str) -> Result<()> {
        self.watch.start_new_lap(next);
        if let Some(log) = self.run_log.as_mut() {
            log.log_current_time(next)?;
        }
        Ok(())
    }

    /// `<program> (<elapsed>)`
    pub fn log_run_time(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "{} ({})",
            self.commands.program_name(),
            format_duration(self.watch.total(), 2)
        )?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let dump = json!({
            "commands": &self.commands,
            "flags": &self.flags,
            "warnings": &self.warnings,
            "failed": self.failed,
            "description": &self.description,
            "examples": &self.examples,
        });
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

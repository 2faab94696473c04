//! One tokenized set of arguments destined for one command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::flags::flag::normalize;

/// Quote `arg` when it contains whitespace.
pub fn quote_if_needed(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub(crate) arguments: BTreeMap<String, String>,
    pub(crate) command_path: Vec<String>,
    pub(crate) master_program_raw: String,
    pub(crate) sub_program_raw: String,
    pub(crate) working_dir: PathBuf,
    pub(crate) raw_command_line: String,
}

impl Invocation {
    /// An invocation of `master sub` with no arguments, for building by hand.
    pub fn new(master: &str, sub: &str) -> Self {
        let mut inv = Self {
            master_program_raw: master.to_string(),
            command_path: vec![master.to_string()],
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            ..Self::default()
        };
        if !sub.is_empty() {
            inv.set_sub_program(sub);
        }
        inv.reset_command_line();
        inv
    }

    /// Builder form of [`Invocation::set_arg`].
    pub fn with_arg(mut self, flag: &str, value: &str) -> Self {
        self.set_arg(flag, value);
        self.reset_command_line();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    // ========================================================================
    // Program names
    // ========================================================================

    pub fn master_program(&self) -> &str {
        self.command_path.first().map(String::as_str).unwrap_or("")
    }

    /// Case-folded sub-program name, empty when none was given.
    pub fn sub_program(&self) -> &str {
        self.command_path.get(1).map(String::as_str).unwrap_or("")
    }

    /// Sub-program as the user typed it.
    pub fn sub_program_raw(&self) -> &str {
        &self.sub_program_raw
    }

    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    /// `master sub`, or just `master`.
    pub fn program_name(&self) -> String {
        if self.sub_program_raw.is_empty() {
            self.master_program_raw.clone()
        } else {
            format!("{} {}", self.master_program_raw, self.sub_program_raw)
        }
    }

    pub fn set_sub_program(&mut self, name: &str) {
        self.sub_program_raw = name.to_string();
        self.command_path.truncate(1);
        if self.command_path.is_empty() {
            self.command_path.push(self.master_program_raw.clone());
        }
        self.command_path.push(name.to_lowercase());
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn raw_command_line(&self) -> &str {
        &self.raw_command_line
    }

    /// Number of tokenized arguments, not counting program names.
    pub fn arg_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn set_arg(&mut self, flag: &str, value: &str) {
        self.arguments.insert(flag.to_string(), value.to_string());
    }

    /// The dash-led argument answering to `alias`, ignoring case and dashes.
    pub fn find_flag(&self, alias: &str) -> Option<(&str, &str)> {
        let wanted = normalize(alias);
        self.arguments
            .iter()
            .find(|(key, _)| key.starts_with('-') && normalize(key) == wanted)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_flag(&self, alias: &str) -> bool {
        self.find_flag(alias).is_some()
    }

    /// Remove every argument answering to `alias`; returns how many were removed.
    pub fn remove_flag(&mut self, alias: &str) -> usize {
        let wanted = normalize(alias);
        let before = self.arguments.len();
        self.arguments.retain(|key, _| normalize(key) != wanted);
        before - self.arguments.len()
    }

    /// Replace every occurrence of `token` inside argument values.
    pub fn replace_in_values(&mut self, token: &str, with: &str) {
        for value in self.arguments.values_mut() {
            if value.contains(token) {
                *value = value.replace(token, with);
            }
        }
    }

    // ========================================================================
    // Reserved flags
    // ========================================================================

    pub fn printing_help(&self) -> bool {
        self.has_flag("-h") || self.has_flag("--help")
    }

    pub fn getting_flags(&self) -> bool {
        self.has_flag("--getFlags")
    }

    pub fn getting_version(&self) -> bool {
        self.has_flag("--version")
    }

    pub fn dumping_version(&self) -> bool {
        self.has_flag("--dumpversion")
    }

    // ========================================================================
    // Command lines
    // ========================================================================

    /// Command line rebuilt from the argument map.
    ///
    /// Valueless flags print alone, values starting with a dash use `flag=value`,
    /// everything else `flag value`; whitespace is quoted.
    pub fn reconstruct_command_line(&self) -> String {
        let mut parts = vec![quote_if_needed(&self.master_program_raw)];
        if !self.sub_program_raw.is_empty() {
            parts.push(quote_if_needed(&self.sub_program_raw));
        }
        for (flag, value) in &self.arguments {
            if value.is_empty() {
                parts.push(flag.clone());
            } else if value.starts_with('-') {
                parts.push(quote_if_needed(&format!("{flag}={value}")));
            } else {
                parts.push(format!("{flag} {}", quote_if_needed(value)));
            }
        }
        parts.join(" ")
    }

    /// Overwrite the raw command line with [`Invocation::reconstruct_command_line`].
    pub fn reset_command_line(&mut self) {
        self.raw_command_line = self.reconstruct_command_line();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_dashes() {
        let inv = Invocation::new("prog", "Greet")
            .with_arg("--Name", "Ada")
            .with_arg("stray", "");
        assert_eq!(inv.sub_program(), "greet");
        assert_eq!(inv.sub_program_raw(), "Greet");
        assert_eq!(inv.find_flag("-name"), Some(("--Name", "Ada")));
        assert!(!inv.has_flag("--stray"));
    }

    #[test]
    fn reconstruction_rules() {
        let inv = Invocation::new("prog", "greet")
            .with_arg("--name", "Ada Lovelace")
            .with_arg("--offset", "-5")
            .with_arg("--shout", "");
        assert_eq!(
            inv.raw_command_line(),
            "prog greet --name \"Ada Lovelace\" --offset=-5 --shout"
        );
    }

    #[test]
    fn remove_and_replace() {
        let mut inv = Invocation::new("prog", "batch")
            .with_arg("-run", "count")
            .with_arg("--file", "THIS")
            .with_arg("--out", "THIS.out");
        assert_eq!(inv.remove_flag("--RUN"), 1);
        inv.replace_in_values("THIS", "a.txt");
        assert_eq!(inv.find_flag("--out"), Some(("--out", "a.txt.out")));
        assert!(!inv.has_flag("-run"));
    }

    #[test]
    fn reserved_flags() {
        let inv = Invocation::new("prog", "x").with_arg("-getflags", "");
        assert!(inv.getting_flags());
        assert!(!inv.printing_help());
        assert!(Invocation::new("prog", "x").with_arg("-help", "").printing_help());
    }
}

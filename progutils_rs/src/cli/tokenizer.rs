//! Raw process arguments into an [`Invocation`].
//!
//! Argument 0 is the program path. Argument 1, when it does not start with a
//! dash, names the sub-program. Everything after is flags:
//!
//! - `--flag=value` splits at the `=`
//! - `--flag value` takes the next argument unless it starts with a dash
//! - `--flag` alone has an empty value
//! - `bare` words are kept as valueless flags
//!
//! Flag names are lower-cased in every form; values keep their case.

use std::path::{Path, PathBuf};

use super::invocation::{Invocation, quote_if_needed};
use crate::error::{Error, Result};
use crate::flags::flag::normalize;

/// Tokenize against the current working directory.
pub fn tokenize<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    tokenize_in(args, &cwd)
}

pub fn tokenize_in<I, S>(args: I, working_dir: &Path) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut inv = Invocation {
        working_dir: working_dir.to_path_buf(),
        raw_command_line: args
            .iter()
            .map(|a| quote_if_needed(a))
            .collect::<Vec<_>>()
            .join(" "),
        ..Invocation::default()
    };

    let Some(program) = args.first() else {
        return Ok(inv);
    };
    inv.master_program_raw = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
        .to_string();
    inv.command_path.push(inv.master_program_raw.clone());

    let mut i = 1;
    if let Some(second) = args.get(1) {
        if !second.starts_with('-') {
            inv.set_sub_program(second);
            i = 2;
        }
    }

    while i < args.len() {
        let arg = &args[i];
        let (flag, value) = match arg.matches('=').count() {
            0 => {
                let dashes = leading_dashes(arg);
                if dashes > 2 {
                    return Err(Error::Parse(format!(
                        "flag {arg} has more than two leading dashes"
                    )));
                }
                let flag = arg.to_lowercase();
                match args.get(i + 1) {
                    Some(next) if dashes > 0 && !next.starts_with('-') => {
                        i += 1;
                        (flag, next.clone())
                    }
                    _ => (flag, String::new()),
                }
            }
            1 => {
                let (flag, value) = arg.split_once('=').unwrap_or((arg.as_str(), ""));
                if leading_dashes(flag) > 2 {
                    return Err(Error::Parse(format!(
                        "flag {flag} has more than two leading dashes"
                    )));
                }
                (flag.to_lowercase(), value.to_string())
            }
            _ => {
                return Err(Error::Parse(format!(
                    "argument {arg} has more than one '=', use --flag value instead"
                )));
            }
        };

        let wanted = normalize(&flag);
        if let Some(existing) = inv.arguments.keys().find(|k| normalize(k) == wanted) {
            return Err(Error::Parse(format!(
                "flag {flag} given more than once (already have {existing})"
            )));
        }
        inv.arguments.insert(flag, value);
        i += 1;
    }

    tracing::debug!(
        program = %inv.program_name(),
        args = inv.arguments.len(),
        "tokenized command line"
    );
    Ok(inv)
}

fn leading_dashes(arg: &str) -> usize {
    arg.len() - arg.trim_start_matches('-').len()
}

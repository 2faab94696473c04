//! One flat group of named commands.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use super::invocation::Invocation;
use crate::colors::Painter;
use crate::error::{Error, Result};
use crate::fuzzy;

/// A command body; returns the process exit status on success.
pub type Handler = Arc<dyn Fn(&Invocation) -> Result<i32> + Send + Sync>;

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub alias: bool,
    handler: Handler,
}

impl Command {
    pub fn run(&self, inv: &Invocation) -> Result<i32> {
        (self.handler)(inv)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// Commands keyed by lower-cased name, kept in registration order.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    name: String,
    commands: IndexMap<String, Command>,
}

impl CommandRegistry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&Invocation) -> Result<i32> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(handler), false)
    }

    /// Register `name` as a hidden alias: dispatchable, never listed.
    pub fn register_alias<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&Invocation) -> Result<i32> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(handler), true)
    }

    /// Register `alias` with the same handler as the already registered `target`.
    pub fn alias_of(&mut self, alias: &str, target: &str) -> Result<&mut Self> {
        let handler = self
            .commands
            .get(&target.to_lowercase())
            .map(|c| Arc::clone(&c.handler))
            .ok_or_else(|| Error::Declaration(format!("no command {target} to alias")))?;
        Ok(self.insert(alias, handler, true))
    }

    fn insert(&mut self, name: &str, handler: Handler, alias: bool) -> &mut Self {
        let key = name.to_lowercase();
        if self.commands.contains_key(&key) {
            tracing::warn!("{}: command {name} registered twice, keeping the last", self.name);
        }
        self.commands.insert(
            key,
            Command {
                name: name.to_string(),
                alias,
                handler,
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(&name.to_lowercase())
    }

    /// Every command's display name, aliases included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.values().map(|c| c.name.as_str())
    }

    /// Non-alias commands in listing order.
    pub fn listed(&self) -> impl Iterator<Item = &Command> {
        self.commands.values().filter(|c| !c.alias)
    }

    /// Run the command named by the invocation's sub-program.
    pub fn dispatch(&self, inv: &Invocation) -> Result<i32> {
        let name = inv.sub_program();
        match self.commands.get(name) {
            Some(command) => {
                tracing::debug!("{}: dispatching {}", self.name, command.name);
                command.run(inv)
            }
            None => Err(Error::Dispatch {
                command: inv.sub_program_raw().to_string(),
                suggestion: None,
            }),
        }
    }

    /// Run the `n`th listed command (1-based, aliases not counted).
    pub fn dispatch_by_number(&self, n: usize, inv: &Invocation) -> Result<i32> {
        let command = n
            .checked_sub(1)
            .and_then(|idx| self.listed().nth(idx))
            .ok_or_else(|| Error::Dispatch {
                command: n.to_string(),
                suggestion: None,
            })?;
        let mut renamed = inv.clone();
        renamed.set_sub_program(&command.name);
        renamed.reset_command_line();
        self.dispatch(&renamed)
    }

    /// Numbered listing of non-alias commands.
    pub fn list(&self, out: &mut dyn Write, painter: &Painter) -> io::Result<()> {
        let total = self.listed().count();
        let width = total.to_string().len();
        for (idx, command) in self.listed().enumerate() {
            let number = format!("{:>width$}", idx + 1);
            writeln!(out, "{}) {}", painter.number(number), command.name)?;
        }
        Ok(())
    }

    /// Closest command name to `name`, aliases included.
    pub fn closest(&self, name: &str) -> (String, i32) {
        fuzzy::closest(name, self.names())
    }
}

//! Nested command groups.
//!
//! A [`CommandTree`] node owns one [`CommandRegistry`] and any number of child
//! trees. Lookups try the local registry first, then each child in the order it
//! was added, so a local command shadows a child's command of the same name.

use std::io::{self, Write};

use indexmap::IndexMap;

use super::invocation::Invocation;
use super::registry::{Command, CommandRegistry};
use crate::colors::Painter;
use crate::error::{Error, Result};
use crate::fuzzy;

#[derive(Debug, Clone)]
pub struct CommandTree {
    registry: CommandRegistry,
    children: IndexMap<String, CommandTree>,
}

impl CommandTree {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            registry,
            children: IndexMap::new(),
        }
    }

    /// Attach `child` under its registry name.
    pub fn add_child(&mut self, child: CommandTree) -> &mut Self {
        let key = child.name().to_lowercase();
        if self.children.contains_key(&key) {
            tracing::warn!("{}: child group {key} added twice, keeping the last", self.name());
        }
        self.children.insert(key, child);
        self
    }

    pub fn name(&self) -> &str {
        self.registry.name()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn children(&self) -> impl Iterator<Item = &CommandTree> {
        self.children.values()
    }

    /// True if this node or any descendant has a command called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name) || self.children.values().any(|c| c.contains(name))
    }

    /// The command `name` resolves to from this node.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.registry
            .get(name)
            .or_else(|| self.children.values().find_map(|c| c.find(name)))
    }

    /// Every command name visible from this node, depth first.
    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.names().map(str::to_string).collect();
        for child in self.children.values() {
            names.extend(child.all_names());
        }
        names
    }

    /// Closest visible command name to `name`.
    pub fn closest(&self, name: &str) -> (String, i32) {
        fuzzy::closest(name, self.all_names())
    }

    /// Run the invocation's sub-program wherever it lives in the tree.
    ///
    /// A name found nowhere is an [`Error::Dispatch`] carrying the closest name.
    pub fn dispatch(&self, inv: &Invocation) -> Result<i32> {
        let name = inv.sub_program();
        if self.registry.contains(name) {
            return self.registry.dispatch(inv);
        }
        if let Some(child) = self.children.values().find(|c| c.contains(name)) {
            tracing::debug!("{}: handing {name} to {}", self.name(), child.name());
            return child.dispatch(inv);
        }
        let (suggestion, score) = self.closest(name);
        tracing::debug!("{}: no command {name}, closest {suggestion} ({score})", self.name());
        Err(Error::Dispatch {
            command: inv.sub_program_raw().to_string(),
            suggestion: (!suggestion.is_empty()).then_some(suggestion),
        })
    }

    /// [`CommandTree::dispatch`], printing the listing and a suggestion on a miss.
    ///
    /// A miss returns exit status 1 instead of an error.
    pub fn run_program(&self, inv: &Invocation, out: &mut dyn Write, painter: &Painter) -> Result<i32> {
        if self.contains(inv.sub_program()) {
            return self.dispatch(inv);
        }
        match self.dispatch(inv) {
            Err(Error::Dispatch {
                command,
                suggestion,
            }) => {
                self.report_miss(out, painter, &command, suggestion.as_deref())?;
                Ok(1)
            }
            other => other,
        }
    }

    /// Listing followed by the did-you-mean lines.
    pub fn report_miss(
        &self,
        out: &mut dyn Write,
        painter: &Painter,
        command: &str,
        suggestion: Option<&str>,
    ) -> io::Result<()> {
        self.list(out, painter, true)?;
        if command.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", painter.error(&format!("Unrecognized command {command}")))?;
        if let Some(suggestion) = suggestion {
            writeln!(out, "Did you mean         {}?", painter.suggestion(suggestion))?;
        }
        Ok(())
    }

    /// Numbered listing of this node and its children.
    ///
    /// Only the root prints the banner; children print their group name instead.
    pub fn list(&self, out: &mut dyn Write, painter: &Painter, is_root: bool) -> io::Result<()> {
        if is_root {
            writeln!(out, "{}", painter.header("Programs"))?;
            writeln!(
                out,
                "Use {} [PROGRAM] --help to see more details about each program",
                self.name()
            )?;
            writeln!(out, "Commands are not case sensitive")?;
        } else {
            writeln!(out, "{}", painter.section(self.name()))?;
        }
        self.registry.list(out, painter)?;
        for child in self.children.values() {
            child.list(out, painter, false)?;
        }
        Ok(())
    }
}

//! Flags declared by one invocation.
//!
//! Keys are flag uids, so iteration (and therefore help and the parameters file)
//! is stable regardless of declaration order.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use super::flag::{DEFAULT_GROUP, Flag, PARAMETERS_HEADER, normalize};
use crate::colors::Painter;
use crate::error::{Error, Result};
use crate::types::Requirement;

/// Reserved flags always listed at the end of help.
pub const HELP_OPTIONS: [(&str, &str); 2] = [
    ("--getFlags", "Print flags"),
    ("-h,--help", "Print a more detail help message if available"),
];

const MISC_TITLE: &str = "Miscellaneous";
const HELP_TITLE: &str = "Help Options";
const COLUMN_SEP: &str = "\t";

#[derive(Debug, Default, Clone, Serialize)]
pub struct FlagRegistry {
    flags: BTreeMap<String, Flag>,
}

/// One rendered help row: the alias column plus the value column in both forms.
struct Row {
    key: String,
    plain: String,
    painted: String,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `flag`, rejecting any alias already owned by a registered flag.
    pub fn add(&mut self, flag: Flag) -> Result<()> {
        for existing in self.flags.values() {
            for alias in flag.aliases() {
                let wanted = normalize(alias);
                if existing.aliases().iter().any(|a| normalize(a) == wanted) {
                    let meta = serde_json::to_string(existing)?;
                    return Err(Error::Declaration(format!(
                        "adding new flag: {alias} which already exists: {meta}"
                    )));
                }
            }
        }
        self.flags.insert(flag.uid(), flag);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    /// The flag answering to `alias`, ignoring case and dashes.
    pub fn find(&self, alias: &str) -> Option<&Flag> {
        self.flags.values().find(|f| f.matches(alias))
    }

    pub fn find_mut(&mut self, alias: &str) -> Option<&mut Flag> {
        self.flags.values_mut().find(|f| f.matches(alias))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ========================================================================
    // Parameters file
    // ========================================================================

    /// Tab-delimited header plus one row per flag.
    pub fn write_parameters(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", PARAMETERS_HEADER.join("\t"))?;
        for flag in self.flags.values() {
            writeln!(out, "{}", flag.parameters_row())?;
        }
        Ok(())
    }

    // ========================================================================
    // Help
    // ========================================================================

    /// Grouped, column-aligned help.
    ///
    /// With `grouped_by_required` the flags are split into required and optional
    /// sections first; either way they are grouped by `group`, with the default
    /// group last. The reserved help options always close the listing.
    pub fn render(
        &self,
        out: &mut dyn Write,
        painter: &Painter,
        grouped_by_required: bool,
    ) -> io::Result<()> {
        let plain = Painter::plain();
        let mut sections: BTreeMap<Option<Requirement>, BTreeMap<&str, Vec<Row>>> =
            BTreeMap::new();
        for flag in self.flags.values() {
            let section = if !grouped_by_required {
                None
            } else if flag.required {
                Some(Requirement::Required)
            } else {
                Some(Requirement::Optional)
            };
            sections
                .entry(section)
                .or_default()
                .entry(flag.group.as_str())
                .or_default()
                .push(Row {
                    key: flag.auto_dash_aliases(),
                    plain: flag.help_info(&plain),
                    painted: flag.help_info(painter),
                });
        }
        let help_rows: Vec<Row> = HELP_OPTIONS
            .iter()
            .map(|(key, desc)| Row {
                key: key.to_string(),
                plain: desc.to_string(),
                painted: desc.to_string(),
            })
            .collect();

        let all_rows = sections
            .values()
            .flat_map(|groups| groups.values().flatten())
            .chain(help_rows.iter());
        let (key_width, value_width) = all_rows.fold((0, 0), |(k, v), row| {
            (
                k.max(row.key.chars().count()),
                v.max(row.plain.chars().count()),
            )
        });
        let layout = Layout {
            key_width,
            value_width,
        };

        for (section, groups) in &sections {
            let title = section.map(Requirement::title).unwrap_or("Options");
            layout.title(out, &painter.header(title), title)?;

            let ordered = groups
                .iter()
                .filter(|(group, _)| **group != DEFAULT_GROUP)
                .chain(groups.iter().filter(|(group, _)| **group == DEFAULT_GROUP));
            for (group, rows) in ordered {
                let name = if *group == DEFAULT_GROUP {
                    MISC_TITLE
                } else {
                    *group
                };
                layout.title(out, &painter.section(name), name)?;
                for row in rows {
                    layout.row(out, painter, row)?;
                }
            }
        }

        layout.title(out, &painter.header(HELP_TITLE), HELP_TITLE)?;
        for row in &help_rows {
            layout.row(out, painter, row)?;
        }
        Ok(())
    }
}

struct Layout {
    key_width: usize,
    value_width: usize,
}

impl Layout {
    /// Titles are centered over the separator between the two columns.
    fn title(&self, out: &mut dyn Write, painted: &str, plain: &str) -> io::Result<()> {
        let half = plain.chars().count().div_ceil(2);
        let indent = (self.key_width + 2).saturating_sub(half);
        writeln!(out, "{}{painted}", " ".repeat(indent))
    }

    fn row(&self, out: &mut dyn Write, painter: &Painter, row: &Row) -> io::Result<()> {
        let key_pad = self.key_width.saturating_sub(row.key.chars().count());
        let value_pad = self.value_width.saturating_sub(row.plain.chars().count());
        writeln!(
            out,
            "{}{}{COLUMN_SEP}{}{}",
            " ".repeat(key_pad),
            painter.flag(&row.key),
            row.painted,
            " ".repeat(value_pad)
        )
    }
}

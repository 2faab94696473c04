//! One declared command-line option.

use serde::Serialize;

use super::convert::FlagValue;
use crate::colors::Painter;
use crate::error::{Error, Result};

pub const DEFAULT_GROUP: &str = "Misc";

/// Header row of the parameters file.
pub const PARAMETERS_HEADER: [&str; 4] = ["Flags", "ShortDescription", "value", "defaultValue"];

/// Declared option metadata; the bound variable lives with the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    aliases: Vec<String>,
    pub description: String,
    pub required: bool,
    pub type_tag: String,
    pub current_value: String,
    pub default_value: String,
    pub group: String,
    pub set: bool,
}

/// Lower-cased alias with leading dashes removed.
pub fn normalize(alias: &str) -> String {
    alias.trim_start_matches('-').to_lowercase()
}

/// `-x` for one-character names, `--name` otherwise.
pub fn auto_dash(alias: &str) -> String {
    let bare = alias.trim_start_matches('-');
    if bare.chars().count() > 1 {
        format!("--{bare}")
    } else {
        format!("-{bare}")
    }
}

/// Split and validate a comma-separated alias list such as `"--name,-n"`.
pub fn parse_aliases(alias_list: &str) -> Result<Vec<String>> {
    if alias_list.trim().is_empty() {
        return Err(Error::Declaration("flag alias list is empty".into()));
    }

    let mut aliases: Vec<String> = Vec::new();
    for raw in alias_list.split(',') {
        let alias = raw.trim();
        if alias.is_empty() {
            return Err(Error::Declaration(format!(
                "empty alias in flag list {alias_list:?}"
            )));
        }
        let dashes = alias.len() - alias.trim_start_matches('-').len();
        if dashes == 0 {
            return Err(Error::Declaration(format!(
                "flag {alias} must start with a dash"
            )));
        }
        if dashes == alias.len() {
            return Err(Error::Declaration(format!(
                "flag {alias} can't be only dashes"
            )));
        }
        if dashes > 2 {
            return Err(Error::Parse(format!(
                "flag {alias} has more than two leading dashes"
            )));
        }
        if let Some(prior) = aliases.iter().find(|a| normalize(a) == normalize(alias)) {
            return Err(Error::Declaration(format!(
                "flag {alias} repeats {prior} in {alias_list:?}"
            )));
        }
        aliases.push(alias.to_string());
    }
    Ok(aliases)
}

impl Flag {
    /// Declare a flag whose type and default come from `default`.
    pub fn new<T: FlagValue>(
        alias_list: &str,
        description: &str,
        required: bool,
        group: &str,
        default: &T,
    ) -> Result<Self> {
        Self::with_type(
            alias_list,
            description,
            required,
            group,
            &T::type_tag(),
            &default.to_flag_string(),
        )
    }

    pub fn with_type(
        alias_list: &str,
        description: &str,
        required: bool,
        group: &str,
        type_tag: &str,
        default_value: &str,
    ) -> Result<Self> {
        Ok(Self {
            aliases: parse_aliases(alias_list)?,
            description: description.to_string(),
            required,
            type_tag: type_tag.to_string(),
            current_value: default_value.to_string(),
            default_value: default_value.to_string(),
            group: if group.is_empty() {
                DEFAULT_GROUP.to_string()
            } else {
                group.to_string()
            },
            set: false,
        })
    }

    /// Aliases as declared.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Aliases without dashes, longest first.
    pub fn aliases_no_dash(&self) -> Vec<String> {
        let mut bare: Vec<String> = self
            .aliases
            .iter()
            .map(|a| a.trim_start_matches('-').to_string())
            .collect();
        bare.sort_by(|a, b| b.len().cmp(&a.len()));
        bare
    }

    /// True when `name` is one of this flag's aliases, ignoring case and dashes.
    pub fn matches(&self, name: &str) -> bool {
        let wanted = normalize(name);
        self.aliases.iter().any(|a| normalize(a) == wanted)
    }

    /// Aliases with canonical dashes, longest first: `--name,-n`.
    pub fn auto_dash_aliases(&self) -> String {
        self.aliases_no_dash()
            .iter()
            .map(|a| auto_dash(a))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Registry key: lower-cased canonical aliases, sorted and comma-joined.
    pub fn uid(&self) -> String {
        let mut keys: Vec<String> = self
            .aliases
            .iter()
            .map(|a| auto_dash(&a.to_lowercase()))
            .collect();
        keys.sort();
        keys.join(",")
    }

    pub fn set_value<T: FlagValue>(&mut self, value: &T) {
        self.current_value = value.to_flag_string();
        self.set = true;
    }

    /// `description; required; default=X; (type)`
    pub fn help_info(&self, painter: &Painter) -> String {
        let mut out = format!("{}; ", self.description);
        if self.required {
            out.push_str(&painter.required("required"));
            out.push_str("; ");
        }
        out.push_str(&format!(
            "default={}; ({})",
            painter.default_value(&self.default_value),
            painter.dim(&self.type_tag)
        ));
        out
    }

    /// One tab-delimited parameters file row.
    pub fn parameters_row(&self) -> String {
        [
            self.auto_dash_aliases(),
            self.description.clone(),
            self.current_value.clone(),
            self.default_value.clone(),
        ]
        .join("\t")
    }
}

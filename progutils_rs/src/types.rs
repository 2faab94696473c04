use std::str::FromStr;

use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(ColorMode::Auto),
            "always" | "on" | "yes" => Ok(ColorMode::Always),
            "never" | "off" | "no" => Ok(ColorMode::Never),
            other => Err(format!("unknown color mode '{other}'")),
        }
    }
}

/// Where a flag sits in grouped help.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum Requirement {
    Required,
    Optional,
}

impl Requirement {
    pub fn title(self) -> &'static str {
        match self {
            Requirement::Required => "Required Options",
            Requirement::Optional => "Optional Options",
        }
    }
}

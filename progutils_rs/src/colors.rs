//! Terminal color utilities for help and listing output.
//!
//! Help text is rendered twice when aligning columns: once through a plain
//! [`Painter`] to measure widths, once through the real one to print.

use std::io::IsTerminal;

use crate::types::ColorMode;

// ============================================================================
// ANSI Color Codes
// ============================================================================

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const UNDERLINE: &str = "\x1b[4m";
pub const RESET: &str = "\x1b[0m";

pub const BRIGHT_CYAN: &str = "\x1b[96m";

// ============================================================================
// Color State
// ============================================================================

/// Determines if colors should be used based on ColorMode and terminal detection.
pub fn is_enabled(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

/// Colorizer that can be passed around to format functions.
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            enabled: is_enabled(mode),
        }
    }

    /// Never emits escape codes; used for measuring rendered widths.
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    // === Help text ===

    /// Group titles
    pub fn section(&self, s: &str) -> String {
        self.wrap_both(s, BOLD, UNDERLINE)
    }

    /// Flag aliases
    pub fn flag(&self, s: &str) -> String {
        self.wrap(s, CYAN)
    }

    /// The "required" marker
    pub fn required(&self, s: &str) -> String {
        self.wrap(s, RED)
    }

    /// Default values
    pub fn default_value(&self, s: &str) -> String {
        self.wrap(s, GREEN)
    }

    /// Type tags, hints
    pub fn dim(&self, s: &str) -> String {
        self.wrap(s, DIM)
    }

    /// Banners, program names
    pub fn header(&self, s: &str) -> String {
        self.wrap(s, BOLD)
    }

    /// Listing indices
    pub fn number(&self, n: impl std::fmt::Display) -> String {
        self.wrap(&n.to_string(), BRIGHT_CYAN)
    }

    /// Suggested command names
    pub fn suggestion(&self, s: &str) -> String {
        self.wrap(s, BLUE)
    }

    // === Status lines ===

    pub fn warn(&self, s: &str) -> String {
        self.wrap(s, YELLOW)
    }

    pub fn error(&self, s: &str) -> String {
        self.wrap(s, RED)
    }

    // === Raw color access ===

    pub fn wrap(&self, s: &str, code: &str) -> String {
        if self.enabled {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn wrap_both(&self, s: &str, code1: &str, code2: &str) -> String {
        if self.enabled {
            format!("{code1}{code2}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

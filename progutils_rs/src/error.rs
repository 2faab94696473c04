//! Error taxonomy for one invocation's life.
//!
//! Tokenizing and declaring options produce [`Error::Parse`], [`Error::Declaration`]
//! and [`Error::Conversion`]; while binding, [`crate::cli::ProgramSetup`] records
//! those as warnings and reports them together as a single [`Error::Validation`].
//! Nothing in the library exits the process: [`crate::cli::run`] is the one place
//! that turns an error into an exit status.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed argument syntax: too many dashes, stray `=`, duplicate flag.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bad alias list or an alias already owned by another flag.
    #[error("Declaration error: {0}")]
    Declaration(String),

    /// A raw value could not become the declared type.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Option binding finished with at least one warning.
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// `--help` or `--getFlags` was given; help has already been printed.
    #[error("help requested")]
    HelpRequested,

    /// No command by that name or number.
    #[error("Unrecognized command {command}")]
    Dispatch {
        command: String,
        suggestion: Option<String>,
    },

    /// The command body itself failed.
    #[error("{command}: {message}")]
    Handler { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Exit status the entry point reports for this error.
    ///
    /// Every error exits with 1; a handler wanting another status returns it as `Ok(code)`.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True when the user has already been told what went wrong.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::HelpRequested | Error::Dispatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_warning() {
        let err = Error::Validation(vec!["first".into(), "second".into()]);
        assert_eq!(err.to_string(), "first\nsecond");
        assert_eq!(err.exit_code(), 1);
        assert!(err.is_reported());
    }

    #[test]
    fn handler_errors_name_the_command() {
        let err = Error::Handler {
            command: "greet".into(),
            message: "no such file".into(),
        };
        assert_eq!(err.to_string(), "greet: no such file");
        assert!(!err.is_reported());
    }

    #[test]
    fn every_error_exits_with_one() {
        let errors = [
            Error::Parse("---x".into()),
            Error::HelpRequested,
            Error::Dispatch {
                command: "gret".into(),
                suggestion: Some("greet".into()),
            },
            Error::Io(std::io::Error::other("disk")),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }
}

//! Error types for tokenizing, binding, and settings handling.
//!
//! [`ParseError`] is the single error type returned by
//! [`Binder::parse`](crate::Binder::parse). Each variant belongs to one
//! [`ErrorClass`], which decides the exit status a process boundary should
//! use when the error is fatal.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::convert::ConvertError;
use crate::tokenize::SwitchGroup;
use crate::types::ValueKind;
use crate::validate::ValidationError;

/// Exit status for any fatal parse, schema, or setup error.
pub const EXIT_FATAL: i32 = 1;

/// Exit status after usage was printed for an unhandled help request.
pub const EXIT_HELP_REQUESTED: i32 = 2;

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed or unconvertible argument text, unknown switches.
    UserInput,
    /// Required field unresolved, or a switch repeated when that is disallowed.
    SchemaViolation,
    /// Invalid schema, settings, or terminal failure.
    ProcessFatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserInput => "user input error",
            Self::SchemaViolation => "schema violation",
            Self::ProcessFatal => "fatal error",
        })
    }
}

/// A conversion that failed and was not corrected by a hook.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot parse [{field}] from input \"{input}\": {source}")]
pub struct ConversionFailure {
    /// Declared field name.
    pub field: String,
    /// Argument text; redacted for secure fields.
    pub input: String,
    /// Kind the conversion targeted.
    pub kind: ValueKind,
    pub source: ConvertError,
}

/// Failures surfaced by the binder.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A switch appeared more than once while that is disallowed.
    #[error("Switch \"{0}\" used multiple times, switches cannot be used more than once")]
    MultipleSwitchUse(String),

    /// A required field resolved to no value.
    #[error("{switch} is a required parameter")]
    MissingRequired { field: String, switch: String },

    /// The interactive prompt for a required field ended without input.
    #[error("prompt for required field {field} {}", prompt_ending(.timed_out))]
    PromptAborted { field: String, timed_out: bool },

    /// A secure value was needed but no prompter is available.
    #[error("secure field {field} requires interactive input")]
    SecureInputUnavailable { field: String },

    #[error(transparent)]
    Conversion(#[from] ConversionFailure),

    /// Switch groups no field consumed.
    #[error("{}", format_ignored(.0))]
    IgnoredParameters(Vec<SwitchGroup>),

    /// The schema failed validation before binding started.
    #[error("invalid schema: {}", join_errors(.0))]
    InvalidSchema(Vec<ValidationError>),

    /// A bound value could not be assigned into the target.
    #[error("cannot assign bound values: {0}")]
    Assign(#[source] ConvertError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ParseError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Conversion(_) | Self::IgnoredParameters(_) => ErrorClass::UserInput,
            Self::MultipleSwitchUse(_)
            | Self::MissingRequired { .. }
            | Self::PromptAborted { .. }
            | Self::SecureInputUnavailable { .. } => ErrorClass::SchemaViolation,
            Self::InvalidSchema(_) | Self::Assign(_) | Self::Prompt(_) | Self::Settings(_) => {
                ErrorClass::ProcessFatal
            }
        }
    }

    /// Exit status to use when this error terminates the process.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }

    /// Returns `true` for errors caused by a required field left unresolved.
    pub fn is_schema_violation(&self) -> bool {
        self.class() == ErrorClass::SchemaViolation
    }
}

fn prompt_ending(timed_out: &bool) -> &'static str {
    if *timed_out {
        "timed out"
    } else {
        "was cancelled"
    }
}

fn format_ignored(groups: &[SwitchGroup]) -> String {
    groups
        .iter()
        .map(|g| format!("Group {g} not recognised."))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a [`Prompter`](crate::Prompter).
#[derive(Debug, Error)]
pub enum PromptError {
    /// Terminal read or write failure.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key source reached end of input during a session.
    #[error("input closed while prompting")]
    InputClosed,
}

/// Errors raised while loading or validating [`ParserSettings`](crate::ParserSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

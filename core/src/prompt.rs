//! Interface between the binder and an interactive prompt engine.
//!
//! The binder describes what it needs in a [`PromptRequest`] and hands it to
//! a [`Prompter`]. The `switchbind-prompt` crate provides the terminal
//! implementation; tests use scripted prompters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PromptError;
use crate::secure::SecureText;

/// Predefined allowed-character sets.
pub mod charset {
    /// Digits and the minus sign.
    pub const NUMERIC: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-'];

    /// Digits only.
    pub const DIGITS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

    /// [`NUMERIC`] plus the decimal point.
    pub const DECIMAL: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '.'];

    /// Lower- and upper-case ASCII letters.
    pub fn alpha() -> Vec<char> {
        ('a'..='z').chain('A'..='Z').collect()
    }

    /// [`alpha`] plus digits.
    pub fn alphanumeric() -> Vec<char> {
        alpha().into_iter().chain('0'..='9').collect()
    }
}

/// How typed text selects autocomplete candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocompleteMode {
    /// Candidates starting with the typed text.
    #[default]
    Prefix,
    /// Candidates containing the typed text anywhere.
    Substring,
}

impl AutocompleteMode {
    /// Case-insensitive match of `typed` against `candidate`.
    pub fn matches(self, candidate: &str, typed: &str) -> bool {
        let candidate = candidate.to_lowercase();
        let typed = typed.to_lowercase();
        match self {
            Self::Prefix => candidate.starts_with(&typed),
            Self::Substring => candidate.contains(&typed),
        }
    }
}

/// One prompt session's parameters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchbind_core::{PromptRequest, charset};
///
/// let request = PromptRequest::new("Port? ")
///     .with_allowed(charset::DIGITS)
///     .with_timeout(Some(Duration::from_secs(10)));
/// assert!(request.accepts('7'));
/// assert!(!request.accepts('x'));
///
/// let confirm = PromptRequest::new("Continue? ").with_candidates(["Yes", "No"]).forced();
/// assert!(confirm.forced);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptRequest {
    pub text: String,
    pub candidates: Vec<String>,
    pub mode: AutocompleteMode,
    /// Commit a candidate on its shortcut key, without Enter.
    pub forced: bool,
    /// Capture into a [`SecureText`] and echo a mask.
    pub secure: bool,
    /// When set, only these characters are accepted.
    pub allowed: Option<Vec<char>>,
    pub timeout: Option<Duration>,
}

impl PromptRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: AutocompleteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn with_allowed(mut self, allowed: &[char]) -> Self {
        self.allowed = Some(allowed.to_vec());
        self
    }

    /// Zero durations are treated as no timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|d| !d.is_zero());
        self
    }

    /// Returns `true` if `ch` passes the allowed-character filter.
    pub fn accepts(&self, ch: char) -> bool {
        self.allowed.as_ref().is_none_or(|set| set.contains(&ch))
    }

    /// Returns `true` if a forced choice menu should be shown.
    pub fn uses_forced_menu(&self) -> bool {
        self.forced && !self.secure && !self.candidates.is_empty()
    }
}

/// Text captured by a completed session.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Plain(String),
    Secure(SecureText),
}

impl Response {
    /// Moves the response into secure storage.
    pub fn into_secure(self) -> SecureText {
        match self {
            Self::Plain(mut text) => {
                let secure = SecureText::from_chars(text.chars());
                secrecy::zeroize::Zeroize::zeroize(&mut text);
                secure
            }
            Self::Secure(secure) => secure,
        }
    }
}

/// Terminal state of a prompt session.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Completed(Response),
    Cancelled,
    TimedOut,
}

/// Captures input interactively.
pub trait Prompter {
    /// Runs one session to a terminal outcome.
    fn prompt(&mut self, request: &PromptRequest) -> Result<PromptOutcome, PromptError>;

    /// Shows an error before the binder prompts again.
    fn report_error(&mut self, message: &str) {
        let _ = message;
    }
}

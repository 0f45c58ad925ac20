//! Parser configuration.
//!
//! [`ParserSettings`] is constructed once and handed to a
//! [`Binder`](crate::Binder), which keeps its own copy; two binders never
//! observe each other's settings. Settings can be stored as YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! allow_all_properties: true
//! prompt_for_missing_required: true
//! prompt_timeout_secs: 10
//! switch_identifiers: ["-"]
//! list_separators: [",", ";"]
//! help_tokens: ["?", "help", "h"]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Default switch identifier characters.
pub const DEFAULT_SWITCH_IDENTIFIERS: [char; 2] = ['/', '-'];
/// Default list separator.
pub const DEFAULT_LIST_SEPARATOR: char = ',';
/// Default help request tokens.
pub const DEFAULT_HELP_TOKENS: [&str; 2] = ["?", "help"];
/// Default bound on prompt waits, in seconds.
pub const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 30;

/// Options recognised by the tokenizer, converters, and binder.
///
/// Missing keys in YAML fall back to [`Default`].
///
/// # Examples
///
/// ```
/// use switchbind_core::ParserSettings;
///
/// let settings = ParserSettings::default()
///     .with_switch_identifiers(&['-'])
///     .with_list_separators(&[';']);
///
/// assert!(settings.is_switch("-port"));
/// assert!(!settings.is_switch("/port"));
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Bind plain fields as well as marked ones.
    pub allow_all_properties: bool,
    /// Always prompt for secure fields, ignoring a value given on the
    /// command line.
    pub force_secure: bool,
    /// Prompt for required fields that no switch supplied.
    pub prompt_for_missing_required: bool,
    /// Bound prompt waits by [`prompt_timeout_secs`](Self::prompt_timeout_secs).
    pub prompt_timeout_enabled: bool,
    pub prompt_timeout_secs: u64,
    /// Fail on a repeated switch instead of ignoring later occurrences.
    pub throw_on_multiple_switch_use: bool,
    /// Fail when switch groups are left unused.
    pub throw_on_ignored_groups: bool,
    /// Fail on an uncorrected conversion error instead of collecting it.
    pub throw_on_parse_error: bool,
    /// Fail on an unresolved required field instead of collecting it.
    pub throw_on_schema_violation: bool,
    /// A bool switch with an unrecognised argument counts as `true`.
    pub treat_bool_presence_as_true: bool,
    /// Report ignored groups as a `warn` event.
    pub print_ignored_groups: bool,
    /// Enable the built-in collection and bool converters.
    pub use_builtin_converters: bool,
    /// Print usage before fatal errors.
    pub show_help_on_errors: bool,
    pub switch_identifiers: Vec<char>,
    pub list_separators: Vec<char>,
    pub help_tokens: Vec<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            allow_all_properties: false,
            force_secure: true,
            prompt_for_missing_required: false,
            prompt_timeout_enabled: true,
            prompt_timeout_secs: DEFAULT_PROMPT_TIMEOUT_SECS,
            throw_on_multiple_switch_use: false,
            throw_on_ignored_groups: false,
            throw_on_parse_error: false,
            throw_on_schema_violation: true,
            treat_bool_presence_as_true: true,
            print_ignored_groups: false,
            use_builtin_converters: true,
            show_help_on_errors: true,
            switch_identifiers: DEFAULT_SWITCH_IDENTIFIERS.to_vec(),
            list_separators: vec![DEFAULT_LIST_SEPARATOR],
            help_tokens: DEFAULT_HELP_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ParserSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read,
    /// [`SettingsError::Yaml`] if parsing fails, or
    /// [`SettingsError::Invalid`] if the loaded values fail
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings: Self = serde_yaml::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that identifiers, separators, and help tokens are usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.switch_identifiers.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one switch identifier is required".to_string(),
            ));
        }
        if let Some(c) = self
            .switch_identifiers
            .iter()
            .find(|c| c.is_alphanumeric() || c.is_whitespace())
        {
            return Err(SettingsError::Invalid(format!(
                "switch identifier '{c}' must be a symbol"
            )));
        }
        if self.list_separators.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one list separator is required".to_string(),
            ));
        }
        if let Some(c) = self
            .list_separators
            .iter()
            .find(|c| self.switch_identifiers.contains(c))
        {
            return Err(SettingsError::Invalid(format!(
                "'{c}' cannot be both a list separator and a switch identifier"
            )));
        }
        if self.help_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(SettingsError::Invalid(
                "at least one help token is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if `token` starts with a switch identifier.
    pub fn is_switch(&self, token: &str) -> bool {
        token
            .chars()
            .next()
            .is_some_and(|c| self.switch_identifiers.contains(&c.to_ascii_lowercase()))
    }

    /// Returns `true` if a lowercase switch name requests help.
    pub fn is_help_token(&self, switch: &str) -> bool {
        self.help_tokens.iter().any(|t| t.to_lowercase() == switch)
    }

    /// Timeout for prompt sessions, if enabled and positive.
    pub fn prompt_timeout(&self) -> Option<Duration> {
        (self.prompt_timeout_enabled && self.prompt_timeout_secs > 0)
            .then(|| Duration::from_secs(self.prompt_timeout_secs))
    }

    /// Identifier used when rendering switches in messages.
    pub fn primary_identifier(&self) -> char {
        self.switch_identifiers
            .first()
            .copied()
            .unwrap_or(DEFAULT_SWITCH_IDENTIFIERS[0])
    }

    pub fn with_switch_identifiers(mut self, identifiers: &[char]) -> Self {
        self.switch_identifiers = identifiers.iter().map(|c| c.to_ascii_lowercase()).collect();
        self
    }

    pub fn with_list_separators(mut self, separators: &[char]) -> Self {
        self.list_separators = separators.to_vec();
        self
    }

    pub fn with_help_tokens(mut self, tokens: &[&str]) -> Self {
        self.help_tokens = tokens.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn allow_all_properties(mut self, enabled: bool) -> Self {
        self.allow_all_properties = enabled;
        self
    }

    pub fn prompt_for_missing_required(mut self, enabled: bool) -> Self {
        self.prompt_for_missing_required = enabled;
        self
    }

    pub fn throw_on_schema_violation(mut self, enabled: bool) -> Self {
        self.throw_on_schema_violation = enabled;
        self
    }

    pub fn throw_on_multiple_switch_use(mut self, enabled: bool) -> Self {
        self.throw_on_multiple_switch_use = enabled;
        self
    }

    pub fn throw_on_ignored_groups(mut self, enabled: bool) -> Self {
        self.throw_on_ignored_groups = enabled;
        self
    }

    pub fn throw_on_parse_error(mut self, enabled: bool) -> Self {
        self.throw_on_parse_error = enabled;
        self
    }

    pub fn treat_bool_presence_as_true(mut self, enabled: bool) -> Self {
        self.treat_bool_presence_as_true = enabled;
        self
    }

    pub fn force_secure(mut self, enabled: bool) -> Self {
        self.force_secure = enabled;
        self
    }

    pub fn print_ignored_groups(mut self, enabled: bool) -> Self {
        self.print_ignored_groups = enabled;
        self
    }
}

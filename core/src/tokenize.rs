//! Grouping of raw arguments into switch groups.
//!
//! A token whose first character is a configured switch identifier starts a
//! new [`SwitchGroup`]; every following non-switch token is appended to that
//! group's argument, joined by single spaces.
//!
//! Switch names are lower-cased when the group is created. Argument text
//! keeps the case of the input tokens.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::ParseError;
use crate::settings::ParserSettings;

/// A switch plus its accumulated argument text.
///
/// `index` is the 1-based position among all groups the tokenizer emitted,
/// repeated switches included.
///
/// # Examples
///
/// ```
/// use switchbind_core::SwitchGroup;
///
/// let group = SwitchGroup {
///     identifier: '-',
///     name: "string".to_string(),
///     argument: "This is my string".to_string(),
///     index: 3,
/// };
/// assert_eq!(group.to_string(), "-string This is my string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SwitchGroup {
    pub identifier: char,
    /// Lower-cased switch name without its identifier.
    pub name: String,
    /// Continuation tokens joined by single spaces; empty for a bare switch.
    pub argument: String,
    pub index: usize,
}

impl SwitchGroup {
    /// Returns `true` if the switch was given without an argument.
    pub fn is_bare(&self) -> bool {
        self.argument.is_empty()
    }
}

impl fmt::Display for SwitchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.identifier, self.name)?;
        if !self.argument.is_empty() {
            write!(f, " {}", self.argument)?;
        }
        Ok(())
    }
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tokenized {
    /// First occurrence of each switch, in input order.
    pub groups: Vec<SwitchGroup>,
    /// Later occurrences of repeated switches.
    pub ignored: Vec<SwitchGroup>,
}

impl Tokenized {
    /// Finds the usable group for a lower-cased switch name.
    pub fn find(&self, name: &str) -> Option<&SwitchGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Groups `args` into switch groups.
///
/// Tokens before the first switch are discarded. Empty tokens are dropped,
/// and a token made of a single identifier character is treated as argument
/// text rather than a switch.
///
/// # Errors
///
/// Returns [`ParseError::MultipleSwitchUse`] when a switch repeats and
/// [`throw_on_multiple_switch_use`](ParserSettings::throw_on_multiple_switch_use)
/// is set. Otherwise the first occurrence wins.
///
/// # Examples
///
/// ```
/// use switchbind_core::{ParserSettings, tokenize};
///
/// let args = ["-int", "123", "-bool", "T", "-string", "This", "is", "my", "string"];
/// let tokens = tokenize(&args, &ParserSettings::default()).unwrap();
///
/// let pairs: Vec<_> = tokens
///     .groups
///     .iter()
///     .map(|g| (g.name.as_str(), g.argument.as_str(), g.index))
///     .collect();
/// assert_eq!(
///     pairs,
///     vec![("int", "123", 1), ("bool", "T", 2), ("string", "This is my string", 3)]
/// );
/// ```
pub fn tokenize<S: AsRef<str>>(
    args: &[S],
    settings: &ParserSettings,
) -> Result<Tokenized, ParseError> {
    let mut result = Tokenized::default();
    let mut current: Option<SwitchGroup> = None;
    let mut emitted = 0usize;

    for token in args.iter().map(AsRef::as_ref).filter(|t| !t.is_empty()) {
        if let Some((identifier, name)) = split_switch(token, settings) {
            if let Some(group) = current.take() {
                push_group(&mut result, group, settings)?;
            }
            emitted += 1;
            current = Some(SwitchGroup {
                identifier,
                name: name.to_lowercase(),
                argument: String::new(),
                index: emitted,
            });
            continue;
        }

        match current.as_mut() {
            Some(group) => {
                if !group.argument.is_empty() {
                    group.argument.push(' ');
                }
                group.argument.push_str(token);
            }
            None => debug!(token, "discarding token before first switch"),
        }
    }

    if let Some(group) = current.take() {
        push_group(&mut result, group, settings)?;
    }

    Ok(result)
}

fn split_switch<'a>(token: &'a str, settings: &ParserSettings) -> Option<(char, &'a str)> {
    let identifier = token.chars().next()?;
    if !settings.is_switch(token) {
        return None;
    }
    let name = &token[identifier.len_utf8()..];
    if name.is_empty() {
        return None;
    }
    Some((identifier, name))
}

fn push_group(
    result: &mut Tokenized,
    group: SwitchGroup,
    settings: &ParserSettings,
) -> Result<(), ParseError> {
    if result.find(&group.name).is_some() {
        if settings.throw_on_multiple_switch_use {
            return Err(ParseError::MultipleSwitchUse(group.name));
        }
        debug!(switch = %group.name, index = group.index, "ignoring repeated switch");
        result.ignored.push(group);
        return Ok(());
    }

    debug!(
        switch = %group.name,
        argument_len = group.argument.len(),
        index = group.index,
        "emitted switch group"
    );
    result.groups.push(group);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(groups: &[SwitchGroup]) -> Vec<(&str, &str)> {
        groups
            .iter()
            .map(|g| (g.name.as_str(), g.argument.as_str()))
            .collect()
    }

    #[test]
    fn test_tokenize_groups_arguments() {
        let args = [
            "-int", "123", "-bool", "T", "-string", "This", "is", "my", "string",
        ];
        let tokens = tokenize(&args, &ParserSettings::default()).unwrap();

        assert_eq!(
            names(&tokens.groups),
            vec![("int", "123"), ("bool", "T"), ("string", "This is my string")]
        );
        let indices: Vec<_> = tokens.groups.iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(tokens.ignored.is_empty());
    }

    #[test]
    fn test_switch_names_fold_case_but_arguments_do_not() {
        let tokens = tokenize(&["/NaMe", "MixedCase"], &ParserSettings::default()).unwrap();
        assert_eq!(tokens.groups[0].name, "name");
        assert_eq!(tokens.groups[0].argument, "MixedCase");
        assert_eq!(tokens.groups[0].identifier, '/');
    }

    #[test]
    fn test_leading_arguments_are_discarded() {
        let tokens = tokenize(&["stray", "words", "-a", "1"], &ParserSettings::default()).unwrap();
        assert_eq!(names(&tokens.groups), vec![("a", "1")]);
        assert_eq!(tokens.groups[0].index, 1);
    }

    #[test]
    fn test_repeated_switch_first_wins() {
        let tokens = tokenize(&["-a", "1", "-a", "2"], &ParserSettings::default()).unwrap();
        assert_eq!(names(&tokens.groups), vec![("a", "1")]);
        assert_eq!(names(&tokens.ignored), vec![("a", "2")]);
        assert_eq!(tokens.ignored[0].index, 2);
    }

    #[test]
    fn test_repeated_switch_is_fatal_when_configured() {
        let settings = ParserSettings::default().throw_on_multiple_switch_use(true);
        let err = tokenize(&["-a", "1", "-A", "2"], &settings).unwrap_err();
        assert!(matches!(err, ParseError::MultipleSwitchUse(name) if name == "a"));
    }

    #[test]
    fn test_bare_identifier_is_argument_text() {
        let tokens = tokenize(&["-input", "-", "-v"], &ParserSettings::default()).unwrap();
        assert_eq!(names(&tokens.groups), vec![("input", "-"), ("v", "")]);
        assert!(tokens.groups[1].is_bare());
    }

    #[test]
    fn test_empty_tokens_are_dropped() {
        let tokens = tokenize(&["-a", "", "x", ""], &ParserSettings::default()).unwrap();
        assert_eq!(names(&tokens.groups), vec![("a", "x")]);
    }

    #[test]
    fn test_custom_identifiers() {
        let settings = ParserSettings::default().with_switch_identifiers(&['+']);
        let tokens = tokenize(&["-a", "+b", "-c"], &settings).unwrap();
        assert_eq!(names(&tokens.groups), vec![("b", "-c")]);
    }

    #[test]
    fn test_rendered_group_tokenizes_back() {
        let settings = ParserSettings::default();
        let tokens = tokenize(&["-name", "two", "words", "-flag"], &settings).unwrap();

        for group in &tokens.groups {
            let rendered = group.to_string();
            let parts: Vec<&str> = rendered.split(' ').collect();
            let again = tokenize(&parts, &settings).unwrap();
            assert_eq!(again.groups.len(), 1);
            assert_eq!(again.groups[0].name, group.name);
            assert_eq!(again.groups[0].argument, group.argument);
            assert_eq!(again.groups[0].identifier, group.identifier);
        }
    }
}

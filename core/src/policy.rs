//! Failure dispositions and caller hooks.
//!
//! Every failure kind is either raised immediately, collected into the
//! [`ParseResult`](crate::ParseResult), or first delegated to a hook that may
//! handle it. [`Policy`] combines the settings flags with the registered
//! hooks to answer which applies.

use std::fmt;

use crate::error::ConversionFailure;
use crate::settings::ParserSettings;
use crate::tokenize::SwitchGroup;
use crate::types::Schema;
use crate::value::Value;

/// Failure kinds subject to a disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MultipleSwitchUse,
    SchemaViolation,
    ConversionFailure,
    IgnoredParameter,
}

/// What happens when a failure of some kind occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return the error from the parse call.
    FailFast,
    /// Record it and continue.
    Collect,
    /// Offer it to a hook; unhandled failures fall back to the flag-driven
    /// disposition.
    Delegate,
}

/// Supplies a replacement value for a failed conversion.
pub type CorrectionHook = Box<dyn FnMut(&ConversionFailure) -> Option<Value>>;

/// Receives unused switch groups; returns `true` when it handled them.
pub type IgnoredHook = Box<dyn FnMut(&[SwitchGroup]) -> bool>;

/// Receives help requests; returns `true` when it handled the request.
pub type HelpHook = Box<dyn FnMut(&Schema) -> bool>;

/// Settings-driven dispositions plus optional hooks.
#[derive(Default)]
pub struct Policy {
    pub(crate) on_conversion_error: Option<CorrectionHook>,
    pub(crate) on_ignored: Option<IgnoredHook>,
    pub(crate) on_help: Option<HelpHook>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correction_hook(
        mut self,
        hook: impl FnMut(&ConversionFailure) -> Option<Value> + 'static,
    ) -> Self {
        self.on_conversion_error = Some(Box::new(hook));
        self
    }

    pub fn with_ignored_hook(mut self, hook: impl FnMut(&[SwitchGroup]) -> bool + 'static) -> Self {
        self.on_ignored = Some(Box::new(hook));
        self
    }

    pub fn with_help_hook(mut self, hook: impl FnMut(&Schema) -> bool + 'static) -> Self {
        self.on_help = Some(Box::new(hook));
        self
    }

    /// Disposition for `kind` before any hook has run.
    pub fn disposition(&self, kind: FailureKind, settings: &ParserSettings) -> Disposition {
        match kind {
            FailureKind::ConversionFailure if self.on_conversion_error.is_some() => {
                Disposition::Delegate
            }
            FailureKind::IgnoredParameter if self.on_ignored.is_some() => Disposition::Delegate,
            _ => Self::fallback(kind, settings),
        }
    }

    /// Disposition once delegation did not handle the failure.
    pub fn fallback(kind: FailureKind, settings: &ParserSettings) -> Disposition {
        let fail_fast = match kind {
            FailureKind::MultipleSwitchUse => settings.throw_on_multiple_switch_use,
            FailureKind::SchemaViolation => settings.throw_on_schema_violation,
            FailureKind::ConversionFailure => settings.throw_on_parse_error,
            FailureKind::IgnoredParameter => settings.throw_on_ignored_groups,
        };
        if fail_fast {
            Disposition::FailFast
        } else {
            Disposition::Collect
        }
    }

    /// Offers a conversion failure to the correction hook.
    pub(crate) fn correct(&mut self, failure: &ConversionFailure) -> Option<Value> {
        self.on_conversion_error
            .as_mut()
            .and_then(|hook| hook(failure))
    }

    /// Offers ignored groups to the hook; `false` when no hook handled them.
    pub(crate) fn handle_ignored(&mut self, groups: &[SwitchGroup]) -> bool {
        self.on_ignored.as_mut().is_some_and(|hook| hook(groups))
    }

    /// Offers a help request to the hook; `false` when no hook handled it.
    pub(crate) fn handle_help(&mut self, schema: &Schema) -> bool {
        self.on_help.as_mut().is_some_and(|hook| hook(schema))
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("on_conversion_error", &self.on_conversion_error.is_some())
            .field("on_ignored", &self.on_ignored.is_some())
            .field("on_help", &self.on_help.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dispositions() {
        let policy = Policy::new();
        let settings = ParserSettings::default();

        assert_eq!(
            policy.disposition(FailureKind::SchemaViolation, &settings),
            Disposition::FailFast
        );
        assert_eq!(
            policy.disposition(FailureKind::ConversionFailure, &settings),
            Disposition::Collect
        );
        assert_eq!(
            policy.disposition(FailureKind::IgnoredParameter, &settings),
            Disposition::Collect
        );
        assert_eq!(
            policy.disposition(FailureKind::MultipleSwitchUse, &settings),
            Disposition::Collect
        );
    }

    #[test]
    fn test_hooks_delegate() {
        let policy = Policy::new()
            .with_correction_hook(|_| None)
            .with_ignored_hook(|_| true);
        let settings = ParserSettings::default().throw_on_parse_error(true);

        assert_eq!(
            policy.disposition(FailureKind::ConversionFailure, &settings),
            Disposition::Delegate
        );
        assert_eq!(
            Policy::fallback(FailureKind::ConversionFailure, &settings),
            Disposition::FailFast
        );
        assert_eq!(
            policy.disposition(FailureKind::IgnoredParameter, &settings),
            Disposition::Delegate
        );
    }

    #[test]
    fn test_help_hook_result() {
        let mut policy = Policy::new();
        let schema = Schema::new("app");
        assert!(!policy.handle_help(&schema));

        let mut policy = Policy::new().with_help_hook(|schema| schema.name == "app");
        assert!(policy.handle_help(&schema));
    }
}

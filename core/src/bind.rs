//! Field resolution.
//!
//! [`Binder::parse`] walks the bindable fields of a schema in declaration
//! order. Each field resolves to exactly one outcome:
//!
//! - a converted switch argument (or a hook-corrected value),
//! - a prompted value,
//! - its default,
//! - a recorded or raised schema violation (required fields only),
//! - nothing (optional fields without a default).
//!
//! Switch groups no field consumed are reported as ignored.

use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::convert::ConverterRegistry;
use crate::error::{ConversionFailure, ParseError};
use crate::policy::{Disposition, FailureKind, Policy};
use crate::prompt::{PromptOutcome, PromptRequest, Prompter, Response, charset};
use crate::secure::REDACTED;
use crate::settings::ParserSettings;
use crate::tokenize::{SwitchGroup, Tokenized, tokenize};
use crate::types::{FieldDescriptor, Schema, ValueKind};
use crate::validate::validate_schema;
use crate::value::{Bindable, Value, ValueMap};

/// Outcome of one [`Binder::parse`] call.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Resolved values keyed by lowercase field name.
    pub values: ValueMap,
    /// Collected conversion failures and schema violations.
    pub errors: Vec<ParseError>,
    /// Repeated and unused switch groups, ordered by index.
    pub ignored: Vec<SwitchGroup>,
    pub help_requested: bool,
    /// Set when a help hook handled the request.
    pub help_handled: bool,
}

impl ParseResult {
    /// Returns `true` if nothing was collected or ignored.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.ignored.is_empty()
    }

    /// Returns `true` if help was requested and no hook handled it.
    pub fn needs_usage(&self) -> bool {
        self.help_requested && !self.help_handled
    }
}

enum Prompted {
    Value(Value),
    Aborted { timed_out: bool },
}

/// Binds switch groups to schema fields.
///
/// A binder owns its settings, converter registry, policy, and optional
/// prompter. Settings are fixed once the binder is built.
///
/// # Examples
///
/// ```
/// use switchbind_core::*;
///
/// let schema = Schema::new("server")
///     .with_field(FieldDescriptor::required("port", ValueKind::Unsigned).with_short_name("p"))
///     .with_field(
///         FieldDescriptor::optional("hosts", ValueKind::collection(CollectionShape::List, ValueKind::String))
///             .with_default(Value::List(vec![Value::String("localhost".into())])),
///     )
///     .with_field(FieldDescriptor::optional("verbose", ValueKind::Bool));
///
/// let mut binder = Binder::new(ParserSettings::default());
/// let result = binder.parse(&["-p", "8080", "-verbose"], &schema).unwrap();
///
/// assert_eq!(result.values.get_u64("port"), Some(8080));
/// assert_eq!(result.values.get_bool("verbose"), Some(true));
/// assert!(result.values.contains("hosts"));
/// assert!(result.is_clean());
/// ```
pub struct Binder {
    settings: ParserSettings,
    registry: ConverterRegistry,
    policy: Policy,
    prompter: Option<Box<dyn Prompter>>,
}

impl Binder {
    pub fn new(settings: ParserSettings) -> Self {
        Self {
            settings,
            registry: ConverterRegistry::new(),
            policy: Policy::new(),
            prompter: None,
        }
    }

    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Some(Box::new(prompter));
        self
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Tokenizes `args` and resolves every bindable field of `schema`.
    ///
    /// # Errors
    ///
    /// Returns the first failure whose disposition is fail-fast, an invalid
    /// schema, or a prompter I/O error.
    pub fn parse<S: AsRef<str>>(
        &mut self,
        args: &[S],
        schema: &Schema,
    ) -> Result<ParseResult, ParseError> {
        let problems = validate_schema(schema, &self.settings);
        if !problems.is_empty() {
            return Err(ParseError::InvalidSchema(problems));
        }

        let Tokenized {
            mut groups,
            ignored: repeated,
        } = tokenize(args, &self.settings)?;

        let mut result = ParseResult::default();
        if let Some(pos) = groups
            .iter()
            .position(|g| self.settings.is_help_token(&g.name))
        {
            let help = groups.remove(pos);
            debug!(switch = %help.name, "help requested");
            result.help_requested = true;
        }

        let mut used = vec![false; groups.len()];
        for field in schema.bindable_fields(self.settings.allow_all_properties) {
            let matched = groups.iter().position(|g| field.matches_switch(&g.name));
            match matched {
                Some(i) if self.forces_secure_prompt(field, &result) => {
                    debug!(field = %field.name, "discarding supplied secure value");
                    used[i] = true;
                    self.resolve_unmatched(field, &mut result)?;
                }
                Some(i) => {
                    if self.resolve_matched(field, &groups[i], &mut result)? {
                        used[i] = true;
                    }
                }
                None => self.resolve_unmatched(field, &mut result)?,
            }
        }

        let mut ignored = repeated;
        ignored.extend(
            groups
                .into_iter()
                .zip(used)
                .filter(|(_, used)| !used)
                .map(|(group, _)| group),
        );
        ignored.sort_by_key(|g| g.index);
        self.process_ignored(&ignored)?;
        result.ignored = ignored;

        if result.help_requested {
            result.help_handled = self.policy.handle_help(schema);
        }

        Ok(result)
    }

    /// Parses against `T`'s schema and assigns the values into `target`.
    ///
    /// # Errors
    ///
    /// Everything [`parse`](Self::parse) returns, plus [`ParseError::Assign`]
    /// when a value does not fit the target field.
    pub fn bind_into<T: Bindable, S: AsRef<str>>(
        &mut self,
        args: &[S],
        target: &mut T,
    ) -> Result<ParseResult, ParseError> {
        let schema = T::schema();
        let result = self.parse(args, &schema)?;
        result
            .values
            .clone()
            .load_into(target)
            .map_err(ParseError::Assign)?;
        Ok(result)
    }

    fn forces_secure_prompt(&self, field: &FieldDescriptor, result: &ParseResult) -> bool {
        field.kind.is_secure()
            && self.settings.force_secure
            && !result.help_requested
            && self.prompter.is_some()
    }

    /// Converts a matched argument; returns whether the group was consumed.
    fn resolve_matched(
        &mut self,
        field: &FieldDescriptor,
        group: &SwitchGroup,
        result: &mut ParseResult,
    ) -> Result<bool, ParseError> {
        let key = field.canonical_name();
        let source = match self
            .registry
            .convert(&group.argument, &field.kind, &self.settings)
        {
            Ok(value) => {
                debug!(field = %field.name, switch = %group.name, "bound from switch");
                result.values.set(&key, value);
                return Ok(true);
            }
            Err(source) => source,
        };

        let failure = ConversionFailure {
            field: field.name.clone(),
            input: if field.kind.is_secure() {
                REDACTED.to_string()
            } else {
                group.argument.clone()
            },
            kind: field.kind.clone(),
            source,
        };

        if self.policy.disposition(FailureKind::ConversionFailure, &self.settings)
            == Disposition::Delegate
        {
            if let Some(value) = self.policy.correct(&failure) {
                debug!(field = %field.name, "conversion corrected by hook");
                result.values.set(&key, value);
                return Ok(true);
            }
        }

        warn!(field = %field.name, error = %failure.source, "conversion failed");
        match Policy::fallback(FailureKind::ConversionFailure, &self.settings) {
            Disposition::FailFast => Err(failure.into()),
            _ => {
                result.errors.push(failure.into());
                Ok(false)
            }
        }
    }

    fn resolve_unmatched(
        &mut self,
        field: &FieldDescriptor,
        result: &mut ParseResult,
    ) -> Result<(), ParseError> {
        let key = field.canonical_name();

        let can_prompt = self.prompter.is_some() && !result.help_requested;
        let wants_prompt = field.kind.is_secure()
            || (field.required && self.settings.prompt_for_missing_required);

        if can_prompt && wants_prompt {
            match self.prompt_for(field)? {
                Prompted::Value(value) => {
                    debug!(field = %field.name, "bound from prompt");
                    result.values.set(&key, value);
                    return Ok(());
                }
                Prompted::Aborted { timed_out } if field.required => {
                    let err = ParseError::PromptAborted {
                        field: field.name.clone(),
                        timed_out,
                    };
                    return self.schema_violation(err, result);
                }
                Prompted::Aborted { .. } => {}
            }
        }

        if field.required {
            let err = if field.kind.is_secure() && self.prompter.is_none() {
                ParseError::SecureInputUnavailable {
                    field: field.name.clone(),
                }
            } else {
                ParseError::MissingRequired {
                    field: field.name.clone(),
                    switch: format!("{}{}", self.settings.primary_identifier(), field.switch_name()),
                }
            };
            return self.schema_violation(err, result);
        }

        if let Some(default) = &field.default {
            debug!(field = %field.name, "using default");
            result.values.set(&key, default.clone());
        }
        Ok(())
    }

    fn schema_violation(&self, err: ParseError, result: &mut ParseResult) -> Result<(), ParseError> {
        warn!(error = %err, "schema violation");
        // A help request always gets to show usage
        if !result.help_requested
            && Policy::fallback(FailureKind::SchemaViolation, &self.settings)
                == Disposition::FailFast
        {
            return Err(err);
        }
        result.errors.push(err);
        Ok(())
    }

    /// Prompts until a value converts or the session ends without input.
    fn prompt_for(&mut self, field: &FieldDescriptor) -> Result<Prompted, ParseError> {
        let request = self.prompt_request(field);
        let Some(prompter) = self.prompter.as_mut() else {
            return Ok(Prompted::Aborted { timed_out: false });
        };

        loop {
            let response = match prompter.prompt(&request)? {
                PromptOutcome::Completed(response) => response,
                PromptOutcome::Cancelled => {
                    debug!(field = %field.name, "prompt cancelled");
                    return Ok(Prompted::Aborted { timed_out: false });
                }
                PromptOutcome::TimedOut => {
                    debug!(field = %field.name, "prompt timed out");
                    return Ok(Prompted::Aborted { timed_out: true });
                }
            };

            if field.kind.is_secure() {
                return Ok(Prompted::Value(Value::Secure(response.into_secure())));
            }

            let text = match response {
                Response::Plain(text) => text,
                Response::Secure(secure) => secure.expose_secret().to_string(),
            };
            match self.registry.convert(&text, &field.kind, &self.settings) {
                Ok(value) => return Ok(Prompted::Value(value)),
                Err(source) => {
                    let failure = ConversionFailure {
                        field: field.name.clone(),
                        input: text,
                        kind: field.kind.clone(),
                        source,
                    };
                    if self.settings.throw_on_parse_error {
                        return Err(failure.into());
                    }
                    debug!(field = %field.name, error = %failure.source, "re-prompting");
                    prompter.report_error(&failure.to_string());
                }
            }
        }
    }

    fn prompt_request(&self, field: &FieldDescriptor) -> PromptRequest {
        let text = if field.required {
            format!(
                "Please enter required field {} [{}]: ",
                field.display_name(),
                field.kind
            )
        } else {
            format!("Please enter {} [{}]: ", field.display_name(), field.kind)
        };
        let request = PromptRequest::new(text).with_timeout(self.settings.prompt_timeout());

        match &field.kind {
            ValueKind::Secure => request.secure(),
            ValueKind::Choice(names) => request.with_candidates(names.iter().cloned()).forced(),
            ValueKind::Bool => request.with_candidates(["Yes", "No"]).forced(),
            ValueKind::Integer => request.with_allowed(charset::NUMERIC),
            ValueKind::Unsigned => request.with_allowed(charset::DIGITS),
            ValueKind::Float => request.with_allowed(charset::DECIMAL),
            _ => request,
        }
    }

    fn process_ignored(&mut self, ignored: &[SwitchGroup]) -> Result<(), ParseError> {
        if ignored.is_empty() {
            return Ok(());
        }
        debug!(count = ignored.len(), "unused switch groups");

        if self.policy.disposition(FailureKind::IgnoredParameter, &self.settings)
            == Disposition::Delegate
            && self.policy.handle_ignored(ignored)
        {
            return Ok(());
        }

        if self.settings.print_ignored_groups {
            let groups = ignored
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(%groups, "Invalid parameters");
        }

        match Policy::fallback(FailureKind::IgnoredParameter, &self.settings) {
            Disposition::FailFast => Err(ParseError::IgnoredParameters(ignored.to_vec())),
            _ => Ok(()),
        }
    }
}

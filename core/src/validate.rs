//! Schema validation.
//!
//! Checks the structural invariants a schema must hold before binding:
//! non-empty field names, unique switch names (field names and short names
//! together, case-insensitively), no switch shadowing a help token, and
//! defaults that match their declared kind.
//!
//! # Examples
//!
//! ```
//! use switchbind_core::*;
//!
//! let settings = ParserSettings::default();
//! let schema = Schema::new("app")
//!     .with_field(FieldDescriptor::optional("verbose", ValueKind::Bool).with_short_name("v"));
//! assert!(validate_schema(&schema, &settings).is_empty());
//!
//! // Invalid: two fields answer to "-v"
//! let bad = schema.with_field(FieldDescriptor::optional("V", ValueKind::Bool));
//! assert!(!validate_schema(&bad, &settings).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::settings::ParserSettings;
use crate::types::{FieldDescriptor, Schema};

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field name is empty or whitespace-only.
    #[error("field name cannot be empty")]
    EmptyFieldName,
    /// Field name contains whitespace and cannot be given as a switch.
    #[error("field name contains whitespace: {0}")]
    InvalidFieldName(String),
    /// Short name is empty or contains whitespace.
    #[error("invalid short name for field {field}: {short:?}")]
    InvalidShortName { field: String, short: String },
    /// Two fields answer to the same switch.
    #[error("duplicate switch in schema: {0}")]
    DuplicateSwitch(String),
    /// A switch name is also a help token.
    #[error("switch {0} is reserved for help requests")]
    ReservedSwitch(String),
    /// Default value does not match the declared kind.
    #[error("default for field {field} does not match kind {kind}")]
    DefaultKindMismatch { field: String, kind: String },
    /// Enumeration kind without any names.
    #[error("field {0} has an enumeration kind with no choices")]
    EmptyChoice(String),
}

/// Validates the fields of `schema` that bind under `settings`.
///
/// Returns every problem found, in field order.
pub fn validate_schema(schema: &Schema, settings: &ParserSettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for field in schema.bindable_fields(settings.allow_all_properties) {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyFieldName);
            continue;
        }
        if name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidFieldName(field.name.clone()));
            continue;
        }

        for switch in switch_names(field, &mut errors) {
            if settings.is_help_token(&switch) {
                errors.push(ValidationError::ReservedSwitch(switch));
            } else if !seen.insert(switch.clone()) {
                errors.push(ValidationError::DuplicateSwitch(switch));
            }
        }

        errors.extend(validate_kind(field));
    }

    errors
}

fn switch_names(field: &FieldDescriptor, errors: &mut Vec<ValidationError>) -> Vec<String> {
    let canonical = field.canonical_name();
    let mut names = vec![canonical.clone()];

    if let Some(short) = &field.short_name {
        if short.trim().is_empty() || short.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidShortName {
                field: field.name.clone(),
                short: short.clone(),
            });
        } else if short.to_lowercase() != canonical {
            names.push(short.to_lowercase());
        }
    }

    names
}

fn validate_kind(field: &FieldDescriptor) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(choices) = field.kind.choices() {
        if choices.is_empty() {
            errors.push(ValidationError::EmptyChoice(field.name.clone()));
            return errors;
        }
    }

    if let Some(default) = &field.default {
        // Custom payloads are opaque, so only their kind key is compared
        if !default.matches_kind(&field.kind) {
            errors.push(ValidationError::DefaultKindMismatch {
                field: field.name.clone(),
                kind: field.kind.to_string(),
            });
        }
    }

    errors
}

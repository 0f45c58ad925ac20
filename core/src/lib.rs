//! Command-line switch binding.
//!
//! This crate turns raw argument tokens into typed field values:
//!
//! - [`tokenize`] groups tokens into [`SwitchGroup`]s (`-name arg words`).
//! - [`Schema`] and [`FieldDescriptor`] describe the bindable fields: kind,
//!   required flag, default, short name, usage text.
//! - [`ConverterRegistry`] converts argument text to [`Value`]s through an
//!   ordered chain of registered and built-in converters, including
//!   collections with numeric range expansion (`"1,2,5-8"`).
//! - [`Binder`] resolves each field from a matched switch, an interactive
//!   [`Prompter`], its default, or a reported violation, as governed by
//!   [`ParserSettings`] and the caller hooks in [`Policy`].
//!
//! Sensitive input is held in [`SecureText`] and never exposed through a
//! plain-text accessor.
//!
//! # Example
//!
//! ```
//! use switchbind_core::*;
//!
//! let schema = Schema::new("deploy")
//!     .with_field(FieldDescriptor::required("target", ValueKind::String).with_short_name("t"))
//!     .with_field(FieldDescriptor::optional(
//!         "shards",
//!         ValueKind::collection(CollectionShape::List, ValueKind::Unsigned),
//!     ))
//!     .with_field(
//!         FieldDescriptor::optional("level", ValueKind::Choice(vec!["Info".into(), "Debug".into()]))
//!             .with_default(Value::Choice("Info".into())),
//!     );
//!
//! let mut binder = Binder::new(ParserSettings::default());
//! let result = binder
//!     .parse(&["-t", "Staging", "-shards", "1,4-6"], &schema)
//!     .unwrap();
//!
//! assert_eq!(result.values.get_str("target"), Some("Staging"));
//! let shards: Vec<u64> = result.values.get("shards").cloned().unwrap().try_into().unwrap();
//! assert_eq!(shards, vec![1, 4, 5, 6]);
//! assert_eq!(result.values.get_str("level"), Some("Info"));
//! ```

mod bind;
mod convert;
mod error;
mod policy;
mod prompt;
mod secure;
mod settings;
mod tokenize;
mod types;
mod validate;
mod value;

pub use bind::{Binder, ParseResult};
pub use convert::{
    ConvertError, Converter, ConverterRegistry, FALSE_TOKENS, MAX_RANGE_LEN, TRUE_TOKENS,
    make_int_range,
};
pub use error::{
    ConversionFailure, EXIT_FATAL, EXIT_HELP_REQUESTED, ErrorClass, ParseError, PromptError,
    SettingsError,
};
pub use policy::{CorrectionHook, Disposition, FailureKind, HelpHook, IgnoredHook, Policy};
pub use prompt::{AutocompleteMode, PromptOutcome, PromptRequest, Prompter, Response, charset};
pub use secrecy::ExposeSecret;
pub use secure::{REDACTED, SecureText};
pub use settings::ParserSettings;
pub use tokenize::{SwitchGroup, Tokenized, tokenize};
pub use types::*;
pub use validate::{ValidationError, validate_schema};
pub use value::{Bindable, CustomValue, Value, ValueMap};

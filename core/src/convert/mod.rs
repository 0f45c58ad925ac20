//! String-to-value conversion.
//!
//! [`ConverterRegistry::convert`] runs an ordered chain for every call:
//!
//! 1. a converter registered for exactly the target kind,
//! 2. a family converter whose [`Converter::can_convert_to`] accepts the kind,
//! 3. the built-in collection converter (split, range expansion, assemble),
//! 4. the built-in bool converter,
//! 5. the generic scalar parser.
//!
//! Steps 1 and 2 only consider converters that accept string input. Steps 3
//! and 4 are skipped when
//! [`use_builtin_converters`](crate::ParserSettings::use_builtin_converters)
//! is off.

mod builtin;
mod collection;

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::settings::ParserSettings;
use crate::types::ValueKind;
use crate::value::Value;

pub use builtin::{FALSE_TOKENS, TRUE_TOKENS};
pub use collection::{MAX_RANGE_LEN, make_int_range};

/// Errors reported by converters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Input text is not valid for the kind.
    #[error("\"{input}\" is not a valid {kind}: {reason}")]
    Invalid {
        input: String,
        kind: String,
        reason: String,
    },

    /// A range element is not two unsigned numbers joined by `-`.
    #[error("invalid range \"{0}\": expected two unsigned numbers separated by '-'")]
    InvalidRange(String),

    #[error("range {start}-{end} is reversed")]
    ReversedRange { start: u64, end: u64 },

    #[error("range {start}-{end} has more than {limit} elements")]
    RangeTooLarge { start: u64, end: u64, limit: u64 },

    /// Nothing in the chain handles the kind.
    #[error("no converter available for {0}")]
    NoConverter(String),

    #[error("\"{input}\" is not one of: {}", .choices.join(", "))]
    NotAChoice {
        input: String,
        choices: Vec<String>,
    },

    /// A value of one variant was assigned where another was expected.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Failure reported by a caller-registered converter.
    #[error("{0}")]
    Custom(String),
}

impl ConvertError {
    pub fn invalid(input: &str, kind: &ValueKind, reason: impl ToString) -> Self {
        Self::Invalid {
            input: input.to_string(),
            kind: kind.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A conversion strategy.
///
/// Register with [`ConverterRegistry::register`] for one exact kind, or with
/// [`ConverterRegistry::register_family`] to be asked through
/// [`can_convert_to`](Converter::can_convert_to) for any kind.
///
/// # Examples
///
/// ```
/// use switchbind_core::{
///     ConvertError, Converter, ConverterRegistry, CustomValue, ParserSettings, Value, ValueKind,
/// };
///
/// struct Celsius;
///
/// impl Converter for Celsius {
///     fn can_convert_to(&self, kind: &ValueKind) -> bool {
///         matches!(kind, ValueKind::Custom(key) if key == "celsius")
///     }
///
///     fn convert(
///         &self,
///         input: &str,
///         _kind: &ValueKind,
///         _registry: &ConverterRegistry,
///         _settings: &ParserSettings,
///     ) -> Result<Value, ConvertError> {
///         let degrees: f64 = input
///             .trim_end_matches('C')
///             .parse()
///             .map_err(|_| ConvertError::Custom(format!("bad temperature {input}")))?;
///         Ok(Value::Custom(CustomValue::new("celsius", degrees)))
///     }
/// }
///
/// let mut registry = ConverterRegistry::new();
/// registry.register_family(Celsius);
///
/// let kind = ValueKind::Custom("celsius".into());
/// let value = registry.convert("21.5C", &kind, &ParserSettings::default()).unwrap();
/// let Value::Custom(custom) = value else { unreachable!() };
/// assert_eq!(custom.downcast_ref::<f64>(), Some(&21.5));
/// ```
pub trait Converter: Send + Sync {
    /// Returns `true` if this converter can produce values of `kind`.
    fn can_convert_to(&self, kind: &ValueKind) -> bool;

    /// Returns `true` if this converter accepts string input.
    fn can_convert_from_str(&self) -> bool {
        true
    }

    /// Converts `input` to a value of `kind`.
    ///
    /// `registry` allows nested conversion of element text.
    fn convert(
        &self,
        input: &str,
        kind: &ValueKind,
        registry: &ConverterRegistry,
        settings: &ParserSettings,
    ) -> Result<Value, ConvertError>;
}

struct FnConverter<F> {
    kind: ValueKind,
    func: F,
}

impl<F> Converter for FnConverter<F>
where
    F: Fn(&str) -> Result<Value, ConvertError> + Send + Sync,
{
    fn can_convert_to(&self, kind: &ValueKind) -> bool {
        *kind == self.kind
    }

    fn convert(
        &self,
        input: &str,
        _kind: &ValueKind,
        _registry: &ConverterRegistry,
        _settings: &ParserSettings,
    ) -> Result<Value, ConvertError> {
        (self.func)(input)
    }
}

/// Explicitly registered converters plus the built-in chain.
#[derive(Default)]
pub struct ConverterRegistry {
    exact: HashMap<ValueKind, Box<dyn Converter>>,
    family: Vec<Box<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` for exactly `kind`, replacing any previous one.
    pub fn register(&mut self, kind: ValueKind, converter: impl Converter + 'static) {
        self.exact.insert(kind, Box::new(converter));
    }

    /// Registers a closure for exactly `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchbind_core::{ConverterRegistry, ParserSettings, Value, ValueKind};
    ///
    /// let mut registry = ConverterRegistry::new();
    /// registry.register_fn(ValueKind::Integer, |input| {
    ///     Ok(Value::Integer(input.len() as i64))
    /// });
    ///
    /// let value = registry.convert("abcd", &ValueKind::Integer, &ParserSettings::default());
    /// assert_eq!(value, Ok(Value::Integer(4)));
    /// ```
    pub fn register_fn<F>(&mut self, kind: ValueKind, func: F)
    where
        F: Fn(&str) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.register(kind.clone(), FnConverter { kind, func });
    }

    /// Registers a converter consulted for any kind it accepts.
    ///
    /// Family converters are tried in registration order.
    pub fn register_family(&mut self, converter: impl Converter + 'static) {
        self.family.push(Box::new(converter));
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.exact.len() + self.family.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts `input` to a value of `kind`.
    pub fn convert(
        &self,
        input: &str,
        kind: &ValueKind,
        settings: &ParserSettings,
    ) -> Result<Value, ConvertError> {
        if let Some(converter) = self
            .exact
            .get(kind)
            .filter(|c| c.can_convert_from_str() && c.can_convert_to(kind))
        {
            debug!(%kind, "using registered converter");
            return converter.convert(input, kind, self, settings);
        }

        if let Some(converter) = self
            .family
            .iter()
            .find(|c| c.can_convert_from_str() && c.can_convert_to(kind))
        {
            debug!(%kind, "using family converter");
            return converter.convert(input, kind, self, settings);
        }

        if settings.use_builtin_converters {
            if let ValueKind::Collection { shape, element } = kind {
                debug!(%kind, "using collection converter");
                return collection::convert_collection(input, *shape, element, self, settings);
            }
            if *kind == ValueKind::Bool {
                return builtin::convert_bool(input, settings.treat_bool_presence_as_true);
            }
        }

        builtin::convert_scalar(input, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectionShape;

    struct Upper;

    impl Converter for Upper {
        fn can_convert_to(&self, kind: &ValueKind) -> bool {
            *kind == ValueKind::String
        }

        fn convert(
            &self,
            input: &str,
            _kind: &ValueKind,
            _registry: &ConverterRegistry,
            _settings: &ParserSettings,
        ) -> Result<Value, ConvertError> {
            Ok(Value::String(input.to_uppercase()))
        }
    }

    struct NotFromStr;

    impl Converter for NotFromStr {
        fn can_convert_to(&self, _kind: &ValueKind) -> bool {
            true
        }

        fn can_convert_from_str(&self) -> bool {
            false
        }

        fn convert(
            &self,
            _input: &str,
            _kind: &ValueKind,
            _registry: &ConverterRegistry,
            _settings: &ParserSettings,
        ) -> Result<Value, ConvertError> {
            Err(ConvertError::Custom("should not be called".into()))
        }
    }

    #[test]
    fn test_exact_registration_wins_over_family() {
        let mut registry = ConverterRegistry::new();
        registry.register_family(Upper);
        registry.register_fn(ValueKind::String, |input| {
            Ok(Value::String(format!("<{input}>")))
        });

        let value = registry.convert("x", &ValueKind::String, &ParserSettings::default());
        assert_eq!(value, Ok(Value::String("<x>".into())));
    }

    #[test]
    fn test_family_converter_used_when_no_exact_match() {
        let mut registry = ConverterRegistry::new();
        registry.register_family(Upper);

        let value = registry.convert("abc", &ValueKind::String, &ParserSettings::default());
        assert_eq!(value, Ok(Value::String("ABC".into())));
    }

    #[test]
    fn test_converters_without_string_input_are_skipped() {
        let mut registry = ConverterRegistry::new();
        registry.register_family(NotFromStr);
        registry.register(ValueKind::Integer, NotFromStr);

        let value = registry.convert("12", &ValueKind::Integer, &ParserSettings::default());
        assert_eq!(value, Ok(Value::Integer(12)));
    }

    #[test]
    fn test_registered_element_converter_applies_inside_collections() {
        let mut registry = ConverterRegistry::new();
        registry.register_family(Upper);

        let kind = ValueKind::collection(CollectionShape::List, ValueKind::String);
        let value = registry.convert("a,b", &kind, &ParserSettings::default());
        assert_eq!(
            value,
            Ok(Value::List(vec![
                Value::String("A".into()),
                Value::String("B".into())
            ]))
        );
    }

    #[test]
    fn test_builtins_can_be_disabled() {
        let settings = ParserSettings {
            use_builtin_converters: false,
            ..ParserSettings::default()
        };
        let registry = ConverterRegistry::new();

        let kind = ValueKind::collection(CollectionShape::List, ValueKind::Integer);
        assert!(matches!(
            registry.convert("1,2", &kind, &settings),
            Err(ConvertError::NoConverter(_))
        ));

        // Falls through to the generic parser, which only knows "true"/"false"
        assert_eq!(
            registry.convert("true", &ValueKind::Bool, &settings),
            Ok(Value::Bool(true))
        );
        assert!(registry.convert("yes", &ValueKind::Bool, &settings).is_err());
    }

    #[test]
    fn test_custom_kind_without_converter_fails() {
        let registry = ConverterRegistry::new();
        let kind = ValueKind::Custom("color".into());
        assert_eq!(
            registry.convert("red", &kind, &ParserSettings::default()),
            Err(ConvertError::NoConverter("color".into()))
        );
    }
}

//! Schema type definitions for switch binding.
//!
//! A [`Schema`] is an ordered list of [`FieldDescriptor`]s supplied by the
//! caller. Each descriptor names a bindable field, declares the [`ValueKind`]
//! its argument converts to, and carries the metadata the binder consults
//! when no switch matches (required flag, default value, short name).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Container shape for collection kinds.
///
/// Determines how converted elements are assembled (see
/// [`Value::Queue`], [`Value::Stack`], etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionShape {
    /// First-in first-out; elements are enqueued in input order.
    Queue,
    /// Last-in first-out; later elements end up nearer the top.
    Stack,
    /// Ordered list.
    List,
    /// Insertion-ordered set; repeated elements are kept once.
    Set,
    /// Unordered bag; repeated elements are kept.
    Bag,
    /// Fixed array sized to the number of elements.
    Array,
}

impl CollectionShape {
    pub fn label(self) -> &'static str {
        match self {
            Self::Queue => "Queue",
            Self::Stack => "Stack",
            Self::List => "List",
            Self::Set => "Set",
            Self::Bag => "Bag",
            Self::Array => "Array",
        }
    }
}

/// Target type of a bindable field.
///
/// # Examples
///
/// ```
/// use switchbind_core::{CollectionShape, ValueKind};
///
/// let ports = ValueKind::collection(CollectionShape::List, ValueKind::Unsigned);
/// assert!(ports.is_collection());
/// assert_eq!(ports.to_string(), "List<Unsigned>");
///
/// let color = ValueKind::Choice(vec!["Red".into(), "Green".into()]);
/// assert_eq!(color.choices(), Some(&["Red".to_string(), "Green".to_string()][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    String,
    Char,
    /// Signed 64-bit integer.
    Integer,
    /// Unsigned 64-bit integer.
    Unsigned,
    Float,
    /// Date and time without zone.
    DateTime,
    /// Filesystem path (file or directory).
    Path,
    /// Sensitive text; only ever held in a [`SecureText`](crate::SecureText).
    Secure,
    /// Enumeration with the given names; matched case-insensitively.
    Choice(Vec<String>),
    /// Caller-defined kind, converted only by registered converters.
    Custom(String),
    /// Container of elements of another kind.
    Collection {
        shape: CollectionShape,
        element: Box<ValueKind>,
    },
}

impl ValueKind {
    /// Creates a collection kind.
    pub fn collection(shape: CollectionShape, element: ValueKind) -> Self {
        Self::Collection {
            shape,
            element: Box::new(element),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Secure)
    }

    /// Integer-like kinds are eligible for numeric range expansion.
    pub fn is_integer_like(&self) -> bool {
        matches!(self, Self::Integer | Self::Unsigned)
    }

    /// Enumeration names, if this is a [`ValueKind::Choice`].
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            Self::Choice(names) => Some(names),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("Bool"),
            Self::String => f.write_str("String"),
            Self::Char => f.write_str("Char"),
            Self::Integer => f.write_str("Integer"),
            Self::Unsigned => f.write_str("Unsigned"),
            Self::Float => f.write_str("Float"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Path => f.write_str("Path"),
            Self::Secure => f.write_str("Secure"),
            Self::Choice(_) => f.write_str("Choice"),
            Self::Custom(name) => f.write_str(name),
            Self::Collection { shape, element } => write!(f, "{}<{element}>", shape.label()),
        }
    }
}

/// Metadata for one bindable field.
///
/// A descriptor created with [`new`](FieldDescriptor::new) is a *plain*
/// field: it only binds when
/// [`allow_all_properties`](crate::ParserSettings::allow_all_properties) is
/// set. Attaching any metadata through the builder methods marks it, which
/// makes it bindable regardless of that setting.
///
/// # Examples
///
/// ```
/// use switchbind_core::{FieldDescriptor, Value, ValueKind};
///
/// let count = FieldDescriptor::new("RetryCount", ValueKind::Integer)
///     .with_short_name("r")
///     .with_default(Value::Integer(3))
///     .with_description("How many times to retry");
///
/// assert!(count.is_marked());
/// assert_eq!(count.canonical_name(), "retrycount");
/// assert_eq!(count.switch_name(), "r");
/// assert!(!count.required);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as declared by the caller.
    pub name: String,
    /// Kind the argument converts to.
    pub kind: ValueKind,
    /// Whether the field must resolve to a value.
    pub required: bool,
    /// Value recorded when no switch matches an optional field.
    pub default: Option<Value>,
    /// Alternative switch name.
    pub short_name: Option<String>,
    /// Description for usage text.
    pub description: Option<String>,
    /// Example argument for usage text.
    pub example: Option<String>,
    marked: bool,
}

impl FieldDescriptor {
    /// Creates a plain (unmarked) descriptor.
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            short_name: None,
            description: None,
            example: None,
            marked: false,
        }
    }

    /// Creates a marked, required descriptor.
    pub fn required(name: &str, kind: ValueKind) -> Self {
        Self::new(name, kind).require()
    }

    /// Creates a marked, optional descriptor.
    pub fn optional(name: &str, kind: ValueKind) -> Self {
        Self::new(name, kind).mark()
    }

    /// Marks the field without attaching other metadata.
    pub fn mark(mut self) -> Self {
        self.marked = true;
        self
    }

    pub fn require(mut self) -> Self {
        self.required = true;
        self.mark()
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.mark()
    }

    pub fn with_short_name(mut self, short: &str) -> Self {
        self.short_name = Some(short.to_string());
        self.mark()
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self.mark()
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self.mark()
    }

    /// Returns `true` if metadata has been attached to this field.
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Lowercase field name; the key under which values are recorded.
    pub fn canonical_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Name shown in usage text: the short name if set, else the field name.
    pub fn switch_name(&self) -> &str {
        self.short_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    /// Checks whether a lowercase switch name selects this field.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchbind_core::{FieldDescriptor, ValueKind};
    ///
    /// let field = FieldDescriptor::optional("Output", ValueKind::Path).with_short_name("O");
    /// assert!(field.matches_switch("output"));
    /// assert!(field.matches_switch("o"));
    /// assert!(!field.matches_switch("out"));
    /// ```
    pub fn matches_switch(&self, switch: &str) -> bool {
        if self.canonical_name() == switch {
            return true;
        }
        self.short_name
            .as_deref()
            .is_some_and(|short| short.to_lowercase() == switch)
    }

    /// Human-readable form of the field name for prompts
    /// (`"retry_count"` and `"RetryCount"` both become `"Retry Count"`).
    pub fn display_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 4);
        let mut prev: Option<char> = None;
        for ch in self.name.chars() {
            if ch == '_' || ch == '-' {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
                prev = Some(' ');
                continue;
            }
            let starts_word = match prev {
                None => true,
                Some(p) => p == ' ' || (ch.is_uppercase() && p.is_lowercase()),
            };
            if starts_word {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            prev = Some(ch);
        }
        out.trim().to_string()
    }
}

/// Ordered set of field descriptors for one binding target.
///
/// # Examples
///
/// ```
/// use switchbind_core::{FieldDescriptor, Schema, ValueKind};
///
/// let schema = Schema::new("deploy")
///     .with_help_text("Deploys the current build")
///     .with_field(FieldDescriptor::required("target", ValueKind::String))
///     .with_field(FieldDescriptor::new("dry_run", ValueKind::Bool));
///
/// assert_eq!(schema.fields.len(), 2);
/// assert!(schema.find_field("TARGET").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Name of the binding target (used in usage text).
    pub name: String,
    /// Target-level help text.
    pub help_text: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_help_text(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }

    /// Finds a field by name, case-insensitively.
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        let wanted = name.to_lowercase();
        self.fields.iter().find(|f| f.canonical_name() == wanted)
    }

    /// Fields that take part in binding under the given setting.
    pub fn bindable_fields(&self, allow_all: bool) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| allow_all || field.is_marked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_marks_field() {
        let plain = FieldDescriptor::new("name", ValueKind::String);
        assert!(!plain.is_marked());

        let described = FieldDescriptor::new("name", ValueKind::String).with_description("x");
        assert!(described.is_marked());
        assert!(!described.required);

        let required = FieldDescriptor::required("name", ValueKind::String);
        assert!(required.is_marked());
        assert!(required.required);
    }

    #[test]
    fn test_switch_name_falls_back_to_field_name() {
        let field = FieldDescriptor::optional("Verbose", ValueKind::Bool);
        assert_eq!(field.switch_name(), "Verbose");

        let field = field.with_short_name("v");
        assert_eq!(field.switch_name(), "v");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            FieldDescriptor::new("NotProvided", ValueKind::String).display_name(),
            "Not Provided"
        );
        assert_eq!(
            FieldDescriptor::new("retry_count", ValueKind::String).display_name(),
            "Retry Count"
        );
        assert_eq!(
            FieldDescriptor::new("password", ValueKind::Secure).display_name(),
            "Password"
        );
    }

    #[test]
    fn test_bindable_fields_respects_marking() {
        let schema = Schema::new("t")
            .with_field(FieldDescriptor::new("plain", ValueKind::String))
            .with_field(FieldDescriptor::optional("marked", ValueKind::String));

        let names: Vec<_> = schema.bindable_fields(false).map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["marked"]);
        assert_eq!(schema.bindable_fields(true).count(), 2);
    }

    #[test]
    fn test_collection_kind_display() {
        let kind = ValueKind::collection(
            CollectionShape::Stack,
            ValueKind::collection(CollectionShape::List, ValueKind::Integer),
        );
        assert_eq!(kind.to_string(), "Stack<List<Integer>>");
    }
}

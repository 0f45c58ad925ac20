//! Typed values produced by conversion and the result map that holds them.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::convert::ConvertError;
use crate::secure::SecureText;
use crate::types::{CollectionShape, ValueKind};

/// A converted field value.
///
/// Collection variants keep the container semantics of their
/// [`CollectionShape`]: a [`Value::Stack`] stores its top as the last
/// element, a [`Value::Set`] never holds two equal elements.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    String(String),
    Char(char),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    DateTime(NaiveDateTime),
    Path(PathBuf),
    /// Canonical name of the selected enumeration member.
    Choice(String),
    Secure(SecureText),
    /// Value produced by a caller-registered converter.
    Custom(CustomValue),
    Queue(VecDeque<Value>),
    /// Elements in push order; the last element is the top.
    Stack(Vec<Value>),
    List(Vec<Value>),
    Set(Vec<Value>),
    Bag(Vec<Value>),
    Array(Box<[Value]>),
}

/// Opaque payload of a custom-kind value.
#[derive(Clone)]
pub struct CustomValue {
    kind: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    pub fn new<T: Any + Send + Sync>(kind: &str, payload: T) -> Self {
        Self {
            kind: kind.to_string(),
            payload: Arc::new(payload),
        }
    }

    /// Name of the custom kind that produced this value.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.kind)
    }
}

impl Value {
    /// Assembles converted elements according to a container shape.
    pub fn from_elements(shape: CollectionShape, elements: Vec<Value>) -> Self {
        match shape {
            CollectionShape::Queue => Self::Queue(elements.into_iter().collect()),
            CollectionShape::Stack => Self::Stack(elements),
            CollectionShape::List => Self::List(elements),
            CollectionShape::Bag => Self::Bag(elements),
            CollectionShape::Set => {
                let mut set: Vec<Value> = Vec::with_capacity(elements.len());
                for element in elements {
                    if !set.contains(&element) {
                        set.push(element);
                    }
                }
                Self::Set(set)
            }
            CollectionShape::Array => Self::Array(elements.into_boxed_slice()),
        }
    }

    /// Short name of the variant, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
            Self::Char(_) => "Char",
            Self::Integer(_) => "Integer",
            Self::Unsigned(_) => "Unsigned",
            Self::Float(_) => "Float",
            Self::DateTime(_) => "DateTime",
            Self::Path(_) => "Path",
            Self::Choice(_) => "Choice",
            Self::Secure(_) => "Secure",
            Self::Custom(_) => "Custom",
            Self::Queue(_) => "Queue",
            Self::Stack(_) => "Stack",
            Self::List(_) => "List",
            Self::Set(_) => "Set",
            Self::Bag(_) => "Bag",
            Self::Array(_) => "Array",
        }
    }

    /// Checks whether this value could have been produced for `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchbind_core::{CollectionShape, Value, ValueKind};
    ///
    /// assert!(Value::Integer(4).matches_kind(&ValueKind::Integer));
    /// assert!(!Value::Integer(4).matches_kind(&ValueKind::Float));
    ///
    /// let list = Value::List(vec![Value::Bool(true)]);
    /// assert!(list.matches_kind(&ValueKind::collection(CollectionShape::List, ValueKind::Bool)));
    /// ```
    pub fn matches_kind(&self, kind: &ValueKind) -> bool {
        match (self, kind) {
            (Self::Bool(_), ValueKind::Bool)
            | (Self::String(_), ValueKind::String)
            | (Self::Char(_), ValueKind::Char)
            | (Self::Integer(_), ValueKind::Integer)
            | (Self::Unsigned(_), ValueKind::Unsigned)
            | (Self::Float(_), ValueKind::Float)
            | (Self::DateTime(_), ValueKind::DateTime)
            | (Self::Path(_), ValueKind::Path)
            | (Self::Secure(_), ValueKind::Secure) => true,
            (Self::Choice(name), ValueKind::Choice(names)) => names.contains(name),
            (Self::Custom(custom), ValueKind::Custom(key)) => custom.kind() == key,
            (value, ValueKind::Collection { shape, element }) => {
                let same_shape = matches!(
                    (value, shape),
                    (Self::Queue(_), CollectionShape::Queue)
                        | (Self::Stack(_), CollectionShape::Stack)
                        | (Self::List(_), CollectionShape::List)
                        | (Self::Set(_), CollectionShape::Set)
                        | (Self::Bag(_), CollectionShape::Bag)
                        | (Self::Array(_), CollectionShape::Array)
                );
                same_shape
                    && value
                        .elements()
                        .is_some_and(|items| items.iter().all(|v| v.matches_kind(element)))
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Unsigned(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Unsigned(n) => Some(*n),
            Self::Integer(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Plain text of string-like values.
    ///
    /// Always `None` for [`Value::Secure`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_secure(&self) -> Option<&SecureText> {
        match self {
            Self::Secure(text) => Some(text),
            _ => None,
        }
    }

    /// Elements of any collection variant, in stored order.
    pub fn elements(&self) -> Option<Vec<&Value>> {
        match self {
            Self::Queue(items) => Some(items.iter().collect()),
            Self::Stack(items) | Self::List(items) | Self::Set(items) | Self::Bag(items) => {
                Some(items.iter().collect())
            }
            Self::Array(items) => Some(items.iter().collect()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) | (Self::Choice(a), Self::Choice(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Secure(a), Self::Secure(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            (Self::Queue(a), Self::Queue(b)) => a == b,
            (Self::Stack(a), Self::Stack(b))
            | (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b))
            | (Self::Bag(a), Self::Bag(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            Self::Integer(v) => write!(f, "Integer({v})"),
            Self::Unsigned(v) => write!(f, "Unsigned({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::DateTime(v) => write!(f, "DateTime({v})"),
            Self::Path(v) => write!(f, "Path({v:?})"),
            Self::Choice(v) => write!(f, "Choice({v:?})"),
            Self::Secure(v) => write!(f, "{v:?}"),
            Self::Custom(v) => write!(f, "{v:?}"),
            Self::Queue(v) => f.debug_tuple("Queue").field(v).finish(),
            Self::Stack(v) => f.debug_tuple("Stack").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Self::Bag(v) => f.debug_tuple("Bag").field(v).finish(),
            Self::Array(v) => f.debug_tuple("Array").field(v).finish(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::String(v) | Self::Choice(v) => serializer.serialize_str(v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Unsigned(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::DateTime(v) => serializer.collect_str(&v.format("%Y-%m-%dT%H:%M:%S")),
            Self::Path(v) => serializer.collect_str(&v.display()),
            Self::Secure(v) => v.serialize(serializer),
            Self::Custom(v) => serializer.collect_str(&format_args!("<{}>", v.kind())),
            Self::Queue(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Stack(items) | Self::List(items) | Self::Set(items) | Self::Bag(items) => {
                items.serialize(serializer)
            }
            Self::Array(items) => items.serialize(serializer),
        }
    }
}

/// Mapping from lowercase field name to converted value.
///
/// Lookups lowercase the key first; a missing key is `None`, never a
/// placeholder value.
///
/// # Examples
///
/// ```
/// use switchbind_core::{Value, ValueMap};
///
/// let mut values = ValueMap::new();
/// values.set("Port", Value::Unsigned(8080));
///
/// assert_eq!(values.get("PORT"), Some(&Value::Unsigned(8080)));
/// assert_eq!(values.get_u64("port"), Some(8080));
/// assert!(values.get("host").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: HashMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&key.to_lowercase())
    }

    /// Stores a value, returning the previous one for the key.
    pub fn set(&mut self, key: &str, value: Value) -> Option<Value> {
        self.entries.insert(key.to_lowercase(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Plain text of a string-like entry; `None` for secure entries.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_secure(&self, key: &str) -> Option<&SecureText> {
        self.get(key).and_then(Value::as_secure)
    }

    /// Assigns every entry whose key names a field of `T` into `target`.
    ///
    /// Keys that `T`'s schema does not declare are left untouched.
    pub fn load_into<T: Bindable>(self, target: &mut T) -> Result<(), ConvertError> {
        let schema = T::schema();
        for (key, value) in self.entries {
            if let Some(field) = schema.find_field(&key) {
                target.assign(&field.canonical_name(), value)?;
            }
        }
        Ok(())
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key, &self.entries[key])?;
        }
        map.end()
    }
}

/// A Rust type that values can be bound into directly.
///
/// # Examples
///
/// ```
/// use switchbind_core::{Bindable, ConvertError, FieldDescriptor, Schema, Value, ValueKind, ValueMap};
///
/// #[derive(Default)]
/// struct Options {
///     port: u64,
///     verbose: bool,
/// }
///
/// impl Bindable for Options {
///     fn schema() -> Schema {
///         Schema::new("options")
///             .with_field(FieldDescriptor::optional("port", ValueKind::Unsigned))
///             .with_field(FieldDescriptor::optional("verbose", ValueKind::Bool))
///     }
///
///     fn assign(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
///         match field {
///             "port" => self.port = value.try_into()?,
///             "verbose" => self.verbose = value.try_into()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let mut values = ValueMap::new();
/// values.set("port", Value::Unsigned(80));
/// let mut options = Options::default();
/// values.load_into(&mut options).unwrap();
/// assert_eq!(options.port, 80);
/// ```
pub trait Bindable {
    /// Schema describing the bindable fields.
    fn schema() -> crate::types::Schema;

    /// Stores one converted value; `field` is the canonical (lowercase) name.
    fn assign(&mut self, field: &str, value: Value) -> Result<(), ConvertError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = ConvertError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    let converted = match &value {
                        Value::Integer(n) => <$ty>::try_from(*n).ok(),
                        Value::Unsigned(n) => <$ty>::try_from(*n).ok(),
                        _ => None,
                    };
                    converted.ok_or_else(|| mismatch(stringify!($ty), &value))
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl TryFrom<Value> for f64 {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Integer(n) => Ok(n as f64),
            Value::Unsigned(n) => Ok(n as f64),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl TryFrom<Value> for char {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Char(c) => Ok(c),
            other => Err(mismatch("char", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) | Value::Choice(s) => Ok(s),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl TryFrom<Value> for PathBuf {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Path(p) => Ok(p),
            Value::String(s) => Ok(PathBuf::from(s)),
            other => Err(mismatch("PathBuf", &other)),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch("NaiveDateTime", &other)),
        }
    }
}

impl TryFrom<Value> for SecureText {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Secure(text) => Ok(text),
            other => Err(mismatch("SecureText", &other)),
        }
    }
}

impl<T: TryFrom<Value, Error = ConvertError>> TryFrom<Value> for Vec<T> {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Queue(items) => items.into_iter().map(T::try_from).collect(),
            Value::Stack(items) | Value::List(items) | Value::Set(items) | Value::Bag(items) => {
                items.into_iter().map(T::try_from).collect()
            }
            Value::Array(items) => items.into_vec().into_iter().map(T::try_from).collect(),
            other => Err(mismatch("Vec", &other)),
        }
    }
}

impl<T: TryFrom<Value, Error = ConvertError>> TryFrom<Value> for VecDeque<T> {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Vec::<T>::try_from(value).map(VecDeque::from)
    }
}

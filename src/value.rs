//! Values compared by the equality engine.
//!
//! # Value
//!
//! [`Value`] is the universal input of [`Equality`](crate::Equality). Every value falls into one of four shapes:
//! - Plain values: undefined, null, booleans, numbers, strings and dates.
//! - Composites: lists and maps, compared by recursing into their entries.
//! - Immutable structures: [`Object`]s that report [`Object::is_immutable`], compared by reference.
//! - Cursors: [`Object`]s that expose a [`Cursor`], compared through their dereferenced value.
//!
//! Lists, maps and objects are reference counted, so cloning a [`Value`] is cheap and keeps its identity:
//!
//! ```
//! use recompute::{props, Value};
//!
//! let a = props! { "x" => 1, "y" => 2 };
//! let b = a.clone();
//! assert!(a.is_same(&b));
//!
//! let c = props! { "y" => 2, "x" => 1 };
//! assert!(!a.is_same(&c));
//! assert_eq!(a, c);
//! ```

use indexmap::IndexMap;
use std::{
    any::Any,
    fmt, ptr,
    rc::Rc,
    time::SystemTime,
};

/// Insertion-ordered mapping of field names to values.
///
/// Iteration follows insertion order, equality ignores it.
pub type Map = IndexMap<Rc<str>, Value>;

/// A handle that can be dereferenced to the value it points at.
///
/// Two cursors are equal when they dereference to the same value,
/// regardless of how the handles themselves are built.
pub trait Cursor {
    /// Get the value this cursor currently points at.
    fn deref(&self) -> Value;
}

/// Host object stored in [`Value::Object`].
pub trait Object: fmt::Debug + 'static {
    /// Get this object as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get this object as a [`Cursor`], if it is one.
    fn as_cursor(&self) -> Option<&dyn Cursor> {
        None
    }

    /// Returns `true` if this object is never mutated in place.
    fn is_immutable(&self) -> bool {
        false
    }

    /// Returns `true` if `other` is this object under another handle.
    ///
    /// Wrappers that share their contents can report identity here,
    /// handles wrapping the same [`Rc`] are always the same.
    fn is_same_object(&self, other: &dyn Object) -> bool {
        let _ = other;
        false
    }

    /// Deep equality with another object, used when neither side is a cursor or immutable.
    fn eq_object(&self, other: &dyn Object) -> bool {
        let _ = other;
        false
    }

    /// Plain representation of this object, if any.
    fn to_value(&self) -> Option<Value> {
        self.as_cursor().map(|cursor| cursor.deref())
    }
}

/// Dynamically-typed comparable value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Missing value.
    #[default]
    Undefined,
    /// Explicit empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// String.
    String(Rc<str>),
    /// Point in time.
    Date(SystemTime),
    /// Ordered list of values.
    List(Rc<Vec<Value>>),
    /// Mapping of field names to values.
    Map(Rc<Map>),
    /// Host object, such as a cursor or an immutable structure.
    Object(Rc<dyn Object>),
}

impl Value {
    /// Create a map from an iterator of entries.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Rc<str>>,
        V: Into<Value>,
    {
        Value::Map(Rc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        ))
    }

    /// Create a list from an iterator of items.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Wrap a host object.
    pub fn object(object: impl Object) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Get the [`Kind`] of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Returns `true` if this value is [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Native identity check.
    ///
    /// Plain values are compared by value (`NaN` is never the same as itself),
    /// lists, maps and objects by reference.
    /// Objects may also report identity through [`Object::is_same_object`].
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => {
                ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)) || a.is_same_object(&**b)
            }
            _ => false,
        }
    }

    /// Get a field of a map.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_map()?.get(field)
    }

    /// Get an item of a list.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_list()?.get(index)
    }

    /// Get the entry at `key`, for either a map field or a list index.
    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        match key {
            Key::Field(field) => self.get(field),
            Key::Index(index) => self.at(*index),
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(&**map),
            _ => None,
        }
    }

    /// Get this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get this value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Get this value as a number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the host object, if this value is one.
    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Value::Object(object) => Some(&**object),
            _ => None,
        }
    }

    /// Get this value as a [`Cursor`], if it is an object exposing one.
    pub fn as_cursor(&self) -> Option<&dyn Cursor> {
        self.as_object()?.as_cursor()
    }

    /// Downcast a host object to a concrete type.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_object()?.as_any().downcast_ref()
    }
}

/// Plain deep equality.
///
/// This ignores cursors and immutable markers entirely, see [`Equality`](crate::Equality) for the
/// comparison used to decide on recomputation.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_same(other) {
            return true;
        }

        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.is_nan() && b.is_nan(),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b)
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, a)| b.get(&**key).is_some_and(|b| a == b))
            }
            (Value::Object(a), Value::Object(b)) => a.eq_object(&**b),
            _ => false,
        }
    }
}

/// Shape of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Kind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Date,
    List,
    Map,
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Map field or list index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Map field.
    Field(Rc<str>),
    /// List index.
    Index(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Field(field) => f.write_str(field),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Field(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Field(value.into())
    }
}

impl From<Rc<str>> for Key {
    fn from(value: Rc<str>) -> Self {
        Key::Field(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Index(value)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    }
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::String(value)
    }
}

impl From<SystemTime> for Value {
    fn from(value: SystemTime) -> Self {
        Value::Date(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(Rc::new(value))
    }
}

impl From<Rc<dyn Object>> for Value {
    fn from(value: Rc<dyn Object>) -> Self {
        Value::Object(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::list(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Create a [`Value::Map`] from `key => value` pairs.
///
/// ```
/// use recompute::props;
///
/// let props = props! { "title" => "Hello", "count" => 2 };
/// assert_eq!(props.get("count").and_then(|v| v.as_number()), Some(2.));
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Value::from($crate::Map::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Value::map([$(($key, $crate::Value::from($value))),+])
    };
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{Serialize, SerializeMap, SerializeSeq};
        use std::time::UNIX_EPOCH;

        // Largest integer an f64 holds exactly.
        const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.;

        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0. && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(time) => {
                let millis = match time.duration_since(UNIX_EPOCH) {
                    Ok(elapsed) => elapsed.as_millis() as i64,
                    Err(error) => -(error.duration().as_millis() as i64),
                };
                serializer.serialize_i64(millis)
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut entries = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    entries.serialize_entry(&**key, value)?;
                }
                entries.end()
            }
            Value::Object(object) => match object.to_value() {
                Some(value) => value.serialize(serializer),
                None => serializer.serialize_unit(),
            },
        }
    }
}

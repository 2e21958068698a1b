//! Equality engine.
//!
//! [`Equality`] decides whether two values are equivalent for the purpose of skipping recomputation.
//! Values are classified on every comparison:
//!
//! 1. Values that are the same (see [`Value::is_same`]) are always equal.
//! 2. Cursors are equal when they dereference to the same value.
//!    A cursor is never equal to a non-cursor.
//! 3. Immutable structures are equal when they are the same reference.
//!    An immutable structure is never equal to a mutable value.
//! 4. Lists and maps are compared entry by entry with this same algorithm.
//! 5. Everything else falls back to plain deep equality.
//!
//! Each step can be replaced with [`Overrides`]:
//!
//! ```
//! use recompute::{props, Equality, Overrides};
//!
//! // Treat every number as equal.
//! let equality = Equality::default().with_overrides(
//!     Overrides::new().is_equal_plain(|a, b| a.as_number().is_some() && b.as_number().is_some()),
//! );
//!
//! assert!(equality.is_equal(&props! { "x" => 1 }, &props! { "x" => 2 }));
//! assert!(!equality.is_equal(&props! { "x" => 1 }, &props! { "y" => 1 }));
//! ```

use crate::{Map, Value};
use hashbrown::HashSet;
use std::{fmt, rc::Rc};

type Predicate = Rc<dyn Fn(&Value) -> bool>;

type Comparator = Rc<dyn Fn(&Value, &Value) -> bool>;

type Unwrap = Rc<dyn Fn(&Value) -> Value>;

type ArgsComparator = Rc<dyn Fn(&[Value], &[Value]) -> bool>;

type KeyPredicate = Rc<dyn Fn(&str, &Value) -> bool>;

/// Replacement hooks for an [`Equality`].
///
/// Every hook left unset keeps the behavior of the engine it's applied to.
/// Installed hooks fully replace the default, they are never chained with it.
#[derive(Clone, Default)]
pub struct Overrides {
    is_cursor: Option<Predicate>,
    is_immutable: Option<Predicate>,
    un_cursor: Option<Unwrap>,
    is_equal_cursor: Option<Comparator>,
    is_equal_immutable: Option<Comparator>,
    is_equal_plain: Option<Comparator>,
    is_equal_state: Option<Comparator>,
    is_equal_args: Option<ArgsComparator>,
    is_ignorable: Option<KeyPredicate>,
}

impl Overrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate to check if a value is a cursor.
    pub fn is_cursor(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_cursor = Some(Rc::new(f));
        self
    }

    /// Predicate to check if a value is an immutable structure.
    pub fn is_immutable(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_immutable = Some(Rc::new(f));
        self
    }

    /// Convert a cursor to the value it points at.
    ///
    /// Used by the default cursor comparison.
    pub fn un_cursor(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.un_cursor = Some(Rc::new(f));
        self
    }

    /// Compare two cursors.
    pub fn is_equal_cursor(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.is_equal_cursor = Some(Rc::new(f));
        self
    }

    /// Compare two immutable structures.
    pub fn is_equal_immutable(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.is_equal_immutable = Some(Rc::new(f));
        self
    }

    /// Compare two values that are neither cursors, immutable structures, nor both composites.
    pub fn is_equal_plain(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.is_equal_plain = Some(Rc::new(f));
        self
    }

    /// Compare the current and next state of a view.
    pub fn is_equal_state(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.is_equal_state = Some(Rc::new(f));
        self
    }

    /// Compare a new argument list with the previous one.
    pub fn is_equal_args(mut self, f: impl Fn(&[Value], &[Value]) -> bool + 'static) -> Self {
        self.is_equal_args = Some(Rc::new(f));
        self
    }

    /// Predicate to check if a prop should be left out of the comparison.
    pub fn is_ignorable(mut self, f: impl Fn(&str, &Value) -> bool + 'static) -> Self {
        self.is_ignorable = Some(Rc::new(f));
        self
    }

    /// Ignore exactly the props named in `keys`.
    pub fn ignore_keys<K: Into<Rc<str>>>(self, keys: impl IntoIterator<Item = K>) -> Self {
        let keys: HashSet<Rc<str>> = keys.into_iter().map(Into::into).collect();
        self.is_ignorable(move |key, _| keys.contains(key))
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("is_cursor", &self.is_cursor.is_some())
            .field("is_immutable", &self.is_immutable.is_some())
            .field("un_cursor", &self.un_cursor.is_some())
            .field("is_equal_cursor", &self.is_equal_cursor.is_some())
            .field("is_equal_immutable", &self.is_equal_immutable.is_some())
            .field("is_equal_plain", &self.is_equal_plain.is_some())
            .field("is_equal_state", &self.is_equal_state.is_some())
            .field("is_equal_args", &self.is_equal_args.is_some())
            .field("is_ignorable", &self.is_ignorable.is_some())
            .finish()
    }
}

/// Equality engine.
///
/// An engine is never mutated after it's created,
/// [`Equality::with_overrides`] returns a new engine instead.
#[derive(Clone)]
pub struct Equality {
    is_cursor: Predicate,
    is_immutable: Predicate,
    un_cursor: Unwrap,
    is_equal_cursor: Option<Comparator>,
    is_equal_immutable: Comparator,
    is_equal_plain: Comparator,
    is_equal_state: Option<Comparator>,
    is_equal_args: Option<ArgsComparator>,
    is_ignorable: KeyPredicate,
}

impl Default for Equality {
    fn default() -> Self {
        Self {
            is_cursor: Rc::new(is_cursor),
            is_immutable: Rc::new(is_immutable),
            un_cursor: Rc::new(un_cursor),
            is_equal_cursor: None,
            is_equal_immutable: Rc::new(Value::is_same),
            is_equal_plain: Rc::new(is_equal_plain),
            is_equal_state: None,
            is_equal_args: None,
            is_ignorable: Rc::new(is_ignorable),
        }
    }
}

impl Equality {
    /// Create a new engine, layering `overrides` over the hooks of this one.
    pub fn with_overrides(&self, overrides: Overrides) -> Self {
        let Overrides {
            is_cursor,
            is_immutable,
            un_cursor,
            is_equal_cursor,
            is_equal_immutable,
            is_equal_plain,
            is_equal_state,
            is_equal_args,
            is_ignorable,
        } = overrides;

        Self {
            is_cursor: is_cursor.unwrap_or_else(|| self.is_cursor.clone()),
            is_immutable: is_immutable.unwrap_or_else(|| self.is_immutable.clone()),
            un_cursor: un_cursor.unwrap_or_else(|| self.un_cursor.clone()),
            is_equal_cursor: is_equal_cursor.or_else(|| self.is_equal_cursor.clone()),
            is_equal_immutable: is_equal_immutable
                .unwrap_or_else(|| self.is_equal_immutable.clone()),
            is_equal_plain: is_equal_plain.unwrap_or_else(|| self.is_equal_plain.clone()),
            is_equal_state: is_equal_state.or_else(|| self.is_equal_state.clone()),
            is_equal_args: is_equal_args.or_else(|| self.is_equal_args.clone()),
            is_ignorable: is_ignorable.unwrap_or_else(|| self.is_ignorable.clone()),
        }
    }

    /// Returns `true` if `value` is a cursor.
    pub fn is_cursor(&self, value: &Value) -> bool {
        (self.is_cursor)(value)
    }

    /// Returns `true` if `value` is an immutable structure.
    pub fn is_immutable(&self, value: &Value) -> bool {
        (self.is_immutable)(value)
    }

    /// Get the value a cursor points at, or the value itself if it isn't a cursor.
    pub fn un_cursor(&self, value: &Value) -> Value {
        (self.un_cursor)(value)
    }

    /// Compare two cursors.
    ///
    /// By default this dereferences both and checks the results are the same reference.
    pub fn is_equal_cursor(&self, current: &Value, next: &Value) -> bool {
        match &self.is_equal_cursor {
            Some(f) => f(current, next),
            None => self.un_cursor(current).is_same(&self.un_cursor(next)),
        }
    }

    /// Compare two immutable structures.
    pub fn is_equal_immutable(&self, current: &Value, next: &Value) -> bool {
        (self.is_equal_immutable)(current, next)
    }

    /// Plain deep equality.
    pub fn is_equal_plain(&self, current: &Value, next: &Value) -> bool {
        (self.is_equal_plain)(current, next)
    }

    /// Returns `true` if the prop `key` should be left out of comparisons.
    pub fn is_ignorable(&self, key: &str, value: &Value) -> bool {
        (self.is_ignorable)(key, value)
    }

    /// Compare two values, see the [module-level documentation](crate::equality) for the algorithm.
    pub fn is_equal(&self, current: &Value, next: &Value) -> bool {
        self.compare(current, next, true)
    }

    /// Compare two states.
    ///
    /// State never holds cursors, so this skips the cursor step of [`Equality::is_equal`].
    pub fn is_equal_state(&self, current: &Value, next: &Value) -> bool {
        match &self.is_equal_state {
            Some(f) => f(current, next),
            None => self.compare(current, next, false),
        }
    }

    /// Compare a new argument list with the previous one.
    ///
    /// Lists of different lengths are never equal.
    pub fn is_equal_args(&self, next: &[Value], previous: &[Value]) -> bool {
        if let Some(f) = &self.is_equal_args {
            return f(next, previous);
        }

        next.len() == previous.len()
            && next
                .iter()
                .zip(previous)
                .all(|(next, previous)| self.is_equal(next, previous))
    }

    /// Compare two maps field by field.
    pub fn is_equal_maps(&self, current: &Map, next: &Map) -> bool {
        self.compare_maps(current, next, true)
    }

    fn compare(&self, current: &Value, next: &Value, with_cursors: bool) -> bool {
        if current.is_same(next) {
            return true;
        }

        if with_cursors {
            match (self.is_cursor(current), self.is_cursor(next)) {
                (true, true) => return self.is_equal_cursor(current, next),
                (false, false) => {}
                _ => return false,
            }
        }

        match (self.is_immutable(current), self.is_immutable(next)) {
            (true, true) => return self.is_equal_immutable(current, next),
            (false, false) => {}
            _ => return false,
        }

        match (current, next) {
            (Value::List(current), Value::List(next)) => {
                current.len() == next.len()
                    && current
                        .iter()
                        .zip(next.iter())
                        .all(|(current, next)| self.compare(current, next, with_cursors))
            }
            (Value::Map(current), Value::Map(next)) => {
                self.compare_maps(current, next, with_cursors)
            }
            _ => self.is_equal_plain(current, next),
        }
    }

    fn compare_maps(&self, current: &Map, next: &Map, with_cursors: bool) -> bool {
        current.len() == next.len()
            && current.iter().all(|(key, current)| {
                next.get(&**key)
                    .is_some_and(|next| self.compare(current, next, with_cursors))
            })
    }
}

impl fmt::Debug for Equality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Equality").finish_non_exhaustive()
    }
}

thread_local! {
    static DEFAULT: Equality = Equality::default();
}

/// Get a handle to the default engine of this thread.
pub(crate) fn shared() -> Equality {
    DEFAULT.with(Equality::clone)
}

/// Default cursor predicate: the value is an [`Object`](crate::Object) exposing a [`Cursor`](crate::Cursor).
pub fn is_cursor(value: &Value) -> bool {
    value.as_cursor().is_some()
}

/// Default immutability predicate: the value is an [`Object`](crate::Object) marked as immutable.
pub fn is_immutable(value: &Value) -> bool {
    value.as_object().is_some_and(|object| object.is_immutable())
}

/// Default cursor conversion: dereference cursors, pass everything else through.
pub fn un_cursor(value: &Value) -> Value {
    match value.as_cursor() {
        Some(cursor) => cursor.deref(),
        None => value.clone(),
    }
}

/// Default plain comparison, see [`Value`'s `PartialEq`](Value#impl-PartialEq-for-Value).
pub fn is_equal_plain(current: &Value, next: &Value) -> bool {
    current == next
}

/// Default ignorable props: `statics` and `children`.
pub fn is_ignorable(key: &str, _value: &Value) -> bool {
    matches!(key, "statics" | "children")
}

/// Compare two values with the default engine.
pub fn is_equal(current: &Value, next: &Value) -> bool {
    DEFAULT.with(|equality| equality.is_equal(current, next))
}
